use crate::assets::loader::AssetRef;
use crate::foundation::core::{Affine, Canvas, OverlayId, Vec2};
use crate::overlay::registry::{OverlayInstance, OverlayKind};
use crate::transform::model::Transform;

/// How the uniform layer is placed in the composite.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniformPlacement {
    /// Stretch to fill the frame and ignore the uniform's transform.
    Stretch,
    /// Stretch to fill the frame, then apply the uniform's transform around the canvas centre.
    #[default]
    FollowTransform,
}

/// Maps overlay offsets from preview (screen) space into canvas pixels.
///
/// Overlay transforms are recorded in the coordinate space of the view the user manipulates.
/// When that view shows the frame scaled with cover-fit, offsets must be rescaled before they
/// are applied to the full-resolution canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewMapping {
    canvas_px_per_view_px: f64,
}

impl Default for ViewMapping {
    fn default() -> Self {
        Self::identity()
    }
}

impl ViewMapping {
    /// One view pixel equals one canvas pixel.
    pub const fn identity() -> Self {
        Self {
            canvas_px_per_view_px: 1.0,
        }
    }

    /// Mapping for a `view_w x view_h` viewport showing `canvas` with cover-fit.
    ///
    /// Degenerate viewports fall back to [`ViewMapping::identity`].
    pub fn cover(view_w: f64, view_h: f64, canvas: Canvas) -> Self {
        let cw = f64::from(canvas.width);
        let ch = f64::from(canvas.height);
        let s = (view_w / cw).max(view_h / ch);
        if !s.is_finite() || s <= 0.0 {
            return Self::identity();
        }
        Self {
            canvas_px_per_view_px: 1.0 / s,
        }
    }

    /// Canvas pixels per view pixel.
    pub fn factor(self) -> f64 {
        self.canvas_px_per_view_px
    }

    /// Rescale a transform's offset; scale and rotation are unit-free and pass through.
    pub fn map(self, t: Transform) -> Transform {
        Transform {
            x: t.x * self.canvas_px_per_view_px,
            y: t.y * self.canvas_px_per_view_px,
            ..t
        }
    }
}

/// Where a layer image lands on the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
    /// Stretch the image over the whole canvas, then apply `post` in canvas space.
    Fill {
        /// Canvas-space transform applied after the stretch.
        post: Affine,
    },
    /// Centre the image on the origin at native size, then apply `transform`.
    Centered {
        /// Canvas-space transform of the image centre.
        transform: Affine,
    },
}

impl Placement {
    /// Full affine from image pixel space to canvas space for an image of `w x h` pixels.
    pub fn affine_for(self, w: f64, h: f64, canvas: Canvas) -> Affine {
        match self {
            Self::Fill { post } => {
                let sx = if w > 0.0 { f64::from(canvas.width) / w } else { 1.0 };
                let sy = if h > 0.0 { f64::from(canvas.height) / h } else { 1.0 };
                post * Affine::scale_non_uniform(sx, sy)
            }
            Self::Centered { transform } => {
                transform * Affine::translate(Vec2::new(-w / 2.0, -h / 2.0))
            }
        }
    }
}

/// What a layer paints.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerOp {
    /// The camera frame.
    Frame {
        /// Always [`Placement::Fill`] with identity post-transform.
        placement: Placement,
    },
    /// The garment overlay.
    Uniform {
        /// Source overlay.
        overlay: OverlayId,
        /// Image to draw.
        image: AssetRef,
        /// Canvas placement.
        placement: Placement,
    },
    /// A decorative overlay.
    Sticker {
        /// Source overlay.
        overlay: OverlayId,
        /// Image to draw.
        image: AssetRef,
        /// Canvas placement.
        placement: Placement,
    },
}

impl LayerOp {
    /// Placement of this layer.
    pub fn placement(&self) -> Placement {
        match self {
            Self::Frame { placement }
            | Self::Uniform { placement, .. }
            | Self::Sticker { placement, .. } => *placement,
        }
    }

    /// Overlay this layer came from; `None` for the frame.
    pub fn overlay(&self) -> Option<&OverlayId> {
        match self {
            Self::Frame { .. } => None,
            Self::Uniform { overlay, .. } | Self::Sticker { overlay, .. } => Some(overlay),
        }
    }

    /// Image handle for overlay layers.
    pub fn image(&self) -> Option<&AssetRef> {
        match self {
            Self::Frame { .. } => None,
            Self::Uniform { image, .. } | Self::Sticker { image, .. } => Some(image),
        }
    }
}

/// Options that shape plan construction.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlanOptions {
    /// Uniform layer placement.
    pub uniform_placement: UniformPlacement,
    /// Preview-to-canvas offset mapping.
    pub view_mapping: ViewMapping,
}

/// Ordered, back-to-front list of layers for one composite.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositePlan {
    /// Output size.
    pub canvas: Canvas,
    /// Layers in paint order.
    pub layers: Vec<LayerOp>,
}

impl CompositePlan {
    /// Build a plan from a registry snapshot.
    ///
    /// The snapshot order is not trusted: layers are emitted as frame, uniform, then stickers by
    /// insertion sequence. Hidden overlays are dropped.
    pub fn build(canvas: Canvas, snapshot: &[OverlayInstance], opts: PlanOptions) -> Self {
        let mut visible: Vec<&OverlayInstance> = snapshot.iter().filter(|o| o.visible).collect();
        visible.sort_by_key(|o| (o.kind, o.z_order));

        let mut layers = Vec::with_capacity(visible.len() + 1);
        layers.push(LayerOp::Frame {
            placement: Placement::Fill {
                post: Affine::IDENTITY,
            },
        });

        let center = canvas.center();
        for o in visible {
            let t = opts.view_mapping.map(o.transform);
            match o.kind {
                OverlayKind::Uniform => {
                    let post = match opts.uniform_placement {
                        UniformPlacement::Stretch => Affine::IDENTITY,
                        UniformPlacement::FollowTransform => {
                            t.to_affine(center) * Affine::translate(-center.to_vec2())
                        }
                    };
                    layers.push(LayerOp::Uniform {
                        overlay: o.id.clone(),
                        image: o.image.clone(),
                        placement: Placement::Fill { post },
                    });
                }
                OverlayKind::Sticker => layers.push(LayerOp::Sticker {
                    overlay: o.id.clone(),
                    image: o.image.clone(),
                    placement: Placement::Centered {
                        transform: t.to_affine(center),
                    },
                }),
            }
        }

        Self { canvas, layers }
    }

    /// Distinct overlay images referenced by the plan, in first-use order.
    pub fn images(&self) -> Vec<&AssetRef> {
        let mut out: Vec<&AssetRef> = Vec::new();
        for img in self.layers.iter().filter_map(LayerOp::image) {
            if !out.contains(&img) {
                out.push(img);
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
