use crate::foundation::core::{Affine, Point, Vec2};

/// Smallest scale an overlay may take.
pub const SCALE_MIN: f64 = 0.5;
/// Largest scale an overlay may take.
pub const SCALE_MAX: f64 = 3.0;

/// 2D placement of one overlay relative to the canvas centre.
///
/// `scale` is kept inside `[SCALE_MIN, SCALE_MAX]` by every mutation path. `rotation_deg` is
/// unbounded; use [`Transform::display_rotation`] when a normalised value is needed.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform {
    /// Horizontal offset from the anchor, in pixels.
    pub x: f64,
    /// Vertical offset from the anchor, in pixels.
    pub y: f64,
    /// Uniform scale factor.
    pub scale: f64,
    /// Clockwise rotation in degrees (y axis points down).
    pub rotation_deg: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Incremental change produced by one gesture tick.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransformDelta {
    /// Horizontal pan.
    pub dx: f64,
    /// Vertical pan.
    pub dy: f64,
    /// Multiplicative scale change.
    pub d_scale: f64,
    /// Additive rotation change in degrees.
    pub d_rotation_deg: f64,
}

impl Default for TransformDelta {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TransformDelta {
    /// The delta that leaves a transform unchanged.
    pub const IDENTITY: Self = Self {
        dx: 0.0,
        dy: 0.0,
        d_scale: 1.0,
        d_rotation_deg: 0.0,
    };

    /// Translation-only delta.
    pub fn pan(dx: f64, dy: f64) -> Self {
        Self {
            dx,
            dy,
            ..Self::IDENTITY
        }
    }

    /// Scale/rotation-only delta.
    pub fn pinch(d_scale: f64, d_rotation_deg: f64) -> Self {
        Self {
            d_scale,
            d_rotation_deg,
            ..Self::IDENTITY
        }
    }

    /// Return `true` when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.dx.is_finite()
            && self.dy.is_finite()
            && self.d_scale.is_finite()
            && self.d_rotation_deg.is_finite()
    }
}

impl Transform {
    /// Freshly placed overlay: centred, unscaled, unrotated.
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        scale: 1.0,
        rotation_deg: 0.0,
    };

    /// Build a transform, clamping `scale` into the legal range.
    pub fn new(x: f64, y: f64, scale: f64, rotation_deg: f64) -> Self {
        Self {
            x,
            y,
            scale: clamp_scale(scale),
            rotation_deg,
        }
    }

    /// Apply one gesture delta.
    ///
    /// Non-finite deltas are dropped whole so malformed input can never corrupt state.
    pub fn apply(self, delta: TransformDelta) -> Self {
        if !delta.is_finite() {
            tracing::debug!(?delta, "dropping non-finite transform delta");
            return self;
        }
        Self {
            x: self.x + delta.dx,
            y: self.y + delta.dy,
            scale: clamp_scale(self.scale * delta.d_scale),
            rotation_deg: self.rotation_deg + delta.d_rotation_deg,
        }
    }

    /// Rotation normalised into `[0, 360)` for display.
    pub fn display_rotation(&self) -> f64 {
        let r = self.rotation_deg.rem_euclid(360.0);
        if r >= 360.0 { 0.0 } else { r }
    }

    /// Offset from the anchor as a vector.
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Placement affine for content centred on the local origin.
    ///
    /// Canonical order: `T(anchor + offset) * R(rotation) * S(scale)`.
    pub fn to_affine(&self, anchor: Point) -> Affine {
        Affine::translate(anchor.to_vec2() + self.offset())
            * Affine::rotate(self.rotation_deg.to_radians())
            * Affine::scale(self.scale)
    }
}

fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return 1.0;
    }
    scale.clamp(SCALE_MIN, SCALE_MAX)
}

#[cfg(test)]
#[path = "../../tests/unit/transform/model.rs"]
mod tests;
