use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::assets::loader::AssetRef;
use crate::foundation::core::{Affine, Canvas, Rgba8Premul};
use crate::foundation::error::{BoothError, BoothResult};
use crate::render::plan::{CompositePlan, LayerOp, Placement};
use crate::render::raster::FrameRGBA;

/// CPU raster target that draws image layers back to front.
///
/// Layers are recorded into a `vello_cpu` context in call order and rasterized once in
/// [`Compositor::finish`], so draw order is exactly call order.
pub struct Compositor {
    canvas: Canvas,
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    layers: usize,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("canvas", &self.canvas)
            .field("layers", &self.layers)
            .finish_non_exhaustive()
    }
}

impl Compositor {
    /// Allocate a target of `canvas` size.
    pub fn new(canvas: Canvas) -> BoothResult<Self> {
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| BoothError::render("canvas width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| BoothError::render("canvas height exceeds u16"))?;
        if width == 0 || height == 0 {
            return Err(BoothError::render("canvas dimensions must be > 0"));
        }
        Ok(Self {
            canvas,
            width,
            height,
            ctx: vello_cpu::RenderContext::new(width, height),
            layers: 0,
        })
    }

    /// Output size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Number of layers drawn so far.
    pub fn layers_drawn(&self) -> usize {
        self.layers
    }

    /// Draw `image` with the given placement.
    pub fn draw_image(&mut self, image: &PreparedImage, placement: Placement) -> BoothResult<()> {
        let (w, h) = (f64::from(image.width), f64::from(image.height));
        let transform = placement.affine_for(w, h, self.canvas);
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(image_to_pixmap(image)?)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.set_paint(paint);
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
        self.layers += 1;
        Ok(())
    }

    /// Draw the camera frame stretched over the full canvas.
    pub fn draw_frame(&mut self, frame: &FrameRGBA) -> BoothResult<()> {
        let image = frame.to_prepared_image()?;
        self.draw_image(
            &image,
            Placement::Fill {
                post: Affine::IDENTITY,
            },
        )
    }

    /// Rasterize every recorded layer into a premultiplied frame.
    pub fn finish(mut self) -> BoothResult<FrameRGBA> {
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        let data = pixmap.data_as_u8_slice().to_vec();
        if data.len() != self.canvas.rgba8_len() {
            return Err(BoothError::render("rendered pixmap byte length mismatch"));
        }
        Ok(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data,
            premultiplied: true,
        })
    }

    /// Render a plan synchronously from already-decoded images.
    ///
    /// Used for the live view. Overlay images missing from `images` are not drawn yet; a missing
    /// frame paints opaque black.
    pub fn render_preview(
        frame: Option<&FrameRGBA>,
        plan: &CompositePlan,
        images: &HashMap<AssetRef, PreparedImage>,
    ) -> BoothResult<FrameRGBA> {
        let mut target = Self::new(plan.canvas)?;
        for layer in &plan.layers {
            match layer {
                LayerOp::Frame { .. } => match frame.filter(|f| !f.is_empty()) {
                    Some(f) => target.draw_frame(f)?,
                    None => target.draw_frame(&black_frame(plan.canvas))?,
                },
                LayerOp::Uniform { image, placement, .. }
                | LayerOp::Sticker { image, placement, .. } => {
                    if let Some(img) = images.get(image) {
                        target.draw_image(img, *placement)?;
                    }
                }
            }
        }
        target.finish()
    }
}

pub(crate) fn black_frame(canvas: Canvas) -> FrameRGBA {
    FrameRGBA::solid(canvas, Rgba8Premul::opaque(0, 0, 0))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn image_to_pixmap(image: &PreparedImage) -> BoothResult<vello_cpu::Pixmap> {
    let w: u16 = image
        .width
        .try_into()
        .map_err(|_| BoothError::render("image width exceeds u16"))?;
    let h: u16 = image
        .height
        .try_into()
        .map_err(|_| BoothError::render("image height exceeds u16"))?;

    let mut may_have_opacities = false;
    let pixels: Vec<vello_cpu::peniko::color::PremulRgba8> = image
        .rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect();
    if pixels.len() != usize::from(w) * usize::from(h) {
        return Err(BoothError::render("prepared image byte length mismatch"));
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
