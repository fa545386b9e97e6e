use std::path::Path;
use std::sync::RwLock;

use anyhow::Context;

use crate::assets::decode::decode_image;
use crate::foundation::core::Canvas;
use crate::foundation::error::BoothResult;
use crate::foundation::math::mul_div255_u8;
use crate::render::raster::FrameRGBA;

/// Read-only view of the latest camera frame.
///
/// Acquisition is driven elsewhere; callers only sample the most recent frame. `None` (or a
/// frame with zero dimensions) means no frame is available yet.
pub trait FrameSource: Send + Sync {
    /// Latest frame at native resolution.
    fn current_frame(&self) -> Option<FrameRGBA>;
}

/// Always returns the same frame.
#[derive(Clone, Debug)]
pub struct StillFrameSource {
    frame: FrameRGBA,
}

impl StillFrameSource {
    /// Wrap a decoded frame.
    pub fn new(frame: FrameRGBA) -> Self {
        Self { frame }
    }

    /// Decode an encoded image (PNG, JPEG, ...).
    pub fn from_encoded(bytes: &[u8]) -> BoothResult<Self> {
        Ok(Self::new(FrameRGBA::from(decode_image(bytes)?)))
    }

    /// Read and decode an image file.
    pub fn from_path(path: &Path) -> BoothResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read frame '{}'", path.display()))?;
        Self::from_encoded(&bytes)
    }
}

impl FrameSource for StillFrameSource {
    fn current_frame(&self) -> Option<FrameRGBA> {
        Some(self.frame.clone())
    }
}

/// Holds whatever frame a camera wrapper published last.
#[derive(Debug, Default)]
pub struct LatestFrameSource {
    latest: RwLock<Option<FrameRGBA>>,
}

impl LatestFrameSource {
    /// Create a source with no frame yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current frame.
    pub fn publish(&self, frame: FrameRGBA) {
        match self.latest.write() {
            Ok(mut guard) => *guard = Some(frame),
            Err(poisoned) => *poisoned.into_inner() = Some(frame),
        }
    }

    /// Drop the current frame (camera stopped).
    pub fn clear(&self) {
        match self.latest.write() {
            Ok(mut guard) => *guard = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }
}

impl FrameSource for LatestFrameSource {
    fn current_frame(&self) -> Option<FrameRGBA> {
        match self.latest.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

const SLATE_300: [u8; 3] = [203, 213, 225];
const SLATE_500: [u8; 3] = [100, 116, 139];
// black at 20% inside a 30% opacity layer
const SILHOUETTE_ALPHA: u16 = 15;

/// Synthetic camera view used when no real camera is available.
///
/// A diagonal slate gradient with a faint person-shaped silhouette at the bottom centre.
/// Output is deterministic for a given canvas.
#[derive(Clone, Copy, Debug)]
pub struct MockFrameSource {
    canvas: Canvas,
}

impl Default for MockFrameSource {
    fn default() -> Self {
        Self::new(Canvas::FALLBACK)
    }
}

impl MockFrameSource {
    /// Mock frames of `canvas` size.
    pub fn new(canvas: Canvas) -> Self {
        Self { canvas }
    }

    /// Render one mock frame.
    pub fn render(&self) -> FrameRGBA {
        let (w, h) = (self.canvas.width, self.canvas.height);
        let mut data = Vec::with_capacity(self.canvas.rgba8_len());

        let sil_w = f64::from(w) / 5.0;
        let sil_h = f64::from(h) * 8.0 / 15.0;
        let radius = sil_w / 2.0;
        let cx = f64::from(w) / 2.0;
        let top = f64::from(h) - sil_h;
        let denom = f64::from(w.saturating_sub(1) + h.saturating_sub(1)).max(1.0);

        for y in 0..h {
            for x in 0..w {
                let t = f64::from(x + y) / denom;
                let mut px = [0u8; 3];
                for (c, out) in px.iter_mut().enumerate() {
                    let a = f64::from(SLATE_300[c]);
                    let b = f64::from(SLATE_500[c]);
                    *out = (a + (b - a) * t).round() as u8;
                }

                let (fx, fy) = (f64::from(x) + 0.5, f64::from(y) + 0.5);
                let in_body = (fx - cx).abs() <= radius && fy >= top + radius;
                let in_head = (fx - cx).hypot(fy - (top + radius)) <= radius;
                if in_body || in_head {
                    for c in &mut px {
                        *c = mul_div255_u8(u16::from(*c), 255 - SILHOUETTE_ALPHA);
                    }
                }
                data.extend_from_slice(&[px[0], px[1], px[2], 255]);
            }
        }

        FrameRGBA {
            width: w,
            height: h,
            data,
            premultiplied: true,
        }
    }
}

impl FrameSource for MockFrameSource {
    fn current_frame(&self) -> Option<FrameRGBA> {
        Some(self.render())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/frame.rs"]
mod tests;
