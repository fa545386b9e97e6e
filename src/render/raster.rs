use crate::assets::decode::PreparedImage;
use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::error::{BoothError, BoothResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// A frame as RGBA8 pixels.
///
/// Frames produced by the compositor are **premultiplied alpha**. The `premultiplied` flag is
/// included to make this explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// A frame filled with one color.
    pub fn solid(canvas: Canvas, color: Rgba8Premul) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: color.to_array().repeat(canvas.width as usize * canvas.height as usize),
            premultiplied: true,
        }
    }

    /// Wrap straight-alpha RGBA8 bytes, premultiplying them.
    pub fn from_straight_rgba8(width: u32, height: u32, mut data: Vec<u8>) -> BoothResult<Self> {
        if data.len() != (width as usize) * (height as usize) * 4 {
            return Err(BoothError::validation("frame byte length mismatch"));
        }
        premultiply_rgba8_in_place(&mut data);
        Ok(Self {
            width,
            height,
            data,
            premultiplied: true,
        })
    }

    /// Frame dimensions as reported by the source (may be zero).
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Return `true` when the frame has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Read one pixel; out-of-bounds reads return transparent black.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0, 0];
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        match self.data.get(i..i + 4) {
            Some(px) => [px[0], px[1], px[2], px[3]],
            None => [0, 0, 0, 0],
        }
    }

    /// Convert into a premultiplied image usable as a draw source.
    pub fn to_prepared_image(&self) -> BoothResult<PreparedImage> {
        let mut data = self.data.clone();
        if !self.premultiplied {
            premultiply_rgba8_in_place(&mut data);
        }
        PreparedImage::from_premul_bytes(self.width, self.height, data)
    }
}

impl From<PreparedImage> for FrameRGBA {
    fn from(img: PreparedImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            data: std::sync::Arc::unwrap_or_clone(img.rgba8_premul),
            premultiplied: true,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
