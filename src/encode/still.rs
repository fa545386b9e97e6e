use image::ImageEncoder;

use crate::foundation::error::{BoothError, BoothResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::render::raster::FrameRGBA;

/// Default JPEG quality, on the encoder's 1..=100 scale.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Compressed still format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StillFormat {
    /// Lossy, opaque. Alpha is flattened onto black.
    #[default]
    Jpeg,
    /// Lossless with straight alpha.
    Png,
}

impl StillFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    /// MIME type of the encoded bytes.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// Encode a composited frame.
///
/// `quality` applies to JPEG only and must be in `1..=100`.
#[tracing::instrument(level = "debug", skip(frame), fields(width = frame.width, height = frame.height))]
pub fn encode_still(frame: &FrameRGBA, format: StillFormat, quality: u8) -> BoothResult<Vec<u8>> {
    if frame.is_empty() {
        return Err(BoothError::encoding("frame has no pixels"));
    }
    if frame.data.len() != (frame.width as usize) * (frame.height as usize) * 4 {
        return Err(BoothError::encoding("frame byte length mismatch"));
    }

    let mut out = Vec::new();
    match format {
        StillFormat::Jpeg => {
            if !(1..=100).contains(&quality) {
                return Err(BoothError::encoding(format!(
                    "jpeg quality must be in 1..=100, got {quality}"
                )));
            }
            // Premultiplied colour over opaque black is the colour itself.
            let mut rgb = Vec::with_capacity(frame.data.len() / 4 * 3);
            if frame.premultiplied {
                for px in frame.data.chunks_exact(4) {
                    rgb.extend_from_slice(&px[0..3]);
                }
            } else {
                for px in frame.data.chunks_exact(4) {
                    let a = u16::from(px[3]);
                    rgb.extend(
                        px[0..3]
                            .iter()
                            .map(|&c| crate::foundation::math::mul_div255_u8(u16::from(c), a)),
                    );
                }
            }
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality)
                .write_image(&rgb, frame.width, frame.height, image::ExtendedColorType::Rgb8)
                .map_err(|e| BoothError::encoding(format!("jpeg: {e}")))?;
        }
        StillFormat::Png => {
            let mut rgba = frame.data.clone();
            if frame.premultiplied {
                unpremultiply_rgba8_in_place(&mut rgba);
            }
            image::codecs::png::PngEncoder::new(&mut out)
                .write_image(&rgba, frame.width, frame.height, image::ExtendedColorType::Rgba8)
                .map_err(|e| BoothError::encoding(format!("png: {e}")))?;
        }
    }
    tracing::debug!(format = ?format, bytes = out.len(), "still encoded");
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/still.rs"]
mod tests;
