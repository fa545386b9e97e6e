//! Still-image encoding of composited frames.

/// JPEG/PNG encoder.
pub mod still;
