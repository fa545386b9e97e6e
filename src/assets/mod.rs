//! Overlay asset handles, byte sources and decoding.

/// Encoded bytes to premultiplied rasters.
pub mod decode;
/// Asset handles and asynchronous byte sources.
pub mod loader;
