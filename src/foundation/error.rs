/// Convenience result type used across the crate.
pub type BoothResult<T> = Result<T, BoothError>;

/// Top-level error taxonomy used by public APIs.
///
/// Races between fast input and asynchronous state changes (rejected gestures, missing overlays,
/// assets that fail to load during a capture) are not errors; they are reported as outcome values.
#[derive(thiserror::Error, Debug)]
pub enum BoothError {
    /// Invalid user-provided, manifest or scene data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An asset could not be read or decoded.
    #[error("asset error: {0}")]
    Asset(String),

    /// A raster could not be produced or drawn.
    #[error("render error: {0}")]
    Render(String),

    /// The composited raster could not be serialized to a still image.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The capture was aborted before it completed.
    #[error("capture cancelled")]
    Cancelled,

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BoothError {
    /// Build a [`BoothError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BoothError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`BoothError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`BoothError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build a [`BoothError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
