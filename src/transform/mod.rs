//! Overlay transform state and its legal range.

/// Transform value type and delta application.
pub mod model;
