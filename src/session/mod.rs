//! Application state for one booth view.

/// Session controller and events.
pub mod booth;
/// Scripted scenes for batch captures.
pub mod scene;
