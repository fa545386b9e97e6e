//! Camera frame providers.

/// Frame source trait and implementations.
pub mod frame;
