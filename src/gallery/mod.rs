//! In-memory gallery of captured stills.

/// Gallery store trait and helpers.
pub mod store;
