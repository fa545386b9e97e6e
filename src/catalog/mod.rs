//! Booth catalog and capture configuration.

/// JSON manifest model.
pub mod manifest;
