//! Multi-contact gesture interpretation.

/// Contact sets to transform deltas.
pub mod interpreter;
