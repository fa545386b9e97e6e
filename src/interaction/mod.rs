//! Mutual exclusion of gesture input between overlays.

/// The interaction lock.
pub mod arbiter;
