//! Placed overlay layers and their paint order.

/// Overlay collection.
pub mod registry;
