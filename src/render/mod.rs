//! Layer planning, CPU compositing and the capture pipeline.
//!
//! A capture turns a registry snapshot into a [`plan::CompositePlan`], draws it back to front
//! with [`cpu::Compositor`] and encodes the result. The live preview renders the same plan, so
//! both paths share one paint order.

/// vello_cpu raster target.
pub mod cpu;
/// Async capture pipeline.
pub mod pipeline;
/// Ordered layer list.
pub mod plan;
/// Frame buffers.
pub mod raster;
