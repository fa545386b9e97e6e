//! Photobooth is the engine behind a uniform try-on photo booth.
//!
//! A camera frame is shown with a garment overlay (the "uniform") and any number of decorative
//! stickers on top. Overlays are moved, scaled and rotated with one- and two-finger gestures;
//! only one overlay can be manipulated at a time. A capture composites the frame and every
//! overlay into one still, back to front, and encodes it.
//!
//! - Build a [`BoothSession`] from a [`BoothManifest`]
//! - Feed it [`BoothEvent`]s (selections, gesture ticks, toggles)
//! - Call [`BoothSession::capture`] to emit a [`CapturedFrame`] into a [`GalleryStore`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Asset loading and decoding.
pub mod assets;
/// Catalog manifest and capture settings.
pub mod catalog;
/// Still-image encoding.
pub mod encode;
/// Captured-frame gallery.
pub mod gallery;
/// Gesture interpretation.
pub mod gesture;
/// Interaction lock.
pub mod interaction;
/// Overlay registry.
pub mod overlay;
/// Compositing.
pub mod render;
/// Booth application state.
pub mod session;
/// Camera frame sources.
pub mod source;
/// Overlay placement model.
pub mod transform;

pub use crate::foundation::core::{Affine, Canvas, OverlayId, Point, Rect, Rgba8Premul, Vec2};
pub use crate::foundation::error::{BoothError, BoothResult};

pub use crate::assets::decode::PreparedImage;
pub use crate::assets::loader::{AssetRef, AssetSource, FsAssetSource, MemoryAssetSource};
pub use crate::catalog::manifest::{
    BoothManifest, CaptureConfig, SchoolCategory, StickerEntry, UniformEntry, UniformKind,
};
pub use crate::encode::still::{StillFormat, encode_still};
pub use crate::gallery::store::{GalleryStore, InMemoryGallery, badge_label, download_file_name};
pub use crate::gesture::interpreter::{GestureInterpreter, GestureOutcome};
pub use crate::interaction::arbiter::InteractionArbiter;
pub use crate::overlay::registry::{OverlayInstance, OverlayKind, OverlayRegistry};
pub use crate::render::cpu::Compositor;
pub use crate::render::pipeline::{
    CancelToken, CaptureMeta, CaptureOptions, CaptureOutput, CaptureReport, CapturePipeline,
    CapturedFrame, SkipReason, SkippedLayer,
};
pub use crate::render::plan::{CompositePlan, LayerOp, PlanOptions, UniformPlacement, ViewMapping};
pub use crate::render::raster::FrameRGBA;
pub use crate::session::booth::{BoothEvent, BoothSession, CameraMode, CaptureJob, EventEffect};
pub use crate::session::scene::{GestureTarget, GestureTick, Scene, SceneSticker};
pub use crate::source::frame::{FrameSource, LatestFrameSource, MockFrameSource, StillFrameSource};
pub use crate::transform::model::{SCALE_MAX, SCALE_MIN, Transform, TransformDelta};
