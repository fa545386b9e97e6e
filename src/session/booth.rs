use std::collections::HashMap;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::assets::decode::PreparedImage;
use crate::assets::loader::{AssetRef, AssetSource};
use crate::catalog::manifest::{BoothManifest, SchoolCategory};
use crate::foundation::core::{OverlayId, Point};
use crate::foundation::error::{BoothError, BoothResult};
use crate::gallery::store::GalleryStore;
use crate::gesture::interpreter::{GestureInterpreter, GestureOutcome};
use crate::overlay::registry::{OverlayInstance, OverlayKind, OverlayRegistry};
use crate::render::cpu::Compositor;
use crate::render::pipeline::{
    CancelToken, CaptureMeta, CaptureOptions, CaptureOutput, CapturePipeline,
};
use crate::render::plan::CompositePlan;
use crate::render::raster::FrameRGBA;
use crate::source::frame::FrameSource;
use crate::transform::model::Transform;

/// Which camera feeds the booth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CameraMode {
    /// Real camera.
    #[default]
    Live,
    /// Synthetic view.
    Mock,
}

/// User input understood by [`BoothSession::apply`].
#[derive(Clone, Debug, PartialEq)]
pub enum BoothEvent {
    /// Switch the uniform selector's school level.
    SelectCategory(SchoolCategory),
    /// Wear the uniform with this catalog id.
    SelectUniform(String),
    /// Show or hide the uniform layer.
    ToggleUniformVisible,
    /// Place the sticker with this catalog id.
    AddSticker(String),
    /// Delete one overlay.
    RemoveOverlay(OverlayId),
    /// Delete every sticker.
    ResetStickers,
    /// Contacts currently down on one overlay's hit region.
    Gesture {
        /// Target overlay.
        overlay: OverlayId,
        /// Contact points in view space.
        contacts: SmallVec<[Point; 2]>,
    },
    /// Set or clear the visual filter tag.
    SetFilter(Option<String>),
    /// Switch between live and mock camera.
    ToggleCamera,
    /// The view is going away.
    Teardown,
}

/// State change produced by one event.
#[derive(Clone, Debug, PartialEq)]
pub enum EventEffect {
    /// Nothing changed.
    Unchanged,
    /// Selector category changed.
    CategoryChanged(SchoolCategory),
    /// A new uniform overlay replaced the previous one.
    UniformSelected(OverlayInstance),
    /// Uniform visibility is now this value.
    UniformVisibility(bool),
    /// A sticker was placed.
    StickerAdded(OverlayInstance),
    /// An overlay was deleted.
    OverlayRemoved(OverlayId),
    /// This many stickers were deleted.
    StickersCleared(usize),
    /// A gesture tick was interpreted (and any delta applied).
    Gesture(GestureOutcome),
    /// The filter tag changed.
    FilterChanged(Option<String>),
    /// The camera mode changed.
    CameraChanged(CameraMode),
    /// In-flight captures were cancelled and interaction state cleared.
    TornDown,
}

/// Point-in-time capture request, detached from the session.
///
/// The session can keep processing events (including [`BoothEvent::Teardown`], which cancels
/// this job) while the job runs.
#[derive(Debug)]
pub struct CaptureJob {
    pipeline: Arc<CapturePipeline>,
    snapshot: Vec<OverlayInstance>,
    meta: CaptureMeta,
    cancel: CancelToken,
}

impl CaptureJob {
    /// Overlays captured by this job, back to front.
    pub fn snapshot(&self) -> &[OverlayInstance] {
        &self.snapshot
    }

    /// Composite, encode and hand the frame to `gallery`.
    ///
    /// The gallery is only touched when the capture succeeds.
    pub async fn run(
        self,
        frames: &dyn FrameSource,
        assets: &dyn AssetSource,
        gallery: &mut dyn GalleryStore,
    ) -> BoothResult<CaptureOutput> {
        let out = self
            .pipeline
            .capture(frames, &self.snapshot, self.meta, assets, &self.cancel)
            .await?;
        gallery.push(out.frame.clone());
        Ok(out)
    }
}

/// Explicit state of one booth view: catalog, overlays, gestures and UI toggles.
#[derive(Debug)]
pub struct BoothSession {
    manifest: BoothManifest,
    registry: OverlayRegistry,
    gestures: GestureInterpreter,
    category: SchoolCategory,
    selected_uniform: Option<String>,
    filter: Option<String>,
    camera: CameraMode,
    pipeline: Arc<CapturePipeline>,
    cancel: CancelToken,
}

impl BoothSession {
    /// Start a session with the manifest's capture settings.
    pub fn new(manifest: BoothManifest) -> Self {
        let opts = manifest.capture.to_options();
        Self::with_options(manifest, opts)
    }

    /// Start a session with explicit capture options.
    pub fn with_options(manifest: BoothManifest, opts: CaptureOptions) -> Self {
        Self {
            manifest,
            registry: OverlayRegistry::new(),
            gestures: GestureInterpreter::new(),
            category: SchoolCategory::default(),
            selected_uniform: None,
            filter: None,
            camera: CameraMode::default(),
            pipeline: Arc::new(CapturePipeline::new(opts)),
            cancel: CancelToken::new(),
        }
    }

    /// Apply one event.
    ///
    /// Unknown catalog ids are validation errors. Races (gestures or removals for overlays that
    /// are already gone) are reported as [`EventEffect::Unchanged`].
    pub fn apply(&mut self, event: BoothEvent) -> BoothResult<EventEffect> {
        match event {
            BoothEvent::SelectCategory(category) => {
                if category == self.category {
                    return Ok(EventEffect::Unchanged);
                }
                self.category = category;
                Ok(EventEffect::CategoryChanged(category))
            }
            BoothEvent::SelectUniform(id) => {
                let entry = self
                    .manifest
                    .uniform(&id)
                    .ok_or_else(|| BoothError::validation(format!("unknown uniform '{id}'")))?;
                let (image, name) = (entry.image.clone(), entry.name.clone());
                if let Some(old) = self.registry.uniform() {
                    self.gestures.forget(&old.id);
                }
                let inst = self.registry.set_uniform(image, name);
                self.selected_uniform = Some(id);
                Ok(EventEffect::UniformSelected(inst))
            }
            BoothEvent::ToggleUniformVisible => {
                let Some(visible) = self.registry.uniform().map(|u| !u.visible) else {
                    return Ok(EventEffect::Unchanged);
                };
                if !visible && let Some(u) = self.registry.uniform() {
                    let id = u.id.clone();
                    self.gestures.forget(&id);
                    self.registry.arbiter_mut().release(&id);
                }
                self.registry.set_uniform_visible(visible);
                Ok(EventEffect::UniformVisibility(visible))
            }
            BoothEvent::AddSticker(id) => {
                let entry = self
                    .manifest
                    .sticker(&id)
                    .ok_or_else(|| BoothError::validation(format!("unknown sticker '{id}'")))?;
                let (image, name) = (entry.image.clone(), entry.name.clone());
                Ok(EventEffect::StickerAdded(
                    self.registry.add_sticker(image, name),
                ))
            }
            BoothEvent::RemoveOverlay(id) => {
                self.gestures.forget(&id);
                match self.registry.remove_overlay(&id) {
                    Some(removed) => {
                        if removed.kind == OverlayKind::Uniform {
                            self.selected_uniform = None;
                        }
                        Ok(EventEffect::OverlayRemoved(id))
                    }
                    None => Ok(EventEffect::Unchanged),
                }
            }
            BoothEvent::ResetStickers => {
                for s in self.registry.stickers() {
                    self.gestures.forget(&s.id);
                }
                Ok(EventEffect::StickersCleared(
                    self.registry.remove_all_stickers(),
                ))
            }
            BoothEvent::Gesture { overlay, contacts } => {
                // Missing or hidden overlays have no hit region.
                if !self.registry.get(&overlay).is_some_and(|o| o.visible) {
                    self.gestures.forget(&overlay);
                    self.registry.arbiter_mut().release(&overlay);
                    return Ok(EventEffect::Unchanged);
                }
                let outcome = self
                    .gestures
                    .tick(&overlay, &contacts, self.registry.arbiter_mut());
                if let GestureOutcome::Delta(delta) = outcome {
                    self.registry.update_overlay(&overlay, delta);
                }
                Ok(EventEffect::Gesture(outcome))
            }
            BoothEvent::SetFilter(tag) => {
                let tag = tag.filter(|t| !t.trim().is_empty());
                if tag == self.filter {
                    return Ok(EventEffect::Unchanged);
                }
                self.filter = tag.clone();
                Ok(EventEffect::FilterChanged(tag))
            }
            BoothEvent::ToggleCamera => {
                self.camera = match self.camera {
                    CameraMode::Live => CameraMode::Mock,
                    CameraMode::Mock => CameraMode::Live,
                };
                Ok(EventEffect::CameraChanged(self.camera))
            }
            BoothEvent::Teardown => {
                self.teardown();
                Ok(EventEffect::TornDown)
            }
        }
    }

    /// Place an overlay at an absolute transform. Returns whether the overlay exists.
    pub fn place_overlay(&mut self, id: &OverlayId, transform: Transform) -> bool {
        self.registry.set_transform(id, transform)
    }

    /// Cancel in-flight captures and clear gesture sessions and the interaction lock.
    pub fn teardown(&mut self) {
        tracing::info!("booth view torn down");
        self.cancel.cancel();
        self.cancel = CancelToken::new();
        self.gestures.reset();
        self.registry.arbiter_mut().reset();
    }

    /// Freeze the current overlays and metadata into a capture job.
    pub fn prepare_capture(&self) -> CaptureJob {
        let uniform_name = self
            .registry
            .uniform()
            .filter(|u| u.visible)
            .map(|u| u.name.clone());
        CaptureJob {
            pipeline: Arc::clone(&self.pipeline),
            snapshot: self.registry.snapshot(),
            meta: CaptureMeta {
                uniform_name,
                filter_tag: self.filter.clone(),
            },
            cancel: self.cancel.clone(),
        }
    }

    /// Capture now and push the result into `gallery`.
    pub async fn capture(
        &self,
        frames: &dyn FrameSource,
        assets: &dyn AssetSource,
        gallery: &mut dyn GalleryStore,
    ) -> BoothResult<CaptureOutput> {
        self.prepare_capture().run(frames, assets, gallery).await
    }

    /// Render the live view from already-decoded overlay images.
    pub fn render_preview(
        &self,
        frame: Option<&FrameRGBA>,
        images: &HashMap<AssetRef, PreparedImage>,
    ) -> BoothResult<FrameRGBA> {
        let opts = self.pipeline.options();
        let canvas = frame
            .map(FrameRGBA::canvas)
            .unwrap_or(opts.fallback_canvas)
            .or_fallback(opts.fallback_canvas);
        let plan = CompositePlan::build(canvas, &self.registry.snapshot(), opts.plan);
        Compositor::render_preview(frame, &plan, images)
    }

    /// Catalog in use.
    pub fn manifest(&self) -> &BoothManifest {
        &self.manifest
    }

    /// Overlays and interaction lock.
    pub fn registry(&self) -> &OverlayRegistry {
        &self.registry
    }

    /// Gesture sessions.
    pub fn gestures(&self) -> &GestureInterpreter {
        &self.gestures
    }

    /// Selector category.
    pub fn category(&self) -> SchoolCategory {
        self.category
    }

    /// Catalog id of the worn uniform.
    pub fn selected_uniform(&self) -> Option<&str> {
        self.selected_uniform.as_deref()
    }

    /// Active filter tag.
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Camera mode last chosen with [`BoothEvent::ToggleCamera`].
    ///
    /// The session does not own a camera. Hosts read this to decide which source to pass to
    /// [`BoothSession::capture`], or use [`BoothSession::frame_source`].
    pub fn camera_mode(&self) -> CameraMode {
        self.camera
    }

    /// Pick the source matching the current camera mode.
    pub fn frame_source<'a>(
        &self,
        live: &'a dyn FrameSource,
        mock: &'a dyn FrameSource,
    ) -> &'a dyn FrameSource {
        match self.camera {
            CameraMode::Live => live,
            CameraMode::Mock => mock,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/booth.rs"]
mod tests;
