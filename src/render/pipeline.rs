use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crate::assets::decode::decode_asset;
use crate::assets::loader::{AssetRef, AssetSource};
use crate::encode::still::{DEFAULT_JPEG_QUALITY, StillFormat, encode_still};
use crate::foundation::core::{Canvas, OverlayId};
use crate::foundation::error::{BoothError, BoothResult};
use crate::overlay::registry::OverlayInstance;
use crate::render::cpu::{Compositor, black_frame};
use crate::render::plan::{CompositePlan, LayerOp, PlanOptions};
use crate::render::raster::FrameRGBA;
use crate::source::frame::FrameSource;

/// Default upper bound on a single layer's asset load.
pub const DEFAULT_ASSET_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Capture-time options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptureOptions {
    /// Per-layer load timeout. A layer that does not load in time is skipped.
    pub asset_timeout: Duration,
    /// Output size when the frame source reports no pixels.
    pub fallback_canvas: Canvas,
    /// Layer placement options.
    pub plan: PlanOptions,
    /// Output encoding.
    pub format: StillFormat,
    /// JPEG quality in `1..=100`.
    pub jpeg_quality: u8,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            asset_timeout: DEFAULT_ASSET_TIMEOUT,
            fallback_canvas: Canvas::FALLBACK,
            plan: PlanOptions::default(),
            format: StillFormat::Jpeg,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: tokio::sync::Notify,
}

/// Shared flag used to abort in-flight captures.
///
/// Clones observe the same state. Once cancelled a token stays cancelled.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    inner: Arc<CancelState>,
}

impl CancelToken {
    /// Create a live token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel every capture holding a clone of this token.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Return `true` once [`CancelToken::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve when the token is cancelled.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    fn check(&self) -> BoothResult<()> {
        if self.is_cancelled() {
            return Err(BoothError::Cancelled);
        }
        Ok(())
    }
}

/// Descriptive metadata attached to a capture.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaptureMeta {
    /// Name of the uniform shown in the capture.
    pub uniform_name: Option<String>,
    /// Active filter tag.
    pub filter_tag: Option<String>,
}

/// Why an overlay layer was left out of a composite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The asset did not load within the configured timeout.
    TimedOut,
    /// The asset source returned an error.
    LoadFailed(String),
    /// The bytes were not a decodable image.
    DecodeFailed(String),
}

/// One overlay layer that was skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedLayer {
    /// Overlay the layer belongs to.
    pub overlay: OverlayId,
    /// Image that failed.
    pub image: AssetRef,
    /// Failure kind.
    pub reason: SkipReason,
}

/// What happened while compositing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaptureReport {
    /// Overlays drawn, in paint order.
    pub drawn: Vec<OverlayId>,
    /// Overlays skipped, in paint order.
    pub skipped: Vec<SkippedLayer>,
    /// Whether a black frame stood in for a missing camera frame.
    pub fallback_frame: bool,
}

/// Composite before encoding.
#[derive(Clone, Debug, PartialEq)]
pub struct Composite {
    /// Premultiplied output pixels.
    pub frame: FrameRGBA,
    /// Per-layer outcome.
    pub report: CaptureReport,
}

/// Encoded still plus metadata. Immutable once produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedFrame {
    /// Unique capture id.
    pub id: String,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// Encoding of `bytes`.
    pub format: StillFormat,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Capture time, milliseconds since the Unix epoch (UTC).
    pub timestamp_millis: i64,
    /// Name of the uniform shown, if any.
    pub uniform_name: Option<String>,
    /// Active filter tag, if any.
    pub filter_tag: Option<String>,
}

/// Result of [`CapturePipeline::capture`].
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureOutput {
    /// The emitted still.
    pub frame: CapturedFrame,
    /// Per-layer outcome.
    pub report: CaptureReport,
}

/// Sequential load-then-draw compositor for captures.
#[derive(Debug, Default)]
pub struct CapturePipeline {
    opts: CaptureOptions,
    seq: AtomicU64,
}

impl CapturePipeline {
    /// Create a pipeline with the given options.
    pub fn new(opts: CaptureOptions) -> Self {
        Self {
            opts,
            seq: AtomicU64::new(0),
        }
    }

    /// Options in effect.
    pub fn options(&self) -> &CaptureOptions {
        &self.opts
    }

    /// Composite the current frame and `snapshot` without encoding.
    ///
    /// Each overlay layer is loaded, decoded and drawn before the next one starts. Layers whose
    /// asset fails or times out are skipped and recorded in the report. Cancellation is checked
    /// before every load and draw.
    #[tracing::instrument(level = "debug", skip_all, fields(overlays = snapshot.len()))]
    pub async fn composite(
        &self,
        frames: &dyn FrameSource,
        snapshot: &[OverlayInstance],
        assets: &dyn AssetSource,
        cancel: &CancelToken,
    ) -> BoothResult<Composite> {
        cancel.check()?;
        let mut report = CaptureReport::default();

        let source = frames.current_frame().filter(|f| !f.is_empty());
        let frame = match source {
            Some(f) => f,
            None => {
                tracing::warn!(
                    width = self.opts.fallback_canvas.width,
                    height = self.opts.fallback_canvas.height,
                    "no source frame; compositing over black"
                );
                report.fallback_frame = true;
                black_frame(self.opts.fallback_canvas)
            }
        };
        let canvas = frame.canvas().or_fallback(self.opts.fallback_canvas);
        let plan = CompositePlan::build(canvas, snapshot, self.opts.plan);
        let mut target = Compositor::new(canvas)?;

        for layer in &plan.layers {
            match layer {
                LayerOp::Frame { .. } => {
                    cancel.check()?;
                    target.draw_frame(&frame)?;
                }
                LayerOp::Uniform {
                    overlay,
                    image,
                    placement,
                }
                | LayerOp::Sticker {
                    overlay,
                    image,
                    placement,
                } => {
                    cancel.check()?;
                    let loaded = match self.load_layer(image, assets, cancel).await? {
                        Ok(img) => img,
                        Err(reason) => {
                            tracing::warn!(overlay = %overlay, image = %image, ?reason, "layer skipped");
                            report.skipped.push(SkippedLayer {
                                overlay: overlay.clone(),
                                image: image.clone(),
                                reason,
                            });
                            continue;
                        }
                    };
                    cancel.check()?;
                    target.draw_image(&loaded, *placement)?;
                    report.drawn.push(overlay.clone());
                }
            }
        }

        cancel.check()?;
        let frame = target.finish()?;
        tracing::debug!(
            drawn = report.drawn.len(),
            skipped = report.skipped.len(),
            "composite finished"
        );
        Ok(Composite { frame, report })
    }

    /// Composite, encode and stamp a capture.
    ///
    /// Encoding failures are fatal to the attempt. A cancelled capture emits nothing.
    #[tracing::instrument(level = "info", skip_all)]
    pub async fn capture(
        &self,
        frames: &dyn FrameSource,
        snapshot: &[OverlayInstance],
        meta: CaptureMeta,
        assets: &dyn AssetSource,
        cancel: &CancelToken,
    ) -> BoothResult<CaptureOutput> {
        let Composite { frame, report } = self.composite(frames, snapshot, assets, cancel).await?;
        let bytes = encode_still(&frame, self.opts.format, self.opts.jpeg_quality)?;
        cancel.check()?;

        let timestamp_millis = chrono::Utc::now().timestamp_millis();
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let captured = CapturedFrame {
            id: format!("capture-{timestamp_millis}-{seq}"),
            bytes,
            format: self.opts.format,
            width: frame.width,
            height: frame.height,
            timestamp_millis,
            uniform_name: meta.uniform_name,
            filter_tag: meta.filter_tag,
        };
        tracing::info!(id = %captured.id, bytes = captured.bytes.len(), "capture emitted");
        Ok(CaptureOutput {
            frame: captured,
            report,
        })
    }

    async fn load_layer(
        &self,
        image: &AssetRef,
        assets: &dyn AssetSource,
        cancel: &CancelToken,
    ) -> BoothResult<Result<crate::assets::decode::PreparedImage, SkipReason>> {
        let load = tokio::time::timeout(self.opts.asset_timeout, assets.load(image));
        let bytes = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(BoothError::Cancelled),
            res = load => match res {
                Err(_) => return Ok(Err(SkipReason::TimedOut)),
                Ok(Err(e)) => return Ok(Err(SkipReason::LoadFailed(e.to_string()))),
                Ok(Ok(bytes)) => bytes,
            },
        };
        Ok(decode_asset(&bytes).map_err(|e| SkipReason::DecodeFailed(e.to_string())))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
