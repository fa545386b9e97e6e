use super::*;
use crate::assets::loader::MemoryAssetSource;
use crate::foundation::core::Rgba8Premul;
use crate::overlay::registry::OverlayRegistry;
use crate::source::frame::{LatestFrameSource, StillFrameSource};

fn png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut out = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

fn blue_frame() -> StillFrameSource {
    StillFrameSource::new(FrameRGBA::solid(
        Canvas::new(64, 48).unwrap(),
        Rgba8Premul::opaque(0, 0, 255),
    ))
}

fn close(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x.abs_diff(*y) <= 2)
}

#[tokio::test]
async fn sticker_is_drawn_over_frame() {
    let mut assets = MemoryAssetSource::new();
    assets.insert("dot.png", png(8, 8, [0, 255, 0, 255]));
    let mut reg = OverlayRegistry::new();
    let s = reg.add_sticker(AssetRef::new("dot.png"), "dot");

    let pipeline = CapturePipeline::default();
    let out = pipeline
        .composite(&blue_frame(), &reg.snapshot(), &assets, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!((out.frame.width, out.frame.height), (64, 48));
    assert!(close(out.frame.pixel(32, 24), [0, 255, 0, 255]));
    assert!(close(out.frame.pixel(2, 2), [0, 0, 255, 255]));
    assert_eq!(out.report.drawn, vec![s.id]);
    assert!(out.report.skipped.is_empty());
    assert!(!out.report.fallback_frame);
}

#[tokio::test]
async fn failed_layers_are_skipped_and_reported() {
    let mut assets = MemoryAssetSource::new();
    assets.insert("junk.png", b"not an image".to_vec());
    assets.insert("slow.png", png(4, 4, [255, 0, 0, 255]));
    assets.set_delay("slow.png", Duration::from_secs(5));
    assets.insert("ok.png", png(4, 4, [255, 255, 255, 255]));

    let mut reg = OverlayRegistry::new();
    let missing = reg.add_sticker(AssetRef::new("missing.png"), "missing");
    let junk = reg.add_sticker(AssetRef::new("junk.png"), "junk");
    let slow = reg.add_sticker(AssetRef::new("slow.png"), "slow");
    let ok = reg.add_sticker(AssetRef::new("ok.png"), "ok");

    let pipeline = CapturePipeline::new(CaptureOptions {
        asset_timeout: Duration::from_millis(20),
        ..CaptureOptions::default()
    });
    let out = pipeline
        .composite(&blue_frame(), &reg.snapshot(), &assets, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(out.report.drawn, vec![ok.id]);
    let skipped: Vec<_> = out.report.skipped.iter().map(|s| &s.overlay).collect();
    assert_eq!(skipped, vec![&missing.id, &junk.id, &slow.id]);
    assert!(matches!(out.report.skipped[0].reason, SkipReason::LoadFailed(_)));
    assert!(matches!(out.report.skipped[1].reason, SkipReason::DecodeFailed(_)));
    assert_eq!(out.report.skipped[2].reason, SkipReason::TimedOut);
    assert!(close(out.frame.pixel(32, 24), [255, 255, 255, 255]));
}

#[tokio::test]
async fn missing_frame_falls_back_to_black_canvas() {
    let pipeline = CapturePipeline::default();
    let out = pipeline
        .composite(
            &LatestFrameSource::new(),
            &[],
            &MemoryAssetSource::new(),
            &CancelToken::new(),
        )
        .await
        .unwrap();
    assert_eq!((out.frame.width, out.frame.height), (640, 480));
    assert_eq!(out.frame.pixel(320, 240), [0, 0, 0, 255]);
    assert!(out.report.fallback_frame);
}

#[tokio::test]
async fn cancelled_token_aborts_before_drawing() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = CapturePipeline::default()
        .capture(
            &blue_frame(),
            &[],
            CaptureMeta::default(),
            &MemoryAssetSource::new(),
            &cancel,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BoothError::Cancelled));
}

#[tokio::test]
async fn cancel_interrupts_pending_load() {
    let mut assets = MemoryAssetSource::new();
    assets.insert("slow.png", png(4, 4, [255, 0, 0, 255]));
    assets.set_delay("slow.png", Duration::from_secs(30));
    let mut reg = OverlayRegistry::new();
    reg.add_sticker(AssetRef::new("slow.png"), "slow");
    let snapshot = reg.snapshot();

    let pipeline = CapturePipeline::new(CaptureOptions {
        asset_timeout: Duration::from_secs(60),
        ..CaptureOptions::default()
    });
    let cancel = CancelToken::new();
    let frames = blue_frame();
    let canceller = cancel.clone();
    let (res, ()) = tokio::join!(
        pipeline.composite(&frames, &snapshot, &assets, &cancel),
        async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        }
    );
    assert!(matches!(res, Err(BoothError::Cancelled)));
}

#[tokio::test]
async fn capture_encodes_jpeg_with_metadata() {
    let pipeline = CapturePipeline::default();
    let meta = CaptureMeta {
        uniform_name: Some("winter".into()),
        filter_tag: Some("sepia".into()),
    };
    let a = pipeline
        .capture(
            &blue_frame(),
            &[],
            meta.clone(),
            &MemoryAssetSource::new(),
            &CancelToken::new(),
        )
        .await
        .unwrap();
    let b = pipeline
        .capture(
            &blue_frame(),
            &[],
            meta,
            &MemoryAssetSource::new(),
            &CancelToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(&a.frame.bytes[0..2], &[0xFF, 0xD8]);
    assert_eq!(a.frame.format, StillFormat::Jpeg);
    assert_eq!((a.frame.width, a.frame.height), (64, 48));
    assert_eq!(a.frame.uniform_name.as_deref(), Some("winter"));
    assert_eq!(a.frame.filter_tag.as_deref(), Some("sepia"));
    assert!(a.frame.timestamp_millis > 0);
    assert_ne!(a.frame.id, b.frame.id);
}

#[test]
fn cancel_token_clones_share_state() {
    let a = CancelToken::new();
    let b = a.clone();
    assert!(!b.is_cancelled());
    a.cancel();
    assert!(b.is_cancelled());
}
