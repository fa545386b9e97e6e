use super::*;
use crate::foundation::core::Rgba8Premul;

#[test]
fn still_source_returns_its_frame() {
    let f = FrameRGBA::solid(Canvas::new(2, 2).unwrap(), Rgba8Premul::opaque(1, 2, 3));
    let src = StillFrameSource::new(f.clone());
    assert_eq!(src.current_frame(), Some(f));
}

#[test]
fn still_source_decodes_png_bytes() {
    let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
    let mut bytes = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    let frame = StillFrameSource::from_encoded(&bytes)
        .unwrap()
        .current_frame()
        .unwrap();
    assert_eq!((frame.width, frame.height), (3, 2));
    assert_eq!(frame.pixel(1, 1), [10, 20, 30, 255]);

    assert!(StillFrameSource::from_encoded(b"nope").is_err());
}

#[test]
fn latest_source_tracks_publish_and_clear() {
    let src = LatestFrameSource::new();
    assert!(src.current_frame().is_none());
    let f = FrameRGBA::solid(Canvas::new(1, 1).unwrap(), Rgba8Premul::opaque(9, 9, 9));
    src.publish(f.clone());
    assert_eq!(src.current_frame(), Some(f));
    src.clear();
    assert!(src.current_frame().is_none());
}

#[test]
fn mock_frame_is_opaque_gradient_with_darker_silhouette() {
    let src = MockFrameSource::default();
    let f = src.current_frame().unwrap();
    assert_eq!((f.width, f.height), (640, 480));
    assert!(f.data.chunks_exact(4).all(|px| px[3] == 255));

    assert_eq!(&f.pixel(0, 0)[0..3], &SLATE_300);
    assert_eq!(&f.pixel(639, 479)[0..3], &SLATE_500);

    // same diagonal, inside and outside the silhouette
    let inside = f.pixel(320, 470);
    let outside = f.pixel(400, 390);
    assert!(inside[0] < outside[0]);
    assert!(inside[2] < outside[2]);
    assert_eq!(src.render(), f);
}
