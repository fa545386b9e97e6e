use super::*;

#[test]
fn solid_frame_pixels_and_bounds() {
    let canvas = Canvas::new(3, 2).unwrap();
    let f = FrameRGBA::solid(canvas, Rgba8Premul::opaque(1, 2, 3));
    assert_eq!(f.data.len(), canvas.rgba8_len());
    assert_eq!(f.pixel(2, 1), [1, 2, 3, 255]);
    assert_eq!(f.pixel(3, 0), [0, 0, 0, 0]);
    assert_eq!(f.canvas(), canvas);
    assert!(!f.is_empty());
}

#[test]
fn straight_bytes_are_premultiplied() {
    let f = FrameRGBA::from_straight_rgba8(1, 1, vec![200, 100, 50, 0]).unwrap();
    assert_eq!(f.pixel(0, 0), [0, 0, 0, 0]);
    assert!(FrameRGBA::from_straight_rgba8(2, 1, vec![0; 4]).is_err());
}

#[test]
fn prepared_image_conversion_round_trips_dimensions() {
    let f = FrameRGBA::solid(Canvas::new(4, 4).unwrap(), Rgba8Premul::opaque(9, 9, 9));
    let img = f.to_prepared_image().unwrap();
    assert_eq!((img.width, img.height), (4, 4));
    let back = FrameRGBA::from(img);
    assert_eq!(back, f);
}

#[test]
fn empty_frame_cannot_become_an_image() {
    let f = FrameRGBA {
        width: 0,
        height: 0,
        data: vec![],
        premultiplied: true,
    };
    assert!(f.is_empty());
    assert!(f.to_prepared_image().is_err());
}
