use super::*;

#[test]
fn mul_div255_rounding_edges() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(0, 255), 0);
    assert_eq!(mul_div255_u8(128, 255), 128);
    assert_eq!(mul_div255_u8(255, 128), 128);
}

#[test]
fn premultiply_then_unpremultiply_keeps_opaque_and_clears_transparent() {
    let mut px = vec![10, 20, 30, 255, 200, 100, 50, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[0..4], &[10, 20, 30, 255]);
    assert_eq!(&px[4..8], &[0, 0, 0, 0]);
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[0..4], &[10, 20, 30, 255]);
}

#[test]
fn unpremultiply_half_alpha_restores_channel() {
    let mut px = vec![64, 0, 128, 128];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![128, 0, 255, 128]);
}

#[test]
fn wrap_degrees_signed_range() {
    assert_eq!(wrap_degrees_signed(0.0), 0.0);
    assert_eq!(wrap_degrees_signed(180.0), 180.0);
    assert_eq!(wrap_degrees_signed(-180.0), 180.0);
    assert!((wrap_degrees_signed(350.0) - -10.0).abs() < 1e-9);
    assert!((wrap_degrees_signed(-350.0) - 10.0).abs() < 1e-9);
}
