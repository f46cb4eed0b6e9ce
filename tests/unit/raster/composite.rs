use super::*;

#[test]
fn over_opaque_source_replaces_destination() {
    let mut dst = vec![10u8, 20, 30, 255];
    over_in_place(&mut dst, &[200, 100, 50, 255], 1.0).unwrap();
    assert_eq!(dst, vec![200, 100, 50, 255]);
}

#[test]
fn over_zero_opacity_is_noop() {
    let mut dst = vec![10u8, 20, 30, 255];
    over_in_place(&mut dst, &[200, 100, 50, 255], 0.0).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn over_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4], 1.0).is_err());
}

#[test]
fn overlay_with_mid_gray_source_keeps_backdrop() {
    // overlay(0.5, d) == d for every backdrop value.
    for d in [0.0f32, 0.25, 0.5, 0.75, 1.0] {
        assert!((overlay_channel(0.5, d) - d).abs() < 1e-6);
    }
}

#[test]
fn overlay_onto_transparent_is_plain_source() {
    let mut dst = vec![0u8; 4];
    blend_in_place(&mut dst, &[64, 64, 64, 128], 1.0, BlendMode::Overlay).unwrap();
    assert_eq!(dst, vec![64, 64, 64, 128]);
}

#[test]
fn overlay_darkens_dark_backdrop_with_dark_source() {
    let mut dst = vec![60u8, 60, 60, 255];
    blend_in_place(&mut dst, &[30, 30, 30, 255], 1.0, BlendMode::Overlay).unwrap();
    assert!(dst[0] < 60);
    assert_eq!(dst[3], 255);
}

#[test]
fn blend_mode_parses_css_keywords() {
    assert_eq!(BlendMode::from_css("overlay"), Some(BlendMode::Overlay));
    assert_eq!(BlendMode::from_css(" normal "), Some(BlendMode::Normal));
    assert_eq!(BlendMode::from_css("hue"), None);
}
