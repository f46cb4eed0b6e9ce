use super::*;
use crate::export::ExportSettings;

fn style() -> WatermarkStyle {
    ExportSettings::default().watermark().unwrap()
}

fn max_alpha(layer: &RasterLayer, x0: u32, y0: u32) -> u8 {
    let mut max = 0;
    for y in y0..layer.height() {
        for x in x0..layer.width() {
            max = max.max(layer.pixel(x, y)[3]);
        }
    }
    max
}

#[test]
fn mark_height_is_clamped() {
    assert_eq!(mark_height(100, 100), 12.0);
    assert_eq!(mark_height(1000, 2000), 35.0);
    assert_eq!(mark_height(4000, 4000), 64.0);
}

#[test]
fn mark_sits_in_the_bottom_right_corner() {
    let blank = RasterLayer::new_transparent(1000, 1000).unwrap();
    let out = stamp_watermark(blank, &style()).unwrap();

    let alpha = max_alpha(&out, 700, 900);
    assert!((170..=179).contains(&alpha), "alpha {alpha}");
    assert_eq!(max_alpha(&out, 0, 0), alpha);
    // margin is 0.8 * 35 px
    assert_eq!(out.pixel(999, 999), [0, 0, 0, 0]);
    assert_eq!(out.pixel(980, 980), [0, 0, 0, 0]);
    assert_eq!(out.pixel(10, 10), [0, 0, 0, 0]);
    assert_eq!(out.pixel(500, 500), [0, 0, 0, 0]);
}

#[test]
fn stamping_is_deterministic() {
    let a = stamp_watermark(RasterLayer::new_transparent(300, 200).unwrap(), &style()).unwrap();
    let b = stamp_watermark(RasterLayer::new_transparent(300, 200).unwrap(), &style()).unwrap();
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert!(!a.is_fully_transparent());
}

#[test]
fn unknown_glyphs_are_skipped() {
    let blank = RasterLayer::new_transparent(300, 200).unwrap();
    let odd = WatermarkStyle {
        text: "??".to_string(),
        color: Rgba8::WHITE,
    };
    let out = stamp_watermark(blank.clone(), &odd).unwrap();
    assert_eq!(out.fingerprint(), blank.fingerprint());

    let mixed = WatermarkStyle {
        text: "s?e".to_string(),
        color: Rgba8::WHITE,
    };
    assert!(!stamp_watermark(blank, &mixed).unwrap().is_fully_transparent());
}

#[test]
fn tiny_buffers_clip_the_mark() {
    let out = stamp_watermark(RasterLayer::new_transparent(8, 8).unwrap(), &style()).unwrap();
    assert_eq!((out.width(), out.height()), (8, 8));
}
