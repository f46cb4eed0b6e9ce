use super::*;
use crate::export::NoSettle;
use crate::export::fixtures::{BLUE, MapLoader, RED, live_doc, near};
use crate::model::{ImageOverlay, TextOverlay};

fn opts(background: &BackgroundConfig) -> BackgroundExportOptions<'_> {
    BackgroundExportOptions {
        width: 400.0,
        height: 200.0,
        scale: 1.0,
        background,
        border_radius: 0.0,
        blur: 0.0,
        noise: 0.0,
        overlays: None,
    }
}

fn run(doc: &mut Document, o: &BackgroundExportOptions<'_>) -> BackdropResult<RasterLayer> {
    export_background(doc, &MapLoader::new(), &NoSettle::new(), &SettleDelays::default(), o)
}

#[test]
fn clone_fills_the_export_size() {
    let mut doc = live_doc();
    let bg = BackgroundConfig::solid("#0000ff");
    let out = run(&mut doc, &opts(&bg)).unwrap();
    assert_eq!((out.width(), out.height()), (400, 200));
    assert!(near(out.pixel(0, 0), BLUE, 0));
    assert!(near(out.pixel(399, 199), BLUE, 0));
    assert_eq!(doc.offscreen_count(), 0);
    assert_eq!(doc.element_by_id(BACKGROUND_ID).unwrap().style.filter.as_deref(), Some("blur(4px)"));
}

#[test]
fn scale_multiplies_the_raster() {
    let mut doc = live_doc();
    let bg = BackgroundConfig::solid("#0000ff");
    let o = BackgroundExportOptions {
        scale: 2.0,
        ..opts(&bg)
    };
    let out = run(&mut doc, &o).unwrap();
    assert_eq!((out.width(), out.height()), (800, 400));
}

#[test]
fn missing_background_is_a_precondition_error() {
    let mut doc = Document::new(100.0, 100.0);
    let bg = BackgroundConfig::solid("#000");
    let err = run(&mut doc, &opts(&bg)).unwrap_err();
    assert!(err.is_precondition());
    assert!(err.to_string().contains("canvas background element not found"));
}

#[test]
fn corner_radius_scales_with_the_export() {
    let mut doc = live_doc();
    let bg = BackgroundConfig::solid("#0000ff");
    let o = BackgroundExportOptions {
        border_radius: 20.0,
        ..opts(&bg)
    };
    let out = run(&mut doc, &o).unwrap();
    assert_eq!(out.pixel(2, 2)[3], 0);
    // (8, 8) lies outside a 40px arc.
    assert_eq!(out.pixel(8, 8)[3], 0);
    assert!(near(out.pixel(200, 100), BLUE, 0));
}

#[test]
fn perceptual_colors_are_normalized_before_capture() {
    let mut doc = live_doc();
    doc.element_by_id_mut(BACKGROUND_ID).unwrap().style.background_color =
        Some("oklch(0.62 0.19 275)".to_string());
    let bg = BackgroundConfig::solid("oklch(0.62 0.19 275)");
    let out = run(&mut doc, &opts(&bg)).unwrap();
    assert_eq!(out.pixel(100, 100)[3], 255);
    let live = doc.element_by_id(BACKGROUND_ID).unwrap();
    assert!(live.style.background_color.as_deref().unwrap().starts_with("oklch"));
}

#[test]
fn noise_element_inside_the_background_is_not_captured() {
    let mut doc = live_doc();
    let noise = Element::new(NOISE_OVERLAY_ID).with_style(Style {
        background_color: Some("#ffffff".to_string()),
        ..Style::default()
    });
    doc.element_by_id_mut(BACKGROUND_ID).unwrap().children.push(noise);
    let bg = BackgroundConfig::solid("#0000ff");
    let out = run(&mut doc, &opts(&bg)).unwrap();
    assert!(near(out.pixel(200, 100), BLUE, 0));
}

#[test]
fn noise_changes_pixels_deterministically() {
    // Overlay leaves 0 and 255 channels alone, so the base needs mid tones.
    let doc = || {
        let mut doc = live_doc();
        doc.element_by_id_mut(BACKGROUND_ID).unwrap().style.background_color =
            Some("#4060a0".to_string());
        doc
    };
    let bg = BackgroundConfig::solid("#4060a0");
    let o = BackgroundExportOptions {
        noise: 50.0,
        ..opts(&bg)
    };
    let a = run(&mut doc(), &o).unwrap();
    let b = run(&mut doc(), &o).unwrap();
    let plain = run(&mut doc(), &opts(&bg)).unwrap();
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.fingerprint(), plain.fingerprint());
    let base = plain.pixel(200, 100);
    assert!(base[0].abs_diff(0x40) <= 1 && base[2].abs_diff(0xa0) <= 1, "{base:?}");
}

#[test]
fn blur_softens_the_rounded_edge() {
    let bg = BackgroundConfig::solid("#0000ff");
    let sharp = BackgroundExportOptions {
        border_radius: 20.0,
        ..opts(&bg)
    };
    let soft = BackgroundExportOptions { blur: 4.0, ..sharp.clone() };
    let a = run(&mut live_doc(), &sharp).unwrap();
    let b = run(&mut live_doc(), &soft).unwrap();
    assert_eq!(a.pixel(10, 10)[3], 0);
    assert!(b.pixel(10, 10)[3] > 0);
    assert_ne!(a.fingerprint(), b.fingerprint());
}

#[test]
fn overlays_are_placed_with_the_background_strategy() {
    let mut doc = live_doc();
    let loader = MapLoader::new().with("sticker.png", RED, 2, 2);
    let images = vec![ImageOverlay::new("sticker.png", 10.0, 10.0, 20.0)];
    let text: Vec<TextOverlay> = Vec::new();
    let bg = BackgroundConfig::solid("#0000ff");
    let o = BackgroundExportOptions {
        overlays: Some(OverlaySet::new(&text, &images)),
        ..opts(&bg)
    };
    let out = export_background(&mut doc, &loader, &NoSettle::new(), &SettleDelays::default(), &o)
        .unwrap();
    assert!(near(out.pixel(40, 40), RED, 0));
    assert!(near(out.pixel(10, 10), BLUE, 0));
    assert!(near(out.pixel(70, 70), BLUE, 0));
}

#[test]
fn image_background_waits_for_load_and_tolerates_failure() {
    let bg = BackgroundConfig::image("photo.png");
    let settle = NoSettle::new();
    let loader = MapLoader::new().with("photo.png", RED, 4, 4);
    let mut doc = live_doc();
    doc.element_by_id_mut(BACKGROUND_ID).unwrap().style.background_image =
        Some("url(photo.png)".to_string());
    export_background(&mut doc, &loader, &settle, &SettleDelays::default(), &opts(&bg)).unwrap();
    let reasons: Vec<&str> = settle.waits().iter().map(|(r, _)| *r).collect();
    assert_eq!(reasons, vec!["background image", "background fonts"]);

    let settle = NoSettle::new();
    let mut doc = live_doc();
    let out = export_background(&mut doc, &MapLoader::new(), &settle, &SettleDelays::default(), &opts(&bg))
        .unwrap();
    assert_eq!(settle.waits().len(), 1);
    assert!(near(out.pixel(10, 10), BLUE, 0));
}
