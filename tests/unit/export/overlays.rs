use super::*;
use crate::export::NoSettle;
use crate::export::fixtures::{MapLoader, RED, live_doc, near};
use crate::model::{ImageOverlay, TextOverlay};

fn run(
    doc: &mut Document,
    loader: &MapLoader,
    text: &[TextOverlay],
    images: &[ImageOverlay],
) -> BackdropResult<Option<RasterLayer>> {
    let opts = OverlaysExportOptions {
        width: 400.0,
        height: 200.0,
        scale: 1.0,
        overlays: OverlaySet::new(text, images),
    };
    export_overlays(doc, loader, &NoSettle::new(), &SettleDelays::default(), &opts)
}

#[test]
fn nothing_visible_yields_none() {
    let mut doc = live_doc();
    let mut hidden = ImageOverlay::new("a.png", 0.0, 0.0, 10.0);
    hidden.is_visible = false;
    let out = run(&mut doc, &MapLoader::new(), &[], &[hidden]).unwrap();
    assert!(out.is_none());
    assert_eq!(doc.offscreen_count(), 0);
}

#[test]
fn overlays_sit_on_a_transparent_layer() {
    let mut doc = live_doc();
    let loader = MapLoader::new().with("a.png", RED, 2, 2);
    let images = vec![ImageOverlay::new("a.png", 50.0, 25.0, 10.0)];
    let out = run(&mut doc, &loader, &[], &images).unwrap().unwrap();
    assert_eq!((out.width(), out.height()), (400, 200));
    assert!(near(out.pixel(110, 60), RED, 0));
    assert_eq!(out.pixel(5, 5), [0, 0, 0, 0]);
    assert_eq!(out.pixel(300, 150), [0, 0, 0, 0]);
    assert_eq!(doc.offscreen_count(), 0);
}

#[test]
fn invisible_overlay_leaves_its_region_transparent() {
    let mut doc = live_doc();
    let loader = MapLoader::new().with("a.png", RED, 2, 2);
    let mut hidden = ImageOverlay::new("a.png", 100.0, 50.0, 20.0);
    hidden.is_visible = false;
    let images = vec![ImageOverlay::new("a.png", 0.0, 0.0, 10.0), hidden];
    let out = run(&mut doc, &loader, &[], &images).unwrap().unwrap();
    for (x, y) in [(200, 100), (210, 110), (239, 139)] {
        assert_eq!(out.pixel(x, y), [0, 0, 0, 0]);
    }
    assert!(near(out.pixel(10, 10), RED, 0));
}

#[test]
fn wide_sticker_is_letterboxed_inside_its_square() {
    let mut doc = live_doc();
    let loader = MapLoader::new().with("wide.png", RED, 4, 1);
    // 20px square at 2x: a 40x40 box holding a 40x10 image at y 15..25.
    let images = vec![ImageOverlay::new("wide.png", 0.0, 0.0, 20.0)];
    let out = run(&mut doc, &loader, &[], &images).unwrap().unwrap();
    assert!(near(out.pixel(20, 20), RED, 0));
    assert!(near(out.pixel(2, 16), RED, 0));
    for (x, y) in [(20, 2), (20, 12), (20, 27), (20, 37)] {
        assert_eq!(out.pixel(x, y), [0, 0, 0, 0], "({x}, {y})");
    }
}

#[test]
fn failed_image_keeps_the_rest() {
    let mut doc = live_doc();
    let loader = MapLoader::new().with("ok.png", RED, 2, 2);
    let images = vec![
        ImageOverlay::new("broken.png", 0.0, 0.0, 10.0),
        ImageOverlay::new("ok.png", 100.0, 50.0, 10.0),
    ];
    let out = run(&mut doc, &loader, &[], &images).unwrap().unwrap();
    assert_eq!(out.pixel(10, 10), [0, 0, 0, 0]);
    assert!(near(out.pixel(210, 110), RED, 0));
}

#[test]
fn missing_card_fails_before_mounting() {
    let mut doc = Document::new(100.0, 100.0);
    let text = vec![TextOverlay::new("t", 50.0, 50.0)];
    let err = run(&mut doc, &MapLoader::new(), &text, &[]).unwrap_err();
    assert!(err.is_precondition());
    assert_eq!(doc.offscreen_count(), 0);
}
