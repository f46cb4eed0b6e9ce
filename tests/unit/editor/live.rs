use super::*;
use crate::export::fixtures::{GREEN, MapLoader, RED};
use crate::model::{ImageOverlay, TextOverlay, TextureConfig};
use crate::scene::{IMAGE_LAYER, PATTERN_LAYER, SceneHandle, TEXTURE_LAYER};

fn job() -> ExportJob {
    serde_json::from_str(r#"{"image": "shot.png", "container_width": 800, "container_height": 600}"#)
        .unwrap()
}

fn loader() -> MapLoader {
    MapLoader::new()
        .with("shot.png", RED, 40, 20)
        .with("sticker.png", GREEN, 4, 4)
}

#[test]
fn document_follows_the_anchor_contract() {
    let canvas = LiveCanvas::build(&job(), &loader(), FontBook::new()).unwrap();
    let doc = &canvas.document;
    assert_eq!((canvas.dimensions.canvas_width, canvas.dimensions.canvas_height), (800.0, 600.0));
    assert_eq!(doc.parent_of(CARD_ID).unwrap().id, RENDER_CARD_ID);
    assert_eq!(doc.parent_of(BACKGROUND_ID).unwrap().id, CARD_ID);
    assert_eq!(doc.box_of(BACKGROUND_ID).unwrap().width(), 800.0);

    let noise = doc.element_by_id(NOISE_OVERLAY_ID).unwrap();
    assert!(!noise.style.visible);
    let texture = NoiseTexture::from_preview_or_fallback(Some(noise)).unwrap();
    assert_eq!(texture.source, crate::effects::noise::NoiseSource::Preview);

    assert!(doc.element_by_attr(OVERLAY_3D_ATTR, "true").is_none());
    assert!(!canvas.has_3d);
    assert!(doc.images.contains("shot.png"));
    assert_eq!(canvas.stage.layer_count(), 1);
    assert!(canvas.stage.layer_by_name(IMAGE_LAYER).is_some());
}

#[test]
fn background_blur_shows_as_a_css_filter() {
    let mut j = job();
    j.background_blur = 6.0;
    j.background_noise = 40.0;
    let canvas = LiveCanvas::build(&j, &loader(), FontBook::new()).unwrap();
    let bg = canvas.document.element_by_id(BACKGROUND_ID).unwrap();
    assert_eq!(bg.style.filter.as_deref(), Some("blur(6px)"));
    let noise = canvas.document.element_by_id(NOISE_OVERLAY_ID).unwrap();
    assert!(noise.style.visible);
    assert!((noise.style.opacity - 0.4).abs() < 1e-9);
}

#[test]
fn active_perspective_adds_the_3d_host() {
    let mut j = job();
    j.perspective.rotate_y = 20.0;
    j.screenshot.rotation = 8.0;
    let canvas = LiveCanvas::build(&j, &loader(), FontBook::new()).unwrap();
    assert!(canvas.has_3d);
    let host = canvas
        .document
        .find_within(RENDER_CARD_ID, OVERLAY_3D_ATTR, "true")
        .unwrap();
    assert_eq!(host.id, OVERLAY_3D_ID);
    assert_eq!(host.style.perspective, Some(200.0));
    let img = &host.children[0];
    assert_eq!(img.style.transform, perspective_transform(&j.perspective, 8.0));
    assert_eq!(img.first_image().unwrap().src, "shot.png");

    // A 40x20 image fitted into 800x600 is centered at 800x400.
    let b = canvas.document.box_of(OVERLAY_3D_ID).unwrap();
    assert_eq!((b.x0, b.y0, b.width(), b.height()), (0.0, 100.0, 800.0, 400.0));
}

#[test]
fn perspective_chain_translates_scales_then_rotates() {
    let cfg = Perspective3DConfig {
        rotate_x: 10.0,
        rotate_y: -20.0,
        rotate_z: 5.0,
        translate_x: 12.0,
        translate_y: -4.0,
        scale: 0.8,
        ..Perspective3DConfig::IDENTITY
    };
    assert_eq!(
        perspective_transform(&cfg, 15.0),
        vec![
            TransformOp::Translate(Length::Percent(12.0), Length::Percent(-4.0)),
            TransformOp::Scale(0.8, 0.8),
            TransformOp::RotateX(10.0),
            TransformOp::RotateY(-20.0),
            TransformOp::RotateZ(20.0),
        ]
    );
}

#[test]
fn pattern_and_texture_appear_in_both_trees() {
    let mut j = job();
    j.pattern.enabled = true;
    j.texture = Some(TextureConfig {
        enabled: true,
        source: "sticker.png".to_string(),
        opacity: 0.5,
    });
    let canvas = LiveCanvas::build(&j, &loader(), FontBook::new()).unwrap();
    let bg = canvas.document.element_by_id(BACKGROUND_ID).unwrap();
    let ids: Vec<_> = bg.children.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, [PATTERN_ID, TEXTURE_ID]);
    assert!(canvas.stage.layer_by_name(PATTERN_LAYER).unwrap().is_decorative());
    assert!(canvas.stage.layer_by_name(TEXTURE_LAYER).is_some());
}

#[test]
fn broken_texture_is_left_out() {
    let mut j = job();
    j.texture = Some(TextureConfig {
        enabled: true,
        source: "missing.png".to_string(),
        opacity: 1.0,
    });
    let canvas = LiveCanvas::build(&j, &loader(), FontBook::new()).unwrap();
    assert!(canvas.document.element_by_id(TEXTURE_ID).is_none());
    assert!(canvas.stage.layer_by_name(TEXTURE_LAYER).is_none());
}

#[test]
fn overlays_are_hosted_in_the_live_card() {
    let mut j = job();
    j.text_overlays = vec![TextOverlay::new("hi", 50.0, 50.0)];
    j.image_overlays = vec![
        ImageOverlay::new("sticker.png", 10.0, 10.0, 30.0),
        ImageOverlay::new("gone.png", 10.0, 10.0, 30.0),
    ];
    let canvas = LiveCanvas::build(&j, &loader(), FontBook::new()).unwrap();
    let doc = &canvas.document;
    assert_eq!(doc.element_by_id(TEXT_HOST_ID).unwrap().children.len(), 1);
    assert_eq!(doc.element_by_id(IMAGE_HOST_ID).unwrap().children.len(), 1);
}

#[test]
fn unloadable_main_image_is_a_precondition_failure() {
    let err = LiveCanvas::build(&job(), &MapLoader::new(), FontBook::new()).unwrap_err();
    assert!(err.is_precondition());
}

#[test]
fn export_defaults_to_the_canvas_size() {
    let j = job();
    let canvas = LiveCanvas::build(&j, &loader(), FontBook::new()).unwrap();
    let opts = canvas.export_options(&j);
    assert_eq!((opts.export_width, opts.export_height, opts.scale), (800, 600, 1.0));
    let inputs = canvas.export_inputs(&j, opts);
    assert!(inputs.image_loaded);
    assert_eq!(inputs.noise, 0.0);
}
