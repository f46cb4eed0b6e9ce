use super::*;
use crate::assets::decode::decode_image;
use crate::export::NoSettle;
use crate::export::fixtures::{BLUE, FailingStage, MapLoader, RED, live_doc, live_stage, near};
use crate::scene::Stage;

use ExportPhase::*;

struct Run {
    background: BackgroundConfig,
    perspective: Perspective3DConfig,
    images: Vec<ImageOverlay>,
    options: ExportOptions,
}

impl Run {
    fn new() -> Self {
        Self {
            background: BackgroundConfig::solid("#0000ff"),
            perspective: Perspective3DConfig::IDENTITY,
            images: Vec::new(),
            options: ExportOptions::new(400, 200),
        }
    }

    fn inputs(&self) -> ExportInputs<'_> {
        ExportInputs {
            options: self.options,
            background: &self.background,
            border_radius: 0.0,
            blur: 0.0,
            noise: 0.0,
            text_overlays: &[],
            image_overlays: &self.images,
            perspective: &self.perspective,
            image_loaded: true,
        }
    }
}

#[test]
fn full_run_walks_every_phase_in_order() {
    let (mut doc, mut stage) = (live_doc(), live_stage());
    let settle = NoSettle::new();
    let loader = MapLoader::new();
    let mut exporter = Exporter::new(ExportSettings::default(), &settle, &loader);
    let run = Run::new();

    let art = exporter
        .export(&mut doc, Some(&mut stage), &run.inputs())
        .unwrap();
    assert_eq!(
        exporter.history(),
        &[
            Idle,
            CapturingBackground,
            CapturingScene,
            CapturingOverlays,
            Compositing,
            Watermarking,
            Encoding,
            Done
        ]
    );
    assert_eq!((art.width, art.height), (400, 200));
    assert!(art.data_url.starts_with("data:image/png;base64,"));

    let out = decode_image(&art.blob.bytes).unwrap();
    assert!(near(out.pixel(10, 10), BLUE, 0));
    assert!(near(out.pixel(200, 100), RED, 0));
    assert_eq!(settle.waits()[0].0, "pre-capture");
    assert_eq!(doc.offscreen_count(), 0);
    assert!((0..stage.layer_count()).all(|i| stage.is_layer_visible(i)));
}

#[test]
fn scale_multiplies_the_output_size() {
    let (mut doc, mut stage) = (live_doc(), live_stage());
    let (settle, loader) = (NoSettle::new(), MapLoader::new());
    let mut run = Run::new();
    run.options = ExportOptions::new(400, 200).with_scale(2.0);
    let art = Exporter::new(ExportSettings::default(), &settle, &loader)
        .export(&mut doc, Some(&mut stage), &run.inputs())
        .unwrap();
    assert_eq!((art.width, art.height), (800, 400));
}

#[test]
fn missing_scene_handle_fails_fast() {
    let mut doc = live_doc();
    let (settle, loader) = (NoSettle::new(), MapLoader::new());
    let mut exporter = Exporter::new(ExportSettings::default(), &settle, &loader);
    let err = exporter.export(&mut doc, None, &Run::new().inputs()).unwrap_err();
    assert!(err.is_precondition());
    assert!(err.to_string().contains("scene graph handle not provided"));
    assert_eq!(exporter.history(), &[Idle, Failed]);
    assert!(settle.waits().is_empty());
}

#[test]
fn missing_render_card_fails_fast() {
    let mut doc = Document::new(100.0, 100.0);
    let mut stage = live_stage();
    let (settle, loader) = (NoSettle::new(), MapLoader::new());
    let mut exporter = Exporter::new(ExportSettings::default(), &settle, &loader);
    let err = exporter
        .export(&mut doc, Some(&mut stage), &Run::new().inputs())
        .unwrap_err();
    assert!(
        err.to_string()
            .contains("image render card not found. Please ensure an image is uploaded.")
    );
    assert_eq!(exporter.phase(), Failed);
}

#[test]
fn invalid_options_are_rejected() {
    let (mut doc, mut stage) = (live_doc(), live_stage());
    let (settle, loader) = (NoSettle::new(), MapLoader::new());
    let mut run = Run::new();
    run.options.scale = 0.5;
    let err = Exporter::new(ExportSettings::default(), &settle, &loader)
        .export(&mut doc, Some(&mut stage), &run.inputs())
        .unwrap_err();
    assert!(err.to_string().starts_with("validation error: "));
}

#[test]
fn failed_snapshot_aborts_and_cleans_up() {
    let mut doc = live_doc();
    let mut stage = FailingStage(live_stage());
    let (settle, loader) = (NoSettle::new(), MapLoader::new());
    let mut exporter = Exporter::new(ExportSettings::default(), &settle, &loader);
    let err = exporter
        .export(&mut doc, Some(&mut stage), &Run::new().inputs())
        .unwrap_err();
    assert!(err.to_string().contains("snapshot exploded"));
    assert_eq!(
        exporter.history(),
        &[Idle, CapturingBackground, CapturingScene, Failed]
    );
    assert_eq!(doc.offscreen_count(), 0);
    assert!((0..stage.layer_count()).all(|i| stage.is_layer_visible(i)));
}

#[test]
fn active_3d_adds_its_phase() {
    let (mut doc, mut stage) = (live_doc(), live_stage());
    let (settle, loader) = (NoSettle::new(), MapLoader::new());
    let mut run = Run::new();
    run.perspective.rotate_x = 15.0;
    let mut exporter = Exporter::new(ExportSettings::default(), &settle, &loader);
    exporter
        .export(&mut doc, Some(&mut stage), &run.inputs())
        .unwrap();
    assert!(exporter.history().contains(&Capturing3D));
    assert!(settle.waits().iter().any(|(r, _)| *r == "3d mount"));
    assert_eq!(doc.offscreen_count(), 0);
}

#[test]
fn background_strategy_skips_the_overlay_pass() {
    let (mut doc, mut stage) = (live_doc(), live_stage());
    let settle = NoSettle::new();
    let loader = MapLoader::new().with("a.png", RED, 2, 2);
    let mut run = Run::new();
    run.images = vec![ImageOverlay::new("a.png", 0.0, 0.0, 10.0)];
    let settings = ExportSettings::default().with_strategy(OverlayStrategy::WithBackground);
    let mut exporter = Exporter::new(settings, &settle, &loader);
    let art = exporter
        .export(&mut doc, Some(&mut stage), &run.inputs())
        .unwrap();
    assert!(!exporter.history().contains(&CapturingOverlays));
    let out = decode_image(&art.blob.bytes).unwrap();
    assert!(near(out.pixel(10, 10), RED, 0));
}

#[test]
fn exporter_can_run_again_after_a_failure() {
    let mut doc = live_doc();
    let (settle, loader) = (NoSettle::new(), MapLoader::new());
    let mut exporter = Exporter::new(ExportSettings::default(), &settle, &loader);
    let run = Run::new();
    assert!(exporter.export(&mut doc, None, &run.inputs()).is_err());

    let mut stage: Stage = live_stage();
    exporter
        .export(&mut doc, Some(&mut stage), &run.inputs())
        .unwrap();
    assert_eq!(exporter.history().first(), Some(&Idle));
    assert_eq!(exporter.phase(), Done);
    assert!(!exporter.history().contains(&Failed));
}
