use super::*;
use crate::export::OverlayStrategy;
use crate::model::BackgroundKind;

const MINIMAL: &str = r#"{"image": "shot.png", "container_width": 800, "container_height": 600}"#;

#[test]
fn minimal_job_takes_defaults() {
    let job = ExportJob::from_reader(MINIMAL.as_bytes()).unwrap();
    assert_eq!(job.background.kind, BackgroundKind::Gradient);
    assert_eq!(job.export, None);
    assert!(job.perspective.is_identity());
    assert_eq!(job.settings, ExportSettings::default());
    let dims = job.dimension_inputs(100.0, 50.0);
    assert!(dims.viewport_width.is_infinite());
    assert_eq!(dims.screenshot_scale, 1.0);
}

#[test]
fn full_job_parses() {
    let json = r##"{
        "image": "shot.png",
        "container_width": 1200,
        "container_height": 800,
        "aspect_ratio": 1.5,
        "background": {"type": "solid", "value": "slate"},
        "background_blur": 4,
        "background_noise": 30,
        "perspective": {"perspective": 400, "rotate_x": 10, "rotate_y": -5, "rotate_z": 0,
                        "translate_x": 0, "translate_y": 0, "scale": 1},
        "text_overlays": [{"text": "hello", "position": {"x": 50, "y": 20}}],
        "image_overlays": [{"src": "sticker.png", "size": 40, "flip_x": true}],
        "export": {"export_width": 1200, "export_height": 800, "scale": 2},
        "settings": {"overlay_strategy": "with_background", "delays": {"pre_capture_ms": 0}}
    }"##;
    let job = ExportJob::from_reader(json.as_bytes()).unwrap();
    assert!(job.perspective.has_transform());
    assert_eq!(job.text_overlays[0].font_size, 48.0);
    assert!(job.image_overlays[0].flip_x);
    assert_eq!(job.export.unwrap().pixel_size(), (2400, 1600));
    assert_eq!(job.settings.overlay_strategy, OverlayStrategy::WithBackground);
    assert_eq!(job.settings.delays.pre_capture_ms, 0);
    assert_eq!(job.settings.delays.background_fonts_ms, 300);
}

#[test]
fn out_of_range_effects_are_rejected() {
    let mut job = ExportJob::from_reader(MINIMAL.as_bytes()).unwrap();
    job.background_noise = 150.0;
    assert!(job.validate().unwrap_err().to_string().contains("background noise"));

    job.background_noise = 0.0;
    job.background_blur = -1.0;
    assert!(job.validate().is_err());

    job.background_blur = 0.0;
    job.image = " ".to_string();
    assert!(job.validate().is_err());
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = ExportJob::from_reader(r#"{"container_width": 1}"#.as_bytes()).unwrap_err();
    assert!(err.to_string().starts_with("serialization error: "), "{err}");
}

#[test]
fn missing_file_is_reported_with_its_path() {
    let err = ExportJob::from_path("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.json"));
}
