use super::*;

#[test]
fn pixel_size_multiplies_by_scale() {
    let o = ExportOptions::new(800, 450).with_scale(2.0);
    assert_eq!(o.pixel_size(), (1600, 900));
    let o = ExportOptions::new(101, 33).with_scale(1.5);
    assert_eq!(o.pixel_size(), (152, 50));
}

#[test]
fn validation_bounds() {
    assert!(ExportOptions::new(10, 10).validate().is_ok());
    assert!(ExportOptions::new(0, 10).validate().is_err());
    assert!(ExportOptions::new(10, 10).with_scale(0.5).validate().is_err());
    assert!(ExportOptions::new(10, 10).with_scale(f64::NAN).validate().is_err());
    let mut o = ExportOptions::new(10, 10);
    o.quality = 1.2;
    assert!(o.validate().is_err());
    assert!(ExportOptions::new(10_000, 10).with_scale(2.0).validate().is_err());
}

#[test]
fn format_is_png() {
    let o: ExportOptions =
        serde_json::from_str(r#"{"export_width":4,"export_height":3}"#).unwrap();
    assert_eq!(o.format, ExportFormat::Png);
    assert_eq!(o.format.mime(), "image/png");
    assert_eq!(o.scale, 1.0);
    assert_eq!(o.quality, 1.0);
}
