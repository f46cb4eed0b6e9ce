use super::*;
use crate::document::ImageStore;
use crate::document::style::Length;
use crate::foundation::core::Rgba8;

fn overlay_doc(transform: Vec<TransformOp>) -> Document {
    let mut doc = Document::new(100.0, 100.0);
    doc.append(
        Element::new("overlay")
            .with_style(Style {
                perspective: Some(200.0),
                ..Style::boxed(0.0, 0.0, 10.0, 10.0)
            })
            .with_child(
                Element::new("shot")
                    .with_style(Style {
                        width: Some(Length::FULL),
                        height: Some(Length::FULL),
                        transform,
                        ..Style::default()
                    })
                    .with_image("shot.png"),
            ),
    );
    doc.images.insert(
        "shot.png",
        RasterLayer::filled(4, 4, Rgba8::new(255, 0, 0, 255)).unwrap(),
        true,
    );
    doc
}

#[test]
fn untransformed_plane_fills_the_box() {
    let out = capture_3d(&overlay_doc(Vec::new()), "overlay", 2.0, 2.0).unwrap();
    assert_eq!(out.origin, (0, 0));
    assert_eq!((out.layer.width(), out.layer.height()), (20, 20));
    assert_eq!(out.layer.pixel(0, 0), [255, 0, 0, 255]);
    assert_eq!(out.layer.pixel(19, 19), [255, 0, 0, 255]);
}

#[test]
fn rotate_y_foreshortens_the_plane() {
    let out = capture_3d(&overlay_doc(vec![TransformOp::RotateY(60.0)]), "overlay", 1.0, 1.0).unwrap();
    assert_eq!(out.layer.pixel(5, 5), [255, 0, 0, 255]);
    assert_eq!(out.layer.pixel(0, 5)[3], 0);
    assert_eq!(out.layer.pixel(9, 5)[3], 0);
}

#[test]
fn perspective_makes_the_near_edge_larger() {
    let out = capture_3d(&overlay_doc(vec![TransformOp::RotateY(45.0)]), "overlay", 10.0, 10.0).unwrap();
    let column = |x: u32| (0..out.layer.height()).filter(|&y| out.layer.pixel(x, y)[3] > 0).count();
    // rotateY(+a) brings the left edge towards the viewer.
    assert!(column(20) > column(80), "{} vs {}", column(20), column(80));
}

#[test]
fn scaled_plane_grows_the_capture_bounds() {
    let out = capture_3d(&overlay_doc(vec![TransformOp::Scale(2.0, 2.0)]), "overlay", 1.0, 1.0).unwrap();
    assert_eq!(out.origin, (-5, -5));
    assert_eq!((out.layer.width(), out.layer.height()), (20, 20));
    assert_eq!(out.layer.pixel(1, 1), [255, 0, 0, 255]);
}

#[test]
fn plane_crossing_the_eye_is_clipped_not_rejected() {
    // The left edge of a 600 wide plane swings 212px towards a viewer 200px away.
    let mut doc = Document::new(600.0, 400.0);
    doc.append(
        Element::new("overlay")
            .with_style(Style {
                perspective: Some(200.0),
                ..Style::boxed(0.0, 0.0, 600.0, 400.0)
            })
            .with_child(
                Element::new("shot")
                    .with_style(Style {
                        width: Some(Length::FULL),
                        height: Some(Length::FULL),
                        transform: vec![TransformOp::RotateY(45.0)],
                        ..Style::default()
                    })
                    .with_image("shot.png"),
            ),
    );
    doc.images.insert(
        "shot.png",
        RasterLayer::filled(4, 4, Rgba8::new(255, 0, 0, 255)).unwrap(),
        true,
    );

    let out = capture_3d(&doc, "overlay", 1.0, 1.0).unwrap();
    assert!(!out.layer.is_fully_transparent());
    assert!(out.layer.width() <= 1800 && out.layer.height() <= 1600);
    let at = |x: i64, y: i64| out.layer.pixel((x - out.origin.0) as u32, (y - out.origin.1) as u32);
    assert_eq!(at(300, 200), [255, 0, 0, 255]);
    assert_eq!(at(350, 200), [255, 0, 0, 255]);
}

#[test]
fn missing_images_leave_the_capture_empty() {
    let mut doc = overlay_doc(Vec::new());
    doc.images = ImageStore::new();
    let out = capture_3d(&doc, "overlay", 1.0, 1.0).unwrap();
    assert!(out.layer.is_fully_transparent());
}

#[test]
fn invalid_inputs_fail() {
    let doc = overlay_doc(Vec::new());
    assert!(capture_3d(&doc, "missing", 1.0, 1.0).is_err());
    assert!(capture_3d(&doc, "overlay", 0.0, 1.0).is_err());
    assert!(capture_3d(&doc, "shot", 1.0, 1.0).is_err());
}
