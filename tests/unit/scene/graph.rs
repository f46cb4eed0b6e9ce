use super::*;

fn pattern_layer() -> Layer {
    let tile = Arc::new(RasterLayer::filled(2, 2, Rgba8::WHITE).unwrap());
    Layer::new("p", vec![Node::rect(100.0, 50.0, Fill::Pattern(tile))])
}

#[test]
fn decorative_layers_are_detected_by_shape() {
    assert!(pattern_layer().is_decorative());

    let mut two = pattern_layer();
    two.nodes.push(Node::circle(3.0, Fill::Color(Rgba8::WHITE)));
    assert!(!two.is_decorative());

    let colored = Layer::new("c", vec![Node::rect(100.0, 50.0, Fill::Color(Rgba8::BLACK))]);
    assert!(!colored.is_decorative());

    let mut stroked = pattern_layer();
    stroked.nodes[0] = stroked.nodes[0]
        .clone()
        .with_stroke(Stroke::solid(Rgba8::BLACK, 1.0));
    assert!(!stroked.is_decorative());
}

#[test]
fn background_fill_must_cover_the_stage() {
    let full = Layer::new("bg", vec![Node::rect(100.0, 50.0, Fill::Color(Rgba8::BLACK))]);
    assert!(full.is_background_fill(100.0, 50.0));
    assert!(!full.is_background_fill(120.0, 50.0));

    let shifted = Layer::new(
        "bg",
        vec![Node::rect(100.0, 50.0, Fill::Color(Rgba8::BLACK)).at(10.0, 0.0)],
    );
    assert!(!shifted.is_background_fill(100.0, 50.0));
    assert!(!pattern_layer().is_background_fill(100.0, 50.0));
}

#[test]
fn stage_visibility_and_redraw_through_the_handle() {
    let mut stage = Stage::new(10.0, 10.0);
    stage.push_layer(pattern_layer());
    stage.push_layer(Layer::new("image", Vec::new()));
    let handle: &mut dyn SceneHandle = &mut stage;
    assert_eq!(handle.size(), (10.0, 10.0));
    assert_eq!(handle.layer_count(), 2);
    handle.set_layer_visible(0, false);
    assert!(!handle.is_layer_visible(0));
    assert!(handle.is_layer_visible(1));
    assert!(!handle.is_layer_visible(7));
    handle.set_layer_visible(7, true);
    handle.redraw();
    assert_eq!(stage.redraw_count(), 1);
    assert_eq!(stage.layer_by_name("image").map(|l| l.nodes.len()), Some(0));
}

#[test]
fn local_transform_rotates_about_offset() {
    let n = Node::group(Vec::new())
        .at(50.0, 50.0)
        .with_offset(10.0, 0.0)
        .rotated(90.0);
    let p = n.local_transform() * crate::foundation::core::Point::new(10.0, 0.0);
    assert!((p.x - 50.0).abs() < 1e-9 && (p.y - 50.0).abs() < 1e-9);
    let q = n.local_transform() * crate::foundation::core::Point::new(20.0, 0.0);
    assert!((q.x - 50.0).abs() < 1e-9 && (q.y - 60.0).abs() < 1e-9);
}

#[test]
fn svg_paths_parse_or_fail_validation() {
    let stroke = Stroke::solid(Rgba8::WHITE, 2.0);
    assert!(Node::svg_path("M 0 0 Q 5 0 5 5", stroke.clone()).is_ok());
    let err = Node::svg_path("M 0 0 Z Z nonsense", stroke).unwrap_err();
    assert!(err.to_string().contains("invalid path data"));
}
