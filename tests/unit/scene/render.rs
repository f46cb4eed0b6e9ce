use super::*;
use crate::scene::graph::Layer;
use std::sync::Arc;

const RED: Rgba8 = Rgba8::new(255, 0, 0, 255);

fn stage_with(nodes: Vec<Node>) -> Stage {
    let mut s = Stage::new(20.0, 20.0);
    s.push_layer(Layer::new("l", nodes));
    s
}

#[test]
fn pixel_ratio_scales_output() {
    let s = stage_with(vec![Node::rect(10.0, 10.0, Fill::Color(RED))]);
    let out = render_stage(&s, 2.0).unwrap();
    assert_eq!((out.width(), out.height()), (40, 40));
    assert_eq!(out.pixel(10, 10), [255, 0, 0, 255]);
    assert_eq!(out.pixel(30, 30), [0, 0, 0, 0]);
    assert!(render_stage(&s, 0.0).is_err());
}

#[test]
fn hidden_layers_are_not_rendered() {
    let mut s = stage_with(vec![Node::rect(20.0, 20.0, Fill::Color(RED))]);
    s.layers[0].visible = false;
    assert!(render_stage(&s, 1.0).unwrap().is_fully_transparent());
}

#[test]
fn group_transform_and_opacity_apply_to_children() {
    let s = stage_with(vec![
        Node::group(vec![Node::rect(4.0, 4.0, Fill::Color(RED))])
            .at(10.0, 10.0)
            .with_opacity(0.5),
    ]);
    let out = render_stage(&s, 1.0).unwrap();
    assert_eq!(out.pixel(2, 2)[3], 0);
    let a = out.pixel(12, 12)[3];
    assert!((125..=131).contains(&a), "alpha {a}");
}

#[test]
fn destination_out_punches_a_hole() {
    let s = stage_with(vec![Node::group(vec![
        Node::rect(20.0, 20.0, Fill::Color(RED)),
        Node::rect(10.0, 10.0, Fill::Color(Rgba8::BLACK))
            .at(5.0, 5.0)
            .with_composite(Composite::DestinationOut),
    ])]);
    let out = render_stage(&s, 1.0).unwrap();
    assert_eq!(out.pixel(1, 1), [255, 0, 0, 255]);
    assert_eq!(out.pixel(10, 10)[3], 0);
}

#[test]
fn source_atop_stays_inside_existing_coverage() {
    let s = stage_with(vec![Node::group(vec![
        Node::rect(10.0, 20.0, Fill::Color(Rgba8::WHITE)),
        Node::group(vec![Node::rect(20.0, 20.0, Fill::Color(RED))]).with_composite(Composite::SourceAtop),
    ])]);
    let out = render_stage(&s, 1.0).unwrap();
    assert_eq!(out.pixel(5, 5), [255, 0, 0, 255]);
    assert_eq!(out.pixel(15, 5)[3], 0);
}

#[test]
fn shadows_fall_on_the_offset_side() {
    let shadow = Shadow {
        color: Rgba8::BLACK,
        blur: 0.0,
        offset_x: 0.0,
        offset_y: 6.0,
        opacity: 1.0,
    };
    let s = stage_with(vec![
        Node::rect(10.0, 10.0, Fill::Color(RED))
            .at(5.0, 2.0)
            .with_shadow(Some(shadow)),
    ]);
    let out = render_stage(&s, 1.0).unwrap();
    assert_eq!(out.pixel(10, 6), [255, 0, 0, 255]);
    assert_eq!(out.pixel(10, 15), [0, 0, 0, 255]);
    assert_eq!(out.pixel(10, 1)[3], 0);
}

#[test]
fn pattern_fill_tiles_from_the_shape_origin() {
    let mut tile = RasterLayer::new_transparent(8, 8).unwrap();
    for y in 0..4 {
        for x in 0..4 {
            let i = (y * 8 + x) * 4;
            tile.data_mut()[i..i + 4].copy_from_slice(&[255, 0, 0, 255]);
        }
    }
    let s = stage_with(vec![Node::rect(20.0, 20.0, Fill::Pattern(Arc::new(tile)))]);
    let out = render_stage(&s, 1.0).unwrap();
    assert_eq!(out.pixel(1, 1)[3], 255);
    assert_eq!(out.pixel(9, 9)[3], 255);
    assert_eq!(out.pixel(6, 6)[3], 0);
}

#[test]
fn image_nodes_stretch_their_raster() {
    let img = Arc::new(RasterLayer::filled(2, 2, RED).unwrap());
    let s = stage_with(vec![Node::image(img, 10.0, 10.0).at(5.0, 5.0)]);
    let out = render_stage(&s, 1.0).unwrap();
    assert_eq!(out.pixel(9, 9), [255, 0, 0, 255]);
    assert_eq!(out.pixel(17, 17)[3], 0);
}

#[test]
fn text_without_fonts_is_skipped() {
    let s = stage_with(vec![Node::text("title", 16.0, Rgba8::WHITE, 20.0, 20.0)]);
    assert!(render_stage(&s, 1.0).unwrap().is_fully_transparent());
}

#[test]
fn rendering_is_deterministic() {
    let s = stage_with(vec![
        Node::circle(6.0, Fill::Color(RED)).at(10.0, 10.0),
        Node::svg_path("M 2 2 L 18 18", Stroke::solid(Rgba8::WHITE, 2.0)).unwrap(),
    ]);
    let a = render_stage(&s, 1.5).unwrap();
    let b = render_stage(&s, 1.5).unwrap();
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert!(!a.is_fully_transparent());
}
