use super::*;
use crate::export::fixtures::{BLUE, GREEN, RED, near};

fn opts(scale: f64) -> CompositeOptions {
    CompositeOptions {
        width: 20,
        height: 10,
        scale,
    }
}

fn half_red() -> RasterLayer {
    let mut layer = RasterLayer::new_transparent(20, 10).unwrap();
    layer.draw_over(&RasterLayer::filled(10, 10, RED).unwrap(), 0, 0, 1.0);
    layer
}

#[test]
fn layers_stack_in_fixed_order() {
    let bg = RasterLayer::filled(20, 10, BLUE).unwrap();
    let scene = half_red();
    let mut over = RasterLayer::new_transparent(20, 10).unwrap();
    over.draw_over(&RasterLayer::filled(2, 2, GREEN).unwrap(), 0, 0, 1.0);

    let out = composite(&bg, &scene, Some(&over), &opts(1.0)).unwrap();
    assert!(near(out.pixel(0, 0), GREEN, 0));
    assert!(near(out.pixel(5, 5), RED, 0));
    assert!(near(out.pixel(15, 5), BLUE, 0));
}

#[test]
fn missing_overlays_leave_two_layers() {
    let bg = RasterLayer::filled(20, 10, BLUE).unwrap();
    let out = composite(&bg, &half_red(), None, &opts(1.0)).unwrap();
    assert!(near(out.pixel(5, 5), RED, 0));
    assert!(near(out.pixel(15, 5), BLUE, 0));
}

#[test]
fn mismatched_layers_are_stretched_to_the_target() {
    let bg = RasterLayer::filled(10, 5, BLUE).unwrap();
    let out = composite(&bg, &half_red(), None, &opts(2.0)).unwrap();
    assert_eq!((out.width(), out.height()), (40, 20));
    assert!(near(out.pixel(39, 19), BLUE, 0));
    assert!(near(out.pixel(5, 10), RED, 0));
}

#[test]
fn output_is_deterministic() {
    let bg = RasterLayer::filled(7, 3, BLUE).unwrap();
    let a = composite(&bg, &half_red(), None, &opts(1.5)).unwrap();
    let b = composite(&bg, &half_red(), None, &opts(1.5)).unwrap();
    assert_eq!(a.fingerprint(), b.fingerprint());
}
