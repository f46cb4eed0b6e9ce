use super::*;

fn inputs() -> DimensionInputs {
    DimensionInputs {
        image_width: 1000.0,
        image_height: 1000.0,
        container_width: 1920.0,
        container_height: 1080.0,
        viewport_width: 1080.0 / VIEWPORT_SLACK,
        viewport_height: 1080.0,
        canvas_padding: 0.0,
        screenshot_scale: 1.0,
        aspect_ratio: Some(16.0 / 9.0),
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn square_image_in_wide_canvas() {
    let d = resolve_dimensions(&inputs());
    assert!(approx(d.canvas_width, 1080.0), "{d:?}");
    assert!(approx(d.canvas_height, 607.5), "{d:?}");
    assert!(approx(d.image_scaled_width, 607.5));
    assert!(approx(d.image_scaled_height, 607.5));
}

#[test]
fn padding_shrinks_canvas_and_content() {
    let mut i = inputs();
    i.canvas_padding = 20.0;
    let d = resolve_dimensions(&i);
    assert!(approx(d.canvas_width, 1040.0));
    assert!(approx(d.content_width, 1000.0));
    assert!(approx(d.content_height, d.canvas_height - 40.0));
}

#[test]
fn screenshot_scale_zooms_image_only() {
    let mut i = inputs();
    i.screenshot_scale = 0.5;
    let d = resolve_dimensions(&i);
    assert!(approx(d.canvas_width, 1080.0));
    assert!(approx(d.image_scaled_width, 303.75));
}

#[test]
fn height_limited_when_available_is_wider_than_aspect() {
    let mut i = inputs();
    i.viewport_width = f64::INFINITY;
    i.aspect_ratio = Some(1.0);
    let d = resolve_dimensions(&i);
    assert!(approx(d.canvas_height, 1080.0));
    assert!(approx(d.canvas_width, 1080.0));
}

#[test]
fn floor_keeps_aspect_and_minimum() {
    let mut i = inputs();
    i.container_width = 200.0;
    i.container_height = 100.0;
    i.viewport_width = f64::INFINITY;
    i.aspect_ratio = Some(2.0);
    let d = resolve_dimensions(&i);
    assert!(d.canvas_width >= MIN_CANVAS_SIZE && d.canvas_height >= MIN_CANVAS_SIZE);
    assert!(approx(d.canvas_width / d.canvas_height, 2.0));
}

#[test]
fn invariants_hold_across_a_grid() {
    let images = [(1000.0, 1000.0), (1920.0, 1080.0), (300.0, 2000.0), (7.0, 3.0)];
    let containers = [(50.0, 50.0), (800.0, 600.0), (1920.0, 1080.0), (400.0, 3000.0)];
    let aspects = [None, Some(1.0), Some(16.0 / 9.0), Some(9.0 / 16.0), Some(4.0)];
    let paddings = [0.0, 24.0, 400.0];
    for &(iw, ih) in &images {
        for &(cw, ch) in &containers {
            for &aspect in &aspects {
                for &padding in &paddings {
                    let i = DimensionInputs {
                        image_width: iw,
                        image_height: ih,
                        container_width: cw,
                        container_height: ch,
                        viewport_width: 1280.0,
                        viewport_height: 720.0,
                        canvas_padding: padding,
                        screenshot_scale: 0.9,
                        aspect_ratio: aspect,
                    };
                    let d = resolve_dimensions(&i);
                    assert!(d.canvas_width >= MIN_CANVAS_SIZE, "{i:?} -> {d:?}");
                    assert!(d.canvas_height >= MIN_CANVAS_SIZE, "{i:?} -> {d:?}");
                    let want = aspect.unwrap_or(cw / ch);
                    assert!(((d.canvas_width / d.canvas_height) - want).abs() < 1e-6);
                    let img = d.image_scaled_width / d.image_scaled_height;
                    assert!((img - iw / ih).abs() < 1e-9 * (iw / ih).max(1.0));
                    assert!(d.content_width >= 1.0 && d.content_height >= 1.0);
                }
            }
        }
    }
}

#[test]
fn growing_container_never_shrinks_canvas() {
    let mut prev = 0.0;
    for cw in [100.0, 400.0, 900.0, 1600.0, 2400.0] {
        let mut i = inputs();
        i.container_width = cw;
        i.viewport_width = f64::INFINITY;
        let d = resolve_dimensions(&i);
        assert!(d.canvas_width >= prev);
        prev = d.canvas_width;
    }
}

#[test]
fn degenerate_inputs_still_resolve() {
    let i = DimensionInputs {
        image_width: 0.0,
        image_height: f64::NAN,
        container_width: -1.0,
        container_height: 0.0,
        viewport_width: f64::NAN,
        viewport_height: 0.0,
        canvas_padding: f64::INFINITY,
        screenshot_scale: 0.0,
        aspect_ratio: Some(-2.0),
    };
    let d = resolve_dimensions(&i);
    assert!(d.canvas_width >= MIN_CANVAS_SIZE && d.canvas_height >= MIN_CANVAS_SIZE);
    assert!(approx(d.image_scaled_width, d.image_scaled_height));
}
