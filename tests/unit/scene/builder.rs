use super::*;
use crate::scene::graph::SceneHandle;

struct Fixture {
    screenshot: ScreenshotConfig,
    frame: FrameConfig,
    shadow: ShadowConfig,
    pattern: PatternConfig,
    texture: TextureConfig,
    image: Arc<RasterLayer>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            screenshot: ScreenshotConfig {
                radius: 0.0,
                ..ScreenshotConfig::default()
            },
            frame: FrameConfig::default(),
            shadow: ShadowConfig::default(),
            pattern: PatternConfig::default(),
            texture: TextureConfig {
                enabled: true,
                source: "grain.png".into(),
                opacity: 0.5,
            },
            image: Arc::new(RasterLayer::filled(4, 4, Rgba8::new(255, 0, 0, 255)).unwrap()),
        }
    }

    fn spec(&self) -> StageSpec<'_> {
        StageSpec {
            canvas_width: 200.0,
            canvas_height: 100.0,
            image_width: 80.0,
            image_height: 40.0,
            image: Arc::clone(&self.image),
            screenshot: &self.screenshot,
            frame: &self.frame,
            shadow: &self.shadow,
            pattern: &self.pattern,
            texture: None,
            image_opacity: 1.0,
            has_3d: false,
        }
    }
}

#[test]
fn plain_stage_has_only_the_image_layer() {
    let fx = Fixture::new();
    let stage = build_stage(&fx.spec()).unwrap();
    assert_eq!(stage.layer_count(), 1);
    assert_eq!(stage.layers[0].name, IMAGE_LAYER);

    let out = stage.to_raster(1.0).unwrap();
    assert_eq!(out.pixel(100, 50), [255, 0, 0, 255]);
    assert_eq!(out.pixel(61, 50), [255, 0, 0, 255]);
    assert_eq!(out.pixel(58, 50)[3], 0);
    assert_eq!(out.pixel(100, 28)[3], 0);
}

#[test]
fn pattern_and_texture_layers_sit_below_the_image() {
    let mut fx = Fixture::new();
    fx.pattern.enabled = true;
    let tex = Arc::new(RasterLayer::filled(8, 8, Rgba8::WHITE).unwrap());
    let mut spec = fx.spec();
    spec.texture = Some((&fx.texture, tex));
    let stage = build_stage(&spec).unwrap();
    let names: Vec<&str> = stage.layers.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, [PATTERN_LAYER, TEXTURE_LAYER, IMAGE_LAYER]);
    assert!(stage.layers[0].is_decorative());
    assert!(stage.layers[1].is_decorative());
    assert!(!stage.layers[2].is_decorative());
}

#[test]
fn disabled_texture_is_left_out() {
    let mut fx = Fixture::new();
    fx.texture.enabled = false;
    let tex = Arc::new(RasterLayer::filled(8, 8, Rgba8::WHITE).unwrap());
    let mut spec = fx.spec();
    spec.texture = Some((&fx.texture, tex));
    assert_eq!(build_stage(&spec).unwrap().layer_count(), 1);
}

#[test]
fn solid_frame_surrounds_the_image() {
    let mut fx = Fixture::new();
    fx.frame = FrameConfig {
        width: 10.0,
        color: "#0000ff".into(),
        ..FrameConfig::of(FrameKind::Solid)
    };
    let out = build_stage(&fx.spec()).unwrap().to_raster(1.0).unwrap();
    // framed box is 100x60 centered at (100, 50)
    assert_eq!(out.pixel(55, 50), [0, 0, 255, 255]);
    assert_eq!(out.pixel(100, 50), [255, 0, 0, 255]);
    assert_eq!(out.pixel(48, 50)[3], 0);
}

#[test]
fn perspective_mode_hides_the_flat_image() {
    let fx = Fixture::new();
    let mut spec = fx.spec();
    spec.has_3d = true;
    let out = build_stage(&spec).unwrap().to_raster(1.0).unwrap();
    assert!(out.is_fully_transparent());
}

#[test]
fn window_frame_draws_traffic_lights() {
    let mut fx = Fixture::new();
    fx.frame = FrameConfig::of(FrameKind::Window);
    let out = build_stage(&fx.spec()).unwrap().to_raster(1.0).unwrap();
    // framed box: 120 x 120, top-left at (40, -10)
    let red = out.pixel(65, 10);
    assert_eq!(red, [0xff, 0x5f, 0x57, 255]);
}

#[test]
fn rotation_turns_the_group_about_its_center() {
    let mut fx = Fixture::new();
    fx.screenshot.rotation = 90.0;
    let out = build_stage(&fx.spec()).unwrap().to_raster(1.0).unwrap();
    assert_eq!(out.pixel(100, 25), [255, 0, 0, 255]);
    assert_eq!(out.pixel(70, 50)[3], 0);
}

#[test]
fn shadow_props_follow_side_and_softness() {
    let mut cfg = ShadowConfig {
        enabled: true,
        elevation: 12.0,
        softness: 8.0,
        intensity: 0.6,
        ..ShadowConfig::default()
    };
    let s = shadow_props(&cfg).unwrap().unwrap();
    assert_eq!((s.offset_x, s.offset_y), (0.0, 12.0));
    assert_eq!(s.blur, 8.0);
    assert_eq!(s.opacity, 0.6);
    cfg.enabled = false;
    assert_eq!(shadow_props(&cfg).unwrap(), None);
}

#[test]
fn every_frame_kind_renders() {
    for kind in [
        FrameKind::Glassy,
        FrameKind::Ruler,
        FrameKind::InfiniteMirror,
        FrameKind::Eclipse,
        FrameKind::Stack,
        FrameKind::Dotted,
        FrameKind::Focus,
    ] {
        let mut fx = Fixture::new();
        fx.frame = FrameConfig::of(kind);
        fx.shadow.enabled = true;
        fx.shadow.elevation = 4.0;
        let out = build_stage(&fx.spec()).unwrap().to_raster(1.0).unwrap();
        assert_eq!(out.pixel(100, 50), [255, 0, 0, 255], "{kind:?}");
    }
}
