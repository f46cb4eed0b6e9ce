//! Stage construction from editor state: pattern, texture and image layers.

use std::sync::Arc;

use crate::color::normalize::resolve_any;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::layout::frame::FrameInsets;
use crate::model::{
    FrameConfig, FrameKind, FrameTheme, PatternConfig, ScreenshotConfig, ShadowConfig,
    TextureConfig,
};
use crate::raster::layer::RasterLayer;
use crate::scene::graph::{Composite, Fill, Layer, Node, Shadow, Stage, Stroke, TextAlign};
use crate::scene::pattern::pattern_tile;

pub const PATTERN_LAYER: &str = "pattern";
pub const TEXTURE_LAYER: &str = "texture";
pub const IMAGE_LAYER: &str = "image";

const RULER_TICK_PITCH: f64 = 10.0;
const WINDOW_TITLE_SIZE: f64 = 16.0;
const WINDOW_BUTTONS: [(f64, &str); 3] = [(25.0, "#ff5f57"), (50.0, "#febc2e"), (75.0, "#28c840")];

/// Everything the stage needs from the editor.
#[derive(Clone, Debug)]
pub struct StageSpec<'a> {
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Fitted image size.
    pub image_width: f64,
    pub image_height: f64,
    pub image: Arc<RasterLayer>,
    pub screenshot: &'a ScreenshotConfig,
    pub frame: &'a FrameConfig,
    pub shadow: &'a ShadowConfig,
    pub pattern: &'a PatternConfig,
    /// Loaded texture and its settings.
    pub texture: Option<(&'a TextureConfig, Arc<RasterLayer>)>,
    pub image_opacity: f64,
    /// The image is drawn by the perspective overlay instead; keep it invisible here.
    pub has_3d: bool,
}

/// Build the live stage: optional pattern and texture layers below the image layer.
#[tracing::instrument(skip_all, fields(w = spec.canvas_width, h = spec.canvas_height))]
pub fn build_stage(spec: &StageSpec<'_>) -> BackdropResult<Stage> {
    let mut stage = Stage::new(spec.canvas_width, spec.canvas_height);
    if spec.pattern.enabled {
        let tile = Arc::new(pattern_tile(spec.pattern)?);
        stage.push_layer(Layer::new(
            PATTERN_LAYER,
            vec![
                Node::rect(spec.canvas_width, spec.canvas_height, Fill::Pattern(tile))
                    .with_opacity(spec.pattern.opacity),
            ],
        ));
    }
    if let Some((cfg, tex)) = spec.texture.as_ref().filter(|(cfg, _)| cfg.enabled) {
        stage.push_layer(Layer::new(
            TEXTURE_LAYER,
            vec![
                Node::rect(spec.canvas_width, spec.canvas_height, Fill::Pattern(Arc::clone(tex)))
                    .with_opacity(cfg.opacity),
            ],
        ));
    }
    stage.push_layer(Layer::new(IMAGE_LAYER, vec![image_group(spec)?]));
    tracing::debug!(layers = stage.layers.len(), "stage built");
    Ok(stage)
}

/// Canvas shadow for `cfg`, or `None` when disabled.
pub fn shadow_props(cfg: &ShadowConfig) -> BackdropResult<Option<Shadow>> {
    if !cfg.enabled {
        return Ok(None);
    }
    let color = resolve_any(&cfg.color)
        .ok_or_else(|| BackdropError::validation(format!("unsupported shadow color '{}'", cfg.color)))?;
    let (offset_x, offset_y) = cfg.offset();
    Ok(Some(Shadow {
        color,
        blur: cfg.softness,
        offset_x,
        offset_y,
        opacity: cfg.intensity,
    }))
}

fn color(value: &str) -> BackdropResult<Rgba8> {
    resolve_any(value).ok_or_else(|| BackdropError::validation(format!("unsupported frame color '{value}'")))
}

fn themed(theme: FrameTheme, dark: &str, light: &str) -> BackdropResult<Rgba8> {
    color(match theme {
        FrameTheme::Dark => dark,
        FrameTheme::Light => light,
    })
}

fn image_group(spec: &StageSpec<'_>) -> BackdropResult<Node> {
    let frame = spec.frame;
    let kind = frame.effective_kind();
    let insets = FrameInsets::for_frame(frame);
    let (iw, ih) = (spec.image_width, spec.image_height);
    let (fw, fh) = insets.framed_size(iw, ih);
    let (ix, iy) = insets.image_origin();
    let r = spec.screenshot.radius.max(0.0);
    let shadow = shadow_props(spec.shadow)?;

    let mut children = frame_nodes(spec, kind, &insets, (fw, fh), shadow)?;

    let image_radii = match kind {
        FrameKind::Window => [0.0, 0.0, r, r],
        FrameKind::Ruler => [r * 0.8; 4],
        _ => [r; 4],
    };
    let image_shadow = matches!(kind, FrameKind::None | FrameKind::Dotted)
        .then_some(shadow)
        .flatten();
    children.push(
        Node::image(Arc::clone(&spec.image), iw, ih)
            .named("main-image")
            .at(ix, iy)
            .with_radii(image_radii)
            .with_opacity(if spec.has_3d { 0.0 } else { spec.image_opacity })
            .with_shadow(image_shadow),
    );

    Ok(Node::group(children)
        .named("image-group")
        .at(
            spec.canvas_width / 2.0 + spec.screenshot.offset_x,
            spec.canvas_height / 2.0 + spec.screenshot.offset_y,
        )
        .with_offset(fw / 2.0, fh / 2.0)
        .rotated(spec.screenshot.rotation))
}

fn frame_nodes(
    spec: &StageSpec<'_>,
    kind: FrameKind,
    insets: &FrameInsets,
    (fw, fh): (f64, f64),
    shadow: Option<Shadow>,
) -> BackdropResult<Vec<Node>> {
    let frame = spec.frame;
    let r = spec.screenshot.radius.max(0.0);
    let (iw, ih) = (spec.image_width, spec.image_height);
    let mut out = Vec::new();
    match kind {
        FrameKind::None => {}
        FrameKind::Solid => {
            out.push(
                Node::rect(fw, fh, Fill::Color(color(&frame.color)?))
                    .with_radius(r)
                    .with_shadow(shadow),
            );
        }
        FrameKind::Glassy => {
            let (ix, iy) = insets.image_origin();
            out.push(
                Node::rect(iw, ih, Fill::Color(Rgba8::new(255, 255, 255, 38)))
                    .at(ix, iy)
                    .with_radius(r)
                    .with_stroke(Stroke::solid(Rgba8::new(255, 255, 255, 77), frame.width * 4.0 + 6.0))
                    .with_shadow(shadow),
            );
        }
        FrameKind::Ruler => out.push(ruler(fw, fh, r, shadow)),
        FrameKind::InfiniteMirror => {
            let c = color(&frame.color)?;
            for i in 0..4 {
                let k = f64::from(i);
                out.push(
                    Node::rect(fw + k * 15.0, fh + k * 15.0, Fill::None)
                        .at(-k * 7.5, -k * 7.5)
                        .with_radius(r + k * 5.0)
                        .with_stroke(Stroke::solid(c, 4.0))
                        .with_opacity(0.3 - k * 0.07)
                        .with_shadow(if i == 0 { shadow } else { None }),
                );
            }
        }
        FrameKind::Eclipse => {
            let eb = insets.eclipse_border;
            let (ix, iy) = insets.image_origin();
            out.push(Node::group(vec![
                Node::rect(fw, fh, Fill::Color(color(&frame.color)?))
                    .with_radius(r + eb / 2.0)
                    .with_shadow(shadow),
                Node::rect(iw, ih, Fill::Color(Rgba8::BLACK))
                    .at(ix, iy)
                    .with_radius(r)
                    .with_composite(Composite::DestinationOut),
            ]));
        }
        FrameKind::Stack => {
            let t = frame.theme;
            out.push(
                Node::rect(fw / 1.2, fh / 5.0, Fill::Color(themed(t, "#444444", "#f5f5f5")?))
                    .at((fw - fw / 1.2) / 2.0, -40.0)
                    .with_radius(r)
                    .with_shadow(shadow),
            );
            out.push(
                Node::rect(fw / 1.1, fh / 5.0, Fill::Color(themed(t, "#2a2a2a", "#f0f0f0")?))
                    .at((fw - fw / 1.1) / 2.0, -20.0)
                    .with_radius(r),
            );
            out.push(
                Node::rect(fw, fh, Fill::Color(themed(t, "#555555", "#e8e8e8")?))
                    .with_radius(r)
                    .with_shadow(shadow),
            );
        }
        FrameKind::Window => {
            let t = frame.theme;
            let header = insets.window_header;
            out.push(
                Node::rect(fw, fh, Fill::Color(themed(t, "#2f2f2f", "#fefefe")?))
                    .with_radii([r / 2.0, r / 2.0, r, r])
                    .with_shadow(shadow),
            );
            out.push(
                Node::rect(fw, header, Fill::Color(themed(t, "#4a4a4a", "#e2e2e2")?))
                    .with_radii([r, r, 0.0, 0.0]),
            );
            for (x, c) in WINDOW_BUTTONS {
                out.push(Node::circle(10.0, Fill::Color(color(c)?)).at(x, 20.0));
            }
            if !frame.title.is_empty() {
                out.push(
                    Node::text(
                        frame.title.clone(),
                        WINDOW_TITLE_SIZE,
                        themed(t, "#f0f0f0", "#4f4f4f")?,
                        fw,
                        header,
                    )
                    .with_align(TextAlign::Center),
                );
            }
        }
        FrameKind::Dotted => {
            out.push(Node::rect(fw, fh, Fill::None).with_radius(r).with_stroke(Stroke {
                color: color(&frame.color)?,
                width: frame.width,
                dash: Some(vec![frame.width * 2.0, frame.width * 1.2]),
                round: false,
            }));
        }
        FrameKind::Focus => {
            let c = color(&frame.color)?;
            let o = insets.frame_offset;
            let a = frame.width * 1.5;
            let stroke = Stroke {
                color: c,
                width: frame.width,
                dash: None,
                round: true,
            };
            let (x1, y1) = (o + iw, o + ih);
            let corners = [
                format!("M {o} {} Q {o} {o} {} {o}", o + a, o + a),
                format!("M {x1} {} Q {x1} {y1} {} {y1}", y1 - a, x1 - a),
                format!("M {} {o} Q {x1} {o} {x1} {}", x1 - a, o + a),
                format!("M {} {y1} Q {o} {y1} {o} {}", o + a, y1 - a),
            ];
            for d in corners {
                out.push(Node::svg_path(&d, stroke.clone())?.with_shadow(shadow));
            }
        }
    }
    Ok(out)
}

fn ruler(fw: f64, fh: f64, r: f64, shadow: Option<Shadow>) -> Node {
    let tick = Fill::Color(Rgba8::new(0, 0, 0, 204));
    let long = |i: usize| if (i + 1) % 5 == 0 { 10.0 } else { 5.0 };
    let mut marks = Vec::new();
    let across = ((fw / RULER_TICK_PITCH).floor() as usize).saturating_sub(1);
    let down = ((fh / RULER_TICK_PITCH).floor() as usize).saturating_sub(1);
    for i in 0..across {
        let x = i as f64 * RULER_TICK_PITCH;
        marks.push(Node::rect(2.0, long(i), tick.clone()).at(x, 1.0));
        marks.push(Node::rect(2.0, -long(i), tick.clone()).at(x, fh - 1.0));
    }
    for i in 0..down {
        let y = i as f64 * RULER_TICK_PITCH;
        marks.push(Node::rect(long(i), 2.0, tick.clone()).at(1.0, y));
        marks.push(Node::rect(-long(i), 2.0, tick.clone()).at(fw - 1.0, y));
    }
    Node::group(vec![
        Node::rect(fw, fh, Fill::Color(Rgba8::new(0, 0, 0, 77)))
            .with_radius(r)
            .with_shadow(shadow),
        Node::rect(fw - 1.0, fh - 1.0, Fill::None)
            .at(1.0, 1.0)
            .with_radius((r - 2.0).max(0.0))
            .with_stroke(Stroke::solid(Rgba8::new(255, 255, 255, 230), 1.0)),
        Node::group(vec![
            Node::rect(fw, fh, Fill::Color(Rgba8::new(255, 255, 255, 51))).with_radius(r),
            Node::group(marks).with_composite(Composite::SourceAtop),
        ]),
        Node::rect(fw, fh, Fill::None)
            .with_radius(r)
            .with_stroke(Stroke::solid(Rgba8::new(0, 0, 0, 38), 1.0)),
    ])
    .named("ruler")
}

#[cfg(test)]
#[path = "../../tests/unit/scene/builder.rs"]
mod tests;
