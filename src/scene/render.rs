//! CPU renderer for the retained scene graph.
//!
//! Runs of plain nodes share one `vello_cpu` painter; groups, shadowed nodes and nodes with a
//! non-default composite are rendered in isolation and merged into their parent's buffer.

use crate::assets::fonts::{FontBook, TextLayoutEngine};
use crate::effects::blur::apply_blur;
use crate::foundation::core::{Affine, BezPath, Rect, Rgba8};
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::foundation::math::mul_div255_u8;
use crate::raster::layer::{MAX_RASTER_DIM, RasterLayer, ResampleFilter};
use crate::raster::painter::{Painter, StrokeSpec, circle_path, rounded_rect_radii_path};
use crate::scene::graph::{Composite, Fill, Node, NodeKind, Shadow, Stage, Stroke, TextAlign};

/// Render every visible layer of `stage` at `pixel_ratio` device px per stage unit.
#[tracing::instrument(skip_all, fields(w = stage.width, h = stage.height, pixel_ratio))]
pub fn render_stage(stage: &Stage, pixel_ratio: f64) -> BackdropResult<RasterLayer> {
    if !pixel_ratio.is_finite() || pixel_ratio <= 0.0 {
        return Err(BackdropError::capture(format!(
            "pixel ratio must be finite and > 0, got {pixel_ratio}"
        )));
    }
    let px = |v: f64| (v * pixel_ratio).round().max(1.0);
    let (pw, ph) = (px(stage.width), px(stage.height));
    if pw > f64::from(MAX_RASTER_DIM) || ph > f64::from(MAX_RASTER_DIM) {
        return Err(BackdropError::capture(format!(
            "stage snapshot {pw}x{ph} exceeds {MAX_RASTER_DIM}"
        )));
    }
    let mut r = NodeRenderer {
        pw: pw as u32,
        ph: ph as u32,
        fonts: &stage.fonts,
        text: None,
        warned_fonts: false,
    };
    let mut out = RasterLayer::new_transparent(r.pw, r.ph)?;
    let base = Affine::scale(pixel_ratio);
    for layer in stage.layers.iter().filter(|l| l.visible) {
        let pixels = r.render_nodes(&layer.nodes, base)?;
        out.draw_over(&pixels, 0, 0, 1.0);
    }
    tracing::debug!(pw = r.pw, ph = r.ph, "stage rendered");
    Ok(out)
}

struct NodeRenderer<'a> {
    pw: u32,
    ph: u32,
    fonts: &'a FontBook,
    text: Option<TextLayoutEngine>,
    warned_fonts: bool,
}

impl NodeRenderer<'_> {
    fn render_nodes(&mut self, nodes: &[Node], world: Affine) -> BackdropResult<RasterLayer> {
        let mut acc = RasterLayer::new_transparent(self.pw, self.ph)?;
        let mut batch: Option<Painter> = None;
        for node in nodes {
            if node.opacity <= 0.0 {
                continue;
            }
            let m = world * node.local_transform();
            let plain = node.shadow.is_none()
                && node.composite == Composite::SourceOver
                && !matches!(node.kind, NodeKind::Group(_));
            if plain {
                if batch.is_none() {
                    batch = Some(Painter::new(self.pw, self.ph)?);
                }
                if let Some(p) = batch.as_mut() {
                    self.paint_leaf(p, node, m)?;
                }
                continue;
            }
            if let Some(p) = batch.take() {
                acc.draw_over(&p.finish()?, 0, 0, 1.0);
            }
            let isolated = self.render_isolated(node, m)?;
            match node.composite {
                Composite::SourceOver => acc.draw_over(&isolated, 0, 0, 1.0),
                Composite::DestinationOut => acc.erase(&isolated, 0, 0, 1.0),
                Composite::SourceAtop => acc.draw_atop(&isolated, 0, 0, 1.0),
            }
        }
        if let Some(p) = batch {
            acc.draw_over(&p.finish()?, 0, 0, 1.0);
        }
        Ok(acc)
    }

    fn render_isolated(&mut self, node: &Node, m: Affine) -> BackdropResult<RasterLayer> {
        let content = match &node.kind {
            NodeKind::Group(children) => {
                let mut c = self.render_nodes(children, m)?;
                c.multiply_opacity(node.opacity as f32);
                c
            }
            _ => {
                let mut p = Painter::new(self.pw, self.ph)?;
                self.paint_leaf(&mut p, node, m)?;
                p.finish()?
            }
        };
        let Some(shadow) = node.shadow else {
            return Ok(content);
        };
        // Canvas shadows ignore rotation but follow the device scale.
        let device = m.determinant().abs().sqrt();
        let mut out = RasterLayer::new_transparent(self.pw, self.ph)?;
        let sil = apply_blur(silhouette(&content, &shadow), shadow.blur * device / 2.0)?;
        out.draw_over(
            &sil,
            (shadow.offset_x * device).round() as i64,
            (shadow.offset_y * device).round() as i64,
            1.0,
        );
        out.draw_over(&content, 0, 0, 1.0);
        Ok(out)
    }

    fn paint_leaf(&mut self, p: &mut Painter, node: &Node, m: Affine) -> BackdropResult<()> {
        p.set_transform(m);
        let pushed = p.push_opacity(node.opacity as f32);
        match &node.kind {
            NodeKind::Group(_) => {}
            NodeKind::Rect {
                width,
                height,
                radii,
                fill,
                stroke,
            } => {
                let bounds = Rect::new(0.0, 0.0, *width, *height).abs();
                let shape = rounded_rect_radii_path(bounds, *radii);
                fill_shape(p, &shape, fill, bounds, m)?;
                if let Some(s) = stroke {
                    p.stroke_path(&shape, &stroke_spec(s));
                }
            }
            NodeKind::Circle { radius, fill } => {
                let shape = circle_path(0.0, 0.0, *radius);
                let bounds = Rect::new(-radius, -radius, *radius, *radius);
                fill_shape(p, &shape, fill, bounds, m)?;
            }
            NodeKind::Image {
                layer,
                width,
                height,
                radii,
            } => {
                if *width > 0.0 && *height > 0.0 {
                    let shape = rounded_rect_radii_path(Rect::new(0.0, 0.0, *width, *height), *radii);
                    let paint = Affine::scale_non_uniform(
                        width / f64::from(layer.width()),
                        height / f64::from(layer.height()),
                    );
                    p.fill_path_with_image(&shape, layer.to_cpu_image()?, paint);
                }
            }
            NodeKind::Text {
                text,
                font_size,
                color,
                width,
                height,
                align,
            } => self.paint_text(p, text, *font_size, *color, (*width, *height), *align, m)?,
            NodeKind::Path { path, stroke } => p.stroke_path(path, &stroke_spec(stroke)),
        }
        p.pop(pushed);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn paint_text(
        &mut self,
        p: &mut Painter,
        text: &str,
        font_size: f64,
        color: Rgba8,
        size: (f64, f64),
        align: TextAlign,
        m: Affine,
    ) -> BackdropResult<()> {
        if text.is_empty() || color.is_transparent() {
            return Ok(());
        }
        let Some(face) = self.fonts.resolve(None) else {
            if !self.warned_fonts {
                tracing::warn!("no fonts available; stage text skipped");
                self.warned_fonts = true;
            }
            return Ok(());
        };
        let engine = self.text.get_or_insert_with(TextLayoutEngine::new);
        let layout = engine.layout_plain(
            text,
            face,
            font_size as f32,
            parley::style::FontWeight::NORMAL,
            color.into(),
            None,
        )?;
        let (lw, lh) = (f64::from(layout.width()), f64::from(layout.height()));
        let x = match align {
            TextAlign::Left => 0.0,
            TextAlign::Center => (size.0 - lw) / 2.0,
        };
        p.set_transform(m * Affine::translate((x, (size.1 - lh) / 2.0)));
        p.draw_glyph_layout(&layout, &face.cpu_font(), None);
        p.set_transform(m);
        Ok(())
    }
}

fn stroke_spec(s: &Stroke) -> StrokeSpec {
    StrokeSpec {
        width: s.width,
        color: s.color,
        dash: s.dash.clone(),
        round: s.round,
    }
}

fn fill_shape(p: &mut Painter, shape: &BezPath, fill: &Fill, bounds: Rect, m: Affine) -> BackdropResult<()> {
    match fill {
        Fill::None => {}
        Fill::Color(c) => p.fill_path(shape, *c),
        Fill::Pattern(tile) => {
            let device = m.determinant().abs().sqrt().max(1e-6);
            let dev = |v: f64| (v * device).round().clamp(1.0, f64::from(MAX_RASTER_DIM)) as u32;
            let tile = tile.resampled(
                dev(f64::from(tile.width())),
                dev(f64::from(tile.height())),
                ResampleFilter::Nearest,
            )?;
            let cover = |v: f64| (v * device).ceil().clamp(1.0, f64::from(MAX_RASTER_DIM)) as u32;
            let tiled = tile.tiled(cover(bounds.width()), cover(bounds.height()))?;
            let paint = Affine::translate((bounds.x0, bounds.y0)) * Affine::scale(1.0 / device);
            p.fill_path_with_image(shape, tiled.to_cpu_image()?, paint);
        }
    }
    Ok(())
}

/// Shadow-colored copy of `content`'s coverage.
fn silhouette(content: &RasterLayer, shadow: &Shadow) -> RasterLayer {
    let tint = shadow.color.with_opacity(shadow.opacity.clamp(0.0, 1.0));
    let mut out = content.clone();
    for px in out.data_mut().chunks_exact_mut(4) {
        let a = mul_div255_u8(u16::from(px[3]), u16::from(tint.a));
        px[0] = mul_div255_u8(u16::from(tint.r), u16::from(a));
        px[1] = mul_div255_u8(u16::from(tint.g), u16::from(a));
        px[2] = mul_div255_u8(u16::from(tint.b), u16::from(a));
        px[3] = a;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/scene/render.rs"]
mod tests;
