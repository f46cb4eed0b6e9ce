use kurbo::Shape;

use crate::assets::fonts::TextBrushRgba8;
use crate::foundation::core::{Affine, BezPath, Rect, Rgba8};
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::raster::layer::RasterLayer;

const TOLERANCE: f64 = 0.1;

/// Stroke description converted to a fill before rasterizing.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct StrokeSpec {
    pub(crate) width: f64,
    pub(crate) color: Rgba8,
    pub(crate) dash: Option<Vec<f64>>,
    pub(crate) round: bool,
}

/// Immediate-mode drawing surface backed by `vello_cpu`.
///
/// Every painter starts transparent; [`Painter::finish`] hands back a fresh [`RasterLayer`].
pub(crate) struct Painter {
    ctx: vello_cpu::RenderContext,
    width: u16,
    height: u16,
}

impl Painter {
    pub(crate) fn new(width: u32, height: u32) -> BackdropResult<Self> {
        RasterLayer::new_transparent(width, height)?;
        let w: u16 = width
            .try_into()
            .map_err(|_| BackdropError::capture("painter width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| BackdropError::capture("painter height exceeds u16"))?;
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.reset();
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(Self {
            ctx,
            width: w,
            height: h,
        })
    }

    pub(crate) fn set_transform(&mut self, transform: Affine) {
        self.ctx.set_transform(affine_to_cpu(transform));
    }

    pub(crate) fn push_opacity(&mut self, opacity: f32) -> bool {
        if opacity < 1.0 {
            self.ctx.push_opacity_layer(opacity.clamp(0.0, 1.0));
            true
        } else {
            false
        }
    }

    /// Clip later drawing to `path` until the matching [`Painter::pop`].
    pub(crate) fn push_clip(&mut self, path: &BezPath) {
        self.ctx.push_clip_layer(&bezpath_to_cpu(path));
    }

    pub(crate) fn pop(&mut self, pushed: bool) {
        if pushed {
            self.ctx.pop_layer();
        }
    }

    pub(crate) fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        if color.is_transparent() {
            return;
        }
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color.to_cpu());
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            rect.x0, rect.y0, rect.x1, rect.y1,
        ));
    }

    pub(crate) fn fill_rounded_rect(&mut self, rect: Rect, radius: f64, color: Rgba8) {
        if radius <= 0.0 {
            self.fill_rect(rect, color);
            return;
        }
        let path = rounded_rect_path(rect, radius);
        self.fill_path(&path, color);
    }

    pub(crate) fn fill_path(&mut self, path: &BezPath, color: Rgba8) {
        if color.is_transparent() {
            return;
        }
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color.to_cpu());
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    pub(crate) fn stroke_path(&mut self, path: &BezPath, stroke: &StrokeSpec) {
        if stroke.width <= 0.0 || stroke.color.is_transparent() {
            return;
        }
        let outline = stroke_to_fill(path, stroke);
        self.fill_path(&outline, stroke.color);
    }

    /// Fill `shape` with `image`, mapping image pixels through `paint_transform` first.
    pub(crate) fn fill_path_with_image(
        &mut self,
        shape: &BezPath,
        image: vello_cpu::Image,
        paint_transform: Affine,
    ) {
        self.ctx.set_paint_transform(affine_to_cpu(paint_transform));
        self.ctx.set_paint(image);
        self.ctx.fill_path(&bezpath_to_cpu(shape));
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }

    /// Draw `raster` stretched into `dest`, clipped to a rounded rect of `radius`.
    pub(crate) fn draw_raster(
        &mut self,
        raster: &RasterLayer,
        dest: Rect,
        radius: f64,
    ) -> BackdropResult<()> {
        if dest.width() <= 0.0 || dest.height() <= 0.0 {
            return Ok(());
        }
        let sx = dest.width() / f64::from(raster.width());
        let sy = dest.height() / f64::from(raster.height());
        let paint = Affine::translate((dest.x0, dest.y0)) * Affine::scale_non_uniform(sx, sy);
        let shape = rounded_rect_path(dest, radius.max(0.0));
        self.fill_path_with_image(&shape, raster.to_cpu_image()?, paint);
        Ok(())
    }

    /// Fill every glyph run of `layout`; `color` replaces the per-run brush when set.
    pub(crate) fn draw_glyph_layout(
        &mut self,
        layout: &parley::Layout<TextBrushRgba8>,
        font: &vello_cpu::peniko::FontData,
        color: Option<Rgba8>,
    ) {
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                let c = color.unwrap_or(Rgba8::new(brush.r, brush.g, brush.b, brush.a));
                self.ctx.set_paint(c.to_cpu());
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }

    pub(crate) fn finish(mut self) -> BackdropResult<RasterLayer> {
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        RasterLayer::from_pixmap(&pixmap)
    }
}

pub(crate) fn rounded_rect_path(rect: Rect, radius: f64) -> BezPath {
    let max_r = rect.width().min(rect.height()) / 2.0;
    let r = radius.clamp(0.0, max_r.max(0.0));
    let mut p = BezPath::new();
    if r <= 0.0 {
        for el in rect.path_elements(TOLERANCE) {
            p.push(el);
        }
    } else {
        for el in rect.to_rounded_rect(r).path_elements(TOLERANCE) {
            p.push(el);
        }
    }
    p
}

/// Rounded rect with per-corner radii `[top_left, top_right, bottom_right, bottom_left]`.
pub(crate) fn rounded_rect_radii_path(rect: Rect, radii: [f64; 4]) -> BezPath {
    if radii.iter().all(|r| *r == radii[0]) {
        return rounded_rect_path(rect, radii[0]);
    }
    let max_r = (rect.width().min(rect.height()) / 2.0).max(0.0);
    let [tl, tr, br, bl] = radii.map(|r| r.clamp(0.0, max_r));
    let mut p = BezPath::new();
    let radii = kurbo::RoundedRectRadii::new(tl, tr, br, bl);
    for el in kurbo::RoundedRect::from_rect(rect, radii).path_elements(TOLERANCE) {
        p.push(el);
    }
    p
}

pub(crate) fn circle_path(cx: f64, cy: f64, r: f64) -> BezPath {
    let mut p = BezPath::new();
    for el in kurbo::Circle::new((cx, cy), r.max(0.0)).path_elements(TOLERANCE) {
        p.push(el);
    }
    p
}

pub(crate) fn stroke_to_fill(path: &BezPath, stroke: &StrokeSpec) -> BezPath {
    let mut style = kurbo::Stroke::new(stroke.width);
    if stroke.round {
        style = style
            .with_caps(kurbo::Cap::Round)
            .with_join(kurbo::Join::Round);
    }
    if let Some(dash) = stroke.dash.as_ref().filter(|d| d.iter().any(|v| *v > 0.0)) {
        style = style.with_dashes(0.0, dash.iter().copied());
    }
    kurbo::stroke(
        path.elements().iter().copied(),
        &style,
        &kurbo::StrokeOpts::default(),
        TOLERANCE,
    )
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/raster/painter.rs"]
mod tests;
