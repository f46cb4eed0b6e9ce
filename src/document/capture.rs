//! Flat (2D) capture of an element subtree: the "DOM-to-raster" path.
//!
//! Handles backgrounds, images, text, opacity, rounded clips and 2D transforms. CSS `filter`
//! and 3D transform functions are not evaluated; callers that need them re-apply blur
//! numerically or use [`crate::document::capture_3d`].

use kurbo::Shape as _;

use crate::assets::fonts::{TextBrushRgba8, TextLayoutEngine, css_font_weight};
use crate::color::gradient::{BackgroundImage, parse_background_image};
use crate::color::parse::parse_css_color;
use crate::document::images::{StoredImage, short};
use crate::document::style::{BackgroundSize, ObjectFit, Style, TransformOp, transform_to_css};
use crate::document::{Content, Document, Element, element_rect};
use crate::effects::blur::apply_blur;
use crate::foundation::core::{Affine, Rect, Rgba8};
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::raster::layer::{RasterLayer, ResampleFilter};
use crate::raster::painter::{Painter, StrokeSpec, rounded_rect_path};

/// Flat capture settings.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureOptions {
    /// Logical width of the captured area.
    pub width: f64,
    /// Logical height of the captured area.
    pub height: f64,
    /// Device pixels per logical px.
    pub scale: f64,
    /// Canvas fill under the content; `None` keeps it transparent.
    pub background: Option<Rgba8>,
    /// Elements (and their subtrees) left out of the capture.
    pub ignore_ids: Vec<String>,
    /// Read cross-origin images requested with `crossOrigin`.
    pub use_cors: bool,
    /// Read any cross-origin image.
    pub allow_taint: bool,
    /// Stylesheets whose href contains one of these are ignored.
    pub suppress_stylesheets: Vec<String>,
}

impl CaptureOptions {
    pub fn new(width: f64, height: f64, scale: f64) -> Self {
        Self {
            width,
            height,
            scale,
            background: None,
            ignore_ids: Vec::new(),
            use_cors: false,
            allow_taint: false,
            suppress_stylesheets: Vec::new(),
        }
    }

    /// Output raster size.
    pub fn pixel_size(&self) -> (u32, u32) {
        let px = |v: f64| (v * self.scale).round().max(1.0) as u32;
        (px(self.width), px(self.height))
    }
}

/// Rasterize the subtree rooted at `root_id` as if it sat at the origin of a
/// `width x height` viewport.
#[tracing::instrument(skip_all, fields(root = root_id, w = opts.width, h = opts.height, scale = opts.scale))]
pub fn capture(doc: &Document, root_id: &str, opts: &CaptureOptions) -> BackdropResult<RasterLayer> {
    for (name, v) in [("width", opts.width), ("height", opts.height), ("scale", opts.scale)] {
        if !v.is_finite() || v <= 0.0 {
            return Err(BackdropError::capture(format!(
                "capture {name} must be finite and > 0, got {v}"
            )));
        }
    }
    let root = doc
        .element_by_id(root_id)
        .ok_or_else(|| BackdropError::capture(format!("capture root '{root_id}' not found")))?;
    let (pw, ph) = opts.pixel_size();
    let mut out = match opts.background {
        Some(c) => RasterLayer::filled(pw, ph, c)?,
        None => RasterLayer::new_transparent(pw, ph)?,
    };

    let mut flat = FlatCapture {
        doc,
        opts,
        pw,
        ph,
        text: None,
        warned_3d: false,
        warned_fonts: false,
    };
    flat.paint_element(&mut out, root, Affine::scale(opts.scale), (opts.width, opts.height), true)?;
    tracing::debug!(pw, ph, "flat capture done");
    Ok(out)
}

struct FlatCapture<'a> {
    doc: &'a Document,
    opts: &'a CaptureOptions,
    pw: u32,
    ph: u32,
    text: Option<TextLayoutEngine>,
    warned_3d: bool,
    warned_fonts: bool,
}

struct TextBlock {
    layout: parley::Layout<TextBrushRgba8>,
    font: vello_cpu::peniko::FontData,
    width: f64,
    height: f64,
}

impl FlatCapture<'_> {
    fn paint_element(
        &mut self,
        target: &mut RasterLayer,
        el: &Element,
        parent_world: Affine,
        parent_size: (f64, f64),
        is_root: bool,
    ) -> BackdropResult<()> {
        if self.opts.ignore_ids.iter().any(|id| *id == el.id) {
            return Ok(());
        }
        let style = self
            .doc
            .effective_style(el, &self.opts.suppress_stylesheets);
        if !style.visible || style.opacity <= 0.0 {
            return Ok(());
        }
        if let Some(blur) = style.blur_filter() {
            tracing::debug!(id = %el.id, blur, "css blur is not evaluated by flat capture");
        }

        let mut rect = element_rect(&style, parent_size.0, parent_size.1);
        if is_root {
            rect = Rect::from_origin_size((0.0, 0.0), rect.size());
        }
        let text = match &el.content {
            Content::Text(t) if !t.is_empty() => self.layout_text(t, &style, rect.width())?,
            _ => None,
        };
        if let Some(block) = &text {
            let (tw, th) = if style.vertical_writing {
                (block.height, block.width)
            } else {
                (block.width, block.height)
            };
            if style.width.is_none() {
                rect.x1 = rect.x0 + tw;
            }
            if style.height.is_none() {
                rect.y1 = rect.y0 + th;
            }
        }
        let (w, h) = (rect.width(), rect.height());
        let world =
            parent_world * Affine::translate((rect.x0, rect.y0)) * self.local_transform(&style, w, h);

        let mut layer = RasterLayer::new_transparent(self.pw, self.ph)?;
        self.paint_box(&mut layer, &style, world, w, h)?;
        if let Content::Image(img) = &el.content {
            self.paint_image(&mut layer, &img.src, img.cors, &style, world, w, h)?;
        }
        if let Some(block) = &text {
            self.paint_text(&mut layer, block, &style, world)?;
        }

        let mut children: Vec<&Element> = el.children.iter().collect();
        children.sort_by_key(|c| c.style.z_index);
        for child in children {
            self.paint_element(&mut layer, child, world, (w, h), false)?;
        }

        if style.overflow_hidden {
            let mut mask = Painter::new(self.pw, self.ph)?;
            mask.set_transform(world);
            mask.fill_rounded_rect(Rect::new(0.0, 0.0, w, h), style.border_radius, Rgba8::WHITE);
            layer.mask_with(&mask.finish()?)?;
        }
        target.draw_blend(&layer, 0, 0, style.opacity as f32, style.mix_blend_mode);
        Ok(())
    }

    fn local_transform(&mut self, style: &Style, w: f64, h: f64) -> Affine {
        if style.transform.is_empty() {
            return Affine::IDENTITY;
        }
        let ox = style.transform_origin.0.resolve(w);
        let oy = style.transform_origin.1.resolve(h);
        if style.has_3d_transform() && !self.warned_3d {
            tracing::warn!(
                transform = %transform_to_css(&style.transform),
                "3D transform functions are ignored by flat capture"
            );
            self.warned_3d = true;
        }
        let mut m = Affine::IDENTITY;
        for op in &style.transform {
            m = m * match *op {
                TransformOp::Translate(x, y) => Affine::translate((x.resolve(w), y.resolve(h))),
                TransformOp::Scale(sx, sy) => Affine::scale_non_uniform(sx, sy),
                TransformOp::Rotate(a) | TransformOp::RotateZ(a) => Affine::rotate(a.to_radians()),
                TransformOp::RotateX(_) | TransformOp::RotateY(_) | TransformOp::Perspective(_) => {
                    Affine::IDENTITY
                }
            };
        }
        Affine::translate((ox, oy)) * m * Affine::translate((-ox, -oy))
    }

    fn readable(&self, stored: &StoredImage, cors: bool) -> bool {
        stored.same_origin || self.opts.allow_taint || (self.opts.use_cors && cors)
    }

    fn paint_box(
        &mut self,
        layer: &mut RasterLayer,
        style: &Style,
        world: Affine,
        w: f64,
        h: f64,
    ) -> BackdropResult<()> {
        let has_bg = style.background_color.is_some() || style.background_image.is_some();
        let has_border = style.border_width > 0.0 && style.border_color.is_some();
        if (!has_bg && !has_border) || w <= 0.0 || h <= 0.0 {
            return Ok(());
        }
        let mut p = Painter::new(self.pw, self.ph)?;
        p.set_transform(world);
        let bounds = Rect::new(0.0, 0.0, w, h);
        let radius = style.border_radius;

        if let Some(value) = style.background_color.as_deref() {
            match parse_css_color(value) {
                Some(c) => p.fill_rounded_rect(bounds, radius, c),
                None => tracing::warn!(value, "unsupported background color skipped"),
            }
        }

        if let Some(value) = style.background_image.as_deref() {
            let device = world.determinant().abs().sqrt().max(1e-6);
            // First listed layer paints on top.
            for item in parse_background_image(value).into_iter().rev() {
                match item {
                    Ok(BackgroundImage::Gradient(g)) => {
                        let gw = (w * device).ceil().clamp(1.0, 16_384.0) as u32;
                        let gh = (h * device).ceil().clamp(1.0, 16_384.0) as u32;
                        let raster = g.rasterize(gw, gh)?;
                        p.draw_raster(&raster, bounds, radius)?;
                    }
                    Ok(BackgroundImage::Url(url)) => {
                        self.paint_background_url(&mut p, &url, style, device, w, h)?;
                    }
                    Err(layer) => {
                        tracing::warn!(layer = %short(&layer), "unsupported background layer skipped")
                    }
                }
            }
        }

        if has_border && let Some(c) = style.border_color.as_deref().and_then(parse_css_color) {
            let bw = style.border_width;
            let inner = Rect::new(bw / 2.0, bw / 2.0, w - bw / 2.0, h - bw / 2.0);
            if inner.width() > 0.0 && inner.height() > 0.0 {
                p.stroke_path(
                    &rounded_rect_path(inner, (radius - bw / 2.0).max(0.0)),
                    &StrokeSpec {
                        width: bw,
                        color: c,
                        dash: None,
                        round: false,
                    },
                );
            }
        }
        layer.draw_over(&p.finish()?, 0, 0, 1.0);
        Ok(())
    }

    fn paint_background_url(
        &mut self,
        p: &mut Painter,
        url: &str,
        style: &Style,
        device: f64,
        w: f64,
        h: f64,
    ) -> BackdropResult<()> {
        let doc = self.doc;
        let Some(stored) = doc.images.get(url) else {
            tracing::warn!(src = %short(url), "background image not loaded; skipped");
            return Ok(());
        };
        if !self.readable(stored, true) {
            tracing::warn!(src = %short(url), "tainted background image skipped");
            return Ok(());
        }
        let img = stored.layer.as_ref();
        let (iw, ih) = (f64::from(img.width()), f64::from(img.height()));
        let bounds = Rect::new(0.0, 0.0, w, h);
        let shape = rounded_rect_path(bounds, style.border_radius);
        let (dw, dh) = match style.background_size {
            BackgroundSize::Cover => {
                let k = (w / iw).max(h / ih);
                (iw * k, ih * k)
            }
            BackgroundSize::Contain => {
                let k = (w / iw).min(h / ih);
                (iw * k, ih * k)
            }
            BackgroundSize::Auto => (iw, ih),
            BackgroundSize::Tile(tw, th) => (tw.max(1e-3), th.max(1e-3)),
        };
        let repeat = style.background_repeat
            && matches!(style.background_size, BackgroundSize::Auto | BackgroundSize::Tile(..));
        if repeat {
            let tile_w = (dw * device).round().clamp(1.0, 16_384.0) as u32;
            let tile_h = (dh * device).round().clamp(1.0, 16_384.0) as u32;
            let tile = img.resampled(tile_w, tile_h, ResampleFilter::Nearest)?;
            let full_w = (w * device).ceil().clamp(1.0, 16_384.0) as u32;
            let full_h = (h * device).ceil().clamp(1.0, 16_384.0) as u32;
            let tiled = tile.tiled(full_w, full_h)?;
            p.fill_path_with_image(&shape, tiled.to_cpu_image()?, Affine::scale(1.0 / device));
        } else {
            let (x, y) = match style.background_size {
                BackgroundSize::Cover | BackgroundSize::Contain => ((w - dw) / 2.0, (h - dh) / 2.0),
                _ => (0.0, 0.0),
            };
            let paint = Affine::translate((x, y)) * Affine::scale_non_uniform(dw / iw, dh / ih);
            p.fill_path_with_image(&shape, img.to_cpu_image()?, paint);
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn paint_image(
        &mut self,
        layer: &mut RasterLayer,
        src: &str,
        cors: bool,
        style: &Style,
        world: Affine,
        w: f64,
        h: f64,
    ) -> BackdropResult<()> {
        let doc = self.doc;
        let Some(stored) = doc.images.get(src) else {
            tracing::warn!(src = %short(src), "image not loaded; skipped");
            return Ok(());
        };
        if !self.readable(stored, cors) {
            tracing::warn!(src = %short(src), "tainted image skipped");
            return Ok(());
        }
        if w <= 0.0 || h <= 0.0 {
            return Ok(());
        }
        let img = stored.layer.as_ref();
        let dest = object_fit_rect(style.object_fit, img.width(), img.height(), w, h);
        let frame = Rect::new(0.0, 0.0, w, h);
        let visible = dest.intersect(frame);
        if visible.width() <= 0.0 || visible.height() <= 0.0 {
            return Ok(());
        }
        let mut p = Painter::new(self.pw, self.ph)?;
        p.set_transform(world);
        // Letterboxed space stays empty; the rounded box only clips.
        p.push_clip(&rounded_rect_path(frame, style.border_radius));
        let paint = Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(
                dest.width() / f64::from(img.width()),
                dest.height() / f64::from(img.height()),
            );
        p.fill_path_with_image(&visible.to_path(0.1), img.to_cpu_image()?, paint);
        p.pop(true);
        layer.draw_over(&p.finish()?, 0, 0, 1.0);
        Ok(())
    }

    fn layout_text(
        &mut self,
        text: &str,
        style: &Style,
        box_w: f64,
    ) -> BackdropResult<Option<TextBlock>> {
        let doc = self.doc;
        let Some(face) = doc.fonts.resolve(style.font_family.as_deref()) else {
            if !self.warned_fonts {
                tracing::warn!("no fonts available; text skipped");
                self.warned_fonts = true;
            }
            return Ok(None);
        };
        let color = match style.color.as_deref() {
            None => Rgba8::BLACK,
            Some(v) => match parse_css_color(v) {
                Some(c) => c,
                None => {
                    tracing::warn!(value = v, "unsupported text color; text skipped");
                    return Ok(None);
                }
            },
        };
        let wrap = (!style.white_space_nowrap && style.width.is_some()).then_some(box_w as f32);
        let engine = self.text.get_or_insert_with(TextLayoutEngine::new);
        let weight = css_font_weight(style.font_weight.as_deref());
        let layout = engine.layout_plain(
            text,
            face,
            style.font_size as f32,
            weight,
            color.into(),
            wrap,
        )?;
        let (width, height) = (f64::from(layout.width()), f64::from(layout.height()));
        Ok(Some(TextBlock {
            layout,
            font: face.cpu_font(),
            width,
            height,
        }))
    }

    fn paint_text(
        &mut self,
        layer: &mut RasterLayer,
        block: &TextBlock,
        style: &Style,
        world: Affine,
    ) -> BackdropResult<()> {
        let orient = if style.vertical_writing {
            Affine::translate((block.height, 0.0)) * Affine::rotate(std::f64::consts::FRAC_PI_2)
        } else {
            Affine::IDENTITY
        };
        let device = world.determinant().abs().sqrt();
        // First listed shadow paints on top.
        for shadow in style.text_shadow.iter().rev() {
            let Some(color) = parse_css_color(&shadow.color) else {
                tracing::warn!(value = %shadow.color, "unsupported shadow color skipped");
                continue;
            };
            if color.is_transparent() {
                continue;
            }
            let mut p = Painter::new(self.pw, self.ph)?;
            p.set_transform(world * Affine::translate((shadow.offset_x, shadow.offset_y)) * orient);
            p.draw_glyph_layout(&block.layout, &block.font, Some(color));
            let shadow_layer = apply_blur(p.finish()?, shadow.blur * device / 2.0)?;
            layer.draw_over(&shadow_layer, 0, 0, 1.0);
        }
        let mut p = Painter::new(self.pw, self.ph)?;
        p.set_transform(world * orient);
        p.draw_glyph_layout(&block.layout, &block.font, None);
        layer.draw_over(&p.finish()?, 0, 0, 1.0);
        Ok(())
    }
}

/// Destination of replaced content inside a `w x h` box.
pub(crate) fn object_fit_rect(fit: ObjectFit, iw: u32, ih: u32, w: f64, h: f64) -> Rect {
    let (iw, ih) = (f64::from(iw), f64::from(ih));
    let k = match fit {
        ObjectFit::Fill => return Rect::new(0.0, 0.0, w, h),
        ObjectFit::Contain => (w / iw).min(h / ih),
        ObjectFit::Cover => (w / iw).max(h / ih),
    };
    let (dw, dh) = (iw * k, ih * k);
    Rect::new((w - dw) / 2.0, (h - dh) / 2.0, (w + dw) / 2.0, (h + dh) / 2.0)
}

#[cfg(test)]
#[path = "../../tests/unit/document/capture.rs"]
mod tests;
