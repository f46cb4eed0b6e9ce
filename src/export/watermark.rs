//! Watermark stamper: fixed branding mark in the bottom-right corner.

use crate::foundation::core::{Affine, BezPath, Rgba8};
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::raster::layer::RasterLayer;
use crate::raster::painter::{Painter, StrokeSpec};

/// Text and color of the mark.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatermarkStyle {
    pub text: String,
    pub color: Rgba8,
}

/// Glyph outlines in em units: baseline at 1.0, x-height at 0.5.
const GLYPHS: &[(char, f64, &str)] = &[
    (
        's',
        0.42,
        "M0.36 0.58 C0.32 0.5 0.08 0.48 0.06 0.62 C0.04 0.76 0.36 0.72 0.36 0.86 \
         C0.36 1.02 0.08 1.0 0.04 0.92",
    ),
    ('t', 0.34, "M0.14 0.24 L0.14 0.9 C0.14 1.0 0.24 1.0 0.3 0.97 M0.02 0.5 L0.28 0.5"),
    (
        'a',
        0.46,
        "M0.38 0.5 L0.38 1.0 M0.38 0.75 C0.38 0.42 0.04 0.42 0.04 0.75 \
         C0.04 1.08 0.38 1.08 0.38 0.75",
    ),
    (
        'g',
        0.46,
        "M0.38 0.5 L0.38 1.1 C0.38 1.32 0.1 1.32 0.06 1.2 M0.38 0.74 \
         C0.38 0.42 0.04 0.42 0.04 0.74 C0.04 1.04 0.38 1.04 0.38 0.74",
    ),
    (
        'e',
        0.44,
        "M0.05 0.75 L0.39 0.75 C0.39 0.42 0.05 0.42 0.05 0.75 C0.05 1.06 0.32 1.04 0.38 0.94",
    ),
];

const SPACE_ADVANCE: f64 = 0.3;
const UNKNOWN_ADVANCE: f64 = 0.4;
const LETTER_SPACING: f64 = 0.12;
/// Lowest descender, in em.
const EM_DEPTH: f64 = 1.3;

/// Mark height in px for a `width x height` buffer.
pub(crate) fn mark_height(width: u32, height: u32) -> f64 {
    (f64::from(width.min(height)) * 0.035).clamp(12.0, 64.0)
}

/// Stamp `style` onto `layer`.
#[tracing::instrument(skip_all, fields(text = %style.text, w = layer.width(), h = layer.height()))]
pub fn stamp_watermark(mut layer: RasterLayer, style: &WatermarkStyle) -> BackdropResult<RasterLayer> {
    let em = mark_height(layer.width(), layer.height());
    let stroke = StrokeSpec {
        width: em * 0.12,
        color: style.color,
        dash: None,
        round: true,
    };

    let mut glyphs = Vec::new();
    let mut pen = 0.0;
    for ch in style.text.chars() {
        if ch == ' ' {
            pen += SPACE_ADVANCE + LETTER_SPACING;
            continue;
        }
        match GLYPHS.iter().find(|(c, _, _)| *c == ch.to_ascii_lowercase()) {
            Some((_, advance, svg)) => {
                let path = BezPath::from_svg(svg).map_err(|e| {
                    BackdropError::capture(format!("watermark glyph '{ch}': {e}"))
                })?;
                glyphs.push((pen, path));
                pen += advance + LETTER_SPACING;
            }
            None => {
                tracing::warn!(%ch, "watermark glyph not available");
                pen += UNKNOWN_ADVANCE + LETTER_SPACING;
            }
        }
    }
    if glyphs.is_empty() {
        return Ok(layer);
    }
    let text_w = (pen - LETTER_SPACING) * em;
    let margin = em * 0.8;
    let pad = stroke.width.ceil() + 1.0;

    let box_w = (text_w + 2.0 * pad).ceil() as u32;
    let box_h = (EM_DEPTH * em + 2.0 * pad).ceil() as u32;
    let mut painter = Painter::new(box_w, box_h)?;
    for (x, mut path) in glyphs {
        path.apply_affine(Affine::translate((pad + x * em, pad)) * Affine::scale(em));
        painter.stroke_path(&path, &stroke);
    }
    let mark = painter.finish()?;

    let x = (f64::from(layer.width()) - margin - text_w - pad).round() as i64;
    let y = (f64::from(layer.height()) - margin - EM_DEPTH * em - pad).round() as i64;
    tracing::debug!(x, y, em, "watermark placed");
    layer.draw_over(&mark, x, y, 1.0);
    Ok(layer)
}

#[cfg(test)]
#[path = "../../tests/unit/export/watermark.rs"]
mod tests;
