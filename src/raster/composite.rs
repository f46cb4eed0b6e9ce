use crate::foundation::error::{BackdropError, BackdropResult};
use crate::foundation::math::mul_div255_u8;

/// Separable blend modes supported by the raster pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Plain source-over.
    #[default]
    Normal,
    /// CSS `overlay`: multiply dark backdrop, screen light backdrop.
    Overlay,
    /// CSS `multiply`.
    Multiply,
    /// CSS `screen`.
    Screen,
}

impl BlendMode {
    /// Parse a CSS `mix-blend-mode` keyword.
    pub fn from_css(s: &str) -> Option<Self> {
        match s.trim() {
            "normal" => Some(Self::Normal),
            "overlay" => Some(Self::Overlay),
            "multiply" => Some(Self::Multiply),
            "screen" => Some(Self::Screen),
            _ => None,
        }
    }
}

/// Overlay blend for one unpremultiplied channel (`s` source, `d` backdrop).
pub fn overlay_channel(s: f32, d: f32) -> f32 {
    if d <= 0.5 {
        2.0 * s * d
    } else {
        1.0 - 2.0 * (1.0 - s) * (1.0 - d)
    }
}

/// Premultiplied source-over of equal-length RGBA8 buffers.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> BackdropResult<()> {
    check_pair(dst, src)?;
    let op = ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16;
    if op == 0 {
        return Ok(());
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        over_px(d, s, op);
    }
    Ok(())
}

/// Composite `src` onto `dst` with the given blend mode and opacity.
pub fn blend_in_place(
    dst: &mut [u8],
    src: &[u8],
    opacity: f32,
    mode: BlendMode,
) -> BackdropResult<()> {
    check_pair(dst, src)?;
    match mode {
        BlendMode::Normal => over_in_place(dst, src, opacity),
        BlendMode::Overlay => {
            blend_px_run(dst, src, opacity, overlay_channel);
            Ok(())
        }
        BlendMode::Multiply => {
            blend_px_run(dst, src, opacity, |s, d| s * d);
            Ok(())
        }
        BlendMode::Screen => {
            blend_px_run(dst, src, opacity, |s, d| s + d - s * d);
            Ok(())
        }
    }
}

/// Source-over of a single premultiplied pixel with `op` in `0..=255`.
#[inline]
pub(crate) fn over_px(d: &mut [u8], s: &[u8], op: u16) {
    let sa = mul_div255_u8(u16::from(s[3]), op);
    if sa == 0 {
        return;
    }
    let inv = 255u16 - u16::from(sa);
    d[3] = sa.saturating_add(mul_div255_u8(u16::from(d[3]), inv));
    for c in 0..3 {
        let sc = mul_div255_u8(u16::from(s[c]), op);
        let dc = mul_div255_u8(u16::from(d[c]), inv);
        d[c] = sc.saturating_add(dc);
    }
}

/// Blend a single premultiplied pixel.
///
/// `out_p = sp*(1-da) + dp*(1-sa) + B(sc,dc)*sa*da`, with `B` applied to unpremultiplied channels.
#[inline]
pub(crate) fn blend_px<F>(d: &mut [u8], s: &[u8], opacity: f32, blend_fn: &F)
where
    F: Fn(f32, f32) -> f32,
{
    let sa = (f32::from(s[3]) / 255.0) * opacity;
    if sa <= 0.0 {
        return;
    }
    let da = f32::from(d[3]) / 255.0;
    let out_a = (sa + da * (1.0 - sa)).clamp(0.0, 1.0);

    for c in 0..3 {
        let sp = (f32::from(s[c]) / 255.0) * opacity;
        let dp = f32::from(d[c]) / 255.0;
        let sc = (sp / sa).clamp(0.0, 1.0);
        let dc = if da > 0.0 { (dp / da).clamp(0.0, 1.0) } else { 0.0 };
        let b = blend_fn(sc, dc).clamp(0.0, 1.0);
        let out = (sp * (1.0 - da) + dp * (1.0 - sa) + b * sa * da).clamp(0.0, 1.0);
        d[c] = (out * 255.0).round() as u8;
    }
    d[3] = (out_a * 255.0).round() as u8;
}

fn blend_px_run<F>(dst: &mut [u8], src: &[u8], opacity: f32, blend_fn: F)
where
    F: Fn(f32, f32) -> f32,
{
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return;
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        blend_px(d, s, opacity, &blend_fn);
    }
}

fn check_pair(dst: &[u8], src: &[u8]) -> BackdropResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(BackdropError::capture(
            "compositing expects equal-length rgba8 buffers",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/raster/composite.rs"]
mod tests;
