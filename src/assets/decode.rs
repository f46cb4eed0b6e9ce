use anyhow::Context;
use base64::Engine as _;

use crate::foundation::error::{BackdropError, BackdropResult};
use crate::raster::layer::{MAX_RASTER_DIM, RasterLayer};

/// Decode PNG/JPEG/... bytes into a premultiplied layer.
pub fn decode_image(bytes: &[u8]) -> BackdropResult<RasterLayer> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    RasterLayer::from_straight_rgba8(width, height, rgba.into_raw())
}

pub fn parse_svg(bytes: &[u8]) -> BackdropResult<usvg::Tree> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(tree)
}

/// Rasterize `tree` at its intrinsic size.
pub fn rasterize_svg(tree: &usvg::Tree) -> BackdropResult<RasterLayer> {
    fn to_px(v: f32) -> BackdropResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(BackdropError::asset("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    }
    let size = tree.size();
    let (w, h) = (to_px(size.width())?, to_px(size.height())?);
    if w > MAX_RASTER_DIM || h > MAX_RASTER_DIM {
        return Err(BackdropError::asset(format!(
            "svg raster size too large: {w}x{h} (max {MAX_RASTER_DIM}x{MAX_RASTER_DIM})"
        )));
    }
    let mut pixmap = resvg::tiny_skia::Pixmap::new(w, h)
        .ok_or_else(|| BackdropError::asset("failed to allocate svg pixmap"))?;
    let sx = (w as f32) / size.width();
    let sy = (h as f32) / size.height();
    resvg::render(
        tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );
    // tiny-skia pixmaps are premultiplied already.
    RasterLayer::from_premul(w, h, pixmap.data().to_vec())
}

/// `true` when `bytes` look like SVG markup rather than a binary image.
pub fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let t = text.trim_start_matches('\u{feff}').trim_start();
    t.starts_with("<svg") || (t.starts_with("<?xml") && text.contains("<svg"))
}

/// Decode raster or SVG bytes.
pub fn decode_any(bytes: &[u8]) -> BackdropResult<RasterLayer> {
    if looks_like_svg(bytes) {
        rasterize_svg(&parse_svg(bytes)?)
    } else {
        decode_image(bytes)
    }
}

/// Split a `data:` URL into its MIME type and payload bytes.
pub fn data_url_bytes(url: &str) -> BackdropResult<(String, Vec<u8>)> {
    let rest = url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| BackdropError::asset("not a data url"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| BackdropError::asset("data url has no payload"))?;
    let mut parts = meta.split(';');
    let mime = parts.next().unwrap_or_default().to_ascii_lowercase();
    let is_base64 = parts.any(|p| p.eq_ignore_ascii_case("base64"));
    let bytes = if is_base64 {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .context("decode base64 data url payload")?
    } else {
        percent_decode(payload)
    };
    if bytes.is_empty() {
        return Err(BackdropError::asset("data url payload is empty"));
    }
    Ok((mime, bytes))
}

/// Decode an image embedded in a `data:` URL.
pub fn decode_data_url(url: &str) -> BackdropResult<RasterLayer> {
    let (mime, bytes) = data_url_bytes(url)?;
    if mime == "image/svg+xml" {
        return rasterize_svg(&parse_svg(&bytes)?);
    }
    decode_any(&bytes)
}

fn percent_decode(s: &str) -> Vec<u8> {
    let b = s.as_bytes();
    let mut out = Vec::with_capacity(b.len());
    let mut i = 0;
    while i < b.len() {
        if b[i] == b'%'
            && let Some(v) = s.get(i + 1..i + 3).and_then(|h| u8::from_str_radix(h, 16).ok())
        {
            out.push(v);
            i += 3;
            continue;
        }
        out.push(b[i]);
        i += 1;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
