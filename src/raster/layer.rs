use std::sync::Arc;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::foundation::math::mul_div255_u8;
use crate::raster::composite::{BlendMode, blend_px, over_px, overlay_channel};

/// Largest edge accepted for any raster buffer.
pub const MAX_RASTER_DIM: u32 = 16_384;

/// Interpolation used when resizing a raster layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResampleFilter {
    /// Point sampling; keeps grain and pixel art crisp.
    Nearest,
    /// Bilinear.
    Linear,
    /// Catmull-Rom bicubic, the "high quality" smoothing mode.
    #[default]
    HighQuality,
}

impl ResampleFilter {
    fn to_image(self) -> image::imageops::FilterType {
        match self {
            Self::Nearest => image::imageops::FilterType::Nearest,
            Self::Linear => image::imageops::FilterType::Triangle,
            Self::HighQuality => image::imageops::FilterType::CatmullRom,
        }
    }
}

/// Fixed-size grid of premultiplied RGBA8 pixels, row-major and tightly packed.
///
/// Every exporter produces one of these; the compositor only ever consumes them.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterLayer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for RasterLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterLayer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("fingerprint", &format_args!("{:016x}", self.fingerprint()))
            .finish()
    }
}

fn byte_len(width: u32, height: u32) -> BackdropResult<usize> {
    if width == 0 || height == 0 {
        return Err(BackdropError::validation(format!(
            "raster size must be non-zero, got {width}x{height}"
        )));
    }
    if width > MAX_RASTER_DIM || height > MAX_RASTER_DIM {
        return Err(BackdropError::validation(format!(
            "raster size too large: {width}x{height} (max {MAX_RASTER_DIM}x{MAX_RASTER_DIM})"
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| BackdropError::validation("raster buffer size overflow"))
}

impl RasterLayer {
    /// Fully transparent layer.
    pub fn new_transparent(width: u32, height: u32) -> BackdropResult<Self> {
        let len = byte_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    /// Layer filled with a single straight-alpha color.
    pub fn filled(width: u32, height: u32, color: Rgba8) -> BackdropResult<Self> {
        let mut out = Self::new_transparent(width, height)?;
        let px = color.premultiplied();
        for d in out.data.chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
        Ok(out)
    }

    /// Wrap already-premultiplied bytes.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> BackdropResult<Self> {
        let len = byte_len(width, height)?;
        if data.len() != len {
            return Err(BackdropError::validation(format!(
                "raster byte len mismatch: expected {len}, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap straight-alpha RGBA8 bytes, premultiplying in place.
    pub fn from_straight_rgba8(width: u32, height: u32, mut data: Vec<u8>) -> BackdropResult<Self> {
        premultiply_rgba8_in_place(&mut data);
        Self::from_premul(width, height, data)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Premultiplied pixel bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Premultiplied pixel at `(x, y)`; out-of-bounds reads are transparent.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0; 4];
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Stable 64-bit content hash (dimensions + bytes).
    pub fn fingerprint(&self) -> u64 {
        let mut h = xxhash_rust::xxh3::Xxh3::new();
        h.update(&self.width.to_le_bytes());
        h.update(&self.height.to_le_bytes());
        h.update(&self.data);
        h.digest()
    }

    /// `true` when every pixel has zero alpha.
    pub fn is_fully_transparent(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }

    /// Straight-alpha copy of the pixel bytes.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }

    /// Resize to exactly `width x height`.
    ///
    /// Filtering happens on premultiplied data, so edges never pick up fringe colors; the
    /// bicubic overshoot is clamped back under alpha afterwards.
    pub fn resampled(
        &self,
        width: u32,
        height: u32,
        filter: ResampleFilter,
    ) -> BackdropResult<RasterLayer> {
        byte_len(width, height)?;
        if width == self.width && height == self.height {
            return Ok(self.clone());
        }
        let src = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| BackdropError::capture("raster bytes do not match dimensions"))?;
        let resized = image::imageops::resize(&src, width, height, filter.to_image());
        let mut data = resized.into_raw();
        clamp_premul_in_place(&mut data);
        RasterLayer::from_premul(width, height, data)
    }

    /// Source-over `src` at integer offset `(dx, dy)`; pixels outside `self` are dropped.
    pub fn draw_over(&mut self, src: &RasterLayer, dx: i64, dy: i64, opacity: f32) {
        let op = ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16;
        if op == 0 {
            return;
        }
        self.for_each_overlap(src, dx, dy, |d, s| over_px(d, s, op));
    }

    /// Blend `src` at integer offset `(dx, dy)` with `mode`.
    pub fn draw_blend(&mut self, src: &RasterLayer, dx: i64, dy: i64, opacity: f32, mode: BlendMode) {
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity <= 0.0 {
            return;
        }
        match mode {
            BlendMode::Normal => self.draw_over(src, dx, dy, opacity),
            BlendMode::Overlay => {
                self.for_each_overlap(src, dx, dy, |d, s| blend_px(d, s, opacity, &overlay_channel))
            }
            BlendMode::Multiply => {
                self.for_each_overlap(src, dx, dy, |d, s| blend_px(d, s, opacity, &|s, d| s * d))
            }
            BlendMode::Screen => self.for_each_overlap(src, dx, dy, |d, s| {
                blend_px(d, s, opacity, &|s, d| s + d - s * d)
            }),
        }
    }

    /// `destination-out`: remove `src` coverage from `self`.
    pub fn erase(&mut self, src: &RasterLayer, dx: i64, dy: i64, opacity: f32) {
        let op = ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16;
        if op == 0 {
            return;
        }
        self.for_each_overlap(src, dx, dy, |d, s| {
            let keep = 255 - u16::from(mul_div255_u8(u16::from(s[3]), op));
            for v in d.iter_mut() {
                *v = mul_div255_u8(u16::from(*v), keep);
            }
        });
    }

    /// `source-atop`: paint `src` only where `self` already has coverage.
    pub fn draw_atop(&mut self, src: &RasterLayer, dx: i64, dy: i64, opacity: f32) {
        let op = ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16;
        if op == 0 {
            return;
        }
        self.for_each_overlap(src, dx, dy, |d, s| {
            let sa = u16::from(mul_div255_u8(u16::from(s[3]), op));
            let da = u16::from(d[3]);
            for c in 0..3 {
                let sc = u16::from(mul_div255_u8(u16::from(s[c]), op));
                let v = u16::from(mul_div255_u8(sc, da))
                    + u16::from(mul_div255_u8(u16::from(d[c]), 255 - sa));
                d[c] = v.min(255) as u8;
            }
        });
    }

    /// Scale every pixel (color and alpha) by `opacity`.
    pub fn multiply_opacity(&mut self, opacity: f32) {
        let op = ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16;
        if op == 255 {
            return;
        }
        for v in &mut self.data {
            *v = mul_div255_u8(u16::from(*v), op);
        }
    }

    /// Multiply every pixel by the alpha of the matching `mask` pixel (`destination-in`).
    pub fn mask_with(&mut self, mask: &RasterLayer) -> BackdropResult<()> {
        if mask.width != self.width || mask.height != self.height {
            return Err(BackdropError::capture(format!(
                "mask size {}x{} does not match layer {}x{}",
                mask.width, mask.height, self.width, self.height
            )));
        }
        for (d, m) in self.data.chunks_exact_mut(4).zip(mask.data.chunks_exact(4)) {
            let a = u16::from(m[3]);
            if a == 255 {
                continue;
            }
            for v in d.iter_mut() {
                *v = mul_div255_u8(u16::from(*v), a);
            }
        }
        Ok(())
    }

    /// Repeat `self` from the origin across a `width x height` layer, point-sampled.
    pub fn tiled(&self, width: u32, height: u32) -> BackdropResult<RasterLayer> {
        let mut out = RasterLayer::new_transparent(width, height)?;
        let (tw, th) = (self.width as usize, self.height as usize);
        let w = width as usize;
        for (y, row) in out.data.chunks_exact_mut(w * 4).enumerate() {
            let src_row = &self.data[(y % th) * tw * 4..(y % th + 1) * tw * 4];
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let si = (x % tw) * 4;
                px.copy_from_slice(&src_row[si..si + 4]);
            }
        }
        Ok(out)
    }

    fn for_each_overlap<F>(&mut self, src: &RasterLayer, dx: i64, dy: i64, mut f: F)
    where
        F: FnMut(&mut [u8], &[u8]),
    {
        let x0 = dx.max(0);
        let y0 = dy.max(0);
        let x1 = (dx + i64::from(src.width)).min(i64::from(self.width));
        let y1 = (dy + i64::from(src.height)).min(i64::from(self.height));
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let dw = self.width as usize;
        let sw = src.width as usize;
        for y in y0..y1 {
            let sy = (y - dy) as usize;
            for x in x0..x1 {
                let sx = (x - dx) as usize;
                let di = ((y as usize) * dw + x as usize) * 4;
                let si = (sy * sw + sx) * 4;
                f(&mut self.data[di..di + 4], &src.data[si..si + 4]);
            }
        }
    }

    pub(crate) fn to_pixmap(&self) -> BackdropResult<vello_cpu::Pixmap> {
        pixmap_from_premul_bytes(&self.data, self.width, self.height)
    }

    pub(crate) fn from_pixmap(pixmap: &vello_cpu::Pixmap) -> BackdropResult<Self> {
        Self::from_premul(
            u32::from(pixmap.width()),
            u32::from(pixmap.height()),
            pixmap.data_as_u8_slice().to_vec(),
        )
    }

    /// Wrap as a vello_cpu image paint.
    pub(crate) fn to_cpu_image(&self) -> BackdropResult<vello_cpu::Image> {
        let pixmap = self.to_pixmap()?;
        Ok(vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        })
    }
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        if a == 255 {
            continue;
        }
        for c in 0..3 {
            px[c] = ((px[c] as u32 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

fn clamp_premul_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3];
        px[0] = px[0].min(a);
        px[1] = px[1].min(a);
        px[2] = px[2].min(a);
    }
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> BackdropResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| BackdropError::capture("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| BackdropError::capture("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(BackdropError::capture("pixmap byte len mismatch"));
    }
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/raster/layer.rs"]
mod tests;
