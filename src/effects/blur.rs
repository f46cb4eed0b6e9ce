use crate::foundation::error::{BackdropError, BackdropResult};
use crate::raster::layer::RasterLayer;

/// Kernel radius above which the separable kernel is replaced by three box passes.
const EXACT_KERNEL_MAX_RADIUS: u32 = 32;

/// Bake a CSS `blur(<px>)` into `layer`.
///
/// `blur_px` is the Gaussian standard deviation, as in CSS. Values `<= 0` (or non-finite) return
/// the input untouched.
pub fn apply_blur(layer: RasterLayer, blur_px: f64) -> BackdropResult<RasterLayer> {
    if !blur_px.is_finite() || blur_px <= 0.0 {
        return Ok(layer);
    }
    let radius = (blur_px * 3.0).ceil() as u32;
    let (w, h) = (layer.width(), layer.height());
    let data = if radius <= EXACT_KERNEL_MAX_RADIUS {
        blur_rgba8_premul(layer.data(), w, h, radius, blur_px as f32)?
    } else {
        box_blur3_rgba8_premul(layer.data(), w, h, blur_px)?
    };
    tracing::debug!(blur_px, radius, width = w, height = h, "blur applied");
    RasterLayer::from_premul(w, h, data)
}

/// Separable Gaussian blur over premultiplied RGBA8 with a Q16 fixed-point kernel.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> BackdropResult<Vec<u8>> {
    let expected_len = checked_len(src, width, height)?;
    if radius == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    horizontal_pass(src, &mut tmp, width, height, &kernel);
    vertical_pass(&tmp, &mut out, width, height, &kernel);
    Ok(out)
}

/// Three successive box blurs sized to approximate a Gaussian of `sigma`.
///
/// Cost is independent of the radius, which keeps large export-scaled blurs tractable.
pub fn box_blur3_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    sigma: f64,
) -> BackdropResult<Vec<u8>> {
    let expected_len = checked_len(src, width, height)?;
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(BackdropError::validation("blur sigma must be > 0"));
    }
    let mut a = src.to_vec();
    let mut b = vec![0u8; expected_len];
    for size in boxes_for_gauss(sigma, 3) {
        let r = (size - 1) / 2;
        box_horizontal(&a, &mut b, width, height, r);
        box_vertical(&b, &mut a, width, height, r);
    }
    Ok(a)
}

fn checked_len(src: &[u8], width: u32, height: u32) -> BackdropResult<usize> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| BackdropError::validation("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(BackdropError::validation(
            "blur expects src matching width*height*4",
        ));
    }
    Ok(expected_len)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> BackdropResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(BackdropError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(BackdropError::validation("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let new_mid = (i64::from(weights[mid]) + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }

    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += (kw as u64) * (src[idx + c] as u64);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += (kw as u64) * (src[idx + c] as u64);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}

/// Odd box widths whose successive application approximates a Gaussian.
fn boxes_for_gauss(sigma: f64, n: usize) -> Vec<usize> {
    let nf = n as f64;
    let w_ideal = ((12.0 * sigma * sigma / nf) + 1.0).sqrt();
    let mut wl = w_ideal.floor() as i64;
    if wl % 2 == 0 {
        wl -= 1;
    }
    let wl = wl.max(1);
    let wu = wl + 2;
    let wlf = wl as f64;
    let m_ideal = (12.0 * sigma * sigma - nf * wlf * wlf - 4.0 * nf * wlf - 3.0 * nf)
        / (-4.0 * wlf - 4.0);
    let m = m_ideal.round().max(0.0) as usize;
    (0..n)
        .map(|i| if i < m { wl as usize } else { wu as usize })
        .collect()
}

fn box_horizontal(src: &[u8], dst: &mut [u8], width: u32, height: u32, r: usize) {
    let w = width as usize;
    let span = (2 * r + 1) as u32;
    for y in 0..height as usize {
        let row = y * w * 4;
        let at = |x: isize, c: usize| -> u32 {
            let xi = x.clamp(0, w as isize - 1) as usize;
            u32::from(src[row + xi * 4 + c])
        };
        for c in 0..4 {
            let mut acc: u32 = (-(r as isize)..=r as isize).map(|x| at(x, c)).sum();
            for x in 0..w {
                dst[row + x * 4 + c] = ((acc + span / 2) / span) as u8;
                acc += at(x as isize + r as isize + 1, c);
                acc -= at(x as isize - r as isize, c);
            }
        }
    }
}

fn box_vertical(src: &[u8], dst: &mut [u8], width: u32, height: u32, r: usize) {
    let w = width as usize;
    let h = height as usize;
    let span = (2 * r + 1) as u32;
    for x in 0..w {
        let at = |y: isize, c: usize| -> u32 {
            let yi = y.clamp(0, h as isize - 1) as usize;
            u32::from(src[(yi * w + x) * 4 + c])
        };
        for c in 0..4 {
            let mut acc: u32 = (-(r as isize)..=r as isize).map(|y| at(y, c)).sum();
            for y in 0..h {
                dst[(y * w + x) * 4 + c] = ((acc + span / 2) / span) as u8;
                acc += at(y as isize + r as isize + 1, c);
                acc -= at(y as isize - r as isize, c);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
