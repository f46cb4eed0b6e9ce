use crate::color::parse::{
    parse_alpha, parse_angle_deg, parse_css_color, parse_number, parse_number_or_percent,
    split_args, split_function, to_css_rgb, unit_to_u8,
};
use crate::document::Element;
use crate::foundation::core::Rgba8;

/// Color functions the capture path cannot interpret directly.
pub const PERCEPTUAL_FUNCTIONS: &[&str] = &["oklch", "oklab", "lch", "lab"];

/// The rendering engine's computed-style oracle.
///
/// Given any CSS color value, returns the normalized sRGB serialization the engine would
/// report after assigning it to a throwaway element, or `None` if it cannot be resolved.
pub trait ColorEngine {
    /// Resolve `value` to a computed `rgb()`/`rgba()` string.
    fn computed_color(&self, value: &str) -> Option<String>;
}

/// Built-in engine that understands sRGB notations and the CSS Color 4 perceptual spaces.
#[derive(Clone, Copy, Debug, Default)]
pub struct CssColorEngine;

impl ColorEngine for CssColorEngine {
    fn computed_color(&self, value: &str) -> Option<String> {
        resolve_any(value).map(to_css_rgb)
    }
}

/// Resolve any supported color notation, perceptual ones included.
pub fn resolve_any(value: &str) -> Option<Rgba8> {
    if let Some(c) = parse_css_color(value) {
        return Some(c);
    }
    let lower = value.trim().to_ascii_lowercase();
    let (name, args) = split_function(&lower)?;
    let (parts, _) = split_args(args);
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let alpha = match parts.get(3) {
        Some(a) => parse_alpha(a)?,
        None => 1.0,
    };
    let rgb = match name {
        "oklab" => {
            let l = parse_number_or_percent(parts[0], |v| v)?;
            let a = parse_number_or_percent(parts[1], |v| v / 0.4)? * 0.4;
            let b = parse_number_or_percent(parts[2], |v| v / 0.4)? * 0.4;
            oklab_to_linear_srgb(l, a, b)
        }
        "oklch" => {
            let l = parse_number_or_percent(parts[0], |v| v)?;
            let c = parse_number_or_percent(parts[1], |v| v / 0.4)? * 0.4;
            let h = parse_hue(parts[2])?;
            let (a, b) = polar(c, h);
            oklab_to_linear_srgb(l, a, b)
        }
        "lab" => {
            let l = parse_number_or_percent(parts[0], |v| v / 100.0)? * 100.0;
            let a = parse_number_or_percent(parts[1], |v| v / 125.0)? * 125.0;
            let b = parse_number_or_percent(parts[2], |v| v / 125.0)? * 125.0;
            lab_to_linear_srgb(l, a, b)
        }
        "lch" => {
            let l = parse_number_or_percent(parts[0], |v| v / 100.0)? * 100.0;
            let c = parse_number_or_percent(parts[1], |v| v / 150.0)? * 150.0;
            let h = parse_hue(parts[2])?;
            let (a, b) = polar(c, h);
            lab_to_linear_srgb(l, a, b)
        }
        _ => return None,
    };
    let [r, g, b] = rgb.map(srgb_encode);
    Some(Rgba8::new(
        unit_to_u8(r),
        unit_to_u8(g),
        unit_to_u8(b),
        unit_to_u8(alpha),
    ))
}

/// `true` if `value` mentions a perceptual color function anywhere.
pub fn has_perceptual_color(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    PERCEPTUAL_FUNCTIONS
        .iter()
        .any(|f| find_function(&lower, f, 0).is_some())
}

/// Rewrite every perceptual color function inside `value` through `engine`.
///
/// Works on plain colors, gradient strings and shadow lists alike. Functions the engine
/// cannot resolve are left untouched.
pub fn normalize_value(value: &str, engine: &dyn ColorEngine) -> String {
    let lower = value.to_ascii_lowercase();
    let mut out = String::with_capacity(value.len());
    let mut cursor = 0usize;
    loop {
        let next = PERCEPTUAL_FUNCTIONS
            .iter()
            .filter_map(|f| find_function(&lower, f, cursor))
            .min_by_key(|(start, _)| *start);
        let Some((start, end)) = next else {
            break;
        };
        out.push_str(&value[cursor..start]);
        let original = &value[start..end];
        match engine.computed_color(original) {
            Some(rgb) => out.push_str(&rgb),
            None => out.push_str(original),
        }
        cursor = end;
    }
    out.push_str(&value[cursor..]);
    out
}

/// Normalize every color-bearing style property of `root` and its descendants.
///
/// Returns the number of properties rewritten.
pub fn normalize_tree(root: &mut Element, engine: &dyn ColorEngine) -> usize {
    let mut changed = 0usize;
    let mut fix = |slot: &mut Option<String>| {
        if let Some(v) = slot.as_mut()
            && has_perceptual_color(v)
        {
            let n = normalize_value(v, engine);
            if n != *v {
                *v = n;
                changed += 1;
            }
        }
    };
    let style = &mut root.style;
    fix(&mut style.color);
    fix(&mut style.background_color);
    fix(&mut style.background_image);
    fix(&mut style.border_color);
    for shadow in &mut style.text_shadow {
        let mut slot = Some(std::mem::take(&mut shadow.color));
        fix(&mut slot);
        shadow.color = slot.unwrap_or_default();
    }
    for child in &mut root.children {
        changed += normalize_tree(child, engine);
    }
    changed
}

/// Find `name(` starting at or after `from`, not preceded by an identifier character.
/// Returns the byte range of the whole call including the closing parenthesis.
fn find_function(lower: &str, name: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = lower.as_bytes();
    let mut search = from;
    while let Some(rel) = lower.get(search..)?.find(name) {
        let start = search + rel;
        let after = start + name.len();
        let boundary_ok = start == 0 || {
            let p = bytes[start - 1];
            !(p.is_ascii_alphanumeric() || p == b'-' || p == b'_')
        };
        if boundary_ok && bytes.get(after) == Some(&b'(') {
            let mut depth = 0i32;
            for (i, &b) in bytes.iter().enumerate().skip(after) {
                match b {
                    b'(' => depth += 1,
                    b')' => {
                        depth -= 1;
                        if depth == 0 {
                            return Some((start, i + 1));
                        }
                    }
                    _ => {}
                }
            }
            return None;
        }
        search = after;
    }
    None
}

fn parse_hue(s: &str) -> Option<f64> {
    if s == "none" {
        return Some(0.0);
    }
    parse_angle_deg(s).or_else(|| parse_number(s))
}

fn polar(c: f64, h_deg: f64) -> (f64, f64) {
    let h = h_deg.to_radians();
    (c * h.cos(), c * h.sin())
}

fn oklab_to_linear_srgb(l: f64, a: f64, b: f64) -> [f64; 3] {
    let l_ = l + 0.396_337_777_4 * a + 0.215_803_757_3 * b;
    let m_ = l - 0.105_561_345_8 * a - 0.063_854_172_8 * b;
    let s_ = l - 0.089_484_177_5 * a - 1.291_485_548_0 * b;
    let (l3, m3, s3) = (l_ * l_ * l_, m_ * m_ * m_, s_ * s_ * s_);
    [
        4.076_741_662_1 * l3 - 3.307_711_591_3 * m3 + 0.230_969_929_2 * s3,
        -1.268_438_004_6 * l3 + 2.609_757_401_1 * m3 - 0.341_319_396_5 * s3,
        -0.004_196_086_3 * l3 - 0.703_418_614_7 * m3 + 1.707_614_701_0 * s3,
    ]
}

fn lab_to_linear_srgb(l: f64, a: f64, b: f64) -> [f64; 3] {
    const EPS: f64 = 216.0 / 24389.0;
    const KAPPA: f64 = 24389.0 / 27.0;
    const D50: [f64; 3] = [0.3457 / 0.3585, 1.0, (1.0 - 0.3457 - 0.3585) / 0.3585];

    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;
    let finv = |t: f64| {
        let t3 = t * t * t;
        if t3 > EPS { t3 } else { (116.0 * t - 16.0) / KAPPA }
    };
    let y = if l > KAPPA * EPS { fy * fy * fy } else { l / KAPPA };
    let xyz50 = [finv(fx) * D50[0], y * D50[1], finv(fz) * D50[2]];

    let bradford = [
        [0.955_473_452_7, -0.023_098_536_9, 0.063_259_308_7],
        [-0.028_369_707_0, 1.009_995_458_0, 0.021_041_399_0],
        [0.012_314_001_7, -0.020_507_696_4, 1.330_365_936_6],
    ];
    let to_srgb = [
        [3.240_969_941_9, -1.537_383_177_6, -0.498_610_760_3],
        [-0.969_243_636_3, 1.875_967_501_5, 0.041_555_057_4],
        [0.055_630_079_7, -0.203_976_958_9, 1.056_971_514_2],
    ];
    let xyz65 = mat3(&bradford, xyz50);
    mat3(&to_srgb, xyz65)
}

fn mat3(m: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

fn srgb_encode(c: f64) -> f64 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.003_130_8 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

#[cfg(test)]
#[path = "../../tests/unit/color/normalize.rs"]
mod tests;
