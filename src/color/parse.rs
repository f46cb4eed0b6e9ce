//! CSS color parsing limited to what the raster capture understands: sRGB notations only.

use crate::foundation::core::Rgba8;

const NAMED: &[(&str, Rgba8)] = &[
    ("transparent", Rgba8::TRANSPARENT),
    ("black", Rgba8::BLACK),
    ("white", Rgba8::WHITE),
    ("red", Rgba8::new(255, 0, 0, 255)),
    ("green", Rgba8::new(0, 128, 0, 255)),
    ("lime", Rgba8::new(0, 255, 0, 255)),
    ("blue", Rgba8::new(0, 0, 255, 255)),
    ("yellow", Rgba8::new(255, 255, 0, 255)),
    ("cyan", Rgba8::new(0, 255, 255, 255)),
    ("aqua", Rgba8::new(0, 255, 255, 255)),
    ("magenta", Rgba8::new(255, 0, 255, 255)),
    ("fuchsia", Rgba8::new(255, 0, 255, 255)),
    ("gray", Rgba8::new(128, 128, 128, 255)),
    ("grey", Rgba8::new(128, 128, 128, 255)),
    ("silver", Rgba8::new(192, 192, 192, 255)),
    ("maroon", Rgba8::new(128, 0, 0, 255)),
    ("navy", Rgba8::new(0, 0, 128, 255)),
    ("teal", Rgba8::new(0, 128, 128, 255)),
    ("olive", Rgba8::new(128, 128, 0, 255)),
    ("purple", Rgba8::new(128, 0, 128, 255)),
    ("orange", Rgba8::new(255, 165, 0, 255)),
    ("pink", Rgba8::new(255, 192, 203, 255)),
];

/// Parse a CSS color in hex, `rgb[a]()`, `hsl[a]()` or named form.
///
/// Perceptual spaces (`oklch()`, `oklab()`, `lab()`, `lch()`) return `None`; they must be
/// normalized before capture.
pub fn parse_css_color(input: &str) -> Option<Rgba8> {
    let s = input.trim().to_ascii_lowercase();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some((name, args)) = split_function(&s) {
        return match name {
            "rgb" | "rgba" => parse_rgb_args(args),
            "hsl" | "hsla" => parse_hsl_args(args),
            _ => None,
        };
    }
    NAMED.iter().find(|(n, _)| *n == s).map(|(_, c)| *c)
}

/// Serialize the way browsers report computed colors.
pub fn to_css_rgb(c: Rgba8) -> String {
    if c.a == 255 {
        format!("rgb({}, {}, {})", c.r, c.g, c.b)
    } else {
        let a = (f64::from(c.a) / 255.0 * 1000.0).round() / 1000.0;
        format!("rgba({}, {}, {}, {a})", c.r, c.g, c.b)
    }
}

/// Split `name(args)` into its parts; `args` excludes the parentheses.
pub(crate) fn split_function(s: &str) -> Option<(&str, &str)> {
    let open = s.find('(')?;
    let inner = s[open + 1..].trim_end().strip_suffix(')')?;
    Some((s[..open].trim(), inner))
}

/// Split function arguments on commas, whitespace and the `/` alpha separator.
///
/// The returned flag reports whether a `/` was present.
pub(crate) fn split_args(args: &str) -> (Vec<&str>, bool) {
    let slash = args.contains('/');
    let parts = args
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    (parts, slash)
}

pub(crate) fn parse_number(s: &str) -> Option<f64> {
    let v: f64 = s.trim().parse().ok()?;
    v.is_finite().then_some(v)
}

/// Parse `50%` as `Some(0.5)`, plain numbers pass through `plain`.
pub(crate) fn parse_number_or_percent(s: &str, plain: impl Fn(f64) -> f64) -> Option<f64> {
    match s.strip_suffix('%') {
        Some(p) => parse_number(p).map(|v| v / 100.0),
        None => parse_number(s).map(plain),
    }
}

pub(crate) fn parse_alpha(s: &str) -> Option<f64> {
    parse_number_or_percent(s, |v| v).map(|v| v.clamp(0.0, 1.0))
}

/// Angle in degrees from `deg`, `rad`, `grad`, `turn` or a bare number.
pub(crate) fn parse_angle_deg(s: &str) -> Option<f64> {
    let s = s.trim();
    if let Some(v) = s.strip_suffix("deg") {
        return parse_number(v);
    }
    if let Some(v) = s.strip_suffix("grad") {
        return parse_number(v).map(|g| g * 0.9);
    }
    if let Some(v) = s.strip_suffix("rad") {
        return parse_number(v).map(f64::to_degrees);
    }
    if let Some(v) = s.strip_suffix("turn") {
        return parse_number(v).map(|t| t * 360.0);
    }
    parse_number(s)
}

pub(crate) fn unit_to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn parse_hex(hex: &str) -> Option<Rgba8> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nib = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Rgba8::new(nib(0)?, nib(1)?, nib(2)?, 255)),
        4 => Some(Rgba8::new(nib(0)?, nib(1)?, nib(2)?, nib(3)?)),
        6 => Some(Rgba8::new(byte(0)?, byte(2)?, byte(4)?, 255)),
        8 => Some(Rgba8::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<Rgba8> {
    let (parts, _) = split_args(args);
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |s: &str| parse_number_or_percent(s, |v| v / 255.0).map(unit_to_u8);
    let a = match parts.get(3) {
        Some(s) => parse_alpha(s)?,
        None => 1.0,
    };
    Some(Rgba8::new(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        unit_to_u8(a),
    ))
}

fn parse_hsl_args(args: &str) -> Option<Rgba8> {
    let (parts, _) = split_args(args);
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let h = parse_angle_deg(parts[0])?;
    let s = parse_number_or_percent(parts[1], |v| v / 100.0)?.clamp(0.0, 1.0);
    let l = parse_number_or_percent(parts[2], |v| v / 100.0)?.clamp(0.0, 1.0);
    let a = match parts.get(3) {
        Some(v) => parse_alpha(v)?,
        None => 1.0,
    };
    let [r, g, b] = hsl_to_rgb(h, s, l);
    Some(Rgba8::new(
        unit_to_u8(r),
        unit_to_u8(g),
        unit_to_u8(b),
        unit_to_u8(a),
    ))
}

fn hsl_to_rgb(h_deg: f64, s: f64, l: f64) -> [f64; 3] {
    let h = h_deg.rem_euclid(360.0) / 360.0;
    let hue = |t: f64, p: f64, q: f64| -> f64 {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };
    if s == 0.0 {
        return [l, l, l];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    [
        hue(h + 1.0 / 3.0, p, q),
        hue(h, p, q),
        hue(h - 1.0 / 3.0, p, q),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/color/parse.rs"]
mod tests;
