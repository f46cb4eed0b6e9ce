use crate::color::parse::{parse_angle_deg, parse_css_color, parse_number, split_function};
use crate::foundation::core::Rgba8;
use crate::foundation::error::BackdropResult;
use crate::raster::layer::RasterLayer;

/// Gradient color stop with a resolved position in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    /// Stop color.
    pub color: Rgba8,
    /// Position along the gradient line.
    pub position: f64,
}

/// Direction of a linear gradient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LinearDirection {
    /// CSS angle: `0deg` points up, increasing clockwise.
    Angle(f64),
    /// `to <side> <side>`; signs are `-1` (left/top) or `+1` (right/bottom).
    Corner {
        /// Horizontal sign.
        x: f64,
        /// Vertical sign.
        y: f64,
    },
}

/// Radial gradient ending shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GradientShape {
    /// Circle reaching the farthest corner.
    Circle,
    /// Ellipse reaching the farthest corner.
    Ellipse,
}

/// Parsed CSS gradient.
#[derive(Clone, Debug, PartialEq)]
pub enum Gradient {
    /// `linear-gradient(...)`.
    Linear {
        /// Gradient line direction.
        direction: LinearDirection,
        /// Resolved stops.
        stops: Vec<ColorStop>,
    },
    /// `radial-gradient(...)`.
    Radial {
        /// Ending shape.
        shape: GradientShape,
        /// Center as fractions of the box.
        center: (f64, f64),
        /// Resolved stops.
        stops: Vec<ColorStop>,
    },
}

/// One comma-separated layer of a `background-image` value.
#[derive(Clone, Debug, PartialEq)]
pub enum BackgroundImage {
    /// A gradient function.
    Gradient(Gradient),
    /// `url(...)` reference.
    Url(String),
}

/// Parse a `background-image` value into layers, top-most first.
///
/// Layers that fail to parse (unknown functions, unparseable colors) are returned as `Err`
/// with the raw text so callers can log and skip them.
pub fn parse_background_image(value: &str) -> Vec<Result<BackgroundImage, String>> {
    split_top_level(value, ',')
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "none")
        .map(|layer| parse_layer(layer).ok_or_else(|| layer.to_string()))
        .collect()
}

fn parse_layer(layer: &str) -> Option<BackgroundImage> {
    let lower = layer.to_ascii_lowercase();
    if lower.starts_with("url(") {
        let (_, inner) = split_function(layer)?;
        let url = inner.trim().trim_matches(|c| c == '"' || c == '\'');
        return Some(BackgroundImage::Url(url.to_string()));
    }
    parse_gradient(layer).map(BackgroundImage::Gradient)
}

/// Parse a single `linear-gradient()` or `radial-gradient()` call.
pub fn parse_gradient(value: &str) -> Option<Gradient> {
    let trimmed = value.trim();
    let (name, args) = split_function(trimmed)?;
    let parts: Vec<&str> = split_top_level(args, ',').into_iter().map(str::trim).collect();
    match name.to_ascii_lowercase().as_str() {
        "linear-gradient" => {
            let (direction, rest) = match parts.first().and_then(|p| parse_direction(p)) {
                Some(d) => (d, &parts[1..]),
                None => (LinearDirection::Angle(180.0), &parts[..]),
            };
            Some(Gradient::Linear {
                direction,
                stops: parse_stops(rest)?,
            })
        }
        "radial-gradient" => {
            let (shape, center, rest) = match parts.first().and_then(|p| parse_radial_prelude(p)) {
                Some((s, c)) => (s, c, &parts[1..]),
                None => (GradientShape::Ellipse, (0.5, 0.5), &parts[..]),
            };
            Some(Gradient::Radial {
                shape,
                center,
                stops: parse_stops(rest)?,
            })
        }
        _ => None,
    }
}

impl Gradient {
    /// Rasterize into a `width x height` layer.
    pub fn rasterize(&self, width: u32, height: u32) -> BackdropResult<RasterLayer> {
        let mut out = RasterLayer::new_transparent(width, height)?;
        let (w, h) = (f64::from(width), f64::from(height));
        let stops = match self {
            Self::Linear { stops, .. } | Self::Radial { stops, .. } => stops.as_slice(),
        };
        let premul: Vec<[f64; 4]> = stops.iter().map(|s| premul_f(s.color)).collect();

        let eval: Box<dyn Fn(f64, f64) -> f64> = match *self {
            Self::Linear { direction, .. } => {
                let (dx, dy) = match direction {
                    LinearDirection::Angle(deg) => {
                        let r = deg.to_radians();
                        (r.sin(), -r.cos())
                    }
                    LinearDirection::Corner { x, y } => {
                        let v = (x * h, y * w);
                        let len = (v.0 * v.0 + v.1 * v.1).sqrt().max(1e-9);
                        (v.0 / len, v.1 / len)
                    }
                };
                let line = (w * dx).abs() + (h * dy).abs();
                let line = line.max(1e-9);
                let (cx, cy) = (w / 2.0, h / 2.0);
                Box::new(move |x, y| ((x - cx) * dx + (y - cy) * dy) / line + 0.5)
            }
            Self::Radial { shape, center, .. } => {
                let (cx, cy) = (center.0 * w, center.1 * h);
                let fx = cx.max(w - cx);
                let fy = cy.max(h - cy);
                match shape {
                    GradientShape::Circle => {
                        let r = (fx * fx + fy * fy).sqrt().max(1e-9);
                        Box::new(move |x, y| ((x - cx).powi(2) + (y - cy).powi(2)).sqrt() / r)
                    }
                    GradientShape::Ellipse => {
                        let rx = (fx * std::f64::consts::SQRT_2).max(1e-9);
                        let ry = (fy * std::f64::consts::SQRT_2).max(1e-9);
                        Box::new(move |x, y| {
                            (((x - cx) / rx).powi(2) + ((y - cy) / ry).powi(2)).sqrt()
                        })
                    }
                }
            }
        };

        let row = width as usize * 4;
        for (yi, line) in out.data_mut().chunks_exact_mut(row).enumerate() {
            let y = yi as f64 + 0.5;
            for (xi, px) in line.chunks_exact_mut(4).enumerate() {
                let t = eval(xi as f64 + 0.5, y);
                let c = sample(stops, &premul, t);
                for i in 0..4 {
                    px[i] = (c[i] * 255.0).round().clamp(0.0, 255.0) as u8;
                }
            }
        }
        Ok(out)
    }
}

fn premul_f(c: Rgba8) -> [f64; 4] {
    let a = f64::from(c.a) / 255.0;
    [
        f64::from(c.r) / 255.0 * a,
        f64::from(c.g) / 255.0 * a,
        f64::from(c.b) / 255.0 * a,
        a,
    ]
}

fn sample(stops: &[ColorStop], premul: &[[f64; 4]], t: f64) -> [f64; 4] {
    let Some(first) = stops.first() else {
        return [0.0; 4];
    };
    if t <= first.position {
        return premul[0];
    }
    for i in 1..stops.len() {
        let (a, b) = (stops[i - 1].position, stops[i].position);
        if t <= b {
            let span = b - a;
            let f = if span <= 1e-12 { 1.0 } else { (t - a) / span };
            let (p, q) = (premul[i - 1], premul[i]);
            return [
                p[0] + (q[0] - p[0]) * f,
                p[1] + (q[1] - p[1]) * f,
                p[2] + (q[2] - p[2]) * f,
                p[3] + (q[3] - p[3]) * f,
            ];
        }
    }
    premul[premul.len() - 1]
}

fn parse_direction(s: &str) -> Option<LinearDirection> {
    let lower = s.to_ascii_lowercase();
    if let Some(rest) = lower.strip_prefix("to ") {
        let (mut x, mut y) = (0.0, 0.0);
        for word in rest.split_whitespace() {
            match word {
                "left" => x = -1.0,
                "right" => x = 1.0,
                "top" => y = -1.0,
                "bottom" => y = 1.0,
                _ => return None,
            }
        }
        return match (x == 0.0, y == 0.0) {
            (true, true) => None,
            (false, true) => Some(LinearDirection::Angle(if x > 0.0 { 90.0 } else { 270.0 })),
            (true, false) => Some(LinearDirection::Angle(if y > 0.0 { 180.0 } else { 0.0 })),
            (false, false) => Some(LinearDirection::Corner { x, y }),
        };
    }
    if lower.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '.' || c == '+')
        && !lower.contains(' ')
    {
        return parse_angle_deg(&lower).map(LinearDirection::Angle);
    }
    None
}

fn parse_radial_prelude(s: &str) -> Option<(GradientShape, (f64, f64))> {
    let lower = s.to_ascii_lowercase();
    let mut shape = GradientShape::Ellipse;
    let mut center = (0.5, 0.5);
    let mut words = lower.split_whitespace().peekable();
    let mut recognized = false;
    while let Some(word) = words.next() {
        match word {
            "circle" => {
                shape = GradientShape::Circle;
                recognized = true;
            }
            "ellipse" | "farthest-corner" => recognized = true,
            "at" => {
                recognized = true;
                let rest: Vec<&str> = words.by_ref().collect();
                center = parse_position(&rest)?;
            }
            _ => return None,
        }
    }
    recognized.then_some((shape, center))
}

fn parse_position(words: &[&str]) -> Option<(f64, f64)> {
    let axis = |w: &str| -> Option<f64> {
        match w {
            "center" => Some(0.5),
            "left" | "top" => Some(0.0),
            "right" | "bottom" => Some(1.0),
            _ => w.strip_suffix('%').and_then(parse_number).map(|v| v / 100.0),
        }
    };
    match words {
        [one] => {
            let v = axis(one)?;
            Some(match *one {
                "top" | "bottom" => (0.5, v),
                _ => (v, 0.5),
            })
        }
        [a, b] => {
            if matches!(*a, "top" | "bottom") || matches!(*b, "left" | "right") {
                Some((axis(b)?, axis(a)?))
            } else {
                Some((axis(a)?, axis(b)?))
            }
        }
        _ => None,
    }
}

/// Parse stops, distributing missing positions evenly between known neighbours.
fn parse_stops(parts: &[&str]) -> Option<Vec<ColorStop>> {
    let mut raw: Vec<(Rgba8, Option<f64>)> = Vec::with_capacity(parts.len());
    for part in parts {
        let tokens = split_top_level(part, ' ');
        let tokens: Vec<&str> = tokens.into_iter().filter(|t| !t.is_empty()).collect();
        let (color, positions) = tokens.split_first()?;
        let color = parse_css_color(color)?;
        if positions.is_empty() {
            raw.push((color, None));
        }
        for p in positions {
            let pos = p.strip_suffix('%').and_then(parse_number).map(|v| v / 100.0)?;
            raw.push((color, Some(pos)));
        }
    }
    if raw.len() < 2 {
        return None;
    }

    let n = raw.len();
    if raw[0].1.is_none() {
        raw[0].1 = Some(0.0);
    }
    if raw[n - 1].1.is_none() {
        raw[n - 1].1 = Some(1.0);
    }
    let mut max_seen = f64::NEG_INFINITY;
    for stop in raw.iter_mut() {
        if let Some(p) = stop.1.as_mut() {
            if *p < max_seen {
                *p = max_seen;
            }
            max_seen = *p;
        }
    }
    let mut i = 0;
    while i < n {
        if raw[i].1.is_some() {
            i += 1;
            continue;
        }
        let start = i - 1;
        let mut end = i;
        while raw[end].1.is_none() {
            end += 1;
        }
        let (a, b) = (raw[start].1.unwrap_or(0.0), raw[end].1.unwrap_or(1.0));
        let span = (end - start) as f64;
        for (k, stop) in raw.iter_mut().enumerate().take(end).skip(i) {
            stop.1 = Some(a + (b - a) * (k - start) as f64 / span);
        }
        i = end;
    }

    Some(
        raw.into_iter()
            .map(|(color, p)| ColorStop {
                color,
                position: p.unwrap_or(0.0),
            })
            .collect(),
    )
}

/// Split on `sep` at parenthesis depth zero.
pub(crate) fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, ch) in s.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            c if c == sep && depth == 0 => {
                out.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    out.push(&s[start..]);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/color/gradient.rs"]
mod tests;
