use crate::color::parse::parse_css_color;
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::model::{check_range, default_one};

/// Key used when a gradient value is neither a preset nor a gradient function.
pub const DEFAULT_GRADIENT: &str = "primary_gradient";

const GRADIENT_PRESETS: &[(&str, &str)] = &[
    (
        "primary_gradient",
        "linear-gradient(135deg, oklch(0.62 0.19 275) 0%, oklch(0.7 0.17 330) 100%)",
    ),
    (
        "sunset",
        "linear-gradient(135deg, oklch(0.75 0.17 55) 0%, oklch(0.63 0.22 15) 100%)",
    ),
    ("ocean", "linear-gradient(135deg, #0ea5e9 0%, #6366f1 100%)"),
    (
        "aurora",
        "radial-gradient(circle at center, oklch(0.86 0.12 170) 0%, oklch(0.42 0.14 285) 100%)",
    ),
    ("midnight", "linear-gradient(to bottom right, #0f172a, #334155)"),
    (
        "peach",
        "linear-gradient(90deg, hsl(20, 100%, 85%) 0%, hsl(340, 80%, 80%) 100%)",
    ),
];

const SOLID_PRESETS: &[(&str, &str)] = &[
    ("white", "#ffffff"),
    ("ink", "#111827"),
    ("slate", "oklch(0.37 0.03 260)"),
    ("sand", "oklch(0.92 0.04 85)"),
    ("mint", "oklch(0.9 0.08 165)"),
];

/// Kind of editor background.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundKind {
    /// Flat color.
    Solid,
    /// CSS gradient.
    Gradient,
    /// Image URL or asset path.
    Image,
}

/// Editor background selection.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BackgroundConfig {
    /// Variant tag.
    #[serde(rename = "type")]
    pub kind: BackgroundKind,
    /// Preset key, CSS color/gradient, or image reference depending on `kind`.
    pub value: String,
    /// Opacity in `[0, 1]`.
    #[serde(default = "default_one")]
    pub opacity: f64,
}

/// CSS declarations a background resolves to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BackgroundStyle {
    /// `background-color`.
    pub background_color: Option<String>,
    /// `background-image`.
    pub background_image: Option<String>,
    /// `opacity`.
    pub opacity: f64,
}

impl BackgroundConfig {
    /// Solid background.
    pub fn solid(value: impl Into<String>) -> Self {
        Self {
            kind: BackgroundKind::Solid,
            value: value.into(),
            opacity: 1.0,
        }
    }

    /// Gradient background.
    pub fn gradient(value: impl Into<String>) -> Self {
        Self {
            kind: BackgroundKind::Gradient,
            value: value.into(),
            opacity: 1.0,
        }
    }

    /// Image background.
    pub fn image(value: impl Into<String>) -> Self {
        Self {
            kind: BackgroundKind::Image,
            value: value.into(),
            opacity: 1.0,
        }
    }

    /// Validate value presence and opacity range.
    pub fn validate(&self) -> BackdropResult<()> {
        check_range("background opacity", self.opacity, 0.0, 1.0)?;
        if self.value.trim().is_empty() && self.kind == BackgroundKind::Image {
            return Err(BackdropError::validation("image background requires a value"));
        }
        Ok(())
    }

    /// Resolve presets into the CSS the live background element carries.
    pub fn resolve_style(&self) -> BackgroundStyle {
        let v = self.value.trim();
        let (background_color, background_image) = match self.kind {
            BackgroundKind::Solid => {
                let color = lookup(SOLID_PRESETS, v)
                    .map(str::to_string)
                    .or_else(|| (parse_css_color(v).is_some() || v.contains('(')).then(|| v.to_string()));
                if color.is_none() {
                    tracing::warn!(value = v, "unknown solid background preset");
                }
                (color, None)
            }
            BackgroundKind::Gradient => {
                let g = match lookup(GRADIENT_PRESETS, v) {
                    Some(g) => g.to_string(),
                    None if v.starts_with("linear-gradient") || v.starts_with("radial-gradient") => {
                        v.to_string()
                    }
                    None => lookup(GRADIENT_PRESETS, DEFAULT_GRADIENT)
                        .unwrap_or_default()
                        .to_string(),
                };
                (None, Some(g))
            }
            BackgroundKind::Image => (None, Some(format!("url({v})"))),
        };
        BackgroundStyle {
            background_color,
            background_image,
            opacity: self.opacity.clamp(0.0, 1.0),
        }
    }

    /// Image reference for image backgrounds.
    pub fn image_src(&self) -> Option<&str> {
        (self.kind == BackgroundKind::Image).then_some(self.value.trim())
    }
}

/// CSS value of a gradient or solid preset key.
pub fn preset(key: &str) -> Option<&'static str> {
    lookup(GRADIENT_PRESETS, key).or_else(|| lookup(SOLID_PRESETS, key))
}

fn lookup<'a>(table: &'a [(&'a str, &'a str)], key: &str) -> Option<&'a str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

#[cfg(test)]
#[path = "../../tests/unit/model/background.rs"]
mod tests;
