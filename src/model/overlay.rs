use crate::foundation::error::{BackdropError, BackdropResult};
use crate::model::{check_range, default_one, default_true};

/// Overlay anchor. Text overlays read it as percent of the canvas, image overlays as live px.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayPosition {
    pub x: f64,
    pub y: f64,
}

/// Text shadow of a text overlay.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextShadowConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
    #[serde(default)]
    pub blur: f64,
    pub color: String,
}

/// Writing direction of a text overlay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOrientation {
    #[default]
    Horizontal,
    Vertical,
}

fn default_font_size() -> f64 {
    48.0
}

fn default_font_weight() -> String {
    "400".to_string()
}

fn default_text_color() -> String {
    "#ffffff".to_string()
}

/// User-placed text.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextOverlay {
    #[serde(default)]
    pub id: String,
    pub text: String,
    /// Center point in percent of the canvas.
    #[serde(default)]
    pub position: OverlayPosition,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_font_weight")]
    pub font_weight: String,
    #[serde(default)]
    pub font_family: String,
    #[serde(default = "default_text_color")]
    pub color: String,
    #[serde(default = "default_one")]
    pub opacity: f64,
    /// Degrees.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub orientation: TextOrientation,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default)]
    pub text_shadow: Option<TextShadowConfig>,
}

impl TextOverlay {
    /// Visible overlay centered at `(x%, y%)`.
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: String::new(),
            text: text.into(),
            position: OverlayPosition { x, y },
            font_size: default_font_size(),
            font_weight: default_font_weight(),
            font_family: String::new(),
            color: default_text_color(),
            opacity: 1.0,
            rotation: 0.0,
            orientation: TextOrientation::Horizontal,
            is_visible: true,
            text_shadow: None,
        }
    }

    pub fn validate(&self) -> BackdropResult<()> {
        check_range("text opacity", self.opacity, 0.0, 1.0)?;
        check_range("font size", self.font_size, 1.0, 1000.0)?;
        check_range("text rotation", self.rotation, -360.0, 360.0)?;
        if !self.position.x.is_finite() || !self.position.y.is_finite() {
            return Err(BackdropError::validation("text position must be finite"));
        }
        Ok(())
    }
}

/// User-placed image sticker.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImageOverlay {
    #[serde(default)]
    pub id: String,
    /// Image reference resolved through the loader.
    pub src: String,
    /// Top-left corner in live canvas px.
    #[serde(default)]
    pub position: OverlayPosition,
    /// Edge length of the square box in live px.
    pub size: f64,
    /// Degrees.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_one")]
    pub opacity: f64,
    #[serde(default)]
    pub flip_x: bool,
    #[serde(default)]
    pub flip_y: bool,
    #[serde(default = "default_true")]
    pub is_visible: bool,
}

impl ImageOverlay {
    /// Visible, unrotated overlay.
    pub fn new(src: impl Into<String>, x: f64, y: f64, size: f64) -> Self {
        Self {
            id: String::new(),
            src: src.into(),
            position: OverlayPosition { x, y },
            size,
            rotation: 0.0,
            opacity: 1.0,
            flip_x: false,
            flip_y: false,
            is_visible: true,
        }
    }

    pub fn validate(&self) -> BackdropResult<()> {
        check_range("overlay opacity", self.opacity, 0.0, 1.0)?;
        check_range("overlay size", self.size, 0.0, 16_384.0)?;
        check_range("overlay rotation", self.rotation, -360.0, 360.0)?;
        if !self.position.x.is_finite() || !self.position.y.is_finite() {
            return Err(BackdropError::validation("overlay position must be finite"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/overlay.rs"]
mod tests;
