use crate::foundation::error::{BackdropError, BackdropResult};
use crate::model::{check_range, default_one, default_true};

/// Border treatment drawn around the main image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameKind {
    #[default]
    None,
    Solid,
    Glassy,
    Ruler,
    InfiniteMirror,
    Eclipse,
    Stack,
    Window,
    Dotted,
    Focus,
}

/// Light/dark palette for the stack and window frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameTheme {
    #[default]
    Dark,
    Light,
}

fn default_frame_width() -> f64 {
    8.0
}

fn default_frame_color() -> String {
    "#ffffff".to_string()
}

fn default_window_padding() -> f64 {
    20.0
}

/// Frame styling.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameConfig {
    /// Master switch; a disabled frame behaves like [`FrameKind::None`].
    #[serde(default)]
    pub enabled: bool,
    /// Frame style.
    #[serde(rename = "type", default)]
    pub kind: FrameKind,
    /// Border width in px.
    #[serde(default = "default_frame_width")]
    pub width: f64,
    /// Border color.
    #[serde(default = "default_frame_color")]
    pub color: String,
    /// Inner padding of the window frame.
    #[serde(default = "default_window_padding")]
    pub padding: f64,
    /// Window title.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub theme: FrameTheme,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: FrameKind::None,
            width: default_frame_width(),
            color: default_frame_color(),
            padding: default_window_padding(),
            title: String::new(),
            theme: FrameTheme::Dark,
        }
    }
}

impl FrameConfig {
    /// Enabled frame of `kind`.
    pub fn of(kind: FrameKind) -> Self {
        Self {
            enabled: true,
            kind,
            ..Self::default()
        }
    }

    /// The kind actually drawn.
    pub fn effective_kind(&self) -> FrameKind {
        if self.enabled {
            self.kind
        } else {
            FrameKind::None
        }
    }

    pub fn validate(&self) -> BackdropResult<()> {
        check_range("frame width", self.width, 0.0, 500.0)?;
        check_range("frame padding", self.padding, 0.0, 500.0)
    }
}

/// Placement of the main image inside the canvas.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScreenshotConfig {
    /// Horizontal offset from the canvas center, px.
    pub offset_x: f64,
    /// Vertical offset from the canvas center, px.
    pub offset_y: f64,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Corner radius, px.
    pub radius: f64,
    /// Zoom relative to the fitted size.
    pub scale: f64,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            rotation: 0.0,
            radius: 10.0,
            scale: 1.0,
        }
    }
}

impl ScreenshotConfig {
    pub fn validate(&self) -> BackdropResult<()> {
        check_range("screenshot radius", self.radius, 0.0, 1000.0)?;
        check_range("screenshot scale", self.scale, 0.01, 10.0)?;
        check_range("screenshot rotation", self.rotation, -360.0, 360.0)?;
        if !self.offset_x.is_finite() || !self.offset_y.is_finite() {
            return Err(BackdropError::validation("screenshot offset must be finite"));
        }
        Ok(())
    }
}

/// Direction the drop shadow falls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShadowSide {
    #[default]
    Bottom,
    Right,
    BottomRight,
}

fn default_shadow_color() -> String {
    "rgba(0, 0, 0, 0.5)".to_string()
}

/// Drop shadow under the image or its frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShadowConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Offset distance, px.
    #[serde(default)]
    pub elevation: f64,
    #[serde(default)]
    pub side: ShadowSide,
    /// Canvas-style shadow blur, px.
    #[serde(default)]
    pub softness: f64,
    #[serde(default = "default_shadow_color")]
    pub color: String,
    /// Shadow opacity in `[0, 1]`.
    #[serde(default = "default_one")]
    pub intensity: f64,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            elevation: 0.0,
            side: ShadowSide::Bottom,
            softness: 0.0,
            color: default_shadow_color(),
            intensity: 1.0,
        }
    }
}

impl ShadowConfig {
    /// Offset of the shadow silhouette for the configured side.
    pub fn offset(&self) -> (f64, f64) {
        let e = self.elevation;
        match self.side {
            ShadowSide::Bottom => (0.0, e),
            ShadowSide::Right => (e, 0.0),
            ShadowSide::BottomRight => (e * 0.707, e * 0.707),
        }
    }

    pub fn validate(&self) -> BackdropResult<()> {
        check_range("shadow elevation", self.elevation, 0.0, 500.0)?;
        check_range("shadow softness", self.softness, 0.0, 500.0)?;
        check_range("shadow intensity", self.intensity, 0.0, 1.0)
    }
}

/// Decorative tile motif.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    #[default]
    Dots,
    Grid,
    Lines,
    Cross,
}

fn default_pattern_spacing() -> f64 {
    20.0
}

fn default_pattern_color() -> String {
    "rgba(255, 255, 255, 0.25)".to_string()
}

/// Decorative pattern layer drawn between the background and the image.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PatternConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "type", default)]
    pub kind: PatternKind,
    /// Mark size multiplier.
    #[serde(default = "default_one")]
    pub scale: f64,
    /// Tile pitch, px.
    #[serde(default = "default_pattern_spacing")]
    pub spacing: f64,
    #[serde(default = "default_pattern_color")]
    pub color: String,
    #[serde(default = "default_one")]
    pub opacity: f64,
    /// Motif rotation inside the tile, degrees.
    #[serde(default)]
    pub rotation: f64,
    /// Tile blur, px.
    #[serde(default)]
    pub blur: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: PatternKind::Dots,
            scale: 1.0,
            spacing: default_pattern_spacing(),
            color: default_pattern_color(),
            opacity: 1.0,
            rotation: 0.0,
            blur: 0.0,
        }
    }
}

impl PatternConfig {
    pub fn validate(&self) -> BackdropResult<()> {
        check_range("pattern scale", self.scale, 0.1, 10.0)?;
        check_range("pattern spacing", self.spacing, 2.0, 512.0)?;
        check_range("pattern opacity", self.opacity, 0.0, 1.0)?;
        check_range("pattern rotation", self.rotation, -360.0, 360.0)?;
        check_range("pattern blur", self.blur, 0.0, 50.0)
    }
}

/// Image texture tiled over the background.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextureConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Image reference resolved through the loader.
    pub source: String,
    #[serde(default = "default_one")]
    pub opacity: f64,
}

impl TextureConfig {
    pub fn validate(&self) -> BackdropResult<()> {
        check_range("texture opacity", self.opacity, 0.0, 1.0)?;
        if self.enabled && self.source.trim().is_empty() {
            return Err(BackdropError::validation("texture requires a source"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/frame.rs"]
mod tests;
