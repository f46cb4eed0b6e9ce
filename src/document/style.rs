use crate::raster::composite::BlendMode;

/// CSS length: absolute px or percent of a reference size.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Length {
    Px(f64),
    Percent(f64),
}

impl Default for Length {
    fn default() -> Self {
        Self::Px(0.0)
    }
}

impl Length {
    pub fn resolve(self, base: f64) -> f64 {
        match self {
            Self::Px(v) => v,
            Self::Percent(p) => base * p / 100.0,
        }
    }

    /// `100%`.
    pub const FULL: Self = Self::Percent(100.0);
    /// `50%`.
    pub const HALF: Self = Self::Percent(50.0);
}

/// `background-size`.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundSize {
    /// Gradients stretch to the box; images keep their intrinsic size.
    #[default]
    Auto,
    Cover,
    Contain,
    /// Explicit tile size in px.
    Tile(f64, f64),
}

/// `object-fit` of replaced content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectFit {
    #[default]
    Fill,
    Contain,
    Cover,
}

/// One CSS transform function. Angles are degrees.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformOp {
    /// Percentages refer to the element's own box.
    Translate(Length, Length),
    Scale(f64, f64),
    /// `rotate()`, identical to `rotateZ()`.
    Rotate(f64),
    RotateX(f64),
    RotateY(f64),
    RotateZ(f64),
    /// The `perspective()` transform function.
    Perspective(f64),
}

impl TransformOp {
    /// `true` for functions that need a 3D-aware capture.
    pub fn is_3d(&self) -> bool {
        matches!(self, Self::RotateX(_) | Self::RotateY(_) | Self::Perspective(_))
    }

    /// CSS serialization.
    pub fn to_css(&self) -> String {
        let len = |l: &Length| match l {
            Length::Px(v) => format!("{v}px"),
            Length::Percent(p) => format!("{p}%"),
        };
        match self {
            Self::Translate(x, y) => format!("translate({}, {})", len(x), len(y)),
            Self::Scale(x, y) if x == y => format!("scale({x})"),
            Self::Scale(x, y) => format!("scale({x}, {y})"),
            Self::Rotate(a) => format!("rotate({a}deg)"),
            Self::RotateX(a) => format!("rotateX({a}deg)"),
            Self::RotateY(a) => format!("rotateY({a}deg)"),
            Self::RotateZ(a) => format!("rotateZ({a}deg)"),
            Self::Perspective(d) => format!("perspective({d}px)"),
        }
    }
}

/// Serialize a transform list the way computed style prints it.
pub fn transform_to_css(ops: &[TransformOp]) -> String {
    if ops.is_empty() {
        return "none".to_string();
    }
    ops.iter().map(TransformOp::to_css).collect::<Vec<_>>().join(" ")
}

/// One `text-shadow` entry.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextShadow {
    pub offset_x: f64,
    pub offset_y: f64,
    pub blur: f64,
    pub color: String,
}

/// Inline style of an element. Only the properties capture understands are modeled.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Style {
    pub left: Length,
    pub top: Length,
    /// `None` fills the parent.
    pub width: Option<Length>,
    pub height: Option<Length>,

    pub background_color: Option<String>,
    pub background_image: Option<String>,
    pub background_size: BackgroundSize,
    pub background_repeat: bool,

    pub opacity: f64,
    pub visible: bool,
    pub border_radius: f64,
    pub border_width: f64,
    pub border_color: Option<String>,

    /// Raw CSS `filter` value.
    pub filter: Option<String>,
    pub transform: Vec<TransformOp>,
    pub transform_origin: (Length, Length),
    /// `perspective` applied to children.
    pub perspective: Option<f64>,

    pub color: Option<String>,
    pub font_size: f64,
    pub font_weight: Option<String>,
    pub font_family: Option<String>,
    pub text_shadow: Vec<TextShadow>,
    pub vertical_writing: bool,
    pub white_space_nowrap: bool,

    pub object_fit: ObjectFit,
    pub overflow_hidden: bool,
    pub mix_blend_mode: BlendMode,
    pub z_index: i32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            left: Length::Px(0.0),
            top: Length::Px(0.0),
            width: None,
            height: None,
            background_color: None,
            background_image: None,
            background_size: BackgroundSize::Auto,
            background_repeat: true,
            opacity: 1.0,
            visible: true,
            border_radius: 0.0,
            border_width: 0.0,
            border_color: None,
            filter: None,
            transform: Vec::new(),
            transform_origin: (Length::HALF, Length::HALF),
            perspective: None,
            color: None,
            font_size: 16.0,
            font_weight: None,
            font_family: None,
            text_shadow: Vec::new(),
            vertical_writing: false,
            white_space_nowrap: false,
            object_fit: ObjectFit::Fill,
            overflow_hidden: false,
            mix_blend_mode: BlendMode::Normal,
            z_index: 0,
        }
    }
}

impl Style {
    /// Absolute box at `(left, top)` with explicit px size.
    pub fn boxed(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left: Length::Px(left),
            top: Length::Px(top),
            width: Some(Length::Px(width)),
            height: Some(Length::Px(height)),
            ..Self::default()
        }
    }

    /// Radius of the first `blur()` in `filter`, if any.
    pub fn blur_filter(&self) -> Option<f64> {
        let f = self.filter.as_deref()?.trim();
        let start = f.find("blur(")? + "blur(".len();
        let end = start + f[start..].find(')')?;
        let arg = f[start..end].trim();
        let v: f64 = arg.strip_suffix("px").unwrap_or(arg).trim().parse().ok()?;
        (v.is_finite() && v > 0.0).then_some(v)
    }

    pub fn has_3d_transform(&self) -> bool {
        self.transform.iter().any(TransformOp::is_3d)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/style.rs"]
mod tests;
