use crate::foundation::error::BackdropResult;
use crate::model::check_range;

/// CSS 3D transform applied to the main image.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Perspective3DConfig {
    /// `perspective()` distance in px.
    pub perspective: f64,
    /// Rotation about X in degrees.
    pub rotate_x: f64,
    /// Rotation about Y in degrees.
    pub rotate_y: f64,
    /// Rotation about Z in degrees.
    pub rotate_z: f64,
    /// Translation in percent of the element width.
    pub translate_x: f64,
    /// Translation in percent of the element height.
    pub translate_y: f64,
    /// Uniform scale.
    pub scale: f64,
}

impl Default for Perspective3DConfig {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Perspective3DConfig {
    /// The configuration that leaves the image flat.
    pub const IDENTITY: Self = Self {
        perspective: 200.0,
        rotate_x: 0.0,
        rotate_y: 0.0,
        rotate_z: 0.0,
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    /// `true` only for the exact identity value.
    ///
    /// This is the single switch for 3D capture mode; every caller derives it from the live
    /// config instead of caching a flag.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Negation of [`Self::is_identity`].
    pub fn has_transform(&self) -> bool {
        !self.is_identity()
    }

    /// Validate numeric ranges.
    pub fn validate(&self) -> BackdropResult<()> {
        check_range("perspective", self.perspective, 1.0, 100_000.0)?;
        for (name, v) in [
            ("rotate_x", self.rotate_x),
            ("rotate_y", self.rotate_y),
            ("rotate_z", self.rotate_z),
        ] {
            check_range(name, v, -360.0, 360.0)?;
        }
        check_range("translate_x", self.translate_x, -1000.0, 1000.0)?;
        check_range("translate_y", self.translate_y, -1000.0, 1000.0)?;
        check_range("scale", self.scale, 0.01, 100.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/perspective.rs"]
mod tests;
