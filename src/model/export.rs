use crate::foundation::error::{BackdropError, BackdropResult};
use crate::model::{check_range, default_one};

/// Output encoding. Only PNG is produced today.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Lossless PNG.
    #[default]
    Png,
}

impl ExportFormat {
    /// MIME type of the encoded artifact.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
        }
    }
}

/// Export request parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExportOptions {
    /// Output format.
    #[serde(default)]
    pub format: ExportFormat,
    /// Encoder quality in `[0, 1]`; ignored by lossless formats.
    #[serde(default = "default_one")]
    pub quality: f64,
    /// Resolution multiplier, `>= 1`.
    #[serde(default = "default_one")]
    pub scale: f64,
    /// Logical target width.
    pub export_width: u32,
    /// Logical target height.
    pub export_height: u32,
}

impl ExportOptions {
    /// PNG at scale 1 and full quality.
    pub fn new(export_width: u32, export_height: u32) -> Self {
        Self {
            format: ExportFormat::Png,
            quality: 1.0,
            scale: 1.0,
            export_width,
            export_height,
        }
    }

    /// Builder-style scale override.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Validate ranges.
    pub fn validate(&self) -> BackdropResult<()> {
        check_range("export quality", self.quality, 0.0, 1.0)?;
        if !self.scale.is_finite() || self.scale < 1.0 {
            return Err(BackdropError::validation(format!(
                "export scale must be >= 1, got {}",
                self.scale
            )));
        }
        if self.export_width == 0 || self.export_height == 0 {
            return Err(BackdropError::validation(
                "export width and height must be > 0",
            ));
        }
        let (w, h) = self.pixel_size();
        let max = crate::raster::layer::MAX_RASTER_DIM;
        if w > max || h > max {
            return Err(BackdropError::validation(format!(
                "export raster {w}x{h} exceeds {max}x{max}"
            )));
        }
        Ok(())
    }

    /// Final raster size: `export * scale`, rounded.
    pub fn pixel_size(&self) -> (u32, u32) {
        let px = |v: u32| ((f64::from(v) * self.scale).round().max(1.0)) as u32;
        (px(self.export_width), px(self.export_height))
    }
}

/// Encoded binary payload with its MIME type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    /// MIME type, e.g. `image/png`.
    pub mime: String,
    /// Encoded bytes.
    pub bytes: Vec<u8>,
}

/// Immutable export result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    /// `data:<mime>;base64,...`
    pub data_url: String,
    /// Raw encoded bytes.
    pub blob: Blob,
    /// Pixel width of the encoded image.
    pub width: u32,
    /// Pixel height of the encoded image.
    pub height: u32,
}

#[cfg(test)]
#[path = "../../tests/unit/model/export.rs"]
mod tests;
