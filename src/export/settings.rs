use std::time::Duration;

use crate::color::normalize::resolve_any;
use crate::export::watermark::WatermarkStyle;
use crate::foundation::error::{BackdropError, BackdropResult};

/// Where user overlays are rasterized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayStrategy {
    /// Separate transparent layer composited above the image.
    #[default]
    Isolated,
    /// Captured together with the background, below the image.
    WithBackground,
}

/// Settle delays in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SettleDelays {
    /// Before the first capture.
    pub pre_capture_ms: u64,
    /// Font readiness before the background capture.
    pub background_fonts_ms: u64,
    /// Font readiness before the overlays capture.
    pub overlay_fonts_ms: u64,
    /// After mounting the 3D clone.
    pub mount_3d_ms: u64,
    /// After an image-backed background finished loading.
    pub image_load_ms: u64,
}

impl Default for SettleDelays {
    fn default() -> Self {
        Self {
            pre_capture_ms: 200,
            background_fonts_ms: 300,
            overlay_fonts_ms: 200,
            mount_3d_ms: 100,
            image_load_ms: 100,
        }
    }
}

impl SettleDelays {
    /// All zero.
    pub const NONE: Self = Self {
        pre_capture_ms: 0,
        background_fonts_ms: 0,
        overlay_fonts_ms: 0,
        mount_3d_ms: 0,
        image_load_ms: 0,
    };

    pub fn pre_capture(&self) -> Duration {
        Duration::from_millis(self.pre_capture_ms)
    }

    pub fn background_fonts(&self) -> Duration {
        Duration::from_millis(self.background_fonts_ms)
    }

    pub fn overlay_fonts(&self) -> Duration {
        Duration::from_millis(self.overlay_fonts_ms)
    }

    pub fn mount_3d(&self) -> Duration {
        Duration::from_millis(self.mount_3d_ms)
    }

    pub fn image_load(&self) -> Duration {
        Duration::from_millis(self.image_load_ms)
    }
}

fn default_watermark_text() -> String {
    "stage".to_string()
}

fn default_watermark_color() -> String {
    "rgba(255, 255, 255, 0.7)".to_string()
}

/// Pipeline knobs that are not part of the design itself.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExportSettings {
    #[serde(default)]
    pub delays: SettleDelays,
    #[serde(default = "default_watermark_text")]
    pub watermark_text: String,
    #[serde(default = "default_watermark_color")]
    pub watermark_color: String,
    #[serde(default)]
    pub overlay_strategy: OverlayStrategy,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            delays: SettleDelays::default(),
            watermark_text: default_watermark_text(),
            watermark_color: default_watermark_color(),
            overlay_strategy: OverlayStrategy::Isolated,
        }
    }
}

impl ExportSettings {
    pub fn with_strategy(mut self, strategy: OverlayStrategy) -> Self {
        self.overlay_strategy = strategy;
        self
    }

    pub fn without_delays(mut self) -> Self {
        self.delays = SettleDelays::NONE;
        self
    }

    /// Resolved watermark mark.
    pub fn watermark(&self) -> BackdropResult<WatermarkStyle> {
        let color = resolve_any(&self.watermark_color).ok_or_else(|| {
            BackdropError::validation(format!(
                "unsupported watermark color '{}'",
                self.watermark_color
            ))
        })?;
        Ok(WatermarkStyle {
            text: self.watermark_text.clone(),
            color,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/settings.rs"]
mod tests;
