use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::export::ExportSettings;
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::layout::dimensions::DimensionInputs;
use crate::model::{
    BackgroundConfig, ExportOptions, FrameConfig, ImageOverlay, PatternConfig,
    Perspective3DConfig, ScreenshotConfig, ShadowConfig, TextOverlay, TextureConfig,
    check_range,
};

fn default_background() -> BackgroundConfig {
    BackgroundConfig::gradient(crate::model::background::DEFAULT_GRADIENT)
}

/// Editor state snapshot, as handed over by the UI (or written by hand as JSON).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExportJob {
    /// Main image reference, resolved through the loader.
    pub image: String,
    pub container_width: f64,
    pub container_height: f64,
    #[serde(default)]
    pub viewport_width: Option<f64>,
    #[serde(default)]
    pub viewport_height: Option<f64>,
    #[serde(default)]
    pub aspect_ratio: Option<f64>,
    #[serde(default)]
    pub canvas_padding: f64,

    #[serde(default)]
    pub screenshot: ScreenshotConfig,
    #[serde(default)]
    pub frame: FrameConfig,
    #[serde(default)]
    pub shadow: ShadowConfig,
    #[serde(default)]
    pub pattern: PatternConfig,
    #[serde(default)]
    pub texture: Option<TextureConfig>,

    #[serde(default = "default_background")]
    pub background: BackgroundConfig,
    /// Corner radius of the background card, px.
    #[serde(default)]
    pub background_radius: f64,
    /// Background blur, px.
    #[serde(default)]
    pub background_blur: f64,
    /// Background noise, percent.
    #[serde(default)]
    pub background_noise: f64,

    #[serde(default)]
    pub perspective: Perspective3DConfig,
    #[serde(default)]
    pub text_overlays: Vec<TextOverlay>,
    #[serde(default)]
    pub image_overlays: Vec<ImageOverlay>,

    /// Export request; defaults to the live canvas size at scale 1.
    #[serde(default)]
    pub export: Option<ExportOptions>,
    #[serde(default)]
    pub settings: ExportSettings,
}

impl ExportJob {
    /// Parse and validate a job from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> BackdropResult<Self> {
        let job: Self = serde_json::from_reader(r)
            .map_err(|e| BackdropError::serde(format!("parse export job JSON: {e}")))?;
        job.validate()?;
        Ok(job)
    }

    /// Parse and validate a job from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> BackdropResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            BackdropError::validation(format!("open export job '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> BackdropResult<()> {
        if self.image.trim().is_empty() {
            return Err(BackdropError::validation("export job requires an image"));
        }
        check_range("container width", self.container_width, 1.0, 100_000.0)?;
        check_range("container height", self.container_height, 1.0, 100_000.0)?;
        check_range("canvas padding", self.canvas_padding, 0.0, 10_000.0)?;
        if let Some(a) = self.aspect_ratio {
            check_range("aspect ratio", a, 0.01, 100.0)?;
        }
        check_range("background radius", self.background_radius, 0.0, 10_000.0)?;
        check_range("background blur", self.background_blur, 0.0, 50.0)?;
        check_range("background noise", self.background_noise, 0.0, 100.0)?;

        self.screenshot.validate()?;
        self.frame.validate()?;
        self.shadow.validate()?;
        self.pattern.validate()?;
        if let Some(t) = &self.texture {
            t.validate()?;
        }
        self.background.validate()?;
        self.perspective.validate()?;
        for t in &self.text_overlays {
            t.validate()?;
        }
        for i in &self.image_overlays {
            i.validate()?;
        }
        if let Some(opts) = &self.export {
            opts.validate()?;
        }
        self.settings.watermark()?;
        Ok(())
    }

    /// Sizing inputs for an image of `(width, height)`.
    pub fn dimension_inputs(&self, image_width: f64, image_height: f64) -> DimensionInputs {
        DimensionInputs {
            image_width,
            image_height,
            container_width: self.container_width,
            container_height: self.container_height,
            viewport_width: self.viewport_width.unwrap_or(f64::INFINITY),
            viewport_height: self.viewport_height.unwrap_or(f64::INFINITY),
            canvas_padding: self.canvas_padding,
            screenshot_scale: self.screenshot.scale,
            aspect_ratio: self.aspect_ratio,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/job.rs"]
mod tests;
