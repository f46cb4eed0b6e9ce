//! Export orchestrator: runs every exporter in order and encodes the result.

use crate::assets::loader::ImageLoader;
use crate::document::Document;
use crate::export::background::{BackgroundExportOptions, export_background};
use crate::export::compositor::{CompositeOptions, composite};
use crate::export::encode::encode_png;
use crate::export::overlays::{OverlaysExportOptions, export_overlays};
use crate::export::placement::OverlaySet;
use crate::export::scene::{SceneExportOptions, export_scene};
use crate::export::settings::{ExportSettings, OverlayStrategy};
use crate::export::settle::Settle;
use crate::export::transform3d::{Transform3DOptions, apply_3d};
use crate::export::watermark::stamp_watermark;
use crate::export::RENDER_CARD_ID;
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::model::{
    BackgroundConfig, ExportArtifact, ExportOptions, ImageOverlay, Perspective3DConfig,
    TextOverlay,
};
use crate::scene::SceneHandle;

/// Step of an export run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportPhase {
    Idle,
    CapturingBackground,
    CapturingScene,
    CapturingOverlays,
    Capturing3D,
    Compositing,
    Watermarking,
    Encoding,
    Done,
    /// Terminal; the run produced no artifact.
    Failed,
}

impl ExportPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Snapshot of the editor state an export reads.
#[derive(Clone, Copy, Debug)]
pub struct ExportInputs<'a> {
    pub options: ExportOptions,
    pub background: &'a BackgroundConfig,
    /// Background corner radius, live px.
    pub border_radius: f64,
    /// Background blur, live px.
    pub blur: f64,
    /// Background noise, percent.
    pub noise: f64,
    pub text_overlays: &'a [TextOverlay],
    pub image_overlays: &'a [ImageOverlay],
    pub perspective: &'a Perspective3DConfig,
    /// Whether a user image is loaded; 3D capture needs one.
    pub image_loaded: bool,
}

impl ExportInputs<'_> {
    fn overlays(&self) -> OverlaySet<'_> {
        OverlaySet::new(self.text_overlays, self.image_overlays)
    }
}

/// Sequential export pipeline.
///
/// Steps never overlap: each one mutates and restores shared document or stage state. The
/// scene handle is passed per call.
pub struct Exporter<'a> {
    settings: ExportSettings,
    settle: &'a dyn Settle,
    loader: &'a dyn ImageLoader,
    history: Vec<ExportPhase>,
}

impl<'a> Exporter<'a> {
    pub fn new(settings: ExportSettings, settle: &'a dyn Settle, loader: &'a dyn ImageLoader) -> Self {
        Self {
            settings,
            settle,
            loader,
            history: vec![ExportPhase::Idle],
        }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Current phase.
    pub fn phase(&self) -> ExportPhase {
        self.history.last().copied().unwrap_or(ExportPhase::Idle)
    }

    /// Every phase entered since construction, in order.
    pub fn history(&self) -> &[ExportPhase] {
        &self.history
    }

    fn enter(&mut self, phase: ExportPhase) {
        tracing::debug!(from = ?self.phase(), to = ?phase, "export phase");
        self.history.push(phase);
    }

    /// Run a full export.
    ///
    /// All-or-nothing: any failing step aborts the run in [`ExportPhase::Failed`] and no
    /// artifact is returned.
    #[tracing::instrument(
        skip_all,
        fields(w = inputs.options.export_width, h = inputs.options.export_height, scale = inputs.options.scale)
    )]
    pub fn export(
        &mut self,
        doc: &mut Document,
        scene: Option<&mut dyn SceneHandle>,
        inputs: &ExportInputs<'_>,
    ) -> BackdropResult<ExportArtifact> {
        if self.phase().is_terminal() {
            self.history.clear();
            self.history.push(ExportPhase::Idle);
        }
        let result = self.run(doc, scene, inputs);
        match &result {
            Ok(art) => {
                self.enter(ExportPhase::Done);
                tracing::debug!(w = art.width, h = art.height, "export done");
            }
            Err(err) => {
                self.enter(ExportPhase::Failed);
                tracing::warn!(%err, "export failed");
            }
        }
        result
    }

    fn run(
        &mut self,
        doc: &mut Document,
        scene: Option<&mut dyn SceneHandle>,
        inputs: &ExportInputs<'_>,
    ) -> BackdropResult<ExportArtifact> {
        let options = inputs.options;
        options.validate()?;
        inputs.background.validate()?;
        if doc.element_by_id(RENDER_CARD_ID).is_none() {
            return Err(BackdropError::precondition(
                "image render card not found. Please ensure an image is uploaded.",
            ));
        }
        let scene = scene.ok_or_else(|| BackdropError::precondition("scene graph handle not provided"))?;
        let watermark = self.settings.watermark()?;
        let delays = self.settings.delays;
        self.settle.settle("pre-capture", delays.pre_capture());

        let (width, height, scale) = (
            f64::from(options.export_width),
            f64::from(options.export_height),
            options.scale,
        );
        let strategy = self.settings.overlay_strategy;

        self.enter(ExportPhase::CapturingBackground);
        let background = export_background(
            doc,
            self.loader,
            self.settle,
            &delays,
            &BackgroundExportOptions {
                width,
                height,
                scale,
                background: inputs.background,
                border_radius: inputs.border_radius,
                blur: inputs.blur,
                noise: inputs.noise,
                overlays: (strategy == OverlayStrategy::WithBackground).then(|| inputs.overlays()),
            },
        )?;

        self.enter(ExportPhase::CapturingScene);
        let mut scene_layer = export_scene(scene, &SceneExportOptions { width, height, scale })?;

        let overlays = if strategy == OverlayStrategy::Isolated {
            self.enter(ExportPhase::CapturingOverlays);
            export_overlays(
                doc,
                self.loader,
                self.settle,
                &delays,
                &OverlaysExportOptions {
                    width,
                    height,
                    scale,
                    overlays: inputs.overlays(),
                },
            )?
        } else {
            None
        };

        if inputs.image_loaded && !inputs.perspective.is_identity() {
            self.enter(ExportPhase::Capturing3D);
            scene_layer = apply_3d(
                doc,
                self.settle,
                &delays,
                scene_layer,
                &Transform3DOptions {
                    anchor_id: RENDER_CARD_ID,
                    perspective: inputs.perspective,
                    width,
                    height,
                    scale,
                },
            )?;
        }

        self.enter(ExportPhase::Compositing);
        let flat = composite(
            &background,
            &scene_layer,
            overlays.as_ref(),
            &CompositeOptions {
                width: options.export_width,
                height: options.export_height,
                scale,
            },
        )?;

        self.enter(ExportPhase::Watermarking);
        let stamped = stamp_watermark(flat, &watermark)?;

        self.enter(ExportPhase::Encoding);
        encode_png(&stamped, &options)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/orchestrator.rs"]
mod tests;
