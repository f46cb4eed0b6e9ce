//! The export pipeline.
//!
//! Three capture strategies produce raster layers: the flat document capture (background and
//! overlays), the stage snapshot (image and frame) and the perspective capture (3D image). The
//! compositor stacks them, the watermark is stamped last and the result is encoded as PNG.
//! [`Exporter`] sequences the steps.

pub mod background;
pub mod compositor;
pub mod encode;
pub mod orchestrator;
pub mod overlays;
pub mod placement;
pub mod scene;
pub mod settings;
pub mod settle;
pub mod transform3d;
pub mod watermark;

pub use background::{BackgroundExportOptions, export_background};
pub use compositor::{CompositeOptions, composite};
pub use encode::{check_data_url, encode_png};
pub use orchestrator::{ExportInputs, ExportPhase, Exporter};
pub use overlays::{OverlaysExportOptions, export_overlays};
pub use placement::{OverlayPlacement, OverlaySet};
pub use scene::{LayerVisibilityGuard, SceneExportOptions, export_scene};
pub use settings::{ExportSettings, OverlayStrategy, SettleDelays};
pub use settle::{NoSettle, Settle, ThreadSettle};
pub use transform3d::{Transform3DOptions, apply_3d};
pub use watermark::{WatermarkStyle, stamp_watermark};

/// Id of the composed preview card: the anchor every export starts from.
pub const RENDER_CARD_ID: &str = "image-render-card";

/// Id of the live background element.
pub const BACKGROUND_ID: &str = "canvas-background";

/// Id of the live noise preview element.
pub const NOISE_OVERLAY_ID: &str = "canvas-noise-overlay";

/// Id a noise element carries inside an export container.
pub const EXPORT_NOISE_OVERLAY_ID: &str = "export-noise-overlay";

/// Id given to the background clone inside the export container.
pub const BACKGROUND_CLONE_ID: &str = "export-background-temp";

/// Attribute flagging the perspective-transformed image host.
pub const OVERLAY_3D_ATTR: &str = "data-3d-overlay";

/// Stylesheets disabled during flat capture.
pub const SUPPRESSED_STYLESHEETS: [&str; 2] = ["globals.css", "tailwind"];

pub(crate) fn suppressed_stylesheets() -> Vec<String> {
    SUPPRESSED_STYLESHEETS.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
#[path = "../tests/unit/export/fixtures.rs"]
pub(crate) mod fixtures;
