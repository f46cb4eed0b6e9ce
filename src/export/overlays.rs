//! Overlays exporter: user overlays alone, on a transparent layer.

use crate::assets::loader::ImageLoader;
use crate::color::normalize::{CssColorEngine, normalize_tree};
use crate::document::{CaptureOptions, Document, Element, Style, capture};
use crate::export::placement::{OverlayPlacement, OverlaySet};
use crate::export::settings::SettleDelays;
use crate::export::settle::Settle;
use crate::export::suppressed_stylesheets;
use crate::foundation::error::BackdropResult;
use crate::raster::layer::RasterLayer;

/// Inputs of [`export_overlays`].
#[derive(Clone, Copy, Debug)]
pub struct OverlaysExportOptions<'a> {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
    pub overlays: OverlaySet<'a>,
}

/// Capture every visible overlay at `width*scale x height*scale`.
///
/// Returns `None` when no overlay is visible.
#[tracing::instrument(skip_all, fields(w = opts.width, h = opts.height, scale = opts.scale))]
pub fn export_overlays(
    doc: &mut Document,
    loader: &dyn ImageLoader,
    settle: &dyn Settle,
    delays: &SettleDelays,
    opts: &OverlaysExportOptions<'_>,
) -> BackdropResult<Option<RasterLayer>> {
    if !opts.overlays.any_visible() {
        tracing::debug!("no visible overlays");
        return Ok(None);
    }
    let placement = OverlayPlacement::from_live(doc, opts.width, opts.height)?;
    let mut container = Element::new("export-overlays-container")
        .with_style(Style::boxed(0.0, 0.0, opts.width, opts.height));
    container.children = placement.build_elements(doc, loader, opts.overlays);
    normalize_tree(&mut container, &CssColorEngine);
    settle.settle("overlay fonts", delays.overlay_fonts());

    let capture_opts = CaptureOptions {
        use_cors: true,
        allow_taint: true,
        suppress_stylesheets: suppressed_stylesheets(),
        ..CaptureOptions::new(opts.width, opts.height, opts.scale)
    };
    let mount = doc.mount_offscreen(container);
    let layer = capture(mount.document(), mount.id(), &capture_opts)?;
    Ok(Some(layer))
}

#[cfg(test)]
#[path = "../../tests/unit/export/overlays.rs"]
mod tests;
