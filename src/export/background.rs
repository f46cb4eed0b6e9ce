//! Background exporter: flat capture of a clone of the live background element.
//!
//! The clone is mounted offscreen at the export size with its CSS filter removed; blur and
//! noise are re-applied numerically after capture.

use crate::assets::loader::ImageLoader;
use crate::color::normalize::{CssColorEngine, normalize_tree};
use crate::document::images::short;
use crate::document::{CaptureOptions, Document, Element, Length, Style, capture};
use crate::effects::blur::apply_blur;
use crate::effects::noise::{NoiseTexture, apply_noise};
use crate::export::placement::{OverlayPlacement, OverlaySet};
use crate::export::settings::SettleDelays;
use crate::export::settle::Settle;
use crate::export::{
    BACKGROUND_CLONE_ID, BACKGROUND_ID, EXPORT_NOISE_OVERLAY_ID, NOISE_OVERLAY_ID,
    suppressed_stylesheets,
};
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::model::BackgroundConfig;
use crate::raster::layer::RasterLayer;

/// Inputs of [`export_background`].
#[derive(Clone, Debug)]
pub struct BackgroundExportOptions<'a> {
    /// Logical export width.
    pub width: f64,
    /// Logical export height.
    pub height: f64,
    /// Device px per logical px.
    pub scale: f64,
    pub background: &'a BackgroundConfig,
    /// Live corner radius, px.
    pub border_radius: f64,
    /// Background blur, live px.
    pub blur: f64,
    /// Noise intensity in percent.
    pub noise: f64,
    /// Overlays captured with the background, if that strategy is active.
    pub overlays: Option<OverlaySet<'a>>,
}

/// Capture the background (and optionally the overlays) at `width*scale x height*scale`.
#[tracing::instrument(skip_all, fields(w = opts.width, h = opts.height, scale = opts.scale))]
pub fn export_background(
    doc: &mut Document,
    loader: &dyn ImageLoader,
    settle: &dyn Settle,
    delays: &SettleDelays,
    opts: &BackgroundExportOptions<'_>,
) -> BackdropResult<RasterLayer> {
    let live = doc.element_by_id(BACKGROUND_ID).ok_or_else(|| {
        BackdropError::precondition(
            "canvas background element not found. Please ensure the canvas is properly initialized.",
        )
    })?;
    let mut clone = live.clone();
    let noise_source = doc.element_by_id(NOISE_OVERLAY_ID).cloned();
    let placement = OverlayPlacement::from_live(doc, opts.width, opts.height)?;

    clone.id = BACKGROUND_CLONE_ID.to_string();
    clone.style.left = Length::Px(0.0);
    clone.style.top = Length::Px(0.0);
    clone.style.width = Some(Length::Px(opts.width));
    clone.style.height = Some(Length::Px(opts.height));
    clone.style.filter = Some("none".to_string());
    clone.style.border_radius = opts.border_radius.max(0.0) * placement.scale_x;
    rename_noise(&mut clone);

    let mut container = Element::new("export-background-container")
        .with_style(Style::boxed(0.0, 0.0, opts.width, opts.height))
        .with_child(clone);
    if let Some(overlays) = opts.overlays {
        container
            .children
            .extend(placement.build_elements(doc, loader, overlays));
    }

    if let Some(src) = opts.background.image_src() {
        match doc.images.ensure(src, loader) {
            Ok(_) => settle.settle("background image", delays.image_load()),
            Err(err) => {
                tracing::warn!(src = %short(src), %err, "background image failed to load; capturing without it")
            }
        }
    }

    let rewritten = normalize_tree(&mut container, &CssColorEngine);
    tracing::debug!(rewritten, "background colors normalized");
    settle.settle("background fonts", delays.background_fonts());

    let capture_opts = CaptureOptions {
        ignore_ids: vec![
            EXPORT_NOISE_OVERLAY_ID.to_string(),
            NOISE_OVERLAY_ID.to_string(),
        ],
        use_cors: true,
        allow_taint: true,
        suppress_stylesheets: suppressed_stylesheets(),
        ..CaptureOptions::new(opts.width, opts.height, opts.scale)
    };
    let raster = {
        let mount = doc.mount_offscreen(container);
        capture(mount.document(), mount.id(), &capture_opts)?
    };

    let raster = if opts.blur > 0.0 {
        apply_blur(raster, opts.blur * opts.scale)?
    } else {
        raster
    };
    if opts.noise <= 0.0 {
        return Ok(raster);
    }
    let texture = NoiseTexture::from_preview_or_fallback(noise_source.as_ref())?;
    apply_noise(raster, opts.noise / 100.0, &texture)
}

/// A noise element inside the clone takes the export id so capture leaves it out.
fn rename_noise(el: &mut Element) {
    for child in &mut el.children {
        if child.id == NOISE_OVERLAY_ID {
            child.id = EXPORT_NOISE_OVERLAY_ID.to_string();
        }
        rename_noise(child);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/background.rs"]
mod tests;
