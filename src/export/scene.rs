//! Scene exporter: snapshot of the image and frame layers of the live stage.

use crate::foundation::error::{BackdropError, BackdropResult};
use crate::raster::layer::{RasterLayer, ResampleFilter};
use crate::scene::{Layer, SceneHandle};

/// Hides layers for the duration of a snapshot.
///
/// On drop every layer it hid is made visible again and the handle is redrawn, whether the
/// snapshot succeeded or not.
pub struct LayerVisibilityGuard<'a> {
    handle: &'a mut dyn SceneHandle,
    hidden: Vec<usize>,
}

impl<'a> LayerVisibilityGuard<'a> {
    /// Hide every visible layer matching `suppress`.
    pub fn hide_where(
        handle: &'a mut dyn SceneHandle,
        suppress: impl Fn(&Layer) -> bool,
    ) -> Self {
        let mut hidden = Vec::new();
        for i in 0..handle.layer_count() {
            if !handle.is_layer_visible(i) {
                continue;
            }
            if handle.layer(i).is_some_and(|l| suppress(l)) {
                handle.set_layer_visible(i, false);
                hidden.push(i);
            }
        }
        Self { handle, hidden }
    }

    /// Indices of the layers this guard hid.
    pub fn hidden(&self) -> &[usize] {
        &self.hidden
    }

    pub fn handle(&self) -> &dyn SceneHandle {
        &*self.handle
    }
}

impl Drop for LayerVisibilityGuard<'_> {
    fn drop(&mut self) {
        for &i in &self.hidden {
            self.handle.set_layer_visible(i, true);
        }
        self.handle.redraw();
        tracing::debug!(restored = self.hidden.len(), "layer visibility restored");
    }
}

/// Inputs of [`export_scene`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneExportOptions {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

impl SceneExportOptions {
    /// Snapshot density for a stage of `live` size: never below the final output density.
    pub fn pixel_ratio(&self, live: (f64, f64)) -> f64 {
        self.scale * (self.width / live.0).max(self.height / live.1)
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        let px = |v: f64| (v * self.scale).round().max(1.0) as u32;
        (px(self.width), px(self.height))
    }
}

/// Snapshot the stage without its decorative and background-fill layers, resampled to exactly
/// `width*scale x height*scale`.
#[tracing::instrument(skip_all, fields(w = opts.width, h = opts.height, scale = opts.scale))]
pub fn export_scene(
    handle: &mut dyn SceneHandle,
    opts: &SceneExportOptions,
) -> BackdropResult<RasterLayer> {
    let (lw, lh) = handle.size();
    if !(lw > 0.0 && lh > 0.0 && lw.is_finite() && lh.is_finite()) {
        return Err(BackdropError::capture(format!(
            "stage has an empty size {lw}x{lh}"
        )));
    }
    let pixel_ratio = opts.pixel_ratio((lw, lh));
    let snapshot = {
        let guard = LayerVisibilityGuard::hide_where(handle, |layer| {
            layer.is_decorative() || layer.is_background_fill(lw, lh)
        });
        tracing::debug!(hidden = ?guard.hidden(), pixel_ratio, "stage layers suppressed");
        guard.handle().to_raster(pixel_ratio)?
    };
    let (pw, ph) = opts.pixel_size();
    snapshot.resampled(pw, ph, ResampleFilter::HighQuality)
}

#[cfg(test)]
#[path = "../../tests/unit/export/scene.rs"]
mod tests;
