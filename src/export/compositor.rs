//! Canvas compositor: stacks the exported layers into the final buffer.

use crate::foundation::error::BackdropResult;
use crate::raster::layer::{RasterLayer, ResampleFilter};

/// Target of [`composite`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompositeOptions {
    pub width: u32,
    pub height: u32,
    pub scale: f64,
}

impl CompositeOptions {
    /// `width*scale x height*scale`, rounded.
    pub fn pixel_size(&self) -> (u32, u32) {
        let px = |v: u32| (f64::from(v) * self.scale).round().max(1.0) as u32;
        (px(self.width), px(self.height))
    }
}

/// Source-over `background`, then `scene`, then `overlays` onto a transparent buffer.
///
/// Layers of a different size are stretched to the target with the high-quality filter first.
pub fn composite(
    background: &RasterLayer,
    scene: &RasterLayer,
    overlays: Option<&RasterLayer>,
    opts: &CompositeOptions,
) -> BackdropResult<RasterLayer> {
    let (w, h) = opts.pixel_size();
    let mut out = RasterLayer::new_transparent(w, h)?;
    for layer in [Some(background), Some(scene), overlays].into_iter().flatten() {
        if layer.width() == w && layer.height() == h {
            out.draw_over(layer, 0, 0, 1.0);
        } else {
            tracing::debug!(
                from_w = layer.width(),
                from_h = layer.height(),
                w,
                h,
                "resampling layer for composite"
            );
            out.draw_over(&layer.resampled(w, h, ResampleFilter::HighQuality)?, 0, 0, 1.0);
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/export/compositor.rs"]
mod tests;
