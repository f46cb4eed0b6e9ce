use crate::assets::decode::decode_data_url;
use crate::color::gradient::{BackgroundImage, parse_background_image};
use crate::document::Element;
use crate::foundation::error::BackdropResult;
use crate::foundation::math::{hash_xy, unit};
use crate::raster::composite::{blend_px, overlay_channel};
use crate::raster::layer::RasterLayer;

/// Edge length of the procedural fallback texture.
pub const FALLBACK_NOISE_SIZE: u32 = 200;

const FALLBACK_SEED: u64 = 0x6e6f_6973_655f_7478;

/// Where a noise texture came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoiseSource {
    /// Decoded from the live preview's noise element.
    Preview,
    /// Generated procedurally.
    Procedural,
}

/// Tileable grain texture.
#[derive(Clone, Debug)]
pub struct NoiseTexture {
    /// Texture pixels.
    pub layer: RasterLayer,
    /// Provenance, for logs and tests.
    pub source: NoiseSource,
}

impl NoiseTexture {
    /// Deterministic opaque grayscale grain of `width x height`.
    pub fn procedural(width: u32, height: u32) -> BackdropResult<Self> {
        let mut layer = RasterLayer::new_transparent(width, height)?;
        let w = width as usize;
        for (i, px) in layer.data_mut().chunks_exact_mut(4).enumerate() {
            let (x, y) = ((i % w) as u32, (i / w) as u32);
            let h = hash_xy(FALLBACK_SEED, x, y);
            // Sum of two uniforms: triangular distribution around mid-gray.
            let v = ((h & 0xff) + ((h >> 8) & 0xff)) / 2;
            let v = v as u8;
            px.copy_from_slice(&[v, v, v, 255]);
        }
        Ok(Self {
            layer,
            source: NoiseSource::Procedural,
        })
    }

    /// Texture for the export: the preview's own grain if `element` carries a decodable
    /// `url(data:...)` background image, otherwise the procedural fallback.
    pub fn from_preview_or_fallback(element: Option<&Element>) -> BackdropResult<Self> {
        if let Some(el) = element {
            match extract_preview_texture(el) {
                Some(layer) => {
                    return Ok(Self {
                        layer,
                        source: NoiseSource::Preview,
                    });
                }
                None => tracing::debug!(id = %el.id, "noise element has no usable texture"),
            }
        }
        Self::procedural(FALLBACK_NOISE_SIZE, FALLBACK_NOISE_SIZE)
    }
}

fn extract_preview_texture(el: &Element) -> Option<RasterLayer> {
    let value = el.style.background_image.as_deref()?;
    parse_background_image(value)
        .into_iter()
        .find_map(|layer| match layer {
            Ok(BackgroundImage::Url(url)) if url.starts_with("data:") => {
                match decode_data_url(&url) {
                    Ok(img) => Some(img),
                    Err(err) => {
                        tracing::warn!(%err, "failed to decode preview noise texture");
                        None
                    }
                }
            }
            _ => None,
        })
}

/// Overlay-blend `texture` across `layer` at `opacity = intensity`.
///
/// The texture is tiled from the origin with point sampling. `intensity` is clamped to
/// `[0, 1]`; `0` returns the input untouched.
pub fn apply_noise(
    mut layer: RasterLayer,
    intensity: f64,
    texture: &NoiseTexture,
) -> BackdropResult<RasterLayer> {
    let intensity = unit(intensity);
    if intensity <= 0.0 {
        return Ok(layer);
    }
    let opacity = intensity as f32;
    let tex = &texture.layer;
    let (tw, th) = (tex.width() as usize, tex.height() as usize);
    let w = layer.width() as usize;
    let tex_data = tex.data();
    for (i, d) in layer.data_mut().chunks_exact_mut(4).enumerate() {
        let (x, y) = (i % w, i / w);
        let ti = ((y % th) * tw + (x % tw)) * 4;
        blend_px(d, &tex_data[ti..ti + 4], opacity, &overlay_channel);
    }
    tracing::debug!(intensity, source = ?texture.source, "noise applied");
    Ok(layer)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/noise.rs"]
mod tests;
