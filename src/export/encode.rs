//! Final encoding of the composited buffer.

use std::io::Cursor;

use anyhow::Context;
use base64::Engine as _;

use crate::foundation::error::{BackdropError, BackdropResult};
use crate::model::{Blob, ExportArtifact, ExportFormat, ExportOptions};
use crate::raster::layer::RasterLayer;

/// What an encoder hands back when it had nothing to encode.
const PLACEHOLDER_DATA_URL: &str = "data:,";

/// Encode `layer` as `opts.format`, both as a blob and a data URL.
///
/// `opts.quality` is carried for lossy formats; PNG ignores it.
#[tracing::instrument(skip_all, fields(w = layer.width(), h = layer.height()))]
pub fn encode_png(layer: &RasterLayer, opts: &ExportOptions) -> BackdropResult<ExportArtifact> {
    let (width, height) = (layer.width(), layer.height());
    let bytes = match opts.format {
        ExportFormat::Png => {
            let img = image::RgbaImage::from_raw(width, height, layer.to_straight_rgba8())
                .ok_or_else(|| BackdropError::encode("raster bytes do not match dimensions"))?;
            let mut out = Cursor::new(Vec::new());
            img.write_to(&mut out, image::ImageFormat::Png)
                .context("encode png")?;
            out.into_inner()
        }
    };
    if bytes.is_empty() {
        return Err(BackdropError::encode("encoder produced no bytes"));
    }
    let mime = opts.format.mime();
    let data_url = format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&bytes)
    );
    check_data_url(&data_url)?;
    tracing::debug!(bytes = bytes.len(), quality = opts.quality, "encoded");
    Ok(ExportArtifact {
        data_url,
        blob: Blob {
            mime: mime.to_string(),
            bytes,
        },
        width,
        height,
    })
}

/// Reject empty and placeholder data URLs.
pub fn check_data_url(url: &str) -> BackdropResult<()> {
    let url = url.trim();
    if url.is_empty() || url == PLACEHOLDER_DATA_URL {
        return Err(BackdropError::encode(format!(
            "failed to generate image data: '{url}'"
        )));
    }
    match url.split_once(',') {
        Some((_, payload)) if !payload.is_empty() => Ok(()),
        _ => Err(BackdropError::encode("data url has no payload")),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/encode.rs"]
mod tests;
