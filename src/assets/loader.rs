use std::path::PathBuf;

use anyhow::Context;

use crate::assets::decode::{decode_any, decode_data_url};
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::raster::layer::RasterLayer;

/// A decoded image and whether it may be read back without tainting a capture.
#[derive(Clone, Debug)]
pub struct LoadedImage {
    pub layer: RasterLayer,
    pub same_origin: bool,
}

/// Resolves image references (`data:` URLs, asset paths) into pixels.
///
/// The one content-fetch collaborator of the pipeline. Implementations must either resolve or
/// fail; there is no pending state.
pub trait ImageLoader {
    fn load(&self, src: &str) -> BackdropResult<LoadedImage>;
}

/// Loader over `data:` URLs and paths relative to an asset root.
#[derive(Clone, Debug)]
pub struct FsImageLoader {
    root: PathBuf,
}

impl FsImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl ImageLoader for FsImageLoader {
    fn load(&self, src: &str) -> BackdropResult<LoadedImage> {
        let src = src.trim();
        if src.starts_with("data:") {
            return Ok(LoadedImage {
                layer: decode_data_url(src)?,
                same_origin: true,
            });
        }
        if src.starts_with("http://") || src.starts_with("https://") || src.starts_with("//") {
            return Err(BackdropError::asset(format!(
                "remote image '{src}' is not reachable from this loader"
            )));
        }
        let rel = normalize_rel_path(src)?;
        let path = self.root.join(&rel);
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read image '{}'", path.display()))?;
        let layer = decode_any(&bytes).map_err(|e| {
            BackdropError::asset(format!("decode image '{rel}': {e}"))
        })?;
        Ok(LoadedImage {
            layer,
            same_origin: true,
        })
    }
}

/// Normalize an asset-relative path.
///
/// The result uses `/` separators and has no `.` segments; absolute paths and parent traversals
/// (`..`) are rejected.
pub(crate) fn normalize_rel_path(source: &str) -> BackdropResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(BackdropError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(BackdropError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(BackdropError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(BackdropError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
