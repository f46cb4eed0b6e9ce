use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::loader::ImageLoader;
use crate::foundation::error::BackdropResult;
use crate::raster::layer::RasterLayer;

/// A decoded image as the document sees it.
#[derive(Clone, Debug)]
pub struct StoredImage {
    pub layer: Arc<RasterLayer>,
    /// Readable without `useCORS`/`allowTaint`.
    pub same_origin: bool,
}

/// Decoded images keyed by `src`; the document's image cache.
#[derive(Clone, Debug, Default)]
pub struct ImageStore {
    entries: HashMap<String, StoredImage>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an already-decoded image.
    pub fn insert(&mut self, src: impl Into<String>, layer: RasterLayer, same_origin: bool) {
        self.entries.insert(
            src.into(),
            StoredImage {
                layer: Arc::new(layer),
                same_origin,
            },
        );
    }

    pub fn get(&self, src: &str) -> Option<&StoredImage> {
        self.entries.get(src)
    }

    pub fn contains(&self, src: &str) -> bool {
        self.entries.contains_key(src)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve `src` through `loader` unless cached; the image "load event".
    pub fn ensure(&mut self, src: &str, loader: &dyn ImageLoader) -> BackdropResult<&StoredImage> {
        if !self.entries.contains_key(src) {
            let loaded = loader.load(src)?;
            tracing::debug!(
                src = %short(src),
                w = loaded.layer.width(),
                h = loaded.layer.height(),
                "image loaded"
            );
            self.insert(src, loaded.layer, loaded.same_origin);
        }
        self.entries
            .get(src)
            .ok_or_else(|| crate::foundation::error::BackdropError::asset("image store lost entry"))
    }
}

/// Data URLs make unreadable log fields.
pub(crate) fn short(src: &str) -> &str {
    match src.char_indices().nth(64) {
        Some((i, _)) => &src[..i],
        None => src,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/images.rs"]
mod tests;
