use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{BackdropError, BackdropResult};

/// RGBA8 brush color carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// One font file registered under a family name.
#[derive(Clone)]
pub struct FontFace {
    /// Lowercased family name used for lookup.
    pub family: String,
    bytes: Arc<Vec<u8>>,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.family)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl FontFace {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn cpu_font(&self) -> vello_cpu::peniko::FontData {
        vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(self.bytes.as_ref().clone()),
            0,
        )
    }
}

/// Fonts available to text capture; the stand-in for the document's loaded font set.
///
/// An empty book is valid: text is then skipped with a warning.
#[derive(Clone, Debug, Default)]
pub struct FontBook {
    faces: Vec<FontFace>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` under `family`.
    pub fn add(&mut self, family: impl Into<String>, bytes: Vec<u8>) {
        self.faces.push(FontFace {
            family: family.into().trim().to_ascii_lowercase(),
            bytes: Arc::new(bytes),
        });
    }

    /// Load every `.ttf`/`.otf` file in `dir`; the file stem is the family name.
    pub fn from_dir(dir: &Path) -> BackdropResult<Self> {
        let mut book = Self::new();
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("read font dir '{}'", dir.display()))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.context("read font dir entry")?.path();
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase);
            if matches!(ext.as_deref(), Some("ttf" | "otf")) {
                paths.push(path);
            }
        }
        paths.sort();
        for path in paths {
            let bytes =
                std::fs::read(&path).with_context(|| format!("read font '{}'", path.display()))?;
            let family = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            tracing::debug!(%family, bytes = bytes.len(), "font registered");
            book.add(family, bytes);
        }
        Ok(book)
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Face for a CSS `font-family` list: first listed family that is registered, else the
    /// first registered face.
    pub fn resolve(&self, font_family: Option<&str>) -> Option<&FontFace> {
        if let Some(list) = font_family {
            for name in list.split(',') {
                let name = name.trim().trim_matches(['"', '\'']).to_ascii_lowercase();
                if let Some(face) = self.faces.iter().find(|f| f.family == name) {
                    return Some(face);
                }
            }
        }
        self.faces.first()
    }
}

/// CSS `font-weight` as a Parley weight; unknown values fall back to normal.
pub(crate) fn css_font_weight(value: Option<&str>) -> parley::style::FontWeight {
    use parley::style::FontWeight;
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return FontWeight::NORMAL;
    };
    let weight = match value.to_ascii_lowercase().as_str() {
        "bolder" => Some(FontWeight::BOLD),
        "lighter" => Some(FontWeight::LIGHT),
        v => FontWeight::parse(v).filter(|w| (1.0..=1000.0).contains(&w.value())),
    };
    weight.unwrap_or_else(|| {
        tracing::warn!(value, "unsupported font weight; using normal");
        FontWeight::NORMAL
    })
}

/// Reusable Parley contexts.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    /// Book family -> family name Parley registered for it.
    families: HashMap<String, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    /// Parley family name for `face`, registering its bytes on first use.
    fn family_name(&mut self, face: &FontFace) -> BackdropResult<String> {
        if let Some(name) = self.families.get(&face.family) {
            return Ok(name.clone());
        }
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(face.bytes().to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            BackdropError::asset(format!("font '{}' registered no families", face.family))
        })?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| BackdropError::asset("registered font family has no name"))?
            .to_string();
        tracing::debug!(family = %face.family, registered = %name, "font face registered");
        self.families.insert(face.family.clone(), name.clone());
        Ok(name)
    }

    /// Shape `text` on a single line (or wrapped at `max_width_px`).
    pub(crate) fn layout_plain(
        &mut self,
        text: &str,
        face: &FontFace,
        size_px: f32,
        weight: parley::style::FontWeight,
        brush: TextBrushRgba8,
        max_width_px: Option<f32>,
    ) -> BackdropResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(BackdropError::validation(
                "font size must be finite and > 0",
            ));
        }
        let family_name = self.family_name(face)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(weight));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(max_width_px);
        layout.align(
            max_width_px,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
