//! Overlay placement shared by both overlay strategies.
//!
//! Text overlays are positioned in percent of the export canvas and centered on that point.
//! Image overlays carry live-preview px and are scaled by the export/live ratio.

use crate::assets::loader::ImageLoader;
use crate::document::images::short;
use crate::document::{Document, Element, Length, ObjectFit, Style, TextShadow, TransformOp};
use crate::export::BACKGROUND_ID;
use crate::foundation::core::Rect;
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::model::{ImageOverlay, TextOrientation, TextOverlay};

const TEXT_Z: i32 = 1000;
const IMAGE_Z: i32 = 1001;

/// Text and image overlays, in insertion order.
#[derive(Clone, Copy, Debug, Default)]
pub struct OverlaySet<'a> {
    pub text: &'a [TextOverlay],
    pub images: &'a [ImageOverlay],
}

impl<'a> OverlaySet<'a> {
    pub fn new(text: &'a [TextOverlay], images: &'a [ImageOverlay]) -> Self {
        Self { text, images }
    }

    pub fn any_visible(&self) -> bool {
        self.text.iter().any(|o| o.is_visible) || self.images.iter().any(|o| o.is_visible)
    }
}

/// Export canvas size and the export/live ratio per axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayPlacement {
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl OverlayPlacement {
    /// Ratio against the live card (the parent of the background element).
    pub fn from_live(doc: &Document, width: f64, height: f64) -> BackdropResult<Self> {
        let card = live_card_box(doc)?;
        let (scale_x, scale_y) = if card.width() > 0.0 && card.height() > 0.0 {
            (width / card.width(), height / card.height())
        } else {
            (1.0, 1.0)
        };
        Ok(Self {
            width,
            height,
            scale_x,
            scale_y,
        })
    }

    pub fn text_element(&self, index: usize, overlay: &TextOverlay) -> Element {
        let (sx, sy) = (self.scale_x, self.scale_y);
        let text_shadow = overlay
            .text_shadow
            .as_ref()
            .filter(|s| s.enabled)
            .map(|s| TextShadow {
                offset_x: s.offset_x * sx,
                offset_y: s.offset_y * sy,
                blur: s.blur * sx,
                color: s.color.clone(),
            })
            .into_iter()
            .collect();
        let mut transform = vec![TransformOp::Translate(
            Length::Percent(-50.0),
            Length::Percent(-50.0),
        )];
        if overlay.rotation != 0.0 {
            transform.push(TransformOp::Rotate(overlay.rotation));
        }
        let style = Style {
            left: Length::Px(overlay.position.x / 100.0 * self.width),
            top: Length::Px(overlay.position.y / 100.0 * self.height),
            transform,
            font_size: overlay.font_size * sx,
            font_weight: Some(overlay.font_weight.clone()),
            font_family: (!overlay.font_family.is_empty()).then(|| overlay.font_family.clone()),
            color: Some(overlay.color.clone()),
            opacity: overlay.opacity,
            white_space_nowrap: true,
            vertical_writing: overlay.orientation == TextOrientation::Vertical,
            text_shadow,
            z_index: TEXT_Z,
            ..Style::default()
        };
        Element::new(overlay_id("export-text", index, &overlay.id))
            .with_style(style)
            .with_text(overlay.text.clone())
    }

    pub fn image_element(&self, index: usize, overlay: &ImageOverlay) -> Element {
        let (sx, sy) = (self.scale_x, self.scale_y);
        let flip = |f: bool| if f { -1.0 } else { 1.0 };
        let style = Style {
            left: Length::Px(overlay.position.x * sx),
            top: Length::Px(overlay.position.y * sy),
            width: Some(Length::Px(overlay.size * sx)),
            height: Some(Length::Px(overlay.size * sy)),
            opacity: overlay.opacity,
            transform: vec![
                TransformOp::Rotate(overlay.rotation),
                TransformOp::Scale(flip(overlay.flip_x), flip(overlay.flip_y)),
            ],
            overflow_hidden: true,
            z_index: IMAGE_Z,
            ..Style::default()
        };
        let img = Element::new("")
            .with_style(Style {
                width: Some(Length::FULL),
                height: Some(Length::FULL),
                object_fit: ObjectFit::Contain,
                ..Style::default()
            })
            .with_image(overlay.src.clone());
        Element::new(overlay_id("export-image", index, &overlay.id))
            .with_style(style)
            .with_child(img)
    }

    /// Elements for every visible overlay, texts first.
    ///
    /// Image overlays are loaded into the document store; an overlay whose image fails to load
    /// is logged and left out.
    pub fn build_elements(
        &self,
        doc: &mut Document,
        loader: &dyn ImageLoader,
        overlays: OverlaySet<'_>,
    ) -> Vec<Element> {
        let mut out = Vec::new();
        for (i, o) in overlays.text.iter().enumerate() {
            if o.is_visible {
                out.push(self.text_element(i, o));
            }
        }
        for (i, o) in overlays.images.iter().enumerate() {
            if !o.is_visible {
                tracing::debug!(id = %o.id, "invisible image overlay skipped");
                continue;
            }
            match doc.images.ensure(&o.src, loader) {
                Ok(_) => out.push(self.image_element(i, o)),
                Err(err) => {
                    tracing::warn!(id = %o.id, src = %short(&o.src), %err, "overlay image failed to load; skipped")
                }
            }
        }
        tracing::debug!(elements = out.len(), "overlay elements placed");
        out
    }
}

fn overlay_id(prefix: &str, index: usize, id: &str) -> String {
    if id.is_empty() {
        format!("{prefix}-{index}")
    } else {
        format!("{prefix}-{id}")
    }
}

/// Box of the live card hosting the background.
pub(crate) fn live_card_box(doc: &Document) -> BackdropResult<Rect> {
    let card = doc
        .parent_of(BACKGROUND_ID)
        .ok_or_else(|| BackdropError::precondition("canvas container not found"))?;
    doc.box_of(&card.id)
        .ok_or_else(|| BackdropError::precondition("canvas container has no box"))
}

#[cfg(test)]
#[path = "../../tests/unit/export/placement.rs"]
mod tests;
