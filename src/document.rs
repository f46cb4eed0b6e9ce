//! Explicit scene description standing in for the live DOM.
//!
//! Exporters never hold references into the editor UI. They receive a [`Document`] and look up
//! the fixed anchors (`image-render-card`, `canvas-background`, ...) by id or attribute,
//! failing with a descriptive error when an anchor is absent.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::assets::fonts::FontBook;
use crate::foundation::core::{Rect, Vec2};

pub mod capture;
pub mod capture3d;
pub mod images;
pub mod style;

pub use capture::{CaptureOptions, capture};
pub use capture3d::{Capture3D, capture_3d};
pub use images::{ImageStore, StoredImage};
pub use style::{BackgroundSize, Length, ObjectFit, Style, TextShadow, TransformOp};

/// Attribute marking containers mounted by [`Document::mount_offscreen`].
pub const OFFSCREEN_ATTR: &str = "data-offscreen";

/// Id of the document root.
pub const BODY_ID: &str = "body";

/// Replaced or text content of an element.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Content {
    #[default]
    None,
    Text(String),
    Image(ImageRef),
}

/// `<img>` source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRef {
    pub src: String,
    /// `crossOrigin="anonymous"`.
    pub cors: bool,
}

/// One node of the scene description.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub id: String,
    pub attrs: BTreeMap<String, String>,
    pub style: Style,
    pub content: Content,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.content = Content::Text(text.into());
        self
    }

    pub fn with_image(mut self, src: impl Into<String>) -> Self {
        self.content = Content::Image(ImageRef {
            src: src.into(),
            cors: true,
        });
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Self or first descendant (pre-order) with `id`.
    pub fn find(&self, id: &str) -> Option<&Element> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// Self or first descendant whose attribute `name` equals `value`.
    pub fn find_by_attr(&self, name: &str, value: &str) -> Option<&Element> {
        if self.attr(name) == Some(value) {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|c| c.find_by_attr(name, value))
    }

    fn parent_of(&self, id: &str) -> Option<&Element> {
        if self.children.iter().any(|c| c.id == id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.parent_of(id))
    }

    /// First image source in the subtree.
    pub fn first_image(&self) -> Option<&ImageRef> {
        if let Content::Image(img) = &self.content {
            return Some(img);
        }
        self.children.iter().find_map(Element::first_image)
    }
}

/// Box of an element relative to its parent's origin, ignoring transforms.
pub(crate) fn element_rect(style: &Style, parent_w: f64, parent_h: f64) -> Rect {
    let x = style.left.resolve(parent_w);
    let y = style.top.resolve(parent_h);
    let w = style.width.map_or(parent_w, |l| l.resolve(parent_w)).max(0.0);
    let h = style.height.map_or(parent_h, |l| l.resolve(parent_h)).max(0.0);
    Rect::new(x, y, x + w, y + h)
}

/// Per-id overrides contributed by a stylesheet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleRule {
    /// Target element id.
    pub id: String,
    pub opacity: Option<f64>,
    pub background_color: Option<String>,
    pub visible: Option<bool>,
}

/// A linked stylesheet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stylesheet {
    pub href: String,
    pub disabled: bool,
    pub rules: Vec<StyleRule>,
}

/// The scene description: element tree, stylesheets, decoded images and fonts.
#[derive(Clone, Debug)]
pub struct Document {
    body: Element,
    pub stylesheets: Vec<Stylesheet>,
    pub images: ImageStore,
    pub fonts: FontBook,
    mounts: u64,
}

impl Document {
    /// Empty document whose body is a `viewport_w x viewport_h` box.
    pub fn new(viewport_w: f64, viewport_h: f64) -> Self {
        Self {
            body: Element::new(BODY_ID).with_style(Style::boxed(0.0, 0.0, viewport_w, viewport_h)),
            stylesheets: Vec::new(),
            images: ImageStore::new(),
            fonts: FontBook::new(),
            mounts: 0,
        }
    }

    pub fn body(&self) -> &Element {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Element {
        &mut self.body
    }

    /// Append `el` as the last child of the body.
    pub fn append(&mut self, el: Element) {
        self.body.children.push(el);
    }

    pub fn element_by_id(&self, id: &str) -> Option<&Element> {
        self.body.find(id)
    }

    pub fn element_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.body.find_mut(id)
    }

    /// First element in the document with `name="value"`.
    pub fn element_by_attr(&self, name: &str, value: &str) -> Option<&Element> {
        self.body.find_by_attr(name, value)
    }

    /// First descendant of `root_id` with `name="value"`.
    pub fn find_within(&self, root_id: &str, name: &str, value: &str) -> Option<&Element> {
        let root = self.element_by_id(root_id)?;
        root.children
            .iter()
            .find_map(|c| c.find_by_attr(name, value))
    }

    pub fn parent_of(&self, id: &str) -> Option<&Element> {
        self.body.parent_of(id)
    }

    /// Untransformed box of `id` in document coordinates (`getBoundingClientRect` without
    /// transforms).
    pub fn box_of(&self, id: &str) -> Option<Rect> {
        fn walk(el: &Element, origin: (f64, f64), parent: (f64, f64), id: &str) -> Option<Rect> {
            let r = element_rect(&el.style, parent.0, parent.1) + Vec2::new(origin.0, origin.1);
            if el.id == id {
                return Some(r);
            }
            el.children
                .iter()
                .find_map(|c| walk(c, (r.x0, r.y0), (r.width(), r.height()), id))
        }
        let body = element_rect(&self.body.style, 0.0, 0.0);
        walk(&self.body, (0.0, 0.0), (body.width(), body.height()), id)
    }

    /// `el.style` with enabled stylesheet rules applied; sheets whose href contains any of
    /// `suppressed` are skipped.
    pub fn effective_style<'a>(&self, el: &'a Element, suppressed: &[String]) -> Cow<'a, Style> {
        let mut style = Cow::Borrowed(&el.style);
        if el.id.is_empty() {
            return style;
        }
        for sheet in &self.stylesheets {
            if sheet.disabled || suppressed.iter().any(|s| sheet.href.contains(s.as_str())) {
                continue;
            }
            for rule in sheet.rules.iter().filter(|r| r.id == el.id) {
                let s = style.to_mut();
                if let Some(o) = rule.opacity {
                    s.opacity = o;
                }
                if let Some(bg) = &rule.background_color {
                    s.background_color = Some(bg.clone());
                }
                if let Some(v) = rule.visible {
                    s.visible = v;
                }
            }
        }
        style
    }

    /// Attach `el` to the body far outside the viewport.
    ///
    /// The container is detached again when the returned guard drops, on success and on error
    /// alike.
    pub fn mount_offscreen(&mut self, mut el: Element) -> OffscreenMount<'_> {
        self.mounts += 1;
        if el.id.is_empty() {
            el.id = format!("offscreen-{}", self.mounts);
        }
        el.attrs.insert(OFFSCREEN_ATTR.to_string(), "true".to_string());
        el.style.left = Length::Px(-99_999.0);
        el.style.top = Length::Px(0.0);
        let id = el.id.clone();
        tracing::debug!(%id, "offscreen container mounted");
        self.body.children.push(el);
        OffscreenMount { doc: self, id }
    }

    /// Offscreen containers currently attached.
    pub fn offscreen_count(&self) -> usize {
        self.body
            .children
            .iter()
            .filter(|c| c.attr(OFFSCREEN_ATTR).is_some())
            .count()
    }
}

/// Scoped ownership of an offscreen container.
pub struct OffscreenMount<'a> {
    doc: &'a mut Document,
    id: String,
}

impl OffscreenMount<'_> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn document(&self) -> &Document {
        self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        self.doc
    }

    pub fn element_mut(&mut self) -> Option<&mut Element> {
        let id = self.id.clone();
        self.doc.body.children.iter_mut().find(|c| c.id == id)
    }
}

impl Drop for OffscreenMount<'_> {
    fn drop(&mut self) {
        let id = &self.id;
        self.doc.body.children.retain(|c| &c.id != id);
        tracing::debug!(%id, "offscreen container removed");
    }
}

#[cfg(test)]
#[path = "../tests/unit/document/document.rs"]
mod tests;
