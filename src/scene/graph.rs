use std::sync::Arc;

use crate::assets::fonts::FontBook;
use crate::foundation::core::{Affine, BezPath, Rgba8};
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::raster::layer::RasterLayer;

/// Shape fill.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Fill {
    #[default]
    None,
    Color(Rgba8),
    /// Raster repeated from the shape origin.
    Pattern(Arc<RasterLayer>),
}

impl Fill {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Centered stroke.
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    pub color: Rgba8,
    pub width: f64,
    /// Dash pattern in shape units.
    pub dash: Option<Vec<f64>>,
    /// Round caps and joins.
    pub round: bool,
}

impl Stroke {
    pub fn solid(color: Rgba8, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
            round: false,
        }
    }
}

/// Canvas-style drop shadow: a blurred, tinted silhouette drawn under the node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    pub color: Rgba8,
    /// Canvas `shadowBlur`; the gaussian sigma is half of it.
    pub blur: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub opacity: f64,
}

/// How a node's pixels combine with what is already drawn in its parent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Composite {
    #[default]
    SourceOver,
    /// Punch a hole.
    DestinationOut,
    /// Paint only over existing coverage.
    SourceAtop,
}

/// Horizontal text alignment inside a text box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

/// Drawable payload of a [`Node`].
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Group(Vec<Node>),
    Rect {
        width: f64,
        height: f64,
        /// `[top_left, top_right, bottom_right, bottom_left]`.
        radii: [f64; 4],
        fill: Fill,
        stroke: Option<Stroke>,
    },
    /// Centered on the node position.
    Circle { radius: f64, fill: Fill },
    Image {
        layer: Arc<RasterLayer>,
        width: f64,
        height: f64,
        radii: [f64; 4],
    },
    Text {
        text: String,
        font_size: f64,
        color: Rgba8,
        /// Box used for alignment; text is vertically centered in it.
        width: f64,
        height: f64,
        align: TextAlign,
    },
    Path { path: BezPath, stroke: Stroke },
}

/// One retained drawable with its placement.
///
/// The local transform is `translate(x, y) * rotate(rotation) * translate(-offset)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    /// Degrees, clockwise.
    pub rotation: f64,
    pub opacity: f64,
    pub shadow: Option<Shadow>,
    pub composite: Composite,
    pub kind: NodeKind,
}

impl Node {
    fn with_kind(kind: NodeKind) -> Self {
        Self {
            name: String::new(),
            x: 0.0,
            y: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            rotation: 0.0,
            opacity: 1.0,
            shadow: None,
            composite: Composite::SourceOver,
            kind,
        }
    }

    pub fn group(children: Vec<Node>) -> Self {
        Self::with_kind(NodeKind::Group(children))
    }

    pub fn rect(width: f64, height: f64, fill: Fill) -> Self {
        Self::with_kind(NodeKind::Rect {
            width,
            height,
            radii: [0.0; 4],
            fill,
            stroke: None,
        })
    }

    pub fn circle(radius: f64, fill: Fill) -> Self {
        Self::with_kind(NodeKind::Circle { radius, fill })
    }

    pub fn image(layer: Arc<RasterLayer>, width: f64, height: f64) -> Self {
        Self::with_kind(NodeKind::Image {
            layer,
            width,
            height,
            radii: [0.0; 4],
        })
    }

    pub fn text(text: impl Into<String>, font_size: f64, color: Rgba8, width: f64, height: f64) -> Self {
        Self::with_kind(NodeKind::Text {
            text: text.into(),
            font_size,
            color,
            width,
            height,
            align: TextAlign::Left,
        })
    }

    pub fn path(path: BezPath, stroke: Stroke) -> Self {
        Self::with_kind(NodeKind::Path { path, stroke })
    }

    /// Path node from SVG path data.
    pub fn svg_path(data: &str, stroke: Stroke) -> BackdropResult<Self> {
        let path = BezPath::from_svg(data)
            .map_err(|e| BackdropError::validation(format!("invalid path data '{data}': {e}")))?;
        Ok(Self::path(path, stroke))
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.offset_x = x;
        self.offset_y = y;
        self
    }

    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_shadow(mut self, shadow: Option<Shadow>) -> Self {
        self.shadow = shadow;
        self
    }

    pub fn with_composite(mut self, composite: Composite) -> Self {
        self.composite = composite;
        self
    }

    /// Corner radii for rects and images; ignored by other kinds.
    pub fn with_radii(mut self, r: [f64; 4]) -> Self {
        match &mut self.kind {
            NodeKind::Rect { radii, .. } | NodeKind::Image { radii, .. } => *radii = r,
            _ => {}
        }
        self
    }

    pub fn with_radius(self, r: f64) -> Self {
        self.with_radii([r; 4])
    }

    /// Stroke for rects; ignored by other kinds.
    pub fn with_stroke(mut self, s: Stroke) -> Self {
        if let NodeKind::Rect { stroke, .. } = &mut self.kind {
            *stroke = Some(s);
        }
        self
    }

    pub fn with_align(mut self, a: TextAlign) -> Self {
        if let NodeKind::Text { align, .. } = &mut self.kind {
            *align = a;
        }
        self
    }

    pub fn local_transform(&self) -> Affine {
        Affine::translate((self.x, self.y))
            * Affine::rotate(self.rotation.to_radians())
            * Affine::translate((-self.offset_x, -self.offset_y))
    }

    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Group(c) => c,
            _ => &[],
        }
    }
}

/// A named, independently hideable list of nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub name: String,
    pub visible: bool,
    pub nodes: Vec<Node>,
}

impl Layer {
    pub fn new(name: impl Into<String>, nodes: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            nodes,
        }
    }

    fn single_rect(&self) -> Option<(&Node, f64, f64, &Fill, bool)> {
        match self.nodes.as_slice() {
            [
                node @ Node {
                    kind:
                        NodeKind::Rect {
                            width,
                            height,
                            fill,
                            stroke,
                            ..
                        },
                    ..
                },
            ] => Some((node, *width, *height, fill, stroke.is_some())),
            _ => None,
        }
    }

    /// Exactly one shape, filled with a pattern and nothing else: a pattern or texture layer.
    pub fn is_decorative(&self) -> bool {
        self.single_rect()
            .is_some_and(|(_, _, _, fill, stroked)| matches!(fill, Fill::Pattern(_)) && !stroked)
    }

    /// Exactly one color-filled rect covering a `width x height` stage.
    pub fn is_background_fill(&self, width: f64, height: f64) -> bool {
        self.single_rect().is_some_and(|(node, w, h, fill, stroked)| {
            matches!(fill, Fill::Color(_))
                && !stroked
                && node.rotation == 0.0
                && node.x - node.offset_x <= 0.0
                && node.y - node.offset_y <= 0.0
                && node.x - node.offset_x + w >= width
                && node.y - node.offset_y + h >= height
        })
    }
}

/// The retained surface the scene exporter snapshots.
pub trait SceneHandle {
    /// Logical stage size.
    fn size(&self) -> (f64, f64);

    fn layer_count(&self) -> usize;

    fn layer(&self, index: usize) -> Option<&Layer>;

    fn is_layer_visible(&self, index: usize) -> bool;

    fn set_layer_visible(&mut self, index: usize, visible: bool);

    /// Render visible layers at `pixel_ratio` device px per stage unit.
    fn to_raster(&self, pixel_ratio: f64) -> BackdropResult<RasterLayer>;

    /// Repaint after visibility changes.
    fn redraw(&mut self);
}

/// Stage of layers drawn bottom to top.
#[derive(Clone, Debug)]
pub struct Stage {
    pub width: f64,
    pub height: f64,
    pub layers: Vec<Layer>,
    /// Fonts for text nodes.
    pub fonts: FontBook,
    redraws: u64,
}

impl Stage {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            layers: Vec::new(),
            fonts: FontBook::new(),
            redraws: 0,
        }
    }

    pub fn push_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn layer_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Number of [`SceneHandle::redraw`] calls so far.
    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }
}

impl SceneHandle for Stage {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn layer_count(&self) -> usize {
        self.layers.len()
    }

    fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    fn is_layer_visible(&self, index: usize) -> bool {
        self.layers.get(index).is_some_and(|l| l.visible)
    }

    fn set_layer_visible(&mut self, index: usize, visible: bool) {
        if let Some(l) = self.layers.get_mut(index) {
            l.visible = visible;
        }
    }

    fn to_raster(&self, pixel_ratio: f64) -> BackdropResult<RasterLayer> {
        crate::scene::render::render_stage(self, pixel_ratio)
    }

    fn redraw(&mut self) {
        self.redraws += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/graph.rs"]
mod tests;
