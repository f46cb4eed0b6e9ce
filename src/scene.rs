//! Retained 2D scene graph: the main image, its frame and the decorative layers.

pub mod builder;
pub mod graph;
pub mod pattern;
pub mod render;

pub use builder::{IMAGE_LAYER, PATTERN_LAYER, StageSpec, TEXTURE_LAYER, build_stage};
pub use graph::{Composite, Fill, Layer, Node, NodeKind, SceneHandle, Shadow, Stage, Stroke, TextAlign};
pub use render::render_stage;
