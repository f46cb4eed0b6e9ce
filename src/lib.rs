//! Backdrop composes a screenshot over configurable backgrounds, frames, patterns and overlays,
//! and exports the result as one flattened PNG.
//!
//! The export pipeline reconciles three capture strategies into a single raster:
//!
//! - a flat capture of the scene description (background, text and image overlays)
//! - a snapshot of the retained 2D stage (main image and frame)
//! - a perspective-correct capture of the 3D-transformed image
//!
//! Entry points: build a [`LiveCanvas`] from an [`ExportJob`], then run an [`Exporter`].
#![forbid(unsafe_code)]

pub mod assets;
pub mod color;
pub mod document;
pub mod editor;
pub mod effects;
pub mod export;
pub(crate) mod foundation;
pub mod layout;
pub mod model;
pub mod raster;
pub mod scene;

pub use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgba8, Size, Vec2};
pub use crate::foundation::error::{BackdropError, BackdropResult};

pub use crate::assets::{FontBook, FsImageLoader, ImageLoader, LoadedImage};
pub use crate::document::{Document, Element};
pub use crate::editor::{ExportJob, LiveCanvas};
pub use crate::export::{
    ExportInputs, ExportPhase, ExportSettings, Exporter, NoSettle, OverlayStrategy, Settle,
    ThreadSettle,
};
pub use crate::layout::dimensions::{CanvasDimensions, DimensionInputs, resolve_dimensions};
pub use crate::model::{ExportArtifact, ExportOptions, Perspective3DConfig};
pub use crate::raster::layer::RasterLayer;
pub use crate::scene::{SceneHandle, Stage};
