//! Editor boundary: the JSON job describing an editor session and the live canvas built from it.

pub mod job;
pub mod live;

pub use job::ExportJob;
pub use live::{LiveCanvas, perspective_transform};
