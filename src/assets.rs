pub mod decode;
pub mod fonts;
pub mod loader;

pub use fonts::{FontBook, FontFace};
pub use loader::{FsImageLoader, ImageLoader, LoadedImage};
