pub mod gradient;
pub mod normalize;
pub mod parse;

pub use gradient::{BackgroundImage, ColorStop, Gradient, GradientShape, LinearDirection};
pub use normalize::{ColorEngine, CssColorEngine, normalize_value};
pub use parse::parse_css_color;
