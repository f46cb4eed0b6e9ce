pub mod composite;
pub mod layer;
pub(crate) mod painter;
