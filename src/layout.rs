pub mod dimensions;
pub mod frame;
