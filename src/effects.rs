pub mod blur;
pub mod noise;
