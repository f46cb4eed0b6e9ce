pub mod background;
pub mod export;
pub mod frame;
pub mod overlay;
pub mod perspective;

pub use background::{BackgroundConfig, BackgroundKind};
pub use export::{Blob, ExportArtifact, ExportFormat, ExportOptions};
pub use frame::{
    FrameConfig, FrameKind, FrameTheme, PatternConfig, PatternKind, ScreenshotConfig,
    ShadowConfig, ShadowSide, TextureConfig,
};
pub use overlay::{ImageOverlay, OverlayPosition, TextOrientation, TextOverlay, TextShadowConfig};
pub use perspective::Perspective3DConfig;

pub(crate) fn default_one() -> f64 {
    1.0
}

pub(crate) fn default_true() -> bool {
    true
}

/// Reject non-finite values and values outside `[lo, hi]`.
pub(crate) fn check_range(
    name: &str,
    v: f64,
    lo: f64,
    hi: f64,
) -> crate::foundation::error::BackdropResult<()> {
    if !v.is_finite() || v < lo || v > hi {
        return Err(crate::foundation::error::BackdropError::validation(format!(
            "{name} must be within [{lo}, {hi}], got {v}"
        )));
    }
    Ok(())
}
