use crate::model::frame::{FrameConfig, FrameKind};

/// Height of the window frame's title bar.
pub const WINDOW_HEADER_HEIGHT: f64 = 40.0;

/// Space a frame adds around the image, in live px.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct FrameInsets {
    /// Border thickness on every side (solid and ruler frames).
    pub frame_offset: f64,
    /// Window frame padding on every side.
    pub window_padding: f64,
    /// Window title bar height, added on top.
    pub window_header: f64,
    /// Total extra size of the eclipse frame (split across both sides).
    pub eclipse_border: f64,
}

impl FrameInsets {
    pub fn for_frame(frame: &FrameConfig) -> Self {
        let w = frame.width.max(0.0);
        match frame.effective_kind() {
            FrameKind::Solid => Self {
                frame_offset: w,
                ..Self::default()
            },
            FrameKind::Ruler => Self {
                frame_offset: w + 2.0,
                ..Self::default()
            },
            FrameKind::Eclipse => Self {
                eclipse_border: w + 2.0,
                ..Self::default()
            },
            FrameKind::Window => Self {
                window_padding: frame.padding.max(0.0),
                window_header: WINDOW_HEADER_HEIGHT,
                ..Self::default()
            },
            _ => Self::default(),
        }
    }

    /// Outer size of the framed image for an image of `(w, h)`.
    pub fn framed_size(&self, w: f64, h: f64) -> (f64, f64) {
        let horizontal = 2.0 * self.frame_offset + 2.0 * self.window_padding + self.eclipse_border;
        (
            w + horizontal,
            h + horizontal + self.window_header,
        )
    }

    /// Top-left of the image inside the framed box.
    pub fn image_origin(&self) -> (f64, f64) {
        let x = self.frame_offset + self.window_padding + self.eclipse_border / 2.0;
        let y = self.frame_offset + self.window_padding + self.window_header + self.eclipse_border / 2.0;
        (x, y)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/frame.rs"]
mod tests;
