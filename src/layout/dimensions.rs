//! Canvas and image sizing shared by the live preview and every exporter.

/// Minimum edge length of the canvas, in CSS pixels.
pub const MIN_CANVAS_SIZE: f64 = 300.0;

/// How far past the viewport the canvas may extend before it is limited by it.
pub const VIEWPORT_SLACK: f64 = 1.1;

/// Raw inputs to [`resolve_dimensions`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DimensionInputs {
    /// Natural width of the uploaded image.
    pub image_width: f64,
    /// Natural height of the uploaded image.
    pub image_height: f64,
    /// Width of the aspect-ratio container.
    pub container_width: f64,
    /// Height of the aspect-ratio container.
    pub container_height: f64,
    /// Viewport width; non-finite means unbounded.
    #[serde(default = "unbounded")]
    pub viewport_width: f64,
    /// Viewport height; non-finite means unbounded.
    #[serde(default = "unbounded")]
    pub viewport_height: f64,
    /// Margin around the canvas and around the content area.
    #[serde(default)]
    pub canvas_padding: f64,
    /// Per-image zoom applied after fitting.
    #[serde(default = "one")]
    pub screenshot_scale: f64,
    /// Selected canvas aspect ratio; defaults to the container's.
    #[serde(default)]
    pub aspect_ratio: Option<f64>,
}

fn unbounded() -> f64 {
    f64::INFINITY
}

fn one() -> f64 {
    1.0
}

/// Derived canvas geometry in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CanvasDimensions {
    /// Canvas width.
    pub canvas_width: f64,
    /// Canvas height.
    pub canvas_height: f64,
    /// Canvas width minus padding on both sides.
    pub content_width: f64,
    /// Canvas height minus padding on both sides.
    pub content_height: f64,
    /// Fitted and zoomed image width.
    pub image_scaled_width: f64,
    /// Fitted and zoomed image height.
    pub image_scaled_height: f64,
}

fn positive(v: f64) -> Option<f64> {
    (v.is_finite() && v > 0.0).then_some(v)
}

/// Fit a box of aspect `aspect` into `(w, h)` by its limiting dimension.
fn fit(w: f64, h: f64, aspect: f64) -> (f64, f64) {
    if w / h > aspect {
        (h * aspect, h)
    } else {
        (w, w / aspect)
    }
}

/// Resolve canvas and image sizes.
///
/// Never fails: degenerate inputs fall back to square, unbounded or minimum values. The canvas
/// keeps the selected aspect ratio even when the floor applies, by scaling both edges up
/// together.
pub fn resolve_dimensions(inputs: &DimensionInputs) -> CanvasDimensions {
    let container_w = positive(inputs.container_width).unwrap_or(MIN_CANVAS_SIZE);
    let container_h = positive(inputs.container_height).unwrap_or(MIN_CANVAS_SIZE);
    let padding = if inputs.canvas_padding.is_finite() {
        inputs.canvas_padding.max(0.0)
    } else {
        0.0
    };
    let canvas_aspect = inputs
        .aspect_ratio
        .and_then(positive)
        .unwrap_or(container_w / container_h);
    let image_aspect = match (
        positive(inputs.image_width),
        positive(inputs.image_height),
    ) {
        (Some(w), Some(h)) => w / h,
        _ => 1.0,
    };
    let zoom = positive(inputs.screenshot_scale).unwrap_or(1.0);

    let available_w = positive(inputs.viewport_width)
        .map_or(container_w, |v| (v * VIEWPORT_SLACK).min(container_w));
    let available_h = positive(inputs.viewport_height)
        .map_or(container_h, |v| (v * VIEWPORT_SLACK).min(container_h));

    let (mut canvas_w, mut canvas_h) = if available_w / available_h > canvas_aspect {
        let h = available_h - 2.0 * padding;
        (h * canvas_aspect, h)
    } else {
        let w = available_w - 2.0 * padding;
        (w, w / canvas_aspect)
    };

    if !(canvas_w >= MIN_CANVAS_SIZE && canvas_h >= MIN_CANVAS_SIZE) {
        let k = if canvas_w > 0.0 && canvas_h > 0.0 {
            (MIN_CANVAS_SIZE / canvas_w).max(MIN_CANVAS_SIZE / canvas_h)
        } else {
            f64::NAN
        };
        if k.is_finite() {
            canvas_w = (canvas_w * k).max(MIN_CANVAS_SIZE);
            canvas_h = (canvas_h * k).max(MIN_CANVAS_SIZE);
        } else {
            (canvas_w, canvas_h) = if canvas_aspect >= 1.0 {
                (MIN_CANVAS_SIZE * canvas_aspect, MIN_CANVAS_SIZE)
            } else {
                (MIN_CANVAS_SIZE, MIN_CANVAS_SIZE / canvas_aspect)
            };
        }
    }

    let content_w = (canvas_w - 2.0 * padding).max(1.0);
    let content_h = (canvas_h - 2.0 * padding).max(1.0);
    let (img_w, img_h) = fit(content_w, content_h, image_aspect);

    CanvasDimensions {
        canvas_width: canvas_w,
        canvas_height: canvas_h,
        content_width: content_w,
        content_height: content_h,
        image_scaled_width: img_w * zoom,
        image_scaled_height: img_h * zoom,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/dimensions.rs"]
mod tests;
