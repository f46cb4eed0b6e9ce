//! Perspective-correct capture of a 3D-transformed element.
//!
//! The element's image children are mapped through the full CSS 4x4 chain (parent
//! `perspective`, `transform`, `transform-origin`). Because every image lies in its own z=0
//! plane, the chain collapses to a plane homography that is inverted per output pixel.

use crate::document::capture::object_fit_rect;
use crate::document::images::short;
use crate::document::style::{Style, TransformOp};
use crate::document::{Content, Document, Element, element_rect};
use crate::foundation::core::Rect;
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::raster::layer::{MAX_RASTER_DIM, RasterLayer};

type Mat4 = [[f64; 4]; 4];

const IDENTITY4: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Result of [`capture_3d`].
#[derive(Clone, Debug)]
pub struct Capture3D {
    pub layer: RasterLayer,
    /// Pixel offset of `layer`'s top-left from the element box's scaled top-left.
    pub origin: (i64, i64),
}

/// Capture `element_id` with 3D transforms evaluated, at `scale_x`/`scale_y` output px per
/// element px.
#[tracing::instrument(skip_all, fields(element = element_id, scale_x, scale_y))]
pub fn capture_3d(
    doc: &Document,
    element_id: &str,
    scale_x: f64,
    scale_y: f64,
) -> BackdropResult<Capture3D> {
    if !(scale_x.is_finite() && scale_x > 0.0 && scale_y.is_finite() && scale_y > 0.0) {
        return Err(BackdropError::capture(format!(
            "3d capture scale must be finite and > 0, got {scale_x}x{scale_y}"
        )));
    }
    let el = doc
        .element_by_id(element_id)
        .ok_or_else(|| BackdropError::capture(format!("3d capture root '{element_id}' not found")))?;
    let root_rect = element_rect(&el.style, 0.0, 0.0);
    let (w, h) = (root_rect.width(), root_rect.height());
    if w <= 0.0 || h <= 0.0 {
        return Err(BackdropError::capture(format!(
            "3d capture root '{element_id}' has an empty box"
        )));
    }

    let mut planes = Vec::new();
    collect_planes(el, &perspective_matrix(&el.style, w, h), (0.0, 0.0), (w, h), &mut planes);

    let mut bounds = Rect::new(0.0, 0.0, w * scale_x, h * scale_y);
    let mut any_visible = planes.is_empty();
    for plane in &planes {
        for (x, y) in visible_outline(&plane.h3, plane.w, plane.h) {
            any_visible = true;
            bounds = bounds.union_pt((x * scale_x, y * scale_y));
        }
    }
    if !any_visible {
        return Err(BackdropError::capture(
            "3d transform places the image behind the viewer",
        ));
    }
    // Planes reaching towards the eye project arbitrarily far; keep one root extent per side.
    let reach = w.max(h);
    let limit = Rect::new(
        -reach * scale_x,
        -reach * scale_y,
        (w + reach) * scale_x,
        (h + reach) * scale_y,
    );
    let bounds = bounds.intersect(limit);
    let bounds = Rect::new(
        bounds.x0.floor(),
        bounds.y0.floor(),
        bounds.x1.ceil(),
        bounds.y1.ceil(),
    );
    let (pw, ph) = (bounds.width() as u32, bounds.height() as u32);
    if pw > MAX_RASTER_DIM || ph > MAX_RASTER_DIM {
        return Err(BackdropError::capture(format!(
            "3d capture extent {pw}x{ph} exceeds {MAX_RASTER_DIM}"
        )));
    }
    let mut layer = RasterLayer::new_transparent(pw.max(1), ph.max(1))?;

    for plane in &planes {
        let Some(stored) = doc.images.get(&plane.src) else {
            tracing::warn!(src = %short(&plane.src), "3d image not loaded; skipped");
            continue;
        };
        let inv = invert3(&plane.h3)
            .ok_or_else(|| BackdropError::capture("3d transform is degenerate"))?;
        let mut painted = RasterLayer::new_transparent(layer.width(), layer.height())?;
        paint_plane(&mut painted, plane, &stored.layer, &inv, bounds, (scale_x, scale_y));
        layer.draw_over(&painted, 0, 0, plane.opacity as f32);
    }

    tracing::debug!(pw, ph, planes = planes.len(), "3d capture done");
    Ok(Capture3D {
        layer,
        origin: (bounds.x0 as i64, bounds.y0 as i64),
    })
}

struct Plane {
    src: String,
    /// Element px -> capture-root px.
    h3: [[f64; 3]; 3],
    w: f64,
    h: f64,
    radius: f64,
    opacity: f64,
    fit: crate::document::style::ObjectFit,
}

fn collect_planes(
    el: &Element,
    parent_persp: &Mat4,
    origin: (f64, f64),
    parent_size: (f64, f64),
    out: &mut Vec<Plane>,
) {
    for child in &el.children {
        if !child.style.visible || child.style.opacity <= 0.0 {
            continue;
        }
        let r = element_rect(&child.style, parent_size.0, parent_size.1);
        let (x, y) = (origin.0 + r.x0, origin.1 + r.y0);
        let local = mul4(
            &translate3(x, y),
            &transform_matrix(&child.style, r.width(), r.height()),
        );
        let full = mul4(parent_persp, &local);
        if let Content::Image(img) = &child.content {
            out.push(Plane {
                src: img.src.clone(),
                h3: plane_homography(&full),
                w: r.width(),
                h: r.height(),
                radius: child.style.border_radius,
                opacity: child.style.opacity,
                fit: child.style.object_fit,
            });
        }
        let persp = mul4(&full, &perspective_matrix(&child.style, r.width(), r.height()));
        collect_planes(child, &persp, (0.0, 0.0), (r.width(), r.height()), out);
    }
}

/// `perspective` of `style` about the center of its `w x h` box.
fn perspective_matrix(style: &Style, w: f64, h: f64) -> Mat4 {
    match style.perspective {
        Some(d) if d.is_finite() && d > 0.0 => {
            let mut p = IDENTITY4;
            p[3][2] = -1.0 / d;
            mul4(&mul4(&translate3(w / 2.0, h / 2.0), &p), &translate3(-w / 2.0, -h / 2.0))
        }
        _ => IDENTITY4,
    }
}

/// `transform` of `style` about its `transform-origin`.
fn transform_matrix(style: &Style, w: f64, h: f64) -> Mat4 {
    let ox = style.transform_origin.0.resolve(w);
    let oy = style.transform_origin.1.resolve(h);
    let mut m = translate3(ox, oy);
    for op in &style.transform {
        let t = match *op {
            TransformOp::Translate(x, y) => translate3(x.resolve(w), y.resolve(h)),
            TransformOp::Scale(sx, sy) => {
                let mut s = IDENTITY4;
                s[0][0] = sx;
                s[1][1] = sy;
                s
            }
            TransformOp::Rotate(a) | TransformOp::RotateZ(a) => {
                let (s, c) = a.to_radians().sin_cos();
                let mut r = IDENTITY4;
                r[0][0] = c;
                r[0][1] = -s;
                r[1][0] = s;
                r[1][1] = c;
                r
            }
            TransformOp::RotateX(a) => {
                let (s, c) = a.to_radians().sin_cos();
                let mut r = IDENTITY4;
                r[1][1] = c;
                r[1][2] = -s;
                r[2][1] = s;
                r[2][2] = c;
                r
            }
            TransformOp::RotateY(a) => {
                let (s, c) = a.to_radians().sin_cos();
                let mut r = IDENTITY4;
                r[0][0] = c;
                r[0][2] = s;
                r[2][0] = -s;
                r[2][2] = c;
                r
            }
            TransformOp::Perspective(d) => {
                let mut p = IDENTITY4;
                if d.is_finite() && d > 0.0 {
                    p[3][2] = -1.0 / d;
                }
                p
            }
        };
        m = mul4(&m, &t);
    }
    mul4(&m, &translate3(-ox, -oy))
}

fn translate3(x: f64, y: f64) -> Mat4 {
    let mut m = IDENTITY4;
    m[0][3] = x;
    m[1][3] = y;
    m
}

fn mul4(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = [[0.0; 4]; 4];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..4).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// Restrict a 4x4 map to the z=0 input plane and drop output z.
fn plane_homography(m: &Mat4) -> [[f64; 3]; 3] {
    [
        [m[0][0], m[0][1], m[0][3]],
        [m[1][0], m[1][1], m[1][3]],
        [m[3][0], m[3][1], m[3][3]],
    ]
}

/// Smallest homogeneous `w` still treated as in front of the eye.
const NEAR_W: f64 = 1e-3;

fn homogeneous(h: &[[f64; 3]; 3], u: f64, v: f64) -> [f64; 3] {
    [
        h[0][0] * u + h[0][1] * v + h[0][2],
        h[1][0] * u + h[1][1] * v + h[1][2],
        h[2][0] * u + h[2][1] * v + h[2][2],
    ]
}

fn project(h: &[[f64; 3]; 3], u: f64, v: f64) -> Option<(f64, f64)> {
    let [x, y, w] = homogeneous(h, u, v);
    (w > NEAR_W).then(|| (x / w, y / w))
}

/// Projected outline of a `w x h` plane, clipped to the half-space in front of the eye.
///
/// Empty when the whole plane is at or behind the eye.
fn visible_outline(h: &[[f64; 3]; 3], w: f64, ht: f64) -> Vec<(f64, f64)> {
    let corners = [(0.0, 0.0), (w, 0.0), (w, ht), (0.0, ht)].map(|(u, v)| homogeneous(h, u, v));
    let mut out = Vec::with_capacity(8);
    for (i, a) in corners.iter().enumerate() {
        let b = &corners[(i + 1) % corners.len()];
        let (a_in, b_in) = (a[2] > NEAR_W, b[2] > NEAR_W);
        if a_in {
            out.push((a[0] / a[2], a[1] / a[2]));
        }
        if a_in != b_in {
            let t = (NEAR_W - a[2]) / (b[2] - a[2]);
            let x = a[0] + (b[0] - a[0]) * t;
            let y = a[1] + (b[1] - a[1]) * t;
            out.push((x / NEAR_W, y / NEAR_W));
        }
    }
    out
}

fn invert3(m: &[[f64; 3]; 3]) -> Option<[[f64; 3]; 3]> {
    let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);
    if !det.is_finite() || det.abs() < 1e-12 {
        return None;
    }
    let d = 1.0 / det;
    Some([
        [
            (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * d,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * d,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * d,
        ],
        [
            (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * d,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * d,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * d,
        ],
        [
            (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * d,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * d,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * d,
        ],
    ])
}

fn paint_plane(
    out: &mut RasterLayer,
    plane: &Plane,
    img: &RasterLayer,
    inv: &[[f64; 3]; 3],
    bounds: Rect,
    scale: (f64, f64),
) {
    let dest = object_fit_rect(plane.fit, img.width(), img.height(), plane.w, plane.h);
    let kx = f64::from(img.width()) / dest.width();
    let ky = f64::from(img.height()) / dest.height();
    let r = plane.radius.clamp(0.0, plane.w.min(plane.h) / 2.0);
    let w = out.width() as usize;
    for (i, px) in out.data_mut().chunks_exact_mut(4).enumerate() {
        let sx = ((i % w) as f64 + 0.5 + bounds.x0) / scale.0;
        let sy = ((i / w) as f64 + 0.5 + bounds.y0) / scale.1;
        let Some((u, v)) = project(inv, sx, sy) else {
            continue;
        };
        if u < 0.0 || v < 0.0 || u >= plane.w || v >= plane.h || !inside_rounded(u, v, plane.w, plane.h, r) {
            continue;
        }
        if u < dest.x0 || v < dest.y0 || u >= dest.x1 || v >= dest.y1 {
            continue;
        }
        px.copy_from_slice(&sample_bilinear(img, (u - dest.x0) * kx - 0.5, (v - dest.y0) * ky - 0.5));
    }
}

fn inside_rounded(u: f64, v: f64, w: f64, h: f64, r: f64) -> bool {
    if r <= 0.0 {
        return true;
    }
    let cx = u.clamp(r, w - r);
    let cy = v.clamp(r, h - r);
    let (dx, dy) = (u - cx, v - cy);
    dx * dx + dy * dy <= r * r
}

/// Bilinear sample of premultiplied pixels with clamped edges.
fn sample_bilinear(img: &RasterLayer, x: f64, y: f64) -> [u8; 4] {
    let max_x = f64::from(img.width() - 1);
    let max_y = f64::from(img.height() - 1);
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);
    let (x0, y0) = (x.floor(), y.floor());
    let (fx, fy) = (x - x0, y - y0);
    let (x0, y0) = (x0 as u32, y0 as u32);
    let x1 = (x0 + 1).min(img.width() - 1);
    let y1 = (y0 + 1).min(img.height() - 1);
    let (a, b, c, d) = (img.pixel(x0, y0), img.pixel(x1, y0), img.pixel(x0, y1), img.pixel(x1, y1));
    let mut out = [0u8; 4];
    for k in 0..4 {
        let top = f64::from(a[k]) * (1.0 - fx) + f64::from(b[k]) * fx;
        let bottom = f64::from(c[k]) * (1.0 - fx) + f64::from(d[k]) * fx;
        out[k] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/document/capture3d.rs"]
mod tests;
