//! 3D-transform exporter: perspective capture of the 3D image host, merged into the scene layer.

use crate::document::{Content, Document, Element, Length, Style, capture_3d};
use crate::export::placement::live_card_box;
use crate::export::settings::SettleDelays;
use crate::export::settle::Settle;
use crate::export::OVERLAY_3D_ATTR;
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::model::Perspective3DConfig;
use crate::raster::layer::RasterLayer;

/// Inputs of [`apply_3d`].
#[derive(Clone, Copy, Debug)]
pub struct Transform3DOptions<'a> {
    /// Element the 3D host is searched under.
    pub anchor_id: &'a str,
    /// Live configuration; decides whether anything happens at all.
    pub perspective: &'a Perspective3DConfig,
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

/// Draw the perspective-warped image over `scene`.
///
/// `scene` is returned untouched when the live configuration is the identity.
#[tracing::instrument(skip_all, fields(anchor = opts.anchor_id, w = opts.width, h = opts.height))]
pub fn apply_3d(
    doc: &mut Document,
    settle: &dyn Settle,
    delays: &SettleDelays,
    mut scene: RasterLayer,
    opts: &Transform3DOptions<'_>,
) -> BackdropResult<RasterLayer> {
    if opts.perspective.is_identity() {
        tracing::debug!("no 3d transform active");
        return Ok(scene);
    }
    let host = doc
        .find_within(opts.anchor_id, OVERLAY_3D_ATTR, "true")
        .ok_or_else(|| BackdropError::precondition("3D overlay element not found"))?;
    let host_box = doc
        .box_of(&host.id)
        .ok_or_else(|| BackdropError::precondition("3D overlay element has no box"))?;
    let card = live_card_box(doc)?;
    if card.width() <= 0.0 || card.height() <= 0.0 {
        return Err(BackdropError::precondition("canvas container has an empty box"));
    }
    let clone = explicit_clone(host, host_box.width(), host_box.height());

    let sx = opts.width * opts.scale / card.width();
    let sy = opts.height * opts.scale / card.height();
    let (rel_x, rel_y) = (host_box.x0 - card.x0, host_box.y0 - card.y0);

    let captured = {
        let mount = doc.mount_offscreen(clone);
        settle.settle("3d mount", delays.mount_3d());
        capture_3d(mount.document(), mount.id(), sx, sy)?
    };
    let x = (rel_x * sx).round() as i64 + captured.origin.0;
    let y = (rel_y * sy).round() as i64 + captured.origin.1;
    tracing::debug!(
        x,
        y,
        w = captured.layer.width(),
        h = captured.layer.height(),
        "3d layer composited"
    );
    scene.draw_over(&captured.layer, x, y, 1.0);
    Ok(scene)
}

/// Copy of the 3D host with every style the perspective capture reads made explicit.
///
/// Only the image survives inside the clone; its box is resolved to px.
fn explicit_clone(host: &Element, width: f64, height: f64) -> Element {
    let mut clone = Element::new("export-3d-clone").with_style(Style {
        width: Some(Length::Px(width)),
        height: Some(Length::Px(height)),
        perspective: host.style.perspective,
        transform: host.style.transform.clone(),
        transform_origin: host.style.transform_origin,
        border_radius: host.style.border_radius,
        opacity: host.style.opacity,
        ..Style::default()
    });
    if let Some(img) = find_image(host) {
        let s = &img.style;
        let mut copy = Element::new("export-3d-image").with_style(Style {
            left: Length::Px(s.left.resolve(width)),
            top: Length::Px(s.top.resolve(height)),
            width: Some(Length::Px(s.width.map_or(width, |l| l.resolve(width)))),
            height: Some(Length::Px(s.height.map_or(height, |l| l.resolve(height)))),
            object_fit: s.object_fit,
            opacity: s.opacity,
            border_radius: s.border_radius,
            transform: s.transform.clone(),
            transform_origin: s.transform_origin,
            ..Style::default()
        });
        copy.content = img.content.clone();
        clone.children.push(copy);
    }
    clone
}

fn find_image(el: &Element) -> Option<&Element> {
    el.children.iter().find_map(|c| {
        if matches!(c.content, Content::Image(_)) {
            Some(c)
        } else {
            find_image(c)
        }
    })
}

#[cfg(test)]
#[path = "../../tests/unit/export/transform3d.rs"]
mod tests;
