use crate::color::normalize::resolve_any;
use crate::effects::blur::apply_blur;
use crate::foundation::core::{Affine, BezPath, Rect};
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::model::{PatternConfig, PatternKind};
use crate::raster::layer::RasterLayer;
use crate::raster::painter::{Painter, StrokeSpec, circle_path};

const MIN_TILE: f64 = 2.0;
const MAX_TILE: f64 = 512.0;

/// Edge length of the square tile for `cfg`.
pub fn tile_size(cfg: &PatternConfig) -> u32 {
    (cfg.spacing * cfg.scale).round().clamp(MIN_TILE, MAX_TILE) as u32
}

/// Render one seamless tile of the decorative pattern, in stage units.
///
/// The motif is rotated about the tile center; `blur` is applied to the finished tile.
pub fn pattern_tile(cfg: &PatternConfig) -> BackdropResult<RasterLayer> {
    let color = resolve_any(&cfg.color).ok_or_else(|| {
        BackdropError::validation(format!("unsupported pattern color '{}'", cfg.color))
    })?;
    let n = tile_size(cfg);
    let e = f64::from(n);
    let c = e / 2.0;
    let line = cfg.scale.max(1.0);

    let mut p = Painter::new(n, n)?;
    p.set_transform(
        Affine::translate((c, c)) * Affine::rotate(cfg.rotation.to_radians()) * Affine::translate((-c, -c)),
    );
    match cfg.kind {
        PatternKind::Dots => {
            let r = (2.0 * cfg.scale).clamp(0.5, c);
            p.fill_path(&circle_path(c, c, r), color);
        }
        PatternKind::Grid => {
            p.fill_rect(Rect::new(0.0, 0.0, e, line), color);
            p.fill_rect(Rect::new(0.0, 0.0, line, e), color);
        }
        PatternKind::Lines => {
            // x + y = k*e for k = 0, 1, 2 covers the tile including both corners.
            let mut path = BezPath::new();
            for k in 0..3 {
                let k = f64::from(k) * e;
                path.move_to((k + e, -e));
                path.line_to((k - 2.0 * e, 2.0 * e));
            }
            p.stroke_path(
                &path,
                &StrokeSpec {
                    width: line,
                    color,
                    dash: None,
                    round: false,
                },
            );
        }
        PatternKind::Cross => {
            let arm = (e * 0.3).max(line);
            let half = line / 2.0;
            p.fill_rect(Rect::new(c - arm, c - half, c + arm, c + half), color);
            p.fill_rect(Rect::new(c - half, c - arm, c + half, c + arm), color);
        }
    }
    let tile = apply_blur(p.finish()?, cfg.blur)?;
    tracing::debug!(kind = ?cfg.kind, size = n, "pattern tile rendered");
    Ok(tile)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/pattern.rs"]
mod tests;
