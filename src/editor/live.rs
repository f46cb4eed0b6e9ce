//! The live editor canvas: the document every flat capture clones from and the stage the
//! scene exporter snapshots.

use std::sync::Arc;

use crate::assets::fonts::FontBook;
use crate::assets::loader::ImageLoader;
use crate::document::images::short;
use crate::document::{BackgroundSize, Document, Element, Length, ObjectFit, Style, TransformOp};
use crate::editor::job::ExportJob;
use crate::effects::noise::{FALLBACK_NOISE_SIZE, NoiseTexture};
use crate::export::encode::encode_png;
use crate::export::placement::{OverlayPlacement, OverlaySet};
use crate::export::{ExportInputs, BACKGROUND_ID, NOISE_OVERLAY_ID, OVERLAY_3D_ATTR, RENDER_CARD_ID};
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::layout::dimensions::{CanvasDimensions, resolve_dimensions};
use crate::layout::frame::FrameInsets;
use crate::model::{ExportOptions, Perspective3DConfig};
use crate::raster::composite::BlendMode;
use crate::raster::layer::RasterLayer;
use crate::scene::pattern::pattern_tile;
use crate::scene::{Stage, StageSpec, build_stage};

/// Card holding every background-side element; the overlay ratio is measured against it.
pub const CARD_ID: &str = "canvas-card";
pub const PATTERN_ID: &str = "canvas-pattern";
pub const TEXTURE_ID: &str = "canvas-texture";
pub const TEXT_HOST_ID: &str = "canvas-text-overlays";
pub const IMAGE_HOST_ID: &str = "canvas-image-overlays";
pub const OVERLAY_3D_ID: &str = "image-3d-overlay";
pub const IMAGE_3D_ID: &str = "image-3d";

/// Image store keys of the decoration tiles.
const PATTERN_SRC: &str = "backdrop:pattern-tile";
const TEXTURE_SRC: &str = "backdrop:texture";

/// Document and stage of one editor session.
#[derive(Debug)]
pub struct LiveCanvas {
    pub document: Document,
    pub stage: Stage,
    pub dimensions: CanvasDimensions,
    /// The image is shown through the perspective overlay.
    pub has_3d: bool,
}

impl LiveCanvas {
    /// Lay out `job` the way the editor shows it.
    ///
    /// Fails with a precondition error when the main image cannot be loaded. Overlay images and
    /// the texture are optional: failures are logged and the element is left out.
    #[tracing::instrument(skip_all, fields(image = %short(&job.image)))]
    pub fn build(job: &ExportJob, loader: &dyn ImageLoader, fonts: FontBook) -> BackdropResult<Self> {
        let main = loader.load(&job.image).map_err(|e| {
            BackdropError::precondition(format!(
                "image '{}' could not be loaded: {e}",
                short(&job.image)
            ))
        })?;
        let (iw, ih) = (f64::from(main.layer.width()), f64::from(main.layer.height()));
        let dimensions = resolve_dimensions(&job.dimension_inputs(iw, ih));
        let (cw, ch) = (dimensions.canvas_width, dimensions.canvas_height);
        let has_3d = job.perspective.has_transform();

        let mut document = Document::new(cw, ch);
        document.fonts = fonts.clone();
        document
            .images
            .insert(job.image.as_str(), main.layer.clone(), main.same_origin);

        let texture = match job.texture.as_ref().filter(|t| t.enabled) {
            Some(cfg) => match loader.load(&cfg.source) {
                Ok(img) => Some((cfg, Arc::new(img.layer))),
                Err(err) => {
                    tracing::warn!(%err, src = %short(&cfg.source), "texture skipped");
                    None
                }
            },
            None => None,
        };

        let mut background = background_element(job);
        if job.pattern.enabled {
            document
                .images
                .insert(PATTERN_SRC, pattern_tile(&job.pattern)?, true);
            background.children.push(decoration(PATTERN_ID, PATTERN_SRC, job.pattern.opacity));
        }
        if let Some((cfg, tex)) = &texture {
            document.images.insert(TEXTURE_SRC, tex.as_ref().clone(), true);
            background.children.push(decoration(TEXTURE_ID, TEXTURE_SRC, cfg.opacity));
        }

        let live = OverlayPlacement {
            width: cw,
            height: ch,
            scale_x: 1.0,
            scale_y: 1.0,
        };
        let texts = live.build_elements(&mut document, loader, OverlaySet::new(&job.text_overlays, &[]));
        let images = live.build_elements(&mut document, loader, OverlaySet::new(&[], &job.image_overlays));

        let mut card = Element::new(CARD_ID)
            .with_style(Style {
                border_radius: job.background_radius,
                overflow_hidden: true,
                ..Style::default()
            })
            .with_child(background)
            .with_child(noise_element(job.background_noise)?);
        if has_3d {
            card.children.push(overlay_3d_element(job, &dimensions));
        }
        let mut text_host = Element::new(TEXT_HOST_ID);
        text_host.children = texts;
        let mut image_host = Element::new(IMAGE_HOST_ID);
        image_host.children = images;
        card.children.push(text_host);
        card.children.push(image_host);
        document.append(
            Element::new(RENDER_CARD_ID)
                .with_style(Style::boxed(0.0, 0.0, cw, ch))
                .with_child(card),
        );

        let mut stage = build_stage(&StageSpec {
            canvas_width: cw,
            canvas_height: ch,
            image_width: dimensions.image_scaled_width,
            image_height: dimensions.image_scaled_height,
            image: Arc::new(main.layer),
            screenshot: &job.screenshot,
            frame: &job.frame,
            shadow: &job.shadow,
            pattern: &job.pattern,
            texture,
            image_opacity: 1.0,
            has_3d,
        })?;
        stage.fonts = fonts;
        tracing::debug!(cw, ch, has_3d, layers = stage.layers.len(), "live canvas built");

        Ok(Self {
            document,
            stage,
            dimensions,
            has_3d,
        })
    }

    /// The job's export request, or the canvas size at scale 1.
    pub fn export_options(&self, job: &ExportJob) -> ExportOptions {
        job.export.unwrap_or_else(|| {
            ExportOptions::new(
                self.dimensions.canvas_width.round().max(1.0) as u32,
                self.dimensions.canvas_height.round().max(1.0) as u32,
            )
        })
    }

    /// Exporter inputs for `job` against this canvas.
    pub fn export_inputs<'a>(&self, job: &'a ExportJob, options: ExportOptions) -> ExportInputs<'a> {
        ExportInputs {
            options,
            background: &job.background,
            border_radius: job.background_radius,
            blur: job.background_blur,
            noise: job.background_noise,
            text_overlays: &job.text_overlays,
            image_overlays: &job.image_overlays,
            perspective: &job.perspective,
            image_loaded: self.document.images.contains(&job.image),
        }
    }
}

fn background_element(job: &ExportJob) -> Element {
    let css = job.background.resolve_style();
    let image_backed = job.background.image_src().is_some();
    Element::new(BACKGROUND_ID).with_style(Style {
        background_color: css.background_color,
        background_image: css.background_image,
        background_size: if image_backed {
            BackgroundSize::Cover
        } else {
            BackgroundSize::Auto
        },
        background_repeat: !image_backed,
        opacity: css.opacity,
        border_radius: job.background_radius,
        filter: (job.background_blur > 0.0).then(|| format!("blur({}px)", job.background_blur)),
        ..Style::default()
    })
}

fn decoration(id: &str, src: &str, opacity: f64) -> Element {
    Element::new(id).with_style(Style {
        background_image: Some(format!("url({src})")),
        background_repeat: true,
        opacity,
        ..Style::default()
    })
}

/// Preview grain; capture always skips it and the exporter reads its texture back.
fn noise_element(noise: f64) -> BackdropResult<Element> {
    let texture = NoiseTexture::procedural(FALLBACK_NOISE_SIZE, FALLBACK_NOISE_SIZE)?;
    let url = png_data_url(&texture.layer)?;
    Ok(Element::new(NOISE_OVERLAY_ID).with_style(Style {
        background_image: Some(format!("url({url})")),
        background_repeat: true,
        opacity: (noise / 100.0).clamp(0.0, 1.0),
        visible: noise > 0.0,
        mix_blend_mode: BlendMode::Overlay,
        ..Style::default()
    }))
}

fn png_data_url(layer: &RasterLayer) -> BackdropResult<String> {
    let opts = ExportOptions::new(layer.width(), layer.height());
    Ok(encode_png(layer, &opts)?.data_url)
}

/// CSS transform chain of the perspective image. The screenshot's own rotation folds into
/// the Z rotation.
pub fn perspective_transform(
    cfg: &Perspective3DConfig,
    screenshot_rotation: f64,
) -> Vec<TransformOp> {
    vec![
        TransformOp::Translate(Length::Percent(cfg.translate_x), Length::Percent(cfg.translate_y)),
        TransformOp::Scale(cfg.scale, cfg.scale),
        TransformOp::RotateX(cfg.rotate_x),
        TransformOp::RotateY(cfg.rotate_y),
        TransformOp::RotateZ(cfg.rotate_z + screenshot_rotation),
    ]
}

/// Host of the perspective image, placed over the image's slot in the stage.
fn overlay_3d_element(job: &ExportJob, dims: &CanvasDimensions) -> Element {
    let insets = FrameInsets::for_frame(&job.frame);
    let (iw, ih) = (dims.image_scaled_width, dims.image_scaled_height);
    let (fw, fh) = insets.framed_size(iw, ih);
    let (ox, oy) = insets.image_origin();
    let left = dims.canvas_width / 2.0 + job.screenshot.offset_x - fw / 2.0 + ox;
    let top = dims.canvas_height / 2.0 + job.screenshot.offset_y - fh / 2.0 + oy;
    Element::new(OVERLAY_3D_ID)
        .with_attr(OVERLAY_3D_ATTR, "true")
        .with_style(Style {
            perspective: Some(job.perspective.perspective),
            z_index: 10,
            ..Style::boxed(left, top, iw, ih)
        })
        .with_child(
            Element::new(IMAGE_3D_ID)
                .with_style(Style {
                    width: Some(Length::FULL),
                    height: Some(Length::FULL),
                    object_fit: ObjectFit::Cover,
                    border_radius: job.screenshot.radius,
                    transform: perspective_transform(
                        &job.perspective,
                        job.screenshot.rotation,
                    ),
                    ..Style::default()
                })
                .with_image(job.image.as_str()),
        )
}

#[cfg(test)]
#[path = "../../tests/unit/editor/live.rs"]
mod tests;
