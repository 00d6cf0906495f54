//! Headless rendering of one section to a PNG.

use std::path::Path;

use image::error::{ParameterError, ParameterErrorKind};
use image::{ImageError, RgbaImage};

use crate::compose::{compose_section, Canvas};
use crate::config::Showcase;
use crate::error::{Result, ShowcaseError};
use crate::loader::ModelLoader;
use crate::renderer::{RenderMode, Renderer};
use crate::scroll::Viewport;
use crate::text::GraphemeSplitter;
use crate::viewer::SectionViewer;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotRequest {
    /// Zero-based section index
    pub section: usize,
    /// Raw scroll progress in [0, 1]
    pub progress: f64,
    pub width: u32,
    pub height: u32,
    pub wireframe: bool,
}

impl Default for SnapshotRequest {
    fn default() -> Self {
        SnapshotRequest {
            section: 0,
            progress: 0.0,
            width: 800,
            height: 600,
            wireframe: false,
        }
    }
}

/// Renders the requested section with its model loaded synchronously and
/// the timeline settled at the requested progress
pub fn render_snapshot(showcase: &Showcase, loader: &dyn ModelLoader, request: &SnapshotRequest) -> Result<RgbaImage> {
    let spec = showcase
        .sections
        .get(request.section)
        .ok_or(ShowcaseError::UnknownSection {
            index: request.section,
            count: showcase.sections.len(),
        })?;

    let viewport = Viewport::new(request.width.max(1) as f64, request.height.max(1) as f64, 1.0);
    let mut viewer = SectionViewer::new(
        spec.id,
        spec.attributes.clone(),
        spec.content.clone(),
        &viewport,
        showcase.page.accent,
        &GraphemeSplitter,
    );
    viewer.on_model_loaded(loader.load(&spec.attributes.model));
    viewer.on_scroll_progress(request.progress.clamp(0.0, 1.0));
    viewer.settle();

    let mode = if request.wireframe {
        RenderMode::Wireframe
    } else {
        RenderMode::Shaded
    };
    viewer.render(&Renderer::new(mode));

    let surface = viewer.surface();
    let mut canvas = Canvas::new(surface.width(), surface.height(), showcase.page.background);
    compose_section(&mut canvas, &viewer, &showcase.page, 0.0);

    RgbaImage::from_raw(canvas.width() as u32, canvas.height() as u32, canvas.to_rgba()).ok_or_else(|| {
        ShowcaseError::Image(ImageError::Parameter(ParameterError::from_kind(
            ParameterErrorKind::DimensionMismatch,
        )))
    })
}

/// Renders a snapshot and writes it as PNG to `path`
pub fn write_snapshot(
    path: &Path,
    showcase: &Showcase,
    loader: &dyn ModelLoader,
    request: &SnapshotRequest,
) -> Result<()> {
    let image = render_snapshot(showcase, loader, request)?;
    image.save_with_format(path, image::ImageFormat::Png)?;
    log::info!(
        "wrote {}x{} snapshot of section {} to {}",
        image.width(),
        image.height(),
        request.section + 1,
        path.display()
    );
    Ok(())
}
