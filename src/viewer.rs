//! Per-section model viewer and its scroll-bound animation state.

use crate::camera::{CameraFit, PerspectiveCamera, DEFAULT_FAR, DEFAULT_NEAR, FIELD_OF_VIEW_DEGREES};
use crate::color::Color;
use crate::error::LoadError;
use crate::loader::AsyncModelLoader;
use crate::renderer::Renderer;
use crate::rotation::ScrollRotation;
use crate::scene::{Mesh, Model, Scene};
use crate::scroll::{Scrub, ScrollTrigger, Viewport, SCRUB_SECONDS};
use crate::section::{SectionAttributes, SectionContent, SectionId};
use crate::surface::RenderSurface;
use crate::text::{char_columns, TextSplitter};
use crate::timeline::{reveal_timeline, SectionPresentation, Timeline};

/// Where a section's model is in its lifecycle
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Pending,
    Loaded,
    Failed(String),
}

pub struct SectionViewer {
    id: SectionId,
    attributes: SectionAttributes,
    content: SectionContent,
    heading_chars: Vec<String>,
    heading_columns: Vec<usize>,
    surface: RenderSurface,
    camera: PerspectiveCamera,
    scene: Scene,
    load_state: LoadState,
    fit: Option<CameraFit>,
    rotation: ScrollRotation,
    trigger: ScrollTrigger,
    scrub: Scrub,
    progress: f64,
    timeline: Timeline,
    initial: SectionPresentation,
    presentation: SectionPresentation,
}

impl SectionViewer {
    /// Creates a viewer sized to `viewport` with an empty, lit scene.
    ///
    /// `accent` is the background disc's starting color.
    pub fn new(
        id: SectionId,
        attributes: SectionAttributes,
        content: SectionContent,
        viewport: &Viewport,
        accent: Color,
        splitter: &dyn TextSplitter,
    ) -> Self {
        let heading_chars = splitter.chars(&content.name);
        let heading_columns = char_columns(&content.name);
        let timeline = reveal_timeline(heading_chars.len(), content.specs.len(), attributes.bgcolor);
        let initial = SectionPresentation::initial(heading_chars.len(), content.specs.len(), accent);

        SectionViewer {
            id,
            surface: RenderSurface::new(viewport.width, viewport.height, viewport.pixel_ratio),
            camera: PerspectiveCamera::new(
                FIELD_OF_VIEW_DEGREES,
                viewport.aspect(),
                DEFAULT_NEAR,
                DEFAULT_FAR,
            ),
            scene: Scene::new(),
            load_state: LoadState::Pending,
            fit: None,
            rotation: ScrollRotation::new(),
            trigger: ScrollTrigger::pinned(viewport),
            scrub: Scrub::new(SCRUB_SECONDS),
            progress: 0.0,
            presentation: initial.clone(),
            initial,
            timeline,
            heading_chars,
            heading_columns,
            attributes,
            content,
        }
    }

    pub fn id(&self) -> SectionId {
        self.id
    }

    pub fn attributes(&self) -> &SectionAttributes {
        &self.attributes
    }

    pub fn content(&self) -> &SectionContent {
        &self.content
    }

    pub fn heading_chars(&self) -> &[String] {
        &self.heading_chars
    }

    /// Column of each heading character within the heading line
    pub fn heading_columns(&self) -> &[usize] {
        &self.heading_columns
    }

    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn model(&self) -> Option<&Model> {
        self.scene.model.as_ref()
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    /// Camera fit applied after the model loaded, if any
    pub fn fit(&self) -> Option<&CameraFit> {
        self.fit.as_ref()
    }

    pub fn trigger(&self) -> &ScrollTrigger {
        &self.trigger
    }

    pub fn rotation(&self) -> f64 {
        self.rotation.current()
    }

    /// Last raw scroll progress seen
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Scrubbed playhead progress
    pub fn playhead(&self) -> f64 {
        self.scrub.current()
    }

    pub fn presentation(&self) -> &SectionPresentation {
        &self.presentation
    }

    /// Queues the section's model on the async loader
    pub fn request_model(&self, loader: &mut AsyncModelLoader) {
        loader.request(self.id, self.attributes.model.clone());
    }

    /// Applies a finished load. Only the first successful load is used.
    pub fn on_model_loaded(&mut self, result: Result<Mesh, LoadError>) {
        if self.scene.model.is_some() {
            log::warn!("{}: model already loaded, ignoring second result", self.id);
            return;
        }
        match result {
            Ok(mesh) => {
                log::info!(
                    "{}: loaded {} ({} triangles)",
                    self.id,
                    self.attributes.model.display(),
                    mesh.triangles.len()
                );
                self.scene.model = Some(Model::new(mesh));
                self.load_state = LoadState::Loaded;
                self.fit_camera();
            }
            Err(err) => {
                log::warn!("{}: {}", self.id, err);
                self.load_state = LoadState::Failed(err.to_string());
            }
        }
    }

    /// Centers the model, applies its yaw offset and places the camera so
    /// the model fills the view. Runs once per viewer.
    fn fit_camera(&mut self) {
        if self.fit.is_some() {
            return;
        }
        let Some(model) = self.scene.model.as_mut() else {
            return;
        };

        let aabb = model.world_bounding_box();
        let center = aabb.center();
        for axis in 0..3 {
            model.position[axis] -= center[axis];
        }
        model.yaw = self.attributes.rotate_degrees.to_radians();

        match CameraFit::compute(&aabb, self.camera.fov) {
            Some(fit) => {
                self.camera.apply_fit(&fit);
                log::debug!(
                    "{}: camera at {:.3} (near {:.4}, far {:.2})",
                    self.id,
                    fit.camera_z,
                    fit.near,
                    fit.far
                );
                self.fit = Some(fit);
            }
            None => log::warn!("{}: model has no extent, camera left unfitted", self.id),
        }
    }

    /// Follows a viewport resize: aspect ratio and surface size only
    pub fn on_resize(&mut self, viewport: &Viewport) {
        self.camera.aspect = viewport.aspect();
        self.camera.update_projection_matrix();
        if self.surface.pixel_ratio() != viewport.pixel_ratio {
            self.surface.set_pixel_ratio(viewport.pixel_ratio);
        }
        self.surface.set_size(viewport.width, viewport.height);
    }

    /// Handles a raw scroll progress update.
    ///
    /// Returns the rotation applied to the model, if any. The reveal
    /// timeline only gets a new scrub target here; it moves in [`tick`].
    ///
    /// [`tick`]: SectionViewer::tick
    pub fn on_scroll_progress(&mut self, progress: f64) -> Option<f64> {
        self.progress = progress;
        self.scrub.set_target(progress);

        let delta = self.rotation.update(progress, self.scene.model.is_some())?;
        if let Some(model) = self.scene.model.as_mut() {
            model.rotate_on_vertical_axis(delta);
        }
        Some(delta)
    }

    /// Advances the scrubbed playhead by `dt` seconds and re-seeks the
    /// reveal timeline when it moved
    pub fn tick(&mut self, dt: f64) {
        if self.scrub.advance(dt) {
            self.seek_timeline();
        }
    }

    /// Jumps the playhead to the current scroll progress
    pub fn settle(&mut self) {
        self.scrub.settle();
        self.seek_timeline();
    }

    fn seek_timeline(&mut self) {
        self.presentation = self.timeline.seek_progress(self.scrub.current(), &self.initial);
    }

    /// Renders the scene through the camera into the surface
    pub fn render(&mut self, renderer: &Renderer) {
        renderer.render(&self.scene, &self.camera, &mut self.surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::{DEAD_ZONE, FULL_TURN};
    use crate::test_utils::unit_cube;
    use crate::text::GraphemeSplitter;
    use std::f64::consts::FRAC_PI_4;
    use std::path::PathBuf;

    fn viewer(rotate_degrees: f64) -> SectionViewer {
        let attributes = SectionAttributes {
            model: PathBuf::from("axe.glb"),
            rotate_degrees,
            bgcolor: Color::rgb8(255, 0, 0),
        };
        let content = SectionContent {
            name: "Axe".into(),
            description: "Sharp and heavy.".into(),
            specs: vec!["Weight".into(), "Length".into()],
        };
        SectionViewer::new(
            SectionId::new(0),
            attributes,
            content,
            &Viewport::new(800.0, 600.0, 1.0),
            Color::BLACK,
            &GraphemeSplitter,
        )
    }

    /// Cube offset from the origin so centering is observable
    fn offset_cube() -> Mesh {
        let mut mesh = unit_cube();
        for p in &mut mesh.positions {
            p[0] += 3.0;
            p[1] -= 1.0;
        }
        mesh
    }

    #[test]
    fn construction_matches_section_defaults() {
        let viewer = viewer(0.0);
        assert_eq!(viewer.camera().fov, 75.0);
        assert_eq!(viewer.camera().near, 0.1);
        assert_eq!(viewer.camera().far, 10000.0);
        assert!((viewer.camera().aspect - 800.0 / 600.0).abs() < 1e-12);
        assert_eq!((viewer.surface().width(), viewer.surface().height()), (800, 600));
        assert_eq!(viewer.trigger().distance, 1200.0);
        assert!(viewer.model().is_none());
        assert_eq!(viewer.load_state(), &LoadState::Pending);
        assert_eq!(viewer.heading_chars().len(), 3);
    }

    #[test]
    fn loaded_model_is_centered_yawed_and_framed() {
        let mut viewer = viewer(45.0);
        viewer.on_model_loaded(Ok(offset_cube()));

        let model = viewer.model().unwrap();
        assert_eq!(model.position, [-3.0, 1.0, 0.0]);
        assert!((model.yaw - FRAC_PI_4).abs() < 1e-12);

        let fit = *viewer.fit().unwrap();
        let distance = 1.0 / (37.5f64).to_radians().tan();
        assert!((fit.distance - distance).abs() < 1e-12);
        let position = viewer.camera().position;
        assert_eq!(&position[..2], &[0.0, 0.0]);
        assert!((position[2] - distance * 1.2).abs() < 1e-12);
        assert!((viewer.camera().near - distance / 10.0).abs() < 1e-12);
        assert!((viewer.camera().far - distance * 10.0).abs() < 1e-12);
    }

    #[test]
    fn camera_fit_is_reproducible() {
        let mut a = viewer(45.0);
        let mut b = viewer(45.0);
        a.on_model_loaded(Ok(offset_cube()));
        b.on_model_loaded(Ok(offset_cube()));
        assert_eq!(a.fit(), b.fit());
        assert_eq!(a.camera(), b.camera());
    }

    #[test]
    fn second_load_is_ignored() {
        let mut viewer = viewer(0.0);
        viewer.on_model_loaded(Ok(offset_cube()));
        let camera = viewer.camera().clone();
        let mut other = unit_cube();
        other.positions.iter_mut().for_each(|p| p[2] *= 10.0);
        viewer.on_model_loaded(Ok(other));
        assert_eq!(viewer.camera(), &camera);
        assert_eq!(viewer.model().unwrap().mesh, offset_cube());
    }

    #[test]
    fn resize_changes_aspect_and_surface_only() {
        let mut viewer = viewer(0.0);
        viewer.on_model_loaded(Ok(offset_cube()));
        let (near, far, position) = (viewer.camera().near, viewer.camera().far, viewer.camera().position);

        viewer.on_resize(&Viewport::new(1024.0, 512.0, 1.0));
        assert_eq!(viewer.camera().aspect, 2.0);
        assert_eq!((viewer.surface().width(), viewer.surface().height()), (1024, 512));
        assert_eq!(viewer.camera().near, near);
        assert_eq!(viewer.camera().far, far);
        assert_eq!(viewer.camera().position, position);
    }

    #[test]
    fn failed_load_keeps_rendering_without_model() {
        let mut viewer = viewer(0.0);
        viewer.on_model_loaded(Err(LoadError::Import {
            path: "missing.glb".into(),
            reason: "not found".into(),
        }));
        assert!(viewer.model().is_none());
        assert!(matches!(viewer.load_state(), LoadState::Failed(_)));
        assert_eq!(viewer.on_scroll_progress(0.9), None);

        viewer.render(&Renderer::default());
        assert!(viewer.surface().pixels().iter().all(|p| *p == Color::TRANSPARENT));
        assert_eq!(viewer.camera().near, 0.1);
    }

    #[test]
    fn scroll_rotates_model_past_dead_zone() {
        let mut viewer = viewer(45.0);
        assert_eq!(viewer.on_scroll_progress(0.5), None);
        viewer.on_model_loaded(Ok(offset_cube()));
        assert_eq!(viewer.on_scroll_progress(DEAD_ZONE), None);

        let delta = viewer.on_scroll_progress(1.0).unwrap();
        assert!((delta - FULL_TURN).abs() < 1e-9);
        let yaw = viewer.model().unwrap().yaw;
        assert!((yaw - (FRAC_PI_4 + FULL_TURN)).abs() < 1e-9);
        assert!((viewer.rotation() - FULL_TURN).abs() < 1e-9);
    }

    #[test]
    fn timeline_follows_scrubbed_progress() {
        let mut viewer = viewer(0.0);
        viewer.on_scroll_progress(1.0);
        assert_eq!(viewer.presentation().background.scale, 1.0);

        viewer.tick(0.1);
        let partial = viewer.presentation().clone();
        assert!(viewer.playhead() > 0.0 && viewer.playhead() < 1.0);

        viewer.settle();
        assert_eq!(viewer.playhead(), 1.0);
        assert_eq!(viewer.presentation().background.scale, 200.0);
        assert_eq!(viewer.presentation().background.color, Color::rgb8(255, 0, 0));
        assert_ne!(&partial, viewer.presentation());
    }
}
