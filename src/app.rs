//! The interactive showcase: viewers, page scroll and frame composition.

use std::time::Duration;

use crate::compose::{compose_overlay, compose_section, compose_text, Canvas, CellFrame};
use crate::config::{PageSettings, Showcase};
use crate::error::{Result, ShowcaseError};
use crate::loader::{AsyncModelLoader, LoadOutcome};
use crate::render_loop::{FpsCounter, FrameHandler, RenderLoop, StopHandle};
use crate::renderer::{RenderMode, Renderer};
use crate::scroll::{Page, Viewport};
use crate::state::ViewState;
use crate::terminal::{self, viewport_for, Command, TerminalPresenter};
use crate::text::GraphemeSplitter;
use crate::viewer::{LoadState, SectionViewer};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShowcaseOptions {
    pub debug: bool,
    pub wireframe: bool,
}

pub struct ShowcaseApp {
    page_settings: PageSettings,
    viewport: Viewport,
    viewers: Vec<SectionViewer>,
    page: Page,
    loader: AsyncModelLoader,
    splitter: GraphemeSplitter,
    state: ViewState,
    fps: FpsCounter,
}

impl ShowcaseApp {
    /// Builds one viewer per section and queues every model load
    pub fn new(showcase: Showcase, viewport: Viewport, mut loader: AsyncModelLoader, options: ShowcaseOptions) -> Self {
        let splitter = GraphemeSplitter;
        let viewers: Vec<SectionViewer> = showcase
            .sections
            .into_iter()
            .map(|spec| {
                SectionViewer::new(
                    spec.id,
                    spec.attributes,
                    spec.content,
                    &viewport,
                    showcase.page.accent,
                    &splitter,
                )
            })
            .collect();
        for viewer in &viewers {
            viewer.request_model(&mut loader);
        }
        let page = Page::new(viewport.height, viewers.iter().map(|v| *v.trigger()).collect());
        log::info!("showcase with {} sections", viewers.len());

        let mut app = ShowcaseApp {
            page_settings: showcase.page,
            viewport,
            viewers,
            page,
            loader,
            splitter,
            state: ViewState {
                debug: options.debug,
                wireframe: options.wireframe,
                ..ViewState::default()
            },
            fps: FpsCounter::new(),
        };
        app.update_progress();
        app
    }

    pub fn viewers(&self) -> &[SectionViewer] {
        &self.viewers
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Applies a decoded command; returns false once the user asked to quit
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::ScrollSteps(steps) => self.scroll_by(steps * self.page_settings.scroll_step),
            Command::ScrollPages(pages) => self.scroll_by(pages * self.viewport.height),
            Command::ScrollHome => self.scroll_to(0.0),
            Command::ScrollEnd => self.scroll_to(self.page.max_scroll()),
            Command::ToggleDebug => self.state.debug = !self.state.debug,
            Command::ToggleWireframe => self.state.wireframe = !self.state.wireframe,
            Command::Resize { cols, rows } => self.resize(viewport_for(cols, rows)),
            Command::Quit => return false,
        }
        true
    }

    pub fn scroll_by(&mut self, dy: f64) {
        self.scroll_to(self.state.scroll_y + dy);
    }

    pub fn scroll_to(&mut self, scroll_y: f64) {
        self.state.scroll_y = scroll_y.clamp(0.0, self.page.max_scroll());
        self.update_progress();
    }

    /// Pushes the raw progress of every section whose value changed
    fn update_progress(&mut self) {
        for (index, viewer) in self.viewers.iter_mut().enumerate() {
            let progress = self.page.progress(index, self.state.scroll_y);
            if progress != viewer.progress() {
                if let Some(delta) = viewer.on_scroll_progress(progress) {
                    log::trace!("{}: rotated by {:.4}", viewer.id(), delta);
                }
            }
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        log::debug!("resize to {}x{}", viewport.width, viewport.height);
        self.viewport = viewport;
        for viewer in &mut self.viewers {
            viewer.on_resize(&viewport);
        }
        self.page.set_viewport_height(viewport.height);
        self.scroll_to(self.state.scroll_y);
    }

    /// Hands finished loads to their viewers
    pub fn apply_loads(&mut self) {
        for outcome in self.loader.drain() {
            self.apply_load(outcome);
        }
    }

    /// Blocks until every queued load finished and applies the results
    pub fn wait_for_loads(&mut self) {
        while let Some(outcome) = self.loader.wait() {
            self.apply_load(outcome);
        }
    }

    fn apply_load(&mut self, outcome: LoadOutcome) {
        match self.viewers.get_mut(outcome.section.index()) {
            Some(viewer) => viewer.on_model_loaded(outcome.result),
            None => log::warn!("load result for unknown {}", outcome.section),
        }
    }

    /// Advances animations by `dt` seconds and renders every viewer
    pub fn update(&mut self, dt: f64) {
        self.apply_loads();
        let renderer = Renderer::new(if self.state.wireframe {
            RenderMode::Wireframe
        } else {
            RenderMode::Shaded
        });
        for viewer in &mut self.viewers {
            viewer.tick(dt);
            viewer.render(&renderer);
        }
        self.fps.frame();
    }

    /// Composes the visible sections into terminal cells
    pub fn compose(&self) -> CellFrame {
        let width = (self.viewport.width * self.viewport.pixel_ratio).round().max(1.0) as usize;
        let height = (self.viewport.height * self.viewport.pixel_ratio).round().max(1.0) as usize;
        let mut canvas = Canvas::new(width, height, self.page_settings.background);

        let visible = self.page.visible(self.state.scroll_y);
        for section in &visible {
            compose_section(&mut canvas, &self.viewers[section.index], &self.page_settings, section.top);
        }
        let mut frame = CellFrame::from_canvas(&canvas);
        for section in &visible {
            compose_text(
                &mut frame,
                &self.viewers[section.index],
                &self.viewport,
                section.top,
                self.page_settings.text_color,
                &self.splitter,
            );
        }
        if self.state.debug {
            compose_overlay(
                &mut frame,
                &self.debug_lines(),
                self.page_settings.text_color,
                self.page_settings.background,
                &self.splitter,
            );
        }
        frame
    }

    /// Section pinned in or scrolling out of the viewport, else the first
    /// one coming in
    fn current_section(&self) -> Option<&SectionViewer> {
        let visible = self.page.visible(self.state.scroll_y);
        let section = visible.iter().find(|s| s.top <= 0.0).or(visible.first())?;
        self.viewers.get(section.index)
    }

    pub fn debug_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "{} {} | scroll {:.0}/{:.0} | {:.1} fps{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            self.state.scroll_y,
            self.page.max_scroll(),
            self.fps.fps(),
            if self.state.wireframe { " | wireframe" } else { "" }
        )];
        if let Some(viewer) = self.current_section() {
            lines.push(format!(
                "{} | progress {:.3} | playhead {:.3} | rotation {:.3} rad",
                viewer.id(),
                viewer.progress(),
                viewer.playhead(),
                viewer.rotation()
            ));
            let camera = viewer.camera();
            lines.push(match viewer.fit() {
                Some(fit) => format!(
                    "camera distance {:.3} | near {:.4} | far {:.2}",
                    fit.distance, camera.near, camera.far
                ),
                None => format!("camera unfitted | near {} | far {}", camera.near, camera.far),
            });
            lines.push(match viewer.load_state() {
                LoadState::Pending => format!("model {} loading", viewer.attributes().model.display()),
                LoadState::Loaded => format!("model {} loaded", viewer.attributes().model.display()),
                LoadState::Failed(reason) => format!("model failed: {}", reason),
            });
        }
        lines
    }

    /// Runs the interactive loop on the terminal until the user quits
    pub fn run(self, fps: u32) -> Result<()> {
        let render_loop = RenderLoop::new(fps);
        let presenter = TerminalPresenter::enter().map_err(ShowcaseError::Terminal)?;
        let mut session = TerminalSession {
            app: self,
            presenter,
            stop: render_loop.stop_handle(),
        };
        render_loop.run(&mut session)
    }
}

struct TerminalSession {
    app: ShowcaseApp,
    presenter: TerminalPresenter,
    stop: StopHandle,
}

impl FrameHandler for TerminalSession {
    type Error = ShowcaseError;

    fn idle(&mut self, timeout: Duration) -> Result<()> {
        let Some(event) = terminal::poll_event(timeout).map_err(ShowcaseError::Terminal)? else {
            return Ok(());
        };
        if let Some(command) = Command::from_event(&event) {
            if matches!(command, Command::Resize { .. }) {
                self.presenter.invalidate();
            }
            if !self.app.apply(command) {
                self.stop.stop();
            }
        }
        Ok(())
    }

    fn frame(&mut self, dt: f64) -> Result<()> {
        self.app.update(dt);
        let frame = self.app.compose();
        self.presenter.present(&frame).map_err(ShowcaseError::Terminal)
    }
}
