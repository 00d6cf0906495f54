//! Scroll-driven 3D model showcase for the terminal.
//!
//! Each section of a showcase file gets a [`viewer::SectionViewer`]: a
//! software-rasterized scene with one glTF model, a camera fitted to it once
//! it loads, and a rotation plus text-reveal timeline bound to the page
//! scroll position. [`app::ShowcaseApp`] drives the viewers from terminal
//! input; [`snapshot`] renders one section headlessly to PNG.

pub mod app;
pub mod camera;
pub mod color;
pub mod compose;
pub mod config;
pub mod error;
pub mod graphics;
pub mod loader;
pub mod math;
pub mod render_loop;
pub mod renderer;
pub mod rotation;
pub mod scene;
pub mod scroll;
pub mod section;
pub mod snapshot;
pub mod state;
pub mod surface;
pub mod terminal;
pub mod text;
pub mod timeline;
pub mod vertex;
pub mod viewer;

#[cfg(test)]
mod test_utils;

pub use app::{ShowcaseApp, ShowcaseOptions};
pub use config::{load_showcase, Showcase};
pub use error::{ConfigError, LoadError, Result, ShowcaseError};
pub use loader::{AsyncModelLoader, GltfLoader, ModelLoader};
pub use viewer::SectionViewer;
