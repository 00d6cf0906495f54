//! Showcase file loading.
//!
//! A showcase file is TOML with an optional `[page]` table and one
//! `[[section]]` table per model section:
//!
//! ```toml
//! [page]
//! background = "#101014"
//!
//! [[section]]
//! model = "assets/axe.glb"
//! rotate = "45"
//! bgcolor = "#ff0000"
//! name = "Battle Axe"
//! description = "Forged steel head on an ash haft."
//! specs = ["Weight: 2.4 kg", "Length: 90 cm"]
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::color::Color;
use crate::error::ConfigError;
use crate::section::{SectionAttributes, SectionContent, SectionDescriptor, SectionId};

pub const DEFAULT_BACKGROUND: Color = Color::rgb8(16, 16, 20);
pub const DEFAULT_ACCENT: Color = Color::rgb8(40, 40, 48);
pub const DEFAULT_TEXT_COLOR: Color = Color::rgb8(240, 240, 240);
pub const DEFAULT_SCROLL_STEP: f64 = 48.0;
pub const DEFAULT_BG_RADIUS: f64 = 4.0;

/// `[page]` table; colors are kept as text until [`PageSettings::resolve`]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PageConfig {
    #[serde(default)]
    pub background: Option<String>,
    /// Initial color of each section's background disc
    #[serde(default)]
    pub accent: Option<String>,
    #[serde(default)]
    pub text_color: Option<String>,
    /// Scroll distance per wheel notch or arrow key, in CSS px
    #[serde(default)]
    pub scroll_step: Option<f64>,
    /// Radius of the background disc before it is scaled, in CSS px
    #[serde(default)]
    pub bg_radius_px: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ShowcaseConfig {
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default, rename = "section")]
    pub sections: Vec<SectionDescriptor>,
}

/// Resolved page settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSettings {
    pub background: Color,
    pub accent: Color,
    pub text_color: Color,
    pub scroll_step: f64,
    pub bg_radius_px: f64,
}

impl Default for PageSettings {
    fn default() -> Self {
        PageSettings {
            background: DEFAULT_BACKGROUND,
            accent: DEFAULT_ACCENT,
            text_color: DEFAULT_TEXT_COLOR,
            scroll_step: DEFAULT_SCROLL_STEP,
            bg_radius_px: DEFAULT_BG_RADIUS,
        }
    }
}

impl PageSettings {
    /// Resolves a `[page]` table, logging and replacing invalid values
    pub fn resolve(config: &PageConfig) -> Self {
        let defaults = PageSettings::default();
        let color = |field: &str, value: &Option<String>, default: Color| match value {
            None => default,
            Some(text) => text.parse().unwrap_or_else(|err| {
                log::warn!("page.{}: {}, using {}", field, err, default);
                default
            }),
        };
        let positive = |field: &str, value: Option<f64>, default: f64| match value {
            None => default,
            Some(v) if v.is_finite() && v > 0.0 => v,
            Some(v) => {
                log::warn!("page.{}: {} is not a positive number, using {}", field, v, default);
                default
            }
        };

        PageSettings {
            background: color("background", &config.background, defaults.background),
            accent: color("accent", &config.accent, defaults.accent),
            text_color: color("text_color", &config.text_color, defaults.text_color),
            scroll_step: positive("scroll_step", config.scroll_step, defaults.scroll_step),
            bg_radius_px: positive("bg_radius_px", config.bg_radius_px, defaults.bg_radius_px),
        }
    }
}

/// A section ready to be turned into a viewer
#[derive(Debug, Clone, PartialEq)]
pub struct SectionSpec {
    pub id: SectionId,
    pub attributes: SectionAttributes,
    pub content: SectionContent,
}

/// Fully validated showcase
#[derive(Debug, Clone, PartialEq)]
pub struct Showcase {
    pub page: PageSettings,
    pub sections: Vec<SectionSpec>,
}

impl ShowcaseConfig {
    /// Validates every section; model paths are resolved against `base_dir`
    pub fn validate(&self, base_dir: Option<&Path>) -> Result<Showcase, ConfigError> {
        if self.sections.is_empty() {
            return Err(ConfigError::NoSections);
        }
        let page = PageSettings::resolve(&self.page);
        let sections = self
            .sections
            .iter()
            .enumerate()
            .map(|(index, descriptor)| {
                let id = SectionId::new(index);
                let mut attributes = SectionAttributes::from_descriptor(id, descriptor, page.accent)?;
                if let Some(dir) = base_dir {
                    if attributes.model.is_relative() {
                        attributes.model = dir.join(&attributes.model);
                    }
                }
                Ok(SectionSpec {
                    id,
                    attributes,
                    content: SectionContent::from(descriptor),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Showcase { page, sections })
    }
}

pub fn parse(content: &str) -> Result<ShowcaseConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

pub fn load_from_path(path: &Path) -> Result<ShowcaseConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content)
}

/// Loads and validates a showcase file; relative model paths are taken
/// relative to the file's directory
pub fn load_showcase(path: &Path) -> Result<Showcase, ConfigError> {
    let config = load_from_path(path)?;
    config.validate(path.parent())
}
