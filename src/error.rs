//! Error types for configuration, model loading and presentation.

use std::path::PathBuf;

/// Errors raised while reading or validating a showcase file
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read showcase file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid showcase file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("section {section} has no model path")]
    MissingModel { section: usize },

    #[error("showcase defines no sections")]
    NoSections,
}

/// Errors raised while importing a model asset
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("failed to import {path}: {reason}")]
    Import { path: String, reason: String },

    #[error("{path} contains no triangle geometry")]
    NoGeometry { path: String },
}

/// Top-level error for the showcase runtime
#[derive(thiserror::Error, Debug)]
pub enum ShowcaseError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("failed to write snapshot: {0}")]
    Image(#[from] image::ImageError),

    #[error("section {index} does not exist (showcase has {count})")]
    UnknownSection { index: usize, count: usize },
}

pub type Result<T, E = ShowcaseError> = std::result::Result<T, E>;
