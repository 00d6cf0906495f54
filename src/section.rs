//! Section descriptors and their validated attributes.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

use crate::color::Color;
use crate::error::ConfigError;

/// Position of a section on the page, printed as `model-section-N` (1-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(usize);

impl SectionId {
    pub fn new(index: usize) -> Self {
        SectionId(index)
    }

    /// Zero-based index
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model-section-{}", self.0 + 1)
    }
}

/// Attribute given either as text or as a bare TOML number
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
}

impl AttributeValue {
    fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            AttributeValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

/// A `[[section]]` table of the showcase file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SectionDescriptor {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub rotate: Option<AttributeValue>,
    #[serde(default)]
    pub bgcolor: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub specs: Vec<String>,
}

/// Validated per-section attributes
#[derive(Debug, Clone, PartialEq)]
pub struct SectionAttributes {
    pub model: PathBuf,
    pub rotate_degrees: f64,
    pub bgcolor: Color,
}

impl SectionAttributes {
    /// Validates a descriptor.
    ///
    /// A missing model path is an error. A missing or non-finite `rotate`
    /// falls back to 0°, a missing or unparsable `bgcolor` to `fallback_color`;
    /// both fallbacks are logged.
    pub fn from_descriptor(
        id: SectionId,
        descriptor: &SectionDescriptor,
        fallback_color: Color,
    ) -> Result<Self, ConfigError> {
        let model = match descriptor.model.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => return Err(ConfigError::MissingModel { section: id.index() + 1 }),
        };

        let rotate_degrees = match &descriptor.rotate {
            None => 0.0,
            Some(value) => match value.as_number() {
                Some(degrees) if degrees.is_finite() => degrees,
                _ => {
                    log::warn!("{}: invalid rotate value {:?}, using 0", id, value);
                    0.0
                }
            },
        };

        let bgcolor = match &descriptor.bgcolor {
            None => fallback_color,
            Some(text) => text.parse::<Color>().unwrap_or_else(|err| {
                log::warn!("{}: {}, keeping {}", id, err, fallback_color);
                fallback_color
            }),
        };

        Ok(SectionAttributes {
            model,
            rotate_degrees,
            bgcolor,
        })
    }
}

/// Text shown alongside a section's model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionContent {
    pub name: String,
    pub description: String,
    pub specs: Vec<String>,
}

impl From<&SectionDescriptor> for SectionContent {
    fn from(descriptor: &SectionDescriptor) -> Self {
        SectionContent {
            name: descriptor.name.clone(),
            description: descriptor.description.clone(),
            specs: descriptor.specs.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(rotate: Option<AttributeValue>, bgcolor: Option<&str>) -> SectionDescriptor {
        SectionDescriptor {
            model: Some("axe.glb".into()),
            rotate,
            bgcolor: bgcolor.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn section_ids_are_one_indexed_class_names() {
        assert_eq!(SectionId::new(0).to_string(), "model-section-1");
        assert_eq!(SectionId::new(4).to_string(), "model-section-5");
    }

    #[test]
    fn valid_attributes_are_kept() {
        let attrs = SectionAttributes::from_descriptor(
            SectionId::new(0),
            &descriptor(Some(AttributeValue::Text("45".into())), Some("#ff0000")),
            Color::BLACK,
        )
        .unwrap();
        assert_eq!(attrs.model, PathBuf::from("axe.glb"));
        assert_eq!(attrs.rotate_degrees, 45.0);
        assert_eq!(attrs.bgcolor, Color::rgb8(255, 0, 0));
    }

    #[test]
    fn numeric_rotate_is_accepted() {
        let attrs = SectionAttributes::from_descriptor(
            SectionId::new(0),
            &descriptor(Some(AttributeValue::Number(-90.0)), None),
            Color::BLACK,
        )
        .unwrap();
        assert_eq!(attrs.rotate_degrees, -90.0);
        assert_eq!(attrs.bgcolor, Color::BLACK);
    }

    #[test]
    fn descriptor_reads_bare_and_quoted_rotate() {
        let bare: SectionDescriptor = toml::from_str("model = \"axe.glb\"\nrotate = 30").unwrap();
        assert_eq!(bare.rotate, Some(AttributeValue::Number(30.0)));
        assert!(bare.specs.is_empty());

        let quoted: SectionDescriptor =
            toml::from_str("model = \"axe.glb\"\nrotate = \"30\"\nspecs = [\"Oak\"]").unwrap();
        assert_eq!(quoted.rotate, Some(AttributeValue::Text("30".into())));
        assert_eq!(quoted.specs, vec!["Oak".to_string()]);
    }

    #[test]
    fn malformed_attributes_fall_back() {
        for bad in ["abc", "NaN", "inf", ""] {
            let attrs = SectionAttributes::from_descriptor(
                SectionId::new(2),
                &descriptor(Some(AttributeValue::Text(bad.into())), Some("not-a-color")),
                Color::WHITE,
            )
            .unwrap();
            assert_eq!(attrs.rotate_degrees, 0.0, "rotate {:?}", bad);
            assert_eq!(attrs.bgcolor, Color::WHITE);
        }
    }

    #[test]
    fn missing_model_is_rejected() {
        let mut desc = descriptor(None, None);
        desc.model = Some("   ".into());
        let err = SectionAttributes::from_descriptor(SectionId::new(1), &desc, Color::BLACK)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingModel { section: 2 }));
    }
}
