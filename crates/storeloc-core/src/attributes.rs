use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One host-element attribute, as the host page would set it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeEntry {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl AttributeEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse `name=value`. A bare `name` is an attribute with an empty value.
    #[must_use]
    pub fn parse_pair(raw: &str) -> Option<Self> {
        let (name, value) = raw.split_once('=').unwrap_or((raw, ""));
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self::new(name, value))
    }
}

/// Attributes in document order; later entries win over earlier aliases.
#[derive(Debug, Default, Deserialize)]
pub struct AttributesFile {
    #[serde(default)]
    pub attributes: Vec<AttributeEntry>,
}

/// Load host attributes from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed.
pub fn load_attributes(path: &Path) -> Result<AttributesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::AttributesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: AttributesFile =
        serde_yaml::from_str(&content).map_err(ConfigError::AttributesFileParse)?;

    let blank = file
        .attributes
        .iter()
        .filter(|a| a.name.trim().is_empty())
        .count();
    if blank > 0 {
        tracing::warn!(blank, "ignoring attributes with empty names");
    }

    Ok(AttributesFile {
        attributes: file
            .attributes
            .into_iter()
            .filter(|a| !a.name.trim().is_empty())
            .collect(),
    })
}
