use crate::query::{Sort, SortDirection};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub query: QueryDefaults,
    pub sections: SectionDefaults,
}

/// Request fields the form does not edit
///
/// `id` and `batch_id` are generated per request unless given here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryDefaults {
    pub start: usize,
    pub count: usize,
    pub sorts: Vec<Sort>,
    pub spellcheck: bool,
    pub phonetics: bool,
    pub id: Option<String>,
    pub batch_id: Option<String>,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            start: 1,
            count: 250,
            sorts: vec![Sort {
                attribute: "modified".to_string(),
                direction: SortDirection::Descending,
            }],
            spellcheck: false,
            phonetics: false,
            id: None,
            batch_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionDefaults {
    /// Sources queried when the sources section is off, and its default
    pub sources: Vec<String>,
    /// Property a new time range section applies to
    pub time_property: String,
    /// Known time properties; others only produce a warning
    pub time_properties: Vec<String>,
}

impl Default for SectionDefaults {
    fn default() -> Self {
        Self {
            sources: vec!["ddf.distribution".to_string(), "cache".to_string()],
            time_property: "modified".to_string(),
            time_properties: [
                "created",
                "datetime.end",
                "datetime.start",
                "effective",
                "expiration",
                "metacard.created",
                "metacard.modified",
                "metacard.version.versioned-on",
                "modified",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<FormConfig, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_config().clone())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<FormConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    toml::from_str::<FormConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })
}

pub fn default_config() -> &'static FormConfig {
    static DEFAULT_CONFIG: LazyLock<FormConfig> = LazyLock::new(FormConfig::default);
    &DEFAULT_CONFIG
}
