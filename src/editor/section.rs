use super::EditorStateError;
use crate::config::SectionDefaults;
use crate::time_range::{self, RelativeUnit, TimeRangeInput};
use crate::validation::{self, SectionErrors};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The independently editable slices of the search form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKey {
    Text,
    TimeRange,
    Location,
    Datatypes,
    Sources,
}

impl FromStr for SectionKey {
    type Err = EditorStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(SectionKey::Text),
            "timerange" | "time" => Ok(SectionKey::TimeRange),
            "location" | "geo" => Ok(SectionKey::Location),
            "datatypes" | "types" | "type" => Ok(SectionKey::Datatypes),
            "sources" | "srcs" | "src" => Ok(SectionKey::Sources),
            _ => Err(EditorStateError::UnknownSection(s.to_string())),
        }
    }
}

impl SectionKey {
    pub const ALL: [SectionKey; 5] = [
        SectionKey::Text,
        SectionKey::TimeRange,
        SectionKey::Location,
        SectionKey::Datatypes,
        SectionKey::Sources,
    ];

    /// Key used in serialized editor state
    pub fn canonical_name(&self) -> &'static str {
        match self {
            SectionKey::Text => "text",
            SectionKey::TimeRange => "timeRange",
            SectionKey::Location => "location",
            SectionKey::Datatypes => "datatypes",
            SectionKey::Sources => "sources",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SectionKey::Text => "Text",
            SectionKey::TimeRange => "Time Range",
            SectionKey::Location => "Location",
            SectionKey::Datatypes => "Match Types",
            SectionKey::Sources => "Sources",
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// A time range plus the time properties it constrains
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRangeSection {
    #[serde(flatten)]
    pub range: TimeRangeInput,
    #[serde(rename = "applyTo", default)]
    pub apply_to: Vec<String>,
}

impl TimeRangeSection {
    pub fn new(range: TimeRangeInput, apply_to: Vec<String>) -> Self {
        Self { range, apply_to }
    }
}

/// Value of one section; the variant determines the section key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionValue {
    Text(String),
    TimeRange(TimeRangeSection),
    /// WKT geometry
    Location(String),
    Datatypes(Vec<String>),
    Sources(Vec<String>),
}

impl SectionValue {
    pub fn key(&self) -> SectionKey {
        match self {
            SectionValue::Text(_) => SectionKey::Text,
            SectionValue::TimeRange(_) => SectionKey::TimeRange,
            SectionValue::Location(_) => SectionKey::Location,
            SectionValue::Datatypes(_) => SectionKey::Datatypes,
            SectionValue::Sources(_) => SectionKey::Sources,
        }
    }

    /// Run the validator registered for this section
    pub fn validate(&self) -> SectionErrors {
        match self {
            SectionValue::Text(text) => SectionErrors::Fields(validation::validate_text(text)),
            SectionValue::TimeRange(section) => SectionErrors::TimeRange {
                time_range_errors: time_range::validate(&section.range),
                attribute_selector_errors: validation::validate_attribute_selector(
                    &section.apply_to,
                ),
            },
            SectionValue::Location(wkt) => {
                SectionErrors::Fields(validation::validate_location(wkt))
            }
            SectionValue::Datatypes(datatypes) => {
                SectionErrors::Fields(validation::validate_match_types(datatypes))
            }
            SectionValue::Sources(sources) => {
                SectionErrors::Fields(validation::validate_sources(sources))
            }
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            SectionValue::Text(text) | SectionValue::Location(text) => Value::String(text.clone()),
            SectionValue::TimeRange(section) => {
                serde_json::to_value(section).unwrap_or(Value::Null)
            }
            SectionValue::Datatypes(values) | SectionValue::Sources(values) => {
                Value::Array(values.iter().cloned().map(Value::String).collect())
            }
        }
    }

    pub fn from_json(key: SectionKey, value: Value) -> Result<Self, EditorStateError> {
        let invalid = |source| EditorStateError::InvalidSection { key, source };
        Ok(match key {
            SectionKey::Text => SectionValue::Text(serde_json::from_value(value).map_err(invalid)?),
            SectionKey::TimeRange => {
                SectionValue::TimeRange(serde_json::from_value(value).map_err(invalid)?)
            }
            SectionKey::Location => {
                SectionValue::Location(serde_json::from_value(value).map_err(invalid)?)
            }
            SectionKey::Datatypes => {
                SectionValue::Datatypes(serde_json::from_value(value).map_err(invalid)?)
            }
            SectionKey::Sources => {
                SectionValue::Sources(serde_json::from_value(value).map_err(invalid)?)
            }
        })
    }
}

/// One registry row
#[derive(Debug, Clone, PartialEq)]
pub struct SectionEntry {
    pub key: SectionKey,
    pub label: &'static str,
    /// `None` when the section has no meaningful default
    pub default_value: Option<SectionValue>,
}

impl SectionEntry {
    /// Run this row's validator; a value of another section kind is an error
    pub fn validate(&self, value: &SectionValue) -> SectionErrors {
        if value.key() != self.key {
            return SectionErrors::Fields(
                [(
                    self.key.canonical_name(),
                    format!("Value belongs to section '{}'", value.key()),
                )]
                .into_iter()
                .collect(),
            );
        }
        value.validate()
    }
}

/// Default values and validators for every section kind
///
/// Adding a section and validating it both go through here, so the value
/// inserted by "add filter" always has the shape its validator expects.
#[derive(Debug, Clone, Copy)]
pub struct SectionRegistry<'a> {
    defaults: &'a SectionDefaults,
}

impl<'a> SectionRegistry<'a> {
    pub fn new(defaults: &'a SectionDefaults) -> Self {
        Self { defaults }
    }

    pub fn get(&self, key: SectionKey) -> SectionEntry {
        SectionEntry {
            key,
            label: key.label(),
            default_value: self.default_value(key),
        }
    }

    pub fn entries(&self) -> Vec<SectionEntry> {
        SectionKey::ALL.iter().map(|key| self.get(*key)).collect()
    }

    pub fn default_value(&self, key: SectionKey) -> Option<SectionValue> {
        match key {
            SectionKey::Text => Some(SectionValue::Text(String::new())),
            SectionKey::TimeRange => Some(SectionValue::TimeRange(TimeRangeSection::new(
                TimeRangeInput::relative("", RelativeUnit::Days.as_str()),
                vec![self.defaults.time_property.clone()],
            ))),
            SectionKey::Location => None,
            SectionKey::Datatypes => Some(SectionValue::Datatypes(Vec::new())),
            SectionKey::Sources => Some(SectionValue::Sources(self.defaults.sources.clone())),
        }
    }
}
