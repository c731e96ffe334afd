//! Section-keyed editor state
//!
//! The search form is a set of independently edited sections. A key present
//! in [`EditorState`] always carries a value shaped for that section;
//! removing the key is how a section is turned off.

mod section;

pub use section::{SectionEntry, SectionKey, SectionRegistry, SectionValue, TimeRangeSection};

use crate::time_range::{self, TimeRangeInput};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorStateError {
    #[error(
        "Unknown section: '{0}'. Valid sections are: text, timeRange, location, datatypes, sources"
    )]
    UnknownSection(String),

    #[error("Invalid value for section '{key}': {source}")]
    InvalidSection {
        key: SectionKey,
        #[source]
        source: serde_json::Error,
    },

    #[error("Editor state must be an object, got: {0}")]
    NotAnObject(String),

    #[error("Failed to parse editor state: {0}")]
    Syntax(String),
}

/// Section values in insertion order; equality ignores order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IndexMap<String, Value>", into = "IndexMap<String, Value>")]
pub struct EditorState {
    sections: IndexMap<SectionKey, SectionValue>,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn contains(&self, key: SectionKey) -> bool {
        self.sections.contains_key(&key)
    }

    pub fn get(&self, key: SectionKey) -> Option<&SectionValue> {
        self.sections.get(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = SectionKey> + '_ {
        self.sections.keys().copied()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, SectionKey, SectionValue> {
        self.sections.iter()
    }

    /// Set a section's value, returning the previous one
    pub fn set(&mut self, value: SectionValue) -> Option<SectionValue> {
        self.sections.insert(value.key(), value)
    }

    /// Builder-style [`EditorState::set`]
    pub fn with(mut self, value: SectionValue) -> Self {
        self.set(value);
        self
    }

    /// Turn a section on with its registered default
    ///
    /// A section already present keeps its value. A section without a
    /// registered default is left off. Returns whether a value was inserted.
    pub fn add_section(&mut self, key: SectionKey, registry: &SectionRegistry<'_>) -> bool {
        if self.contains(key) {
            return false;
        }
        match registry.default_value(key) {
            Some(value) => {
                self.sections.insert(key, value);
                true
            }
            None => {
                tracing::debug!(section = %key, "section has no default value, not added");
                false
            }
        }
    }

    /// Turn a section off
    pub fn remove_section(&mut self, key: SectionKey) -> Option<SectionValue> {
        self.sections.shift_remove(&key)
    }

    pub fn text(&self) -> Option<&str> {
        match self.get(SectionKey::Text) {
            Some(SectionValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn time_range(&self) -> Option<&TimeRangeSection> {
        match self.get(SectionKey::TimeRange) {
            Some(SectionValue::TimeRange(section)) => Some(section),
            _ => None,
        }
    }

    pub fn location(&self) -> Option<&str> {
        match self.get(SectionKey::Location) {
            Some(SectionValue::Location(wkt)) => Some(wkt),
            _ => None,
        }
    }

    pub fn datatypes(&self) -> Option<&[String]> {
        match self.get(SectionKey::Datatypes) {
            Some(SectionValue::Datatypes(datatypes)) => Some(datatypes),
            _ => None,
        }
    }

    pub fn sources(&self) -> Option<&[String]> {
        match self.get(SectionKey::Sources) {
            Some(SectionValue::Sources(sources)) => Some(sources),
            _ => None,
        }
    }

    /// Copy of this state with its time range in the normalizer's form
    pub fn normalized(&self, now: DateTime<Utc>) -> Self {
        let mut state = self.clone();
        if let Some(SectionValue::TimeRange(section)) = state.sections.get_mut(&SectionKey::TimeRange)
        {
            let spec = time_range::normalize(Some(&section.range), now);
            section.range = TimeRangeInput::from(&spec);
        }
        state
    }

    /// Parse editor state from JSON5 text
    pub fn parse(input: &str) -> Result<Self, EditorStateError> {
        let raw: IndexMap<String, Value> =
            json5::from_str(input).map_err(|e| EditorStateError::Syntax(e.to_string()))?;
        Self::try_from(raw)
    }

    pub fn from_json(value: Value) -> Result<Self, EditorStateError> {
        match value {
            Value::Object(map) => Self::try_from(map.into_iter().collect::<IndexMap<_, _>>()),
            other => Err(EditorStateError::NotAnObject(other.to_string())),
        }
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.sections
                .iter()
                .map(|(key, value)| (key.canonical_name().to_string(), value.to_json()))
                .collect(),
        )
    }
}

impl TryFrom<IndexMap<String, Value>> for EditorState {
    type Error = EditorStateError;

    fn try_from(raw: IndexMap<String, Value>) -> Result<Self, Self::Error> {
        let mut state = EditorState::new();
        for (name, value) in raw {
            let key: SectionKey = name.parse()?;
            state.set(SectionValue::from_json(key, value)?);
        }
        Ok(state)
    }
}

impl From<EditorState> for IndexMap<String, Value> {
    fn from(state: EditorState) -> Self {
        state
            .sections
            .into_iter()
            .map(|(key, value)| (key.canonical_name().to_string(), value.to_json()))
            .collect()
    }
}

impl FromIterator<SectionValue> for EditorState {
    fn from_iter<I: IntoIterator<Item = SectionValue>>(iter: I) -> Self {
        let mut state = EditorState::new();
        for value in iter {
            state.set(value);
        }
        state
    }
}
