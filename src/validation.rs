//! Section validators and the top-level editor validation
//!
//! Every failure is data: an [`ErrorSet`] maps a field name to a message,
//! and an empty set means the field group is valid. Errors stay scoped to
//! the section they came from.

use crate::config::SectionDefaults;
use crate::editor::{EditorState, SectionKey, SectionValue};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::sync::LazyLock;

static WKT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(POINT|LINESTRING|POLYGON|MULTIPOINT|MULTILINESTRING|MULTIPOLYGON|GEOMETRYCOLLECTION)\s*\(.*\)\s*$",
    )
    .expect("valid wkt regex")
});

/// Field name to message; empty when the fields are valid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorSet(BTreeMap<String, String>);

impl ErrorSet {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Record a message for `field`, replacing any earlier one
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ErrorSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(field, message)| (field.into(), message.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a ErrorSet {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Errors of one editor section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SectionErrors {
    Fields(ErrorSet),
    /// The range and the properties it applies to are reported apart
    #[serde(rename_all = "camelCase")]
    TimeRange {
        time_range_errors: ErrorSet,
        attribute_selector_errors: ErrorSet,
    },
}

impl SectionErrors {
    pub fn is_empty(&self) -> bool {
        match self {
            SectionErrors::Fields(errors) => errors.is_empty(),
            SectionErrors::TimeRange {
                time_range_errors,
                attribute_selector_errors,
            } => time_range_errors.is_empty() && attribute_selector_errors.is_empty(),
        }
    }

    /// Flatten into `(group, field, message)` rows for display
    pub fn rows(&self) -> Vec<(Option<&'static str>, &str, &str)> {
        match self {
            SectionErrors::Fields(errors) => errors
                .iter()
                .map(|(field, message)| (None, field.as_str(), message.as_str()))
                .collect(),
            SectionErrors::TimeRange {
                time_range_errors,
                attribute_selector_errors,
            } => time_range_errors
                .iter()
                .map(|(field, message)| (Some("timeRangeErrors"), field.as_str(), message.as_str()))
                .chain(attribute_selector_errors.iter().map(|(field, message)| {
                    (
                        Some("attributeSelectorErrors"),
                        field.as_str(),
                        message.as_str(),
                    )
                }))
                .collect(),
        }
    }
}

/// Errors of every present section that failed validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EditorErrors(IndexMap<SectionKey, SectionErrors>);

impl EditorErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: SectionKey) -> Option<&SectionErrors> {
        self.0.get(&key)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, SectionKey, SectionErrors> {
        self.0.iter()
    }
}

/// Validate every section present in `state`
///
/// Absent sections are not in use and contribute nothing; a section only
/// appears in the result when it has at least one error.
pub fn validate(state: &EditorState) -> EditorErrors {
    EditorErrors(
        state
            .iter()
            .map(|(key, value)| (*key, value.validate()))
            .filter(|(_, errors)| !errors.is_empty())
            .collect(),
    )
}

pub fn validate_attribute_selector(attributes: &[String]) -> ErrorSet {
    let mut errors = ErrorSet::new();
    if attributes.is_empty() {
        errors.insert("applyTo", "Must choose at least one attribute");
    }
    errors
}

pub fn validate_match_types(datatypes: &[String]) -> ErrorSet {
    let mut errors = ErrorSet::new();
    if datatypes.is_empty() {
        errors.insert("datatypes", "Must choose at least one type to match against");
    }
    errors
}

pub fn validate_text(text: &str) -> ErrorSet {
    let mut errors = ErrorSet::new();
    if text.trim().is_empty() {
        errors.insert("text", "Text must not be empty");
    }
    errors
}

pub fn validate_location(wkt: &str) -> ErrorSet {
    let mut errors = ErrorSet::new();
    if wkt.trim().is_empty() {
        errors.insert("location", "Location must not be empty");
    } else if !WKT_RE.is_match(wkt) {
        errors.insert("location", "Location must be a WKT geometry");
    }
    errors
}

pub fn validate_sources(sources: &[String]) -> ErrorSet {
    let mut errors = ErrorSet::new();
    if sources.is_empty() {
        errors.insert("sources", "Must choose at least one source");
    }
    errors
}

/// Log the time-range properties that fall outside the configured vocabulary
///
/// These are not errors: the backend may know attributes the form does not.
pub fn warn_unknown_time_properties(state: &EditorState, defaults: &SectionDefaults) -> Vec<String> {
    let Some(SectionValue::TimeRange(section)) = state.get(SectionKey::TimeRange) else {
        return Vec::new();
    };

    let unknown: Vec<String> = section
        .apply_to
        .iter()
        .filter(|property| !defaults.time_properties.contains(property))
        .cloned()
        .collect();

    for property in &unknown {
        tracing::warn!(
            property = %property,
            known = ?defaults.time_properties,
            "time range applied to an unknown time property"
        );
    }

    unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_types() {
        assert_eq!(
            validate_match_types(&[]).get("datatypes"),
            Some("Must choose at least one type to match against")
        );
        assert!(validate_match_types(&["Text".to_string()]).is_empty());
    }

    #[test]
    fn test_attribute_selector() {
        assert_eq!(
            validate_attribute_selector(&[]).get("applyTo"),
            Some("Must choose at least one attribute")
        );
        assert!(validate_attribute_selector(&["created".to_string()]).is_empty());
    }

    #[test]
    fn test_location_requires_wkt() {
        assert!(validate_location("POINT(1 2)").is_empty());
        assert!(validate_location("polygon ((0 0, 1 0, 1 1, 0 0))").is_empty());
        assert_eq!(
            validate_location("  ").get("location"),
            Some("Location must not be empty")
        );
        assert_eq!(
            validate_location("somewhere").get("location"),
            Some("Location must be a WKT geometry")
        );
    }

    #[test]
    fn test_empty_state_has_no_errors() {
        assert!(validate(&EditorState::new()).is_empty());
    }

    #[test]
    fn test_error_set_serializes_as_plain_map() {
        let errors: ErrorSet = [("title", "Title must not be empty")].into_iter().collect();
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({"title": "Title must not be empty"})
        );
    }
}
