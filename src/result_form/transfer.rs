use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::collections::btree_set;

/// Immutable set of attribute names with value equality
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet(BTreeSet<String>);

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.0.contains(attribute)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.0.iter()
    }

    /// New set holding everything in `self` and `attributes`
    pub fn union<I, S>(&self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut next = self.0.clone();
        next.extend(attributes.into_iter().map(|a| a.as_ref().to_string()));
        Self(next)
    }

    /// New set holding everything in `self` except `attributes`
    pub fn subtract<I, S>(&self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut next = self.0.clone();
        for attribute in attributes {
            next.remove(attribute.as_ref());
        }
        Self(next)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Matches catalogue entries against what the user typed in a list filter
///
/// The text is tried as a regular expression; if it does not compile it
/// is matched literally.
#[derive(Debug, Clone)]
pub enum VisibilityFilter {
    Pattern(Regex),
    Literal(String),
}

impl VisibilityFilter {
    pub fn new(text: &str) -> Self {
        match Regex::new(text) {
            Ok(pattern) => VisibilityFilter::Pattern(pattern),
            Err(_) => VisibilityFilter::Literal(text.to_string()),
        }
    }

    pub fn matches(&self, attribute: &str) -> bool {
        match self {
            VisibilityFilter::Pattern(pattern) => pattern.is_match(attribute),
            VisibilityFilter::Literal(text) => attribute.contains(text.as_str()),
        }
    }
}

/// Catalogue split into the selected and available columns of a transfer list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferView {
    pub selected: Vec<String>,
    pub available: Vec<String>,
    pub selected_visible: Vec<String>,
    pub available_visible: Vec<String>,
}

impl TransferView {
    /// Partition `catalogue` by `state`, keeping catalogue order
    pub fn new(
        catalogue: &[String],
        state: &AttributeSet,
        selected_text: &str,
        available_text: &str,
    ) -> Self {
        let (selected, available): (Vec<String>, Vec<String>) = catalogue
            .iter()
            .cloned()
            .partition(|attribute| state.contains(attribute));

        let selected_filter = VisibilityFilter::new(selected_text);
        let available_filter = VisibilityFilter::new(available_text);

        let selected_visible = selected
            .iter()
            .filter(|a| selected_filter.matches(a))
            .cloned()
            .collect();
        let available_visible = available
            .iter()
            .filter(|a| available_filter.matches(a))
            .cloned()
            .collect();

        Self {
            selected,
            available,
            selected_visible,
            available_visible,
        }
    }

    /// Move every visible available attribute into the selection
    pub fn add_visible(&self, state: &AttributeSet) -> Option<AttributeSet> {
        if self.available_visible.is_empty() {
            return None;
        }
        Some(state.union(&self.available_visible))
    }

    /// Exchange the visible selected attributes for the visible available ones
    pub fn swap_visible(&self, state: &AttributeSet) -> Option<AttributeSet> {
        if self.selected_visible.is_empty() && self.available_visible.is_empty() {
            return None;
        }
        Some(
            state
                .subtract(&self.selected_visible)
                .union(&self.available_visible),
        )
    }

    /// Drop every visible selected attribute from the selection
    pub fn remove_visible(&self, state: &AttributeSet) -> Option<AttributeSet> {
        if self.selected_visible.is_empty() {
            return None;
        }
        Some(state.subtract(&self.selected_visible))
    }
}
