//! Result forms: named attribute sets chosen through a transfer list
//!
//! The attribute selection lives in a [`HistoryManager`] so every transfer
//! move can be undone and redone.

mod transfer;

pub use transfer::{AttributeSet, TransferView, VisibilityFilter};

use crate::history::HistoryManager;
use crate::validation::ErrorSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

const TITLE_NOT_STRING: &str = "Title must be string";
const TITLE_EMPTY: &str = "Title must not be empty";
const DESCRIPTION_NOT_STRING: &str = "Description must be string";
const ATTRIBUTES_EMPTY: &str = "Attributes cannot be empty";

/// Fields a result-form save can fail on
pub const RESULT_FORM_FIELDS: [&str; 2] = ["title", "attributes"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub attributes: AttributeSet,
}

impl ResultForm {
    pub fn validate(&self) -> ErrorSet {
        let mut errors = ErrorSet::new();

        match self.title.as_deref() {
            None => errors.insert("title", TITLE_NOT_STRING),
            Some(title) if title.trim().is_empty() => errors.insert("title", TITLE_EMPTY),
            Some(_) => {}
        }

        if self.attributes.is_empty() {
            errors.insert("attributes", ATTRIBUTES_EMPTY);
        }

        errors
    }
}

/// Validate a result form as posted by the UI, before it is typed
///
/// Checks that `title` is a non-blank string, that `description`, when
/// present, is a string, and that `attributes` holds at least one name.
pub fn validate_result_form(form: &Value) -> ErrorSet {
    let mut errors = ErrorSet::new();

    match form.get("title") {
        Some(Value::String(title)) if title.trim().is_empty() => {
            errors.insert("title", TITLE_EMPTY);
        }
        Some(Value::String(_)) => {}
        _ => errors.insert("title", TITLE_NOT_STRING),
    }

    if let Some(description) = form.get("description")
        && !description.is_string()
    {
        errors.insert("description", DESCRIPTION_NOT_STRING);
    }

    let attributes: BTreeSet<String> = match form.get("attributes") {
        Some(Value::Array(values)) => values.iter().map(|v| v.to_string()).collect(),
        _ => BTreeSet::new(),
    };
    if attributes.is_empty() {
        errors.insert("attributes", ATTRIBUTES_EMPTY);
    }

    errors
}

/// Editing session for one result form
#[derive(Debug, Clone)]
pub struct ResultFormEditor {
    pub title: String,
    pub description: String,
    attributes: HistoryManager<AttributeSet>,
    touched: BTreeSet<String>,
}

impl ResultFormEditor {
    pub fn new(form: Option<&ResultForm>) -> Self {
        let form = form.cloned().unwrap_or_default();
        Self {
            title: form.title.unwrap_or_default(),
            description: form.description.unwrap_or_default(),
            attributes: HistoryManager::new(form.attributes),
            touched: BTreeSet::new(),
        }
    }

    pub fn attributes(&self) -> &AttributeSet {
        self.attributes.present()
    }

    pub fn history(&self) -> &HistoryManager<AttributeSet> {
        &self.attributes
    }

    /// Record a new attribute selection; equal selections are not recorded
    pub fn set_attributes(&mut self, attributes: AttributeSet) -> bool {
        self.attributes.set(attributes)
    }

    pub fn undo(&mut self) -> bool {
        self.attributes.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.attributes.redo()
    }

    pub fn touch(&mut self, field: &str) {
        self.touched.insert(field.to_string());
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    /// Errors for the current values, shown or not
    pub fn errors(&self) -> ErrorSet {
        self.current().validate()
    }

    /// Errors of the fields the user has touched
    pub fn visible_errors(&self) -> ErrorSet {
        self.errors()
            .iter()
            .filter(|(field, _)| self.is_touched(field))
            .map(|(field, message)| (field.clone(), message.clone()))
            .collect()
    }

    /// The form to persist, or every error once all fields are marked touched
    pub fn save(&mut self) -> Result<ResultForm, ErrorSet> {
        let errors = self.errors();
        if errors.is_empty() {
            return Ok(self.current());
        }
        for field in RESULT_FORM_FIELDS {
            self.touch(field);
        }
        tracing::debug!(errors = ?errors, "result form save blocked");
        Err(errors)
    }

    fn current(&self) -> ResultForm {
        ResultForm {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            attributes: self.attributes.present().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_result_form_json_messages() {
        let errors = validate_result_form(&json!({"title": 3, "description": 4}));
        assert_eq!(errors.get("title"), Some(TITLE_NOT_STRING));
        assert_eq!(errors.get("description"), Some(DESCRIPTION_NOT_STRING));
        assert_eq!(errors.get("attributes"), Some(ATTRIBUTES_EMPTY));

        let errors = validate_result_form(&json!({"title": "  ", "attributes": ["id"]}));
        assert_eq!(errors.get("title"), Some(TITLE_EMPTY));
        assert_eq!(errors.len(), 1);

        assert!(validate_result_form(&json!({"title": "t", "attributes": ["id", "id"]})).is_empty());
    }

    #[test]
    fn test_typed_validate() {
        let form = ResultForm {
            title: Some("Example".to_string()),
            description: None,
            attributes: ["id"].into_iter().collect(),
        };
        assert!(form.validate().is_empty());

        let errors = ResultForm::default().validate();
        assert_eq!(errors.get("title"), Some(TITLE_NOT_STRING));
        assert_eq!(errors.get("attributes"), Some(ATTRIBUTES_EMPTY));
    }

    #[test]
    fn test_save_marks_fields_touched_on_failure() {
        let mut editor = ResultFormEditor::new(None);
        assert!(editor.visible_errors().is_empty());

        let errors = editor.save().unwrap_err();
        assert_eq!(errors.get("title"), Some(TITLE_EMPTY));
        assert!(editor.is_touched("title"));
        assert!(editor.is_touched("attributes"));
        assert_eq!(editor.visible_errors(), errors);
    }

    #[test]
    fn test_attribute_history() {
        let mut editor = ResultFormEditor::new(Some(&ResultForm {
            title: Some("Example".to_string()),
            description: Some("Example Description".to_string()),
            attributes: ["id"].into_iter().collect(),
        }));

        let next = editor.attributes().union(["title"]);
        assert!(editor.set_attributes(next.clone()));
        assert!(!editor.set_attributes(next));
        assert_eq!(editor.history().past().len(), 1);

        assert!(editor.undo());
        assert_eq!(editor.attributes().to_vec(), vec!["id"]);
        assert!(editor.redo());

        let saved = editor.save().unwrap();
        assert_eq!(saved.attributes.to_vec(), vec!["id", "title"]);
        assert_eq!(saved.description.as_deref(), Some("Example Description"));
    }
}
