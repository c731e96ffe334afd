//! Query requests handed to the search backend
//!
//! The form is responsible for the filter tree and the source list; every
//! other request field comes from [`QueryDefaults`].

use crate::config::{FormConfig, QueryDefaults};
use crate::editor::{EditorState, SectionValue};
use crate::filter::{FilterTreeNode, from_filter_tree, to_filter_tree};
use crate::validation::{self, EditorErrors};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub attribute: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub srcs: Vec<String>,
    /// 1-based offset of the first result
    pub start: usize,
    pub count: usize,
    pub filter_tree: FilterTreeNode,
    pub sorts: Vec<Sort>,
    pub id: String,
    pub spellcheck: bool,
    pub phonetics: bool,
    pub batch_id: String,
}

impl QueryRequest {
    pub fn new(filter_tree: FilterTreeNode, srcs: Vec<String>, defaults: &QueryDefaults) -> Self {
        Self {
            srcs,
            start: defaults.start,
            count: defaults.count,
            filter_tree,
            sorts: defaults.sorts.clone(),
            id: defaults.id.clone().unwrap_or_else(new_request_id),
            spellcheck: defaults.spellcheck,
            phonetics: defaults.phonetics,
            batch_id: defaults.batch_id.clone().unwrap_or_else(new_request_id),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_batch_id(mut self, batch_id: impl Into<String>) -> Self {
        self.batch_id = batch_id.into();
        self
    }
}

fn new_request_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Search form has errors in {} section(s)", .0.len())]
    Invalid(EditorErrors),
}

impl SubmitError {
    pub fn errors(&self) -> &EditorErrors {
        match self {
            SubmitError::Invalid(errors) => errors,
        }
    }
}

/// Validate the current state and, if every section passes, build the request
///
/// Sources come from the sources section, or from the configured defaults
/// when that section is off.
pub fn submit(state: &EditorState, config: &FormConfig) -> Result<QueryRequest, SubmitError> {
    let errors = validation::validate(state);
    if !errors.is_empty() {
        tracing::warn!(sections = errors.len(), "submit blocked by validation errors");
        return Err(SubmitError::Invalid(errors));
    }

    validation::warn_unknown_time_properties(state, &config.sections);

    let srcs = state
        .sources()
        .map(<[String]>::to_vec)
        .unwrap_or_else(|| config.sections.sources.clone());
    let request = QueryRequest::new(to_filter_tree(state), srcs, &config.query);

    tracing::info!(
        id = %request.id,
        sources = request.srcs.len(),
        leaves = request.filter_tree.leaf_count(),
        "query request built"
    );
    Ok(request)
}

/// Rebuild the full editor state, sources included, from a request
pub fn from_query_request(request: &QueryRequest) -> EditorState {
    from_filter_tree(&request.filter_tree).with(SectionValue::Sources(request.srcs.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::SectionKey;
    use serde_json::json;

    #[test]
    fn test_submit_blocks_invalid_state() {
        let state = EditorState::new()
            .with(SectionValue::Text("foo".to_string()))
            .with(SectionValue::Datatypes(Vec::new()));

        let err = submit(&state, &FormConfig::default()).unwrap_err();
        let errors = err.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors.get(SectionKey::Datatypes).is_some());
        assert!(errors.get(SectionKey::Text).is_none());
    }

    #[test]
    fn test_submit_uses_default_sources_when_section_off() {
        let state = EditorState::new().with(SectionValue::Text("foo".to_string()));
        let request = submit(&state, &FormConfig::default()).unwrap();
        assert_eq!(request.srcs, vec!["ddf.distribution", "cache"]);
        assert_eq!(request.start, 1);
        assert_eq!(request.count, 250);
        assert_eq!(request.id.len(), 32);
        assert_ne!(request.id, request.batch_id);
    }

    #[test]
    fn test_request_wire_shape() {
        let mut defaults = QueryDefaults::default();
        defaults.id = Some("313a84858daa4ef5980d4b11a745d6d3".to_string());
        defaults.batch_id = Some("5a3f400c2e1e410e8d37494500173ca4".to_string());
        let tree = FilterTreeNode::and(vec![FilterTreeNode::comparison(
            crate::filter::ComparisonOperator::ILike,
            "anyText",
            "foo",
        )])
        .unwrap();

        let request = QueryRequest::new(tree, vec!["cache".to_string()], &defaults);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "srcs": ["cache"],
                "start": 1,
                "count": 250,
                "filterTree": {
                    "type": "AND",
                    "filters": [{"type": "ILIKE", "property": "anyText", "value": "foo"}]
                },
                "sorts": [{"attribute": "modified", "direction": "descending"}],
                "id": "313a84858daa4ef5980d4b11a745d6d3",
                "spellcheck": false,
                "phonetics": false,
                "batchId": "5a3f400c2e1e410e8d37494500173ca4"
            })
        );
    }

    #[test]
    fn test_from_query_request_recovers_sources() {
        let state = EditorState::new()
            .with(SectionValue::Text("foo".to_string()))
            .with(SectionValue::Sources(vec!["cache".to_string()]));
        let request = submit(&state, &FormConfig::default()).unwrap();
        assert_eq!(from_query_request(&request), state);
    }
}
