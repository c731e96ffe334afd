use super::tree::{ComparisonNode, ComparisonOperator, FilterTreeNode, LogicalOperator};
use crate::editor::{EditorState, SectionValue, TimeRangeSection};
use crate::time_range::{self, TimeRangeInput, TimeRangeSpec};
use chrono::{DateTime, Utc};

/// Property searched by free text
pub const ANY_TEXT: &str = "anyText";
/// Property searched by location
pub const ANY_GEO: &str = "anyGeo";
/// Property holding a result's data type
pub const DATATYPE: &str = "datatype";
/// Text value that matches everything
pub const MATCH_ALL: &str = "*";

/// Convert editor state into the canonical filter tree
///
/// The root is always an AND. Sources never appear in the tree; they
/// travel beside it in the query request. A state with no predicates
/// yields `AND[ILIKE(anyText, "*")]`.
pub fn to_filter_tree(state: &EditorState) -> FilterTreeNode {
    to_filter_tree_at(state, Utc::now())
}

/// [`to_filter_tree`] with an explicit "now" for unparsable dates
pub fn to_filter_tree_at(state: &EditorState, now: DateTime<Utc>) -> FilterTreeNode {
    let mut filters: Vec<FilterTreeNode> = state
        .iter()
        .filter_map(|(_, value)| section_filter(value, now))
        .collect();

    if filters.is_empty() {
        filters.push(match_all());
    }

    FilterTreeNode::and(filters).unwrap_or_else(|_| match_all())
}

fn match_all() -> FilterTreeNode {
    FilterTreeNode::comparison(ComparisonOperator::ILike, ANY_TEXT, MATCH_ALL)
}

fn section_filter(value: &SectionValue, now: DateTime<Utc>) -> Option<FilterTreeNode> {
    match value {
        SectionValue::Text(text) => Some(FilterTreeNode::comparison(
            ComparisonOperator::ILike,
            ANY_TEXT,
            text.as_str(),
        )),
        SectionValue::TimeRange(section) => time_range_filter(section, now),
        SectionValue::Location(wkt) => Some(FilterTreeNode::comparison(
            ComparisonOperator::Intersects,
            ANY_GEO,
            wkt.as_str(),
        )),
        SectionValue::Datatypes(datatypes) => FilterTreeNode::or(
            datatypes
                .iter()
                .map(|datatype| {
                    FilterTreeNode::comparison(ComparisonOperator::Equals, DATATYPE, datatype.as_str())
                })
                .collect(),
        )
        .ok(),
        SectionValue::Sources(_) => None,
    }
}

fn time_range_filter(section: &TimeRangeSection, now: DateTime<Utc>) -> Option<FilterTreeNode> {
    let spec = time_range::normalize(Some(&section.range), now);
    let Some((operator, value)) = spec.to_comparison() else {
        tracing::debug!(range = ?spec, "time range cannot be expressed as a filter, skipped");
        return None;
    };

    let mut leaves: Vec<FilterTreeNode> = section
        .apply_to
        .iter()
        .map(|property| FilterTreeNode::comparison(operator, property.as_str(), value.clone()))
        .collect();

    match leaves.len() {
        0 => None,
        1 => leaves.pop(),
        _ => FilterTreeNode::or(leaves).ok(),
    }
}

/// Rebuild editor state from a filter tree
///
/// Only the shapes [`to_filter_tree`] produces are recognized; anything
/// else is dropped, so the result may have fewer sections than the tree
/// expressed. Sources are never recovered from the tree alone.
pub fn from_filter_tree(tree: &FilterTreeNode) -> EditorState {
    let children: Vec<&FilterTreeNode> = match tree {
        FilterTreeNode::Logical(root) if root.operator() == LogicalOperator::And => {
            root.filters().iter().collect()
        }
        other => vec![other],
    };

    let mut state = EditorState::new();

    if let [only] = children.as_slice()
        && is_match_all(only)
    {
        return state;
    }

    for child in children {
        match recognize(child) {
            Some(value) if state.contains(value.key()) => {
                tracing::debug!(
                    section = %value.key(),
                    "section already reconstructed, dropping repeated node"
                );
            }
            Some(value) => {
                state.set(value);
            }
            None => {
                tracing::debug!(node = %child, "unrecognized filter node dropped");
            }
        }
    }

    state
}

fn is_match_all(node: &FilterTreeNode) -> bool {
    node.as_comparison().is_some_and(|leaf| {
        leaf.operator == ComparisonOperator::ILike
            && leaf.property == ANY_TEXT
            && leaf.value_str() == Some(MATCH_ALL)
    })
}

fn recognize(node: &FilterTreeNode) -> Option<SectionValue> {
    match node {
        FilterTreeNode::Comparison(leaf) => recognize_leaf(leaf),
        FilterTreeNode::Logical(group) if group.operator() == LogicalOperator::Or => {
            let leaves: Vec<&ComparisonNode> = group
                .filters()
                .iter()
                .map(FilterTreeNode::as_comparison)
                .collect::<Option<_>>()?;
            recognize_datatypes(&leaves).or_else(|| recognize_time_range(&leaves))
        }
        FilterTreeNode::Logical(_) | FilterTreeNode::Unrecognized(_) => None,
    }
}

fn recognize_leaf(leaf: &ComparisonNode) -> Option<SectionValue> {
    match (leaf.operator, leaf.property.as_str()) {
        (ComparisonOperator::ILike, ANY_TEXT) => {
            leaf.value_str().map(|text| SectionValue::Text(text.to_string()))
        }
        (ComparisonOperator::Intersects, ANY_GEO) => {
            leaf.value_str().map(|wkt| SectionValue::Location(wkt.to_string()))
        }
        (ComparisonOperator::Equals, DATATYPE) => recognize_datatypes(&[leaf]),
        (operator, _) if operator.is_temporal() => recognize_time_range(&[leaf]),
        _ => None,
    }
}

fn recognize_datatypes(leaves: &[&ComparisonNode]) -> Option<SectionValue> {
    leaves
        .iter()
        .map(|leaf| {
            (leaf.operator == ComparisonOperator::Equals && leaf.property == DATATYPE)
                .then(|| leaf.value_str().map(str::to_string))
                .flatten()
        })
        .collect::<Option<Vec<String>>>()
        .map(SectionValue::Datatypes)
}

/// Leaves sharing one temporal operator and value, each on its own property
fn recognize_time_range(leaves: &[&ComparisonNode]) -> Option<SectionValue> {
    let first = leaves.first()?;
    if !first.operator.is_temporal() {
        return None;
    }
    let shared = |leaf: &&ComparisonNode| {
        leaf.operator == first.operator && leaf.value == first.value && !leaf.property.is_empty()
    };
    if !leaves.iter().all(shared) {
        return None;
    }

    let spec = TimeRangeSpec::from_comparison(first.operator, &first.value)?;
    let apply_to = leaves.iter().map(|leaf| leaf.property.clone()).collect();
    Some(SectionValue::TimeRange(TimeRangeSection::new(
        TimeRangeInput::from(&spec),
        apply_to,
    )))
}
