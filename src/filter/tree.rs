use super::error::FilterTreeError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Boolean combinator of a logical node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOperator {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

impl LogicalOperator {
    pub const ALL: [LogicalOperator; 2] = [LogicalOperator::And, LogicalOperator::Or];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
        }
    }
}

/// Operator of a comparison leaf, serialized with the backend's `type` names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = "ILIKE")]
    ILike,
    #[serde(rename = "EQUALS")]
    Equals,
    #[serde(rename = "BEFORE")]
    Before,
    #[serde(rename = "AFTER")]
    After,
    #[serde(rename = "DURING")]
    During,
    /// Relative time offset, written as `=` on the wire
    #[serde(rename = "=")]
    Relative,
    #[serde(rename = "INTERSECTS")]
    Intersects,
}

impl ComparisonOperator {
    pub const ALL: [ComparisonOperator; 7] = [
        ComparisonOperator::ILike,
        ComparisonOperator::Equals,
        ComparisonOperator::Before,
        ComparisonOperator::After,
        ComparisonOperator::During,
        ComparisonOperator::Relative,
        ComparisonOperator::Intersects,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::ILike => "ILIKE",
            ComparisonOperator::Equals => "EQUALS",
            ComparisonOperator::Before => "BEFORE",
            ComparisonOperator::After => "AFTER",
            ComparisonOperator::During => "DURING",
            ComparisonOperator::Relative => "=",
            ComparisonOperator::Intersects => "INTERSECTS",
        }
    }

    /// Returns `true` for the operators a time range section resolves to.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            ComparisonOperator::Before
                | ComparisonOperator::After
                | ComparisonOperator::During
                | ComparisonOperator::Relative
        )
    }
}

impl FromStr for ComparisonOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ILIKE" => Ok(ComparisonOperator::ILike),
            "EQUALS" => Ok(ComparisonOperator::Equals),
            "BEFORE" => Ok(ComparisonOperator::Before),
            "AFTER" => Ok(ComparisonOperator::After),
            "DURING" => Ok(ComparisonOperator::During),
            "=" => Ok(ComparisonOperator::Relative),
            "INTERSECTS" => Ok(ComparisonOperator::Intersects),
            _ => Err(format!("Unknown comparison operator: '{}'", s)),
        }
    }
}

/// AND/OR over an ordered, non-empty list of children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLogicalNode")]
pub struct LogicalNode {
    #[serde(rename = "type")]
    operator: LogicalOperator,
    filters: Vec<FilterTreeNode>,
}

#[derive(Deserialize)]
struct RawLogicalNode {
    #[serde(rename = "type")]
    operator: LogicalOperator,
    filters: Vec<FilterTreeNode>,
}

impl TryFrom<RawLogicalNode> for LogicalNode {
    type Error = FilterTreeError;

    fn try_from(raw: RawLogicalNode) -> Result<Self, Self::Error> {
        LogicalNode::new(raw.operator, raw.filters)
    }
}

impl LogicalNode {
    pub fn new(
        operator: LogicalOperator,
        filters: Vec<FilterTreeNode>,
    ) -> Result<Self, FilterTreeError> {
        if filters.is_empty() {
            return Err(FilterTreeError::EmptyLogicalNode(operator.as_str()));
        }
        Ok(Self { operator, filters })
    }

    pub fn operator(&self) -> LogicalOperator {
        self.operator
    }

    pub fn filters(&self) -> &[FilterTreeNode] {
        &self.filters
    }
}

/// A single `property <operator> value` leaf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonNode {
    #[serde(rename = "type")]
    pub operator: ComparisonOperator,
    pub property: String,
    pub value: Value,
}

impl ComparisonNode {
    pub fn new(operator: ComparisonOperator, property: impl Into<String>, value: Value) -> Self {
        Self {
            operator,
            property: property.into(),
            value,
        }
    }

    /// The value as a string, when the leaf carries one
    pub fn value_str(&self) -> Option<&str> {
        self.value.as_str()
    }
}

/// Recursive filter expression sent to the search backend
///
/// The wire shape is `{type: "AND"|"OR", filters: [...]}` for logical
/// nodes and `{type, property, value}` for comparisons. A node whose
/// `type` is neither is kept verbatim as [`FilterTreeNode::Unrecognized`];
/// a node with a known `type` must be well formed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterTreeNode {
    Logical(LogicalNode),
    Comparison(ComparisonNode),
    Unrecognized(Value),
}

impl<'de> Deserialize<'de> for FilterTreeNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let kind = value.get("type").and_then(Value::as_str);

        if LogicalOperator::ALL.iter().any(|op| Some(op.as_str()) == kind) {
            LogicalNode::deserialize(value)
                .map(FilterTreeNode::Logical)
                .map_err(D::Error::custom)
        } else if ComparisonOperator::ALL.iter().any(|op| Some(op.as_str()) == kind) {
            ComparisonNode::deserialize(value)
                .map(FilterTreeNode::Comparison)
                .map_err(D::Error::custom)
        } else {
            Ok(FilterTreeNode::Unrecognized(value))
        }
    }
}

impl FilterTreeNode {
    pub fn and(filters: Vec<FilterTreeNode>) -> Result<Self, FilterTreeError> {
        LogicalNode::new(LogicalOperator::And, filters).map(FilterTreeNode::Logical)
    }

    pub fn or(filters: Vec<FilterTreeNode>) -> Result<Self, FilterTreeError> {
        LogicalNode::new(LogicalOperator::Or, filters).map(FilterTreeNode::Logical)
    }

    pub fn comparison(
        operator: ComparisonOperator,
        property: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        FilterTreeNode::Comparison(ComparisonNode::new(operator, property, value.into()))
    }

    pub fn as_logical(&self) -> Option<&LogicalNode> {
        match self {
            FilterTreeNode::Logical(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_comparison(&self) -> Option<&ComparisonNode> {
        match self {
            FilterTreeNode::Comparison(node) => Some(node),
            _ => None,
        }
    }

    /// Depth-first traversal, parents before children
    pub fn walk<V: FilterVisitor + ?Sized>(&self, visitor: &mut V) {
        self.walk_at(visitor, 0);
    }

    fn walk_at<V: FilterVisitor + ?Sized>(&self, visitor: &mut V, depth: usize) {
        match self {
            FilterTreeNode::Logical(node) => {
                visitor.visit_logical(node, depth);
                for child in node.filters() {
                    child.walk_at(visitor, depth + 1);
                }
            }
            FilterTreeNode::Comparison(node) => visitor.visit_comparison(node, depth),
            FilterTreeNode::Unrecognized(node) => visitor.visit_unrecognized(node, depth),
        }
    }

    /// Number of comparison leaves in the tree
    pub fn leaf_count(&self) -> usize {
        let mut counter = LeafCounter(0);
        self.walk(&mut counter);
        counter.0
    }
}

impl From<ComparisonNode> for FilterTreeNode {
    fn from(node: ComparisonNode) -> Self {
        FilterTreeNode::Comparison(node)
    }
}

impl From<LogicalNode> for FilterTreeNode {
    fn from(node: LogicalNode) -> Self {
        FilterTreeNode::Logical(node)
    }
}

/// Visitor over the nodes of a filter tree
pub trait FilterVisitor {
    fn visit_logical(&mut self, _node: &LogicalNode, _depth: usize) {}
    fn visit_comparison(&mut self, _node: &ComparisonNode, _depth: usize) {}
    fn visit_unrecognized(&mut self, _node: &Value, _depth: usize) {}
}

struct LeafCounter(usize);

impl FilterVisitor for LeafCounter {
    fn visit_comparison(&mut self, _node: &ComparisonNode, _depth: usize) {
        self.0 += 1;
    }
}

/// Renders a tree as indented text, one node per line
#[derive(Default)]
pub struct TreePrinter {
    out: String,
}

impl TreePrinter {
    pub fn into_string(self) -> String {
        self.out
    }
}

impl FilterVisitor for TreePrinter {
    fn visit_logical(&mut self, node: &LogicalNode, depth: usize) {
        self.out.push_str(&"  ".repeat(depth));
        self.out.push_str(node.operator().as_str());
        self.out.push('\n');
    }

    fn visit_comparison(&mut self, node: &ComparisonNode, depth: usize) {
        self.out.push_str(&"  ".repeat(depth));
        self.out.push_str(&format!(
            "{} {} {}\n",
            node.property,
            node.operator.as_str(),
            node.value
        ));
    }

    fn visit_unrecognized(&mut self, node: &Value, depth: usize) {
        self.out.push_str(&"  ".repeat(depth));
        self.out.push_str(&format!("? {}\n", node));
    }
}

impl fmt::Display for FilterTreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = TreePrinter::default();
        self.walk(&mut printer);
        f.write_str(printer.into_string().trim_end())
    }
}
