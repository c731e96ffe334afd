//! Canonical filter trees and their mapping to editor state
//!
//! The search backend executes a recursive boolean expression:
//!
//! ```text
//! {type: "AND" | "OR", filters: [...]}                 logical node
//! {type: "ILIKE" | "EQUALS" | ..., property, value}    comparison leaf
//! ```
//!
//! [`to_filter_tree`] builds one from [`EditorState`](crate::editor::EditorState);
//! [`from_filter_tree`] recognizes the shapes it produces and rebuilds the
//! sections, dropping anything it does not understand.
//!
//! # Shapes
//!
//! ```text
//! text        ILIKE anyText "<text>"
//! timeRange   <AFTER|BEFORE|DURING|=> <property> "<value>", OR'd over properties
//! location    INTERSECTS anyGeo "<wkt>"
//! datatypes   OR of EQUALS datatype "<type>"
//! ```

pub mod error;
pub mod serializer;
pub mod tree;

pub use error::FilterTreeError;
pub use serializer::{
    ANY_GEO, ANY_TEXT, DATATYPE, MATCH_ALL, from_filter_tree, to_filter_tree, to_filter_tree_at,
};
pub use tree::{
    ComparisonNode, ComparisonOperator, FilterTreeNode, FilterVisitor, LogicalNode,
    LogicalOperator, TreePrinter,
};
