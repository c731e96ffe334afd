use thiserror::Error;

/// Errors that can occur when building filter tree nodes
#[derive(Debug, Error)]
pub enum FilterTreeError {
    #[error("Logical node '{0}' must have at least one child")]
    EmptyLogicalNode(&'static str),
}
