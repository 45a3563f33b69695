//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::schema::NodeId;

/// Reason a single node failed schema validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("name must not be empty")]
    EmptyName,

    #[error("name has {len} characters, maximum is {max}")]
    NameTooLong { len: usize, max: usize },

    #[error("id must not be empty")]
    EmptyId,

    #[error("id contains whitespace or control characters")]
    MalformedId,

    #[error("custom property '{0}' shadows a built-in field")]
    ReservedProperty(String),
}

/// Domain errors represent tree invariant violations.
/// These are independent of I/O concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid node '{node}': {issue}")]
    Validation { node: NodeId, issue: ValidationIssue },

    #[error("duplicate node id: {0}")]
    DuplicateId(NodeId),

    #[error("broken tree structure at '{node}': {message}")]
    Structure { node: NodeId, message: String },
}

impl DomainError {
    pub(crate) fn invalid(node: &NodeId, issue: ValidationIssue) -> Self {
        Self::Validation {
            node: node.clone(),
            issue,
        }
    }

    pub(crate) fn structure(node: &NodeId, message: impl Into<String>) -> Self {
        Self::Structure {
            node: node.clone(),
            message: message.into(),
        }
    }
}

/// Result type for engine operations.
pub type DomainResult<T> = Result<T, DomainError>;
