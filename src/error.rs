//! Model errors.
//!
//! ERROR HANDLING
//! ==============
//! Every variant aborts the command or import that raised it; the graph is
//! left exactly as it was. Recoverable situations (a disallowed relationship
//! kind, bounds below a kind's minimum, orphaned elements) are never errors:
//! they are corrected or reported as warnings by the model itself.

use crate::element::ElementId;
use crate::relationship::RelationshipId;

/// Grepable error code attached to every error surfaced to a host.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    /// Whether repeating the same operation may succeed.
    fn retryable(&self) -> bool {
        false
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("unknown type tag: {0}")]
    UnknownType(String),
    #[error("relationship {relationship} references missing element {element}")]
    DanglingEndpoint { relationship: RelationshipId, element: ElementId },
    #[error("element not found: {0}")]
    ElementNotFound(ElementId),
    #[error("relationship not found: {0}")]
    RelationshipNotFound(RelationshipId),
    #[error("element {0} cannot own children")]
    NotAContainer(ElementId),
    #[error("placing {element} inside {owner} would create a containment cycle")]
    ContainmentCycle { element: ElementId, owner: ElementId },
    #[error("relationship path needs at least 2 points, got {0}")]
    InvalidPath(usize),
    #[error("duplicate id: {0}")]
    DuplicateId(String),
    #[error("record stored under key {key} carries id {id}")]
    KeyMismatch { key: String, id: String },
    #[error("unsupported model version: {0}")]
    UnsupportedVersion(String),
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl ErrorCode for ModelError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownType(_) => "E_UNKNOWN_TYPE",
            Self::DanglingEndpoint { .. } => "E_DANGLING_ENDPOINT",
            Self::ElementNotFound(_) => "E_ELEMENT_NOT_FOUND",
            Self::RelationshipNotFound(_) => "E_RELATIONSHIP_NOT_FOUND",
            Self::NotAContainer(_) => "E_NOT_A_CONTAINER",
            Self::ContainmentCycle { .. } => "E_CONTAINMENT_CYCLE",
            Self::InvalidPath(_) => "E_INVALID_PATH",
            Self::DuplicateId(_) => "E_DUPLICATE_ID",
            Self::KeyMismatch { .. } => "E_KEY_MISMATCH",
            Self::UnsupportedVersion(_) => "E_UNSUPPORTED_VERSION",
            Self::MissingField(_) => "E_MISSING_FIELD",
            Self::Malformed(_) => "E_MALFORMED",
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
