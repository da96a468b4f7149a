//! Error types for the editor

use crate::tree::TreeError;
use pagecraft_schema::{RegistryError, ValidationError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Invalid value: {0}")]
    Validation(#[from] ValidationError),

    #[error("No drag in progress")]
    NoActiveDrag,

    #[error("Another drag is already in progress")]
    DragInProgress,

    #[error("A drop is already being resolved")]
    DropInProgress,

    #[error("Drop target not found: {0}")]
    InvalidDropTarget(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Error taxonomy shared with the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unknown widget type or missing node; the operation is aborted and logged
    NotFound,
    /// Illegal parent/child pairing; the insertion is aborted
    InvariantViolation,
    /// Bad control input; shown at the field, previous value retained
    Validation,
    /// Registry collision at startup; fatal to initialization
    DuplicateType,
    /// Drag session misuse (e.g. a second concurrent drag)
    Busy,
}

impl EditorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EditorError::Tree(TreeError::NodeNotFound(_)) => ErrorKind::NotFound,
            EditorError::Tree(_) => ErrorKind::InvariantViolation,
            EditorError::Registry(RegistryError::UnknownType(_)) => ErrorKind::NotFound,
            EditorError::Registry(RegistryError::DuplicateType(_)) => ErrorKind::DuplicateType,
            EditorError::Validation(_) => ErrorKind::Validation,
            EditorError::InvalidDropTarget(_) => ErrorKind::NotFound,
            EditorError::NoActiveDrag | EditorError::DragInProgress | EditorError::DropInProgress => {
                ErrorKind::Busy
            }
            EditorError::Serialization(_) => ErrorKind::Validation,
        }
    }

    /// Everything except a registry collision leaves the editor usable
    pub fn is_recoverable(&self) -> bool {
        self.kind() != ErrorKind::DuplicateType
    }
}

impl From<serde_json::Error> for EditorError {
    fn from(e: serde_json::Error) -> Self {
        EditorError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeId;

    #[test]
    fn test_error_kinds() {
        let missing: EditorError = TreeError::NodeNotFound(NodeId::from("x")).into();
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        let illegal: EditorError = TreeError::IllegalPlacement {
            parent: "container",
            child: "widget",
        }
        .into();
        assert_eq!(illegal.kind(), ErrorKind::InvariantViolation);

        let duplicate: EditorError = RegistryError::DuplicateType("text".to_string()).into();
        assert_eq!(duplicate.kind(), ErrorKind::DuplicateType);
        assert!(!duplicate.is_recoverable());

        let invalid: EditorError = ValidationError::NotANumber {
            value: "x".to_string(),
        }
        .into();
        assert!(invalid.is_recoverable());
    }
}
