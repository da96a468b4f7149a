//! # Commands
//!
//! Every user action reaches the editor as a [`Command`]. Canvas chrome
//! carries `data-action` and `data-node-id` attributes; the UI layer
//! delegates clicks to one handler that turns the pair into a command with
//! [`Command::from_action`] and hands it to `EditorContext::dispatch`.

use crate::errors::{EditorError, ErrorKind};
use crate::placement::DropTarget;
use crate::tree::NodeId;
use pagecraft_schema::Tab;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Select {
        node_id: NodeId,
    },
    ClearSelection,
    SetTab {
        tab: Tab,
    },
    Delete {
        node_id: NodeId,
    },
    Duplicate {
        node_id: NodeId,
    },
    UpdateSetting {
        node_id: NodeId,
        control: String,
        value: Value,
    },
    UpdateSubField {
        node_id: NodeId,
        control: String,
        field: String,
        value: Value,
    },
    ResetSetting {
        node_id: NodeId,
        control: String,
    },
    MoveNode {
        node_id: NodeId,
        parent: Option<NodeId>,
        index: usize,
    },
    DragStart {
        payload: String,
    },
    DragLeave,
    DragEnd,
    /// Resolve the active drag. `offsets` are the measured top offsets of
    /// rendered nodes.
    Drop {
        target: DropTarget,
        pointer_y: f64,
        #[serde(default)]
        offsets: HashMap<NodeId, f64>,
    },
    InsertTemplate {
        template: Value,
        #[serde(default)]
        parent: Option<NodeId>,
        #[serde(default)]
        index: Option<usize>,
    },
    Undo,
    Redo,
}

impl Command {
    /// Map a delegated canvas click to a command
    pub fn from_action(action: &str, node_id: &str) -> Option<Command> {
        let node_id = NodeId::from(node_id);
        match action {
            "select" | "edit" => Some(Command::Select { node_id }),
            "duplicate" => Some(Command::Duplicate { node_id }),
            "delete" => Some(Command::Delete { node_id }),
            // Placeholder click opens the widget panel
            "add" => Some(Command::ClearSelection),
            _ => None,
        }
    }

    /// Commands that may change the document
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Command::Delete { .. }
                | Command::Duplicate { .. }
                | Command::UpdateSetting { .. }
                | Command::UpdateSubField { .. }
                | Command::ResetSetting { .. }
                | Command::MoveNode { .. }
                | Command::Drop { .. }
                | Command::InsertTemplate { .. }
                | Command::Undo
                | Command::Redo
        )
    }
}

/// What the UI needs to know after a command ran
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutcome {
    /// The document changed
    pub changed: bool,
    pub selection: Option<NodeId>,
    /// Node created by the command (drop, duplicate)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl CommandOutcome {
    pub fn failed(error: &EditorError, selection: Option<NodeId>) -> Self {
        Self {
            changed: false,
            selection,
            created: None,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
