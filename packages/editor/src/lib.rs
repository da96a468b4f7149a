//! # Pagecraft Editor
//!
//! Editing engine for the page composer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ schema: widget definitions + registry       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditorContext                       │
//! │  - Document tree (Container/Column/Widget)  │
//! │  - Placement: drag payload → insertion      │
//! │  - Inspector: schema → field descriptors    │
//! │  - Settings pipeline: edit → validate       │
//! │  - Snapshot history (undo/redo)             │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ render: tree → canvas fragments → markup    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Tree is source of truth**: canvas markup is a derived view
//! 2. **Validate, then mutate**: a rejected operation leaves the tree as it was
//! 3. **One context**: no ambient globals; all state lives in `EditorContext`
//! 4. **Ids are forever**: the id generator is never rolled back by undo
//!
//! ## Usage
//!
//! ```rust
//! use pagecraft_editor::{DropTarget, EditorConfig, EditorContext, NoLayout};
//! use serde_json::json;
//!
//! let mut editor = EditorContext::with_builtins(EditorConfig::default()).unwrap();
//!
//! editor.drag_start("heading").unwrap();
//! let heading = editor.drop(&DropTarget::Canvas, 0.0, &NoLayout).unwrap();
//!
//! editor.update_setting(&heading, "title", &json!("Hello")).unwrap();
//! assert!(editor.html().contains("Hello"));
//!
//! editor.undo().unwrap();
//! assert!(!editor.html().contains("Hello"));
//! ```

mod commands;
mod config;
mod context;
mod errors;
mod export;
mod history;
mod inspector;
mod pipeline;
mod placement;
mod render;
mod tree;

pub use commands::{Command, CommandOutcome};
pub use config::{ConfigError, EditorConfig, DEFAULT_CONFIG_NAME};
pub use context::EditorContext;
pub use errors::{EditorError, ErrorKind};
pub use export::{export_node, export_tree, from_json, import_document, template_from_json, to_json, ExportedNode};
pub use history::{History, HistoryEntry};
pub use inspector::{build_panel, Crumb, FieldDescriptor, FieldErrors, InspectorPanel, Section, SubFieldDescriptor};
pub use pipeline::{resolve_reset, resolve_sub_field, resolve_update, SettingWrite};
pub use placement::{
    find_best_column, plan_drop, y_index, DragSession, DragState, DropPlan, DropTarget, LayoutProbe, NoLayout,
};
pub use render::{Canvas, Fragment, FragmentBody, RenderEngine, RenderMode, RenderOptions};
pub use tree::{DocumentTree, IdGenerator, IdRemap, Node, NodeId, NodeKind, Subtree, TreeError, TreeSnapshot};

// Re-export schema types for convenience
pub use pagecraft_schema::{Settings, Tab, WidgetRegistry};
