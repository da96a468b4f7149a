//! # Placement / Drop Resolver
//!
//! Turns a widget-type payload and a drop target into one tree insertion.
//!
//! ```text
//! canvas    → new Container → new Column → new Widget
//! container → first Column (created if missing) → new Widget
//! column    → new Widget
//! ```
//!
//! The whole new subtree is planned before the tree is touched; applying a
//! plan is a single `insert_subtree`, so a drop either lands completely or
//! not at all.

use crate::errors::EditorError;
use crate::tree::{DocumentTree, NodeId, NodeKind, Subtree};
use pagecraft_schema::{LayoutKind, WidgetRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Where the pointer was released
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum DropTarget {
    Canvas,
    Container(NodeId),
    Column(NodeId),
}

impl DropTarget {
    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            DropTarget::Canvas => None,
            DropTarget::Container(id) | DropTarget::Column(id) => Some(id),
        }
    }
}

/// Rendered vertical positions of nodes on the live canvas
pub trait LayoutProbe {
    /// Top offset of a rendered node, `None` when it cannot be measured
    fn top_offset(&self, id: &NodeId) -> Option<f64>;
}

impl LayoutProbe for HashMap<NodeId, f64> {
    fn top_offset(&self, id: &NodeId) -> Option<f64> {
        self.get(id).copied()
    }
}

/// Probe for headless use; every drop appends
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLayout;

impl LayoutProbe for NoLayout {
    fn top_offset(&self, _id: &NodeId) -> Option<f64> {
        None
    }
}

/// A drop resolved to a concrete insertion
#[derive(Debug, Clone)]
pub struct DropPlan {
    /// `None` = top level
    pub parent: Option<NodeId>,
    pub index: usize,
    pub subtree: Subtree,
    /// The widget the drop creates
    pub widget: NodeId,
}

impl DropPlan {
    /// Apply the plan; returns the new widget's id
    pub fn apply(self, tree: &mut DocumentTree) -> Result<NodeId, EditorError> {
        tree.insert_subtree(self.parent.as_ref(), self.subtree, self.index)?;
        Ok(self.widget)
    }
}

/// Insert before the first sibling whose top offset exceeds `pointer_y`,
/// otherwise append. Siblings the probe cannot measure are skipped.
pub fn y_index(siblings: &[NodeId], pointer_y: f64, probe: &dyn LayoutProbe) -> usize {
    siblings
        .iter()
        .position(|sibling| probe.top_offset(sibling).is_some_and(|top| top > pointer_y))
        .unwrap_or(siblings.len())
}

/// Column of a container that receives drops aimed at the container itself.
/// Currently always the first column.
pub fn find_best_column(tree: &DocumentTree, container: &NodeId) -> Option<NodeId> {
    tree.children_of(Some(container)).first().cloned()
}

/// Resolve a drop without mutating the tree's structure. Node ids for the
/// new nodes are drawn from the tree's generator.
#[instrument(skip(tree, registry, probe), fields(payload = %payload))]
pub fn plan_drop(
    tree: &mut DocumentTree,
    registry: &WidgetRegistry,
    payload: &str,
    target: &DropTarget,
    pointer_y: f64,
    probe: &dyn LayoutProbe,
) -> Result<DropPlan, EditorError> {
    let type_id = payload.trim();
    let defaults = registry.default_settings_for(type_id).map_err(|err| {
        warn!(type_id = %type_id, "Dropped unknown widget type");
        err
    })?;

    let widget = tree.create_node(NodeKind::widget(type_id), defaults);
    let widget_id = widget.id().clone();
    let widget = Subtree::leaf(widget);

    let plan = match target {
        DropTarget::Canvas => {
            let index = y_index(tree.roots(), pointer_y, probe);
            DropPlan {
                parent: None,
                index,
                subtree: wrap_in_container(tree, registry, widget)?,
                widget: widget_id,
            }
        }
        DropTarget::Container(container) => {
            expect_kind(tree, container, &NodeKind::Container)?;
            match find_best_column(tree, container) {
                Some(column) => {
                    let index = y_index(tree.children_of(Some(&column)), pointer_y, probe);
                    DropPlan {
                        parent: Some(column),
                        index,
                        subtree: widget,
                        widget: widget_id,
                    }
                }
                None => DropPlan {
                    parent: Some(container.clone()),
                    index: 0,
                    subtree: wrap_in_column(tree, registry, widget)?,
                    widget: widget_id,
                },
            }
        }
        DropTarget::Column(column) => {
            expect_kind(tree, column, &NodeKind::Column)?;
            let index = y_index(tree.children_of(Some(column)), pointer_y, probe);
            DropPlan {
                parent: Some(column.clone()),
                index,
                subtree: widget,
                widget: widget_id,
            }
        }
    };

    debug!(parent = ?plan.parent, index = plan.index, nodes = plan.subtree.len(), "Planned drop");
    Ok(plan)
}

fn expect_kind(tree: &DocumentTree, id: &NodeId, expected: &NodeKind) -> Result<(), EditorError> {
    match tree.get(id) {
        Some(node) if node.kind() == expected => Ok(()),
        Some(node) => {
            warn!(node_id = %id, kind = node.kind().name(), "Drop target has the wrong kind");
            Err(EditorError::InvalidDropTarget(id.to_string()))
        }
        None => {
            warn!(node_id = %id, "Drop target not in document");
            Err(EditorError::InvalidDropTarget(id.to_string()))
        }
    }
}

fn wrap_in_column(
    tree: &mut DocumentTree,
    registry: &WidgetRegistry,
    child: Subtree,
) -> Result<Subtree, EditorError> {
    let settings = registry.layout(LayoutKind::Column).default_settings.clone();
    let column = tree.create_node(NodeKind::Column, settings);
    let column_id = column.id().clone();
    let mut subtree = Subtree::leaf(column);
    subtree.push_child(&column_id, child)?;
    Ok(subtree)
}

fn wrap_in_container(
    tree: &mut DocumentTree,
    registry: &WidgetRegistry,
    widget: Subtree,
) -> Result<Subtree, EditorError> {
    let column = wrap_in_column(tree, registry, widget)?;
    let settings = registry.layout(LayoutKind::Container).default_settings.clone();
    let container = tree.create_node(NodeKind::Container, settings);
    let container_id = container.id().clone();
    let mut subtree = Subtree::leaf(container);
    subtree.push_child(&container_id, column)?;
    Ok(subtree)
}

/// Drag lifecycle. A drag that ends without a drop is a cancellation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        payload: String,
        over: Option<DropTarget>,
    },
    Resolving {
        payload: String,
    },
}

#[derive(Debug, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != DragState::Idle
    }

    pub fn start(&mut self, payload: &str) -> Result<(), EditorError> {
        match self.state {
            DragState::Idle => {
                self.state = DragState::Dragging {
                    payload: payload.to_string(),
                    over: None,
                };
                Ok(())
            }
            DragState::Dragging { .. } => Err(EditorError::DragInProgress),
            DragState::Resolving { .. } => Err(EditorError::DropInProgress),
        }
    }

    /// Pointer entered a potential target
    pub fn over(&mut self, target: DropTarget) {
        if let DragState::Dragging { over, .. } = &mut self.state {
            *over = Some(target);
        }
    }

    /// Pointer left the hovered target; the drag itself continues
    pub fn leave(&mut self) -> Option<DropTarget> {
        match &mut self.state {
            DragState::Dragging { over, .. } => over.take(),
            _ => None,
        }
    }

    pub fn hovered(&self) -> Option<&DropTarget> {
        match &self.state {
            DragState::Dragging { over, .. } => over.as_ref(),
            _ => None,
        }
    }

    /// Drag finished. Returns true when it ended without a drop.
    pub fn end(&mut self) -> bool {
        let cancelled = matches!(self.state, DragState::Dragging { .. });
        if !matches!(self.state, DragState::Resolving { .. }) {
            self.state = DragState::Idle;
        }
        cancelled
    }

    /// Enter the resolving state and hand out the payload
    pub fn begin_drop(&mut self) -> Result<String, EditorError> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging { payload, .. } => {
                self.state = DragState::Resolving {
                    payload: payload.clone(),
                };
                Ok(payload)
            }
            DragState::Resolving { payload } => {
                self.state = DragState::Resolving { payload };
                Err(EditorError::DropInProgress)
            }
            DragState::Idle => Err(EditorError::NoActiveDrag),
        }
    }

    pub fn finish_drop(&mut self) {
        self.state = DragState::Idle;
    }
}
