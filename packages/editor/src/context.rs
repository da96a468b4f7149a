//! # Editor Context
//!
//! The single owner of editor state: registry, document tree, history,
//! selection, canvas and drag session. Built once at startup and passed by
//! reference; every operation goes through `&mut self`.
//!
//! Mutating operations share one shape:
//!
//! 1. Resolve and validate without touching the tree
//! 2. Snapshot the tree
//! 3. Mutate
//! 4. Record the snapshot in history
//! 5. Re-render only what changed

use crate::commands::{Command, CommandOutcome};
use crate::config::EditorConfig;
use crate::errors::EditorError;
use crate::export::{self, ExportedNode};
use crate::history::History;
use crate::inspector::{self, FieldErrors, InspectorPanel};
use crate::pipeline::{self, SettingWrite};
use crate::placement::{self, DragSession, DragState, DropTarget, LayoutProbe};
use crate::render::{Canvas, RenderEngine, RenderOptions};
use crate::tree::{DocumentTree, IdGenerator, NodeId};
use pagecraft_schema::{Tab, WidgetRegistry};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub struct EditorContext {
    registry: WidgetRegistry,
    config: EditorConfig,
    tree: DocumentTree,
    history: History,
    canvas: Canvas,
    render_options: RenderOptions,
    selection: Option<NodeId>,
    active_tab: Tab,
    drag: DragSession,
    field_errors: HashMap<NodeId, FieldErrors>,
}

impl EditorContext {
    pub fn new(registry: WidgetRegistry, config: EditorConfig) -> Self {
        Self::with_id_generator(registry, config, IdGenerator::new())
    }

    /// Context with the built-in widget library. A registration collision is
    /// fatal to startup and returned to the caller.
    pub fn with_builtins(config: EditorConfig) -> Result<Self, EditorError> {
        Ok(Self::new(WidgetRegistry::with_builtins()?, config))
    }

    pub fn with_id_generator(registry: WidgetRegistry, config: EditorConfig, ids: IdGenerator) -> Self {
        info!(
            widgets = registry.len(),
            history_limit = config.history_limit,
            "Starting editor"
        );
        Self {
            render_options: RenderOptions::editor(&config),
            history: History::with_max_levels(config.history_limit),
            tree: DocumentTree::with_id_generator(ids),
            canvas: Canvas::new(),
            selection: None,
            active_tab: Tab::Content,
            drag: DragSession::new(),
            field_errors: HashMap::new(),
            registry,
            config,
        }
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn selection(&self) -> Option<&NodeId> {
        self.selection.as_ref()
    }

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    /// Live canvas markup (editor mode)
    pub fn html(&self) -> String {
        self.canvas.html()
    }

    pub fn subtree_html(&self, id: &NodeId) -> Option<String> {
        self.canvas.subtree_html(id)
    }

    /// Clean markup of the whole document, for preview and code export
    pub fn preview_html(&self) -> Result<String, EditorError> {
        let options = RenderOptions::preview(&self.config);
        Ok(RenderEngine::new(&self.registry, &options)
            .render_document(&self.tree)?
            .html())
    }

    // --- Selection & inspector ---

    pub fn select(&mut self, id: &NodeId) -> Result<InspectorPanel, EditorError> {
        let panel = self.panel_for(id)?;
        debug!(node_id = %id, "Selected node");
        self.selection = Some(id.clone());
        Ok(panel)
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn set_active_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    /// Panel of the selected node, if any
    pub fn inspector(&self) -> Result<Option<InspectorPanel>, EditorError> {
        self.selection.as_ref().map(|id| self.panel_for(id)).transpose()
    }

    pub fn field_error(&self, id: &NodeId, control: &str) -> Option<&str> {
        self.field_errors
            .get(id)
            .and_then(|errors| errors.get(control))
            .map(String::as_str)
    }

    fn panel_for(&self, id: &NodeId) -> Result<InspectorPanel, EditorError> {
        inspector::build_panel(
            &self.registry,
            &self.tree,
            id,
            self.active_tab,
            self.field_errors.get(id),
        )
    }

    // --- Drag & drop ---

    pub fn drag_start(&mut self, payload: &str) -> Result<(), EditorError> {
        self.drag.start(payload)?;
        debug!(payload = %payload, "Drag started");
        Ok(())
    }

    pub fn drag_over(&mut self, target: DropTarget) {
        self.drag.over(target);
    }

    pub fn drag_leave(&mut self) {
        self.drag.leave();
    }

    /// Returns true when the drag ended without a drop (cancelled)
    pub fn drag_end(&mut self) -> bool {
        let cancelled = self.drag.end();
        if cancelled {
            debug!("Drag cancelled");
        }
        cancelled
    }

    /// Resolve the active drag onto `target`
    pub fn drop(&mut self, target: &DropTarget, pointer_y: f64, probe: &dyn LayoutProbe) -> Result<NodeId, EditorError> {
        let payload = self.drag.begin_drop()?;
        let result = self.place_widget(&payload, target, pointer_y, probe);
        self.drag.finish_drop();
        result
    }

    /// Create a widget of `type_id` at `target`, wrapping it in a Column and
    /// Container as needed. The new widget becomes the selection.
    pub fn place_widget(
        &mut self,
        type_id: &str,
        target: &DropTarget,
        pointer_y: f64,
        probe: &dyn LayoutProbe,
    ) -> Result<NodeId, EditorError> {
        let plan = placement::plan_drop(&mut self.tree, &self.registry, type_id, target, pointer_y, probe)?;
        let parent = plan.parent.clone();
        let index = plan.index;
        let root = plan.subtree.root().clone();

        let before = self.tree.snapshot();
        let widget = plan.apply(&mut self.tree)?;
        self.history.record(before, format!("Add {}", type_id));
        info!(node_id = %widget, type_id = %type_id, "Placed widget");

        match parent {
            Some(parent) => self.rerender(&parent)?,
            None => {
                let fragment = self.engine().render_subtree(&self.tree, &root)?;
                self.canvas.insert_root(index, fragment);
            }
        }
        self.selection = Some(widget.clone());
        Ok(widget)
    }

    // --- Settings ---

    /// Returns false when the value did not change
    pub fn update_setting(&mut self, id: &NodeId, control: &str, raw: &Value) -> Result<bool, EditorError> {
        let resolved = pipeline::resolve_update(&self.registry, &self.tree, id, control, raw);
        self.commit_write(id, control, resolved)
    }

    pub fn update_sub_field(&mut self, id: &NodeId, control: &str, field: &str, raw: &Value) -> Result<bool, EditorError> {
        let resolved = pipeline::resolve_sub_field(&self.registry, &self.tree, id, control, field, raw);
        self.commit_write(id, control, resolved)
    }

    /// Drop the stored value so the control falls back to its default
    pub fn reset_setting(&mut self, id: &NodeId, control: &str) -> Result<bool, EditorError> {
        let resolved = pipeline::resolve_reset(&self.registry, &self.tree, id, control);
        self.commit_write(id, control, resolved)
    }

    fn commit_write(
        &mut self,
        id: &NodeId,
        control: &str,
        resolved: Result<Option<SettingWrite>, EditorError>,
    ) -> Result<bool, EditorError> {
        let write = match resolved {
            Ok(write) => {
                self.clear_field_error(id, control);
                write
            }
            Err(EditorError::Validation(err)) => {
                warn!(node_id = %id, control = %control, error = %err, "Rejected setting");
                if self.tree.contains(id) {
                    self.field_errors
                        .entry(id.clone())
                        .or_default()
                        .insert(control.to_string(), err.to_string());
                }
                return Err(err.into());
            }
            Err(err) => return Err(err),
        };

        let Some(write) = write else {
            return Ok(false);
        };

        let before = self.tree.snapshot();
        write.apply(&mut self.tree)?;
        self.history.record(before, format!("Edit {}", control));
        debug!(node_id = %id, control = %control, "Setting updated");

        self.rerender(id)?;
        Ok(true)
    }

    fn clear_field_error(&mut self, id: &NodeId, control: &str) {
        if let Some(errors) = self.field_errors.get_mut(id) {
            errors.shift_remove(control);
            if errors.is_empty() {
                self.field_errors.remove(id);
            }
        }
    }

    // --- Structure ---

    /// Clone a node's subtree with fresh ids, placed right after the original
    pub fn duplicate(&mut self, id: &NodeId) -> Result<NodeId, EditorError> {
        let parent = self.tree.node(id)?.parent().cloned();

        let before = self.tree.snapshot();
        let (clone, remap) = self.tree.duplicate(id)?;
        self.history.record(before, "Duplicate");
        info!(node_id = %id, clone = %clone, nodes = remap.len(), "Duplicated node");

        match parent {
            Some(parent) => self.rerender(&parent)?,
            None => {
                let index = self.tree.index_in_parent(&clone).unwrap_or(self.canvas.len());
                let fragment = self.engine().render_subtree(&self.tree, &clone)?;
                self.canvas.insert_root(index, fragment);
            }
        }
        Ok(clone)
    }

    /// Remove a node and its subtree. Clears the selection if it lay inside.
    pub fn delete(&mut self, id: &NodeId) -> Result<(), EditorError> {
        let parent = self.tree.node(id)?.parent().cloned();
        if self.selection.as_ref().is_some_and(|selected| self.tree.is_within(selected, id)) {
            self.selection = None;
        }

        let before = self.tree.snapshot();
        let removed = self.tree.remove(id);
        self.history.record(before, "Delete");

        if let Some(removed) = removed {
            info!(node_id = %id, nodes = removed.len(), "Deleted node");
            for node in removed.nodes() {
                self.field_errors.remove(node.id());
            }
        }

        self.canvas.remove(id);
        if let Some(parent) = parent {
            self.rerender(&parent)?;
        }
        Ok(())
    }

    /// Re-parent a node; `None` moves a Container to the top level
    pub fn move_node(&mut self, id: &NodeId, new_parent: Option<&NodeId>, index: usize) -> Result<(), EditorError> {
        let before = self.tree.snapshot();
        self.tree.move_node(id, new_parent, index)?;
        self.history.record(before, "Move");
        debug!(node_id = %id, parent = ?new_parent, index, "Moved node");
        self.refresh_canvas()
    }

    /// Insert an exported subtree (or list of them) with fresh ids. All
    /// roots land as one undo step; a failure leaves the tree untouched.
    pub fn insert_template(
        &mut self,
        json: &str,
        parent: Option<&NodeId>,
        index: Option<usize>,
    ) -> Result<Vec<NodeId>, EditorError> {
        let nodes = export::template_from_json(json)?;
        self.insert_nodes(nodes, parent, index)
    }

    fn insert_nodes(
        &mut self,
        nodes: Vec<ExportedNode>,
        parent: Option<&NodeId>,
        index: Option<usize>,
    ) -> Result<Vec<NodeId>, EditorError> {
        for node in &nodes {
            node.check_types(&self.registry)?;
        }

        let before = self.tree.snapshot();
        let mut index = index.unwrap_or(usize::MAX).min(self.tree.children_of(parent).len());
        let mut inserted = Vec::with_capacity(nodes.len());
        for node in nodes {
            let result = node
                .into_subtree()
                .map_err(EditorError::from)
                .and_then(|mut subtree| {
                    self.tree.reassign_ids(&mut subtree);
                    Ok(self.tree.insert_subtree(parent, subtree, index)?)
                });
            match result {
                Ok(root) => {
                    inserted.push(root);
                    index += 1;
                }
                Err(err) => {
                    warn!(error = %err, "Template insertion aborted");
                    self.tree.restore(before);
                    return Err(err);
                }
            }
        }

        if !inserted.is_empty() {
            self.history.record(before, "Insert template");
            self.refresh_canvas()?;
        }
        Ok(inserted)
    }

    // --- History ---

    pub fn undo(&mut self) -> Result<bool, EditorError> {
        if !self.history.undo(&mut self.tree) {
            return Ok(false);
        }
        self.after_history_jump()?;
        Ok(true)
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        if !self.history.redo(&mut self.tree) {
            return Ok(false);
        }
        self.after_history_jump()?;
        Ok(true)
    }

    fn after_history_jump(&mut self) -> Result<(), EditorError> {
        if self.selection.as_ref().is_some_and(|id| !self.tree.contains(id)) {
            self.selection = None;
        }
        let tree = &self.tree;
        self.field_errors.retain(|id, _| tree.contains(id));
        self.refresh_canvas()
    }

    /// Group the mutations until [`EditorContext::end_batch`] into one undo
    /// step
    pub fn begin_batch(&mut self, description: &str) {
        self.history.begin_batch();
        self.history.set_batch_description(description);
    }

    pub fn end_batch(&mut self) {
        self.history.end_batch();
    }

    // --- Import / export ---

    pub fn export_json(&self, pretty: bool) -> Result<String, EditorError> {
        export::to_json(&self.tree, pretty)
    }

    pub fn export_nodes(&self) -> Result<Vec<ExportedNode>, EditorError> {
        Ok(export::export_tree(&self.tree)?)
    }

    /// Replace the document. History and selection start over.
    pub fn load_json(&mut self, json: &str) -> Result<(), EditorError> {
        let nodes = export::from_json(json)?;
        self.tree = export::import_document(nodes, &self.registry, IdGenerator::new())?;
        self.history.clear();
        self.selection = None;
        self.field_errors.clear();
        self.refresh_canvas()
    }

    // --- Rendering ---

    /// Re-render the whole document
    pub fn refresh_canvas(&mut self) -> Result<(), EditorError> {
        self.canvas = self.engine().render_document(&self.tree)?;
        Ok(())
    }

    /// Re-render one subtree in place
    fn rerender(&mut self, id: &NodeId) -> Result<(), EditorError> {
        let fragment = self.engine().render_subtree(&self.tree, id)?;
        if !self.canvas.replace(fragment) {
            // Not on the canvas yet (e.g. first render); rebuild everything
            self.refresh_canvas()?;
        }
        Ok(())
    }

    fn engine(&self) -> RenderEngine<'_> {
        RenderEngine::new(&self.registry, &self.render_options)
    }

    // --- Dispatch ---

    /// Run a command. Errors are logged and reported in the outcome; the
    /// editor stays usable.
    pub fn dispatch(&mut self, command: Command) -> CommandOutcome {
        let mut created = None;
        let result = match command {
            Command::Select { node_id } => self.select(&node_id).map(|_| false),
            Command::ClearSelection => {
                self.clear_selection();
                Ok(false)
            }
            Command::SetTab { tab } => {
                self.set_active_tab(tab);
                Ok(false)
            }
            Command::Delete { node_id } => self.delete(&node_id).map(|_| true),
            Command::Duplicate { node_id } => self.duplicate(&node_id).map(|id| {
                created = Some(id);
                true
            }),
            Command::UpdateSetting {
                node_id,
                control,
                value,
            } => self.update_setting(&node_id, &control, &value),
            Command::UpdateSubField {
                node_id,
                control,
                field,
                value,
            } => self.update_sub_field(&node_id, &control, &field, &value),
            Command::ResetSetting { node_id, control } => self.reset_setting(&node_id, &control),
            Command::MoveNode {
                node_id,
                parent,
                index,
            } => self.move_node(&node_id, parent.as_ref(), index).map(|_| true),
            Command::DragStart { payload } => self.drag_start(&payload).map(|_| false),
            Command::DragLeave => {
                self.drag_leave();
                Ok(false)
            }
            Command::DragEnd => {
                self.drag_end();
                Ok(false)
            }
            Command::Drop {
                target,
                pointer_y,
                offsets,
            } => self.drop(&target, pointer_y, &offsets).map(|id| {
                created = Some(id);
                true
            }),
            Command::InsertTemplate {
                template,
                parent,
                index,
            } => {
                let nodes = match template {
                    Value::Array(_) => serde_json::from_value::<Vec<ExportedNode>>(template),
                    _ => serde_json::from_value::<ExportedNode>(template).map(|node| vec![node]),
                };
                nodes
                    .map_err(EditorError::from)
                    .and_then(|nodes| self.insert_nodes(nodes, parent.as_ref(), index))
                    .map(|roots| !roots.is_empty())
            }
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
        };

        match result {
            Ok(changed) => CommandOutcome {
                changed,
                selection: self.selection.clone(),
                created,
                error: None,
                error_kind: None,
            },
            Err(err) => {
                warn!(error = %err, kind = ?err.kind(), "Command failed");
                CommandOutcome::failed(&err, self.selection.clone())
            }
        }
    }

    /// Delegated canvas click
    pub fn handle_action(&mut self, action: &str, node_id: &str) -> Option<CommandOutcome> {
        let command = Command::from_action(action, node_id)?;
        Some(self.dispatch(command))
    }
}
