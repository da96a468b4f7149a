//! # Control Schema Renderer
//!
//! Builds the inspector panel for the selected node: the tabs its schema
//! uses, and for the active tab one section per control group with a field
//! descriptor per visible control.
//!
//! Controls whose condition is false are left out of the panel. Their stored
//! values stay in the node's settings.

use crate::errors::EditorError;
use crate::tree::{DocumentTree, NodeId, NodeKind};
use indexmap::IndexMap;
use pagecraft_schema::{Constraints, ControlKind, ControlSpec, SubFieldSpec, Tab, WidgetRegistry};
use serde::Serialize;
use serde_json::Value;

/// Pending inline validation messages of one node, by control name
pub type FieldErrors = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectorPanel {
    pub node_id: NodeId,
    pub title: String,
    pub tabs: Vec<Tab>,
    pub active_tab: Tab,
    pub sections: Vec<Section>,
    pub breadcrumb: Vec<Crumb>,
}

impl InspectorPanel {
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.sections.iter().flat_map(|section| section.fields.iter())
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields().find(|field| field.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    pub kind: ControlKind,
    /// Stored value, or the control default when the key is absent
    pub current_value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sub_fields: Vec<SubFieldDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One editable part of a compound value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubFieldDescriptor {
    #[serde(flatten)]
    pub spec: SubFieldSpec,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Crumb {
    pub id: NodeId,
    pub label: String,
}

/// Panel for `node_id`. Falls back to the first tab when `active_tab` has no
/// sections for this node.
pub fn build_panel(
    registry: &WidgetRegistry,
    tree: &DocumentTree,
    node_id: &NodeId,
    active_tab: Tab,
    errors: Option<&FieldErrors>,
) -> Result<InspectorPanel, EditorError> {
    let node = tree.node(node_id)?;
    let schema = registry.schema_for(node.kind().layout_kind(), node.kind().type_id())?;
    let effective = schema.effective_settings(&node.settings);

    let tabs = schema.tabs();
    let active_tab = if tabs.contains(&active_tab) {
        active_tab
    } else {
        tabs.first().copied().unwrap_or_default()
    };

    let sections = schema
        .control_groups
        .iter()
        .filter(|group| group.tab == active_tab)
        .filter_map(|group| {
            let fields: Vec<FieldDescriptor> = group
                .controls
                .iter()
                .filter(|control| control.is_active(&effective))
                .map(|control| {
                    let current = effective.get(&control.name).cloned().unwrap_or(Value::Null);
                    let error = errors.and_then(|errors| errors.get(&control.name)).cloned();
                    describe(control, current, error)
                })
                .collect();
            (!fields.is_empty()).then(|| Section {
                title: group.title.clone(),
                fields,
            })
        })
        .collect();

    let breadcrumb = tree
        .find_path(node_id)?
        .into_iter()
        .map(|id| {
            let label = tree.get(&id).map(|node| label_for(registry, node.kind())).unwrap_or_default();
            Crumb { id, label }
        })
        .collect();

    Ok(InspectorPanel {
        node_id: node_id.clone(),
        title: label_for(registry, node.kind()),
        tabs,
        active_tab,
        sections,
        breadcrumb,
    })
}

fn describe(control: &ControlSpec, current_value: Value, error: Option<String>) -> FieldDescriptor {
    let sub_fields = control
        .sub_fields()
        .iter()
        .map(|spec| SubFieldDescriptor {
            spec: *spec,
            value: current_value.get(spec.key).cloned().unwrap_or(Value::Null),
        })
        .collect();

    FieldDescriptor {
        name: control.name.clone(),
        label: control.label.clone(),
        kind: control.kind,
        current_value,
        constraints: control.constraints.clone(),
        sub_fields,
        error,
    }
}

fn label_for(registry: &WidgetRegistry, kind: &NodeKind) -> String {
    match kind {
        NodeKind::Widget { type_id } => registry
            .get(type_id)
            .map(|definition| definition.title.clone())
            .unwrap_or_else(|_| type_id.clone()),
        _ => registry.layout(kind.layout_kind()).title.clone(),
    }
}
