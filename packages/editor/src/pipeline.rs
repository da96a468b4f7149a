//! # Settings Update Pipeline
//!
//! Resolves a single inspector edit into a write against one settings key:
//!
//! 1. Look up the node and the control in the node's schema
//! 2. Refuse controls hidden by their condition
//! 3. Validate and normalize the raw input
//! 4. Compare with the effective value; unchanged writes are dropped
//!
//! Resolution never touches the tree. The caller snapshots history, applies
//! the [`SettingWrite`] and re-renders the node's subtree.

use crate::errors::EditorError;
use crate::tree::{DocumentTree, NodeId};
use pagecraft_schema::{ControlSpec, Schema, Settings, ValidationError, WidgetRegistry};
use serde_json::Value;
use tracing::debug;

/// A validated change to one settings key
#[derive(Debug, Clone, PartialEq)]
pub struct SettingWrite {
    pub node_id: NodeId,
    pub key: String,
    /// `None` removes the key so it falls back to the default
    pub value: Option<Value>,
}

impl SettingWrite {
    /// Returns the previously stored value
    pub fn apply(self, tree: &mut DocumentTree) -> Result<Option<Value>, EditorError> {
        let settings = tree.settings_mut(&self.node_id)?;
        let previous = match self.value {
            Some(value) => settings.insert(self.key, value),
            None => settings.shift_remove(&self.key),
        };
        Ok(previous)
    }
}

/// Resolve `update_setting(node, control, raw)`. `Ok(None)` means the value
/// would not change.
pub fn resolve_update(
    registry: &WidgetRegistry,
    tree: &DocumentTree,
    node_id: &NodeId,
    control_name: &str,
    raw: &Value,
) -> Result<Option<SettingWrite>, EditorError> {
    let stored = &tree.node(node_id)?.settings;
    let schema = schema_of(registry, tree, node_id)?;
    let effective = schema.effective_settings(stored);
    let control = active_control(&schema, &effective, control_name)?;

    let value = control.normalize(raw)?;
    Ok(changed_write(node_id, control, &effective, value))
}

/// Resolve an edit of one sub-field of a compound control (typography,
/// dimensions, text shadow, media)
pub fn resolve_sub_field(
    registry: &WidgetRegistry,
    tree: &DocumentTree,
    node_id: &NodeId,
    control_name: &str,
    field: &str,
    raw: &Value,
) -> Result<Option<SettingWrite>, EditorError> {
    let stored = &tree.node(node_id)?.settings;
    let schema = schema_of(registry, tree, node_id)?;
    let effective = schema.effective_settings(stored);
    let control = active_control(&schema, &effective, control_name)?;

    if !control.kind.is_compound() {
        return Err(ValidationError::UnknownSubField {
            control: control.name.clone(),
            field: field.to_string(),
        }
        .into());
    }

    let current = effective.get(&control.name).unwrap_or(&Value::Null);
    let value = control.merge_sub_field(current, field, raw)?;
    Ok(changed_write(node_id, control, &effective, value))
}

/// Resolve removing a stored key. `Ok(None)` when nothing is stored.
pub fn resolve_reset(
    registry: &WidgetRegistry,
    tree: &DocumentTree,
    node_id: &NodeId,
    control_name: &str,
) -> Result<Option<SettingWrite>, EditorError> {
    let stored = &tree.node(node_id)?.settings;
    let schema = schema_of(registry, tree, node_id)?;
    if schema.control(control_name).is_none() {
        return Err(ValidationError::UnknownControl {
            control: control_name.to_string(),
        }
        .into());
    }

    Ok(stored.contains_key(control_name).then(|| SettingWrite {
        node_id: node_id.clone(),
        key: control_name.to_string(),
        value: None,
    }))
}

fn schema_of<'r>(
    registry: &'r WidgetRegistry,
    tree: &DocumentTree,
    node_id: &NodeId,
) -> Result<Schema<'r>, EditorError> {
    let kind = tree.node(node_id)?.kind();
    Ok(registry.schema_for(kind.layout_kind(), kind.type_id())?)
}

fn active_control<'s>(
    schema: &Schema<'s>,
    effective: &Settings,
    control_name: &str,
) -> Result<&'s ControlSpec, EditorError> {
    let control = schema
        .control(control_name)
        .ok_or_else(|| ValidationError::UnknownControl {
            control: control_name.to_string(),
        })?;
    if !control.is_active(effective) {
        return Err(ValidationError::Inactive {
            control: control_name.to_string(),
        }
        .into());
    }
    Ok(control)
}

fn changed_write(node_id: &NodeId, control: &ControlSpec, effective: &Settings, value: Value) -> Option<SettingWrite> {
    if effective.get(&control.name) == Some(&value) {
        debug!(node_id = %node_id, control = %control.name, "Setting unchanged");
        return None;
    }
    Some(SettingWrite {
        node_id: node_id.clone(),
        key: control.name.clone(),
        value: Some(value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{IdGenerator, NodeKind};
    use serde_json::json;

    fn setup(type_id: &str) -> (WidgetRegistry, DocumentTree, NodeId) {
        let registry = WidgetRegistry::with_builtins().unwrap();
        let mut tree = DocumentTree::with_id_generator(IdGenerator::from_seed("u"));
        let container = tree.create_node(NodeKind::Container, Settings::new());
        let container = tree.insert(None, container, 0).unwrap();
        let column = tree.create_node(NodeKind::Column, Settings::new());
        let column = tree.insert(Some(&container), column, 0).unwrap();
        let widget = tree.create_node(NodeKind::widget(type_id), Settings::new());
        let widget = tree.insert(Some(&column), widget, 0).unwrap();
        (registry, tree, widget)
    }

    #[test]
    fn test_update_writes_normalized_value() {
        let (registry, mut tree, widget) = setup("spacer");

        let write = resolve_update(&registry, &tree, &widget, "space", &json!(9000))
            .unwrap()
            .unwrap();
        assert_eq!(write.value, Some(json!(600)));

        assert_eq!(write.apply(&mut tree).unwrap(), None);
        assert_eq!(tree.node(&widget).unwrap().settings["space"], json!(600));
    }

    #[test]
    fn test_unchanged_value_is_skipped() {
        let (registry, tree, widget) = setup("spacer");
        let write = resolve_update(&registry, &tree, &widget, "space", &json!(50)).unwrap();
        assert_eq!(write, None);
    }

    #[test]
    fn test_invalid_value_is_a_validation_error() {
        let (registry, tree, widget) = setup("heading");

        let err = resolve_update(&registry, &tree, &widget, "header_size", &json!("h9")).unwrap_err();
        assert!(matches!(err, EditorError::Validation(ValidationError::NotAnOption { .. })));

        let err = resolve_update(&registry, &tree, &widget, "nope", &json!("x")).unwrap_err();
        assert!(matches!(err, EditorError::Validation(ValidationError::UnknownControl { .. })));
    }

    #[test]
    fn test_hidden_control_is_inactive() {
        let (registry, tree, widget) = setup("heading");
        let err = resolve_update(
            &registry,
            &tree,
            &widget,
            "text_shadow",
            &json!({ "color": "#000000", "blur": 2 }),
        )
        .unwrap_err();
        assert!(matches!(err, EditorError::Validation(ValidationError::Inactive { .. })));
    }

    #[test]
    fn test_sub_field_merges_into_compound_value() {
        let (registry, mut tree, widget) = setup("heading");

        let write = resolve_sub_field(&registry, &tree, &widget, "typography", "family", &json!("Roboto"))
            .unwrap()
            .unwrap();
        write.apply(&mut tree).unwrap();

        let write = resolve_sub_field(&registry, &tree, &widget, "typography", "weight", &json!("700"))
            .unwrap()
            .unwrap();
        write.apply(&mut tree).unwrap();

        let typography = &tree.node(&widget).unwrap().settings["typography"];
        assert_eq!(typography["family"], json!("Roboto"));
        assert_eq!(typography["weight"], json!("700"));

        let err = resolve_sub_field(&registry, &tree, &widget, "title", "family", &json!("x")).unwrap_err();
        assert!(matches!(err, EditorError::Validation(ValidationError::UnknownSubField { .. })));
    }

    #[test]
    fn test_reset_removes_stored_key() {
        let (registry, mut tree, widget) = setup("heading");
        assert_eq!(resolve_reset(&registry, &tree, &widget, "title").unwrap(), None);

        resolve_update(&registry, &tree, &widget, "title", &json!("Custom"))
            .unwrap()
            .unwrap()
            .apply(&mut tree)
            .unwrap();

        let write = resolve_reset(&registry, &tree, &widget, "title").unwrap().unwrap();
        assert_eq!(write.apply(&mut tree).unwrap(), Some(json!("Custom")));
        assert!(!tree.node(&widget).unwrap().settings.contains_key("title"));
    }
}
