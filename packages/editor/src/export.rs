//! # Document Export / Import
//!
//! Ordered JSON form of the tree:
//!
//! ```json
//! [{ "id": "…", "kind": "container", "settings": {}, "children": [
//!     { "id": "…", "kind": "column", "settings": {}, "children": [
//!         { "id": "…", "kind": "widget", "typeId": "heading", "settings": {}, "children": [] }
//!     ]}
//! ]}]
//! ```
//!
//! Import rebuilds the arena and checks every structural rule and widget
//! type before the result is handed back.

use crate::errors::EditorError;
use crate::tree::{DocumentTree, IdGenerator, Node, NodeId, NodeKind, Subtree, TreeError};
use pagecraft_schema::{RegistryError, Settings, WidgetRegistry};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedNode {
    pub id: NodeId,

    #[serde(flatten)]
    pub kind: NodeKind,

    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub children: Vec<ExportedNode>,
}

impl ExportedNode {
    /// Convert to a detached subtree, checking pairing on the way
    pub fn into_subtree(self) -> Result<Subtree, TreeError> {
        let ExportedNode {
            id,
            kind,
            settings,
            children,
        } = self;
        let mut subtree = Subtree::leaf(Node::detached(id.clone(), kind, settings));
        for child in children {
            subtree.push_child(&id, child.into_subtree()?)?;
        }
        Ok(subtree)
    }

    /// Every widget type in the subtree must be registered
    pub fn check_types(&self, registry: &WidgetRegistry) -> Result<(), RegistryError> {
        if let Some(type_id) = self.kind.type_id() {
            registry.get(type_id)?;
        }
        for child in &self.children {
            child.check_types(registry)?;
        }
        Ok(())
    }
}

pub fn export_node(tree: &DocumentTree, id: &NodeId) -> Result<ExportedNode, TreeError> {
    let node = tree.node(id)?;
    let children = node
        .children()
        .iter()
        .map(|child| export_node(tree, child))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExportedNode {
        id: node.id().clone(),
        kind: node.kind().clone(),
        settings: node.settings.clone(),
        children,
    })
}

pub fn export_tree(tree: &DocumentTree) -> Result<Vec<ExportedNode>, TreeError> {
    tree.roots().iter().map(|root| export_node(tree, root)).collect()
}

pub fn to_json(tree: &DocumentTree, pretty: bool) -> Result<String, EditorError> {
    let exported = export_tree(tree)?;
    let json = if pretty {
        serde_json::to_string_pretty(&exported)?
    } else {
        serde_json::to_string(&exported)?
    };
    Ok(json)
}

/// Build a document from exported nodes. Ids are kept as-is; the generator
/// skips any id the document already uses.
pub fn import_document(
    nodes: Vec<ExportedNode>,
    registry: &WidgetRegistry,
    ids: IdGenerator,
) -> Result<DocumentTree, EditorError> {
    for node in &nodes {
        node.check_types(registry)?;
    }

    let mut tree = DocumentTree::with_id_generator(ids);
    for node in nodes {
        let index = tree.roots().len();
        tree.insert_subtree(None, node.into_subtree()?, index)?;
    }
    tree.validate()?;

    info!(nodes = tree.len(), "Imported document");
    Ok(tree)
}

pub fn from_json(json: &str) -> Result<Vec<ExportedNode>, EditorError> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a template: either one exported node or a list of them
pub fn template_from_json(json: &str) -> Result<Vec<ExportedNode>, EditorError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Template {
        Many(Vec<ExportedNode>),
        One(ExportedNode),
    }

    Ok(match serde_json::from_str(json)? {
        Template::Many(nodes) => nodes,
        Template::One(node) => vec![node],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_json() -> serde_json::Value {
        json!([{
            "id": "c1",
            "kind": "container",
            "settings": { "gap": 20 },
            "children": [{
                "id": "col1",
                "kind": "column",
                "children": [{
                    "id": "w1",
                    "kind": "widget",
                    "typeId": "heading",
                    "settings": { "title": "Hello" }
                }]
            }]
        }])
    }

    #[test]
    fn test_import_then_export_preserves_order_and_ids() {
        let registry = WidgetRegistry::with_builtins().unwrap();
        let nodes = from_json(&sample_json().to_string()).unwrap();
        let tree = import_document(nodes, &registry, IdGenerator::from_seed("i")).unwrap();

        assert_eq!(tree.len(), 3);
        let widget = tree.node(&NodeId::from("w1")).unwrap();
        assert_eq!(widget.kind(), &NodeKind::widget("heading"));
        assert_eq!(widget.parent(), Some(&NodeId::from("col1")));

        let exported = serde_json::to_value(export_tree(&tree).unwrap()).unwrap();
        assert_eq!(exported[0]["children"][0]["children"][0]["typeId"], json!("heading"));
        assert_eq!(exported[0]["settings"]["gap"], json!(20));
    }

    #[test]
    fn test_import_rejects_unknown_types() {
        let registry = WidgetRegistry::with_builtins().unwrap();
        let mut doc = sample_json();
        doc[0]["children"][0]["children"][0]["typeId"] = json!("carousel");

        let nodes = from_json(&doc.to_string()).unwrap();
        let err = import_document(nodes, &registry, IdGenerator::from_seed("i")).unwrap_err();
        assert_eq!(err, EditorError::Registry(RegistryError::UnknownType("carousel".to_string())));
    }

    #[test]
    fn test_import_rejects_illegal_nesting() {
        let registry = WidgetRegistry::with_builtins().unwrap();
        let doc = json!([{
            "id": "c1",
            "kind": "container",
            "children": [{ "id": "w1", "kind": "widget", "typeId": "text" }]
        }]);

        let nodes = from_json(&doc.to_string()).unwrap();
        let err = import_document(nodes, &registry, IdGenerator::from_seed("i")).unwrap_err();
        assert!(matches!(err, EditorError::Tree(TreeError::IllegalPlacement { .. })));
    }

    #[test]
    fn test_import_rejects_duplicate_ids() {
        let registry = WidgetRegistry::with_builtins().unwrap();
        let doc = json!([
            { "id": "c1", "kind": "container" },
            { "id": "c1", "kind": "container" }
        ]);

        let nodes = from_json(&doc.to_string()).unwrap();
        let err = import_document(nodes, &registry, IdGenerator::from_seed("i")).unwrap_err();
        assert_eq!(err, EditorError::Tree(TreeError::DuplicateId(NodeId::from("c1"))));
    }

    #[test]
    fn test_template_accepts_single_node() {
        let single = json!({ "id": "w", "kind": "widget", "typeId": "spacer" });
        let nodes = template_from_json(&single.to_string()).unwrap();
        assert_eq!(nodes.len(), 1);

        let many = template_from_json(&sample_json().to_string()).unwrap();
        assert_eq!(many.len(), 1);
        assert_eq!(many[0].children.len(), 1);
    }
}
