//! # Document Tree
//!
//! In-memory model of the page: Containers hold Columns, Columns hold Widgets
//! or nested Containers, Widgets are leaves.
//!
//! Nodes live in an id-keyed arena. A node is owned by its parent's
//! `children` list (or by the root list for top-level Containers); `parent`
//! is a back-reference only.
//!
//! ## Structural rules
//!
//! ```text
//! root      → Container
//! Container → Column
//! Column    → Widget | Container
//! Widget    → (nothing)
//! ```
//!
//! Every insert path checks these rules before touching the arena, so a
//! rejected insert leaves the tree untouched.

use indexmap::IndexMap;
use pagecraft_schema::{LayoutKind, Settings};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeKind {
    Container,
    Column,
    Widget {
        #[serde(rename = "typeId")]
        type_id: String,
    },
}

impl NodeKind {
    pub fn widget(type_id: impl Into<String>) -> Self {
        NodeKind::Widget {
            type_id: type_id.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Container => "container",
            NodeKind::Column => "column",
            NodeKind::Widget { .. } => "widget",
        }
    }

    pub fn type_id(&self) -> Option<&str> {
        match self {
            NodeKind::Widget { type_id } => Some(type_id),
            _ => None,
        }
    }

    pub fn is_widget(&self) -> bool {
        matches!(self, NodeKind::Widget { .. })
    }

    /// Layout schema to use when the node is not a widget
    pub fn layout_kind(&self) -> LayoutKind {
        match self {
            NodeKind::Column => LayoutKind::Column,
            _ => LayoutKind::Container,
        }
    }

    /// Parent/child pairing rule
    pub fn can_contain(&self, child: &NodeKind) -> bool {
        match self {
            NodeKind::Container => matches!(child, NodeKind::Column),
            NodeKind::Column => matches!(child, NodeKind::Widget { .. } | NodeKind::Container),
            NodeKind::Widget { .. } => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub settings: Settings,
}

impl Node {
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Childless, parentless node with a caller-chosen id (imports, templates)
    pub(crate) fn detached(id: NodeId, kind: NodeKind, settings: Settings) -> Self {
        Self {
            id,
            kind,
            parent: None,
            children: Vec::new(),
            settings,
        }
    }
}

/// Generates node ids: a random per-generator seed plus a monotonically
/// increasing counter. The generator is never part of a history snapshot,
/// so ids are not reused after undo.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        let seed: u32 = rand::thread_rng().gen();
        Self::from_seed(format!("{:08x}", seed))
    }

    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    pub fn new_id(&mut self) -> NodeId {
        self.count += 1;
        NodeId(format!("{}-{}", self.seed, self.count))
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("A {child} cannot be placed inside a {parent}")]
    IllegalPlacement {
        parent: &'static str,
        child: &'static str,
    },

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Duplicate node id: {0}")]
    DuplicateId(NodeId),

    #[error("Malformed tree: {0}")]
    Malformed(String),
}

impl TreeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TreeError::NodeNotFound(_))
    }
}

/// Detached subtree, nodes in pre-order with the root first
#[derive(Debug, Clone, PartialEq)]
pub struct Subtree {
    root: NodeId,
    nodes: Vec<Node>,
}

impl Subtree {
    /// Single childless node
    pub fn leaf(mut node: Node) -> Self {
        node.parent = None;
        Self {
            root: node.id.clone(),
            nodes: vec![node],
        }
    }

    /// Attach `child` (a detached subtree) as the last child of `parent`
    /// inside this subtree
    pub fn push_child(&mut self, parent: &NodeId, mut child: Subtree) -> Result<(), TreeError> {
        let position = self
            .nodes
            .iter()
            .position(|node| &node.id == parent)
            .ok_or_else(|| TreeError::NodeNotFound(parent.clone()))?;
        let parent_kind = self.nodes[position].kind.clone();
        let child_kind = child.root_node().kind.clone();
        if !parent_kind.can_contain(&child_kind) {
            return Err(TreeError::IllegalPlacement {
                parent: parent_kind.name(),
                child: child_kind.name(),
            });
        }

        self.nodes[position].children.push(child.root.clone());
        child.nodes[0].parent = Some(parent.clone());
        self.nodes.append(&mut child.nodes);
        Ok(())
    }

    pub fn root(&self) -> &NodeId {
        &self.root
    }

    pub fn root_node(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    /// Rename nodes in pre-order to `fresh`. Returns the old → new id table.
    fn apply_ids(&mut self, fresh: Vec<NodeId>) -> IdRemap {
        let remap: IdRemap = self
            .nodes
            .iter()
            .map(|node| node.id.clone())
            .zip(fresh)
            .collect();

        let lookup = |id: &NodeId| remap.get(id).cloned().unwrap_or_else(|| id.clone());
        for node in &mut self.nodes {
            node.id = lookup(&node.id);
            node.parent = node.parent.as_ref().map(lookup);
            node.children = node.children.iter().map(lookup).collect();
        }
        self.root = lookup(&self.root);
        self.nodes[0].parent = None;
        remap
    }

    /// Pairing rules, parent pointers and reachability within the subtree
    fn check(&self) -> Result<(), TreeError> {
        let index: HashMap<&NodeId, &Node> = self.nodes.iter().map(|node| (&node.id, node)).collect();
        if index.len() != self.nodes.len() {
            return Err(TreeError::Malformed("subtree repeats a node id".to_string()));
        }
        if self.nodes.first().map(|node| &node.id) != Some(&self.root) {
            return Err(TreeError::Malformed("subtree root is not first".to_string()));
        }

        let mut reached = 1;
        for node in &self.nodes {
            for child_id in &node.children {
                let child = index
                    .get(child_id)
                    .ok_or_else(|| TreeError::Malformed(format!("dangling child {}", child_id)))?;
                if !node.kind.can_contain(&child.kind) {
                    return Err(TreeError::IllegalPlacement {
                        parent: node.kind.name(),
                        child: child.kind.name(),
                    });
                }
                if child.parent.as_ref() != Some(&node.id) {
                    return Err(TreeError::Malformed(format!("bad parent pointer on {}", child_id)));
                }
                reached += 1;
            }
        }
        if reached != self.nodes.len() {
            return Err(TreeError::Malformed("subtree has unreachable nodes".to_string()));
        }
        Ok(())
    }
}

/// Old id → new id, in pre-order
pub type IdRemap = IndexMap<NodeId, NodeId>;

/// Structural copy of the tree for history. Excludes the id generator.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeSnapshot {
    nodes: HashMap<NodeId, Node>,
    roots: Vec<NodeId>,
}

impl TreeSnapshot {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }
}

#[derive(Debug, Clone)]
pub struct DocumentTree {
    nodes: HashMap<NodeId, Node>,
    roots: Vec<NodeId>,
    ids: IdGenerator,
}

impl PartialEq for DocumentTree {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes && self.roots == other.roots
    }
}

impl DocumentTree {
    pub fn new() -> Self {
        Self::with_id_generator(IdGenerator::new())
    }

    pub fn with_id_generator(ids: IdGenerator) -> Self {
        Self {
            nodes: HashMap::new(),
            roots: Vec::new(),
            ids,
        }
    }

    /// New detached node with a generated id
    pub fn create_node(&mut self, kind: NodeKind, settings: Settings) -> Node {
        Node {
            id: self.fresh_id(),
            kind,
            parent: None,
            children: Vec::new(),
            settings,
        }
    }

    /// Insert a childless node under `parent` (`None` = top level)
    pub fn insert(&mut self, parent: Option<&NodeId>, node: Node, index: usize) -> Result<NodeId, TreeError> {
        if !node.children.is_empty() {
            return Err(TreeError::Malformed(format!(
                "node {} carries children; insert it as a subtree",
                node.id
            )));
        }
        self.insert_subtree(parent, Subtree::leaf(node), index)
    }

    /// Insert a detached subtree in one step. Validation happens first, so an
    /// error leaves the tree unchanged.
    pub fn insert_subtree(
        &mut self,
        parent: Option<&NodeId>,
        mut subtree: Subtree,
        index: usize,
    ) -> Result<NodeId, TreeError> {
        subtree.check()?;
        self.check_placement(parent, &subtree.root_node().kind)?;
        if let Some(existing) = subtree.nodes.iter().find(|node| self.nodes.contains_key(&node.id)) {
            return Err(TreeError::DuplicateId(existing.id.clone()));
        }

        let root = subtree.root.clone();
        subtree.nodes[0].parent = parent.cloned();
        for node in subtree.nodes {
            self.nodes.insert(node.id.clone(), node);
        }

        let siblings = self.sibling_list_mut(parent)?;
        let index = index.min(siblings.len());
        siblings.insert(index, root.clone());
        Ok(root)
    }

    /// Detach and return a subtree. Missing ids are a no-op so that replays
    /// tolerate already-removed nodes.
    pub fn remove(&mut self, id: &NodeId) -> Option<Subtree> {
        let parent = self.nodes.get(id)?.parent.clone();
        let order = self.descendants(id);

        if let Ok(siblings) = self.sibling_list_mut(parent.as_ref()) {
            siblings.retain(|child| child != id);
        }

        let mut nodes: Vec<Node> = order
            .iter()
            .filter_map(|node_id| self.nodes.remove(node_id))
            .collect();
        nodes[0].parent = None;

        Some(Subtree {
            root: id.clone(),
            nodes,
        })
    }

    /// Ancestor chain from the top-level Container down to `id` (inclusive)
    pub fn find_path(&self, id: &NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut path = vec![self.node(id)?.id.clone()];
        let mut current = self.node(id)?.parent.clone();
        while let Some(parent_id) = current {
            let parent = self.node(&parent_id)?;
            current = parent.parent.clone();
            path.push(parent_id);
        }
        path.reverse();
        Ok(path)
    }

    /// Structural clone with fresh ids for the node and its whole subtree.
    /// The clone is detached; see [`DocumentTree::duplicate`].
    pub fn clone_subtree(&mut self, id: &NodeId) -> Result<(Subtree, IdRemap), TreeError> {
        self.node(id)?;
        let mut nodes: Vec<Node> = self
            .descendants(id)
            .iter()
            .filter_map(|node_id| self.nodes.get(node_id).cloned())
            .collect();
        nodes[0].parent = None;

        let mut subtree = Subtree {
            root: id.clone(),
            nodes,
        };
        let remap = self.reassign_ids(&mut subtree);
        Ok((subtree, remap))
    }

    /// Give a detached subtree (e.g. a template) ids from this tree's generator
    pub fn reassign_ids(&mut self, subtree: &mut Subtree) -> IdRemap {
        let mut fresh = Vec::with_capacity(subtree.len());
        for _ in 0..subtree.len() {
            fresh.push(self.fresh_id());
        }
        subtree.apply_ids(fresh)
    }

    /// Clone a node's subtree and insert the clone right after the original
    pub fn duplicate(&mut self, id: &NodeId) -> Result<(NodeId, IdRemap), TreeError> {
        let parent = self.node(id)?.parent.clone();
        let index = self.index_in_parent(id).unwrap_or(0);
        let (subtree, remap) = self.clone_subtree(id)?;
        let new_id = self.insert_subtree(parent.as_ref(), subtree, index + 1)?;
        Ok((new_id, remap))
    }

    /// Re-parent a node. `index` is the position in the new parent's child
    /// list after the node has been detached.
    pub fn move_node(&mut self, id: &NodeId, new_parent: Option<&NodeId>, index: usize) -> Result<(), TreeError> {
        let kind = self.node(id)?.kind.clone();
        self.check_placement(new_parent, &kind)?;
        if let Some(new_parent) = new_parent {
            if self.is_within(new_parent, id) {
                return Err(TreeError::CycleDetected);
            }
        }

        let old_parent = self.node(id)?.parent.clone();
        self.sibling_list_mut(old_parent.as_ref())?.retain(|child| child != id);

        let siblings = self.sibling_list_mut(new_parent)?;
        let index = index.min(siblings.len());
        siblings.insert(index, id.clone());

        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = new_parent.cloned();
        }
        Ok(())
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node(&self, id: &NodeId) -> Result<&Node, TreeError> {
        self.nodes
            .get(id)
            .ok_or_else(|| TreeError::NodeNotFound(id.clone()))
    }

    pub fn settings_mut(&mut self, id: &NodeId) -> Result<&mut Settings, TreeError> {
        self.nodes
            .get_mut(id)
            .map(|node| &mut node.settings)
            .ok_or_else(|| TreeError::NodeNotFound(id.clone()))
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Children of `parent`, or the top-level Containers for `None`
    pub fn children_of(&self, parent: Option<&NodeId>) -> &[NodeId] {
        match parent {
            None => &self.roots,
            Some(id) => self
                .nodes
                .get(id)
                .map(|node| node.children.as_slice())
                .unwrap_or(&[]),
        }
    }

    pub fn index_in_parent(&self, id: &NodeId) -> Option<usize> {
        let parent = self.nodes.get(id)?.parent.as_ref();
        self.children_of(parent).iter().position(|child| child == id)
    }

    /// True when `id` is `ancestor` or lies inside its subtree
    pub fn is_within(&self, id: &NodeId, ancestor: &NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.nodes.get(node_id).and_then(|node| node.parent.as_ref());
        }
        false
    }

    /// Pre-order ids of `id` and everything below it
    pub fn descendants(&self, id: &NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![id.clone()];
        while let Some(node_id) = stack.pop() {
            if let Some(node) = self.nodes.get(&node_id) {
                stack.extend(node.children.iter().rev().cloned());
                order.push(node_id);
            }
        }
        order
    }

    /// Pre-order walk of the whole document
    pub fn walk(&self) -> Vec<&Node> {
        self.roots
            .iter()
            .flat_map(|root| self.descendants(root))
            .filter_map(|id| self.nodes.get(&id))
            .collect()
    }

    /// Container or Column with no children. Render state only; the
    /// placeholder is never a node.
    pub fn shows_placeholder(&self, id: &NodeId) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|node| !node.kind.is_widget() && node.children.is_empty())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Next generated id not already present (imported documents may carry
    /// ids from another generator)
    pub fn fresh_id(&mut self) -> NodeId {
        loop {
            let id = self.ids.new_id();
            if !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }

    pub fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            nodes: self.nodes.clone(),
            roots: self.roots.clone(),
        }
    }

    /// Replace the structure with a snapshot; the id generator keeps counting
    pub fn restore(&mut self, snapshot: TreeSnapshot) {
        self.nodes = snapshot.nodes;
        self.roots = snapshot.roots;
    }

    pub fn matches_snapshot(&self, snapshot: &TreeSnapshot) -> bool {
        self.nodes == snapshot.nodes && self.roots == snapshot.roots
    }

    /// Check every structural invariant of the document
    pub fn validate(&self) -> Result<(), TreeError> {
        let mut seen = HashSet::new();
        for root in &self.roots {
            let node = self.node(root)?;
            if node.kind != NodeKind::Container {
                return Err(TreeError::IllegalPlacement {
                    parent: "document",
                    child: node.kind.name(),
                });
            }
            if node.parent.is_some() {
                return Err(TreeError::Malformed(format!("root {} has a parent", root)));
            }
            for id in self.descendants(root) {
                if !seen.insert(id.clone()) {
                    return Err(TreeError::Malformed(format!("{} is reachable twice", id)));
                }
                let node = self.node(&id)?;
                for child_id in &node.children {
                    let child = self
                        .nodes
                        .get(child_id)
                        .ok_or_else(|| TreeError::Malformed(format!("dangling child {}", child_id)))?;
                    if !node.kind.can_contain(&child.kind) {
                        return Err(TreeError::IllegalPlacement {
                            parent: node.kind.name(),
                            child: child.kind.name(),
                        });
                    }
                    if child.parent.as_ref() != Some(&node.id) {
                        return Err(TreeError::Malformed(format!("bad parent pointer on {}", child_id)));
                    }
                }
            }
        }
        if seen.len() != self.nodes.len() {
            return Err(TreeError::Malformed("tree has detached nodes".to_string()));
        }
        Ok(())
    }

    fn check_placement(&self, parent: Option<&NodeId>, child: &NodeKind) -> Result<(), TreeError> {
        match parent {
            None if *child == NodeKind::Container => Ok(()),
            None => Err(TreeError::IllegalPlacement {
                parent: "document",
                child: child.name(),
            }),
            Some(parent_id) => {
                let parent = self.node(parent_id)?;
                if parent.kind.can_contain(child) {
                    Ok(())
                } else {
                    Err(TreeError::IllegalPlacement {
                        parent: parent.kind.name(),
                        child: child.name(),
                    })
                }
            }
        }
    }

    fn sibling_list_mut(&mut self, parent: Option<&NodeId>) -> Result<&mut Vec<NodeId>, TreeError> {
        match parent {
            None => Ok(&mut self.roots),
            Some(id) => self
                .nodes
                .get_mut(id)
                .map(|node| &mut node.children)
                .ok_or_else(|| TreeError::NodeNotFound(id.clone())),
        }
    }
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}
