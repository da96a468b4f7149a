//! # Render Engine
//!
//! Walks the document depth-first. Widgets call their definition's render
//! function with applied settings; Containers and Columns render wrapper
//! chrome and recurse.
//!
//! The output is a [`Fragment`] tree keyed by node id. The [`Canvas`] holds
//! the fragments of the whole document so a re-rendered subtree can replace
//! its old fragment in place.

use crate::config::EditorConfig;
use crate::errors::EditorError;
use crate::tree::{DocumentTree, Node, NodeId, NodeKind};
use pagecraft_schema::markup::Tag;
use pagecraft_schema::widgets::layout::{column_styles, container_styles};
use pagecraft_schema::widgets::{advanced_styles, CSS_CLASSES, ELEMENT_ID};
use pagecraft_schema::{Settings, SettingsExt, WidgetRegistry};
use tracing::{instrument, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Toolbars, `data-node-id` / `data-action` hooks and placeholders
    #[default]
    Editor,
    /// Clean markup for export
    Preview,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub mode: RenderMode,
    pub class_prefix: String,
    pub placeholder_label: String,
}

impl RenderOptions {
    pub fn editor(config: &EditorConfig) -> Self {
        Self {
            mode: RenderMode::Editor,
            class_prefix: config.class_prefix.clone(),
            placeholder_label: config.placeholder_label.clone(),
        }
    }

    pub fn preview(config: &EditorConfig) -> Self {
        Self {
            mode: RenderMode::Preview,
            ..Self::editor(config)
        }
    }

    fn class(&self, name: &str) -> String {
        format!("{}-{}", self.class_prefix, name)
    }

    fn is_editor(&self) -> bool {
        self.mode == RenderMode::Editor
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::editor(&EditorConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FragmentBody {
    /// Widget markup, already complete
    Leaf(String),
    /// Layout chrome around child fragments
    Wrapper {
        open: String,
        children: Vec<Fragment>,
        /// Empty-state markup shown instead of children
        placeholder: Option<String>,
        close: String,
    },
}

/// Rendered markup of one node and its subtree
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub node_id: NodeId,
    pub body: FragmentBody,
}

impl Fragment {
    pub fn html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match &self.body {
            FragmentBody::Leaf(html) => out.push_str(html),
            FragmentBody::Wrapper {
                open,
                children,
                placeholder,
                close,
            } => {
                out.push_str(open);
                for child in children {
                    child.write_html(out);
                }
                if let Some(placeholder) = placeholder {
                    out.push_str(placeholder);
                }
                out.push_str(close);
            }
        }
    }

    pub fn find(&self, id: &NodeId) -> Option<&Fragment> {
        if &self.node_id == id {
            return Some(self);
        }
        match &self.body {
            FragmentBody::Leaf(_) => None,
            FragmentBody::Wrapper { children, .. } => children.iter().find_map(|child| child.find(id)),
        }
    }

    fn find_mut(&mut self, id: &NodeId) -> Option<&mut Fragment> {
        if &self.node_id == id {
            return Some(self);
        }
        match &mut self.body {
            FragmentBody::Leaf(_) => None,
            FragmentBody::Wrapper { children, .. } => children.iter_mut().find_map(|child| child.find_mut(id)),
        }
    }

    pub fn shows_placeholder(&self) -> bool {
        matches!(&self.body, FragmentBody::Wrapper { placeholder: Some(_), .. })
    }

    fn remove_descendant(&mut self, id: &NodeId) -> bool {
        match &mut self.body {
            FragmentBody::Leaf(_) => false,
            FragmentBody::Wrapper { children, .. } => {
                if let Some(position) = children.iter().position(|child| &child.node_id == id) {
                    children.remove(position);
                    return true;
                }
                children.iter_mut().any(|child| child.remove_descendant(id))
            }
        }
    }
}

/// Live model of the rendered page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Canvas {
    roots: Vec<Fragment>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn html(&self) -> String {
        self.roots.iter().map(Fragment::html).collect()
    }

    pub fn roots(&self) -> &[Fragment] {
        &self.roots
    }

    pub fn find(&self, id: &NodeId) -> Option<&Fragment> {
        self.roots.iter().find_map(|root| root.find(id))
    }

    pub fn subtree_html(&self, id: &NodeId) -> Option<String> {
        self.find(id).map(Fragment::html)
    }

    /// Swap the fragment with the same node id. Returns false when the node
    /// is not on the canvas.
    pub fn replace(&mut self, fragment: Fragment) -> bool {
        match self.roots.iter_mut().find_map(|root| root.find_mut(&fragment.node_id)) {
            Some(slot) => {
                *slot = fragment;
                true
            }
            None => false,
        }
    }

    pub fn insert_root(&mut self, index: usize, fragment: Fragment) {
        let index = index.min(self.roots.len());
        self.roots.insert(index, fragment);
    }

    pub fn remove(&mut self, id: &NodeId) -> bool {
        if let Some(position) = self.roots.iter().position(|root| &root.node_id == id) {
            self.roots.remove(position);
            return true;
        }
        self.roots.iter_mut().any(|root| root.remove_descendant(id))
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

pub struct RenderEngine<'a> {
    registry: &'a WidgetRegistry,
    options: &'a RenderOptions,
}

impl<'a> RenderEngine<'a> {
    pub fn new(registry: &'a WidgetRegistry, options: &'a RenderOptions) -> Self {
        Self { registry, options }
    }

    /// Render every top-level Container
    #[instrument(skip_all, fields(nodes = tree.len()))]
    pub fn render_document(&self, tree: &DocumentTree) -> Result<Canvas, EditorError> {
        let roots = tree
            .roots()
            .iter()
            .map(|root| self.render_subtree(tree, root))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Canvas { roots })
    }

    pub fn render_subtree(&self, tree: &DocumentTree, id: &NodeId) -> Result<Fragment, EditorError> {
        let node = tree.node(id)?;
        trace!(node_id = %id, kind = node.kind().name(), "Rendering node");

        let body = match node.kind() {
            NodeKind::Widget { type_id } => FragmentBody::Leaf(self.render_widget(node, type_id)?),
            NodeKind::Container | NodeKind::Column => {
                let children = node
                    .children()
                    .iter()
                    .map(|child| self.render_subtree(tree, child))
                    .collect::<Result<Vec<_>, _>>()?;
                self.render_layout(node, children)
            }
        };

        Ok(Fragment {
            node_id: id.clone(),
            body,
        })
    }

    fn render_widget(&self, node: &Node, type_id: &str) -> Result<String, EditorError> {
        let definition = self.registry.get(type_id)?;
        let settings = definition.schema().applied_settings(&node.settings);
        let content = definition.render(&settings);

        let inner = Tag::new("div")
            .class(self.options.class("widget-container"))
            .styles(&advanced_styles(&settings))
            .html(&content)
            .build();

        let mut wrapper = self
            .element(node, &settings)
            .class(self.options.class("widget"))
            .class(self.options.class(&format!("widget-{}", type_id)));
        if self.options.is_editor() {
            wrapper = wrapper.attr("data-type-id", type_id);
            wrapper = wrapper.html(&self.toolbar(node.id(), &definition.title));
        }
        Ok(wrapper.html(&inner).build())
    }

    fn render_layout(&self, node: &Node, children: Vec<Fragment>) -> FragmentBody {
        let kind = node.kind().layout_kind();
        let layout = self.registry.layout(kind);
        let settings = layout.schema().applied_settings(&node.settings);

        let (tag, name, styles) = match node.kind() {
            NodeKind::Column => ("div", "column", column_styles(&settings)),
            _ => ("section", "container", container_styles(&settings)),
        };

        let element = self
            .element_with_tag(tag, node, &settings)
            .class(self.options.class(name))
            .styles(&styles);

        let mut open = element.open();
        if self.options.is_editor() {
            open.push_str(&self.toolbar(node.id(), &layout.title));
        }

        let placeholder = (children.is_empty() && self.options.is_editor()).then(|| {
            Tag::new("div")
                .class(self.options.class("placeholder"))
                .attr("data-node-id", node.id().as_str())
                .attr("data-action", "add")
                .text(&self.options.placeholder_label)
                .build()
        });

        FragmentBody::Wrapper {
            open,
            children,
            placeholder,
            close: element.close(),
        }
    }

    fn element(&self, node: &Node, settings: &Settings) -> Tag {
        self.element_with_tag("div", node, settings)
    }

    /// Outer element carrying identity: editor hooks or the user's CSS id
    /// and classes
    fn element_with_tag(&self, tag: &str, node: &Node, settings: &Settings) -> Tag {
        let mut element = Tag::new(tag);
        if self.options.is_editor() {
            element = element
                .class(self.options.class("element"))
                .attr("data-node-id", node.id().as_str());
        }
        if let Some(classes) = settings.text_of(CSS_CLASSES) {
            for class in classes.split_whitespace() {
                element = element.class(class);
            }
        }
        element.attr_if(
            settings.text_of(ELEMENT_ID).is_some(),
            "id",
            settings.text_of(ELEMENT_ID).unwrap_or_default(),
        )
    }

    fn toolbar(&self, id: &NodeId, title: &str) -> String {
        let button = |action: &str, label: &str| {
            Tag::new("button")
                .class(self.options.class("toolbar-button"))
                .attr("type", "button")
                .attr("data-action", action)
                .attr("data-node-id", id.as_str())
                .attr("title", label)
                .text(label)
                .build()
        };

        Tag::new("div")
            .class(self.options.class("toolbar"))
            .html(&Tag::new("span").class(self.options.class("toolbar-title")).text(title).build())
            .html(&button("select", "Edit"))
            .html(&button("duplicate", "Duplicate"))
            .html(&button("delete", "Delete"))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::IdGenerator;
    use serde_json::json;

    struct Page {
        tree: DocumentTree,
        container: NodeId,
        column: NodeId,
        widget: NodeId,
    }

    fn page() -> Page {
        let mut tree = DocumentTree::with_id_generator(IdGenerator::from_seed("r"));
        let container = tree.create_node(NodeKind::Container, Settings::new());
        let container = tree.insert(None, container, 0).unwrap();
        let column = tree.create_node(NodeKind::Column, Settings::new());
        let column = tree.insert(Some(&container), column, 0).unwrap();
        let mut settings = Settings::new();
        settings.insert("title".to_string(), json!("Hello"));
        let widget = tree.create_node(NodeKind::widget("heading"), settings);
        let widget = tree.insert(Some(&column), widget, 0).unwrap();
        Page {
            tree,
            container,
            column,
            widget,
        }
    }

    #[test]
    fn test_editor_chrome() {
        let page = page();
        let registry = WidgetRegistry::with_builtins().unwrap();
        let options = RenderOptions::default();
        let canvas = RenderEngine::new(&registry, &options).render_document(&page.tree).unwrap();

        let html = canvas.html();
        assert!(html.starts_with("<section class=\"pc-element pc-container\" data-node-id=\"r-1\""));
        assert!(html.contains("data-action=\"duplicate\" data-node-id=\"r-3\""));
        assert!(html.contains("<h2 class=\"pc-heading-title\">Hello</h2>"));
        assert!(!html.contains("pc-placeholder"));
    }

    #[test]
    fn test_preview_has_no_editor_hooks() {
        let page = page();
        let registry = WidgetRegistry::with_builtins().unwrap();
        let options = RenderOptions::preview(&EditorConfig::default());
        let html = RenderEngine::new(&registry, &options)
            .render_document(&page.tree)
            .unwrap()
            .html();

        assert!(!html.contains("data-node-id"));
        assert!(!html.contains("pc-toolbar"));
        assert!(html.contains("pc-widget-heading"));
    }

    #[test]
    fn test_empty_column_shows_placeholder() {
        let mut page = page();
        page.tree.remove(&page.widget);
        let registry = WidgetRegistry::with_builtins().unwrap();
        let options = RenderOptions::default();
        let canvas = RenderEngine::new(&registry, &options).render_document(&page.tree).unwrap();

        let column = canvas.find(&page.column).unwrap();
        assert!(column.shows_placeholder());
        assert!(column.html().contains("Drag widget here"));
        assert!(!canvas.find(&page.container).unwrap().shows_placeholder());
    }

    #[test]
    fn test_render_is_idempotent() {
        let page = page();
        let registry = WidgetRegistry::with_builtins().unwrap();
        let options = RenderOptions::default();
        let engine = RenderEngine::new(&registry, &options);

        let first = engine.render_subtree(&page.tree, &page.container).unwrap();
        let second = engine.render_subtree(&page.tree, &page.container).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.html(), second.html());
    }

    #[test]
    fn test_replace_swaps_subtree_in_place() {
        let mut page = page();
        let registry = WidgetRegistry::with_builtins().unwrap();
        let options = RenderOptions::default();
        let engine = RenderEngine::new(&registry, &options);
        let mut canvas = engine.render_document(&page.tree).unwrap();

        page.tree
            .settings_mut(&page.widget)
            .unwrap()
            .insert("title".to_string(), json!("Changed"));
        let fragment = engine.render_subtree(&page.tree, &page.widget).unwrap();
        assert!(canvas.replace(fragment));

        assert!(canvas.html().contains(">Changed</h2>"));
        assert_eq!(canvas, engine.render_document(&page.tree).unwrap());
    }

    #[test]
    fn test_custom_class_prefix_and_css_id() {
        let mut page = page();
        page.tree
            .settings_mut(&page.widget)
            .unwrap()
            .insert(ELEMENT_ID.to_string(), json!("hero"));
        let registry = WidgetRegistry::with_builtins().unwrap();
        let config = EditorConfig {
            class_prefix: "site".to_string(),
            ..EditorConfig::default()
        };
        let options = RenderOptions::preview(&config);
        let html = RenderEngine::new(&registry, &options)
            .render_subtree(&page.tree, &page.widget)
            .unwrap()
            .html();

        assert!(html.starts_with("<div class=\"site-widget site-widget-heading\" id=\"hero\">"));
    }
}
