//! # Widget Registry
//!
//! Maps widget type ids to their definitions. Built once at editor startup
//! and read-only afterwards.

use crate::definition::{LayoutDefinition, Schema, WidgetDefinition};
use crate::errors::RegistryError;
use crate::settings::Settings;
use crate::widgets;
use indexmap::IndexMap;
use tracing::debug;

/// Structural node kinds that have a schema but no widget type id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Container,
    Column,
}

#[derive(Debug)]
pub struct WidgetRegistry {
    definitions: IndexMap<String, WidgetDefinition>,
    container: LayoutDefinition,
    column: LayoutDefinition,
}

impl WidgetRegistry {
    /// Registry with only the structural schemas
    pub fn new() -> Self {
        Self {
            definitions: IndexMap::new(),
            container: widgets::layout::container_definition(),
            column: widgets::layout::column_definition(),
        }
    }

    /// Registry with the built-in widget library.
    ///
    /// A duplicate here is a programming error; callers treat it as fatal.
    pub fn with_builtins() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for definition in widgets::builtin_definitions() {
            registry.register(definition)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, definition: WidgetDefinition) -> Result<(), RegistryError> {
        if self.definitions.contains_key(&definition.type_id) {
            return Err(RegistryError::DuplicateType(definition.type_id));
        }
        debug!(type_id = %definition.type_id, category = %definition.category, "Registering widget");
        self.definitions.insert(definition.type_id.clone(), definition);
        Ok(())
    }

    pub fn get(&self, type_id: &str) -> Result<&WidgetDefinition, RegistryError> {
        self.definitions
            .get(type_id)
            .ok_or_else(|| RegistryError::UnknownType(type_id.to_string()))
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.definitions.contains_key(type_id)
    }

    /// Fresh copy of a type's defaults; never aliases another node's settings
    pub fn default_settings_for(&self, type_id: &str) -> Result<Settings, RegistryError> {
        Ok(self.get(type_id)?.default_settings.clone())
    }

    pub fn layout(&self, kind: LayoutKind) -> &LayoutDefinition {
        match kind {
            LayoutKind::Container => &self.container,
            LayoutKind::Column => &self.column,
        }
    }

    /// Schema of a widget type, or of a layout kind when `type_id` is `None`
    pub fn schema_for(&self, kind: LayoutKind, type_id: Option<&str>) -> Result<Schema<'_>, RegistryError> {
        match type_id {
            Some(type_id) => Ok(self.get(type_id)?.schema()),
            None => Ok(self.layout(kind).schema()),
        }
    }

    /// Widget types grouped by category, both in registration order
    pub fn categories(&self) -> Vec<(String, Vec<&WidgetDefinition>)> {
        let mut grouped: IndexMap<String, Vec<&WidgetDefinition>> = IndexMap::new();
        for definition in self.definitions.values() {
            grouped
                .entry(definition.category.clone())
                .or_default()
                .push(definition);
        }
        grouped.into_iter().collect()
    }

    pub fn type_ids(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{ControlGroup, ControlSpec, Tab};
    use serde_json::json;

    fn noop(_: &Settings) -> String {
        String::new()
    }

    fn definition(type_id: &str) -> WidgetDefinition {
        WidgetDefinition::new(
            type_id,
            "Test",
            "basic",
            vec![ControlGroup::new(Tab::Content, "Content", vec![ControlSpec::text("title", "Title", "x")])],
            noop,
        )
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = WidgetRegistry::new();
        registry.register(definition("card")).unwrap();

        let err = registry.register(definition("card")).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateType("card".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_unknown_type() {
        let registry = WidgetRegistry::new();
        assert_eq!(
            registry.get("nope").unwrap_err(),
            RegistryError::UnknownType("nope".to_string())
        );
    }

    #[test]
    fn test_default_settings_are_independent_copies() {
        let mut registry = WidgetRegistry::new();
        registry.register(definition("card")).unwrap();

        let mut first = registry.default_settings_for("card").unwrap();
        let second = registry.default_settings_for("card").unwrap();
        first.insert("title".to_string(), json!("changed"));

        assert_eq!(second["title"], json!("x"));
        assert_eq!(registry.get("card").unwrap().default_settings["title"], json!("x"));
    }

    #[test]
    fn test_builtins_register_cleanly() {
        let registry = WidgetRegistry::with_builtins().unwrap();
        for type_id in ["heading", "text", "button", "image", "divider", "spacer", "video"] {
            assert!(registry.contains(type_id), "missing {}", type_id);
        }

        let categories = registry.categories();
        assert_eq!(categories[0].0, "basic");
    }

    #[test]
    fn test_layout_schemas() {
        let registry = WidgetRegistry::new();
        let schema = registry.schema_for(LayoutKind::Container, None).unwrap();
        assert!(schema.control("direction").is_some());

        let schema = registry.schema_for(LayoutKind::Column, None).unwrap();
        assert!(schema.control("width").is_some());
    }
}
