//! # Widget Definitions
//!
//! A widget type is plain data: defaults, a control schema and a render
//! function. There is no widget base class; behavior is dispatched through
//! the registry by type id.

use crate::controls::{ControlGroup, ControlSpec, Tab};
use crate::settings::Settings;
use serde_json::Value;
use std::fmt;

/// Render contract: effective settings in, markup out. Must be pure so that
/// rendering the same settings twice yields identical output.
pub type RenderFn = fn(&Settings) -> String;

#[derive(Clone)]
pub struct WidgetDefinition {
    pub type_id: String,
    pub title: String,
    pub category: String,
    pub icon: String,
    pub default_settings: Settings,
    pub control_groups: Vec<ControlGroup>,
    pub render: RenderFn,
}

impl WidgetDefinition {
    /// Build a definition whose default settings are the control defaults
    pub fn new(
        type_id: &str,
        title: &str,
        category: &str,
        control_groups: Vec<ControlGroup>,
        render: RenderFn,
    ) -> Self {
        let default_settings = defaults_from_groups(&control_groups);
        Self {
            type_id: type_id.to_string(),
            title: title.to_string(),
            category: category.to_string(),
            icon: format!("icon-{}", type_id),
            default_settings,
            control_groups,
            render,
        }
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = icon.to_string();
        self
    }

    /// Override one entry of the default settings
    pub fn with_default(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.default_settings.insert(name.to_string(), value.into());
        self
    }

    pub fn schema(&self) -> Schema<'_> {
        Schema {
            default_settings: &self.default_settings,
            control_groups: &self.control_groups,
        }
    }

    pub fn render(&self, settings: &Settings) -> String {
        (self.render)(settings)
    }
}

impl fmt::Debug for WidgetDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetDefinition")
            .field("type_id", &self.type_id)
            .field("title", &self.title)
            .field("category", &self.category)
            .field("controls", &self.schema().controls().count())
            .finish()
    }
}

/// Editable schema of Container and Column nodes. Their markup is produced by
/// the render engine's wrapper chrome, so there is no render function.
#[derive(Debug, Clone)]
pub struct LayoutDefinition {
    pub title: String,
    pub default_settings: Settings,
    pub control_groups: Vec<ControlGroup>,
}

impl LayoutDefinition {
    pub fn new(title: &str, control_groups: Vec<ControlGroup>) -> Self {
        Self {
            title: title.to_string(),
            default_settings: defaults_from_groups(&control_groups),
            control_groups,
        }
    }

    pub fn schema(&self) -> Schema<'_> {
        Schema {
            default_settings: &self.default_settings,
            control_groups: &self.control_groups,
        }
    }
}

/// Borrowed view of the controls of any node kind
#[derive(Debug, Clone, Copy)]
pub struct Schema<'a> {
    pub default_settings: &'a Settings,
    pub control_groups: &'a [ControlGroup],
}

impl<'a> Schema<'a> {
    pub fn controls(&self) -> impl Iterator<Item = &'a ControlSpec> {
        self.control_groups.iter().flat_map(|group| group.controls.iter())
    }

    pub fn control(&self, name: &str) -> Option<&'a ControlSpec> {
        self.controls().find(|control| control.name == name)
    }

    /// Tabs that have at least one section, in display order
    pub fn tabs(&self) -> Vec<Tab> {
        [Tab::Content, Tab::Style, Tab::Advanced]
            .into_iter()
            .filter(|tab| self.control_groups.iter().any(|group| group.tab == *tab))
            .collect()
    }

    /// Stored settings overlaid on defaults. A missing key falls back to the
    /// definition default, then to the control default.
    pub fn effective_settings(&self, stored: &Settings) -> Settings {
        let mut effective = Settings::new();
        for control in self.controls() {
            let value = stored
                .get(&control.name)
                .or_else(|| self.default_settings.get(&control.name))
                .unwrap_or(&control.default);
            effective.insert(control.name.clone(), value.clone());
        }
        // Keys without a control (e.g. imported from a template) pass through
        for (key, value) in stored {
            if !effective.contains_key(key) {
                effective.insert(key.clone(), value.clone());
            }
        }
        effective
    }

    /// Effective settings minus controls hidden by their condition; this is
    /// what render functions receive.
    pub fn applied_settings(&self, stored: &Settings) -> Settings {
        let mut applied = self.effective_settings(stored);
        let effective = applied.clone();
        for control in self.controls() {
            if !control.is_active(&effective) {
                applied.shift_remove(&control.name);
            }
        }
        applied
    }
}

fn defaults_from_groups(groups: &[ControlGroup]) -> Settings {
    groups
        .iter()
        .flat_map(|group| group.controls.iter())
        .map(|control| (control.name.clone(), control.default.clone()))
        .collect()
}
