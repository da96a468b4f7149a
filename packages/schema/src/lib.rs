//! # Pagecraft Schema
//!
//! Widget definitions and the control schema that drives the inspector.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ schema: what a node can be                  │
//! │  - WidgetDefinition: defaults + controls +  │
//! │    render(settings) → markup                │
//! │  - ControlSpec: one editable property       │
//! │  - WidgetRegistry: typeId → definition      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: document tree, placement, history,  │
//! │ inspector, render engine                    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use pagecraft_schema::{WidgetRegistry, SettingsExt};
//!
//! let registry = WidgetRegistry::with_builtins().unwrap();
//! let heading = registry.get("heading").unwrap();
//!
//! let settings = heading.schema().applied_settings(&registry.default_settings_for("heading").unwrap());
//! assert_eq!(settings.str_of("header_size"), Some("h2"));
//! let html = heading.render(&settings);
//! assert!(html.starts_with("<h2"));
//! ```

mod controls;
mod definition;
mod errors;
pub mod markup;
mod registry;
mod settings;
pub mod values;
pub mod widgets;

pub use controls::{
    number_value, ChoiceOption, Condition, ControlGroup, ControlKind, ControlSpec, Constraints,
    SubFieldKind, SubFieldSpec, Tab,
};
pub use definition::{LayoutDefinition, RenderFn, Schema, WidgetDefinition};
pub use errors::{RegistryError, ValidationError};
pub use registry::{LayoutKind, WidgetRegistry};
pub use settings::{Settings, SettingsExt};
