//! Vertical spacer widget

use super::advanced_group;
use crate::controls::{ControlGroup, ControlSpec, Tab};
use crate::definition::WidgetDefinition;
use crate::markup::Tag;
use crate::settings::{Settings, SettingsExt};
use crate::values::format_number;

pub const TYPE_ID: &str = "spacer";

pub fn definition() -> WidgetDefinition {
    WidgetDefinition::new(
        TYPE_ID,
        "Spacer",
        "basic",
        vec![
            ControlGroup::new(
                Tab::Content,
                "Spacer",
                vec![ControlSpec::slider("space", "Space", 50.0, 0.0, 600.0).with_unit("px")],
            ),
            advanced_group(),
        ],
        render,
    )
    .with_icon("icon-spacer")
}

fn render(settings: &Settings) -> String {
    let space = settings.number_of("space").unwrap_or(50.0);
    Tag::new("div")
        .class("pc-spacer")
        .style("height", format!("{}px", format_number(space)))
        .build()
}
