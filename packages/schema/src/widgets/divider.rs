//! Horizontal divider widget

use super::{advanced_group, alignment_control};
use crate::controls::{ControlGroup, ControlSpec, Tab};
use crate::definition::WidgetDefinition;
use crate::markup::Tag;
use crate::settings::{Settings, SettingsExt};
use crate::values::format_number;

pub const TYPE_ID: &str = "divider";

pub fn definition() -> WidgetDefinition {
    WidgetDefinition::new(
        TYPE_ID,
        "Divider",
        "basic",
        vec![
            ControlGroup::new(
                Tab::Content,
                "Divider",
                vec![
                    ControlSpec::select(
                        "style",
                        "Style",
                        "solid",
                        &[("solid", "Solid"), ("double", "Double"), ("dotted", "Dotted"), ("dashed", "Dashed")],
                    ),
                    ControlSpec::slider("width", "Width", 100.0, 1.0, 100.0).with_unit("%"),
                    alignment_control("align", ""),
                ],
            ),
            ControlGroup::new(
                Tab::Style,
                "Divider",
                vec![
                    ControlSpec::color("color", "Color", "#000000"),
                    ControlSpec::slider("weight", "Weight", 1.0, 1.0, 10.0).with_unit("px"),
                    ControlSpec::slider("gap", "Gap", 15.0, 2.0, 50.0).with_unit("px"),
                ],
            ),
            advanced_group(),
        ],
        render,
    )
    .with_icon("icon-divider")
}

fn render(settings: &Settings) -> String {
    let style = settings.text_of("style").unwrap_or("solid");
    let weight = settings.number_of("weight").unwrap_or(1.0);
    let width = settings.number_of("width").unwrap_or(100.0);
    let gap = settings.number_of("gap").unwrap_or(15.0);
    let color = settings.text_of("color").unwrap_or("#000000");

    // Alignment of a block narrower than its column is done with margins
    let margin = match settings.text_of("align") {
        Some("center") => "0 auto",
        Some("right") => "0 0 0 auto",
        _ => "0",
    };

    let line = Tag::new("span")
        .class("pc-divider-separator")
        .style("display", "block")
        .style(
            "border-top",
            format!("{}px {} {}", format_number(weight), style, color),
        )
        .style("width", format!("{}%", format_number(width)))
        .style("margin", margin)
        .build();

    Tag::new("div")
        .class("pc-divider")
        .style("padding", format!("{}px 0", format_number(gap)))
        .html(&line)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_centered_dashed() {
        let def = definition();
        let mut stored = Settings::new();
        stored.insert("style".to_string(), json!("dashed"));
        stored.insert("width".to_string(), json!(50));
        stored.insert("align".to_string(), json!("center"));

        let html = def.render(&def.schema().applied_settings(&stored));
        assert!(html.contains("border-top: 1px dashed #000000;"));
        assert!(html.contains("width: 50%;"));
        assert!(html.contains("margin: 0 auto;"));
    }
}
