//! Button widget

use super::{advanced_group, alignment_control};
use crate::controls::{ControlGroup, ControlSpec, Tab};
use crate::definition::WidgetDefinition;
use crate::markup::Tag;
use crate::settings::{Settings, SettingsExt};
use crate::values::{format_number, Dimensions, Typography};

pub const TYPE_ID: &str = "button";

pub fn definition() -> WidgetDefinition {
    WidgetDefinition::new(
        TYPE_ID,
        "Button",
        "basic",
        vec![
            ControlGroup::new(
                Tab::Content,
                "Button",
                vec![
                    ControlSpec::text("text", "Text", "Click here"),
                    ControlSpec::url("link", "Link", "#"),
                    ControlSpec::switcher("new_tab", "Open in new window", false),
                    ControlSpec::select(
                        "size",
                        "Size",
                        "sm",
                        &[("xs", "Extra Small"), ("sm", "Small"), ("md", "Medium"), ("lg", "Large"), ("xl", "Extra Large")],
                    ),
                    alignment_control("align", ""),
                ],
            ),
            ControlGroup::new(
                Tab::Style,
                "Button",
                vec![
                    ControlSpec::typography("typography", "Typography"),
                    ControlSpec::color("text_color", "Text Color", "#ffffff"),
                    ControlSpec::color("background_color", "Background Color", "#61ce70"),
                    ControlSpec::slider("border_radius", "Border Radius", 3.0, 0.0, 100.0).with_unit("px"),
                    ControlSpec::dimensions("text_padding", "Padding"),
                ],
            ),
            advanced_group(),
        ],
        render,
    )
    .with_icon("icon-button")
}

fn render(settings: &Settings) -> String {
    let size = settings.text_of("size").unwrap_or("sm");
    let href = settings.text_of("link").unwrap_or("#");

    let mut link = Tag::new("a")
        .class("pc-button")
        .class(format!("pc-size-{}", size))
        .attr("href", href)
        .attr("role", "button")
        .style("color", settings.text_of("text_color").unwrap_or_default())
        .style(
            "background-color",
            settings.text_of("background_color").unwrap_or_default(),
        );
    if settings.bool_of("new_tab") {
        link = link.attr("target", "_blank").attr("rel", "noopener");
    }
    if let Some(radius) = settings.number_of("border_radius") {
        link = link.style("border-radius", format!("{}px", format_number(radius)));
    }
    if let Some(padding) = settings.compound_of::<Dimensions>("text_padding") {
        if !padding.is_zero() {
            link = link.style("padding", padding.to_css());
        }
    }
    if let Some(typography) = settings.compound_of::<Typography>("typography") {
        for (property, value) in typography.css_declarations() {
            link = link.style(property, value);
        }
    }

    let label = Tag::new("span")
        .class("pc-button-text")
        .text(settings.str_of("text").unwrap_or_default())
        .build();

    Tag::new("div")
        .class("pc-button-wrapper")
        .style("text-align", settings.text_of("align").unwrap_or_default())
        .html(&link.html(&label).build())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_defaults() {
        let def = definition();
        let html = def.render(&def.schema().applied_settings(&Settings::new()));
        assert_eq!(
            html,
            "<div class=\"pc-button-wrapper\"><a class=\"pc-button pc-size-sm\" href=\"#\" role=\"button\" \
             style=\"color: #ffffff; background-color: #61ce70; border-radius: 3px;\">\
             <span class=\"pc-button-text\">Click here</span></a></div>"
        );
    }

    #[test]
    fn test_new_tab() {
        let def = definition();
        let mut stored = Settings::new();
        stored.insert("new_tab".to_string(), json!(true));
        stored.insert("align".to_string(), json!("center"));

        let html = def.render(&def.schema().applied_settings(&stored));
        assert!(html.contains("target=\"_blank\" rel=\"noopener\""));
        assert!(html.starts_with("<div class=\"pc-button-wrapper\" style=\"text-align: center;\">"));
    }
}
