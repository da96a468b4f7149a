//! Text editor widget. Blank lines separate paragraphs; single newlines
//! become line breaks.

use super::{advanced_group, alignment_control, text_styles};
use crate::controls::{ControlGroup, ControlSpec, Tab};
use crate::definition::WidgetDefinition;
use crate::markup::{escape_html, Tag};
use crate::settings::{Settings, SettingsExt};

pub const TYPE_ID: &str = "text";

pub fn definition() -> WidgetDefinition {
    WidgetDefinition::new(
        TYPE_ID,
        "Text Editor",
        "basic",
        vec![
            ControlGroup::new(
                Tab::Content,
                "Text Editor",
                vec![
                    ControlSpec::textarea(
                        "content",
                        "Content",
                        "Lorem ipsum dolor sit amet, consectetur adipiscing elit.",
                    ),
                    ControlSpec::switcher("drop_cap", "Drop Cap", false),
                    alignment_control("align", ""),
                ],
            ),
            ControlGroup::new(
                Tab::Style,
                "Text",
                vec![
                    ControlSpec::color("color", "Text Color", ""),
                    ControlSpec::typography("typography", "Typography"),
                    ControlSpec::color("drop_cap_color", "Drop Cap Color", "").when("drop_cap", true),
                ],
            ),
            advanced_group(),
        ],
        render,
    )
    .with_icon("icon-text")
}

fn render(settings: &Settings) -> String {
    let content = settings.str_of("content").unwrap_or_default();
    let paragraphs: String = content
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            let lines: Vec<String> = p.lines().map(escape_html).collect();
            format!("<p>{}</p>", lines.join("<br />"))
        })
        .collect();

    let mut tag = Tag::new("div")
        .class("pc-text-editor")
        .styles(&text_styles(settings));
    if settings.bool_of("drop_cap") {
        tag = tag.class("pc-drop-cap");
        if let Some(color) = settings.text_of("drop_cap_color") {
            tag = tag.attr("data-drop-cap-color", color);
        }
    }
    tag.html(&paragraphs).build()
}
