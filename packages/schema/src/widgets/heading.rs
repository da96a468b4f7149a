//! Heading widget

use super::{advanced_group, alignment_control, text_styles};
use crate::controls::{ControlGroup, ControlSpec, Tab};
use crate::definition::WidgetDefinition;
use crate::markup::Tag;
use crate::settings::{Settings, SettingsExt};

pub const TYPE_ID: &str = "heading";

pub fn definition() -> WidgetDefinition {
    WidgetDefinition::new(
        TYPE_ID,
        "Heading",
        "basic",
        vec![
            ControlGroup::new(
                Tab::Content,
                "Title",
                vec![
                    ControlSpec::textarea("title", "Title", "Add Your Heading Text Here"),
                    ControlSpec::url("link", "Link", ""),
                    ControlSpec::select(
                        "header_size",
                        "HTML Tag",
                        "h2",
                        &[
                            ("h1", "H1"),
                            ("h2", "H2"),
                            ("h3", "H3"),
                            ("h4", "H4"),
                            ("h5", "H5"),
                            ("h6", "H6"),
                            ("div", "div"),
                            ("p", "p"),
                        ],
                    ),
                    alignment_control("align", ""),
                ],
            ),
            ControlGroup::new(
                Tab::Style,
                "Title",
                vec![
                    ControlSpec::color("color", "Text Color", ""),
                    ControlSpec::typography("typography", "Typography"),
                    ControlSpec::switcher("text_shadow_enabled", "Text Shadow", false),
                    ControlSpec::text_shadow("text_shadow", "Shadow").when("text_shadow_enabled", true),
                ],
            ),
            advanced_group(),
        ],
        render,
    )
    .with_icon("icon-heading")
}

fn render(settings: &Settings) -> String {
    let title = settings.str_of("title").unwrap_or_default();
    let tag = settings.text_of("header_size").unwrap_or("h2");

    let inner = match settings.text_of("link") {
        Some(href) => Tag::new("a").attr("href", href).text(title).build(),
        None => crate::markup::escape_html(title),
    };

    Tag::new(tag)
        .class("pc-heading-title")
        .styles(&text_styles(settings))
        .html(&inner)
        .build()
}
