//! Image widget

use super::{advanced_group, alignment_control};
use crate::controls::{ControlGroup, ControlSpec, Tab};
use crate::definition::WidgetDefinition;
use crate::markup::Tag;
use crate::settings::{Settings, SettingsExt};
use crate::values::{format_number, MediaRef};

pub const TYPE_ID: &str = "image";
pub const PLACEHOLDER_URL: &str = "/assets/images/placeholder.png";

pub fn definition() -> WidgetDefinition {
    WidgetDefinition::new(
        TYPE_ID,
        "Image",
        "basic",
        vec![
            ControlGroup::new(
                Tab::Content,
                "Image",
                vec![
                    ControlSpec::media("image", "Choose Image", PLACEHOLDER_URL),
                    alignment_control("align", ""),
                    ControlSpec::select(
                        "caption_source",
                        "Caption",
                        "none",
                        &[("none", "None"), ("custom", "Custom Caption")],
                    ),
                    ControlSpec::text("caption", "Custom Caption", "").when("caption_source", "custom"),
                    ControlSpec::select(
                        "link_to",
                        "Link",
                        "none",
                        &[("none", "None"), ("file", "Media File"), ("custom", "Custom URL")],
                    ),
                    ControlSpec::url("link", "Link", "").when("link_to", "custom"),
                ],
            ),
            ControlGroup::new(
                Tab::Style,
                "Image",
                vec![
                    ControlSpec::slider("width", "Width", 100.0, 1.0, 100.0).with_unit("%"),
                    ControlSpec::slider("opacity", "Opacity", 1.0, 0.0, 1.0).with_step(0.01),
                    ControlSpec::slider("border_radius", "Border Radius", 0.0, 0.0, 200.0).with_unit("px"),
                ],
            ),
            advanced_group(),
        ],
        render,
    )
    .with_icon("icon-image")
}

fn render(settings: &Settings) -> String {
    let media = settings.compound_of::<MediaRef>("image").unwrap_or_default();
    let src = if media.url.is_empty() {
        PLACEHOLDER_URL
    } else {
        media.url.as_str()
    };

    let mut img = Tag::new("img").attr("src", src).attr("alt", &media.alt);
    if let Some(width) = settings.number_of("width").filter(|w| *w < 100.0) {
        img = img.style("width", format!("{}%", format_number(width)));
    }
    if let Some(opacity) = settings.number_of("opacity").filter(|o| *o < 1.0) {
        img = img.style("opacity", format_number(opacity));
    }
    if let Some(radius) = settings.number_of("border_radius").filter(|r| *r > 0.0) {
        img = img.style("border-radius", format!("{}px", format_number(radius)));
    }
    let mut inner = img.build();

    let href = match settings.text_of("link_to") {
        Some("file") => Some(src),
        Some("custom") => settings.text_of("link"),
        _ => None,
    };
    if let Some(href) = href {
        inner = Tag::new("a").attr("href", href).html(&inner).build();
    }

    let caption = if settings.text_of("caption_source") == Some("custom") {
        settings.text_of("caption")
    } else {
        None
    };

    let body = match caption {
        Some(caption) => Tag::new("figure")
            .class("pc-image-figure")
            .html(&inner)
            .html(&Tag::new("figcaption").class("pc-image-caption").text(caption).build())
            .build(),
        None => inner,
    };

    Tag::new("div")
        .class("pc-image")
        .style("text-align", settings.text_of("align").unwrap_or_default())
        .html(&body)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_placeholder_image() {
        let def = definition();
        let html = def.render(&def.schema().applied_settings(&Settings::new()));
        assert_eq!(
            html,
            "<div class=\"pc-image\"><img src=\"/assets/images/placeholder.png\" alt=\"\" /></div>"
        );
    }

    #[test]
    fn test_caption_and_custom_link() {
        let def = definition();
        let mut stored = Settings::new();
        stored.insert("image".to_string(), json!({"url": "/a.png", "alt": "A"}));
        stored.insert("caption_source".to_string(), json!("custom"));
        stored.insert("caption".to_string(), json!("Sunset"));
        stored.insert("link_to".to_string(), json!("custom"));
        stored.insert("link".to_string(), json!("https://example.com"));

        let html = def.render(&def.schema().applied_settings(&stored));
        assert!(html.contains("<a href=\"https://example.com\"><img src=\"/a.png\" alt=\"A\" /></a>"));
        assert!(html.contains("<figcaption class=\"pc-image-caption\">Sunset</figcaption>"));
    }

    #[test]
    fn test_hidden_link_not_applied() {
        let def = definition();
        let mut stored = Settings::new();
        stored.insert("link".to_string(), json!("https://example.com"));

        let html = def.render(&def.schema().applied_settings(&stored));
        assert!(!html.contains("<a "));
    }
}
