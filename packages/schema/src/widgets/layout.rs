//! Container and Column schemas, and the layout styles derived from them

use super::{advanced_group, advanced_styles};
use crate::controls::{ControlGroup, ControlSpec, Tab};
use crate::definition::LayoutDefinition;
use crate::markup::StyleList;
use crate::settings::{Settings, SettingsExt};
use crate::values::format_number;

pub fn container_definition() -> LayoutDefinition {
    LayoutDefinition::new(
        "Container",
        vec![
            ControlGroup::new(
                Tab::Content,
                "Layout",
                vec![
                    ControlSpec::select(
                        "content_width",
                        "Content Width",
                        "boxed",
                        &[("boxed", "Boxed"), ("full", "Full Width")],
                    ),
                    ControlSpec::slider("boxed_width", "Width", 1140.0, 300.0, 2000.0)
                        .with_unit("px")
                        .when("content_width", "boxed"),
                    ControlSpec::slider("min_height", "Minimum Height", 0.0, 0.0, 1440.0).with_unit("px"),
                    ControlSpec::choose(
                        "direction",
                        "Direction",
                        "row",
                        &[
                            ("row", "Row", "icon-arrow-right"),
                            ("column", "Column", "icon-arrow-down"),
                            ("row-reverse", "Row Reversed", "icon-arrow-left"),
                            ("column-reverse", "Column Reversed", "icon-arrow-up"),
                        ],
                    ),
                    ControlSpec::select(
                        "justify",
                        "Justify Content",
                        "",
                        &[
                            ("", "Default"),
                            ("flex-start", "Start"),
                            ("center", "Center"),
                            ("flex-end", "End"),
                            ("space-between", "Space Between"),
                            ("space-around", "Space Around"),
                            ("space-evenly", "Space Evenly"),
                        ],
                    ),
                    ControlSpec::select(
                        "align",
                        "Align Items",
                        "",
                        &[
                            ("", "Default"),
                            ("flex-start", "Start"),
                            ("center", "Center"),
                            ("flex-end", "End"),
                            ("stretch", "Stretch"),
                        ],
                    ),
                    ControlSpec::slider("gap", "Gap", 10.0, 0.0, 100.0).with_unit("px"),
                ],
            ),
            ControlGroup::new(
                Tab::Style,
                "Background",
                vec![ControlSpec::color("background_color", "Color", "")],
            ),
            advanced_group(),
        ],
    )
}

pub fn column_definition() -> LayoutDefinition {
    LayoutDefinition::new(
        "Column",
        vec![
            ControlGroup::new(
                Tab::Content,
                "Layout",
                vec![
                    ControlSpec::slider("width", "Column Width", 100.0, 10.0, 100.0).with_unit("%"),
                    ControlSpec::select(
                        "vertical_align",
                        "Vertical Align",
                        "",
                        &[("", "Default"), ("top", "Top"), ("middle", "Middle"), ("bottom", "Bottom")],
                    ),
                    ControlSpec::slider("widgets_space", "Widgets Space", 20.0, 0.0, 100.0).with_unit("px"),
                ],
            ),
            ControlGroup::new(
                Tab::Style,
                "Background",
                vec![ControlSpec::color("background_color", "Color", "")],
            ),
            advanced_group(),
        ],
    )
}

/// Flex layout of a container's column row
pub fn container_styles(settings: &Settings) -> StyleList {
    let mut styles = advanced_styles(settings);
    styles.set("display", "flex");
    styles.set("flex-direction", settings.text_of("direction").unwrap_or("row"));
    styles.set_opt("justify-content", settings.text_of("justify"));
    styles.set_opt("align-items", settings.text_of("align"));
    if let Some(gap) = settings.number_of("gap") {
        styles.set("gap", format!("{}px", format_number(gap)));
    }
    if let Some(min_height) = settings.number_of("min_height").filter(|h| *h > 0.0) {
        styles.set("min-height", format!("{}px", format_number(min_height)));
    }
    if settings.text_of("content_width") == Some("boxed") {
        if let Some(width) = settings.number_of("boxed_width") {
            styles.set("max-width", format!("{}px", format_number(width)));
            styles.set("margin-left", "auto");
            styles.set("margin-right", "auto");
        }
    }
    styles.set_opt("background-color", settings.text_of("background_color"));
    styles
}

pub fn column_styles(settings: &Settings) -> StyleList {
    let mut styles = advanced_styles(settings);
    let width = settings.number_of("width").unwrap_or(100.0);
    styles.set("width", format!("{}%", format_number(width)));
    styles.set("display", "flex");
    styles.set("flex-direction", "column");
    let justify = match settings.text_of("vertical_align") {
        Some("top") => Some("flex-start"),
        Some("middle") => Some("center"),
        Some("bottom") => Some("flex-end"),
        _ => None,
    };
    styles.set_opt("justify-content", justify);
    if let Some(space) = settings.number_of("widgets_space") {
        styles.set("row-gap", format!("{}px", format_number(space)));
    }
    styles.set_opt("background-color", settings.text_of("background_color"));
    styles
}
