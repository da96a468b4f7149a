//! Built-in widget library

pub mod button;
pub mod divider;
pub mod heading;
pub mod image;
pub mod layout;
pub mod spacer;
pub mod text;
pub mod video;

use crate::controls::{ControlGroup, ControlSpec, Tab};
use crate::definition::WidgetDefinition;
use crate::markup::StyleList;
use crate::settings::{Settings, SettingsExt};
use crate::values::{Dimensions, TextShadow, Typography};

pub fn builtin_definitions() -> Vec<WidgetDefinition> {
    vec![
        heading::definition(),
        text::definition(),
        button::definition(),
        image::definition(),
        divider::definition(),
        spacer::definition(),
        video::definition(),
    ]
}

/// Settings keys of the shared "Advanced" tab
pub const ELEMENT_ID: &str = "_element_id";
pub const CSS_CLASSES: &str = "_css_classes";
pub const MARGIN: &str = "_margin";
pub const PADDING: &str = "_padding";

/// Spacing and identity controls every node kind carries
pub fn advanced_group() -> ControlGroup {
    ControlGroup::new(
        Tab::Advanced,
        "Layout",
        vec![
            ControlSpec::dimensions(MARGIN, "Margin"),
            ControlSpec::dimensions(PADDING, "Padding"),
            ControlSpec::text(ELEMENT_ID, "CSS ID", ""),
            ControlSpec::text(CSS_CLASSES, "CSS Classes", ""),
        ],
    )
}

/// Inline styles for the shared advanced settings
pub fn advanced_styles(settings: &Settings) -> StyleList {
    let mut styles = StyleList::new();
    for (key, property) in [(MARGIN, "margin"), (PADDING, "padding")] {
        if let Some(dims) = settings.compound_of::<Dimensions>(key) {
            if !dims.is_zero() {
                styles.set(property, dims.to_css());
            }
        }
    }
    styles
}

pub(crate) fn alignment_control(name: &str, default: &str) -> ControlSpec {
    ControlSpec::choose(
        name,
        "Alignment",
        default,
        &[
            ("", "Default", "icon-none"),
            ("left", "Left", "icon-align-left"),
            ("center", "Center", "icon-align-center"),
            ("right", "Right", "icon-align-right"),
            ("justify", "Justified", "icon-align-justify"),
        ],
    )
}

/// Color, typography and alignment as inline text styles
pub(crate) fn text_styles(settings: &Settings) -> StyleList {
    let mut styles = StyleList::new();
    styles.set_opt("text-align", settings.text_of("align"));
    styles.set_opt("color", settings.text_of("color"));
    if let Some(typography) = settings.compound_of::<Typography>("typography") {
        for (property, value) in typography.css_declarations() {
            styles.set(property, value);
        }
    }
    if let Some(shadow) = settings.compound_of::<TextShadow>("text_shadow") {
        styles.set("text-shadow", shadow.to_css());
    }
    styles
}
