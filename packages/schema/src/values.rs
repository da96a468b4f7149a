//! # Compound Control Values
//!
//! Typography, dimensions, text shadow and media controls each store one
//! structured JSON object under a single settings key. These types give that
//! object a shape so it can be validated on write and turned into CSS on
//! render.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Font settings edited as four sub-fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Typography {
    pub family: String,
    /// Font size in px. `None` inherits.
    pub size: Option<f64>,
    pub weight: String,
    pub style: String,
}

impl Typography {
    pub fn css_declarations(&self) -> Vec<(&'static str, String)> {
        let mut decls = Vec::new();
        if !self.family.is_empty() {
            decls.push(("font-family", self.family.clone()));
        }
        if let Some(size) = self.size {
            decls.push(("font-size", format!("{}px", format_number(size))));
        }
        if !self.weight.is_empty() {
            decls.push(("font-weight", self.weight.clone()));
        }
        if !self.style.is_empty() {
            decls.push(("font-style", self.style.clone()));
        }
        decls
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Px,
    #[serde(rename = "%")]
    Percent,
    Em,
    Rem,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::Percent => "%",
            Unit::Em => "em",
            Unit::Rem => "rem",
        }
    }
}

/// Box sides (padding/margin) with a shared unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Dimensions {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
    pub unit: Unit,
}

impl Dimensions {
    pub fn is_zero(&self) -> bool {
        self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0 && self.left == 0.0
    }

    /// CSS shorthand, e.g. `10px 0px 10px 0px`
    pub fn to_css(&self) -> String {
        let unit = self.unit.as_str();
        format!(
            "{}{unit} {}{unit} {}{unit} {}{unit}",
            format_number(self.top),
            format_number(self.right),
            format_number(self.bottom),
            format_number(self.left),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextShadow {
    pub color: String,
    pub blur: f64,
    pub horizontal: f64,
    pub vertical: f64,
}

impl Default for TextShadow {
    fn default() -> Self {
        Self {
            color: "rgba(0,0,0,0.3)".to_string(),
            blur: 10.0,
            horizontal: 0.0,
            vertical: 0.0,
        }
    }
}

impl TextShadow {
    pub fn to_css(&self) -> String {
        format!(
            "{}px {}px {}px {}",
            format_number(self.horizontal),
            format_number(self.vertical),
            format_number(self.blur),
            self.color
        )
    }
}

/// Reference to an image in the media library (or any URL)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct MediaRef {
    pub url: String,
    pub alt: String,
}

/// Deserialize a compound value from a settings entry
pub fn decode<T: serde::de::DeserializeOwned>(value: &Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(value.clone())
}

/// Render a number without a trailing `.0` for whole values
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
