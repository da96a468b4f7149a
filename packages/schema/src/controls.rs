//! # Control Specs
//!
//! A control is the schema for one editable property of a node's settings.
//! Controls are grouped into sections, and sections live on one of the
//! inspector tabs.
//!
//! ## Validation
//!
//! Every write from the inspector goes through [`ControlSpec::normalize`]:
//!
//! - **slider**: numeric input is clamped into the range, never rejected
//! - **select / choose**: the value must be one of the options
//! - **color / url**: syntax checks, empty string clears
//! - **switcher**: booleans and yes/no style strings
//! - **compound kinds**: a JSON object (or a JSON string holding one) that
//!   must decode into the matching value type

use crate::errors::ValidationError;
use crate::settings::Settings;
use crate::values::{decode, Dimensions, MediaRef, TextShadow, Typography};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    Text,
    Textarea,
    Select,
    Color,
    /// Numeric range
    Slider,
    /// Exclusive icon buttons
    Choose,
    Url,
    /// Image reference
    Media,
    Typography,
    Switcher,
    Dimensions,
    TextShadow,
}

impl ControlKind {
    /// Compound kinds are edited as a set of sub-fields written back under one key
    pub fn is_compound(&self) -> bool {
        matches!(
            self,
            ControlKind::Typography
                | ControlKind::Dimensions
                | ControlKind::TextShadow
                | ControlKind::Media
        )
    }
}

/// Inspector tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Content,
    Style,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl ChoiceOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Constraints {
    Range {
        min: f64,
        max: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    Options {
        options: Vec<ChoiceOption>,
    },
}

/// Display condition: every `field → expected` pair must hold against the
/// node's effective settings. An array as the expected value means "any of".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Condition(IndexMap<String, Value>);

impl Condition {
    pub fn when(field: impl Into<String>, expected: impl Into<Value>) -> Self {
        let mut map = IndexMap::new();
        map.insert(field.into(), expected.into());
        Self(map)
    }

    pub fn and(mut self, field: impl Into<String>, expected: impl Into<Value>) -> Self {
        self.0.insert(field.into(), expected.into());
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn is_met(&self, effective: &Settings) -> bool {
        self.0.iter().all(|(field, expected)| {
            let actual = effective.get(field).unwrap_or(&Value::Null);
            match expected {
                Value::Array(any_of) => any_of.iter().any(|candidate| candidate == actual),
                _ => expected == actual,
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "options", rename_all = "snake_case")]
pub enum SubFieldKind {
    Text,
    Number,
    Color,
    Select(&'static [&'static str]),
}

/// One editable part of a compound control
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubFieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: SubFieldKind,
}

const fn sub(key: &'static str, label: &'static str, kind: SubFieldKind) -> SubFieldSpec {
    SubFieldSpec { key, label, kind }
}

const TYPOGRAPHY_FIELDS: &[SubFieldSpec] = &[
    sub("family", "Family", SubFieldKind::Text),
    sub("size", "Size", SubFieldKind::Number),
    sub(
        "weight",
        "Weight",
        SubFieldKind::Select(&["", "100", "200", "300", "400", "500", "600", "700", "800", "900", "normal", "bold"]),
    ),
    sub("style", "Style", SubFieldKind::Select(&["", "normal", "italic", "oblique"])),
];

const DIMENSION_FIELDS: &[SubFieldSpec] = &[
    sub("top", "Top", SubFieldKind::Number),
    sub("right", "Right", SubFieldKind::Number),
    sub("bottom", "Bottom", SubFieldKind::Number),
    sub("left", "Left", SubFieldKind::Number),
    sub("unit", "Unit", SubFieldKind::Select(&["px", "%", "em", "rem"])),
];

const TEXT_SHADOW_FIELDS: &[SubFieldSpec] = &[
    sub("color", "Color", SubFieldKind::Color),
    sub("blur", "Blur", SubFieldKind::Number),
    sub("horizontal", "Horizontal", SubFieldKind::Number),
    sub("vertical", "Vertical", SubFieldKind::Number),
];

const MEDIA_FIELDS: &[SubFieldSpec] = &[
    sub("url", "Image URL", SubFieldKind::Text),
    sub("alt", "Alt text", SubFieldKind::Text),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSpec {
    pub name: String,
    pub label: String,
    pub kind: ControlKind,
    pub default: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl ControlSpec {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        kind: ControlKind,
        default: impl Into<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            default: default.into(),
            constraints: None,
            condition: None,
        }
    }

    pub fn text(name: &str, label: &str, default: &str) -> Self {
        Self::new(name, label, ControlKind::Text, default)
    }

    pub fn textarea(name: &str, label: &str, default: &str) -> Self {
        Self::new(name, label, ControlKind::Textarea, default)
    }

    pub fn color(name: &str, label: &str, default: &str) -> Self {
        Self::new(name, label, ControlKind::Color, default)
    }

    pub fn url(name: &str, label: &str, default: &str) -> Self {
        Self::new(name, label, ControlKind::Url, default)
    }

    pub fn switcher(name: &str, label: &str, default: bool) -> Self {
        Self::new(name, label, ControlKind::Switcher, default)
    }

    pub fn slider(name: &str, label: &str, default: f64, min: f64, max: f64) -> Self {
        Self::new(name, label, ControlKind::Slider, number_value(default)).with_constraints(
            Constraints::Range {
                min,
                max,
                step: None,
                unit: None,
            },
        )
    }

    pub fn select(name: &str, label: &str, default: &str, options: &[(&str, &str)]) -> Self {
        Self::new(name, label, ControlKind::Select, default).with_options(options)
    }

    /// Exclusive icon buttons; each option is `(value, label, icon)`
    pub fn choose(name: &str, label: &str, default: &str, options: &[(&str, &str, &str)]) -> Self {
        let options = options
            .iter()
            .map(|(value, label, icon)| ChoiceOption::new(*value, *label).with_icon(*icon))
            .collect();
        Self::new(name, label, ControlKind::Choose, default)
            .with_constraints(Constraints::Options { options })
    }

    pub fn media(name: &str, label: &str, default_url: &str) -> Self {
        let default = MediaRef {
            url: default_url.to_string(),
            alt: String::new(),
        };
        Self::new(name, label, ControlKind::Media, to_value(&default))
    }

    pub fn typography(name: &str, label: &str) -> Self {
        Self::new(name, label, ControlKind::Typography, to_value(&Typography::default()))
    }

    pub fn dimensions(name: &str, label: &str) -> Self {
        Self::new(name, label, ControlKind::Dimensions, to_value(&Dimensions::default()))
    }

    pub fn text_shadow(name: &str, label: &str) -> Self {
        Self::new(name, label, ControlKind::TextShadow, Value::Null)
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    pub fn with_options(self, options: &[(&str, &str)]) -> Self {
        let options = options
            .iter()
            .map(|(value, label)| ChoiceOption::new(*value, *label))
            .collect();
        self.with_constraints(Constraints::Options { options })
    }

    /// Set the slider unit/step (no-op for non-range controls)
    pub fn with_unit(mut self, new_unit: &str) -> Self {
        if let Some(Constraints::Range { unit, .. }) = &mut self.constraints {
            *unit = Some(new_unit.to_string());
        }
        self
    }

    pub fn with_step(mut self, new_step: f64) -> Self {
        if let Some(Constraints::Range { step, .. }) = &mut self.constraints {
            *step = Some(new_step);
        }
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    /// Show/apply only when `field` equals `expected`
    pub fn when(mut self, field: &str, expected: impl Into<Value>) -> Self {
        self.condition = Some(match self.condition.take() {
            Some(existing) => existing.and(field, expected),
            None => Condition::when(field, expected),
        });
        self
    }

    pub fn is_active(&self, effective: &Settings) -> bool {
        self.condition
            .as_ref()
            .map_or(true, |condition| condition.is_met(effective))
    }

    pub fn options(&self) -> Option<&[ChoiceOption]> {
        match &self.constraints {
            Some(Constraints::Options { options }) => Some(options),
            _ => None,
        }
    }

    /// Sub-fields for compound kinds; empty for scalar controls
    pub fn sub_fields(&self) -> &'static [SubFieldSpec] {
        match self.kind {
            ControlKind::Typography => TYPOGRAPHY_FIELDS,
            ControlKind::Dimensions => DIMENSION_FIELDS,
            ControlKind::TextShadow => TEXT_SHADOW_FIELDS,
            ControlKind::Media => MEDIA_FIELDS,
            _ => &[],
        }
    }

    /// Validate raw inspector input and return the value to store
    pub fn normalize(&self, raw: &Value) -> Result<Value, ValidationError> {
        match self.kind {
            ControlKind::Text | ControlKind::Textarea => self.normalize_text(raw),
            ControlKind::Select | ControlKind::Choose => self.normalize_choice(raw),
            ControlKind::Color => {
                let value = self.expect_string(raw)?;
                normalize_color(value.trim()).map(Value::String)
            }
            ControlKind::Url => {
                let value = self.expect_string(raw)?;
                normalize_url(value.trim()).map(Value::String)
            }
            ControlKind::Slider => self.normalize_slider(raw),
            ControlKind::Switcher => self.normalize_switcher(raw),
            ControlKind::Media => self.normalize_media(raw),
            ControlKind::Typography => {
                let typo: Typography = self.decode_compound(raw)?;
                if typo.size.is_some_and(|size| !size.is_finite() || size < 0.0) {
                    return Err(self.malformed("font size must be a positive number"));
                }
                if typo.family.contains([';', '{', '}']) {
                    return Err(self.malformed("font family cannot contain ';', '{' or '}'"));
                }
                let value = to_value(&typo);
                self.check_sub_field_options(&value)?;
                Ok(value)
            }
            ControlKind::Dimensions => {
                let dims: Dimensions = self.decode_compound(raw)?;
                if [dims.top, dims.right, dims.bottom, dims.left]
                    .iter()
                    .any(|side| !side.is_finite())
                {
                    return Err(self.malformed("sides must be finite numbers"));
                }
                Ok(to_value(&dims))
            }
            ControlKind::TextShadow => {
                let mut shadow: TextShadow = self.decode_compound(raw)?;
                shadow.color = normalize_color(shadow.color.trim())?;
                if shadow.blur < 0.0 {
                    return Err(self.malformed("blur cannot be negative"));
                }
                Ok(to_value(&shadow))
            }
        }
    }

    /// Write one sub-field of a compound value and re-validate the whole value
    pub fn merge_sub_field(
        &self,
        current: &Value,
        field: &str,
        raw: &Value,
    ) -> Result<Value, ValidationError> {
        let spec = self
            .sub_fields()
            .iter()
            .find(|sub| sub.key == field)
            .ok_or_else(|| ValidationError::UnknownSubField {
                control: self.name.clone(),
                field: field.to_string(),
            })?;

        let mut object = match current {
            Value::Object(map) => map.clone(),
            _ => match self.normalize(&Value::Object(Map::new()))? {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        };

        let coerced = match spec.kind {
            SubFieldKind::Number => match raw {
                Value::String(s) if s.trim().is_empty() => Value::Null,
                Value::Null => Value::Null,
                _ => number_value(parse_number(raw)?),
            },
            SubFieldKind::Text | SubFieldKind::Color => Value::String(self.expect_string(raw)?.to_string()),
            SubFieldKind::Select(allowed) => {
                let value = self.expect_string(raw)?;
                if !allowed.contains(&value) {
                    return Err(ValidationError::NotAnOption {
                        control: format!("{}.{}", self.name, field),
                        value: value.to_string(),
                    });
                }
                Value::String(value.to_string())
            }
        };

        // Null numbers fall back to the type's default, except the optional font size
        if coerced.is_null() && self.kind != ControlKind::Typography {
            object.remove(field);
        } else {
            object.insert(field.to_string(), coerced);
        }

        self.normalize(&Value::Object(object))
    }

    /// Select sub-fields hold one of their listed options
    fn check_sub_field_options(&self, value: &Value) -> Result<(), ValidationError> {
        for spec in self.sub_fields() {
            let SubFieldKind::Select(allowed) = spec.kind else {
                continue;
            };
            if let Some(Value::String(chosen)) = value.get(spec.key) {
                if !allowed.contains(&chosen.as_str()) {
                    return Err(ValidationError::NotAnOption {
                        control: format!("{}.{}", self.name, spec.key),
                        value: chosen.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn normalize_text(&self, raw: &Value) -> Result<Value, ValidationError> {
        match raw {
            Value::String(_) => Ok(raw.clone()),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            Value::Null => Ok(Value::String(String::new())),
            _ => Err(self.wrong_type("text")),
        }
    }

    fn normalize_choice(&self, raw: &Value) -> Result<Value, ValidationError> {
        let value = match raw {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return Err(self.wrong_type("an option value")),
        };

        match self.options() {
            Some(options) if !options.iter().any(|option| option.value == value) => {
                Err(ValidationError::NotAnOption {
                    control: self.name.clone(),
                    value,
                })
            }
            _ => Ok(Value::String(value)),
        }
    }

    fn normalize_slider(&self, raw: &Value) -> Result<Value, ValidationError> {
        let mut n = parse_number(raw)?;
        if let Some(Constraints::Range { min, max, .. }) = &self.constraints {
            n = n.clamp(*min, *max);
        }
        Ok(number_value(n))
    }

    fn normalize_switcher(&self, raw: &Value) -> Result<Value, ValidationError> {
        match raw {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "yes" | "true" | "on" | "1" => Ok(Value::Bool(true)),
                "" | "no" | "false" | "off" | "0" => Ok(Value::Bool(false)),
                _ => Err(self.wrong_type("yes or no")),
            },
            Value::Number(n) => Ok(Value::Bool(n.as_f64() != Some(0.0))),
            _ => Err(self.wrong_type("yes or no")),
        }
    }

    fn normalize_media(&self, raw: &Value) -> Result<Value, ValidationError> {
        let media = match raw {
            // A bare URL is accepted as shorthand for `{url}`
            Value::String(s) if !s.trim_start().starts_with('{') => MediaRef {
                url: s.trim().to_string(),
                alt: String::new(),
            },
            _ => self.decode_compound(raw)?,
        };
        let url = normalize_url(&media.url)?;
        Ok(to_value(&MediaRef { url, alt: media.alt }))
    }

    fn decode_compound<T: serde::de::DeserializeOwned>(&self, raw: &Value) -> Result<T, ValidationError> {
        let parsed;
        let value = match raw {
            Value::String(s) => {
                parsed = serde_json::from_str::<Value>(s).map_err(|e| self.malformed(&e.to_string()))?;
                &parsed
            }
            Value::Object(_) => raw,
            _ => return Err(self.wrong_type("an object")),
        };
        if !value.is_object() {
            return Err(self.wrong_type("an object"));
        }
        decode(value).map_err(|e| self.malformed(&e.to_string()))
    }

    fn expect_string<'a>(&self, raw: &'a Value) -> Result<&'a str, ValidationError> {
        raw.as_str().ok_or_else(|| self.wrong_type("a string"))
    }

    fn wrong_type(&self, expected: &'static str) -> ValidationError {
        ValidationError::WrongType {
            control: self.name.clone(),
            expected,
        }
    }

    fn malformed(&self, message: &str) -> ValidationError {
        ValidationError::Malformed {
            control: self.name.clone(),
            message: message.to_string(),
        }
    }
}

/// Ordered section of controls on one inspector tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlGroup {
    pub tab: Tab,
    pub title: String,
    pub controls: Vec<ControlSpec>,
}

impl ControlGroup {
    pub fn new(tab: Tab, title: impl Into<String>, controls: Vec<ControlSpec>) -> Self {
        Self {
            tab,
            title: title.into(),
            controls,
        }
    }
}

/// Whole numbers are stored as integers so they compare equal to integer defaults
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < (i64::MAX as f64) {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

fn parse_number(raw: &Value) -> Result<f64, ValidationError> {
    let n = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
        .ok_or_else(|| ValidationError::NotANumber {
            value: match raw {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        })
}

fn normalize_color(value: &str) -> Result<String, ValidationError> {
    let invalid = || ValidationError::InvalidColor {
        value: value.to_string(),
    };

    if value.is_empty() {
        return Ok(String::new());
    }

    if let Some(hex) = value.strip_prefix('#') {
        let valid_len = matches!(hex.len(), 3 | 4 | 6 | 8);
        if valid_len && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(format!("#{}", hex.to_ascii_lowercase()));
        }
        return Err(invalid());
    }

    let lower = value.to_ascii_lowercase();
    let functional = ["rgb(", "rgba(", "hsl(", "hsla(", "var(--"]
        .iter()
        .any(|prefix| lower.starts_with(prefix))
        && lower.ends_with(')');
    let named = lower.chars().all(|c| c.is_ascii_alphabetic());

    if functional || named {
        Ok(value.to_string())
    } else {
        Err(invalid())
    }
}

fn normalize_url(value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    let lower = value.to_ascii_lowercase();
    let blocked = ["javascript:", "vbscript:", "data:text"]
        .iter()
        .any(|scheme| lower.starts_with(scheme));

    if blocked || value.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidUrl {
            value: value.to_string(),
        });
    }
    Ok(value.to_string())
}

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
