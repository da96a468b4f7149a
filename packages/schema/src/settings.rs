//! Settings maps and typed accessors used by render functions

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Field name → value. Never required to be fully populated: a missing key
/// falls back to the control's default.
pub type Settings = IndexMap<String, Value>;

/// Typed reads over a [`Settings`] map
pub trait SettingsExt {
    fn str_of(&self, key: &str) -> Option<&str>;
    fn number_of(&self, key: &str) -> Option<f64>;
    fn bool_of(&self, key: &str) -> bool;
    fn compound_of<T: DeserializeOwned>(&self, key: &str) -> Option<T>;

    /// Non-empty string value
    fn text_of(&self, key: &str) -> Option<&str> {
        self.str_of(key).filter(|s| !s.is_empty())
    }
}

impl SettingsExt for Settings {
    fn str_of(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    fn number_of(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    fn bool_of(&self, key: &str) -> bool {
        match self.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "yes" || s == "true",
            _ => false,
        }
    }

    fn compound_of<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        if value.is_null() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}
