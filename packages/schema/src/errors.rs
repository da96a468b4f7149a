//! Error types for widget registration and control validation

use thiserror::Error;

/// Errors raised by the [`WidgetRegistry`](crate::WidgetRegistry)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// A definition with the same type id was already registered.
    /// This is a programming error in widget registration.
    #[error("Widget type already registered: {0}")]
    DuplicateType(String),

    #[error("Unknown widget type: {0}")]
    UnknownType(String),
}

/// Rejected control input. The previous value is always retained.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Unknown control '{control}'")]
    UnknownControl { control: String },

    #[error("Control '{control}' is hidden by its display condition")]
    Inactive { control: String },

    #[error("Expected {expected} for '{control}'")]
    WrongType {
        control: String,
        expected: &'static str,
    },

    #[error("'{value}' is not a number")]
    NotANumber { value: String },

    #[error("'{value}' is not one of the options for '{control}'")]
    NotAnOption { control: String, value: String },

    #[error("'{value}' is not a valid color")]
    InvalidColor { value: String },

    #[error("'{value}' is not an allowed link")]
    InvalidUrl { value: String },

    #[error("Malformed value for '{control}': {message}")]
    Malformed { control: String, message: String },

    #[error("Unknown field '{field}' for '{control}'")]
    UnknownSubField { control: String, field: String },
}
