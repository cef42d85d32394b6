//! Error types for menu templates and configuration.
//!
//! Interaction itself never fails: rejected selections clear the active
//! index and failed preconditions are no-ops. Only the parsing boundaries
//! return errors.

/// Errors building menus from templates.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// The template JSON could not be parsed.
    #[error("Template parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// An item template named an unknown type.
    #[error("Unknown menu item type '{0}'")]
    UnknownItemType(String),
}

/// Errors loading a [`MenuConfig`](crate::MenuConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is out of range.
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    /// Create a value error.
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}
