//! Host configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```
//! use horizon_menus::MenuConfig;
//!
//! let config = MenuConfig::from_toml_str(
//!     r#"
//!     hover_delay_ms = 300
//!
//!     [viewport]
//!     width = 1024.0
//!     height = 768.0
//!
//!     [menu_style]
//!     item_height = 28.0
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.hover_delay_ms, 300);
//! assert_eq!(config.menu_style.item_height, 28.0);
//! assert_eq!(config.menu_style.separator_height, 9.0);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::Size;
use crate::style::{MenuBarStyle, MenuStyle};

/// Default delay before a hovered submenu switch takes effect.
pub const DEFAULT_HOVER_DELAY_MS: u64 = 500;

/// Settings applied by a [`MenuHost`](crate::MenuHost).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Size of the surface menus are fitted into.
    pub viewport: Size,
    /// Delay before hovering another item closes an open submenu.
    pub hover_delay_ms: u64,
    /// Popup menu metrics.
    pub menu_style: MenuStyle,
    /// Menu bar metrics.
    pub menu_bar_style: MenuBarStyle,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            viewport: Size::new(1280.0, 720.0),
            hover_delay_ms: DEFAULT_HOVER_DELAY_MS,
            menu_style: MenuStyle::default(),
            menu_bar_style: MenuBarStyle::default(),
        }
    }
}

impl MenuConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that sizes are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.viewport.width >= 0.0 && self.viewport.height >= 0.0) {
            return Err(ConfigError::invalid_value(
                "viewport",
                "width and height must be non-negative",
            ));
        }
        let metrics = [
            ("menu_style.item_height", self.menu_style.item_height),
            ("menu_style.separator_height", self.menu_style.separator_height),
            ("menu_style.char_width", self.menu_style.char_width),
            ("menu_style.min_width", self.menu_style.min_width),
            ("menu_bar_style.height", self.menu_bar_style.height),
            ("menu_bar_style.char_width", self.menu_bar_style.char_width),
        ];
        for (field, value) in metrics {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid_value(field, "must be a non-negative number"));
            }
        }
        Ok(())
    }

    /// The hover delay as a duration.
    pub fn hover_delay(&self) -> Duration {
        Duration::from_millis(self.hover_delay_ms)
    }

    /// Set the viewport size using builder pattern.
    pub fn with_viewport(mut self, viewport: Size) -> Self {
        self.viewport = viewport;
        self
    }

    /// Set the hover delay using builder pattern.
    pub fn with_hover_delay_ms(mut self, delay: u64) -> Self {
        self.hover_delay_ms = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(MenuConfig::from_toml_str("").unwrap(), MenuConfig::default());
        assert_eq!(MenuConfig::default().hover_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = MenuConfig::from_toml_str("hover_delay_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_negative_metric_rejected() {
        let err = MenuConfig::from_toml_str("[menu_style]\nitem_height = -1.0").unwrap_err();
        match err {
            ConfigError::InvalidValue { field, .. } => assert_eq!(field, "menu_style.item_height"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = MenuConfig::default()
            .with_viewport(Size::new(640.0, 480.0))
            .with_hover_delay_ms(250);
        let text = toml::to_string(&config).unwrap();
        assert_eq!(MenuConfig::from_toml_str(&text).unwrap(), config);
    }
}
