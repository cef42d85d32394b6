//! Declarative menu templates.
//!
//! An [`ItemTemplate`] is a plain record describing one item and, through
//! `submenu`, the items of its child menu. Templates deserialize from JSON
//! with camelCase keys; handlers cannot be serialized and are attached in
//! code.
//!
//! ```
//! use horizon_menus::{ItemTemplate, MenuHost, templates_from_json};
//!
//! let templates = templates_from_json(
//!     r#"[
//!         { "text": "&Open", "shortcut": "Ctrl+O" },
//!         { "type": "separator" },
//!         { "text": "Recent", "submenu": [{ "text": "notes.txt" }] },
//!         { "type": "check", "text": "Word &Wrap", "className": "wrap" }
//!     ]"#,
//! )
//! .unwrap();
//!
//! let mut host = MenuHost::new();
//! let menu = host.build_menu(&templates).unwrap();
//! assert_eq!(host.menu(menu).unwrap().items().len(), 4);
//! assert_eq!(host.menu_template(menu).unwrap(), templates);
//! ```

use std::sync::Arc;

use horizon_menus_core::logging::targets;
use serde::{Deserialize, Serialize};

use crate::error::TemplateError;
use crate::host::{MenuBarId, MenuHost, MenuId};
use crate::item::{Handler, ItemType, MenuItem};

/// Description of a menu item and its submenu.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemTemplate {
    /// `"normal"`, `"check"` or `"separator"`; absent means normal.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icon: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub shortcut: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub class_name: String,
    #[serde(skip_serializing_if = "is_false")]
    pub disabled: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub checked: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub hidden: bool,
    /// Callback run on trigger. Never serialized.
    #[serde(skip)]
    pub handler: Option<Handler>,
    /// Items of the child menu.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submenu: Option<Vec<ItemTemplate>>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ItemTemplate {
    /// Parse a single template from JSON.
    pub fn from_json(text: &str) -> Result<Self, TemplateError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize to JSON, dropping the handler.
    pub fn to_json(&self) -> Result<String, TemplateError> {
        Ok(serde_json::to_string(self)?)
    }

    /// The declared item type.
    pub fn parsed_type(&self) -> Result<ItemType, TemplateError> {
        match self.item_type.as_deref() {
            None | Some("normal") | Some("submenu") => Ok(ItemType::Normal),
            Some("check") => Ok(ItemType::Check),
            Some("separator") => Ok(ItemType::Separator),
            Some(other) => Err(TemplateError::UnknownItemType(other.to_string())),
        }
    }

    /// Check this template and its submenu templates.
    pub fn validate(&self) -> Result<(), TemplateError> {
        self.parsed_type()?;
        self.submenu
            .iter()
            .flatten()
            .try_for_each(ItemTemplate::validate)
    }
}

/// Parse a JSON array of templates.
pub fn templates_from_json(text: &str) -> Result<Vec<ItemTemplate>, TemplateError> {
    Ok(serde_json::from_str(text)?)
}

impl MenuHost {
    /// Create a menu, and its submenus, from templates.
    ///
    /// Every template is validated before anything is created.
    pub fn build_menu(&mut self, templates: &[ItemTemplate]) -> Result<MenuId, TemplateError> {
        templates.iter().try_for_each(ItemTemplate::validate)?;
        Ok(self.build_menu_unchecked(templates))
    }

    /// Create a detached menu bar, and its dropdowns, from templates.
    pub fn build_menu_bar(&mut self, templates: &[ItemTemplate]) -> Result<MenuBarId, TemplateError> {
        templates.iter().try_for_each(ItemTemplate::validate)?;
        let items = templates.iter().map(|t| self.build_item(t)).collect();
        Ok(self.create_menu_bar(items))
    }

    fn build_menu_unchecked(&mut self, templates: &[ItemTemplate]) -> MenuId {
        let items = templates.iter().map(|t| self.build_item(t)).collect();
        self.create_menu(items)
    }

    fn build_item(&mut self, template: &ItemTemplate) -> Arc<MenuItem> {
        let mut item = MenuItem::new()
            .with_type(template.parsed_type().unwrap_or_default())
            .with_text(template.text.as_str())
            .with_icon(template.icon.as_str())
            .with_shortcut(template.shortcut.as_str())
            .with_class_name(template.class_name.as_str())
            .with_disabled(template.disabled)
            .with_checked(template.checked)
            .with_hidden(template.hidden);
        if let Some(submenu) = &template.submenu {
            item = item.with_submenu(self.build_menu_unchecked(submenu));
        }
        if template.handler.is_some() {
            item.set_handler(template.handler.clone());
        }
        Arc::new(item)
    }

    /// Describe a menu's items, and their submenus, as templates.
    ///
    /// A submenu that already appears above it in the tree is left out.
    pub fn menu_template(&self, id: MenuId) -> Option<Vec<ItemTemplate>> {
        let mut path = Vec::new();
        self.menu_template_inner(id, &mut path)
    }

    /// Describe a menu bar's entries as templates.
    pub fn menu_bar_template(&self, id: MenuBarId) -> Option<Vec<ItemTemplate>> {
        let bar = self.bars.get(id)?;
        let mut path = Vec::new();
        Some(
            bar.items()
                .iter()
                .map(|item| self.item_template(item, &mut path))
                .collect(),
        )
    }

    fn menu_template_inner(&self, id: MenuId, path: &mut Vec<MenuId>) -> Option<Vec<ItemTemplate>> {
        let menu = self.menus.get(id)?;
        path.push(id);
        let templates = menu
            .items()
            .iter()
            .map(|item| self.item_template(item, path))
            .collect();
        path.pop();
        Some(templates)
    }

    fn item_template(&self, item: &MenuItem, path: &mut Vec<MenuId>) -> ItemTemplate {
        let item_type = match item.item_type() {
            ItemType::Normal | ItemType::Submenu => None,
            other => Some(other.as_str().to_string()),
        };
        let submenu = item.submenu().and_then(|submenu| {
            if path.contains(&submenu) {
                tracing::warn!(target: targets::MENU, ?submenu, "submenu cycle left out of template");
                return None;
            }
            self.menu_template_inner(submenu, path)
        });
        ItemTemplate {
            item_type,
            text: item.text(),
            icon: item.icon(),
            shortcut: item.shortcut(),
            class_name: item.class_name(),
            disabled: item.is_disabled(),
            checked: item.is_checked(),
            hidden: item.is_hidden(),
            handler: item.handler(),
            submenu,
        }
    }
}
