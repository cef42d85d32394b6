//! Visual snapshots produced by the update pass.
//!
//! Drawing is the embedding framework's job. Each update pass rebuilds a
//! [`MenuVisual`] describing every node with the class tokens below, which a
//! renderer or a test can inspect.

use std::sync::Arc;

use crate::geometry::{Point, Rect, Size};
use crate::item::{ItemType, MenuItem, parse_mnemonic};

/// Class tokens applied to menu and menu bar nodes.
pub mod classes {
    pub const MENU: &str = "p-Menu";
    pub const MENU_BAR: &str = "p-MenuBar";
    pub const MENU_CONTENT: &str = "p-Menu-content";
    pub const MENU_BAR_CONTENT: &str = "p-MenuBar-content";
    pub const MENU_ITEM: &str = "p-Menu-item";
    pub const MENU_BAR_ITEM: &str = "p-MenuBar-item";
    pub const MENU_ITEM_ICON: &str = "p-Menu-item-icon";
    pub const MENU_BAR_ITEM_ICON: &str = "p-MenuBar-item-icon";
    pub const MENU_ITEM_TEXT: &str = "p-Menu-item-text";
    pub const MENU_BAR_ITEM_TEXT: &str = "p-MenuBar-item-text";
    pub const MENU_ITEM_SHORTCUT: &str = "p-Menu-item-shortcut";
    pub const MENU_ITEM_SUBMENU_ICON: &str = "p-Menu-item-submenu-icon";

    pub const ACTIVE: &str = "p-mod-active";
    pub const DISABLED: &str = "p-mod-disabled";
    pub const HIDDEN: &str = "p-mod-hidden";
    pub const FORCE_HIDDEN: &str = "p-mod-force-hidden";
    pub const CHECKED: &str = "p-mod-checked";
    pub const HAS_SUBMENU: &str = "p-mod-has-submenu";
    pub const CHECK_TYPE: &str = "p-mod-check-type";
    pub const SEPARATOR_TYPE: &str = "p-mod-separator-type";
}

/// Which container an item is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualKind {
    Menu,
    MenuBar,
}

impl VisualKind {
    fn node_class(self) -> &'static str {
        match self {
            Self::Menu => classes::MENU,
            Self::MenuBar => classes::MENU_BAR,
        }
    }

    fn content_class(self) -> &'static str {
        match self {
            Self::Menu => classes::MENU_CONTENT,
            Self::MenuBar => classes::MENU_BAR_CONTENT,
        }
    }

    fn item_class(self) -> &'static str {
        match self {
            Self::Menu => classes::MENU_ITEM,
            Self::MenuBar => classes::MENU_BAR_ITEM,
        }
    }

    fn icon_class(self) -> &'static str {
        match self {
            Self::Menu => classes::MENU_ITEM_ICON,
            Self::MenuBar => classes::MENU_BAR_ITEM_ICON,
        }
    }

    fn text_class(self) -> &'static str {
        match self {
            Self::Menu => classes::MENU_ITEM_TEXT,
            Self::MenuBar => classes::MENU_BAR_ITEM_TEXT,
        }
    }
}

/// Which visible separators should be hidden.
///
/// Leading and trailing separators are hidden, as is every separator that
/// directly follows another visible separator. Hidden items are ignored when
/// deciding what is adjacent.
pub fn force_hidden_separators(items: &[Arc<MenuItem>]) -> Vec<bool> {
    let mut hidden = vec![false; items.len()];

    let mut previous_was_separator = true;
    let mut last_visible_separator = None;
    for (i, item) in items.iter().enumerate() {
        if item.is_hidden() {
            continue;
        }
        if item.is_separator() {
            if previous_was_separator {
                hidden[i] = true;
            } else {
                last_visible_separator = Some(i);
            }
            previous_was_separator = true;
        } else {
            previous_was_separator = false;
            last_visible_separator = None;
        }
    }

    if let Some(i) = last_visible_separator {
        hidden[i] = true;
    }
    hidden
}

/// Snapshot of one item node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemVisual {
    /// Classes on the item node.
    pub classes: Vec<String>,
    /// Classes on the icon node: the icon class token plus the item's icon.
    pub icon_classes: Vec<String>,
    /// Class on the text node.
    pub text_class: &'static str,
    /// Display text with mnemonic markers removed.
    pub text: String,
    /// Byte index of the underlined mnemonic in `text`.
    pub mnemonic_index: Option<usize>,
    /// Shortcut label, empty for menu bars.
    pub shortcut: String,
    /// Class on the shortcut node; menus only.
    pub shortcut_class: Option<&'static str>,
    /// Class on the submenu indicator node; menu rows with a submenu only.
    pub submenu_icon_class: Option<&'static str>,
    /// Row rectangle relative to the container; `None` when not displayed.
    pub rect: Option<Rect>,
}

impl ItemVisual {
    /// Whether the item node carries `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Snapshot of a menu or menu bar node.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuVisual {
    /// Classes on the outer node.
    pub classes: Vec<String>,
    /// Class on the content node.
    pub content_class: &'static str,
    /// Position in viewport coordinates.
    pub position: Point,
    /// Outer size.
    pub size: Size,
    /// One entry per item.
    pub items: Vec<ItemVisual>,
}

impl MenuVisual {
    /// An empty snapshot for a node of `kind`.
    pub fn empty(kind: VisualKind) -> Self {
        Self {
            classes: vec![kind.node_class().to_string()],
            content_class: kind.content_class(),
            position: Point::ZERO,
            size: Size::ZERO,
            items: Vec::new(),
        }
    }

    /// Whether the outer node carries `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

fn split_classes(names: &str) -> impl Iterator<Item = String> + '_ {
    names.split_whitespace().map(str::to_string)
}

/// Build the snapshot of one item.
pub fn item_visual(
    kind: VisualKind,
    item: &MenuItem,
    active: bool,
    selectable: bool,
    force_hidden: bool,
    rect: Option<Rect>,
) -> ItemVisual {
    let mut item_classes = vec![kind.item_class().to_string()];
    if !selectable {
        item_classes.push(classes::DISABLED.to_string());
    }
    if kind == VisualKind::Menu {
        match item.item_type() {
            ItemType::Check => item_classes.push(classes::CHECK_TYPE.to_string()),
            ItemType::Separator => item_classes.push(classes::SEPARATOR_TYPE.to_string()),
            ItemType::Normal | ItemType::Submenu => {}
        }
        if item.is_checked() {
            item_classes.push(classes::CHECKED.to_string());
        }
    }
    if item.is_hidden() {
        item_classes.push(classes::HIDDEN.to_string());
    }
    if force_hidden {
        item_classes.push(classes::FORCE_HIDDEN.to_string());
    }
    if item.submenu().is_some() {
        item_classes.push(classes::HAS_SUBMENU.to_string());
    }
    if active {
        item_classes.push(classes::ACTIVE.to_string());
    }
    item_classes.extend(split_classes(&item.class_name()));

    let mut icon_classes = vec![kind.icon_class().to_string()];
    icon_classes.extend(split_classes(&item.icon()));

    let parsed = parse_mnemonic(&item.text());
    let (shortcut, shortcut_class, submenu_icon_class) = match kind {
        VisualKind::Menu => (
            item.shortcut(),
            Some(classes::MENU_ITEM_SHORTCUT),
            item.submenu().map(|_| classes::MENU_ITEM_SUBMENU_ICON),
        ),
        VisualKind::MenuBar => (String::new(), None, None),
    };

    ItemVisual {
        classes: item_classes,
        icon_classes,
        text_class: kind.text_class(),
        text: parsed.display_text,
        mnemonic_index: parsed.mnemonic_index,
        shortcut,
        shortcut_class,
        submenu_icon_class,
        rect,
    }
}
