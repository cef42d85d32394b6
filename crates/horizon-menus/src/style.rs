//! Metrics and layout for menus and menu bars.
//!
//! Rendering is left to the embedding framework; these metrics only decide
//! how much room each row takes, which is what positioning and hit testing
//! need. Text width is estimated from the character count.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, Size};
use crate::item::{ItemType, MenuItem};

// ============================================================================
// Menu Style
// ============================================================================

/// Metrics for popup menus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuStyle {
    /// Item height.
    pub item_height: f32,
    /// Separator height.
    pub separator_height: f32,
    /// Left padding (for icons/checkmarks).
    pub left_padding: f32,
    /// Right padding (for shortcuts/arrows).
    pub right_padding: f32,
    /// Text left margin (after icon area).
    pub text_margin: f32,
    /// Icon size.
    pub icon_size: f32,
    /// Border width.
    pub border_width: f32,
    /// Menu padding (around all items).
    pub padding: f32,
    /// Submenu arrow width.
    pub arrow_width: f32,
    /// Gap between text and shortcut.
    pub shortcut_gap: f32,
    /// Estimated width of one character.
    pub char_width: f32,
    /// Minimum menu width.
    pub min_width: f32,
}

impl Default for MenuStyle {
    fn default() -> Self {
        Self {
            item_height: 24.0,
            separator_height: 9.0,
            left_padding: 28.0,
            right_padding: 16.0,
            text_margin: 4.0,
            icon_size: 16.0,
            border_width: 1.0,
            padding: 4.0,
            arrow_width: 8.0,
            shortcut_gap: 20.0,
            char_width: 7.0,
            min_width: 100.0,
        }
    }
}

impl MenuStyle {
    /// Distance from the menu's top edge to its first row.
    pub fn content_inset(&self) -> f32 {
        self.border_width + self.padding
    }

    fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.char_width
    }

    fn row_height(&self, item: &MenuItem) -> f32 {
        if item.item_type() == ItemType::Separator {
            self.separator_height
        } else {
            self.item_height
        }
    }

    fn row_width(&self, item: &MenuItem) -> f32 {
        if item.is_separator() {
            return 0.0;
        }
        let shortcut = item.shortcut();
        let shortcut_width = if shortcut.is_empty() {
            0.0
        } else {
            self.text_width(&shortcut) + self.shortcut_gap
        };
        let arrow_width = if item.submenu().is_some() {
            self.arrow_width
        } else {
            0.0
        };
        self.left_padding
            + self.text_width(&item.display_text())
            + self.text_margin * 2.0
            + shortcut_width
            + arrow_width
            + self.right_padding
    }
}

/// Computed geometry of a menu.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MenuLayout {
    /// Outer size including border.
    pub size: Size,
    /// Row rectangles relative to the menu origin; `None` for rows that
    /// are not displayed.
    pub item_rects: Vec<Option<Rect>>,
}

impl MenuLayout {
    /// The displayed row containing the local point `(x, y)`.
    pub fn item_at(&self, x: f32, y: f32) -> Option<usize> {
        let point = crate::geometry::Point::new(x, y);
        self.item_rects
            .iter()
            .position(|rect| rect.is_some_and(|rect| rect.contains(point)))
    }
}

/// Lay out rows top to bottom. Hidden and force-hidden rows take no space.
pub fn layout_menu(style: &MenuStyle, items: &[Arc<MenuItem>], force_hidden: &[bool]) -> MenuLayout {
    let mut width = 0.0f32;
    let mut heights = Vec::with_capacity(items.len());

    for (i, item) in items.iter().enumerate() {
        let displayed = !item.is_hidden() && !force_hidden.get(i).copied().unwrap_or(false);
        if displayed {
            width = width.max(style.row_width(item));
            heights.push(Some(style.row_height(item)));
        } else {
            heights.push(None);
        }
    }

    width = (width + style.border_width * 2.0).max(style.min_width);
    let row_width = width - style.border_width * 2.0;

    let mut y = style.content_inset();
    let item_rects = heights
        .into_iter()
        .map(|height| {
            height.map(|height| {
                let rect = Rect::new(style.border_width, y, row_width, height);
                y += height;
                rect
            })
        })
        .collect();

    let height = y + style.padding + style.border_width;
    MenuLayout {
        size: Size::new(width, height),
        item_rects,
    }
}

// ============================================================================
// Menu Bar Style
// ============================================================================

/// Metrics for menu bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuBarStyle {
    /// Menu bar height.
    pub height: f32,
    /// Horizontal padding for each menu title.
    pub item_padding: f32,
    /// Width of a separator entry.
    pub separator_width: f32,
    /// Border width.
    pub border_width: f32,
    /// Estimated width of one character.
    pub char_width: f32,
}

impl Default for MenuBarStyle {
    fn default() -> Self {
        Self {
            height: 24.0,
            item_padding: 12.0,
            separator_width: 9.0,
            border_width: 1.0,
            char_width: 7.0,
        }
    }
}

/// Lay out bar entries left to right. Hidden entries take no space.
///
/// The returned layout's `size` spans the displayed entries.
pub fn layout_menu_bar(style: &MenuBarStyle, items: &[Arc<MenuItem>]) -> MenuLayout {
    let mut x = 0.0f32;
    let item_rects = items
        .iter()
        .map(|item| {
            if item.is_hidden() {
                return None;
            }
            let width = if item.is_separator() {
                style.separator_width
            } else {
                item.display_text().chars().count() as f32 * style.char_width
                    + style.item_padding * 2.0
            };
            let rect = Rect::new(x, 0.0, width, style.height);
            x += width;
            Some(rect)
        })
        .collect();

    MenuLayout {
        size: Size::new(x, style.height + style.border_width),
        item_rects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<Arc<MenuItem>> {
        vec![
            Arc::new(MenuItem::new().with_text("&Copy").with_shortcut("Ctrl+C")),
            Arc::new(MenuItem::separator()),
            Arc::new(MenuItem::new().with_text("Hidden").with_hidden(true)),
            Arc::new(MenuItem::new().with_text("Paste")),
        ]
    }

    #[test]
    fn test_menu_rows_stack() {
        let style = MenuStyle::default();
        let layout = layout_menu(&style, &items(), &[]);

        assert_eq!(layout.item_rects[0], Some(Rect::new(1.0, 5.0, layout.size.width - 2.0, 24.0)));
        assert_eq!(layout.item_rects[1].map(|r| r.top()), Some(29.0));
        assert_eq!(layout.item_rects[2], None);
        assert_eq!(layout.item_rects[3].map(|r| r.top()), Some(38.0));
        assert_eq!(layout.size.height, 38.0 + 24.0 + 4.0 + 1.0);
    }

    #[test]
    fn test_menu_width_fits_text_and_shortcut() {
        let style = MenuStyle::default();
        let layout = layout_menu(&style, &items(), &[]);
        // "Copy" + "Ctrl+C" is the widest row.
        let expected = 28.0 + 4.0 * 7.0 + 8.0 + 6.0 * 7.0 + 20.0 + 16.0 + 2.0;
        assert_eq!(layout.size.width, expected);
    }

    #[test]
    fn test_menu_min_width() {
        let style = MenuStyle::default();
        let layout = layout_menu(&style, &[Arc::new(MenuItem::new().with_text("A"))], &[]);
        assert_eq!(layout.size.width, 100.0);
    }

    #[test]
    fn test_force_hidden_rows_take_no_space() {
        let style = MenuStyle::default();
        let layout = layout_menu(&style, &items(), &[false, true, false, false]);
        assert_eq!(layout.item_rects[1], None);
        assert_eq!(layout.item_rects[3].map(|r| r.top()), Some(29.0));
    }

    #[test]
    fn test_item_at() {
        let style = MenuStyle::default();
        let layout = layout_menu(&style, &items(), &[]);
        assert_eq!(layout.item_at(10.0, 6.0), Some(0));
        assert_eq!(layout.item_at(10.0, 30.0), Some(1));
        assert_eq!(layout.item_at(10.0, 40.0), Some(3));
        assert_eq!(layout.item_at(10.0, 2.0), None);
    }

    #[test]
    fn test_bar_entries_run_horizontally() {
        let style = MenuBarStyle::default();
        let bar_items = vec![
            Arc::new(MenuItem::new().with_text("&File")),
            Arc::new(MenuItem::separator()),
            Arc::new(MenuItem::new().with_text("Edit")),
        ];
        let layout = layout_menu_bar(&style, &bar_items);
        assert_eq!(layout.item_rects[0], Some(Rect::new(0.0, 0.0, 52.0, 24.0)));
        assert_eq!(layout.item_rects[1], Some(Rect::new(52.0, 0.0, 9.0, 24.0)));
        assert_eq!(layout.item_rects[2].map(|r| r.left()), Some(61.0));
        assert_eq!(layout.size.width, 113.0);
        assert_eq!(layout.item_at(60.0, 5.0), Some(1));
    }
}
