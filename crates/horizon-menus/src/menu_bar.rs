//! Horizontal menu bars.
//!
//! A [`MenuBar`] is attached at a fixed origin and stays attached. Each
//! entry owns a dropdown menu; the bar opens at most one dropdown at a time
//! directly below its entry and holds the input grab while it is open. The
//! grab is released, and the bar's active index cleared, when the dropdown
//! closes.
//!
//! # Keyboard
//!
//! While a dropdown is open:
//!
//! | Key | Action |
//! |-----|--------|
//! | ArrowLeft | Close the deepest submenu, or open the previous entry |
//! | ArrowRight | Open the active submenu, or open the next entry |
//! | Anything else | Handled by the deepest open menu |

use std::sync::Arc;

use horizon_menus_core::logging::targets;
use horizon_menus_core::Signal;

use crate::events::{Key, KeyPressEvent, MouseButton, MouseButtonEvent};
use crate::geometry::{Point, Rect, dropdown_position};
use crate::grab::GrabOwner;
use crate::host::{MenuBarId, MenuHost, MenuId, PointerTarget};
use crate::item::MenuItem;
use crate::menu::MenuHook;
use crate::navigation::{
    ItemList, Navigable, SelectablePredicate, is_selectable_default, next_selectable,
    previous_selectable,
};
use crate::style::{MenuBarStyle, MenuLayout, layout_menu_bar};
use crate::visual::{MenuVisual, VisualKind, item_visual};

/// Bar entries are selectable only when they can open a dropdown.
fn bar_entry_selectable(item: &MenuItem) -> bool {
    is_selectable_default(item) && item.submenu().is_some()
}

/// A horizontal menu bar.
pub struct MenuBar {
    list: ItemList,
    attached: bool,
    origin: Point,
    visual: MenuVisual,
    child: Option<MenuId>,

    /// Signal emitted for lifecycle transitions.
    pub lifecycle: Signal<MenuHook>,
}

impl MenuBar {
    pub(crate) fn new() -> Self {
        let mut list = ItemList::new();
        list.set_selectable_predicate(Some(Arc::new(bar_entry_selectable)));
        Self {
            list,
            attached: false,
            origin: Point::ZERO,
            visual: MenuVisual::empty(VisualKind::MenuBar),
            child: None,
            lifecycle: Signal::new(),
        }
    }

    /// The navigation state.
    pub fn list(&self) -> &ItemList {
        &self.list
    }

    pub(crate) fn list_mut(&mut self) -> &mut ItemList {
        &mut self.list
    }

    /// The entries, left to right.
    pub fn items(&self) -> &[Arc<MenuItem>] {
        self.list.items()
    }

    /// The active index.
    pub fn active_index(&self) -> Option<usize> {
        self.list.active_index()
    }

    /// The active entry.
    pub fn active_item(&self) -> Option<Arc<MenuItem>> {
        self.list.active_item()
    }

    /// Set the active index; a rejected index clears it.
    pub fn set_active_index(&mut self, index: Option<usize>) -> Option<usize> {
        self.list.set_active_index(index)
    }

    /// Activate `item`; an unknown or unselectable entry clears the index.
    pub fn set_active_item(&mut self, item: Option<&Arc<MenuItem>>) -> Option<usize> {
        self.list.set_active_item(item)
    }

    /// Activate the next selectable entry, wrapping.
    pub fn activate_next_item(&mut self) {
        self.list.activate_next_item();
    }

    /// Activate the previous selectable entry, wrapping.
    pub fn activate_previous_item(&mut self) {
        self.list.activate_previous_item();
    }

    /// Activate the next selectable entry whose mnemonic matches `key`.
    pub fn activate_mnemonic_item(&mut self, key: char) {
        self.list.activate_mnemonic_item(key);
    }

    /// Override which entries may become active. `None` restores the bar
    /// rule: selectable by the default rule and owning a submenu.
    pub fn set_selectable_predicate(&mut self, predicate: Option<SelectablePredicate>) {
        let predicate: SelectablePredicate = match predicate {
            Some(predicate) => predicate,
            None => Arc::new(bar_entry_selectable),
        };
        self.list.set_selectable_predicate(Some(predicate));
    }

    /// Whether the bar is attached to the display.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Top-left corner in viewport coordinates.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// The open dropdown.
    pub fn child_menu(&self) -> Option<MenuId> {
        self.child
    }

    /// The visual snapshot from the last update.
    pub fn visual(&self) -> &MenuVisual {
        &self.visual
    }

    pub(crate) fn layout(&self, style: &MenuBarStyle) -> MenuLayout {
        layout_menu_bar(style, self.items())
    }

    /// Entry rectangle of `index` in viewport coordinates.
    pub(crate) fn item_rect(&self, style: &MenuBarStyle, index: usize) -> Option<Rect> {
        self.layout(style)
            .item_rects
            .get(index)
            .copied()
            .flatten()
            .map(|rect| rect.translated(self.origin))
    }

    /// The displayed entry under the viewport point `pos`.
    pub(crate) fn item_at(&self, style: &MenuBarStyle, pos: Point) -> Option<usize> {
        self.layout(style)
            .item_at(pos.x - self.origin.x, pos.y - self.origin.y)
    }

    /// Outer rectangle in viewport coordinates.
    pub(crate) fn rect(&self, style: &MenuBarStyle) -> Rect {
        Rect::from_origin_size(self.origin, self.layout(style).size)
    }

    pub(crate) fn update(&mut self, style: &MenuBarStyle) {
        self.list.take_dirty();
        self.list.revalidate_active();
        self.list.take_dirty();

        let layout = self.layout(style);
        let active = self.list.active_index();
        let items = self
            .items()
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item_visual(
                    VisualKind::MenuBar,
                    item,
                    active == Some(i),
                    self.list.is_selectable(item),
                    false,
                    layout.item_rects[i],
                )
            })
            .collect();

        self.visual.items = items;
        self.visual.size = layout.size;
        self.visual.position = self.origin;
        self.lifecycle.emit(MenuHook::UpdateRequest);
    }
}

impl Navigable for MenuBar {
    fn items(&self) -> &[Arc<MenuItem>] {
        self.list.items()
    }

    fn is_selectable(&self, item: &MenuItem) -> bool {
        self.list.is_selectable(item)
    }
}

impl std::fmt::Debug for MenuBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuBar")
            .field("items", &self.items().len())
            .field("active_index", &self.active_index())
            .field("attached", &self.attached)
            .field("child", &self.child)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Host Operations
// ============================================================================

impl MenuHost {
    /// Attach a bar with its top-left corner at `origin`.
    ///
    /// The visual is built on the next [`process_updates`](MenuHost::process_updates).
    pub fn attach_menu_bar(&mut self, id: MenuBarId, origin: Point) {
        let Some(bar) = self.bars.get_mut(id) else {
            tracing::warn!(target: targets::MENU_BAR, ?id, "attach of unknown menu bar");
            return;
        };
        if bar.attached {
            return;
        }
        bar.attached = true;
        bar.origin = origin;
        bar.lifecycle.emit(MenuHook::AfterAttach);
        bar.list.mark_dirty();
        tracing::debug!(target: targets::MENU_BAR, ?id, ?origin, "menu bar attached");
    }

    /// Detach a bar, closing its dropdown. Detaching twice does nothing.
    pub fn detach_menu_bar(&mut self, id: MenuBarId) {
        if !self.bars.get(id).is_some_and(MenuBar::is_attached) {
            return;
        }
        self.close_bar_child(id);
        self.forget_hovered(PointerTarget::Bar(id));

        let Some(bar) = self.bars.get_mut(id) else {
            return;
        };
        bar.lifecycle.emit(MenuHook::BeforeDetach);
        bar.attached = false;
        bar.list.set_active_index(None);
        tracing::debug!(target: targets::MENU_BAR, ?id, "menu bar detached");
    }

    /// Request that a bar close: emits [`MenuHook::CloseRequest`], then
    /// detaches.
    pub fn close_menu_bar(&mut self, id: MenuBarId) {
        let Some(bar) = self.bars.get(id) else {
            return;
        };
        if !bar.attached {
            return;
        }
        bar.lifecycle.emit(MenuHook::CloseRequest);
        self.detach_menu_bar(id);
    }

    /// Replace a bar's entries, returning the old ones. The open dropdown
    /// closes.
    pub fn set_bar_items(&mut self, id: MenuBarId, items: Vec<Arc<MenuItem>>) -> Vec<Arc<MenuItem>> {
        self.close_bar_child(id);
        match self.bars.get_mut(id) {
            Some(bar) => bar.list.set_items(items),
            None => {
                tracing::warn!(target: targets::MENU_BAR, ?id, "set_bar_items on unknown menu bar");
                Vec::new()
            }
        }
    }

    /// Open the active entry's dropdown below it and take the input grab.
    ///
    /// With `activate_first` the dropdown's first selectable item becomes
    /// active. No-op if the bar is detached, nothing is active or the
    /// dropdown is already open.
    pub fn open_bar_active_item(&mut self, id: MenuBarId, activate_first: bool) {
        let style = &self.config.menu_bar_style;
        let Some(bar) = self.bars.get(id) else {
            return;
        };
        if !bar.attached {
            return;
        }
        let (Some(index), Some(submenu)) = (
            bar.active_index(),
            bar.active_item().and_then(|item| item.submenu()),
        ) else {
            return;
        };
        if bar.child == Some(submenu) {
            return;
        }
        let Some(item_rect) = bar.item_rect(style, index) else {
            return;
        };
        if !self.menus.contains_key(submenu) {
            tracing::warn!(target: targets::MENU_BAR, ?id, ?submenu, "dropdown menu is gone");
            return;
        }

        self.close_bar_child(id);
        self.close_menu(submenu, true);
        self.release_other_grab(GrabOwner::Bar(id));
        // Closing the previous dropdown cleared the active entry.
        if let Some(bar) = self.bars.get_mut(id) {
            bar.list.set_active_index(Some(index));
        }

        let size = self.attach_menu(submenu, false);
        let position = dropdown_position(item_rect, size, self.config.viewport);
        if let Some(menu) = self.menus.get_mut(submenu) {
            menu.place(position);
            menu.set_owner_bar(Some(id));
            if activate_first {
                menu.list_mut().activate_first_item();
            }
        }
        if let Some(bar) = self.bars.get_mut(id) {
            bar.child = Some(submenu);
        }
        self.grab.acquire(GrabOwner::Bar(id));
        tracing::debug!(target: targets::MENU_BAR, ?id, index, ?submenu, ?position, "dropdown opened");
    }

    /// Close the bar's open dropdown, if any.
    pub fn close_bar_child(&mut self, id: MenuBarId) {
        if let Some(child) = self.bars.get(id).and_then(MenuBar::child_menu) {
            self.close_menu(child, true);
        }
    }

    /// Called when the dropdown `menu` closes.
    pub(crate) fn detach_bar_child(&mut self, id: MenuBarId, menu: MenuId) {
        let Some(bar) = self.bars.get_mut(id) else {
            return;
        };
        if bar.child != Some(menu) {
            return;
        }
        bar.child = None;
        bar.list.set_active_index(None);
        if self.grab.release(GrabOwner::Bar(id)) {
            self.pressed = false;
        }
        tracing::debug!(target: targets::MENU_BAR, ?id, ?menu, "dropdown closed");
    }

    /// Activate `index` and open its dropdown in place of the current one.
    fn switch_bar_item(&mut self, id: MenuBarId, index: usize, activate_first: bool) {
        let accepted = self
            .bars
            .get_mut(id)
            .and_then(|bar| bar.list.set_active_index(Some(index)));
        if accepted.is_some() {
            self.open_bar_active_item(id, activate_first);
        } else {
            self.close_bar_child(id);
        }
    }

    fn step_bar(&mut self, id: MenuBarId, forward: bool) {
        let Some(bar) = self.bars.get(id) else {
            return;
        };
        let current = bar.active_index();
        let target = if forward {
            next_selectable(bar, current)
        } else {
            previous_selectable(bar, current)
        };
        if let Some(target) = target
            && Some(target) != current
        {
            self.switch_bar_item(id, target, true);
        }
    }

    // =========================================================================
    // Input
    // =========================================================================

    pub(crate) fn handle_bar_key(&mut self, id: MenuBarId, event: &KeyPressEvent) -> bool {
        let Some(child) = self.bars.get(id).and_then(MenuBar::child_menu) else {
            return false;
        };
        let leaf = self.leaf_menu(child);
        tracing::trace!(target: targets::INPUT, ?id, ?leaf, key = ?event.key, "menu bar key");
        match event.key {
            Key::ArrowLeft if leaf != child => self.close_menu(leaf, false),
            Key::ArrowLeft => self.step_bar(id, false),
            Key::ArrowRight => {
                let has_submenu = self
                    .menus
                    .get(leaf)
                    .and_then(|menu| menu.active_item())
                    .is_some_and(|item| item.submenu().is_some());
                if has_submenu {
                    self.open_active_and_enter(leaf);
                } else {
                    self.step_bar(id, true);
                }
            }
            _ => return self.handle_menu_key(leaf, event),
        }
        true
    }

    /// A press while the bar holds the grab, or on the bar itself.
    ///
    /// Entries toggle: pressing the open entry closes its dropdown, pressing
    /// another entry opens that one. Presses outside the bar and its chain
    /// close the dropdown and are not consumed.
    pub(crate) fn handle_bar_mouse_down(&mut self, id: MenuBarId, event: MouseButtonEvent) -> bool {
        let style = &self.config.menu_bar_style;
        let Some(bar) = self.bars.get(id) else {
            return false;
        };
        let on_bar = bar.attached && bar.rect(style).contains(event.pos);
        let index = if on_bar { bar.item_at(style, event.pos) } else { None };
        let active = bar.active_index();
        let child = bar.child;
        let in_chain = child.is_some_and(|child| self.chain_contains(child, event.pos));

        if event.button != MouseButton::Left {
            return on_bar || in_chain;
        }
        if in_chain {
            self.pressed = true;
            return true;
        }
        if !on_bar {
            tracing::trace!(target: targets::INPUT, ?id, "press outside menu bar");
            self.close_bar_child(id);
            return false;
        }

        match index {
            Some(index) if child.is_some() && active == Some(index) => self.close_bar_child(id),
            Some(index) => self.switch_bar_item(id, index, false),
            None => self.close_bar_child(id),
        }
        true
    }

    pub(crate) fn handle_bar_move(&mut self, id: MenuBarId, pos: Point) {
        let style = &self.config.menu_bar_style;
        let Some(bar) = self.bars.get_mut(id) else {
            return;
        };
        let index = bar.item_at(style, pos);
        if index == bar.active_index() {
            return;
        }
        if bar.child.is_none() {
            bar.list.set_active_index(index);
            return;
        }
        let opens = index
            .and_then(|i| bar.items().get(i))
            .is_some_and(|item| bar.list.is_selectable(item));
        if let Some(index) = index
            && opens
        {
            self.switch_bar_item(id, index, false);
        }
    }

    pub(crate) fn handle_bar_leave(&mut self, id: MenuBarId) {
        if let Some(bar) = self.bars.get_mut(id)
            && bar.child.is_none()
        {
            bar.list.set_active_index(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn leaf(text: &str) -> Arc<MenuItem> {
        Arc::new(MenuItem::new().with_text(text).with_handler(|_| {}))
    }

    /// File, separator, Help, plain entry without a dropdown.
    fn bar(host: &mut MenuHost) -> (MenuBarId, MenuId, MenuId) {
        let file = host.create_menu(vec![leaf("New"), leaf("Open"), leaf("Exit")]);
        let help = host.create_menu(vec![leaf("About")]);
        let id = host.create_menu_bar(vec![
            Arc::new(MenuItem::new().with_text("&File").with_submenu(file)),
            Arc::new(MenuItem::separator()),
            Arc::new(MenuItem::new().with_text("&Help").with_submenu(help)),
            Arc::new(MenuItem::new().with_text("plain")),
        ]);
        (id, file, help)
    }

    #[test]
    fn test_entries_without_dropdown_are_not_selectable() {
        let mut host = MenuHost::new();
        let (id, _, _) = bar(&mut host);
        let bar = host.menu_bar_mut(id).unwrap();
        assert_eq!(bar.set_active_index(Some(3)), None);
        bar.activate_next_item();
        assert_eq!(bar.active_index(), Some(0));
        bar.activate_next_item();
        assert_eq!(bar.active_index(), Some(2));
        bar.activate_next_item();
        assert_eq!(bar.active_index(), Some(0));
    }

    #[test]
    fn test_custom_predicate_and_reset() {
        let mut host = MenuHost::new();
        let (id, _, _) = bar(&mut host);
        let bar = host.menu_bar_mut(id).unwrap();
        bar.set_selectable_predicate(Some(Arc::new(is_selectable_default)));
        assert_eq!(bar.set_active_index(Some(3)), Some(3));
        bar.set_selectable_predicate(None);
        assert_eq!(bar.active_index(), None);
    }

    #[test]
    fn test_attach_defers_update() {
        let mut host = MenuHost::new();
        let (id, _, _) = bar(&mut host);
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        host.menu_bar(id)
            .unwrap()
            .lifecycle
            .connect(move |hook| log_clone.lock().push(*hook));

        host.attach_menu_bar(id, Point::ZERO);
        assert_eq!(*log.lock(), vec![MenuHook::AfterAttach]);
        assert!(host.menu_bar(id).unwrap().visual().items.is_empty());

        assert_eq!(host.process_updates(), 1);
        assert_eq!(*log.lock(), vec![MenuHook::AfterAttach, MenuHook::UpdateRequest]);
        let visual = host.menu_bar(id).unwrap().visual();
        assert_eq!(visual.items.len(), 4);
        assert!(visual.items[0].has_class("p-MenuBar-item"));
        assert!(visual.items[3].has_class("p-mod-disabled"));
    }

    #[test]
    fn test_open_places_dropdown_below_entry() {
        let mut host = MenuHost::new();
        let (id, _, help) = bar(&mut host);
        host.attach_menu_bar(id, Point::new(0.0, 10.0));
        host.menu_bar_mut(id).unwrap().set_active_index(Some(2));
        host.open_bar_active_item(id, false);

        let bar = host.menu_bar(id).unwrap();
        assert_eq!(bar.child_menu(), Some(help));
        let entry = bar.item_rect(&host.config().menu_bar_style, 2).unwrap();
        let menu = host.menu(help).unwrap();
        assert_eq!(menu.position(), Point::new(entry.left(), 34.0));
        assert_eq!(menu.owner_bar(), Some(id));
        assert_eq!(menu.active_index(), None);
        assert_eq!(host.grab_owner(), Some(GrabOwner::Bar(id)));
    }

    #[test]
    fn test_open_bails() {
        let mut host = MenuHost::new();
        let (id, file, _) = bar(&mut host);

        host.menu_bar_mut(id).unwrap().set_active_index(Some(0));
        host.open_bar_active_item(id, false);
        assert_eq!(host.menu_bar(id).unwrap().child_menu(), None);

        host.attach_menu_bar(id, Point::ZERO);
        host.menu_bar_mut(id).unwrap().set_active_index(None);
        host.open_bar_active_item(id, false);
        assert_eq!(host.menu_bar(id).unwrap().child_menu(), None);
        assert!(!host.menu(file).unwrap().is_open());
        assert_eq!(host.grab_owner(), None);
    }

    #[test]
    fn test_closing_dropdown_resets_bar() {
        let mut host = MenuHost::new();
        let (id, file, _) = bar(&mut host);
        host.attach_menu_bar(id, Point::ZERO);
        host.menu_bar_mut(id).unwrap().set_active_index(Some(0));
        host.open_bar_active_item(id, true);
        assert_eq!(host.menu(file).unwrap().active_index(), Some(0));

        host.close_menu(file, false);
        let bar = host.menu_bar(id).unwrap();
        assert_eq!(bar.child_menu(), None);
        assert_eq!(bar.active_index(), None);
        assert_eq!(host.menu(file).unwrap().owner_bar(), None);
        assert_eq!(host.grab_owner(), None);
    }

    #[test]
    fn test_set_items_closes_dropdown() {
        let mut host = MenuHost::new();
        let (id, file, _) = bar(&mut host);
        host.attach_menu_bar(id, Point::ZERO);
        host.menu_bar_mut(id).unwrap().set_active_index(Some(0));
        host.open_bar_active_item(id, false);

        let old = host.set_bar_items(id, Vec::new());
        assert_eq!(old.len(), 4);
        assert!(!host.menu(file).unwrap().is_open());
        assert_eq!(host.menu_bar(id).unwrap().child_menu(), None);
    }

    #[test]
    fn test_close_request_then_detach() {
        let mut host = MenuHost::new();
        let (id, file, _) = bar(&mut host);
        host.attach_menu_bar(id, Point::ZERO);
        host.menu_bar_mut(id).unwrap().set_active_index(Some(0));
        host.open_bar_active_item(id, false);

        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        host.menu_bar(id)
            .unwrap()
            .lifecycle
            .connect(move |hook| log_clone.lock().push(*hook));

        host.close_menu_bar(id);
        assert_eq!(*log.lock(), vec![MenuHook::CloseRequest, MenuHook::BeforeDetach]);
        assert!(!host.menu_bar(id).unwrap().is_attached());
        assert!(!host.menu(file).unwrap().is_open());

        host.close_menu_bar(id);
        assert_eq!(log.lock().len(), 2);
    }

    #[test]
    fn test_arrow_keys_step_between_dropdowns() {
        let mut host = MenuHost::new();
        let (id, file, help) = bar(&mut host);
        host.attach_menu_bar(id, Point::ZERO);
        host.menu_bar_mut(id).unwrap().set_active_index(Some(0));
        host.open_bar_active_item(id, false);

        assert!(host.handle_bar_key(id, &KeyPressEvent::new(Key::ArrowRight)));
        assert_eq!(host.menu_bar(id).unwrap().active_index(), Some(2));
        assert_eq!(host.menu_bar(id).unwrap().child_menu(), Some(help));
        assert_eq!(host.menu(help).unwrap().active_index(), Some(0));
        assert!(!host.menu(file).unwrap().is_open());

        assert!(host.handle_bar_key(id, &KeyPressEvent::new(Key::ArrowLeft)));
        assert_eq!(host.menu_bar(id).unwrap().child_menu(), Some(file));
        assert_eq!(host.grab_owner(), Some(GrabOwner::Bar(id)));
    }

    #[test]
    fn test_keys_ignored_without_dropdown() {
        let mut host = MenuHost::new();
        let (id, _, _) = bar(&mut host);
        host.attach_menu_bar(id, Point::ZERO);
        assert!(!host.handle_bar_key(id, &KeyPressEvent::new(Key::ArrowRight)));
    }
}
