//! Popup menus.
//!
//! A [`Menu`] is a vertical list of items that can be shown at a point,
//! either interactively with [`MenuHost::popup`] (it takes the input grab)
//! or passively with [`MenuHost::open`]. Submenus open beside the item that
//! owns them and form a chain: each open menu has at most one open child,
//! and the chain unwinds from the leaf when any part of it closes.
//!
//! # Example
//!
//! ```
//! use horizon_menus::{MenuHost, MenuItem};
//! use std::sync::Arc;
//!
//! let mut host = MenuHost::new();
//! let menu = host.create_menu(vec![
//!     Arc::new(MenuItem::new().with_text("&Copy").with_shortcut("Ctrl+C")),
//!     Arc::new(MenuItem::separator()),
//!     Arc::new(MenuItem::new().with_text("&Paste").with_shortcut("Ctrl+V")),
//! ]);
//!
//! host.popup(menu, 10.0, 10.0, false, false);
//! assert!(host.menu(menu).unwrap().is_open());
//!
//! host.close_menu(menu, false);
//! assert!(!host.menu(menu).unwrap().is_open());
//! ```
//!
//! # Keyboard
//!
//! While a chain holds the grab, keys go to its leaf menu:
//!
//! | Key | Action |
//! |-----|--------|
//! | Enter | Trigger the active item |
//! | Escape | Close the leaf |
//! | ArrowLeft | Close the leaf unless it is the root |
//! | ArrowRight | Open the active submenu and activate its first item |
//! | ArrowUp / ArrowDown | Previous / next selectable item |
//! | Home / End | First / last selectable item |
//! | Character | Next item with that mnemonic |

use std::sync::Arc;

use horizon_menus_core::logging::targets;
use horizon_menus_core::Signal;

use crate::events::{Key, KeyPressEvent, MouseButton, MouseButtonEvent};
use crate::geometry::{Point, Rect, Size, fit_position, submenu_position};
use crate::grab::GrabOwner;
use crate::host::{MenuBarId, MenuHost, MenuId, PointerTarget};
use crate::item::MenuItem;
use crate::navigation::{ItemList, Navigable, SelectablePredicate};
use crate::style::{MenuLayout, MenuStyle, layout_menu};
use crate::visual::{MenuVisual, VisualKind, force_hidden_separators, item_visual};

/// Whether a menu is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuState {
    /// Not attached to the display.
    #[default]
    Closed,
    /// Attached. An interactive menu was opened with `popup` and its chain
    /// receives input through the grab.
    Open { interactive: bool },
}

/// Lifecycle notifications emitted on [`Menu::lifecycle`] and
/// [`MenuBar::lifecycle`](crate::MenuBar::lifecycle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuHook {
    /// The node was attached to the display.
    AfterAttach,
    /// The node is about to be detached.
    BeforeDetach,
    /// The node's visual was rebuilt.
    UpdateRequest,
    /// A non-forced close was requested.
    CloseRequest,
}

// ============================================================================
// Menu
// ============================================================================

/// A popup menu.
///
/// Navigation methods act on the menu directly; everything that involves
/// other menus (opening, closing, triggering) goes through [`MenuHost`].
///
/// # Signals
///
/// - [`closed`](Menu::closed): Emitted once each time the menu closes
/// - [`triggered`](Menu::triggered): Emitted after an item of this menu runs
/// - [`lifecycle`](Menu::lifecycle): Attach, detach, update and close requests
pub struct Menu {
    list: ItemList,
    state: MenuState,
    position: Point,
    size: Size,
    visual: MenuVisual,
    parent: Option<MenuId>,
    child: Option<MenuId>,
    bar_owner: Option<MenuBarId>,

    /// Signal emitted when the menu closes.
    pub closed: Signal<()>,
    /// Signal emitted after one of this menu's items is triggered.
    pub triggered: Signal<Arc<MenuItem>>,
    /// Signal emitted for lifecycle transitions.
    pub lifecycle: Signal<MenuHook>,
}

impl Menu {
    pub(crate) fn new() -> Self {
        Self {
            list: ItemList::new(),
            state: MenuState::Closed,
            position: Point::ZERO,
            size: Size::ZERO,
            visual: MenuVisual::empty(VisualKind::Menu),
            parent: None,
            child: None,
            bar_owner: None,
            closed: Signal::new(),
            triggered: Signal::new(),
            lifecycle: Signal::new(),
        }
    }

    // =========================================================================
    // Items and Navigation
    // =========================================================================

    /// The navigation state.
    pub fn list(&self) -> &ItemList {
        &self.list
    }

    pub(crate) fn list_mut(&mut self) -> &mut ItemList {
        &mut self.list
    }

    /// The items, in display order.
    pub fn items(&self) -> &[Arc<MenuItem>] {
        self.list.items()
    }

    /// The active index.
    pub fn active_index(&self) -> Option<usize> {
        self.list.active_index()
    }

    /// The active item.
    pub fn active_item(&self) -> Option<Arc<MenuItem>> {
        self.list.active_item()
    }

    /// Set the active index; a rejected index clears it.
    pub fn set_active_index(&mut self, index: Option<usize>) -> Option<usize> {
        self.list.set_active_index(index)
    }

    /// Activate `item`; an unknown or unselectable item clears the index.
    pub fn set_active_item(&mut self, item: Option<&Arc<MenuItem>>) -> Option<usize> {
        self.list.set_active_item(item)
    }

    /// Activate the next selectable item, wrapping.
    pub fn activate_next_item(&mut self) {
        self.list.activate_next_item();
    }

    /// Activate the previous selectable item, wrapping.
    pub fn activate_previous_item(&mut self) {
        self.list.activate_previous_item();
    }

    /// Activate the next selectable item whose mnemonic matches `key`.
    pub fn activate_mnemonic_item(&mut self, key: char) {
        self.list.activate_mnemonic_item(key);
    }

    /// Override which items may become active.
    pub fn set_selectable_predicate(&mut self, predicate: Option<SelectablePredicate>) {
        self.list.set_selectable_predicate(predicate);
    }

    // =========================================================================
    // State
    // =========================================================================

    /// The open/closed state.
    pub fn state(&self) -> MenuState {
        self.state
    }

    /// Whether the menu is attached to the display.
    pub fn is_open(&self) -> bool {
        matches!(self.state, MenuState::Open { .. })
    }

    /// Whether the menu was opened with `popup`.
    pub fn is_interactive(&self) -> bool {
        self.state == MenuState::Open { interactive: true }
    }

    /// Position in viewport coordinates.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Outer size from the last layout.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Outer rectangle in viewport coordinates.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// The menu this one is open as a submenu of.
    pub fn parent_menu(&self) -> Option<MenuId> {
        self.parent
    }

    /// The open submenu.
    pub fn child_menu(&self) -> Option<MenuId> {
        self.child
    }

    /// The menu bar this menu drops down from.
    pub fn owner_bar(&self) -> Option<MenuBarId> {
        self.bar_owner
    }

    /// The visual snapshot from the last update.
    pub fn visual(&self) -> &MenuVisual {
        &self.visual
    }

    // =========================================================================
    // Layout
    // =========================================================================

    pub(crate) fn layout(&self, style: &MenuStyle) -> MenuLayout {
        layout_menu(style, self.items(), &force_hidden_separators(self.items()))
    }

    /// Row rectangle of `index` in viewport coordinates.
    pub(crate) fn item_rect(&self, style: &MenuStyle, index: usize) -> Option<Rect> {
        self.layout(style)
            .item_rects
            .get(index)
            .copied()
            .flatten()
            .map(|rect| rect.translated(self.position))
    }

    /// The displayed row under the viewport point `pos`.
    pub(crate) fn item_at(&self, style: &MenuStyle, pos: Point) -> Option<usize> {
        self.layout(style)
            .item_at(pos.x - self.position.x, pos.y - self.position.y)
    }

    /// Rebuild size and visual from the current items.
    pub(crate) fn update(&mut self, style: &MenuStyle) {
        self.list.take_dirty();
        self.list.revalidate_active();
        self.list.take_dirty();

        let force_hidden = force_hidden_separators(self.items());
        let layout = layout_menu(style, self.items(), &force_hidden);
        self.size = layout.size;

        let active = self.list.active_index();
        let items = self
            .items()
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item_visual(
                    VisualKind::Menu,
                    item,
                    active == Some(i),
                    self.list.is_selectable(item),
                    force_hidden[i],
                    layout.item_rects[i],
                )
            })
            .collect();

        self.visual.items = items;
        self.visual.size = layout.size;
        self.visual.position = self.position;
        self.lifecycle.emit(MenuHook::UpdateRequest);
    }

    pub(crate) fn place(&mut self, position: Point) {
        self.position = position;
        self.visual.position = position;
    }

    pub(crate) fn set_owner_bar(&mut self, bar: Option<MenuBarId>) {
        self.bar_owner = bar;
    }

    fn submenu_index(&self, submenu: MenuId) -> Option<usize> {
        self.items()
            .iter()
            .position(|item| item.submenu() == Some(submenu))
    }

    fn active_submenu(&self) -> Option<MenuId> {
        self.active_item().and_then(|item| item.submenu())
    }
}

impl Navigable for Menu {
    fn items(&self) -> &[Arc<MenuItem>] {
        self.list.items()
    }

    fn is_selectable(&self, item: &MenuItem) -> bool {
        self.list.is_selectable(item)
    }
}

impl std::fmt::Debug for Menu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Menu")
            .field("items", &self.items().len())
            .field("active_index", &self.active_index())
            .field("state", &self.state)
            .field("parent", &self.parent)
            .field("child", &self.child)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Host Operations
// ============================================================================

impl MenuHost {
    /// Replace a menu's items, returning the old ones. The menu closes.
    pub fn set_menu_items(&mut self, id: MenuId, items: Vec<Arc<MenuItem>>) -> Vec<Arc<MenuItem>> {
        let Some(menu) = self.menus.get_mut(id) else {
            tracing::warn!(target: targets::MENU, ?id, "set_menu_items on unknown menu");
            return Vec::new();
        };
        let old = menu.list.set_items(items);
        self.close_menu(id, true);
        old
    }

    /// Show a menu at `(x, y)` and give its chain the input grab.
    ///
    /// The position is fitted into the viewport on each axis unless forced.
    /// Any other chain holding the grab is closed first. Does nothing if the
    /// menu is already open.
    pub fn popup(&mut self, id: MenuId, x: f32, y: f32, force_x: bool, force_y: bool) {
        if !self.can_show(id) {
            return;
        }
        self.release_other_grab(GrabOwner::Menu(id));
        self.show_at(id, Point::new(x, y), force_x, force_y, true);
        self.grab.acquire(GrabOwner::Menu(id));
    }

    /// Show a menu at `(x, y)` without taking the input grab.
    pub fn open(&mut self, id: MenuId, x: f32, y: f32, force_x: bool, force_y: bool) {
        if !self.can_show(id) {
            return;
        }
        self.show_at(id, Point::new(x, y), force_x, force_y, false);
    }

    fn can_show(&self, id: MenuId) -> bool {
        match self.menus.get(id) {
            Some(menu) => !menu.is_open(),
            None => {
                tracing::warn!(target: targets::MENU, ?id, "cannot show unknown menu");
                false
            }
        }
    }

    fn show_at(&mut self, id: MenuId, desired: Point, force_x: bool, force_y: bool, interactive: bool) {
        let size = self.attach_menu(id, interactive);
        let position = fit_position(desired, size, self.config.viewport, force_x, force_y);
        if let Some(menu) = self.menus.get_mut(id) {
            menu.place(position);
        }
        tracing::debug!(target: targets::MENU, ?id, ?position, interactive, "menu shown");
    }

    /// Attach a closed menu and lay it out; returns its size.
    pub(crate) fn attach_menu(&mut self, id: MenuId, interactive: bool) -> Size {
        let Some(menu) = self.menus.get_mut(id) else {
            return Size::ZERO;
        };
        menu.list.set_active_index(None);
        menu.state = MenuState::Open { interactive };
        menu.lifecycle.emit(MenuHook::AfterAttach);
        self.update_menu_now(id);
        self.menus.get(id).map_or(Size::ZERO, Menu::size)
    }

    /// Close a menu and everything below it.
    ///
    /// A non-forced close emits [`MenuHook::CloseRequest`] first. The open
    /// child closes before this menu, the parent's child slot is cleared, the
    /// active index resets and [`Menu::closed`] is emitted exactly once. When
    /// the menu drops down from a bar the bar resets and releases the grab.
    /// Closing a closed menu does nothing.
    pub fn close_menu(&mut self, id: MenuId, force: bool) {
        let Some(menu) = self.menus.get(id) else {
            return;
        };
        if !menu.is_open() {
            return;
        }
        if !force {
            menu.lifecycle.emit(MenuHook::CloseRequest);
        }
        if let Some(child) = menu.child {
            self.close_menu(child, true);
        }
        self.cancel_hover(id);
        self.forget_hovered(PointerTarget::Menu(id));

        let Some(menu) = self.menus.get_mut(id) else {
            return;
        };
        menu.lifecycle.emit(MenuHook::BeforeDetach);
        menu.state = MenuState::Closed;
        menu.child = None;
        let parent = menu.parent.take();
        let bar = menu.bar_owner.take();
        menu.list.set_active_index(None);

        if let Some(parent) = parent
            && let Some(parent_menu) = self.menus.get_mut(parent)
            && parent_menu.child == Some(id)
        {
            parent_menu.child = None;
        }
        if let Some(bar) = bar {
            self.detach_bar_child(bar, id);
        }
        if self.grab.release(GrabOwner::Menu(id)) {
            self.pressed = false;
        }

        tracing::debug!(target: targets::MENU, ?id, force, "menu closed");
        if let Some(menu) = self.menus.get(id) {
            menu.closed.emit(());
        }
    }

    /// Open the active item's submenu beside it.
    ///
    /// No-op if the menu is closed, nothing is active or the active item has
    /// no submenu. The submenu opens with no active item.
    pub fn open_active_item(&mut self, id: MenuId) {
        let Some(menu) = self.menus.get(id) else {
            return;
        };
        if !menu.is_open() {
            return;
        }
        let (Some(index), Some(submenu)) = (menu.active_index(), menu.active_submenu()) else {
            return;
        };
        if menu.child == Some(submenu) {
            return;
        }
        if !self.menus.contains_key(submenu) || self.is_ancestor_or_self(submenu, id) {
            tracing::warn!(target: targets::MENU, ?id, ?submenu, "submenu cannot be opened here");
            return;
        }

        if let Some(child) = menu.child {
            self.close_menu(child, true);
        }
        // A submenu shared with another open item is taken over.
        self.close_menu(submenu, true);

        let style = &self.config.menu_style;
        let Some(item_rect) = self.menus.get(id).and_then(|menu| menu.item_rect(style, index)) else {
            return;
        };
        let inset = style.content_inset();

        let size = self.attach_menu(submenu, false);
        let position = submenu_position(item_rect, size, self.config.viewport, inset);
        if let Some(child) = self.menus.get_mut(submenu) {
            child.place(position);
            child.parent = Some(id);
        }
        if let Some(menu) = self.menus.get_mut(id) {
            menu.child = Some(submenu);
        }
        tracing::debug!(target: targets::MENU, parent = ?id, child = ?submenu, ?position, "submenu opened");
    }

    /// Trigger the active item.
    ///
    /// A submenu item opens its submenu and activates the submenu's first
    /// item. Any other enabled item runs its command (when it can execute)
    /// or its handler, [`Menu::triggered`] is emitted and the root menu of
    /// the chain closes. No-op if the menu is closed, nothing is active or
    /// the item has nothing to run.
    pub fn trigger_active_item(&mut self, id: MenuId) {
        let Some(menu) = self.menus.get(id) else {
            return;
        };
        if !menu.is_open() {
            return;
        }
        let Some(item) = menu.active_item() else {
            return;
        };

        if item.submenu().is_some() {
            self.open_active_item(id);
            if let Some(child) = self.menus.get(id).and_then(Menu::child_menu)
                && let Some(child) = self.menus.get_mut(child)
            {
                child.activate_next_item();
            }
            return;
        }

        if !item.is_enabled() || !invoke(&item) {
            return;
        }
        tracing::debug!(target: targets::MENU, ?id, text = %item.display_text(), "item triggered");

        if let Some(menu) = self.menus.get(id) {
            menu.triggered.emit(item.clone());
        }
        let root = self.root_menu(id);
        self.close_menu(root, false);
    }

    /// The top of the chain containing `id`.
    pub fn root_menu(&self, id: MenuId) -> MenuId {
        self.walk(id, Menu::parent_menu)
    }

    /// The bottom of the chain containing `id`.
    pub fn leaf_menu(&self, id: MenuId) -> MenuId {
        self.walk(id, Menu::child_menu)
    }

    fn walk(&self, id: MenuId, next: fn(&Menu) -> Option<MenuId>) -> MenuId {
        let mut current = id;
        for _ in 0..self.menus.len() {
            match self.menus.get(current).and_then(next) {
                Some(following) => current = following,
                None => break,
            }
        }
        current
    }

    fn is_ancestor_or_self(&self, candidate: MenuId, id: MenuId) -> bool {
        let mut current = Some(id);
        for _ in 0..=self.menus.len() {
            match current {
                Some(menu) if menu == candidate => return true,
                Some(menu) => current = self.menus.get(menu).and_then(Menu::parent_menu),
                None => return false,
            }
        }
        false
    }

    /// Re-sync the open child with the active item after the hover delay.
    pub(crate) fn sync_child_menu(&mut self, id: MenuId) {
        let Some(menu) = self.menus.get(id) else {
            return;
        };
        if !menu.is_open() {
            return;
        }
        let wanted = menu.active_submenu();
        if let Some(child) = menu.child {
            if Some(child) == wanted {
                return;
            }
            self.close_menu(child, true);
        }
        if wanted.is_some() {
            self.open_active_item(id);
        }
    }

    // =========================================================================
    // Input
    // =========================================================================

    pub(crate) fn handle_menu_key(&mut self, id: MenuId, event: &KeyPressEvent) -> bool {
        let Some(menu) = self.menus.get_mut(id) else {
            return false;
        };
        tracing::trace!(target: targets::INPUT, ?id, key = ?event.key, "menu key");
        match event.key {
            Key::Enter => self.trigger_active_item(id),
            Key::Escape => self.close_menu(id, false),
            Key::ArrowLeft => {
                if menu.parent.is_some() {
                    self.close_menu(id, false);
                }
            }
            Key::ArrowRight => self.open_active_and_enter(id),
            Key::ArrowUp => menu.activate_previous_item(),
            Key::ArrowDown => menu.activate_next_item(),
            Key::Home => menu.list.activate_first_item(),
            Key::End => menu.list.activate_last_item(),
            Key::Character => match event.mnemonic_char() {
                Some(ch) => menu.activate_mnemonic_item(ch),
                None => return false,
            },
            Key::Other => return false,
        }
        true
    }

    /// Open the active submenu and activate its first item.
    pub(crate) fn open_active_and_enter(&mut self, id: MenuId) {
        let Some(submenu) = self.menus.get(id).and_then(Menu::active_submenu) else {
            return;
        };
        self.open_active_item(id);
        if self.menus.get(id).and_then(Menu::child_menu) == Some(submenu)
            && let Some(child) = self.menus.get_mut(submenu)
        {
            child.list.activate_first_item();
        }
    }

    pub(crate) fn handle_menu_move(&mut self, id: MenuId, pos: Point) {
        self.sync_ancestors(id);

        let style = &self.config.menu_style;
        let Some(menu) = self.menus.get_mut(id) else {
            return;
        };
        let index = menu.item_at(style, pos);
        if index == menu.active_index() {
            if menu.child.is_some() && menu.child == menu.active_submenu() {
                self.cancel_hover(id);
            }
            return;
        }

        menu.list.set_active_index(index);
        let keeps_child = menu.child.is_some() && menu.child == menu.active_submenu();
        let wants_sync = menu.child.is_some() || menu.active_submenu().is_some();
        if keeps_child || !wants_sync {
            self.cancel_hover(id);
        } else {
            self.start_hover(id);
        }
    }

    /// Point every ancestor's active item at the submenu chain leading here.
    fn sync_ancestors(&mut self, id: MenuId) {
        let mut current = id;
        for _ in 0..self.menus.len() {
            let Some(parent) = self.menus.get(current).and_then(Menu::parent_menu) else {
                break;
            };
            if let Some(parent_menu) = self.menus.get_mut(parent) {
                let index = parent_menu.submenu_index(current);
                if parent_menu.active_index() != index {
                    parent_menu.list.set_active_index(index);
                }
            }
            self.cancel_hover(parent);
            current = parent;
        }
    }

    pub(crate) fn handle_menu_leave(&mut self, id: MenuId) {
        let Some(menu) = self.menus.get_mut(id) else {
            return;
        };
        if !menu.is_open() {
            return;
        }
        menu.list.set_active_index(None);
        if menu.child.is_some() {
            self.start_hover(id);
        }
    }

    /// A press while a popup chain holds the grab.
    ///
    /// A press outside the chain closes it and is not consumed.
    pub(crate) fn handle_menu_mouse_down(&mut self, root: MenuId, event: MouseButtonEvent) -> bool {
        if !self.chain_contains(root, event.pos) {
            tracing::trace!(target: targets::INPUT, ?root, "press outside menu chain");
            self.close_menu(root, false);
            return false;
        }
        if event.button == MouseButton::Left {
            self.pressed = true;
        }
        true
    }

    /// A release while a chain holds the grab. Triggers the active item when
    /// the release lands on it after a press inside the chain.
    pub(crate) fn handle_mouse_up(&mut self, root: MenuId, event: MouseButtonEvent) -> bool {
        if event.button != MouseButton::Left {
            return self.chain_contains(root, event.pos);
        }
        let pressed = std::mem::take(&mut self.pressed);
        let Some(target) = self.chain_menu_at(root, event.pos) else {
            return false;
        };
        let style = &self.config.menu_style;
        let over_active = self.menus.get(target).is_some_and(|menu| {
            let index = menu.item_at(style, event.pos);
            index.is_some() && index == menu.active_index()
        });
        if pressed && over_active {
            self.trigger_active_item(target);
        }
        true
    }

    /// The deepest menu of the chain below `root` containing `pos`.
    fn chain_menu_at(&self, root: MenuId, pos: Point) -> Option<MenuId> {
        let mut found = None;
        let mut current = Some(root);
        for _ in 0..self.menus.len() {
            let Some(id) = current else {
                break;
            };
            let Some(menu) = self.menus.get(id) else {
                break;
            };
            if menu.is_open() && menu.rect().contains(pos) {
                found = Some(id);
            }
            current = menu.child;
        }
        found
    }

    pub(crate) fn chain_contains(&self, root: MenuId, pos: Point) -> bool {
        self.chain_menu_at(root, pos).is_some()
    }
}

/// Run the item's command or handler. Returns whether anything ran.
fn invoke(item: &MenuItem) -> bool {
    if let Some(command) = item.command() {
        let args = item.command_args();
        if !command.can_execute(&args) {
            return false;
        }
        command.execute(&args);
        true
    } else if let Some(handler) = item.handler() {
        handler.call(item);
        true
    } else {
        false
    }
}
