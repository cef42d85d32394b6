//! The menu host: arena, update pass, hover timer and input routing.
//!
//! Menus and menu bars reference each other (parent, child, owning bar), so
//! they live in slot maps owned by a single [`MenuHost`] and refer to each
//! other by [`MenuId`]/[`MenuBarId`]. All state machine operations are host
//! methods taking an id; the popup operations live in [`crate::menu`] and the
//! bar operations in [`crate::menu_bar`].
//!
//! The host is driven by the embedding event loop:
//!
//! - [`dispatch`](MenuHost::dispatch) for every input event
//! - [`process_timers`](MenuHost::process_timers) when
//!   [`time_until_next_timer`](MenuHost::time_until_next_timer) elapses
//! - [`process_updates`](MenuHost::process_updates) once per frame

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use horizon_menus_core::logging::targets;
use horizon_menus_core::{ChainDebug, ChainNode, Clock, SystemClock, TimerId, TimerManager};
use slotmap::SlotMap;

use crate::config::MenuConfig;
use crate::events::{InputEvent, MouseButtonEvent};
use crate::geometry::{Point, Size};
use crate::grab::{GrabOwner, InputGrab};
use crate::item::MenuItem;
use crate::menu::Menu;
use crate::menu_bar::MenuBar;

slotmap::new_key_type! {
    /// Identifies a [`Menu`] owned by a [`MenuHost`].
    pub struct MenuId;

    /// Identifies a [`MenuBar`] owned by a [`MenuHost`].
    pub struct MenuBarId;
}

/// The node under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PointerTarget {
    Menu(MenuId),
    Bar(MenuBarId),
}

/// The pending hover timer and the menu it re-syncs.
#[derive(Debug, Clone, Copy)]
struct HoverTimer {
    id: TimerId,
    menu: MenuId,
}

/// Owns every menu and menu bar and drives their state machines.
pub struct MenuHost {
    pub(crate) menus: SlotMap<MenuId, Menu>,
    pub(crate) bars: SlotMap<MenuBarId, MenuBar>,
    pub(crate) config: MenuConfig,
    pub(crate) grab: InputGrab,
    /// A left press landed inside the grabbing chain and awaits release.
    pub(crate) pressed: bool,
    hovered: Option<PointerTarget>,
    hover: Option<HoverTimer>,
    timers: TimerManager,
    clock: Arc<dyn Clock>,
}

impl MenuHost {
    /// Create a host with the default configuration and the system clock.
    pub fn new() -> Self {
        Self::with_config(MenuConfig::default())
    }

    /// Create a host with `config`.
    pub fn with_config(config: MenuConfig) -> Self {
        Self {
            menus: SlotMap::with_key(),
            bars: SlotMap::with_key(),
            config,
            grab: InputGrab::new(),
            pressed: false,
            hovered: None,
            hover: None,
            timers: TimerManager::new(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock using builder pattern.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// The active configuration.
    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    /// The viewport menus are fitted into.
    pub fn viewport(&self) -> Size {
        self.config.viewport
    }

    /// Resize the viewport. Open menus keep their position.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.config.viewport = viewport;
    }

    /// The current owner of the input grab.
    pub fn grab_owner(&self) -> Option<GrabOwner> {
        self.grab.owner()
    }

    // =========================================================================
    // Arena
    // =========================================================================

    /// Create a closed menu holding `items`.
    pub fn create_menu(&mut self, items: Vec<Arc<MenuItem>>) -> MenuId {
        let mut menu = Menu::new();
        menu.list_mut().set_items(items);
        let id = self.menus.insert(menu);
        tracing::debug!(target: targets::HOST, ?id, "menu created");
        id
    }

    /// Create a detached menu bar holding `items`.
    pub fn create_menu_bar(&mut self, items: Vec<Arc<MenuItem>>) -> MenuBarId {
        let mut bar = MenuBar::new();
        bar.list_mut().set_items(items);
        let id = self.bars.insert(bar);
        tracing::debug!(target: targets::HOST, ?id, "menu bar created");
        id
    }

    /// The menu for `id`.
    pub fn menu(&self, id: MenuId) -> Option<&Menu> {
        self.menus.get(id)
    }

    /// The menu for `id`, mutably.
    pub fn menu_mut(&mut self, id: MenuId) -> Option<&mut Menu> {
        self.menus.get_mut(id)
    }

    /// The menu bar for `id`.
    pub fn menu_bar(&self, id: MenuBarId) -> Option<&MenuBar> {
        self.bars.get(id)
    }

    /// The menu bar for `id`, mutably.
    pub fn menu_bar_mut(&mut self, id: MenuBarId) -> Option<&mut MenuBar> {
        self.bars.get_mut(id)
    }

    /// Whether `id` refers to a live menu.
    pub fn contains_menu(&self, id: MenuId) -> bool {
        self.menus.contains_key(id)
    }

    /// Whether `id` refers to a live menu bar.
    pub fn contains_menu_bar(&self, id: MenuBarId) -> bool {
        self.bars.contains_key(id)
    }

    /// Close and remove a menu, disposing its items' submenus recursively.
    ///
    /// Disposing an unknown or already disposed menu does nothing.
    pub fn dispose_menu(&mut self, id: MenuId) {
        if !self.menus.contains_key(id) {
            return;
        }
        self.close_menu(id, true);

        let Some(mut menu) = self.menus.remove(id) else {
            return;
        };
        menu.list_mut().unregister();
        menu.closed.disconnect_all();
        menu.triggered.disconnect_all();
        menu.lifecycle.disconnect_all();
        tracing::debug!(target: targets::HOST, ?id, "menu disposed");

        for item in menu.items() {
            self.dispose_item(item);
        }
    }

    /// Dispose an item: drop its listeners and dispose its submenu.
    pub fn dispose_item(&mut self, item: &MenuItem) {
        item.changed.disconnect_all();
        if let Some(submenu) = item.submenu() {
            self.dispose_menu(submenu);
        }
    }

    /// Detach and remove a menu bar, disposing its items' submenus.
    pub fn dispose_menu_bar(&mut self, id: MenuBarId) {
        if !self.bars.contains_key(id) {
            return;
        }
        self.detach_menu_bar(id);

        let Some(mut bar) = self.bars.remove(id) else {
            return;
        };
        bar.list_mut().unregister();
        bar.lifecycle.disconnect_all();
        tracing::debug!(target: targets::HOST, ?id, "menu bar disposed");

        for item in bar.items() {
            self.dispose_item(item);
        }
    }

    // =========================================================================
    // Update Pass
    // =========================================================================

    /// Rebuild the visuals of every attached node with a pending update.
    ///
    /// Returns the number of nodes updated.
    pub fn process_updates(&mut self) -> usize {
        let menu_style = self.config.menu_style.clone();
        let bar_style = self.config.menu_bar_style.clone();
        let mut updated = 0;

        for (_, menu) in self.menus.iter_mut() {
            if menu.is_open() && menu.list().is_dirty() {
                menu.update(&menu_style);
                updated += 1;
            }
        }
        for (_, bar) in self.bars.iter_mut() {
            if bar.is_attached() && bar.list().is_dirty() {
                bar.update(&bar_style);
                updated += 1;
            }
        }

        if updated > 0 {
            tracing::trace!(target: targets::HOST, updated, "update pass");
        }
        updated
    }

    /// Update a menu immediately rather than on the next pass.
    pub(crate) fn update_menu_now(&mut self, id: MenuId) {
        let style = &self.config.menu_style;
        if let Some(menu) = self.menus.get_mut(id) {
            menu.update(style);
        }
    }

    // =========================================================================
    // Hover Timer
    // =========================================================================

    /// Fire every expired timer. Returns the number fired.
    pub fn process_timers(&mut self) -> usize {
        let expired = self.timers.process_expired(self.clock.now());
        let mut fired = 0;
        for timer in expired {
            let Some(hover) = self.hover.filter(|hover| hover.id == timer) else {
                continue;
            };
            self.hover = None;
            tracing::trace!(target: targets::INPUT, menu = ?hover.menu, "hover timer fired");
            self.sync_child_menu(hover.menu);
            fired += 1;
        }
        fired
    }

    /// Time until the next timer expires, if any is pending.
    pub fn time_until_next_timer(&mut self) -> Option<Duration> {
        self.timers.time_until_next(self.clock.now())
    }

    /// Whether a hover timer is pending for `menu`.
    pub fn is_hover_pending(&self, menu: MenuId) -> bool {
        self.hover.is_some_and(|hover| hover.menu == menu)
    }

    /// Schedule a child re-sync for `menu` after the hover delay.
    ///
    /// A timer already pending for the same menu keeps its deadline.
    pub(crate) fn start_hover(&mut self, menu: MenuId) {
        if let Some(hover) = self.hover {
            if hover.menu == menu {
                return;
            }
            self.stop_hover_timer(hover.id);
        }
        let id = self
            .timers
            .start_one_shot(self.clock.now(), self.config.hover_delay());
        self.hover = Some(HoverTimer { id, menu });
        tracing::trace!(target: targets::INPUT, ?menu, "hover timer scheduled");
    }

    /// Cancel the hover timer if it belongs to `menu`.
    pub(crate) fn cancel_hover(&mut self, menu: MenuId) {
        if let Some(hover) = self.hover.filter(|hover| hover.menu == menu) {
            self.hover = None;
            self.stop_hover_timer(hover.id);
            tracing::trace!(target: targets::INPUT, ?menu, "hover timer cancelled");
        }
    }

    fn stop_hover_timer(&mut self, id: TimerId) {
        if let Err(err) = self.timers.stop(id) {
            tracing::warn!(target: targets::TIMER, %err, "hover timer already gone");
        }
    }

    // =========================================================================
    // Input Routing
    // =========================================================================

    /// Route an input event. Returns `true` when the event was consumed and
    /// its default action should be suppressed.
    #[tracing::instrument(skip_all, target = "horizon_menus::input", level = "trace")]
    pub fn dispatch(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::KeyPress(ev) => match self.grab.owner() {
                Some(GrabOwner::Menu(root)) => {
                    let leaf = self.leaf_menu(root);
                    self.handle_menu_key(leaf, &ev)
                }
                Some(GrabOwner::Bar(bar)) => self.handle_bar_key(bar, &ev),
                None => false,
            },
            InputEvent::MousePress(ev) => self.route_mouse_down(ev),
            InputEvent::MouseRelease(ev) => self.route_mouse_up(ev),
            InputEvent::MouseMove(pos) => self.route_mouse_move(pos),
            InputEvent::PointerLeave => {
                self.set_hovered(None);
                false
            }
            InputEvent::ContextMenu(pos) => self.grab.is_held() || self.target_at(pos).is_some(),
        }
    }

    fn route_mouse_down(&mut self, ev: MouseButtonEvent) -> bool {
        if let Some(GrabOwner::Menu(root)) = self.grab.owner()
            && self.handle_menu_mouse_down(root, ev)
        {
            return true;
        }
        if let Some(GrabOwner::Bar(bar)) = self.grab.owner() {
            return self.handle_bar_mouse_down(bar, ev);
        }
        match self.target_at(ev.pos) {
            Some(PointerTarget::Bar(bar)) => self.handle_bar_mouse_down(bar, ev),
            _ => false,
        }
    }

    fn route_mouse_up(&mut self, ev: MouseButtonEvent) -> bool {
        let root = match self.grab.owner() {
            Some(GrabOwner::Menu(root)) => root,
            Some(GrabOwner::Bar(bar)) => match self.bars.get(bar).and_then(MenuBar::child_menu) {
                Some(child) => child,
                None => return false,
            },
            None => return false,
        };
        self.handle_mouse_up(root, ev)
    }

    fn route_mouse_move(&mut self, pos: Point) -> bool {
        let target = self.target_at(pos);
        self.set_hovered(target);
        match target {
            Some(PointerTarget::Menu(menu)) => {
                self.handle_menu_move(menu, pos);
                true
            }
            Some(PointerTarget::Bar(bar)) => {
                self.handle_bar_move(bar, pos);
                true
            }
            None => false,
        }
    }

    /// Deliver leave to the previously hovered node when the target changes.
    fn set_hovered(&mut self, target: Option<PointerTarget>) {
        if self.hovered == target {
            return;
        }
        let previous = std::mem::replace(&mut self.hovered, target);
        match previous {
            Some(PointerTarget::Menu(menu)) => self.handle_menu_leave(menu),
            Some(PointerTarget::Bar(bar)) => self.handle_bar_leave(bar),
            None => {}
        }
    }

    /// Forget `target` as hovered without delivering a leave.
    pub(crate) fn forget_hovered(&mut self, target: PointerTarget) {
        if self.hovered == Some(target) {
            self.hovered = None;
        }
    }

    /// The topmost open menu, or else the attached bar, under `pos`.
    ///
    /// Deeper submenus sit above their parents.
    pub(crate) fn target_at(&self, pos: Point) -> Option<PointerTarget> {
        let menu = self
            .menus
            .iter()
            .filter(|(_, menu)| menu.is_open() && menu.rect().contains(pos))
            .max_by_key(|(id, _)| self.depth(*id))
            .map(|(id, _)| PointerTarget::Menu(id));
        menu.or_else(|| {
            let style = &self.config.menu_bar_style;
            self.bars
                .iter()
                .find(|(_, bar)| bar.is_attached() && bar.rect(style).contains(pos))
                .map(|(id, _)| PointerTarget::Bar(id))
        })
    }

    fn depth(&self, id: MenuId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.menus.get(current).and_then(Menu::parent_menu) {
            depth += 1;
            if depth > self.menus.len() {
                break;
            }
            current = parent;
        }
        depth
    }

    /// Close whatever chain currently holds the grab, unless it is `keep`.
    pub(crate) fn release_other_grab(&mut self, keep: GrabOwner) {
        match self.grab.owner() {
            Some(owner) if owner == keep => {}
            Some(GrabOwner::Menu(root)) => self.close_menu(root, true),
            Some(GrabOwner::Bar(bar)) => self.close_bar_child(bar),
            None => {}
        }
    }

    // =========================================================================
    // Debugging
    // =========================================================================

    /// Describe the open chain containing `menu`, root first.
    pub fn describe_chain(&self, menu: MenuId) -> String {
        if !self.menus.contains_key(menu) {
            return String::new();
        }
        let mut nodes = Vec::new();
        let mut current = Some(self.root_menu(menu));
        while let Some(id) = current {
            let Some(entry) = self.menus.get(id) else {
                break;
            };
            let active = entry
                .active_item()
                .map_or_else(|| "none".to_string(), |item| format!("{:?}", item.display_text()));
            let detail = format!(
                "{:?} items={} active={} state={:?}",
                id,
                entry.items().len(),
                active,
                entry.state()
            );
            nodes.push(ChainNode::new("Menu").with_detail(detail));
            current = entry.child_menu();
            if nodes.len() > self.menus.len() {
                break;
            }
        }
        ChainDebug::new().format(&nodes)
    }
}

impl Default for MenuHost {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MenuHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuHost")
            .field("menus", &self.menus.len())
            .field("bars", &self.bars.len())
            .field("grab", &self.grab.owner())
            .field("hover", &self.hover)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_menus_core::ManualClock;

    fn host() -> (MenuHost, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let host = MenuHost::new().with_clock(clock.clone());
        (host, clock)
    }

    fn leaf() -> Arc<MenuItem> {
        Arc::new(MenuItem::new().with_text("Leaf").with_handler(|_| {}))
    }

    #[test]
    fn test_dispose_is_recursive_and_idempotent() {
        let (mut host, _) = host();
        let grandchild = host.create_menu(vec![leaf()]);
        let child = host.create_menu(vec![Arc::new(MenuItem::new().with_submenu(grandchild))]);
        let root = host.create_menu(vec![Arc::new(MenuItem::new().with_submenu(child))]);

        host.dispose_menu(root);
        assert!(!host.contains_menu(root));
        assert!(!host.contains_menu(child));
        assert!(!host.contains_menu(grandchild));

        host.dispose_menu(root);
    }

    #[test]
    fn test_dispose_drops_item_registrations() {
        let (mut host, _) = host();
        let item = leaf();
        let menu = host.create_menu(vec![item.clone()]);
        assert_eq!(item.changed.connection_count(), 1);
        host.dispose_menu(menu);
        assert_eq!(item.changed.connection_count(), 0);
    }

    #[test]
    fn test_hover_timer_keeps_deadline_for_same_menu() {
        let (mut host, clock) = host();
        let menu = host.create_menu(vec![leaf()]);

        host.start_hover(menu);
        clock.advance(Duration::from_millis(300));
        host.start_hover(menu);
        assert_eq!(host.time_until_next_timer(), Some(Duration::from_millis(200)));

        host.cancel_hover(menu);
        assert!(!host.is_hover_pending(menu));
        assert_eq!(host.time_until_next_timer(), None);
    }

    #[test]
    fn test_single_hover_timer() {
        let (mut host, _) = host();
        let a = host.create_menu(vec![leaf()]);
        let b = host.create_menu(vec![leaf()]);

        host.start_hover(a);
        host.start_hover(b);
        assert!(!host.is_hover_pending(a));
        assert!(host.is_hover_pending(b));

        host.cancel_hover(a);
        assert!(host.is_hover_pending(b));
    }

    #[test]
    fn test_process_updates_only_touches_attached_dirty_nodes() {
        let (mut host, _) = host();
        let closed = host.create_menu(vec![leaf()]);
        let open = host.create_menu(vec![leaf()]);
        host.open(open, 0.0, 0.0, false, false);

        assert_eq!(host.process_updates(), 0);
        host.menu_mut(open).unwrap().activate_next_item();
        assert_eq!(host.process_updates(), 1);
        assert_eq!(host.process_updates(), 0);
        assert!(host.menu(closed).unwrap().list().is_dirty());
    }

    #[test]
    fn test_describe_chain() {
        let (mut host, _) = host();
        let child = host.create_menu(vec![leaf()]);
        let root = host.create_menu(vec![Arc::new(MenuItem::new().with_text("&More").with_submenu(child))]);
        host.popup(root, 0.0, 0.0, false, false);
        host.menu_mut(root).unwrap().set_active_index(Some(0));
        host.open_active_item(root);

        let text = host.describe_chain(child);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("active=\"More\""));
        assert!(lines[1].contains("active=none"));
        assert!(host.describe_chain(MenuId::default()).is_empty());
    }
}
