//! Integration tests for popup menus driven through `MenuHost::dispatch`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use horizon_menus::{
    InputEvent, Key, ManualClock, MenuHost, MenuId, MenuItem, MouseButton,
    MouseButtonEvent, Point,
};

fn setup() -> (MenuHost, Arc<ManualClock>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let clock = Arc::new(ManualClock::new());
    let host = MenuHost::new().with_clock(clock.clone());
    (host, clock)
}

fn item(text: &str) -> Arc<MenuItem> {
    Arc::new(MenuItem::new().with_text(text).with_handler(|_| {}))
}

fn separator() -> Arc<MenuItem> {
    Arc::new(MenuItem::separator())
}

const MORE: usize = 10;

/// Edit menu with a "More..." submenu at index 10.
fn create_menu(host: &mut MenuHost) -> MenuId {
    let more = host.create_menu(vec![item("One"), item("Two"), item("Three"), item("Four")]);
    host.create_menu(vec![
        Arc::new(MenuItem::new().with_text("&Copy").with_shortcut("Ctrl+C").with_handler(|_| {})),
        Arc::new(MenuItem::new().with_text("Cu&t").with_shortcut("Ctrl+X").with_handler(|_| {})),
        Arc::new(MenuItem::new().with_text("&Paste").with_shortcut("Ctrl+V").with_handler(|_| {})),
        separator(),
        item("&New Tab"),
        item("&Close Tab"),
        Arc::new(
            MenuItem::new()
                .with_type(horizon_menus::ItemType::Check)
                .with_text("&Save On Exit")
                .with_handler(|_| {}),
        ),
        separator(),
        Arc::new(MenuItem::new().with_text("Task Manager")),
        separator(),
        Arc::new(MenuItem::new().with_text("More...").with_submenu(more)),
        separator(),
        item("Close"),
    ])
}

/// A point just inside the top-left corner of a menu row.
fn item_point(host: &MenuHost, menu: MenuId, index: usize) -> Point {
    let menu = host.menu(menu).unwrap();
    let rect = menu.visual().items[index].rect.unwrap();
    Point::new(
        menu.position().x + rect.left() + 1.0,
        menu.position().y + rect.top() + 1.0,
    )
}

fn open_more(host: &mut MenuHost, menu: MenuId) -> MenuId {
    host.popup(menu, 0.0, 0.0, false, false);
    host.menu_mut(menu).unwrap().set_active_index(Some(MORE));
    host.open_active_item(menu);
    host.menu(menu).unwrap().child_menu().unwrap()
}

fn flag_handler(item: &MenuItem) -> Arc<AtomicBool> {
    let called = Arc::new(AtomicBool::new(false));
    let called_clone = called.clone();
    item.set_handler(Some(horizon_menus::Handler::new(move |_| {
        called_clone.store(true, Ordering::SeqCst);
    })));
    called
}

// =========================================================================
// Positioning
// =========================================================================

#[test]
fn test_popup_fits_on_screen() {
    let (mut host, _) = setup();
    let menu = create_menu(&mut host);
    host.popup(menu, -1000.0, -1000.0, false, false);
    assert_eq!(host.menu(menu).unwrap().position(), Point::ZERO);
    host.close_menu(menu, false);

    host.popup(menu, 10000.0, 10000.0, false, false);
    let placed = host.menu(menu).unwrap();
    let viewport = host.viewport();
    assert_eq!(placed.position().x, viewport.width - placed.size().width);
    assert_eq!(placed.position().y, viewport.height - placed.size().height);
    host.close_menu(menu, false);

    host.popup(menu, 10000.0, 10000.0, true, true);
    assert_eq!(host.menu(menu).unwrap().position(), Point::new(10000.0, 10000.0));
}

#[test]
fn test_open_fits_on_screen() {
    let (mut host, _) = setup();
    let menu = create_menu(&mut host);
    host.open(menu, -1000.0, -1000.0, false, false);
    assert_eq!(host.menu(menu).unwrap().position(), Point::ZERO);
}

// =========================================================================
// Keys
// =========================================================================

#[test]
fn test_enter_triggers_active_item() {
    let (mut host, _) = setup();
    let menu = create_menu(&mut host);
    let called = flag_handler(&host.menu(menu).unwrap().items()[0]);
    host.popup(menu, 0.0, 0.0, false, false);
    host.menu_mut(menu).unwrap().activate_next_item();

    assert!(host.dispatch(InputEvent::key(Key::Enter)));
    assert!(called.load(Ordering::SeqCst));
    assert!(!host.menu(menu).unwrap().is_open());
}

#[test]
fn test_enter_in_nested_menu_closes_root() {
    let (mut host, _) = setup();
    let menu = create_menu(&mut host);
    let child = open_more(&mut host, menu);
    host.menu_mut(child).unwrap().activate_next_item();

    host.dispatch(InputEvent::key(Key::Enter));
    assert!(!host.menu(child).unwrap().is_open());
    assert!(!host.menu(menu).unwrap().is_open());
    assert_eq!(host.grab_owner(), None);
}

#[test]
fn test_escape_closes_leaf() {
    let (mut host, _) = setup();
    let menu = create_menu(&mut host);
    let child = open_more(&mut host, menu);

    host.dispatch(InputEvent::key(Key::Escape));
    assert_eq!(host.menu(menu).unwrap().child_menu(), None);
    assert!(!host.menu(child).unwrap().is_open());
    assert!(host.menu(menu).unwrap().is_open());
}

#[test]
fn test_arrow_left_closes_leaf_unless_root() {
    let (mut host, _) = setup();
    let menu = create_menu(&mut host);
    open_more(&mut host, menu);

    host.dispatch(InputEvent::key(Key::ArrowLeft));
    assert_eq!(host.menu(menu).unwrap().child_menu(), None);
    host.dispatch(InputEvent::key(Key::ArrowLeft));
    assert!(host.menu(menu).unwrap().is_open());
}

#[test]
fn test_arrow_up_and_down() {
    let (mut host, _) = setup();
    let menu = create_menu(&mut host);
    host.popup(menu, 0.0, 0.0, false, false);

    host.menu_mut(menu).unwrap().set_active_index(Some(1));
    host.dispatch(InputEvent::key(Key::ArrowUp));
    assert_eq!(host.menu(menu).unwrap().active_index(), Some(0));

    host.dispatch(InputEvent::key(Key::ArrowDown));
    assert_eq!(host.menu(menu).unwrap().active_index(), Some(1));

    host.menu_mut(menu).unwrap().set_active_index(Some(2));
    host.dispatch(InputEvent::key(Key::ArrowDown));
    assert_eq!(host.menu(menu).unwrap().active_index(), Some(4));
}

#[test]
fn test_home_and_end() {
    let (mut host, _) = setup();
    let menu = create_menu(&mut host);
    host.popup(menu, 0.0, 0.0, false, false);
    host.dispatch(InputEvent::key(Key::End));
    assert_eq!(host.menu(menu).unwrap().active_index(), Some(12));
    host.dispatch(InputEvent::key(Key::Home));
    assert_eq!(host.menu(menu).unwrap().active_index(), Some(0));
}

#[test]
fn test_arrow_right_opens_active_submenu() {
    let (mut host, _) = setup();
    let menu = create_menu(&mut host);
    host.popup(menu, 0.0, 0.0, false, false);
    host.menu_mut(menu).unwrap().set_active_index(Some(MORE));

    host.dispatch(InputEvent::key(Key::ArrowRight));
    let more = host.menu(menu).unwrap().items()[MORE].submenu();
    assert_eq!(host.menu(menu).unwrap().child_menu(), more);
    assert_eq!(host.menu(more.unwrap()).unwrap().active_index(), Some(0));

    // Keys now go to the submenu.
    host.dispatch(InputEvent::key(Key::ArrowDown));
    assert_eq!(host.menu(more.unwrap()).unwrap().active_index(), Some(1));
}

#[test]
fn test_arrow_right_without_submenu_is_noop() {
    let (mut host, _) = setup();
    let menu = create_menu(&mut host);
    host.popup(menu, 0.0, 0.0, false, false);
    host.menu_mut(menu).unwrap().set_active_index(Some(0));
    host.dispatch(InputEvent::key(Key::ArrowRight));
    assert_eq!(host.menu(menu).unwrap().child_menu(), None);
    assert_eq!(host.menu(menu).unwrap().active_index(), Some(0));
}

#[test]
fn test_mnemonic() {
    let (mut host, _) = setup();
    let menu = create_menu(&mut host);
    host.popup(menu, 0.0, 0.0, false, false);
    assert_eq!(host.menu(menu).unwrap().active_index(), None);

    host.dispatch(InputEvent::char('t'));
    assert_eq!(host.menu(menu).unwrap().active_index(), Some(1));
    host.dispatch(InputEvent::char('C'));
    assert_eq!(host.menu(menu).unwrap().active_index(), Some(5));
    host.dispatch(InputEvent::char('c'));
    assert_eq!(host.menu(menu).unwrap().active_index(), Some(0));
}

#[test]
fn test_open_ignores_keys() {
    let (mut host, _) = setup();
    let menu = create_menu(&mut host);
    host.open(menu, 0.0, 0.0, false, false);
    assert!(!host.dispatch(InputEvent::key(Key::ArrowDown)));
    assert_eq!(host.menu(menu).unwrap().active_index(), None);
}

// =========================================================================
// Mouse
// =========================================================================

#[test]
fn test_hover_other_item_closes_child_after_delay() {
    let (mut host, clock) = setup();
    let menu = create_menu(&mut host);
    let child = open_more(&mut host, menu);

    let first = item_point(&host, menu, 0);
    host.dispatch(InputEvent::MouseMove(first));
    assert_eq!(host.menu(menu).unwrap().active_index(), Some(0));

    clock.advance(Duration::from_millis(499));
    host.process_timers();
    assert_eq!(host.menu(menu).unwrap().child_menu(), Some(child));

    clock.advance(Duration::from_millis(1));
    assert_eq!(host.process_timers(), 1);
    assert_eq!(host.menu(menu).unwrap().child_menu(), None);
    assert!(!host.menu(child).unwrap().is_open());
}

#[test]
fn test_reentering_item_cancels_close() {
    let (mut host, clock) = setup();
    let menu = create_menu(&mut host);
    let child = open_more(&mut host, menu);

    host.dispatch(InputEvent::MouseMove(item_point(&host, menu, 0)));
    clock.advance(Duration::from_millis(300));
    host.dispatch(InputEvent::MouseMove(item_point(&host, menu, MORE)));
    assert!(!host.is_hover_pending(menu));

    clock.advance(Duration::from_millis(500));
    assert_eq!(host.process_timers(), 0);
    assert_eq!(host.menu(menu).unwrap().child_menu(), Some(child));
}

#[test]
fn test_hovering_submenu_item_opens_it_after_delay() {
    let (mut host, clock) = setup();
    let menu = create_menu(&mut host);
    host.popup(menu, 0.0, 0.0, false, false);

    host.dispatch(InputEvent::MouseMove(item_point(&host, menu, MORE)));
    assert_eq!(host.menu(menu).unwrap().child_menu(), None);
    assert_eq!(host.time_until_next_timer(), Some(Duration::from_millis(500)));

    clock.advance(Duration::from_millis(500));
    host.process_timers();
    assert!(host.menu(menu).unwrap().child_menu().is_some());
}

#[test]
fn test_move_down_up_triggers_child_item() {
    let (mut host, _) = setup();
    let menu = create_menu(&mut host);
    let child = open_more(&mut host, menu);
    let called = flag_handler(&host.menu(child).unwrap().items()[0]);

    let point = item_point(&host, child, 0);
    host.dispatch(InputEvent::MouseMove(point));
    assert_eq!(host.menu(child).unwrap().active_index(), Some(0));
    assert_eq!(host.menu(menu).unwrap().active_index(), Some(MORE));

    assert!(host.dispatch(InputEvent::MousePress(MouseButtonEvent::new(MouseButton::Left, point))));
    assert!(host.dispatch(InputEvent::MouseRelease(MouseButtonEvent::new(MouseButton::Left, point))));
    assert!(called.load(Ordering::SeqCst));
    assert!(!host.menu(menu).unwrap().is_open());
}

#[test]
fn test_release_without_press_does_not_trigger() {
    let (mut host, _) = setup();
    let menu = create_menu(&mut host);
    let called = flag_handler(&host.menu(menu).unwrap().items()[0]);
    host.popup(menu, 0.0, 0.0, false, false);

    let point = item_point(&host, menu, 0);
    host.dispatch(InputEvent::MouseMove(point));
    host.dispatch(InputEvent::mouse_up(point.x, point.y));
    assert!(!called.load(Ordering::SeqCst));
    assert!(host.menu(menu).unwrap().is_open());
}

#[test]
fn test_press_outside_closes_chain() {
    let (mut host, _) = setup();
    let menu = create_menu(&mut host);
    let child = open_more(&mut host, menu);

    assert!(!host.dispatch(InputEvent::mouse_down(-10.0, -10.0)));
    assert!(!host.menu(menu).unwrap().is_open());
    assert!(!host.menu(child).unwrap().is_open());
    assert_eq!(host.grab_owner(), None);
}

#[test]
fn test_pointer_leave_closes_child_after_delay() {
    let (mut host, clock) = setup();
    let menu = create_menu(&mut host);
    let child = open_more(&mut host, menu);

    host.dispatch(InputEvent::MouseMove(item_point(&host, menu, MORE)));
    host.dispatch(InputEvent::PointerLeave);
    assert_eq!(host.menu(menu).unwrap().active_index(), None);
    assert_eq!(host.menu(menu).unwrap().child_menu(), Some(child));

    clock.advance(Duration::from_millis(500));
    host.process_timers();
    assert_eq!(host.menu(menu).unwrap().child_menu(), None);
}

#[test]
fn test_entering_child_keeps_it_open() {
    let (mut host, clock) = setup();
    let menu = create_menu(&mut host);
    let child = open_more(&mut host, menu);

    host.dispatch(InputEvent::MouseMove(item_point(&host, menu, MORE)));
    host.dispatch(InputEvent::MouseMove(item_point(&host, child, 1)));
    clock.advance(Duration::from_millis(1000));
    host.process_timers();

    assert_eq!(host.menu(menu).unwrap().child_menu(), Some(child));
    assert_eq!(host.menu(menu).unwrap().active_index(), Some(MORE));
    assert_eq!(host.menu(child).unwrap().active_index(), Some(1));
}

#[test]
fn test_context_menu_suppressed() {
    let (mut host, _) = setup();
    let menu = create_menu(&mut host);
    host.open(menu, 0.0, 0.0, false, false);
    assert!(host.dispatch(InputEvent::ContextMenu(Point::new(5.0, 5.0))));
    assert!(!host.dispatch(InputEvent::ContextMenu(Point::new(900.0, 600.0))));

    host.close_menu(menu, true);
    host.popup(menu, 0.0, 0.0, false, false);
    assert!(host.dispatch(InputEvent::ContextMenu(Point::new(900.0, 600.0))));
}

// =========================================================================
// Lifecycle
// =========================================================================

#[test]
fn test_popup_replaces_previous_popup() {
    let (mut host, _) = setup();
    let first = create_menu(&mut host);
    let second = create_menu(&mut host);
    open_more(&mut host, first);

    host.popup(second, 0.0, 0.0, false, false);
    assert!(!host.menu(first).unwrap().is_open());
    host.dispatch(InputEvent::key(Key::ArrowDown));
    assert_eq!(host.menu(second).unwrap().active_index(), Some(0));
}

#[test]
fn test_dispose_open_chain() {
    let (mut host, clock) = setup();
    let menu = create_menu(&mut host);
    let child = open_more(&mut host, menu);
    host.dispatch(InputEvent::MouseMove(item_point(&host, menu, 0)));

    host.dispose_menu(menu);
    assert!(!host.contains_menu(menu));
    assert!(!host.contains_menu(child));
    assert_eq!(host.grab_owner(), None);

    clock.advance(Duration::from_millis(500));
    assert_eq!(host.process_timers(), 0);
    assert!(!host.dispatch(InputEvent::key(Key::Enter)));
}
