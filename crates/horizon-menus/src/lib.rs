//! Horizon Menus - hierarchical popup menus and menu bars.
//!
//! Menus and menu bars are owned by a [`MenuHost`], which routes input to
//! them, runs the submenu hover timer and rebuilds their visual snapshots.
//! Items are shared [`MenuItem`] records that publish every change.
//!
//! # Example
//!
//! ```
//! use horizon_menus::{InputEvent, Key, MenuHost, MenuItem};
//! use std::sync::Arc;
//!
//! let mut host = MenuHost::new();
//! let recent = host.create_menu(vec![Arc::new(MenuItem::new().with_text("notes.txt"))]);
//! let menu = host.create_menu(vec![
//!     Arc::new(MenuItem::new().with_text("&Open").with_handler(|_| println!("open"))),
//!     Arc::new(MenuItem::new().with_text("Open &Recent").with_submenu(recent)),
//! ]);
//!
//! host.popup(menu, 20.0, 20.0, false, false);
//! host.dispatch(InputEvent::char('r'));
//! host.dispatch(InputEvent::key(Key::ArrowRight));
//! assert_eq!(host.menu(menu).unwrap().child_menu(), Some(recent));
//!
//! host.dispatch(InputEvent::key(Key::Escape));
//! host.dispatch(InputEvent::key(Key::Escape));
//! assert!(!host.menu(menu).unwrap().is_open());
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod grab;
mod host;
pub mod item;
mod menu;
mod menu_bar;
pub mod navigation;
pub mod style;
pub mod template;
pub mod visual;

pub use config::MenuConfig;
pub use error::{ConfigError, TemplateError};
pub use events::{InputEvent, Key, KeyPressEvent, KeyboardModifiers, MouseButton, MouseButtonEvent};
pub use geometry::{Point, Rect, Size};
pub use grab::GrabOwner;
pub use host::{MenuBarId, MenuHost, MenuId};
pub use item::{
    Command, CommandRef, DelegateCommand, Handler, ItemChanged, ItemField, ItemType, ItemValue,
    MenuItem,
};
pub use menu::{Menu, MenuHook, MenuState};
pub use menu_bar::MenuBar;
pub use navigation::{ItemList, Navigable, SelectablePredicate};
pub use style::{MenuBarStyle, MenuStyle};
pub use template::{ItemTemplate, templates_from_json};
pub use visual::{ItemVisual, MenuVisual};

pub use horizon_menus_core::{Clock, ManualClock, Signal, SystemClock};
