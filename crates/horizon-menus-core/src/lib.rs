//! Core systems for Horizon Menus.
//!
//! This crate provides the primitives the menu state machines are built on:
//!
//! - **Signal/Slot System**: Synchronous, type-safe change notification
//! - **Property System**: Interior-mutable values with change detection
//! - **Timers**: One-shot timers on an explicit, swappable clock
//! - **Logging**: `tracing` targets and menu-chain debug formatting
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_menus_core::Signal;
//!
//! let closed = Signal::<()>::new();
//! let conn_id = closed.connect(|_| println!("menu closed"));
//! closed.emit(());
//! closed.disconnect(conn_id);
//! ```
//!
//! # Timer Example
//!
//! ```
//! use horizon_menus_core::{Clock, ManualClock, TimerManager};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut timers = TimerManager::new();
//! let id = timers.start_one_shot(clock.now(), Duration::from_millis(500));
//!
//! clock.advance(Duration::from_millis(500));
//! assert_eq!(timers.process_expired(clock.now()), vec![id]);
//! ```

mod error;
pub mod logging;
pub mod property;
pub mod signal;
mod timer;

pub use error::{CoreError, Result, SignalError, TimerError};
pub use logging::{ChainDebug, ChainNode};
pub use property::Property;
pub use signal::{ConnectionId, Signal};
pub use timer::{Clock, ManualClock, SystemClock, TimerId, TimerManager};
