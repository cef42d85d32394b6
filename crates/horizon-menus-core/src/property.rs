//! Property storage for Horizon Menus.
//!
//! A [`Property<T>`] wraps a value behind interior mutability and reports
//! whether a write actually changed it. Owners pair properties with a
//! [`Signal`](crate::Signal) and emit only when the value changed, so setting
//! an unchanged value never produces a notification.
//!
//! # Example
//!
//! ```
//! use horizon_menus_core::{Property, Signal};
//!
//! struct Label {
//!     text: Property<String>,
//!     text_changed: Signal<(String, String)>,
//! }
//!
//! impl Label {
//!     fn set_text(&self, text: &str) {
//!         if let Some(old) = self.text.replace(text.to_string()) {
//!             self.text_changed.emit((old, text.to_string()));
//!         }
//!     }
//! }
//!
//! let label = Label { text: Property::new(String::new()), text_changed: Signal::new() };
//! label.set_text("&File");
//! assert_eq!(label.text.get(), "&File");
//! ```

use std::fmt;

use parking_lot::RwLock;

/// A value that tracks changes.
///
/// `Property<T>` uses interior mutability with `RwLock` and is `Send + Sync`
/// whenever `T` is.
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Get the current value.
    ///
    /// This clones the value. For large types, consider using `with()` instead.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Access the value through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }

    /// Set the value without change detection.
    pub fn set_silent(&self, value: T) {
        *self.value.write() = value;
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Set the value, returning `true` if the value changed.
    pub fn set(&self, value: T) -> bool {
        let mut current = self.value.write();
        if *current != value {
            *current = value;
            true
        } else {
            false
        }
    }

    /// Set the value, returning the old value if it changed.
    ///
    /// The write lock is released before this returns, so the caller may
    /// read the property again from a change notification.
    pub fn replace(&self, value: T) -> Option<T> {
        let mut current = self.value.write();
        if *current != value {
            Some(std::mem::replace(&mut *current, value))
        } else {
            None
        }
    }
}

impl<T: Clone> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.get())
            .finish()
    }
}
