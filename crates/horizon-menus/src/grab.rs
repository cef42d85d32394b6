//! Input grab for interactive menu chains.
//!
//! While a popup menu or an active menu bar is interactive it owns the
//! shared input surface: key presses, presses outside the chain and
//! context-menu requests are routed to it rather than to whatever lies
//! under the pointer. [`InputGrab`] tracks that single owner. At most one
//! chain holds the grab at a time, and the grab is released exactly when
//! the owning chain fully closes.

use horizon_menus_core::logging::targets;

use crate::host::{MenuBarId, MenuId};

/// The node holding the input grab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrabOwner {
    /// A root menu opened with `popup`.
    Menu(MenuId),
    /// A menu bar with an open dropdown.
    Bar(MenuBarId),
}

/// Tracks which chain owns the input surface.
#[derive(Debug, Default)]
pub struct InputGrab {
    owner: Option<GrabOwner>,
}

impl InputGrab {
    /// Create an unheld grab.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the grab for `owner`, returning the previous owner if it was a
    /// different node.
    ///
    /// The caller is responsible for closing the previous owner's chain.
    pub fn acquire(&mut self, owner: GrabOwner) -> Option<GrabOwner> {
        match self.owner.replace(owner) {
            Some(previous) if previous == owner => None,
            previous => {
                tracing::debug!(target: targets::INPUT, ?owner, ?previous, "input grab acquired");
                previous
            }
        }
    }

    /// Release the grab if `owner` holds it.
    ///
    /// Returns `true` when the grab was released.
    pub fn release(&mut self, owner: GrabOwner) -> bool {
        if self.owner == Some(owner) {
            self.owner = None;
            tracing::debug!(target: targets::INPUT, ?owner, "input grab released");
            true
        } else {
            false
        }
    }

    /// The current owner.
    pub fn owner(&self) -> Option<GrabOwner> {
        self.owner
    }

    /// Whether any node holds the grab.
    pub fn is_held(&self) -> bool {
        self.owner.is_some()
    }

    /// Whether `owner` holds the grab.
    pub fn is_held_by(&self, owner: GrabOwner) -> bool {
        self.owner == Some(owner)
    }
}
