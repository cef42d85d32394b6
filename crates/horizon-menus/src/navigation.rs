//! Navigation shared by menus and menu bars.
//!
//! The algorithms are free functions over the [`Navigable`] capability, so
//! vertical menus and the horizontal bar use identical rules. [`ItemList`]
//! is the state both compose: the item sequence, the active index and the
//! change hooks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use horizon_menus_core::logging::targets;
use horizon_menus_core::{ConnectionId, Signal};

use crate::item::MenuItem;

/// Something with an ordered item list and a selectability rule.
pub trait Navigable {
    /// The items, in display order.
    fn items(&self) -> &[Arc<MenuItem>];

    /// Whether `item` may become the active item.
    fn is_selectable(&self, item: &MenuItem) -> bool {
        is_selectable_default(item)
    }
}

/// The default selectability rule: enabled, visible and not a separator.
pub fn is_selectable_default(item: &MenuItem) -> bool {
    !item.is_separator() && !item.is_hidden() && item.is_enabled()
}

fn selectable_at<N: Navigable + ?Sized>(nav: &N, index: usize) -> bool {
    nav.items()
        .get(index)
        .is_some_and(|item| nav.is_selectable(item))
}

/// The first selectable index strictly after `from`, wrapping around.
///
/// Each item is visited at most once, and `from` itself is considered last.
/// With no current index the scan starts at the first item.
pub fn next_selectable<N: Navigable + ?Sized>(nav: &N, from: Option<usize>) -> Option<usize> {
    next_matching(nav, from, |_| true)
}

/// The first selectable index strictly before `from`, wrapping around.
///
/// With no current index the scan starts at the last item.
pub fn previous_selectable<N: Navigable + ?Sized>(nav: &N, from: Option<usize>) -> Option<usize> {
    let count = nav.items().len();
    if count == 0 {
        return None;
    }
    let start = from.map_or(count, |i| i.min(count - 1));
    (1..=count)
        .map(|offset| (start + count - offset) % count)
        .find(|&index| selectable_at(nav, index))
}

/// The first selectable index after `from` whose mnemonic matches `key`,
/// ignoring case and wrapping around.
pub fn mnemonic_match<N: Navigable + ?Sized>(
    nav: &N,
    from: Option<usize>,
    key: char,
) -> Option<usize> {
    next_matching(nav, from, |item| item.matches_mnemonic(key))
}

/// The first selectable index.
pub fn first_selectable<N: Navigable + ?Sized>(nav: &N) -> Option<usize> {
    next_selectable(nav, None)
}

/// The last selectable index.
pub fn last_selectable<N: Navigable + ?Sized>(nav: &N) -> Option<usize> {
    previous_selectable(nav, None)
}

fn next_matching<N, F>(nav: &N, from: Option<usize>, matches: F) -> Option<usize>
where
    N: Navigable + ?Sized,
    F: Fn(&MenuItem) -> bool,
{
    let items = nav.items();
    let count = items.len();
    if count == 0 {
        return None;
    }
    let start = from.map_or(0, |i| i + 1);
    (0..count)
        .map(|offset| (start + offset) % count)
        .find(|&index| nav.is_selectable(&items[index]) && matches(&items[index]))
}

// ============================================================================
// ItemList
// ============================================================================

/// Overrides the default selectability rule.
pub type SelectablePredicate = Arc<dyn Fn(&MenuItem) -> bool + Send + Sync>;

/// Old and new item sequences.
pub type ItemsChanged = (Vec<Arc<MenuItem>>, Vec<Arc<MenuItem>>);

/// Item sequence plus active index, as composed by menus and menu bars.
///
/// The active index is either `None` or the index of an item that is
/// selectable at the time it was assigned; any rejected assignment yields
/// `None`. Every accepted change marks the list dirty so the next update
/// pass rebuilds its visuals.
pub struct ItemList {
    items: Vec<Arc<MenuItem>>,
    /// One `changed` connection per item, parallel to `items`.
    registrations: Vec<ConnectionId>,
    active_index: Option<usize>,
    predicate: Option<SelectablePredicate>,
    dirty: Arc<AtomicBool>,

    /// Emitted with the old and new items after the items are replaced.
    pub items_changed: Signal<ItemsChanged>,
    /// Emitted with the old and new active index after it changes.
    pub active_index_changed: Signal<(Option<usize>, Option<usize>)>,
}

impl ItemList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            registrations: Vec::new(),
            active_index: None,
            predicate: None,
            dirty: Arc::new(AtomicBool::new(true)),
            items_changed: Signal::new(),
            active_index_changed: Signal::new(),
        }
    }

    /// Replace the items, returning the previous ones.
    ///
    /// Change registrations move from the old items to the new ones, and
    /// the active index is reset before `items_changed` is emitted.
    pub fn set_items(&mut self, items: Vec<Arc<MenuItem>>) -> Vec<Arc<MenuItem>> {
        self.unregister();
        let old = std::mem::replace(&mut self.items, items);
        self.registrations = self
            .items
            .iter()
            .map(|item| {
                let dirty = self.dirty.clone();
                item.changed
                    .connect(move |_| dirty.store(true, Ordering::SeqCst))
            })
            .collect();

        self.set_active_index(None);
        self.mark_dirty();
        self.items_changed.emit((old.clone(), self.items.clone()));
        old
    }

    /// Drop every item change registration. Used on dispose.
    pub fn unregister(&mut self) {
        for (item, id) in self.items.iter().zip(self.registrations.drain(..)) {
            if let Err(err) = item.changed.try_disconnect(id) {
                tracing::warn!(target: targets::HOST, %err, "item registration already removed");
            }
        }
    }

    /// The number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item at `index`.
    pub fn get(&self, index: usize) -> Option<&Arc<MenuItem>> {
        self.items.get(index)
    }

    /// Position of `item` in the list, compared by identity.
    pub fn index_of(&self, item: &Arc<MenuItem>) -> Option<usize> {
        self.items.iter().position(|it| Arc::ptr_eq(it, item))
    }

    // =========================================================================
    // Selectability
    // =========================================================================

    /// Replace the selectability rule. `None` restores the default.
    pub fn set_selectable_predicate(&mut self, predicate: Option<SelectablePredicate>) {
        self.predicate = predicate;
        self.revalidate_active();
    }

    /// Clear the active index if its item is no longer selectable.
    pub fn revalidate_active(&mut self) {
        if let Some(index) = self.active_index
            && !selectable_at(&*self, index)
        {
            self.set_active_index(None);
        }
    }

    // =========================================================================
    // Active Item
    // =========================================================================

    /// The active index.
    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    /// Set the active index, returning the accepted value.
    ///
    /// Out-of-range or unselectable indices are rejected and clear the
    /// active index instead.
    pub fn set_active_index(&mut self, index: Option<usize>) -> Option<usize> {
        let accepted = index.filter(|&i| selectable_at(&*self, i));
        if accepted != self.active_index {
            let old = std::mem::replace(&mut self.active_index, accepted);
            tracing::trace!(target: targets::INPUT, ?old, new = ?accepted, "active index changed");
            self.mark_dirty();
            self.active_index_changed.emit((old, accepted));
        }
        accepted
    }

    /// The active item.
    pub fn active_item(&self) -> Option<Arc<MenuItem>> {
        self.active_index.and_then(|i| self.items.get(i).cloned())
    }

    /// Activate `item`; an unknown or unselectable item clears the index.
    pub fn set_active_item(&mut self, item: Option<&Arc<MenuItem>>) -> Option<usize> {
        let index = item.and_then(|item| self.index_of(item));
        self.set_active_index(index)
    }

    /// Activate the next selectable item, wrapping. Unchanged if none.
    pub fn activate_next_item(&mut self) {
        if let Some(index) = next_selectable(&*self, self.active_index) {
            self.set_active_index(Some(index));
        }
    }

    /// Activate the previous selectable item, wrapping. Unchanged if none.
    pub fn activate_previous_item(&mut self) {
        if let Some(index) = previous_selectable(&*self, self.active_index) {
            self.set_active_index(Some(index));
        }
    }

    /// Activate the next selectable item whose mnemonic matches `key`.
    pub fn activate_mnemonic_item(&mut self, key: char) {
        if let Some(index) = mnemonic_match(&*self, self.active_index, key) {
            self.set_active_index(Some(index));
        }
    }

    /// Activate the first selectable item.
    pub fn activate_first_item(&mut self) {
        if let Some(index) = first_selectable(&*self) {
            self.set_active_index(Some(index));
        }
    }

    /// Activate the last selectable item.
    pub fn activate_last_item(&mut self) {
        if let Some(index) = last_selectable(&*self) {
            self.set_active_index(Some(index));
        }
    }

    // =========================================================================
    // Update Scheduling
    // =========================================================================

    /// Request a visual update on the next pass.
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Whether an update is pending.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Clear and return the pending-update flag.
    pub(crate) fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::SeqCst)
    }
}

impl Navigable for ItemList {
    fn items(&self) -> &[Arc<MenuItem>] {
        &self.items
    }

    fn is_selectable(&self, item: &MenuItem) -> bool {
        match &self.predicate {
            Some(predicate) => predicate(item),
            None => is_selectable_default(item),
        }
    }
}

impl Default for ItemList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ItemList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemList")
            .field("items", &self.items.len())
            .field("active_index", &self.active_index)
            .finish_non_exhaustive()
    }
}
