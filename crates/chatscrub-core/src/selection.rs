//! Checked-item tracking that survives page changes.
//!
//! The selection maps message identity to handle. It is the single source
//! of truth for what is checked; a rendered page only holds a copy of the
//! check-states of its own items, which is saved back here before the page
//! is left.

use std::collections::{HashMap, HashSet};

use crate::model::{MessageHandle, MessageId};

/// A check-state change delivered by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckEvent {
    /// Message whose checkbox changed.
    pub id: MessageId,
    /// New state.
    pub checked: bool,
}

impl CheckEvent {
    /// A "now checked" event.
    #[must_use]
    pub const fn checked(id: MessageId) -> Self {
        Self { id, checked: true }
    }

    /// A "now unchecked" event.
    #[must_use]
    pub const fn unchecked(id: MessageId) -> Self {
        Self { id, checked: false }
    }
}

/// Set of currently checked messages, independent of the displayed page.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    selected: HashMap<MessageId, MessageHandle>,
}

impl Selection {
    /// Creates an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the check-states of a page that is being left.
    ///
    /// Checked items are inserted, unchecked items are removed, so a later
    /// uncheck retracts an earlier check.
    pub fn save<'a, I>(&mut self, page_items: I)
    where
        I: IntoIterator<Item = (&'a MessageHandle, bool)>,
    {
        for (handle, checked) in page_items {
            self.set(handle, checked);
        }
    }

    /// Initial check-state of each item of a freshly rendered page.
    #[must_use]
    pub fn restore_initial_state<'a, I>(&self, page_items: I) -> Vec<bool>
    where
        I: IntoIterator<Item = &'a MessageHandle>,
    {
        page_items
            .into_iter()
            .map(|handle| self.selected.contains_key(&handle.id))
            .collect()
    }

    /// Sets every visible item to `new_state` and returns the new states.
    pub fn toggle_all<'a, I>(&mut self, page_items: I, new_state: bool) -> Vec<bool>
    where
        I: IntoIterator<Item = &'a MessageHandle>,
    {
        page_items
            .into_iter()
            .map(|handle| {
                self.set(handle, new_state);
                new_state
            })
            .collect()
    }

    /// Inserts or removes one item.
    pub fn set(&mut self, handle: &MessageHandle, checked: bool) {
        if checked {
            self.selected.insert(handle.id, handle.clone());
        } else {
            self.selected.remove(&handle.id);
        }
    }

    /// Removes identities that no longer exist (e.g. after deletion).
    ///
    /// Returns how many were removed.
    pub fn retract(&mut self, ids: &HashSet<MessageId>) -> usize {
        let before = self.selected.len();
        self.selected.retain(|id, _| !ids.contains(id));
        before - self.selected.len()
    }

    /// Whether the message is checked.
    #[must_use]
    pub fn contains(&self, id: MessageId) -> bool {
        self.selected.contains_key(&id)
    }

    /// Handle of a checked message.
    #[must_use]
    pub fn get(&self, id: MessageId) -> Option<&MessageHandle> {
        self.selected.get(&id)
    }

    /// Number of checked messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Whether nothing is checked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Unchecks everything.
    pub fn clear(&mut self) {
        self.selected.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContainerId;

    fn handle(id: u64) -> MessageHandle {
        MessageHandle {
            id: MessageId(id),
            container: ContainerId(1),
            container_name: "general".to_string(),
        }
    }

    #[test]
    fn test_save_inserts_and_retracts() {
        let a = handle(1);
        let b = handle(2);
        let mut selection = Selection::new();

        selection.save([(&a, true), (&b, true)]);
        assert_eq!(selection.len(), 2);

        selection.save([(&a, false), (&b, true)]);
        assert!(!selection.contains(a.id));
        assert!(selection.contains(b.id));
    }

    #[test]
    fn test_restore_initial_state() {
        let items = [handle(1), handle(2), handle(3)];
        let mut selection = Selection::new();
        selection.set(&items[1], true);

        assert_eq!(
            selection.restore_initial_state(&items),
            vec![false, true, false]
        );
    }

    #[test]
    fn test_toggle_all_only_touches_given_items() {
        let visible = [handle(1), handle(2)];
        let elsewhere = handle(50);
        let mut selection = Selection::new();
        selection.set(&elsewhere, true);

        assert_eq!(selection.toggle_all(&visible, true), vec![true, true]);
        assert_eq!(selection.len(), 3);

        assert_eq!(selection.toggle_all(&visible, false), vec![false, false]);
        assert_eq!(selection.len(), 1);
        assert!(selection.contains(elsewhere.id));
    }

    #[test]
    fn test_retract() {
        let mut selection = Selection::new();
        selection.set(&handle(3), true);
        selection.set(&handle(7), true);

        let gone: HashSet<_> = [MessageId(3), MessageId(99)].into_iter().collect();
        assert_eq!(selection.retract(&gone), 1);
        assert!(!selection.contains(MessageId(3)));
        assert!(selection.contains(MessageId(7)));
        assert_eq!(selection.get(MessageId(7)).unwrap_or(&handle(0)).id, MessageId(7));
    }

    #[test]
    fn test_check_event_constructors() {
        assert!(CheckEvent::checked(MessageId(1)).checked);
        assert!(!CheckEvent::unchecked(MessageId(1)).checked);
    }
}
