//! Paging and selection state behind a result view.
//!
//! [`ResultBrowser`] owns the result set, the selection, and a copy of the
//! check-states of the page currently on screen. Check events go to the
//! selection first; the copy only backs rendering. Every operation that
//! leaves the page saves the copy back before the new page takes its
//! initial states from the selection.

use tracing::debug;

use crate::deletion::DeletionReport;
use crate::model::{MatchRecord, MessageHandle};
use crate::results::{PageInfo, ResultBatch, ResultSet};
use crate::selection::{CheckEvent, Selection};

/// One row of a rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageItem {
    /// The matched message.
    pub record: MatchRecord,
    /// Initial check-state.
    pub checked: bool,
}

/// A page ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// Rows in index order.
    pub items: Vec<PageItem>,
    /// Position summary.
    pub info: PageInfo,
}

/// Result set plus selection, driven by presentation events.
#[derive(Debug, Clone, Default)]
pub struct ResultBrowser {
    results: ResultSet,
    selection: Selection,
    visible: Vec<(MessageHandle, bool)>,
}

impl ResultBrowser {
    /// Creates an empty browser.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            results: ResultSet::new(page_size),
            ..Self::default()
        }
    }

    /// The underlying result set.
    #[must_use]
    pub const fn results(&self) -> &ResultSet {
        &self.results
    }

    /// The current selection, including changes made on the visible page.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Drops all results and selections, e.g. before a new search.
    pub fn reset(&mut self) {
        self.results.clear();
        self.selection.clear();
        self.visible.clear();
    }

    /// Appends a scan batch and refreshes the visible page.
    pub fn append(&mut self, batch: ResultBatch) -> RenderedPage {
        self.save_visible();
        self.results.append(batch);
        self.render()
    }

    /// Applies a check-state change to an item of the visible page.
    ///
    /// Returns `false` if the item is not on the visible page.
    pub fn apply_check(&mut self, event: CheckEvent) -> bool {
        match self.visible.iter_mut().find(|(handle, _)| handle.id == event.id) {
            Some((handle, checked)) => {
                *checked = event.checked;
                self.selection.set(handle, event.checked);
                true
            }
            None => false,
        }
    }

    /// Applies a check-state change by sequence index.
    ///
    /// Returns `false` if no visible item has that index.
    pub fn check_index(&mut self, index: usize, checked: bool) -> bool {
        let Some(id) = self.results.get(index).map(MatchRecord::id) else {
            return false;
        };
        self.apply_check(CheckEvent { id, checked })
    }

    /// Re-renders the current page.
    pub fn current(&mut self) -> RenderedPage {
        self.save_visible();
        self.render()
    }

    /// Moves to page `page`, clamped to the valid range.
    pub fn go_to_page(&mut self, page: usize) -> RenderedPage {
        self.save_visible();
        self.results.set_current_page(page);
        self.render()
    }

    /// Moves one page forward, if possible.
    pub fn next_page(&mut self) -> RenderedPage {
        let page = self.results.current_page() + 1;
        self.go_to_page(page)
    }

    /// Moves one page back, if possible.
    pub fn prev_page(&mut self) -> RenderedPage {
        let page = self.results.current_page().saturating_sub(1);
        self.go_to_page(page)
    }

    /// Changes the page size and returns to page one.
    pub fn change_page_size(&mut self, page_size: usize) -> RenderedPage {
        self.save_visible();
        self.results.change_page_size(page_size);
        self.render()
    }

    /// Checks or unchecks every item of the visible page.
    pub fn toggle_all(&mut self, checked: bool) -> RenderedPage {
        let states = self
            .selection
            .toggle_all(self.visible.iter().map(|(handle, _)| handle), checked);
        for ((_, state), new_state) in self.visible.iter_mut().zip(states) {
            *state = new_state;
        }
        self.render()
    }

    /// Handles of every selected item, in result order.
    pub fn selected_handles(&mut self) -> Vec<MessageHandle> {
        self.save_visible();
        self.results
            .iter()
            .filter(|record| self.selection.contains(record.id()))
            .map(|record| record.handle().clone())
            .collect()
    }

    /// Removes deleted items from the results and the selection.
    pub fn apply_deletion(&mut self, report: &DeletionReport) -> RenderedPage {
        self.save_visible();
        let removed = self.results.reconcile_after_deletion(&report.succeeded);
        let retracted = self.selection.retract(&report.succeeded);
        debug!(removed, retracted, "Applied deletion report");
        self.render()
    }

    fn save_visible(&mut self) {
        self.selection
            .save(self.visible.iter().map(|(handle, checked)| (handle, *checked)));
    }

    fn render(&mut self) -> RenderedPage {
        let records: Vec<MatchRecord> = self
            .results
            .current_page_records()
            .into_iter()
            .cloned()
            .collect();
        let states = self
            .selection
            .restore_initial_state(records.iter().map(MatchRecord::handle));

        self.visible = records
            .iter()
            .zip(&states)
            .map(|(record, checked)| (record.handle().clone(), *checked))
            .collect();

        RenderedPage {
            items: records
                .into_iter()
                .zip(states)
                .map(|(record, checked)| PageItem { record, checked })
                .collect(),
            info: self.results.page_info(),
        }
    }
}
