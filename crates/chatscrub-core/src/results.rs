//! Page-addressable collection of matched messages.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use tracing::debug;

use crate::model::{MatchRecord, MessageId};

/// Default number of records per page.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// A batch of records keyed by their sequence index.
pub type ResultBatch = BTreeMap<usize, MatchRecord>;

/// Number of pages needed for `len` records, never less than one.
#[must_use]
pub const fn total_pages_for(len: usize, page_size: usize) -> usize {
    let page_size = if page_size == 0 { 1 } else { page_size };
    let pages = len.div_ceil(page_size);
    if pages == 0 { 1 } else { pages }
}

/// Matched messages of one search session, with pagination state.
#[derive(Debug, Clone)]
pub struct ResultSet {
    records: BTreeMap<usize, MatchRecord>,
    page_size: usize,
    current_page: usize,
}

impl Default for ResultSet {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ResultSet {
    /// Creates an empty set. A zero page size is treated as one.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            records: BTreeMap::new(),
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    /// Merges a batch. Indices are kept as assigned by the scan.
    pub fn append(&mut self, batch: ResultBatch) {
        let added = batch.len();
        self.records.extend(batch);
        debug!(added, total = self.records.len(), "Appended result batch");
    }

    /// Drops every record and returns to page one.
    pub fn clear(&mut self) {
        self.records.clear();
        self.current_page = 1;
    }

    /// Number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records per page.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Current page (1-based).
    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    /// Total pages at the current page size.
    #[must_use]
    pub fn total_pages(&self) -> usize {
        total_pages_for(self.records.len(), self.page_size)
    }

    /// Record with the given sequence index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&MatchRecord> {
        self.records.get(&index)
    }

    /// All records in index order.
    pub fn iter(&self) -> impl Iterator<Item = &MatchRecord> {
        self.records.values()
    }

    /// Whether indices form the unbroken range `1..=len`.
    #[must_use]
    pub fn is_dense(&self) -> bool {
        self.records.keys().copied().eq(1..=self.records.len())
    }

    /// Records of `page_number` at `page_size`, clamped to the valid range.
    #[must_use]
    pub fn page(&self, page_number: usize, page_size: usize) -> Vec<&MatchRecord> {
        let page_size = page_size.max(1);
        let page_number = page_number.clamp(1, total_pages_for(self.len(), page_size));
        self.records
            .values()
            .skip((page_number - 1) * page_size)
            .take(page_size)
            .collect()
    }

    /// Records of the current page.
    #[must_use]
    pub fn current_page_records(&self) -> Vec<&MatchRecord> {
        self.page(self.current_page, self.page_size)
    }

    /// Moves to `page`, clamped to the valid range, and returns the page used.
    pub fn set_current_page(&mut self, page: usize) -> usize {
        self.current_page = page.clamp(1, self.total_pages());
        self.current_page
    }

    /// Changes the page size and returns to page one.
    pub fn change_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.current_page = 1;
    }

    /// Removes deleted records and renumbers the survivors densely from 1.
    ///
    /// Returns the number of records removed.
    pub fn reconcile_after_deletion(&mut self, deleted: &HashSet<MessageId>) -> usize {
        let before = self.records.len();
        let survivors = std::mem::take(&mut self.records)
            .into_values()
            .filter(|record| !deleted.contains(&record.id()));

        self.records = survivors
            .enumerate()
            .map(|(pos, record)| (pos + 1, record.renumbered(pos + 1)))
            .collect();

        let total = self.total_pages();
        if self.current_page > total {
            self.current_page = total;
        }

        let removed = before - self.records.len();
        debug!(removed, remaining = self.records.len(), "Reconciled results after deletion");
        removed
    }

    /// Pagination summary for the current page.
    #[must_use]
    pub fn page_info(&self) -> PageInfo {
        let total = self.len();
        let first = (self.current_page - 1) * self.page_size + 1;
        let last = (self.current_page * self.page_size).min(total);
        PageInfo {
            first: first.min(total.max(1)),
            last,
            total,
            page: self.current_page,
            total_pages: self.total_pages(),
        }
    }
}

/// "Showing a-b of n results (Page p of t)".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// Position of the first record on the page.
    pub first: usize,
    /// Position of the last record on the page.
    pub last: usize,
    /// Total records.
    pub total: usize,
    /// Current page.
    pub page: usize,
    /// Total pages.
    pub total_pages: usize,
}

impl PageInfo {
    /// Whether a previous page exists.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Whether a next page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

impl fmt::Display for PageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total == 0 {
            return f.write_str("No results");
        }
        write!(
            f,
            "Showing {}-{} of {} results (Page {} of {})",
            self.first, self.last, self.total, self.page, self.total_pages
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{ChatMessage, Container, ContainerId, Keyword, ScopeId};
    use chrono::Utc;
    use proptest::prelude::*;

    pub(crate) fn record(index: usize, id: u64) -> MatchRecord {
        let container = Container {
            id: ContainerId(1),
            name: "general".to_string(),
            scope: ScopeId(1),
        };
        let message = ChatMessage {
            id: MessageId(id),
            container: container.id,
            author: "alice".to_string(),
            content: format!("alt number {id}"),
            created_at: Utc::now(),
        };
        MatchRecord::new(index, &container, &message, Keyword::new("alt").unwrap())
    }

    pub(crate) fn batch(range: std::ops::RangeInclusive<usize>) -> ResultBatch {
        range.map(|i| (i, record(i, i as u64 * 100))).collect()
    }

    #[test]
    fn test_empty_set_has_one_page() {
        let set = ResultSet::default();
        assert_eq!(set.total_pages(), 1);
        assert!(set.current_page_records().is_empty());
        assert_eq!(set.page_info().to_string(), "No results");
    }

    #[test]
    fn test_sixty_results_page_size_change() {
        let mut set = ResultSet::new(25);
        set.append(batch(1..=60));
        assert_eq!(set.total_pages(), 3);

        set.set_current_page(3);
        assert_eq!(set.current_page_records().len(), 10);

        set.change_page_size(100);
        assert_eq!(set.total_pages(), 1);
        assert_eq!(set.current_page(), 1);
    }

    #[test]
    fn test_page_returns_index_range() {
        let mut set = ResultSet::new(10);
        set.append(batch(1..=25));

        let indices: Vec<_> = set.page(2, 10).iter().map(|r| r.index()).collect();
        assert_eq!(indices, (11..=20).collect::<Vec<_>>());

        let last: Vec<_> = set.page(3, 10).iter().map(|r| r.index()).collect();
        assert_eq!(last, (21..=25).collect::<Vec<_>>());
    }

    #[test]
    fn test_out_of_range_page_is_clamped() {
        let mut set = ResultSet::new(10);
        set.append(batch(1..=15));

        let high: Vec<_> = set.page(99, 10).iter().map(|r| r.index()).collect();
        assert_eq!(high, (11..=15).collect::<Vec<_>>());

        let low: Vec<_> = set.page(0, 10).iter().map(|r| r.index()).collect();
        assert_eq!(low, (1..=10).collect::<Vec<_>>());

        assert_eq!(set.set_current_page(7), 2);
        assert_eq!(set.set_current_page(0), 1);
    }

    #[test]
    fn test_append_keeps_scan_indices() {
        let mut set = ResultSet::new(10);
        set.append(batch(1..=3));
        set.append(batch(4..=5));
        assert_eq!(set.len(), 5);
        assert!(set.is_dense());
        assert_eq!(set.get(4).unwrap().index(), 4);
    }

    #[test]
    fn test_reconcile_renumbers_and_clamps_page() {
        let mut set = ResultSet::new(10);
        set.append(batch(1..=21));
        set.set_current_page(3);

        let deleted: HashSet<_> = [2100, 2000, 300].into_iter().map(MessageId).collect();
        assert_eq!(set.reconcile_after_deletion(&deleted), 3);

        assert_eq!(set.len(), 18);
        assert!(set.is_dense());
        assert_eq!(set.total_pages(), 2);
        assert_eq!(set.current_page(), 2);
        assert_eq!(set.get(3).unwrap().id(), MessageId(400));
        assert_eq!(set.get(3).unwrap().index(), 3);
    }

    #[test]
    fn test_reconcile_ignores_unknown_ids() {
        let mut set = ResultSet::new(10);
        set.append(batch(1..=3));
        let deleted: HashSet<_> = [MessageId(999)].into_iter().collect();
        assert_eq!(set.reconcile_after_deletion(&deleted), 0);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_page_info_display() {
        let mut set = ResultSet::new(25);
        set.append(batch(1..=60));
        set.set_current_page(3);

        let info = set.page_info();
        assert_eq!(info.to_string(), "Showing 51-60 of 60 results (Page 3 of 3)");
        assert!(info.has_prev());
        assert!(!info.has_next());
    }

    proptest! {
        #[test]
        fn prop_append_order_independent(a in 0usize..40, b in 0usize..40, page_size in 1usize..30) {
            let first = batch(1..=a);
            let second: ResultBatch = (a + 1..=a + b).map(|i| (i, record(i, i as u64))).collect();

            let mut forward = ResultSet::new(page_size);
            forward.append(first.clone());
            forward.append(second.clone());

            let mut backward = ResultSet::new(page_size);
            backward.append(second);
            backward.append(first);

            prop_assert_eq!(forward.len(), backward.len());
            prop_assert_eq!(forward.total_pages(), backward.total_pages());
            prop_assert_eq!(forward.total_pages(), total_pages_for(a + b, page_size));
        }

        #[test]
        fn prop_reconcile_is_dense_and_order_preserving(
            len in 0usize..60,
            deleted_mask in prop::collection::vec(any::<bool>(), 60),
        ) {
            let mut set = ResultSet::new(10);
            set.append(batch(1..=len));

            let deleted: HashSet<MessageId> = (1..=len)
                .filter(|i| deleted_mask[i - 1])
                .map(|i| MessageId(i as u64 * 100))
                .collect();
            let expected: Vec<MessageId> = set
                .iter()
                .map(MatchRecord::id)
                .filter(|id| !deleted.contains(id))
                .collect();

            set.reconcile_after_deletion(&deleted);

            prop_assert!(set.is_dense());
            prop_assert_eq!(set.len(), len - deleted.len());
            let survivors: Vec<MessageId> = set.iter().map(MatchRecord::id).collect();
            prop_assert_eq!(survivors, expected);
        }
    }
}
