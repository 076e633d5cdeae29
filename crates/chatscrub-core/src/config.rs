//! Scan configuration.

use serde::{Deserialize, Serialize};

/// Default number of matches accumulated before a batch is handed over.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Default maximum number of matches a single scan will collect.
pub const DEFAULT_RESULT_CAP: usize = 10_000;

/// Default number of messages requested per history fetch.
pub const DEFAULT_FETCH_PAGE_SIZE: usize = 100;

/// Tunables for one scan run.
///
/// Zero values are treated as one; see [`ScanConfig::normalized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Matches per flushed batch.
    pub batch_size: usize,
    /// Stop after this many matches.
    pub result_cap: usize,
    /// Messages requested per history fetch.
    pub fetch_page_size: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            result_cap: DEFAULT_RESULT_CAP,
            fetch_page_size: DEFAULT_FETCH_PAGE_SIZE,
        }
    }
}

impl ScanConfig {
    /// Returns a copy with the result cap replaced.
    #[must_use]
    pub const fn with_result_cap(mut self, cap: usize) -> Self {
        self.result_cap = cap;
        self
    }

    /// Returns a copy with the batch size replaced.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Returns a copy with the fetch page size replaced.
    #[must_use]
    pub const fn with_fetch_page_size(mut self, fetch_page_size: usize) -> Self {
        self.fetch_page_size = fetch_page_size;
        self
    }

    /// Clamps every value to at least one so flushing and fetching always progress.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            batch_size: self.batch_size.max(1),
            result_cap: self.result_cap.max(1),
            fetch_page_size: self.fetch_page_size.max(1),
        }
    }
}
