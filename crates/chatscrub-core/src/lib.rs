//! # chatscrub-core
//!
//! Keyword search, pagination and bulk deletion over chat message history.
//!
//! This crate provides:
//! - Substring keyword matching with per-keyword exclusion words
//! - A sequential scan driver that hands matches over in batches
//! - A page-addressable result set with stable, dense indices
//! - Selection state that survives page navigation
//! - Bulk deletion with per-item failure isolation and reconciliation
//! - Durable exclusion lists, stored as JSON
//!
//! The origin of the messages is abstracted behind [`OriginStore`];
//! [`MemoryOrigin`] serves tests and offline exports.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod browser;
pub mod clock;
pub mod config;
pub mod deletion;
mod error;
pub mod exclusion;
pub mod matcher;
pub mod model;
pub mod origin;
pub mod results;
pub mod scan;
pub mod selection;
pub mod session;

pub use browser::{PageItem, RenderedPage, ResultBrowser};
pub use clock::{Clock, MockClock, SystemClock};
pub use config::ScanConfig;
pub use deletion::{
    DeletionFailure, DeletionFailureKind, DeletionOutcome, DeletionProgress, DeletionReport,
    delete_selected,
};
pub use error::{Error, Result};
pub use exclusion::{AddOutcome, ExclusionList, ExclusionStore, RemoveOutcome, ScopeExclusions};
pub use matcher::{KeywordDiagnosis, MatchOutcome, diagnose, matches};
pub use model::{
    ChatMessage, Container, ContainerId, Keyword, MatchRecord, MessageHandle, MessageId, ScopeId,
    highlight_spans,
};
pub use origin::{ArchiveExport, MemoryOrigin, OriginError, OriginStore};
pub use results::{PageInfo, ResultBatch, ResultSet};
pub use scan::{ContainerFailure, ScanEvent, ScanReport, Scanner};
pub use selection::{CheckEvent, Selection};
pub use session::{ProgressReporter, ProgressView, SearchSession, SessionSnapshot, progress_channel};
