//! Bulk deletion of selected matches.
//!
//! Deletion proceeds one message at a time. A failed item is classified,
//! logged and counted; it never stops the remaining items. The returned
//! [`DeletionReport`] is applied to the result set by the caller.

use std::collections::HashSet;
use std::fmt;

use tracing::{info, warn};

use crate::model::{MessageHandle, MessageId};
use crate::origin::{OriginError, OriginStore};

/// Why a single deletion failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionFailureKind {
    /// The caller may not delete the message.
    PermissionDenied,
    /// Transient protocol or transport failure.
    Protocol,
    /// Anything else, including a message that no longer exists.
    Unknown,
}

impl From<&OriginError> for DeletionFailureKind {
    fn from(error: &OriginError) -> Self {
        match error {
            OriginError::PermissionDenied(_) => Self::PermissionDenied,
            OriginError::Protocol(_) => Self::Protocol,
            OriginError::NotFound(_) | OriginError::Other(_) => Self::Unknown,
        }
    }
}

/// One message that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionFailure {
    /// Handle of the message.
    pub handle: MessageHandle,
    /// Classified cause.
    pub kind: DeletionFailureKind,
    /// Error text from the origin store.
    pub message: String,
}

/// Incremental progress, reported after every successful deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionProgress {
    /// Messages deleted so far.
    pub deleted: usize,
    /// Messages in the request.
    pub total: usize,
}

impl fmt::Display for DeletionProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deleting messages... ({}/{})", self.deleted, self.total)
    }
}

/// Overall result class of a deletion pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// The request was empty.
    NothingSelected,
    /// Every item was deleted.
    Complete {
        /// Deleted count.
        deleted: usize,
    },
    /// Some items were deleted, some failed.
    Partial {
        /// Deleted count.
        deleted: usize,
        /// Failed count.
        failed: usize,
    },
    /// Every item failed.
    Failed {
        /// Failed count.
        failed: usize,
    },
}

impl fmt::Display for DeletionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NothingSelected => f.write_str("No messages selected."),
            Self::Complete { deleted } => write!(f, "Successfully deleted {deleted} messages!"),
            Self::Partial { deleted, failed } => write!(
                f,
                "Deleted {deleted} messages. Failed to delete {failed} messages."
            ),
            Self::Failed { failed } => write!(f, "Failed to delete {failed} messages."),
        }
    }
}

/// Result of a deletion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    /// Identities that were deleted.
    pub succeeded: HashSet<MessageId>,
    /// Items that failed, in request order.
    pub failures: Vec<DeletionFailure>,
    /// Items in the request.
    pub total: usize,
}

impl DeletionReport {
    /// Number of failed items.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    /// Classifies the pass.
    #[must_use]
    pub fn outcome(&self) -> DeletionOutcome {
        let deleted = self.succeeded.len();
        let failed = self.failed_count();
        match (deleted, failed) {
            _ if self.total == 0 => DeletionOutcome::NothingSelected,
            (deleted, 0) => DeletionOutcome::Complete { deleted },
            (0, failed) => DeletionOutcome::Failed { failed },
            (deleted, failed) => DeletionOutcome::Partial { deleted, failed },
        }
    }
}

/// Deletes `selected` one by one, calling `on_progress` after each success.
///
/// The scheduler is given a turn between items so a concurrent presentation
/// task can redraw.
pub async fn delete_selected<S, F>(
    store: &S,
    selected: &[MessageHandle],
    mut on_progress: F,
) -> DeletionReport
where
    S: OriginStore,
    F: FnMut(DeletionProgress) + Send,
{
    let mut report = DeletionReport {
        total: selected.len(),
        ..DeletionReport::default()
    };

    for handle in selected {
        match store.delete_message(handle).await {
            Ok(()) => {
                report.succeeded.insert(handle.id);
                on_progress(DeletionProgress {
                    deleted: report.succeeded.len(),
                    total: report.total,
                });
            }
            Err(error) => {
                let kind = DeletionFailureKind::from(&error);
                match kind {
                    DeletionFailureKind::PermissionDenied => warn!(
                        container = %handle.container_name,
                        message = %handle.id,
                        "No permission to delete message"
                    ),
                    _ => warn!(
                        container = %handle.container_name,
                        message = %handle.id,
                        error = %error,
                        "Error deleting message"
                    ),
                }
                report.failures.push(DeletionFailure {
                    handle: handle.clone(),
                    kind,
                    message: error.to_string(),
                });
            }
        }
        tokio::task::yield_now().await;
    }

    info!(
        deleted = report.succeeded.len(),
        failed = report.failed_count(),
        "Deletion finished"
    );
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{ContainerId, ScopeId};
    use crate::origin::MemoryOrigin;

    fn origin_with(count: usize) -> (MemoryOrigin, Vec<MessageHandle>) {
        let mut origin = MemoryOrigin::new(ScopeId(1), "guild");
        let general = origin.add_container(ContainerId(1), "general");
        let handles = (0..count)
            .map(|n| {
                let id = origin.push_message(general.id, "a", &format!("spam {n}"));
                MessageHandle {
                    id,
                    container: general.id,
                    container_name: general.name.clone(),
                }
            })
            .collect();
        (origin, handles)
    }

    #[tokio::test]
    async fn test_empty_request() {
        let (origin, _) = origin_with(0);
        let report = delete_selected(&origin, &[], |_| {}).await;
        assert_eq!(report.outcome(), DeletionOutcome::NothingSelected);
        assert_eq!(report.outcome().to_string(), "No messages selected.");
    }

    #[tokio::test]
    async fn test_all_succeed_with_progress() {
        let (origin, handles) = origin_with(3);
        let mut seen = Vec::new();
        let report = delete_selected(&origin, &handles, |p| seen.push(p.to_string())).await;

        assert_eq!(report.succeeded.len(), 3);
        assert_eq!(
            seen,
            vec![
                "Deleting messages... (1/3)",
                "Deleting messages... (2/3)",
                "Deleting messages... (3/3)"
            ]
        );
        assert_eq!(report.outcome().to_string(), "Successfully deleted 3 messages!");
        assert!(handles.iter().all(|h| !origin.contains(h.id)));
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_later_items() {
        let (mut origin, handles) = origin_with(4);
        origin.fail_delete(handles[0].id, OriginError::PermissionDenied("Missing Permissions".into()));
        origin.fail_delete(handles[2].id, OriginError::Protocol("429".into()));

        let report = delete_selected(&origin, &handles, |_| {}).await;

        assert_eq!(report.failed_count(), 2);
        assert_eq!(report.failures[0].kind, DeletionFailureKind::PermissionDenied);
        assert_eq!(report.failures[1].kind, DeletionFailureKind::Protocol);
        assert!(report.succeeded.contains(&handles[1].id));
        assert!(report.succeeded.contains(&handles[3].id));
        assert_eq!(
            report.outcome().to_string(),
            "Deleted 2 messages. Failed to delete 2 messages."
        );
    }

    #[tokio::test]
    async fn test_already_deleted_counts_as_unknown_failure() {
        let (origin, handles) = origin_with(1);
        delete_selected(&origin, &handles, |_| {}).await;

        let report = delete_selected(&origin, &handles, |_| {}).await;
        assert_eq!(report.failures[0].kind, DeletionFailureKind::Unknown);
        assert_eq!(report.outcome(), DeletionOutcome::Failed { failed: 1 });
        assert_eq!(report.outcome().to_string(), "Failed to delete 1 messages.");
    }
}
