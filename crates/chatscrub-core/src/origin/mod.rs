//! Origin store boundary.
//!
//! The origin store owns the chat history. The engine only needs three
//! things from it: the containers it can see, an oldest-first paginated
//! history fetch per container, and per-message deletion.

mod memory;

use std::future::Future;

use crate::model::{ChatMessage, Container, MessageHandle, MessageId};

pub use memory::{ArchiveExport, ContainerExport, MemoryOrigin, MessageExport, ScopeExport};

/// Errors reported by an origin store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OriginError {
    /// The caller lacks permission for the operation.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Transient protocol or transport failure.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The container or message does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Anything else.
    #[error("Origin failure: {0}")]
    Other(String),
}

/// An ordered, paginated message history with per-message deletion.
pub trait OriginStore: Send + Sync {
    /// Lists the containers visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn list_containers(&self) -> impl Future<Output = Result<Vec<Container>, OriginError>> + Send;

    /// Fetches up to `limit` messages of `container`, oldest first, strictly
    /// after `after` (or from the beginning when `after` is `None`).
    ///
    /// A page shorter than `limit` means the history is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be read.
    fn fetch_history(
        &self,
        container: &Container,
        after: Option<MessageId>,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, OriginError>> + Send;

    /// Deletes one message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be deleted.
    fn delete_message(
        &self,
        handle: &MessageHandle,
    ) -> impl Future<Output = Result<(), OriginError>> + Send;
}
