//! In-memory origin store.
//!
//! Backs the test suite and the offline console, which loads a JSON export
//! of one scope. Message ids increase with creation time, so ascending id
//! order is oldest-first order.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{OriginError, OriginStore};
use crate::Result;
use crate::model::{ChatMessage, Container, ContainerId, MessageHandle, MessageId, ScopeId};

/// Exported scope metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeExport {
    /// Scope identifier.
    pub id: u64,
    /// Scope display name.
    pub name: String,
}

/// Exported message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageExport {
    /// Message identifier.
    pub id: u64,
    /// Author display name.
    pub author: String,
    /// Body text.
    pub content: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Exported container with its full history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerExport {
    /// Container identifier.
    pub id: u64,
    /// Container name without the leading `#`.
    pub name: String,
    /// Messages in any order.
    #[serde(default)]
    pub messages: Vec<MessageExport>,
}

/// A JSON export of one scope's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveExport {
    /// Scope metadata.
    pub scope: ScopeExport,
    /// Containers in display order.
    #[serde(default)]
    pub containers: Vec<ContainerExport>,
}

impl ArchiveExport {
    /// Reads an export file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Writes the export back to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, contents).await?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct State {
    containers: Vec<Container>,
    messages: HashMap<ContainerId, Vec<ChatMessage>>,
    history_failures: HashMap<ContainerId, OriginError>,
    delete_failures: HashMap<MessageId, OriginError>,
    fetches: HashMap<ContainerId, usize>,
    next_id: u64,
}

/// Origin store held entirely in memory, with failure injection.
#[derive(Debug)]
pub struct MemoryOrigin {
    scope: ScopeId,
    scope_name: String,
    state: Mutex<State>,
}

impl MemoryOrigin {
    /// Creates an empty store for one scope.
    #[must_use]
    pub fn new(scope: ScopeId, scope_name: impl Into<String>) -> Self {
        Self {
            scope,
            scope_name: scope_name.into(),
            state: Mutex::new(State {
                next_id: 1,
                ..State::default()
            }),
        }
    }

    /// Builds a store from an export.
    #[must_use]
    pub fn from_export(export: ArchiveExport) -> Self {
        let mut origin = Self::new(ScopeId(export.scope.id), export.scope.name);
        for container in export.containers {
            let id = ContainerId(container.id);
            origin.add_container(id, &container.name);
            for message in container.messages {
                origin.insert_message(ChatMessage {
                    id: MessageId(message.id),
                    container: id,
                    author: message.author,
                    content: message.content,
                    created_at: message.created_at,
                });
            }
        }
        origin
    }

    /// Snapshot of the current contents as an export.
    #[must_use]
    pub fn to_export(&self) -> ArchiveExport {
        let state = self.state();
        ArchiveExport {
            scope: ScopeExport {
                id: self.scope.0,
                name: self.scope_name.clone(),
            },
            containers: state
                .containers
                .iter()
                .map(|c| ContainerExport {
                    id: c.id.0,
                    name: c.name.clone(),
                    messages: state
                        .messages
                        .get(&c.id)
                        .into_iter()
                        .flatten()
                        .map(|m| MessageExport {
                            id: m.id.0,
                            author: m.author.clone(),
                            content: m.content.clone(),
                            created_at: m.created_at,
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Scope served by this store.
    #[must_use]
    pub const fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Scope display name.
    #[must_use]
    pub fn scope_name(&self) -> &str {
        &self.scope_name
    }

    /// Registers a container and returns it.
    pub fn add_container(&mut self, id: ContainerId, name: &str) -> Container {
        let container = Container {
            id,
            name: name.trim_start_matches('#').to_string(),
            scope: self.scope,
        };
        let state = self.state_mut();
        state.containers.retain(|c| c.id != id);
        state.containers.push(container.clone());
        state.messages.entry(id).or_default();
        container
    }

    /// Appends a message with the next free id and a synthetic timestamp.
    pub fn push_message(&mut self, container: ContainerId, author: &str, content: &str) -> MessageId {
        let id = MessageId(self.state_mut().next_id);
        let epoch = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_default();
        let offset = i64::try_from(id.0).unwrap_or(i64::MAX);
        self.insert_message(ChatMessage {
            id,
            container,
            author: author.to_string(),
            content: content.to_string(),
            created_at: epoch + Duration::seconds(offset),
        });
        id
    }

    /// Inserts a message, keeping the container's history in id order.
    pub fn insert_message(&mut self, message: ChatMessage) {
        let state = self.state_mut();
        state.next_id = state.next_id.max(message.id.0.saturating_add(1));
        let history = state.messages.entry(message.container).or_default();
        let pos = history.partition_point(|m| m.id < message.id);
        if history.get(pos).is_some_and(|m| m.id == message.id) {
            history[pos] = message;
        } else {
            history.insert(pos, message);
        }
    }

    /// Makes every history fetch of `container` fail with `error`.
    pub fn fail_history(&mut self, container: ContainerId, error: OriginError) {
        self.state_mut().history_failures.insert(container, error);
    }

    /// Makes deletion of `message` fail with `error`.
    pub fn fail_delete(&mut self, message: MessageId, error: OriginError) {
        self.state_mut().delete_failures.insert(message, error);
    }

    /// Number of history fetches issued against `container`.
    #[must_use]
    pub fn fetch_count(&self, container: ContainerId) -> usize {
        self.state().fetches.get(&container).copied().unwrap_or(0)
    }

    /// Number of messages currently held in `container`.
    #[must_use]
    pub fn message_count(&self, container: ContainerId) -> usize {
        self.state().messages.get(&container).map_or(0, Vec::len)
    }

    /// Whether a message still exists anywhere in the store.
    #[must_use]
    pub fn contains(&self, id: MessageId) -> bool {
        self.state()
            .messages
            .values()
            .any(|history| history.iter().any(|m| m.id == id))
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&mut self) -> &mut State {
        self.state.get_mut().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OriginStore for MemoryOrigin {
    async fn list_containers(&self) -> std::result::Result<Vec<Container>, OriginError> {
        Ok(self.state().containers.clone())
    }

    async fn fetch_history(
        &self,
        container: &Container,
        after: Option<MessageId>,
        limit: usize,
    ) -> std::result::Result<Vec<ChatMessage>, OriginError> {
        let mut state = self.state();
        *state.fetches.entry(container.id).or_default() += 1;

        if let Some(error) = state.history_failures.get(&container.id) {
            return Err(error.clone());
        }

        let history = state
            .messages
            .get(&container.id)
            .ok_or_else(|| OriginError::NotFound(format!("container #{}", container.name)))?;

        let start = after.map_or(0, |after| history.partition_point(|m| m.id <= after));
        let page: Vec<ChatMessage> = history.iter().skip(start).take(limit).cloned().collect();
        debug!(container = %container.name, fetched = page.len(), "Served history page");
        Ok(page)
    }

    async fn delete_message(&self, handle: &MessageHandle) -> std::result::Result<(), OriginError> {
        let mut state = self.state();
        if let Some(error) = state.delete_failures.get(&handle.id) {
            return Err(error.clone());
        }

        let history = state
            .messages
            .get_mut(&handle.container)
            .ok_or_else(|| OriginError::NotFound(format!("container #{}", handle.container_name)))?;
        let pos = history
            .iter()
            .position(|m| m.id == handle.id)
            .ok_or_else(|| OriginError::NotFound(format!("message {}", handle.id)))?;
        history.remove(pos);
        Ok(())
    }
}
