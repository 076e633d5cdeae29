//! Sequential keyword scan over container histories.
//!
//! The scanner walks each container oldest-first, one history page at a
//! time, and numbers matches densely from 1. Matches are handed over in
//! batches through an unbounded channel; a batch is moved as a single value,
//! so the receiving side never sees part of one. The scanner yields to the
//! runtime after every page and every flushed batch.
//!
//! Failures are per container: a container whose history cannot be read is
//! reported and skipped, and the scan carries on with the next one.

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::ScanConfig;
use crate::exclusion::ExclusionStore;
use crate::matcher::matches;
use crate::model::{Container, Keyword, MatchRecord};
use crate::origin::{OriginError, OriginStore};
use crate::results::ResultBatch;
use crate::session::{SearchSession, SessionSnapshot};

/// Something the scan wants the presentation side to know.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// Scanning of a container began.
    ContainerStarted {
        /// Container name.
        name: String,
    },
    /// A batch of matches, ready to append to the result set.
    Batch(ResultBatch),
    /// A container could not be scanned (completely or partially).
    ContainerFailed(ContainerFailure),
    /// The match cap was reached; sent at most once per scan.
    CapReached {
        /// The cap in effect.
        cap: usize,
    },
}

/// A container whose history could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerFailure {
    /// Container name.
    pub container: String,
    /// Error reported by the origin store.
    pub error: OriginError,
}

impl ContainerFailure {
    /// Whether the failure was a permission denial.
    #[must_use]
    pub const fn is_permission_denied(&self) -> bool {
        matches!(self.error, OriginError::PermissionDenied(_))
    }
}

/// Final outcome of a scan.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Frozen session counters.
    pub session: SessionSnapshot,
    /// Containers that failed.
    pub failures: Vec<ContainerFailure>,
    /// Whether the match cap stopped the scan early.
    pub cap_reached: bool,
}

/// Drives one keyword scan against an origin store.
pub struct Scanner<'a, S, C = SystemClock> {
    store: &'a S,
    exclusions: &'a ExclusionStore,
    config: ScanConfig,
    clock: C,
    events: mpsc::UnboundedSender<ScanEvent>,
    progress: Option<watch::Sender<SessionSnapshot>>,
}

impl<'a, S: OriginStore> Scanner<'a, S> {
    /// Creates a scanner that reports batches and notices on `events`.
    #[must_use]
    pub fn new(
        store: &'a S,
        exclusions: &'a ExclusionStore,
        config: ScanConfig,
        events: mpsc::UnboundedSender<ScanEvent>,
    ) -> Self {
        Self {
            store,
            exclusions,
            config: config.normalized(),
            clock: SystemClock,
            events,
            progress: None,
        }
    }
}

impl<'a, S: OriginStore, C: Clock> Scanner<'a, S, C> {
    /// Uses another clock for session timing.
    #[must_use]
    pub fn with_clock<C2: Clock>(self, clock: C2) -> Scanner<'a, S, C2> {
        Scanner {
            store: self.store,
            exclusions: self.exclusions,
            config: self.config,
            clock,
            events: self.events,
            progress: self.progress,
        }
    }

    /// Publishes session snapshots on `progress` while scanning.
    #[must_use]
    pub fn with_progress(mut self, progress: watch::Sender<SessionSnapshot>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Scans `containers` in order for `keywords`.
    pub async fn scan(&self, containers: &[Container], keywords: &[Keyword]) -> ScanReport {
        let config = self.config;
        let mut session = SearchSession::start(containers.len(), config.result_cap, &self.clock);
        let mut batch = ResultBatch::new();
        let mut failures = Vec::new();
        let mut cap_reached = false;
        self.publish(&session);

        info!(
            containers = containers.len(),
            keywords = ?keywords.iter().map(Keyword::as_str).collect::<Vec<_>>(),
            cap = config.result_cap,
            "Starting scan"
        );

        'containers: for container in containers {
            session.enter_container(&container.name);
            self.publish(&session);
            self.emit(ScanEvent::ContainerStarted {
                name: container.name.clone(),
            });
            debug!(container = %container.name, "Scanning container");

            let exclusions = self.exclusions.scope(container.scope);
            let mut after = None;

            loop {
                let page = match self
                    .store
                    .fetch_history(container, after, config.fetch_page_size)
                    .await
                {
                    Ok(page) => page,
                    Err(error) => {
                        warn!(container = %container.name, error = %error, "Skipping container");
                        let failure = ContainerFailure {
                            container: container.name.clone(),
                            error,
                        };
                        failures.push(failure.clone());
                        self.emit(ScanEvent::ContainerFailed(failure));
                        continue 'containers;
                    }
                };
                let exhausted = page.len() < config.fetch_page_size;

                for message in &page {
                    after = Some(message.id);
                    session.record_scanned();

                    let Some(keyword) =
                        matches(&message.content, keywords, exclusions).matched_keyword()
                    else {
                        continue;
                    };

                    let index = session.record_match();
                    debug!(index, keyword = %keyword, container = %container.name, "Match");
                    batch.insert(
                        index,
                        MatchRecord::new(index, container, message, keyword.clone()),
                    );

                    if batch.len() >= config.batch_size {
                        self.flush(&mut batch);
                        self.publish(&session);
                        tokio::task::yield_now().await;
                    }

                    if session.cap_reached() {
                        cap_reached = true;
                        break 'containers;
                    }
                }

                self.publish(&session);
                if exhausted {
                    break;
                }
                tokio::task::yield_now().await;
            }
        }

        if cap_reached {
            warn!(cap = config.result_cap, "Reached maximum result limit, stopping scan");
            self.emit(ScanEvent::CapReached {
                cap: config.result_cap,
            });
        }

        self.flush(&mut batch);
        session.finish(&self.clock);
        self.publish(&session);

        info!(
            scanned = session.scanned(),
            matched = session.matched(),
            failed_containers = failures.len(),
            "Scan finished"
        );

        ScanReport {
            session: session.snapshot(),
            failures,
            cap_reached,
        }
    }

    fn flush(&self, batch: &mut ResultBatch) {
        if batch.is_empty() {
            return;
        }
        self.emit(ScanEvent::Batch(std::mem::take(batch)));
    }

    fn emit(&self, event: ScanEvent) {
        if self.events.send(event).is_err() {
            debug!("Scan event receiver dropped");
        }
    }

    fn publish(&self, session: &SearchSession) {
        if let Some(progress) = &self.progress {
            progress.send_replace(session.snapshot());
        }
    }
}
