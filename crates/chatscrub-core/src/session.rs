//! Search session counters and progress reporting.
//!
//! The scan driver owns the live [`SearchSession`]. Everyone else sees
//! [`SessionSnapshot`] values published through a `tokio::sync::watch`
//! channel, so a reader polling on a timer never observes a half-updated
//! set of counters.

use std::fmt;
use std::time::{Duration, Instant};

use tokio::sync::watch;

use crate::clock::{Clock, format_minutes_seconds};

/// Read-only copy of the session counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Whether a scan is running.
    pub in_progress: bool,
    /// Messages visited so far.
    pub scanned: u64,
    /// Matches accepted so far.
    pub matched: usize,
    /// Containers targeted by the scan.
    pub containers_total: usize,
    /// Container currently being scanned.
    pub current_container: Option<String>,
    /// When the scan started.
    pub started_at: Option<Instant>,
    /// When the scan ended.
    pub finished_at: Option<Instant>,
    /// Match cap for the scan.
    pub result_cap: usize,
}

impl SessionSnapshot {
    /// Time spent so far (running) or in total (finished).
    #[must_use]
    pub fn elapsed(&self, clock: &dyn Clock) -> Duration {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            (Some(start), None) => clock.elapsed(start),
            _ => Duration::ZERO,
        }
    }
}

/// Live counters of one scan run.
///
/// Counters only grow while the session is running; [`SearchSession::finish`]
/// freezes them.
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    state: SessionSnapshot,
}

impl SearchSession {
    /// Starts a fresh session with all counters at zero.
    #[must_use]
    pub fn start(containers_total: usize, result_cap: usize, clock: &dyn Clock) -> Self {
        Self {
            state: SessionSnapshot {
                in_progress: true,
                containers_total,
                started_at: Some(clock.now()),
                result_cap,
                ..SessionSnapshot::default()
            },
        }
    }

    /// Records the container now being scanned.
    pub fn enter_container(&mut self, name: &str) {
        if self.state.in_progress {
            self.state.current_container = Some(name.to_string());
        }
    }

    /// Counts one visited message.
    pub const fn record_scanned(&mut self) {
        if self.state.in_progress {
            self.state.scanned += 1;
        }
    }

    /// Counts one match and returns its 1-based sequence index.
    pub const fn record_match(&mut self) -> usize {
        if self.state.in_progress {
            self.state.matched += 1;
        }
        self.state.matched
    }

    /// Whether the match cap has been reached.
    #[must_use]
    pub const fn cap_reached(&self) -> bool {
        self.state.matched >= self.state.result_cap
    }

    /// Freezes the session. Only the first call sets the end time.
    pub fn finish(&mut self, clock: &dyn Clock) {
        if self.state.finished_at.is_none() {
            self.state.finished_at = Some(clock.now());
        }
        self.state.in_progress = false;
    }

    /// Messages visited.
    #[must_use]
    pub const fn scanned(&self) -> u64 {
        self.state.scanned
    }

    /// Matches accepted.
    #[must_use]
    pub const fn matched(&self) -> usize {
        self.state.matched
    }

    /// Copy of the counters for readers.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.clone()
    }
}

/// Creates the channel the scan driver publishes snapshots on.
#[must_use]
pub fn progress_channel() -> (
    watch::Sender<SessionSnapshot>,
    watch::Receiver<SessionSnapshot>,
) {
    watch::channel(SessionSnapshot::default())
}

/// Human-readable progress, as shown by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    /// Headline ("Searching...", "Search complete!", "Ready").
    pub status: String,
    /// Detail lines.
    pub details: Vec<String>,
    /// Elapsed or total time line, if a search has run.
    pub elapsed: Option<String>,
}

impl ProgressView {
    /// Renders a snapshot.
    #[must_use]
    pub fn render(snapshot: &SessionSnapshot, clock: &dyn Clock) -> Self {
        let elapsed = format_minutes_seconds(snapshot.elapsed(clock));

        if snapshot.in_progress {
            return Self {
                status: "Searching...".to_string(),
                details: vec![
                    format!(
                        "Scanning channel: {}",
                        snapshot.current_container.as_deref().unwrap_or("")
                    ),
                    format!("Messages scanned: {}", snapshot.scanned),
                    format!("Matches found: {}", snapshot.matched),
                ],
                elapsed: Some(format!("Time elapsed: {elapsed}")),
            };
        }

        if snapshot.scanned > 0 {
            return Self {
                status: "Search complete!".to_string(),
                details: vec![
                    format!(
                        "Scanned {} messages across {} channels",
                        snapshot.scanned, snapshot.containers_total
                    ),
                    format!("Found {} matches", snapshot.matched),
                ],
                elapsed: snapshot
                    .finished_at
                    .map(|_| format!("Total time: {elapsed}")),
            };
        }

        Self {
            status: "Ready".to_string(),
            details: Vec::new(),
            elapsed: None,
        }
    }
}

impl fmt::Display for ProgressView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status)?;
        for line in &self.details {
            write!(f, "\n  {line}")?;
        }
        if let Some(elapsed) = &self.elapsed {
            write!(f, "\n  {elapsed}")?;
        }
        Ok(())
    }
}

/// Reads published snapshots on behalf of the presentation context.
#[derive(Debug, Clone)]
pub struct ProgressReporter<C> {
    receiver: watch::Receiver<SessionSnapshot>,
    clock: C,
}

impl<C: Clock> ProgressReporter<C> {
    /// Wraps a snapshot receiver.
    #[must_use]
    pub const fn new(receiver: watch::Receiver<SessionSnapshot>, clock: C) -> Self {
        Self { receiver, clock }
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.receiver.borrow().clone()
    }

    /// Renders the latest snapshot.
    #[must_use]
    pub fn view(&self) -> ProgressView {
        ProgressView::render(&self.snapshot(), &self.clock)
    }
}
