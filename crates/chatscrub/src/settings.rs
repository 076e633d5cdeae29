//! Persistent console settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chatscrub_core::ScanConfig;
use chatscrub_core::config::{DEFAULT_BATCH_SIZE, DEFAULT_FETCH_PAGE_SIZE, DEFAULT_RESULT_CAP};
use chatscrub_core::results::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Page sizes offered in the help text.
pub const PAGE_SIZE_CHOICES: [usize; 4] = [10, 25, 50, 100];

/// Settings that persist across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrubSettings {
    /// Matches per batch handed to the result view.
    pub batch_size: usize,
    /// Default match cap of a search.
    pub result_cap: usize,
    /// Messages requested per history fetch.
    pub fetch_page_size: usize,
    /// Initial results per page.
    pub page_size: usize,
    /// Progress refresh interval while searching.
    pub progress_interval_ms: u64,
    /// Exclusion list file; platform data directory when unset.
    pub exclusions_path: Option<PathBuf>,
}

impl Default for ScrubSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            result_cap: DEFAULT_RESULT_CAP,
            fetch_page_size: DEFAULT_FETCH_PAGE_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            progress_interval_ms: 500,
            exclusions_path: None,
        }
    }
}

impl ScrubSettings {
    /// Scan tunables for the core.
    #[must_use]
    pub const fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            batch_size: self.batch_size,
            result_cap: self.result_cap,
            fetch_page_size: self.fetch_page_size,
        }
    }

    /// Progress refresh interval, at least one millisecond.
    #[must_use]
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms.max(1))
    }

    /// Where exclusion lists are stored.
    #[must_use]
    pub fn exclusions_path(&self) -> PathBuf {
        self.exclusions_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("chatscrub")
                .join("exclusions.json")
        })
    }
}

/// Default settings file location.
#[must_use]
pub fn settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chatscrub")
        .join("settings.json")
}

/// Loads settings from `path`; a missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub async fn load_settings(path: &Path) -> anyhow::Result<ScrubSettings> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Ok(ScrubSettings::default());
    }

    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let settings = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    info!(path = %path.display(), "Loaded settings");
    Ok(settings)
}

/// Loads settings, falling back to defaults on any error.
pub async fn load_settings_or_default(path: &Path) -> ScrubSettings {
    match load_settings(path).await {
        Ok(settings) => settings,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "Using default settings");
            ScrubSettings::default()
        }
    }
}
