//! Per-scope, per-keyword exclusion lists.
//!
//! An exclusion word suppresses a match for one keyword: with `alt` excluded
//! by `altered`, a message containing "altered" never matches `alt`, while
//! other keywords are unaffected.
//!
//! The store is loaded once at startup and written back in full after every
//! change. On disk it is a JSON object keyed by scope id:
//!
//! ```json
//! { "1234": { "alt": ["altered", "alternative"] } }
//! ```

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

use tracing::{debug, info, warn};

use crate::Result;
use crate::model::{Keyword, ScopeId, normalize};

/// On-disk representation: scope id -> keyword -> ordered words.
type ExclusionDocument = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Exclusion lists of a single scope, keyed by normalized keyword.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeExclusions {
    lists: BTreeMap<String, Vec<String>>,
}

static EMPTY_SCOPE: ScopeExclusions = ScopeExclusions::new();

impl ScopeExclusions {
    /// Creates an empty set of lists.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lists: BTreeMap::new(),
        }
    }

    /// Builds lists from `(keyword, words)` pairs, normalizing everything.
    #[must_use]
    pub fn from_pairs<'a, I, W>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, W)>,
        W: IntoIterator<Item = &'a str>,
    {
        let mut scope = Self::new();
        for (keyword, words) in pairs {
            let keyword = normalize(keyword);
            if keyword.is_empty() {
                continue;
            }
            for word in words {
                scope.insert(&keyword, &normalize(word));
            }
        }
        scope
    }

    /// Exclusion words registered for one keyword, in insertion order.
    #[must_use]
    pub fn words_for(&self, keyword: &str) -> &[String] {
        self.lists.get(keyword).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether no keyword has any exclusion.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Iterates `(keyword, words)` in keyword order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.lists.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Inserts a normalized word; returns false if it was already present.
    fn insert(&mut self, keyword: &str, word: &str) -> bool {
        if word.is_empty() {
            return false;
        }
        let words = self.lists.entry(keyword.to_string()).or_default();
        if words.iter().any(|w| w == word) {
            return false;
        }
        words.push(word.to_string());
        true
    }
}

/// Result of adding exclusion words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddOutcome {
    /// Words that were not present before.
    pub added: Vec<String>,
    /// Words that were already registered (or repeated in the input).
    pub already_present: Vec<String>,
    /// Whether the store was written to disk (true when nothing changed).
    pub persisted: bool,
}

/// Result of removing exclusion words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveOutcome {
    /// Words that were removed.
    pub removed: Vec<String>,
    /// Whether the store was written to disk (true when nothing changed).
    pub persisted: bool,
}

/// One keyword's exclusion list as returned by [`ExclusionStore::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionList {
    /// Normalized keyword.
    pub keyword: String,
    /// Exclusion words in insertion order.
    pub words: Vec<String>,
}

/// Durable mapping from (scope, keyword) to exclusion words.
#[derive(Debug, Default)]
pub struct ExclusionStore {
    path: Option<PathBuf>,
    scopes: BTreeMap<ScopeId, ScopeExclusions>,
}

impl ExclusionStore {
    /// Creates a store that never touches the filesystem.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads the store from `path`.
    ///
    /// A missing, unreadable or malformed file yields an empty store that
    /// will still save to `path`.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let scopes = match read_document(&path).await {
            Ok(Some(document)) => {
                let scopes = scopes_from_document(document);
                info!(path = %path.display(), scopes = scopes.len(), "Loaded exclusion lists");
                scopes
            }
            Ok(None) => {
                debug!(path = %path.display(), "No exclusion file yet, starting empty");
                BTreeMap::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load exclusion lists, starting empty");
                BTreeMap::new()
            }
        };

        Self {
            path: Some(path),
            scopes,
        }
    }

    /// File the store saves to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Exclusion lists of one scope (empty if none are registered).
    #[must_use]
    pub fn scope(&self, scope: ScopeId) -> &ScopeExclusions {
        self.scopes.get(&scope).unwrap_or(&EMPTY_SCOPE)
    }

    /// Adds exclusion words for a keyword.
    ///
    /// # Errors
    ///
    /// Returns an error if the keyword is empty after normalization.
    pub async fn add<'a, I>(
        &mut self,
        scope: ScopeId,
        keyword: &str,
        words: I,
    ) -> Result<AddOutcome>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keyword = Keyword::new(keyword)?;
        let lists = self.scopes.entry(scope).or_default();

        let mut outcome = AddOutcome::default();
        for word in words.into_iter().map(normalize).filter(|w| !w.is_empty()) {
            if lists.insert(keyword.as_str(), &word) {
                outcome.added.push(word);
            } else {
                outcome.already_present.push(word);
            }
        }

        // An add with nothing valid must not leave an empty keyword entry behind.
        if lists.words_for(keyword.as_str()).is_empty() {
            lists.lists.remove(keyword.as_str());
        }
        if lists.is_empty() {
            self.scopes.remove(&scope);
        }

        outcome.persisted = outcome.added.is_empty() || self.save_or_warn().await;
        Ok(outcome)
    }

    /// Adds a comma-separated list of exclusion words.
    ///
    /// # Errors
    ///
    /// Returns an error if the keyword is empty after normalization.
    pub async fn bulk_add(
        &mut self,
        scope: ScopeId,
        keyword: &str,
        raw: &str,
    ) -> Result<AddOutcome> {
        self.add(scope, keyword, raw.split(',')).await
    }

    /// Removes one word, or the whole list for the keyword when `word` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the keyword is empty after normalization.
    pub async fn remove(
        &mut self,
        scope: ScopeId,
        keyword: &str,
        word: Option<&str>,
    ) -> Result<RemoveOutcome> {
        let keyword = Keyword::new(keyword)?;
        let Some(lists) = self.scopes.get_mut(&scope) else {
            return Ok(RemoveOutcome {
                removed: Vec::new(),
                persisted: true,
            });
        };

        let removed = match word.map(normalize) {
            None => lists.lists.remove(keyword.as_str()).unwrap_or_default(),
            Some(word) => {
                let mut removed = Vec::new();
                if let Some(words) = lists.lists.get_mut(keyword.as_str())
                    && let Some(pos) = words.iter().position(|w| *w == word)
                {
                    removed.push(words.remove(pos));
                    if words.is_empty() {
                        lists.lists.remove(keyword.as_str());
                    }
                }
                removed
            }
        };

        if lists.is_empty() {
            self.scopes.remove(&scope);
        }

        let persisted = removed.is_empty() || self.save_or_warn().await;
        Ok(RemoveOutcome { removed, persisted })
    }

    /// Lists exclusions in a scope, optionally for one keyword only.
    #[must_use]
    pub fn list(&self, scope: ScopeId, keyword: Option<&str>) -> Vec<ExclusionList> {
        let lists = self.scope(scope);
        match keyword.map(normalize) {
            Some(keyword) => {
                let words = lists.words_for(&keyword);
                if words.is_empty() {
                    Vec::new()
                } else {
                    vec![ExclusionList {
                        keyword,
                        words: words.to_vec(),
                    }]
                }
            }
            None => lists
                .iter()
                .map(|(keyword, words)| ExclusionList {
                    keyword: keyword.to_string(),
                    words: words.to_vec(),
                })
                .collect(),
        }
    }

    /// Writes the whole store to its file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let document: ExclusionDocument = self
            .scopes
            .iter()
            .map(|(scope, lists)| (scope.to_string(), lists.lists.clone()))
            .collect();
        let contents = serde_json::to_string_pretty(&document)?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, contents).await?;
        fs::rename(&tmp, path).await?;

        debug!(path = %path.display(), "Saved exclusion lists");
        Ok(())
    }

    async fn save_or_warn(&self) -> bool {
        match self.save().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to save exclusion lists, keeping changes in memory");
                false
            }
        }
    }
}

async fn read_document(path: &Path) -> Result<Option<ExclusionDocument>> {
    let contents = match fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&contents)?))
}

fn scopes_from_document(document: ExclusionDocument) -> BTreeMap<ScopeId, ScopeExclusions> {
    let mut scopes = BTreeMap::new();
    for (scope, lists) in document {
        let Ok(id) = scope.parse::<u64>() else {
            warn!(scope = %scope, "Skipping exclusion lists with a non-numeric scope id");
            continue;
        };
        let lists = ScopeExclusions::from_pairs(
            lists
                .iter()
                .map(|(keyword, words)| (keyword.as_str(), words.iter().map(String::as_str))),
        );
        if !lists.is_empty() {
            scopes.insert(ScopeId(id), lists);
        }
    }
    scopes
}
