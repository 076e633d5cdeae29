//! Domain models shared by the scan, result and deletion layers.

use std::fmt;
use std::ops::Range;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Identifier of the administrative scope (one server/community).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(pub u64);

/// Identifier of a container (one channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(pub u64);

/// Stable identity of a message in the origin store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered, independently paginated source of messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Container identifier.
    pub id: ContainerId,
    /// Display name (without the leading `#`).
    pub name: String,
    /// Scope the container belongs to.
    pub scope: ScopeId,
}

/// A message as returned by the origin store's history fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Stable identity.
    pub id: MessageId,
    /// Container holding the message.
    pub container: ContainerId,
    /// Author display name.
    pub author: String,
    /// Body text.
    pub content: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Builds the handle used to address this message after the scan.
    #[must_use]
    pub fn handle(&self, container: &Container) -> MessageHandle {
        MessageHandle {
            id: self.id,
            container: container.id,
            container_name: container.name.clone(),
        }
    }
}

/// Opaque reference to an origin message, sufficient to delete it later.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageHandle {
    /// Stable identity of the message.
    pub id: MessageId,
    /// Container holding the message.
    pub container: ContainerId,
    /// Container name, kept for log and status output.
    pub container_name: String,
}

/// Normalizes free text for matching: trimmed and lowercased.
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// A case-normalized, trimmed search keyword.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Keyword(String);

impl Keyword {
    /// Normalizes and validates a keyword.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyKeyword`] if nothing is left after trimming.
    pub fn new(raw: &str) -> Result<Self> {
        let normalized = normalize(raw);
        if normalized.is_empty() {
            return Err(Error::EmptyKeyword);
        }
        Ok(Self(normalized))
    }

    /// Parses a list of raw keywords, dropping empty ones but keeping order.
    #[must_use]
    pub fn parse_all<'a, I>(raw: I) -> Vec<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        raw.into_iter().filter_map(|k| Self::new(k).ok()).collect()
    }

    /// The normalized keyword text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the keyword occurs in already-lowercased text.
    #[must_use]
    pub fn occurs_in(&self, normalized_text: &str) -> bool {
        normalized_text.contains(self.0.as_str())
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Keyword {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One matched message, numbered within its search run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    index: usize,
    handle: MessageHandle,
    keyword: Keyword,
    text: String,
}

impl MatchRecord {
    /// Creates a record for a matched message.
    #[must_use]
    pub fn new(index: usize, container: &Container, message: &ChatMessage, keyword: Keyword) -> Self {
        Self {
            index,
            handle: message.handle(container),
            keyword,
            text: render_match_text(&container.name, message),
        }
    }

    /// 1-based sequence index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Handle of the origin message.
    #[must_use]
    pub const fn handle(&self) -> &MessageHandle {
        &self.handle
    }

    /// Identity of the origin message.
    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.handle.id
    }

    /// Keyword that produced the match.
    #[must_use]
    pub const fn keyword(&self) -> &Keyword {
        &self.keyword
    }

    /// Display text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Same record under a new index.
    #[must_use]
    pub(crate) fn renumbered(self, index: usize) -> Self {
        Self { index, ..self }
    }
}

/// Renders `[container] author: body (YYYY-mm-dd HH:MM:SS)`.
#[must_use]
pub fn render_match_text(container_name: &str, message: &ChatMessage) -> String {
    format!(
        "[{}] {}: {} ({})",
        container_name,
        message.author,
        message.content,
        message.created_at.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Byte ranges of every case-insensitive keyword occurrence in `text`.
///
/// Ranges are sorted and non-overlapping; where two keywords overlap the
/// earlier occurrence wins. Ranges always cover whole characters of `text`,
/// also when lowercasing changes a character's byte length.
#[must_use]
pub fn highlight_spans(text: &str, keywords: &[Keyword]) -> Vec<Range<usize>> {
    let mut haystack = String::with_capacity(text.len());
    // Original char range behind each byte of `haystack`.
    let mut source: Vec<Range<usize>> = Vec::with_capacity(text.len());
    for (start, c) in text.char_indices() {
        let end = start + c.len_utf8();
        for lower in c.to_lowercase() {
            haystack.push(lower);
            source.resize(haystack.len(), start..end);
        }
    }

    let mut spans: Vec<Range<usize>> = keywords
        .iter()
        .flat_map(|keyword| {
            haystack
                .match_indices(keyword.as_str())
                .filter_map(|(start, m)| {
                    let first = source.get(start)?;
                    let last = source.get(start + m.len() - 1)?;
                    Some(first.start..last.end)
                })
        })
        .collect();
    spans.sort_by_key(|r| (r.start, std::cmp::Reverse(r.end)));

    let mut merged: Vec<Range<usize>> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last() {
            Some(last) if span.start < last.end => {}
            _ => merged.push(span),
        }
    }
    merged
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_message() -> ChatMessage {
        ChatMessage {
            id: MessageId(42),
            container: ContainerId(7),
            author: "mod#0001".to_string(),
            content: "Selling ALT accounts".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap(),
        }
    }

    fn general() -> Container {
        Container {
            id: ContainerId(7),
            name: "general".to_string(),
            scope: ScopeId(1),
        }
    }

    #[test]
    fn test_keyword_normalized() {
        let keyword = Keyword::new("  ALT ").unwrap();
        assert_eq!(keyword.as_str(), "alt");
    }

    #[test]
    fn test_keyword_empty_rejected() {
        assert!(matches!(Keyword::new("   "), Err(Error::EmptyKeyword)));
    }

    #[test]
    fn test_parse_all_keeps_order() {
        let keywords = Keyword::parse_all(["Spam", " ", "SCAM"]);
        let names: Vec<_> = keywords.iter().map(Keyword::as_str).collect();
        assert_eq!(names, vec!["spam", "scam"]);
    }

    #[test]
    fn test_render_match_text() {
        let text = render_match_text("general", &sample_message());
        assert_eq!(
            text,
            "[general] mod#0001: Selling ALT accounts (2024-03-09 14:05:07)"
        );
    }

    #[test]
    fn test_match_record_carries_handle() {
        let record = MatchRecord::new(
            3,
            &general(),
            &sample_message(),
            Keyword::new("alt").unwrap(),
        );

        assert_eq!(record.index(), 3);
        assert_eq!(record.id(), MessageId(42));
        assert_eq!(record.handle().container, ContainerId(7));
        assert_eq!(record.handle().container_name, "general");
        assert!(record.text().starts_with("[general]"));

        let moved = record.renumbered(1);
        assert_eq!(moved.index(), 1);
        assert_eq!(moved.id(), MessageId(42));
    }

    #[test]
    fn test_highlight_spans_case_insensitive() {
        let keywords = Keyword::parse_all(["alt"]);
        let spans = highlight_spans("Alt and ALT and alt", &keywords);
        assert_eq!(spans, vec![0..3, 8..11, 16..19]);
    }

    #[test]
    fn test_highlight_spans_overlap_keeps_first() {
        let keywords = Keyword::parse_all(["alter", "alt"]);
        let spans = highlight_spans("altered", &keywords);
        assert_eq!(spans, vec![0..5]);
    }

    #[test]
    fn test_highlight_spans_when_lowercase_changes_length() {
        let text = "İstanbul ALT deal";
        let spans = highlight_spans(text, &Keyword::parse_all(["alt"]));
        assert_eq!(spans, vec![10..13]);
        assert_eq!(&text[10..13], "ALT");

        let spans = highlight_spans(text, &Keyword::parse_all(["İst"]));
        assert_eq!(spans, vec![0..4]);
    }
}
