//! Keyword matching with per-keyword exclusions.
//!
//! Matching is plain substring containment on lowercased text. Keywords are
//! tried in caller order and the first one found wins; only that keyword's
//! exclusion words are then consulted.

use crate::exclusion::ScopeExclusions;
use crate::model::{Keyword, normalize};

/// Outcome of matching one message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome<'a> {
    /// A keyword matched and none of its exclusions did.
    Matched(&'a Keyword),
    /// A keyword matched but one of its exclusion words vetoed it.
    Excluded {
        /// Keyword that matched first.
        keyword: &'a Keyword,
        /// Exclusion word found in the text.
        exclusion: &'a str,
    },
    /// No keyword occurs in the text.
    NoMatch,
}

impl<'a> MatchOutcome<'a> {
    /// Whether the message counts as a match.
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    /// The matched keyword, if the message counts as a match.
    #[must_use]
    pub const fn matched_keyword(&self) -> Option<&'a Keyword> {
        match *self {
            Self::Matched(keyword) => Some(keyword),
            _ => None,
        }
    }
}

/// Decides whether `text` matches any keyword, honouring exclusions.
#[must_use]
pub fn matches<'a>(
    text: &str,
    keywords: &'a [Keyword],
    exclusions: &'a ScopeExclusions,
) -> MatchOutcome<'a> {
    let text = text.to_lowercase();

    let Some(keyword) = keywords.iter().find(|k| k.occurs_in(&text)) else {
        return MatchOutcome::NoMatch;
    };

    match exclusions
        .words_for(keyword.as_str())
        .iter()
        .find(|word| text.contains(word.as_str()))
    {
        Some(exclusion) => MatchOutcome::Excluded {
            keyword,
            exclusion: exclusion.as_str(),
        },
        None => MatchOutcome::Matched(keyword),
    }
}

/// Diagnostic report for testing one keyword against sample text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordDiagnosis {
    /// Normalized keyword under test.
    pub keyword: String,
    /// Whether the keyword occurs in the sample at all.
    pub occurs: bool,
    /// Exclusion word that vetoed the match, if any.
    pub excluded_by: Option<String>,
    /// Hex code points of the keyword, space separated.
    pub keyword_codes: String,
    /// Hex code points of the sample around the expected position,
    /// only for samples longer than [`SNIPPET_THRESHOLD`] characters.
    pub snippet_codes: Option<String>,
}

impl KeywordDiagnosis {
    /// Whether the sample would be reported as a match.
    #[must_use]
    pub const fn is_match(&self) -> bool {
        self.occurs && self.excluded_by.is_none()
    }
}

/// Samples longer than this many characters get a snippet dump.
pub const SNIPPET_THRESHOLD: usize = 100;

const SNIPPET_CONTEXT: usize = 20;
const SNIPPET_PROBE: usize = 5;

/// Runs the matcher for a single keyword and explains the result.
///
/// Character codes help spot invisible or look-alike characters that make a
/// keyword silently fail to match.
#[must_use]
pub fn diagnose(keyword: &str, sample: &str, exclusions: &ScopeExclusions) -> KeywordDiagnosis {
    let normalized = normalize(keyword);
    let sample_lower = sample.to_lowercase();

    let (occurs, excluded_by) = match Keyword::new(&normalized) {
        Ok(k) => {
            let keywords = [k];
            match matches(sample, &keywords, exclusions) {
                MatchOutcome::Matched(_) => (true, None),
                MatchOutcome::Excluded { exclusion, .. } => (true, Some(exclusion.to_string())),
                MatchOutcome::NoMatch => (false, None),
            }
        }
        Err(_) => (false, None),
    };

    KeywordDiagnosis {
        keyword_codes: char_codes(normalized.chars()),
        snippet_codes: snippet_codes(&normalized, &sample_lower),
        keyword: normalized,
        occurs,
        excluded_by,
    }
}

fn char_codes(chars: impl Iterator<Item = char>) -> String {
    chars
        .map(|c| format!("{:02x}", u32::from(c)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn snippet_codes(keyword: &str, sample: &str) -> Option<String> {
    let chars: Vec<char> = sample.chars().collect();
    if chars.len() <= SNIPPET_THRESHOLD {
        return None;
    }

    let keyword_len = keyword.chars().count();
    let pos = if keyword_len >= SNIPPET_PROBE {
        let probe: String = keyword.chars().take(SNIPPET_PROBE).collect();
        sample
            .find(&probe)
            .map_or(0, |byte_pos| sample[..byte_pos].chars().count())
    } else {
        0
    };

    let start = pos.saturating_sub(SNIPPET_CONTEXT);
    let end = (pos + keyword_len + SNIPPET_CONTEXT).min(chars.len());
    Some(char_codes(chars[start..end].iter().copied()))
}
