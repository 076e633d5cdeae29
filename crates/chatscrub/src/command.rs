//! Console command parsing.
//!
//! Commands are one line each, optionally prefixed with `!`. Parsing never
//! touches application state; a rejected line leaves everything unchanged.

use chatscrub_core::ContainerId;
use thiserror::Error;

const FIND_USAGE: &str = "Usage: find keyword1 keyword2 ... #channel1 #channel2 [limit=N]";
const ADD_USAGE: &str = "Usage: addexclude <keyword> <word> [word...]";
const REMOVE_USAGE: &str = "Usage: removeexclude <keyword> [word]";
const BULK_USAGE: &str = "Usage: bulkexclude <keyword> <word1, word2, ...>";
const TEST_USAGE: &str = "Usage: testkeyword <keyword> <sample text>";
const PAGE_USAGE: &str = "Usage: page <number>";
const PAGE_SIZE_USAGE: &str = "Usage: pagesize <number>";
const CHECK_USAGE: &str = "Usage: check|uncheck <index> [index...]";

/// A rejected command line. The message doubles as usage help.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Unrecognized command word.
    #[error("Unknown command `{0}`. Type `help` for a list of commands.")]
    Unknown(String),

    /// Missing or superfluous arguments.
    #[error("{0}")]
    Usage(&'static str),

    /// `limit=` with something other than a positive number.
    #[error("Invalid limit `{0}`: expected a positive number.")]
    InvalidLimit(String),

    /// A `<#...>` reference that is not a channel id.
    #[error("Invalid channel reference `{0}`. Use `#channel-name` or `<#channel_id>`.")]
    InvalidContainer(String),

    /// A page, page size or index that is not a positive number.
    #[error("Invalid number `{value}`. {usage}")]
    InvalidNumber {
        /// Offending token.
        value: String,
        /// Usage line of the command.
        usage: &'static str,
    },
}

/// How a `find` argument names a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerRef {
    /// `#name`
    Name(String),
    /// `<#id>`
    Id(ContainerId),
}

/// Arguments of `find`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindArgs {
    /// Raw keywords in the order given.
    pub keywords: Vec<String>,
    /// Containers in the order given.
    pub containers: Vec<ContainerRef>,
    /// Match cap for this search only.
    pub limit: Option<usize>,
}

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Search containers for keywords.
    Find(FindArgs),
    /// Add exclusion words for a keyword.
    AddExclude {
        /// Keyword the words apply to.
        keyword: String,
        /// Words to add.
        words: Vec<String>,
    },
    /// Remove one exclusion word, or all of them.
    RemoveExclude {
        /// Keyword the word applies to.
        keyword: String,
        /// Word to remove; every word when absent.
        word: Option<String>,
    },
    /// List exclusions.
    ListExcludes {
        /// Restrict to one keyword.
        keyword: Option<String>,
    },
    /// Add a comma-separated list of exclusion words.
    BulkExclude {
        /// Keyword the words apply to.
        keyword: String,
        /// Raw comma-separated list.
        words: String,
    },
    /// Explain whether a keyword matches sample text.
    TestKeyword {
        /// Keyword under test.
        keyword: String,
        /// Sample text.
        sample: String,
    },
    /// Go to a page.
    Page(usize),
    /// Next page.
    Next,
    /// Previous page.
    Prev,
    /// Change results per page.
    PageSize(usize),
    /// Check results by index.
    Check(Vec<usize>),
    /// Uncheck results by index.
    Uncheck(Vec<usize>),
    /// Check every result on the page.
    CheckAll,
    /// Uncheck every result on the page.
    UncheckAll,
    /// Redisplay the current page.
    Show,
    /// Delete checked results.
    Delete,
    /// Show search progress.
    Progress,
    /// List commands.
    Help,
    /// Leave the console.
    Quit,
}

impl Command {
    /// Parses one non-empty command line.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] describing the expected usage.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let line = line.strip_prefix('!').unwrap_or(line);
        let (name, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(name, rest)| (name, rest.trim()));
        let args: Vec<&str> = rest.split_whitespace().collect();

        match name.to_lowercase().as_str() {
            "find" => parse_find(&args).map(Self::Find),
            "addexclude" => match args.split_first() {
                Some((keyword, words)) if !words.is_empty() => Ok(Self::AddExclude {
                    keyword: (*keyword).to_string(),
                    words: words.iter().map(ToString::to_string).collect(),
                }),
                _ => Err(CommandError::Usage(ADD_USAGE)),
            },
            "removeexclude" => match args.as_slice() {
                [keyword] => Ok(Self::RemoveExclude {
                    keyword: (*keyword).to_string(),
                    word: None,
                }),
                [keyword, word] => Ok(Self::RemoveExclude {
                    keyword: (*keyword).to_string(),
                    word: Some((*word).to_string()),
                }),
                _ => Err(CommandError::Usage(REMOVE_USAGE)),
            },
            "listexcludes" => Ok(Self::ListExcludes {
                keyword: args.first().map(ToString::to_string),
            }),
            "bulkexclude" => match split_head(rest) {
                Some((keyword, words)) => Ok(Self::BulkExclude {
                    keyword: keyword.to_string(),
                    words: words.to_string(),
                }),
                None => Err(CommandError::Usage(BULK_USAGE)),
            },
            "testkeyword" => match split_head(rest) {
                Some((keyword, sample)) => Ok(Self::TestKeyword {
                    keyword: keyword.to_string(),
                    sample: sample.to_string(),
                }),
                None => Err(CommandError::Usage(TEST_USAGE)),
            },
            "page" => single_number(&args, PAGE_USAGE).map(Self::Page),
            "pagesize" => single_number(&args, PAGE_SIZE_USAGE).map(Self::PageSize),
            "next" => Ok(Self::Next),
            "prev" => Ok(Self::Prev),
            "check" => indices(&args).map(Self::Check),
            "uncheck" => indices(&args).map(Self::Uncheck),
            "checkall" => Ok(Self::CheckAll),
            "uncheckall" => Ok(Self::UncheckAll),
            "show" => Ok(Self::Show),
            "delete" => Ok(Self::Delete),
            "progress" => Ok(Self::Progress),
            "help" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Splits off the first word; `None` unless something follows it.
fn split_head(rest: &str) -> Option<(&str, &str)> {
    let (head, tail) = rest.split_once(char::is_whitespace)?;
    let tail = tail.trim();
    (!tail.is_empty()).then_some((head, tail))
}

fn parse_find(args: &[&str]) -> Result<FindArgs, CommandError> {
    if args.len() < 2 {
        return Err(CommandError::Usage(FIND_USAGE));
    }

    let mut find = FindArgs {
        keywords: Vec::new(),
        containers: Vec::new(),
        limit: None,
    };

    for arg in args {
        if let Some(value) = arg.strip_prefix("limit=") {
            match value.parse::<usize>() {
                Ok(limit) if limit > 0 => find.limit = Some(limit),
                _ => return Err(CommandError::InvalidLimit(value.to_string())),
            }
        } else if let Some(reference) = arg.strip_prefix("<#") {
            let id = reference
                .strip_suffix('>')
                .and_then(|id| id.parse::<u64>().ok())
                .ok_or_else(|| CommandError::InvalidContainer((*arg).to_string()))?;
            find.containers.push(ContainerRef::Id(ContainerId(id)));
        } else if let Some(name) = arg.strip_prefix('#') {
            find.containers.push(ContainerRef::Name(name.to_string()));
        } else {
            find.keywords.push((*arg).to_string());
        }
    }

    if find.keywords.is_empty() || find.containers.is_empty() {
        return Err(CommandError::Usage(FIND_USAGE));
    }
    Ok(find)
}

fn positive(token: &str, usage: &'static str) -> Result<usize, CommandError> {
    match token.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandError::InvalidNumber {
            value: token.to_string(),
            usage,
        }),
    }
}

fn single_number(args: &[&str], usage: &'static str) -> Result<usize, CommandError> {
    match args {
        [token] => positive(token, usage),
        _ => Err(CommandError::Usage(usage)),
    }
}

fn indices(args: &[&str]) -> Result<Vec<usize>, CommandError> {
    if args.is_empty() {
        return Err(CommandError::Usage(CHECK_USAGE));
    }
    args.iter().map(|token| positive(token, CHECK_USAGE)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_find_splits_keywords_containers_and_limit() {
        let cmd = Command::parse("!find Alt scam #general <#1234> limit=50").unwrap();
        assert_eq!(
            cmd,
            Command::Find(FindArgs {
                keywords: vec!["Alt".into(), "scam".into()],
                containers: vec![
                    ContainerRef::Name("general".into()),
                    ContainerRef::Id(ContainerId(1234)),
                ],
                limit: Some(50),
            })
        );
    }

    #[test]
    fn test_find_requires_keyword_and_container() {
        assert_eq!(
            Command::parse("find alt"),
            Err(CommandError::Usage(FIND_USAGE))
        );
        assert_eq!(
            Command::parse("find #a #b"),
            Err(CommandError::Usage(FIND_USAGE))
        );
        assert_eq!(
            Command::parse("find alt scam"),
            Err(CommandError::Usage(FIND_USAGE))
        );
    }

    #[test]
    fn test_find_rejects_bad_limit_and_reference() {
        assert_eq!(
            Command::parse("find alt #general limit=abc"),
            Err(CommandError::InvalidLimit("abc".into()))
        );
        assert_eq!(
            Command::parse("find alt #general limit=0"),
            Err(CommandError::InvalidLimit("0".into()))
        );
        assert_eq!(
            Command::parse("find alt <#12x>"),
            Err(CommandError::InvalidContainer("<#12x>".into()))
        );
    }

    #[test]
    fn test_exclusion_commands() {
        assert_eq!(
            Command::parse("addexclude alt altered alternative").unwrap(),
            Command::AddExclude {
                keyword: "alt".into(),
                words: vec!["altered".into(), "alternative".into()],
            }
        );
        assert_eq!(
            Command::parse("addexclude alt"),
            Err(CommandError::Usage(ADD_USAGE))
        );
        assert_eq!(
            Command::parse("removeexclude alt").unwrap(),
            Command::RemoveExclude {
                keyword: "alt".into(),
                word: None,
            }
        );
        assert_eq!(
            Command::parse("listexcludes").unwrap(),
            Command::ListExcludes { keyword: None }
        );
        assert_eq!(
            Command::parse("bulkexclude alt altered, alt-right , alternative").unwrap(),
            Command::BulkExclude {
                keyword: "alt".into(),
                words: "altered, alt-right , alternative".into(),
            }
        );
    }

    #[test]
    fn test_testkeyword_keeps_sample_verbatim() {
        assert_eq!(
            Command::parse("testkeyword alt  This is   ALT ").unwrap(),
            Command::TestKeyword {
                keyword: "alt".into(),
                sample: "This is   ALT".into(),
            }
        );
        assert_eq!(
            Command::parse("testkeyword alt"),
            Err(CommandError::Usage(TEST_USAGE))
        );
    }

    #[test]
    fn test_paging_commands() {
        assert_eq!(Command::parse("page 3").unwrap(), Command::Page(3));
        assert_eq!(Command::parse("PAGESIZE 50").unwrap(), Command::PageSize(50));
        assert_eq!(Command::parse("check 1 4 9").unwrap(), Command::Check(vec![1, 4, 9]));
        assert!(matches!(
            Command::parse("page 0"),
            Err(CommandError::InvalidNumber { .. })
        ));
        assert!(matches!(
            Command::parse("uncheck 2 x"),
            Err(CommandError::InvalidNumber { .. })
        ));
        assert_eq!(Command::parse("check"), Err(CommandError::Usage(CHECK_USAGE)));
    }

    #[test]
    fn test_unknown_command() {
        let err = Command::parse("frobnicate").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown command `frobnicate`. Type `help` for a list of commands."
        );
    }
}
