use thiserror::Error;

/// Misuse of a matcher's results or replacement helpers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("No match available")]
    NoMatchAvailable,
    #[error("No group {0}")]
    NoSuchGroup(usize),
    #[error("No group with name <{0}>")]
    NoSuchGroupName(String),
    #[error("Illegal group reference")]
    IllegalGroupReference,
    #[error("character to be escaped is missing")]
    TrailingEscape,
    #[error("Illegal start index {0}")]
    IllegalStartIndex(usize),
    #[error("Illegal region {start}..{end}")]
    IllegalRegion { start: usize, end: usize },
}
