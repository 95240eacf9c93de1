use std::fmt::Display;

use thiserror::Error;

/// Every way a pattern can fail to compile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("Unmatched closing ')'")]
    UnmatchedClosingParen,
    #[error("Unclosed group")]
    UnclosedGroup,
    #[error("Dangling meta character '{0}'")]
    DanglingMetaCharacter(char),
    #[error("Unclosed character class")]
    UnclosedCharacterClass,
    #[error("Bad class syntax")]
    BadClassSyntax,
    #[error("Illegal character range")]
    IllegalCharacterRange,
    #[error("Unclosed character family")]
    UnclosedCharacterFamily,
    #[error("Empty character family")]
    EmptyCharacterFamily,
    #[error("Unknown character family {{{0}}}")]
    UnknownCharacterFamily(String),
    #[error("Unknown character category {{{0}}}")]
    UnknownCharacterCategory(String),
    #[error("Illegal repetition")]
    IllegalRepetition,
    #[error("Unclosed counted closure")]
    UnclosedCountedClosure,
    #[error("Illegal repetition range")]
    IllegalRepetitionRange,
    #[error("Illegal octal escape sequence")]
    IllegalOctalEscape,
    #[error("Illegal hexadecimal escape sequence")]
    IllegalHexadecimalEscape,
    #[error("Illegal Unicode escape sequence")]
    IllegalUnicodeEscape,
    #[error("Illegal control escape sequence")]
    IllegalControlEscape,
    #[error("Illegal/unsupported escape sequence")]
    IllegalEscape,
    #[error("Unexpected trailing backslash")]
    TrailingBackslash,
    #[error("No such group yet exists at this point in the pattern")]
    NoSuchGroup,
    #[error("Unknown group reference")]
    UnknownGroupReference,
    #[error("Unknown group type")]
    UnknownGroupType,
    #[error("Unknown look-behind group")]
    UnknownLookBehindGroup,
    #[error("Look-behind group does not have an obvious maximum length")]
    UnboundedLookBehind,
    #[error("Unknown inline modifier")]
    UnknownInlineModifier,
    #[error("capturing group name does not start with a Latin letter")]
    InvalidGroupName,
    #[error("named capturing group is missing trailing '>'")]
    UnclosedGroupName,
    #[error("Named capturing group <{0}> is already defined")]
    DuplicateGroupName(String),
    #[error("named capturing group <{0}> does not exist")]
    UnknownGroupName(String),
    #[error("\\k is not followed by '<' for named capturing group")]
    MalformedNamedReference,
    #[error("Pattern needs more instructions than can be addressed")]
    PatternTooLarge,
}

/// A positioned compile failure over the pattern text the parser saw.
///
/// The index is a character offset into [PatternSyntaxError::pattern],
/// which is the normalized form of the source when canonical equivalence
/// is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct PatternSyntaxError {
    kind: SyntaxErrorKind,
    pattern: String,
    index: Option<usize>,
}

impl PatternSyntaxError {
    pub fn new<S: Into<String>>(kind: SyntaxErrorKind, pattern: S, index: Option<usize>) -> Self {
        Self {
            kind,
            pattern: pattern.into(),
            index,
        }
    }

    pub fn kind(&self) -> &SyntaxErrorKind {
        &self.kind
    }

    /// The human-readable description, without position information.
    pub fn description(&self) -> String {
        self.kind.to_string()
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }
}

impl Display for PatternSyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(index) => write!(
                f,
                "{} near index {}\n{}\n{}^",
                self.kind,
                index,
                self.pattern,
                " ".repeat(index)
            ),
            None => write!(f, "{}\n{}", self.kind, self.pattern),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_render_caret_under_offending_index() {
        let err = PatternSyntaxError::new(SyntaxErrorKind::UnclosedGroup, "(ab", Some(2));

        assert_eq!("Unclosed group near index 2\n(ab\n  ^", err.to_string());
        assert_eq!("Unclosed group", err.description());
        assert_eq!(Some(2), err.index());
    }

    #[test]
    fn should_omit_caret_without_index() {
        let err = PatternSyntaxError::new(SyntaxErrorKind::DanglingMetaCharacter('*'), "*", None);

        assert_eq!("Dangling meta character '*'\n*", err.to_string());
        assert_eq!("*", err.pattern());
    }

    #[test]
    fn should_name_unknown_families() {
        let input_output = vec![
            (
                SyntaxErrorKind::UnknownCharacterFamily("Klingon".to_string()),
                "Unknown character family {Klingon}",
            ),
            (
                SyntaxErrorKind::UnknownCharacterCategory("Xx".to_string()),
                "Unknown character category {Xx}",
            ),
        ];

        for (test_id, (kind, expected)) in input_output.into_iter().enumerate() {
            assert_eq!((test_id, expected.to_string()), (test_id, kind.to_string()));
        }
    }
}
