//! Compile-time match flags.

bitflags::bitflags! {
    /// Options that alter how a pattern is compiled and matched. Every flag
    /// can also be toggled inline with a `(?idmsux-idmsux)` group.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flags: u32 {
        /// Only `\n` is recognized as a line terminator by `.`, `^` and `$`.
        const UNIX_LINES = 0x01;
        /// Case-insensitive matching, ASCII only unless `UNICODE_CASE` is set.
        const CASE_INSENSITIVE = 0x02;
        /// Whitespace and `#` comments are ignored in the pattern.
        const COMMENTS = 0x04;
        /// `^` and `$` match at line terminators rather than only at the
        /// ends of the input.
        const MULTILINE = 0x08;
        /// `.` matches any character including line terminators.
        const DOTALL = 0x20;
        /// Case-insensitive matching folds with the Unicode case tables.
        const UNICODE_CASE = 0x40;
        /// Canonically equivalent character sequences match each other.
        const CANON_EQ = 0x80;
    }
}

/// The inline modifier letter associated with each flag.
const LETTERS: [(char, Flags); 7] = [
    ('d', Flags::UNIX_LINES),
    ('i', Flags::CASE_INSENSITIVE),
    ('x', Flags::COMMENTS),
    ('m', Flags::MULTILINE),
    ('s', Flags::DOTALL),
    ('u', Flags::UNICODE_CASE),
    ('c', Flags::CANON_EQ),
];

/// An inline modifier letter with no corresponding flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown flag letter {0:?}")]
pub struct UnknownFlag(pub char);

impl Flags {
    /// Returns the flag for a single inline modifier letter.
    pub fn from_letter(letter: char) -> Option<Self> {
        LETTERS
            .iter()
            .find(|(c, _)| *c == letter)
            .map(|(_, flag)| *flag)
    }

    /// Parses a string of inline modifier letters, i.e. `"im"`.
    pub fn from_letters(letters: &str) -> Result<Self, UnknownFlag> {
        letters.chars().try_fold(Flags::empty(), |flags, c| {
            Self::from_letter(c)
                .map(|flag| flags | flag)
                .ok_or(UnknownFlag(c))
        })
    }

    /// Renders the set flags as inline modifier letters.
    pub fn to_letters(&self) -> String {
        LETTERS
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(c, _)| *c)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_flag_letters() {
        let input_output = vec![
            ("", Ok(Flags::empty())),
            ("i", Ok(Flags::CASE_INSENSITIVE)),
            ("ms", Ok(Flags::MULTILINE | Flags::DOTALL)),
            ("dux", Ok(Flags::UNIX_LINES | Flags::UNICODE_CASE | Flags::COMMENTS)),
            ("iq", Err(UnknownFlag('q'))),
        ];

        for (test_id, (input, expected)) in input_output.into_iter().enumerate() {
            assert_eq!((test_id, expected), (test_id, Flags::from_letters(input)));
        }
    }

    #[test]
    fn should_render_flags_in_a_stable_order() {
        let flags = Flags::DOTALL | Flags::CASE_INSENSITIVE | Flags::CANON_EQ;

        assert_eq!("isc", flags.to_letters());
        assert_eq!(Ok(flags), Flags::from_letters(&flags.to_letters()));
    }
}
