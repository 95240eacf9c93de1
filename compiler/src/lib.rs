//! Provides for the parsing and compilation of a pattern into its
//! corresponding runtime program.
//!
//! # Example
//!
//! ```rust
//! // Compiling a pattern produces an immutable `Pattern` from the
//! // `retrace_runtime` crate, which can be shared freely.
//! use retrace_compiler::compile;
//!
//! let pattern = compile("c(a)t").expect("failed to compile");
//!
//! // Each search runs through its own `Matcher`, which holds the capture
//! // state for a single input.
//! let mut matcher = pattern.matcher("one cat two cats in the yard");
//!
//! assert!(matcher.find());
//! // Offsets count characters of the input. Group 0 is the whole match and
//! // spans `[4, 7)`, the first capturing group covers the `a`.
//! assert_eq!(Ok(4), matcher.start());
//! assert_eq!(Ok(7), matcher.end());
//! assert_eq!(Ok(Some("a")), matcher.group(1));
//!
//! assert!(matcher.find());
//! assert_eq!(Ok(12), matcher.start());
//! assert!(!matcher.find());
//! ```

use log::debug;

pub mod ast;
pub mod canonical;
pub mod compiler;
mod error;
pub mod parser;
mod unicode;

pub use error::{PatternSyntaxError, SyntaxErrorKind};
pub use parser::parse;
pub use retrace_runtime::{Flags, MatchError, Matcher, Pattern};

/// Compiles a pattern with no flags set.
pub fn compile(pattern: &str) -> Result<Pattern, PatternSyntaxError> {
    compile_with_flags(pattern, Flags::empty())
}

/// Compiles a pattern under the given flags.
///
/// With [Flags::CANON_EQ] the pattern is first rewritten by
/// [canonical::normalize], and errors are positioned against the rewritten
/// text.
///
/// # Example
///
/// ```rust
/// use retrace_compiler::{compile_with_flags, Flags};
///
/// let pattern = compile_with_flags("^cat$", Flags::CASE_INSENSITIVE | Flags::MULTILINE).unwrap();
/// let mut matcher = pattern.matcher("dog\nCAT\n");
///
/// assert!(matcher.find());
/// assert_eq!(Ok("CAT"), matcher.as_str());
/// ```
pub fn compile_with_flags(pattern: &str, flags: Flags) -> Result<Pattern, PatternSyntaxError> {
    let normalized = if flags.contains(Flags::CANON_EQ) {
        canonical::normalize(pattern)?
    } else {
        pattern.to_string()
    };

    let mut regex = parser::parse(&normalized, flags)?;
    let group_count = regex.group_count;
    let group_names = std::mem::take(&mut regex.group_names);
    let program = compiler::compile(regex, &normalized)?;

    debug!(
        "compiled {:?} with flags {:?}: {} instructions, {} groups, root {}",
        pattern,
        flags.to_letters(),
        program.instructions.len(),
        group_count,
        program.instructions[program.root]
    );

    Ok(
        Pattern::new(pattern, program.instructions, program.root, program.match_root)
            .with_flags(flags)
            .with_normalized(normalized)
            .with_group_count(group_count)
            .with_local_count(program.local_count)
            .with_group_names(group_names),
    )
}

/// Compiles `regex` and reports whether it matches the whole of `input`.
///
/// # Example
///
/// ```rust
/// assert_eq!(Ok(true), retrace_compiler::matches("a*b", "aaab"));
/// assert_eq!(Ok(false), retrace_compiler::matches("a*b", "aaabc"));
/// ```
pub fn matches(regex: &str, input: &str) -> Result<bool, PatternSyntaxError> {
    let pattern = compile(regex)?;
    let matched = pattern.matcher(input).matches();
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find_all(pattern: &Pattern, input: &str) -> Vec<(usize, usize)> {
        let mut matcher = pattern.matcher(input);
        let mut found = vec![];
        while matcher.find() {
            found.push((matcher.start().unwrap(), matcher.end().unwrap()));
        }
        found
    }

    #[test]
    fn should_match_whole_input() {
        let input_output = vec![
            ("abc", "abc", true),
            ("abc", "abcd", false),
            ("a|ab", "ab", true),
            ("(a|b)*c", "ababc", true),
            ("a{2,3}", "aaaa", false),
            ("[^a-c]+", "xyz", true),
            ("\\d+\\.\\d*", "3.14", true),
            ("(?i)hello", "HeLLo", true),
            ("(?x) a b c # letters", "abc", true),
            ("(?s).+", "a\nb", true),
            (".+", "a\nb", false),
            ("\\Qa.b\\E", "a.b", true),
            ("\\Qa.b\\E", "axb", false),
        ];

        for (test_id, (regex, input, expected)) in input_output.into_iter().enumerate() {
            assert_eq!((test_id, Ok(expected)), (test_id, matches(regex, input)));
        }
    }

    #[test]
    fn should_find_all_non_overlapping_matches() {
        let input_output = vec![
            ("cat", "one cat two cats in the yard", vec![(4, 7), (12, 15)]),
            ("a*", "baa", vec![(0, 0), (1, 3), (3, 3)]),
            ("\\bt\\w+", "the tall tree", vec![(0, 3), (4, 8), (9, 13)]),
            ("(?m)^\\w", "ab\ncd\n", vec![(0, 1), (3, 4)]),
            ("x*$", "ab", vec![(2, 2)]),
            ("\\Qab\\E*", "abbb abab", vec![(0, 4), (5, 7), (7, 9)]),
        ];

        for (test_id, (regex, input, expected)) in input_output.into_iter().enumerate() {
            let pattern = compile(regex).unwrap();
            assert_eq!((test_id, expected), (test_id, find_all(&pattern, input)));
        }
    }

    #[test]
    fn should_apply_repetition_policies() {
        let input_output = vec![
            ("a*", "aaa", "aaa"),
            ("a*?a", "aaa", "a"),
            ("a+?", "aaa", "a"),
            ("<.+>", "<a><b>", "<a><b>"),
            ("<.+?>", "<a><b>", "<a>"),
            ("a{2,}?", "aaaa", "aa"),
            ("(?:ab)??a", "aba", "a"),
        ];

        for (test_id, (regex, input, expected)) in input_output.into_iter().enumerate() {
            let pattern = compile(regex).unwrap();
            let mut matcher = pattern.matcher(input);
            let res = matcher.find().then(|| matcher.as_str().unwrap());
            assert_eq!((test_id, Some(expected)), (test_id, res));
        }
    }

    #[test]
    fn should_never_backtrack_into_possessive_or_independent_groups() {
        let input_output = vec![
            ("a*+a", "aaa", false),
            ("(?>a*)a", "aaa", false),
            ("(?:ab)*+ab", "abab", false),
            ("a?+a", "a", false),
            ("a*+b", "aab", true),
        ];

        for (test_id, (regex, input, expected)) in input_output.into_iter().enumerate() {
            assert_eq!((test_id, Ok(expected)), (test_id, matches(regex, input)));
        }
    }

    #[test]
    fn should_capture_last_iteration_of_repeated_groups() {
        let input_output = vec![
            ("(ab)+", "ababab", Some("ab")),
            ("(a|bc)+", "abca", Some("a")),
            ("(a)?b", "b", None),
            ("(a*)+b", "aab", Some("")),
            ("(?:(a)|b)+", "ab", Some("a")),
        ];

        for (test_id, (regex, input, expected)) in input_output.into_iter().enumerate() {
            let pattern = compile(regex).unwrap();
            let mut matcher = pattern.matcher(input);
            assert!(matcher.matches());
            assert_eq!((test_id, Ok(expected)), (test_id, matcher.group(1)));
        }
    }

    #[test]
    fn should_evaluate_back_references() {
        let input_output = vec![
            ("(a)\\1", "aa", true),
            ("(a)\\1", "ab", false),
            ("(a)?\\1", "b", false),
            ("(?i)(a)\\1", "aA", true),
            ("(?<q>['\"]).*\\k<q>", "'x'", true),
            ("(?<q>['\"]).*\\k<q>", "'x\"", false),
            ("(a)(?1)", "aa", true),
        ];

        for (test_id, (regex, input, expected)) in input_output.into_iter().enumerate() {
            assert_eq!((test_id, Ok(expected)), (test_id, matches(regex, input)));
        }
    }

    #[test]
    fn should_evaluate_lookaround() {
        let input_output = vec![
            ("\\w+(?=!)", "hey!", Some((0, 3))),
            ("\\w+(?!!)", "hey!", Some((0, 2))),
            ("(?<=a{1,3})b", "aab", Some((2, 3))),
            ("(?<!a)b", "ab cb", Some((4, 5))),
            ("(?<=\\$)\\d+", "cost: $42", Some((7, 9))),
        ];

        for (test_id, (regex, input, expected)) in input_output.into_iter().enumerate() {
            let pattern = compile(regex).unwrap();
            let mut matcher = pattern.matcher(input);
            let res = matcher
                .find()
                .then(|| (matcher.start().unwrap(), matcher.end().unwrap()));
            assert_eq!((test_id, expected), (test_id, res));
        }
    }

    #[test]
    fn should_fold_case_under_flags() {
        let input_output = vec![
            ("straße", Flags::CASE_INSENSITIVE, "STRAßE", true),
            ("é", Flags::CASE_INSENSITIVE, "É", false),
            ("é", Flags::CASE_INSENSITIVE | Flags::UNICODE_CASE, "É", true),
            ("[é-ë]", Flags::CASE_INSENSITIVE, "Ê", true),
            ("ǆ", Flags::CASE_INSENSITIVE | Flags::UNICODE_CASE, "ǅ", true),
        ];

        for (test_id, (regex, flags, input, expected)) in input_output.into_iter().enumerate() {
            let res = compile_with_flags(regex, flags).map(|pattern| pattern.matcher(input).matches());
            assert_eq!((test_id, Ok(expected)), (test_id, res));
        }
    }

    #[test]
    fn should_match_canonically_equivalent_input() {
        let pattern = compile_with_flags("caf\u{e9}", Flags::CANON_EQ).unwrap();

        assert!(pattern.matcher("caf\u{e9}").matches());
        assert!(pattern.matcher("cafe\u{301}").matches());
        assert_eq!("caf\u{e9}", pattern.pattern());
        assert_eq!("caf(?:e\u{301}|\u{e9})", pattern.normalized());
    }

    #[test]
    fn should_record_pattern_metadata() {
        let pattern = compile_with_flags("(?<year>\\d{4})-(\\d\\d)", Flags::MULTILINE).unwrap();

        assert_eq!(2, pattern.group_count());
        assert_eq!(Some(1), pattern.group_index("year"));
        assert_eq!(None, pattern.group_index("month"));
        assert_eq!(Flags::MULTILINE, pattern.flags());
        assert_eq!("(?<year>\\d{4})-(\\d\\d)", pattern.to_string());
    }

    #[test]
    fn should_report_positioned_syntax_errors() {
        let err = compile("ab(cd").unwrap_err();

        assert_eq!(&SyntaxErrorKind::UnclosedGroup, err.kind());
        assert_eq!("Unclosed group near index 5\nab(cd\n     ^", err.to_string());

        let err = compile("(?<=a*)b").unwrap_err();
        assert_eq!(&SyntaxErrorKind::UnboundedLookBehind, err.kind());
    }
}
