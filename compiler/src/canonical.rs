//! Rewrites a pattern so that canonically equivalent spellings of a
//! character match each other.
//!
//! The pattern is decomposed, then every base character followed by
//! nonspacing marks is replaced by a non-capturing alternation of all
//! reorderings of its marks and every one-step composition of those. Inside a
//! character class, such sequences are lifted out into an alternation next to
//! the class.

use std::iter::once;

use retrace_runtime::case::is_nonspacing_mark;
use unicode_normalization::char::{canonical_combining_class, compose};
use unicode_normalization::UnicodeNormalization;

use super::error::{PatternSyntaxError, SyntaxErrorKind};

/// Returns the pattern in its equivalence-expanded form.
pub fn normalize(pattern: &str) -> Result<String, PatternSyntaxError> {
    let chars: Vec<char> = pattern.nfd().collect();
    let mut normalized = String::with_capacity(pattern.len());
    let mut base: Option<char> = None;
    let mut escaped = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if let Some(base_char) = base.filter(|_| is_nonspacing_mark(c)) {
            let end = marks_end(&chars, i);
            let sequence: Vec<char> = once(base_char).chain(chars[i..end].iter().copied()).collect();

            normalized.pop();
            normalized.push_str("(?:");
            normalized.push_str(&equivalent_alternation(&sequence));
            normalized.push(')');

            base = None;
            i = end;
            continue;
        }

        if c == '[' && !escaped {
            match class(&chars, i, &mut normalized) {
                Some(end) => i = end,
                None => {
                    let text: String = chars.iter().collect();
                    return Err(PatternSyntaxError::new(
                        SyntaxErrorKind::UnclosedCharacterClass,
                        text,
                        chars.len().checked_sub(1),
                    ));
                }
            }
            base = None;
            continue;
        }

        escaped = c == '\\' && !escaped;
        normalized.push(c);
        base = Some(c);
        i += 1;
    }

    Ok(normalized)
}

/// Index one past the run of nonspacing marks starting at `start`.
fn marks_end(chars: &[char], start: usize) -> usize {
    chars[start..]
        .iter()
        .position(|c| !is_nonspacing_mark(*c))
        .map_or(chars.len(), |len| start + len)
}

/// Copies the class starting at `start` into `normalized`, returning the
/// index after its closing bracket or `None` when it is never closed.
fn class(chars: &[char], start: usize, normalized: &mut String) -> Option<usize> {
    let mut class = String::from("[");
    let mut alternatives: Vec<String> = Vec::new();
    let mut base: Option<char> = None;
    let mut escaped = false;
    let mut i = start + 1;

    loop {
        let c = *chars.get(i)?;

        if c == ']' && !escaped {
            class.push(']');
            i += 1;
            break;
        }

        if let Some(base_char) = base.filter(|_| is_nonspacing_mark(c)) {
            let end = marks_end(chars, i);
            let sequence: Vec<char> = once(base_char).chain(chars[i..end].iter().copied()).collect();

            class.pop();
            alternatives.push(equivalent_alternation(&sequence));
            base = None;
            i = end;
            continue;
        }

        escaped = c == '\\' && !escaped;
        class.push(c);
        base = Some(c);
        i += 1;
    }

    if alternatives.is_empty() {
        normalized.push_str(&class);
    } else if class == "[]" {
        // every member was lifted out.
        normalized.push_str(&format!("(?:{})", alternatives.join("|")));
    } else {
        normalized.push_str(&format!("(?:{}|{})", class, alternatives.join("|")));
    }

    Some(i)
}

/// Produces every equivalent spelling of a base character and its marks,
/// joined with `|`.
fn equivalent_alternation(sequence: &[char]) -> String {
    let mut result: String = sequence.iter().collect();
    let (base, marks) = match sequence.split_first() {
        Some((base, marks)) if !marks.is_empty() => (*base, marks),
        _ => return result,
    };

    for (x, permutation) in permutations(marks).into_iter().enumerate() {
        let next: Vec<char> = once(base).chain(permutation).collect();
        if x > 0 {
            result.push('|');
            result.extend(next.iter());
        }

        if let Some(composed) = compose_one_step(&next) {
            result.push('|');
            result.push_str(&equivalent_alternation(&composed));
        }
    }

    result
}

/// Orders of the marks that are canonically distinct. Marks sharing a
/// combining class never swap places.
fn permutations(marks: &[char]) -> Vec<Vec<char>> {
    match marks {
        [] | [_] => vec![marks.to_vec()],
        [first, second] => {
            if canonical_combining_class(*first) == canonical_combining_class(*second) {
                vec![marks.to_vec()]
            } else {
                vec![vec![*first, *second], vec![*second, *first]]
            }
        }
        _ => {
            let mut result = Vec::new();
            for (x, mark) in marks.iter().enumerate() {
                let class = canonical_combining_class(*mark);
                if marks[..x]
                    .iter()
                    .any(|prev| canonical_combining_class(*prev) == class)
                {
                    continue;
                }

                let rest: Vec<char> = marks
                    .iter()
                    .enumerate()
                    .filter(|(y, _)| *y != x)
                    .map(|(_, c)| *c)
                    .collect();
                result.extend(
                    permutations(&rest)
                        .into_iter()
                        .map(|sub| once(*mark).chain(sub).collect::<Vec<_>>()),
                );
            }
            result
        }
    }
}

/// Composes the first two characters, if they have a composition.
fn compose_one_step(sequence: &[char]) -> Option<Vec<char>> {
    match sequence {
        [first, second, rest @ ..] => {
            compose(*first, *second).map(|composed| once(composed).chain(rest.iter().copied()).collect())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_leave_unmarked_patterns_unchanged() {
        let inputs = vec!["abc", "a[bc]+d", "\\[e", "(?:x|y)*"];

        for (test_id, input) in inputs.into_iter().enumerate() {
            assert_eq!((test_id, Ok(input.to_string())), (test_id, normalize(input)));
        }
    }

    #[test]
    fn should_expand_marked_characters_into_alternations() {
        let input_output = vec![
            ("e\u{301}", "(?:e\u{301}|\u{e9})"),
            ("\u{e9}", "(?:e\u{301}|\u{e9})"),
            ("x\u{e9}y", "x(?:e\u{301}|\u{e9})y"),
        ];

        for (test_id, (input, expected)) in input_output.into_iter().enumerate() {
            assert_eq!(
                (test_id, Ok(expected.to_string())),
                (test_id, normalize(input))
            );
        }
    }

    #[test]
    fn should_lift_marked_characters_out_of_classes() {
        let input_output = vec![
            ("[\u{e9}]", "(?:e\u{301}|\u{e9})"),
            ("[x\u{e9}]", "(?:[x]|e\u{301}|\u{e9})"),
            ("[a\\]]", "[a\\]]"),
        ];

        for (test_id, (input, expected)) in input_output.into_iter().enumerate() {
            assert_eq!(
                (test_id, Ok(expected.to_string())),
                (test_id, normalize(input))
            );
        }
    }

    #[test]
    fn should_only_reorder_marks_of_distinct_classes() {
        // dot below and acute differ in combining class, grave and acute do not.
        assert_eq!(2, permutations(&['\u{323}', '\u{301}']).len());
        assert_eq!(1, permutations(&['\u{300}', '\u{301}']).len());
        assert_eq!(3, permutations(&['\u{300}', '\u{301}', '\u{323}']).len());
    }

    #[test]
    fn should_reject_unclosed_classes() {
        let res = normalize("[ab").map_err(|err| err.kind().clone());

        assert_eq!(Err(SyntaxErrorKind::UnclosedCharacterClass), res);
    }
}
