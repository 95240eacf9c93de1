use std::collections::HashMap;
use std::fmt::Display;

use crate::{Flags, InstIndex, Instructions, Matcher, Opcode};

/// An immutable compiled pattern. Patterns hold no match state and can be
/// shared across threads, each thread creating its own [Matcher].
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    source: String,
    normalized: String,
    flags: Flags,
    program: Instructions,
    root: InstIndex,
    match_root: InstIndex,
    group_count: usize,
    local_count: usize,
    group_names: HashMap<String, usize>,
}

impl Pattern {
    /// Wraps a program with its unanchored search root and its anchored
    /// match root. Slot counts are derived from the program and can be
    /// overridden by the builder methods.
    #[must_use]
    pub fn new<S: Into<String>>(
        source: S,
        program: Instructions,
        root: InstIndex,
        match_root: InstIndex,
    ) -> Self {
        let source = source.into();
        let (group_count, local_count) = slot_bounds(&program);

        Self {
            normalized: source.clone(),
            source,
            flags: Flags::empty(),
            program,
            root,
            match_root,
            group_count,
            local_count,
            group_names: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the pattern text the program was actually compiled from, when it
    /// differs from the source.
    #[must_use]
    pub fn with_normalized<S: Into<String>>(mut self, normalized: S) -> Self {
        self.normalized = normalized.into();
        self
    }

    #[must_use]
    pub fn with_group_count(mut self, group_count: usize) -> Self {
        self.group_count = self.group_count.max(group_count);
        self
    }

    #[must_use]
    pub fn with_local_count(mut self, local_count: usize) -> Self {
        self.local_count = self.local_count.max(local_count);
        self
    }

    #[must_use]
    pub fn with_group_names(mut self, group_names: HashMap<String, usize>) -> Self {
        self.group_names = group_names;
        self
    }

    /// The source text of the pattern.
    pub fn pattern(&self) -> &str {
        &self.source
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// The number of capturing groups, not counting the whole match.
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    pub(crate) fn local_count(&self) -> usize {
        self.local_count
    }

    /// Resolves a named group to its number.
    pub fn group_index(&self, name: &str) -> Option<usize> {
        self.group_names.get(name).copied()
    }

    pub fn program(&self) -> &Instructions {
        &self.program
    }

    pub(crate) fn root(&self) -> InstIndex {
        self.root
    }

    pub(crate) fn match_root(&self) -> InstIndex {
        self.match_root
    }

    /// Creates a matcher over `input`.
    pub fn matcher<'t>(&self, input: &'t str) -> Matcher<'_, 't> {
        Matcher::new(self, input)
    }

    /// Splits `input` around matches of the pattern, dropping trailing empty
    /// pieces.
    pub fn split<'t>(&self, input: &'t str) -> Vec<&'t str> {
        self.split_limit(input, 0)
    }

    /// Splits `input` around matches of the pattern.
    ///
    /// A positive `limit` caps the number of pieces, with the last piece
    /// holding the unsplit remainder. Zero drops trailing empty pieces and a
    /// negative limit keeps them. Input without a match is returned whole.
    pub fn split_limit<'t>(&self, input: &'t str, limit: isize) -> Vec<&'t str> {
        let limited = limit > 0;
        let mut pieces = Vec::new();
        let mut index = 0;
        let mut matcher = self.matcher(input);

        while matcher.find() {
            let (start, end) = matcher.span();
            if !limited || (pieces.len() as isize) < limit - 1 {
                pieces.push(matcher.slice(index, start));
                index = end;
            } else {
                pieces.push(matcher.slice(index, matcher.input_len()));
                index = end;
                break;
            }
        }

        if index == 0 {
            return vec![input];
        }

        if !limited || (pieces.len() as isize) < limit {
            pieces.push(matcher.slice(index, matcher.input_len()));
        }

        if limit == 0 {
            while pieces.last().map_or(false, |piece| piece.is_empty()) {
                pieces.pop();
            }
        }

        pieces
    }
}

/// Returns one more than the highest group and local slot referenced by the
/// program.
fn slot_bounds(program: &Instructions) -> (usize, usize) {
    program
        .as_ref()
        .iter()
        .fold((0, 0), |(groups, locals), inst| match inst.opcode() {
            Opcode::GroupHead(head) => (groups, locals.max(head.local + 1)),
            Opcode::GroupTail(tail) => (
                groups.max(tail.group.unwrap_or(0)),
                locals.max(tail.local + 1),
            ),
            Opcode::GroupCurly(curly) => (
                groups.max(curly.group.unwrap_or(0)),
                locals.max(curly.local + 1),
            ),
            Opcode::Loop(body_loop) => (
                groups,
                locals
                    .max(body_loop.count_local + 1)
                    .max(body_loop.begin_local + 1),
            ),
            Opcode::BackRef(backref) => (groups.max(backref.group), locals),
            _ => (groups, locals),
        })
}

impl Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::*;

    /// `,` as a hand assembled search.
    fn comma() -> Pattern {
        let mut program = Instructions::new();
        let comma = program.push_with_next(
            Opcode::Consume(InstConsume::new(CharClass::Single(','))),
            InstIndex::LAST_ACCEPT,
        );
        let start = program.start(comma);

        Pattern::new(",", program, start, comma)
    }

    #[test]
    fn should_split_with_limits() {
        let pattern = comma();
        let input_output = vec![
            ("a,b,c", 0, vec!["a", "b", "c"]),
            ("a,b,,", 0, vec!["a", "b"]),
            ("a,b,,", -1, vec!["a", "b", "", ""]),
            ("a,b,c", 2, vec!["a", "b,c"]),
            ("a,b,c", 1, vec!["a,b,c"]),
            ("abc", 0, vec!["abc"]),
            (",a", 0, vec!["", "a"]),
            ("", 0, vec![""]),
        ];

        for (test_id, (input, limit, expected)) in input_output.into_iter().enumerate() {
            assert_eq!(
                (test_id, expected),
                (test_id, pattern.split_limit(input, limit))
            );
        }
    }

    #[test]
    fn should_derive_slot_counts_from_program() {
        let mut program = Instructions::new();
        let tail = program.push_with_next(
            Opcode::GroupTail(InstGroupTail::new(2, Some(3))),
            InstIndex::LAST_ACCEPT,
        );
        let head = program.push_with_next(Opcode::GroupHead(InstGroupHead::new(2)), tail);
        let pattern = Pattern::new("(x)", program, head, head).with_group_count(1);

        assert_eq!(3, pattern.group_count());
        assert_eq!(3, pattern.local_count());
    }

    #[test]
    fn should_display_source_text() {
        let pattern = comma().with_normalized(",");

        assert_eq!(",", pattern.to_string());
        assert_eq!(",", pattern.normalized());
        assert_eq!(None, pattern.group_index("missing"));
    }
}
