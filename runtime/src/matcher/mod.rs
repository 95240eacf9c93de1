//! Match state for a single input, along with the result accessors and
//! replacement helpers built on top of the search operations.

use log::trace;

use crate::slots::Slots;
use crate::{InstIndex, MatchError, Pattern};

mod exec;

/// Whether the terminal accept requires the match to reach the end of the
/// region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AcceptMode {
    NoAnchor,
    EndAnchor,
}

/// Runs a [Pattern] against one input.
///
/// All offsets are counted in characters of the input.
///
/// A matcher mutates its capture state on every attempt, so each thread
/// searching with a shared pattern needs its own matcher.
#[derive(Debug, Clone)]
pub struct Matcher<'p, 't> {
    pattern: &'p Pattern,
    input: &'t str,
    chars: Vec<char>,
    /// Byte offset of each character, plus the input length.
    offsets: Vec<usize>,

    from: usize,
    to: usize,
    accept_mode: AcceptMode,

    first: usize,
    last: usize,
    matched: bool,
    /// Where the next `find` resumes, unset until a search has run.
    resume_at: Option<usize>,
    /// End of the previous match, for `\G`.
    old_last: Option<usize>,
    append_position: usize,

    slots: Slots,
}

impl<'p, 't> Matcher<'p, 't> {
    pub(crate) fn new(pattern: &'p Pattern, input: &'t str) -> Self {
        let (chars, offsets) = decode(input);
        let to = chars.len();

        Self {
            pattern,
            input,
            chars,
            offsets,
            from: 0,
            to,
            accept_mode: AcceptMode::NoAnchor,
            first: 0,
            last: 0,
            matched: false,
            resume_at: None,
            old_last: None,
            append_position: 0,
            slots: Slots::new(pattern.group_count(), pattern.local_count()),
        }
    }

    pub fn pattern(&self) -> &'p Pattern {
        self.pattern
    }

    pub fn input(&self) -> &'t str {
        self.input
    }

    /// Discards all match state and restores the region to the whole input.
    pub fn reset(&mut self) -> &mut Self {
        self.from = 0;
        self.to = self.chars.len();
        self.matched = false;
        self.resume_at = None;
        self.old_last = None;
        self.append_position = 0;
        self.slots.clear();
        self
    }

    /// Resets the matcher onto a new input.
    pub fn reset_with(&mut self, input: &'t str) -> &mut Self {
        let (chars, offsets) = decode(input);
        self.input = input;
        self.chars = chars;
        self.offsets = offsets;
        self.reset()
    }

    /// Resets the matcher and limits searches to `[start, end)`.
    pub fn region(&mut self, start: usize, end: usize) -> Result<&mut Self, MatchError> {
        if start > end || end > self.chars.len() {
            return Err(MatchError::IllegalRegion { start, end });
        }

        self.reset();
        self.from = start;
        self.to = end;
        Ok(self)
    }

    pub fn region_start(&self) -> usize {
        self.from
    }

    pub fn region_end(&self) -> usize {
        self.to
    }

    /// Attempts to match the entire region.
    pub fn matches(&mut self) -> bool {
        let root = self.pattern.match_root();
        self.search(self.from, AcceptMode::EndAnchor, root)
    }

    /// Attempts to match a prefix of the region.
    pub fn looking_at(&mut self) -> bool {
        let root = self.pattern.match_root();
        self.search(self.from, AcceptMode::NoAnchor, root)
    }

    /// Searches for the next match, resuming after the previous one. An empty
    /// previous match resumes one character further along. Once a search
    /// fails, every later call fails until the matcher is reset.
    pub fn find(&mut self) -> bool {
        let start = self.resume_at.unwrap_or(self.from).max(self.from);
        if start > self.to {
            self.matched = false;
            self.slots.clear();
            return false;
        }

        let root = self.pattern.root();
        let found = self.search(start, AcceptMode::NoAnchor, root);
        if !found {
            self.exhaust();
        }
        found
    }

    /// Resets the matcher and searches from `start`.
    pub fn find_from(&mut self, start: usize) -> Result<bool, MatchError> {
        if start > self.chars.len() {
            return Err(MatchError::IllegalStartIndex(start));
        }

        self.reset();
        let root = self.pattern.root();
        let found = self.search(start, AcceptMode::NoAnchor, root);
        if !found {
            self.exhaust();
        }
        Ok(found)
    }

    /// Moves the resume point past the region end.
    fn exhaust(&mut self) {
        self.resume_at = Some(self.to + 1);
    }

    fn search(&mut self, from: usize, accept_mode: AcceptMode, root: InstIndex) -> bool {
        trace!(
            "searching /{}/ from {} in [{}, {}) {:?}",
            self.pattern,
            from,
            self.from,
            self.to,
            accept_mode
        );

        self.first = from;
        self.last = from;
        self.old_last = self.old_last.or(Some(from));
        self.accept_mode = accept_mode;
        self.slots.clear();

        self.matched = self.run(root, from);
        if self.matched {
            self.old_last = Some(self.last);
            self.resume_at = Some(if self.first == self.last {
                self.last + 1
            } else {
                self.last
            });
        } else {
            self.old_last = None;
            self.resume_at = None;
        }

        self.matched
    }

    fn ensure_match(&self) -> Result<(), MatchError> {
        if self.matched {
            Ok(())
        } else {
            Err(MatchError::NoMatchAvailable)
        }
    }

    fn ensure_group(&self, group: usize) -> Result<(), MatchError> {
        self.ensure_match()?;
        if group > self.group_count() {
            Err(MatchError::NoSuchGroup(group))
        } else {
            Ok(())
        }
    }

    /// The number of capturing groups in the pattern.
    pub fn group_count(&self) -> usize {
        self.pattern.group_count()
    }

    /// Start offset of the previous match.
    pub fn start(&self) -> Result<usize, MatchError> {
        self.ensure_match()?;
        Ok(self.first)
    }

    /// End offset of the previous match.
    pub fn end(&self) -> Result<usize, MatchError> {
        self.ensure_match()?;
        Ok(self.last)
    }

    /// Start offset of a group in the previous match, or `None` when the
    /// group took no part in it.
    pub fn start_group(&self, group: usize) -> Result<Option<usize>, MatchError> {
        self.ensure_group(group)?;
        Ok(self.slots.span(group).map(|(start, _)| start))
    }

    pub fn end_group(&self, group: usize) -> Result<Option<usize>, MatchError> {
        self.ensure_group(group)?;
        Ok(self.slots.span(group).map(|(_, end)| end))
    }

    /// The input captured by a group in the previous match.
    pub fn group(&self, group: usize) -> Result<Option<&'t str>, MatchError> {
        self.ensure_group(group)?;
        Ok(self
            .slots
            .span(group)
            .map(|(start, end)| self.slice(start, end)))
    }

    /// The input captured by a named group in the previous match.
    pub fn name(&self, name: &str) -> Result<Option<&'t str>, MatchError> {
        let group = self
            .pattern
            .group_index(name)
            .ok_or_else(|| MatchError::NoSuchGroupName(name.to_string()))?;
        self.group(group)
    }

    /// The input consumed by the previous match.
    pub fn as_str(&self) -> Result<&'t str, MatchError> {
        self.ensure_match()?;
        Ok(self.slice(self.first, self.last))
    }

    /// Appends the input between the previous append position and the
    /// current match, followed by the expanded replacement.
    ///
    /// `$n` substitutes group `n`, taking further digits only while they
    /// name an existing group, `${name}` substitutes a named group and `\`
    /// takes the next character literally.
    pub fn append_replacement(
        &mut self,
        buf: &mut String,
        replacement: &str,
    ) -> Result<&mut Self, MatchError> {
        self.ensure_match()?;

        let mut expanded = String::with_capacity(replacement.len());
        let mut cursor = replacement.chars().peekable();
        while let Some(c) = cursor.next() {
            match c {
                '\\' => expanded.push(cursor.next().ok_or(MatchError::TrailingEscape)?),
                '$' if cursor.peek() == Some(&'{') => {
                    cursor.next();
                    let mut name = String::new();
                    loop {
                        match cursor.next() {
                            Some('}') => break,
                            Some(c) if c.is_ascii_alphanumeric() => name.push(c),
                            _ => return Err(MatchError::IllegalGroupReference),
                        }
                    }
                    if let Some(text) = self.name(&name)? {
                        expanded.push_str(text);
                    }
                }
                '$' => {
                    let mut group = cursor
                        .next()
                        .and_then(|c| c.to_digit(10))
                        .ok_or(MatchError::IllegalGroupReference)?
                        as usize;
                    while let Some(digit) = cursor.peek().and_then(|c| c.to_digit(10)) {
                        let widened = group * 10 + digit as usize;
                        if widened > self.group_count() {
                            break;
                        }
                        group = widened;
                        cursor.next();
                    }
                    if let Some(text) = self.group(group)? {
                        expanded.push_str(text);
                    }
                }
                c => expanded.push(c),
            }
        }

        buf.push_str(self.slice(self.append_position, self.first));
        buf.push_str(&expanded);
        self.append_position = self.last;
        Ok(self)
    }

    /// Appends the input following the last appended match.
    pub fn append_tail(&self, buf: &mut String) {
        buf.push_str(self.slice(self.append_position, self.chars.len()));
    }

    /// Replaces every match of the pattern with the expanded replacement.
    pub fn replace_all(&mut self, replacement: &str) -> Result<String, MatchError> {
        self.reset();
        let mut buf = String::with_capacity(self.input.len());
        while self.find() {
            self.append_replacement(&mut buf, replacement)?;
        }
        self.append_tail(&mut buf);
        Ok(buf)
    }

    /// Replaces the first match of the pattern with the expanded
    /// replacement.
    pub fn replace_first(&mut self, replacement: &str) -> Result<String, MatchError> {
        self.reset();
        if !self.find() {
            return Ok(self.input.to_string());
        }

        let mut buf = String::with_capacity(self.input.len());
        self.append_replacement(&mut buf, replacement)?;
        self.append_tail(&mut buf);
        Ok(buf)
    }

    pub(crate) fn span(&self) -> (usize, usize) {
        (self.first, self.last)
    }

    pub(crate) fn input_len(&self) -> usize {
        self.chars.len()
    }

    /// The input between two character offsets.
    pub(crate) fn slice(&self, start: usize, end: usize) -> &'t str {
        let input: &'t str = self.input;
        &input[self.offsets[start]..self.offsets[end]]
    }
}

/// Splits the input into characters and their byte offsets.
fn decode(input: &str) -> (Vec<char>, Vec<usize>) {
    let (mut offsets, chars): (Vec<usize>, Vec<char>) = input.char_indices().unzip();
    offsets.push(input.len());
    (chars, offsets)
}
