//! Boyer-Moore scanning for leading literal runs.

use std::fmt::Display;

/// The shortest literal worth scanning with shift tables.
pub const MIN_LITERAL_LEN: usize = 4;

/// Precomputed shift tables for a case-sensitive literal.
///
/// The bad character table is keyed by the low seven bits of a character,
/// so unrelated characters can share a slot. Shifts remain safe because
/// the good suffix table always allows at least a shift of one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoyerMoore {
    literal: Vec<char>,
    last_occurrence: [usize; 128],
    good_suffix: Vec<usize>,
}

impl BoyerMoore {
    /// Builds the tables for `literal`, or returns `None` when the literal is
    /// too short to benefit from them.
    pub fn new(literal: &[char]) -> Option<Self> {
        let len = literal.len();
        if len < MIN_LITERAL_LEN {
            return None;
        }

        let mut last_occurrence = [0usize; 128];
        for (i, c) in literal.iter().enumerate() {
            last_occurrence[low_bits(*c)] = i + 1;
        }

        let mut good_suffix = vec![0usize; len];
        'shift: for shift in (1..=len).rev() {
            let mut j = len - 1;
            while j >= shift {
                if literal[j] == literal[j - shift] {
                    good_suffix[j - 1] = shift;
                    j -= 1;
                } else {
                    continue 'shift;
                }
            }
            // shorter suffixes can never shift further than this one.
            while j > 0 {
                j -= 1;
                good_suffix[j] = shift;
            }
        }
        good_suffix[len - 1] = 1;

        Some(Self {
            literal: literal.to_vec(),
            last_occurrence,
            good_suffix,
        })
    }

    pub fn literal(&self) -> &[char] {
        &self.literal
    }

    pub fn len(&self) -> usize {
        self.literal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literal.is_empty()
    }

    /// Returns the offset of the first occurrence of the literal in
    /// `haystack[from..to]` at or after `from`.
    pub fn find(&self, haystack: &[char], from: usize, to: usize) -> Option<usize> {
        let len = self.literal.len();
        let last = to.checked_sub(len)?;

        let mut i = from;
        'candidate: while i <= last {
            for j in (0..len).rev() {
                let c = haystack[i + j];
                if c != self.literal[j] {
                    let bad_char = (j + 1) as isize - self.last_occurrence[low_bits(c)] as isize;
                    let shift = bad_char.max(self.good_suffix[j] as isize);
                    i += shift as usize;
                    continue 'candidate;
                }
            }
            return Some(i);
        }

        None
    }
}

fn low_bits(c: char) -> usize {
    (c as u32 & 0x7F) as usize
}

impl Display for BoyerMoore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let literal: String = self.literal.iter().collect();
        write!(f, "BnM: {:?}", literal)
    }
}
