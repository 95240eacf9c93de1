//! Static length analysis over an instruction chain.

use crate::{InstIndex, Instructions, Opcode, MAX_REPS};

/// Saturation point for minimum lengths that overflow.
const LARGE_LENGTH: usize = 0x0FFF_FFFF;

/// Accumulated bounds for the input consumed by a chain of instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeInfo {
    pub min_length: usize,
    pub max_length: usize,
    /// Whether `max_length` is a real bound.
    pub max_valid: bool,
    /// Whether the chain can match in at most one way.
    pub deterministic: bool,
}

impl TreeInfo {
    pub fn new() -> Self {
        Self {
            min_length: 0,
            max_length: 0,
            max_valid: true,
            deterministic: true,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn add_fixed(&mut self, len: usize) {
        self.min_length = self.min_length.saturating_add(len);
        self.max_length = self.max_length.saturating_add(len);
    }

    /// Folds the bounds of a repeated body, studied into `self`, back onto
    /// the bounds saved before the body was studied.
    fn repeat(&mut self, saved: TreeInfo, min: usize, max: usize) {
        self.min_length = self
            .min_length
            .checked_mul(min)
            .and_then(|len| len.checked_add(saved.min_length))
            .unwrap_or(LARGE_LENGTH);

        let unbounded = max == MAX_REPS && self.max_length > 0;
        let max_length = self
            .max_length
            .checked_mul(max)
            .and_then(|len| len.checked_add(saved.max_length));
        match max_length {
            Some(max_length) if saved.max_valid && self.max_valid && !unbounded => {
                self.max_length = max_length
            }
            _ => self.max_valid = false,
        }

        self.deterministic = self.deterministic && min == max && saved.deterministic;
    }
}

impl Default for TreeInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl Instructions {
    /// Walks the chain starting at `idx`, accumulating its bounds into
    /// `info`. Returns whether the chain is deterministic.
    pub fn study(&self, idx: InstIndex, info: &mut TreeInfo) -> bool {
        let inst = self.instruction(idx);
        let next = inst.next();

        match inst.opcode() {
            Opcode::Accept | Opcode::LastAccept => info.deterministic,
            Opcode::Start(_) => {
                self.study(next, info);
                info.max_valid = false;
                info.deterministic = false;
                false
            }
            Opcode::Consume(_) => {
                info.add_fixed(1);
                self.study(next, info)
            }
            Opcode::Slice(slice) => {
                info.add_fixed(slice.chars.len());
                self.study(next, info)
            }
            Opcode::BoyerMoore(bm) => {
                info.min_length = info.min_length.saturating_add(bm.len());
                info.max_valid = false;
                self.study(next, info)
            }
            Opcode::Ques(ques) => {
                let min_length = info.min_length;
                self.study(ques.atom, info);
                info.min_length = min_length;
                info.deterministic = false;
                self.study(next, info)
            }
            Opcode::Independent(independent) => {
                self.study(independent.atom, info);
                self.study(next, info)
            }
            Opcode::Curly(curly) => {
                let saved = *info;
                info.reset();
                self.study(curly.atom, info);
                info.repeat(saved, curly.min, curly.max);
                self.study(next, info)
            }
            Opcode::GroupCurly(curly) => {
                let saved = *info;
                info.reset();
                self.study(curly.atom, info);
                info.repeat(saved, curly.min, curly.max);
                self.study(next, info)
            }
            Opcode::Branch(branch) => {
                let saved = *info;
                info.reset();
                self.study(branch.preferred, info);
                let preferred = *info;
                info.reset();
                self.study(next, info);

                info.min_length = saved
                    .min_length
                    .saturating_add(preferred.min_length.min(info.min_length));
                info.max_length = saved
                    .max_length
                    .saturating_add(preferred.max_length.max(info.max_length));
                info.max_valid = saved.max_valid && preferred.max_valid && info.max_valid;
                info.deterministic = false;
                false
            }
            // the rest of the chain is unreachable through the loop's study.
            Opcode::Prolog(_) | Opcode::Loop(_) => {
                info.max_valid = false;
                info.deterministic = false;
                false
            }
            Opcode::GroupRef(_)
            | Opcode::BackRef(_)
            | Opcode::LookAhead(_)
            | Opcode::LookBehind(_) => {
                info.max_valid = false;
                info.deterministic = false;
                self.study(next, info)
            }
            Opcode::Anchor(_) | Opcode::Dummy | Opcode::GroupHead(_) | Opcode::GroupTail(_) => {
                self.study(next, info)
            }
        }
    }
}
