//! Backtracking interpretation of the instruction graph.
//!
//! Each instruction tries its own condition at a position and, when that
//! holds, hands the following position to its continuation. Alternatives
//! are retried on the way back out of the recursion, so the native stack
//! depth grows with the input consumed by repetitions that are not
//! flattened.

use super::{AcceptMode, Matcher};
use crate::case;
use crate::class::{is_line_terminator, ClassMatch};
use crate::slots::{GroupCheckpoint, Local};
use crate::{
    Anchor, CaseFolding, InstBackRef, InstCurly, InstGroupCurly, InstIndex, InstLookBehind,
    InstLoop, Opcode, Pattern, Policy,
};

impl<'p, 't> Matcher<'p, 't> {
    /// Matches the chain starting at `idx` against the input at `i`.
    pub(super) fn run(&mut self, idx: InstIndex, i: usize) -> bool {
        let pattern: &'p Pattern = self.pattern;
        let inst = pattern.program().instruction(idx);
        let next = inst.next();

        match inst.opcode() {
            Opcode::Accept => self.accept(i),
            Opcode::LastAccept => {
                if self.accept_mode == AcceptMode::EndAnchor && i != self.to {
                    false
                } else {
                    self.accept(i)
                }
            }
            Opcode::Start(start) => {
                let Some(guard) = self.to.checked_sub(start.min_length) else {
                    return false;
                };

                for position in i..=guard {
                    if self.run(next, position) {
                        self.first = position;
                        self.slots.set_group(0, self.first, self.last);
                        return true;
                    }
                }
                false
            }
            Opcode::Anchor(Anchor::Begin) => {
                if i == self.from && self.run(next, i) {
                    self.first = i;
                    self.slots.set_group(0, self.first, self.last);
                    true
                } else {
                    false
                }
            }
            Opcode::Anchor(anchor) => self.anchor(*anchor, i) && self.run(next, i),
            Opcode::Consume(consume) => {
                i < self.to && consume.class.in_set(self.chars[i]) && self.run(next, i + 1)
            }
            Opcode::Slice(slice) => {
                let len = slice.chars.len();
                if i + len > self.to {
                    return false;
                }

                let input = &self.chars[i..i + len];
                let matched = match slice.case {
                    CaseFolding::Sensitive => slice.chars.as_slice() == input,
                    CaseFolding::Ascii => slice
                        .chars
                        .iter()
                        .zip(input)
                        .all(|(expected, c)| *expected == case::ascii_fold(*c)),
                    CaseFolding::Unicode => slice
                        .chars
                        .iter()
                        .zip(input)
                        .all(|(expected, c)| *expected == case::fold(*c)),
                };

                matched && self.run(next, i + len)
            }
            Opcode::BoyerMoore(bm) => {
                let mut from = i;
                while let Some(found) = bm.find(&self.chars, from, self.to) {
                    self.first = found;
                    if self.run(next, found + bm.len()) {
                        self.first = found;
                        self.slots.set_group(0, self.first, self.last);
                        return true;
                    }
                    from = found + 1;
                }
                false
            }
            Opcode::Ques(ques) => match ques.policy {
                Policy::Greedy => {
                    if self.run(ques.atom, i) {
                        let after = self.last;
                        if self.run(next, after) {
                            return true;
                        }
                    }
                    self.run(next, i)
                }
                Policy::Lazy => {
                    self.run(next, i) || {
                        self.run(ques.atom, i) && {
                            let after = self.last;
                            self.run(next, after)
                        }
                    }
                }
                Policy::Possessive => {
                    let after = if self.run(ques.atom, i) { self.last } else { i };
                    self.run(next, after)
                }
            },
            Opcode::Curly(curly) => self.curly(curly, next, i),
            Opcode::GroupCurly(curly) => self.group_curly(curly, next, i),
            Opcode::Independent(independent) => {
                self.run(independent.atom, i) && {
                    let after = self.last;
                    self.run(next, after)
                }
            }
            Opcode::Branch(branch) => self.run(branch.preferred, i) || self.run(next, i),
            Opcode::Dummy => self.run(next, i),
            Opcode::GroupHead(head) => {
                let checkpoint = self.slots.replace_local(head.local, Local::Entered(i));
                let matched = self.run(next, i);
                self.slots.restore_local(checkpoint);
                matched
            }
            Opcode::GroupTail(tail) => match self.slots.local(tail.local) {
                Local::Entered(start) => {
                    let checkpoint = self.write_group(tail.group, start, i);
                    if self.run(next, i) {
                        return true;
                    }
                    self.restore_group(checkpoint);
                    false
                }
                // the body was entered by reference or by a flattened
                // repetition, which records the bounds itself.
                _ => {
                    self.last = i;
                    true
                }
            },
            Opcode::GroupRef(group_ref) => {
                let Opcode::GroupHead(head) = &pattern.program()[group_ref.head] else {
                    return false;
                };
                let body = pattern.program().next_of(group_ref.head);

                let checkpoint = self.slots.replace_local(head.local, Local::Referenced(i));
                let matched = self.run(body, i);
                self.slots.restore_local(checkpoint);

                matched && {
                    let after = self.last;
                    self.run(next, after)
                }
            }
            Opcode::Prolog(prolog) => {
                let Opcode::Loop(body_loop) = &pattern.program()[prolog.body_loop] else {
                    return false;
                };
                let loop_next = pattern.program().next_of(prolog.body_loop);
                self.loop_init(body_loop, loop_next, i)
            }
            Opcode::Loop(body_loop) => self.loop_iterate(body_loop, next, i),
            Opcode::BackRef(backref) => self.back_reference(backref, next, i),
            Opcode::LookAhead(look) => {
                let matched = self.run(look.cond, i);
                matched != look.negated && self.run(next, i)
            }
            Opcode::LookBehind(look) => self.look_behind(look, next, i),
        }
    }

    fn accept(&mut self, i: usize) -> bool {
        self.last = i;
        self.slots.set_group(0, self.first, i);
        true
    }

    fn char_at(&self, i: usize) -> Option<char> {
        self.chars.get(i).copied()
    }

    /// Evaluates a zero-width assertion other than `Begin`.
    fn anchor(&self, anchor: Anchor, i: usize) -> bool {
        match anchor {
            Anchor::Begin => i == self.from,
            Anchor::End => i == self.to,
            Anchor::Caret => {
                if i > self.from {
                    let prev = self.chars[i - 1];
                    if !is_line_terminator(prev) {
                        return false;
                    }
                    // \r\n is a single terminator.
                    if prev == '\r' && self.char_at(i) == Some('\n') {
                        return false;
                    }
                }
                i != self.to
            }
            Anchor::UnixCaret => {
                if i > self.from && self.chars[i - 1] != '\n' {
                    return false;
                }
                i != self.to
            }
            Anchor::LastMatch => self.old_last == Some(i),
            Anchor::Dollar { multiline } => {
                if !multiline {
                    if i + 2 < self.to {
                        return false;
                    }
                    if i + 2 == self.to
                        && (self.char_at(i) != Some('\r') || self.char_at(i + 1) != Some('\n'))
                    {
                        return false;
                    }
                }

                if i < self.to {
                    match self.chars[i] {
                        '\n' => i == 0 || self.chars[i - 1] != '\r',
                        c => is_line_terminator(c),
                    }
                } else {
                    true
                }
            }
            Anchor::UnixDollar { multiline } => {
                if i < self.to {
                    self.chars[i] == '\n' && (multiline || i + 1 == self.to)
                } else {
                    true
                }
            }
            Anchor::WordBoundary | Anchor::NotWordBoundary => {
                let left = i > self.from && case::is_word(self.chars[i - 1]);
                let right = i < self.to && case::is_word(self.chars[i]);
                (left != right) == (anchor == Anchor::WordBoundary)
            }
        }
    }

    fn write_group(
        &mut self,
        group: Option<usize>,
        start: usize,
        end: usize,
    ) -> Option<GroupCheckpoint> {
        group.map(|group| {
            let checkpoint = self.slots.checkpoint_group(group);
            self.slots.set_group(group, start, end);
            checkpoint
        })
    }

    fn restore_group(&mut self, checkpoint: Option<GroupCheckpoint>) {
        if let Some(checkpoint) = checkpoint {
            self.slots.restore_group(checkpoint);
        }
    }

    fn curly(&mut self, curly: &'p InstCurly, next: InstIndex, mut i: usize) -> bool {
        for _ in 0..curly.min {
            if !self.run(curly.atom, i) {
                return false;
            }
            i = self.last;
        }

        match curly.policy {
            Policy::Greedy => self.curly_greedy(curly, next, i, curly.min),
            Policy::Lazy => {
                let mut count = curly.min;
                loop {
                    if self.run(next, i) {
                        return true;
                    }
                    if count >= curly.max || !self.run(curly.atom, i) || self.last == i {
                        return false;
                    }
                    i = self.last;
                    count += 1;
                }
            }
            Policy::Possessive => {
                let mut count = curly.min;
                while count < curly.max && self.run(curly.atom, i) && self.last != i {
                    i = self.last;
                    count += 1;
                }
                self.run(next, i)
            }
        }
    }

    /// Takes as many repetitions as possible from `count`, then gives them
    /// back one at a time. Repetitions of a different width than the first
    /// restart the expansion from there.
    fn curly_greedy(
        &mut self,
        curly: &'p InstCurly,
        next: InstIndex,
        mut i: usize,
        mut count: usize,
    ) -> bool {
        if count >= curly.max || !self.run(curly.atom, i) {
            return self.run(next, i);
        }

        let width = self.last.saturating_sub(i);
        if width == 0 {
            return self.run(next, i);
        }

        let back_limit = count;
        i = self.last;
        count += 1;
        while count < curly.max {
            if !self.run(curly.atom, i) {
                break;
            }
            if i + width != self.last {
                if self.curly_greedy(curly, next, self.last, count + 1) {
                    return true;
                }
                break;
            }
            i += width;
            count += 1;
        }

        loop {
            if self.run(next, i) {
                return true;
            }
            if count == back_limit {
                return false;
            }
            i -= width;
            count -= 1;
        }
    }

    /// Repeats a deterministic group body in place. The body's tail finds
    /// its local unset and returns, leaving the bounds to be written here.
    fn group_curly(&mut self, curly: &'p InstGroupCurly, next: InstIndex, mut i: usize) -> bool {
        let local = self.slots.replace_local(curly.local, Local::Unset);
        let group = curly.group.map(|group| self.slots.checkpoint_group(group));

        let mut matched = true;
        for _ in 0..curly.min {
            if !self.run(curly.atom, i) {
                matched = false;
                break;
            }
            let end = self.last;
            self.write_group(curly.group, i, end);
            i = end;
        }

        if matched {
            matched = match curly.policy {
                Policy::Greedy => self.group_curly_greedy(curly, next, i, curly.min),
                Policy::Lazy => self.group_curly_lazy(curly, next, i),
                Policy::Possessive => {
                    let mut count = curly.min;
                    while count < curly.max && self.run(curly.atom, i) {
                        let end = self.last;
                        self.write_group(curly.group, i, end);
                        if end == i {
                            break;
                        }
                        i = end;
                        count += 1;
                    }
                    self.run(next, i)
                }
            };
        }

        if !matched {
            self.slots.restore_local(local);
            self.restore_group(group);
        }
        matched
    }

    fn group_curly_greedy(
        &mut self,
        curly: &'p InstGroupCurly,
        next: InstIndex,
        mut i: usize,
        mut count: usize,
    ) -> bool {
        let saved = curly.group.map(|group| self.slots.checkpoint_group(group));
        let back_limit = count;

        if count < curly.max && self.run(curly.atom, i) {
            let width = self.last.saturating_sub(i);
            if width > 0 {
                loop {
                    self.write_group(curly.group, i, i + width);
                    i += width;
                    count += 1;
                    if count >= curly.max || !self.run(curly.atom, i) {
                        break;
                    }
                    if i + width != self.last {
                        if self.group_curly_greedy(curly, next, i, count) {
                            return true;
                        }
                        break;
                    }
                }

                while count > back_limit {
                    if self.run(next, i) {
                        return true;
                    }
                    i -= width;
                    count -= 1;
                    if count > back_limit {
                        self.write_group(curly.group, i - width, i);
                    }
                }
            }
        }

        self.restore_group(saved);
        self.run(next, i)
    }

    fn group_curly_lazy(&mut self, curly: &'p InstGroupCurly, next: InstIndex, mut i: usize) -> bool {
        let mut count = curly.min;
        loop {
            if self.run(next, i) {
                return true;
            }
            if count >= curly.max || !self.run(curly.atom, i) || self.last == i {
                return false;
            }
            let end = self.last;
            self.write_group(curly.group, i, end);
            i = end;
            count += 1;
        }
    }

    /// Enters a loop from its prolog with the iteration counter at one.
    fn loop_init(&mut self, body_loop: &'p InstLoop, next: InstIndex, i: usize) -> bool {
        let saved = self.slots.replace_local(body_loop.count_local, Local::Count(1));

        let matched = if body_loop.min > 0 {
            self.run(body_loop.body, i)
        } else if body_loop.lazy {
            self.run(next, i) || (body_loop.max > 0 && self.run(body_loop.body, i))
        } else if body_loop.max > 0 {
            self.run(body_loop.body, i) || self.run(next, i)
        } else {
            self.run(next, i)
        };

        self.slots.restore_local(saved);
        matched
    }

    /// Re-entered from the tail of the loop body after each iteration.
    fn loop_iterate(&mut self, body_loop: &'p InstLoop, next: InstIndex, i: usize) -> bool {
        // an iteration that consumed nothing ends the loop.
        if !self.slots.local(body_loop.begin_local).is_passed_by(i) {
            return self.run(next, i);
        }

        let count = self.slots.local(body_loop.count_local).count();
        if count < body_loop.min {
            return self.loop_body(body_loop, count, i);
        }

        if body_loop.lazy {
            self.run(next, i) || (count < body_loop.max && self.loop_body(body_loop, count, i))
        } else {
            (count < body_loop.max && self.loop_body(body_loop, count, i)) || self.run(next, i)
        }
    }

    fn loop_body(&mut self, body_loop: &'p InstLoop, count: usize, i: usize) -> bool {
        self.slots
            .set_local(body_loop.count_local, Local::Count(count + 1));
        let matched = self.run(body_loop.body, i);
        if !matched {
            self.slots.set_local(body_loop.count_local, Local::Count(count));
        }
        matched
    }

    fn back_reference(&mut self, backref: &'p InstBackRef, next: InstIndex, i: usize) -> bool {
        let Some((start, end)) = self.slots.span(backref.group) else {
            return false;
        };
        let len = end - start;
        if i + len > self.to {
            return false;
        }

        let captured = &self.chars[start..end];
        let input = &self.chars[i..i + len];
        let matched = if backref.case_insensitive {
            captured.iter().zip(input).all(|(a, b)| {
                a == b || {
                    let (a, b) = (case::to_upper(*a), case::to_upper(*b));
                    a == b || case::to_lower(a) == case::to_lower(b)
                }
            })
        } else {
            captured == input
        };

        matched && self.run(next, i + len)
    }

    /// Tries the condition from the nearest start offset outwards, requiring
    /// it to end exactly at `i`.
    fn look_behind(&mut self, look: &'p InstLookBehind, next: InstIndex, i: usize) -> bool {
        let lower = i.saturating_sub(look.max).max(self.from);
        let found = match i.checked_sub(look.min) {
            Some(upper) if upper >= lower => (lower..=upper)
                .rev()
                .any(|start| self.run(look.cond, start) && self.last == i),
            _ => false,
        };

        found != look.negated && self.run(next, i)
    }
}
