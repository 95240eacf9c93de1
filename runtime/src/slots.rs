//! Capture and loop-local storage for a single matcher, with explicit
//! checkpoints for backtracking.

/// The state held in a loop-local slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Local {
    /// Never entered, or entered through a flattened repetition. A group
    /// tail reading this state acts as the end of its body.
    Unset,
    /// A loop iteration counter.
    Count(usize),
    /// The position at which a group body was entered.
    Entered(usize),
    /// The position at which a group body was re-entered by reference. The
    /// group tail acts as the end of the body without capturing.
    Referenced(usize),
}

impl Local {
    pub(crate) fn count(self) -> usize {
        match self {
            Local::Count(count) => count,
            _ => 0,
        }
    }

    /// Reports whether `position` moved past the recorded entry position.
    /// Slots without an entry position never block progress.
    pub(crate) fn is_passed_by(self, position: usize) -> bool {
        match self {
            Local::Entered(entry) => position > entry,
            _ => true,
        }
    }
}

/// A saved capture span that can be written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GroupCheckpoint {
    group: usize,
    span: (Option<usize>, Option<usize>),
}

/// A saved loop-local value that can be written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LocalCheckpoint {
    local: usize,
    value: Local,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Slots {
    groups: Vec<(Option<usize>, Option<usize>)>,
    locals: Vec<Local>,
}

impl Slots {
    /// Allocates slots for `group_count` capturing groups plus group 0.
    pub(crate) fn new(group_count: usize, local_count: usize) -> Self {
        Self {
            groups: vec![(None, None); group_count + 1],
            locals: vec![Local::Unset; local_count],
        }
    }

    pub(crate) fn clear(&mut self) {
        self.groups.iter_mut().for_each(|span| *span = (None, None));
        self.locals.iter_mut().for_each(|local| *local = Local::Unset);
    }

    /// Returns the span of a group only when both ends are set.
    pub(crate) fn span(&self, group: usize) -> Option<(usize, usize)> {
        match self.groups.get(group) {
            Some((Some(start), Some(end))) => Some((*start, *end)),
            _ => None,
        }
    }

    pub(crate) fn set_group(&mut self, group: usize, start: usize, end: usize) {
        self.groups[group] = (Some(start), Some(end));
    }

    pub(crate) fn checkpoint_group(&self, group: usize) -> GroupCheckpoint {
        GroupCheckpoint {
            group,
            span: self.groups[group],
        }
    }

    pub(crate) fn restore_group(&mut self, checkpoint: GroupCheckpoint) {
        self.groups[checkpoint.group] = checkpoint.span;
    }

    pub(crate) fn local(&self, local: usize) -> Local {
        self.locals[local]
    }

    pub(crate) fn set_local(&mut self, local: usize, value: Local) {
        self.locals[local] = value;
    }

    /// Overwrites a local, returning a checkpoint of the prior value.
    pub(crate) fn replace_local(&mut self, local: usize, value: Local) -> LocalCheckpoint {
        let checkpoint = LocalCheckpoint {
            local,
            value: self.locals[local],
        };
        self.locals[local] = value;
        checkpoint
    }

    pub(crate) fn restore_local(&mut self, checkpoint: LocalCheckpoint) {
        self.locals[checkpoint.local] = checkpoint.value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_restore_groups_to_checkpoint() {
        let mut slots = Slots::new(2, 0);
        slots.set_group(1, 2, 4);

        let checkpoint = slots.checkpoint_group(1);
        slots.set_group(1, 5, 9);
        assert_eq!(Some((5, 9)), slots.span(1));

        slots.restore_group(checkpoint);
        assert_eq!(Some((2, 4)), slots.span(1));
        assert_eq!(None, slots.span(2));
    }

    #[test]
    fn should_restore_locals_to_checkpoint() {
        let mut slots = Slots::new(0, 1);

        let outer = slots.replace_local(0, Local::Entered(3));
        let inner = slots.replace_local(0, Local::Referenced(7));
        assert_eq!(Local::Referenced(7), slots.local(0));

        slots.restore_local(inner);
        assert_eq!(Local::Entered(3), slots.local(0));
        slots.restore_local(outer);
        assert_eq!(Local::Unset, slots.local(0));
    }

    #[test]
    fn should_only_guard_against_recorded_entries() {
        assert!(Local::Entered(3).is_passed_by(4));
        assert!(!Local::Entered(3).is_passed_by(3));
        assert!(Local::Referenced(3).is_passed_by(3));
        assert!(Local::Unset.is_passed_by(0));
    }

    #[test]
    fn should_clear_all_slots() {
        let mut slots = Slots::new(1, 1);
        slots.set_group(1, 0, 1);
        slots.set_local(0, Local::Count(2));

        slots.clear();
        assert_eq!(None, slots.span(1));
        assert_eq!(0, slots.local(0).count());
    }
}
