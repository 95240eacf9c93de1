//! Provides the instruction graph, static length analysis and backtracking
//! matcher for compiled patterns.
//!
//! Programs are normally produced by `retrace-compiler`, however they can be
//! assembled by hand.
//!
//! # Example
//!
//! ```rust
//! use retrace_runtime::*;
//!
//! // `ab+`
//! let mut program = Instructions::new();
//! let b = program.push(Opcode::Consume(InstConsume::new(CharClass::Single('b'))));
//! let repeat = program.push_with_next(
//!     Opcode::Curly(InstCurly::new(b, 1, MAX_REPS, Policy::Greedy)),
//!     InstIndex::LAST_ACCEPT,
//! );
//! let a = program.push_with_next(
//!     Opcode::Consume(InstConsume::new(CharClass::Single('a'))),
//!     repeat,
//! );
//! let start = program.start(a);
//!
//! let pattern = Pattern::new("ab+", program, start, a);
//! let mut matcher = pattern.matcher("xxabbbx");
//!
//! assert!(matcher.find());
//! assert_eq!(Ok(2), matcher.start());
//! assert_eq!(Ok(6), matcher.end());
//! ```

use std::fmt::{Debug, Display};

pub mod boyer_moore;
pub mod case;
pub mod class;
mod error;
pub mod flags;
pub mod matcher;
mod pattern;
mod slots;
mod study;

pub use boyer_moore::BoyerMoore;
pub use class::{CharClass, ClassMatch, Ctype, Latin1Set};
pub use error::MatchError;
pub use flags::{Flags, UnknownFlag};
pub use matcher::Matcher;
pub use pattern::Pattern;
pub use study::TreeInfo;

/// The upper bound used for unbounded repetitions, `*`, `+` and `{n,}`.
pub const MAX_REPS: usize = 0x7FFF_FFFF;

/// An arena of instructions linked into a graph through their continuation
/// and auxiliary indexes.
///
/// The first two slots are always the plain and end-anchored accept
/// instructions.
#[derive(Debug, Clone, PartialEq)]
pub struct Instructions {
    program: Vec<Instruction>,
    overflowed: bool,
}

impl Instructions {
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: vec![
                Instruction::new(0, Opcode::Accept, InstIndex::ACCEPT),
                Instruction::new(1, Opcode::LastAccept, InstIndex::ACCEPT),
            ],
            overflowed: false,
        }
    }

    /// Appends an instruction that continues into the plain accept.
    pub fn push(&mut self, opcode: Opcode) -> InstIndex {
        self.push_with_next(opcode, InstIndex::ACCEPT)
    }

    /// Appends an instruction with an explicit continuation.
    ///
    /// Indexes are 32 bits wide. Past that the returned index saturates and
    /// the program reports itself as [overflowed](Self::overflowed).
    pub fn push_with_next(&mut self, opcode: Opcode, next: InstIndex) -> InstIndex {
        let id = self.program.len();
        self.program.push(Instruction::new(id, opcode, next));
        InstIndex::try_from(id).unwrap_or_else(|_| {
            self.overflowed = true;
            InstIndex::SATURATED
        })
    }

    /// Whether more instructions were pushed than an [InstIndex] can address.
    /// Such a program links to the wrong instructions and must not be run.
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Appends an unanchored search driver in front of `node`, sized by the
    /// minimum length of everything reachable from it.
    pub fn start(&mut self, node: InstIndex) -> InstIndex {
        let mut info = TreeInfo::new();
        self.study(node, &mut info);

        self.push_with_next(Opcode::Start(InstStart::new(info.min_length)), node)
    }

    /// Relinks the continuation of an instruction.
    pub fn set_next(&mut self, idx: InstIndex, next: InstIndex) {
        self.program[idx.as_usize()].next = next;
    }

    pub fn next_of(&self, idx: InstIndex) -> InstIndex {
        self.program[idx.as_usize()].next
    }

    pub fn instruction(&self, idx: InstIndex) -> &Instruction {
        &self.program[idx.as_usize()]
    }

    pub fn len(&self) -> usize {
        self.program.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Instructions {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Instructions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for inst in self.program.iter() {
            writeln!(f, "{}", inst)?
        }

        Ok(())
    }
}

impl std::ops::Index<InstIndex> for Instructions {
    type Output = Opcode;

    fn index(&self, index: InstIndex) -> &Self::Output {
        &self.program[index.as_usize()].opcode
    }
}

impl std::ops::IndexMut<InstIndex> for Instructions {
    fn index_mut(&mut self, index: InstIndex) -> &mut Self::Output {
        &mut self.program[index.as_usize()].opcode
    }
}

impl AsRef<[Instruction]> for Instructions {
    fn as_ref(&self) -> &[Instruction] {
        &self.program
    }
}

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstIndex(u32);

impl InstIndex {
    /// The plain accept instruction.
    pub const ACCEPT: InstIndex = InstIndex(0);
    /// The accept instruction that honors end anchoring.
    pub const LAST_ACCEPT: InstIndex = InstIndex(1);
    const SATURATED: InstIndex = InstIndex(u32::MAX);

    #[inline]
    fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for InstIndex {
    fn from(ptr: u32) -> Self {
        Self(ptr)
    }
}

impl TryFrom<usize> for InstIndex {
    type Error = std::num::TryFromIntError;

    fn try_from(ptr: usize) -> Result<Self, Self::Error> {
        u32::try_from(ptr).map(Self)
    }
}

impl Display for InstIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:04})", self.as_u32())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    id: usize,
    opcode: Opcode,
    next: InstIndex,
}

impl Instruction {
    #[must_use]
    pub fn new(id: usize, opcode: Opcode, next: InstIndex) -> Self {
        Self { id, opcode, next }
    }

    pub fn opcode(&self) -> &Opcode {
        &self.opcode
    }

    pub fn next(&self) -> InstIndex {
        self.next
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.opcode {
            Opcode::Accept | Opcode::LastAccept | Opcode::Branch(_) => {
                write!(f, "{:04}: {}", self.id, self.opcode)
            }
            _ => write!(f, "{:04}: {} -> {}", self.id, self.opcode, self.next),
        }
    }
}

/// How a repetition trades consumed input against the rest of the pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Take as many repetitions as possible, giving them back one at a time.
    Greedy,
    /// Take as few repetitions as possible, adding them one at a time.
    Lazy,
    /// Take as many repetitions as possible and never give them back.
    Possessive,
}

impl Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Policy::Greedy => write!(f, "greedy"),
            Policy::Lazy => write!(f, "lazy"),
            Policy::Possessive => write!(f, "possessive"),
        }
    }
}

/// The comparison used by literal runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseFolding {
    Sensitive,
    /// Compares ASCII lowercase forms.
    Ascii,
    /// Compares Unicode folded forms.
    Unicode,
}

/// Zero-width position assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Start of the region, `\A` or `^` without multiline.
    Begin,
    /// End of the region, `\z`.
    End,
    /// Start of a line, `^` in multiline mode.
    Caret,
    /// Start of a `\n` delimited line.
    UnixCaret,
    /// End of the previous match, `\G`.
    LastMatch,
    /// Before a final line terminator or at the end of input, or before any
    /// line terminator in multiline mode.
    Dollar { multiline: bool },
    /// The `\n` only variant of `Dollar`.
    UnixDollar { multiline: bool },
    WordBoundary,
    NotWordBoundary,
}

impl Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Anchor::Begin => write!(f, "Begin"),
            Anchor::End => write!(f, "End"),
            Anchor::Caret => write!(f, "Caret"),
            Anchor::UnixCaret => write!(f, "UnixCaret"),
            Anchor::LastMatch => write!(f, "LastMatch"),
            Anchor::Dollar { multiline } => write!(f, "Dollar[multiline: {}]", multiline),
            Anchor::UnixDollar { multiline } => {
                write!(f, "UnixDollar[multiline: {}]", multiline)
            }
            Anchor::WordBoundary => write!(f, "WordBoundary"),
            Anchor::NotWordBoundary => write!(f, "NotWordBoundary"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Opcode {
    Accept,
    LastAccept,
    Start(InstStart),
    Anchor(Anchor),
    Consume(InstConsume),
    Slice(InstSlice),
    BoyerMoore(BoyerMoore),
    Ques(InstQues),
    Curly(InstCurly),
    GroupCurly(InstGroupCurly),
    Independent(InstIndependent),
    Branch(InstBranch),
    Dummy,
    GroupHead(InstGroupHead),
    GroupTail(InstGroupTail),
    GroupRef(InstGroupRef),
    Prolog(InstProlog),
    Loop(InstLoop),
    BackRef(InstBackRef),
    LookAhead(InstLookAhead),
    LookBehind(InstLookBehind),
}

impl Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Opcode::Accept => write!(f, "Accept"),
            Opcode::LastAccept => write!(f, "LastAccept"),
            Opcode::Start(i) => Display::fmt(&i, f),
            Opcode::Anchor(i) => Display::fmt(&i, f),
            Opcode::Consume(i) => Display::fmt(&i, f),
            Opcode::Slice(i) => Display::fmt(&i, f),
            Opcode::BoyerMoore(i) => Display::fmt(&i, f),
            Opcode::Ques(i) => Display::fmt(&i, f),
            Opcode::Curly(i) => Display::fmt(&i, f),
            Opcode::GroupCurly(i) => Display::fmt(&i, f),
            Opcode::Independent(i) => Display::fmt(&i, f),
            Opcode::Branch(i) => Display::fmt(&i, f),
            Opcode::Dummy => write!(f, "Dummy"),
            Opcode::GroupHead(i) => Display::fmt(&i, f),
            Opcode::GroupTail(i) => Display::fmt(&i, f),
            Opcode::GroupRef(i) => Display::fmt(&i, f),
            Opcode::Prolog(i) => Display::fmt(&i, f),
            Opcode::Loop(i) => Display::fmt(&i, f),
            Opcode::BackRef(i) => Display::fmt(&i, f),
            Opcode::LookAhead(i) => Display::fmt(&i, f),
            Opcode::LookBehind(i) => Display::fmt(&i, f),
        }
    }
}

/// Tries the continuation at every offset from the current position up to
/// the last offset that leaves room for `min_length` characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstStart {
    pub min_length: usize,
}

impl InstStart {
    #[must_use]
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }
}

impl Display for InstStart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Start[min: {}]", self.min_length)
    }
}

/// Consumes one character that is a member of the class.
#[derive(Debug, Clone, PartialEq)]
pub struct InstConsume {
    pub class: CharClass,
}

impl InstConsume {
    #[must_use]
    pub fn new(class: CharClass) -> Self {
        Self { class }
    }
}

impl Display for InstConsume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Consume: {}", self.class)
    }
}

/// Consumes a literal run. Folded runs hold their characters pre-folded.
#[derive(Debug, Clone, PartialEq)]
pub struct InstSlice {
    pub chars: Vec<char>,
    pub case: CaseFolding,
}

impl InstSlice {
    #[must_use]
    pub fn new(chars: Vec<char>, case: CaseFolding) -> Self {
        Self { chars, case }
    }
}

impl Display for InstSlice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let literal: String = self.chars.iter().collect();
        write!(f, "Slice[{:?}]: {:?}", self.case, literal)
    }
}

/// Optionally matches `atom`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstQues {
    pub atom: InstIndex,
    pub policy: Policy,
}

impl InstQues {
    #[must_use]
    pub fn new(atom: InstIndex, policy: Policy) -> Self {
        Self { atom, policy }
    }
}

impl Display for InstQues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ques[{}]: {}", self.policy, self.atom)
    }
}

/// Repeats `atom` between `min` and `max` times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstCurly {
    pub atom: InstIndex,
    pub min: usize,
    pub max: usize,
    pub policy: Policy,
}

impl InstCurly {
    #[must_use]
    pub fn new(atom: InstIndex, min: usize, max: usize, policy: Policy) -> Self {
        Self {
            atom,
            min,
            max,
            policy,
        }
    }
}

fn fmt_bound(max: usize) -> String {
    if max == MAX_REPS {
        "inf".to_string()
    } else {
        max.to_string()
    }
}

impl Display for InstCurly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Curly[{}, {{{},{}}}]: {}",
            self.policy,
            self.min,
            fmt_bound(self.max),
            self.atom
        )
    }
}

/// Repeats a deterministic group body in place, writing the capture bounds
/// of the last iteration directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstGroupCurly {
    pub atom: InstIndex,
    pub min: usize,
    pub max: usize,
    pub policy: Policy,
    pub local: usize,
    pub group: Option<usize>,
}

impl InstGroupCurly {
    #[must_use]
    pub fn new(
        atom: InstIndex,
        min: usize,
        max: usize,
        policy: Policy,
        local: usize,
        group: Option<usize>,
    ) -> Self {
        Self {
            atom,
            min,
            max,
            policy,
            local,
            group,
        }
    }
}

impl Display for InstGroupCurly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "GroupCurly[{}, {{{},{}}}, local: {}, group: {:?}]: {}",
            self.policy,
            self.min,
            fmt_bound(self.max),
            self.local,
            self.group,
            self.atom
        )
    }
}

/// Matches `atom` once and commits to the first way it matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstIndependent {
    pub atom: InstIndex,
}

impl InstIndependent {
    #[must_use]
    pub fn new(atom: InstIndex) -> Self {
        Self { atom }
    }
}

impl Display for InstIndependent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Independent: {}", self.atom)
    }
}

/// Tries `preferred` first and falls back to the instruction's continuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstBranch {
    pub preferred: InstIndex,
}

impl InstBranch {
    #[must_use]
    pub fn new(preferred: InstIndex) -> Self {
        Self { preferred }
    }
}

impl Display for InstBranch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Branch: {}", self.preferred)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstGroupHead {
    pub local: usize,
}

impl InstGroupHead {
    #[must_use]
    pub fn new(local: usize) -> Self {
        Self { local }
    }
}

impl Display for InstGroupHead {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GroupHead[local: {}]", self.local)
    }
}

/// Closes a group opened by the head sharing its local slot. Anonymous
/// groups have no capture slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstGroupTail {
    pub local: usize,
    pub group: Option<usize>,
}

impl InstGroupTail {
    #[must_use]
    pub fn new(local: usize, group: Option<usize>) -> Self {
        Self { local, group }
    }
}

impl Display for InstGroupTail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GroupTail[local: {}, group: {:?}]", self.local, self.group)
    }
}

/// Re-enters the body of an earlier group without capturing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstGroupRef {
    pub head: InstIndex,
}

impl InstGroupRef {
    #[must_use]
    pub fn new(head: InstIndex) -> Self {
        Self { head }
    }
}

impl Display for InstGroupRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GroupRef: {}", self.head)
    }
}

/// Entry point of a loop, initializes its iteration counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstProlog {
    pub body_loop: InstIndex,
}

impl InstProlog {
    #[must_use]
    pub fn new(body_loop: InstIndex) -> Self {
        Self { body_loop }
    }
}

impl Display for InstProlog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Prolog: {}", self.body_loop)
    }
}

/// Repeats a non-deterministic group. The group tail of `body` continues
/// back into the loop, which counts iterations in `count_local` and guards
/// against empty iterations with the group's entry position in
/// `begin_local`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstLoop {
    pub body: InstIndex,
    pub count_local: usize,
    pub begin_local: usize,
    pub min: usize,
    pub max: usize,
    pub lazy: bool,
}

impl InstLoop {
    #[must_use]
    pub fn new(
        body: InstIndex,
        count_local: usize,
        begin_local: usize,
        min: usize,
        max: usize,
        lazy: bool,
    ) -> Self {
        Self {
            body,
            count_local,
            begin_local,
            min,
            max,
            lazy,
        }
    }
}

impl Display for InstLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}[{{{},{}}}, count: {}, begin: {}]: {}",
            if self.lazy { "LazyLoop" } else { "Loop" },
            self.min,
            fmt_bound(self.max),
            self.count_local,
            self.begin_local,
            self.body
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstBackRef {
    pub group: usize,
    pub case_insensitive: bool,
}

impl InstBackRef {
    #[must_use]
    pub fn new(group: usize, case_insensitive: bool) -> Self {
        Self {
            group,
            case_insensitive,
        }
    }
}

impl Display for InstBackRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.case_insensitive {
            write!(f, "CIBackRef[{}]", self.group)
        } else {
            write!(f, "BackRef[{}]", self.group)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstLookAhead {
    pub cond: InstIndex,
    pub negated: bool,
}

impl InstLookAhead {
    #[must_use]
    pub fn new(cond: InstIndex, negated: bool) -> Self {
        Self { cond, negated }
    }
}

impl Display for InstLookAhead {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = if self.negated { "Neg" } else { "Pos" };
        write!(f, "{}: {}", name, self.cond)
    }
}

/// Tries `cond` at every start offset between `max` and `min` characters
/// behind the current position, requiring it to end at the current position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstLookBehind {
    pub cond: InstIndex,
    pub min: usize,
    pub max: usize,
    pub negated: bool,
}

impl InstLookBehind {
    #[must_use]
    pub fn new(cond: InstIndex, min: usize, max: usize, negated: bool) -> Self {
        Self {
            cond,
            min,
            max,
            negated,
        }
    }
}

impl Display for InstLookBehind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = if self.negated { "NotBehind" } else { "Behind" };
        write!(f, "{}[{},{}]: {}", name, self.min, self.max, self.cond)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(c: char) -> Opcode {
        Opcode::Consume(InstConsume::new(CharClass::Single(c)))
    }

    #[test]
    fn should_reserve_accept_instructions() {
        let program = Instructions::new();

        assert_eq!(2, program.len());
        assert_eq!(Opcode::Accept, program[InstIndex::ACCEPT]);
        assert_eq!(Opcode::LastAccept, program[InstIndex::LAST_ACCEPT]);
    }

    #[test]
    fn should_refuse_indexes_wider_than_32_bits() {
        let mut program = Instructions::new();

        assert_eq!(InstIndex::from(2), program.push(single('a')));
        assert!(!program.overflowed());
        assert_eq!(Ok(InstIndex::from(u32::MAX)), InstIndex::try_from(u32::MAX as usize));
        #[cfg(target_pointer_width = "64")]
        assert!(InstIndex::try_from(1usize << 32).is_err());
    }

    #[test]
    fn should_evaluate_simple_linear_match_expression() {
        // `ab`
        let mut program = Instructions::new();
        let b = program.push_with_next(single('b'), InstIndex::LAST_ACCEPT);
        let a = program.push_with_next(single('a'), b);
        let start = program.start(a);
        let pattern = Pattern::new("ab", program, start, a);

        let input_output = vec![
            ("ab", Some((0, 2))),
            ("aab", Some((1, 3))),
            ("ba", None),
            ("", None),
        ];

        for (test_id, (input, expected_res)) in input_output.into_iter().enumerate() {
            let mut matcher = pattern.matcher(input);
            let res = matcher
                .find()
                .then(|| (matcher.start().unwrap(), matcher.end().unwrap()));
            assert_eq!((test_id, expected_res), (test_id, res))
        }
    }

    #[test]
    fn should_evaluate_alternation_expression() {
        // `a|b`
        let mut program = Instructions::new();
        let a = program.push_with_next(single('a'), InstIndex::LAST_ACCEPT);
        let b = program.push_with_next(single('b'), InstIndex::LAST_ACCEPT);
        let branch = program.push_with_next(Opcode::Branch(InstBranch::new(a)), b);
        let start = program.start(branch);
        let pattern = Pattern::new("a|b", program, start, branch);

        let input_output = vec![
            ("a", Some(0)),
            ("b", Some(0)),
            ("cb", Some(1)),
            ("c", None),
        ];

        for (test_id, (input, expected_res)) in input_output.into_iter().enumerate() {
            let mut matcher = pattern.matcher(input);
            let res = matcher.find().then(|| matcher.start().unwrap());
            assert_eq!((test_id, expected_res), (test_id, res))
        }
    }

    #[test]
    fn should_size_start_by_minimum_length() {
        // `abc`
        let mut program = Instructions::new();
        let slice = program.push_with_next(
            Opcode::Slice(InstSlice::new(vec!['a', 'b', 'c'], CaseFolding::Sensitive)),
            InstIndex::LAST_ACCEPT,
        );
        let start = program.start(slice);

        assert_eq!(Opcode::Start(InstStart::new(3)), program[start]);
    }

    #[test]
    fn should_display_program_listing() {
        let mut program = Instructions::new();
        let a = program.push_with_next(single('a'), InstIndex::LAST_ACCEPT);
        program.start(a);

        assert_eq!(
            "0000: Accept\n0001: LastAccept\n0002: Consume: 'a' -> (0001)\n0003: Start[min: 1] -> (0002)\n",
            program.to_string()
        );
    }
}
