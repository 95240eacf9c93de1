use std::collections::HashMap;
use std::ops::Range;

use retrace_runtime::{Anchor, CaseFolding, CharClass, Policy};

/// A parsed pattern. Flags are already resolved into the terms they affect,
/// so the tree carries no flag state of its own.
#[derive(Debug, PartialEq)]
pub struct Regex {
    pub expression: Expression,
    pub group_count: usize,
    pub group_names: HashMap<String, usize>,
}

// Expression

/// Alternatives, tried left to right.
#[derive(Debug, PartialEq)]
pub struct Expression(pub Vec<Sequence>);

#[derive(Debug, PartialEq)]
pub struct Sequence(pub Vec<Term>);

impl From<Term> for Sequence {
    fn from(src: Term) -> Self {
        Self(vec![src])
    }
}

impl From<Sequence> for Expression {
    fn from(src: Sequence) -> Self {
        Self(vec![src])
    }
}

#[derive(Debug, PartialEq)]
pub enum Term {
    /// Any single character matcher, including `.` and escaped classes.
    Class(CharClass),
    /// A run of literal characters, pre-folded for its comparison.
    Literal {
        chars: Vec<char>,
        case: CaseFolding,
    },
    Anchor(Anchor),
    BackReference {
        group: usize,
        case_insensitive: bool,
    },
    /// `(?n)`, the body of an already opened group.
    GroupReference(usize),
    Group(Group),
    Quantified {
        term: Box<Term>,
        quantifier: Quantifier,
    },
}

impl Term {
    /// Applies a quantifier to the term.
    pub fn quantify(self, quantifier: Quantifier) -> Self {
        Self::Quantified {
            term: Box::new(self),
            quantifier,
        }
    }
}

impl From<CharClass> for Term {
    fn from(src: CharClass) -> Self {
        Self::Class(src)
    }
}

impl From<Anchor> for Term {
    fn from(src: Anchor) -> Self {
        Self::Anchor(src)
    }
}

impl From<Group> for Term {
    fn from(src: Group) -> Self {
        Self::Group(src)
    }
}

// Group

#[derive(Debug, PartialEq)]
pub struct Group {
    pub kind: GroupKind,
    pub expression: Expression,
    /// Offsets of the opening and one past the closing parenthesis.
    pub span: Range<usize>,
}

impl Group {
    pub fn new(kind: GroupKind, expression: Expression, span: Range<usize>) -> Self {
        Self {
            kind,
            expression,
            span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Capturing(usize),
    NonCapturing,
    LookAhead { negated: bool },
    LookBehind { negated: bool },
    Independent,
}

// Quantifiers

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    /// `?`
    Optional(Policy),
    /// `*`, `+` and the counted forms.
    Repeat {
        min: usize,
        max: usize,
        policy: Policy,
    },
}

impl Quantifier {
    pub fn policy(&self) -> Policy {
        match self {
            Quantifier::Optional(policy) => *policy,
            Quantifier::Repeat { policy, .. } => *policy,
        }
    }
}
