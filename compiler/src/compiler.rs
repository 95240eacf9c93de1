//! Lowers a parsed pattern into the linked instruction graph executed by
//! `retrace-runtime`.
//!
//! Every term is generated as a `(head, tail)` pair of instructions. A
//! sequence links each tail to the following head and the last tail to the
//! continuation it was handed, so alternatives and group bodies all share a
//! single continuation without copying.
//!
//! # Example
//!
//! ```
//! use retrace_compiler::compiler::compile;
//! use retrace_compiler::parser::parse;
//! use retrace_runtime::{Flags, Opcode};
//!
//! let regex = parse("(ab)+c", Flags::empty()).unwrap();
//! let program = compile(regex, "(ab)+c").unwrap();
//!
//! assert!(matches!(
//!     program.instructions[program.match_root],
//!     Opcode::GroupCurly(_)
//! ));
//! ```

use std::collections::HashMap;

use log::{debug, trace};
use retrace_runtime::*;

use super::ast;
use super::error::{PatternSyntaxError, SyntaxErrorKind};

/// A generated program along with its entry points.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub instructions: Instructions,
    /// Entry point for searches.
    pub root: InstIndex,
    /// Entry point for anchored matches.
    pub match_root: InstIndex,
    pub local_count: usize,
}

/// Accepts a parsed pattern and generates its program. `pattern` is the text
/// the tree was parsed from, used to position errors.
pub fn compile(regex: ast::Regex, pattern: &str) -> Result<Program, PatternSyntaxError> {
    let mut generator = Generator::new(pattern);
    let match_root = generator.expression(regex.expression, InstIndex::LAST_ACCEPT)?;
    if generator.program.overflowed() {
        return generator.error(SyntaxErrorKind::PatternTooLarge, None);
    }
    let root = generator.root(match_root);

    debug!(
        "generated {} instructions with {} locals for {:?}",
        generator.program.len(),
        generator.local_count,
        pattern
    );

    Ok(Program {
        instructions: generator.program,
        root,
        match_root,
        local_count: generator.local_count,
    })
}

type HeadTail = (InstIndex, InstIndex);

struct Generator<'a> {
    program: Instructions,
    local_count: usize,
    /// Heads of the capturing groups generated so far, for `(?n)`.
    group_heads: HashMap<usize, InstIndex>,
    pattern: &'a str,
}

impl<'a> Generator<'a> {
    fn new(pattern: &'a str) -> Self {
        Self {
            program: Instructions::new(),
            local_count: 0,
            group_heads: HashMap::new(),
            pattern,
        }
    }

    fn new_local(&mut self) -> usize {
        let local = self.local_count;
        self.local_count += 1;
        local
    }

    fn error<T>(&self, kind: SyntaxErrorKind, index: Option<usize>) -> Result<T, PatternSyntaxError> {
        Err(PatternSyntaxError::new(kind, self.pattern, index))
    }

    /// Picks the search entry point. A case sensitive literal prefix is
    /// searched for directly, a pattern anchored at the beginning is only
    /// tried once and anything else is tried at every offset.
    fn root(&mut self, match_root: InstIndex) -> InstIndex {
        let boyer_moore = match &self.program[match_root] {
            Opcode::Slice(slice) if slice.case == CaseFolding::Sensitive => {
                BoyerMoore::new(&slice.chars)
            }
            _ => None,
        };
        let anchored = matches!(self.program[match_root], Opcode::Anchor(Anchor::Begin));

        if let Some(boyer_moore) = boyer_moore {
            trace!("searching for a literal prefix of {} chars", boyer_moore.len());
            let next = self.program.next_of(match_root);
            self.program
                .push_with_next(Opcode::BoyerMoore(boyer_moore), next)
        } else if anchored {
            trace!("pattern is anchored at the beginning");
            match_root
        } else {
            self.program.start(match_root)
        }
    }

    /// Alternatives are folded into a left nested chain of branches, each
    /// preferring everything to its left.
    fn expression(
        &mut self,
        expression: ast::Expression,
        end: InstIndex,
    ) -> Result<InstIndex, PatternSyntaxError> {
        let mut prev: Option<InstIndex> = None;

        for sequence in expression.0 {
            let node = self.sequence(sequence, end)?;
            prev = Some(match prev {
                None => node,
                Some(preferred) => self
                    .program
                    .push_with_next(Opcode::Branch(InstBranch::new(preferred)), node),
            });
        }

        Ok(prev.unwrap_or(end))
    }

    fn sequence(
        &mut self,
        sequence: ast::Sequence,
        end: InstIndex,
    ) -> Result<InstIndex, PatternSyntaxError> {
        let mut head: Option<InstIndex> = None;
        let mut tail: Option<InstIndex> = None;

        for term in sequence.0 {
            let (term_head, term_tail) = self.term(term)?;
            match tail {
                None => head = Some(term_head),
                Some(prev) => self.program.set_next(prev, term_head),
            }
            tail = Some(term_tail);
        }

        match (head, tail) {
            (Some(head), Some(tail)) => {
                self.program.set_next(tail, end);
                Ok(head)
            }
            _ => Ok(end),
        }
    }

    fn term(&mut self, term: ast::Term) -> Result<HeadTail, PatternSyntaxError> {
        let node = match term {
            ast::Term::Group(group) => return self.group(group, None),
            ast::Term::Quantified { term, quantifier } => match *term {
                ast::Term::Group(group) => return self.group(group, Some(quantifier)),
                atom => {
                    let (atom, _) = self.term(atom)?;
                    self.quantify(atom, quantifier)
                }
            },
            ast::Term::Class(class) => self.program.push(Opcode::Consume(InstConsume::new(class))),
            ast::Term::Literal { chars, case } => {
                self.program.push(Opcode::Slice(InstSlice::new(chars, case)))
            }
            ast::Term::Anchor(anchor) => self.program.push(Opcode::Anchor(anchor)),
            ast::Term::BackReference {
                group,
                case_insensitive,
            } => self
                .program
                .push(Opcode::BackRef(InstBackRef::new(group, case_insensitive))),
            ast::Term::GroupReference(group) => match self.group_heads.get(&group) {
                Some(head) => self.program.push(Opcode::GroupRef(InstGroupRef::new(*head))),
                None => return self.error(SyntaxErrorKind::UnknownGroupReference, None),
            },
        };

        Ok((node, node))
    }

    /// Wraps a single instruction, whose continuation is left at the plain
    /// accept, in a repetition.
    fn quantify(&mut self, atom: InstIndex, quantifier: ast::Quantifier) -> InstIndex {
        match quantifier {
            ast::Quantifier::Optional(policy) => {
                self.program.push(Opcode::Ques(InstQues::new(atom, policy)))
            }
            ast::Quantifier::Repeat { min, max, policy } => self
                .program
                .push(Opcode::Curly(InstCurly::new(atom, min, max, policy))),
        }
    }

    fn group(
        &mut self,
        group: ast::Group,
        quantifier: Option<ast::Quantifier>,
    ) -> Result<HeadTail, PatternSyntaxError> {
        let capture = match group.kind {
            ast::GroupKind::Capturing(idx) => Some(idx),
            ast::GroupKind::NonCapturing => None,
            ast::GroupKind::LookAhead { negated } => {
                let cond = self.expression(group.expression, InstIndex::ACCEPT)?;
                let node = self
                    .program
                    .push(Opcode::LookAhead(InstLookAhead::new(cond, negated)));
                return Ok(self.quantify_assertion(node, quantifier));
            }
            ast::GroupKind::LookBehind { negated } => {
                let cond = self.expression(group.expression, InstIndex::ACCEPT)?;

                let mut info = TreeInfo::new();
                self.program.study(cond, &mut info);
                if !info.max_valid {
                    // positioned on the last character of the group body.
                    let index = group.span.end.checked_sub(2);
                    return self.error(SyntaxErrorKind::UnboundedLookBehind, index);
                }

                let node = self.program.push(Opcode::LookBehind(InstLookBehind::new(
                    cond,
                    info.min_length,
                    info.max_length,
                    negated,
                )));
                return Ok(self.quantify_assertion(node, quantifier));
            }
            ast::GroupKind::Independent => {
                let atom = self.expression(group.expression, InstIndex::ACCEPT)?;
                let node = self
                    .program
                    .push(Opcode::Independent(InstIndependent::new(atom)));
                return Ok(self.quantify_assertion(node, quantifier));
            }
        };

        let local = self.new_local();
        let head = self
            .program
            .push(Opcode::GroupHead(InstGroupHead::new(local)));
        if let Some(idx) = capture {
            self.group_heads.insert(idx, head);
        }
        let tail = self
            .program
            .push(Opcode::GroupTail(InstGroupTail::new(local, capture)));

        let body = self.expression(group.expression, tail)?;
        self.program.set_next(head, body);

        Ok(self.close_group(head, tail, local, capture, quantifier))
    }

    fn quantify_assertion(
        &mut self,
        node: InstIndex,
        quantifier: Option<ast::Quantifier>,
    ) -> HeadTail {
        match quantifier {
            Some(quantifier) => {
                let node = self.quantify(node, quantifier);
                (node, node)
            }
            None => (node, node),
        }
    }

    /// Applies a quantifier to a generated group.
    ///
    /// A deterministic body is repeated in place by a `GroupCurly`. Any other
    /// body is looped through its tail so every iteration can be backtracked
    /// into.
    fn close_group(
        &mut self,
        head: InstIndex,
        tail: InstIndex,
        local: usize,
        capture: Option<usize>,
        quantifier: Option<ast::Quantifier>,
    ) -> HeadTail {
        let quantifier = match quantifier {
            Some(quantifier) => quantifier,
            None => return (head, tail),
        };

        match quantifier {
            ast::Quantifier::Optional(Policy::Possessive) => {
                let node = self.quantify(head, quantifier);
                (node, node)
            }
            ast::Quantifier::Optional(policy) => {
                let dummy = self.program.push(Opcode::Dummy);
                self.program.set_next(tail, dummy);

                let branch = if policy == Policy::Lazy {
                    self.program
                        .push_with_next(Opcode::Branch(InstBranch::new(dummy)), head)
                } else {
                    self.program
                        .push_with_next(Opcode::Branch(InstBranch::new(head)), dummy)
                };
                (branch, dummy)
            }
            ast::Quantifier::Repeat {
                policy: Policy::Possessive,
                ..
            } => {
                let node = self.quantify(head, quantifier);
                (node, node)
            }
            ast::Quantifier::Repeat { min, max, policy } => {
                let mut info = TreeInfo::new();
                if self.program.study(head, &mut info) {
                    trace!("flattening deterministic group at {}", head);
                    let atom = self.program.next_of(head);
                    let node = self.program.push(Opcode::GroupCurly(InstGroupCurly::new(
                        atom, min, max, policy, local, capture,
                    )));
                    return (node, node);
                }

                let count_local = self.new_local();
                let body_loop = self.program.push(Opcode::Loop(InstLoop::new(
                    head,
                    count_local,
                    local,
                    min,
                    max,
                    policy == Policy::Lazy,
                )));
                let prolog = self
                    .program
                    .push(Opcode::Prolog(InstProlog::new(body_loop)));
                self.program.set_next(tail, body_loop);

                (prolog, body_loop)
            }
        }
    }
}
