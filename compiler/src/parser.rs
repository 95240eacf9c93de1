use std::collections::HashMap;

use parcel::parsers::character::{alphabetic, digit, expect_character};
use parcel::prelude::v1::*;
use retrace_runtime::{
    case, Anchor, CaseFolding, CharClass, ClassMatch, Ctype, Flags, Latin1Set, Policy,
    MAX_REPS,
};

use super::ast;
use super::error::{PatternSyntaxError, SyntaxErrorKind};
use super::unicode;

type ParseResult<T> = Result<T, PatternSyntaxError>;

/// Parses a pattern under an initial set of flags. Inline modifiers adjust
/// the flags for the remainder of their enclosing group.
pub fn parse(pattern: &str, flags: Flags) -> Result<ast::Regex, PatternSyntaxError> {
    let mut parser = PatternParser::new(pattern, flags);
    let expression = parser.expression()?;

    // the top level expression only stops early on a `)`.
    if parser.cursor < parser.input.len() {
        return parser.error(SyntaxErrorKind::UnmatchedClosingParen);
    }

    Ok(ast::Regex {
        expression,
        group_count: parser.group_count,
        group_names: parser.group_names,
    })
}

/// The outcome of an escape sequence.
#[derive(Debug)]
enum Escape {
    Char(char),
    Term(ast::Term),
    /// The contents of `\Q...\E`.
    Quoted(Vec<char>),
    /// An escape that is not a character, left unconsumed.
    Meta,
}

/// A member of a character class. Latin-1 characters all share one bitmap
/// that is only resolved once the class is closed.
#[derive(Debug, Clone)]
enum ClassNode {
    Bits,
    Class(CharClass),
}

#[derive(Debug)]
enum ClassStep {
    Item(ClassNode),
    Nested(CharClass),
    Intersect(ClassNode),
}

struct PatternParser {
    input: Vec<(usize, char)>,
    pattern: String,
    cursor: usize,
    flags: Flags,
    group_count: usize,
    group_names: HashMap<String, usize>,
}

impl PatternParser {
    fn new(pattern: &str, flags: Flags) -> Self {
        Self {
            input: pattern.chars().enumerate().collect(),
            pattern: pattern.to_string(),
            cursor: 0,
            flags,
            group_count: 0,
            group_names: HashMap::new(),
        }
    }

    fn error<T>(&self, kind: SyntaxErrorKind) -> ParseResult<T> {
        let index = self
            .cursor
            .checked_sub(1)
            .map(|idx| idx.min(self.input.len()));

        Err(PatternSyntaxError::new(kind, self.pattern.clone(), index))
    }

    fn has(&self, flag: Flags) -> bool {
        self.flags.contains(flag)
    }

    // Cursor

    fn char_at(&self, idx: usize) -> Option<char> {
        self.input.get(idx).map(|(_, c)| *c)
    }

    fn remaining(&self) -> &[(usize, char)] {
        &self.input[self.cursor.min(self.input.len())..]
    }

    fn is_line_separator(&self, c: char) -> bool {
        if self.has(Flags::UNIX_LINES) {
            c == '\n'
        } else {
            retrace_runtime::class::is_line_terminator(c)
        }
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.char_at(self.cursor) {
                Some(c) if Ctype::Space.in_set(c) => self.cursor += 1,
                Some('#') => {
                    self.cursor += 1;
                    while let Some(c) = self.char_at(self.cursor) {
                        if self.is_line_separator(c) {
                            break;
                        }
                        self.cursor += 1;
                    }
                }
                _ => break,
            }
        }
    }

    /// Returns the character under the cursor, skipping whitespace and
    /// comments in comments mode.
    fn peek(&mut self) -> Option<char> {
        if self.has(Flags::COMMENTS) {
            self.skip_whitespace();
        }
        self.char_at(self.cursor)
    }

    fn read(&mut self) -> Option<char> {
        let ch = self.peek();
        self.cursor += 1;
        ch
    }

    fn next(&mut self) -> Option<char> {
        self.cursor += 1;
        self.peek()
    }

    fn read_escaped(&mut self) -> Option<char> {
        let ch = self.char_at(self.cursor);
        self.cursor += 1;
        ch
    }

    fn next_escaped(&mut self) -> Option<char> {
        self.cursor += 1;
        self.char_at(self.cursor)
    }

    fn unread(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Returns the character after the cursor and moves past both.
    fn skip(&mut self) -> Option<char> {
        let ch = self.char_at(self.cursor + 1);
        self.cursor += 2;
        ch
    }

    fn accept(&mut self, expected: char, kind: SyntaxErrorKind) -> ParseResult<()> {
        if self.read() == Some(expected) {
            Ok(())
        } else {
            self.error(kind)
        }
    }

    // Expression

    fn expression(&mut self) -> ParseResult<ast::Expression> {
        let mut sequences = vec![self.sequence()?];
        while self.peek() == Some('|') {
            self.next();
            sequences.push(self.sequence()?);
        }

        Ok(ast::Expression(sequences))
    }

    fn sequence(&mut self) -> ParseResult<ast::Sequence> {
        let mut terms = Vec::new();

        loop {
            let term = match self.peek() {
                None | Some('|') | Some(')') => break,
                Some('(') => {
                    if let Some(group) = self.group()? {
                        terms.push(group);
                    }
                    continue;
                }
                Some('[') => ast::Term::Class(self.class(true)?),
                Some('\\') => match self.next_escaped() {
                    Some(p @ ('p' | 'P')) => {
                        self.cursor += 1;
                        ast::Term::Class(self.family(p == 'P')?)
                    }
                    _ => {
                        self.unread();
                        self.atom(&mut terms)?
                    }
                },
                Some('^') => {
                    self.next();
                    ast::Term::Anchor(self.caret())
                }
                Some('$') => {
                    self.next();
                    ast::Term::Anchor(self.dollar(self.has(Flags::MULTILINE)))
                }
                Some('.') => {
                    self.next();
                    ast::Term::Class(self.dot())
                }
                Some(meta @ ('?' | '*' | '+')) => {
                    self.next();
                    return self.error(SyntaxErrorKind::DanglingMetaCharacter(meta));
                }
                Some(_) => self.atom(&mut terms)?,
            };

            terms.push(self.closure(term)?);
        }

        Ok(ast::Sequence(terms))
    }

    fn caret(&self) -> Anchor {
        match (self.has(Flags::MULTILINE), self.has(Flags::UNIX_LINES)) {
            (true, true) => Anchor::UnixCaret,
            (true, false) => Anchor::Caret,
            (false, _) => Anchor::Begin,
        }
    }

    fn dollar(&self, multiline: bool) -> Anchor {
        if self.has(Flags::UNIX_LINES) {
            Anchor::UnixDollar { multiline }
        } else {
            Anchor::Dollar { multiline }
        }
    }

    fn dot(&self) -> CharClass {
        if self.has(Flags::DOTALL) {
            CharClass::Any
        } else if self.has(Flags::UNIX_LINES) {
            CharClass::UnixDot
        } else {
            CharClass::Dot
        }
    }

    // Literals

    /// Parses a run of literal characters, including quoted text. When a
    /// quantifier follows a run of more than one character, all but the last
    /// character are pushed onto `terms` and the last is returned alone, so
    /// the quantifier only binds to it.
    fn atom(&mut self, terms: &mut Vec<ast::Term>) -> ParseResult<ast::Term> {
        let mut run: Vec<char> = Vec::new();
        let mut ch = self.peek();

        loop {
            match ch {
                Some('*' | '+' | '?' | '{') => {
                    if run.len() > 1 {
                        if let Some(last) = run.pop() {
                            terms.push(self.literal(run));
                            return Ok(ast::Term::Class(self.single(last)));
                        }
                    }
                    break;
                }
                None | Some('$' | '.' | '^' | '(' | '[' | '|' | ')') => break,
                Some('\\') => {
                    if matches!(self.next_escaped(), Some('p' | 'P')) {
                        if !run.is_empty() {
                            self.unread();
                            break;
                        }

                        let negated = self.char_at(self.cursor) == Some('P');
                        self.cursor += 1;
                        return self.family(negated).map(ast::Term::Class);
                    }

                    self.unread();
                    let prev = self.cursor;
                    match self.escape(false, run.is_empty())? {
                        Escape::Char(c) => {
                            run.push(c);
                            ch = self.peek();
                        }
                        Escape::Term(term) => return Ok(term),
                        Escape::Quoted(chars) => {
                            run.extend(chars);
                            ch = self.peek();
                        }
                        Escape::Meta => {
                            self.cursor = prev;
                            break;
                        }
                    }
                }
                Some(c) => {
                    run.push(c);
                    ch = self.next();
                }
            }
        }

        match run.as_slice() {
            [c] => Ok(ast::Term::Class(self.single(*c))),
            _ => Ok(self.literal(run)),
        }
    }

    fn single(&self, c: char) -> CharClass {
        if !self.has(Flags::CASE_INSENSITIVE) {
            CharClass::Single(c)
        } else if !self.has(Flags::UNICODE_CASE) {
            CharClass::SingleAscii(case::ascii_fold(c))
        } else {
            CharClass::SingleUnicode(case::fold(c))
        }
    }

    fn literal(&self, chars: Vec<char>) -> ast::Term {
        if !self.has(Flags::CASE_INSENSITIVE) {
            ast::Term::Literal {
                chars,
                case: CaseFolding::Sensitive,
            }
        } else if !self.has(Flags::UNICODE_CASE) {
            ast::Term::Literal {
                chars: chars.into_iter().map(case::ascii_fold).collect(),
                case: CaseFolding::Ascii,
            }
        } else {
            ast::Term::Literal {
                chars: chars.into_iter().map(case::fold).collect(),
                case: CaseFolding::Unicode,
            }
        }
    }

    // Escapes

    /// Parses the escape under the cursor. Escapes that produce a term are
    /// only consumed when `create` is set, otherwise they are reported as
    /// [Escape::Meta].
    fn escape(&mut self, inclass: bool, create: bool) -> ParseResult<Escape> {
        let term: ast::Term = match self.skip() {
            None => return self.error(SyntaxErrorKind::TrailingBackslash),
            Some('0') => return self.octal().map(Escape::Char),
            Some(d @ '1'..='9') if !inclass => {
                let group = d as usize - '0' as usize;
                if group > self.group_count {
                    return self.error(SyntaxErrorKind::NoSuchGroup);
                }
                if !create {
                    return Ok(Escape::Meta);
                }
                self.back_reference(group)
            }
            Some('k') if !inclass => {
                if !create {
                    return Ok(Escape::Meta);
                }
                self.named_reference()?
            }
            Some('A') if !inclass => Anchor::Begin.into(),
            Some('B') if !inclass => Anchor::NotWordBoundary.into(),
            Some('b') if !inclass => Anchor::WordBoundary.into(),
            Some('G') if !inclass => Anchor::LastMatch.into(),
            Some('Z') if !inclass => self.dollar(false).into(),
            Some('z') if !inclass => Anchor::End.into(),
            Some('d') => CharClass::Ctype(Ctype::Digit).into(),
            Some('D') => CharClass::Ctype(Ctype::Digit).negate().into(),
            Some('s') => CharClass::Ctype(Ctype::Space).into(),
            Some('S') => CharClass::Ctype(Ctype::Space).negate().into(),
            Some('w') => CharClass::Ctype(Ctype::Word).into(),
            Some('W') => CharClass::Ctype(Ctype::Word).negate().into(),
            Some('Q') => return Ok(Escape::Quoted(self.quoted())),
            Some('a') => return Ok(Escape::Char('\u{07}')),
            Some('c') => return self.control().map(Escape::Char),
            Some('e') => return Ok(Escape::Char('\u{1B}')),
            Some('f') => return Ok(Escape::Char('\u{0C}')),
            Some('n') => return Ok(Escape::Char('\n')),
            Some('r') => return Ok(Escape::Char('\r')),
            Some('t') => return Ok(Escape::Char('\t')),
            Some('v') => return Ok(Escape::Char('\u{0B}')),
            Some('u') => {
                return self
                    .hex(4, SyntaxErrorKind::IllegalUnicodeEscape)
                    .map(Escape::Char)
            }
            Some('x') => {
                return self
                    .hex(2, SyntaxErrorKind::IllegalHexadecimalEscape)
                    .map(Escape::Char)
            }
            Some(c) if c.is_ascii_alphanumeric() => {
                return self.error(SyntaxErrorKind::IllegalEscape)
            }
            Some(c) => return Ok(Escape::Char(c)),
        };

        if create {
            Ok(Escape::Term(term))
        } else {
            Ok(Escape::Meta)
        }
    }

    /// Takes further digits while the group number they form has already
    /// been opened.
    fn back_reference(&mut self, first: usize) -> ast::Term {
        let mut group = first;
        while let Some(digit) = self.peek().and_then(|c| c.to_digit(10)) {
            let extended = group * 10 + digit as usize;
            if extended > self.group_count {
                break;
            }
            group = extended;
            self.read();
        }

        ast::Term::BackReference {
            group,
            case_insensitive: self.has(Flags::CASE_INSENSITIVE),
        }
    }

    fn named_reference(&mut self) -> ParseResult<ast::Term> {
        if self.read_escaped() != Some('<') {
            return self.error(SyntaxErrorKind::MalformedNamedReference);
        }

        let name = self.group_name()?;
        match self.group_names.get(&name) {
            Some(group) => Ok(ast::Term::BackReference {
                group: *group,
                case_insensitive: self.has(Flags::CASE_INSENSITIVE),
            }),
            None => self.error(SyntaxErrorKind::UnknownGroupName(name)),
        }
    }

    /// Reads a group name and its closing `>`.
    fn group_name(&mut self) -> ParseResult<String> {
        let name = match lex(self.remaining(), group_name()) {
            Some((name, consumed)) => {
                self.cursor += consumed;
                name
            }
            None => {
                self.cursor += 1;
                return self.error(SyntaxErrorKind::InvalidGroupName);
            }
        };

        if self.read_escaped() != Some('>') {
            return self.error(SyntaxErrorKind::UnclosedGroupName);
        }

        Ok(name)
    }

    fn quoted(&mut self) -> Vec<char> {
        let start = self.cursor;
        let end = loop {
            match self.char_at(self.cursor) {
                None => break self.cursor,
                Some('\\') if self.char_at(self.cursor + 1) == Some('E') => {
                    let end = self.cursor;
                    self.cursor += 2;
                    break end;
                }
                Some('\\') => self.cursor += 2,
                Some(_) => self.cursor += 1,
            }
        };

        let len = self.input.len();
        self.cursor = self.cursor.min(len);
        self.input[start.min(len)..end.min(len)]
            .iter()
            .map(|(_, c)| *c)
            .collect()
    }

    fn octal(&mut self) -> ParseResult<char> {
        match lex(self.remaining(), octal_digits()) {
            Some((digits, _)) => {
                // three digits only form a byte when the first is at most 3.
                let take = if digits.len() == 3 && digits[0] > '3' {
                    2
                } else {
                    digits.len()
                };
                self.cursor += take;

                let value = digits[..take]
                    .iter()
                    .fold(0, |acc, d| acc * 8 + d.to_digit(8).unwrap_or(0));
                char::from_u32(value).map_or_else(
                    || self.error(SyntaxErrorKind::IllegalOctalEscape),
                    Ok,
                )
            }
            None => {
                self.cursor += 1;
                self.error(SyntaxErrorKind::IllegalOctalEscape)
            }
        }
    }

    fn hex(&mut self, width: usize, kind: SyntaxErrorKind) -> ParseResult<char> {
        let digits = lex(self.remaining(), hex_digits())
            .map(|(digits, _)| digits)
            .unwrap_or_default();

        if digits.len() < width {
            self.cursor += digits.len() + 1;
            return self.error(kind);
        }

        self.cursor += width;
        let value = digits[..width]
            .iter()
            .fold(0, |acc, d| acc * 16 + d.to_digit(16).unwrap_or(0));

        // lone surrogates have no character representation.
        char::from_u32(value).map_or_else(|| self.error(kind), Ok)
    }

    fn control(&mut self) -> ParseResult<char> {
        match self.read().and_then(|c| char::from_u32(c as u32 ^ 64)) {
            Some(c) => Ok(c),
            None => self.error(SyntaxErrorKind::IllegalControlEscape),
        }
    }

    // Character families

    /// Parses the name of a `\p` or `\P` family, with the cursor after the
    /// `p`. The name is either a single letter or enclosed in braces.
    fn family(&mut self, negated: bool) -> ParseResult<CharClass> {
        let name: String = if self.char_at(self.cursor) == Some('{') {
            match lex(self.remaining(), family_name()) {
                Some((name, consumed)) => {
                    self.cursor += consumed;
                    if name.is_empty() {
                        return self.error(SyntaxErrorKind::EmptyCharacterFamily);
                    }
                    name.into_iter().collect()
                }
                None => {
                    self.cursor = self.input.len() + 1;
                    return self.error(SyntaxErrorKind::UnclosedCharacterFamily);
                }
            }
        } else {
            match self.read_escaped() {
                Some(c) => c.to_string(),
                None => return self.error(SyntaxErrorKind::EmptyCharacterFamily),
            }
        };

        let class = if let Some(block) = name.strip_prefix("In") {
            unicode::block(block)
                .ok_or_else(|| SyntaxErrorKind::UnknownCharacterFamily(block.to_string()))
        } else {
            let category = name.strip_prefix("Is").unwrap_or(&name);
            unicode::category(category)
                .ok_or_else(|| SyntaxErrorKind::UnknownCharacterCategory(category.to_string()))
        };

        match class {
            Ok(class) => Ok(class.negate_if(negated)),
            Err(kind) => self.error(kind),
        }
    }

    // Character classes

    /// Parses a bracketed class with the cursor on its `[`. The closing `]`
    /// is left in place unless `consume` is set, which lets the right hand
    /// side of an `&&` share its brackets with the enclosing class.
    fn class(&mut self, consume: bool) -> ParseResult<CharClass> {
        let mut bits = Latin1Set::new();
        let mut steps: Vec<ClassStep> = Vec::new();
        let mut last: Option<ClassNode> = None;
        let mut include = true;
        let mut first_in_class = true;
        let mut ch = self.next();

        loop {
            match ch {
                Some('^') if first_in_class && self.previous_char() == Some('[') => {
                    ch = self.next();
                    include = !include;
                    continue;
                }
                Some('[') => {
                    first_in_class = false;
                    let nested = self.class(true)?;
                    steps.push(ClassStep::Nested(nested.clone()));
                    last = Some(ClassNode::Class(nested));
                    ch = self.peek();
                    continue;
                }
                Some('&') => {
                    first_in_class = false;
                    if self.next() == Some('&') {
                        ch = self.next();
                        let mut right: Option<CharClass> = None;
                        while !matches!(ch, Some(']') | Some('&')) {
                            right = if ch == Some('[') {
                                let nested = self.class(true)?;
                                Some(match right {
                                    Some(right) => right.union(nested),
                                    None => nested,
                                })
                            } else {
                                self.unread();
                                Some(self.class(false)?)
                            };
                            ch = self.peek();
                        }

                        if steps.is_empty() && right.is_none() {
                            return self.error(SyntaxErrorKind::BadClassSyntax);
                        }
                        if let Some(right) = right {
                            last = Some(ClassNode::Class(right));
                        }
                        if let Some(node) = last.clone() {
                            steps.push(ClassStep::Intersect(node));
                        }
                        continue;
                    }
                    // a lone `&` is a literal.
                    self.unread();
                }
                None => return self.error(SyntaxErrorKind::UnclosedCharacterClass),
                Some(']') => {
                    first_in_class = false;
                    if !steps.is_empty() {
                        if consume {
                            self.next();
                        }
                        return match fold_class(steps, bits, include) {
                            Some(class) => Ok(class),
                            None => self.error(SyntaxErrorKind::BadClassSyntax),
                        };
                    }
                    // a leading `]` is a literal.
                }
                _ => {}
            }

            first_in_class = false;
            let node = self.range(&mut bits)?;
            steps.push(ClassStep::Item(node.clone()));
            last = Some(node);
            ch = self.peek();
        }
    }

    fn previous_char(&self) -> Option<char> {
        self.cursor.checked_sub(1).and_then(|idx| self.char_at(idx))
    }

    /// Parses a single class member: a character, a range, an escaped
    /// class or a family.
    fn range(&mut self, bits: &mut Latin1Set) -> ParseResult<ClassNode> {
        let start = if self.peek() == Some('\\') {
            match self.next_escaped() {
                Some(p @ ('p' | 'P')) => {
                    self.cursor += 1;
                    return self.family(p == 'P').map(ClassNode::Class);
                }
                _ => {
                    self.unread();
                    match self.escape(true, true)? {
                        Escape::Char(c) => c,
                        Escape::Term(ast::Term::Class(class)) => {
                            return Ok(ClassNode::Class(class))
                        }
                        Escape::Quoted(chars) => return Ok(ClassNode::Class(self.members(chars))),
                        Escape::Term(_) | Escape::Meta => {
                            return self.error(SyntaxErrorKind::IllegalEscape)
                        }
                    }
                }
            }
        } else {
            match self.peek() {
                Some(c) => {
                    self.next();
                    c
                }
                None => return self.error(SyntaxErrorKind::UnclosedCharacterClass),
            }
        };

        if self.peek() == Some('-') {
            match self.char_at(self.cursor + 1) {
                Some('[') | Some(']') => {}
                _ => {
                    self.next();
                    return match self.class_single()? {
                        Some(end) if end >= start => {
                            if self.has(Flags::CASE_INSENSITIVE) {
                                Ok(ClassNode::Class(CharClass::case_insensitive_range(
                                    start, end,
                                )))
                            } else {
                                Ok(ClassNode::Class(CharClass::range(start, end)))
                            }
                        }
                        _ => self.error(SyntaxErrorKind::IllegalCharacterRange),
                    };
                }
            }
        }

        Ok(self.add_single(start, bits))
    }

    /// Reads the upper bound of a range. Escapes that are not characters
    /// yield `None`.
    fn class_single(&mut self) -> ParseResult<Option<char>> {
        match self.peek() {
            Some('\\') => match self.escape(true, false)? {
                Escape::Char(c) => Ok(Some(c)),
                _ => Ok(None),
            },
            ch => {
                self.next();
                Ok(ch)
            }
        }
    }

    fn add_single(&self, c: char, bits: &mut Latin1Set) -> ClassNode {
        if (c as u32) >= 256 {
            return ClassNode::Class(self.single(c));
        }

        bits.insert(c);
        if self.has(Flags::CASE_INSENSITIVE) {
            if c.is_ascii() {
                bits.insert(c.to_ascii_lowercase());
                bits.insert(c.to_ascii_uppercase());
            } else {
                let lower = case::to_lower(c);
                bits.insert(lower);
                bits.insert(case::to_upper(lower));
            }
        }

        ClassNode::Bits
    }

    /// Quoted text inside a class contributes each of its characters.
    fn members(&self, chars: Vec<char>) -> CharClass {
        chars
            .into_iter()
            .map(|c| self.single(c))
            .reduce(CharClass::union)
            .unwrap_or(CharClass::Latin1(Latin1Set::new()))
    }

    // Groups

    /// Parses a group with the cursor on its `(`. Inline modifier groups
    /// without a body yield no term.
    fn group(&mut self) -> ParseResult<Option<ast::Term>> {
        let open = self.cursor;
        let saved = self.flags;

        let kind = if self.next() == Some('?') {
            match self.skip() {
                Some(':') => ast::GroupKind::NonCapturing,
                Some('=') => ast::GroupKind::LookAhead { negated: false },
                Some('!') => ast::GroupKind::LookAhead { negated: true },
                Some('>') => ast::GroupKind::Independent,
                Some('<') => match self.read_escaped() {
                    Some('=') => ast::GroupKind::LookBehind { negated: false },
                    Some('!') => ast::GroupKind::LookBehind { negated: true },
                    Some(c) if c.is_ascii_alphabetic() => {
                        self.unread();
                        let name = self.group_name()?;
                        self.capturing_group(Some(name))?
                    }
                    _ => return self.error(SyntaxErrorKind::UnknownLookBehindGroup),
                },
                Some(d @ '1'..='9') => {
                    let group = d as usize - '0' as usize;
                    if group > self.group_count {
                        return self.error(SyntaxErrorKind::UnknownGroupReference);
                    }

                    self.accept(')', SyntaxErrorKind::UnclosedGroup)?;
                    self.flags = saved;
                    return self.closure(ast::Term::GroupReference(group)).map(Some);
                }
                Some('$' | '@') => return self.error(SyntaxErrorKind::UnknownGroupType),
                _ => {
                    self.unread();
                    self.inline_flags();
                    match self.read() {
                        // modifiers only, they stay in effect.
                        Some(')') => return Ok(None),
                        Some(':') => ast::GroupKind::NonCapturing,
                        _ => return self.error(SyntaxErrorKind::UnknownInlineModifier),
                    }
                }
            }
        } else {
            self.capturing_group(None)?
        };

        let expression = self.expression()?;
        self.accept(')', SyntaxErrorKind::UnclosedGroup)?;
        self.flags = saved;

        let group = ast::Group::new(kind, expression, open..self.cursor);
        self.closure(ast::Term::Group(group)).map(Some)
    }

    fn capturing_group(&mut self, name: Option<String>) -> ParseResult<ast::GroupKind> {
        self.group_count += 1;

        if let Some(name) = name {
            if self.group_names.contains_key(&name) {
                return self.error(SyntaxErrorKind::DuplicateGroupName(name));
            }
            self.group_names.insert(name, self.group_count);
        }

        Ok(ast::GroupKind::Capturing(self.group_count))
    }

    /// Applies `idmsux-idmsux` modifier letters up to the first character
    /// that is not one.
    fn inline_flags(&mut self) {
        let mut enable = true;

        while let Some(c) = self.peek() {
            if c == '-' && enable {
                enable = false;
            } else {
                match Flags::from_letter(c) {
                    Some(flag) if enable => self.flags.insert(flag),
                    Some(flag) => self.flags.remove(flag),
                    None => return,
                }
            }
            self.next();
        }
    }

    // Quantifiers

    fn closure(&mut self, term: ast::Term) -> ParseResult<ast::Term> {
        let bounds = match self.peek() {
            Some('?') => {
                self.next();
                None
            }
            Some('*') => {
                self.next();
                Some((0, MAX_REPS))
            }
            Some('+') => {
                self.next();
                Some((1, MAX_REPS))
            }
            Some('{') => Some(self.counted()?),
            _ => return Ok(term),
        };

        let policy = match self.peek() {
            Some('?') => {
                self.next();
                Policy::Lazy
            }
            Some('+') => {
                self.next();
                Policy::Possessive
            }
            _ => Policy::Greedy,
        };

        let quantifier = match bounds {
            None => ast::Quantifier::Optional(policy),
            Some((min, max)) => ast::Quantifier::Repeat { min, max, policy },
        };

        Ok(term.quantify(quantifier))
    }

    /// Parses `{n}`, `{n,}` or `{n,m}` with the cursor on the `{`.
    fn counted(&mut self) -> ParseResult<(usize, usize)> {
        if !self
            .char_at(self.cursor + 1)
            .map_or(false, |c| c.is_ascii_digit())
        {
            return self.error(SyntaxErrorKind::IllegalRepetition);
        }

        let ((min, max), consumed) = match lex(self.remaining(), counted_bounds()) {
            Some(bounds) => bounds,
            None => return self.error(SyntaxErrorKind::IllegalRepetition),
        };
        self.cursor += consumed;

        if self.read_escaped() != Some('}') {
            return self.error(SyntaxErrorKind::UnclosedCountedClosure);
        }

        let min = repetitions(&min);
        let max = match max {
            None => min,
            Some(max) if max.is_empty() => Some(MAX_REPS),
            Some(max) => repetitions(&max),
        };

        match (min, max) {
            (Some(min), Some(max)) if min <= max => Ok((min, max)),
            _ => self.error(SyntaxErrorKind::IllegalRepetitionRange),
        }
    }
}

/// Replays the members of a class against the final Latin-1 bitmap.
///
/// Members are unioned, or subtracted from the complement of the first
/// member in a negated class. Nested classes are always unioned and `&&`
/// intersects everything before it with its right hand side.
fn fold_class(steps: Vec<ClassStep>, bits: Latin1Set, include: bool) -> Option<CharClass> {
    let resolve = |node: ClassNode| match node {
        ClassNode::Bits => CharClass::Latin1(bits),
        ClassNode::Class(class) => class,
    };

    let mut prev: Option<CharClass> = None;
    let mut prev_is_bits = false;

    for step in steps {
        let (next, is_bits) = match (step, prev.take()) {
            (ClassStep::Item(node), None) => {
                let is_bits = include && matches!(node, ClassNode::Bits);
                (resolve(node).negate_if(!include), is_bits)
            }
            (ClassStep::Item(ClassNode::Bits), Some(prev)) if prev_is_bits => (prev, true),
            (ClassStep::Item(node), Some(prev)) if include => (prev.union(resolve(node)), false),
            (ClassStep::Item(node), Some(prev)) => (prev.difference(resolve(node)), false),
            (ClassStep::Nested(class), None) => (class, false),
            (ClassStep::Nested(class), Some(prev)) => (prev.union(class), false),
            (ClassStep::Intersect(node), None) => (resolve(node), false),
            (ClassStep::Intersect(node), Some(prev)) => (prev.intersection(resolve(node)), false),
        };

        prev = Some(next);
        prev_is_bits = is_bits;
    }

    prev
}

/// Converts a repetition bound, rejecting anything past [MAX_REPS].
fn repetitions(digits: &[char]) -> Option<usize> {
    digits
        .iter()
        .try_fold(0usize, |acc, d| {
            acc.checked_mul(10)?
                .checked_add(d.to_digit(10)? as usize)
        })
        .filter(|reps| *reps <= MAX_REPS)
}

/// Runs a lexeme against the remaining input, returning its output and the
/// number of characters it consumed.
fn lex<'a, T>(
    input: &'a [(usize, char)],
    parser: impl Parser<'a, &'a [(usize, char)], T>,
) -> Option<(T, usize)> {
    match parser.parse(input) {
        Ok(MatchStatus::Match {
            remainder, inner, ..
        }) => Some((inner, input.len() - remainder.len())),
        _ => None,
    }
}

// Lexemes

fn counted_bounds<'a>(
) -> impl Parser<'a, &'a [(usize, char)], (Vec<char>, Option<Vec<char>>)> {
    parcel::right(parcel::join(
        expect_character('{'),
        parcel::join(
            parcel::one_or_more(digit(10)),
            parcel::optional(parcel::right(parcel::join(
                expect_character(','),
                parcel::zero_or_more(digit(10)),
            ))),
        ),
    ))
}

fn octal_digits<'a>() -> impl Parser<'a, &'a [(usize, char)], Vec<char>> {
    parcel::join(
        digit(8),
        parcel::optional(parcel::join(digit(8), parcel::optional(digit(8)))),
    )
    .map(|(first, rest)| match rest {
        Some((second, Some(third))) => vec![first, second, third],
        Some((second, None)) => vec![first, second],
        None => vec![first],
    })
}

fn hex_digits<'a>() -> impl Parser<'a, &'a [(usize, char)], Vec<char>> {
    parcel::zero_or_more(digit(16))
}

fn group_name<'a>() -> impl Parser<'a, &'a [(usize, char)], String> {
    parcel::join(
        ascii_letter(),
        parcel::zero_or_more(parcel::or(ascii_letter(), || digit(10))),
    )
    .map(|(head, tail)| std::iter::once(head).chain(tail).collect())
}

fn ascii_letter<'a>() -> impl Parser<'a, &'a [(usize, char)], char> {
    alphabetic().predicate(|c| c.is_ascii_alphabetic())
}

fn family_name<'a>() -> impl Parser<'a, &'a [(usize, char)], Vec<char>> {
    parcel::right(parcel::join(
        expect_character('{'),
        parcel::left(parcel::join(
            parcel::zero_or_more(character_except('}')),
            expect_character('}'),
        )),
    ))
}

fn character_except<'a>(terminator: char) -> impl Parser<'a, &'a [(usize, char)], char> {
    move |input: &'a [(usize, char)]| match input.first() {
        Some(&(pos, next)) if next != terminator => Ok(MatchStatus::Match {
            span: pos..pos + 1,
            remainder: &input[1..],
            inner: next,
        }),
        _ => Ok(MatchStatus::NoMatch(input)),
    }
}
