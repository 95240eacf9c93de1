//! Character predicates consumed by the single character instructions.

use std::fmt::Display;

use crate::case;

/// Decides whether a character is a member of a class.
pub trait ClassMatch {
    fn in_set(&self, value: char) -> bool;

    fn not_in_set(&self, value: char) -> bool {
        !self.in_set(value)
    }
}

/// The ASCII-only POSIX character types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ctype {
    Alnum,
    Alpha,
    Blank,
    Cntrl,
    Digit,
    Graph,
    Lower,
    Print,
    Punct,
    Space,
    Upper,
    Word,
    XDigit,
}

impl ClassMatch for Ctype {
    fn in_set(&self, value: char) -> bool {
        if !value.is_ascii() {
            return false;
        }

        match self {
            Ctype::Alnum => value.is_ascii_alphanumeric(),
            Ctype::Alpha => value.is_ascii_alphabetic(),
            Ctype::Blank => value == ' ' || value == '\t',
            Ctype::Cntrl => value.is_ascii_control(),
            Ctype::Digit => value.is_ascii_digit(),
            Ctype::Graph => value.is_ascii_graphic(),
            Ctype::Lower => value.is_ascii_lowercase(),
            Ctype::Print => value == ' ' || value.is_ascii_graphic(),
            Ctype::Punct => value.is_ascii_punctuation(),
            // includes the vertical tab, unlike `char::is_ascii_whitespace`.
            Ctype::Space => matches!(value, ' ' | '\t' | '\n' | '\u{0B}' | '\u{0C}' | '\r'),
            Ctype::Upper => value.is_ascii_uppercase(),
            Ctype::Word => value == '_' || value.is_ascii_alphanumeric(),
            Ctype::XDigit => value.is_ascii_hexdigit(),
        }
    }
}

impl Display for Ctype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Ctype::Alnum => "Alnum",
            Ctype::Alpha => "Alpha",
            Ctype::Blank => "Blank",
            Ctype::Cntrl => "Cntrl",
            Ctype::Digit => "Digit",
            Ctype::Graph => "Graph",
            Ctype::Lower => "Lower",
            Ctype::Print => "Print",
            Ctype::Punct => "Punct",
            Ctype::Space => "Space",
            Ctype::Upper => "Upper",
            Ctype::Word => "Word",
            Ctype::XDigit => "XDigit",
        };

        write!(f, "{}", name)
    }
}

/// A membership bitmap over `U+0000..=U+00FF`.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latin1Set([u64; 4]);

impl Latin1Set {
    pub const fn new() -> Self {
        Self([0; 4])
    }

    /// Adds a character to the set, ignoring anything outside of Latin-1.
    pub fn insert(&mut self, value: char) {
        let idx = value as usize;
        if idx < 256 {
            self.0[idx / 64] |= 1 << (idx % 64);
        }
    }

    pub fn contains(&self, value: char) -> bool {
        let idx = value as usize;
        idx < 256 && self.0[idx / 64] & (1 << (idx % 64)) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|word| *word == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        (0u8..=255)
            .map(char::from)
            .filter(move |c| self.contains(*c))
    }
}

/// A tree of character predicates. Leaves test a single property of a
/// character, interior nodes combine the results of their children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharClass {
    /// Matches exactly one character.
    Single(char),
    /// Matches one character, ignoring ASCII case. Holds the lowercase form.
    SingleAscii(char),
    /// Matches one character, ignoring Unicode case. Holds the folded form.
    SingleUnicode(char),
    /// An inclusive range of code points.
    Range { lower: u32, upper: u32 },
    /// An inclusive range also tested against the case mapped character.
    CaseInsensitiveRange { lower: u32, upper: u32 },
    /// A mask of general category bits, see [case::category_index].
    Category(u32),
    Ctype(Ctype),
    Latin1(Latin1Set),
    /// The `Specials` block, `U+FFF0..=U+FFFD` and `U+FEFF`.
    Specials,
    /// Any character at all.
    Any,
    /// Any character other than a line terminator.
    Dot,
    /// Any character other than `\n`.
    UnixDot,
    Not(Box<CharClass>),
    Union(Box<CharClass>, Box<CharClass>),
    Intersection(Box<CharClass>, Box<CharClass>),
    Difference(Box<CharClass>, Box<CharClass>),
}

impl CharClass {
    pub fn range(lower: char, upper: char) -> Self {
        Self::Range {
            lower: lower as u32,
            upper: upper as u32,
        }
    }

    pub fn case_insensitive_range(lower: char, upper: char) -> Self {
        Self::CaseInsensitiveRange {
            lower: lower as u32,
            upper: upper as u32,
        }
    }

    /// Wraps the class in its complement.
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Complements the class only when `negated` is set.
    pub fn negate_if(self, negated: bool) -> Self {
        if negated {
            self.negate()
        } else {
            self
        }
    }

    pub fn union(self, rhs: Self) -> Self {
        Self::Union(Box::new(self), Box::new(rhs))
    }

    pub fn intersection(self, rhs: Self) -> Self {
        Self::Intersection(Box::new(self), Box::new(rhs))
    }

    pub fn difference(self, rhs: Self) -> Self {
        Self::Difference(Box::new(self), Box::new(rhs))
    }
}

pub fn is_line_terminator(value: char) -> bool {
    matches!(value, '\n' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

impl ClassMatch for CharClass {
    fn in_set(&self, value: char) -> bool {
        match self {
            CharClass::Single(c) => *c == value,
            CharClass::SingleAscii(c) => *c == value || *c == case::ascii_fold(value),
            CharClass::SingleUnicode(c) => *c == value || *c == case::fold(value),
            CharClass::Range { lower, upper } => (*lower..=*upper).contains(&(value as u32)),
            CharClass::CaseInsensitiveRange { lower, upper } => {
                let range = *lower..=*upper;
                if range.contains(&(value as u32)) {
                    return true;
                }

                let upper_case = case::to_upper(value);
                range.contains(&(upper_case as u32))
                    || range.contains(&(case::to_lower(upper_case) as u32))
            }
            CharClass::Category(mask) => mask & (1 << case::category_index(value)) != 0,
            CharClass::Ctype(ctype) => ctype.in_set(value),
            CharClass::Latin1(set) => set.contains(value),
            CharClass::Specials => matches!(value, '\u{FFF0}'..='\u{FFFD}' | '\u{FEFF}'),
            CharClass::Any => true,
            CharClass::Dot => !is_line_terminator(value),
            CharClass::UnixDot => value != '\n',
            CharClass::Not(class) => class.not_in_set(value),
            CharClass::Union(lhs, rhs) => lhs.in_set(value) || rhs.in_set(value),
            CharClass::Intersection(lhs, rhs) => lhs.in_set(value) && rhs.in_set(value),
            CharClass::Difference(lhs, rhs) => lhs.in_set(value) && rhs.not_in_set(value),
        }
    }
}

impl Display for CharClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CharClass::Single(c) => write!(f, "{:?}", c),
            CharClass::SingleAscii(c) => write!(f, "(?i){:?}", c),
            CharClass::SingleUnicode(c) => write!(f, "(?iu){:?}", c),
            CharClass::Range { lower, upper } => write!(f, "[{:#06x}-{:#06x}]", lower, upper),
            CharClass::CaseInsensitiveRange { lower, upper } => {
                write!(f, "(?i)[{:#06x}-{:#06x}]", lower, upper)
            }
            CharClass::Category(mask) => write!(f, "\\p{{{:#010x}}}", mask),
            CharClass::Ctype(ctype) => write!(f, "\\p{{{}}}", ctype),
            CharClass::Latin1(set) => {
                write!(f, "[")?;
                for c in set.iter() {
                    write!(f, "{}", c.escape_debug())?;
                }
                write!(f, "]")
            }
            CharClass::Specials => write!(f, "\\p{{InSpecials}}"),
            CharClass::Any => write!(f, "Any"),
            CharClass::Dot => write!(f, "Dot"),
            CharClass::UnixDot => write!(f, "UnixDot"),
            CharClass::Not(class) => write!(f, "!{}", class),
            CharClass::Union(lhs, rhs) => write!(f, "({} | {})", lhs, rhs),
            CharClass::Intersection(lhs, rhs) => write!(f, "({} & {})", lhs, rhs),
            CharClass::Difference(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
        }
    }
}
