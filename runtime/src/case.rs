//! Single character case mapping and general category lookups shared by the
//! compiler and the matcher.

use unicode_general_category::{get_general_category, GeneralCategory};

/// Maps a character to its uppercase form when that form is a single
/// character, otherwise returns the character unchanged.
pub fn to_upper(c: char) -> char {
    let mut mapped = c.to_uppercase();
    match (mapped.next(), mapped.next()) {
        (Some(upper), None) => upper,
        _ => c,
    }
}

/// Maps a character to its lowercase form when that form is a single
/// character, otherwise returns the character unchanged.
pub fn to_lower(c: char) -> char {
    let mut mapped = c.to_lowercase();
    match (mapped.next(), mapped.next()) {
        (Some(lower), None) => lower,
        _ => c,
    }
}

/// The Unicode case fold used by case-insensitive literals: lowercase of the
/// uppercase form.
pub fn fold(c: char) -> char {
    to_lower(to_upper(c))
}

/// Lowercases ASCII letters only.
pub fn ascii_fold(c: char) -> char {
    c.to_ascii_lowercase()
}

/// Bit index of a character's general category within a category mask.
///
/// Indices follow the classic numbering where `Cn` is 0, `Lu` is 1 and so
/// on through `So` at 28, with the quote punctuation categories at 29
/// and 30. Index 17 is unused.
pub fn category_index(c: char) -> u32 {
    match get_general_category(c) {
        GeneralCategory::UppercaseLetter => 1,
        GeneralCategory::LowercaseLetter => 2,
        GeneralCategory::TitlecaseLetter => 3,
        GeneralCategory::ModifierLetter => 4,
        GeneralCategory::OtherLetter => 5,
        GeneralCategory::NonspacingMark => 6,
        GeneralCategory::EnclosingMark => 7,
        GeneralCategory::SpacingMark => 8,
        GeneralCategory::DecimalNumber => 9,
        GeneralCategory::LetterNumber => 10,
        GeneralCategory::OtherNumber => 11,
        GeneralCategory::SpaceSeparator => 12,
        GeneralCategory::LineSeparator => 13,
        GeneralCategory::ParagraphSeparator => 14,
        GeneralCategory::Control => 15,
        GeneralCategory::Format => 16,
        GeneralCategory::PrivateUse => 18,
        GeneralCategory::Surrogate => 19,
        GeneralCategory::DashPunctuation => 20,
        GeneralCategory::OpenPunctuation => 21,
        GeneralCategory::ClosePunctuation => 22,
        GeneralCategory::ConnectorPunctuation => 23,
        GeneralCategory::OtherPunctuation => 24,
        GeneralCategory::MathSymbol => 25,
        GeneralCategory::CurrencySymbol => 26,
        GeneralCategory::ModifierSymbol => 27,
        GeneralCategory::OtherSymbol => 28,
        GeneralCategory::InitialPunctuation => 29,
        GeneralCategory::FinalPunctuation => 30,
        _ => 0,
    }
}

/// Letters and decimal digits.
pub fn is_letter_or_digit(c: char) -> bool {
    (1..=5).contains(&category_index(c)) || category_index(c) == 9
}

/// Characters that form words for the purpose of `\b` and `\B`.
pub fn is_word(c: char) -> bool {
    c == '_' || is_letter_or_digit(c)
}

/// Reports whether a character is a non-spacing combining mark.
pub fn is_nonspacing_mark(c: char) -> bool {
    get_general_category(c) == GeneralCategory::NonspacingMark
}
