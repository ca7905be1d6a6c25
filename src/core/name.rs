//! Display-name cleanup shared by name lookups and registrar export conversion.

use serde::{Deserialize, Serialize};

/// Generational suffixes that are dropped before using the last word as a last name
pub const GENERATIONAL_SUFFIXES: &[&str] = &["II", "III", "IV", "JR", "JR."];

/// Drop a trailing parenthetical (pronouns, preferred name) from a display name.
///
/// Everything from the last `(` onward is removed and the rest is trimmed.
///
/// ```
/// use roster_match::core::name::strip_parenthetical;
///
/// assert_eq!(strip_parenthetical("Ann Smith (she/her)"), "Ann Smith");
/// assert_eq!(strip_parenthetical("Ann Smith"), "Ann Smith");
/// ```
#[must_use]
pub fn strip_parenthetical(name: &str) -> &str {
    match name.rfind('(') {
        Some(pos) => name[..pos].trim(),
        None => name.trim(),
    }
}

#[must_use]
pub fn is_generational_suffix(word: &str) -> bool {
    let upper = word.to_uppercase();
    GENERATIONAL_SUFFIXES.contains(&upper.as_str())
}

/// Split a display name into words, dropping one trailing generational suffix.
///
/// A name consisting only of a suffix is kept as is.
#[must_use]
pub fn name_words(name: &str) -> Vec<&str> {
    let mut words: Vec<&str> = name.split_whitespace().collect();
    if words.len() > 1 && words.last().is_some_and(|w| is_generational_suffix(w)) {
        words.pop();
    }
    words
}

/// A display name split into first, middle and last parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameParts {
    pub first: String,
    pub middle: String,
    pub last: String,
}

impl NameParts {
    /// Split a registrar-style display name.
    ///
    /// Commas are treated as spaces and a generational suffix is dropped.
    /// One word is both the first and the last name; two are first and last; anything longer
    /// puts every inner word in the middle name. Returns `None` for a blank name.
    #[must_use]
    pub fn parse(display_name: &str) -> Option<Self> {
        let cleaned = display_name.replace(',', " ");
        let words = name_words(&cleaned);

        match words.as_slice() {
            [] => None,
            [first] => Some(Self {
                first: (*first).to_string(),
                middle: String::new(),
                last: (*first).to_string(),
            }),
            [first, last] => Some(Self {
                first: (*first).to_string(),
                middle: String::new(),
                last: (*last).to_string(),
            }),
            [first, middle @ .., last] => Some(Self {
                first: (*first).to_string(),
                middle: middle.join(" "),
                last: (*last).to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_parenthetical_uses_last_paren() {
        assert_eq!(strip_parenthetical("Jo (Joanne) Lee (they/them)"), "Jo (Joanne) Lee");
        assert_eq!(strip_parenthetical("  Jo Lee  "), "Jo Lee");
    }

    #[test]
    fn test_name_words_drops_suffix() {
        assert_eq!(name_words("John Smith Jr."), vec!["John", "Smith"]);
        assert_eq!(name_words("John Smith iii"), vec!["John", "Smith"]);
        assert_eq!(name_words("John Smith"), vec!["John", "Smith"]);
        assert_eq!(name_words("IV"), vec!["IV"]);
    }

    #[test]
    fn test_parse_single_word_fills_last_name() {
        let parts = NameParts::parse("Cher").unwrap();
        assert_eq!(parts.first, "Cher");
        assert_eq!(parts.middle, "");
        assert_eq!(parts.last, "Cher");
    }

    #[test]
    fn test_parse_two_words() {
        let parts = NameParts::parse("Ann Smith").unwrap();
        assert_eq!(parts.first, "Ann");
        assert_eq!(parts.middle, "");
        assert_eq!(parts.last, "Smith");
    }

    #[test]
    fn test_parse_three_words() {
        let parts = NameParts::parse("Ann Marie Smith").unwrap();
        assert_eq!(parts.middle, "Marie");
        assert_eq!(parts.last, "Smith");
    }

    #[test]
    fn test_parse_many_words_with_comma_and_suffix() {
        let parts = NameParts::parse("Juan Carlos de la Cruz, Jr").unwrap();
        assert_eq!(parts.first, "Juan");
        assert_eq!(parts.middle, "Carlos de la");
        assert_eq!(parts.last, "Cruz");
    }

    #[test]
    fn test_parse_blank() {
        assert!(NameParts::parse("  ,  ").is_none());
    }
}
