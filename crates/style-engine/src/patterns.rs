//! Word lists and compiled regex tables for the style rules
//!
//! Every pattern is case-insensitive and anchored on ASCII word boundaries at
//! both ends, which is how the page's own regex engine treats `\b`.

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::text::Utf16Cursor;
use shared_types::{Category, ViolationSpan};

/// Overly promotional or vague marketing terms
pub const FORBIDDEN_TERMS: &[&str] = &[
    "revolutionary",
    "revolutionized",
    "renowned",
    "seamless",
    "seamlessly",
    "leverage",
    "leveraging",
    "comprehensive",
    "exponential",
    "exponentially",
    "boasts",
    "boasting",
    "impressive",
    "all-in-one",
    "all in one",
    "end-to-end",
    "end to end",
    "well-positioned to capitalize on",
    "poised",
    "at the intersection of",
    "is positioned",
    "achieving unicorn status",
    "becoming a unicorn",
];

/// Plural pronouns that should be "it" when the subject is a company
pub const PLURAL_PRONOUNS: &[&str] = &["they", "their", "them"];

/// Verb forms that follow a pronoun used as a subject
pub const SUBJECT_VERBS: &[&str] = &[
    "is", "are", "has", "have", "was", "were", "does", "do", "did", "will", "can", "could",
    "should", "would",
];

/// First- and second-person markers
pub const FIRST_PERSON_MARKERS: &[&str] = &["I", "you", "our take is", "we think", "we believe"];

/// Filler words and the fix offered for each
pub const FILLER_WORDS: &[(&str, &str)] = &[
    ("ultimately", "Remove if unnecessary"),
    ("very", "Remove or use more precise language"),
    ("so", "Remove if unnecessary"),
    ("hence", "Use \"therefore\" or remove"),
    ("thus", "Use \"therefore\" or remove"),
];

/// Passive or wordy constructions and the fix offered for each
pub const PASSIVE_PHRASES: &[(&str, &str)] = &[
    ("has been", "Use active voice instead"),
    ("has shown", "Use \"shows\" or active voice"),
    ("has seen", "Use active voice instead"),
    ("that included", "Use \"including\" instead"),
    ("that plays", "Use \"playing\" instead"),
    ("as well as", "Use \"and\" or restructure sentence"),
];

lazy_static! {
    /// One pattern per forbidden term, in list order
    pub static ref FORBIDDEN_PATTERNS: Vec<(Regex, &'static str)> = FORBIDDEN_TERMS
        .iter()
        .map(|term| (word_pattern(term), *term))
        .collect();

    /// Pronoun followed by a verb; group 1 is the pronoun
    pub static ref PRONOUN_PATTERN: Regex = Regex::new(&format!(
        r"(?i)(?-u:\b)({})\s+({})(?-u:\b)",
        PLURAL_PRONOUNS.join("|"),
        SUBJECT_VERBS.join("|")
    ))
    .unwrap();

    /// Alternation of first-person markers, matched in list order
    pub static ref FIRST_PERSON_PATTERN: Regex = Regex::new(&format!(
        r"(?i)(?-u:\b)({})(?-u:\b)",
        FIRST_PERSON_MARKERS
            .iter()
            .map(|m| regex::escape(m))
            .collect::<Vec<_>>()
            .join("|")
    ))
    .unwrap();

    pub static ref FILLER_PATTERNS: Vec<(Regex, &'static str)> = FILLER_WORDS
        .iter()
        .map(|(word, suggestion)| (word_pattern(word), *suggestion))
        .collect();

    pub static ref PASSIVE_PATTERNS: Vec<(Regex, &'static str)> = PASSIVE_PHRASES
        .iter()
        .map(|(phrase, suggestion)| (word_pattern(phrase), *suggestion))
        .collect();
}

/// Case-insensitive, boundary-anchored pattern for a literal word or phrase
pub fn word_pattern(phrase: &str) -> Regex {
    Regex::new(&format!(r"(?i)(?-u:\b){}(?-u:\b)", regex::escape(phrase))).unwrap()
}

/// Run `pattern` over `text` left to right and build one span per match.
///
/// `describe` turns the matched text into `(message, suggestion)`.
pub fn collect_spans<F>(
    text: &str,
    pattern: &Regex,
    category: Category,
    mut describe: F,
) -> Vec<ViolationSpan>
where
    F: FnMut(&str) -> (String, String),
{
    let mut cursor = Utf16Cursor::new(text);
    pattern
        .find_iter(text)
        .map(|m| {
            let start = cursor.advance_to(m.start());
            let end = cursor.advance_to(m.end());
            let (message, suggestion) = describe(m.as_str());
            ViolationSpan {
                start,
                end,
                original: m.as_str().to_string(),
                category,
                message,
                suggestion,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_pattern_is_boundary_anchored() {
        let re = word_pattern("so");
        assert!(re.is_match("and so on"));
        assert!(re.is_match("So,"));
        assert!(!re.is_match("also"));
        assert!(!re.is_match("sofa"));
    }

    #[test]
    fn test_word_pattern_escapes_phrases() {
        let re = word_pattern("all-in-one");
        assert!(re.is_match("An All-In-One suite"));
        assert!(!re.is_match("allxinxone"));
    }

    #[test]
    fn test_pronoun_pattern_requires_verb() {
        assert!(PRONOUN_PATTERN.is_match("they are"));
        assert!(PRONOUN_PATTERN.is_match("Their   has"));
        assert!(!PRONOUN_PATTERN.is_match("they launched"));
        assert!(!PRONOUN_PATTERN.is_match("they aren"));
    }

    #[test]
    fn test_first_person_pattern_prefers_list_order() {
        let m = FIRST_PERSON_PATTERN.find("We believe it").unwrap();
        assert_eq!(m.as_str(), "We believe");
    }

    #[test]
    fn test_tables_cover_every_entry() {
        assert_eq!(FORBIDDEN_PATTERNS.len(), FORBIDDEN_TERMS.len());
        assert_eq!(FILLER_PATTERNS.len(), FILLER_WORDS.len());
        assert_eq!(PASSIVE_PATTERNS.len(), PASSIVE_PHRASES.len());
    }

    #[test]
    fn test_collect_spans_reports_utf16_offsets() {
        let spans = collect_spans("café very", &word_pattern("very"), Category::Filler, |m| {
            (m.to_string(), String::new())
        });
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].start, spans[0].end), (5, 9));
    }
}
