use crate::patterns::{collect_spans, PRONOUN_PATTERN};
use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{Category, ViolationSpan};

lazy_static! {
    static ref PRONOUN_WORD: Regex = Regex::new(r"(?i)(?-u:\b)(they|their|them)(?-u:\b)").unwrap();
}

const MESSAGE: &str = "Use \"it\" instead of \"they\" when referring to a company";

/// Flag a company referred to as "they" ahead of a subject verb
pub fn check_pronouns(text: &str) -> Vec<ViolationSpan> {
    collect_spans(text, &PRONOUN_PATTERN, Category::Pronoun, |matched| {
        (MESSAGE.to_string(), singular_rewrite(matched))
    })
}

/// Swap the plural pronoun for its singular form, keeping the verb as written
pub fn singular_rewrite(matched: &str) -> String {
    PRONOUN_WORD
        .replace_all(matched, |caps: &regex::Captures| {
            let pronoun = &caps[0];
            let singular = match pronoun.to_lowercase().as_str() {
                "their" => "its",
                _ => "it",
            };
            if pronoun.starts_with(|c: char| c.is_uppercase()) {
                capitalize(singular)
            } else {
                singular.to_string()
            }
        })
        .into_owned()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
