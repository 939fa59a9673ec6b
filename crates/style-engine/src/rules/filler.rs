use crate::patterns::{collect_spans, FILLER_PATTERNS};
use shared_types::{Category, ViolationSpan};

/// Flag filler words, each with its own suggested fix
pub fn check_filler_words(text: &str) -> Vec<ViolationSpan> {
    let mut violations = Vec::new();

    for (pattern, suggestion) in FILLER_PATTERNS.iter() {
        violations.extend(collect_spans(text, pattern, Category::Filler, |matched| {
            (
                format!(
                    "Consider removing \"{}\" - it may be unnecessary filler",
                    matched
                ),
                suggestion.to_string(),
            )
        }));
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_specific_suggestions() {
        let violations = check_filler_words("Hence the result was very good.");
        assert_eq!(violations.len(), 2);
        // Grouped by word list order: "very" before "hence"
        assert_eq!(violations[0].original, "very");
        assert_eq!(violations[0].suggestion, "Remove or use more precise language");
        assert_eq!(violations[1].original, "Hence");
        assert_eq!(violations[1].suggestion, "Use \"therefore\" or remove");
    }

    #[test]
    fn test_so_is_whole_word() {
        let violations = check_filler_words("So it is also sorted.");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].start, 0);
    }
}
