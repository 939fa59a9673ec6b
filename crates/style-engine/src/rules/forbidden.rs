use crate::patterns::{collect_spans, FORBIDDEN_PATTERNS};
use shared_types::{Category, ViolationSpan};

const SUGGESTION: &str = "Remove or replace with more precise language";

/// Flag banned marketing and vague terms, one span per occurrence
pub fn check_forbidden_terms(text: &str) -> Vec<ViolationSpan> {
    let mut violations = Vec::new();

    for (pattern, _term) in FORBIDDEN_PATTERNS.iter() {
        violations.extend(collect_spans(
            text,
            pattern,
            Category::ForbiddenTerm,
            |matched| {
                (
                    format!(
                        "Avoid using \"{}\" - it's overly promotional or vague",
                        matched
                    ),
                    SUGGESTION.to_string(),
                )
            },
        ));
    }

    violations
}
