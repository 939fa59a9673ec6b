use crate::patterns::{collect_spans, FIRST_PERSON_PATTERN};
use shared_types::{Category, ViolationSpan};

/// Flag first- and second-person voice
pub fn check_first_person(text: &str) -> Vec<ViolationSpan> {
    collect_spans(text, &FIRST_PERSON_PATTERN, Category::FirstPerson, |_| {
        (
            "Avoid first person - write in third person".to_string(),
            "Rewrite in third person".to_string(),
        )
    })
}
