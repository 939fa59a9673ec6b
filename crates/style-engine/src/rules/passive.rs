use crate::patterns::{collect_spans, PASSIVE_PATTERNS};
use shared_types::{Category, ViolationSpan};

const MESSAGE: &str = "Avoid passive voice - use active voice for stronger writing";

/// Flag passive and wordy constructions
pub fn check_passive_voice(text: &str) -> Vec<ViolationSpan> {
    let mut violations = Vec::new();

    for (pattern, suggestion) in PASSIVE_PATTERNS.iter() {
        violations.extend(collect_spans(
            text,
            pattern,
            Category::PassiveVoice,
            |_| (MESSAGE.to_string(), suggestion.to_string()),
        ));
    }

    violations
}
