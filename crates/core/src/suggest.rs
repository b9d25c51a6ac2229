//! Example queries offered as autocomplete.

/// One phrasing per classification rule, in rule order
pub const SUGGESTIONS: &[&str] = &[
    "Show me all diabetic patients over 50",
    "Patients over 60 with hypertension",
    "Female patients with asthma",
    "What conditions does Alice Smith have?",
    "Patients over 70",
    "Male patients",
    "All patients",
];

/// Suggestions containing `input`, ignoring case. Empty input returns all.
pub fn suggest(input: &str) -> Vec<&'static str> {
    let needle = input.to_lowercase();
    SUGGESTIONS
        .iter()
        .copied()
        .filter(|s| s.to_lowercase().contains(&needle))
        .collect()
}
