//! Text helpers

use regex::Regex;
use std::sync::OnceLock;

fn whitespace() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Collapse every whitespace run (line breaks included) into one space and trim
pub fn clean_text(text: &str) -> String {
    whitespace().replace_all(text.trim(), " ").into_owned()
}

/// Length in chars, the unit used for chunking and routing
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// First `max` chars of `text`, with an ellipsis when truncated
pub fn preview(text: &str, max: usize) -> String {
    if char_len(text) <= max {
        return text.to_string();
    }
    let mut shortened: String = text.chars().take(max).collect();
    shortened.push_str("...");
    shortened
}
