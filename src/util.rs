//! Shared utility functions.

use std::sync::LazyLock;

use regex::Regex;

/// A run of word characters, with contractions kept together ("what's").
static WORD_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+(?:['’]\w+)*").expect("word run pattern is valid"));

/// Convert every word run in a string to title case.
///
/// Anything that is not a word character separates words, so slashes and
/// dashes keep both sides capitalized.
/// "walk/roll event" -> "Walk/Roll Event"
/// "GETTING-started" -> "Getting-Started"
pub fn title_case(s: &str) -> String {
    WORD_RUN
        .replace_all(s, |caps: &regex::Captures<'_>| capitalize(&caps[0]))
        .into_owned()
}

/// Uppercase the first character, lowercase the rest.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
    }
}
