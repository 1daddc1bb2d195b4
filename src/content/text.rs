//! Derived text metrics: read time and excerpts

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IMAGE: Regex = Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap();
    static ref LINK: Regex = Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap();
    static ref MARKUP: Regex = Regex::new(r"[#*_`\[\]>]").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Number of whitespace-separated words
pub fn word_count(body: &str) -> usize {
    body.split_whitespace().count()
}

/// Estimated reading time in whole minutes, rounded up
pub fn read_time(body: &str, words_per_minute: u32) -> u32 {
    let words = word_count(body) as u32;
    let wpm = words_per_minute.max(1);
    words.div_ceil(wpm)
}

/// Plain-text excerpt of at most `max_chars` characters plus `...` when cut
pub fn excerpt(body: &str, max_chars: usize) -> String {
    let plain = IMAGE.replace_all(body, "");
    let plain = LINK.replace_all(&plain, "$1");
    let plain = MARKUP.replace_all(&plain, "");
    let plain = WHITESPACE.replace_all(&plain, " ");
    let plain = plain.trim();

    if plain.chars().count() <= max_chars {
        return plain.to_string();
    }

    let cut: String = plain.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}
