//! Heading anchors

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s-]").unwrap();
    static ref SPACES: Regex = Regex::new(r"\s+").unwrap();
}

/// URL-safe anchor for a heading's visible text.
///
/// Lowercases, drops everything except word characters, whitespace and `-`,
/// then joins whitespace runs with a single `-`.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lower, "");
    SPACES.replace_all(stripped.trim(), "-").into_owned()
}

/// Anchor used when a heading has no word characters, e.g. `# !!!`
pub const FALLBACK_ANCHOR: &str = "section";

/// Hands out unique anchors within one document.
///
/// The first heading keeps its slug; repeats get `-2`, `-3`, ...
#[derive(Debug, Default)]
pub struct AnchorRegistry {
    used: HashSet<String>,
}

impl AnchorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base = FALLBACK_ANCHOR.to_string();
        }
        if self.used.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}-{n}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  What's  new in v2.0?  "), "whats-new-in-v20");
        assert_eq!(slugify("Already-hyphenated_name"), "already-hyphenated_name");
        assert_eq!(slugify("Über Café"), "über-café");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_slugify_idempotent() {
        for text in ["Hello World", "A  b\tc", "Rust & Tokio: Notes!", "--x--", "Ünïcödé Title"] {
            let once = slugify(text);
            assert_eq!(slugify(&once), once, "not idempotent for {text:?}");
            assert_eq!(slugify(text), once);
        }
    }

    #[test]
    fn test_registry_disambiguates() {
        let mut registry = AnchorRegistry::new();
        assert_eq!(registry.assign("Setup"), "setup");
        assert_eq!(registry.assign("Setup"), "setup-2");
        assert_eq!(registry.assign("Setup 2"), "setup-2-2");
        assert_eq!(registry.assign("setup"), "setup-3");
    }

    #[test]
    fn test_registry_never_hands_out_empty_anchor() {
        let mut registry = AnchorRegistry::new();
        assert_eq!(registry.assign("!!!"), FALLBACK_ANCHOR);
        assert_eq!(registry.assign("???"), "section-2");
        assert_eq!(registry.assign(""), "section-3");
    }
}
