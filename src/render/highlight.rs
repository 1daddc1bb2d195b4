//! Code block tokenization with syntect

use serde::Serialize;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, FontStyle, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Theme used when the configured one is not bundled
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Language label for undeclared or unrecognized code
pub const PLAIN_TEXT: &str = "text";

/// A styled run of source text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub text: String,
    /// Foreground colour as `#rrggbb`
    pub color: Option<String>,
    pub bold: bool,
    pub italic: bool,
}

impl Token {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            color: None,
            bold: false,
            italic: false,
        }
    }
}

/// Syntax highlighter bound to one theme
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    pub fn new(theme_name: &str) -> Self {
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = match themes.remove(theme_name) {
            Some(theme) => theme,
            None => {
                tracing::warn!(
                    "Unknown highlight theme {:?}, using {}",
                    theme_name,
                    DEFAULT_THEME
                );
                themes.remove(DEFAULT_THEME).unwrap_or_default()
            }
        };

        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
        }
    }

    /// Resolve a declared language to a syntax and its display label
    fn resolve(&self, lang: Option<&str>) -> (&SyntaxReference, String) {
        let found = lang.filter(|l| !l.is_empty()).and_then(|l| {
            self.syntax_set
                .find_syntax_by_token(l)
                .or_else(|| self.syntax_set.find_syntax_by_extension(l))
                .map(|syntax| (syntax, l.to_lowercase()))
        });

        found.unwrap_or_else(|| {
            (
                self.syntax_set.find_syntax_plain_text(),
                PLAIN_TEXT.to_string(),
            )
        })
    }

    /// Tokenize `code` line by line. Returns the language label and the lines.
    pub fn tokenize(&self, code: &str, lang: Option<&str>) -> (String, Vec<Vec<Token>>) {
        let (syntax, label) = self.resolve(lang);
        let mut highlighter = HighlightLines::new(syntax, &self.theme);

        let mut lines = Vec::new();
        for line in LinesWithEndings::from(code) {
            let tokens = match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => ranges
                    .into_iter()
                    .filter_map(|(style, text)| {
                        let text = text.trim_end_matches(['\n', '\r']);
                        if text.is_empty() {
                            return None;
                        }
                        Some(Token {
                            text: text.to_string(),
                            color: Some(hex(style.foreground)),
                            bold: style.font_style.contains(FontStyle::BOLD),
                            italic: style.font_style.contains(FontStyle::ITALIC),
                        })
                    })
                    .collect(),
                Err(e) => {
                    tracing::debug!("Highlighting failed for {}: {}", label, e);
                    vec![Token::plain(line.trim_end_matches(['\n', '\r']))]
                }
            };
            lines.push(tokens);
        }

        (label, lines)
    }

    /// Background colour of the theme, if it sets one
    pub fn background(&self) -> Option<String> {
        self.theme.settings.background.map(hex)
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(DEFAULT_THEME)
    }
}

fn hex(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}
