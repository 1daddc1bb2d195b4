//! Markdown rendering: node tree, syntax highlighting and HTML output

mod anchor;
mod highlight;
mod html;
mod tree;

pub use anchor::{slugify, AnchorRegistry};
pub use highlight::{Highlighter, Token, DEFAULT_THEME, PLAIN_TEXT};
pub use html::{HtmlRenderer, RenderTable, COPY_FEEDBACK_MS};
pub use tree::{
    headings, is_external, origin_of, parse_tree, Align, CodeBlock, Image, Link, Node,
    RenderOptions, TocEntry,
};

use crate::config::SiteConfig;

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    highlighter: Highlighter,
    options: RenderOptions,
    html: HtmlRenderer,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options(DEFAULT_THEME, RenderOptions::default())
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, options: RenderOptions) -> Self {
        Self {
            highlighter: Highlighter::new(theme),
            options,
            html: HtmlRenderer::default(),
        }
    }

    /// Renderer configured from the site's highlight theme and origin
    pub fn for_site(config: &SiteConfig) -> Self {
        Self::with_options(
            &config.highlight.theme,
            RenderOptions {
                site_origin: config.origin(),
            },
        )
    }

    /// Parse a body into its node tree
    pub fn parse_tree(&self, markdown: &str) -> Vec<Node> {
        parse_tree(markdown, &self.highlighter, &self.options)
    }

    /// Render a body to HTML
    pub fn render_html(&self, markdown: &str) -> String {
        self.html.render(&self.parse_tree(markdown))
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_site_uses_origin() {
        let config = SiteConfig {
            url: "https://jane.dev/".to_string(),
            ..Default::default()
        };
        let renderer = MarkdownRenderer::for_site(&config);
        let html = renderer.render_html("[me](https://jane.dev/cv) [gh](https://github.com)");
        assert!(html.contains(r#"<a href="https://jane.dev/cv">me</a>"#));
        assert!(html.contains(r#"target="_blank""#));
    }

    #[test]
    fn test_rerender_is_pure() {
        let renderer = MarkdownRenderer::new();
        let body = "## Intro\n\n## Intro\n";
        assert_eq!(renderer.render_html(body), renderer.render_html(body));
        assert!(renderer.render_html(body).contains(r#"id="intro-2""#));
    }
}
