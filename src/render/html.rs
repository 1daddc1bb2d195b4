//! HTML output for the node tree

use super::highlight::Token;
use super::tree::{Align, CodeBlock, Image, Link, Node};
use crate::helpers::html_escape;

/// How long the copy button shows its success label
pub const COPY_FEEDBACK_MS: u64 = 2000;

/// Per-kind output functions for the nodes whose markup is a site policy.
///
/// Every entry is a plain function of the node's data; the link entry also
/// receives its already rendered children.
#[derive(Clone, Copy)]
pub struct RenderTable {
    pub image: fn(&Image) -> String,
    pub link: fn(&Link, &str) -> String,
    pub code_block: fn(&CodeBlock) -> String,
    pub inline_code: fn(&str) -> String,
}

impl Default for RenderTable {
    fn default() -> Self {
        Self {
            image: render_image,
            link: render_link,
            code_block: render_code_block,
            inline_code: render_inline_code,
        }
    }
}

fn render_image(image: &Image) -> String {
    let title = if image.title.is_empty() {
        String::new()
    } else {
        format!(r#" title="{}""#, html_escape(&image.title))
    };
    format!(
        r#"<img src="{}" alt="{}"{} loading="lazy" class="content-image">"#,
        html_escape(&image.src),
        html_escape(&image.alt),
        title
    )
}

fn render_link(link: &Link, inner: &str) -> String {
    let title = if link.title.is_empty() {
        String::new()
    } else {
        format!(r#" title="{}""#, html_escape(&link.title))
    };
    let target = if link.external {
        r#" target="_blank" rel="noopener noreferrer""#
    } else {
        ""
    };
    format!(
        r#"<a href="{}"{}{}>{}</a>"#,
        html_escape(&link.href),
        title,
        target,
        inner
    )
}

fn render_token(token: &Token, out: &mut String) {
    let mut style = String::new();
    if let Some(color) = &token.color {
        style.push_str("color:");
        style.push_str(color);
        style.push(';');
    }
    if token.bold {
        style.push_str("font-weight:bold;");
    }
    if token.italic {
        style.push_str("font-style:italic;");
    }

    if style.is_empty() {
        out.push_str(&html_escape(&token.text));
    } else {
        out.push_str(&format!(
            r#"<span style="{}">{}</span>"#,
            style,
            html_escape(&token.text)
        ));
    }
}

fn render_code_block(block: &CodeBlock) -> String {
    let mut code = String::new();
    for (i, line) in block.lines.iter().enumerate() {
        if i > 0 {
            code.push('\n');
        }
        for token in line {
            render_token(token, &mut code);
        }
    }

    let style = block
        .background
        .as_ref()
        .map(|bg| format!(r#" style="background-color:{bg};""#))
        .unwrap_or_default();
    let lang = html_escape(&block.language);

    format!(
        concat!(
            r#"<figure class="code-block" data-language="{lang}">"#,
            r#"<pre class="highlight"{style}><code class="language-{lang}">{code}</code></pre>"#,
            r#"<button type="button" class="copy-button" data-copy="{copy}" "#,
            r#"data-feedback-ms="{ms}" aria-label="Copy code to clipboard">Copy</button>"#,
            r#"</figure>"#
        ),
        lang = lang,
        style = style,
        code = code,
        copy = html_escape(&block.code),
        ms = COPY_FEEDBACK_MS,
    )
}

fn render_inline_code(code: &str) -> String {
    format!(r#"<code class="inline-code">{}</code>"#, html_escape(code))
}

/// Renders node trees to HTML through a [`RenderTable`]
#[derive(Clone, Copy, Default)]
pub struct HtmlRenderer {
    table: RenderTable,
}

impl HtmlRenderer {
    pub fn new(table: RenderTable) -> Self {
        Self { table }
    }

    pub fn render(&self, nodes: &[Node]) -> String {
        let mut out = String::new();
        self.render_nodes(nodes, &mut out);
        out
    }

    fn render_nodes(&self, nodes: &[Node], out: &mut String) {
        for node in nodes {
            self.render_node(node, out);
        }
    }

    fn wrap(&self, tag: &str, children: &[Node], out: &mut String) {
        out.push('<');
        out.push_str(tag);
        out.push('>');
        self.render_nodes(children, out);
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }

    fn render_node(&self, node: &Node, out: &mut String) {
        match node {
            Node::Paragraph(children) => {
                self.wrap("p", children, out);
                out.push('\n');
            }
            Node::Heading {
                level,
                anchor,
                children,
            } => {
                out.push_str(&format!(r#"<h{level} id="{}">"#, html_escape(anchor)));
                self.render_nodes(children, out);
                out.push_str(&format!("</h{level}>\n"));
            }
            Node::BlockQuote(children) => {
                out.push_str("<blockquote>\n");
                self.render_nodes(children, out);
                out.push_str("</blockquote>\n");
            }
            Node::List { start, items } => {
                let tag = match start {
                    Some(1) => {
                        out.push_str("<ol>\n");
                        "ol"
                    }
                    Some(n) => {
                        out.push_str(&format!(r#"<ol start="{n}">"#));
                        out.push('\n');
                        "ol"
                    }
                    None => {
                        out.push_str("<ul>\n");
                        "ul"
                    }
                };
                for item in items {
                    self.wrap("li", item, out);
                    out.push('\n');
                }
                out.push_str(&format!("</{tag}>\n"));
            }
            Node::CodeBlock(block) => {
                out.push_str(&(self.table.code_block)(block));
                out.push('\n');
            }
            Node::Table {
                alignments,
                head,
                rows,
            } => {
                out.push_str("<table>\n<thead><tr>");
                for (i, cell) in head.iter().enumerate() {
                    self.cell("th", alignments.get(i), cell, out);
                }
                out.push_str("</tr></thead>\n<tbody>\n");
                for row in rows {
                    out.push_str("<tr>");
                    for (i, cell) in row.iter().enumerate() {
                        self.cell("td", alignments.get(i), cell, out);
                    }
                    out.push_str("</tr>\n");
                }
                out.push_str("</tbody>\n</table>\n");
            }
            Node::Rule => out.push_str("<hr>\n"),
            // Raw HTML in a write-up is shown as text, never interpreted
            Node::Html(html) => out.push_str(&html_escape(html)),
            Node::Text(text) => out.push_str(&html_escape(text)),
            Node::InlineCode(code) => out.push_str(&(self.table.inline_code)(code)),
            Node::Emphasis(children) => self.wrap("em", children, out),
            Node::Strong(children) => self.wrap("strong", children, out),
            Node::Strikethrough(children) => self.wrap("del", children, out),
            Node::Link(link) => {
                let mut inner = String::new();
                self.render_nodes(&link.children, &mut inner);
                out.push_str(&(self.table.link)(link, &inner));
            }
            Node::Image(image) => out.push_str(&(self.table.image)(image)),
            Node::TaskMarker(checked) => {
                let checked = if *checked { " checked" } else { "" };
                out.push_str(&format!(r#"<input type="checkbox" disabled{checked}> "#));
            }
            Node::SoftBreak => out.push('\n'),
            Node::HardBreak => out.push_str("<br>\n"),
        }
    }

    fn cell(&self, tag: &str, align: Option<&Align>, children: &[Node], out: &mut String) {
        let style = match align {
            Some(Align::Left) => r#" style="text-align:left""#,
            Some(Align::Center) => r#" style="text-align:center""#,
            Some(Align::Right) => r#" style="text-align:right""#,
            _ => "",
        };
        out.push_str(&format!("<{tag}{style}>"));
        self.render_nodes(children, out);
        out.push_str(&format!("</{tag}>"));
    }
}
