//! Rendered node tree built from markdown events

use pulldown_cmark::{Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};
use serde::Serialize;

use super::anchor::AnchorRegistry;
use super::highlight::{Highlighter, Token};

/// Settings that influence how a body is turned into nodes
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Scheme and authority of the site, e.g. `https://jane.dev`
    pub site_origin: Option<String>,
}

/// Column alignment of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Align {
    None,
    Left,
    Center,
    Right,
}

impl From<Alignment> for Align {
    fn from(alignment: Alignment) -> Self {
        match alignment {
            Alignment::None => Align::None,
            Alignment::Left => Align::Left,
            Alignment::Center => Align::Center,
            Alignment::Right => Align::Right,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub href: String,
    pub title: String,
    /// Absolute target outside the site origin
    pub external: bool,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    pub src: String,
    pub alt: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeBlock {
    /// Resolved language label, `text` when unknown
    pub language: String,
    /// Full source, without the trailing newline
    pub code: String,
    pub lines: Vec<Vec<Token>>,
    pub background: Option<String>,
}

/// One node of a rendered document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Node {
    Paragraph(Vec<Node>),
    Heading {
        level: u8,
        anchor: String,
        children: Vec<Node>,
    },
    BlockQuote(Vec<Node>),
    List {
        start: Option<u64>,
        items: Vec<Vec<Node>>,
    },
    CodeBlock(CodeBlock),
    Table {
        alignments: Vec<Align>,
        head: Vec<Vec<Node>>,
        rows: Vec<Vec<Vec<Node>>>,
    },
    Rule,
    Html(String),
    Text(String),
    InlineCode(String),
    Emphasis(Vec<Node>),
    Strong(Vec<Node>),
    Strikethrough(Vec<Node>),
    Link(Link),
    Image(Image),
    TaskMarker(bool),
    SoftBreak,
    HardBreak,
}

impl Node {
    /// Concatenated visible text of this node and its descendants
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match self {
            Node::Text(text) | Node::InlineCode(text) => out.push_str(text),
            Node::SoftBreak | Node::HardBreak => out.push(' '),
            Node::Image(image) => out.push_str(&image.alt),
            Node::CodeBlock(block) => out.push_str(&block.code),
            Node::Paragraph(children)
            | Node::BlockQuote(children)
            | Node::Emphasis(children)
            | Node::Strong(children)
            | Node::Strikethrough(children)
            | Node::Heading { children, .. }
            | Node::Link(Link { children, .. }) => {
                children.iter().for_each(|c| c.push_text(out));
            }
            Node::List { items, .. } => {
                for item in items {
                    item.iter().for_each(|c| c.push_text(out));
                }
            }
            Node::Table { head, rows, .. } => {
                for cell in head.iter().chain(rows.iter().flatten()) {
                    cell.iter().for_each(|c| c.push_text(out));
                }
            }
            Node::Rule | Node::Html(_) | Node::TaskMarker(_) => {}
        }
    }
}

/// Table of contents entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TocEntry {
    pub level: u8,
    pub text: String,
    pub anchor: String,
}

/// Collect headings in document order
pub fn headings(nodes: &[Node]) -> Vec<TocEntry> {
    let mut entries = Vec::new();
    collect_headings(nodes, &mut entries);
    entries
}

fn collect_headings(nodes: &[Node], entries: &mut Vec<TocEntry>) {
    for node in nodes {
        match node {
            Node::Heading {
                level,
                anchor,
                children,
            } => entries.push(TocEntry {
                level: *level,
                text: children.iter().map(Node::plain_text).collect(),
                anchor: anchor.clone(),
            }),
            Node::BlockQuote(children) => collect_headings(children, entries),
            Node::List { items, .. } => items.iter().for_each(|i| collect_headings(i, entries)),
            _ => {}
        }
    }
}

enum FrameKind {
    Root,
    Paragraph,
    Heading(u8),
    BlockQuote,
    List(Option<u64>),
    Item,
    CodeBlock(Option<String>),
    HtmlBlock,
    Table(Vec<Align>),
    TableHead,
    TableRow,
    TableCell,
    Emphasis,
    Strong,
    Strikethrough,
    Link { href: String, title: String },
    Image { src: String, title: String },
    /// Tags with no node of their own; children go to the parent
    Transparent,
}

struct Frame {
    kind: FrameKind,
    children: Vec<Node>,
    /// List items, or cells of a table row/head
    parts: Vec<Vec<Node>>,
    head: Vec<Vec<Node>>,
    rows: Vec<Vec<Vec<Node>>>,
    code: String,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            parts: Vec::new(),
            head: Vec::new(),
            rows: Vec::new(),
            code: String::new(),
        }
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

struct TreeBuilder<'a> {
    highlighter: &'a Highlighter,
    options: &'a RenderOptions,
    anchors: AnchorRegistry,
    stack: Vec<Frame>,
}

impl<'a> TreeBuilder<'a> {
    fn new(highlighter: &'a Highlighter, options: &'a RenderOptions) -> Self {
        Self {
            highlighter,
            options,
            anchors: AnchorRegistry::new(),
            stack: vec![Frame::new(FrameKind::Root)],
        }
    }

    fn top(&mut self) -> &mut Frame {
        // The root frame is never popped
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn push_node(&mut self, node: Node) {
        self.top().children.push(node);
    }

    fn start(&mut self, tag: Tag<'_>) {
        let kind = match tag {
            Tag::Paragraph => FrameKind::Paragraph,
            Tag::Heading { level, .. } => FrameKind::Heading(heading_level(level)),
            Tag::BlockQuote(_) => FrameKind::BlockQuote,
            Tag::List(start) => FrameKind::List(start),
            Tag::Item => FrameKind::Item,
            Tag::CodeBlock(kind) => FrameKind::CodeBlock(match kind {
                CodeBlockKind::Fenced(info) => info
                    .split_whitespace()
                    .next()
                    .map(|lang| lang.to_string()),
                CodeBlockKind::Indented => None,
            }),
            Tag::HtmlBlock => FrameKind::HtmlBlock,
            Tag::Table(alignments) => {
                FrameKind::Table(alignments.into_iter().map(Align::from).collect())
            }
            Tag::TableHead => FrameKind::TableHead,
            Tag::TableRow => FrameKind::TableRow,
            Tag::TableCell => FrameKind::TableCell,
            Tag::Emphasis => FrameKind::Emphasis,
            Tag::Strong => FrameKind::Strong,
            Tag::Strikethrough => FrameKind::Strikethrough,
            Tag::Link {
                dest_url, title, ..
            } => FrameKind::Link {
                href: dest_url.to_string(),
                title: title.to_string(),
            },
            Tag::Image {
                dest_url, title, ..
            } => FrameKind::Image {
                src: dest_url.to_string(),
                title: title.to_string(),
            },
            _ => FrameKind::Transparent,
        };
        self.stack.push(Frame::new(kind));
    }

    fn end(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };

        let node = match frame.kind {
            FrameKind::Root => return,
            FrameKind::Paragraph => Node::Paragraph(frame.children),
            FrameKind::Heading(level) => {
                let text: String = frame.children.iter().map(Node::plain_text).collect();
                Node::Heading {
                    level,
                    anchor: self.anchors.assign(&text),
                    children: frame.children,
                }
            }
            FrameKind::BlockQuote => Node::BlockQuote(frame.children),
            FrameKind::List(start) => Node::List {
                start,
                items: frame.parts,
            },
            FrameKind::Item => {
                self.top().parts.push(frame.children);
                return;
            }
            FrameKind::CodeBlock(lang) => {
                let code = frame.code.strip_suffix('\n').unwrap_or(&frame.code);
                let (language, lines) = self.highlighter.tokenize(code, lang.as_deref());
                Node::CodeBlock(CodeBlock {
                    language,
                    code: code.to_string(),
                    lines,
                    background: self.highlighter.background(),
                })
            }
            FrameKind::HtmlBlock => Node::Html(frame.code),
            FrameKind::Table(alignments) => Node::Table {
                alignments,
                head: frame.head,
                rows: frame.rows,
            },
            FrameKind::TableHead => {
                self.top().head = frame.parts;
                return;
            }
            FrameKind::TableRow => {
                self.top().rows.push(frame.parts);
                return;
            }
            FrameKind::TableCell => {
                self.top().parts.push(frame.children);
                return;
            }
            FrameKind::Emphasis => Node::Emphasis(frame.children),
            FrameKind::Strong => Node::Strong(frame.children),
            FrameKind::Strikethrough => Node::Strikethrough(frame.children),
            FrameKind::Link { href, title } => Node::Link(Link {
                external: is_external(&href, self.options.site_origin.as_deref()),
                href,
                title,
                children: frame.children,
            }),
            FrameKind::Image { src, title } => Node::Image(Image {
                src,
                alt: frame.children.iter().map(Node::plain_text).collect(),
                title,
            }),
            FrameKind::Transparent => {
                self.top().children.extend(frame.children);
                return;
            }
        };
        self.push_node(node);
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) => {
                let top = self.top();
                match top.kind {
                    FrameKind::CodeBlock(_) | FrameKind::HtmlBlock => top.code.push_str(&text),
                    _ => top.children.push(Node::Text(text.to_string())),
                }
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                let top = self.top();
                match top.kind {
                    FrameKind::HtmlBlock => top.code.push_str(&html),
                    _ => top.children.push(Node::Html(html.to_string())),
                }
            }
            Event::Code(code) => self.push_node(Node::InlineCode(code.to_string())),
            Event::SoftBreak => self.push_node(Node::SoftBreak),
            Event::HardBreak => self.push_node(Node::HardBreak),
            Event::Rule => self.push_node(Node::Rule),
            Event::TaskListMarker(checked) => self.push_node(Node::TaskMarker(checked)),
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while self.stack.len() > 1 {
            self.end();
        }
        std::mem::take(&mut self.top().children)
    }
}

/// Parse a markdown body into its node tree
pub fn parse_tree(markdown: &str, highlighter: &Highlighter, options: &RenderOptions) -> Vec<Node> {
    let parser_options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut builder = TreeBuilder::new(highlighter, options);
    for event in Parser::new_ext(markdown, parser_options) {
        builder.event(event);
    }
    builder.finish()
}

/// Scheme and authority of an absolute http(s) url, lowercased
pub fn origin_of(url: &str) -> Option<String> {
    let (scheme, rest) = url.split_once("://")?;
    let scheme = scheme.to_ascii_lowercase();
    if scheme != "http" && scheme != "https" {
        return None;
    }
    let authority = authority(rest);
    if authority.is_empty() {
        return None;
    }
    Some(format!("{scheme}://{authority}"))
}

fn authority(rest: &str) -> String {
    rest.split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Whether a link target leaves the site
pub fn is_external(href: &str, site_origin: Option<&str>) -> bool {
    let site = site_origin.and_then(|o| o.split_once("://").map(|(s, a)| (s.to_string(), a)));

    if let Some(rest) = href.strip_prefix("//") {
        return match site {
            Some((_, site_authority)) => authority(rest) != site_authority,
            None => true,
        };
    }

    match origin_of(href) {
        Some(target) => site_origin.map_or(true, |site| !target.eq_ignore_ascii_case(site)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(markdown: &str) -> Vec<Node> {
        let highlighter = Highlighter::default();
        let options = RenderOptions {
            site_origin: Some("https://jane.dev".to_string()),
        };
        parse_tree(markdown, &highlighter, &options)
    }

    #[test]
    fn test_paragraph_and_inline() {
        let nodes = parse("Some **bold** and `code`.");
        assert_eq!(
            nodes,
            vec![Node::Paragraph(vec![
                Node::Text("Some ".into()),
                Node::Strong(vec![Node::Text("bold".into())]),
                Node::Text(" and ".into()),
                Node::InlineCode("code".into()),
                Node::Text(".".into()),
            ])]
        );
    }

    #[test]
    fn test_heading_anchors_disambiguate() {
        let nodes = parse("# Results\n\n## Results\n\n## What's *Next*?");
        let toc = headings(&nodes);
        let anchors: Vec<_> = toc.iter().map(|t| t.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["results", "results-2", "whats-next"]);
        assert_eq!(toc[2].level, 2);
        assert_eq!(toc[2].text, "What's Next?");
    }

    #[test]
    fn test_punctuation_heading_gets_fallback_anchor() {
        let nodes = parse("# !!!\n\n## ???");
        let anchors: Vec<_> = headings(&nodes).into_iter().map(|t| t.anchor).collect();
        assert_eq!(anchors, vec!["section", "section-2"]);
    }

    #[test]
    fn test_links_classified() {
        let nodes = parse(
            "[a](https://github.com/x) [b](/projects/y/) [c](https://jane.dev/about) [d](#top) [e](//cdn.example.com/z)",
        );
        let Node::Paragraph(children) = &nodes[0] else {
            panic!("expected paragraph");
        };
        let external: Vec<_> = children
            .iter()
            .filter_map(|n| match n {
                Node::Link(link) => Some((link.href.as_str(), link.external)),
                _ => None,
            })
            .collect();
        assert_eq!(
            external,
            vec![
                ("https://github.com/x", true),
                ("/projects/y/", false),
                ("https://jane.dev/about", false),
                ("#top", false),
                ("//cdn.example.com/z", true),
            ]
        );
    }

    #[test]
    fn test_without_site_origin_absolute_is_external() {
        assert!(is_external("https://jane.dev/a", None));
        assert!(!is_external("mailto:jane@jane.dev", None));
        assert!(!is_external("/local", None));
        assert!(is_external("http://jane.dev/a", Some("https://jane.dev")));
    }

    #[test]
    fn test_image_alt_text() {
        let nodes = parse("![A *diagram*](/img/d.png \"Arch\")");
        assert_eq!(
            nodes,
            vec![Node::Paragraph(vec![Node::Image(Image {
                src: "/img/d.png".into(),
                alt: "A diagram".into(),
                title: "Arch".into(),
            })])]
        );
    }

    #[test]
    fn test_code_block_language() {
        let nodes = parse("```python\nprint('hi')\n```\n\n```\nplain\n```");
        let blocks: Vec<_> = nodes
            .iter()
            .filter_map(|n| match n {
                Node::CodeBlock(b) => Some(b),
                _ => None,
            })
            .collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].language, "python");
        assert_eq!(blocks[0].code, "print('hi')");
        assert_eq!(blocks[0].lines.len(), 1);
        assert_eq!(blocks[1].language, "text");
        assert_eq!(blocks[1].code, "plain");
    }

    #[test]
    fn test_list_and_table() {
        let nodes = parse("1. one\n2. two\n\n| A | B |\n|:--|--:|\n| x | y |\n");
        match &nodes[0] {
            Node::List { start, items } => {
                assert_eq!(*start, Some(1));
                assert_eq!(items.len(), 2);
            }
            other => panic!("expected list, got {other:?}"),
        }
        match &nodes[1] {
            Node::Table {
                alignments,
                head,
                rows,
            } => {
                assert_eq!(alignments, &vec![Align::Left, Align::Right]);
                assert_eq!(head.len(), 2);
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0][1], vec![Node::Text("y".into())]);
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn test_origin_of() {
        assert_eq!(
            origin_of("HTTPS://Jane.dev/path?q=1").as_deref(),
            Some("https://jane.dev")
        );
        assert_eq!(origin_of("ftp://x").as_deref(), None);
        assert_eq!(origin_of("/relative"), None);
    }
}
