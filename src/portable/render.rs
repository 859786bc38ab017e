//! Rendering of portable bodies to HTML through a caller-supplied rule set

use super::{Block, MarkDef, OtherBlock, Span, TextBlock};
use crate::content::{ImageRef, ImageUrlBuilder};
use crate::helpers::{html_escape, is_safe_href};

/// Bullet or numbered list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bullet,
    Number,
}

/// Every kind of node a rule can be asked to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind<'a> {
    /// `h1`..`h6`
    Heading(u8),
    /// `normal` style
    Paragraph,
    Blockquote,
    /// A run of consecutive list items
    List(ListKind),
    ListItem(ListKind),
    Strong,
    Em,
    Code,
    Underline,
    StrikeThrough,
    /// A decorator mark with no built-in meaning
    Decorator(&'a str),
    Link {
        href: &'a str,
    },
    /// A non-link annotation
    Annotation(&'a str),
    Image {
        src: Option<&'a str>,
        alt: &'a str,
    },
    /// A block type or block style with no built-in meaning
    Unknown(&'a str),
}

/// A node ready to be rendered. `children` is already-rendered inner HTML.
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    pub kind: NodeKind<'a>,
    pub children: &'a str,
}

/// What a rule produced for a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Serialized {
    /// The rule set has no rule for this kind; the default rule is used
    Unhandled,
    Html(String),
    /// The rule could not produce output; the node renders empty
    Failed(String),
}

/// A per-call mapping from node kind to rendering rule.
///
/// Implementations match on [`NodeKind`] and return
/// [`Serialized::Unhandled`] from the catch-all arm.
pub trait Serializers {
    fn serialize(&self, node: &Node<'_>) -> Serialized;
}

/// Rendered body: one HTML fragment per top-level node (list runs count as one)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub blocks: Vec<String>,
}

impl Rendered {
    pub fn html(&self) -> String {
        self.blocks.concat()
    }
}

/// Walks a body and dispatches every node to the supplied rules
pub struct PortableRenderer<'a> {
    images: &'a ImageUrlBuilder,
}

impl<'a> PortableRenderer<'a> {
    pub fn new(images: &'a ImageUrlBuilder) -> Self {
        Self { images }
    }

    /// Render `body` with `rules`. A failing rule blanks only its own node.
    pub fn render<S>(&self, body: &[Block], rules: &S) -> Rendered
    where
        S: Serializers + ?Sized,
    {
        let mut blocks = Vec::with_capacity(body.len());
        let mut iter = body.iter().peekable();

        while let Some(block) = iter.next() {
            let html = match block {
                Block::Text(text) => match list_kind(text) {
                    Some(kind) => {
                        let mut items = self.list_item(text, kind, rules);
                        while let Some(Block::Text(next)) = iter.peek() {
                            if list_kind(next) != Some(kind) {
                                break;
                            }
                            items.push_str(&self.list_item(next, kind, rules));
                            iter.next();
                        }
                        apply(
                            rules,
                            Node {
                                kind: NodeKind::List(kind),
                                children: &items,
                            },
                        )
                    }
                    None => self.text_block(text, rules),
                },
                Block::Image(image) => self.image(image, rules),
                Block::Other(other) => self.other(other, rules),
            };
            blocks.push(html);
        }

        Rendered { blocks }
    }

    fn text_block<S>(&self, block: &TextBlock, rules: &S) -> String
    where
        S: Serializers + ?Sized,
    {
        let children = self.spans(block, rules);
        apply(
            rules,
            Node {
                kind: style_kind(&block.style),
                children: &children,
            },
        )
    }

    fn list_item<S>(&self, block: &TextBlock, kind: ListKind, rules: &S) -> String
    where
        S: Serializers + ?Sized,
    {
        let children = self.spans(block, rules);
        apply(
            rules,
            Node {
                kind: NodeKind::ListItem(kind),
                children: &children,
            },
        )
    }

    fn spans<S>(&self, block: &TextBlock, rules: &S) -> String
    where
        S: Serializers + ?Sized,
    {
        block
            .children
            .iter()
            .map(|span| self.span(span, &block.mark_defs, rules))
            .collect()
    }

    /// Marks are applied in order, so the first mark is the innermost element
    fn span<S>(&self, span: &Span, defs: &[MarkDef], rules: &S) -> String
    where
        S: Serializers + ?Sized,
    {
        let mut html = escape_text(&span.text);
        for mark in &span.marks {
            let kind = match defs.iter().find(|def| &def.key == mark) {
                Some(def) if def.kind == "link" => {
                    let href = def.href.as_deref().unwrap_or_default();
                    if !is_safe_href(href) {
                        tracing::debug!("Dropping link with disallowed href {:?}", href);
                        continue;
                    }
                    NodeKind::Link { href }
                }
                Some(def) => NodeKind::Annotation(&def.kind),
                None => decorator_kind(mark),
            };
            html = apply(
                rules,
                Node {
                    kind,
                    children: &html,
                },
            );
        }
        html
    }

    fn image<S>(&self, image: &ImageRef, rules: &S) -> String
    where
        S: Serializers + ?Sized,
    {
        let src = self.images.url(image);
        apply(
            rules,
            Node {
                kind: NodeKind::Image {
                    src: src.as_deref(),
                    alt: image.alt.as_deref().unwrap_or_default(),
                },
                children: "",
            },
        )
    }

    fn other<S>(&self, other: &OtherBlock, rules: &S) -> String
    where
        S: Serializers + ?Sized,
    {
        let text = escape_text(&other.text());
        apply(
            rules,
            Node {
                kind: NodeKind::Unknown(&other.kind),
                children: &text,
            },
        )
    }
}

fn apply<S>(rules: &S, node: Node<'_>) -> String
where
    S: Serializers + ?Sized,
{
    match rules.serialize(&node) {
        Serialized::Html(html) => html,
        Serialized::Unhandled => default_rule(&node),
        Serialized::Failed(reason) => {
            tracing::warn!("Render rule for {:?} failed: {}", node.kind, reason);
            String::new()
        }
    }
}

/// Built-in rendering used for every kind a rule set leaves unhandled
pub fn default_rule(node: &Node<'_>) -> String {
    let c = node.children;
    match node.kind {
        NodeKind::Heading(level) => format!("<h{0}>{1}</h{0}>", level, c),
        NodeKind::Paragraph | NodeKind::Unknown(_) => format!("<p>{}</p>", c),
        NodeKind::Blockquote => format!("<blockquote>{}</blockquote>", c),
        NodeKind::List(ListKind::Bullet) => format!("<ul>{}</ul>", c),
        NodeKind::List(ListKind::Number) => format!("<ol>{}</ol>", c),
        NodeKind::ListItem(_) => format!("<li>{}</li>", c),
        NodeKind::Strong => format!("<strong>{}</strong>", c),
        NodeKind::Em => format!("<em>{}</em>", c),
        NodeKind::Code => format!("<code>{}</code>", c),
        NodeKind::Underline => format!(r#"<span style="text-decoration: underline">{}</span>"#, c),
        NodeKind::StrikeThrough => format!("<del>{}</del>", c),
        NodeKind::Link { href } => format!(r#"<a href="{}">{}</a>"#, html_escape(href), c),
        NodeKind::Decorator(_) | NodeKind::Annotation(_) => c.to_string(),
        NodeKind::Image { src: Some(src), alt } => {
            format!(r#"<img src="{}" alt="{}"/>"#, html_escape(src), html_escape(alt))
        }
        NodeKind::Image { src: None, .. } => String::new(),
    }
}

fn style_kind(style: &str) -> NodeKind<'_> {
    match style {
        "normal" => NodeKind::Paragraph,
        "blockquote" => NodeKind::Blockquote,
        "h1" => NodeKind::Heading(1),
        "h2" => NodeKind::Heading(2),
        "h3" => NodeKind::Heading(3),
        "h4" => NodeKind::Heading(4),
        "h5" => NodeKind::Heading(5),
        "h6" => NodeKind::Heading(6),
        other => NodeKind::Unknown(other),
    }
}

fn decorator_kind(mark: &str) -> NodeKind<'_> {
    match mark {
        "strong" => NodeKind::Strong,
        "em" => NodeKind::Em,
        "code" => NodeKind::Code,
        "underline" => NodeKind::Underline,
        "strike-through" => NodeKind::StrikeThrough,
        other => NodeKind::Decorator(other),
    }
}

fn list_kind(block: &TextBlock) -> Option<ListKind> {
    match block.list_item.as_deref()? {
        "number" => Some(ListKind::Number),
        _ => Some(ListKind::Bullet),
    }
}

fn escape_text(text: &str) -> String {
    html_escape(text).replace('\n', "<br/>")
}
