//! Markdown to document tree conversion using comrak
//!
//! comrak produces a CommonMark + GFM syntax tree; this module walks it and
//! builds the editable [`DocumentNode`] tree in two passes:
//!
//! 0. Nested list lines are moved onto their parent's content column so the
//!    two-space nesting the serializer writes is read back as nesting.
//! 1. Top-level paragraphs are split around admonition fence lines and the
//!    resulting block sequence is grouped into admonitions
//!    (see [`crate::markdown::admonitions`]).
//! 2. Every block and inline node is mapped onto its tree variant. Inline
//!    formatting collapses into text runs carrying marks.
//!
//! Parsing never fails. Constructs without a tree variant degrade to a
//! paragraph holding their raw source text.

use comrak::{
    nodes::{AstNode, ListType, NodeValue, Sourcepos},
    parse_document, Arena, Options,
};
use log::{debug, warn};
use regex::Regex;
use std::sync::OnceLock;

use crate::markdown::admonitions::{group_admonitions, match_fence_line, Grouped, Piece};
use crate::markdown::lists::normalize_list_indentation;
use crate::markdown::tree::{normalize_marks, AdmonitionType, DocumentNode, Mark, NodeKind};

// ─────────────────────────────────────────────────────────────────────────────
// Options
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration options for markdown parsing.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Enable strikethrough syntax (~~text~~)
    pub strikethrough: bool,
    /// Recognize GFM tables (kept as raw text in the tree)
    pub tables: bool,
    /// Recognize footnotes (kept as raw text in the tree)
    pub footnotes: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            strikethrough: true,
            tables: true,
            footnotes: true,
        }
    }
}

impl MarkdownOptions {
    /// Convert to comrak Options.
    ///
    /// Autolinks and task lists stay off: both would rewrite literal text
    /// that the tree has no way to represent.
    fn to_comrak_options(&self) -> Options {
        let mut options = Options::default();
        options.extension.strikethrough = self.strikethrough;
        options.extension.table = self.tables;
        options.extension.footnotes = self.footnotes;
        options.extension.autolink = false;
        options.extension.tasklist = false;
        options
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Parse markdown text into a document tree.
///
/// # Example
/// ```
/// use docsmith::markdown::{parse_markdown, NodeKind};
///
/// let doc = parse_markdown(":::tip My Tip\nSome **advice**\n:::");
/// assert!(matches!(doc.children[0].kind, NodeKind::Admonition { .. }));
/// ```
pub fn parse_markdown(markdown: &str) -> DocumentNode {
    parse_markdown_with_options(markdown, &MarkdownOptions::default())
}

/// Parse markdown text with custom options.
pub fn parse_markdown_with_options(markdown: &str, options: &MarkdownOptions) -> DocumentNode {
    let source = normalize_list_indentation(markdown);
    let arena = Arena::new();
    let root = parse_document(&arena, &source, &options.to_comrak_options());

    let converter = Converter {
        source_lines: source.lines().collect(),
    };
    let document = converter.convert_document(root);
    debug!(
        "Parsed {} bytes into {} top-level blocks",
        markdown.len(),
        document.children.len()
    );
    document
}

// ─────────────────────────────────────────────────────────────────────────────
// Pass A: Fence Line Extraction
// ─────────────────────────────────────────────────────────────────────────────

/// A top-level block as seen by the admonition pass.
enum Block<'a> {
    /// A block node straight from comrak
    Node(&'a AstNode<'a>),
    /// The lines of a paragraph left over after fence lines were split out
    Inlines(Vec<&'a AstNode<'a>>),
}

fn is_line_break(node: &AstNode<'_>) -> bool {
    matches!(
        node.data.borrow().value,
        NodeValue::SoftBreak | NodeValue::LineBreak
    )
}

/// The text of a paragraph line made only of plain text nodes.
fn plain_line_text(line: &[&AstNode<'_>]) -> Option<String> {
    if line.is_empty() {
        return None;
    }
    let mut text = String::new();
    for node in line {
        match &node.data.borrow().value {
            NodeValue::Text(literal) => text.push_str(literal),
            _ => return None,
        }
    }
    Some(text)
}

/// Split a paragraph around its fence lines.
///
/// Returns `None` when the paragraph holds no fence line, so it can be kept
/// as a single block. A fence must be written as `:::` in the source, so an
/// escaped `\:::` stays text.
fn split_fence_lines<'a>(
    paragraph: &'a AstNode<'a>,
    source_lines: &[&str],
) -> Option<Vec<Piece<Block<'a>>>> {
    let first_line = paragraph.data.borrow().sourcepos.start.line;
    let mut lines: Vec<Vec<&'a AstNode<'a>>> = vec![Vec::new()];
    let mut breaks: Vec<&'a AstNode<'a>> = Vec::new();
    for child in paragraph.children() {
        if is_line_break(child) {
            breaks.push(child);
            lines.push(Vec::new());
        } else if let Some(line) = lines.last_mut() {
            line.push(child);
        }
    }

    let fences: Vec<_> = lines
        .iter()
        .enumerate()
        .map(|(offset, line)| {
            let written_as_fence = (first_line + offset)
                .checked_sub(1)
                .and_then(|index| source_lines.get(index))
                .map_or(true, |source| source.trim_start().starts_with(":::"));
            if !written_as_fence {
                return None;
            }
            plain_line_text(line).and_then(|text| {
                let trimmed = text.trim_end().to_string();
                match_fence_line(&trimmed).map(|fence| (fence, trimmed))
            })
        })
        .collect();
    if fences.iter().all(Option::is_none) {
        return None;
    }

    let mut pieces = Vec::new();
    let mut run: Vec<&'a AstNode<'a>> = Vec::new();
    for (index, (line, fence)) in lines.into_iter().zip(fences).enumerate() {
        match fence {
            Some((fence, text)) => {
                if !run.is_empty() {
                    pieces.push(Piece::Block(Block::Inlines(std::mem::take(&mut run))));
                }
                pieces.push(Piece::Fence { fence, line: text });
            }
            None => {
                if !run.is_empty() {
                    run.push(breaks[index - 1]);
                }
                run.extend(line);
            }
        }
    }
    if !run.is_empty() {
        pieces.push(Piece::Block(Block::Inlines(run)));
    }
    Some(pieces)
}

// ─────────────────────────────────────────────────────────────────────────────
// Pass B: Tree Conversion
// ─────────────────────────────────────────────────────────────────────────────

fn code_title_regex() -> &'static Regex {
    static TITLE: OnceLock<Regex> = OnceLock::new();
    TITLE.get_or_init(|| Regex::new(r#"\s*title="([^"]+)""#).expect("code title pattern is valid"))
}

/// Split a fence info string into its language and Docusaurus `title="..."`.
///
/// An empty `title=""` is not a title and stays in the language text.
pub fn split_code_info(info: &str) -> (String, String) {
    let re = code_title_regex();
    match re.captures(info) {
        Some(caps) => {
            let title = caps[1].to_string();
            let language = re.replacen(info, 1, "").trim().to_string();
            (language, title)
        }
        None => (info.trim().to_string(), String::new()),
    }
}

/// Append an inline node, merging it into the previous text run when both
/// carry the same marks.
fn push_inline(out: &mut Vec<DocumentNode>, node: DocumentNode) {
    if let Some(text) = node.literal() {
        if let Some(DocumentNode {
            kind:
                NodeKind::Text {
                    text: previous,
                    marks,
                    verbatim,
                },
            ..
        }) = out.last_mut()
        {
            if marks.as_slice() == node.marks() && *verbatim == node.is_verbatim() {
                previous.push_str(text);
                return;
            }
        }
    }
    out.push(node);
}

struct Converter<'s> {
    source_lines: Vec<&'s str>,
}

impl<'s> Converter<'s> {
    fn convert_document<'a>(&self, root: &'a AstNode<'a>) -> DocumentNode {
        let mut pieces = Vec::new();
        for child in root.children() {
            let is_paragraph = matches!(child.data.borrow().value, NodeValue::Paragraph);
            if is_paragraph {
                if let Some(split) = split_fence_lines(child, &self.source_lines) {
                    pieces.extend(split);
                    continue;
                }
            }
            pieces.push(Piece::Block(Block::Node(child)));
        }

        let children = group_admonitions(pieces)
            .into_iter()
            .map(|grouped| self.convert_grouped(grouped))
            .collect();
        let mut document = DocumentNode::document(children);
        document.ensure_content();
        document
    }

    fn convert_grouped<'a>(&self, grouped: Grouped<Block<'a>>) -> DocumentNode {
        let mut node = match grouped {
            Grouped::Block(Block::Node(node)) => return self.convert_block(node),
            Grouped::Block(Block::Inlines(nodes)) => {
                DocumentNode::paragraph(self.convert_inlines(nodes))
            }
            Grouped::Literal(line) => DocumentNode::paragraph_text(line),
            Grouped::Admonition {
                name,
                title,
                children,
            } => {
                let admonition_type = AdmonitionType::from_name(&name);
                if !admonition_type.is_recognized() {
                    warn!("Unknown admonition type '{}' kept verbatim", name);
                }
                let children = children
                    .into_iter()
                    .map(|child| self.convert_grouped(child))
                    .collect();
                DocumentNode::admonition(admonition_type, title, children)
            }
        };
        node.ensure_content();
        node
    }

    fn convert_blocks<'a>(&self, node: &'a AstNode<'a>) -> Vec<DocumentNode> {
        node.children()
            .map(|child| self.convert_block(child))
            .collect()
    }

    fn convert_block<'a>(&self, node: &'a AstNode<'a>) -> DocumentNode {
        let ast = node.data.borrow();
        let mut converted = match &ast.value {
            NodeValue::Paragraph => DocumentNode::paragraph(self.convert_inlines(node.children())),
            NodeValue::Heading(heading) => {
                DocumentNode::heading(heading.level, self.convert_inlines(node.children()))
            }
            NodeValue::List(list) => {
                let items = self.convert_blocks(node);
                match list.list_type {
                    ListType::Bullet => DocumentNode::bullet_list(items),
                    ListType::Ordered => DocumentNode::ordered_list(items),
                }
            }
            NodeValue::Item(_) => DocumentNode::list_item(self.convert_blocks(node)),
            NodeValue::CodeBlock(code) => {
                let (language, title) = split_code_info(&code.info);
                let literal = code.literal.strip_suffix('\n').unwrap_or(&code.literal);
                DocumentNode::code_block(language, title, literal)
            }
            NodeValue::BlockQuote => DocumentNode::blockquote(self.convert_blocks(node)),
            NodeValue::HtmlBlock(html) => {
                DocumentNode::verbatim_paragraph(html.literal.trim_end_matches('\n'))
            }
            NodeValue::ThematicBreak => DocumentNode::horizontal_rule(),
            other => {
                debug!("No tree variant for {:?}, keeping raw source", other);
                DocumentNode::verbatim_paragraph(self.raw_source(ast.sourcepos))
            }
        };
        converted.ensure_content();
        converted
    }

    /// Source text covered by a node, with the node's own indentation removed.
    fn raw_source(&self, pos: Sourcepos) -> String {
        let start = pos.start.line.max(1);
        let end = pos.end.line.max(start).min(self.source_lines.len());
        let indent = pos.start.column.saturating_sub(1);
        let Some(lines) = self.source_lines.get(start - 1..end) else {
            return String::new();
        };

        lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                if index == 0 {
                    line.get(indent..).unwrap_or(line)
                } else {
                    let leading = line.len() - line.trim_start_matches(' ').len();
                    &line[leading.min(indent)..]
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn convert_inlines<'a>(
        &self,
        nodes: impl IntoIterator<Item = &'a AstNode<'a>>,
    ) -> Vec<DocumentNode> {
        let mut out = Vec::new();
        for node in nodes {
            self.convert_inline(node, &mut out);
        }
        out
    }

    fn convert_inline<'a>(&self, node: &'a AstNode<'a>, out: &mut Vec<DocumentNode>) {
        let ast = node.data.borrow();
        let converted = match &ast.value {
            NodeValue::Text(text) => DocumentNode::text(text.as_str()),
            NodeValue::SoftBreak => DocumentNode::text("\n"),
            NodeValue::LineBreak => DocumentNode::text("\\\n"),
            NodeValue::Code(code) => {
                DocumentNode::marked_text(code.literal.as_str(), vec![Mark::Code])
            }
            NodeValue::HtmlInline(html) => DocumentNode::verbatim_text(html.as_str()),
            NodeValue::Emph => return self.convert_marked(node, Mark::Italic, out),
            NodeValue::Strong => return self.convert_marked(node, Mark::Bold, out),
            NodeValue::Strikethrough => return self.convert_marked(node, Mark::Strike, out),
            NodeValue::Link(link) => {
                let mark = Mark::Link {
                    href: link.url.clone(),
                };
                return self.convert_marked(node, mark, out);
            }
            NodeValue::Image(link) => {
                let alt: String = self
                    .convert_inlines(node.children())
                    .iter()
                    .map(DocumentNode::text_content)
                    .collect();
                DocumentNode::image(link.url.as_str(), alt, link.title.as_str())
            }
            NodeValue::FootnoteReference(reference) => {
                DocumentNode::verbatim_text(format!("[^{}]", reference.name))
            }
            _ => {
                let inner: String = self
                    .convert_inlines(node.children())
                    .iter()
                    .map(DocumentNode::text_content)
                    .collect();
                DocumentNode::text(inner)
            }
        };
        push_inline(out, converted);
    }

    /// Convert a formatting span.
    ///
    /// Plain text spans collapse into one run carrying the span's own mark
    /// plus every mark shared by all of its runs, so fully nested formatting
    /// such as `***x***` survives while partially overlapping spans keep only
    /// the outer mark. Spans holding images or source markup cannot collapse;
    /// their children are emitted separately with the span's mark added to
    /// each plain run, and images inside a link are wrapped in link markup.
    fn convert_marked<'a>(&self, node: &'a AstNode<'a>, mark: Mark, out: &mut Vec<DocumentNode>) {
        let inner = self.convert_inlines(node.children());

        if inner.iter().any(|child| !child.is_text() || child.is_verbatim()) {
            for mut child in inner {
                if let Mark::Link { href } = &mark {
                    // A linked image keeps its link as source markup
                    if matches!(child.kind, NodeKind::Image { .. }) {
                        push_inline(out, DocumentNode::verbatim_text("["));
                        push_inline(out, child);
                        push_inline(out, DocumentNode::verbatim_text(format!("]({})", href)));
                        continue;
                    }
                }
                if let NodeKind::Text {
                    marks,
                    verbatim: false,
                    ..
                } = &mut child.kind
                {
                    marks.push(mark.clone());
                    normalize_marks(marks);
                }
                push_inline(out, child);
            }
            return;
        }

        let text: String = inner.iter().filter_map(DocumentNode::literal).collect();
        let mut marks = vec![mark];
        if let Some(first) = inner.first() {
            for shared in first.marks() {
                if inner.iter().all(|run| run.marks().contains(shared)) {
                    marks.push(shared.clone());
                }
            }
        }
        push_inline(out, DocumentNode::marked_text(text, marks));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
