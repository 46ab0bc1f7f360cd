//! Document tree model shared by the parser, the serializer and the editor.
//!
//! A tree is a strict ownership hierarchy: every [`DocumentNode`] owns its
//! children, and the root is always of kind [`NodeKind::Document`].

use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Admonition Types
// ─────────────────────────────────────────────────────────────────────────────

/// Callout flavour of a Docusaurus admonition.
///
/// Unrecognized names are kept verbatim in [`AdmonitionType::Other`] so that
/// a document using a custom admonition survives a round trip untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AdmonitionType {
    #[default]
    Note,
    Tip,
    Info,
    Caution,
    Warning,
    Danger,
    Other(String),
}

impl AdmonitionType {
    /// Map an admonition name to its type. Never fails.
    pub fn from_name(name: &str) -> Self {
        match name {
            "note" => AdmonitionType::Note,
            "tip" => AdmonitionType::Tip,
            "info" => AdmonitionType::Info,
            "caution" => AdmonitionType::Caution,
            "warning" => AdmonitionType::Warning,
            "danger" => AdmonitionType::Danger,
            other => AdmonitionType::Other(other.to_string()),
        }
    }

    /// The name written after the opening `:::`.
    pub fn as_str(&self) -> &str {
        match self {
            AdmonitionType::Note => "note",
            AdmonitionType::Tip => "tip",
            AdmonitionType::Info => "info",
            AdmonitionType::Caution => "caution",
            AdmonitionType::Warning => "warning",
            AdmonitionType::Danger => "danger",
            AdmonitionType::Other(name) => name,
        }
    }

    /// Whether this is one of the types Docusaurus renders natively.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, AdmonitionType::Other(_))
    }
}

impl fmt::Display for AdmonitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inline Marks
// ─────────────────────────────────────────────────────────────────────────────

/// An inline formatting attribute attached to a run of text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mark {
    Bold,
    Italic,
    Code,
    Strike,
    Link { href: String },
    Highlight,
}

impl Mark {
    /// Nesting rank when rendered: lower ranks wrap the text first.
    pub fn rank(&self) -> u8 {
        match self {
            Mark::Bold => 0,
            Mark::Italic => 1,
            Mark::Code => 2,
            Mark::Link { .. } => 3,
            Mark::Highlight => 4,
            Mark::Strike => 5,
        }
    }
}

/// Sort marks into rendering order and drop duplicates.
///
/// Two links with different targets on the same run cannot both be written,
/// so only the first one is kept.
pub fn normalize_marks(marks: &mut Vec<Mark>) {
    marks.sort_by_key(Mark::rank);
    marks.dedup_by(|a, b| a.rank() == b.rank());
}

// ─────────────────────────────────────────────────────────────────────────────
// Node Kinds
// ─────────────────────────────────────────────────────────────────────────────

/// The kind of a document node together with its kind-specific attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Root of every tree
    Document,
    Paragraph,
    /// Heading with level 1-6
    Heading { level: u8 },
    BulletList,
    OrderedList,
    ListItem,
    /// Fenced code; an empty language means plain text
    CodeBlock { language: String, title: String },
    Blockquote,
    /// Docusaurus `:::type title` callout
    Admonition {
        admonition_type: AdmonitionType,
        title: String,
    },
    Image {
        src: String,
        alt: String,
        title: String,
    },
    HorizontalRule,
    /// A run of literal text with its marks. Verbatim runs hold source
    /// markup (inline HTML, unconverted blocks) and are written back unescaped.
    Text {
        text: String,
        marks: Vec<Mark>,
        verbatim: bool,
    },
}

impl NodeKind {
    /// Human-readable name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading { .. } => "heading",
            NodeKind::BulletList => "bullet list",
            NodeKind::OrderedList => "ordered list",
            NodeKind::ListItem => "list item",
            NodeKind::CodeBlock { .. } => "code block",
            NodeKind::Blockquote => "blockquote",
            NodeKind::Admonition { .. } => "admonition",
            NodeKind::Image { .. } => "image",
            NodeKind::HorizontalRule => "horizontal rule",
            NodeKind::Text { .. } => "text",
        }
    }

    /// Leaf kinds never have children.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            NodeKind::Text { .. } | NodeKind::Image { .. } | NodeKind::HorizontalRule
        )
    }

    /// Kinds that may appear as children of a document, list item,
    /// blockquote or admonition.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeKind::Paragraph
                | NodeKind::Heading { .. }
                | NodeKind::BulletList
                | NodeKind::OrderedList
                | NodeKind::CodeBlock { .. }
                | NodeKind::Blockquote
                | NodeKind::Admonition { .. }
                | NodeKind::HorizontalRule
        )
    }

    /// Kinds whose children are inline content (text and images).
    pub fn holds_inline(&self) -> bool {
        matches!(self, NodeKind::Paragraph | NodeKind::Heading { .. })
    }

    /// Kinds that must never be left without children.
    pub fn requires_content(&self) -> bool {
        matches!(
            self,
            NodeKind::Document
                | NodeKind::Paragraph
                | NodeKind::Heading { .. }
                | NodeKind::ListItem
                | NodeKind::Blockquote
                | NodeKind::Admonition { .. }
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Document Node
// ─────────────────────────────────────────────────────────────────────────────

/// Text used when a container would otherwise be empty.
pub const PLACEHOLDER_TEXT: &str = " ";

/// A node of the editable document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentNode {
    /// The kind of this node and its attributes
    pub kind: NodeKind,
    /// Child nodes; always empty for leaf kinds
    pub children: Vec<DocumentNode>,
}

impl DocumentNode {
    /// Create a node from its kind and children.
    pub fn new(kind: NodeKind, children: Vec<DocumentNode>) -> Self {
        Self { kind, children }
    }

    pub fn document(children: Vec<DocumentNode>) -> Self {
        Self::new(NodeKind::Document, children)
    }

    pub fn paragraph(children: Vec<DocumentNode>) -> Self {
        Self::new(NodeKind::Paragraph, children)
    }

    /// A paragraph holding a single unmarked text run.
    pub fn paragraph_text(text: impl Into<String>) -> Self {
        Self::paragraph(vec![Self::text(text)])
    }

    pub fn heading(level: u8, children: Vec<DocumentNode>) -> Self {
        Self::new(
            NodeKind::Heading {
                level: level.clamp(1, 6),
            },
            children,
        )
    }

    pub fn bullet_list(items: Vec<DocumentNode>) -> Self {
        Self::new(NodeKind::BulletList, items)
    }

    pub fn ordered_list(items: Vec<DocumentNode>) -> Self {
        Self::new(NodeKind::OrderedList, items)
    }

    pub fn list_item(children: Vec<DocumentNode>) -> Self {
        Self::new(NodeKind::ListItem, children)
    }

    /// A code block; its only child is the text run holding the code.
    pub fn code_block(
        language: impl Into<String>,
        title: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self::new(
            NodeKind::CodeBlock {
                language: language.into(),
                title: title.into(),
            },
            vec![Self::text(code)],
        )
    }

    pub fn blockquote(children: Vec<DocumentNode>) -> Self {
        Self::new(NodeKind::Blockquote, children)
    }

    pub fn admonition(
        admonition_type: AdmonitionType,
        title: impl Into<String>,
        children: Vec<DocumentNode>,
    ) -> Self {
        Self::new(
            NodeKind::Admonition {
                admonition_type,
                title: title.into(),
            },
            children,
        )
    }

    pub fn image(src: impl Into<String>, alt: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(
            NodeKind::Image {
                src: src.into(),
                alt: alt.into(),
                title: title.into(),
            },
            Vec::new(),
        )
    }

    pub fn horizontal_rule() -> Self {
        Self::new(NodeKind::HorizontalRule, Vec::new())
    }

    /// An unmarked text run.
    pub fn text(text: impl Into<String>) -> Self {
        Self::marked_text(text, Vec::new())
    }

    /// A text run carrying the given marks (normalized into rendering order).
    pub fn marked_text(text: impl Into<String>, mut marks: Vec<Mark>) -> Self {
        normalize_marks(&mut marks);
        Self::new(
            NodeKind::Text {
                text: text.into(),
                marks,
                verbatim: false,
            },
            Vec::new(),
        )
    }

    /// A text run of source markup, serialized exactly as given.
    pub fn verbatim_text(text: impl Into<String>) -> Self {
        Self::new(
            NodeKind::Text {
                text: text.into(),
                marks: Vec::new(),
                verbatim: true,
            },
            Vec::new(),
        )
    }

    /// A paragraph holding a single verbatim run.
    pub fn verbatim_paragraph(text: impl Into<String>) -> Self {
        Self::paragraph(vec![Self::verbatim_text(text)])
    }

    /// The child synthesized when a container of this kind is empty.
    ///
    /// Inline containers get a single-space text run; block containers get a
    /// paragraph holding one.
    pub fn placeholder_for(kind: &NodeKind) -> Self {
        if kind.holds_inline() {
            Self::text(PLACEHOLDER_TEXT)
        } else {
            Self::paragraph_text(PLACEHOLDER_TEXT)
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether this node is a text run.
    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text { .. })
    }

    /// Whether this node is a text run of source markup.
    pub fn is_verbatim(&self) -> bool {
        matches!(self.kind, NodeKind::Text { verbatim: true, .. })
    }

    /// Literal text of a text run, or `None` for any other kind.
    pub fn literal(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Marks of a text run; empty for any other kind.
    pub fn marks(&self) -> &[Mark] {
        match &self.kind {
            NodeKind::Text { marks, .. } => marks,
            _ => &[],
        }
    }

    /// Get all text content from this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, output: &mut String) {
        if let NodeKind::Text { text, .. } = &self.kind {
            output.push_str(text);
        }
        for child in &self.children {
            child.collect_text(output);
        }
    }

    /// Whether `child` may be placed directly under this node.
    pub fn accepts_child(&self, child: &DocumentNode) -> bool {
        match &self.kind {
            NodeKind::Document
            | NodeKind::ListItem
            | NodeKind::Blockquote
            | NodeKind::Admonition { .. } => child.kind.is_block(),
            NodeKind::Paragraph | NodeKind::Heading { .. } => {
                matches!(child.kind, NodeKind::Text { .. } | NodeKind::Image { .. })
            }
            NodeKind::BulletList | NodeKind::OrderedList => {
                matches!(child.kind, NodeKind::ListItem)
            }
            // A code block holds exactly one text run, managed through its text
            NodeKind::CodeBlock { .. } => false,
            NodeKind::Text { .. } | NodeKind::Image { .. } | NodeKind::HorizontalRule => false,
        }
    }

    /// First parent/child pair in this subtree that breaks the nesting rules,
    /// as `(parent, child)` kind names.
    ///
    /// Code block children are not checked; [`ensure_content`] folds them
    /// into a single text run.
    ///
    /// [`ensure_content`]: DocumentNode::ensure_content
    pub fn invalid_nesting(&self) -> Option<(&'static str, &'static str)> {
        if matches!(self.kind, NodeKind::CodeBlock { .. }) {
            return None;
        }
        for child in &self.children {
            if !self.accepts_child(child) {
                return Some((self.kind.name(), child.kind.name()));
            }
            if let Some(pair) = child.invalid_nesting() {
                return Some(pair);
            }
        }
        None
    }

    /// Node addressed by a path of child indices, starting at this node.
    pub fn node_at(&self, path: &[usize]) -> Option<&DocumentNode> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    /// Mutable access to the node addressed by a path of child indices.
    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut DocumentNode> {
        path.iter()
            .try_fold(self, |node, &index| node.children.get_mut(index))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Invariant Repair
    // ─────────────────────────────────────────────────────────────────────────

    /// Restore the content invariants on this node only.
    ///
    /// - leaf kinds lose any children
    /// - a code block ends up with exactly one text run
    /// - containers that require content get a placeholder child
    pub fn ensure_content(&mut self) {
        if self.kind.is_leaf() {
            self.children.clear();
            return;
        }
        if matches!(self.kind, NodeKind::CodeBlock { .. }) {
            let single_text = self.children.len() == 1
                && self.children[0].is_text()
                && self.children[0].marks().is_empty()
                && !self.children[0].is_verbatim();
            if !single_text {
                let code = self.text_content();
                self.children = vec![Self::text(code)];
            }
            return;
        }
        if self.kind.requires_content() && self.children.is_empty() {
            self.children.push(Self::placeholder_for(&self.kind));
        }
    }

    /// Restore the content invariants on this node and all descendants.
    pub fn repair(&mut self) {
        for child in &mut self.children {
            child.repair();
        }
        self.ensure_content();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admonition_type_round_trips_names() {
        for name in ["note", "tip", "info", "caution", "warning", "danger"] {
            let ty = AdmonitionType::from_name(name);
            assert!(ty.is_recognized());
            assert_eq!(ty.as_str(), name);
        }
    }

    #[test]
    fn test_unknown_admonition_type_is_preserved() {
        let ty = AdmonitionType::from_name("experimental");
        assert!(!ty.is_recognized());
        assert_eq!(ty.to_string(), "experimental");
    }

    #[test]
    fn test_marks_are_normalized() {
        let node = DocumentNode::marked_text(
            "x",
            vec![Mark::Strike, Mark::Bold, Mark::Italic, Mark::Bold],
        );
        assert_eq!(node.marks(), &[Mark::Bold, Mark::Italic, Mark::Strike]);
    }

    #[test]
    fn test_heading_level_is_clamped() {
        let node = DocumentNode::heading(9, vec![DocumentNode::text("Deep")]);
        assert_eq!(node.kind, NodeKind::Heading { level: 6 });
    }

    #[test]
    fn test_text_content_collects_descendants() {
        let node = DocumentNode::paragraph(vec![
            DocumentNode::text("Hello "),
            DocumentNode::marked_text("world", vec![Mark::Bold]),
        ]);
        assert_eq!(node.text_content(), "Hello world");
    }

    #[test]
    fn test_accepts_child() {
        let list = DocumentNode::bullet_list(vec![]);
        assert!(list.accepts_child(&DocumentNode::list_item(vec![])));
        assert!(!list.accepts_child(&DocumentNode::paragraph_text("x")));

        let para = DocumentNode::paragraph(vec![]);
        assert!(para.accepts_child(&DocumentNode::text("x")));
        assert!(para.accepts_child(&DocumentNode::image("a.png", "", "")));
        assert!(!para.accepts_child(&DocumentNode::paragraph_text("x")));

        let doc = DocumentNode::document(vec![]);
        assert!(!doc.accepts_child(&DocumentNode::text("x")));
        assert!(doc.accepts_child(&DocumentNode::horizontal_rule()));

        let code = DocumentNode::code_block("rust", "", "fn main() {}");
        assert!(!code.accepts_child(&DocumentNode::text("x")));
    }

    #[test]
    fn test_invalid_nesting_checks_every_level() {
        let valid = DocumentNode::bullet_list(vec![DocumentNode::list_item(vec![
            DocumentNode::paragraph_text("ok"),
            DocumentNode::code_block("rust", "", "let x = 1;"),
        ])]);
        assert_eq!(valid.invalid_nesting(), None);

        let flat = DocumentNode::bullet_list(vec![DocumentNode::paragraph_text("x")]);
        assert_eq!(flat.invalid_nesting(), Some(("bullet list", "paragraph")));

        let deep = DocumentNode::admonition(
            AdmonitionType::Note,
            "",
            vec![DocumentNode::ordered_list(vec![DocumentNode::list_item(vec![
                DocumentNode::text("bare"),
            ])])],
        );
        assert_eq!(deep.invalid_nesting(), Some(("list item", "text")));
    }

    #[test]
    fn test_verbatim_text_is_distinct_from_plain_text() {
        let raw = DocumentNode::verbatim_text("<br/>");
        assert!(raw.is_verbatim());
        assert_eq!(raw.literal(), Some("<br/>"));
        assert_ne!(raw, DocumentNode::text("<br/>"));
    }

    #[test]
    fn test_node_at_follows_path() {
        let doc = DocumentNode::document(vec![
            DocumentNode::paragraph_text("first"),
            DocumentNode::bullet_list(vec![DocumentNode::list_item(vec![
                DocumentNode::paragraph_text("item"),
            ])]),
        ]);
        let item_text = doc.node_at(&[1, 0, 0, 0]).unwrap();
        assert_eq!(item_text.literal(), Some("item"));
        assert!(doc.node_at(&[5]).is_none());
        assert_eq!(doc.node_at(&[]).unwrap().kind, NodeKind::Document);
    }

    #[test]
    fn test_ensure_content_synthesizes_placeholders() {
        let mut para = DocumentNode::paragraph(vec![]);
        para.ensure_content();
        assert_eq!(para.children, vec![DocumentNode::text(" ")]);

        let mut item = DocumentNode::list_item(vec![]);
        item.ensure_content();
        assert_eq!(item.children, vec![DocumentNode::paragraph_text(" ")]);

        // Lists may be empty
        let mut list = DocumentNode::ordered_list(vec![]);
        list.ensure_content();
        assert!(list.children.is_empty());
    }

    #[test]
    fn test_code_block_always_has_one_text_child() {
        let mut code = DocumentNode::new(
            NodeKind::CodeBlock {
                language: String::new(),
                title: String::new(),
            },
            vec![],
        );
        code.ensure_content();
        assert_eq!(code.children, vec![DocumentNode::text("")]);

        let mut split = DocumentNode::new(
            NodeKind::CodeBlock {
                language: "js".into(),
                title: String::new(),
            },
            vec![DocumentNode::text("a"), DocumentNode::text("b")],
        );
        split.ensure_content();
        assert_eq!(split.children, vec![DocumentNode::text("ab")]);
    }

    #[test]
    fn test_repair_is_recursive() {
        let mut doc = DocumentNode::document(vec![DocumentNode::admonition(
            AdmonitionType::Tip,
            "",
            vec![DocumentNode::paragraph(vec![])],
        )]);
        doc.repair();
        let text = doc.node_at(&[0, 0, 0]).unwrap();
        assert_eq!(text.literal(), Some(" "));
    }
}
