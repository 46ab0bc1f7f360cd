//! Block templates offered by the slash-command menu.

use crate::markdown::{AdmonitionType, DocumentNode};

/// A block the user can insert from the command menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTemplate {
    Heading1,
    Heading2,
    Heading3,
    BulletList,
    NumberedList,
    CodeBlock,
    Blockquote,
    Tip,
    Note,
    Warning,
    Danger,
}

impl BlockTemplate {
    /// All templates in menu order.
    pub fn all() -> &'static [BlockTemplate] {
        &[
            Self::Heading1,
            Self::Heading2,
            Self::Heading3,
            Self::BulletList,
            Self::NumberedList,
            Self::CodeBlock,
            Self::Blockquote,
            Self::Tip,
            Self::Note,
            Self::Warning,
            Self::Danger,
        ]
    }

    /// Menu label.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Heading1 => "Heading 1",
            Self::Heading2 => "Heading 2",
            Self::Heading3 => "Heading 3",
            Self::BulletList => "Bulleted List",
            Self::NumberedList => "Numbered List",
            Self::CodeBlock => "Code Block",
            Self::Blockquote => "Blockquote",
            Self::Tip => "Tip Admonition",
            Self::Note => "Note Admonition",
            Self::Warning => "Warning Admonition",
            Self::Danger => "Danger Admonition",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Heading1 => "Big section heading",
            Self::Heading2 => "Medium section heading",
            Self::Heading3 => "Small section heading",
            Self::BulletList => "Create a simple bulleted list",
            Self::NumberedList => "Create a numbered list",
            Self::CodeBlock => "Add code with syntax highlighting",
            Self::Blockquote => "Add a quote",
            Self::Tip => "Add a tip admonition box",
            Self::Note => "Add a note admonition box",
            Self::Warning => "Add a warning admonition box",
            Self::Danger => "Add a danger admonition box",
        }
    }

    /// Templates whose title contains `query`, ignoring case.
    pub fn filter(query: &str) -> Vec<BlockTemplate> {
        let query = query.to_lowercase();
        Self::all()
            .iter()
            .copied()
            .filter(|template| template.title().to_lowercase().contains(&query))
            .collect()
    }

    /// Build a fresh block for this template.
    pub fn build(&self) -> DocumentNode {
        let mut node = match self {
            Self::Heading1 => DocumentNode::heading(1, Vec::new()),
            Self::Heading2 => DocumentNode::heading(2, Vec::new()),
            Self::Heading3 => DocumentNode::heading(3, Vec::new()),
            Self::BulletList => {
                DocumentNode::bullet_list(vec![DocumentNode::list_item(Vec::new())])
            }
            Self::NumberedList => {
                DocumentNode::ordered_list(vec![DocumentNode::list_item(Vec::new())])
            }
            Self::CodeBlock => DocumentNode::code_block("", "", ""),
            Self::Blockquote => DocumentNode::blockquote(Vec::new()),
            Self::Tip => return Self::admonition(&AdmonitionType::Tip),
            Self::Note => return Self::admonition(&AdmonitionType::Note),
            Self::Warning => return Self::admonition(&AdmonitionType::Warning),
            Self::Danger => return Self::admonition(&AdmonitionType::Danger),
        };
        node.repair();
        node
    }

    /// An empty admonition titled after its type ("Tip", "Note", ...).
    pub fn admonition(admonition_type: &AdmonitionType) -> DocumentNode {
        let name = admonition_type.as_str();
        let mut chars = name.chars();
        let title = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        let mut node = DocumentNode::admonition(admonition_type.clone(), title, Vec::new());
        node.repair();
        node
    }
}
