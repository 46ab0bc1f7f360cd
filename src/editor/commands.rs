//! Structural edit commands on the document tree
//!
//! Every edit the block editor performs is expressed as an [`EditCommand`]
//! value and applied with [`apply_command`]. A command either succeeds and
//! leaves the tree satisfying its content invariants, or fails and leaves the
//! tree untouched.

use log::debug;

use crate::error::{Error, Result};
use crate::markdown::{
    normalize_marks, AdmonitionType, DocumentNode, Mark, NodeKind, PLACEHOLDER_TEXT,
};

/// Child indices leading from the root to a node. The empty path is the root.
pub type NodePath = Vec<usize>;

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// A single structural edit.
#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    /// Insert `node` as child number `index` of the node at `parent`
    InsertChild {
        parent: NodePath,
        index: usize,
        node: DocumentNode,
    },
    /// Remove the node at `path`
    DeleteNode { path: NodePath },
    /// Change the attributes of the node at `path`
    UpdateAttributes {
        path: NodePath,
        update: AttributeUpdate,
    },
    /// Replace the literal text of a text run or a code block
    ReplaceLeafText { path: NodePath, text: String },
}

/// New attribute values for one node kind. `None` leaves a field unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeUpdate {
    Heading {
        level: u8,
    },
    CodeBlock {
        language: Option<String>,
        title: Option<String>,
    },
    Admonition {
        admonition_type: Option<AdmonitionType>,
        title: Option<String>,
    },
    Image {
        src: Option<String>,
        alt: Option<String>,
        title: Option<String>,
    },
    /// Replace the marks of a text run
    Marks { marks: Vec<Mark> },
}

impl EditCommand {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            EditCommand::InsertChild { .. } => "insert-child",
            EditCommand::DeleteNode { .. } => "delete-node",
            EditCommand::UpdateAttributes { .. } => "update-attributes",
            EditCommand::ReplaceLeafText { .. } => "replace-leaf-text",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Application
// ─────────────────────────────────────────────────────────────────────────────

/// Apply a command to a tree rooted at a document node.
pub fn apply_command(root: &mut DocumentNode, command: &EditCommand) -> Result<()> {
    debug!("Applying {} command", command.name());
    match command {
        EditCommand::InsertChild {
            parent,
            index,
            node,
        } => insert_child(root, parent, *index, node.clone()),
        EditCommand::DeleteNode { path } => delete_node(root, path),
        EditCommand::UpdateAttributes { path, update } => update_attributes(root, path, update),
        EditCommand::ReplaceLeafText { path, text } => replace_leaf_text(root, path, text),
    }
}

fn node_mut<'a>(root: &'a mut DocumentNode, path: &[usize]) -> Result<&'a mut DocumentNode> {
    root.node_at_mut(path).ok_or_else(|| Error::InvalidPath {
        path: path.to_vec(),
    })
}

fn insert_child(
    root: &mut DocumentNode,
    parent_path: &[usize],
    index: usize,
    mut node: DocumentNode,
) -> Result<()> {
    let parent = node_mut(root, parent_path)?;
    if !parent.accepts_child(&node) {
        return Err(Error::InvalidChild {
            parent: parent.kind.name(),
            child: node.kind.name(),
        });
    }
    if let Some((outer, inner)) = node.invalid_nesting() {
        return Err(Error::InvalidChild {
            parent: outer,
            child: inner,
        });
    }
    if index > parent.children.len() {
        let mut path = parent_path.to_vec();
        path.push(index);
        return Err(Error::InvalidPath { path });
    }

    node.repair();
    parent.children.insert(index, node);

    // A placeholder is no longer needed once real content arrives
    if parent.children.len() == 2 {
        let other = if index == 0 { 1 } else { 0 };
        if is_placeholder(&parent.children[other]) {
            parent.children.remove(other);
        }
    }
    Ok(())
}

/// Whether a node is exactly the placeholder synthesized for empty content.
fn is_placeholder(node: &DocumentNode) -> bool {
    *node == DocumentNode::text(PLACEHOLDER_TEXT)
        || *node == DocumentNode::paragraph_text(PLACEHOLDER_TEXT)
}

fn delete_node(root: &mut DocumentNode, path: &[usize]) -> Result<()> {
    let Some((&index, parent_path)) = path.split_last() else {
        return Err(Error::InvalidPath { path: Vec::new() });
    };
    let parent = node_mut(root, parent_path)?;
    if index >= parent.children.len() {
        return Err(Error::InvalidPath {
            path: path.to_vec(),
        });
    }

    let removed = parent.children.remove(index);
    debug!("Deleted {} at {:?}", removed.kind.name(), path);
    parent.ensure_content();
    Ok(())
}

fn update_attributes(
    root: &mut DocumentNode,
    path: &[usize],
    update: &AttributeUpdate,
) -> Result<()> {
    let node = node_mut(root, path)?;
    match (&mut node.kind, update) {
        (NodeKind::Heading { level }, AttributeUpdate::Heading { level: new_level }) => {
            *level = (*new_level).clamp(1, 6);
        }
        (
            NodeKind::CodeBlock { language, title },
            AttributeUpdate::CodeBlock {
                language: new_language,
                title: new_title,
            },
        ) => {
            if let Some(value) = new_language {
                *language = value.trim().to_string();
            }
            if let Some(value) = new_title {
                *title = value.clone();
            }
        }
        (
            NodeKind::Admonition {
                admonition_type,
                title,
            },
            AttributeUpdate::Admonition {
                admonition_type: new_type,
                title: new_title,
            },
        ) => {
            if let Some(value) = new_type {
                *admonition_type = value.clone();
            }
            if let Some(value) = new_title {
                *title = value.clone();
            }
        }
        (
            NodeKind::Image { src, alt, title },
            AttributeUpdate::Image {
                src: new_src,
                alt: new_alt,
                title: new_title,
            },
        ) => {
            if let Some(value) = new_src {
                *src = value.clone();
            }
            if let Some(value) = new_alt {
                *alt = value.clone();
            }
            if let Some(value) = new_title {
                *title = value.clone();
            }
        }
        (NodeKind::Text { marks, .. }, AttributeUpdate::Marks { marks: new_marks }) => {
            let mut new_marks = new_marks.clone();
            normalize_marks(&mut new_marks);
            *marks = new_marks;
        }
        (kind, _) => return Err(Error::AttributeMismatch { kind: kind.name() }),
    }
    Ok(())
}

fn replace_leaf_text(root: &mut DocumentNode, path: &[usize], new_text: &str) -> Result<()> {
    let node = node_mut(root, path)?;
    if let NodeKind::CodeBlock { .. } = node.kind {
        node.children = vec![DocumentNode::text(new_text)];
        return Ok(());
    }
    match &mut node.kind {
        NodeKind::Text { text, .. } => {
            *text = new_text.to_string();
            Ok(())
        }
        kind => Err(Error::NotALeaf { kind: kind.name() }),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{parse_markdown, serialize_document};

    fn sample() -> DocumentNode {
        parse_markdown("# Title\n\nIntro\n\n```js\nlet a;\n```\n\n- one\n- two")
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Insert Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_insert_block_into_document() {
        let mut doc = sample();
        let command = EditCommand::InsertChild {
            parent: vec![],
            index: 1,
            node: DocumentNode::paragraph_text("Inserted"),
        };
        apply_command(&mut doc, &command).unwrap();
        assert_eq!(doc.children[1].text_content(), "Inserted");
        assert_eq!(doc.children.len(), 5);
    }

    #[test]
    fn test_insert_at_end_is_allowed() {
        let mut doc = sample();
        let len = doc.children.len();
        let command = EditCommand::InsertChild {
            parent: vec![],
            index: len,
            node: DocumentNode::horizontal_rule(),
        };
        apply_command(&mut doc, &command).unwrap();
        assert_eq!(doc.children[len].kind, NodeKind::HorizontalRule);
    }

    #[test]
    fn test_insert_repairs_empty_node() {
        let mut doc = sample();
        let command = EditCommand::InsertChild {
            parent: vec![],
            index: 0,
            node: DocumentNode::admonition(AdmonitionType::Tip, "", vec![]),
        };
        apply_command(&mut doc, &command).unwrap();
        assert_eq!(
            doc.children[0].children,
            vec![DocumentNode::paragraph_text(" ")]
        );
    }

    #[test]
    fn test_insert_paragraph_into_list_is_rejected() {
        let mut doc = sample();
        let before = doc.clone();
        let command = EditCommand::InsertChild {
            parent: vec![3],
            index: 0,
            node: DocumentNode::paragraph_text("nope"),
        };
        let err = apply_command(&mut doc, &command).unwrap_err();
        assert!(matches!(err, Error::InvalidChild { .. }));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_insert_subtree_with_misplaced_descendant_is_rejected() {
        let mut doc = sample();
        let before = doc.clone();
        let command = EditCommand::InsertChild {
            parent: vec![],
            index: 0,
            node: DocumentNode::bullet_list(vec![DocumentNode::paragraph_text("x")]),
        };
        let err = apply_command(&mut doc, &command).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidChild {
                parent: "bullet list",
                child: "paragraph"
            }
        ));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_insert_nested_subtree_is_checked_at_depth() {
        let mut doc = sample();
        let command = EditCommand::InsertChild {
            parent: vec![],
            index: 0,
            node: DocumentNode::blockquote(vec![DocumentNode::paragraph(vec![
                DocumentNode::horizontal_rule(),
            ])]),
        };
        assert!(matches!(
            apply_command(&mut doc, &command),
            Err(Error::InvalidChild {
                parent: "paragraph",
                child: "horizontal rule"
            })
        ));
    }

    #[test]
    fn test_insert_out_of_range_is_rejected() {
        let mut doc = sample();
        let command = EditCommand::InsertChild {
            parent: vec![],
            index: 99,
            node: DocumentNode::paragraph_text("x"),
        };
        assert!(matches!(
            apply_command(&mut doc, &command),
            Err(Error::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_insert_replaces_placeholder() {
        let mut doc = parse_markdown("");
        let command = EditCommand::InsertChild {
            parent: vec![],
            index: 1,
            node: DocumentNode::heading(1, vec![DocumentNode::text("Fresh")]),
        };
        apply_command(&mut doc, &command).unwrap();
        assert_eq!(doc.children.len(), 1);
        assert_eq!(serialize_document(&doc), "# Fresh");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Delete Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_delete_block() {
        let mut doc = sample();
        apply_command(&mut doc, &EditCommand::DeleteNode { path: vec![1] }).unwrap();
        assert_eq!(doc.children.len(), 3);
        assert!(matches!(doc.children[1].kind, NodeKind::CodeBlock { .. }));
    }

    #[test]
    fn test_delete_last_child_synthesizes_placeholder() {
        let mut doc = parse_markdown("Only");
        apply_command(&mut doc, &EditCommand::DeleteNode { path: vec![0, 0] }).unwrap();
        assert_eq!(doc.children[0].children, vec![DocumentNode::text(" ")]);

        apply_command(&mut doc, &EditCommand::DeleteNode { path: vec![0] }).unwrap();
        assert_eq!(doc.children, vec![DocumentNode::paragraph_text(" ")]);
    }

    #[test]
    fn test_delete_root_is_rejected() {
        let mut doc = sample();
        assert!(matches!(
            apply_command(&mut doc, &EditCommand::DeleteNode { path: vec![] }),
            Err(Error::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_delete_missing_node_is_rejected() {
        let mut doc = sample();
        assert!(matches!(
            apply_command(&mut doc, &EditCommand::DeleteNode { path: vec![0, 7] }),
            Err(Error::InvalidPath { .. })
        ));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Update Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_update_heading_level_is_clamped() {
        let mut doc = sample();
        let command = EditCommand::UpdateAttributes {
            path: vec![0],
            update: AttributeUpdate::Heading { level: 0 },
        };
        apply_command(&mut doc, &command).unwrap();
        assert_eq!(doc.children[0].kind, NodeKind::Heading { level: 1 });
    }

    #[test]
    fn test_update_code_block_title() {
        let mut doc = sample();
        let command = EditCommand::UpdateAttributes {
            path: vec![2],
            update: AttributeUpdate::CodeBlock {
                language: None,
                title: Some("app.js".into()),
            },
        };
        apply_command(&mut doc, &command).unwrap();
        assert_eq!(
            doc.children[2].kind,
            NodeKind::CodeBlock {
                language: "js".into(),
                title: "app.js".into()
            }
        );
    }

    #[test]
    fn test_update_marks_normalizes_order() {
        let mut doc = sample();
        let command = EditCommand::UpdateAttributes {
            path: vec![1, 0],
            update: AttributeUpdate::Marks {
                marks: vec![Mark::Italic, Mark::Bold],
            },
        };
        apply_command(&mut doc, &command).unwrap();
        assert_eq!(doc.children[1].children[0].marks(), &[Mark::Bold, Mark::Italic]);
    }

    #[test]
    fn test_update_wrong_kind_is_rejected() {
        let mut doc = sample();
        let command = EditCommand::UpdateAttributes {
            path: vec![1],
            update: AttributeUpdate::Heading { level: 2 },
        };
        assert!(matches!(
            apply_command(&mut doc, &command),
            Err(Error::AttributeMismatch { kind: "paragraph" })
        ));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Replace Text Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_replace_code_block_text() {
        let mut doc = sample();
        let command = EditCommand::ReplaceLeafText {
            path: vec![2],
            text: "let b = 2;".into(),
        };
        apply_command(&mut doc, &command).unwrap();
        assert_eq!(doc.children[2].text_content(), "let b = 2;");
        assert_eq!(doc.children[2].children.len(), 1);
    }

    #[test]
    fn test_replace_text_run() {
        let mut doc = sample();
        let command = EditCommand::ReplaceLeafText {
            path: vec![1, 0],
            text: "Changed".into(),
        };
        apply_command(&mut doc, &command).unwrap();
        assert!(serialize_document(&doc).contains("\n\nChanged\n\n"));
    }

    #[test]
    fn test_replace_text_on_container_is_rejected() {
        let mut doc = sample();
        let command = EditCommand::ReplaceLeafText {
            path: vec![3],
            text: "x".into(),
        };
        assert!(matches!(
            apply_command(&mut doc, &command),
            Err(Error::NotALeaf { .. })
        ));
    }
}
