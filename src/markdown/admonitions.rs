//! Docusaurus admonition recognition.
//!
//! Admonitions are not part of CommonMark, so the block parser hands them
//! over as ordinary paragraphs: `:::tip Title` opens a callout and a bare
//! `:::` closes it. This pass runs over the flat sequence of top-level
//! blocks, after the parser has split fence lines out of their paragraphs,
//! and groups everything between an opening and a closing fence.
//!
//! An opening fence without a closing one is not an admonition. Its line is
//! handed back as plain text so no content is lost.

use log::{debug, warn};
use regex::Regex;
use std::sync::OnceLock;

// ─────────────────────────────────────────────────────────────────────────────
// Fence Lines
// ─────────────────────────────────────────────────────────────────────────────

/// A line that is entirely an admonition fence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenceLine {
    /// `:::<type>[ <title>]`
    Open { name: String, title: String },
    /// A bare `:::`
    Close,
}

fn opening_regex() -> &'static Regex {
    static OPENING: OnceLock<Regex> = OnceLock::new();
    OPENING.get_or_init(|| {
        Regex::new(r"^:::(\w+)(?:\s+(.+?))?\s*$").expect("admonition opening pattern is valid")
    })
}

fn closing_regex() -> &'static Regex {
    static CLOSING: OnceLock<Regex> = OnceLock::new();
    CLOSING.get_or_init(|| Regex::new(r"^:::\s*$").expect("admonition closing pattern is valid"))
}

/// Classify a single line of paragraph text as a fence, if it is one.
pub fn match_fence_line(line: &str) -> Option<FenceLine> {
    if closing_regex().is_match(line) {
        return Some(FenceLine::Close);
    }
    opening_regex().captures(line).map(|caps| FenceLine::Open {
        name: caps[1].to_string(),
        title: caps
            .get(2)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Grouping
// ─────────────────────────────────────────────────────────────────────────────

/// One entry of the flat top-level block sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Piece<B> {
    /// Any block that is not a fence
    Block(B),
    /// A paragraph line that is a fence, with its original text
    Fence { fence: FenceLine, line: String },
}

/// The block sequence after admonitions have been grouped.
#[derive(Debug, Clone, PartialEq)]
pub enum Grouped<B> {
    Block(B),
    /// A fence line that did not take part in an admonition; kept as text
    Literal(String),
    Admonition {
        name: String,
        title: String,
        children: Vec<Grouped<B>>,
    },
}

/// Group the pieces between each opening fence and the next closing fence.
///
/// Admonitions do not nest: the first bare `:::` after an opening fence
/// closes it, and any opening fence in between is kept as literal text.
pub fn group_admonitions<B>(pieces: Vec<Piece<B>>) -> Vec<Grouped<B>> {
    let mut result = Vec::with_capacity(pieces.len());
    let mut iter = pieces.into_iter().peekable();

    while let Some(piece) = iter.next() {
        match piece {
            Piece::Block(block) => result.push(Grouped::Block(block)),
            Piece::Fence {
                fence: FenceLine::Close,
                line,
            } => {
                debug!("Stray admonition closing fence kept as text");
                result.push(Grouped::Literal(line));
            }
            Piece::Fence {
                fence: FenceLine::Open { name, title },
                line,
            } => {
                let mut body = Vec::new();
                let mut closed = false;
                for inner in iter.by_ref() {
                    match inner {
                        Piece::Fence {
                            fence: FenceLine::Close,
                            ..
                        } => {
                            closed = true;
                            break;
                        }
                        Piece::Fence { line, .. } => body.push(Grouped::Literal(line)),
                        Piece::Block(block) => body.push(Grouped::Block(block)),
                    }
                }

                if closed {
                    debug!("Recognized '{}' admonition with {} blocks", name, body.len());
                    result.push(Grouped::Admonition {
                        name,
                        title,
                        children: body,
                    });
                } else {
                    warn!("Unterminated '{}' admonition kept as plain text", name);
                    result.push(Grouped::Literal(line));
                    result.extend(body);
                }
            }
        }
    }

    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn fence(line: &str) -> Piece<&'static str> {
        Piece::Fence {
            fence: match_fence_line(line).unwrap(),
            line: line.to_string(),
        }
    }

    #[test]
    fn test_match_opening_with_title() {
        assert_eq!(
            match_fence_line(":::tip My Tip"),
            Some(FenceLine::Open {
                name: "tip".into(),
                title: "My Tip".into()
            })
        );
    }

    #[test]
    fn test_match_opening_without_title() {
        assert_eq!(
            match_fence_line(":::note  "),
            Some(FenceLine::Open {
                name: "note".into(),
                title: String::new()
            })
        );
    }

    #[test]
    fn test_match_closing() {
        assert_eq!(match_fence_line(":::"), Some(FenceLine::Close));
        assert_eq!(match_fence_line(":::   "), Some(FenceLine::Close));
    }

    #[test]
    fn test_non_fence_lines() {
        assert_eq!(match_fence_line("::note"), None);
        assert_eq!(match_fence_line("text :::note"), None);
        assert_eq!(match_fence_line("::::note"), None);
        assert_eq!(match_fence_line(""), None);
    }

    #[test]
    fn test_groups_blocks_between_fences() {
        let pieces = vec![
            Piece::Block("before"),
            fence(":::warning Careful"),
            Piece::Block("inside 1"),
            Piece::Block("inside 2"),
            fence(":::"),
            Piece::Block("after"),
        ];
        let grouped = group_admonitions(pieces);
        assert_eq!(
            grouped,
            vec![
                Grouped::Block("before"),
                Grouped::Admonition {
                    name: "warning".into(),
                    title: "Careful".into(),
                    children: vec![Grouped::Block("inside 1"), Grouped::Block("inside 2")],
                },
                Grouped::Block("after"),
            ]
        );
    }

    #[test]
    fn test_unterminated_opening_is_literal() {
        let pieces = vec![fence(":::note"), Piece::Block("foo")];
        let grouped = group_admonitions(pieces);
        assert_eq!(
            grouped,
            vec![Grouped::Literal(":::note".into()), Grouped::Block("foo")]
        );
    }

    #[test]
    fn test_first_closing_fence_wins() {
        let pieces = vec![
            fence(":::note"),
            fence(":::tip"),
            Piece::Block("x"),
            fence(":::"),
            fence(":::"),
        ];
        let grouped = group_admonitions(pieces);
        assert_eq!(
            grouped,
            vec![
                Grouped::Admonition {
                    name: "note".into(),
                    title: String::new(),
                    children: vec![Grouped::Literal(":::tip".into()), Grouped::Block("x")],
                },
                Grouped::Literal(":::".into()),
            ]
        );
    }

    #[test]
    fn test_empty_admonition() {
        let grouped = group_admonitions(vec![fence(":::info"), fence(":::")]);
        assert_eq!(
            grouped,
            vec![Grouped::Admonition {
                name: "info".into(),
                title: String::new(),
                children: vec![],
            }]
        );
    }
}
