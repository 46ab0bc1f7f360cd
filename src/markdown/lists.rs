//! List indentation normalization
//!
//! Nested lists are written two spaces deeper than their parent item,
//! whatever the parent's marker. CommonMark only nests a line under an item
//! once it reaches the item's content column, which for `1. ` is three
//! columns in. Before parsing, nested list lines that fall short of their
//! parent's content column are shifted onto it, so `1. a\n  - b` reads as a
//! bullet list inside the first ordered item.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Spaces added per level of list nesting.
pub const LIST_INDENT: usize = 2;

fn list_marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"^( *)([-+*]|\d{1,9}[.)])(?: |$)").expect("list marker pattern is valid")
    })
}

/// A list item still open at the current line.
struct OpenItem {
    /// Source column of the marker
    indent: usize,
    /// Source column where the item's content starts
    content: usize,
    /// Spaces inserted in front of the item's lines
    shift: usize,
}

/// An open fenced code block: fence character and run length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    ch: char,
    len: usize,
}

fn fence_opening(text: &str) -> Option<Fence> {
    let trimmed = text.trim_start_matches(' ');
    let ch = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == ch).count();
    if len < 3 || (ch == '`' && trimmed[len..].contains('`')) {
        return None;
    }
    Some(Fence { ch, len })
}

fn closes_fence(fence: Fence, text: &str) -> bool {
    let trimmed = text.trim_start_matches(' ');
    let len = trimmed.chars().take_while(|c| *c == fence.ch).count();
    len >= fence.len && trimmed[len..].trim().is_empty()
}

/// Shift nested list lines onto their parent item's content column.
///
/// Text that needs no change is returned borrowed. Lines inside fenced code
/// are never read as list markers but move with the item that holds them.
pub fn normalize_list_indentation(markdown: &str) -> Cow<'_, str> {
    let mut items: Vec<OpenItem> = Vec::new();
    let mut fence: Option<Fence> = None;
    let mut output = String::with_capacity(markdown.len());
    let mut changed = false;

    for line in markdown.split_inclusive('\n') {
        let body = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
        let indent = body.len() - body.trim_start_matches(' ').len();

        let shift = if body.trim().is_empty() {
            0
        } else if let Some(open) = fence {
            if closes_fence(open, body) {
                fence = None;
            }
            items
                .last()
                .filter(|item| indent >= item.content)
                .map_or(0, |item| item.shift)
        } else if let Some(caps) = list_marker_regex()
            .captures(body)
            .filter(|_| !items.is_empty() || indent < 4)
        {
            while items
                .last()
                .map_or(false, |item| indent < item.indent + LIST_INDENT)
            {
                items.pop();
            }
            let shift = match items.last() {
                Some(parent) if indent < parent.content => parent.content - indent + parent.shift,
                Some(parent) => parent.shift,
                None => 0,
            };
            let content = indent + caps[2].len() + 1;
            items.push(OpenItem {
                indent,
                content,
                shift,
            });
            fence = body.get(content..).and_then(fence_opening);
            shift
        } else {
            while items.last().map_or(false, |item| indent < item.content) {
                items.pop();
            }
            let base = items.last().map_or(0, |item| item.content);
            if indent < base + 4 {
                fence = fence_opening(body);
            }
            items.last().map_or(0, |item| item.shift)
        };

        if shift > 0 {
            changed = true;
            output.extend(std::iter::repeat(' ').take(shift));
        }
        output.push_str(line);
    }

    if changed {
        Cow::Owned(output)
    } else {
        Cow::Borrowed(markdown)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
