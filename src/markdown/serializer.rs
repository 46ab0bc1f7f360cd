//! Document tree to markdown serialization
//!
//! The output is deterministic: the same tree always produces the same text,
//! and blocks are separated by exactly one blank line. Inline marks nest in a
//! fixed order so repeated save cycles do not churn diffs. Plain text is
//! escaped wherever it would otherwise read back as markup.

use log::debug;

use crate::markdown::lists::LIST_INDENT;
use crate::markdown::tree::{normalize_marks, DocumentNode, Mark, NodeKind};

// ─────────────────────────────────────────────────────────────────────────────
// Public API Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Serialize a document tree back to markdown text.
///
/// # Example
/// ```
/// use docsmith::markdown::{parse_markdown, serialize_document};
///
/// let doc = parse_markdown("```ts title=\"a.ts\"\nlet x = 1;\n```");
/// assert_eq!(serialize_document(&doc), "```ts title=\"a.ts\"\nlet x = 1;\n```");
/// ```
pub fn serialize_document(root: &DocumentNode) -> String {
    let output = serialize_node(root);
    debug!("Serialized tree into {} bytes", output.len());
    output
}

/// Serialize any node of the tree. Never fails.
pub fn serialize_node(node: &DocumentNode) -> String {
    match &node.kind {
        NodeKind::Document => serialize_blocks(&node.children).trim_end().to_string(),

        NodeKind::Paragraph => serialize_inline_content(node, true),

        NodeKind::Heading { level } => {
            format!(
                "{} {}",
                "#".repeat(*level as usize),
                serialize_inline_content(node, false)
            )
        }

        NodeKind::BulletList | NodeKind::OrderedList => serialize_list(node, 0),

        // An item outside a list has no marker to hang on
        NodeKind::ListItem => serialize_blocks(&node.children),

        NodeKind::CodeBlock { language, title } => {
            serialize_code_block(language, title, &node.text_content())
        }

        NodeKind::Blockquote => {
            let inner = node
                .children
                .iter()
                .map(serialize_node)
                .collect::<Vec<_>>()
                .join("\n");
            format!("> {}", inner)
        }

        NodeKind::Admonition {
            admonition_type,
            title,
        } => {
            let opening = if title.is_empty() {
                format!(":::{}", admonition_type)
            } else {
                format!(":::{} {}", admonition_type, title)
            };
            let body = serialize_blocks(&node.children);
            if body.is_empty() {
                format!("{}\n\n:::", opening)
            } else {
                format!("{}\n\n{}\n\n:::", opening, body)
            }
        }

        NodeKind::Image { src, alt, title } => serialize_image(src, alt, title),

        NodeKind::HorizontalRule => "---".to_string(),

        NodeKind::Text {
            text,
            marks,
            verbatim,
        } => render_run(text, marks, *verbatim, true),
    }
}

/// Wrap a text run in the delimiters of its marks.
///
/// Marks nest innermost first in the order bold, italic, code, link,
/// highlight, strike. Whitespace at either end of a run is moved outside the
/// delimiters, where emphasis would otherwise fail to close. Text outside a
/// code span is escaped as it would be in the middle of a line.
pub fn render_marks(text: &str, marks: &[Mark]) -> String {
    render_run(text, marks, false, false)
}

fn render_run(text: &str, marks: &[Mark], verbatim: bool, line_start: bool) -> String {
    if verbatim {
        return text.to_string();
    }
    if marks.is_empty() {
        return escape_text(text, line_start);
    }

    let mut ordered = marks.to_vec();
    normalize_marks(&mut ordered);

    let is_code = ordered.contains(&Mark::Code);
    let (leading, core, trailing) = if is_code || text.trim().is_empty() {
        ("", text, "")
    } else {
        let start = text.len() - text.trim_start().len();
        let end = text.trim_end().len();
        (&text[..start], &text[start..end], &text[end..])
    };

    let mut rendered = if is_code {
        core.to_string()
    } else {
        escape_text(core, false)
    };
    for mark in &ordered {
        rendered = match mark {
            Mark::Bold => format!("**{}**", rendered),
            Mark::Italic => format!("_{}_", rendered),
            Mark::Code => code_span(&rendered),
            Mark::Link { href } => format!("[{}]({})", rendered, href),
            Mark::Highlight => format!("=={}==", rendered),
            Mark::Strike => format!("~~{}~~", rendered),
        };
    }
    format!("{}{}{}", leading, rendered, trailing)
}

// ─────────────────────────────────────────────────────────────────────────────
// Block Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Serialize a block sequence with one blank line between blocks.
///
/// Blocks that render to nothing (placeholders) are skipped.
fn serialize_blocks(blocks: &[DocumentNode]) -> String {
    blocks
        .iter()
        .map(serialize_node)
        .filter(|block| !block.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn longest_backtick_run(text: &str) -> usize {
    text.split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0)
}

fn serialize_code_block(language: &str, title: &str, code: &str) -> String {
    let fence = "`".repeat((longest_backtick_run(code) + 1).max(3));
    let mut info = language.to_string();
    if !title.is_empty() {
        info.push_str(&format!(" title=\"{}\"", title));
    }
    format!("{}{}\n{}\n{}", fence, info, code, fence)
}

/// Serialize a list, indenting every line by `depth` nesting levels.
///
/// Ordered items are numbered from 1 within their own list. An item's own
/// content comes first, followed by its nested lists one level deeper.
fn serialize_list(list: &DocumentNode, depth: usize) -> String {
    let indent = " ".repeat(depth * LIST_INDENT);
    let ordered = matches!(list.kind, NodeKind::OrderedList);

    let mut lines: Vec<String> = Vec::new();
    for (index, item) in list.children.iter().enumerate() {
        let marker = if ordered {
            format!("{}.", index + 1)
        } else {
            "-".to_string()
        };

        let (nested, content): (Vec<&DocumentNode>, Vec<&DocumentNode>) =
            item.children.iter().partition(|child| {
                matches!(child.kind, NodeKind::BulletList | NodeKind::OrderedList)
            });

        let text = content
            .iter()
            .map(|block| serialize_node(block))
            .filter(|block| !block.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        let text = text.trim();

        if text.is_empty() {
            lines.push(format!("{}{}", indent, marker));
        } else {
            let continuation = " ".repeat(indent.len() + marker.len() + 1);
            for (line_index, line) in text.lines().enumerate() {
                if line_index == 0 {
                    lines.push(format!("{}{} {}", indent, marker, line));
                } else if line.is_empty() {
                    lines.push(String::new());
                } else {
                    lines.push(format!("{}{}", continuation, line));
                }
            }
        }

        for child in nested {
            lines.push(serialize_list(child, depth + 1));
        }
    }
    lines.join("\n")
}

// ─────────────────────────────────────────────────────────────────────────────
// Inline Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Serialize inline children. `line_start` says whether the first run opens
/// a line of block text, where leading block markers need escaping.
fn serialize_inline_content(node: &DocumentNode, line_start: bool) -> String {
    let mut output = String::new();
    for child in &node.children {
        let at_line_start = if output.is_empty() {
            line_start
        } else {
            output.ends_with('\n')
        };
        output.push_str(&serialize_inline_node(child, at_line_start));
    }
    output
}

fn serialize_inline_node(node: &DocumentNode, line_start: bool) -> String {
    match &node.kind {
        NodeKind::Text {
            text,
            marks,
            verbatim,
        } => render_run(text, marks, *verbatim, line_start),
        NodeKind::Image { src, alt, title } => serialize_image(src, alt, title),
        _ => node.text_content(),
    }
}

/// Backslash-escape plain text so it reads back as the same text.
///
/// Emphasis, code, link and strike delimiters are always escaped, as are
/// `<` and `&` where they would start inline HTML or an entity. A backslash
/// is doubled only before punctuation, which leaves hard breaks intact.
/// At the start of each line, text that would open a heading, list, quote,
/// setext underline or admonition fence has its marker escaped.
fn escape_text(text: &str, line_start: bool) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut output = String::with_capacity(text.len());
    let mut at_line_start = line_start;

    let mut index = 0;
    while index < chars.len() {
        let ch = chars[index];
        let next = chars.get(index + 1).copied();

        if at_line_start && ch != ' ' {
            at_line_start = false;
            if let Some(marker_end) = block_marker_end(&chars[index..]) {
                let marker_end = index + marker_end;
                // Ordered markers escape their delimiter; the rest their first char
                let escape_at = if ch.is_ascii_digit() { marker_end } else { index };
                for (position, marker_char) in chars[index..=marker_end].iter().enumerate() {
                    if index + position == escape_at {
                        output.push('\\');
                    }
                    output.push(*marker_char);
                }
                index = marker_end + 1;
                continue;
            }
        }

        let escape = match ch {
            '*' | '`' | '[' | ']' | '~' => true,
            '_' => {
                let before = index.checked_sub(1).map(|i| chars[i]);
                !(before.map_or(false, char::is_alphanumeric)
                    && next.map_or(false, char::is_alphanumeric))
            }
            '\\' => next.map_or(false, |c| c.is_ascii_punctuation()),
            '<' => next.map_or(false, |c| {
                c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?')
            }),
            '&' => starts_entity(&chars[index + 1..]),
            _ => false,
        };
        if escape {
            output.push('\\');
        }
        output.push(ch);
        if ch == '\n' {
            at_line_start = true;
        }
        index += 1;
    }
    output
}

/// Index of the last character of a block marker at the start of `chars`.
fn block_marker_end(chars: &[char]) -> Option<usize> {
    let at = |i: usize| chars.get(i).copied();
    let ends_marker = |c: Option<char>| matches!(c, None | Some(' ' | '\t' | '\n'));
    match chars[0] {
        '#' | '>' | '=' => Some(0),
        '-' | '+' if ends_marker(at(1)) || at(1) == Some(chars[0]) => Some(0),
        ':' if at(1) == Some(':') && at(2) == Some(':') => Some(0),
        c if c.is_ascii_digit() => {
            let digits = chars.iter().take_while(|c| c.is_ascii_digit()).count();
            let delimiter = at(digits);
            (digits <= 9
                && matches!(delimiter, Some('.' | ')'))
                && ends_marker(at(digits + 1)))
            .then_some(digits)
        }
        _ => None,
    }
}

/// Whether `chars` begins with the body of an entity such as `lt;` or `#39;`.
fn starts_entity(chars: &[char]) -> bool {
    let body = chars.strip_prefix(&['#']).unwrap_or(chars);
    let name = body.iter().take_while(|c| c.is_ascii_alphanumeric()).count();
    name > 0 && body.get(name) == Some(&';')
}

fn serialize_image(src: &str, alt: &str, title: &str) -> String {
    if title.is_empty() {
        format!("![{}]({})", alt, src)
    } else {
        format!("![{}]({} \"{}\")", alt, src, title)
    }
}

/// An inline code span whose delimiters cannot collide with its content.
fn code_span(code: &str) -> String {
    let ticks = "`".repeat(longest_backtick_run(code) + 1);
    if code.starts_with('`') || code.ends_with('`') {
        format!("{} {} {}", ticks, code, ticks)
    } else {
        format!("{}{}{}", ticks, code, ticks)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
