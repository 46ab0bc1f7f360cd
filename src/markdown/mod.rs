//! Markdown parsing and serialization for Docusaurus documents
//!
//! This module converts between markdown text and the editable document tree
//! using the comrak library, a CommonMark + GFM compatible parser. Docusaurus
//! admonitions (`:::tip Title`) and titled code fences
//! (`` ```ts title="a.ts" ``) are recognized on top of CommonMark.
//!
//! # Example
//! ```
//! use docsmith::markdown::{parse_markdown, serialize_document};
//!
//! let markdown = "- One\n  1. Nested\n- Two";
//! let doc = parse_markdown(markdown);
//! assert_eq!(serialize_document(&doc), markdown);
//! ```

pub mod admonitions;
pub mod languages;
mod lists;
mod parser;
mod serializer;
mod tree;

pub use languages::{default_languages, normalize_language, LanguageSet};
pub use parser::{parse_markdown, parse_markdown_with_options, split_code_info, MarkdownOptions};
pub use serializer::{render_marks, serialize_document, serialize_node};
pub use tree::{
    normalize_marks, AdmonitionType, DocumentNode, Mark, NodeKind, PLACEHOLDER_TEXT,
};
