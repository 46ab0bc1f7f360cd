//! YAML frontmatter handling
//!
//! A document file may start with a metadata block delimited by `---` lines:
//!
//! ```text
//! ---
//! title: Getting Started
//! sidebar_position: 2
//! ---
//! # Body starts here
//! ```
//!
//! The editor only ever sees the body; the metadata is split off on read and
//! re-attached on write.

use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};

/// Frontmatter key-value mapping, in file order.
pub type Metadata = Mapping;

/// Frontmatter delimiter line.
const DELIMITER: &str = "---";

/// A document file split into its metadata and markdown body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentFile {
    pub metadata: Metadata,
    pub body: String,
}

impl DocumentFile {
    /// The `title` field, when it is a string.
    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").and_then(Value::as_str)
    }
}

/// Split leading frontmatter from a document.
///
/// Text without a complete `---` block is returned whole as the body with
/// empty metadata. A block that is not a YAML mapping is an error.
pub fn split_frontmatter(content: &str) -> Result<DocumentFile> {
    let no_frontmatter = || DocumentFile {
        metadata: Metadata::new(),
        body: content.to_string(),
    };

    let Some((first, rest)) = content.split_once('\n') else {
        return Ok(no_frontmatter());
    };
    if first.trim_end() != DELIMITER {
        return Ok(no_frontmatter());
    }

    // Find the closing delimiter line
    let mut offset = 0;
    let mut closing = None;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            closing = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }
    let Some((yaml_end, body_start)) = closing else {
        return Ok(no_frontmatter());
    };

    let yaml = &rest[..yaml_end];
    let metadata = if yaml.trim().is_empty() {
        Metadata::new()
    } else {
        match serde_yaml::from_str::<Value>(yaml)? {
            Value::Mapping(mapping) => mapping,
            Value::Null => Metadata::new(),
            _ => {
                return Err(Error::Frontmatter {
                    message: "frontmatter is not a key-value mapping".to_string(),
                })
            }
        }
    };

    Ok(DocumentFile {
        metadata,
        body: rest[body_start..].to_string(),
    })
}

/// Attach metadata to a body as a leading frontmatter block.
///
/// Empty metadata produces the body alone. The result always ends with a
/// newline unless it is empty.
pub fn join_frontmatter(body: &str, metadata: &Metadata) -> Result<String> {
    let mut output = String::new();
    if !metadata.is_empty() {
        let yaml = serde_yaml::to_string(metadata)?;
        output.push_str(DELIMITER);
        output.push('\n');
        output.push_str(&yaml);
        if !yaml.ends_with('\n') {
            output.push('\n');
        }
        output.push_str(DELIMITER);
        output.push('\n');
    }
    output.push_str(body);
    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
