//! `_category_.json` sidebar category metadata

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// File name of a docs category descriptor.
pub const CATEGORY_FILE_NAME: &str = "_category_.json";

/// Sidebar metadata for a docs directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMetadata {
    pub label: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<CategoryLink>,
}

/// What clicking the category in the sidebar opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryLink {
    #[serde(rename = "type", default = "default_link_type")]
    pub link_type: String,
    #[serde(default)]
    pub description: String,
}

fn default_link_type() -> String {
    "generated-index".to_string()
}

impl CategoryMetadata {
    /// A category with a generated index page.
    pub fn new(label: impl Into<String>, position: i32, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            position,
            link: Some(CategoryLink {
                link_type: default_link_type(),
                description: description.into(),
            }),
        }
    }
}

/// Read a category descriptor.
pub fn read_category(path: &Path) -> Result<CategoryMetadata> {
    let contents = fs::read_to_string(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let category = serde_json::from_str(&contents)?;
    debug!("Read category metadata from {}", path.display());
    Ok(category)
}

/// Write a category descriptor as pretty JSON.
pub fn write_category(path: &Path, category: &CategoryMetadata) -> Result<()> {
    let json = serde_json::to_string_pretty(category)?;
    fs::write(path, json).map_err(|source| Error::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}
