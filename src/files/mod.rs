//! File collaborator for docsmith
//!
//! This module provides the file-level operations around the editor core:
//! - Frontmatter splitting and joining
//! - Reading, writing and listing documents of a Docusaurus project
//! - Sidebar category metadata (`_category_.json`)

pub mod category;
pub mod frontmatter;
pub mod store;

pub use category::{read_category, write_category, CategoryLink, CategoryMetadata};
pub use frontmatter::{join_frontmatter, split_frontmatter, DocumentFile, Metadata};
pub use store::{ClassifiedFile, DocumentStore, FileClassification, FsDocumentStore};
