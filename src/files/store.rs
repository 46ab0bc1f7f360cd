//! Document storage on the local file system
//!
//! The editor core never touches the disk itself. It reads and writes
//! document bodies through a [`DocumentStore`], which splits and re-attaches
//! frontmatter and knows the layout of a Docusaurus project.

use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::files::category::CATEGORY_FILE_NAME;
use crate::files::frontmatter::{join_frontmatter, split_frontmatter, DocumentFile, Metadata};

/// Project configuration files recognized at the project root.
const CONFIG_FILE_NAMES: &[&str] = &[
    "docusaurus.config.ts",
    "docusaurus.config.js",
    "sidebars.ts",
    "sidebars.js",
];

/// Directory names never descended into.
const IGNORED_DIRS: &[&str] = &["node_modules", "build"];

// ─────────────────────────────────────────────────────────────────────────────
// Classification
// ─────────────────────────────────────────────────────────────────────────────

/// Role of a file within a Docusaurus project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileClassification {
    Doc,
    BlogPost,
    ConfigFile,
    CategoryMetadata,
}

/// A project file with its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedFile {
    pub path: PathBuf,
    pub classification: FileClassification,
}

// ─────────────────────────────────────────────────────────────────────────────
// Store Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Read/write/list access to document files.
pub trait DocumentStore {
    /// Read a document and split off its frontmatter.
    fn read_body(&self, path: &Path) -> Result<DocumentFile>;

    /// Write a body with its frontmatter.
    fn write_body(&self, path: &Path, body: &str, metadata: &Metadata) -> Result<()>;

    /// List the documents, blog posts, config files and category descriptors
    /// of a project.
    fn list_files(&self, root: &Path) -> Result<Vec<ClassifiedFile>>;
}

// ─────────────────────────────────────────────────────────────────────────────
// File System Store
// ─────────────────────────────────────────────────────────────────────────────

/// [`DocumentStore`] backed by the local file system.
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    settings: Settings,
}

impl Default for FsDocumentStore {
    fn default() -> Self {
        Self::with_settings(&Settings::default())
    }
}

impl FsDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store using the project layout from the settings.
    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    /// Create a new document, creating parent directories as needed.
    ///
    /// `title` becomes the first frontmatter field; a `title` in `metadata`
    /// overrides its value but not its position.
    pub fn create_document(
        &self,
        path: &Path,
        title: &str,
        body: &str,
        metadata: &Metadata,
    ) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| Error::FileWrite {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let mut frontmatter = Metadata::new();
        frontmatter.insert("title".into(), title.into());
        for (key, value) in metadata {
            frontmatter.insert(key.clone(), value.clone());
        }

        self.write_body(path, body, &frontmatter)?;
        info!("Created document {}", path.display());
        Ok(())
    }

    /// Delete a document file.
    pub fn delete_document(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).map_err(|source| Error::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Deleted document {}", path.display());
        Ok(())
    }

    fn is_markdown(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| self.settings.is_markdown_extension(ext))
    }

    /// Walk one content directory, classifying the files found.
    fn scan_content_dir(
        &self,
        dir: &Path,
        markdown_class: FileClassification,
        files: &mut Vec<ClassifiedFile>,
    ) {
        if !dir.is_dir() {
            warn!("Content directory {} not found, skipping", dir.display());
            return;
        }

        let mut found = Vec::new();
        let walker = WalkDir::new(dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !should_skip(entry));
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let classification = if self.is_markdown(path) {
                Some(markdown_class)
            } else if markdown_class == FileClassification::Doc
                && entry.file_name() == CATEGORY_FILE_NAME
            {
                Some(FileClassification::CategoryMetadata)
            } else {
                None
            };

            if let Some(classification) = classification {
                found.push(ClassifiedFile {
                    path: path.to_path_buf(),
                    classification,
                });
            }
        }

        found.sort_by(|a, b| a.path.cmp(&b.path));
        debug!("Found {} files under {}", found.len(), dir.display());
        files.extend(found);
    }
}

/// Hidden entries and dependency/build output directories.
fn should_skip(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || (entry.file_type().is_dir() && IGNORED_DIRS.contains(&&*name))
}

impl DocumentStore for FsDocumentStore {
    fn read_body(&self, path: &Path) -> Result<DocumentFile> {
        let content = fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Read {} bytes from {}", content.len(), path.display());
        split_frontmatter(&content)
    }

    fn write_body(&self, path: &Path, body: &str, metadata: &Metadata) -> Result<()> {
        let content = join_frontmatter(body, metadata)?;
        fs::write(path, content).map_err(|source| Error::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    fn list_files(&self, root: &Path) -> Result<Vec<ClassifiedFile>> {
        if !root.is_dir() {
            return Err(Error::FileRead {
                path: root.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "project root is not a directory",
                ),
            });
        }

        let mut files = Vec::new();
        self.scan_content_dir(&root.join(&self.settings.docs_dir), FileClassification::Doc, &mut files);
        self.scan_content_dir(
            &root.join(&self.settings.blog_dir),
            FileClassification::BlogPost,
            &mut files,
        );
        for name in CONFIG_FILE_NAMES {
            let path = root.join(name);
            if path.is_file() {
                files.push(ClassifiedFile {
                    path,
                    classification: FileClassification::ConfigFile,
                });
            }
        }

        info!("Listed {} project files under {}", files.len(), root.display());
        Ok(files)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn sample_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "docs/intro.md", "# Intro");
        write(root, "docs/guides/setup.mdx", "# Setup");
        write(root, "docs/guides/_category_.json", r#"{"label": "Guides"}"#);
        write(root, "docs/guides/diagram.png", "png");
        write(root, "docs/.drafts/secret.md", "hidden");
        write(root, "blog/2024-01-01-welcome.md", "Welcome");
        write(root, "docusaurus.config.ts", "export default {}");
        write(root, "sidebars.js", "module.exports = {}");
        write(root, "node_modules/pkg/readme.md", "ignored");
        dir
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Listing Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_list_files_classifies_project() {
        let project = sample_project();
        let root = project.path();
        let files = FsDocumentStore::new().list_files(root).unwrap();

        let relative: Vec<(String, FileClassification)> = files
            .iter()
            .map(|f| {
                (
                    f.path
                        .strip_prefix(root)
                        .unwrap()
                        .to_string_lossy()
                        .replace('\\', "/"),
                    f.classification,
                )
            })
            .collect();

        assert_eq!(
            relative,
            vec![
                ("docs/guides/_category_.json".to_string(), FileClassification::CategoryMetadata),
                ("docs/guides/setup.mdx".to_string(), FileClassification::Doc),
                ("docs/intro.md".to_string(), FileClassification::Doc),
                ("blog/2024-01-01-welcome.md".to_string(), FileClassification::BlogPost),
                ("docusaurus.config.ts".to_string(), FileClassification::ConfigFile),
                ("sidebars.js".to_string(), FileClassification::ConfigFile),
            ]
        );
    }

    #[test]
    fn test_list_files_without_blog_dir() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "docs/only.md", "x");
        let files = FsDocumentStore::new().list_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].classification, FileClassification::Doc);
    }

    #[test]
    fn test_list_files_missing_root_is_error() {
        let dir = TempDir::new().unwrap();
        let result = FsDocumentStore::new().list_files(&dir.path().join("nope"));
        assert!(matches!(result, Err(Error::FileRead { .. })));
    }

    #[test]
    fn test_list_files_matches_extensions_case_insensitively() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "docs/Guide.MD", "x");
        write(dir.path(), "docs/notes.txt", "x");
        let files = FsDocumentStore::new().list_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("Guide.MD"));
    }

    #[test]
    fn test_list_files_uses_configured_layout() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "content/page.markdown", "x");
        let settings = Settings {
            docs_dir: "content".into(),
            markdown_extensions: vec!["markdown".into()],
            ..Settings::default()
        };
        let files = FsDocumentStore::with_settings(&settings)
            .list_files(dir.path())
            .unwrap();
        assert_eq!(files.len(), 1);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read/Write Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_read_and_write_body() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "doc.md", "---\ntitle: Old\n---\nOld body\n");
        let store = FsDocumentStore::new();

        let mut file = store.read_body(&path).unwrap();
        assert_eq!(file.title(), Some("Old"));
        assert_eq!(file.body, "Old body\n");

        file.metadata.insert("title".into(), "New".into());
        store.write_body(&path, "New body", &file.metadata).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "---\ntitle: New\n---\nNew body\n"
        );
    }

    #[test]
    fn test_read_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let result = FsDocumentStore::new().read_body(&dir.path().join("missing.md"));
        assert!(matches!(result, Err(Error::FileRead { .. })));
    }

    #[test]
    fn test_create_document_puts_title_first() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs/new/page.md");
        let mut metadata = Metadata::new();
        metadata.insert("sidebar_position".into(), 3.into());

        let store = FsDocumentStore::new();
        store
            .create_document(&path, "New Page", "Hello", &metadata)
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "---\ntitle: New Page\nsidebar_position: 3\n---\nHello\n"
        );
    }

    #[test]
    fn test_delete_document() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "docs/old.md", "x");
        let store = FsDocumentStore::new();

        store.delete_document(&path).unwrap();
        assert!(!path.exists());
        assert!(matches!(
            store.delete_document(&path),
            Err(Error::FileWrite { .. })
        ));
    }
}
