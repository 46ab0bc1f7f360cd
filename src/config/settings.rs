//! User settings for docsmith
//!
//! This module defines the `Settings` struct that holds all user-configurable
//! options, with serde support for JSON persistence.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// User preferences.
///
/// This struct is serialized to JSON and persisted to the user's config directory.
/// All fields have sensible defaults via the `Default` trait and `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Editor
    // ─────────────────────────────────────────────────────────────────────────
    /// Code-block languages accepted by editor sessions; empty selects the
    /// bundled syntax set
    pub supported_languages: Vec<String>,

    /// Admonition type used when inserting a callout without choosing one
    pub default_admonition_type: String,

    // ─────────────────────────────────────────────────────────────────────────
    // Project Layout
    // ─────────────────────────────────────────────────────────────────────────
    /// Documentation directory, relative to the project root
    pub docs_dir: String,

    /// Blog directory, relative to the project root
    pub blog_dir: String,

    /// File extensions treated as markdown documents (without the dot)
    pub markdown_extensions: Vec<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────────
    /// Recently opened project roots (most recent first)
    pub recent_projects: Vec<PathBuf>,

    /// Maximum number of recent projects to remember
    pub max_recent_projects: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            supported_languages: Vec::new(),
            default_admonition_type: "note".to_string(),
            docs_dir: "docs".to_string(),
            blog_dir: "blog".to_string(),
            markdown_extensions: vec!["md".to_string(), "mdx".to_string()],
            recent_projects: Vec::new(),
            max_recent_projects: 10,
        }
    }
}

impl Settings {
    /// Add a project to the recent projects list.
    ///
    /// If the project already exists in the list, it's moved to the front.
    /// The list is trimmed to `max_recent_projects`.
    pub fn add_recent_project(&mut self, path: PathBuf) {
        self.recent_projects.retain(|p| p != &path);
        self.recent_projects.insert(0, path);
        self.recent_projects.truncate(self.max_recent_projects);
    }

    /// Whether a file extension (without the dot) names a markdown document.
    pub fn is_markdown_extension(&self, extension: &str) -> bool {
        let extension = extension.to_lowercase();
        self.markdown_extensions.iter().any(|e| *e == extension)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation Constants and Sanitization
    // ─────────────────────────────────────────────────────────────────────────

    /// Maximum number of remembered projects.
    pub const MAX_RECENT_PROJECTS: usize = 100;

    /// Sanitize settings by repairing values that would break the editor.
    ///
    /// This is useful after loading settings from a file that might have
    /// been manually edited with invalid values.
    pub fn sanitize(&mut self) {
        let defaults = Self::default();

        // Admonition names are single words
        let admonition = self.default_admonition_type.trim().to_lowercase();
        if admonition.is_empty() || !admonition.chars().all(|c| c.is_alphanumeric() || c == '_') {
            self.default_admonition_type = defaults.default_admonition_type;
        } else {
            self.default_admonition_type = admonition;
        }

        if self.docs_dir.trim().is_empty() {
            self.docs_dir = defaults.docs_dir;
        }
        if self.blog_dir.trim().is_empty() {
            self.blog_dir = defaults.blog_dir;
        }

        // Extensions are stored lowercase without a leading dot
        let mut extensions: Vec<String> = Vec::new();
        for ext in &self.markdown_extensions {
            let ext = ext.trim().trim_start_matches('.').to_lowercase();
            if !ext.is_empty() && !extensions.contains(&ext) {
                extensions.push(ext);
            }
        }
        self.markdown_extensions = if extensions.is_empty() {
            defaults.markdown_extensions
        } else {
            extensions
        };

        self.supported_languages = self
            .supported_languages
            .iter()
            .map(|lang| lang.trim().to_string())
            .filter(|lang| !lang.is_empty())
            .collect();

        // Ensure max_recent_projects is reasonable
        if self.max_recent_projects == 0 {
            self.max_recent_projects = defaults.max_recent_projects;
        } else if self.max_recent_projects > Self::MAX_RECENT_PROJECTS {
            self.max_recent_projects = Self::MAX_RECENT_PROJECTS;
        }
        self.recent_projects.truncate(self.max_recent_projects);
    }

    /// Load settings and sanitize them to ensure validity.
    ///
    /// This is a convenience method that deserializes and then sanitizes.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.supported_languages.is_empty());
        assert_eq!(settings.default_admonition_type, "note");
        assert_eq!(settings.docs_dir, "docs");
        assert_eq!(settings.blog_dir, "blog");
        assert_eq!(settings.markdown_extensions, vec!["md", "mdx"]);
        assert!(settings.recent_projects.is_empty());
        assert_eq!(settings.max_recent_projects, 10);
    }

    #[test]
    fn test_add_recent_project() {
        let mut settings = Settings::default();
        settings.max_recent_projects = 3;

        settings.add_recent_project(PathBuf::from("/site-a"));
        settings.add_recent_project(PathBuf::from("/site-b"));
        settings.add_recent_project(PathBuf::from("/site-c"));
        settings.add_recent_project(PathBuf::from("/site-d"));

        assert_eq!(settings.recent_projects.len(), 3);
        assert_eq!(settings.recent_projects[0], PathBuf::from("/site-d"));
    }

    #[test]
    fn test_add_recent_project_moves_existing_to_front() {
        let mut settings = Settings::default();
        settings.add_recent_project(PathBuf::from("/a"));
        settings.add_recent_project(PathBuf::from("/b"));
        settings.add_recent_project(PathBuf::from("/a"));

        assert_eq!(
            settings.recent_projects,
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
    }

    #[test]
    fn test_is_markdown_extension() {
        let settings = Settings::default();
        assert!(settings.is_markdown_extension("md"));
        assert!(settings.is_markdown_extension("MDX"));
        assert!(!settings.is_markdown_extension("json"));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sanitization Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_sanitize_repairs_admonition_type() {
        let mut settings = Settings {
            default_admonition_type: " Tip ".into(),
            ..Settings::default()
        };
        settings.sanitize();
        assert_eq!(settings.default_admonition_type, "tip");

        settings.default_admonition_type = "not valid".into();
        settings.sanitize();
        assert_eq!(settings.default_admonition_type, "note");
    }

    #[test]
    fn test_sanitize_normalizes_extensions() {
        let mut settings = Settings {
            markdown_extensions: vec![".MD".into(), "md".into(), " ".into(), "markdown".into()],
            ..Settings::default()
        };
        settings.sanitize();
        assert_eq!(settings.markdown_extensions, vec!["md", "markdown"]);

        settings.markdown_extensions.clear();
        settings.sanitize();
        assert_eq!(settings.markdown_extensions, vec!["md", "mdx"]);
    }

    #[test]
    fn test_sanitize_restores_empty_directories() {
        let mut settings = Settings {
            docs_dir: "".into(),
            blog_dir: "  ".into(),
            ..Settings::default()
        };
        settings.sanitize();
        assert_eq!(settings.docs_dir, "docs");
        assert_eq!(settings.blog_dir, "blog");
    }

    #[test]
    fn test_sanitize_clamps_recent_projects() {
        let mut settings = Settings {
            max_recent_projects: 0,
            ..Settings::default()
        };
        settings.sanitize();
        assert_eq!(settings.max_recent_projects, 10);

        settings.max_recent_projects = 500;
        settings.sanitize();
        assert_eq!(settings.max_recent_projects, Settings::MAX_RECENT_PROJECTS);
    }

    #[test]
    fn test_from_json_sanitized() {
        let json = r#"{"supported_languages": [" rust ", ""], "max_recent_projects": 0}"#;
        let settings = Settings::from_json_sanitized(json).unwrap();
        assert_eq!(settings.supported_languages, vec!["rust"]);
        assert_eq!(settings.max_recent_projects, 10);
        assert_eq!(settings.docs_dir, "docs");
    }

    #[test]
    fn test_serialization_roundtrip() {
        let original = Settings {
            supported_languages: vec!["rust".into(), "python".into()],
            default_admonition_type: "warning".into(),
            recent_projects: vec![PathBuf::from("/site")],
            ..Settings::default()
        };
        let json = serde_json::to_string(&original).unwrap();
        let loaded: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(original, loaded);
    }
}
