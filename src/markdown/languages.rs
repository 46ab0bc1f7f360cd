//! Supported code-block languages
//!
//! The set of languages an editor session accepts for code blocks is passed
//! in explicitly rather than registered globally. The default set is built
//! once from the syntaxes bundled with syntect, so every language that can be
//! highlighted is also accepted.

use std::collections::BTreeSet;
use std::sync::OnceLock;
use syntect::parsing::SyntaxSet;

// ─────────────────────────────────────────────────────────────────────────────
// Language Normalization
// ─────────────────────────────────────────────────────────────────────────────

/// Map common aliases of a fence language onto one canonical identifier.
///
/// Unknown identifiers are returned lowercased and otherwise unchanged.
pub fn normalize_language(lang: &str) -> String {
    let lower = lang.trim().to_lowercase();
    let canonical = match lower.as_str() {
        "rs" => "rust",
        "py" => "python",
        "js" => "javascript",
        "ts" => "typescript",
        "golang" => "go",
        "c++" | "cxx" => "cpp",
        "cs" | "c#" => "csharp",
        "htm" => "html",
        "yml" => "yaml",
        "md" => "markdown",
        "sh" | "shell" | "zsh" => "bash",
        "rb" => "ruby",
        "kt" => "kotlin",
        "pl" => "perl",
        "hs" => "haskell",
        "ex" => "elixir",
        "clj" => "clojure",
        "docker" => "dockerfile",
        "make" => "makefile",
        "patch" => "diff",
        other => other,
    };
    canonical.to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Language Set
// ─────────────────────────────────────────────────────────────────────────────

/// Fence languages recognized for code blocks.
///
/// Membership is advisory. A code block whose language is not in the set is
/// still kept verbatim; the session only logs it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageSet {
    languages: BTreeSet<String>,
}

impl LanguageSet {
    /// Build a set from language identifiers; aliases are normalized.
    pub fn new<I, S>(languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let languages = languages
            .into_iter()
            .map(|lang| normalize_language(lang.as_ref()))
            .filter(|lang| !lang.is_empty())
            .collect();
        Self { languages }
    }

    /// Every syntax name and file extension bundled with syntect, plus the
    /// canonical names of the common aliases.
    pub fn from_syntect_defaults() -> Self {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let mut names: Vec<String> = Vec::new();
        for syntax in syntax_set.syntaxes() {
            names.push(syntax.name.clone());
            names.extend(syntax.file_extensions.iter().cloned());
        }
        names.extend(
            ["typescript", "tsx", "jsx", "bash", "dockerfile", "toml", "mdx"]
                .iter()
                .map(|s| s.to_string()),
        );
        Self::new(names)
    }

    /// Whether a fence language is supported.
    ///
    /// Only the first word of the info string counts; an empty language
    /// (plain text) is always supported.
    pub fn supports(&self, language: &str) -> bool {
        match language.split_whitespace().next() {
            None => true,
            Some(first) => self.languages.contains(&normalize_language(first)),
        }
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().map(String::as_str)
    }
}

/// The shared default language set, loaded on first use.
pub fn default_languages() -> &'static LanguageSet {
    static DEFAULT: OnceLock<LanguageSet> = OnceLock::new();
    DEFAULT.get_or_init(LanguageSet::from_syntect_defaults)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
