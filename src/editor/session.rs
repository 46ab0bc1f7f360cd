//! Live editing session for one document
//!
//! An [`EditorSession`] owns the document tree while a user edits it. Edits
//! arrive as [`EditCommand`] values; after each one the tree is serialized and
//! the new markdown is published as a [`SessionEvent`] for the persistence
//! layer to pick up with [`EditorSession::poll_events`].
//!
//! While a code block has focus, external reloads are held back so that
//! in-progress keystrokes are never thrown away. When focus is released the
//! held-back text is applied, unless the user edited the document after it
//! arrived, in which case editing wins and the reload is dropped.

use log::{debug, info, warn};
use std::sync::mpsc::{channel, Receiver, Sender};

use crate::config::Settings;
use crate::editor::commands::{apply_command, AttributeUpdate, EditCommand, NodePath};
use crate::editor::templates::BlockTemplate;
use crate::error::{Error, Result};
use crate::markdown::{
    default_languages, parse_markdown, serialize_document, AdmonitionType, DocumentNode,
    LanguageSet, NodeKind,
};

// ─────────────────────────────────────────────────────────────────────────────
// Session Types
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, nothing loaded yet
    Idle,
    /// A tree was loaded and has not been edited since
    Loaded,
    /// The user is editing (an edit was applied or a code block has focus)
    Editing,
    /// Terminal; every operation is rejected
    Disposed,
}

/// Result of a [`EditorSession::load`] request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The tree was replaced
    Applied,
    /// A code block has focus; the text is held until focus is released
    Deferred,
    /// The text was not loaded and never will be
    Rejected,
}

/// Notification published on the session channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A fresh tree replaced the previous one
    TreeLoaded { markdown: String },
    /// An edit changed the tree; `markdown` is the new serialized content
    ContentChanged { markdown: String },
}

// ─────────────────────────────────────────────────────────────────────────────
// Editor Session
// ─────────────────────────────────────────────────────────────────────────────

/// The live tree of one open document plus its change channel.
#[derive(Debug)]
pub struct EditorSession {
    state: SessionState,
    root: DocumentNode,
    languages: LanguageSet,
    default_admonition: AdmonitionType,
    /// Path of the code block being edited
    focus: Option<NodePath>,
    /// Newest reload held back while focused
    pending_load: Option<String>,
    edited_since_deferral: bool,
    sender: Sender<SessionEvent>,
    receiver: Receiver<SessionEvent>,
}

impl EditorSession {
    /// Create an idle session accepting the given code-block languages.
    pub fn new(languages: LanguageSet) -> Self {
        let (sender, receiver) = channel();
        Self {
            state: SessionState::Idle,
            root: parse_markdown(""),
            languages,
            default_admonition: AdmonitionType::default(),
            focus: None,
            pending_load: None,
            edited_since_deferral: false,
            sender,
            receiver,
        }
    }

    /// Create an idle session configured from application settings.
    ///
    /// An empty language list in the settings selects the bundled default set.
    pub fn with_settings(settings: &Settings) -> Self {
        let languages = if settings.supported_languages.is_empty() {
            default_languages().clone()
        } else {
            LanguageSet::new(&settings.supported_languages)
        };
        let mut session = Self::new(languages);
        session.default_admonition = AdmonitionType::from_name(&settings.default_admonition_type);
        session
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The live tree.
    pub fn root(&self) -> &DocumentNode {
        &self.root
    }

    pub fn languages(&self) -> &LanguageSet {
        &self.languages
    }

    /// Path of the focused code block, if any.
    pub fn focused(&self) -> Option<&[usize]> {
        self.focus.as_deref()
    }

    pub fn has_pending_load(&self) -> bool {
        self.pending_load.is_some()
    }

    /// Serialization of the live tree, ready to be written out.
    ///
    /// Still available after disposal so a final save can read it.
    pub fn current_markdown(&self) -> String {
        serialize_document(&self.root)
    }

    /// Drain all pending session events.
    pub fn poll_events(&self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the tree with freshly parsed markdown.
    ///
    /// Deferred while a code block has focus; only the newest deferred text
    /// is kept.
    pub fn load(&mut self, markdown: &str) -> LoadOutcome {
        if self.state == SessionState::Disposed {
            warn!("Load rejected: session disposed");
            return LoadOutcome::Rejected;
        }
        if self.focus.is_some() {
            warn!("Reload deferred while a code block is being edited");
            self.pending_load = Some(markdown.to_string());
            self.edited_since_deferral = false;
            return LoadOutcome::Deferred;
        }
        self.replace_tree(markdown);
        LoadOutcome::Applied
    }

    fn replace_tree(&mut self, markdown: &str) {
        self.root = parse_markdown(markdown);
        self.check_languages(&self.root);
        self.state = SessionState::Loaded;
        let markdown = self.current_markdown();
        info!("Loaded document tree ({} top-level blocks)", self.root.children.len());
        self.emit(SessionEvent::TreeLoaded { markdown });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Focus
    // ─────────────────────────────────────────────────────────────────────────

    /// Mark a code block (or the text inside one) as actively edited.
    pub fn focus_leaf(&mut self, path: &[usize]) -> Result<()> {
        self.ensure_live()?;
        let node = self.root.node_at(path).ok_or_else(|| Error::InvalidPath {
            path: path.to_vec(),
        })?;

        let block_path = match &node.kind {
            NodeKind::CodeBlock { .. } => path.to_vec(),
            NodeKind::Text { .. } => {
                let parent_path = &path[..path.len().saturating_sub(1)];
                match self.root.node_at(parent_path).map(|parent| &parent.kind) {
                    Some(NodeKind::CodeBlock { .. }) if !path.is_empty() => parent_path.to_vec(),
                    _ => return Err(Error::NotALeaf { kind: "text" }),
                }
            }
            kind => return Err(Error::NotALeaf { kind: kind.name() }),
        };

        debug!("Focused code block at {:?}", block_path);
        self.focus = Some(block_path);
        self.state = SessionState::Editing;
        Ok(())
    }

    /// End leaf editing and settle any deferred reload.
    ///
    /// Returns `None` when nothing was deferred, `Applied` when the deferred
    /// text replaced the tree, and `Rejected` when it was dropped because the
    /// user edited after it arrived.
    pub fn release_focus(&mut self) -> Option<LoadOutcome> {
        if self.state == SessionState::Disposed {
            return Some(LoadOutcome::Rejected);
        }
        self.focus = None;
        let pending = self.pending_load.take()?;
        if self.edited_since_deferral {
            warn!("Deferred reload dropped: document was edited after it arrived");
            self.edited_since_deferral = false;
            return Some(LoadOutcome::Rejected);
        }
        self.replace_tree(&pending);
        Some(LoadOutcome::Applied)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Editing
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply an edit and return the new markdown.
    ///
    /// A rejected command leaves the tree untouched and publishes nothing.
    pub fn apply_edit(&mut self, command: EditCommand) -> Result<String> {
        self.ensure_live()?;
        match &command {
            EditCommand::InsertChild { node, .. } => self.check_languages(node),
            EditCommand::UpdateAttributes {
                update:
                    AttributeUpdate::CodeBlock {
                        language: Some(language),
                        ..
                    },
                ..
            } => self.check_language(language),
            _ => {}
        }

        apply_command(&mut self.root, &command)?;
        self.adjust_focus(&command);
        if self.pending_load.is_some() {
            self.edited_since_deferral = true;
        }
        self.state = SessionState::Editing;

        let markdown = self.current_markdown();
        self.emit(SessionEvent::ContentChanged {
            markdown: markdown.clone(),
        });
        Ok(markdown)
    }

    /// Insert a fresh block built from a template.
    pub fn insert_template(
        &mut self,
        parent: NodePath,
        index: usize,
        template: BlockTemplate,
    ) -> Result<String> {
        self.apply_edit(EditCommand::InsertChild {
            parent,
            index,
            node: template.build(),
        })
    }

    /// Insert an admonition of the configured default type.
    pub fn insert_default_admonition(&mut self, parent: NodePath, index: usize) -> Result<String> {
        let node = BlockTemplate::admonition(&self.default_admonition);
        self.apply_edit(EditCommand::InsertChild {
            parent,
            index,
            node,
        })
    }

    /// Move to the terminal state. Later calls are rejected.
    pub fn dispose(&mut self) {
        if self.state != SessionState::Disposed {
            info!("Editor session disposed");
        }
        self.state = SessionState::Disposed;
        self.focus = None;
        self.pending_load = None;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn ensure_live(&self) -> Result<()> {
        if self.state == SessionState::Disposed {
            return Err(Error::SessionDisposed);
        }
        Ok(())
    }

    fn emit(&self, event: SessionEvent) {
        // The receiver lives as long as the session
        let _ = self.sender.send(event);
    }

    fn check_language(&self, language: &str) {
        if !self.languages.supports(language) {
            warn!("Unsupported code block language '{}' kept as is", language);
        }
    }

    fn check_languages(&self, node: &DocumentNode) {
        if let NodeKind::CodeBlock { language, .. } = &node.kind {
            self.check_language(language);
        }
        for child in &node.children {
            self.check_languages(child);
        }
    }

    /// Keep the focus path pointing at the same code block after a
    /// structural edit, or drop it when the block was deleted.
    fn adjust_focus(&mut self, command: &EditCommand) {
        let Some(focus) = self.focus.as_mut() else {
            return;
        };
        match command {
            EditCommand::InsertChild { parent, index, .. } => {
                let depth = parent.len();
                if focus.len() > depth && focus[..depth] == parent[..] && focus[depth] >= *index {
                    focus[depth] += 1;
                }
            }
            EditCommand::DeleteNode { path } => {
                if focus.starts_with(path) {
                    debug!("Focused code block deleted");
                    self.focus = None;
                    self.pending_load = None;
                    self.edited_since_deferral = false;
                    return;
                }
                let depth = path.len() - 1;
                if focus.len() > depth && focus[..depth] == path[..depth] && focus[depth] > path[depth]
                {
                    focus[depth] -= 1;
                }
            }
            EditCommand::UpdateAttributes { .. } | EditCommand::ReplaceLeafText { .. } => {}
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
