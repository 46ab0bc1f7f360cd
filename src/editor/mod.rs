//! Block editing on a live document tree
//!
//! - `commands`: structural edit commands and their application
//! - `session`: the per-document session with change events and reload deferral
//! - `templates`: blocks offered by the slash-command menu

mod commands;
mod session;
mod templates;

pub use commands::{apply_command, AttributeUpdate, EditCommand, NodePath};
pub use session::{EditorSession, LoadOutcome, SessionEvent, SessionState};
pub use templates::BlockTemplate;
