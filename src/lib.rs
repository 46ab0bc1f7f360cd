//! docsmith - block-tree editing core for Docusaurus markdown
//!
//! Converts markdown (with Docusaurus admonitions and titled code fences)
//! into an editable block tree and back, and runs per-document editing
//! sessions on that tree.
//!
//! ```
//! use docsmith::editor::{EditCommand, EditorSession};
//! use docsmith::markdown::{DocumentNode, LanguageSet};
//!
//! let mut session = EditorSession::new(LanguageSet::new(["rust"]));
//! session.load(":::tip Remember\nSave often\n:::");
//! let markdown = session
//!     .apply_edit(EditCommand::InsertChild {
//!         parent: vec![],
//!         index: 1,
//!         node: DocumentNode::paragraph_text("Done."),
//!     })
//!     .unwrap();
//! assert_eq!(markdown, ":::tip Remember\n\nSave often\n\n:::\n\nDone.");
//! ```

pub mod config;
pub mod editor;
pub mod error;
pub mod files;
pub mod markdown;

pub use error::{Error, Result};
