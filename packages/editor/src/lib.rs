//! # Pressroom Editor
//!
//! Rich content-editing core for article bodies.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ schema: markup ⇄ node tree, sanitization    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: session + commands                  │
//! │  - Document lifecycle (parse, mutate,       │
//! │    serialize)                               │
//! │  - Table / block / media commands           │
//! │  - Pointer-drag media resize                │
//! │  - Drop mediation (image read, video        │
//! │    object handles)                          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ host form: change/blur notifications,       │
//! │ confirm/prompt, persistence on save         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core principles
//!
//! 1. **The tree is source of truth**: the markup string is a derived view.
//! 2. **No autonomous persistence**: the host holds the latest serialized
//!    content and saves on an explicit action outside this core.
//! 3. **Transient state stays out of the tree**: drag positions and pending
//!    reads live in the session, keyed by node ID.
//! 4. **Rejected input degrades to a no-op**: localhost links, cancelled
//!    prompts, and out-of-context structural commands never raise.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pressroom_editor::{EditorSession, StaticPrompts};
//!
//! let mut session = EditorSession::new("<p>Draft</p>", Box::new(prompts));
//! session.set_on_change(|markup| form.set_value(markup));
//!
//! session.insert_table(3, 4)?;
//! session.begin_media_resize(&image_id, 50.0);
//! session.media_resize_moved(&image_id, 150.0);
//! session.end_media_resize(&image_id);
//! ```

mod commands;
mod document;
mod drop;
mod errors;
mod host;
mod media;
mod session;

pub use commands::{Applied, Command, CommandError};
pub use document::{Document, TableContext};
pub use drop::{DropMediator, DroppedFile, ObjectUrlRegistry, PendingImageRead};
pub use errors::EditorError;
pub use host::{HostPrompts, StaticPrompts};
pub use media::MediaInteraction;
pub use session::{EditorSession, PasteOutcome, Selection};

// Re-export common types for convenience
pub use pressroom_schema::{Align, Mark, MediaAttrs, Node, NodeId};
