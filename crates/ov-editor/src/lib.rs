//! Interactive editing of the text regions and drawings of one page.
//!
//! [`Editor`] is the entry point. It owns the interaction state machine,
//! the undo history and the persistence synchronizer, and talks to the
//! outside world through a [`Backend`].

pub mod backend;
pub mod commands;
mod compose;
pub mod config;
pub mod editor;
pub mod input;
pub mod memory;
pub mod selection;
pub mod shortcuts;
pub mod store;
pub mod sync;
pub mod tools;

pub use backend::{Backend, BackendError, PageRef, ShapeRecord};
pub use config::EditorConfig;
pub use editor::Editor;
pub use input::{InputEvent, Modifiers, PointerButton};
pub use memory::{MemoryBackend, Op};
pub use sync::{Notice, SyncEngine, SyncError, Ticket};
pub use tools::{Effect, SessionKind, ToolKind};
