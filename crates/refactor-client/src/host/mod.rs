//! Collaborators the refactoring flows are given instead of reaching for
//! global editor state.
//!
//! - [`Editor`]: documents, edits, messages, pickers and commands of the host
//! - [`FileSystem`]: synchronous existence checks for move collisions
//! - [`RefactorServer`]: the language server's refactoring requests

pub mod editor;
pub mod fs;
pub mod server;
pub mod terminal;

pub use editor::{Editor, RENAME_SYMBOL_COMMAND};
pub use fs::{FileSystem, LocalFileSystem};
pub use server::RefactorServer;
pub use terminal::TerminalEditor;
