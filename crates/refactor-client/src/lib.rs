//! Editor-side orchestration of server-driven refactorings.
//!
//! The language server computes every refactoring edit. This crate collects
//! the user's choices through the host editor, sends the requests, applies
//! the returned edits and saves what they touched.

pub mod config;
pub mod error;
pub mod host;
pub mod lsp;
pub mod model;
pub mod sdk;
pub mod utils;

pub use error::RefactorError;
pub use model::*;
pub use sdk::RefactorClientBuilder;
pub use sdk::client::RefactorClient;
pub use sdk::commands::{APPLY_REFACTORING_COMMAND, RENAME_COMMAND};
