//! Data models exchanged with the language server and the host editor.
//!
//! `types` holds the request/response shapes of the refactoring extension
//! requests; `entities` holds the values the flows hand to and receive from
//! the host (picker rows, opened documents, flow outcomes).

pub mod entities;
pub mod types;

pub use entities::{ClassDestination, Document, MoveDestination, Outcome, PackageNode, PickItem};
pub use types::{
    CommandInfo, GetRefactorEditParams, MoveDestinationsResponse, MoveKind, MoveParams, RefactorKind,
    RefactorWorkspaceEdit, RenamePosition, SearchSymbolParams,
};
