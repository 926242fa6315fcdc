use anyhow::Result;
use lsp_types::{FormattingOptions, Url, WorkspaceEdit};
use serde_json::Value;

use crate::model::entities::{Document, PickItem};

/// Host command that starts an interactive rename at `[uri, position]`
pub const RENAME_SYMBOL_COMMAND: &str = "editor.action.rename";

/// The host editor as seen by the refactoring flows
#[async_trait::async_trait]
pub trait Editor: Send + Sync {
    /// Open a document; `None` when the host has no document for the URI
    async fn open_document(&self, uri: &Url) -> Result<Option<Document>>;

    /// Bring an opened document to the front
    async fn show_document(&self, document: &Document) -> Result<()>;

    /// Apply a workspace edit; `false` when the host rejected it
    async fn apply_edit(&self, edit: &WorkspaceEdit) -> Result<bool>;

    /// Persist an opened document to disk
    async fn save_document(&self, uri: &Url) -> Result<bool>;

    async fn show_error(&self, message: &str);

    async fn show_warning(&self, message: &str);

    /// Show a single-choice picker; `None` when the user dismissed it
    async fn show_quick_pick(&self, items: &[PickItem], placeholder: &str) -> Result<Option<usize>>;

    /// Run a named host command
    async fn execute_command(&self, command: &str, arguments: Vec<Value>) -> Result<Option<Value>>;

    /// Formatting options of the active editor; `None` when no editor is active
    fn formatting_options(&self) -> Option<FormattingOptions>;

    /// Workspace-relative path of a URI, if it lies inside the workspace
    fn as_relative_path(&self, uri: &Url) -> Option<String>;
}
