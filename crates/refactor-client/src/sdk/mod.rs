//! # Refactoring SDK
//!
//! This module contains the client that runs server-driven refactorings
//! against a host editor. The language server computes every edit; the
//! client collects the user's choices, forwards requests and applies results.

pub mod client;
pub mod commands;
pub mod services;

use anyhow::Result;
use std::sync::Arc;

use crate::host::{Editor, FileSystem, LocalFileSystem, RefactorServer};
use crate::sdk::client::RefactorClient;
use crate::sdk::services::RefactorService;

/// **Builder for RefactorClient instances**
///
/// A server and an editor are required. The filesystem used for destination
/// collision checks defaults to the local disk.
#[derive(Default)]
pub struct RefactorClientBuilder {
    server: Option<Arc<dyn RefactorServer>>,
    editor: Option<Arc<dyn Editor>>,
    file_system: Option<Arc<dyn FileSystem>>,
}

impl RefactorClientBuilder {
    /// Create a new builder instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the language server refactoring requests go to
    pub fn server(mut self, server: Arc<dyn RefactorServer>) -> Self {
        self.server = Some(server);
        self
    }

    /// Set the host editor
    pub fn editor(mut self, editor: Arc<dyn Editor>) -> Self {
        self.editor = Some(editor);
        self
    }

    pub fn file_system(mut self, file_system: Arc<dyn FileSystem>) -> Self {
        self.file_system = Some(file_system);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<RefactorClient> {
        let server = self
            .server
            .ok_or_else(|| anyhow::anyhow!("A language server is required to build a RefactorClient"))?;
        let editor = self
            .editor
            .ok_or_else(|| anyhow::anyhow!("An editor is required to build a RefactorClient"))?;
        let file_system = self.file_system.unwrap_or_else(|| Arc::new(LocalFileSystem));

        Ok(RefactorClient::new(RefactorService::new(server, editor, file_system)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::{
        GetRefactorEditParams, MoveDestinationsResponse, MoveParams, RefactorWorkspaceEdit, SearchSymbolParams,
    };
    use lsp_types::SymbolInformation;

    struct NullServer;

    #[async_trait::async_trait]
    impl RefactorServer for NullServer {
        async fn get_refactor_edit(&self, _: GetRefactorEditParams) -> Result<Option<RefactorWorkspaceEdit>> {
            Ok(None)
        }

        async fn get_move_destinations(&self, _: MoveParams) -> Result<Option<MoveDestinationsResponse>> {
            Ok(None)
        }

        async fn move_element(&self, _: MoveParams) -> Result<Option<RefactorWorkspaceEdit>> {
            Ok(None)
        }

        async fn search_symbols(&self, _: SearchSymbolParams) -> Result<Vec<SymbolInformation>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_builder_default() {
        let builder = RefactorClientBuilder::default();
        assert!(builder.server.is_none());
        assert!(builder.editor.is_none());
        assert!(builder.file_system.is_none());
    }

    #[test]
    fn test_builder_requires_server() {
        let err = RefactorClientBuilder::new().build().unwrap_err();
        assert!(err.to_string().contains("language server"));
    }

    #[test]
    fn test_builder_requires_editor() {
        let err = RefactorClientBuilder::new().server(Arc::new(NullServer)).build().unwrap_err();
        assert!(err.to_string().contains("editor"));
    }
}
