use anyhow::Result;
use lsp_types::SymbolInformation;

use crate::model::types::{
    GetRefactorEditParams, MoveDestinationsResponse, MoveParams, RefactorWorkspaceEdit, SearchSymbolParams,
};

/// The refactoring requests a language server answers.
///
/// `None` means the server answered `null`.
#[async_trait::async_trait]
pub trait RefactorServer: Send + Sync {
    /// `java/getRefactorEdit`: compute the edit for a refactoring at a selection
    async fn get_refactor_edit(&self, params: GetRefactorEditParams) -> Result<Option<RefactorWorkspaceEdit>>;

    /// `java/getMoveDestinations`: candidate destinations for a move
    async fn get_move_destinations(&self, params: MoveParams) -> Result<Option<MoveDestinationsResponse>>;

    /// `java/move`: compute the edit moving the sources to the chosen destination
    async fn move_element(&self, params: MoveParams) -> Result<Option<RefactorWorkspaceEdit>>;

    /// `java/searchSymbols`: workspace symbols matching a query
    async fn search_symbols(&self, params: SearchSymbolParams) -> Result<Vec<SymbolInformation>>;
}
