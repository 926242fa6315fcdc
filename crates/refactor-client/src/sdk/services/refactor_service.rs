use lsp_types::{CodeActionParams, Url};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::edit_service::EditApplier;
use super::move_service::MoveService;
use crate::error::RefactorError;
use crate::host::{Editor, FileSystem, RENAME_SYMBOL_COMMAND, RefactorServer};
use crate::model::entities::{Outcome, PickItem};
use crate::model::types::{CommandInfo, GetRefactorEditParams, RefactorKind, RenamePosition};

const NEW_FILE_DESTINATION: &str = "newFile";
const PACKAGE_DESTINATION: &str = "package";
const CLASS_DESTINATION: &str = "class";

/// Service for the apply-refactoring command and the rename trigger
#[derive(Clone)]
pub struct RefactorService {
    server: Arc<dyn RefactorServer>,
    editor: Arc<dyn Editor>,
    applier: EditApplier,
    moves: MoveService,
}

impl RefactorService {
    pub fn new(server: Arc<dyn RefactorServer>, editor: Arc<dyn Editor>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            applier: EditApplier::new(editor.clone()),
            moves: MoveService::new(server.clone(), editor.clone(), fs),
            server,
            editor,
        }
    }

    pub fn moves(&self) -> &MoveService {
        &self.moves
    }

    /// Run a refactoring offered by a server code action.
    ///
    /// # Arguments
    /// * `kind` - Refactoring identifier, e.g. `extractMethod`
    /// * `params` - The code action context the refactoring applies to
    /// * `info` - Auxiliary information attached to the code action
    pub async fn apply_refactoring(
        &self,
        kind: &str,
        params: Value,
        info: Option<CommandInfo>,
    ) -> Result<Outcome, RefactorError> {
        let kind: RefactorKind = kind
            .parse()
            .map_err(|_| RefactorError::UnsupportedRefactoring(kind.to_string()))?;
        let info = info.unwrap_or_default();
        debug!("Applying refactoring {}", kind);

        if kind == RefactorKind::MoveFile {
            let uri = info
                .uri
                .as_deref()
                .ok_or_else(|| RefactorError::InvalidArguments(format!("{} requires a document uri", kind)))?;
            let uri = Url::parse(uri).map_err(|e| RefactorError::InvalidArguments(format!("{}: {}", uri, e)))?;
            return self.moves.move_file(vec![uri]).await;
        }

        let params: CodeActionParams = serde_json::from_value(params)?;
        match kind {
            RefactorKind::MoveInstanceMethod => self.moves.move_instance_method(params, &info).await,
            RefactorKind::MoveStaticMember => self.moves.move_static_member(params, &info).await,
            RefactorKind::MoveType => self.move_type(params, &info).await,
            _ => self.compute_and_apply(kind, params, &info).await,
        }
    }

    /// Move a type to a new file, another package or another class
    pub async fn move_type(&self, params: CodeActionParams, info: &CommandInfo) -> Result<Outcome, RefactorError> {
        let options: Vec<(&str, PickItem)> = info
            .supported_destination_kinds
            .iter()
            .flatten()
            .filter_map(|kind| match kind.as_str() {
                NEW_FILE_DESTINATION => Some((NEW_FILE_DESTINATION, PickItem::new("Move type to new file"))),
                PACKAGE_DESTINATION => Some((PACKAGE_DESTINATION, PickItem::new("Move type to another package"))),
                CLASS_DESTINATION => Some((CLASS_DESTINATION, PickItem::new("Move type to another class"))),
                other => {
                    debug!("Ignoring unknown destination kind {}", other);
                    None
                },
            })
            .collect();
        if options.is_empty() {
            debug!("No destination kinds offered for type {}", info.display_name());
            return Ok(Outcome::NothingToDo);
        }

        let items: Vec<PickItem> = options.iter().map(|(_, item)| item.clone()).collect();
        let Some(index) = self.pick(&items, "What would you like to do?").await? else {
            return Ok(Outcome::Cancelled);
        };

        match options[index].0 {
            NEW_FILE_DESTINATION => self.compute_and_apply(RefactorKind::MoveTypeToNewFile, params, info).await,
            PACKAGE_DESTINATION => self.moves.move_type_to_package(params, info).await,
            _ => self.moves.move_type_to_class(params, info).await,
        }
    }

    /// Start an interactive rename at a character offset.
    ///
    /// Any failure along the way is logged and otherwise ignored.
    pub async fn trigger_rename(&self, position: RenamePosition) {
        if let Err(e) = self.try_trigger_rename(&position).await {
            debug!("Rename at {}:{} not started: {:#}", position.uri, position.offset, e);
        }
    }

    async fn try_trigger_rename(&self, position: &RenamePosition) -> anyhow::Result<()> {
        let uri = Url::parse(&position.uri)?;
        let Some(document) = self.editor.open_document(&uri).await? else {
            anyhow::bail!("document is not available");
        };
        self.editor.show_document(&document).await?;

        let at = document.position_at(position.offset);
        self.editor
            .execute_command(
                RENAME_SYMBOL_COMMAND,
                vec![Value::String(uri.to_string()), serde_json::to_value(at)?],
            )
            .await?;
        Ok(())
    }

    /// Ask the server for a refactoring edit and apply it
    async fn compute_and_apply(
        &self,
        kind: RefactorKind,
        context: CodeActionParams,
        info: &CommandInfo,
    ) -> Result<Outcome, RefactorError> {
        let options = self.editor.formatting_options().ok_or(RefactorError::NoActiveEditor)?;

        let mut command_arguments = Vec::new();
        if kind.needs_initialization_scope() {
            match info.initialized_scopes.as_deref().unwrap_or_default() {
                [] => {},
                [scope] => command_arguments.push(Value::String(scope.clone())),
                scopes => {
                    let items: Vec<PickItem> = scopes.iter().map(PickItem::new).collect();
                    let Some(index) = self.pick(&items, "Initialize the field in").await? else {
                        return Ok(Outcome::Cancelled);
                    };
                    command_arguments.push(Value::String(scopes[index].clone()));
                },
            }
        }

        let result = self
            .server
            .get_refactor_edit(GetRefactorEditParams {
                command: kind,
                context,
                options,
                command_arguments,
            })
            .await
            .map_err(RefactorError::Transport)?;
        self.applier.apply(result).await
    }

    async fn pick(&self, items: &[PickItem], placeholder: &str) -> Result<Option<usize>, RefactorError> {
        let selection = self
            .editor
            .show_quick_pick(items, placeholder)
            .await
            .map_err(RefactorError::Editor)?;
        Ok(selection.filter(|index| *index < items.len()))
    }
}
