use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use lsp_types::{
    ExecuteCommandParams, FormattingOptions, Position, RenameParams, TextDocumentIdentifier,
    TextDocumentPositionParams, Url, WorkspaceEdit,
};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::editor::{Editor, RENAME_SYMBOL_COMMAND};
use crate::config::FormattingConfig;
use crate::lsp::LspClient;
use crate::model::entities::{Document, PickItem};
use crate::model::types::RenamePosition;
use crate::sdk::commands::RENAME_COMMAND;

/// How the terminal host carries out a named command
#[derive(Debug, Clone, PartialEq)]
enum HostCommand {
    /// `editor.action.rename` with `[uri, position]`
    Rename { uri: Url, position: Position },
    /// `java.action.rename` with `[{uri, offset}]`, the follow-up of extract refactorings
    RenameAtOffset(RenamePosition),
    /// Anything else runs on the language server
    Server,
}

impl HostCommand {
    fn parse(command: &str, arguments: &[Value]) -> Result<Self> {
        match command {
            RENAME_SYMBOL_COMMAND => match arguments {
                [uri, position, ..] => Ok(HostCommand::Rename {
                    uri: serde_json::from_value(uri.clone())?,
                    position: serde_json::from_value(position.clone())?,
                }),
                _ => anyhow::bail!("{} expects a document URI and a position", RENAME_SYMBOL_COMMAND),
            },
            RENAME_COMMAND => match arguments.first() {
                Some(position) => Ok(HostCommand::RenameAtOffset(serde_json::from_value(position.clone())?)),
                None => anyhow::bail!("{} expects a rename position", RENAME_COMMAND),
            },
            _ => Ok(HostCommand::Server),
        }
    }
}

/// A headless host for the command line.
///
/// Documents are the files on disk, edits are written straight to disk (so
/// saving has nothing left to do), messages go to stderr and pickers are
/// terminal prompts.
pub struct TerminalEditor {
    client: Arc<LspClient>,
    workspace_root: PathBuf,
    formatting: FormattingConfig,
}

impl TerminalEditor {
    pub fn new(client: Arc<LspClient>, workspace_root: PathBuf, formatting: FormattingConfig) -> Self {
        Self {
            client,
            workspace_root,
            formatting,
        }
    }

    /// Prompt for a new name and rename the symbol at `position` through the server
    async fn rename_interactively(&self, uri: Url, position: Position) -> Result<Option<Value>> {
        let new_name = tokio::task::spawn_blocking(|| {
            Input::<String>::with_theme(&ColorfulTheme::default())
                .with_prompt("New name")
                .allow_empty(true)
                .interact_text()
        })
        .await??;
        if new_name.trim().is_empty() {
            return Ok(None);
        }

        let params = RenameParams {
            text_document_position: TextDocumentPositionParams {
                text_document: TextDocumentIdentifier { uri },
                position,
            },
            new_name: new_name.trim().to_string(),
            work_done_progress_params: Default::default(),
        };
        if let Some(edit) = self.client.rename(params).await? {
            self.apply_edit(&edit).await?;
        }
        Ok(None)
    }

    async fn rename_at_offset(&self, target: &RenamePosition) -> Result<Option<Value>> {
        let uri = Url::parse(&target.uri)?;
        let Some(document) = self.open_document(&uri).await? else {
            anyhow::bail!("document is not available");
        };
        let position = document.position_at(target.offset);
        self.rename_interactively(uri, position).await
    }
}

#[async_trait::async_trait]
impl Editor for TerminalEditor {
    async fn open_document(&self, uri: &Url) -> Result<Option<Document>> {
        let Ok(path) = uri.to_file_path() else {
            return Ok(None);
        };
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(Document::new(uri.clone(), text))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(anyhow::anyhow!("Failed to open {}: {}", path.display(), e)),
        }
    }

    async fn show_document(&self, document: &Document) -> Result<()> {
        debug!("Showing {}", document.uri);
        Ok(())
    }

    async fn apply_edit(&self, edit: &WorkspaceEdit) -> Result<bool> {
        let edit = edit.clone();
        let applied = tokio::task::spawn_blocking(move || crate::utils::apply_workspace_edit(&edit)).await??;
        debug!("Applied {} file changes", applied);
        Ok(true)
    }

    async fn save_document(&self, uri: &Url) -> Result<bool> {
        // Edits are already on disk
        Ok(uri.to_file_path().map(|path| path.exists()).unwrap_or(false))
    }

    async fn show_error(&self, message: &str) {
        error!("{}", message);
        eprintln!("error: {}", message);
    }

    async fn show_warning(&self, message: &str) {
        warn!("{}", message);
        eprintln!("warning: {}", message);
    }

    async fn show_quick_pick(&self, items: &[PickItem], placeholder: &str) -> Result<Option<usize>> {
        let labels: Vec<String> = items
            .iter()
            .map(|item| match &item.description {
                Some(description) => format!("{}  ({})", item.label, description),
                None => item.label.clone(),
            })
            .collect();
        let prompt = placeholder.to_string();

        let selection = tokio::task::spawn_blocking(move || {
            Select::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt)
                .items(&labels)
                .default(0)
                .interact_opt()
        })
        .await?;

        match selection {
            Ok(selection) => Ok(selection),
            // Ctrl-C -> Err(Interrupted)
            Err(dialoguer::Error::IO(ref e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(anyhow::anyhow!("Failed to show picker: {}", e)),
        }
    }

    async fn execute_command(&self, command: &str, arguments: Vec<Value>) -> Result<Option<Value>> {
        match HostCommand::parse(command, &arguments)? {
            HostCommand::Rename { uri, position } => return self.rename_interactively(uri, position).await,
            HostCommand::RenameAtOffset(target) => {
                // Same contract as the rename trigger: failures only reach the log
                if let Err(e) = self.rename_at_offset(&target).await {
                    debug!("Rename at {}:{} not started: {:#}", target.uri, target.offset, e);
                }
                return Ok(None);
            },
            HostCommand::Server => {},
        }
        debug!("Forwarding {} to the language server", command);
        self.client
            .execute_command(ExecuteCommandParams {
                command: command.to_string(),
                arguments,
                work_done_progress_params: Default::default(),
            })
            .await
    }

    fn formatting_options(&self) -> Option<FormattingOptions> {
        Some(self.formatting.to_formatting_options())
    }

    fn as_relative_path(&self, uri: &Url) -> Option<String> {
        let path = uri.to_file_path().ok()?;
        path.strip_prefix(&self.workspace_root)
            .ok()
            .map(|relative| relative.display().to_string())
    }
}
