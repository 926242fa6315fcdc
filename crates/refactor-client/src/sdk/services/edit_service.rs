use lsp_types::{DocumentChangeOperation, DocumentChanges, ResourceOp, Url, WorkspaceEdit};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::RefactorError;
use crate::host::Editor;
use crate::model::entities::Outcome;
use crate::model::types::RefactorWorkspaceEdit;

/// Applies refactoring results returned by the server to the host editor
#[derive(Clone)]
pub struct EditApplier {
    editor: Arc<dyn Editor>,
}

impl EditApplier {
    pub fn new(editor: Arc<dyn Editor>) -> Self {
        Self { editor }
    }

    /// Apply a refactoring result.
    ///
    /// An error message is shown verbatim and nothing else happens. Otherwise
    /// the edit is applied, then the follow-up command runs.
    pub async fn apply(&self, result: Option<RefactorWorkspaceEdit>) -> Result<Outcome, RefactorError> {
        self.apply_result(result, false).await
    }

    /// Like [`EditApplier::apply`], saving the touched documents once the edit
    /// is applied and before the follow-up command runs
    pub async fn apply_and_save(&self, result: Option<RefactorWorkspaceEdit>) -> Result<Outcome, RefactorError> {
        self.apply_result(result, true).await
    }

    async fn apply_result(&self, result: Option<RefactorWorkspaceEdit>, save: bool) -> Result<Outcome, RefactorError> {
        let Some(result) = result else {
            debug!("Server returned no refactoring result");
            return Ok(Outcome::NothingToDo);
        };

        if let Some(message) = result.error_message {
            self.editor.show_error(&message).await;
            return Err(RefactorError::Server(message));
        }

        let mut outcome = Outcome::NothingToDo;

        if let Some(edit) = &result.edit {
            let applied = self.editor.apply_edit(edit).await.map_err(RefactorError::Editor)?;
            if !applied {
                return Err(RefactorError::Editor(anyhow::anyhow!("The editor rejected the edit")));
            }
            outcome = Outcome::Applied;

            if save {
                let saved = self.save_touched(edit).await;
                debug!("Saved {} documents", saved.len());
            }
        }

        if let Some(command) = result.command {
            debug!("Running follow-up command {}", command.command);
            self.editor
                .execute_command(&command.command, command.arguments.unwrap_or_default())
                .await
                .map_err(RefactorError::Editor)?;
            outcome = Outcome::Applied;
        }

        Ok(outcome)
    }

    /// Save every document an applied edit touched, identified by its final URI.
    ///
    /// Documents are saved one after another. A document the editor cannot
    /// open is skipped, and a failed save does not stop the remaining ones.
    ///
    /// # Returns
    /// * `Vec<Url>` - The documents that were saved
    pub async fn save_touched(&self, edit: &WorkspaceEdit) -> Vec<Url> {
        let mut saved = Vec::new();

        for uri in touched_documents(edit) {
            match self.editor.open_document(&uri).await {
                Ok(Some(_)) => {},
                Ok(None) => {
                    debug!("Skipping save of {}: not open", uri);
                    continue;
                },
                Err(e) => {
                    warn!("Skipping save of {}: {:#}", uri, e);
                    continue;
                },
            }

            match self.editor.save_document(&uri).await {
                Ok(true) => saved.push(uri),
                Ok(false) => warn!("Editor declined to save {}", uri),
                Err(e) => warn!("Failed to save {}: {:#}", uri, e),
            }
        }

        saved
    }
}

/// Documents a workspace edit leaves behind, by their identity after the edit.
///
/// Text edits and created files add their document, a rename replaces the
/// old URI with the new one, and a delete removes its URI. Documents appear
/// in the order they were first touched; `changes` entries come first,
/// ordered by URI.
pub fn touched_documents(edit: &WorkspaceEdit) -> Vec<Url> {
    fn touch(touched: &mut Vec<Url>, uri: &Url) {
        if !touched.contains(uri) {
            touched.push(uri.clone());
        }
    }

    let mut touched: Vec<Url> = Vec::new();

    if let Some(changes) = &edit.changes {
        let mut uris: Vec<&Url> = changes.keys().collect();
        uris.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        for uri in uris {
            touch(&mut touched, uri);
        }
    }

    match &edit.document_changes {
        Some(DocumentChanges::Edits(edits)) => {
            for edit in edits {
                touch(&mut touched, &edit.text_document.uri);
            }
        },
        Some(DocumentChanges::Operations(operations)) => {
            for operation in operations {
                match operation {
                    DocumentChangeOperation::Edit(edit) => touch(&mut touched, &edit.text_document.uri),
                    DocumentChangeOperation::Op(ResourceOp::Create(create)) => touch(&mut touched, &create.uri),
                    DocumentChangeOperation::Op(ResourceOp::Rename(rename)) => {
                        touched.retain(|uri| uri != &rename.old_uri);
                        touch(&mut touched, &rename.new_uri);
                    },
                    DocumentChangeOperation::Op(ResourceOp::Delete(delete)) => {
                        touched.retain(|uri| uri != &delete.uri);
                    },
                }
            }
        },
        None => {},
    }

    touched
}
