use anyhow::{Context, Result};
use lsp_types::{
    CreateFile, DeleteFile, DocumentChangeOperation, DocumentChanges, OneOf, RenameFile, ResourceOp,
    TextDocumentEdit, TextEdit, Url, WorkspaceEdit,
};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::position::locate;

/// Applies a workspace edit directly to files on disk.
///
/// Handles both the `changes` map and `document_changes`, including create,
/// rename and delete resource operations, in the order the edit lists them.
/// Every change is attempted; failures are collected and reported together.
///
/// # Returns
/// * `Result<usize>` - Number of file changes that were applied
///
/// # Errors
/// Returns an error naming every file whose change could not be applied.
///
/// # Examples
/// ```no_run
/// use refactor_client::utils::apply_workspace_edit;
/// use lsp_types::WorkspaceEdit;
///
/// let applied = apply_workspace_edit(&WorkspaceEdit::default()).unwrap();
/// assert_eq!(applied, 0);
/// ```
pub fn apply_workspace_edit(workspace_edit: &WorkspaceEdit) -> Result<usize> {
    let mut applied = 0;
    let mut failed_files: Vec<(String, String)> = Vec::new();

    let mut record = |target: &Url, result: Result<()>| match result {
        Ok(()) => applied += 1,
        Err(e) => failed_files.push((target.to_string(), format!("{:#}", e))),
    };

    if let Some(changes) = &workspace_edit.changes {
        for (uri, edits) in changes {
            record(uri, to_path(uri).and_then(|path| apply_text_edits(&path, edits)));
        }
    }

    match &workspace_edit.document_changes {
        Some(DocumentChanges::Edits(edits)) => {
            for edit in edits {
                record(&edit.text_document.uri, apply_text_document_edit(edit));
            }
        },
        Some(DocumentChanges::Operations(operations)) => {
            for operation in operations {
                match operation {
                    DocumentChangeOperation::Edit(edit) => {
                        record(&edit.text_document.uri, apply_text_document_edit(edit));
                    },
                    DocumentChangeOperation::Op(ResourceOp::Create(create)) => {
                        record(&create.uri, create_file(create));
                    },
                    DocumentChangeOperation::Op(ResourceOp::Rename(rename)) => {
                        record(&rename.old_uri, rename_file(rename));
                    },
                    DocumentChangeOperation::Op(ResourceOp::Delete(delete)) => {
                        record(&delete.uri, delete_file(delete));
                    },
                }
            }
        },
        None => {},
    }

    if !failed_files.is_empty() {
        let error_msg = failed_files
            .iter()
            .map(|(target, error)| format!("{}: {}", target, error))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(anyhow::anyhow!(
            "Failed to apply edits to {} files: {}",
            failed_files.len(),
            error_msg
        ));
    }

    Ok(applied)
}

/// Applies a series of text edits to a file.
///
/// All ranges are resolved against the original content, then the edits are
/// applied from the end of the file backwards so earlier offsets stay valid.
/// Edits starting at the same position keep their listed order.
///
/// # Errors
/// Returns an error if the file cannot be read or written.
pub fn apply_text_edits(file_path: &Path, edits: &[TextEdit]) -> Result<()> {
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read {}", file_path.display()))?;

    let updated = apply_edits_to_text(&content, edits);
    std::fs::write(file_path, updated).with_context(|| format!("Failed to write {}", file_path.display()))?;
    debug!("Applied {} text edits to {}", edits.len(), file_path.display());

    Ok(())
}

fn apply_edits_to_text(content: &str, edits: &[TextEdit]) -> String {
    let mut resolved: Vec<(usize, usize, &str)> = edits
        .iter()
        .map(|edit| {
            let start = locate(content, edit.range.start).byte;
            let end = locate(content, edit.range.end).byte.max(start);
            (start, end, edit.new_text.as_str())
        })
        .collect();
    // Stable sort, then walk backwards: same-start inserts end up in listed order
    resolved.sort_by_key(|(start, _, _)| *start);

    let mut updated = content.to_string();
    for (start, end, new_text) in resolved.into_iter().rev() {
        updated.replace_range(start..end, new_text);
    }
    updated
}

fn apply_text_document_edit(edit: &TextDocumentEdit) -> Result<()> {
    let path = to_path(&edit.text_document.uri)?;
    let edits: Vec<TextEdit> = edit
        .edits
        .iter()
        .map(|edit| match edit {
            OneOf::Left(edit) => edit.clone(),
            OneOf::Right(annotated) => annotated.text_edit.clone(),
        })
        .collect();
    apply_text_edits(&path, &edits)
}

fn create_file(create: &CreateFile) -> Result<()> {
    let path = to_path(&create.uri)?;
    let overwrite = create.options.as_ref().and_then(|o| o.overwrite).unwrap_or(false);
    let ignore_if_exists = create.options.as_ref().and_then(|o| o.ignore_if_exists).unwrap_or(false);

    if path.exists() && !overwrite {
        if ignore_if_exists {
            return Ok(());
        }
        anyhow::bail!("File already exists");
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, "")?;
    Ok(())
}

fn rename_file(rename: &RenameFile) -> Result<()> {
    let from = to_path(&rename.old_uri)?;
    let to = to_path(&rename.new_uri)?;
    let overwrite = rename.options.as_ref().and_then(|o| o.overwrite).unwrap_or(false);
    let ignore_if_exists = rename.options.as_ref().and_then(|o| o.ignore_if_exists).unwrap_or(false);

    if to.exists() && !overwrite {
        if ignore_if_exists {
            return Ok(());
        }
        anyhow::bail!("Target {} already exists", to.display());
    }
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::rename(&from, &to)?;
    debug!("Renamed {} to {}", from.display(), to.display());
    Ok(())
}

fn delete_file(delete: &DeleteFile) -> Result<()> {
    let path = to_path(&delete.uri)?;
    let recursive = delete.options.as_ref().and_then(|o| o.recursive).unwrap_or(false);
    let ignore_if_not_exists = delete.options.as_ref().and_then(|o| o.ignore_if_not_exists).unwrap_or(false);

    if !path.exists() {
        if ignore_if_not_exists {
            return Ok(());
        }
        anyhow::bail!("File does not exist");
    }
    if path.is_dir() {
        if recursive {
            std::fs::remove_dir_all(&path)?;
        } else {
            std::fs::remove_dir(&path)?;
        }
    } else {
        std::fs::remove_file(&path)?;
    }
    Ok(())
}

fn to_path(uri: &Url) -> Result<PathBuf> {
    uri.to_file_path()
        .map_err(|_| anyhow::anyhow!("Not a file URI: {}", uri))
}
