use lsp_types::{CodeActionParams, SymbolInformation, SymbolKind, Url};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use super::edit_service::EditApplier;
use crate::error::{RefactorError, DIFFERENT_DIRECTORIES_MESSAGE};
use crate::host::{Editor, FileSystem, RefactorServer};
use crate::model::entities::{ClassDestination, MoveDestination, Outcome, PackageNode, PickItem};
use crate::model::types::{CommandInfo, MoveDestinationsResponse, MoveKind, MoveParams, SearchSymbolParams};
use crate::utils::{file_name, has_common_parent};

pub const NO_PACKAGES_MESSAGE: &str = "Cannot find available Java packages to move the selected files to.";
pub const NO_CLASS_TARGETS_MESSAGE: &str = "Cannot find possible class targets to move the selected method to.";
pub const NO_CLASSES_MESSAGE: &str = "Cannot find available Java classes to move the selected member to.";

/// Wildcard query matching every workspace symbol
const ALL_SYMBOLS_QUERY: &str = "*";

/// Move refactorings: files, instance methods, static members and types
#[derive(Clone)]
pub struct MoveService {
    server: Arc<dyn RefactorServer>,
    editor: Arc<dyn Editor>,
    fs: Arc<dyn FileSystem>,
    applier: EditApplier,
}

impl MoveService {
    pub fn new(server: Arc<dyn RefactorServer>, editor: Arc<dyn Editor>, fs: Arc<dyn FileSystem>) -> Self {
        let applier = EditApplier::new(editor.clone());
        Self {
            server,
            editor,
            fs,
            applier,
        }
    }

    /// Move files to another package.
    ///
    /// The files must share one directory. Files whose name already exists in
    /// the chosen package are left out of the move with a warning. Every
    /// document the resulting edit touched is saved afterwards.
    pub async fn move_file(&self, uris: Vec<Url>) -> Result<Outcome, RefactorError> {
        if !has_common_parent(&uris) {
            self.editor.show_error(DIFFERENT_DIRECTORIES_MESSAGE).await;
            return Err(RefactorError::DifferentDirectories);
        }

        let query = MoveParams::destinations(MoveKind::MoveResource, to_strings(&uris), None);
        let placeholder = match uris.as_slice() {
            [single] => format!(
                "Choose the target package for {}.",
                file_name(single).unwrap_or_else(|| single.to_string())
            ),
            _ => format!("Choose the target package for {} selected files.", uris.len()),
        };
        let Some(package) = self.pick_package(query, &placeholder).await? else {
            return Ok(Outcome::Cancelled);
        };

        let mut moving = uris;
        if let Some(target_dir) = package
            .uri
            .as_deref()
            .and_then(|uri| Url::parse(uri).ok())
            .and_then(|uri| uri.to_file_path().ok())
        {
            let mut duplicated = Vec::new();
            moving.retain(|uri| match file_name(uri) {
                Some(name) if self.fs.exists(&target_dir.join(&name)) => {
                    duplicated.push(name);
                    false
                },
                _ => true,
            });

            if !duplicated.is_empty() {
                self.editor
                    .show_warning(&format!(
                        "The files '{}' already exist in the package '{}'. The move operation will ignore them.",
                        duplicated.join(","),
                        package.display_name
                    ))
                    .await;
            }
            if moving.is_empty() {
                return Ok(Outcome::NothingToDo);
            }
        } else {
            debug!(
                "Package {} has no file location, skipping the collision check",
                package.display_name
            );
        }

        let params = MoveParams::destinations(MoveKind::MoveResource, to_strings(&moving), None)
            .to(MoveDestination::Package(package))
            .updating_references();
        let result = self.server.move_element(params).await.map_err(RefactorError::Transport)?;
        self.applier.apply_and_save(result).await
    }

    /// Move the type at the code action's selection to another package,
    /// saving the documents the move touched
    pub async fn move_type_to_package(&self, params: CodeActionParams, info: &CommandInfo) -> Result<Outcome, RefactorError> {
        let sources = vec![params.text_document.uri.to_string()];
        let query = MoveParams::destinations(MoveKind::MoveResource, sources, Some(params));
        let placeholder = format!("Choose the target package for the type {}.", info.display_name());
        let Some(package) = self.pick_package(query.clone(), &placeholder).await? else {
            return Ok(Outcome::Cancelled);
        };

        let params = query.to(MoveDestination::Package(package)).updating_references();
        let result = self.server.move_element(params).await.map_err(RefactorError::Transport)?;
        self.applier.apply_and_save(result).await
    }

    /// Move an instance method to the type of one of its fields or parameters
    pub async fn move_instance_method(&self, params: CodeActionParams, info: &CommandInfo) -> Result<Outcome, RefactorError> {
        let sources = vec![params.text_document.uri.to_string()];
        let query = MoveParams::destinations(MoveKind::MoveInstanceMethod, sources, Some(params));
        let response = self
            .server
            .get_move_destinations(query.clone())
            .await
            .map_err(RefactorError::Transport)?;

        let targets: Vec<ClassDestination> = self
            .destinations_or_report(response, NO_CLASS_TARGETS_MESSAGE)
            .await?
            .into_iter()
            .filter_map(|destination| match destination {
                MoveDestination::Class(class) => Some(class),
                _ => None,
            })
            .collect();
        if targets.is_empty() {
            return self.report_no_destinations(NO_CLASS_TARGETS_MESSAGE).await;
        }

        let items: Vec<PickItem> = targets
            .iter()
            .map(|target| {
                PickItem::new(format!("{} {}", target.type_name, target.name))
                    .with_description(if target.is_field { "Field" } else { "Method Parameter" })
            })
            .collect();
        let placeholder = format!("Select the new class for the instance method {}.", info.display_name());
        let Some(index) = self.pick(&items, &placeholder).await? else {
            return Ok(Outcome::Cancelled);
        };

        let params = query.to(MoveDestination::Class(targets[index].clone()));
        let result = self.server.move_element(params).await.map_err(RefactorError::Transport)?;
        self.applier.apply(result).await
    }

    /// Move a static member (or a member type) to another class
    pub async fn move_static_member(&self, params: CodeActionParams, info: &CommandInfo) -> Result<Outcome, RefactorError> {
        let placeholder = if info.is_type_declaration() {
            format!("Select the new class for the type {}.", info.display_name())
        } else {
            format!("Select the new class for the static member {}.", info.display_name())
        };

        let Some(target) = self
            .select_target_class(&placeholder, &excluded_targets(info), info.project_name.clone())
            .await?
        else {
            return Ok(Outcome::Cancelled);
        };

        let sources = vec![params.text_document.uri.to_string()];
        let params = MoveParams::destinations(MoveKind::MoveStaticMember, sources, Some(params))
            .to(MoveDestination::Symbol(target));
        let result = self.server.move_element(params).await.map_err(RefactorError::Transport)?;
        self.applier.apply(result).await
    }

    /// Move the type at the code action's selection into another class
    pub async fn move_type_to_class(&self, params: CodeActionParams, info: &CommandInfo) -> Result<Outcome, RefactorError> {
        let placeholder = format!("Select the new class for the type {}.", info.display_name());
        let mut excludes = excluded_targets(info);
        let name = info.display_name();
        if !name.is_empty() {
            // A type cannot move into itself
            excludes.insert(match &info.enclosing_type_name {
                Some(enclosing) => format!("{}.{}", enclosing, name),
                None => name.to_string(),
            });
        }

        let Some(target) = self
            .select_target_class(&placeholder, &excludes, info.project_name.clone())
            .await?
        else {
            return Ok(Outcome::Cancelled);
        };

        let sources = vec![params.text_document.uri.to_string()];
        let params = MoveParams::destinations(MoveKind::MoveTypeToClass, sources, Some(params))
            .to(MoveDestination::Symbol(target));
        let result = self.server.move_element(params).await.map_err(RefactorError::Transport)?;
        self.applier.apply(result).await
    }

    /// Let the user choose a class, interface or enum from the workspace.
    ///
    /// `excludes` holds qualified names (`container.Name`) that are not offered.
    pub async fn select_target_class(
        &self,
        placeholder: &str,
        excludes: &HashSet<String>,
        project_name: Option<String>,
    ) -> Result<Option<SymbolInformation>, RefactorError> {
        let symbols = self
            .server
            .search_symbols(SearchSymbolParams {
                query: ALL_SYMBOLS_QUERY.to_string(),
                project_name,
                max_results: None,
                source_only: Some(true),
            })
            .await
            .map_err(RefactorError::Transport)?;

        let candidates: Vec<SymbolInformation> = symbols
            .into_iter()
            .filter(|symbol| matches!(symbol.kind, SymbolKind::CLASS | SymbolKind::INTERFACE | SymbolKind::ENUM))
            .filter(|symbol| !excludes.contains(&qualified_name(symbol)))
            .collect();
        if candidates.is_empty() {
            return self.report_no_destinations(NO_CLASSES_MESSAGE).await;
        }

        let items: Vec<PickItem> = candidates
            .iter()
            .map(|symbol| {
                let item = PickItem::new(symbol.name.clone());
                match &symbol.container_name {
                    Some(container) => item.with_description(container.clone()),
                    None => item,
                }
            })
            .collect();

        Ok(self
            .pick(&items, placeholder)
            .await?
            .map(|index| candidates[index].clone()))
    }

    /// Ask the server for package destinations and let the user choose one
    async fn pick_package(&self, query: MoveParams, placeholder: &str) -> Result<Option<PackageNode>, RefactorError> {
        let response = self
            .server
            .get_move_destinations(query)
            .await
            .map_err(RefactorError::Transport)?;

        let packages: Vec<PackageNode> = self
            .destinations_or_report(response, NO_PACKAGES_MESSAGE)
            .await?
            .into_iter()
            .filter_map(|destination| match destination {
                MoveDestination::Package(package) => Some(package),
                _ => None,
            })
            .collect();
        if packages.is_empty() {
            return self.report_no_destinations(NO_PACKAGES_MESSAGE).await;
        }

        let items: Vec<PickItem> = packages.iter().map(|package| self.package_item(package)).collect();
        Ok(self
            .pick(&items, placeholder)
            .await?
            .map(|index| packages[index].clone()))
    }

    fn package_item(&self, package: &PackageNode) -> PickItem {
        let label = if package.is_parent_of_selected_file {
            format!("* {}", package.display_name)
        } else {
            package.display_name.clone()
        };
        let location = package
            .uri
            .as_deref()
            .and_then(|uri| Url::parse(uri).ok())
            .and_then(|uri| self.editor.as_relative_path(&uri))
            .or_else(|| package.path.clone())
            .or_else(|| package.uri.clone());

        match location {
            Some(location) => PickItem::new(label).with_description(location),
            None => PickItem::new(label),
        }
    }

    /// Unwrap a destinations response, reporting a server error or an empty list
    async fn destinations_or_report(
        &self,
        response: Option<MoveDestinationsResponse>,
        empty_message: &str,
    ) -> Result<Vec<MoveDestination>, RefactorError> {
        let response = response.unwrap_or_default();
        if let Some(message) = response.error_message {
            self.editor.show_error(&message).await;
            return Err(RefactorError::Server(message));
        }
        if response.destinations.is_empty() {
            return self.report_no_destinations(empty_message).await;
        }
        Ok(response.destinations)
    }

    async fn report_no_destinations<T>(&self, message: &str) -> Result<T, RefactorError> {
        self.editor.show_error(message).await;
        Err(RefactorError::NoDestinations(message.to_string()))
    }

    async fn pick(&self, items: &[PickItem], placeholder: &str) -> Result<Option<usize>, RefactorError> {
        let selection = self
            .editor
            .show_quick_pick(items, placeholder)
            .await
            .map_err(RefactorError::Editor)?;
        // An index the picker made up is treated like a dismissal
        Ok(selection.filter(|index| *index < items.len()))
    }
}

/// Qualified names a member must not be moved to: its enclosing type and,
/// for member types, the type itself
fn excluded_targets(info: &CommandInfo) -> HashSet<String> {
    let mut excludes = HashSet::new();
    if let Some(enclosing) = &info.enclosing_type_name {
        excludes.insert(enclosing.clone());
        if info.is_type_declaration() {
            excludes.insert(format!("{}.{}", enclosing, info.display_name()));
        }
    }
    excludes
}

fn qualified_name(symbol: &SymbolInformation) -> String {
    match symbol.container_name.as_deref() {
        Some(container) if !container.is_empty() => format!("{}.{}", container, symbol.name),
        _ => symbol.name.clone(),
    }
}

fn to_strings(uris: &[Url]) -> Vec<String> {
    uris.iter().map(Url::to_string).collect()
}
