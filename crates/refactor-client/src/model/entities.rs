use lsp_types::{Position, SymbolInformation, Url};
use serde::{Deserialize, Serialize};

use crate::utils::position::{offset_to_position, position_to_offset};

/// A package the server offers as a destination for moved files or types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageNode {
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default)]
    pub is_default_package: bool,
    #[serde(default)]
    pub is_parent_of_selected_file: bool,
}

/// A field or parameter whose type can receive a moved instance method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDestination {
    pub binding_key: String,
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub is_field: bool,
    #[serde(default)]
    pub is_selected: bool,
}

/// A move target as reported by the server.
///
/// The shape depends on the move kind that was queried, so the variants are
/// told apart by their required fields. A destination is sent back to the
/// server exactly as it was received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MoveDestination {
    Package(PackageNode),
    Class(ClassDestination),
    Symbol(SymbolInformation),
}

impl MoveDestination {
    pub fn display_name(&self) -> &str {
        match self {
            MoveDestination::Package(node) => &node.display_name,
            MoveDestination::Class(class) => &class.name,
            MoveDestination::Symbol(symbol) => &symbol.name,
        }
    }
}

/// One row of a single-choice picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickItem {
    pub label: String,
    pub description: Option<String>,
    pub detail: Option<String>,
}

impl PickItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
            detail: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// An opened document as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub uri: Url,
    pub text: String,
}

impl Document {
    pub fn new(uri: Url, text: impl Into<String>) -> Self {
        Self { uri, text: text.into() }
    }

    pub fn position_at(&self, offset: u32) -> Position {
        offset_to_position(&self.text, offset)
    }

    pub fn offset_at(&self, position: Position) -> u32 {
        position_to_offset(&self.text, position)
    }
}

/// How a refactoring flow ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// An edit was applied or a follow-up command ran
    Applied,
    /// The user dismissed a picker
    Cancelled,
    /// The flow had nothing to do (empty server result, every file skipped)
    NothingToDo,
}
