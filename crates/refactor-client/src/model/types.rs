use lsp_types::{CodeActionParams, Command, FormattingOptions, WorkspaceEdit};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::entities::MoveDestination;

/// AST node codes the server reports in `CommandInfo::member_type` for type declarations.
const TYPE_DECLARATION: u32 = 55;
const ENUM_DECLARATION: u32 = 71;
const ANNOTATION_TYPE_DECLARATION: u32 = 81;

/// Refactoring identifiers, spelled the way the language server expects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RefactorKind {
    ExtractVariable,
    ExtractVariableAllOccurrence,
    ExtractConstant,
    ExtractMethod,
    ExtractField,
    AssignField,
    ConvertVariableToField,
    InvertVariable,
    IntroduceParameter,
    ConvertAnonymousClassToNestedCommand,
    MoveTypeToNewFile,
    MoveFile,
    MoveInstanceMethod,
    MoveStaticMember,
    MoveType,
}

impl RefactorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefactorKind::ExtractVariable => "extractVariable",
            RefactorKind::ExtractVariableAllOccurrence => "extractVariableAllOccurrence",
            RefactorKind::ExtractConstant => "extractConstant",
            RefactorKind::ExtractMethod => "extractMethod",
            RefactorKind::ExtractField => "extractField",
            RefactorKind::AssignField => "assignField",
            RefactorKind::ConvertVariableToField => "convertVariableToField",
            RefactorKind::InvertVariable => "invertVariable",
            RefactorKind::IntroduceParameter => "introduceParameter",
            RefactorKind::ConvertAnonymousClassToNestedCommand => "convertAnonymousClassToNestedCommand",
            RefactorKind::MoveTypeToNewFile => "moveTypeToNewFile",
            RefactorKind::MoveFile => "moveFile",
            RefactorKind::MoveInstanceMethod => "moveInstanceMethod",
            RefactorKind::MoveStaticMember => "moveStaticMember",
            RefactorKind::MoveType => "moveType",
        }
    }

    /// Kinds whose edit is computed in a single `java/getRefactorEdit` round trip
    pub fn is_edit_kind(&self) -> bool {
        !matches!(
            self,
            RefactorKind::MoveFile
                | RefactorKind::MoveInstanceMethod
                | RefactorKind::MoveStaticMember
                | RefactorKind::MoveType
        )
    }

    /// Kinds that introduce a field and may ask where it gets initialized
    pub fn needs_initialization_scope(&self) -> bool {
        matches!(self, RefactorKind::ExtractField | RefactorKind::ConvertVariableToField)
    }
}

impl fmt::Display for RefactorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RefactorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "extractVariable" => Ok(RefactorKind::ExtractVariable),
            "extractVariableAllOccurrence" => Ok(RefactorKind::ExtractVariableAllOccurrence),
            "extractConstant" => Ok(RefactorKind::ExtractConstant),
            "extractMethod" => Ok(RefactorKind::ExtractMethod),
            "extractField" => Ok(RefactorKind::ExtractField),
            "assignField" => Ok(RefactorKind::AssignField),
            "convertVariableToField" => Ok(RefactorKind::ConvertVariableToField),
            "invertVariable" => Ok(RefactorKind::InvertVariable),
            "introduceParameter" => Ok(RefactorKind::IntroduceParameter),
            "convertAnonymousClassToNestedCommand" => Ok(RefactorKind::ConvertAnonymousClassToNestedCommand),
            "moveTypeToNewFile" => Ok(RefactorKind::MoveTypeToNewFile),
            "moveFile" => Ok(RefactorKind::MoveFile),
            "moveInstanceMethod" => Ok(RefactorKind::MoveInstanceMethod),
            "moveStaticMember" => Ok(RefactorKind::MoveStaticMember),
            "moveType" => Ok(RefactorKind::MoveType),
            _ => Err(format!("Unknown refactoring: {}", s)),
        }
    }
}

/// Parameters of `java/getRefactorEdit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetRefactorEditParams {
    pub command: RefactorKind,
    pub context: CodeActionParams,
    pub options: FormattingOptions,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command_arguments: Vec<Value>,
}

/// Result of `java/getRefactorEdit` and `java/move`.
///
/// Any combination of the three fields may be present; an error message
/// takes precedence over the others.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefactorWorkspaceEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<WorkspaceEdit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Command>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl RefactorWorkspaceEdit {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_edit(edit: WorkspaceEdit) -> Self {
        Self {
            edit: Some(edit),
            ..Default::default()
        }
    }
}

/// What a move request relocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveKind {
    MoveResource,
    MoveInstanceMethod,
    MoveStaticMember,
    MoveTypeToClass,
}

/// Parameters shared by `java/getMoveDestinations` and `java/move`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveParams {
    pub move_kind: MoveKind,
    pub source_uris: Vec<String>,
    /// Serialized as `null` when absent; the server distinguishes file moves this way.
    pub params: Option<CodeActionParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<MoveDestination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_references: Option<bool>,
}

impl MoveParams {
    /// Destination query for the given sources
    pub fn destinations(move_kind: MoveKind, source_uris: Vec<String>, params: Option<CodeActionParams>) -> Self {
        Self {
            move_kind,
            source_uris,
            params,
            destination: None,
            update_references: None,
        }
    }

    /// Turns a destination query into the move request for the chosen destination
    pub fn to(mut self, destination: MoveDestination) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn updating_references(mut self) -> Self {
        self.update_references = Some(true);
        self
    }
}

/// Result of `java/getMoveDestinations`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveDestinationsResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub destinations: Vec<MoveDestination>,
}

/// Parameters of `java/searchSymbols`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSymbolParams {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_only: Option<bool>,
}

/// Argument of the rename trigger: a document and a character offset into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePosition {
    pub uri: String,
    pub offset: u32,
}

/// Auxiliary information the server attaches to a refactoring code action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommandInfo {
    /// Document a `moveFile` action applies to
    pub uri: Option<String>,
    /// Candidate initialization scopes for field-introducing refactorings
    pub initialized_scopes: Option<Vec<String>>,
    pub display_name: Option<String>,
    pub enclosing_type_name: Option<String>,
    /// AST node code of the member being moved
    pub member_type: Option<u32>,
    pub project_name: Option<String>,
    pub supported_destination_kinds: Option<Vec<String>>,
}

impl CommandInfo {
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or_default()
    }

    /// Whether the member is itself a type (class, enum or annotation) declaration
    pub fn is_type_declaration(&self) -> bool {
        matches!(
            self.member_type,
            Some(TYPE_DECLARATION | ENUM_DECLARATION | ANNOTATION_TYPE_DECLARATION)
        )
    }
}
