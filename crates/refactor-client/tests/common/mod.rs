//! Scripted collaborators for driving refactoring flows without a language
//! server or an editor.

#![allow(dead_code)]

use anyhow::Result;
use lsp_types::{FormattingOptions, SymbolInformation, Url, WorkspaceEdit};
use refactor_client::host::{Editor, FileSystem, RefactorServer};
use refactor_client::model::types::{
    GetRefactorEditParams, MoveDestinationsResponse, MoveParams, RefactorWorkspaceEdit, SearchSymbolParams,
};
use refactor_client::{Document, PickItem, RefactorClient};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A request the stub server received
#[derive(Debug, Clone)]
pub enum Request {
    RefactorEdit(GetRefactorEditParams),
    MoveDestinations(MoveParams),
    Move(MoveParams),
    SearchSymbols(SearchSymbolParams),
}

/// Language server answering every request with a scripted response
#[derive(Default)]
pub struct StubServer {
    pub refactor_edit: Mutex<Option<RefactorWorkspaceEdit>>,
    pub destinations: Mutex<Option<MoveDestinationsResponse>>,
    pub move_result: Mutex<Option<RefactorWorkspaceEdit>>,
    pub symbols: Mutex<Vec<SymbolInformation>>,
    pub requests: Mutex<Vec<Request>>,
}

impl StubServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_refactor_edit(&self, result: RefactorWorkspaceEdit) {
        *self.refactor_edit.lock().unwrap() = Some(result);
    }

    pub fn set_destinations(&self, response: Value) {
        *self.destinations.lock().unwrap() = Some(serde_json::from_value(response).unwrap());
    }

    pub fn set_move_result(&self, result: RefactorWorkspaceEdit) {
        *self.move_result.lock().unwrap() = Some(result);
    }

    pub fn set_symbols(&self, symbols: Vec<SymbolInformation>) {
        *self.symbols.lock().unwrap() = symbols;
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn destination_requests(&self) -> Vec<MoveParams> {
        self.requests()
            .into_iter()
            .filter_map(|request| match request {
                Request::MoveDestinations(params) => Some(params),
                _ => None,
            })
            .collect()
    }

    pub fn move_requests(&self) -> Vec<MoveParams> {
        self.requests()
            .into_iter()
            .filter_map(|request| match request {
                Request::Move(params) => Some(params),
                _ => None,
            })
            .collect()
    }

    pub fn refactor_edit_requests(&self) -> Vec<GetRefactorEditParams> {
        self.requests()
            .into_iter()
            .filter_map(|request| match request {
                Request::RefactorEdit(params) => Some(params),
                _ => None,
            })
            .collect()
    }

    fn record(&self, request: Request) {
        self.requests.lock().unwrap().push(request);
    }
}

#[async_trait::async_trait]
impl RefactorServer for StubServer {
    async fn get_refactor_edit(&self, params: GetRefactorEditParams) -> Result<Option<RefactorWorkspaceEdit>> {
        self.record(Request::RefactorEdit(params));
        Ok(self.refactor_edit.lock().unwrap().clone())
    }

    async fn get_move_destinations(&self, params: MoveParams) -> Result<Option<MoveDestinationsResponse>> {
        self.record(Request::MoveDestinations(params));
        Ok(self.destinations.lock().unwrap().clone())
    }

    async fn move_element(&self, params: MoveParams) -> Result<Option<RefactorWorkspaceEdit>> {
        self.record(Request::Move(params));
        Ok(self.move_result.lock().unwrap().clone())
    }

    async fn search_symbols(&self, params: SearchSymbolParams) -> Result<Vec<SymbolInformation>> {
        self.record(Request::SearchSymbols(params));
        Ok(self.symbols.lock().unwrap().clone())
    }
}

/// A picker shown to the user
#[derive(Debug, Clone)]
pub struct Pick {
    pub items: Vec<PickItem>,
    pub placeholder: String,
}

/// Editor that records every interaction.
///
/// Every document is open unless marked missing, pickers choose the first
/// item unless a choice was scripted, and edits are accepted.
pub struct RecordingEditor {
    pub texts: Mutex<HashMap<Url, String>>,
    pub missing: Mutex<HashSet<Url>>,
    pub choices: Mutex<VecDeque<Option<usize>>>,
    pub formatting: Mutex<Option<FormattingOptions>>,
    pub fail_execute: Mutex<bool>,
    pub opened: Mutex<Vec<Url>>,
    pub shown: Mutex<Vec<Url>>,
    pub applied: Mutex<Vec<WorkspaceEdit>>,
    pub saved: Mutex<Vec<Url>>,
    pub errors: Mutex<Vec<String>>,
    pub warnings: Mutex<Vec<String>>,
    pub picks: Mutex<Vec<Pick>>,
    pub commands: Mutex<Vec<(String, Vec<Value>)>>,
}

impl Default for RecordingEditor {
    fn default() -> Self {
        Self {
            texts: Mutex::default(),
            missing: Mutex::default(),
            choices: Mutex::default(),
            formatting: Mutex::new(Some(formatting_options())),
            fail_execute: Mutex::new(false),
            opened: Mutex::default(),
            shown: Mutex::default(),
            applied: Mutex::default(),
            saved: Mutex::default(),
            errors: Mutex::default(),
            warnings: Mutex::default(),
            picks: Mutex::default(),
            commands: Mutex::default(),
        }
    }
}

impl RecordingEditor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_text(&self, uri: &Url, text: &str) {
        self.texts.lock().unwrap().insert(uri.clone(), text.to_string());
    }

    pub fn mark_missing(&self, uri: &Url) {
        self.missing.lock().unwrap().insert(uri.clone());
    }

    /// Script the next picker answer; `None` dismisses it
    pub fn choose(&self, choice: Option<usize>) {
        self.choices.lock().unwrap().push_back(choice);
    }

    pub fn without_active_editor(&self) {
        *self.formatting.lock().unwrap() = None;
    }

    pub fn fail_commands(&self) {
        *self.fail_execute.lock().unwrap() = true;
    }

    pub fn applied(&self) -> Vec<WorkspaceEdit> {
        self.applied.lock().unwrap().clone()
    }

    pub fn saved(&self) -> Vec<Url> {
        self.saved.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }

    pub fn picks(&self) -> Vec<Pick> {
        self.picks.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<(String, Vec<Value>)> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Editor for RecordingEditor {
    async fn open_document(&self, uri: &Url) -> Result<Option<Document>> {
        self.opened.lock().unwrap().push(uri.clone());
        if self.missing.lock().unwrap().contains(uri) {
            return Ok(None);
        }
        let text = self.texts.lock().unwrap().get(uri).cloned().unwrap_or_default();
        Ok(Some(Document::new(uri.clone(), text)))
    }

    async fn show_document(&self, document: &Document) -> Result<()> {
        self.shown.lock().unwrap().push(document.uri.clone());
        Ok(())
    }

    async fn apply_edit(&self, edit: &WorkspaceEdit) -> Result<bool> {
        self.applied.lock().unwrap().push(edit.clone());
        Ok(true)
    }

    async fn save_document(&self, uri: &Url) -> Result<bool> {
        self.saved.lock().unwrap().push(uri.clone());
        Ok(true)
    }

    async fn show_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    async fn show_warning(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }

    async fn show_quick_pick(&self, items: &[PickItem], placeholder: &str) -> Result<Option<usize>> {
        self.picks.lock().unwrap().push(Pick {
            items: items.to_vec(),
            placeholder: placeholder.to_string(),
        });
        Ok(self.choices.lock().unwrap().pop_front().unwrap_or(Some(0)))
    }

    async fn execute_command(&self, command: &str, arguments: Vec<Value>) -> Result<Option<Value>> {
        self.commands.lock().unwrap().push((command.to_string(), arguments));
        if *self.fail_execute.lock().unwrap() {
            anyhow::bail!("command {} failed", command);
        }
        Ok(None)
    }

    fn formatting_options(&self) -> Option<FormattingOptions> {
        self.formatting.lock().unwrap().clone()
    }

    fn as_relative_path(&self, uri: &Url) -> Option<String> {
        uri.path().strip_prefix("/workspace/").map(str::to_string)
    }
}

/// Filesystem with a fixed set of existing paths
#[derive(Default)]
pub struct StubFileSystem {
    pub existing: HashSet<PathBuf>,
}

impl StubFileSystem {
    pub fn with_files(paths: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            existing: paths.iter().map(PathBuf::from).collect(),
        })
    }
}

impl FileSystem for StubFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.existing.contains(path)
    }
}

pub fn client(server: &Arc<StubServer>, editor: &Arc<RecordingEditor>, fs: Arc<StubFileSystem>) -> RefactorClient {
    RefactorClient::builder()
        .server(server.clone())
        .editor(editor.clone())
        .file_system(fs)
        .build()
        .unwrap()
}

pub fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

pub fn formatting_options() -> FormattingOptions {
    serde_json::from_value(json!({"tabSize": 4, "insertSpaces": true})).unwrap()
}

/// Code action params for a selection in `uri`
pub fn code_action_params(uri: &str) -> Value {
    json!({
        "textDocument": {"uri": uri},
        "range": {"start": {"line": 3, "character": 8}, "end": {"line": 3, "character": 20}},
        "context": {"diagnostics": []},
    })
}

pub fn symbol(name: &str, container: Option<&str>, kind: u32) -> SymbolInformation {
    serde_json::from_value(json!({
        "name": name,
        "kind": kind,
        "location": {
            "uri": "file:///workspace/src/Other.java",
            "range": {"start": {"line": 0, "character": 0}, "end": {"line": 0, "character": 0}},
        },
        "containerName": container,
    }))
    .unwrap()
}

pub fn edit(value: Value) -> WorkspaceEdit {
    serde_json::from_value(value).unwrap()
}
