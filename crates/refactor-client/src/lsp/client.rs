use crate::config::ServerConfig;
use crate::host::RefactorServer;
use crate::lsp::protocol::*;
use crate::model::types::{
    GetRefactorEditParams, MoveDestinationsResponse, MoveParams, RefactorWorkspaceEdit, SearchSymbolParams,
};
use anyhow::Result;
use lsp_types::*;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::process::{ChildStdin, Command};
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, error, trace};
use url::Url;

type ResponseCallback = Box<dyn FnOnce(Result<Value>) + Send>;

/// Longest wait for a single response; refactoring edits over large projects are slow
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const METHOD_NOT_FOUND: i64 = -32601;

/// Language Server Protocol client for the refactoring extension requests
///
/// Spawns the configured server over stdio, correlates responses to requests
/// by id, and answers the requests the server sends back to the client.
pub struct LspClient {
    stdin: Arc<Mutex<ChildStdin>>,
    pending_requests: Arc<Mutex<HashMap<u64, ResponseCallback>>>,
    next_id: Arc<Mutex<u64>>,
    config: ServerConfig,
    _child: Mutex<tokio::process::Child>,
}

impl std::fmt::Debug for LspClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LspClient").field("server", &self.config.name).finish()
    }
}

impl LspClient {
    /// Creates a new LSP client and starts the language server process
    ///
    /// # Arguments
    /// * `config` - Server configuration including command and args
    ///
    /// # Returns
    /// * `Result<Self>` - New LSP client instance or error if server fails to start
    pub async fn new(config: ServerConfig) -> Result<Self> {
        let program = which::which(&config.command)
            .map_err(|e| anyhow::anyhow!("Language server '{}' not found: {}", config.command, e))?;

        let mut child = Command::new(program)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| anyhow::anyhow!("Failed to start {}: {}", config.name, e))?;

        let stdin = child.stdin.take().ok_or_else(|| anyhow::anyhow!("No stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| anyhow::anyhow!("No stdout"))?;

        let client = Self {
            stdin: Arc::new(Mutex::new(stdin)),
            pending_requests: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(Mutex::new(1)),
            config,
            _child: Mutex::new(child),
        };

        client.start_message_handler(stdout);
        Ok(client)
    }

    /// Initializes the language server with workspace configuration
    ///
    /// # Arguments
    /// * `root_uri` - Root URI of the workspace
    ///
    /// # Returns
    /// * `Result<InitializeResult>` - Server capabilities or initialization error
    pub async fn initialize(&self, root_uri: Url) -> Result<InitializeResult> {
        let init_params =
            crate::lsp::LspConfig::build_initialize_params(root_uri, self.config.initialization_options.clone());

        let init_result: InitializeResult = self
            .send_lsp_request("initialize", init_params)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Empty initialize response from {}", self.config.name))?;

        self.send_notification("initialized", json!({})).await?;
        Ok(init_result)
    }

    /// Asks the server to shut down and exit
    pub async fn shutdown(&self) -> Result<()> {
        let _: Option<Value> = self.send_lsp_request("shutdown", Value::Null).await?;
        self.send_notification("exit", Value::Null).await
    }

    /// Rename a symbol across the workspace
    ///
    /// # Arguments
    /// * `params` - Symbol position and new name
    ///
    /// # Returns
    /// * `Result<Option<WorkspaceEdit>>` - Workspace changes or None
    pub async fn rename(&self, params: RenameParams) -> Result<Option<WorkspaceEdit>> {
        self.send_lsp_request("textDocument/rename", params).await
    }

    /// Run a server-side command
    pub async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        self.send_lsp_request("workspace/executeCommand", params).await
    }

    /// Notify server that a document was opened
    ///
    /// # Arguments
    /// * `params` - Document URI, language ID, version, and content
    pub async fn did_open(&self, params: DidOpenTextDocumentParams) -> Result<()> {
        self.send_notification("textDocument/didOpen", json!(params)).await
    }

    /// Generic LSP request handler with automatic response parsing
    async fn send_lsp_request<T, R>(&self, method: &str, params: T) -> Result<Option<R>>
    where
        T: serde::Serialize,
        R: serde::de::DeserializeOwned,
    {
        let params = serde_json::to_value(&params)?;
        trace!("Sending LSP request: method={}, params={}", method, params);

        let (tx, rx) = oneshot::channel();

        self.send_request(method, params, move |result| {
            let _ = tx.send(result);
        })
        .await?;

        let result = tokio::time::timeout(REQUEST_TIMEOUT, rx)
            .await
            .map_err(|_| anyhow::anyhow!("{} timed out after {}s", method, REQUEST_TIMEOUT.as_secs()))???;
        trace!("Raw LSP response: method={}, result={}", method, result);

        if result.is_null() {
            Ok(None)
        } else {
            let parsed: R = serde_json::from_value(result)
                .map_err(|e| anyhow::anyhow!("Malformed {} response: {}", method, e))?;
            Ok(Some(parsed))
        }
    }

    /// Start background task to handle LSP messages from server
    fn start_message_handler(&self, stdout: tokio::process::ChildStdout) {
        let pending_requests = self.pending_requests.clone();
        let stdin = self.stdin.clone();
        tokio::spawn(async move {
            let mut reader = BufReader::new(stdout);

            while let Ok(content) = read_lsp_message(&mut reader).await {
                if let Err(e) = Self::process_message(&content, &pending_requests, &stdin).await {
                    error!("Failed to process LSP message: {}", e);
                }
            }
            debug!("LSP connection closed");

            // Fail whatever is still waiting instead of leaving it to the timeout
            for (_, callback) in pending_requests.lock().await.drain() {
                callback(Err(anyhow::anyhow!("Connection closed by language server")));
            }
        });
    }

    /// Process a single LSP message: complete a pending request, answer a
    /// server request, or log a notification
    async fn process_message(
        content: &str,
        pending_requests: &Arc<Mutex<HashMap<u64, ResponseCallback>>>,
        stdin: &Arc<Mutex<ChildStdin>>,
    ) -> Result<()> {
        let message = parse_lsp_message(content)?;

        if message.is_server_request() {
            return Self::answer_server_request(&message, stdin).await;
        }

        let Some(id) = message.id.as_ref().and_then(|id| id.as_u64()) else {
            if message.method == "window/logMessage" {
                debug!("Server log: {}", message.params.unwrap_or_default());
            }
            return Ok(()); // Notification or invalid ID
        };

        let Some(callback) = pending_requests.lock().await.remove(&id) else {
            return Ok(()); // No pending request for this ID
        };

        let result = match (message.rpc_error(), message.error) {
            (Some(error), _) => Err(anyhow::anyhow!("LSP Error: {}", error)),
            (None, Some(error)) => Err(anyhow::anyhow!("LSP Error: {}", error)),
            (None, None) => Ok(message.result.unwrap_or(Value::Null)),
        };

        callback(result);
        Ok(())
    }

    /// Answer a request the server sent to the client
    async fn answer_server_request(message: &LspMessage, stdin: &Arc<Mutex<ChildStdin>>) -> Result<()> {
        let content = serde_json::to_string(&server_request_response(message))?;
        let mut stdin = stdin.lock().await;
        write_lsp_message(&mut *stdin, &content).await
    }

    /// Send LSP request with callback for response handling
    async fn send_request<F>(&self, method: &str, params: Value, callback: F) -> Result<()>
    where
        F: FnOnce(Result<Value>) + Send + 'static,
    {
        let id = {
            let mut next_id = self.next_id.lock().await;
            let current_id = *next_id;
            *next_id += 1;
            current_id
        };

        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        });

        {
            let mut pending = self.pending_requests.lock().await;
            pending.insert(id, Box::new(callback));
        }

        let content = serde_json::to_string(&request)?;
        let mut stdin = self.stdin.lock().await;
        write_lsp_message(&mut *stdin, &content).await?;

        Ok(())
    }

    /// Send LSP notification (no response expected)
    async fn send_notification(&self, method: &str, params: Value) -> Result<()> {
        let notification = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params
        });

        let content = serde_json::to_string(&notification)?;
        let mut stdin = self.stdin.lock().await;
        write_lsp_message(&mut *stdin, &content).await?;

        Ok(())
    }
}

/// The response to a server-to-client request.
///
/// `workspace/applyEdit` is declined: edits reach files only through the
/// host editor, which this client does not own.
fn server_request_response(message: &LspMessage) -> Value {
    let id = message.id.clone().unwrap_or(Value::Null);
    let params = message.params.clone().unwrap_or(Value::Null);

    match message.method.as_str() {
        "workspace/applyEdit" => {
            let label = params.get("label").and_then(Value::as_str).unwrap_or("unlabeled");
            debug!("Declining server edit {}", label);
            let result = ApplyWorkspaceEditResponse {
                applied: false,
                failure_reason: Some("The client does not apply server-initiated edits".to_string()),
                failed_change: None,
            };
            json!({"jsonrpc": "2.0", "id": id, "result": result})
        },
        "workspace/configuration" => {
            let items = params
                .get("items")
                .and_then(Value::as_array)
                .map(Vec::len)
                .unwrap_or_default();
            json!({"jsonrpc": "2.0", "id": id, "result": vec![Value::Null; items]})
        },
        "client/registerCapability" | "client/unregisterCapability" | "window/workDoneProgress/create" => {
            json!({"jsonrpc": "2.0", "id": id, "result": Value::Null})
        },
        method => {
            debug!("Declining server request {}", method);
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": JsonRpcError {
                    code: METHOD_NOT_FOUND,
                    message: format!("Unhandled method {}", method),
                    data: None,
                },
            })
        },
    }
}

#[async_trait::async_trait]
impl RefactorServer for LspClient {
    async fn get_refactor_edit(&self, params: GetRefactorEditParams) -> Result<Option<RefactorWorkspaceEdit>> {
        self.send_lsp_request("java/getRefactorEdit", params).await
    }

    async fn get_move_destinations(&self, params: MoveParams) -> Result<Option<MoveDestinationsResponse>> {
        self.send_lsp_request("java/getMoveDestinations", params).await
    }

    async fn move_element(&self, params: MoveParams) -> Result<Option<RefactorWorkspaceEdit>> {
        self.send_lsp_request("java/move", params).await
    }

    async fn search_symbols(&self, params: SearchSymbolParams) -> Result<Vec<SymbolInformation>> {
        Ok(self
            .send_lsp_request("java/searchSymbols", params)
            .await?
            .unwrap_or_default())
    }
}
