use anyhow::Context;
use clap::{Parser, Subcommand};
use lsp_types::{DidOpenTextDocumentParams, TextDocumentItem, Url};
use refactor_client::config::{ClientConfig, ConfigManager};
use refactor_client::host::TerminalEditor;
use refactor_client::lsp::LspClient;
use refactor_client::utils::logging;
use refactor_client::{Outcome, RefactorClient, RenamePosition};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "refactor-cli")]
#[command(about = "Run language server refactorings from the terminal")]
struct Cli {
    /// Workspace root (defaults to the current directory)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,
    /// Language server command, overriding the configured one
    #[arg(short, long, global = true)]
    server: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive rename at a character offset
    Rename {
        /// Document URI or path
        uri: String,
        /// Character offset (UTF-16 code units) into the document
        offset: u32,
    },
    /// Apply a refactoring offered by a code action
    Apply {
        /// Refactoring name, e.g. extractMethod
        kind: String,
        /// Code action params as JSON
        #[arg(long)]
        context: String,
        /// Command info attached to the code action, as JSON
        #[arg(long)]
        info: Option<String>,
    },
    /// Move files to another package
    MoveFile {
        /// Files to move; they must share one directory
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let workspace_root = match cli.workspace {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let workspace_root = workspace_root
        .canonicalize()
        .with_context(|| format!("Workspace {} does not exist", workspace_root.display()))?;

    let config_manager = ConfigManager::for_workspace(&workspace_root);
    let _guard = match logging::init_file_logging(config_manager.config_root()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        },
    };

    let config = match config_manager.get_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Failed to read configuration, using defaults: {:#}", e);
            ClientConfig::default_config()
        },
    };
    let mut server_config = config.server;
    if let Some(command) = cli.server {
        server_config.command = command;
    }

    let lsp = Arc::new(LspClient::new(server_config).await?);
    let root_uri = Url::from_directory_path(&workspace_root)
        .map_err(|_| anyhow::anyhow!("Invalid workspace path: {}", workspace_root.display()))?;
    lsp.initialize(root_uri).await?;

    let editor = Arc::new(TerminalEditor::new(lsp.clone(), workspace_root.clone(), config.formatting));
    let client = RefactorClient::builder().server(lsp.clone()).editor(editor).build()?;

    let result = match cli.command {
        Commands::Rename { uri, offset } => {
            let uri = to_uri(&uri, &workspace_root)?;
            open_in_server(&lsp, &uri).await?;
            client
                .rename(RenamePosition {
                    uri: uri.to_string(),
                    offset,
                })
                .await
        },
        Commands::Apply { kind, context, info } => {
            let params: serde_json::Value = serde_json::from_str(&context).context("Invalid --context JSON")?;
            let info = info
                .map(|info| serde_json::from_str::<serde_json::Value>(&info))
                .transpose()
                .context("Invalid --info JSON")?;
            if let Some(uri) = params["textDocument"]["uri"].as_str().and_then(|uri| Url::parse(uri).ok()) {
                open_in_server(&lsp, &uri).await?;
            }
            client.apply_refactoring(&kind, params, info).await
        },
        Commands::MoveFile { files } => {
            let uris = files
                .iter()
                .map(|file| to_uri(&file.to_string_lossy(), &workspace_root))
                .collect::<anyhow::Result<Vec<_>>>()?;
            client.service().moves().move_file(uris).await
        },
    };

    if let Err(e) = lsp.shutdown().await {
        tracing::warn!("Language server did not shut down cleanly: {:#}", e);
    }

    match result {
        Ok(Outcome::Applied) => println!("✅ Refactoring applied"),
        Ok(Outcome::Cancelled) => println!("Cancelled"),
        Ok(Outcome::NothingToDo) => println!("Nothing to do"),
        // Already shown to the user
        Err(e) if e.is_reported() => return Ok(ExitCode::FAILURE),
        Err(e) => return Err(e.into()),
    }
    Ok(ExitCode::SUCCESS)
}

/// Accept either a URI or a path relative to the workspace
fn to_uri(value: &str, workspace_root: &Path) -> anyhow::Result<Url> {
    if let Ok(uri) = Url::parse(value) {
        if uri.scheme() == "file" {
            return Ok(uri);
        }
    }
    let path = workspace_root.join(value);
    let path = path
        .canonicalize()
        .with_context(|| format!("File {} does not exist", path.display()))?;
    Url::from_file_path(&path).map_err(|_| anyhow::anyhow!("Invalid file path: {}", path.display()))
}

async fn open_in_server(lsp: &LspClient, uri: &Url) -> anyhow::Result<()> {
    let path = uri
        .to_file_path()
        .map_err(|_| anyhow::anyhow!("Not a file URI: {}", uri))?;
    let text = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    lsp.did_open(DidOpenTextDocumentParams {
        text_document: TextDocumentItem {
            uri: uri.clone(),
            language_id: "java".to_string(),
            version: 1,
            text,
        },
    })
    .await
}
