//! Named commands the host editor invokes.
//!
//! Each command is a [`CommandHandler`] registered in a [`CommandRegistry`]
//! under the name the host knows it by.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::RefactorError;
use crate::model::entities::Outcome;
use crate::model::types::{CommandInfo, RenamePosition};
use crate::sdk::services::RefactorService;

/// Starts an interactive rename at `[{uri, offset}]`
pub const RENAME_COMMAND: &str = "java.action.rename";
/// Runs a refactoring with `[kind, params, commandInfo]`
pub const APPLY_REFACTORING_COMMAND: &str = "java.action.applyRefactoringCommand";

#[async_trait::async_trait]
pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &str;

    async fn handle(&self, arguments: Vec<Value>) -> Result<Outcome, RefactorError>;
}

/// Command handlers by name
#[derive(Default, Clone)]
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in refactoring commands
    pub fn with_builtins(service: RefactorService) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(RenameCommand::new(service.clone())));
        registry.register(Arc::new(ApplyRefactoringCommand::new(service)));
        registry
    }

    /// Register a handler, replacing any handler with the same name
    pub fn register(&mut self, handler: Arc<dyn CommandHandler>) {
        self.handlers.insert(handler.name().to_string(), handler);
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub async fn dispatch(&self, command: &str, arguments: Vec<Value>) -> Result<Outcome, RefactorError> {
        let handler = self
            .handlers
            .get(command)
            .ok_or_else(|| RefactorError::UnknownCommand(command.to_string()))?;
        debug!("Dispatching {} with {} arguments", command, arguments.len());
        handler.handle(arguments).await
    }
}

pub struct RenameCommand {
    service: RefactorService,
}

impl RenameCommand {
    pub fn new(service: RefactorService) -> Self {
        Self { service }
    }
}

#[async_trait::async_trait]
impl CommandHandler for RenameCommand {
    fn name(&self) -> &str {
        RENAME_COMMAND
    }

    /// Malformed arguments are ignored like any other rename failure
    async fn handle(&self, arguments: Vec<Value>) -> Result<Outcome, RefactorError> {
        let position = arguments
            .into_iter()
            .next()
            .and_then(|argument| serde_json::from_value::<RenamePosition>(argument).ok());
        match position {
            Some(position) => {
                self.service.trigger_rename(position).await;
                Ok(Outcome::Applied)
            },
            None => {
                debug!("Ignoring {} without a position", RENAME_COMMAND);
                Ok(Outcome::NothingToDo)
            },
        }
    }
}

pub struct ApplyRefactoringCommand {
    service: RefactorService,
}

impl ApplyRefactoringCommand {
    pub fn new(service: RefactorService) -> Self {
        Self { service }
    }
}

#[async_trait::async_trait]
impl CommandHandler for ApplyRefactoringCommand {
    fn name(&self) -> &str {
        APPLY_REFACTORING_COMMAND
    }

    async fn handle(&self, arguments: Vec<Value>) -> Result<Outcome, RefactorError> {
        let mut arguments = arguments.into_iter();
        let kind = match arguments.next() {
            Some(Value::String(kind)) => kind,
            _ => {
                return Err(RefactorError::InvalidArguments(format!(
                    "{} expects a refactoring name",
                    APPLY_REFACTORING_COMMAND
                )));
            },
        };
        let params = arguments.next().unwrap_or(Value::Null);
        let info = match arguments.next() {
            None | Some(Value::Null) => None,
            Some(info) => Some(serde_json::from_value::<CommandInfo>(info)?),
        };

        self.service.apply_refactoring(&kind, params, info).await
    }
}
