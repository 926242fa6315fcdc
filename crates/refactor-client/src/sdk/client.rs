use serde_json::Value;
use std::sync::Arc;

use crate::error::RefactorError;
use crate::model::entities::Outcome;
use crate::model::types::RenamePosition;
use crate::sdk::RefactorClientBuilder;
use crate::sdk::commands::{APPLY_REFACTORING_COMMAND, CommandHandler, CommandRegistry, RENAME_COMMAND};
use crate::sdk::services::RefactorService;

/// **Editor-side entry point for server-driven refactorings**
///
/// Owns the injected collaborators (language server, host editor, filesystem)
/// through its services and exposes the refactoring commands by name. The host
/// forwards command invocations to [`RefactorClient::execute`].
///
/// # Examples
/// ```ignore
/// use refactor_client::RefactorClient;
/// use serde_json::json;
///
/// # async fn example(server: std::sync::Arc<dyn refactor_client::host::RefactorServer>,
/// #                  editor: std::sync::Arc<dyn refactor_client::host::Editor>) {
/// let client = RefactorClient::builder()
///     .server(server)
///     .editor(editor)
///     .build()
///     .expect("Failed to build client");
///
/// client
///     .execute("java.action.rename", vec![json!({"uri": "file:///p/Foo.java", "offset": 42})])
///     .await
///     .expect("Rename failed");
/// # }
/// ```
pub struct RefactorClient {
    service: RefactorService,
    registry: CommandRegistry,
}

impl std::fmt::Debug for RefactorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefactorClient")
            .field("commands", &self.registry.names())
            .finish()
    }
}

impl RefactorClient {
    pub(crate) fn new(service: RefactorService) -> Self {
        let registry = CommandRegistry::with_builtins(service.clone());
        Self { service, registry }
    }

    pub fn builder() -> RefactorClientBuilder {
        RefactorClientBuilder::new()
    }

    /// **Run a command by name**
    ///
    /// # Arguments
    /// * `command` - Command name, e.g. `java.action.applyRefactoringCommand`
    /// * `arguments` - Command arguments as the host passes them
    ///
    /// # Returns
    /// * `Ok(Outcome)` - What the command did; a dismissed picker is `Outcome::Cancelled`
    /// * `Err(RefactorError)` - Why the command stopped
    pub async fn execute(&self, command: &str, arguments: Vec<Value>) -> Result<Outcome, RefactorError> {
        self.registry.dispatch(command, arguments).await
    }

    /// Start an interactive rename; failures are ignored
    pub async fn rename(&self, position: RenamePosition) -> Result<Outcome, RefactorError> {
        let argument = serde_json::to_value(position)?;
        self.execute(RENAME_COMMAND, vec![argument]).await
    }

    /// Run a refactoring by kind with its code action params and command info
    pub async fn apply_refactoring(
        &self,
        kind: &str,
        params: Value,
        info: Option<Value>,
    ) -> Result<Outcome, RefactorError> {
        let mut arguments = vec![Value::String(kind.to_string()), params];
        arguments.extend(info);
        self.execute(APPLY_REFACTORING_COMMAND, arguments).await
    }

    /// Names of every registered command
    pub fn commands(&self) -> Vec<&str> {
        self.registry.names()
    }

    /// Register an additional command, replacing a built-in of the same name
    pub fn register(&mut self, handler: Arc<dyn CommandHandler>) {
        self.registry.register(handler);
    }

    pub fn service(&self) -> &RefactorService {
        &self.service
    }
}
