use anyhow::Result;
use lsp_types::FormattingOptions;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;

/// File name of the client configuration inside the config root
pub const CONFIG_FILE_NAME: &str = "config.json";

/// How to start the language server
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub initialization_options: Option<Value>,
}

/// Formatting preferences sent with edit refactorings
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct FormattingConfig {
    pub tab_size: u32,
    pub insert_spaces: bool,
}

impl Default for FormattingConfig {
    fn default() -> Self {
        Self {
            tab_size: 4,
            insert_spaces: true,
        }
    }
}

impl FormattingConfig {
    pub fn to_formatting_options(self) -> FormattingOptions {
        FormattingOptions {
            tab_size: self.tab_size,
            insert_spaces: self.insert_spaces,
            properties: HashMap::new(),
            trim_trailing_whitespace: None,
            insert_final_newline: None,
            trim_final_newlines: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ClientConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub formatting: FormattingConfig,
}

impl ClientConfig {
    /// Get or create configuration in config root folder
    pub fn get_or_create(config_root: &Path) -> Result<Self> {
        let config_path = config_root.join(CONFIG_FILE_NAME);

        // Create config directory if it doesn't exist
        if !config_root.exists() {
            std::fs::create_dir_all(config_root)?;
        }

        // If config file exists, load it, otherwise create default
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            let default_config = Self::default_config();
            let config_json = serde_json::to_string_pretty(&default_config)?;
            std::fs::write(&config_path, config_json)?;
            Ok(default_config)
        }
    }

    /// Default configuration: Eclipse JDT language server with the move and
    /// extract refactoring extensions enabled
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig {
                name: "jdtls".to_string(),
                command: "jdtls".to_string(),
                args: Vec::new(),
                initialization_options: Some(json!({
                    "extendedClientCapabilities": {
                        "moveRefactoringSupport": true,
                        "advancedExtractRefactoringSupport": true,
                        "advancedIntroduceParameterRefactoringSupport": true,
                        "classFileContentsSupport": true,
                    }
                })),
            },
            formatting: FormattingConfig::default(),
        }
    }
}
