//! JSON-RPC framing for the language server connection.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};

pub struct LspMessage {
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
    pub result: Option<Value>,
    pub error: Option<Value>,
}

impl LspMessage {
    /// A request sent by the server that expects a response from the client
    pub fn is_server_request(&self) -> bool {
        self.id.is_some() && !self.method.is_empty()
    }

    /// The error object of a failed response, if it has the JSON-RPC shape
    pub fn rpc_error(&self) -> Option<JsonRpcError> {
        self.error
            .as_ref()
            .and_then(|error| serde_json::from_value(error.clone()).ok())
    }
}

/// The `error` member of a JSON-RPC response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

pub async fn read_lsp_message<R: tokio::io::AsyncRead + Unpin>(reader: &mut BufReader<R>) -> Result<String> {
    let mut headers = HashMap::new();
    let mut line = String::new();

    // Read headers
    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        // Handle EOF - connection closed
        if bytes_read == 0 {
            return Err(anyhow::anyhow!("Connection closed by language server"));
        }

        if line.trim().is_empty() {
            break;
        }

        if let Some((key, value)) = line.trim().split_once(": ") {
            headers.insert(key.to_lowercase(), value.to_string());
        }
    }

    let content_length: usize = headers
        .get("content-length")
        .ok_or_else(|| anyhow::anyhow!("Missing Content-Length header"))?
        .parse()?;

    let mut buffer = vec![0; content_length];
    reader.read_exact(&mut buffer).await?;

    Ok(String::from_utf8(buffer)?)
}

pub async fn write_lsp_message<W: AsyncWriteExt + Unpin>(writer: &mut W, content: &str) -> Result<()> {
    let message = format!("Content-Length: {}\r\n\r\n{}", content.len(), content);
    writer.write_all(message.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

pub fn parse_lsp_message(content: &str) -> Result<LspMessage> {
    let json: Value = serde_json::from_str(content)?;

    Ok(LspMessage {
        id: json.get("id").cloned(),
        method: json
            .get("method")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        params: json.get("params").cloned(),
        result: json.get("result").cloned(),
        error: json.get("error").cloned(),
    })
}
