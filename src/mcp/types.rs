//! MCP protocol type definitions
//!
//! Client-side view of the Model Context Protocol messages the harness
//! sends and the responses it reads back. Incoming types are lenient: the
//! server under test is third-party, so every field the harness does not
//! strictly need is optional.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC version
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol version
pub const MCP_VERSION: &str = "2024-11-05";

/// JSON-RPC request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,

    /// Request ID
    pub id: u64,

    /// Method name
    pub method: String,

    /// Method parameters
    pub params: Value,
}

impl JsonRpcRequest {
    /// Create a request with the given id
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version
    #[serde(default)]
    pub jsonrpc: String,

    /// Request ID; absent on notifications
    #[serde(default)]
    pub id: Option<RequestId>,

    /// Result (on success)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error (on failure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,

    /// Method name, set when the server sends a notification or request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl JsonRpcResponse {
    /// Numeric id of the request this message answers, if any
    pub fn numeric_id(&self) -> Option<u64> {
        self.id.as_ref().and_then(RequestId::as_u64)
    }
}

/// Request ID (can be string or number)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    Number(u64),
    String(String),
}

impl RequestId {
    /// Numeric value; string ids that hold a number are accepted too
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            RequestId::Number(n) => Some(*n),
            RequestId::String(s) => s.parse().ok(),
        }
    }
}

/// JSON-RPC error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code
    #[serde(default)]
    pub code: i64,

    /// Error message
    #[serde(default)]
    pub message: String,

    /// Additional data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Client info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Client name
    pub name: String,

    /// Client version
    pub version: String,
}

/// Roots capability
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RootsCapability {
    pub list_changed: bool,
}

/// Client capabilities
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientCapabilities {
    /// Roots capability
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roots: Option<RootsCapability>,

    /// Sampling capability
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling: Option<Value>,
}

/// Initialize request params
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version
    pub protocol_version: String,

    /// Client capabilities
    pub capabilities: ClientCapabilities,

    /// Client info
    pub client_info: ClientInfo,
}

impl Default for InitializeParams {
    fn default() -> Self {
        Self {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ClientCapabilities {
                roots: Some(RootsCapability { list_changed: true }),
                sampling: Some(Value::Object(Default::default())),
            },
            client_info: ClientInfo {
                name: "test-client".to_string(),
                version: "1.0.0".to_string(),
            },
        }
    }
}

/// Server info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Server name
    pub name: String,

    /// Server version
    #[serde(default)]
    pub version: String,
}

/// Initialize result
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// Protocol version
    #[serde(default)]
    pub protocol_version: Option<String>,

    /// Server info
    #[serde(default)]
    pub server_info: Option<ServerInfo>,

    /// Server capabilities, kept raw for display
    #[serde(default)]
    pub capabilities: Value,
}

/// Tool definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Tool name
    pub name: String,

    /// Tool description
    #[serde(default)]
    pub description: Option<String>,

    /// Input schema (JSON Schema)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
}

impl Tool {
    /// First line of the description, or an empty string
    pub fn summary(&self) -> &str {
        self.description
            .as_deref()
            .and_then(|d| d.lines().next())
            .unwrap_or("")
    }
}

/// List tools result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListToolsResult {
    /// Available tools
    pub tools: Vec<Tool>,
}

/// Call tool params
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    /// Tool name
    pub name: String,

    /// Tool arguments
    pub arguments: Value,
}

/// Tool result content item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResultContent {
    /// Content kind ("text", "image", "resource", ...)
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Text payload for text items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Call tool result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolResult {
    /// Result content
    #[serde(default)]
    pub content: Vec<ToolResultContent>,
}

impl CallToolResult {
    /// Text of the first `text` content item
    pub fn first_text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|c| c.kind == "text")
            .and_then(|c| c.text.as_deref())
    }
}

/// MCP methods
pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const LIST_TOOLS: &str = "tools/list";
    pub const CALL_TOOL: &str = "tools/call";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialize() {
        let req = JsonRpcRequest::new(2, methods::LIST_TOOLS, json!({}));
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list", "params": {}})
        );
    }

    #[test]
    fn test_initialize_params_wire_shape() {
        let value = serde_json::to_value(InitializeParams::default()).unwrap();
        assert_eq!(value["protocolVersion"], "2024-11-05");
        assert_eq!(value["capabilities"]["roots"]["listChanged"], true);
        assert_eq!(value["capabilities"]["sampling"], json!({}));
        assert_eq!(value["clientInfo"]["name"], "test-client");
    }

    #[test]
    fn test_response_deserialize_error() {
        let json = r#"{"jsonrpc":"2.0","id":3,"error":{"code":-32603,"message":"Missing API key"}}"#;
        let resp: JsonRpcResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.numeric_id(), Some(3));
        assert_eq!(resp.error.unwrap().message, "Missing API key");
    }

    #[test]
    fn test_notification_has_no_id() {
        let json = r#"{"jsonrpc":"2.0","method":"notifications/message","params":{}}"#;
        let resp: JsonRpcResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.numeric_id(), None);
        assert_eq!(resp.method.as_deref(), Some("notifications/message"));
    }

    #[test]
    fn test_string_id() {
        assert_eq!(RequestId::String("7".to_string()).as_u64(), Some(7));
        assert_eq!(RequestId::String("abc".to_string()).as_u64(), None);
    }

    #[test]
    fn test_tool_summary_first_line() {
        let tool: Tool = serde_json::from_value(json!({
            "name": "firecrawl_scrape",
            "description": "Scrape a page.\n\nBest for single URLs."
        }))
        .unwrap();
        assert_eq!(tool.summary(), "Scrape a page.");

        let bare: Tool = serde_json::from_value(json!({"name": "x"})).unwrap();
        assert_eq!(bare.summary(), "");
    }

    #[test]
    fn test_call_tool_result_first_text() {
        let result: CallToolResult = serde_json::from_value(json!({
            "content": [{"type": "text", "text": "# Example Domain"}]
        }))
        .unwrap();
        assert_eq!(result.first_text(), Some("# Example Domain"));
    }

    #[test]
    fn test_first_text_skips_non_text_items() {
        let result: CallToolResult = serde_json::from_value(json!({
            "content": [
                {"type": "image", "data": "aGk=", "mimeType": "image/png"},
                {"type": "text", "text": "caption"}
            ]
        }))
        .unwrap();
        assert_eq!(result.first_text(), Some("caption"));

        let empty: CallToolResult = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.first_text(), None);
    }
}
