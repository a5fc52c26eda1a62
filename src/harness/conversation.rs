//! The fixed three-step MCP conversation
//!
//! `initialize` → `tools/list` → `tools/call`. Each step is sent only once
//! the response to the previous one has been correlated through
//! [`PendingRequests`]. The conversation is pure: it consumes stdout lines
//! and tells the caller what to send next, so it can be driven without a
//! real child process.

use serde_json::{json, Value};

use crate::config::firecrawl;
use crate::harness::report::{excerpt, Reporter, EXCERPT_CHARS};
use crate::harness::state::HarnessState;
use crate::mcp::pending::PendingRequests;
use crate::mcp::types::{
    methods, CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult,
};

/// Conversation step a request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Initialize,
    ListTools,
    CallTool,
}

/// How the conversation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The tool call came back with a JSON-RPC error. Reported as a
    /// successful demonstration whatever the error is.
    ToolError { message: String },
    /// The tool call returned a result
    ToolResult { excerpt: String },
    /// `tools/list` returned no tools, so nothing was called
    NoTools,
}

impl Outcome {
    /// Whether the run counts as a successful demonstration
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::NoTools)
    }
}

/// What the driver should do after a line of server output
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Nothing to do, keep reading
    Continue,
    /// Write this request to the server
    Send(JsonRpcRequest),
    /// The conversation is over
    Finish(Outcome),
}

/// Client side of the smoke-test conversation
#[derive(Debug)]
pub struct Conversation {
    pending: PendingRequests<Step>,
    state: HarnessState,
    scrape_url: String,
}

impl Conversation {
    pub fn new(scrape_url: impl Into<String>) -> Self {
        Self {
            pending: PendingRequests::new(),
            state: HarnessState::Spawned,
            scrape_url: scrape_url.into(),
        }
    }

    pub fn state(&self) -> HarnessState {
        self.state
    }

    /// The opening `initialize` request
    pub fn start(&mut self) -> JsonRpcRequest {
        let params = serde_json::to_value(InitializeParams::default()).unwrap_or(Value::Null);
        self.request(Step::Initialize, methods::INITIALIZE, params)
    }

    fn request(&mut self, step: Step, method: &str, params: Value) -> JsonRpcRequest {
        let id = self.pending.register(step);
        tracing::debug!(id, method, outstanding = self.pending.len(), "queued request");
        JsonRpcRequest::new(id, method, params)
    }

    /// Feed one chunk of server stdout
    pub fn handle_line<W: std::io::Write>(
        &mut self,
        line: &str,
        reporter: &mut Reporter<W>,
    ) -> Action {
        let raw = line.trim();
        if raw.is_empty() {
            return Action::Continue;
        }

        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to parse server output as JSON: {}", e);
                reporter.parse_error(&e, raw);
                return Action::Continue;
            }
        };

        let response: JsonRpcResponse = match serde_json::from_value(value) {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Ignoring non JSON-RPC message: {}", e);
                return Action::Continue;
            }
        };

        let Some(id) = response.numeric_id() else {
            tracing::debug!(method = ?response.method, "ignoring server notification");
            return Action::Continue;
        };

        match self.pending.complete(id) {
            Some(step) => self.on_response(step, response, reporter),
            None => {
                tracing::debug!(id, "response for unknown request id");
                Action::Continue
            }
        }
    }

    fn on_response<W: std::io::Write>(
        &mut self,
        step: Step,
        response: JsonRpcResponse,
        reporter: &mut Reporter<W>,
    ) -> Action {
        match step {
            Step::Initialize => {
                let init: InitializeResult = response
                    .result
                    .and_then(|r| serde_json::from_value(r).ok())
                    .unwrap_or_default();
                if let Some(info) = &init.server_info {
                    tracing::info!(name = %info.name, version = %info.version, "server initialized");
                }
                reporter.initialized(&init.capabilities);
                self.state = HarnessState::Initialized;

                reporter.tools_listing();
                Action::Send(self.request(Step::ListTools, methods::LIST_TOOLS, json!({})))
            }
            Step::ListTools => {
                let tools = response
                    .result
                    .and_then(|r| serde_json::from_value::<ListToolsResult>(r).ok())
                    .map(|list| list.tools)
                    .unwrap_or_default();
                if tools.is_empty() {
                    reporter.no_tools();
                    self.state = HarnessState::Invoked;
                    return Action::Finish(Outcome::NoTools);
                }
                reporter.tools(&tools);
                self.state = HarnessState::ToolsListed;

                reporter.scraping();
                let params = CallToolParams {
                    name: firecrawl::SCRAPE_TOOL.to_string(),
                    arguments: json!({
                        "url": self.scrape_url,
                        "formats": ["markdown"],
                        "onlyMainContent": true,
                    }),
                };
                let params = serde_json::to_value(params).unwrap_or(Value::Null);
                Action::Send(self.request(Step::CallTool, methods::CALL_TOOL, params))
            }
            Step::CallTool => {
                self.state = HarnessState::Invoked;
                if let Some(error) = response.error {
                    reporter.expected_tool_error(&error.message);
                    return Action::Finish(Outcome::ToolError {
                        message: error.message,
                    });
                }

                let result = response.result.unwrap_or(Value::Null);
                let text = match serde_json::from_value::<CallToolResult>(result.clone()) {
                    Ok(call) => call
                        .first_text()
                        .map(str::to_string)
                        .unwrap_or_else(|| result.to_string()),
                    Err(_) => result.to_string(),
                };
                let excerpt = excerpt(&text, EXCERPT_CHARS);
                reporter.tool_result(&excerpt);
                Action::Finish(Outcome::ToolResult { excerpt })
            }
        }
    }
}
