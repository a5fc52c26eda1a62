//! Human-readable run report
//!
//! Everything the harness tells the user goes through [`Reporter`], which
//! writes to any [`Write`] sink (stdout in the binary, a buffer in tests).
//! Diagnostics for developers go through `tracing` instead.

use std::fmt;
use std::io::{self, Write};
use std::path::Path;

use serde_json::Value;

use crate::config::{firecrawl, API_KEY_SIGNUP_URL, API_KEY_VAR};
use crate::mcp::types::Tool;

/// Stderr fragments the server prints when running without a real key
pub const EXPECTED_STDERR_MARKERS: &[&str] = &[API_KEY_VAR, "environment variable"];

/// Maximum number of characters shown from a successful tool result
pub const EXCERPT_CHARS: usize = 200;

/// Whether a chunk of server stderr is a known, expected warning
pub fn is_expected_stderr(text: &str) -> bool {
    EXPECTED_STDERR_MARKERS
        .iter()
        .any(|marker| text.contains(marker))
}

/// First `max_chars` characters of `text`, followed by `...`
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

/// Writes the run report
pub struct Reporter<W: Write> {
    out: W,
}

impl Reporter<io::Stdout> {
    /// Reporter printing to the process stdout
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Give back the underlying sink
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = self.out.write_fmt(args).and_then(|_| self.out.write_all(b"\n")) {
            tracing::debug!("Failed to write report line: {}", e);
        }
    }

    // ==================== Startup ====================

    pub fn banner(&mut self) {
        self.line(format_args!("Testing Firecrawl MCP Server Capabilities\n"));
    }

    pub fn build_started(&mut self) {
        self.line(format_args!("Built server files not found. Building server..."));
    }

    pub fn build_succeeded(&mut self) {
        self.line(format_args!("Server built successfully. Starting test...\n"));
    }

    pub fn build_failed(&mut self, command: &str) {
        self.line(format_args!("Build failed. Please run: {}", command));
    }

    pub fn server_path(&mut self, path: &Path) {
        self.line(format_args!("Server path: {}", path.display()));
        self.line(format_args!("Checking server configuration...\n"));
    }

    pub fn api_key_status(&mut self, has_key: bool) {
        if has_key {
            self.line(format_args!("{} found - will test with live API\n", API_KEY_VAR));
        } else {
            self.line(format_args!("No {} environment variable found", API_KEY_VAR));
            self.line(format_args!(
                "This test will demonstrate the server interface without making actual API calls"
            ));
            self.line(format_args!(
                "To use with real API key, get one from: {}\n",
                API_KEY_SIGNUP_URL
            ));
        }
    }

    pub fn features(&mut self) {
        self.line(format_args!("Firecrawl MCP Server Features:"));
        for (name, summary) in firecrawl::FEATURES {
            self.line(format_args!("  - {} - {}", name, summary));
        }
        self.line(format_args!(""));
    }

    pub fn startup(&mut self) {
        self.line(format_args!("Testing MCP Server Startup..."));
    }

    // ==================== Conversation ====================

    pub fn initialized(&mut self, capabilities: &Value) {
        let pretty =
            serde_json::to_string_pretty(capabilities).unwrap_or_else(|_| capabilities.to_string());
        self.line(format_args!("Server initialized successfully"));
        self.line(format_args!("Server capabilities: {}", pretty));
    }

    pub fn tools_listing(&mut self) {
        self.line(format_args!("\nTesting Tools Listing..."));
    }

    pub fn tools(&mut self, tools: &[Tool]) {
        self.line(format_args!("Available tools:"));
        for tool in tools {
            self.line(format_args!("  - {}: {}", tool.name, tool.summary()));
        }
    }

    pub fn no_tools(&mut self) {
        self.line(format_args!("Server advertised no tools; skipping tool call"));
    }

    pub fn scraping(&mut self) {
        self.line(format_args!("\nTesting Web Scraping Operation..."));
    }

    pub fn expected_tool_error(&mut self, message: &str) {
        self.line(format_args!(
            "Expected API key error (demonstration successful): {}",
            message
        ));
        self.line(format_args!("Scraping tool interface working correctly"));
    }

    pub fn tool_result(&mut self, excerpt: &str) {
        self.line(format_args!("Scraping successful: {}", excerpt));
    }

    pub fn parse_error(&mut self, error: &serde_json::Error, raw: &str) {
        self.line(format_args!("Failed to parse JSON response: {}", error));
        self.line(format_args!("Raw server response: {}", raw));
        self.line(format_args!(
            "This might indicate the server sent invalid JSON or non-JSON data"
        ));
    }

    pub fn transport_failure(&mut self, error: &dyn std::error::Error) {
        self.line(format_args!("Lost connection to server: {}", error));
    }

    /// Echo server stderr unless it is an expected warning
    pub fn server_stderr(&mut self, text: &str) {
        if is_expected_stderr(text) {
            tracing::debug!(stderr = %text, "suppressed expected server warning");
            return;
        }
        self.line(format_args!("Server stderr: {}", text));
    }

    pub fn exit(&mut self, code: Option<i32>) {
        match code {
            Some(code) => self.line(format_args!("Server process exited with code {}", code)),
            None => self.line(format_args!("Server process exited with code null")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn output(reporter: Reporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_expected_stderr_filter() {
        assert!(is_expected_stderr("Warning: FIRECRAWL_API_KEY is not set"));
        assert!(is_expected_stderr("missing environment variable"));
        assert!(!is_expected_stderr("TypeError: cannot read property"));
    }

    #[test]
    fn test_stderr_suppressed_or_echoed() {
        let mut reporter = Reporter::new(Vec::new());
        reporter.server_stderr("FIRECRAWL_API_KEY not provided, demo mode");
        reporter.server_stderr("listening on stdio");
        let text = output(reporter);
        assert!(!text.contains("demo mode"));
        assert!(text.contains("Server stderr: listening on stdio"));
    }

    #[test]
    fn test_excerpt_truncates_on_chars() {
        let long = "é".repeat(300);
        let cut = excerpt(&long, EXCERPT_CHARS);
        assert_eq!(cut.chars().count(), EXCERPT_CHARS + 3);
        assert!(cut.ends_with("..."));
        assert_eq!(excerpt("short", EXCERPT_CHARS), "short...");
    }

    #[test]
    fn test_tools_print_first_line() {
        let tools: Vec<Tool> = serde_json::from_value(json!([
            {"name": "firecrawl_scrape", "description": "Scrape one page.\nLong help text"},
            {"name": "firecrawl_map"}
        ]))
        .unwrap();
        let mut reporter = Reporter::new(Vec::new());
        reporter.tools(&tools);
        let text = output(reporter);
        assert!(text.contains("  - firecrawl_scrape: Scrape one page.\n"));
        assert!(!text.contains("Long help text"));
        assert!(text.contains("  - firecrawl_map: \n"));
    }

    #[test]
    fn test_api_key_status_without_key() {
        let mut reporter = Reporter::new(Vec::new());
        reporter.api_key_status(false);
        let text = output(reporter);
        assert!(text.contains("No FIRECRAWL_API_KEY"));
        assert!(text.contains("https://firecrawl.dev"));
    }

    #[test]
    fn test_exit_without_code() {
        let mut reporter = Reporter::new(Vec::new());
        reporter.exit(None);
        reporter.exit(Some(0));
        let text = output(reporter);
        assert!(text.contains("exited with code null"));
        assert!(text.contains("exited with code 0"));
    }
}
