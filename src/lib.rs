//! Firecrawl MCP smoke harness
//!
//! Spawns an MCP server over stdio, walks it through `initialize`,
//! `tools/list` and one `tools/call`, and reports what came back.

pub mod config;
pub mod error;
pub mod harness;
pub mod mcp;

pub use config::HarnessConfig;
pub use error::{HarnessError, Result};
