//! MCP (Model Context Protocol) module
//!
//! Wire types and request correlation for talking to an MCP server.

pub mod pending;
pub mod types;
