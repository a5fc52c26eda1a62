//! Error types for the Firecrawl MCP smoke harness
//!
//! Only build failures and local I/O problems are fatal. Protocol-level
//! errors returned by the server are part of the report, not of this
//! hierarchy.

use thiserror::Error;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum HarnessError {
    /// The server artifact was missing and the build step did not succeed
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// The server process could not be started
    #[error("Spawn error: {0}")]
    Spawn(#[from] SpawnError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    /// Process exit code the binary should use for this error
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// Build step errors
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("build command `{command}` exited with {}", describe_code(*code))]
    Failed { command: String, code: Option<i32> },

    #[error("failed to launch build command `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Server spawn errors
#[derive(Error, Debug)]
pub enum SpawnError {
    #[error("failed to start `{program}`: {source}")]
    Start {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("child process {stream} was not captured")]
    StreamNotCaptured { stream: &'static str },
}

/// Errors writing requests to the server. These end the conversation but
/// not the run.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("server stdin is closed")]
    StdinClosed,

    #[error("failed to write request {id}: {source}")]
    Write {
        id: u64,
        #[source]
        source: std::io::Error,
    },
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, HarnessError>;
