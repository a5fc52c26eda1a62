//! Smoke-test harness
//!
//! Drives one run against the server: check the build, spawn, hold the
//! three-step conversation, then shut the server down and report how it
//! exited.

pub mod build;
pub mod conversation;
pub mod process;
pub mod report;
pub mod state;

use std::io::Write;

use crate::config::HarnessConfig;
use crate::error::Result;

use self::conversation::{Action, Conversation, Outcome};
use self::process::{ServerEvent, ServerProcess};
use self::report::Reporter;
use self::state::HarnessState;

/// Result of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// How the conversation ended; `None` if the server went away first
    pub outcome: Option<Outcome>,
    /// Server exit code; `None` if it was killed by a signal
    pub exit_code: Option<i32>,
    /// Last state the conversation reached
    pub reached: HarnessState,
}

/// Run the harness once.
///
/// Only a failed build (or a server that cannot be started at all) is an
/// error. Everything the server says, including error responses and
/// garbage on stdout, ends up in the report.
pub async fn run<W: Write>(config: &HarnessConfig, reporter: &mut Reporter<W>) -> Result<RunSummary> {
    reporter.banner();

    let mut state = HarnessState::CheckBuilt;
    tracing::debug!(%state, path = %config.server_path().display(), "checking server build");
    if !config.artifact_exists() {
        state = HarnessState::Building;
        tracing::debug!(%state, "server artifact missing");
    }
    build::ensure_built(config, reporter).await?;

    reporter.server_path(&config.server_path());
    reporter.api_key_status(config.has_api_key());
    if !config.has_api_key() {
        tracing::warn!("No API key configured, using placeholder");
    }
    reporter.features();

    reporter.startup();
    let mut server = ServerProcess::spawn(config)?;
    let mut conversation = Conversation::new(config.scrape_url.clone());

    let mut outcome = None;
    let initialize = conversation.start();
    match server.send(&initialize).await {
        Ok(()) => {
            while let Some(event) = server.next_event().await {
                match event {
                    ServerEvent::Stdout(line) => match conversation.handle_line(&line, reporter) {
                        Action::Continue => {}
                        Action::Send(request) => {
                            if let Err(e) = server.send(&request).await {
                                tracing::warn!("Failed to send {}: {}", request.method, e);
                                reporter.transport_failure(&e);
                                break;
                            }
                        }
                        Action::Finish(done) => {
                            outcome = Some(done);
                            break;
                        }
                    },
                    ServerEvent::Stderr(text) => reporter.server_stderr(&text),
                }
            }
        }
        Err(e) => {
            tracing::warn!("Failed to send initialize: {}", e);
            reporter.transport_failure(&e);
        }
    }
    let reached = conversation.state();
    if reached.is_finished() {
        tracing::info!(state = %reached, "conversation over, shutting server down");
    } else {
        tracing::warn!(state = %reached, "server stopped answering before the conversation finished");
    }

    let status = server.shutdown(config.grace_period).await?;
    let late = server.drain(config.grace_period).await;
    absorb_late_output(&mut conversation, late, reporter, &mut outcome);
    let reached = conversation.state();

    reporter.exit(status.code());
    tracing::debug!(state = %HarnessState::Terminated, ?status, "server terminated");

    Ok(RunSummary {
        outcome,
        exit_code: status.code(),
        reached,
    })
}

/// Report output that arrived after the conversation loop stopped. A
/// response that finishes the conversation still counts; requests it would
/// trigger are dropped since the server is already gone.
fn absorb_late_output<W: Write>(
    conversation: &mut Conversation,
    events: Vec<ServerEvent>,
    reporter: &mut Reporter<W>,
    outcome: &mut Option<Outcome>,
) {
    for event in events {
        match event {
            ServerEvent::Stdout(line) => match conversation.handle_line(&line, reporter) {
                Action::Continue => {}
                Action::Send(request) => {
                    tracing::debug!(id = request.id, method = %request.method, "server exited, dropping request");
                }
                Action::Finish(done) => {
                    if outcome.is_none() {
                        *outcome = Some(done);
                    }
                }
            },
            ServerEvent::Stderr(text) => reporter.server_stderr(&text),
        }
    }
}
