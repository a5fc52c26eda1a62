//! Firecrawl MCP smoke harness - command line entry point

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use firecrawl_mcp_smoke::config::HarnessConfig;
use firecrawl_mcp_smoke::harness::{self, report::Reporter};

/// Smoke-test a Firecrawl MCP server over stdio
#[derive(Parser)]
#[command(name = "firecrawl-mcp-smoke")]
#[command(author, version, about = "Smoke-test a Firecrawl MCP server over stdio")]
struct Cli {
    /// Server project root (defaults to the current directory)
    #[arg(long)]
    server_dir: Option<PathBuf>,

    /// Built server entry point, relative to the server directory
    #[arg(long, default_value = "dist/index.js")]
    artifact: PathBuf,

    /// Program used to run the server
    #[arg(long, default_value = "node")]
    runtime: String,

    /// Shell command that builds the server when the artifact is missing
    #[arg(long, default_value = "npm run build")]
    build_command: String,

    /// Milliseconds to wait for the server to exit before killing it
    #[arg(long, default_value_t = 1000)]
    grace_ms: u64,

    /// URL passed to the scrape tool
    #[arg(long, default_value = "https://example.com")]
    url: String,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<HarnessConfig> {
        let server_dir = match self.server_dir {
            Some(dir) => dir,
            None => std::env::current_dir().context("failed to resolve current directory")?,
        };

        let mut config = HarnessConfig::new(server_dir);
        config.artifact = self.artifact;
        config.runtime = self.runtime;
        config.build_command = self.build_command;
        config.grace_period = Duration::from_millis(self.grace_ms);
        config.scrape_url = self.url;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Cli::parse().into_config()?;

    let mut reporter = Reporter::stdout();
    match harness::run(&config, &mut reporter).await {
        Ok(summary) => {
            tracing::debug!(?summary, "run complete");
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}
