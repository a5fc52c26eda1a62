//! Configuration for the smoke harness
//!
//! Handles paths, commands, and the API key environment variable.

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the Firecrawl API key
pub const API_KEY_VAR: &str = "FIRECRAWL_API_KEY";

/// Value injected into the child environment when no key is configured
pub const PLACEHOLDER_API_KEY: &str = "demo-key-for-testing";

/// Where to get a real key
pub const API_KEY_SIGNUP_URL: &str = "https://firecrawl.dev";

/// Configuration for one harness run
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Server project root, used as working directory for build and spawn
    pub server_dir: PathBuf,

    /// Built server artifact, relative to `server_dir` unless absolute
    pub artifact: PathBuf,

    /// Program that runs the artifact
    pub runtime: String,

    /// Shell command that produces the artifact
    pub build_command: String,

    /// API key from the environment, if any
    pub api_key: Option<String>,

    /// Upper bound on the wait between the last response and a forced kill
    pub grace_period: Duration,

    /// URL handed to the scrape tool
    pub scrape_url: String,
}

impl HarnessConfig {
    /// Create a configuration rooted at `server_dir`, reading the API key
    /// from the process environment
    pub fn new(server_dir: impl Into<PathBuf>) -> Self {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.is_empty());

        Self {
            server_dir: server_dir.into(),
            artifact: PathBuf::from("dist").join("index.js"),
            runtime: "node".to_string(),
            build_command: "npm run build".to_string(),
            api_key,
            grace_period: Duration::from_millis(1000),
            scrape_url: "https://example.com".to_string(),
        }
    }

    /// Absolute (or cwd-relative) path of the server artifact
    pub fn server_path(&self) -> PathBuf {
        if self.artifact.is_absolute() {
            self.artifact.clone()
        } else {
            self.server_dir.join(&self.artifact)
        }
    }

    /// Check if the built artifact exists
    pub fn artifact_exists(&self) -> bool {
        self.server_path().exists()
    }

    /// Whether a real API key was found
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Key passed to the child: the configured one or the placeholder
    pub fn effective_api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or(PLACEHOLDER_API_KEY)
    }
}

/// Firecrawl server constants
pub mod firecrawl {
    /// Tool exercised by the third step
    pub const SCRAPE_TOOL: &str = "firecrawl_scrape";

    /// Tools the Firecrawl server is expected to offer, with a short summary
    pub const FEATURES: &[(&str, &str)] = &[
        ("firecrawl_scrape", "Extract content from single web pages"),
        ("firecrawl_map", "Discover all URLs on a website"),
        ("firecrawl_crawl", "Crawl multiple pages and extract content"),
        ("firecrawl_check_crawl_status", "Check crawl job progress"),
        ("firecrawl_search", "Search the web with content extraction"),
        ("firecrawl_extract", "LLM-powered structured data extraction"),
        ("firecrawl_deep_research", "AI-powered research with multiple sources"),
        ("firecrawl_generate_llmstxt", "Generate LLMs.txt files for websites"),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_without_key() -> HarnessConfig {
        let mut config = HarnessConfig::new("/srv/firecrawl");
        config.api_key = None;
        config
    }

    #[test]
    fn test_default_server_path() {
        let config = config_without_key();
        assert_eq!(
            config.server_path(),
            PathBuf::from("/srv/firecrawl/dist/index.js")
        );
        assert_eq!(config.runtime, "node");
        assert_eq!(config.build_command, "npm run build");
        assert_eq!(config.grace_period, Duration::from_secs(1));
    }

    #[test]
    fn test_absolute_artifact_overrides_dir() {
        let mut config = config_without_key();
        config.artifact = PathBuf::from("/opt/server.js");
        assert_eq!(config.server_path(), PathBuf::from("/opt/server.js"));
    }

    #[test]
    fn test_placeholder_key() {
        let mut config = config_without_key();
        assert!(!config.has_api_key());
        assert_eq!(config.effective_api_key(), PLACEHOLDER_API_KEY);

        config.api_key = Some("fc-real".to_string());
        assert!(config.has_api_key());
        assert_eq!(config.effective_api_key(), "fc-real");
    }

    #[test]
    fn test_feature_catalogue_contains_scrape() {
        assert!(firecrawl::FEATURES
            .iter()
            .any(|(name, _)| *name == firecrawl::SCRAPE_TOOL));
        assert_eq!(firecrawl::FEATURES.len(), 8);
    }
}
