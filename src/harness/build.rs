//! Startup check: make sure the server artifact exists, building it if not

use std::process::Stdio;

use tokio::process::Command;

use crate::config::HarnessConfig;
use crate::error::{BuildError, Result};
use crate::harness::report::Reporter;

/// What the startup check had to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    /// The artifact was already there
    AlreadyBuilt,
    /// The build command ran and succeeded
    Built,
}

/// Build a command that runs `line` through the platform shell
pub fn shell_command(line: &str) -> Command {
    #[cfg(windows)]
    {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(line);
        cmd
    }
    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(line);
        cmd
    }
}

/// Check for the built server, running the build command when it is missing.
///
/// Fails with [`BuildError`] if the build cannot be launched or exits
/// unsuccessfully; the server must not be spawned in that case.
pub async fn ensure_built<W: std::io::Write>(
    config: &HarnessConfig,
    reporter: &mut Reporter<W>,
) -> Result<BuildStatus> {
    if config.artifact_exists() {
        tracing::debug!(path = %config.server_path().display(), "server artifact present");
        return Ok(BuildStatus::AlreadyBuilt);
    }

    reporter.build_started();
    tracing::info!(command = %config.build_command, "building server");

    let status = shell_command(&config.build_command)
        .current_dir(&config.server_dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|source| BuildError::Launch {
            command: config.build_command.clone(),
            source,
        })?;

    if status.success() {
        reporter.build_succeeded();
        Ok(BuildStatus::Built)
    } else {
        reporter.build_failed(&config.build_command);
        Err(BuildError::Failed {
            command: config.build_command.clone(),
            code: status.code(),
        }
        .into())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::HarnessError;

    fn config_in(dir: &std::path::Path, build_command: &str) -> HarnessConfig {
        let mut config = HarnessConfig::new(dir);
        config.build_command = build_command.to_string();
        config
    }

    #[test]
    fn test_present_artifact_skips_build() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("dist")).unwrap();
        std::fs::write(dir.path().join("dist/index.js"), "").unwrap();

        let config = config_in(dir.path(), "exit 1");
        let mut reporter = Reporter::new(Vec::new());
        let status = tokio_test::block_on(ensure_built(&config, &mut reporter)).unwrap();
        assert_eq!(status, BuildStatus::AlreadyBuilt);
        assert!(reporter.into_inner().is_empty());
    }

    #[test]
    fn test_missing_artifact_is_built() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "mkdir -p dist && touch dist/index.js");
        let mut reporter = Reporter::new(Vec::new());
        let status = tokio_test::block_on(ensure_built(&config, &mut reporter)).unwrap();
        assert_eq!(status, BuildStatus::Built);
        assert!(config.artifact_exists());

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(text.contains("Server built successfully"));
    }

    #[test]
    fn test_failed_build_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "exit 3");
        let mut reporter = Reporter::new(Vec::new());
        let err = tokio_test::block_on(ensure_built(&config, &mut reporter)).unwrap_err();
        match &err {
            HarnessError::Build(BuildError::Failed { code, .. }) => assert_eq!(*code, Some(3)),
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(err.exit_code(), 1);

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(text.contains("Build failed. Please run: exit 3"));
    }
}
