//! SafeCommandExecutor: whitelisted, timeout-bounded execution of git
//!
//! # Security Features
//!
//! - **Whitelist-based validation**: Only pre-approved commands can execute
//! - **Injection prevention**: Arguments are passed as a vector, never through a shell
//! - **Working directory validation**: Validates existence before execution
//! - **Timeout control**: Hung processes are killed
//! - **No prompts**: `GIT_TERMINAL_PROMPT=0`, stdin closed
//!
//! # Example
//!
//! ```rust,no_run
//! use kaggle_publisher::{CommandSpec, SafeCommandExecutor};
//! use std::time::Duration;
//!
//! # async fn demo() -> Result<(), kaggle_publisher::CommandError> {
//! let mut executor = SafeCommandExecutor::new();
//! executor.set_timeout(Duration::from_secs(30));
//!
//! let output = executor
//!     .execute(&CommandSpec::git(std::env::temp_dir(), ["--version"]))
//!     .await?;
//! println!("{}", output.combined);
//! # Ok(())
//! # }
//! ```

use crate::core::traits::{CommandOutput, CommandRunner, CommandSpec};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Commands a publish run may execute
const ALLOWED_COMMANDS: &[&str] = &["git"];

/// Errors that can occur during command execution
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Command is not in the allowed whitelist
    #[error("Command '{0}' is not in the allowed whitelist")]
    CommandNotAllowed(String),

    /// Working directory does not exist or is not accessible
    #[error("Working directory does not exist: {0}")]
    InvalidWorkingDirectory(PathBuf),

    /// Command execution failed (e.g., binary not found, permission denied)
    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    /// Command exceeded the timeout duration
    #[error("Command timeout after {0:?}")]
    Timeout(Duration),
}

/// Safe command executor with security controls
#[derive(Debug, Clone)]
pub struct SafeCommandExecutor {
    /// Optional timeout for command execution
    timeout: Option<Duration>,
}

impl Default for SafeCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl SafeCommandExecutor {
    pub fn new() -> Self {
        Self { timeout: None }
    }

    /// Set command execution timeout.
    ///
    /// Commands exceeding this duration are killed.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    fn is_allowed(&self, command: &str) -> bool {
        ALLOWED_COMMANDS.contains(&command)
    }

    /// Execute a command with whitelist validation.
    ///
    /// A non-zero exit is not an error: it is reported through
    /// `CommandOutput::success` so callers can record it and move on.
    ///
    /// # Errors
    ///
    /// - `CommandError::CommandNotAllowed` - Command not in whitelist
    /// - `CommandError::InvalidWorkingDirectory` - Working directory missing
    /// - `CommandError::ExecutionFailed` - Binary not found or execution error
    /// - `CommandError::Timeout` - Command ran past the configured timeout
    pub async fn execute(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        if !self.is_allowed(&spec.program) {
            return Err(CommandError::CommandNotAllowed(spec.program.clone()));
        }

        if !spec.working_dir.is_dir() {
            return Err(CommandError::InvalidWorkingDirectory(
                spec.working_dir.clone(),
            ));
        }

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .current_dir(&spec.working_dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(
            program = %spec.program,
            subcommand = spec.subcommand(),
            dir = %spec.working_dir.display(),
            "spawning command"
        );

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| CommandError::Timeout(limit))?,
            None => command.output().await,
        }
        .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        debug!(
            subcommand = spec.subcommand(),
            exit_code = ?output.status.code(),
            "command finished"
        );

        Ok(CommandOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            combined,
        })
    }
}

#[async_trait]
impl CommandRunner for SafeCommandExecutor {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        self.execute(spec).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(program: &str, args: &[&str]) -> CommandSpec {
        CommandSpec {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            working_dir: std::env::temp_dir(),
        }
    }

    #[tokio::test]
    async fn test_allowed_command_git() {
        let executor = SafeCommandExecutor::new();
        let output = executor.execute(&spec("git", &["--version"])).await.unwrap();

        assert!(output.success);
        assert_eq!(output.exit_code, Some(0));
        assert!(output.combined.contains("git version"));
    }

    #[tokio::test]
    async fn test_rejected_command_rm() {
        let executor = SafeCommandExecutor::new();
        let result = executor.execute(&spec("rm", &["-rf", "/"])).await;

        assert!(
            matches!(result, Err(CommandError::CommandNotAllowed(_))),
            "rm should be rejected as not in whitelist"
        );
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_reported_not_raised() {
        let executor = SafeCommandExecutor::new();
        let output = executor
            .execute(&spec("git", &["definitely-not-a-subcommand"]))
            .await
            .unwrap();

        assert!(!output.success);
        assert!(!output.combined.is_empty(), "stderr should be captured");
    }

    #[tokio::test]
    async fn test_invalid_working_directory() {
        let executor = SafeCommandExecutor::new();
        let mut spec = spec("git", &["status"]);
        spec.working_dir = PathBuf::from("/nonexistent/directory/that/does/not/exist");

        let result = executor.execute(&spec).await;

        assert!(matches!(
            result,
            Err(CommandError::InvalidWorkingDirectory(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_with_timeout() {
        let mut executor = SafeCommandExecutor::new();
        executor.set_timeout(Duration::from_millis(100));

        // A shell alias keeps git busy past the limit
        let result = executor
            .execute(&spec("git", &["-c", "alias.hang=!sleep 5", "hang"]))
            .await;

        assert_eq!(result, Err(CommandError::Timeout(Duration::from_millis(100))));
    }

    #[tokio::test]
    async fn test_injection_attempt_via_arguments() {
        let executor = SafeCommandExecutor::new();
        // The semicolon reaches git as a literal argument
        let output = executor
            .execute(&spec("git", &["--version; rm -rf /"]))
            .await
            .unwrap();

        assert!(!output.success);
    }
}
