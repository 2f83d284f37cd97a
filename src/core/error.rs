//! Error handling for publish runs
//!
//! This module provides the run-level error taxonomy with recovery guidance
//! using the thiserror crate for ergonomic error handling.

use thiserror::Error;

/// Main error type for publish run operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    // Credential errors
    #[error("GITHUB_TOKEN not found (tried: {})", attempted.join(", "))]
    NoCredentialFound { attempted: Vec<String> },

    // Repository errors
    #[error("[{step}] command failed: {command}\n{output}")]
    CommandFailed {
        step: String,
        command: String,
        output: String,
    },

    #[error("failed to write artifact {path}: {message}")]
    ArtifactWriteFailed { path: String, message: String },

    // Push errors
    #[error("push of branch '{branch}' failed\n{output}")]
    PushFailed { branch: String, output: String },

    // Configuration errors
    #[error("configuration error: {0}")]
    ConfigError(String),

    // Stage errors
    #[error("invalid stage transition: {from} -> {to}")]
    InvalidStageTransition { from: String, to: String },
}

impl PublishError {
    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::NoCredentialFound { .. } => vec![
                "Attach a dataset containing github-credentials/github_token.txt",
                "Or add a GITHUB_TOKEN secret under Add-ons > Secrets",
                "Check that the notebook is allowed to read the secret",
            ],
            Self::CommandFailed { .. } => vec![
                "Check the command output above",
                "Verify that git is installed and on PATH",
            ],
            Self::ArtifactWriteFailed { .. } => vec![
                "Check that the working directory is writable",
                "Check the configured artifact directory and file name",
            ],
            Self::PushFailed { .. } => vec![
                "Check that the token has write access to the repository",
                "Check network access from the notebook (Internet setting)",
                "Enable sync with the default branch if histories are unrelated",
            ],
            Self::ConfigError(_) => vec![
                "Check .kaggle-publish.yaml and PUBLISH_* environment variables",
            ],
            Self::InvalidStageTransition { .. } => vec!["Report this as a bug"],
        }
    }

    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoCredentialFound { .. } => "NO_CREDENTIAL_FOUND",
            Self::CommandFailed { .. } => "COMMAND_FAILED",
            Self::ArtifactWriteFailed { .. } => "ARTIFACT_WRITE_FAILED",
            Self::PushFailed { .. } => "PUSH_FAILED",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidStageTransition { .. } => "INVALID_STAGE_TRANSITION",
        }
    }
}
