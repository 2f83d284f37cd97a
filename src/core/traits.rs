//! Core traits and types for publish runs
//!
//! This module defines the two seams of a run: where a credential comes from
//! and how an external command gets executed.

use crate::security::command_executor::CommandError;
use async_trait::async_trait;
use secrecy::SecretString;
use std::fmt;
use std::path::PathBuf;

// ============================================================================
// Credential providers
// ============================================================================

/// A single place a credential may be found
///
/// `Ok(None)` means the source has nothing to offer; `Err` means the lookup
/// itself failed. Either way the resolver moves on to the next provider.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Source name used in logs and error messages (e.g. "file")
    fn name(&self) -> &str;

    /// Look the credential up
    async fn fetch(&self) -> anyhow::Result<Option<SecretString>>;
}

// ============================================================================
// Command execution
// ============================================================================

/// An external command to run
#[derive(Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl CommandSpec {
    /// `git <args>` in `working_dir`
    pub fn git<I, S>(working_dir: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: "git".to_string(),
            args: args.into_iter().map(Into::into).collect(),
            working_dir: working_dir.into(),
        }
    }

    /// Subcommand name, safe to log as-is
    pub fn subcommand(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or("")
    }
}

/// Full command line. May contain secrets: pass through a `Redactor` first.
impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("program", &self.program)
            .field("subcommand", &self.subcommand())
            .field("working_dir", &self.working_dir)
            .finish_non_exhaustive()
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    /// stdout followed by stderr
    pub combined: String,
}

/// Executes commands one at a time
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError>;
}
