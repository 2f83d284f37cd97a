//! Configuration structures and types for kaggle-publisher
//!
//! This module provides type-safe configuration management with serde support.
//! Every section carries its own defaults so a partial YAML file is enough.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Current configuration schema version
pub const CONFIG_VERSION: &str = "1.0";

/// Root configuration object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PublishConfig {
    /// Schema version
    pub version: String,

    /// Remote repository coordinates
    pub github: GithubConfig,

    /// Credential sources and their settings
    pub credentials: CredentialsConfig,

    /// Commit author identity
    pub identity: IdentityConfig,

    /// Working copy settings
    pub repository: RepositoryConfig,

    /// Branch naming strategy
    pub branch: BranchStrategy,

    /// Run artifact location and naming
    pub artifact: ArtifactConfig,

    /// Commit message settings
    pub commit: CommitConfig,

    /// Push settings
    pub push: PushConfig,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            github: GithubConfig::default(),
            credentials: CredentialsConfig::default(),
            identity: IdentityConfig::default(),
            repository: RepositoryConfig::default(),
            branch: BranchStrategy::default(),
            artifact: ArtifactConfig::default(),
            commit: CommitConfig::default(),
            push: PushConfig::default(),
        }
    }
}

/// Remote repository coordinates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GithubConfig {
    /// Account that owns the repository and authenticates the push
    pub username: String,

    /// Repository name (without `.git`)
    pub repo: String,

    /// Git host (default: "github.com")
    pub host: String,

    /// Name of the remote registered in the working copy (default: "origin")
    pub remote_name: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            repo: String::new(),
            host: "github.com".to_string(),
            remote_name: "origin".to_string(),
        }
    }
}

/// Where a credential may come from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialSourceKind {
    /// Token file inside an attached dataset
    File,
    /// Notebook platform user secrets
    #[serde(alias = "secrets")]
    KaggleSecrets,
    /// Process environment variable
    Env,
}

impl CredentialSourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::KaggleSecrets => "kaggle-secrets",
            Self::Env => "env",
        }
    }
}

impl fmt::Display for CredentialSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "file" => Ok(Self::File),
            "kaggle-secrets" | "secrets" => Ok(Self::KaggleSecrets),
            "env" => Ok(Self::Env),
            other => Err(format!(
                "unknown credential source '{}' (expected file, kaggle-secrets or env)",
                other
            )),
        }
    }
}

/// Credential resolution settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CredentialsConfig {
    /// Sources tried in order; first non-empty value wins
    pub sources: Vec<CredentialSourceKind>,

    /// Root directory of attached datasets
    pub input_root: PathBuf,

    /// Token file candidates relative to `input_root`, primary first
    pub token_files: Vec<PathBuf>,

    /// Secret label looked up in the platform secrets service
    pub secret_name: String,

    /// Override for the secrets service base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secrets_url_base: Option<String>,

    /// Timeout for the secrets request, in seconds
    pub secrets_timeout_secs: u64,

    /// Environment variable read by the `env` source
    pub env_var: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            sources: vec![CredentialSourceKind::File, CredentialSourceKind::KaggleSecrets],
            input_root: PathBuf::from("/kaggle/input"),
            token_files: vec![
                PathBuf::from("github-credentials/github_token.txt"),
                PathBuf::from("github_token.txt"),
            ],
            secret_name: "GITHUB_TOKEN".to_string(),
            secrets_url_base: None,
            secrets_timeout_secs: 30,
            env_var: "GITHUB_TOKEN".to_string(),
        }
    }
}

impl CredentialsConfig {
    /// Absolute token file candidates, primary first
    pub fn token_paths(&self) -> Vec<PathBuf> {
        self.token_files
            .iter()
            .map(|p| self.input_root.join(p))
            .collect()
    }

    pub fn secrets_timeout(&self) -> Duration {
        Duration::from_secs(self.secrets_timeout_secs)
    }
}

/// Scope of `git config` for the author identity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdentityScope {
    /// `git config --global`, applied before the working copy exists
    #[default]
    Global,
    /// Repository-local config, applied once the working copy exists
    Local,
}

/// Commit author identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct IdentityConfig {
    pub name: String,
    pub email: String,
    pub scope: IdentityScope,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            name: "Kaggle Verify Bot".to_string(),
            email: "bot@kaggle.com".to_string(),
            scope: IdentityScope::Global,
        }
    }
}

/// How the working copy is obtained
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceMode {
    /// Remove any stale directory and clone fresh
    #[default]
    Clone,
    /// `git init` in place, reusing an existing repository
    Init,
}

/// Working copy settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RepositoryConfig {
    /// Working copy directory
    pub work_dir: PathBuf,

    /// Clone or init in place
    pub mode: WorkspaceMode,

    /// Pull the remote default branch before switching branches
    pub sync_default_branch: bool,

    /// Remote default branch used by the sync step
    pub default_branch: String,

    /// Timeout for each git invocation, in seconds
    pub command_timeout_secs: u64,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("/kaggle/working/repo"),
            mode: WorkspaceMode::Clone,
            sync_default_branch: false,
            default_branch: "main".to_string(),
            command_timeout_secs: 300,
        }
    }
}

impl RepositoryConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// `work_dir` against the process working directory; unchanged if that cannot be read
    pub fn absolute_work_dir(&self) -> PathBuf {
        std::path::absolute(&self.work_dir).unwrap_or_else(|_| self.work_dir.clone())
    }
}

/// Branch naming strategy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum BranchStrategy {
    /// Same branch on every run
    Static { name: String },
    /// `<prefix><YYYYMMDD-HHMMSS>`
    Timestamped { prefix: String },
}

impl Default for BranchStrategy {
    fn default() -> Self {
        Self::Timestamped {
            prefix: "kaggle-run-".to_string(),
        }
    }
}

/// Default static branch name
pub const DEFAULT_STATIC_BRANCH: &str = "verify-kaggle-push";

/// Artifact file naming
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "style", rename_all = "lowercase")]
pub enum ArtifactNaming {
    /// `<prefix><YYYYMMDD-HHMMSS>.txt`
    Timestamped { prefix: String },
    /// Same file name on every run
    Fixed {
        #[serde(rename = "fileName")]
        file_name: String,
    },
}

impl Default for ArtifactNaming {
    fn default() -> Self {
        Self::Timestamped {
            prefix: "run_".to_string(),
        }
    }
}

/// Run artifact settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ArtifactConfig {
    /// Subdirectory of the working copy; empty means repository root
    pub directory: String,

    pub naming: ArtifactNaming,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            directory: "data".to_string(),
            naming: ArtifactNaming::default(),
        }
    }
}

/// Commit settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CommitConfig {
    /// Text placed before the run stamp in the commit message
    pub message_prefix: String,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            message_prefix: "Kaggle experiment run:".to_string(),
        }
    }
}

/// Push settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct PushConfig {
    /// Overwrite the remote branch head
    pub force: bool,
}
