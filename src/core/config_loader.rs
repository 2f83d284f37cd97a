//! Configuration file loader for kaggle-publisher
//!
//! This module provides configuration loading, validation, and merging capabilities.
//! Layers are merged as YAML documents so a higher layer only needs to name the
//! keys it overrides.

use super::config::*;
use super::target::is_valid_branch_name;
use crate::core::error::PublishError;
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Configuration file name
pub const CONFIG_FILENAME: &str = ".kaggle-publish.yaml";

/// Environment variable pattern (${VAR_NAME})
const ENV_VAR_PATTERN: &str = r"\$\{([A-Z_][A-Z0-9_]*)\}";

/// Typed overrides coming from the command line or `PUBLISH_*` variables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub username: Option<String>,
    pub repo: Option<String>,
    pub work_dir: Option<PathBuf>,
    pub input_root: Option<PathBuf>,
    /// Switches the run to a static branch with this name
    pub static_branch: Option<String>,
    pub mode: Option<WorkspaceMode>,
    pub sync_default_branch: Option<bool>,
    pub force_push: Option<bool>,
    pub sources: Option<Vec<CredentialSourceKind>>,
}

impl ConfigOverrides {
    /// Read overrides from `PUBLISH_*` environment variables
    pub fn from_env(env: &HashMap<String, String>) -> Self {
        let flag = |key: &str| env.get(key).map(|v| v == "true" || v == "1");

        Self {
            username: env.get("PUBLISH_GITHUB_USERNAME").cloned(),
            repo: env.get("PUBLISH_GITHUB_REPO").cloned(),
            work_dir: env.get("PUBLISH_WORK_DIR").map(PathBuf::from),
            input_root: env.get("PUBLISH_INPUT_ROOT").map(PathBuf::from),
            static_branch: env.get("PUBLISH_BRANCH").cloned(),
            mode: None,
            sync_default_branch: flag("PUBLISH_SYNC_DEFAULT_BRANCH"),
            force_push: flag("PUBLISH_FORCE_PUSH"),
            sources: None,
        }
    }

    /// Convert into a YAML layer; `None` when nothing is overridden
    pub fn to_layer(&self) -> Option<Value> {
        let mut root = Mapping::new();

        if let Some(username) = &self.username {
            set_path(&mut root, &["github", "username"], username.as_str().into());
        }
        if let Some(repo) = &self.repo {
            set_path(&mut root, &["github", "repo"], repo.as_str().into());
        }
        if let Some(work_dir) = &self.work_dir {
            set_path(
                &mut root,
                &["repository", "workDir"],
                work_dir.to_string_lossy().as_ref().into(),
            );
        }
        if let Some(input_root) = &self.input_root {
            set_path(
                &mut root,
                &["credentials", "inputRoot"],
                input_root.to_string_lossy().as_ref().into(),
            );
        }
        if let Some(branch) = &self.static_branch {
            set_path(&mut root, &["branch", "strategy"], "static".into());
            set_path(&mut root, &["branch", "name"], branch.as_str().into());
        }
        if let Some(mode) = self.mode {
            let mode = match mode {
                WorkspaceMode::Clone => "clone",
                WorkspaceMode::Init => "init",
            };
            set_path(&mut root, &["repository", "mode"], mode.into());
        }
        if let Some(sync) = self.sync_default_branch {
            set_path(&mut root, &["repository", "syncDefaultBranch"], sync.into());
        }
        if let Some(force) = self.force_push {
            set_path(&mut root, &["push", "force"], force.into());
        }
        if let Some(sources) = &self.sources {
            let list = sources
                .iter()
                .map(|s| Value::from(s.as_str()))
                .collect::<Vec<_>>();
            set_path(&mut root, &["credentials", "sources"], Value::Sequence(list));
        }

        if root.is_empty() {
            None
        } else {
            Some(Value::Mapping(root))
        }
    }
}

fn set_path(root: &mut Mapping, path: &[&str], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for key in parents {
        let entry = current
            .entry(Value::from(*key))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if !entry.is_mapping() {
            *entry = Value::Mapping(Mapping::new());
        }
        let Value::Mapping(next) = entry else {
            return;
        };
        current = next;
    }
    current.insert(Value::from(*last), value);
}

/// Configuration load options
#[derive(Debug, Clone)]
pub struct ConfigLoadOptions {
    /// Project path to load config from
    pub project_path: PathBuf,

    /// Explicit config file; replaces the project file lookup
    pub config_file: Option<PathBuf>,

    /// CLI arguments (highest priority)
    pub cli_args: Option<ConfigOverrides>,

    /// Environment variables
    pub env: HashMap<String, String>,
}

/// Configuration validation result
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationResult {
    /// Is configuration valid?
    pub valid: bool,

    /// Validation errors
    pub errors: Vec<ConfigValidationError>,

    /// Validation warnings
    pub warnings: Vec<ConfigValidationWarning>,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Field path (e.g., "github.username")
    pub field: String,

    /// Error message
    pub message: String,
}

/// Configuration validation warning
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationWarning {
    /// Field path
    pub field: String,

    /// Warning message
    pub message: String,

    /// Suggestion
    pub suggestion: Option<String>,
}

/// Configuration file loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from multiple sources with priority
    ///
    /// Priority (high to low):
    /// 1. CLI arguments
    /// 2. Environment variables
    /// 3. Project config (./.kaggle-publish.yaml or --config)
    /// 4. Global config (~/.kaggle-publish.yaml)
    /// 5. Default values
    pub async fn load(options: ConfigLoadOptions) -> Result<PublishConfig, PublishError> {
        let mut layers: Vec<Value> = Vec::new();

        // 5. Default values (lowest priority)
        layers.push(serde_yaml::to_value(PublishConfig::default()).map_err(|e| {
            PublishError::ConfigError(format!("Failed to serialize defaults: {}", e))
        })?);

        // 4. Global config
        if let Some(global_config) = Self::load_global_config(&options.env).await? {
            layers.push(global_config);
        }

        // 3. Project config
        match &options.config_file {
            Some(path) => {
                let layer = Self::load_config_file(path).await?.ok_or_else(|| {
                    PublishError::ConfigError(format!(
                        "Config file not found: {}",
                        path.display()
                    ))
                })?;
                layers.push(layer);
            }
            None => {
                let path = options.project_path.join(CONFIG_FILENAME);
                if let Some(project_config) = Self::load_config_file(&path).await? {
                    layers.push(project_config);
                }
            }
        }

        // 2. Environment variables
        if let Some(env_config) = ConfigOverrides::from_env(&options.env).to_layer() {
            layers.push(env_config);
        }

        // 1. CLI arguments (highest priority)
        if let Some(cli_config) = options.cli_args.as_ref().and_then(|c| c.to_layer()) {
            layers.push(cli_config);
        }

        let merged = Self::merge_layers(layers);
        let expanded = Self::expand_env_vars(merged, &options.env);

        let mut config: PublishConfig = serde_yaml::from_value(expanded)
            .map_err(|e| PublishError::ConfigError(format!("Invalid configuration: {}", e)))?;

        // Clone runs in the parent directory; every later step must see the same path
        config.repository.work_dir =
            std::path::absolute(&config.repository.work_dir).map_err(|e| {
                PublishError::ConfigError(format!(
                    "Invalid repository.workDir '{}': {}",
                    config.repository.work_dir.display(),
                    e
                ))
            })?;

        Ok(config)
    }

    /// Load global configuration from ~/.kaggle-publish.yaml
    async fn load_global_config(
        env: &HashMap<String, String>,
    ) -> Result<Option<Value>, PublishError> {
        let Some(home_dir) = env.get("HOME") else {
            debug!("HOME not set, skipping global config");
            return Ok(None);
        };

        Self::load_config_file(&PathBuf::from(home_dir).join(CONFIG_FILENAME)).await
    }

    /// Load one YAML layer; `None` when the file does not exist
    async fn load_config_file(file_path: &Path) -> Result<Option<Value>, PublishError> {
        if !file_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(file_path).await.map_err(|e| {
            PublishError::ConfigError(format!(
                "Failed to read config file {}: {}",
                file_path.display(),
                e
            ))
        })?;

        let layer: Value = serde_yaml::from_str(&content).map_err(|e| {
            PublishError::ConfigError(format!(
                "Failed to parse YAML config {}: {}",
                file_path.display(),
                e
            ))
        })?;

        debug!(path = %file_path.display(), "loaded config layer");
        Ok(Some(layer))
    }

    /// Merge layers in order; later layers win key by key
    fn merge_layers(layers: Vec<Value>) -> Value {
        let mut result = Value::Mapping(Mapping::new());

        for layer in layers {
            Self::merge_into(&mut result, layer);
        }

        result
    }

    /// Merge source layer into target
    fn merge_into(target: &mut Value, source: Value) {
        match (target, source) {
            (_, Value::Null) => {}
            (Value::Mapping(target_map), Value::Mapping(source_map)) => {
                for (key, value) in source_map {
                    match target_map.get_mut(&key) {
                        Some(existing) => Self::merge_into(existing, value),
                        None => {
                            if !value.is_null() {
                                target_map.insert(key, value);
                            }
                        }
                    }
                }
            }
            (target, source) => *target = source,
        }
    }

    /// Expand `${VAR}` references in every string value
    fn expand_env_vars(config: Value, env: &HashMap<String, String>) -> Value {
        match config {
            Value::String(s) => Value::String(Self::expand_string(&s, env)),
            Value::Sequence(items) => Value::Sequence(
                items
                    .into_iter()
                    .map(|v| Self::expand_env_vars(v, env))
                    .collect(),
            ),
            Value::Mapping(map) => Value::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, Self::expand_env_vars(v, env)))
                    .collect(),
            ),
            other => other,
        }
    }

    /// Expand environment variables in a single string
    fn expand_string(input: &str, env: &HashMap<String, String>) -> String {
        let Ok(env_var_regex) = Regex::new(ENV_VAR_PATTERN) else {
            return input.to_string();
        };

        let mut result = input.to_string();
        for cap in env_var_regex.captures_iter(input) {
            let var_name = &cap[1];

            if let Some(value) = env.get(var_name) {
                result = result.replace(&format!("${{{}}}", var_name), value);
            } else {
                warn!(var = var_name, "environment variable referenced in config not found");
            }
        }

        result
    }

    /// Validate configuration
    pub fn validate(config: &PublishConfig) -> ConfigValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        // 1. Check version (required)
        if config.version.is_empty() {
            errors.push(error("version", "Version is required"));
        } else if config.version != CONFIG_VERSION {
            warnings.push(ConfigValidationWarning {
                field: "version".to_string(),
                message: format!("Unknown version: {}", config.version),
                suggestion: Some(format!(
                    "Currently supported version is \"{}\" only",
                    CONFIG_VERSION
                )),
            });
        }

        // 2. Remote coordinates
        Self::validate_github(&config.github, &mut errors);

        // 3. Credentials
        if config.credentials.sources.is_empty() {
            errors.push(error(
                "credentials.sources",
                "At least one credential source is required",
            ));
        }
        if config.credentials.secrets_timeout_secs == 0 {
            errors.push(error(
                "credentials.secretsTimeoutSecs",
                "Timeout must be greater than zero",
            ));
        }

        // 4. Identity
        if config.identity.name.trim().is_empty() {
            errors.push(error("identity.name", "Identity name is required"));
        }
        if config.identity.email.trim().is_empty() {
            errors.push(error("identity.email", "Identity email is required"));
        } else if !config.identity.email.contains('@') {
            warnings.push(ConfigValidationWarning {
                field: "identity.email".to_string(),
                message: format!("'{}' does not look like an email", config.identity.email),
                suggestion: None,
            });
        }

        // 5. Repository
        if config.repository.command_timeout_secs == 0 {
            errors.push(error(
                "repository.commandTimeoutSecs",
                "Timeout must be greater than zero",
            ));
        }
        if config.repository.sync_default_branch
            && !is_valid_branch_name(&config.repository.default_branch)
        {
            errors.push(error(
                "repository.defaultBranch",
                "Default branch is not a valid branch name",
            ));
        }

        // 6. Branch
        Self::validate_branch(&config.branch, &mut errors);

        // 7. Artifact
        Self::validate_artifact(&config.artifact, &mut errors);

        // 8. Push
        if config.push.force {
            warnings.push(ConfigValidationWarning {
                field: "push.force".to_string(),
                message: "Force push overwrites the remote branch head".to_string(),
                suggestion: Some("Use a timestamped branch to keep earlier runs".to_string()),
            });
        }

        ConfigValidationResult {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    fn validate_github(github: &GithubConfig, errors: &mut Vec<ConfigValidationError>) {
        let url_safe = |s: &str| {
            !s.is_empty()
                && s
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        };

        if github.username.is_empty() {
            errors.push(error("github.username", "GitHub username is required"));
        } else if !url_safe(&github.username) {
            errors.push(error(
                "github.username",
                "Username may only contain letters, digits, '-', '_' and '.'",
            ));
        }

        if github.repo.is_empty() {
            errors.push(error("github.repo", "Repository name is required"));
        } else if !url_safe(&github.repo) {
            errors.push(error(
                "github.repo",
                "Repository name may only contain letters, digits, '-', '_' and '.'",
            ));
        }

        if github.host.is_empty() || github.host.contains(['/', '@', ' ']) {
            errors.push(error("github.host", "Host must be a bare host name"));
        }

        if !is_valid_branch_name(&github.remote_name) || github.remote_name.contains('/') {
            errors.push(error("github.remoteName", "Remote name is not valid"));
        }
    }

    fn validate_branch(branch: &BranchStrategy, errors: &mut Vec<ConfigValidationError>) {
        match branch {
            BranchStrategy::Static { name } => {
                if !is_valid_branch_name(name) {
                    errors.push(error(
                        "branch.name",
                        &format!("'{}' is not a valid branch name", name),
                    ));
                }
            }
            BranchStrategy::Timestamped { prefix } => {
                if !is_valid_branch_name(&format!("{}20240101-120000", prefix)) {
                    errors.push(error(
                        "branch.prefix",
                        &format!("'{}' does not produce valid branch names", prefix),
                    ));
                }
            }
        }
    }

    fn validate_artifact(artifact: &ArtifactConfig, errors: &mut Vec<ConfigValidationError>) {
        let directory = Path::new(&artifact.directory);
        let escapes = directory
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            errors.push(error(
                "artifact.directory",
                "Directory must be relative to the working copy",
            ));
        }

        let file_name = match &artifact.naming {
            ArtifactNaming::Timestamped { prefix } => format!("{}20240101-120000.txt", prefix),
            ArtifactNaming::Fixed { file_name } => file_name.clone(),
        };
        if file_name.is_empty()
            || file_name.contains(['/', '\\'])
            || file_name == "."
            || file_name == ".."
        {
            errors.push(error(
                "artifact.naming",
                "Artifact file name must be a plain file name",
            ));
        }
    }

    /// Format validation result as human-readable string
    pub fn format_validation_result(result: &ConfigValidationResult) -> String {
        let mut lines = Vec::new();

        if result.valid {
            lines.push("✅ Configuration validation succeeded".to_string());
        } else {
            lines.push("❌ Configuration has errors".to_string());
        }

        if !result.errors.is_empty() {
            lines.push("\n🔴 Errors:".to_string());
            for error in &result.errors {
                lines.push(format!("  - [{}] {}", error.field, error.message));
            }
        }

        if !result.warnings.is_empty() {
            lines.push("\n🟡 Warnings:".to_string());
            for warning in &result.warnings {
                lines.push(format!("  - [{}] {}", warning.field, warning.message));
                if let Some(suggestion) = &warning.suggestion {
                    lines.push(format!("    Suggestion: {}", suggestion));
                }
            }
        }

        lines.join("\n")
    }

    /// Render the default configuration as YAML
    pub fn render_default() -> Result<String, PublishError> {
        serde_yaml::to_string(&PublishConfig::default())
            .map_err(|e| PublishError::ConfigError(format!("Failed to render defaults: {}", e)))
    }

    /// Write the default configuration into `project_path`
    pub async fn write_default(project_path: &Path, force: bool) -> Result<PathBuf, PublishError> {
        let path = project_path.join(CONFIG_FILENAME);

        if path.exists() && !force {
            return Err(PublishError::ConfigError(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }

        fs::write(&path, Self::render_default()?).await.map_err(|e| {
            PublishError::ConfigError(format!("Failed to write {}: {}", path.display(), e))
        })?;

        Ok(path)
    }
}

fn error(field: &str, message: &str) -> ConfigValidationError {
    ConfigValidationError {
        field: field.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn valid_config() -> PublishConfig {
        let mut config = PublishConfig::default();
        config.github.username = "duyhxm".to_string();
        config.github.repo = "kaggle-api-test".to_string();
        config
    }

    fn load_options(project: &Path, env: HashMap<String, String>) -> ConfigLoadOptions {
        ConfigLoadOptions {
            project_path: project.to_path_buf(),
            config_file: None,
            cli_args: None,
            env,
        }
    }

    #[tokio::test]
    async fn test_load_defaults_without_files() {
        let dir = TempDir::new().unwrap();

        let config = ConfigLoader::load(load_options(dir.path(), HashMap::new()))
            .await
            .unwrap();

        assert_eq!(config, PublishConfig::default());
    }

    #[tokio::test]
    async fn test_layer_priority() {
        let home = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();

        std::fs::write(
            home.path().join(CONFIG_FILENAME),
            "github:\n  username: global-user\n  repo: global-repo\n",
        )
        .unwrap();
        std::fs::write(
            project.path().join(CONFIG_FILENAME),
            "github:\n  repo: project-repo\npush:\n  force: true\n",
        )
        .unwrap();

        let mut env = HashMap::new();
        env.insert(
            "HOME".to_string(),
            home.path().to_string_lossy().into_owned(),
        );
        env.insert("PUBLISH_FORCE_PUSH".to_string(), "false".to_string());

        let mut options = load_options(project.path(), env);
        options.cli_args = Some(ConfigOverrides {
            static_branch: Some("verify-kaggle-push".to_string()),
            ..Default::default()
        });

        let config = ConfigLoader::load(options).await.unwrap();

        assert_eq!(config.github.username, "global-user");
        assert_eq!(config.github.repo, "project-repo");
        assert!(!config.push.force);
        assert_eq!(
            config.branch,
            BranchStrategy::Static {
                name: "verify-kaggle-push".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_relative_work_dir_becomes_absolute() {
        let dir = TempDir::new().unwrap();
        let mut options = load_options(dir.path(), HashMap::new());
        options.cli_args = Some(ConfigOverrides {
            work_dir: Some(PathBuf::from("out/repo")),
            ..Default::default()
        });

        let config = ConfigLoader::load(options).await.unwrap();

        assert!(config.repository.work_dir.is_absolute());
        assert_eq!(
            config.repository.work_dir,
            std::env::current_dir().unwrap().join("out/repo")
        );
    }

    #[tokio::test]
    async fn test_explicit_config_file_must_exist() {
        let dir = TempDir::new().unwrap();
        let mut options = load_options(dir.path(), HashMap::new());
        options.config_file = Some(dir.path().join("missing.yaml"));

        let result = ConfigLoader::load(options).await;

        assert!(matches!(result, Err(PublishError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_env_var_expansion_in_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILENAME),
            "github:\n  username: ${KAGGLE_GH_USER}\n  repo: ${UNSET_VAR_NAME}\n",
        )
        .unwrap();

        let mut env = HashMap::new();
        env.insert("KAGGLE_GH_USER".to_string(), "duyhxm".to_string());

        let config = ConfigLoader::load(load_options(dir.path(), env))
            .await
            .unwrap();

        assert_eq!(config.github.username, "duyhxm");
        assert_eq!(config.github.repo, "${UNSET_VAR_NAME}");
    }

    #[test]
    fn test_overrides_from_env() {
        let mut env = HashMap::new();
        env.insert("PUBLISH_GITHUB_USERNAME".to_string(), "duyhxm".to_string());
        env.insert("PUBLISH_SYNC_DEFAULT_BRANCH".to_string(), "true".to_string());

        let overrides = ConfigOverrides::from_env(&env);

        assert_eq!(overrides.username.as_deref(), Some("duyhxm"));
        assert_eq!(overrides.sync_default_branch, Some(true));
        assert_eq!(overrides.force_push, None);
    }

    #[test]
    fn test_empty_overrides_produce_no_layer() {
        assert!(ConfigOverrides::default().to_layer().is_none());
    }

    #[test]
    fn test_merge_skips_null_values() {
        let base: Value = serde_yaml::from_str("github:\n  host: github.com\n").unwrap();
        let overlay: Value = serde_yaml::from_str("github:\npush:\n  force: true\n").unwrap();

        let merged = ConfigLoader::merge_layers(vec![base, overlay]);

        assert_eq!(merged["github"]["host"], Value::from("github.com"));
        assert_eq!(merged["push"]["force"], Value::from(true));
    }

    #[test]
    fn test_validate_requires_username_and_repo() {
        let result = ConfigLoader::validate(&PublishConfig::default());

        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.field == "github.username"));
        assert!(result.errors.iter().any(|e| e.field == "github.repo"));
    }

    #[test]
    fn test_validate_accepts_defaults_with_coordinates() {
        let result = ConfigLoader::validate(&valid_config());

        assert!(result.valid, "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_branch_name() {
        let mut config = valid_config();
        config.branch = BranchStrategy::Static {
            name: "bad branch..name".to_string(),
        };

        let result = ConfigLoader::validate(&config);

        assert!(!result.valid);
        assert_eq!(result.errors[0].field, "branch.name");
    }

    #[test]
    fn test_validate_rejects_escaping_artifact_directory() {
        let mut config = valid_config();
        config.artifact.directory = "../outside".to_string();

        let result = ConfigLoader::validate(&config);

        assert!(result.errors.iter().any(|e| e.field == "artifact.directory"));
    }

    #[test]
    fn test_validate_force_push_warning() {
        let mut config = valid_config();
        config.push.force = true;

        let result = ConfigLoader::validate(&config);

        assert!(result.valid);
        assert_eq!(result.warnings[0].field, "push.force");
    }

    #[test]
    fn test_format_validation_result() {
        let result = ConfigValidationResult {
            valid: false,
            errors: vec![error("github.repo", "Repository name is required")],
            warnings: vec![ConfigValidationWarning {
                field: "push.force".to_string(),
                message: "Force push overwrites the remote branch head".to_string(),
                suggestion: Some("Use a timestamped branch".to_string()),
            }],
        };

        let formatted = ConfigLoader::format_validation_result(&result);

        assert!(formatted.contains("❌ Configuration has errors"));
        assert!(formatted.contains("[github.repo]"));
        assert!(formatted.contains("🟡 Warnings:"));
        assert!(formatted.contains("Suggestion: Use a timestamped branch"));
    }

    #[tokio::test]
    async fn test_write_default_refuses_overwrite() {
        let dir = TempDir::new().unwrap();

        let path = ConfigLoader::write_default(dir.path(), false).await.unwrap();
        assert!(path.exists());

        let again = ConfigLoader::write_default(dir.path(), false).await;
        assert!(matches!(again, Err(PublishError::ConfigError(_))));

        assert!(ConfigLoader::write_default(dir.path(), true).await.is_ok());
    }
}
