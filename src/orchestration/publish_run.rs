//! PublishRun - one credential, one artifact, one commit, one push
//!
//! Drives the run through its stages:
//! - Credential resolution (the only gate; nothing touches git before it passes)
//! - Repository preparation and commit
//! - Push and status report

use super::push_reporter::PushReporter;
use super::report::RepositoryReport;
use super::repository_publisher::RepositoryPublisher;
use crate::core::artifact::RunArtifact;
use crate::core::config::PublishConfig;
use crate::core::error::PublishError;
use crate::core::state_machine::{RunStage, RunStageMachine};
use crate::core::target::{PublishTarget, RunStamp};
use crate::core::traits::CommandRunner;
use crate::credentials::CredentialResolver;
use crate::security::Redactor;
use tracing::info;

pub const ABORT_MESSAGE: &str = "[CRITICAL] GITHUB_TOKEN not found! Process aborted.";

/// What a completed run did
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub credential_source: String,
    pub report: RepositoryReport,
    pub pushed: bool,
    /// Rendered status block
    pub status: String,
}

impl RunSummary {
    pub fn target(&self) -> &PublishTarget {
        &self.report.target
    }
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Stopped before any repository work
    Aborted(PublishError),
    Completed(RunSummary),
}

impl RunOutcome {
    /// Process exit code: 0 only when the branch reached the remote
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Completed(summary) if summary.pushed => 0,
            _ => 1,
        }
    }
}

/// A single publish run
pub struct PublishRun<'a> {
    config: &'a PublishConfig,
    resolver: CredentialResolver,
    runner: &'a dyn CommandRunner,
    stamp: RunStamp,
    stages: RunStageMachine,
}

impl<'a> PublishRun<'a> {
    /// `stamp` is the run's single clock reading
    pub fn new(
        config: &'a PublishConfig,
        resolver: CredentialResolver,
        runner: &'a dyn CommandRunner,
        stamp: RunStamp,
    ) -> Self {
        Self {
            config,
            resolver,
            runner,
            stamp,
            stages: RunStageMachine::new(),
        }
    }

    pub fn stages(&self) -> &RunStageMachine {
        &self.stages
    }

    pub async fn execute(&mut self) -> RunOutcome {
        match self.try_execute().await {
            Ok(summary) => RunOutcome::Completed(summary),
            Err(e) => RunOutcome::Aborted(e),
        }
    }

    async fn try_execute(&mut self) -> Result<RunSummary, PublishError> {
        info!(stamp = %self.stamp, "starting publish run");

        self.stages.transition(RunStage::ResolvingCredential)?;
        let credential = match self.resolver.resolve().await {
            Ok(credential) => credential,
            Err(e) => {
                self.stages.transition(RunStage::Aborted)?;
                return Err(e);
            }
        };

        let mut redactor = Redactor::new();
        redactor.register(credential.secret().clone());

        self.stages.transition(RunStage::PreparingRepository)?;
        let target = PublishTarget::for_run(self.config, &self.stamp);
        let work_dir = self.config.repository.absolute_work_dir();
        let artifact = RunArtifact::for_run(&self.config.artifact, &target, self.stamp, &work_dir);

        info!(branch = %target.branch, repo = %target.slug(), "publish target resolved");

        let mut report = RepositoryPublisher::new(self.config, &target, self.runner, &redactor)
            .publish(&credential, &artifact)
            .await;

        self.stages.transition(RunStage::Pushing)?;
        let reporter = PushReporter::new(&self.config.push, &work_dir, self.runner, &redactor);
        let pushed = reporter.push(&mut report).await;

        self.stages.transition(if pushed {
            RunStage::Succeeded
        } else {
            RunStage::PushFailed
        })?;

        let status = reporter.render_summary(&report);

        Ok(RunSummary {
            credential_source: credential.source().to_string(),
            report,
            pushed,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::CredentialProvider;
    use crate::credentials::{FileTokenProvider, KaggleSecretsProvider};
    use crate::orchestration::testing::RecordingRunner;
    use std::path::Path;
    use tempfile::TempDir;

    fn config(root: &Path) -> PublishConfig {
        let mut config = PublishConfig::default();
        config.github.username = "duyhxm".to_string();
        config.github.repo = "kaggle-api-test".to_string();
        config.credentials.input_root = root.join("input");
        config.repository.work_dir = root.join("working/repo");
        config
    }

    fn stamp() -> RunStamp {
        RunStamp::from_ymd_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    /// File source over the config's input root, then a secrets source with no session token
    fn resolver(config: &PublishConfig) -> CredentialResolver {
        let secrets = KaggleSecretsProvider::with_client(
            reqwest::Client::new(),
            "GITHUB_TOKEN",
            "http://127.0.0.1:9",
            None,
            None,
        );
        let providers: Vec<Box<dyn CredentialProvider>> = vec![
            Box::new(FileTokenProvider::new(config.credentials.token_paths())),
            Box::new(secrets),
        ];
        CredentialResolver::new(providers)
    }

    fn write_token(root: &Path, token: &str) {
        let dir = root.join("input/github-credentials");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("github_token.txt"), token).unwrap();
    }

    #[tokio::test]
    async fn test_successful_run() {
        let dir = TempDir::new().unwrap();
        write_token(dir.path(), "abc123\n");
        let config = config(dir.path());
        let runner = RecordingRunner::new();

        let mut run = PublishRun::new(&config, resolver(&config), &runner, stamp());
        let outcome = run.execute().await;

        assert_eq!(outcome.exit_code(), 0);
        let RunOutcome::Completed(summary) = outcome else {
            panic!("run should complete");
        };
        assert_eq!(summary.credential_source, "file");
        assert_eq!(summary.target().branch, "kaggle-run-20240101-120000");
        assert!(summary.pushed);
        assert!(summary.status.contains("Branch created: kaggle-run-20240101-120000"));

        let artifact = config
            .repository
            .work_dir
            .join("data/run_20240101-120000.txt");
        let body = std::fs::read_to_string(&artifact).unwrap();
        assert!(body.contains("Run ID: kaggle-run-20240101-120000"));
        assert!(body.contains("2024-01-01 12:00:00"));

        let calls = runner.calls();
        let push = calls.last().unwrap();
        assert_eq!(push.args, vec!["push", "origin", "kaggle-run-20240101-120000"]);
        assert_eq!(run.stages().current_stage(), RunStage::Succeeded);
    }

    #[tokio::test]
    async fn test_no_credential_aborts_before_any_git_command() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path());
        let runner = RecordingRunner::new();

        let mut run = PublishRun::new(&config, resolver(&config), &runner, stamp());
        let outcome = run.execute().await;

        assert_eq!(outcome.exit_code(), 1);
        match outcome {
            RunOutcome::Aborted(PublishError::NoCredentialFound { attempted }) => {
                assert_eq!(attempted, vec!["file", "kaggle-secrets"]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(runner.calls().is_empty());
        assert!(!config.repository.work_dir.exists());
        assert_eq!(run.stages().current_stage(), RunStage::Aborted);
        assert!(!run.stages().credential_resolved());
    }

    #[tokio::test]
    async fn test_push_failure_completes_with_failed_status() {
        let dir = TempDir::new().unwrap();
        write_token(dir.path(), "abc123");
        let config = config(dir.path());
        let runner = RecordingRunner::failing(&["push"]);

        let mut run = PublishRun::new(&config, resolver(&config), &runner, stamp());
        let outcome = run.execute().await;

        assert_eq!(outcome.exit_code(), 1);
        let RunOutcome::Completed(summary) = outcome else {
            panic!("run should complete");
        };
        assert!(!summary.pushed);
        assert!(summary.status.contains("[FAILED] Push failed"));
        assert!(!summary.status.contains("abc123"));
        assert_eq!(run.stages().current_stage(), RunStage::PushFailed);
    }

    #[tokio::test]
    async fn test_static_branch_and_fixed_artifact() {
        use crate::core::config::{ArtifactNaming, BranchStrategy};

        let dir = TempDir::new().unwrap();
        write_token(dir.path(), "abc123");
        let mut config = config(dir.path());
        config.branch = BranchStrategy::Static {
            name: "verify-kaggle-push".to_string(),
        };
        config.artifact.directory = String::new();
        config.artifact.naming = ArtifactNaming::Fixed {
            file_name: "kaggle_proof.txt".to_string(),
        };
        let runner = RecordingRunner::new();

        let outcome = PublishRun::new(&config, resolver(&config), &runner, stamp())
            .execute()
            .await;

        let RunOutcome::Completed(summary) = outcome else {
            panic!("run should complete");
        };
        assert_eq!(summary.target().branch, "verify-kaggle-push");
        assert!(config.repository.work_dir.join("kaggle_proof.txt").is_file());
        assert!(
            runner
                .calls()
                .iter()
                .any(|c| c.args == ["checkout", "-B", "verify-kaggle-push"])
        );
    }

    #[test]
    fn test_exit_codes() {
        let aborted = RunOutcome::Aborted(PublishError::NoCredentialFound { attempted: vec![] });
        assert_eq!(aborted.exit_code(), 1);
    }
}
