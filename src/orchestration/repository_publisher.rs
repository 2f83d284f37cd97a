//! Repository preparation: identity, working copy, remote, branch, artifact, commit
//!
//! Steps run strictly in order. A failing step is recorded and logged and the
//! next step still runs; nothing here aborts the run.

use super::report::{RepositoryReport, StepKind, StepOutcome};
use crate::core::artifact::RunArtifact;
use crate::core::config::{IdentityScope, PublishConfig, WorkspaceMode};
use crate::core::error::PublishError;
use crate::core::target::PublishTarget;
use crate::core::traits::{CommandRunner, CommandSpec};
use crate::credentials::Credential;
use crate::security::Redactor;
use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, warn};

/// Run one command and turn whatever happened into a redacted step outcome
pub(crate) async fn execute_step(
    runner: &dyn CommandRunner,
    redactor: &Redactor,
    step: StepKind,
    spec: &CommandSpec,
) -> StepOutcome {
    let action = redactor.redact(&spec.to_string());
    info!(step = %step, command = %action, "exec");

    let (success, output) = match runner.run(spec).await {
        Ok(out) => (out.success, redactor.redact(out.combined.trim_end())),
        Err(e) => (false, redactor.redact(&e.to_string())),
    };

    if success {
        StepOutcome::succeeded(step, action, output)
    } else {
        let error = PublishError::CommandFailed {
            step: step.to_string(),
            command: action.clone(),
            output: output.clone(),
        };
        StepOutcome::failed(step, action, output, error)
    }
}

/// Log an outcome and append it to the report
pub(crate) fn record(report: &mut RepositoryReport, outcome: StepOutcome) {
    if outcome.success {
        if !outcome.output.is_empty() {
            debug!(step = %outcome.step, output = %outcome.output, "command output");
        }
    } else if outcome.tolerated {
        warn!(step = %outcome.step, output = %outcome.output, "step failed (tolerated)");
    } else {
        error!(step = %outcome.step, output = %outcome.output, "step failed");
    }
    report.record(outcome);
}

/// Prepares the working copy and commits the run artifact
pub struct RepositoryPublisher<'a> {
    config: &'a PublishConfig,
    target: &'a PublishTarget,
    runner: &'a dyn CommandRunner,
    redactor: &'a Redactor,
    work_dir: PathBuf,
}

impl<'a> RepositoryPublisher<'a> {
    pub fn new(
        config: &'a PublishConfig,
        target: &'a PublishTarget,
        runner: &'a dyn CommandRunner,
        redactor: &'a Redactor,
    ) -> Self {
        Self {
            config,
            target,
            runner,
            redactor,
            work_dir: config.repository.absolute_work_dir(),
        }
    }

    fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Directory the working copy lives in; clone and global config run here
    fn parent_dir(&self) -> PathBuf {
        match self.work_dir().parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("/"),
        }
    }

    /// Run every repository step up to and including the commit
    pub async fn publish(&self, credential: &Credential, artifact: &RunArtifact) -> RepositoryReport {
        let mut report = RepositoryReport::new(
            self.target.clone(),
            self.work_dir().join(artifact.relative_path()),
        );
        let remote_url = self.target.authenticated_url(credential);
        let parent = self.parent_dir();

        if let Err(e) = fs::create_dir_all(&parent).await {
            warn!(dir = %parent.display(), error = %e, "could not create parent directory");
        }

        let scope = self.config.identity.scope;
        if scope == IdentityScope::Global {
            info!("configuring git identity (global)");
            self.configure_identity(&mut report, &parent, true).await;
        }

        self.prepare_working_copy(&mut report, &parent, &remote_url)
            .await;

        let work_dir = self.work_dir().to_path_buf();
        if scope == IdentityScope::Local {
            info!("configuring git identity (local)");
            self.configure_identity(&mut report, &work_dir, false).await;
        }

        self.attach_remote(&mut report, &remote_url).await;

        if self.config.repository.sync_default_branch {
            info!(branch = %self.config.repository.default_branch, "syncing default branch");
            let spec = CommandSpec::git(
                &work_dir,
                [
                    "pull",
                    "--no-rebase",
                    "--allow-unrelated-histories",
                    self.target.remote_name.as_str(),
                    self.config.repository.default_branch.as_str(),
                ],
            );
            self.run(&mut report, StepKind::SyncDefaultBranch, &spec).await;
        }

        info!(branch = %self.target.branch, "switching to branch");
        let spec = CommandSpec::git(&work_dir, ["checkout", "-B", self.target.branch.as_str()]);
        self.run(&mut report, StepKind::SwitchBranch, &spec).await;

        self.write_artifact(&mut report, artifact).await;

        info!("staging changes");
        self.run(&mut report, StepKind::Stage, &CommandSpec::git(&work_dir, ["add", "-A"]))
            .await;

        info!("committing changes");
        let message = format!(
            "{} {}",
            self.config.commit.message_prefix,
            artifact.stamp().compact()
        );
        let spec = CommandSpec::git(&work_dir, ["commit", "-m", message.as_str()]);
        self.run(&mut report, StepKind::Commit, &spec).await;

        report
    }

    async fn run(&self, report: &mut RepositoryReport, step: StepKind, spec: &CommandSpec) {
        let outcome = execute_step(self.runner, self.redactor, step, spec).await;
        record(report, outcome);
    }

    async fn configure_identity(&self, report: &mut RepositoryReport, dir: &Path, global: bool) {
        let identity = &self.config.identity;

        for (key, value) in [("user.email", &identity.email), ("user.name", &identity.name)] {
            let mut args = vec!["config".to_string()];
            if global {
                args.push("--global".to_string());
            }
            args.push(key.to_string());
            args.push(value.clone());

            let spec = CommandSpec::git(dir, args);
            self.run(report, StepKind::ConfigureIdentity, &spec).await;
        }
    }

    async fn prepare_working_copy(
        &self,
        report: &mut RepositoryReport,
        parent: &Path,
        remote_url: &SecretString,
    ) {
        let work_dir = self.work_dir();

        match self.config.repository.mode {
            WorkspaceMode::Clone => {
                if fs::try_exists(work_dir).await.unwrap_or(false) {
                    info!(dir = %work_dir.display(), "removing stale working directory");
                    if let Err(e) = fs::remove_dir_all(work_dir).await {
                        warn!(dir = %work_dir.display(), error = %e, "could not remove stale working directory");
                    }
                }

                info!(repo = %self.target.slug(), dir = %work_dir.display(), "cloning repository");
                let spec = CommandSpec::git(
                    parent,
                    [
                        "clone".to_string(),
                        remote_url.expose_secret().to_string(),
                        work_dir.display().to_string(),
                    ],
                );
                self.run(report, StepKind::PrepareWorkingCopy, &spec).await;
            }
            WorkspaceMode::Init => {
                info!(dir = %work_dir.display(), "initializing repository");
                if let Err(e) = fs::create_dir_all(work_dir).await {
                    let action = format!("create {}", work_dir.display());
                    let error = PublishError::CommandFailed {
                        step: StepKind::PrepareWorkingCopy.to_string(),
                        command: action.clone(),
                        output: e.to_string(),
                    };
                    record(
                        report,
                        StepOutcome::failed(StepKind::PrepareWorkingCopy, action, e.to_string(), error),
                    );
                }

                let spec = CommandSpec::git(work_dir, ["init"]);
                self.run(report, StepKind::PrepareWorkingCopy, &spec).await;
            }
        }
    }

    async fn attach_remote(&self, report: &mut RepositoryReport, remote_url: &SecretString) {
        let work_dir = self.work_dir();
        let remote = &self.target.remote_name;

        info!(remote = %remote, "attaching remote");

        // The remote usually does not exist yet after `git init`
        let spec = CommandSpec::git(work_dir, ["remote", "remove", remote.as_str()]);
        let outcome = execute_step(self.runner, self.redactor, StepKind::RemoveRemote, &spec).await;
        let outcome = if outcome.success {
            outcome
        } else {
            outcome.tolerate_failure()
        };
        record(report, outcome);

        let spec = CommandSpec::git(
            work_dir,
            [
                "remote".to_string(),
                "add".to_string(),
                remote.clone(),
                remote_url.expose_secret().to_string(),
            ],
        );
        self.run(report, StepKind::AttachRemote, &spec).await;
    }

    async fn write_artifact(&self, report: &mut RepositoryReport, artifact: &RunArtifact) {
        let path = report.artifact_path.clone();
        let action = format!("write {}", artifact.relative_path().display());

        info!(path = %path.display(), "writing run artifact");

        let result = async {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir).await?;
            }
            fs::write(&path, artifact.body()).await
        }
        .await;

        let outcome = match result {
            Ok(()) => {
                info!(path = %path.display(), "created output file");
                StepOutcome::succeeded(StepKind::WriteArtifact, action, "")
            }
            Err(e) => {
                let message = self.redactor.redact(&e.to_string());
                let error = PublishError::ArtifactWriteFailed {
                    path: path.display().to_string(),
                    message: message.clone(),
                };
                StepOutcome::failed(StepKind::WriteArtifact, action, message, error)
            }
        };
        record(report, outcome);
    }
}
