//! Step-by-step record of a publish run

use crate::core::error::PublishError;
use crate::core::target::PublishTarget;
use std::fmt;
use std::path::PathBuf;

/// One step of repository preparation or push
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    ConfigureIdentity,
    PrepareWorkingCopy,
    RemoveRemote,
    AttachRemote,
    SyncDefaultBranch,
    SwitchBranch,
    WriteArtifact,
    Stage,
    Commit,
    Push,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigureIdentity => "configure-identity",
            Self::PrepareWorkingCopy => "prepare-working-copy",
            Self::RemoveRemote => "remove-remote",
            Self::AttachRemote => "attach-remote",
            Self::SyncDefaultBranch => "sync-default-branch",
            Self::SwitchBranch => "switch-branch",
            Self::WriteArtifact => "write-artifact",
            Self::Stage => "stage",
            Self::Commit => "commit",
            Self::Push => "push",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one attempted step
///
/// `action` and `output` have already been through the redactor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: StepKind,
    /// Command line, or a short description for file operations
    pub action: String,
    pub success: bool,
    /// A failure here is expected and does not count against the run
    pub tolerated: bool,
    pub output: String,
    pub error: Option<PublishError>,
}

impl StepOutcome {
    pub fn succeeded(step: StepKind, action: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            step,
            action: action.into(),
            success: true,
            tolerated: false,
            output: output.into(),
            error: None,
        }
    }

    pub fn failed(
        step: StepKind,
        action: impl Into<String>,
        output: impl Into<String>,
        error: PublishError,
    ) -> Self {
        Self {
            step,
            action: action.into(),
            success: false,
            tolerated: false,
            output: output.into(),
            error: Some(error),
        }
    }

    pub fn tolerate_failure(mut self) -> Self {
        self.tolerated = true;
        self
    }

    /// Failed and not tolerated
    pub fn is_failure(&self) -> bool {
        !self.success && !self.tolerated
    }
}

/// Everything that happened against the working copy during one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryReport {
    pub target: PublishTarget,
    /// Absolute path of the artifact on disk
    pub artifact_path: PathBuf,
    pub steps: Vec<StepOutcome>,
}

impl RepositoryReport {
    pub fn new(target: PublishTarget, artifact_path: PathBuf) -> Self {
        Self {
            target,
            artifact_path,
            steps: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: StepOutcome) {
        self.steps.push(outcome);
    }

    pub fn failed_steps(&self) -> Vec<&StepOutcome> {
        self.steps.iter().filter(|s| s.is_failure()).collect()
    }

    pub fn step(&self, kind: StepKind) -> Option<&StepOutcome> {
        self.steps.iter().rev().find(|s| s.step == kind)
    }

    pub fn artifact_written(&self) -> bool {
        self.step(StepKind::WriteArtifact).is_some_and(|s| s.success)
    }

    pub fn pushed(&self) -> bool {
        self.step(StepKind::Push).is_some_and(|s| s.success)
    }
}
