//! Run artifact: the one proof file a run commits

use super::config::{ArtifactConfig, ArtifactNaming};
use super::target::{PublishTarget, RunStamp};
use std::path::{Path, PathBuf};

const RULE: &str = "============================================================";

/// A text file written once per run and never touched again
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArtifact {
    relative_path: PathBuf,
    stamp: RunStamp,
    body: String,
}

impl RunArtifact {
    /// Build the artifact for a run.
    ///
    /// The body records the run id (the branch name), the stamp in both
    /// formats, the repository, and where the file lives on disk.
    pub fn for_run(
        config: &ArtifactConfig,
        target: &PublishTarget,
        stamp: RunStamp,
        work_dir: &Path,
    ) -> Self {
        let relative_path = relative_path(config, &stamp);
        let output_file = work_dir.join(&relative_path);

        let body = [
            RULE.to_string(),
            "Kaggle Experiment Run Log".to_string(),
            RULE.to_string(),
            format!("Run ID: {}", target.branch),
            format!("Run Stamp: {}", stamp.compact()),
            format!("Execution Time: {}", stamp.readable()),
            format!("Repository: {}", target.slug()),
            format!("Working Directory: {}", work_dir.display()),
            format!("Output File: {}", output_file.display()),
            String::new(),
            "Status: Successfully executed on Kaggle platform".to_string(),
            RULE.to_string(),
        ]
        .join("\n")
            + "\n";

        Self {
            relative_path,
            stamp,
            body,
        }
    }

    /// Path relative to the working copy root
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    pub fn stamp(&self) -> RunStamp {
        self.stamp
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

fn relative_path(config: &ArtifactConfig, stamp: &RunStamp) -> PathBuf {
    let file_name = match &config.naming {
        ArtifactNaming::Timestamped { prefix } => format!("{}{}.txt", prefix, stamp.compact()),
        ArtifactNaming::Fixed { file_name } => file_name.clone(),
    };

    if config.directory.is_empty() {
        PathBuf::from(file_name)
    } else {
        Path::new(&config.directory).join(file_name)
    }
}
