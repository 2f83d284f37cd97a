//! Push the run branch and render the final status block

use super::report::{RepositoryReport, StepKind};
use super::repository_publisher::{execute_step, record};
use crate::core::config::PushConfig;
use crate::core::error::PublishError;
use crate::core::traits::{CommandRunner, CommandSpec};
use crate::security::Redactor;
use std::path::Path;
use tracing::info;

const RULE: &str = "============================================================";

pub struct PushReporter<'a> {
    config: &'a PushConfig,
    work_dir: &'a Path,
    runner: &'a dyn CommandRunner,
    redactor: &'a Redactor,
}

impl<'a> PushReporter<'a> {
    pub fn new(
        config: &'a PushConfig,
        work_dir: &'a Path,
        runner: &'a dyn CommandRunner,
        redactor: &'a Redactor,
    ) -> Self {
        Self {
            config,
            work_dir,
            runner,
            redactor,
        }
    }

    /// `git push [--force] <remote> <branch>`; the outcome lands in `report`
    pub async fn push(&self, report: &mut RepositoryReport) -> bool {
        let target = &report.target;
        info!(branch = %target.branch, force = self.config.force, "pushing branch");

        let mut args = vec!["push".to_string()];
        if self.config.force {
            args.push("--force".to_string());
        }
        args.push(target.remote_name.clone());
        args.push(target.branch.clone());

        let spec = CommandSpec::git(self.work_dir, args);
        let mut outcome = execute_step(self.runner, self.redactor, StepKind::Push, &spec).await;
        let pushed = outcome.success;
        if !pushed {
            outcome.error = Some(PublishError::PushFailed {
                branch: target.branch.clone(),
                output: outcome.output.clone(),
            });
        }
        record(report, outcome);

        pushed
    }

    /// Final status block printed at the end of a run
    pub fn render_summary(&self, report: &RepositoryReport) -> String {
        if !report.pushed() {
            let mut lines = vec![
                String::new(),
                "[FAILED] Push failed. Check the error log above.".to_string(),
            ];
            for step in report.failed_steps() {
                lines.push(format!("  - {}: {}", step.step, step.action));
            }
            if let Some(error) = report.step(StepKind::Push).and_then(|s| s.error.as_ref()) {
                lines.push(format!("Suggested actions ({}):", error.code()));
                for action in error.suggested_actions() {
                    lines.push(format!("  - {}", action));
                }
            }
            return lines.join("\n") + "\n";
        }

        let target = &report.target;
        let mut lines = vec![
            String::new(),
            RULE.to_string(),
            "[SUCCESS] Workflow completed successfully!".to_string(),
            RULE.to_string(),
            format!("Branch created: {}", target.branch),
            format!("Repository: {}", target.repository_url()),
            format!("View branch: {}", target.branch_url()),
            format!("Output file: {}", report.artifact_path.display()),
        ];

        let failed = report.failed_steps();
        if !failed.is_empty() {
            lines.push(format!("Steps with errors: {}", failed.len()));
            for step in failed {
                lines.push(format!("  - {}: {}", step.step, step.action));
            }
        }
        lines.push(RULE.to_string());

        lines.join("\n") + "\n"
    }
}
