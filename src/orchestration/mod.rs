//! Orchestration layer for publish runs
//!
//! `PublishRun` sequences credential resolution, repository preparation and
//! the push; the other modules here each own one of those stages.

pub mod publish_run;
pub mod push_reporter;
pub mod report;
pub mod repository_publisher;

// Re-export main types for convenience
pub use publish_run::{ABORT_MESSAGE, PublishRun, RunOutcome, RunSummary};
pub use push_reporter::PushReporter;
pub use report::{RepositoryReport, StepKind, StepOutcome};
pub use repository_publisher::RepositoryPublisher;
