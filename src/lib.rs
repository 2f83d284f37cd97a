pub mod core;
pub mod credentials;
pub mod orchestration;
pub mod security;

pub use self::core::*;
pub use credentials::{
    Credential, CredentialResolver, EnvTokenProvider, FileTokenProvider, KaggleSecretsProvider,
};
pub use orchestration::{
    ABORT_MESSAGE, PublishRun, PushReporter, RepositoryPublisher, RepositoryReport, RunOutcome,
    RunSummary, StepKind, StepOutcome,
};
pub use security::{CommandError, Redactor, SafeCommandExecutor};
