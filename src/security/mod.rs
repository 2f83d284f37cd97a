pub mod command_executor;
pub mod redactor;

pub use command_executor::{CommandError, SafeCommandExecutor};
pub use redactor::Redactor;
