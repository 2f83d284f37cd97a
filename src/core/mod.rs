pub mod artifact;
pub mod config;
pub mod config_loader;
pub mod error;
pub mod state_machine;
pub mod target;
pub mod traits;

pub use artifact::*;
pub use config::*;
pub use error::*;
pub use state_machine::*;
pub use target::*;
pub use traits::*;
