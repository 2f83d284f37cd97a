//! Credential resolution
//!
//! A run needs exactly one token. Providers are tried in a fixed order and
//! the first one that produces a value wins.

pub mod env_provider;
pub mod file_provider;
pub mod kaggle_secrets;
pub mod resolver;

pub use env_provider::EnvTokenProvider;
pub use file_provider::FileTokenProvider;
pub use kaggle_secrets::KaggleSecretsProvider;
pub use resolver::CredentialResolver;

use secrecy::SecretString;

/// The token for one run, tagged with the source that produced it
#[derive(Debug, Clone)]
pub struct Credential {
    secret: SecretString,
    source: String,
}

impl Credential {
    pub fn new(secret: SecretString, source: impl Into<String>) -> Self {
        Self {
            secret,
            source: source.into(),
        }
    }

    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    /// Name of the provider that produced the token
    pub fn source(&self) -> &str {
        &self.source
    }
}
