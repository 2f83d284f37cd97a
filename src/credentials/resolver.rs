//! Ordered credential lookup

use super::{Credential, EnvTokenProvider, FileTokenProvider, KaggleSecretsProvider};
use crate::core::config::{CredentialSourceKind, CredentialsConfig};
use crate::core::error::PublishError;
use crate::core::traits::CredentialProvider;
use secrecy::ExposeSecret;
use tracing::{debug, info, warn};

/// Tries providers in order and stops at the first value
pub struct CredentialResolver {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl CredentialResolver {
    pub fn new(providers: Vec<Box<dyn CredentialProvider>>) -> Self {
        Self { providers }
    }

    /// Build the provider chain named by `credentials.sources`
    pub fn from_config(config: &CredentialsConfig) -> Result<Self, PublishError> {
        let providers = config
            .sources
            .iter()
            .map(|kind| -> Result<Box<dyn CredentialProvider>, PublishError> {
                Ok(match kind {
                    CredentialSourceKind::File => {
                        Box::new(FileTokenProvider::new(config.token_paths()))
                    }
                    CredentialSourceKind::KaggleSecrets => Box::new(
                        KaggleSecretsProvider::from_env(
                            config.secret_name.clone(),
                            config.secrets_url_base.clone(),
                            config.secrets_timeout(),
                        )
                        .map_err(|e| {
                            PublishError::ConfigError(format!(
                                "Failed to build secrets client: {}",
                                e
                            ))
                        })?,
                    ),
                    CredentialSourceKind::Env => Box::new(EnvTokenProvider::new(&config.env_var)),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(providers))
    }

    /// Source names in lookup order
    pub fn source_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Resolve the run's credential.
    ///
    /// Provider errors are logged and skipped; only when every provider comes
    /// up empty does this fail with `NoCredentialFound`.
    pub async fn resolve(&self) -> Result<Credential, PublishError> {
        let mut attempted = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            let source = provider.name();
            attempted.push(source.to_string());

            match provider.fetch().await {
                Ok(Some(secret)) if !secret.expose_secret().is_empty() => {
                    info!(source, "GITHUB_TOKEN loaded");
                    return Ok(Credential::new(secret, source));
                }
                Ok(_) => debug!(source, "no credential from source"),
                Err(e) => warn!(source, error = %e, "could not retrieve credential"),
            }
        }

        Err(PublishError::NoCredentialFound { attempted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use secrecy::SecretString;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticProvider {
        name: &'static str,
        value: Result<Option<&'static str>, &'static str>,
        calls: Arc<AtomicUsize>,
    }

    impl StaticProvider {
        fn boxed(
            name: &'static str,
            value: Result<Option<&'static str>, &'static str>,
            calls: &Arc<AtomicUsize>,
        ) -> Box<dyn CredentialProvider> {
            Box::new(Self {
                name,
                value,
                calls: Arc::clone(calls),
            })
        }
    }

    #[async_trait]
    impl CredentialProvider for StaticProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self) -> anyhow::Result<Option<SecretString>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.value {
                Ok(v) => Ok(v.map(|s| SecretString::from(s.to_string()))),
                Err(e) => Err(anyhow::anyhow!(e)),
            }
        }
    }

    #[tokio::test]
    async fn test_first_source_wins() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = CredentialResolver::new(vec![
            StaticProvider::boxed("file", Ok(Some("abc123")), &calls),
            StaticProvider::boxed("kaggle-secrets", Ok(Some("other")), &calls),
        ]);

        let credential = resolver.resolve().await.unwrap();

        assert_eq!(credential.secret().expose_secret(), "abc123");
        assert_eq!(credential.source(), "file");
        assert_eq!(calls.load(Ordering::SeqCst), 1, "second source must not be queried");
    }

    #[tokio::test]
    async fn test_falls_through_errors_and_empty_sources() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = CredentialResolver::new(vec![
            StaticProvider::boxed("file", Ok(None), &calls),
            StaticProvider::boxed("env", Err("boom"), &calls),
            StaticProvider::boxed("kaggle-secrets", Ok(Some("from-secrets")), &calls),
        ]);

        let credential = resolver.resolve().await.unwrap();

        assert_eq!(credential.source(), "kaggle-secrets");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_credential_found_lists_sources() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = CredentialResolver::new(vec![
            StaticProvider::boxed("file", Ok(None), &calls),
            StaticProvider::boxed("kaggle-secrets", Err("UserSecretsClient failed"), &calls),
        ]);

        let error = resolver.resolve().await.unwrap_err();

        assert_eq!(
            error,
            PublishError::NoCredentialFound {
                attempted: vec!["file".to_string(), "kaggle-secrets".to_string()],
            }
        );
    }

    #[tokio::test]
    async fn test_empty_secret_is_skipped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = CredentialResolver::new(vec![
            StaticProvider::boxed("file", Ok(Some("")), &calls),
            StaticProvider::boxed("env", Ok(Some("real")), &calls),
        ]);

        assert_eq!(resolver.resolve().await.unwrap().source(), "env");
    }

    #[test]
    fn test_from_config_follows_source_order() {
        let config = CredentialsConfig {
            sources: vec![CredentialSourceKind::Env, CredentialSourceKind::File],
            ..Default::default()
        };

        let resolver = CredentialResolver::from_config(&config).unwrap();

        assert_eq!(resolver.source_names(), vec!["env", "file"]);
    }
}
