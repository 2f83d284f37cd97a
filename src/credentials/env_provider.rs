//! Token from a process environment variable

use crate::core::traits::CredentialProvider;
use async_trait::async_trait;
use secrecy::SecretString;

pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait]
impl CredentialProvider for EnvTokenProvider {
    fn name(&self) -> &str {
        "env"
    }

    async fn fetch(&self) -> anyhow::Result<Option<SecretString>> {
        Ok(std::env::var(&self.var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(SecretString::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[tokio::test]
    async fn test_reads_and_trims_variable() {
        unsafe {
            std::env::set_var("KAGGLE_PUBLISHER_TEST_TOKEN_A", " env-token \n");
        }

        let token = EnvTokenProvider::new("KAGGLE_PUBLISHER_TEST_TOKEN_A")
            .fetch()
            .await
            .unwrap()
            .unwrap();
        assert_eq!(token.expose_secret(), "env-token");

        unsafe {
            std::env::remove_var("KAGGLE_PUBLISHER_TEST_TOKEN_A");
        }
    }

    #[tokio::test]
    async fn test_unset_variable_yields_none() {
        let token = EnvTokenProvider::new("KAGGLE_PUBLISHER_TEST_TOKEN_UNSET")
            .fetch()
            .await
            .unwrap();

        assert!(token.is_none());
    }
}
