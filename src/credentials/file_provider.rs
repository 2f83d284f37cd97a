//! Token file inside an attached dataset

use crate::core::traits::CredentialProvider;
use anyhow::Context;
use async_trait::async_trait;
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Reads the token from the first candidate path that exists
pub struct FileTokenProvider {
    paths: Vec<PathBuf>,
}

impl FileTokenProvider {
    /// `paths` are tried in order: primary first, then fallbacks
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    async fn first_existing(&self) -> Option<&Path> {
        for path in &self.paths {
            if fs::try_exists(path).await.unwrap_or(false) {
                return Some(path.as_path());
            }
            debug!(path = %path.display(), "token file not present");
        }
        None
    }
}

#[async_trait]
impl CredentialProvider for FileTokenProvider {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch(&self) -> anyhow::Result<Option<SecretString>> {
        let Some(path) = self.first_existing().await else {
            return Ok(None);
        };

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("could not read token from {}", path.display()))?;

        let token = content.trim();
        if token.is_empty() {
            debug!(path = %path.display(), "token file is empty");
            return Ok(None);
        }

        Ok(Some(SecretString::from(token.to_string())))
    }
}
