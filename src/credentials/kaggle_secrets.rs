//! Kaggle user-secrets lookup
//!
//! Talks to the same endpoint the notebook platform's own secrets client
//! uses: a JSON POST authenticated with the per-session JWT the platform
//! places in `KAGGLE_USER_SECRETS_TOKEN`.

use crate::core::traits::CredentialProvider;
use anyhow::{Context, bail};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub const DEFAULT_URL_BASE: &str = "https://www.kaggle.com";
const URL_BASE_ENV: &str = "KAGGLE_URL_BASE";
const USER_SECRETS_TOKEN_ENV: &str = "KAGGLE_USER_SECRETS_TOKEN";
const IAP_TOKEN_ENV: &str = "KAGGLE_IAP_TOKEN";
const GET_SECRET_ENDPOINT: &str = "/requests/GetUserSecretByLabelRequest";

#[derive(Debug, Deserialize)]
struct SecretResponse {
    #[serde(rename = "wasSuccessful", default)]
    was_successful: bool,
    #[serde(default)]
    result: Option<SecretResult>,
    #[serde(default)]
    errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SecretResult {
    #[serde(default)]
    secret: Option<String>,
}

/// Fetches one named secret from the platform secrets service
pub struct KaggleSecretsProvider {
    client: reqwest::Client,
    url_base: String,
    secret_name: String,
    jwt: Option<SecretString>,
    iap: Option<SecretString>,
}

impl KaggleSecretsProvider {
    /// Build a provider from the notebook environment.
    ///
    /// `url_base` overrides `KAGGLE_URL_BASE`, which overrides the public
    /// default.
    pub fn from_env(
        secret_name: impl Into<String>,
        url_base: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let url_base = url_base
            .or_else(|| std::env::var(URL_BASE_ENV).ok())
            .unwrap_or_else(|| DEFAULT_URL_BASE.to_string());
        let token = |var: &str| {
            std::env::var(var)
                .ok()
                .filter(|v| !v.is_empty())
                .map(SecretString::from)
        };

        Self::new(
            secret_name,
            url_base,
            token(USER_SECRETS_TOKEN_ENV),
            token(IAP_TOKEN_ENV),
            timeout,
        )
    }

    pub fn new(
        secret_name: impl Into<String>,
        url_base: impl Into<String>,
        jwt: Option<SecretString>,
        iap: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self::with_client(client, secret_name, url_base, jwt, iap))
    }

    /// Use a preconfigured HTTP client
    pub fn with_client(
        client: reqwest::Client,
        secret_name: impl Into<String>,
        url_base: impl Into<String>,
        jwt: Option<SecretString>,
        iap: Option<SecretString>,
    ) -> Self {
        Self {
            client,
            url_base: url_base.into().trim_end_matches('/').to_string(),
            secret_name: secret_name.into(),
            jwt,
            iap,
        }
    }

    fn parse_response(&self, response: SecretResponse) -> anyhow::Result<Option<SecretString>> {
        if !response.was_successful {
            if response.errors.is_empty() {
                bail!("secrets service reported failure");
            }
            bail!("secrets service reported failure: {}", response.errors.join("; "));
        }

        let Some(secret) = response.result.and_then(|r| r.secret) else {
            bail!("secret '{}' not found in response", self.secret_name);
        };

        if secret.is_empty() {
            return Ok(None);
        }

        Ok(Some(SecretString::from(secret)))
    }
}

#[async_trait]
impl CredentialProvider for KaggleSecretsProvider {
    fn name(&self) -> &str {
        "kaggle-secrets"
    }

    async fn fetch(&self) -> anyhow::Result<Option<SecretString>> {
        let Some(jwt) = &self.jwt else {
            bail!(
                "a JWT token is required to use the secrets service, but none found in environment variable {}",
                USER_SECRETS_TOKEN_ENV
            );
        };

        let url = format!("{}{}", self.url_base, GET_SECRET_ENDPOINT);
        let mut request = self
            .client
            .post(&url)
            .header(
                "X-Kaggle-Authorization",
                format!("Bearer {}", jwt.expose_secret()),
            )
            .json(&json!({ "Label": self.secret_name }));

        if let Some(iap) = &self.iap {
            request = request.bearer_auth(iap.expose_secret());
        }

        let response = request
            .send()
            .await
            .context("secrets request failed")?
            .error_for_status()
            .context("secrets service returned an error status")?;

        let body: SecretResponse = response
            .json()
            .await
            .context("secrets service returned an unreadable body")?;

        self.parse_response(body)
    }
}
