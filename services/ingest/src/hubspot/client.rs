use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use relay_store::EntityKind;

use super::models::{
    AssociationBatchResponse, AssociationResult, BatchReadResponse, RawRecord, SearchResponse,
    TokenResponse,
};
use super::query::SearchRequest;

#[derive(Debug, Clone)]
pub struct HubspotClientConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub max_retries: u32,
    pub timeout_secs: u64,
    pub retry_backoff_secs: u64,
}

impl HubspotClientConfig {
    /// Load HubSpot config from environment.
    ///
    /// Returns `None` if the OAuth app credentials are missing (connector
    /// not configured).
    pub fn from_env() -> Option<Self> {
        let client_id = std::env::var("HUBSPOT_CLIENT_ID").ok()?;
        let client_secret = std::env::var("HUBSPOT_CLIENT_SECRET").ok()?;
        let base_url = std::env::var("HUBSPOT_BASE_URL")
            .unwrap_or_else(|_| "https://api.hubapi.com".to_string());
        let max_retries = std::env::var("HUBSPOT_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(4);
        let timeout_secs = std::env::var("HUBSPOT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        let retry_backoff_secs = std::env::var("HUBSPOT_RETRY_BACKOFF_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        Some(Self {
            base_url,
            client_id,
            client_secret,
            max_retries,
            timeout_secs,
            retry_backoff_secs,
        })
    }
}

/// Explicit credential context for one account's pull.
///
/// Passed `&mut` into every API call; the retry loop rotates the access
/// token in place when it has expired.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credentials {
    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HubspotClientError {
    /// Token exchange failure. Fatal for the current stage; never retried here.
    #[error("token refresh failed: {0}")]
    Auth(String),

    #[error("HTTP {status}: {body}")]
    HttpError { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// All retry attempts for one page exhausted. Fatal for the entity-kind pass.
    #[error("fetch exhausted after {attempts} attempts: {last_error}")]
    FetchExhausted { attempts: u32, last_error: String },
}

#[derive(Clone)]
pub struct HubspotClient {
    http: Client,
    config: HubspotClientConfig,
}

impl HubspotClient {
    pub fn new(config: HubspotClientConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    /// For testing: point the client at a specific base URL (e.g., wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.to_string();
        self
    }

    pub fn config(&self) -> &HubspotClientConfig {
        &self.config
    }

    /// Exchange the refresh token for a fresh access token and absolute
    /// expiry, updating `creds` in place. Single attempt; the caller owns
    /// any retry decision.
    pub async fn refresh_credentials(
        &self,
        creds: &mut Credentials,
    ) -> Result<(), HubspotClientError> {
        let url = format!("{}/oauth/v1/token", self.config.base_url);
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", creds.refresh_token.as_str()),
        ];

        let response = self
            .http
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| HubspotClientError::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HubspotClientError::Auth(format!("{status}: {body}")));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| HubspotClientError::Auth(e.to_string()))?;

        creds.access_token = token.access_token;
        creds.expires_at = Utc::now() + chrono::Duration::seconds(token.expires_in);
        tracing::debug!(expires_at = %creds.expires_at, "access token refreshed");
        Ok(())
    }

    /// One paged object search.
    pub async fn search(
        &self,
        kind: EntityKind,
        request: &SearchRequest,
        creds: &mut Credentials,
    ) -> Result<SearchResponse, HubspotClientError> {
        let url = format!("{}/crm/v3/objects/{}/search", self.config.base_url, kind);
        self.post_with_retry(&url, request, creds).await
    }

    /// Batch association read from one entity kind to another.
    pub async fn read_associations(
        &self,
        from: EntityKind,
        to: EntityKind,
        ids: &[String],
        creds: &mut Credentials,
    ) -> Result<Vec<AssociationResult>, HubspotClientError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!(
            "{}/crm/v3/associations/{}/{}/batch/read",
            self.config.base_url, from, to
        );
        let inputs: Vec<serde_json::Value> =
            ids.iter().map(|id| serde_json::json!({ "id": id })).collect();
        let body = serde_json::json!({ "inputs": inputs });

        let response: AssociationBatchResponse = self.post_with_retry(&url, &body, creds).await?;
        Ok(response.results)
    }

    /// Batch entity read by id with a property projection.
    pub async fn batch_read(
        &self,
        kind: EntityKind,
        ids: &[String],
        properties: &[&str],
        creds: &mut Credentials,
    ) -> Result<Vec<RawRecord>, HubspotClientError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/crm/v3/objects/{}/batch/read", self.config.base_url, kind);
        let inputs: Vec<serde_json::Value> =
            ids.iter().map(|id| serde_json::json!({ "id": id })).collect();
        let body = serde_json::json!({ "inputs": inputs, "properties": properties });

        let response: BatchReadResponse = self.post_with_retry(&url, &body, creds).await?;
        Ok(response.results)
    }

    /// Shared retry engine for every authenticated call.
    ///
    /// Backoff is `retry_backoff_secs * 2^attempt` before each retry. An
    /// expired access token is refreshed before the next attempt; a failed
    /// refresh aborts the call. Retryable: connect/timeout errors, 401,
    /// 429, and 5xx. Other 4xx fail fast.
    async fn post_with_retry<B, T>(
        &self,
        url: &str,
        body: &B,
        creds: &mut Credentials,
    ) -> Result<T, HubspotClientError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let mut last_error = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff_secs = self.config.retry_backoff_secs * (1u64 << attempt);
                tracing::warn!(attempt, backoff_secs, "retrying after backoff");
                tokio::time::sleep(Duration::from_secs(backoff_secs)).await;

                if creds.expired(Utc::now()) {
                    self.refresh_credentials(creds).await?;
                }
            }

            let response = match self
                .http
                .post(url)
                .bearer_auth(&creds.access_token)
                .json(body)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = e.to_string();
                    if e.is_timeout() || e.is_connect() {
                        continue;
                    }
                    return Err(HubspotClientError::Request(e));
                }
            };

            let status = response.status();

            if status.is_success() {
                return response
                    .json::<T>()
                    .await
                    .map_err(HubspotClientError::Request);
            }

            // Stale token, throttling, and server errors all fold into the
            // backoff loop.
            if status == StatusCode::UNAUTHORIZED
                || status == StatusCode::TOO_MANY_REQUESTS
                || status.is_server_error()
            {
                let body = response.text().await.unwrap_or_default();
                last_error = format!("{status}: {body}");
                continue;
            }

            // Fail fast on remaining 4xx
            let body = response.text().await.unwrap_or_default();
            return Err(HubspotClientError::HttpError { status, body });
        }

        Err(HubspotClientError::FetchExhausted {
            attempts: self.config.max_retries + 1,
            last_error,
        })
    }
}
