//! SatuSehat HTTP client
//!
//! One client instance is shared by all tasks. The cached access token
//! sits behind an async lock so overlapping sweeps cannot trigger
//! redundant refreshes or read a half-written token; a 401 from any call
//! invalidates the cache and the next call forces a refresh.

use crate::config::{HttpClientConfig, RegistryConfig, SecretString};
use crate::domain::{GarudaError, RegistryError, Result};
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;

/// Refresh this long before the token actually expires.
const EXPIRY_MARGIN_MINUTES: i64 = 5;

/// Cached OAuth2 access token.
#[derive(Debug, Clone)]
pub struct TokenDetail {
    pub access_token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TokenDetail {
    /// Whether the token is within the safety margin of its expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at - ChronoDuration::minutes(EXPIRY_MARGIN_MINUTES)
    }
}

/// SatuSehat registry client with a shared token cache.
pub struct RegistryClient {
    http: reqwest::Client,
    auth_url: String,
    base_url: String,
    client_id: String,
    client_secret: SecretString,
    retry: HttpClientConfig,
    token: Mutex<Option<TokenDetail>>,
}

impl RegistryClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .build()
            .map_err(|e| GarudaError::Configuration(format!("http client: {e}")))?;

        Ok(Self {
            http,
            auth_url: config.auth_url.trim_end_matches('/').to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            retry: config.http.clone(),
            token: Mutex::new(None),
        })
    }

    /// Submit one serialized transaction bundle.
    ///
    /// Returns the raw response body on success. A 401 invalidates the
    /// cached token before the error is returned.
    pub async fn post_bundle(&self, payload: &str) -> Result<String, RegistryError> {
        let token = self.bearer_token().await?;
        let request = self
            .http
            .post(&self.base_url)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload.to_string());

        let response = self.execute(request).await?;
        match Self::classify(response).await {
            Err(RegistryError::Unauthorized { status, body }) => {
                self.invalidate_token().await;
                Err(RegistryError::Unauthorized { status, body })
            }
            other => other,
        }
    }

    /// Resolve a patient's SatuSehat id by national identity number.
    pub async fn lookup_patient_id(&self, nik: &str) -> Result<String, RegistryError> {
        let body = self.search("Patient", nik).await?;
        let parsed: Value = serde_json::from_str(&body).unwrap_or(Value::Null);

        // Patient search returns both the patient and related resources;
        // the patient's own id starts with "P".
        let id = parsed["entry"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|entry| entry["resource"]["id"].as_str())
            .find(|id| id.starts_with('P'))
            .map(str::to_string);

        id.ok_or(RegistryError::NotFound {
            resource: "Patient".to_string(),
            body,
        })
    }

    /// Resolve a practitioner's SatuSehat id by national identity number.
    pub async fn lookup_practitioner_id(&self, nik: &str) -> Result<String, RegistryError> {
        let body = self.search("Practitioner", nik).await?;
        let parsed: Value = serde_json::from_str(&body).unwrap_or(Value::Null);

        let id = parsed["entry"][0]["resource"]["id"]
            .as_str()
            .map(str::to_string);

        id.ok_or(RegistryError::NotFound {
            resource: "Practitioner".to_string(),
            body,
        })
    }

    /// Currently cached token, if any. Exposed for observability.
    pub async fn cached_token(&self) -> Option<TokenDetail> {
        self.token.lock().await.clone()
    }

    async fn search(&self, resource: &str, nik: &str) -> Result<String, RegistryError> {
        let token = self.bearer_token().await?;
        let request = self
            .http
            .get(format!("{}/{resource}", self.base_url))
            .query(&[(
                "identifier",
                format!("https://fhir.kemkes.go.id/id/nik|{nik}"),
            )])
            .bearer_auth(token);

        let response = self.execute(request).await?;
        match Self::classify(response).await {
            Err(RegistryError::Unauthorized { status, body }) => {
                self.invalidate_token().await;
                Err(RegistryError::Unauthorized { status, body })
            }
            other => other,
        }
    }

    /// Valid bearer token, refreshing inside the lock when needed.
    async fn bearer_token(&self) -> Result<String, RegistryError> {
        let mut slot = self.token.lock().await;
        match slot.as_ref() {
            Some(token) if !token.is_expired(Utc::now()) => Ok(token.access_token.clone()),
            _ => {
                let token = self.refresh_token().await?;
                let access_token = token.access_token.clone();
                *slot = Some(token);
                Ok(access_token)
            }
        }
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    async fn refresh_token(&self) -> Result<TokenDetail, RegistryError> {
        let url = format!("{}/accesstoken?grant_type=client_credentials", self.auth_url);
        tracing::debug!(url = %url, "refreshing registry token");

        let request = self.http.post(&url).form(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret().as_str()),
        ]);

        let response = self.execute(request).await?;
        let body = Self::classify(response).await?;

        let parsed: Value =
            serde_json::from_str(&body).map_err(|e| RegistryError::Execution(e.to_string()))?;

        let access_token = parsed["access_token"].as_str().unwrap_or_default();
        if access_token.is_empty() {
            return Err(RegistryError::Execution(
                "token response carried no access_token".to_string(),
            ));
        }

        // The auth endpoint returns numbers as strings: issued_at in
        // epoch milliseconds, expires_in in seconds.
        let issued_at_ms = value_as_i64(&parsed["issued_at"]).unwrap_or_default();
        let expires_in_secs = value_as_i64(&parsed["expires_in"]).unwrap_or_default();
        let issued_at = Utc
            .timestamp_millis_opt(issued_at_ms)
            .single()
            .unwrap_or_else(Utc::now);

        Ok(TokenDetail {
            access_token: access_token.to_string(),
            issued_at,
            expires_at: issued_at + ChronoDuration::seconds(expires_in_secs),
        })
    }

    /// Send with bounded retry on transport-level failures only.
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, RegistryError> {
        let mut wait = Duration::from_secs(self.retry.retry_wait_secs);
        let max_wait = Duration::from_secs(self.retry.retry_max_wait_secs);
        let mut last_error = String::new();

        for attempt in 0..=self.retry.retry_count {
            let Some(cloned) = request.try_clone() else {
                return request
                    .send()
                    .await
                    .map_err(|e| RegistryError::Execution(e.to_string()));
            };
            match cloned.send().await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    last_error = e.to_string();
                    if attempt < self.retry.retry_count {
                        tracing::warn!(attempt, error = %last_error, "registry request failed, retrying");
                        tokio::time::sleep(wait).await;
                        wait = (wait * 2).min(max_wait);
                    }
                }
            }
        }

        Err(RegistryError::Execution(last_error))
    }

    /// Split a response into the publish engine's outcome classes.
    async fn classify(response: reqwest::Response) -> Result<String, RegistryError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RegistryError::Execution(e.to_string()))?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(RegistryError::Unauthorized {
                status: status.as_u16(),
                body,
            });
        }
        if status.is_server_error() {
            return Err(RegistryError::Server {
                status: status.as_u16(),
                body,
            });
        }
        if !status.is_success() {
            return Err(RegistryError::Response {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
