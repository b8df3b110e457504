//! HTTP client for the hosted backend functions.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::error::GenerationError;
use super::payload::{AnalyzeRequest, AnalyzeResponse, GenerateRequest, GenerateResponse, InviteRequest};
use crate::config::BackendConfig;
use crate::context::Role;
use crate::error::ValidationError;

pub const GENERATE_FUNCTION: &str = "generate-facets-ai";
pub const INVITE_FUNCTION: &str = "invite-user";

/// Error bodies longer than this are cut before they reach logs or errors.
const MAX_ERROR_BODY_LENGTH: usize = 200;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

fn sanitize_error_body(body: &str) -> String {
    let body = body.trim();
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut cut = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}... (truncated)", &body[..cut])
}

/// Produces facets for a submitted job.
#[async_trait]
pub trait FacetGenerator: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, GenerationError>;
}

pub struct FunctionsClient {
    client: Client,
    base_url: String,
    anon_key: SecretString,
}

impl FunctionsClient {
    pub fn new(
        base_url: &str,
        anon_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                GenerationError::NotConfigured(format!("failed to create HTTP client: {}", e))
            })?;
        Self::with_http_client(client, base_url, anon_key)
    }

    /// Uses a caller-built `reqwest::Client` as is.
    pub fn with_http_client(
        client: Client,
        base_url: &str,
        anon_key: SecretString,
    ) -> Result<Self, GenerationError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(GenerationError::NotConfigured(
                "backend base URL is empty".to_string(),
            ));
        }
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            anon_key,
        })
    }

    /// Builds a client from the backend section, resolving the access key.
    pub fn from_config(config: &BackendConfig) -> Result<Self, GenerationError> {
        let key = config.key_source().resolve()?;
        Self::new(&config.base_url, key, config.timeout())
    }

    pub fn function_url(&self, function: &str) -> String {
        format!("{}/functions/v1/{}", self.base_url, function)
    }

    async fn post<B, R>(&self, function: &str, body: &B) -> Result<R, GenerationError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.function_url(function);
        debug!(%url, "Calling backend function");

        let key = self.anon_key.expose_secret();
        let response = self
            .client
            .post(&url)
            .bearer_auth(key)
            .header("apikey", key)
            .json(body)
            .send()
            .await
            .map_err(|e| GenerationError::Network {
                function: function.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = sanitize_error_body(&response.text().await.unwrap_or_default());
            warn!(function, status = status.as_u16(), %body, "Backend function failed");
            return Err(GenerationError::Transport {
                function: function.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| GenerationError::InvalidResponse {
                function: function.to_string(),
                message: e.to_string(),
            })
    }

    /// Runs one of the per-level analyses. `names` holds the selected
    /// segment for each level up to `level`.
    pub async fn analyze_level<S: AsRef<str> + Sync>(
        &self,
        level: u8,
        project_id: &str,
        names: &[S],
    ) -> Result<AnalyzeResponse, GenerationError> {
        if !(1..=3).contains(&level) {
            return Err(ValidationError::InvalidAnalysisLevel(level).into());
        }
        let request = AnalyzeRequest::new(project_id, names);
        let function = format!("analyze-level{}", level);
        self.post(&function, &request).await
    }

    /// Sends an invitation. The backend creates an inactive profile and
    /// emails the invitee.
    pub async fn invite_user(
        &self,
        email: &str,
        role: Role,
        client_id: &str,
        full_name: &str,
    ) -> Result<serde_json::Value, GenerationError> {
        let email = email.trim();
        if !looks_like_email(email) {
            return Err(ValidationError::InvalidEmail(email.to_string()).into());
        }
        let request = InviteRequest {
            email: email.to_string(),
            role: role.as_str().to_string(),
            client_id: client_id.to_string(),
            full_name: full_name.trim().to_string(),
        };
        let reply = self.post(INVITE_FUNCTION, &request).await?;
        info!(%email, %role, client_id, "Invitation sent");
        Ok(reply)
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[async_trait]
impl FacetGenerator for FunctionsClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, GenerationError> {
        self.post(GENERATE_FUNCTION, request).await
    }
}
