//! HTTP client for the chat completions endpoint
//!
//! Issues exactly one POST per call. There is no retry; every non-success
//! outcome is classified into an [`AppError`] and returned.

use crate::config::{EndpointConfig, Profile};
use crate::error::{AppError, AppResult};
use crate::request::ChatCompletionRequest;
use reqwest::{StatusCode, Url};
use std::time::Duration;
use uuid::Uuid;

/// Header carrying the access key
pub const API_KEY_HEADER: &str = "api-key";
/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "x-ms-client-request-id";

/// Maximum number of characters of an error body kept in the error message
const ERROR_BODY_PREVIEW_CHARS: usize = 500;

/// Response returned by a successful call
///
/// Keeps the body text exactly as received alongside its parsed form.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    request_id: Uuid,
    raw: String,
    body: serde_json::Value,
}

impl CompletionResponse {
    /// Parse a received body; fails when it is not JSON
    pub fn parse(request_id: Uuid, raw: String) -> Result<Self, serde_json::Error> {
        let body = serde_json::from_str(&raw)?;
        Ok(Self {
            request_id,
            raw,
            body,
        })
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Body text as received from the endpoint
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn body(&self) -> &serde_json::Value {
        &self.body
    }
}

/// Client bound to one endpoint and credential
pub struct InferenceClient {
    http: reqwest::Client,
    endpoint: EndpointConfig,
    url: Url,
}

impl InferenceClient {
    /// Create a client for the given endpoint settings
    ///
    /// The request timeout is only applied when configured; otherwise the
    /// transport default is used.
    pub fn new(endpoint: EndpointConfig) -> AppResult<Self> {
        let url = completions_url(&endpoint)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = endpoint.request_timeout_seconds() {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let http = builder.build().map_err(|source| AppError::Transport {
            endpoint: url.to_string(),
            source,
        })?;

        Ok(Self {
            http,
            endpoint,
            url,
        })
    }

    /// Completions URL, without the `api-version` parameter
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    /// Send one chat completion request
    ///
    /// # Errors
    /// - `AppError::Authentication` for HTTP 401/403
    /// - `AppError::Service` for any other non-success status
    /// - `AppError::Transport` when the request cannot be sent or read
    /// - `AppError::MalformedResponse` when a success body is not JSON
    pub async fn complete(&self, request: &ChatCompletionRequest) -> AppResult<CompletionResponse> {
        let request_id = Uuid::new_v4();

        tracing::info!(
            request_id = %request_id,
            url = %self.url,
            deployment = %self.endpoint.deployment(),
            max_tokens = request.max_tokens(),
            messages = request.messages().len(),
            "Sending chat completion request"
        );

        let response = self
            .http
            .post(self.url.clone())
            .query(&[("api-version", self.endpoint.api_version())])
            .header(API_KEY_HEADER, self.endpoint.api_key().expose())
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .json(request)
            .send()
            .await
            .map_err(|source| self.transport_error(source))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| self.transport_error(source))?;

        tracing::debug!(
            request_id = %request_id,
            status = %status,
            bytes = text.len(),
            "Received response"
        );

        if !status.is_success() {
            return Err(self.status_error(status, &text));
        }

        CompletionResponse::parse(request_id, text).map_err(|source| {
            AppError::MalformedResponse {
                endpoint: self.url.to_string(),
                source,
            }
        })
    }

    fn transport_error(&self, source: reqwest::Error) -> AppError {
        AppError::Transport {
            endpoint: self.url.to_string(),
            source,
        }
    }

    fn status_error(&self, status: StatusCode, body: &str) -> AppError {
        let body = preview(body);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Authentication {
                endpoint: self.url.to_string(),
                status: status.as_u16(),
                body,
            },
            _ => AppError::Service {
                endpoint: self.url.to_string(),
                status: status.as_u16(),
                body,
            },
        }
    }
}

/// Build the completions URL for the endpoint's profile
///
/// Path segments are appended to the configured URL, so the deployment name
/// is percent-encoded and any query string on the endpoint is kept.
pub fn completions_url(endpoint: &EndpointConfig) -> AppResult<Url> {
    let mut url = Url::parse(endpoint.url()).map_err(|e| {
        AppError::Config(format!("invalid endpoint url '{}': {}", endpoint.url(), e))
    })?;

    let segments: Vec<&str> = match endpoint.profile() {
        Profile::Inference => vec!["chat", "completions"],
        Profile::Openai => vec![
            "openai",
            "deployments",
            endpoint.deployment(),
            "chat",
            "completions",
        ],
    };

    url.path_segments_mut()
        .map_err(|_| {
            AppError::Config(format!(
                "endpoint url '{}' cannot be used as a base url",
                endpoint.url()
            ))
        })?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

/// Truncate an error body on a char boundary
fn preview(body: &str) -> String {
    match body.char_indices().nth(ERROR_BODY_PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
