pub mod chat_client;
pub mod sse;
pub mod vision_client;

use crate::{
    config::{ClientConfig, DEFAULT_BASE_URL},
    error::{Result, SambaError},
    models::{ApiResponse, ChatRequest, VisionRequest},
};
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use sse::SseDecoder;

pub use chat_client::ChatClient;
pub use vision_client::VisionClient;

/// Entry point for the SambaNova Cloud completion endpoint. Holds one
/// authenticated HTTP client shared by the chat and vision subclients.
#[derive(Clone, Debug)]
pub struct SambaClient {
    chat_client: ChatClient,
    vision_client: VisionClient,
}

impl SambaClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let cookie = config
            .cookie
            .as_deref()
            .map(str::trim)
            .filter(|cookie| !cookie.is_empty())
            .ok_or_else(|| {
                SambaError::ValidationError("authentication cookie is required".into())
            })?;

        let mut builder = reqwest::Client::builder().default_headers(build_headers(cookie)?);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| {
            SambaError::TransportError(format!("failed to build HTTP client: {}", e))
        })?;

        let url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            chat_client: ChatClient::new(http.clone(), url.clone()),
            vision_client: VisionClient::new(http, url),
        })
    }

    pub fn chat(&self) -> &ChatClient {
        &self.chat_client
    }

    pub fn vision(&self) -> &VisionClient {
        &self.vision_client
    }

    /// Lossy convenience wrapper: logs the failure and returns an empty
    /// string instead of propagating it. The typed path is
    /// `client.chat().generate(..)`.
    pub async fn chat_text(&self, prompt: &str) -> String {
        match self.chat_client.generate(ChatRequest::new(prompt)).await {
            Ok(response) => response.content,
            Err(e) => {
                log::error!("Chat call failed: {}", e);
                String::new()
            }
        }
    }

    /// Lossy counterpart of `client.vision().generate(..)`.
    pub async fn vision_text(&self, prompt: &str, image_path: &str) -> String {
        let request = VisionRequest::new(prompt, image_path);
        match self.vision_client.generate(request).await {
            Ok(response) => response.content,
            Err(e) => {
                log::error!("Vision call failed: {}", e);
                String::new()
            }
        }
    }
}

/// Headers the upstream expects on every completion call. The cookie is
/// attached verbatim; it is the caller's credential and is never parsed.
fn build_headers(cookie: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert("accept", HeaderValue::from_static("text/event-stream"));
    headers.insert(
        "accept-language",
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert("content-type", HeaderValue::from_static("application/json"));
    headers.insert(
        "cookie",
        HeaderValue::from_str(cookie).map_err(|_| {
            SambaError::ValidationError("cookie contains characters invalid in a header".into())
        })?,
    );
    headers.insert("dnt", HeaderValue::from_static("1"));
    headers.insert(
        "origin",
        HeaderValue::from_static("https://cloud.sambanova.ai"),
    );
    headers.insert(
        "referer",
        HeaderValue::from_static("https://cloud.sambanova.ai/"),
    );
    headers.insert(
        "user-agent",
        HeaderValue::from_static(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
        ),
    );
    Ok(headers)
}

pub(crate) fn map_transport_err(e: reqwest::Error) -> SambaError {
    if e.is_timeout() {
        SambaError::TransportError(format!("request timed out: {}", e))
    } else if e.is_connect() {
        SambaError::TransportError(format!("connection failed: {}", e))
    } else {
        SambaError::TransportError(e.to_string())
    }
}

pub(crate) fn upstream_failure(status: reqwest::StatusCode, body: String) -> SambaError {
    SambaError::UpstreamError {
        status: status.as_u16(),
        body,
    }
}

/// POST the payload and hand back the response once the status is known to
/// be a success. Failure bodies are read as plain text, never decoded as a
/// stream.
pub(crate) async fn send_completion(
    http: &reqwest::Client,
    url: &str,
    payload: &serde_json::Value,
) -> Result<reqwest::Response> {
    let response = http
        .post(url)
        .json(payload)
        .send()
        .await
        .map_err(map_transport_err)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        log::error!("Upstream rejected request: HTTP {}", status);
        return Err(upstream_failure(status, body));
    }
    Ok(response)
}

/// Drain the event-stream body to completion and assemble the response.
pub(crate) async fn drain_response(
    response: reqwest::Response,
    model: &str,
) -> Result<ApiResponse> {
    let mut decoder = SseDecoder::new();
    let mut body = response.bytes_stream();

    while let Some(chunk) = body.next().await {
        let bytes = chunk.map_err(map_transport_err)?;
        decoder.push(&bytes);
        if decoder.is_done() {
            break;
        }
    }
    decoder.finish(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_cookie() {
        let err = SambaClient::new(ClientConfig::new()).unwrap_err();
        assert!(matches!(err, SambaError::ValidationError(_)));

        let err = SambaClient::new(ClientConfig::new().with_cookie("   ")).unwrap_err();
        assert!(matches!(err, SambaError::ValidationError(_)));
    }

    #[test]
    fn test_client_builds_with_cookie() {
        let client = SambaClient::new(ClientConfig::new().with_cookie("nonce=621abc"));
        assert!(client.is_ok());
    }

    #[test]
    fn test_cookie_with_control_characters_is_rejected() {
        let err = build_headers("nonce=abc\ndef").unwrap_err();
        assert!(matches!(err, SambaError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_lossy_wrappers_swallow_failures() {
        let client = SambaClient::new(ClientConfig::new().with_cookie("nonce=621abc")).unwrap();

        // Both fail validation locally, so no network is involved.
        assert_eq!(client.chat_text("   ").await, "");
        assert_eq!(client.vision_text("Describe", "/no/such/file.jpg").await, "");
    }

    #[test]
    fn test_unauthorized_status_maps_to_upstream_error() {
        let err = upstream_failure(
            reqwest::StatusCode::UNAUTHORIZED,
            "invalid credentials".into(),
        );
        match err {
            SambaError::UpstreamError { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid credentials");
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
    }
}
