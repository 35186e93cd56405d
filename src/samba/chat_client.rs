use crate::{
    config::{ChatModelConfig, CHAT_MODELS},
    error::{Result, SambaError},
    models::{ApiResponse, ChatRequest, StreamChunk},
    samba::{drain_response, map_transport_err, send_completion, sse::SseDecoder},
};
use futures::{Stream, StreamExt};
use serde_json::json;
use std::pin::Pin;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
const DEFAULT_MAX_TOKENS: i32 = 2048;

#[derive(Clone, Debug)]
pub struct ChatClient {
    http: reqwest::Client,
    url: String,
}

impl ChatClient {
    pub fn new(http: reqwest::Client, url: String) -> Self {
        Self { http, url }
    }

    pub fn supported_models() -> &'static [&'static str] {
        CHAT_MODELS
    }

    /// Send a chat completion and block until the stream is fully drained.
    pub async fn generate(&self, request: ChatRequest) -> Result<ApiResponse> {
        let (model, payload) = Self::prepare(&request)?;

        log::info!("Sending chat completion to model: {}", model);
        log::debug!("Chat request payload: {}", payload);

        let response = send_completion(&self.http, &self.url, &payload).await?;
        drain_response(response, &model).await
    }

    /// Send a chat completion and yield text deltas as they arrive. The
    /// final chunk has `done: true` and carries the finish reason.
    pub async fn generate_stream(
        &self,
        request: ChatRequest,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>> {
        let (model, payload) = Self::prepare(&request)?;

        log::info!("Streaming chat completion from model: {}", model);

        let response = send_completion(&self.http, &self.url, &payload).await?;

        let (tx, rx) = tokio::sync::mpsc::channel(100);
        let mut body = response.bytes_stream();

        tokio::spawn(async move {
            let mut decoder = SseDecoder::new();
            while let Some(chunk) = body.next().await {
                match chunk {
                    Ok(bytes) => {
                        for delta in decoder.push(&bytes) {
                            let item = StreamChunk {
                                chunk: delta,
                                done: false,
                                finish_reason: None,
                            };
                            if tx.send(Ok(item)).await.is_err() {
                                return;
                            }
                        }
                        if decoder.is_done() {
                            break;
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(map_transport_err(e))).await;
                        return;
                    }
                }
            }
            let finish_reason = decoder.finish_reason().map(String::from);
            let _ = tx
                .send(Ok(StreamChunk {
                    chunk: String::new(),
                    done: true,
                    finish_reason,
                }))
                .await;
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    /// Validate the request and assemble the wire payload. Runs entirely
    /// locally; nothing reaches the network until this has succeeded.
    fn prepare(request: &ChatRequest) -> Result<(String, serde_json::Value)> {
        if request.prompt.trim().is_empty() {
            return Err(SambaError::ValidationError("prompt must not be empty".into()));
        }
        let model = match &request.model_id {
            Some(id) => ChatModelConfig::new(id)?,
            None => ChatModelConfig::default(),
        };
        let model = model.model_name().to_string();
        let payload = Self::build_payload(request, &model);
        Ok((model, payload))
    }

    fn build_payload(request: &ChatRequest, model: &str) -> serde_json::Value {
        let system_prompt = request
            .system_prompt
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_PROMPT);

        json!({
            "body": {
                "messages": [
                    {"role": "system", "content": system_prompt},
                    {"role": "user", "content": request.prompt},
                ],
                "max_tokens": request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
                "stop": ["<|eot_id|>"],
                "stream": true,
                "stream_options": {"include_usage": true},
                "model": model,
                "env_type": "text",
                "fingerprint": Uuid::new_v4().to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_carries_model_and_prompt() {
        let request = ChatRequest::new("Hi, who are you?");
        let payload = ChatClient::build_payload(&request, "Meta-Llama-3.2-1B-Instruct");
        let body = &payload["body"];

        assert_eq!(body["model"], "Meta-Llama-3.2-1B-Instruct");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], DEFAULT_SYSTEM_PROMPT);
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Hi, who are you?");
        assert_eq!(body["max_tokens"], 2048);
        assert_eq!(body["stream"], true);
        assert_eq!(body["stream_options"]["include_usage"], true);
        assert_eq!(body["stop"][0], "<|eot_id|>");
        assert_eq!(body["env_type"], "text");
    }

    #[test]
    fn test_payload_honors_overrides() {
        let request = ChatRequest::new("Summarize this")
            .with_system_prompt("You are terse.")
            .with_max_tokens(64);
        let payload = ChatClient::build_payload(&request, "Qwen2.5-72B-Instruct");
        let body = &payload["body"];

        assert_eq!(body["messages"][0]["content"], "You are terse.");
        assert_eq!(body["max_tokens"], 64);
        assert_eq!(body["model"], "Qwen2.5-72B-Instruct");
    }

    #[test]
    fn test_fingerprint_is_fresh_per_payload() {
        let request = ChatRequest::new("same prompt");
        let first = ChatClient::build_payload(&request, "Meta-Llama-3.2-1B-Instruct");
        let second = ChatClient::build_payload(&request, "Meta-Llama-3.2-1B-Instruct");

        assert_ne!(first["body"]["fingerprint"], second["body"]["fingerprint"]);
    }

    #[test]
    fn test_unknown_model_fails_before_any_payload_is_built() {
        let request = ChatRequest::new("hello").with_model("definitely-not-a-model");
        let err = ChatClient::prepare(&request).unwrap_err();
        assert!(matches!(err, SambaError::ValidationError(_)));
    }

    #[test]
    fn test_empty_prompt_is_rejected() {
        let err = ChatClient::prepare(&ChatRequest::new("   ")).unwrap_err();
        assert!(matches!(err, SambaError::ValidationError(_)));
    }

    #[test]
    fn test_default_model_is_used_when_none_requested() {
        let (model, _) = ChatClient::prepare(&ChatRequest::new("hello")).unwrap();
        assert_eq!(model, crate::config::DEFAULT_CHAT_MODEL);
    }

    #[tokio::test]
    async fn test_validation_failure_never_reaches_the_network() {
        // The endpoint is unroutable; a transport attempt would surface as
        // a TransportError, so a ValidationError proves nothing was sent.
        let client = ChatClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1/api/completion".to_string(),
        );
        let request = ChatRequest::new("hello").with_model("definitely-not-a-model");
        let err = client.generate(request).await.unwrap_err();
        assert!(matches!(err, SambaError::ValidationError(_)));
    }
}
