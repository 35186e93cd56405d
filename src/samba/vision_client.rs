use crate::{
    config::{VisionModelConfig, VISION_MODELS},
    error::{Result, SambaError},
    models::{ApiResponse, VisionRequest},
    samba::{drain_response, send_completion},
};
use serde_json::json;
use std::fs;
use std::path::Path;
use uuid::Uuid;

const DEFAULT_MAX_TOKENS: i32 = 2048;

#[derive(Clone, Debug)]
pub struct VisionClient {
    http: reqwest::Client,
    url: String,
}

impl VisionClient {
    pub fn new(http: reqwest::Client, url: String) -> Self {
        Self { http, url }
    }

    pub fn supported_models() -> &'static [&'static str] {
        VISION_MODELS
    }

    /// Describe a local image: reads and base64-encodes the file, sends the
    /// completion, and blocks until the stream is fully drained.
    pub async fn generate(&self, request: VisionRequest) -> Result<ApiResponse> {
        let (model, payload) = Self::prepare(&request)?;

        log::info!("Sending vision completion to model: {}", model);

        let response = send_completion(&self.http, &self.url, &payload).await?;
        drain_response(response, &model).await
    }

    /// Validate the request, read the image, and assemble the wire payload.
    /// Fails locally before anything reaches the network.
    fn prepare(request: &VisionRequest) -> Result<(String, serde_json::Value)> {
        if request.prompt.trim().is_empty() {
            return Err(SambaError::ValidationError("prompt must not be empty".into()));
        }
        let model = match &request.model_id {
            Some(id) => VisionModelConfig::new(id)?,
            None => VisionModelConfig::default(),
        };
        let model = model.model_name().to_string();
        let encoded = encode_image_file(Path::new(&request.image_path))?;
        let payload = Self::build_payload(request, &model, &encoded);
        Ok((model, payload))
    }

    fn build_payload(
        request: &VisionRequest,
        model: &str,
        encoded_image: &str,
    ) -> serde_json::Value {
        json!({
            "body": {
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "text", "text": request.prompt},
                        {"type": "image_url", "image_url": {
                            "url": format!("data:image/jpeg;base64,{}", encoded_image)
                        }},
                    ],
                }],
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

/// Read an image from disk and base64-encode it for the data URI.
pub fn encode_image_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| {
        SambaError::ValidationError(format!("Cannot read image file '{}': {}", path.display(), e))
    })?;
    if bytes.is_empty() {
        return Err(SambaError::ValidationError(format!(
            "Image file '{}' is empty",
            path.display()
        )));
    }
    Ok(base64::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_image(name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = env::temp_dir().join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_payload_mixes_text_and_image_content() {
        let request = VisionRequest::new("Describe the image.", "ignored.jpg");
        let payload =
            VisionClient::build_payload(&request, "Llama-3.2-11B-Vision-Instruct", "QUJD");
        let body = &payload["body"];

        assert_eq!(body["model"], "Llama-3.2-11B-Vision-Instruct");
        assert_eq!(body["messages"][0]["role"], "user");

        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "Describe the image.");
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(
            content[1]["image_url"]["url"],
            "data:image/jpeg;base64,QUJD"
        );
    }

    #[test]
    fn test_image_round_trips_through_base64() {
        let original: Vec<u8> = (0u8..=255).collect();
        let path = temp_image("rsamba_roundtrip.jpg", &original);

        let encoded = encode_image_file(&path).unwrap();
        let decoded = base64::decode(encoded).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_missing_image_is_a_validation_error() {
        let request = VisionRequest::new("Describe", "/no/such/file.jpg");
        let err = VisionClient::prepare(&request).unwrap_err();
        assert!(matches!(err, SambaError::ValidationError(_)));
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let path = temp_image("rsamba_empty.jpg", b"");
        let err = encode_image_file(&path).unwrap_err();
        assert!(matches!(err, SambaError::ValidationError(_)));
    }

    #[test]
    fn test_unknown_vision_model_is_rejected() {
        let path = temp_image("rsamba_model_check.jpg", b"\xff\xd8\xff");
        let request = VisionRequest::new("Describe", path.to_string_lossy())
            .with_model("Meta-Llama-3.2-1B-Instruct");
        let err = VisionClient::prepare(&request).unwrap_err();
        assert!(matches!(err, SambaError::ValidationError(_)));
    }
}
