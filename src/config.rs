use crate::error::{Result, SambaError};
use crate::models::ModelKind;
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://cloud.sambanova.ai/api/completion";

pub const DEFAULT_CHAT_MODEL: &str = "Meta-Llama-3.2-1B-Instruct";
pub const DEFAULT_VISION_MODEL: &str = "Llama-3.2-11B-Vision-Instruct";

/// Model ids the upstream completion endpoint accepts for plain chat calls.
pub const CHAT_MODELS: &[&str] = &[
    "Meta-Llama-3.1-405B-Instruct",
    "Meta-Llama-3.1-70B-Instruct",
    "Meta-Llama-3.1-8B-Instruct",
    "Meta-Llama-3.2-1B-Instruct",
    "Meta-Llama-3.2-3B-Instruct",
    "Meta-Llama-Guard-3-8B",
    "Meta-Llama-3.3-70B-Instruct",
    "QwQ-32B-Preview",
    "Qwen2.5-Coder-32B-Instruct",
    "Qwen2.5-72B-Instruct",
];

/// Model ids the upstream accepts for image-carrying calls.
pub const VISION_MODELS: &[&str] = &[
    "Llama-3.2-11B-Vision-Instruct",
    "Llama-3.2-90B-Vision-Instruct",
];

pub fn supported_models(kind: ModelKind) -> &'static [&'static str] {
    match kind {
        ModelKind::Chat => CHAT_MODELS,
        ModelKind::Vision => VISION_MODELS,
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub cookie: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            cookie: None,
            base_url: None,
            timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let cookie = env::var("SAMBANOVA_COOKIE").ok();
        let base_url = env::var("SAMBANOVA_BASE_URL").ok();
        let timeout = env::var("SAMBANOVA_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs);

        ClientConfig {
            cookie,
            base_url,
            timeout,
        }
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Validated selection of a chat model. Construction fails for ids outside
/// [`CHAT_MODELS`]; an unknown id never falls back to the default.
#[derive(Debug, Clone)]
pub struct ChatModelConfig {
    model_name: String,
}

impl ChatModelConfig {
    pub fn new(model_name: impl Into<String>) -> Result<Self> {
        let model_name = model_name.into();
        if !CHAT_MODELS.contains(&model_name.as_str()) {
            return Err(SambaError::ValidationError(format!(
                "Invalid chat model '{}'. Available models: {:?}",
                model_name, CHAT_MODELS
            )));
        }
        Ok(Self { model_name })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl Default for ChatModelConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_CHAT_MODEL.to_string(),
        }
    }
}

/// Validated selection of a vision model, over [`VISION_MODELS`].
#[derive(Debug, Clone)]
pub struct VisionModelConfig {
    model_name: String,
}

impl VisionModelConfig {
    pub fn new(model_name: impl Into<String>) -> Result<Self> {
        let model_name = model_name.into();
        if !VISION_MODELS.contains(&model_name.as_str()) {
            return Err(SambaError::ValidationError(format!(
                "Invalid vision model '{}'. Available models: {:?}",
                model_name, VISION_MODELS
            )));
        }
        Ok(Self { model_name })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl Default for VisionModelConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_VISION_MODEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_model_validation() {
        let config = ChatModelConfig::new("Meta-Llama-3.1-70B-Instruct").unwrap();
        assert_eq!(config.model_name(), "Meta-Llama-3.1-70B-Instruct");

        let err = ChatModelConfig::new("gpt-4o").unwrap_err();
        assert!(matches!(err, SambaError::ValidationError(_)));
    }

    #[test]
    fn test_vision_model_validation() {
        let config = VisionModelConfig::new("Llama-3.2-90B-Vision-Instruct").unwrap();
        assert_eq!(config.model_name(), "Llama-3.2-90B-Vision-Instruct");

        // Chat ids are not valid vision ids.
        let err = VisionModelConfig::new("Meta-Llama-3.2-1B-Instruct").unwrap_err();
        assert!(matches!(err, SambaError::ValidationError(_)));
    }

    #[test]
    fn test_default_models() {
        assert_eq!(ChatModelConfig::default().model_name(), DEFAULT_CHAT_MODEL);
        assert_eq!(
            VisionModelConfig::default().model_name(),
            DEFAULT_VISION_MODEL
        );
        assert!(CHAT_MODELS.contains(&DEFAULT_CHAT_MODEL));
        assert!(VISION_MODELS.contains(&DEFAULT_VISION_MODEL));
    }

    #[test]
    fn test_model_sets_are_disjoint() {
        for id in supported_models(ModelKind::Vision) {
            assert!(!supported_models(ModelKind::Chat).contains(id));
        }
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new()
            .with_cookie("nonce=abc123")
            .with_base_url("http://localhost:9999/api/completion")
            .with_timeout(Duration::from_secs(30));

        assert_eq!(config.cookie.as_deref(), Some("nonce=abc123"));
        assert_eq!(
            config.base_url.as_deref(),
            Some("http://localhost:9999/api/completion")
        );
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }
}
