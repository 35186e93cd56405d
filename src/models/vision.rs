use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct VisionRequest {
    pub prompt: String,
    pub image_path: String,
    pub max_tokens: Option<i32>,
    pub model_id: Option<String>,
}

impl VisionRequest {
    pub fn new(prompt: impl Into<String>, image_path: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image_path: image_path.into(),
            max_tokens: None,
            model_id: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: i32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }
}
