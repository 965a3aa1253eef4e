//! Gemini vision model that writes a prompt from the input images.

use crate::describe::provider::PromptProvider;
use crate::error::{BlendError, Result};
use crate::google::{
    self, collect_text, Content, GenerateContentRequest, GenerateContentResponse, RequestPart,
};
use crate::input::InputSet;
use async_trait::async_trait;
use std::time::Instant;

/// Default vision/text model.
pub const DEFAULT_DESCRIBE_MODEL: &str = "gemini-2.0-flash";

/// Builder for GeminiDescriber.
#[derive(Debug, Clone, Default)]
pub struct GeminiDescriberBuilder {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
}

impl GeminiDescriberBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the model identifier (default `gemini-2.0-flash`).
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Overrides the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the describer, resolving the API key.
    pub fn build(self) -> Result<GeminiDescriber> {
        Ok(GeminiDescriber {
            client: reqwest::Client::new(),
            api_key: google::resolve_api_key(self.api_key)?,
            model: self
                .model
                .unwrap_or_else(|| DEFAULT_DESCRIBE_MODEL.to_string()),
            base_url: self
                .base_url
                .unwrap_or_else(|| google::DEFAULT_BASE_URL.to_string()),
        })
    }
}

/// Gemini `generateContent` client used for the describe step.
pub struct GeminiDescriber {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiDescriber {
    /// Creates a new `GeminiDescriberBuilder`.
    pub fn builder() -> GeminiDescriberBuilder {
        GeminiDescriberBuilder::new()
    }

    fn build_request(inputs: &InputSet, instruction: &str) -> GenerateContentRequest {
        let mut parts = vec![RequestPart::text(instruction)];
        parts.extend(RequestPart::from_inputs(inputs));

        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts,
            }],
            generation_config: None,
        }
    }
}

#[async_trait]
impl PromptProvider for GeminiDescriber {
    async fn describe(&self, inputs: &InputSet, instruction: &str) -> Result<String> {
        let start = Instant::now();
        let url = google::model_url(&self.base_url, &self.model, "generateContent");
        let body = Self::build_request(inputs, instruction);

        tracing::debug!(model = %self.model, images = inputs.len(), "submitted describe request");
        let response: GenerateContentResponse =
            google::post_json(&self.client, &url, &self.api_key, &body).await?;

        let text = collect_text(&response.into_parts()?);
        if text.is_empty() {
            return Err(BlendError::UnexpectedResponse(
                "failed to generate a text prompt from the images".into(),
            ));
        }

        tracing::debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            chars = text.len(),
            "describe request complete"
        );
        Ok(text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
