//! Gemini (Google) image-output provider for single-call composition.

use crate::error::{BlendError, Result};
use crate::google::{
    self, collect_text, Content, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, RequestPart,
};
use crate::image::provider::ImageProvider;
use crate::image::types::{
    GeneratedImage, GenerationMetadata, GenerationRequest, ImageProviderKind,
};
use async_trait::async_trait;
use base64::Engine;
use std::time::Instant;

/// Default image-output Gemini model.
pub const DEFAULT_DIRECT_MODEL: &str = "gemini-2.5-flash-image";

/// Builder for GeminiImageProvider.
#[derive(Debug, Clone, Default)]
pub struct GeminiImageProviderBuilder {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
}

impl GeminiImageProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the model identifier (default `gemini-2.5-flash-image`).
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Overrides the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the provider, resolving the API key.
    pub fn build(self) -> Result<GeminiImageProvider> {
        Ok(GeminiImageProvider {
            client: reqwest::Client::new(),
            api_key: google::resolve_api_key(self.api_key)?,
            model: self.model.unwrap_or_else(|| DEFAULT_DIRECT_MODEL.to_string()),
            base_url: self
                .base_url
                .unwrap_or_else(|| google::DEFAULT_BASE_URL.to_string()),
        })
    }
}

/// Gemini image generation provider.
pub struct GeminiImageProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiImageProvider {
    /// Creates a new `GeminiImageProviderBuilder`.
    pub fn builder() -> GeminiImageProviderBuilder {
        GeminiImageProviderBuilder::new()
    }

    /// Model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate_impl(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        let start = Instant::now();
        let url = google::model_url(&self.base_url, &self.model, "generateContent");
        let body = build_request(request);

        tracing::debug!(
            model = %self.model,
            references = request.reference_images.len(),
            "submitted Gemini image request"
        );
        let response: GenerateContentResponse =
            google::post_json(&self.client, &url, &self.api_key, &body).await?;
        let parts = response.into_parts()?;

        let Some(inline) = parts.iter().find_map(|p| p.inline_data.as_ref()) else {
            let text = collect_text(&parts);
            if text.is_empty() {
                return Err(BlendError::UnexpectedResponse(
                    "no image data in Gemini response".into(),
                ));
            }
            return Err(BlendError::TextOnly(text));
        };

        let image = GeneratedImage::from_base64(
            &inline.data,
            Some(inline.mime_type.as_str()),
            ImageProviderKind::Gemini,
            GenerationMetadata {
                model: Some(self.model.clone()),
                duration_ms: Some(start.elapsed().as_millis() as u64),
            },
        )?;

        tracing::debug!(bytes = image.size(), "Gemini image request complete");
        Ok(image)
    }
}

#[async_trait]
impl ImageProvider for GeminiImageProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        self.generate_impl(request).await
    }

    fn kind(&self) -> ImageProviderKind {
        ImageProviderKind::Gemini
    }
}

/// Reference images first, then the prompt.
fn build_request(req: &GenerationRequest) -> GenerateContentRequest {
    let mut parts: Vec<RequestPart> = req
        .reference_images
        .iter()
        .map(|image| {
            RequestPart::inline(
                image.format.mime_type(),
                base64::engine::general_purpose::STANDARD.encode(&image.data),
            )
        })
        .collect();
    parts.push(RequestPart::text(req.prompt.clone()));

    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts,
        }],
        generation_config: Some(GenerationConfig {
            response_modalities: vec!["TEXT", "IMAGE"],
        }),
    }
}
