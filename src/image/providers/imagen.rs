//! Imagen (Google) text-to-image provider.

use crate::error::{BlendError, Result};
use crate::google;
use crate::image::provider::ImageProvider;
use crate::image::types::{
    GeneratedImage, GenerationMetadata, GenerationRequest, ImageProviderKind,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Default Imagen model.
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-3.0-generate-002";

/// Builder for ImagenProvider.
#[derive(Debug, Clone, Default)]
pub struct ImagenProviderBuilder {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
}

impl ImagenProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the model identifier (default `imagen-3.0-generate-002`).
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
    pub fn build(self) -> Result<ImagenProvider> {
        Ok(ImagenProvider {
            client: reqwest::Client::new(),
            api_key: google::resolve_api_key(self.api_key)?,
            model: self.model.unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            base_url: self
                .base_url
                .unwrap_or_else(|| google::DEFAULT_BASE_URL.to_string()),
        })
    }
}

/// Imagen `predict` client.
pub struct ImagenProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl ImagenProvider {
    /// Creates a new `ImagenProviderBuilder`.
    pub fn builder() -> ImagenProviderBuilder {
        ImagenProviderBuilder::new()
    }

    /// Model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate_impl(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        if request.prompt.trim().is_empty() {
            return Err(BlendError::InvalidRequest("prompt must not be empty".into()));
        }
        if !request.reference_images.is_empty() {
            tracing::debug!(
                count = request.reference_images.len(),
                "Imagen ignores reference images"
            );
        }

        let start = Instant::now();
        let url = google::model_url(&self.base_url, &self.model, "predict");
        let body = ImagenRequest::from_generation_request(request);

        tracing::debug!(model = %self.model, "submitted Imagen request");
        let response: ImagenResponse =
            google::post_json(&self.client, &url, &self.api_key, &body).await?;

        let prediction = response.into_image_prediction()?;
        let image = GeneratedImage::from_base64(
            &prediction.bytes_base64_encoded.unwrap_or_default(),
            prediction.mime_type.as_deref(),
            ImageProviderKind::Imagen,
            GenerationMetadata {
                model: Some(self.model.clone()),
                duration_ms: Some(start.elapsed().as_millis() as u64),
            },
        )?;

        tracing::debug!(bytes = image.size(), "Imagen request complete");
        Ok(image)
    }
}

#[async_trait]
impl ImageProvider for ImagenProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        self.generate_impl(request).await
    }

    fn kind(&self) -> ImageProviderKind {
        ImageProviderKind::Imagen
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
struct ImagenRequest {
    instances: Vec<ImagenInstance>,
    parameters: ImagenParameters,
}

#[derive(Debug, Serialize)]
struct ImagenInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImagenParameters {
    sample_count: u32,
}

impl ImagenRequest {
    fn from_generation_request(req: &GenerationRequest) -> Self {
        Self {
            instances: vec![ImagenInstance {
                prompt: req.prompt.clone(),
            }],
            parameters: ImagenParameters {
                sample_count: req.sample_count.max(1),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ImagenResponse {
    #[serde(default)]
    predictions: Vec<ImagenPrediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImagenPrediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    rai_filtered_reason: Option<String>,
}

impl ImagenResponse {
    /// Picks the first prediction carrying image bytes.
    fn into_image_prediction(self) -> Result<ImagenPrediction> {
        let mut filtered = None;
        for prediction in self.predictions {
            if prediction
                .bytes_base64_encoded
                .as_deref()
                .is_some_and(|b| !b.is_empty())
            {
                return Ok(prediction);
            }
            if filtered.is_none() {
                filtered = prediction.rai_filtered_reason;
            }
        }

        match filtered {
            Some(reason) => Err(BlendError::ContentBlocked(reason)),
            None => Err(BlendError::UnexpectedResponse(
                "no image data found in the Imagen response".into(),
            )),
        }
    }
}
