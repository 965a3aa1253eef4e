//! Environment-driven configuration.

use crate::describe::GeminiDescriber;
use crate::error::Result;
use crate::google;
use crate::image::providers::{GeminiImageProvider, ImagenProvider};

/// Overrides the describe model.
pub const DESCRIBE_MODEL_ENV: &str = "BLENDVIZ_DESCRIBE_MODEL";
/// Overrides the Imagen model.
pub const IMAGE_MODEL_ENV: &str = "BLENDVIZ_IMAGE_MODEL";
/// Overrides the direct-mode Gemini model.
pub const DIRECT_MODEL_ENV: &str = "BLENDVIZ_DIRECT_MODEL";
/// Overrides the API base URL.
pub const BASE_URL_ENV: &str = "BLENDVIZ_BASE_URL";

/// Settings shared by every provider of a run.
#[derive(Clone, Default)]
pub struct Config {
    /// API key, sent as `x-goog-api-key`.
    pub api_key: String,
    /// Base URL override.
    pub base_url: Option<String>,
    /// Describe model override.
    pub describe_model: Option<String>,
    /// Imagen model override.
    pub image_model: Option<String>,
    /// Direct-mode model override.
    pub direct_model: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("describe_model", &self.describe_model)
            .field("image_model", &self.image_model)
            .field("direct_model", &self.direct_model)
            .finish()
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// `GOOGLE_API_KEY` is mandatory; there is no built-in key.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Ok(Self {
            api_key: google::resolve_api_key(Some(
                non_empty(google::API_KEY_ENV).unwrap_or_default(),
            ))?,
            base_url: non_empty(BASE_URL_ENV),
            describe_model: non_empty(DESCRIBE_MODEL_ENV),
            image_model: non_empty(IMAGE_MODEL_ENV),
            direct_model: non_empty(DIRECT_MODEL_ENV),
        })
    }

    /// Builds the describe-step client.
    pub fn describer(&self) -> Result<GeminiDescriber> {
        let mut builder = GeminiDescriber::builder().api_key(&self.api_key);
        if let Some(model) = &self.describe_model {
            builder = builder.model(model);
        }
        if let Some(url) = &self.base_url {
            builder = builder.base_url(url);
        }
        builder.build()
    }

    /// Builds the Imagen client.
    pub fn imagen(&self) -> Result<ImagenProvider> {
        let mut builder = ImagenProvider::builder().api_key(&self.api_key);
        if let Some(model) = &self.image_model {
            builder = builder.model(model);
        }
        if let Some(url) = &self.base_url {
            builder = builder.base_url(url);
        }
        builder.build()
    }

    /// Builds the direct-mode Gemini image client.
    pub fn gemini_image(&self) -> Result<GeminiImageProvider> {
        let mut builder = GeminiImageProvider::builder().api_key(&self.api_key);
        if let Some(model) = &self.direct_model {
            builder = builder.model(model);
        }
        if let Some(url) = &self.base_url {
            builder = builder.base_url(url);
        }
        builder.build()
    }
}
