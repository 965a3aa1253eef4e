//! Core types for image generation.

use crate::error::{BlendError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format.
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Attempts to detect format from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Infers the format of a local file from its extension.
    ///
    /// Unknown or missing extensions are treated as JPEG.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .unwrap_or(Self::Jpeg)
    }

    /// Maps a MIME type returned by an API to a format.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.to_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// Image provider kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageProviderKind {
    /// Google Imagen text-to-image models.
    Imagen,
    /// Google Gemini image-output models.
    Gemini,
}

impl std::fmt::Display for ImageProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Imagen => write!(f, "imagen"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

/// Metadata about the generation process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Generation duration in milliseconds.
    pub duration_ms: Option<u64>,
}

/// An image handed to the generator as visual context, already in memory.
#[derive(Debug, Clone)]
pub struct ReferenceImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// Declared format, sent as the part's MIME type.
    pub format: ImageFormat,
}

/// A request to generate an image.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// The text prompt describing the desired image.
    pub prompt: String,
    /// Number of images to request. Only the first one is kept.
    pub sample_count: u32,
    /// Reference images for providers that accept visual input.
    pub reference_images: Vec<ReferenceImage>,
}

impl GenerationRequest {
    /// Creates a new request with the given prompt and a single sample.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            sample_count: 1,
            reference_images: Vec::new(),
        }
    }

    /// Adds a reference image.
    pub fn with_reference_image(mut self, data: Vec<u8>, format: ImageFormat) -> Self {
        self.reference_images.push(ReferenceImage { data, format });
        self
    }
}

/// A generated image with its data and metadata.
#[derive(Debug, Clone)]
#[must_use = "generated image should be saved or processed"]
pub struct GeneratedImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// Image format.
    pub format: ImageFormat,
    /// Provider that generated this image.
    pub provider: ImageProviderKind,
    /// Generation metadata.
    pub metadata: GenerationMetadata,
}

impl GeneratedImage {
    /// Creates a new generated image.
    pub fn new(
        data: Vec<u8>,
        format: ImageFormat,
        provider: ImageProviderKind,
        metadata: GenerationMetadata,
    ) -> Self {
        Self {
            data,
            format,
            provider,
            metadata,
        }
    }

    /// Decodes a base64 payload returned by an API.
    ///
    /// The format comes from the declared MIME type, then the magic bytes,
    /// and finally defaults to PNG.
    pub fn from_base64(
        payload: &str,
        mime_type: Option<&str>,
        provider: ImageProviderKind,
        metadata: GenerationMetadata,
    ) -> Result<Self> {
        use base64::Engine;

        let data = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| BlendError::Decode(e.to_string()))?;
        if data.is_empty() {
            return Err(BlendError::Decode("empty image payload".into()));
        }

        let format = mime_type
            .and_then(ImageFormat::from_mime_type)
            .or_else(|| ImageFormat::from_magic_bytes(&data))
            .unwrap_or_default();

        Ok(Self::new(data, format, provider, metadata))
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Saves the image to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }

    /// Encodes the image data as base64.
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ImageFormat::from_extension("png"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("gif"), None);
    }

    #[test]
    fn test_format_from_path_falls_back_to_jpeg() {
        assert_eq!(ImageFormat::from_path("avatar.png"), ImageFormat::Png);
        assert_eq!(ImageFormat::from_path("Navyshirt.JPG"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_path("pants.webp"), ImageFormat::WebP);
        assert_eq!(ImageFormat::from_path("scan.bmp"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_path("noext"), ImageFormat::Jpeg);
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(ImageFormat::from_path("a.png").mime_type(), "image/png");
        assert_eq!(ImageFormat::from_path("a.jpg").mime_type(), "image/jpeg");
        assert_eq!(
            ImageFormat::from_mime_type("image/webp"),
            Some(ImageFormat::WebP)
        );
    }

    #[test]
    fn test_format_from_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&PNG_MAGIC),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&JPEG_MAGIC),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::from_magic_bytes(&[0x89]), None);
    }

    #[test]
    fn test_from_base64_prefers_declared_mime() {
        use base64::Engine;
        let payload = base64::engine::general_purpose::STANDARD.encode(PNG_MAGIC);
        let image = GeneratedImage::from_base64(
            &payload,
            Some("image/jpeg"),
            ImageProviderKind::Imagen,
            GenerationMetadata::default(),
        )
        .unwrap();
        assert_eq!(image.format, ImageFormat::Jpeg);
        assert_eq!(image.data, PNG_MAGIC);

        let sniffed = GeneratedImage::from_base64(
            &payload,
            None,
            ImageProviderKind::Imagen,
            GenerationMetadata::default(),
        )
        .unwrap();
        assert_eq!(sniffed.format, ImageFormat::Png);
        assert_eq!(sniffed.to_base64(), payload);
    }

    #[test]
    fn test_from_base64_rejects_garbage() {
        let err = GeneratedImage::from_base64(
            "not base64!!",
            None,
            ImageProviderKind::Imagen,
            GenerationMetadata::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BlendError::Decode(_)));

        let err = GeneratedImage::from_base64(
            "",
            None,
            ImageProviderKind::Imagen,
            GenerationMetadata::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BlendError::Decode(_)));
    }

    #[test]
    fn test_save_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let image = GeneratedImage::new(
            PNG_MAGIC.to_vec(),
            ImageFormat::Png,
            ImageProviderKind::Gemini,
            GenerationMetadata::default(),
        );
        image.save(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), PNG_MAGIC);
        assert_eq!(image.size(), 12);
    }

    #[test]
    fn test_provider_kind_display() {
        assert_eq!(ImageProviderKind::Imagen.to_string(), "imagen");
        assert_eq!(ImageProviderKind::Gemini.to_string(), "gemini");
    }
}
