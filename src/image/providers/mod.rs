//! Image generation providers.

mod gemini;
mod imagen;

pub use gemini::{GeminiImageProvider, GeminiImageProviderBuilder, DEFAULT_DIRECT_MODEL};
pub use imagen::{ImagenProvider, ImagenProviderBuilder, DEFAULT_IMAGE_MODEL};
