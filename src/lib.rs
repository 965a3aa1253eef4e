#![warn(missing_docs)]
//! BlendViz - compose a new image from one to three input images.
//!
//! Two strategies are available:
//!
//! - **Two-step**: a Gemini vision model describes the inputs as a single
//!   prompt, then Imagen renders that prompt.
//! - **Direct**: the inputs and a composition prompt go to an image-output
//!   Gemini model in one call.
//!
//! # Quick Start
//!
//! ```no_run
//! use blendviz::{Composer, Config, InputSet};
//!
//! #[tokio::main]
//! async fn main() -> blendviz::Result<()> {
//!     let config = Config::from_env()?;
//!     let composer = Composer::two_step(
//!         Box::new(config.describer()?),
//!         Box::new(config.imagen()?),
//!     );
//!     let inputs = InputSet::load(&["avatar.png", "shirt.jpg"])?;
//!     let result = composer.compose(&inputs).await?;
//!     result.image.save("generated_result.png")?;
//!     Ok(())
//! }
//! ```
//!
//! The API key is read from `GOOGLE_API_KEY`; there is no built-in default.

mod config;
pub mod describe;
mod error;
mod google;
pub mod image;
pub mod input;
mod pipeline;

pub use config::{Config, BASE_URL_ENV, DESCRIBE_MODEL_ENV, DIRECT_MODEL_ENV, IMAGE_MODEL_ENV};
pub use error::{BlendError, Result};

pub use describe::{GeminiDescriber, GeminiDescriberBuilder, PromptProvider, DEFAULT_INSTRUCTION};
pub use image::providers::{
    GeminiImageProvider, GeminiImageProviderBuilder, ImagenProvider, ImagenProviderBuilder,
};
pub use image::{
    GeneratedImage, GenerationMetadata, GenerationRequest, ImageFormat, ImageProvider,
    ImageProviderKind,
};
pub use input::{InputImage, InputSet, MAX_INPUTS, MIN_INPUTS, USAGE};
pub use pipeline::{
    default_output_path, Composer, Composition, Stage, Strategy, DEFAULT_DIRECT_PROMPT,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::describe::PromptProvider;
    pub use crate::error::{BlendError, Result};
    pub use crate::image::{GeneratedImage, GenerationRequest, ImageProvider};
    pub use crate::input::InputSet;
    pub use crate::pipeline::{Composer, Strategy};
}
