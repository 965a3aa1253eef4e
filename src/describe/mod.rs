//! Turning input images into a text prompt.

mod gemini;
mod provider;

pub use gemini::{GeminiDescriber, GeminiDescriberBuilder, DEFAULT_DESCRIBE_MODEL};
pub use provider::{PromptProvider, DEFAULT_INSTRUCTION};
