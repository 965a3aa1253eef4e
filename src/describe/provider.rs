//! Prompt provider trait.

use crate::error::Result;
use crate::input::InputSet;
use async_trait::async_trait;

/// Instruction sent ahead of the images when asking for a combined prompt.
pub const DEFAULT_INSTRUCTION: &str = "Describe these images in detail, focusing on their \
main subjects, styles, and any common themes or elements. Provide a unified, creative, and \
descriptive prompt (max 150 words) that could be used to generate a new image combining \
aspects of all of them.";

/// Trait for vision models that describe a set of images as a single prompt.
#[async_trait]
pub trait PromptProvider: Send + Sync {
    /// Sends the instruction plus every image and returns the generated text.
    ///
    /// Never returns an empty string.
    async fn describe(&self, inputs: &InputSet, instruction: &str) -> Result<String>;

    /// Model identifier, for display.
    fn model(&self) -> &str;
}
