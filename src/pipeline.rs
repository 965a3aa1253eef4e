//! The compose pipeline: describe the inputs, then generate.

use crate::describe::{PromptProvider, DEFAULT_INSTRUCTION};
use crate::error::{BlendError, Result};
use crate::image::{GeneratedImage, GenerationRequest, ImageFormat, ImageProvider};
use crate::input::InputSet;
use std::path::PathBuf;

/// Output file of a two-step run.
pub const TWO_STEP_OUTPUT: &str = "generated_result.png";

/// File stem of a direct run; the extension follows the returned format.
pub const DIRECT_OUTPUT_STEM: &str = "generated_style";

/// Prompt used by direct mode when none is given.
pub const DEFAULT_DIRECT_PROMPT: &str = "Based on the images provided, generate a new, single \
image that combines them: place the subject of the first image together with the items or \
elements shown in the others. The result should exactly match the illustration style and \
character design of the first image, preserve the colors of every element, and be a clean, \
full-body shot.";

/// How the composite image is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Describe with a vision model, then generate from the description.
    #[default]
    TwoStep,
    /// Send images and prompt to an image-output model in one call.
    Direct,
}

/// Where the pipeline currently is; reported through the progress callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Images sent to the vision model.
    Describing {
        /// Model identifier.
        model: String,
    },
    /// The vision model answered with this prompt.
    Prompt(String),
    /// Prompt (and, in direct mode, images) sent to the image model.
    Generating {
        /// Provider display name.
        provider: String,
    },
}

/// The result of a run.
#[derive(Debug)]
pub struct Composition {
    /// The generated prompt (two-step only).
    pub prompt: Option<String>,
    /// The generated image.
    pub image: GeneratedImage,
}

enum Plan {
    TwoStep {
        describer: Box<dyn PromptProvider>,
        instruction: String,
    },
    Direct {
        prompt: String,
    },
}

/// Runs one composition against a pair of providers.
pub struct Composer {
    plan: Plan,
    generator: Box<dyn ImageProvider>,
}

impl Composer {
    /// Two-step composer with the default instruction.
    pub fn two_step(describer: Box<dyn PromptProvider>, generator: Box<dyn ImageProvider>) -> Self {
        Self {
            plan: Plan::TwoStep {
                describer,
                instruction: DEFAULT_INSTRUCTION.to_string(),
            },
            generator,
        }
    }

    /// Direct composer with the default composition prompt.
    pub fn direct(generator: Box<dyn ImageProvider>) -> Self {
        Self {
            plan: Plan::Direct {
                prompt: DEFAULT_DIRECT_PROMPT.to_string(),
            },
            generator,
        }
    }

    /// Replaces the describe instruction. Ignored by a direct composer.
    pub fn with_instruction(mut self, text: impl Into<String>) -> Self {
        if let Plan::TwoStep { instruction, .. } = &mut self.plan {
            *instruction = text.into();
        }
        self
    }

    /// Replaces the composition prompt. Ignored by a two-step composer.
    pub fn with_prompt(mut self, text: impl Into<String>) -> Self {
        if let Plan::Direct { prompt } = &mut self.plan {
            *prompt = text.into();
        }
        self
    }

    /// The strategy this composer runs.
    pub fn strategy(&self) -> Strategy {
        match self.plan {
            Plan::TwoStep { .. } => Strategy::TwoStep,
            Plan::Direct { .. } => Strategy::Direct,
        }
    }

    /// Runs the pipeline without progress reporting.
    pub async fn compose(&self, inputs: &InputSet) -> Result<Composition> {
        self.compose_with_progress(inputs, |_| {}).await
    }

    /// Runs the pipeline, calling `on_stage` as each step starts or yields.
    pub async fn compose_with_progress<F>(
        &self,
        inputs: &InputSet,
        mut on_stage: F,
    ) -> Result<Composition>
    where
        F: FnMut(Stage) + Send,
    {
        match &self.plan {
            Plan::TwoStep {
                describer,
                instruction,
            } => {
                on_stage(Stage::Describing {
                    model: describer.model().to_string(),
                });
                let prompt = describer.describe(inputs, instruction).await?;
                on_stage(Stage::Prompt(prompt.clone()));

                on_stage(Stage::Generating {
                    provider: self.generator.name().to_string(),
                });
                let image = self.generator.generate(&GenerationRequest::new(&prompt)).await?;
                Ok(Composition {
                    prompt: Some(prompt),
                    image,
                })
            }
            Plan::Direct { prompt } => {
                if prompt.trim().is_empty() {
                    return Err(BlendError::InvalidRequest("prompt must not be empty".into()));
                }
                let request = inputs
                    .images()
                    .iter()
                    .fold(GenerationRequest::new(prompt), |req, image| {
                        req.with_reference_image(image.data.clone(), image.format)
                    });

                on_stage(Stage::Generating {
                    provider: self.generator.name().to_string(),
                });
                let image = self.generator.generate(&request).await?;
                Ok(Composition {
                    prompt: None,
                    image,
                })
            }
        }
    }
}

/// Default output path for a strategy and the format actually returned.
pub fn default_output_path(strategy: Strategy, format: ImageFormat) -> PathBuf {
    match strategy {
        Strategy::TwoStep => PathBuf::from(TWO_STEP_OUTPUT),
        Strategy::Direct => PathBuf::from(format!("{DIRECT_OUTPUT_STEM}.{}", format.extension())),
    }
}
