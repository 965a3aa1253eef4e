//! Loading and validating the local input images.

use crate::error::{BlendError, Result};
use crate::image::ImageFormat;
use std::path::{Path, PathBuf};

/// Fewest input images a composition accepts.
pub const MIN_INPUTS: usize = 1;
/// Most input images a composition accepts.
pub const MAX_INPUTS: usize = 3;

/// Usage line shown when the number of inputs is wrong.
pub const USAGE: &str = "Usage: blendviz <image1> [<image2>] [<image3>]\n\
                         Example: blendviz avatar.png shirt.jpg pants.jpg";

/// A local image read into memory.
#[derive(Debug, Clone)]
pub struct InputImage {
    /// Where the image was read from.
    pub path: PathBuf,
    /// Format inferred from the file extension.
    pub format: ImageFormat,
    /// Raw file bytes.
    pub data: Vec<u8>,
}

impl InputImage {
    /// Reads an image from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(BlendError::MissingInput(path.to_path_buf()));
        }
        let data = std::fs::read(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            format: ImageFormat::from_path(path),
            data,
        })
    }

    /// MIME type sent alongside the inline data.
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Encodes the file contents as standard base64.
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}

/// Checks that `count` is within `MIN_INPUTS..=MAX_INPUTS`.
pub fn validate_count(count: usize) -> Result<()> {
    if (MIN_INPUTS..=MAX_INPUTS).contains(&count) {
        Ok(())
    } else {
        Err(BlendError::InvalidRequest(format!(
            "expected {MIN_INPUTS} to {MAX_INPUTS} images, got {count}\n{USAGE}"
        )))
    }
}

/// The one to three images of a single composition, in argument order.
#[derive(Debug, Clone)]
pub struct InputSet {
    images: Vec<InputImage>,
}

impl InputSet {
    /// Validates the count, then loads every path.
    ///
    /// All files are read before any request is made, so a typo in the
    /// third path fails before the first API call.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        validate_count(paths.len())?;
        let images = paths
            .iter()
            .map(InputImage::load)
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(count = images.len(), "loaded input images");
        Ok(Self { images })
    }

    /// Builds a set from images already in memory.
    pub fn from_images(images: Vec<InputImage>) -> Result<Self> {
        validate_count(images.len())?;
        Ok(Self { images })
    }

    /// The loaded images.
    pub fn images(&self) -> &[InputImage] {
        &self.images
    }

    /// Number of images in the set.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Always false for a validated set.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
