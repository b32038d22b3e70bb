//! Service-neutral request and response shapes.

use crate::image::prompt::{augment_prompt, compose_instruction};
use crate::image::types::{AspectRatio, CreateFunction, EditFunction, ImagePayload};
use serde::{Deserialize, Serialize};

/// Output MIME type requested from text-to-image generation.
pub const CREATE_OUTPUT_MIME_TYPE: &str = "image/png";

/// A text-to-image request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextToImageRequest {
    /// The prompt after augmentation.
    pub prompt: String,
    /// Number of images requested. Always 1 for the studio.
    pub number_of_images: u32,
    /// Requested output MIME type.
    pub output_mime_type: String,
    /// Output shape.
    pub aspect_ratio: AspectRatio,
}

impl TextToImageRequest {
    /// Builds the request for a creation function.
    pub fn for_create(prompt: &str, function: CreateFunction, aspect_ratio: AspectRatio) -> Self {
        Self {
            prompt: augment_prompt(prompt, function),
            number_of_images: 1,
            output_mime_type: CREATE_OUTPUT_MIME_TYPE.to_string(),
            aspect_ratio,
        }
    }
}

/// Modalities the edit endpoint may answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    /// Inline image data.
    Image,
    /// Plain text.
    Text,
}

/// An ordered multi-part edit/compose request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    /// Source images in order; one, or two when composing.
    pub images: Vec<ImagePayload>,
    /// Trailing text part.
    pub text: String,
    /// Requested response modalities.
    pub response_modalities: Vec<Modality>,
}

impl EditRequest {
    /// Builds the request for an edit function.
    ///
    /// `image2` is only attached, and the text only rewritten into a
    /// combination instruction, when composing with both images present.
    pub fn for_edit(
        prompt: &str,
        function: EditFunction,
        image1: &ImagePayload,
        image2: Option<&ImagePayload>,
    ) -> Self {
        let mut images = vec![image1.clone()];
        let text = match image2 {
            Some(second) if function == EditFunction::Compose => {
                images.push(second.clone());
                compose_instruction(prompt)
            }
            _ => prompt.to_string(),
        };

        Self {
            images,
            text,
            response_modalities: vec![Modality::Image, Modality::Text],
        }
    }
}

/// One part of an edit response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePart {
    /// Text commentary.
    Text(String),
    /// Inline image bytes with their reported media type.
    InlineImage(ImagePayload),
}
