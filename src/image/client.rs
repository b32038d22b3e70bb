//! Generation client: shapes requests and turns responses into results.

use crate::error::{Result, StudioError};
use crate::image::backend::ImageBackend;
use crate::image::request::{EditRequest, ResponsePart, TextToImageRequest};
use crate::image::types::{
    AspectRatio, CreateFunction, EditFunction, GenerationMetadata, GenerationResult, ImagePayload,
};
use std::time::Instant;

/// Issues create and edit calls against an [`ImageBackend`].
#[derive(Debug, Clone)]
pub struct GenerationClient<B> {
    backend: B,
}

impl<B: ImageBackend> GenerationClient<B> {
    /// Wraps a backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Creates an image from text. The result is always a PNG data URL.
    pub async fn create_image(
        &self,
        prompt: &str,
        function: CreateFunction,
        aspect_ratio: AspectRatio,
    ) -> Result<GenerationResult> {
        let start = Instant::now();
        let request = TextToImageRequest::for_create(prompt, function, aspect_ratio);
        tracing::debug!(
            model = self.backend.create_model(),
            %function,
            %aspect_ratio,
            "submitting text-to-image request"
        );

        let image = self
            .backend
            .text_to_image(&request)
            .await?
            .into_iter()
            .next()
            .ok_or(StudioError::NoImageReturned)?;

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(duration_ms, "text-to-image complete");

        Ok(GenerationResult::new(
            &ImagePayload::new(image.data, request.output_mime_type),
            GenerationMetadata {
                model: Some(self.backend.create_model().to_string()),
                duration_ms: Some(duration_ms),
                text: None,
            },
        ))
    }

    /// Edits `image1`, or combines it with `image2` when composing.
    ///
    /// The first inline image part of the response becomes the result, with
    /// the media type the service reported for it.
    pub async fn edit_or_compose_image(
        &self,
        prompt: &str,
        function: EditFunction,
        image1: &ImagePayload,
        image2: Option<&ImagePayload>,
    ) -> Result<GenerationResult> {
        let start = Instant::now();
        let request = EditRequest::for_edit(prompt, function, image1, image2);
        tracing::debug!(
            model = self.backend.edit_model(),
            %function,
            images = request.images.len(),
            "submitting edit request"
        );

        let parts = self.backend.edit(&request).await?;

        let mut text = None;
        let mut image = None;
        for part in parts {
            match part {
                ResponsePart::InlineImage(payload) => {
                    image = Some(payload);
                    break;
                }
                ResponsePart::Text(t) if text.is_none() => text = Some(t),
                ResponsePart::Text(_) => {}
            }
        }
        let image = image.ok_or(StudioError::NoImageReturned)?;

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(duration_ms, media_type = %image.media_type, "edit complete");

        Ok(GenerationResult::new(
            &image,
            GenerationMetadata {
                model: Some(self.backend.edit_model().to_string()),
                duration_ms: Some(duration_ms),
                text,
            },
        ))
    }
}
