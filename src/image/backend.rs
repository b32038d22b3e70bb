//! Backend trait for the external generative image service.

use crate::error::Result;
use crate::image::request::{EditRequest, ResponsePart, TextToImageRequest};
use async_trait::async_trait;

/// An image returned by text-to-image generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    /// Base64 body as returned by the service.
    pub data: String,
    /// Media type reported by the service, if any.
    pub media_type: Option<String>,
}

/// Transport to a generative image service.
///
/// Implementations only move requests and responses; prompt shaping and
/// result extraction live in [`GenerationClient`](crate::image::GenerationClient).
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Runs text-to-image generation and returns the images produced.
    async fn text_to_image(&self, request: &TextToImageRequest) -> Result<Vec<RawImage>>;

    /// Runs a multi-part edit and returns the response parts in order.
    async fn edit(&self, request: &EditRequest) -> Result<Vec<ResponsePart>>;

    /// Model identifier used for text-to-image requests.
    fn create_model(&self) -> &str;

    /// Model identifier used for edit requests.
    fn edit_model(&self) -> &str;

    /// Returns the name of this backend for display.
    fn name(&self) -> &str;

    /// Checks if the service is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}
