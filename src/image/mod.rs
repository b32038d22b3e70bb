//! Image payloads, prompt shaping and the generation client.

mod backend;
pub mod backends;
mod client;
pub mod codec;
pub mod prompt;
mod request;
mod types;

pub use backend::{ImageBackend, RawImage};
pub use client::GenerationClient;
pub use codec::{decompose_data_url, encode_bytes, encode_upload, is_image_data_url};
pub use request::{EditRequest, Modality, ResponsePart, TextToImageRequest};
pub use types::{
    AspectRatio, CreateFunction, EditFunction, GenerationMetadata, GenerationResult, ImageFormat,
    ImagePayload, Mode,
};
