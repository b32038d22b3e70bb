//! Core types for image creation and editing.

use crate::error::{Result, StudioError};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format.
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Maps a MIME type back to a format.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.to_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// Top-level operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Text-to-image creation.
    #[default]
    Create,
    /// Editing or composing existing images.
    Edit,
}

impl Mode {
    /// Returns the mode identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Edit => "edit",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prompt-shaping strategy in creation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreateFunction {
    /// Prompt sent unchanged.
    #[default]
    Free,
    /// Die-cut sticker styling.
    Sticker,
    /// Minimalist logo around the prompt text.
    Text,
    /// Comic-book styling.
    Comic,
}

impl CreateFunction {
    /// All creation functions in display order.
    pub const ALL: [CreateFunction; 4] = [Self::Free, Self::Sticker, Self::Text, Self::Comic];

    /// Returns the function identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Sticker => "sticker",
            Self::Text => "text",
            Self::Comic => "comic",
        }
    }
}

impl std::fmt::Display for CreateFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Editing intent in edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditFunction {
    /// Add or remove elements.
    #[default]
    AddRemove,
    /// Retouch details.
    Retouch,
    /// Restyle the image.
    Style,
    /// Combine two images into one.
    Compose,
}

impl EditFunction {
    /// All edit functions in display order.
    pub const ALL: [EditFunction; 4] = [Self::AddRemove, Self::Retouch, Self::Style, Self::Compose];

    /// Returns the function identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddRemove => "add-remove",
            Self::Retouch => "retouch",
            Self::Style => "style",
            Self::Compose => "compose",
        }
    }

    /// Only composition needs a second source image.
    pub fn requires_two_images(&self) -> bool {
        matches!(self, Self::Compose)
    }
}

impl std::fmt::Display for EditFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output shape hint for creation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 1:1 square aspect ratio.
    #[default]
    #[serde(rename = "1:1")]
    Square,
    /// 16:9 landscape aspect ratio.
    #[serde(rename = "16:9")]
    Landscape,
    /// 9:16 portrait aspect ratio.
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    /// All aspect ratios in display order.
    pub const ALL: [AspectRatio; 3] = [Self::Square, Self::Landscape, Self::Portrait];

    /// Returns the aspect ratio as a string (e.g., "16:9").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AspectRatio {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| StudioError::validation(format!("unsupported aspect ratio: {s}")))
    }
}

/// A source image: base64 body plus declared media type.
///
/// Either a user upload or a prior result re-entered for editing. Replaced,
/// never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    /// Base64 body without any data URL header.
    pub data: String,
    /// Image MIME type, e.g. `image/png`.
    pub media_type: String,
}

impl ImagePayload {
    /// Creates a payload from an already-encoded body.
    pub fn new(data: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            media_type: media_type.into(),
        }
    }

    /// Encodes raw bytes.
    pub fn from_bytes(bytes: &[u8], media_type: impl Into<String>) -> Self {
        Self::new(
            base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type,
        )
    }

    /// Decodes the base64 body.
    pub fn decode_bytes(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| StudioError::Decode(e.to_string()))
    }

    /// Returns `data:<mediaType>;base64,<data>`.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// Metadata about the generation process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Generation duration in milliseconds.
    pub duration_ms: Option<u64>,
    /// Accompanying text returned alongside the image, if any.
    pub text: Option<String>,
}

/// The output of a generation: a data URL plus metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "generation result should be displayed or saved"]
pub struct GenerationResult {
    data_url: String,
    /// Generation metadata.
    pub metadata: GenerationMetadata,
}

impl GenerationResult {
    /// Wraps a payload as a result.
    pub fn new(payload: &ImagePayload, metadata: GenerationMetadata) -> Self {
        Self {
            data_url: payload.to_data_url(),
            metadata,
        }
    }

    /// Accepts an existing data URL, e.g. one decoded from a share link.
    ///
    /// Fails unless the value is an image data URL with a base64 body.
    pub fn from_data_url(data_url: impl Into<String>) -> Result<Self> {
        let data_url = data_url.into();
        if !crate::image::codec::is_image_data_url(&data_url) {
            return Err(StudioError::Decode("not an image data URL".into()));
        }
        crate::image::codec::decompose_data_url(&data_url)?.decode_bytes()?;
        Ok(Self {
            data_url,
            metadata: GenerationMetadata::default(),
        })
    }

    /// The full `data:` URL.
    pub fn as_data_url(&self) -> &str {
        &self.data_url
    }

    /// Splits the data URL back into a payload.
    pub fn to_payload(&self) -> Result<ImagePayload> {
        crate::image::codec::decompose_data_url(&self.data_url)
    }

    /// Decodes the image bytes.
    pub fn decode_bytes(&self) -> Result<Vec<u8>> {
        self.to_payload()?.decode_bytes()
    }

    /// Best-effort format from the embedded media type.
    pub fn format(&self) -> ImageFormat {
        self.to_payload()
            .ok()
            .and_then(|p| ImageFormat::from_mime_type(&p.media_type))
            .unwrap_or_default()
    }

    /// File extension for the embedded media type, `png` when unknown.
    pub fn file_extension(&self) -> &'static str {
        let Ok(payload) = self.to_payload() else {
            return ImageFormat::default().extension();
        };
        if let Some(format) = ImageFormat::from_mime_type(&payload.media_type) {
            return format.extension();
        }
        mime_guess::get_mime_extensions_str(&payload.media_type)
            .and_then(|exts| exts.first().copied())
            .unwrap_or_else(|| ImageFormat::default().extension())
    }

    /// Default download file name, `ai-image-<unix millis>.<ext>`.
    pub fn download_file_name(&self) -> String {
        format!(
            "ai-image-{}.{}",
            chrono::Utc::now().timestamp_millis(),
            self.file_extension()
        )
    }

    /// Saves the decoded image to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.decode_bytes()?)?;
        Ok(())
    }
}

impl std::fmt::Display for GenerationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.data_url)
    }
}
