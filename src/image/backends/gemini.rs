//! Google Generative Language backend (Imagen for creation, Gemini for edits).

use crate::error::{parse_retry_after, sanitize_error_message, Result, StudioError};
use crate::image::backend::{ImageBackend, RawImage};
use crate::image::request::{EditRequest, Modality, ResponsePart, TextToImageRequest};
use crate::image::types::ImagePayload;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default REST endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 3] = ["GEMINI_API_KEY", "API_KEY", "GOOGLE_API_KEY"];

/// Imagen text-to-image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImagenModel {
    /// Imagen 4.
    #[default]
    Imagen4,
    /// Imagen 4 Fast.
    Imagen4Fast,
    /// Imagen 4 Ultra.
    Imagen4Ultra,
}

impl ImagenModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Imagen4 => "imagen-4.0-generate-001",
            Self::Imagen4Fast => "imagen-4.0-fast-generate-001",
            Self::Imagen4Ultra => "imagen-4.0-ultra-generate-001",
        }
    }
}

/// Gemini image editing model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Gemini 2.5 Flash Image, preview release.
    #[default]
    FlashImagePreview,
    /// Gemini 2.5 Flash Image.
    FlashImage,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FlashImagePreview => "gemini-2.5-flash-image-preview",
            Self::FlashImage => "gemini-2.5-flash-image",
        }
    }
}

/// Builder for [`GeminiBackend`].
#[derive(Debug, Clone, Default)]
pub struct GeminiBackendBuilder {
    api_key: Option<String>,
    imagen_model: ImagenModel,
    edit_model: GeminiModel,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl GeminiBackendBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GEMINI_API_KEY`, `API_KEY`, then
    /// `GOOGLE_API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the text-to-image model.
    pub fn imagen_model(mut self, model: ImagenModel) -> Self {
        self.imagen_model = model;
        self
    }

    /// Sets the edit model.
    pub fn edit_model(mut self, model: GeminiModel) -> Self {
        self.edit_model = model;
        self
    }

    /// Overrides the endpoint root (proxies, test servers).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets a request timeout. None by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the backend, resolving the API key.
    pub fn build(self) -> Result<GeminiBackend> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                API_KEY_ENV_VARS
                    .iter()
                    .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
            })
            .ok_or_else(|| {
                StudioError::Auth(format!(
                    "no API key provided and none of {} is set",
                    API_KEY_ENV_VARS.join(", ")
                ))
            })?;

        let mut client = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            client = client.timeout(timeout);
        }

        Ok(GeminiBackend {
            client: client.build()?,
            api_key,
            imagen_model: self.imagen_model,
            edit_model: self.edit_model,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

/// Backend speaking the Generative Language REST API.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
    imagen_model: ImagenModel,
    edit_model: GeminiModel,
    base_url: String,
}

impl std::fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiBackend")
            .field("imagen_model", &self.imagen_model)
            .field("edit_model", &self.edit_model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiBackend {
    /// Creates a new `GeminiBackendBuilder`.
    pub fn builder() -> GeminiBackendBuilder {
        GeminiBackendBuilder::new()
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }

    async fn post_json<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        body: &Req,
    ) -> Result<Resp> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            let err = parse_error(status.as_u16(), &text, &headers);
            tracing::warn!(status = status.as_u16(), "generative service rejected request: {err}");
            return Err(err);
        }

        Ok(response.json().await?)
    }
}

fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> StudioError {
    let text = sanitize_error_message(text);
    if status == 429 {
        let retry_after = parse_retry_after(headers).map(Duration::from_secs);
        return StudioError::RateLimited { retry_after };
    }
    if status == 401 || status == 403 {
        return StudioError::Auth(text);
    }
    if status == 404 {
        return StudioError::Api {
            status,
            message: "Model not found. Verify the model name is correct.".into(),
        };
    }
    let lower = text.to_lowercase();
    if lower.contains("safety") || lower.contains("blocked") || lower.contains("prohibited") {
        return StudioError::ContentBlocked(text);
    }
    StudioError::Api {
        status,
        message: text,
    }
}

#[async_trait]
impl ImageBackend for GeminiBackend {
    async fn text_to_image(&self, request: &TextToImageRequest) -> Result<Vec<RawImage>> {
        let url = self.model_url(self.imagen_model.as_str(), "predict");
        let body = ImagenRequest::from_request(request);
        let response: ImagenResponse = self.post_json(&url, &body).await?;
        response.into_images()
    }

    async fn edit(&self, request: &EditRequest) -> Result<Vec<ResponsePart>> {
        let url = self.model_url(self.edit_model.as_str(), "generateContent");
        let body = GeminiRequest::from_request(request);
        let response: GeminiResponse = self.post_json(&url, &body).await?;
        response.into_parts()
    }

    fn create_model(&self) -> &str {
        self.imagen_model.as_str()
    }

    fn edit_model(&self) -> &str {
        self.edit_model.as_str()
    }

    fn name(&self) -> &str {
        "Gemini (Google)"
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!("{}/models/{}", self.base_url, self.edit_model.as_str());

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        match response.status().as_u16() {
            401 | 403 => Err(StudioError::Auth("Invalid API key".into())),
            s if !(200..300).contains(&s) => Err(StudioError::Api {
                status: s,
                message: "Health check failed".into(),
            }),
            _ => Ok(()),
        }
    }
}

// Imagen :predict wire types
#[derive(Debug, Serialize)]
struct ImagenRequest {
    instances: Vec<ImagenInstance>,
    parameters: ImagenParameters,
}

#[derive(Debug, Serialize)]
struct ImagenInstance {
    prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImagenParameters {
    sample_count: u32,
    aspect_ratio: String,
    output_options: ImagenOutputOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImagenOutputOptions {
    mime_type: String,
}

impl ImagenRequest {
    fn from_request(req: &TextToImageRequest) -> Self {
        Self {
            instances: vec![ImagenInstance {
                prompt: req.prompt.clone(),
            }],
            parameters: ImagenParameters {
                sample_count: req.number_of_images,
                aspect_ratio: req.aspect_ratio.as_str().to_string(),
                output_options: ImagenOutputOptions {
                    mime_type: req.output_mime_type.clone(),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ImagenResponse {
    #[serde(default)]
    predictions: Vec<ImagenPrediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImagenPrediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    rai_filtered_reason: Option<String>,
}

impl ImagenResponse {
    fn into_images(self) -> Result<Vec<RawImage>> {
        let mut images = Vec::new();
        let mut filtered = None;
        for prediction in self.predictions {
            match prediction.bytes_base64_encoded {
                Some(data) => images.push(RawImage {
                    data,
                    media_type: prediction.mime_type,
                }),
                None => filtered = filtered.or(prediction.rai_filtered_reason),
            }
        }
        if images.is_empty() {
            if let Some(reason) = filtered {
                return Err(StudioError::ContentBlocked(reason));
            }
        }
        Ok(images)
    }
}

// Gemini :generateContent wire types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<Modality>,
}

impl GeminiRequest {
    fn from_request(req: &EditRequest) -> Self {
        let mut parts: Vec<GeminiRequestPart> = req
            .images
            .iter()
            .map(|image| GeminiRequestPart::InlineData {
                inline_data: InlineData {
                    mime_type: image.media_type.clone(),
                    data: image.data.clone(),
                },
            })
            .collect();

        parts.push(GeminiRequestPart::Text {
            text: req.text.clone(),
        });

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig {
                response_modalities: req.response_modalities.clone(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

impl GeminiResponse {
    fn into_parts(self) -> Result<Vec<ResponsePart>> {
        // Blocked prompts come back as HTTP 200 with feedback
        if let Some(feedback) = self.prompt_feedback {
            if let Some(reason) = feedback.block_reason {
                let msg = feedback
                    .block_reason_message
                    .unwrap_or_else(|| format!("Prompt blocked: {reason}"));
                return Err(StudioError::ContentBlocked(msg));
            }
        }

        let candidate = self.candidates.into_iter().next().ok_or_else(|| {
            StudioError::UnexpectedResponse("No candidates in Gemini response".into())
        })?;

        if let Some(ref finish_reason) = candidate.finish_reason {
            if matches!(
                finish_reason.as_str(),
                "SAFETY"
                    | "IMAGE_SAFETY"
                    | "IMAGE_PROHIBITED_CONTENT"
                    | "PROHIBITED_CONTENT"
                    | "RECITATION"
                    | "BLOCKLIST"
            ) {
                return Err(StudioError::ContentBlocked(format!(
                    "Content blocked by Gemini safety filter: {finish_reason}"
                )));
            }
        }

        let parts = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| match (part.inline_data, part.text) {
                (Some(inline), _) => Some(ResponsePart::InlineImage(ImagePayload::new(
                    inline.data,
                    inline.mime_type,
                ))),
                (None, Some(text)) => Some(ResponsePart::Text(text)),
                (None, None) => None,
            })
            .collect();

        Ok(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::types::{AspectRatio, CreateFunction, EditFunction};

    #[test]
    fn test_model_ids() {
        assert_eq!(ImagenModel::default().as_str(), "imagen-4.0-generate-001");
        assert_eq!(
            GeminiModel::default().as_str(),
            "gemini-2.5-flash-image-preview"
        );
    }

    #[test]
    fn test_builder_with_explicit_key() {
        let backend = GeminiBackendBuilder::new()
            .api_key("test-key")
            .edit_model(GeminiModel::FlashImage)
            .base_url("http://localhost:9999/v1beta/")
            .build()
            .unwrap();
        assert_eq!(backend.edit_model(), "gemini-2.5-flash-image");
        assert_eq!(
            backend.model_url("imagen-4.0-generate-001", "predict"),
            "http://localhost:9999/v1beta/models/imagen-4.0-generate-001:predict"
        );
    }

    #[test]
    fn test_debug_hides_api_key() {
        let backend = GeminiBackend::builder().api_key("secret-key").build().unwrap();
        assert!(!format!("{backend:?}").contains("secret-key"));
    }

    #[test]
    fn test_imagen_request_serialization() {
        let req = TextToImageRequest::for_create("a cat", CreateFunction::Free, AspectRatio::Portrait);
        let json = serde_json::to_value(ImagenRequest::from_request(&req)).unwrap();
        assert_eq!(json["instances"][0]["prompt"], "a cat");
        assert_eq!(json["parameters"]["sampleCount"], 1);
        assert_eq!(json["parameters"]["aspectRatio"], "9:16");
        assert_eq!(json["parameters"]["outputOptions"]["mimeType"], "image/png");
    }

    #[test]
    fn test_imagen_response_parsing() {
        let json = r#"{"predictions": [{"bytesBase64Encoded": "iVBORw0KGgo=", "mimeType": "image/png"}]}"#;
        let resp: ImagenResponse = serde_json::from_str(json).unwrap();
        let images = resp.into_images().unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].data, "iVBORw0KGgo=");
    }

    #[test]
    fn test_imagen_filtered_response_is_blocked() {
        let json = r#"{"predictions": [{"raiFilteredReason": "Unable to show generated images."}]}"#;
        let resp: ImagenResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            resp.into_images(),
            Err(StudioError::ContentBlocked(_))
        ));

        let empty: ImagenResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.into_images().unwrap().is_empty());
    }

    #[test]
    fn test_gemini_request_part_order() {
        let a = ImagePayload::new("AAAA", "image/png");
        let b = ImagePayload::new("BBBB", "image/jpeg");
        let req = EditRequest::for_edit("sunset", EditFunction::Compose, &a, Some(&b));
        let json = serde_json::to_value(GeminiRequest::from_request(&req)).unwrap();

        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["inlineData"]["data"], "AAAA");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert!(parts[2]["text"].as_str().unwrap().contains("sunset"));
        assert_eq!(
            json["generationConfig"]["responseModalities"],
            serde_json::json!(["IMAGE", "TEXT"])
        );
    }

    #[test]
    fn test_gemini_response_parts() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "Here is your image"},
                        {"inlineData": {"mimeType": "image/jpeg", "data": "/9j/4A=="}}
                    ]
                },
                "finishReason": "STOP"
            }]
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        let parts = resp.into_parts().unwrap();
        assert_eq!(
            parts,
            vec![
                ResponsePart::Text("Here is your image".into()),
                ResponsePart::InlineImage(ImagePayload::new("/9j/4A==", "image/jpeg")),
            ]
        );
    }

    #[test]
    fn test_gemini_prompt_feedback_block() {
        let json = r#"{
            "candidates": [],
            "promptFeedback": {
                "blockReason": "SAFETY",
                "blockReasonMessage": "Prompt was blocked due to safety"
            }
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        match resp.into_parts() {
            Err(StudioError::ContentBlocked(msg)) => {
                assert_eq!(msg, "Prompt was blocked due to safety")
            }
            other => panic!("expected content block, got {other:?}"),
        }
    }

    #[test]
    fn test_gemini_safety_finish_reason() {
        let json = r#"{"candidates": [{"finishReason": "IMAGE_SAFETY"}]}"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            resp.into_parts(),
            Err(StudioError::ContentBlocked(_))
        ));
    }

    #[test]
    fn test_gemini_no_candidates() {
        let resp: GeminiResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(matches!(
            resp.into_parts(),
            Err(StudioError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_parse_error_mapping() {
        let headers = reqwest::header::HeaderMap::new();
        assert!(matches!(
            parse_error(401, "bad key", &headers),
            StudioError::Auth(_)
        ));
        assert!(matches!(
            parse_error(429, "", &headers),
            StudioError::RateLimited { retry_after: None }
        ));
        assert!(matches!(
            parse_error(400, r#"{"error": {"message": "Request blocked by safety filters"}}"#, &headers),
            StudioError::ContentBlocked(_)
        ));
        match parse_error(500, r#"{"error": {"message": "Internal error"}}"#, &headers) {
            StudioError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal error");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
