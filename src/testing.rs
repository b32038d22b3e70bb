//! In-memory backend for tests.

use crate::error::{Result, StudioError};
use crate::image::{EditRequest, ImageBackend, RawImage, ResponsePart, TextToImageRequest};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays canned responses and records every request it receives.
#[derive(Debug, Default)]
pub(crate) struct ScriptedBackend {
    create_images: Vec<RawImage>,
    edit_parts: Vec<ResponsePart>,
    failures: Mutex<VecDeque<StudioError>>,
    create_requests: Mutex<Vec<TextToImageRequest>>,
    edit_requests: Mutex<Vec<EditRequest>>,
}

impl ScriptedBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_create_image(mut self, data: &str) -> Self {
        self.create_images.push(RawImage {
            data: data.to_string(),
            media_type: Some("image/png".into()),
        });
        self
    }

    pub(crate) fn with_edit_parts(mut self, parts: Vec<ResponsePart>) -> Self {
        self.edit_parts = parts;
        self
    }

    /// The next call fails with `err`; later calls succeed again.
    pub(crate) fn with_failure(self, err: StudioError) -> Self {
        self.failures.lock().unwrap().push_back(err);
        self
    }

    pub(crate) fn create_requests(&self) -> Vec<TextToImageRequest> {
        self.create_requests.lock().unwrap().clone()
    }

    pub(crate) fn edit_requests(&self) -> Vec<EditRequest> {
        self.edit_requests.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.create_requests.lock().unwrap().len() + self.edit_requests.lock().unwrap().len()
    }

    fn next_failure(&self) -> Option<StudioError> {
        self.failures.lock().unwrap().pop_front()
    }
}

#[async_trait]
impl ImageBackend for ScriptedBackend {
    async fn text_to_image(&self, request: &TextToImageRequest) -> Result<Vec<RawImage>> {
        self.create_requests.lock().unwrap().push(request.clone());
        match self.next_failure() {
            Some(err) => Err(err),
            None => Ok(self.create_images.clone()),
        }
    }

    async fn edit(&self, request: &EditRequest) -> Result<Vec<ResponsePart>> {
        self.edit_requests.lock().unwrap().push(request.clone());
        match self.next_failure() {
            Some(err) => Err(err),
            None => Ok(self.edit_parts.clone()),
        }
    }

    fn create_model(&self) -> &str {
        "scripted-create"
    }

    fn edit_model(&self) -> &str {
        "scripted-edit"
    }

    fn name(&self) -> &str {
        "scripted"
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
