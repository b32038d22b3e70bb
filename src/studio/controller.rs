//! The studio orchestrator and its transition handlers.

use crate::error::{ErrorKind, Result, StudioError};
use crate::image::{
    encode_upload, AspectRatio, CreateFunction, EditFunction, GenerationClient,
    GenerationResult, ImageBackend, ImagePayload, Mode,
};
use crate::studio::share::{self, Clipboard, SharedFragment};
use crate::studio::state::{Notice, Slot, StudioState, Toast, ToastKind, Viewport};
use std::path::{Path, PathBuf};

/// Location used when none is supplied.
pub const DEFAULT_LOCATION: &str = "http://localhost/";

/// Shown when the prompt is empty after trimming.
pub const MSG_EMPTY_PROMPT: &str = "Please enter a description.";
/// Shown when composing without both images.
pub const MSG_NEED_TWO_IMAGES: &str = "Please upload two images to combine.";
/// Shown when editing without a source image.
pub const MSG_NEED_IMAGE: &str = "Please upload an image to edit.";
/// Shown when a share link cannot be decoded.
pub const MSG_INVALID_SHARE_LINK: &str = "Invalid share link.";
/// Toast after a successful share.
pub const MSG_LINK_COPIED: &str = "Link copied to clipboard!";
/// Toast after a failed share.
pub const MSG_LINK_COPY_FAILED: &str = "Could not copy the link.";

/// What opening a location did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationOutcome {
    /// No share fragment; normal studio.
    Normal,
    /// Entered the read-only view.
    ViewOnly,
    /// The fragment was not a usable image and was cleared.
    Cleared,
}

/// Owns the interaction state and drives the generation client.
///
/// Every mutation goes through one of the named handlers below.
#[derive(Debug)]
pub struct Studio<B> {
    client: GenerationClient<B>,
    state: StudioState,
}

impl<B: ImageBackend> Studio<B> {
    /// Creates an idle studio.
    pub fn new(client: GenerationClient<B>) -> Self {
        Self {
            client,
            state: StudioState {
                location: DEFAULT_LOCATION.to_string(),
                ..StudioState::default()
            },
        }
    }

    /// Shorthand for wrapping a backend.
    pub fn with_backend(backend: B) -> Self {
        Self::new(GenerationClient::new(backend))
    }

    /// Read access to the state bundle.
    pub fn state(&self) -> &StudioState {
        &self.state
    }

    /// The generation client.
    pub fn client(&self) -> &GenerationClient<B> {
        &self.client
    }

    /// Replaces the prompt text.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.state.prompt = prompt.into();
    }

    /// Switches between create and edit.
    pub fn set_mode(&mut self, mode: Mode) {
        self.state.mode = mode;
    }

    /// Picks the creation function.
    pub fn select_create_function(&mut self, function: CreateFunction) {
        self.state.create_function = function;
    }

    /// Selecting compose reveals the second slot; anything else hides it.
    ///
    /// A hidden second image is kept so switching back to compose restores it.
    pub fn select_edit_function(&mut self, function: EditFunction) {
        self.state.edit_function = function;
        self.state.show_two_images = function.requires_two_images();
    }

    /// Returns to the single-image layout without changing the function.
    ///
    /// The second image is kept.
    pub fn hide_second_slot(&mut self) {
        self.state.show_two_images = false;
    }

    /// Picks the output aspect ratio.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: AspectRatio) {
        self.state.aspect_ratio = aspect_ratio;
    }

    /// Records the current display width class.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.state.viewport = viewport;
    }

    /// Places an already-encoded image in a slot, replacing what was there.
    pub fn set_image(&mut self, slot: Slot, payload: ImagePayload) {
        match slot {
            Slot::First => self.state.image1 = Some(payload),
            Slot::Second => self.state.image2 = Some(payload),
        }
    }

    /// Reads and encodes a file into a slot.
    ///
    /// On failure the slot is untouched and a decode notice is shown.
    pub async fn upload_image(&mut self, slot: Slot, path: impl AsRef<Path>) -> Result<()> {
        match encode_upload(path).await {
            Ok(payload) => {
                self.set_image(slot, payload);
                Ok(())
            }
            Err(err) => {
                self.state.error = Some(Notice::from(&err));
                Err(err)
            }
        }
    }

    /// Checks the generate preconditions for the current selections.
    pub fn validate(&self) -> Result<()> {
        let state = &self.state;
        if state.prompt.trim().is_empty() {
            return Err(StudioError::validation(MSG_EMPTY_PROMPT));
        }
        if state.mode == Mode::Edit {
            if state.edit_function == EditFunction::Compose {
                if state.image1.is_none() || state.image2.is_none() {
                    return Err(StudioError::validation(MSG_NEED_TWO_IMAGES));
                }
            } else if state.image1.is_none() {
                return Err(StudioError::validation(MSG_NEED_IMAGE));
            }
        }
        Ok(())
    }

    /// Runs one generation with the current selections.
    ///
    /// Validation failures leave the studio idle and never reach the
    /// service. Calls from the read-only view are refused.
    pub async fn generate(&mut self) -> Result<()> {
        if self.state.is_view_only() {
            return Err(StudioError::validation("Shared images are read-only."));
        }
        if let Err(err) = self.validate() {
            self.state.error = Some(Notice::from(&err));
            return Err(err);
        }

        self.state.loading = true;
        self.state.result = None;
        self.state.error = None;

        let outcome = self.dispatch().await;
        self.state.loading = false;

        match outcome {
            Ok(result) => {
                self.state.result = Some(result);
                if self.state.viewport == Viewport::Narrow {
                    self.state.modal_open = true;
                }
                Ok(())
            }
            Err(err) => {
                tracing::warn!("generation failed: {err}");
                self.state.error = Some(Notice::from(&err));
                Err(err)
            }
        }
    }

    async fn dispatch(&self) -> Result<GenerationResult> {
        let state = &self.state;
        match state.mode {
            Mode::Create => {
                self.client
                    .create_image(&state.prompt, state.create_function, state.aspect_ratio)
                    .await
            }
            Mode::Edit => {
                let image1 = state
                    .image1
                    .as_ref()
                    .ok_or_else(|| StudioError::validation(MSG_NEED_IMAGE))?;
                let image2 = if state.edit_function == EditFunction::Compose {
                    state.image2.as_ref()
                } else {
                    None
                };
                self.client
                    .edit_or_compose_image(&state.prompt, state.edit_function, image1, image2)
                    .await
            }
        }
    }

    /// Starts over: clears result, prompt, both slots, modal and error.
    pub fn new_image(&mut self) {
        self.state.result = None;
        self.state.modal_open = false;
        self.state.error = None;
        self.state.prompt.clear();
        self.state.image1 = None;
        self.state.image2 = None;
    }

    /// Feeds the current result back in as the image to edit.
    ///
    /// Returns `false` when there is no result.
    pub fn edit_current_image(&mut self) -> Result<bool> {
        let Some(result) = self.state.result.as_ref() else {
            return Ok(false);
        };
        let payload = result.to_payload()?;

        self.state.image1 = Some(payload);
        self.state.mode = Mode::Edit;
        self.state.edit_function = EditFunction::AddRemove;
        self.state.show_two_images = false;
        self.state.result = None;
        self.state.modal_open = false;
        Ok(true)
    }

    /// Closes the mobile result modal, keeping the result.
    pub fn close_modal(&mut self) {
        self.state.modal_open = false;
    }

    /// Dismisses the current toast.
    pub fn clear_toast(&mut self) {
        self.state.toast = None;
    }

    /// Saves the displayed image into `dir` under its download name.
    pub fn download(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let result = self
            .displayed_image()
            .ok_or_else(|| StudioError::validation("There is no image to download."))?;
        let path = dir.as_ref().join(result.download_file_name());
        result.save(&path)?;
        tracing::debug!(path = %path.display(), "saved image");
        Ok(path)
    }

    /// The result, or the shared image in the read-only view.
    pub fn displayed_image(&self) -> Option<&GenerationResult> {
        self.state.view_only.as_ref().or(self.state.result.as_ref())
    }

    /// Encodes the result into this page's URL and copies it.
    ///
    /// Outcome is reported through a toast; the main state is unaffected.
    pub fn share(&mut self, clipboard: &mut dyn Clipboard) -> Result<String> {
        let result = self
            .state
            .result
            .as_ref()
            .ok_or_else(|| StudioError::validation("There is no image to share."))?;
        let url = share::share_url(&self.state.location, result);
        self.state.location = url.clone();

        match clipboard.set_text(&url) {
            Ok(()) => {
                tracing::info!(len = url.len(), "share link copied");
                self.state.toast = Some(Toast {
                    kind: ToastKind::Success,
                    message: MSG_LINK_COPIED.to_string(),
                });
                Ok(url)
            }
            Err(err) => {
                tracing::warn!("failed to copy share link: {err}");
                self.state.toast = Some(Toast {
                    kind: ToastKind::Failure,
                    message: MSG_LINK_COPY_FAILED.to_string(),
                });
                Err(match err {
                    StudioError::Share(_) => err,
                    other => StudioError::Share(other.to_string()),
                })
            }
        }
    }

    /// Handles the initial page load at `location`.
    ///
    /// A shared image enters the read-only view, which never returns to
    /// the editable flow. A bad fragment is removed from the location.
    pub fn open_location(&mut self, location: &str) -> LocationOutcome {
        self.state.location = location.to_string();

        match share::read_fragment(location) {
            SharedFragment::Absent => LocationOutcome::Normal,
            SharedFragment::Image(result) => {
                tracing::info!("opened shared image in read-only view");
                self.state.view_only = Some(result);
                LocationOutcome::ViewOnly
            }
            SharedFragment::NotAnImage => {
                self.state.location = share::strip_fragment(location).to_string();
                LocationOutcome::Cleared
            }
            SharedFragment::Undecodable => {
                tracing::warn!("share link could not be decoded");
                self.state.location = share::strip_fragment(location).to_string();
                self.state.error = Some(Notice {
                    kind: ErrorKind::Decode,
                    message: MSG_INVALID_SHARE_LINK.to_string(),
                });
                LocationOutcome::Cleared
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{decompose_data_url, ResponsePart};
    use crate::studio::share::MemoryClipboard;
    use crate::studio::state::Phase;
    use crate::testing::ScriptedBackend;

    const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUg==";

    fn creating_studio() -> Studio<ScriptedBackend> {
        Studio::with_backend(ScriptedBackend::new().with_create_image(PNG_B64))
    }

    fn editing_studio() -> Studio<ScriptedBackend> {
        Studio::with_backend(ScriptedBackend::new().with_edit_parts(vec![
            ResponsePart::InlineImage(ImagePayload::new("/9j/4AAQ", "image/jpeg")),
        ]))
    }

    struct BrokenClipboard;

    impl Clipboard for BrokenClipboard {
        fn set_text(&mut self, _text: &str) -> Result<()> {
            Err(StudioError::Share("clipboard unavailable".into()))
        }
    }

    #[tokio::test]
    async fn test_blank_prompt_never_calls_service() {
        let mut studio = creating_studio();
        studio.set_prompt("   \n\t");

        let err = studio.generate().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(studio.client().backend().call_count(), 0);
        assert_eq!(studio.state().phase(), Phase::Idle);
        assert_eq!(
            studio.state().error.as_ref().map(|n| n.message.as_str()),
            Some(MSG_EMPTY_PROMPT)
        );
    }

    #[tokio::test]
    async fn test_compose_with_one_image_is_blocked() {
        let mut studio = editing_studio();
        studio.set_prompt("beach");
        studio.set_mode(Mode::Edit);
        studio.select_edit_function(EditFunction::Compose);
        studio.set_image(Slot::First, ImagePayload::new("AAAA", "image/png"));

        let err = studio.generate().await.unwrap_err();
        assert_eq!(err.user_message(), MSG_NEED_TWO_IMAGES);
        assert_eq!(studio.client().backend().call_count(), 0);
    }

    #[tokio::test]
    async fn test_edit_without_image_is_blocked() {
        let mut studio = editing_studio();
        studio.set_prompt("add a hat");
        studio.set_mode(Mode::Edit);

        let err = studio.generate().await.unwrap_err();
        assert_eq!(err.user_message(), MSG_NEED_IMAGE);
    }

    #[tokio::test]
    async fn test_create_flow_reaches_result_ready() {
        let mut studio = creating_studio();
        studio.set_prompt("a cat");
        studio.select_create_function(CreateFunction::Comic);
        studio.set_aspect_ratio(AspectRatio::Landscape);

        studio.generate().await.unwrap();

        let state = studio.state();
        assert_eq!(state.phase(), Phase::ResultReady);
        assert!(!state.modal_open);
        let result = state.result.as_ref().unwrap();
        assert_eq!(
            result.as_data_url(),
            format!("data:image/png;base64,{PNG_B64}")
        );

        let sent = studio.client().backend().create_requests();
        assert!(sent[0].prompt.contains("comic book"));
        assert_eq!(sent[0].aspect_ratio, AspectRatio::Landscape);
    }

    #[tokio::test]
    async fn test_narrow_viewport_opens_modal() {
        let mut studio = creating_studio();
        studio.set_viewport(Viewport::from_width(390));
        studio.set_prompt("a cat");

        studio.generate().await.unwrap();
        assert!(studio.state().modal_open);

        studio.close_modal();
        assert!(!studio.state().modal_open);
        assert!(studio.state().result.is_some());
    }

    #[tokio::test]
    async fn test_upstream_failure_sets_error_phase() {
        let backend = ScriptedBackend::new()
            .with_create_image(PNG_B64)
            .with_failure(StudioError::ContentBlocked("nope".into()));
        let mut studio = Studio::with_backend(backend);
        studio.set_prompt("a cat");

        assert!(studio.generate().await.is_err());
        assert_eq!(studio.state().phase(), Phase::Error);
        assert!(!studio.state().loading);
        assert_eq!(
            studio.state().error.as_ref().unwrap().message,
            "content blocked: nope"
        );

        // the next explicit attempt succeeds and clears the banner
        studio.generate().await.unwrap();
        assert!(studio.state().error.is_none());
        assert_eq!(studio.state().phase(), Phase::ResultReady);
    }

    #[tokio::test]
    async fn test_edit_current_image_closes_the_loop() {
        let mut studio = creating_studio();
        studio.set_prompt("a cat");
        studio.select_edit_function(EditFunction::Compose);
        studio.generate().await.unwrap();

        let data_url = studio.state().result.as_ref().unwrap().as_data_url().to_string();
        assert!(studio.edit_current_image().unwrap());

        let state = studio.state();
        let expected = decompose_data_url(&data_url).unwrap();
        assert_eq!(state.image1.as_ref(), Some(&expected));
        assert_eq!(expected.data, PNG_B64);
        assert_eq!(expected.media_type, "image/png");
        assert_eq!(state.mode, Mode::Edit);
        assert_eq!(state.edit_function, EditFunction::AddRemove);
        assert!(!state.show_two_images);
        assert!(state.result.is_none());
        assert!(!state.modal_open);
    }

    #[tokio::test]
    async fn test_edit_current_image_without_result_is_noop() {
        let mut studio = creating_studio();
        assert!(!studio.edit_current_image().unwrap());
        assert_eq!(studio.state().mode, Mode::Create);
    }

    #[tokio::test]
    async fn test_edit_uses_reported_media_type() {
        let mut studio = editing_studio();
        studio.set_prompt("make it night");
        studio.set_mode(Mode::Edit);
        studio.select_edit_function(EditFunction::Style);
        studio.set_image(Slot::First, ImagePayload::new("AAAA", "image/png"));
        studio.set_image(Slot::Second, ImagePayload::new("BBBB", "image/png"));

        studio.generate().await.unwrap();

        let sent = studio.client().backend().edit_requests();
        assert_eq!(sent[0].images.len(), 1);
        assert_eq!(sent[0].text, "make it night");
        assert_eq!(
            studio.state().result.as_ref().unwrap().as_data_url(),
            "data:image/jpeg;base64,/9j/4AAQ"
        );
    }

    #[test]
    fn test_leaving_compose_hides_but_keeps_second_image() {
        let mut studio = editing_studio();
        studio.select_edit_function(EditFunction::Compose);
        assert!(studio.state().show_two_images);
        studio.set_image(Slot::Second, ImagePayload::new("BBBB", "image/png"));

        studio.select_edit_function(EditFunction::Retouch);
        assert!(!studio.state().show_two_images);
        assert!(studio.state().image2.is_some());

        studio.select_edit_function(EditFunction::Compose);
        assert!(studio.state().show_two_images);
        assert_eq!(studio.state().image(Slot::Second).unwrap().data, "BBBB");
    }

    #[test]
    fn test_back_to_single_slot_keeps_compose() {
        let mut studio = editing_studio();
        studio.set_mode(Mode::Edit);
        studio.select_edit_function(EditFunction::Compose);
        studio.set_image(Slot::Second, ImagePayload::new("BBBB", "image/png"));

        studio.hide_second_slot();
        assert!(!studio.state().show_two_images);
        assert_eq!(studio.state().edit_function, EditFunction::Compose);
        assert!(studio.state().image2.is_some());
    }

    #[tokio::test]
    async fn test_new_image_resets_inputs() {
        let mut studio = creating_studio();
        studio.set_viewport(Viewport::Narrow);
        studio.set_prompt("a cat");
        studio.set_image(Slot::First, ImagePayload::new("AAAA", "image/png"));
        studio.set_image(Slot::Second, ImagePayload::new("BBBB", "image/png"));
        studio.generate().await.unwrap();

        studio.new_image();

        let state = studio.state();
        assert!(state.result.is_none());
        assert!(state.prompt.is_empty());
        assert!(state.image1.is_none() && state.image2.is_none());
        assert!(!state.modal_open);
        assert!(state.error.is_none());
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_upload_into_slot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.png");
        std::fs::write(&path, [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0]).unwrap();

        let mut studio = editing_studio();
        studio.upload_image(Slot::Second, &path).await.unwrap();
        assert_eq!(studio.state().image2.as_ref().unwrap().media_type, "image/png");

        let err = studio
            .upload_image(Slot::First, dir.path().join("missing.png"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(studio.state().image1.is_none());
        assert_eq!(
            studio.state().error.as_ref().unwrap().message,
            "Failed to process image."
        );
    }

    #[tokio::test]
    async fn test_share_then_open_in_fresh_session() {
        let mut studio = creating_studio();
        studio.open_location("https://studio.example/");
        studio.set_prompt("a cat");
        studio.generate().await.unwrap();

        let mut clipboard = MemoryClipboard::new();
        let url = studio.share(&mut clipboard).unwrap();
        assert_eq!(clipboard.contents(), Some(url.as_str()));
        assert_eq!(studio.state().location, url);
        assert_eq!(studio.state().toast.as_ref().unwrap().kind, ToastKind::Success);

        let mut fresh = Studio::with_backend(ScriptedBackend::new());
        assert_eq!(fresh.open_location(&url), LocationOutcome::ViewOnly);
        assert!(fresh.state().is_view_only());
        assert_eq!(
            fresh.displayed_image().unwrap().decode_bytes().unwrap(),
            studio.state().result.as_ref().unwrap().decode_bytes().unwrap()
        );

        fresh.set_prompt("try to edit");
        assert!(fresh.generate().await.is_err());
        assert_eq!(fresh.client().backend().call_count(), 0);
    }

    #[tokio::test]
    async fn test_share_failure_only_toasts() {
        let mut studio = creating_studio();
        studio.set_prompt("a cat");
        studio.generate().await.unwrap();

        let err = studio.share(&mut BrokenClipboard).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Share);
        assert_eq!(studio.state().toast.as_ref().unwrap().kind, ToastKind::Failure);
        assert!(studio.state().error.is_none());
        assert_eq!(studio.state().phase(), Phase::ResultReady);

        studio.clear_toast();
        assert!(studio.state().toast.is_none());
    }

    #[test]
    fn test_malformed_fragment_is_cleared() {
        let mut studio = creating_studio();
        let outcome = studio.open_location("https://studio.example/#image=not-a-data-url");
        assert_eq!(outcome, LocationOutcome::Cleared);
        assert!(!studio.state().is_view_only());
        assert_eq!(studio.state().location, "https://studio.example/");
        assert!(studio.state().error.is_none());
    }

    #[test]
    fn test_fragment_with_broken_body_is_cleared() {
        let mut studio = creating_studio();
        let outcome = studio.open_location(
            "https://studio.example/#image=data%3Aimage%2Fpng%3Bbase64%2C%40%40%40not-base64",
        );
        assert_eq!(outcome, LocationOutcome::Cleared);
        assert!(!studio.state().is_view_only());
        assert_eq!(studio.state().location, "https://studio.example/");
    }

    #[test]
    fn test_undecodable_fragment_shows_error() {
        let mut studio = creating_studio();
        let outcome = studio.open_location("https://studio.example/#image=%C3%28");
        assert_eq!(outcome, LocationOutcome::Cleared);
        assert!(!studio.state().is_view_only());
        assert_eq!(studio.state().location, "https://studio.example/");
        assert_eq!(
            studio.state().error.as_ref().unwrap().message,
            MSG_INVALID_SHARE_LINK
        );
    }

    #[tokio::test]
    async fn test_download_writes_result_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let mut studio = creating_studio();
        assert!(studio.download(dir.path()).is_err());

        studio.set_prompt("a cat");
        studio.generate().await.unwrap();
        let path = studio.download(dir.path()).unwrap();

        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
        assert_eq!(
            std::fs::read(&path).unwrap(),
            studio.state().result.as_ref().unwrap().decode_bytes().unwrap()
        );
    }
}
