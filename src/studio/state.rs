//! The interaction state bundle.

use crate::error::{ErrorKind, StudioError};
use crate::image::{AspectRatio, CreateFunction, EditFunction, GenerationResult, ImagePayload, Mode};

/// Viewport width below which results open in the mobile modal.
pub const NARROW_VIEWPORT_WIDTH: u32 = 768;

/// Which upload slot an image goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The primary (or only) source image.
    First,
    /// The second image, used only when composing.
    Second,
}

/// Display width class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewport {
    /// Desktop layout.
    #[default]
    Wide,
    /// Phone layout; results open in a modal.
    Narrow,
}

impl Viewport {
    /// Classifies a width in CSS pixels.
    pub fn from_width(width: u32) -> Self {
        if width < NARROW_VIEWPORT_WIDTH {
            Self::Narrow
        } else {
            Self::Wide
        }
    }
}

/// Where the studio is in its generate cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for input. Validation messages may be showing.
    Idle,
    /// A request is in flight.
    Generating,
    /// A result is displayed.
    ResultReady,
    /// The last request failed.
    Error,
}

/// A user-facing error message with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Taxonomy bucket, decides placement.
    pub kind: ErrorKind,
    /// Text shown to the user.
    pub message: String,
}

impl From<&StudioError> for Notice {
    fn from(err: &StudioError) -> Self {
        Self {
            kind: err.kind(),
            message: err.user_message(),
        }
    }
}

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    /// Action succeeded.
    Success,
    /// Action failed.
    Failure,
}

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Severity.
    pub kind: ToastKind,
    /// Text shown.
    pub message: String,
}

/// Everything the studio remembers during a session.
#[derive(Debug, Clone, Default)]
pub struct StudioState {
    /// Prompt text as typed.
    pub prompt: String,
    /// Create or edit.
    pub mode: Mode,
    /// Selected creation function.
    pub create_function: CreateFunction,
    /// Selected edit function.
    pub edit_function: EditFunction,
    /// Selected aspect ratio (creation only).
    pub aspect_ratio: AspectRatio,
    /// First upload slot.
    pub image1: Option<ImagePayload>,
    /// Second upload slot.
    pub image2: Option<ImagePayload>,
    /// Whether the second slot is offered for entry.
    pub show_two_images: bool,
    /// A request is in flight.
    pub loading: bool,
    /// Last result.
    pub result: Option<GenerationResult>,
    /// Last error.
    pub error: Option<Notice>,
    /// Mobile result modal is open.
    pub modal_open: bool,
    /// Read-only image reached through a share link.
    pub view_only: Option<GenerationResult>,
    /// Transient toast.
    pub toast: Option<Toast>,
    /// Current display width class.
    pub viewport: Viewport,
    /// The page's own URL, fragment included.
    pub location: String,
}

impl StudioState {
    /// Derives the generate-cycle phase.
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Generating
        } else if self.result.is_some() {
            Phase::ResultReady
        } else if matches!(&self.error, Some(n) if n.kind != ErrorKind::Validation) {
            Phase::Error
        } else {
            Phase::Idle
        }
    }

    /// True once a share link has been opened.
    pub fn is_view_only(&self) -> bool {
        self.view_only.is_some()
    }

    /// Returns the image held in a slot.
    pub fn image(&self, slot: Slot) -> Option<&ImagePayload> {
        match slot {
            Slot::First => self.image1.as_ref(),
            Slot::Second => self.image2.as_ref(),
        }
    }
}
