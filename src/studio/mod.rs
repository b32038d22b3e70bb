//! The interaction state machine and its surfaces.

mod controller;
pub mod share;
mod state;
pub mod view;

pub use controller::{
    LocationOutcome, Studio, DEFAULT_LOCATION, MSG_EMPTY_PROMPT, MSG_INVALID_SHARE_LINK,
    MSG_LINK_COPIED, MSG_LINK_COPY_FAILED, MSG_NEED_IMAGE, MSG_NEED_TWO_IMAGES,
};
pub use share::{Clipboard, MemoryClipboard, SharedFragment};
#[cfg(feature = "clipboard")]
pub use share::SystemClipboard;
pub use state::{
    Notice, Phase, Slot, StudioState, Toast, ToastKind, Viewport, NARROW_VIEWPORT_WIDTH,
};
pub use view::Screen;
