//! Share links: a result's data URL carried in the URL fragment.

use crate::error::Result;
#[cfg(feature = "clipboard")]
use crate::error::StudioError;
use crate::image::{is_image_data_url, GenerationResult};

/// Fragment prefix that marks a shared image.
pub const SHARE_FRAGMENT_PREFIX: &str = "#image=";

/// Outcome of inspecting a location's fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SharedFragment {
    /// No `#image=` fragment present.
    Absent,
    /// A well-formed image data URL.
    Image(GenerationResult),
    /// Decoded, but not an image data URL with a base64 body.
    NotAnImage,
    /// Percent-decoding failed.
    Undecodable,
}

/// Returns `location` without its fragment.
pub fn strip_fragment(location: &str) -> &str {
    location.split_once('#').map_or(location, |(base, _)| base)
}

/// Builds the shareable URL for a result on top of `location`.
pub fn share_url(location: &str, result: &GenerationResult) -> String {
    format!(
        "{}{}{}",
        strip_fragment(location),
        SHARE_FRAGMENT_PREFIX,
        urlencoding::encode(result.as_data_url())
    )
}

/// Reads the shared image, if any, from a location.
pub fn read_fragment(location: &str) -> SharedFragment {
    let Some(pos) = location.find(SHARE_FRAGMENT_PREFIX) else {
        return SharedFragment::Absent;
    };
    let encoded = &location[pos + SHARE_FRAGMENT_PREFIX.len()..];

    match urlencoding::decode(encoded) {
        Ok(decoded) if is_image_data_url(&decoded) => {
            match GenerationResult::from_data_url(decoded.into_owned()) {
                Ok(result) => SharedFragment::Image(result),
                Err(_) => SharedFragment::NotAnImage,
            }
        }
        Ok(_) => SharedFragment::NotAnImage,
        Err(_) => SharedFragment::Undecodable,
    }
}

/// Somewhere share links can be copied to.
pub trait Clipboard {
    /// Replaces the clipboard contents with plain text.
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// Clipboard kept in memory; useful headless.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    /// Creates an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last text written.
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// The operating system clipboard.
#[cfg(feature = "clipboard")]
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

#[cfg(feature = "clipboard")]
impl SystemClipboard {
    /// Connects to the system clipboard.
    pub fn new() -> Result<Self> {
        let inner = arboard::Clipboard::new().map_err(|e| StudioError::Share(e.to_string()))?;
        Ok(Self { inner })
    }
}

#[cfg(feature = "clipboard")]
impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.inner
            .set_text(text.to_string())
            .map_err(|e| StudioError::Share(e.to_string()))
    }
}
