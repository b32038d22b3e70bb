#![warn(missing_docs)]
//! Image Studio - prompt-driven AI image creation and editing.
//!
//! A user writes a prompt, optionally supplies one or two source images, and
//! the studio asks a generative image service to create, edit or combine
//! images. Results are data URLs that can be downloaded, fed back in for
//! another edit, or shared as a link.
//!
//! # Quick Start - Create
//!
//! ```no_run
//! use imagestudio::{CreateFunction, GeminiBackend, Studio};
//!
//! #[tokio::main]
//! async fn main() -> imagestudio::Result<()> {
//!     let mut studio = Studio::with_backend(GeminiBackend::builder().build()?);
//!     studio.set_prompt("A golden retriever puppy");
//!     studio.select_create_function(CreateFunction::Sticker);
//!     studio.generate().await?;
//!     let path = studio.download(".")?;
//!     println!("saved {}", path.display());
//!     Ok(())
//! }
//! ```
//!
//! # Quick Start - Edit the result
//!
//! ```no_run
//! use imagestudio::{GeminiBackend, Studio};
//!
//! #[tokio::main]
//! async fn main() -> imagestudio::Result<()> {
//!     let mut studio = Studio::with_backend(GeminiBackend::builder().build()?);
//!     studio.set_prompt("A lighthouse at dusk");
//!     studio.generate().await?;
//!
//!     // the result becomes the image to edit
//!     studio.edit_current_image()?;
//!     studio.set_prompt("Add a full moon");
//!     studio.generate().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `gemini`: Google Generative Language backend (Imagen + Gemini)
//! - `clipboard`: system clipboard for share links
//! - `cli`: Command-line interface

mod error;
pub mod image;
pub mod studio;

#[cfg(test)]
mod testing;

// Re-export error types at crate root
pub use error::{ErrorKind, Result, StudioError};

pub use image::{
    AspectRatio, CreateFunction, EditFunction, GenerationClient, GenerationMetadata,
    GenerationResult, ImageBackend, ImageFormat, ImagePayload, Mode,
};

#[cfg(feature = "gemini")]
pub use image::backends::{GeminiBackend, GeminiBackendBuilder, GeminiModel, ImagenModel};

pub use studio::{LocationOutcome, Phase, Screen, Slot, Studio, StudioState, Viewport};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{Result, StudioError};
    pub use crate::image::{
        AspectRatio, CreateFunction, EditFunction, GenerationResult, ImageBackend, ImagePayload,
        Mode,
    };
    pub use crate::studio::{Clipboard, Slot, Studio, Viewport};

    #[cfg(feature = "gemini")]
    pub use crate::image::backends::GeminiBackend;
}
