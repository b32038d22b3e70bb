//! Generative service backends.

#[cfg(feature = "gemini")]
mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::{
    GeminiBackend, GeminiBackendBuilder, GeminiModel, ImagenModel, API_KEY_ENV_VARS,
    DEFAULT_BASE_URL,
};
