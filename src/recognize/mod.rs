//! Speech recognition capability.
//!
//! The pipeline only sees [`Recognizer`]; [`HttpRecognizer`] talks to a real service and the
//! doubles in [`mock`] give deterministic answers for tests and offline runs.

pub mod http;
pub mod mock;

use std::sync::Arc;

use crate::audio::AudioClip;
pub use crate::error::RecognitionError;

pub use http::HttpRecognizer;
pub use mock::{EchoRecognizer, ScriptedRecognizer};

/// Turns a recording into text. Called from pool worker threads, so it may block.
pub trait Recognizer: Send + Sync {
    fn recognize(&self, audio: &AudioClip, language: &str) -> Result<String, RecognitionError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

impl<T: Recognizer + ?Sized> Recognizer for Arc<T> {
    fn recognize(&self, audio: &AudioClip, language: &str) -> Result<String, RecognitionError> {
        (**self).recognize(audio, language)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
