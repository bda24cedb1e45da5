//! Deterministic recognizers.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{RecognitionError, Recognizer};
use crate::audio::AudioClip;

/// Answers with the file stem of the clip. Used for offline runs of the rename logic.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoRecognizer;

impl Recognizer for EchoRecognizer {
    fn recognize(&self, audio: &AudioClip, _language: &str) -> Result<String, RecognitionError> {
        Path::new(&audio.name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .ok_or(RecognitionError::AmbiguousAudio)
    }

    fn name(&self) -> &str {
        "echo"
    }
}

/// Per-file scripted answers keyed by clip name, with optional per-file delays.
/// Files without a script fall back to [`EchoRecognizer`] behavior.
#[derive(Debug, Default)]
pub struct ScriptedRecognizer {
    answers: HashMap<String, Result<String, RecognitionError>>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl ScriptedRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recognize `file_name` as `text`.
    pub fn with_text(mut self, file_name: &str, text: &str) -> Self {
        self.answers.insert(file_name.to_string(), Ok(text.to_string()));
        self
    }

    /// Fail recognition of `file_name` with `error`.
    pub fn with_failure(mut self, file_name: &str, error: RecognitionError) -> Self {
        self.answers.insert(file_name.to_string(), Err(error));
        self
    }

    /// Sleep before answering for `file_name`.
    pub fn with_delay(mut self, file_name: &str, delay: Duration) -> Self {
        self.delays.insert(file_name.to_string(), delay);
        self
    }

    /// Number of recognize calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Recognizer for ScriptedRecognizer {
    fn recognize(&self, audio: &AudioClip, language: &str) -> Result<String, RecognitionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&audio.name) {
            std::thread::sleep(*delay);
        }
        match self.answers.get(&audio.name) {
            Some(answer) => answer.clone(),
            None => EchoRecognizer.recognize(audio, language),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
