//! Typed errors for the pieces whose failures callers match on.
//!
//! Everything else goes through `anyhow` (see [`crate::Result`]).

use std::path::PathBuf;
use thiserror::Error;

/// Outcome of a recognition call that produced no text.
///
/// Both variants are expected during a batch and never abort it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    /// The service heard the audio but could not interpret it.
    #[error("Cannot understand audio")]
    AmbiguousAudio,

    /// Network, quota or server-side failure.
    #[error("Recognition service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Failure of the external normalization tool for one file.
#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status} for {input}")]
    ExitStatus {
        program: String,
        status: std::process::ExitStatus,
        input: PathBuf,
    },

    #[error("{program} reported success but {output} is missing")]
    MissingOutput { program: String, output: PathBuf },
}

/// WAV decode failure.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("Failed to read WAV samples from {path}: {source}")]
    Samples {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("Failed to encode WAV: {0}")]
    Encode(#[from] hound::Error),
}

/// Why a [`TaskHandle`](crate::engine::pool::TaskHandle) resolved without a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JoinError {
    #[error("worker panicked: {0}")]
    Panicked(String),

    #[error("pool shut down before the task ran")]
    Cancelled,
}

/// Result of one windowed task: the task's own error, or a worker-side failure.
#[derive(Error, Debug)]
pub enum TaskError<E> {
    #[error("{0}")]
    Failed(E),

    #[error(transparent)]
    Join(JoinError),
}

impl<E> TaskError<E> {
    /// The task's own error, if it returned one.
    pub fn failed(&self) -> Option<&E> {
        match self {
            TaskError::Failed(e) => Some(e),
            TaskError::Join(_) => None,
        }
    }
}

/// Why the recognition stage fell back to the original file name.
#[derive(Error, Debug)]
pub enum RecognizeFailure {
    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error(transparent)]
    Recognition(#[from] RecognitionError),
}

/// Handoff channel protocol violations. Always fatal: they indicate a coordination bug.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandoffError {
    #[error("handoff channel closed before the end-of-batch marker")]
    ClosedWithoutSentinel,

    #[error("rename consumer stopped before the producer finished")]
    ConsumerGone,
}
