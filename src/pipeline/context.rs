//! Pipeline context and tuning: collaborators and counters shared by the stages.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::ConverterConfig;
use crate::normalize::Normalizer;
use crate::recognize::Recognizer;

/// Window sizes and channel capacity for one run.
#[derive(Clone, Debug)]
pub struct PipelineTuning {
    pub normalize_window: usize,
    pub recognize_window: usize,
    /// Capacity of the producer → rename handoff channel.
    pub channel_cap: usize,
}

impl From<&ConverterConfig> for PipelineTuning {
    fn from(c: &ConverterConfig) -> Self {
        Self {
            normalize_window: c.normalize_window,
            recognize_window: c.recognize_window,
            channel_cap: c.channel_cap,
        }
    }
}

/// Per-item outcomes counted by the stages; read once the producer is done.
#[derive(Debug, Default)]
pub struct PipelineCounters {
    dropped: AtomicUsize,
    fallbacks: AtomicUsize,
}

impl PipelineCounters {
    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }
}

/// Everything the producer side needs. Built by the orchestrator from a [`ConverterConfig`].
#[derive(Clone)]
pub struct PipelineContext {
    /// `Some` when normalization is enabled.
    pub normalizer: Option<Arc<dyn Normalizer>>,
    pub recognizer: Arc<dyn Recognizer>,
    pub language: String,
    /// Staging directory for normalized copies.
    pub temp_dir: PathBuf,
    pub tuning: PipelineTuning,
    pub counters: Arc<PipelineCounters>,
}
