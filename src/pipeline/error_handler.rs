//! Failure adapters at the task boundaries.
//!
//! Per-item failures never cross into the coordinator as errors: each adapter logs the failure
//! and turns it into a value (a dropped item, a fallback label). Only listing problems under
//! `strict` become fatal here.

use anyhow::Result;
use log::{error, warn};
use std::path::PathBuf;

use crate::error::{NormalizeError, RecognizeFailure, TaskError};
use crate::pipeline::context::PipelineCounters;
use crate::types::{LabelKind, PipelineRecord, SourceItem};

use super::stages::Staged;

/// After listing: in strict mode the first skipped entry is fatal; otherwise skipped entries are
/// logged and the run continues.
pub fn check_for_initial_error_or_skipped_paths(
    strict: bool,
    verbose: bool,
    skipped_paths: &[(PathBuf, String)],
) -> Result<()> {
    if strict && let Some((path, msg)) = skipped_paths.first() {
        anyhow::bail!("strict mode: cannot read {}: {}", path.display(), msg);
    }
    if !skipped_paths.is_empty() {
        warn!(
            "Skipped {} source entries due to permission errors or access issues",
            skipped_paths.len()
        );
        if verbose {
            for (p, msg) in skipped_paths {
                warn!("  skipped: {} ({})", p.display(), msg);
            }
        }
    }
    Ok(())
}

/// Stage A boundary: a failed normalization drops the item.
pub fn normalized_or_drop(
    item: SourceItem,
    result: std::result::Result<Staged, TaskError<NormalizeError>>,
    counters: &PipelineCounters,
) -> Option<Staged> {
    match result {
        Ok(staged) => Some(staged),
        Err(e) => {
            error!("Normalization failed for {}, dropping it: {}", item.name(), e);
            counters.record_dropped();
            None
        }
    }
}

/// Stage B boundary: a failed recognition keeps the item under its original file name.
pub fn recognized_or_fallback(
    staged: Staged,
    result: std::result::Result<String, TaskError<RecognizeFailure>>,
    counters: &PipelineCounters,
) -> PipelineRecord {
    let (label, kind) = match result {
        Ok(text) => (text, LabelKind::Recognized),
        Err(e) => {
            error!("Recognition failed for {}: {}", staged.source.name(), e);
            counters.record_fallback();
            (staged.source.name(), LabelKind::Fallback)
        }
    };
    PipelineRecord {
        source: staged.source.path,
        staged: staged.staged,
        label,
        kind,
    }
}
