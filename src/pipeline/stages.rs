//! Producer stages: optional normalization, then recognition, chained as windowed mappers.
//!
//! Stage A ("FILE") turns listed files into staged files; stage B ("RECOGNISE") turns staged
//! files into [`PipelineRecord`]s. Each stage has its own pool and window. Per-item failures
//! are converted to values at the stage boundary (see [`super::error_handler`]).

use anyhow::Result;
use futures_util::future;
use futures_util::stream::{self, BoxStream, StreamExt};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::audio::read_wav;
use crate::engine::window::{WindowOpts, WindowedMapper};
use crate::error::{NormalizeError, RecognizeFailure};
use crate::normalize::Normalizer;
use crate::recognize::Recognizer;
use crate::types::{PipelineRecord, SourceItem};
use crate::utils::tempfiles::{remove_partial_output, staged_path_for};

use super::context::PipelineContext;
use super::error_handler::{normalized_or_drop, recognized_or_fallback};

pub const NORMALIZE_POOL_NAME: &str = "FILE";
pub const RECOGNIZE_POOL_NAME: &str = "RECOGNISE";

/// A listed file and the path that recognition reads and the consumer moves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Staged {
    pub source: SourceItem,
    /// Normalized copy in the staging directory, or the source itself when normalization is off.
    pub staged: PathBuf,
}

impl Staged {
    /// No normalization: the source file is used as is.
    pub fn in_place(source: SourceItem) -> Self {
        let staged = source.path.clone();
        Self { source, staged }
    }
}

/// Normalize one file into the staging directory. A partial output is removed on failure.
pub fn normalize_one(
    normalizer: &dyn Normalizer,
    temp_dir: &Path,
    item: SourceItem,
) -> Result<Staged, NormalizeError> {
    let staged = staged_path_for(temp_dir, &item.path);
    debug!("Normalizing {} -> {}", item.path.display(), staged.display());
    if let Err(e) = normalizer.normalize(&item.path, &staged) {
        remove_partial_output(&staged);
        return Err(e);
    }
    Ok(Staged {
        source: item,
        staged,
    })
}

/// Decode the staged file and ask the recognizer for its text.
pub fn recognize_one(
    recognizer: &dyn Recognizer,
    language: &str,
    staged: &Staged,
) -> Result<String, RecognizeFailure> {
    let clip = read_wav(&staged.staged)?;
    debug!("Recognizing {} ({:.1}s)", clip.name, clip.duration_secs());
    let text = recognizer.recognize(&clip, language)?;
    // Log scrapers key on this exact line.
    debug!("File={} has:'{}'", staged.source.name(), text);
    Ok(text)
}

/// Records in listing order, as a stream driven by the caller.
pub type RecordStream = BoxStream<'static, PipelineRecord>;

/// Build stage A (when a normalizer is set) and stage B over `items`.
///
/// Nothing runs until the returned stream is polled. Dropping it drains both pools.
pub fn record_stream(items: Vec<SourceItem>, ctx: &PipelineContext) -> Result<RecordStream> {
    let staged = staged_stream(items, ctx)?;

    let recognizer: Arc<dyn Recognizer> = Arc::clone(&ctx.recognizer);
    let language = ctx.language.clone();
    info!(
        "Recognizing with {} (window {})",
        recognizer.name(),
        ctx.tuning.recognize_window
    );
    let mapper = WindowedMapper::new(
        staged,
        move |staged: Staged| recognize_one(recognizer.as_ref(), &language, &staged),
        WindowOpts::new(RECOGNIZE_POOL_NAME, ctx.tuning.recognize_window),
    )?;

    let counters = Arc::clone(&ctx.counters);
    Ok(mapper
        .map(move |m| recognized_or_fallback(m.input, m.result, &counters))
        .boxed())
}

fn staged_stream(items: Vec<SourceItem>, ctx: &PipelineContext) -> Result<BoxStream<'static, Staged>> {
    let Some(normalizer) = ctx.normalizer.clone() else {
        return Ok(stream::iter(items.into_iter().map(Staged::in_place)).boxed());
    };

    let temp_dir = ctx.temp_dir.clone();
    let mapper = WindowedMapper::from_iter(
        items,
        move |item| normalize_one(normalizer.as_ref(), &temp_dir, item),
        WindowOpts::new(NORMALIZE_POOL_NAME, ctx.tuning.normalize_window),
    )?;

    let counters = Arc::clone(&ctx.counters);
    Ok(mapper
        .filter_map(move |m| future::ready(normalized_or_drop(m.input, m.result, &counters)))
        .boxed())
}
