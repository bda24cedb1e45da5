//! Run orchestration: list → (normalize) → recognize → handoff → rename.
//!
//! The producer drives the stage stream and pushes records into the handoff channel; the
//! consumer pops them and renames files into the target directory. Both run as futures on one
//! coordinator task via `try_join!`. The first fatal error drops the other side, which drains
//! its pools before the error is returned.

use anyhow::{Context, Result};
use futures_util::StreamExt;
use log::{Level, debug, info, log_enabled};
use std::path::PathBuf;
use std::sync::Arc;

use crate::engine::namer::Namer;
use crate::engine::progress::{
    ProgressBar, create_progress_bar, finish_bar, refresh_bar, set_bar_total, update_progress_bar,
};
use crate::engine::tools::move_file;
use crate::normalize::{CommandNormalizer, Normalizer};
use crate::recognize::{EchoRecognizer, HttpRecognizer, Recognizer};
use crate::types::{ConverterConfig, PipelineRecord, RecognizerBackend, RunSummary, SourceItem};
use crate::utils::config::DataLayout;
use crate::utils::tempfiles::{cleanup_staging_dir, prepare_staging_dir};

use super::context::{PipelineContext, PipelineCounters, PipelineTuning};
use super::error_handler::check_for_initial_error_or_skipped_paths;
use super::handoff::{HandoffReceiver, HandoffSender, handoff};
use super::manifest::Manifest;
use super::source::{list_sources, load_include_list};
use super::stages::record_stream;

/// Build the recognizer selected in the config.
pub fn recognizer_for(backend: &RecognizerBackend) -> Result<Arc<dyn Recognizer>> {
    Ok(match backend {
        RecognizerBackend::Http { endpoint, api_key } => {
            let recognizer = HttpRecognizer::new(endpoint, api_key.clone())?;
            debug!("HTTP recognizer at {}", recognizer.endpoint());
            Arc::new(recognizer)
        }
        RecognizerBackend::Echo => Arc::new(EchoRecognizer),
    })
}

/// One configured conversion run.
///
/// Holds the recognizer and normalizer so they outlive the async run; with the HTTP backend the
/// converter must be dropped outside the async runtime.
pub struct Converter {
    config: ConverterConfig,
    normalizer: Arc<dyn Normalizer>,
    recognizer: Arc<dyn Recognizer>,
}

impl Converter {
    /// Converter with the configured normalization command and the given recognizer.
    pub fn new(config: ConverterConfig, recognizer: Arc<dyn Recognizer>) -> Self {
        let normalizer = Arc::new(CommandNormalizer::new(
            &config.normalizer_program,
            &config.normalizer_args,
        ));
        Self {
            config,
            normalizer,
            recognizer,
        }
    }

    /// Converter with the recognizer backend named in the config.
    pub fn from_config(config: ConverterConfig) -> Result<Self> {
        let recognizer = recognizer_for(&config.recognizer)?;
        Ok(Self::new(config, recognizer))
    }

    /// Replace the normalization command. Only used when `config.normalize` is set.
    pub fn with_normalizer(mut self, normalizer: Arc<dyn Normalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Process every listed source file. Per-file failures are logged and counted; filesystem
    /// and channel failures abort the run.
    pub async fn run(&self) -> Result<RunSummary> {
        let config = &self.config;
        config.validate()?;
        debug!(
            "{} CONFIG:{:#?}",
            DataLayout::get().pkg_name().to_uppercase(),
            config
        );

        let include = config
            .include_list
            .as_deref()
            .map(load_include_list)
            .transpose()?;
        let listing = list_sources(&config.source_dir, include.as_ref())?;
        check_for_initial_error_or_skipped_paths(
            config.strict,
            log_enabled!(Level::Debug),
            &listing.skipped_paths,
        )?;
        let listed = listing.items.len();
        info!("Found {} file(s) in {}", listed, config.source_dir.display());

        std::fs::create_dir_all(&config.target_dir).with_context(|| {
            format!("create target directory {}", config.target_dir.display())
        })?;
        if config.normalize {
            prepare_staging_dir(&config.temp_dir)?;
        }

        let ctx = PipelineContext {
            normalizer: config.normalize.then(|| Arc::clone(&self.normalizer)),
            recognizer: Arc::clone(&self.recognizer),
            language: config.language.clone(),
            temp_dir: config.temp_dir.clone(),
            tuning: PipelineTuning::from(config),
            counters: Arc::new(PipelineCounters::default()),
        };
        let bar = config.progress.then(|| create_progress_bar(listed, "Renaming"));
        let namer = Namer::new(&config.target_dir);
        let outcome = run_batch(listing.items, &ctx, &namer, bar.as_ref()).await;
        if let Some(bar) = &bar {
            if let Ok(renamed) = &outcome {
                set_bar_total(bar, renamed.len());
            }
            finish_bar(bar);
        }
        let renamed = outcome?;

        // Only after the consumer finished: leftovers are files of failed items.
        if config.normalize {
            cleanup_staging_dir(&config.temp_dir)?;
        }

        if let Some(path) = &config.manifest_path {
            let mut manifest = Manifest::new();
            for r in &renamed {
                manifest.insert(
                    r.source_name.clone(),
                    r.converted_name(),
                    &r.record.label,
                    r.record.kind,
                );
            }
            manifest.write(path)?;
            info!("Wrote manifest {}", path.display());
        }

        let summary = RunSummary {
            listed,
            dropped: ctx.counters.dropped(),
            fallbacks: ctx.counters.fallbacks(),
            renamed: renamed.len(),
        };
        info!(
            "Done: {} renamed, {} dropped, {} fallback label(s) out of {} listed",
            summary.renamed, summary.dropped, summary.fallbacks, summary.listed
        );
        Ok(summary)
    }
}

/// A record after its rename.
#[derive(Debug)]
struct Renamed {
    source_name: String,
    record: PipelineRecord,
    dest: PathBuf,
}

impl Renamed {
    fn converted_name(&self) -> String {
        self.dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

async fn run_batch(
    items: Vec<SourceItem>,
    ctx: &PipelineContext,
    namer: &Namer,
    bar: Option<&ProgressBar>,
) -> Result<Vec<Renamed>> {
    let (tx, rx) = handoff(ctx.tuning.channel_cap);
    let (sent, renamed) = tokio::try_join!(produce(items, ctx, tx), consume(rx, namer, bar))?;
    debug!("Producer sent {} record(s); consumer renamed {}", sent, renamed.len());
    Ok(renamed)
}

/// Push every record, then the end-of-batch marker.
async fn produce(
    items: Vec<SourceItem>,
    ctx: &PipelineContext,
    tx: HandoffSender<PipelineRecord>,
) -> Result<usize> {
    let mut records = record_stream(items, ctx)?;
    let mut sent = 0_usize;
    while let Some(record) = records.next().await {
        tx.send(record).await?;
        sent += 1;
    }
    // Pools drain before the marker goes out.
    drop(records);
    tx.finish().await?;
    Ok(sent)
}

/// Rename records as they arrive until the end-of-batch marker.
async fn consume(
    mut rx: HandoffReceiver<PipelineRecord>,
    namer: &Namer,
    bar: Option<&ProgressBar>,
) -> Result<Vec<Renamed>> {
    if let Some(bar) = bar {
        refresh_bar(bar);
    }
    let mut renamed = Vec::new();
    while let Some(record) = rx.recv().await? {
        let dest = namer.resolve(&record.label);
        move_file(&record.staged, &dest)?;
        let source_name = SourceItem::new(&record.source).name();
        info!("{} -> {}", source_name, dest.display());
        if let Some(bar) = bar {
            update_progress_bar(bar, 1);
        }
        renamed.push(Renamed {
            source_name,
            record,
            dest,
        });
    }
    Ok(renamed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LabelKind;

    #[tokio::test]
    async fn test_consumer_stops_at_marker_and_resolves_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("converted");
        std::fs::create_dir(&target).unwrap();
        let (tx, rx) = handoff::<PipelineRecord>(2);

        let mut records = Vec::new();
        for name in ["a.wav", "b.wav"] {
            let p = dir.path().join(name);
            std::fs::write(&p, name).unwrap();
            records.push(PipelineRecord {
                source: p.clone(),
                staged: p,
                label: "dog".to_string(),
                kind: LabelKind::Recognized,
            });
        }
        let producer = async move {
            for r in records {
                tx.send(r).await?;
            }
            tx.finish().await?;
            Ok::<_, anyhow::Error>(())
        };

        let namer = Namer::new(&target);
        let ((), renamed) = tokio::try_join!(producer, consume(rx, &namer, None)).unwrap();
        assert_eq!(renamed.len(), 2);
        assert_eq!(renamed[0].converted_name(), "dog.wav");
        assert_eq!(renamed[1].converted_name(), "dog_1.wav");
        assert_eq!(std::fs::read(target.join("dog_1.wav")).unwrap(), b"b.wav");
    }

    #[tokio::test]
    async fn test_consumer_fails_when_producer_vanishes() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = handoff::<PipelineRecord>(2);
        drop(tx);
        let err = consume(rx, &Namer::new(dir.path()), None).await.unwrap_err();
        assert!(err.to_string().contains("end-of-batch"));
    }
}
