//! Public and internal types for the voxname API and pipeline.

use std::path::{Path, PathBuf};

use crate::utils::config::{DataLayout, Defaults};

/// One audio file found in the source directory. Identity is its path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceItem {
    pub path: PathBuf,
}

impl SourceItem {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File name as a string; used as the fallback label and in log lines.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Where a record's label came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelKind {
    Recognized,
    /// Recognition failed; the label is the original file name.
    Fallback,
}

/// One file that made it through normalization and recognition, ready to be renamed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineRecord {
    /// The file as listed in the source directory.
    pub source: PathBuf,
    /// The file that gets moved: the normalized copy, or `source` when normalization is off.
    pub staged: PathBuf,
    pub label: String,
    pub kind: LabelKind,
}

/// Counters reported at the end of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Files listed from the source directory (after the include filter).
    pub listed: usize,
    /// Files dropped because normalization failed.
    pub dropped: usize,
    /// Records whose label is the original file name.
    pub fallbacks: usize,
    /// Files moved into the target directory.
    pub renamed: usize,
}

/// Which recognition backend the CLI builds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecognizerBackend {
    /// POST each file to a speech endpoint.
    Http {
        endpoint: String,
        api_key: Option<String>,
    },
    /// Offline stand-in: the label is the file stem. Useful for dry runs of the rename logic.
    Echo,
}

impl Default for RecognizerBackend {
    fn default() -> Self {
        RecognizerBackend::Http {
            endpoint: Defaults::ENDPOINT.to_string(),
            api_key: None,
        }
    }
}

/// Full run configuration. Passed to [`Converter`](crate::pipeline::Converter); no process-wide path state.
#[derive(Clone, Debug)]
pub struct ConverterConfig {
    /// Directory holding the source recordings (`SPEECH/`).
    pub source_dir: PathBuf,
    /// Directory receiving renamed files (`converted/`). Created if absent.
    pub target_dir: PathBuf,
    /// Scratch directory for normalized copies (`tmp/`). Only touched when `normalize` is set.
    pub temp_dir: PathBuf,
    /// Language code passed to the recognizer, e.g. `pl-PL`.
    pub language: String,
    /// Run every file through the normalization tool before recognition.
    pub normalize: bool,
    /// Max in-flight normalization processes.
    pub normalize_window: usize,
    /// Max in-flight recognition calls.
    pub recognize_window: usize,
    /// Capacity of the producer → rename handoff channel.
    pub channel_cap: usize,
    /// Fail on the first unreadable source entry instead of skipping it.
    pub strict: bool,
    /// Only process source files named in this list (one name per line).
    pub include_list: Option<PathBuf>,
    /// Write `source name → final name` JSON here after the run.
    pub manifest_path: Option<PathBuf>,
    /// Normalization program and its arguments; `{input}` and `{output}` are substituted.
    pub normalizer_program: String,
    pub normalizer_args: Vec<String>,
    pub recognizer: RecognizerBackend,
    /// Show a counter of renamed files.
    pub progress: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self::for_root(Path::new(Defaults::DATA_ROOT))
    }
}

impl ConverterConfig {
    /// Defaults with the standard `SPEECH/`, `converted/`, `tmp/` layout under `root`.
    pub fn for_root(root: &Path) -> Self {
        let layout = DataLayout::get();
        Self {
            source_dir: root.join(layout.source_dir_name()),
            target_dir: root.join(layout.target_dir_name()),
            temp_dir: root.join(layout.temp_dir_name()),
            language: Defaults::LANGUAGE.to_string(),
            normalize: true,
            normalize_window: Defaults::normalize_window(),
            recognize_window: Defaults::RECOGNIZE_WINDOW,
            channel_cap: Defaults::CHANNEL_CAP,
            strict: false,
            include_list: None,
            manifest_path: None,
            normalizer_program: Defaults::NORMALIZER_PROGRAM.to_string(),
            normalizer_args: Defaults::normalizer_args(),
            recognizer: RecognizerBackend::default(),
            progress: false,
        }
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.normalize_window > 0, "normalize window must be at least 1");
        anyhow::ensure!(self.recognize_window > 0, "recognize window must be at least 1");
        anyhow::ensure!(self.channel_cap > 0, "channel capacity must be at least 1");
        anyhow::ensure!(!self.language.trim().is_empty(), "language code is empty");
        anyhow::ensure!(
            self.source_dir != self.target_dir,
            "source and target directory are the same: {}",
            self.source_dir.display()
        );
        if self.normalize {
            anyhow::ensure!(
                !self.normalizer_program.trim().is_empty(),
                "normalization enabled but no normalizer program configured"
            );
            anyhow::ensure!(
                self.temp_dir != self.source_dir && self.temp_dir != self.target_dir,
                "temp directory must differ from source and target: {}",
                self.temp_dir.display()
            );
        }
        if let RecognizerBackend::Http { endpoint, .. } = &self.recognizer {
            anyhow::ensure!(!endpoint.trim().is_empty(), "recognizer endpoint is empty");
        }
        Ok(())
    }
}
