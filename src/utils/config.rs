//! Application configuration constants.
//! Defaults and directory names in one place.

use std::sync::OnceLock;

use crate::utils::fd_limit::normalize_window_cap;

// ---- Data layout (from CARGO_PKG_NAME, cached) ----

/// Directory and file names of the data root: built once, then cached.
pub struct DataLayout {
    pkg_name: &'static str,
    config_filename: String,
    source_dir_name: &'static str,
    target_dir_name: &'static str,
    temp_dir_name: &'static str,
    manifest_filename: &'static str,
}

static DATA_LAYOUT: OnceLock<DataLayout> = OnceLock::new();

impl DataLayout {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static DataLayout {
        DATA_LAYOUT.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            DataLayout {
                pkg_name: pkg,
                config_filename: format!("{pkg}.toml"),
                source_dir_name: "SPEECH",
                target_dir_name: "converted",
                temp_dir_name: "tmp",
                manifest_filename: "index.json",
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Config file looked up in the data root (e.g. `voxname.toml`).
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    pub fn source_dir_name(&self) -> &str {
        self.source_dir_name
    }

    pub fn target_dir_name(&self) -> &str {
        self.target_dir_name
    }

    pub fn temp_dir_name(&self) -> &str {
        self.temp_dir_name
    }

    /// Default manifest name when `--manifest` is given without a path.
    pub fn manifest_filename(&self) -> &str {
        self.manifest_filename
    }
}

// ---- Run defaults ----

pub struct Defaults;

impl Defaults {
    pub const DATA_ROOT: &'static str = "Data";
    pub const LANGUAGE: &'static str = "pl-PL";
    /// Recognition is rate limited by the service; keep this small.
    pub const RECOGNIZE_WINDOW: usize = 2;
    /// Upper bound for the normalization window when derived from the CPU count.
    pub const NORMALIZE_WINDOW_MAX: usize = 10;
    pub const CHANNEL_CAP: usize = 16;
    pub const ENDPOINT: &'static str = "http://127.0.0.1:8080/recognize";
    pub const NORMALIZER_PROGRAM: &'static str = "ffmpeg";

    /// `ffmpeg -v error -y -i <in> <out>`.
    pub fn normalizer_args() -> Vec<String> {
        ["-v", "error", "-y", "-i", "{input}", "{output}"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// One normalization process per available thread, capped by
    /// [`NORMALIZE_WINDOW_MAX`](Self::NORMALIZE_WINDOW_MAX) and the FD limit.
    pub fn normalize_window() -> usize {
        let limits = WorkerThreadLimits::current();
        let window = limits.all_threads.clamp(1, Self::NORMALIZE_WINDOW_MAX);
        match normalize_window_cap() {
            Some(fd_cap) if fd_cap < window => fd_cap.max(1),
            _ => window,
        }
    }
}

// ---- Worker threads ----

/// Thread limits used to size the normalization pool.
#[derive(Clone, Copy, Debug)]
pub struct WorkerThreadLimits {
    /// Available threads (from rayon); set by [`WorkerThreadLimits::current()`].
    pub all_threads: usize,
}

impl WorkerThreadLimits {
    /// Build limits with `all_threads` set from `rayon::current_num_threads()`.
    pub fn current() -> Self {
        Self {
            all_threads: rayon::current_num_threads(),
        }
    }
}

// ---- Audio ----

/// Sample format used when re-encoding audio for upload.
pub struct AudioConsts;

impl AudioConsts {
    pub const BITS_PER_SAMPLE: u16 = 16;
    pub const WAV_EXTENSION: &'static str = "wav";
}

// ---- Naming ----

/// Label used when a recognized label sanitizes to nothing.
pub const EMPTY_LABEL: &str = "unnamed";

/// Byte budget for a sanitized label. Leaves room for a `_<n>` suffix and `.wav` under the
/// usual 255-byte file name limit.
pub const MAX_LABEL_BYTES: usize = 200;
