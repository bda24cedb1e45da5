//! Collision-safe destination naming.
//!
//! The rename consumer is the only writer of the target directory, so "check free, then rename"
//! needs no lock as long as [`Namer::resolve`] is called right before each rename.

use std::path::{Path, PathBuf};

use super::tools::sanitize_label;
use crate::utils::config::AudioConsts;

/// Split `name` into (stem, extension-with-dot). A missing `.wav` (any case) is added.
fn split_wav(name: &str) -> (&str, String) {
    let ext_len = AudioConsts::WAV_EXTENSION.len() + 1;
    if name.len() > ext_len && name.is_char_boundary(name.len() - ext_len) {
        let (stem, ext) = name.split_at(name.len() - ext_len);
        if ext.starts_with('.') && ext[1..].eq_ignore_ascii_case(AudioConsts::WAV_EXTENSION) {
            return (stem, ext.to_string());
        }
    }
    (name, format!(".{}", AudioConsts::WAV_EXTENSION))
}

/// Anything at `path`, including a dangling symlink, occupies the name.
fn is_taken(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

/// Maps labels to unused paths in one target directory.
#[derive(Clone, Debug)]
pub struct Namer {
    target_dir: PathBuf,
}

impl Namer {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
        }
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// First free path for `label`: `label.wav`, then `label_1.wav`, `label_2.wav`, ...
    pub fn resolve(&self, label: &str) -> PathBuf {
        let name = sanitize_label(label);
        let (stem, ext) = split_wav(&name);
        let candidate = self.target_dir.join(format!("{stem}{ext}"));
        if !is_taken(&candidate) {
            return candidate;
        }
        let mut n: u64 = 1;
        loop {
            let candidate = self.target_dir.join(format!("{stem}_{n}{ext}"));
            if !is_taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}
