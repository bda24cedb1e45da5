//! JSON manifest of a run: which source file became which converted file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::types::LabelKind;

/// One renamed file, keyed by its source file name in [`Manifest`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// File name inside the target directory.
    pub converted: String,
    /// Recognized text, or the source file name for fallbacks.
    pub label: String,
    pub recognized: bool,
}

/// Source name → entry; a `BTreeMap` keeps the output sorted and stable across runs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source_name: String, converted: String, label: &str, kind: LabelKind) {
        self.entries.insert(
            source_name,
            ManifestEntry {
                converted,
                label: label.to_string(),
                recognized: kind == LabelKind::Recognized,
            },
        );
    }

    pub fn get(&self, source_name: &str) -> Option<&ManifestEntry> {
        self.entries.get(source_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write as pretty JSON, creating the parent directory if needed.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create manifest directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize manifest")?;
        fs::write(path, json + "\n")
            .with_context(|| format!("write manifest {}", path.display()))
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read manifest {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse manifest {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_written_json_is_sorted_by_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("index.json");
        let mut manifest = Manifest::new();
        manifest.insert("b.wav".into(), "dog_1.wav".into(), "dog", LabelKind::Recognized);
        manifest.insert("a.wav".into(), "dog.wav".into(), "dog", LabelKind::Recognized);
        manifest.insert("c.WAV".into(), "c.WAV".into(), "c.WAV", LabelKind::Fallback);
        manifest.write(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let a = text.find("\"a.wav\"").unwrap();
        let b = text.find("\"b.wav\"").unwrap();
        assert!(a < b);

        let back = Manifest::read(&path).unwrap();
        assert_eq!(back, manifest);
        assert!(!back.get("c.WAV").unwrap().recognized);
    }
}
