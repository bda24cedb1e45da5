//! Source directory listing: one level deep, files only, sorted by name.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::engine::tools::is_os_hidden_file;
use crate::types::SourceItem;

/// Items to process plus entries that could not be read.
#[derive(Debug, Default)]
pub struct SourceListing {
    pub items: Vec<SourceItem>,
    pub skipped_paths: Vec<(PathBuf, String)>,
}

/// Read an include list: one file name per line; blank lines and `#` comments are ignored.
pub fn load_include_list(path: &Path) -> Result<HashSet<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read include list {}", path.display()))?;
    Ok(parse_include_list(&text))
}

fn parse_include_list(text: &str) -> HashSet<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// List regular files directly under `source_dir`. Subdirectories and OS metadata files are
/// ignored. When `include` is set, only files whose name is in it are listed.
pub fn list_sources(source_dir: &Path, include: Option<&HashSet<String>>) -> Result<SourceListing> {
    anyhow::ensure!(
        source_dir.is_dir(),
        "source directory {} does not exist or is not a directory",
        source_dir.display()
    );

    let mut listing = SourceListing::default();
    let walker = WalkDir::new(source_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in walker {
        match entry {
            Ok(entry) => {
                if !entry.file_type().is_file() || is_os_hidden_file(entry.path()) {
                    continue;
                }
                let item = SourceItem::new(entry.into_path());
                if let Some(names) = include
                    && !names.contains(&item.name())
                {
                    continue;
                }
                listing.items.push(item);
            }
            Err(err) => {
                let path = err
                    .path()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| source_dir.to_path_buf());
                listing.skipped_paths.push((path, err.to_string()));
            }
        }
    }
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_files_sorted_skipping_dirs_and_hidden() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.wav"), b"x").unwrap();
        fs::write(dir.path().join("a.wav"), b"x").unwrap();
        fs::write(dir.path().join(".DS_Store"), b"x").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.wav"), b"x").unwrap();

        let listing = list_sources(dir.path(), None).unwrap();
        let names: Vec<String> = listing.items.iter().map(SourceItem::name).collect();
        assert_eq!(names, vec!["a.wav", "b.wav"]);
        assert!(listing.skipped_paths.is_empty());
    }

    #[test]
    fn test_include_filter() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.wav", "b.wav", "c.wav"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        let include = parse_include_list("# wanted\nc.wav\n\n  a.wav  \n");
        let listing = list_sources(dir.path(), Some(&include)).unwrap();
        let names: Vec<String> = listing.items.iter().map(SourceItem::name).collect();
        assert_eq!(names, vec!["a.wav", "c.wav"]);
    }

    #[test]
    fn test_missing_source_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_sources(&dir.path().join("SPEECH"), None).is_err());
    }

    #[test]
    fn test_empty_source_dir() {
        let dir = tempfile::tempdir().unwrap();
        let listing = list_sources(dir.path(), None).unwrap();
        assert!(listing.items.is_empty());
    }
}
