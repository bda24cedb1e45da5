//! Path and file utilities

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::utils::config::{EMPTY_LABEL, MAX_LABEL_BYTES};

/// Check if a file should be excluded based on OS-specific hidden files
pub fn is_os_hidden_file(path: &Path) -> bool {
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        match name {
            // macOS
            ".DS_Store" | ".AppleDouble" | ".LSOverride" => true,
            // Windows
            "Thumbs.db" | "ehthumbs.db" | "Desktop.ini" => true,
            // Linux
            ".directory" => true,
            // macOS resource forks, Linux trash dirs
            _ => name.starts_with("._") || name.starts_with(".Trash-"),
        }
    } else {
        false
    }
}

/// Cut `s` to at most `max` bytes without splitting a character.
fn truncate_on_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Turn recognized text into a single safe file name component.
/// Separators, characters Windows rejects in names and control characters become `_`;
/// the result is capped at [`MAX_LABEL_BYTES`] and surrounding whitespace and dots are trimmed.
pub fn sanitize_label(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let capped = truncate_on_char_boundary(&cleaned, MAX_LABEL_BYTES);
    let trimmed = capped.trim().trim_matches('.').trim();
    if trimmed.is_empty() {
        EMPTY_LABEL.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Move `from` to `to`. Falls back to copy + remove when the two are on different filesystems.
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices => {
            fs::copy(from, to).with_context(|| {
                format!("copy across devices ({} -> {})", from.display(), to.display())
            })?;
            fs::remove_file(from)
                .with_context(|| format!("remove {} after cross-device copy", from.display()))
        }
        Err(e) => Err(e)
            .with_context(|| format!("rename {} -> {}", from.display(), to.display())),
    }
}
