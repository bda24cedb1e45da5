use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Path of the normalized copy of `source` inside the staging directory (same file name).
pub fn staged_path_for(temp_dir: &Path, source: &Path) -> PathBuf {
    match source.file_name() {
        Some(name) => temp_dir.join(name),
        None => temp_dir.join(source),
    }
}

/// Create the staging directory for normalized copies. Failure is fatal for the run.
pub fn prepare_staging_dir(temp_dir: &Path) -> Result<()> {
    fs::create_dir_all(temp_dir)
        .with_context(|| format!("create staging directory {}", temp_dir.display()))
}

/// What happened to the staging directory at the end of a run.
#[derive(Debug, PartialEq, Eq)]
pub enum StagingCleanup {
    Removed,
    /// Directory still holds files (failed or leaked items); left in place.
    Leftover(usize),
    Missing,
}

/// Remove the staging directory if it is empty. A non-empty directory is left alone and
/// reported with a warning so leaked files can be inspected.
pub fn cleanup_staging_dir(temp_dir: &Path) -> Result<StagingCleanup> {
    let entries = match fs::read_dir(temp_dir) {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StagingCleanup::Missing),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("read staging directory {}", temp_dir.display()));
        }
    };
    let leftover = entries.count();
    if leftover > 0 {
        log::warn!(
            "Staging directory {} still holds {} file(s); leaving it in place",
            temp_dir.display(),
            leftover
        );
        return Ok(StagingCleanup::Leftover(leftover));
    }
    fs::remove_dir(temp_dir)
        .with_context(|| format!("remove staging directory {}", temp_dir.display()))?;
    Ok(StagingCleanup::Removed)
}

/// Best-effort removal of a partial normalization output.
pub fn remove_partial_output(path: &Path) {
    if path.exists()
        && let Err(e) = fs::remove_file(path)
    {
        log::warn!("Could not remove partial output {}: {}", path.display(), e);
    }
}
