pub mod config;
pub mod fd_limit;
pub mod logger;
pub mod tempfiles;
pub(crate) mod voxname_toml;

pub use config::*;
pub use fd_limit::{FDS_PER_NORMALIZATION, normalize_window_cap, soft_nofile_limit};
pub use logger::setup_logging;
pub use tempfiles::{
    StagingCleanup, cleanup_staging_dir, prepare_staging_dir, remove_partial_output,
    staged_path_for,
};
