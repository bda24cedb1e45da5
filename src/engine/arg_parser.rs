use clap::Parser;
use std::path::PathBuf;

use crate::utils::config::{DataLayout, Defaults};

struct DefaultArgs;

impl DefaultArgs {
    pub const DIR: &'static str = Defaults::DATA_ROOT;
}

/// Rename recorded speech files after what is said in them.
#[derive(Clone, Parser)]
#[command(name = "voxname")]
#[command(
    about = "Normalize, recognize and rename the recordings in DIR/SPEECH into DIR/converted."
)]
pub struct Cli {
    /// Data root holding SPEECH/ (and receiving converted/ and tmp/). Default: ./Data.
    #[arg(value_name = "DIR", default_value = DefaultArgs::DIR)]
    pub dir: PathBuf,

    /// Language code sent to the recognizer, e.g. pl-PL or en-US.
    #[arg(long, short = 'l')]
    pub language: Option<String>,

    /// Normalize every file with the external tool before recognition. Use --normalize=false to skip.
    #[arg(long, short = 'n', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub normalize: Option<bool>,

    /// Max normalization processes running at once. Default: CPU count, capped by the FD limit.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub normalize_window: Option<usize>,

    /// Max recognition requests in flight.
    #[arg(long, short = 'w', value_parser = clap::value_parser!(usize))]
    pub recognize_window: Option<usize>,

    /// Records buffered between recognition and renaming.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub channel_cap: Option<usize>,

    /// Source directory. Default: DIR/SPEECH.
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Target directory. Default: DIR/converted.
    #[arg(long, short = 'o')]
    pub target: Option<PathBuf>,

    /// Scratch directory for normalized copies. Default: DIR/tmp.
    #[arg(long)]
    pub temp: Option<PathBuf>,

    /// Only process the file names listed in this file (one per line, `#` comments allowed).
    #[arg(long, short = 'i')]
    pub include: Option<PathBuf>,

    /// Write a source → converted JSON manifest. Without a path: DIR/index.json.
    #[arg(long, short = 'm', num_args = 0..=1)]
    pub manifest: Option<Option<PathBuf>>,

    /// Recognition endpoint URL.
    #[arg(long, short = 'e')]
    pub endpoint: Option<String>,

    /// API key passed to the recognition endpoint.
    #[arg(long, env = "VOXNAME_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Offline mode: label every file with its own stem instead of calling the recognizer.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub echo: Option<bool>,

    /// Normalization program (arguments come from voxname.toml or the ffmpeg defaults).
    #[arg(long)]
    pub normalizer: Option<String>,

    /// Strict mode: fail on the first unreadable source entry instead of skipping it.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub strict: Option<bool>,

    /// Show a counter of renamed files.
    #[arg(long, short = 'p', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub progress: Option<bool>,

    /// Verbose output (logs every recognized label).
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}

impl Cli {
    /// Manifest path, defaulting to the package manifest filename in the data root.
    pub fn manifest_path(&self) -> Option<PathBuf> {
        self.manifest.as_ref().map(|p| match p {
            Some(path) => path.clone(),
            None => self.dir.join(DataLayout::get().manifest_filename()),
        })
    }
}
