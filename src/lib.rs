//! Voxname: batch speech-recognition renamer with bounded-concurrency stages

pub mod audio;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod recognize;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use pipeline::Converter;

use anyhow::Context as _;
use log::debug;

/// Result alias used by public voxname API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: run one batch with `config` and the recognizer backend it names.
///
/// Blocking: builds its own Tokio runtime and returns when every file is handled or a fatal
/// error occurred. Do not call from async code; there, build a [`Converter`] outside the runtime
/// and await [`Converter::run`].
///
/// ```ignore
/// let mut config = voxname::ConverterConfig::for_root(std::path::Path::new("Data"));
/// config.recognizer = voxname::RecognizerBackend::Echo;
/// let summary = voxname::convert(config)?;
/// println!("{} renamed", summary.renamed);
/// ```
pub fn convert(config: ConverterConfig) -> Result<RunSummary> {
    // The blocking HTTP client must be created and dropped outside the runtime.
    let converter = Converter::from_config(config)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build async runtime")?;
    let summary = runtime.block_on(converter.run());
    drop(runtime);
    drop(converter);
    debug!("Runtime and converter shut down");
    summary
}
