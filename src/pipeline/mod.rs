//! Pipeline components: source listing, stages, handoff channel, orchestration.

pub mod context;
pub mod error_handler;
pub mod handoff;
pub mod manifest;
pub mod orchestrator;
pub mod source;
pub mod stages;

pub use context::{PipelineContext, PipelineCounters, PipelineTuning};
pub use error_handler::check_for_initial_error_or_skipped_paths;
pub use handoff::{Handoff, HandoffReceiver, HandoffSender, handoff};
pub use manifest::{Manifest, ManifestEntry};
pub use orchestrator::{Converter, recognizer_for};
pub use source::{SourceListing, list_sources, load_include_list};
pub use stages::{RecordStream, Staged, normalize_one, record_stream, recognize_one};
