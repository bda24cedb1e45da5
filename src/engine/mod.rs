//! Engine: worker pool, windowed mapper, naming, and the CLI front end

pub mod arg_parser;
pub mod cli;
pub mod namer;
pub mod pool;
pub mod progress;
pub mod tools;
pub mod window;

// Re-export commonly used items
pub use arg_parser::Cli;
pub use cli::{build_config, handle_run};
pub use namer::Namer;
pub use pool::{BlockingPool, TaskHandle};
pub use tools::{is_os_hidden_file, move_file, sanitize_label};
pub use window::{FailurePolicy, Mapped, WindowOpts, WindowedMapper};
