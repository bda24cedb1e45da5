use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter, Record};
use std::io::Write;

const PKG: &str = env!("CARGO_PKG_NAME");

/// Crate log level: Debug with `verbose` (prints every `File=… has:'…'` line), Info otherwise.
fn crate_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Pool workers are named `FILE-<n>` / `RECOGNISE-<n>`; other threads fall back to the target.
fn origin(record: &Record<'_>) -> String {
    std::thread::current()
        .name()
        .unwrap_or(record.target())
        .to_string()
}

fn format_line(record: &Record<'_>) -> String {
    let tag = PKG.cyan();
    match record.level() {
        Level::Error => format!("[{} {} {}] {}", tag, "ERROR".red(), origin(record).white(), record.args()),
        Level::Warn => format!("[{} {} {}] {}", tag, "WARN".yellow(), origin(record).white(), record.args()),
        Level::Info => format!("[{}] {}", tag, record.args()),
        Level::Debug | Level::Trace => format!("[{} {}] {}", tag, "DEBUG".dimmed(), record.args()),
    }
}

/// Install the global logger: dependencies at Warn, this crate per `verbose`. `RUST_LOG` applies
/// on top. A logger installed earlier (tests, embedding programs) is left in place.
pub fn setup_logging(verbose: bool) {
    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn)
        .filter_module(PKG, crate_level(verbose))
        .format(|buf, record| writeln!(buf, "{}", format_line(record)))
        .try_init();
}
