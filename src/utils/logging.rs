//! Logging utilities
//!
//! Logger setup with optional file persistence.

use env_logger::{Builder, Env, Target};
use std::fs::File;

/// Initialize the global logger. `RUST_LOG` overrides the `info` default;
/// when `log_file` is set, log lines go to that file instead of stderr.
pub fn setup_logging(log_file: Option<&str>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    if let Some(path) = log_file {
        match File::create(path) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("cannot open log file {}: {} (logging to stderr)", path, e),
        }
    }
    builder.init();
}
