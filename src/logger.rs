use crate::error::Result;
use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging: console on stderr, plus the per-run log file in
/// the output directory when one is given. The log file is the primary
/// audit trail of a run, so it gets every event the console gets.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(io::stderr);

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer);

    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            let file_layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Arc::new(file));
            registry.with(file_layer).init();
        }
        None => registry.init(),
    }

    Ok(())
}
