//! Extract Command Handler
//!
//! Collects parameters from the defaults file and the command line, gates
//! them through the validator, then dispatches the extraction engine onto
//! a worker thread and maps its outcome to an exit code.

use crate::config::Defaults;
use crate::engine::TapeExtractor;
use crate::error::Result;
use crate::exec::SystemCommandRunner;
use crate::logger;
use crate::validate::{self, RawParams};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exit code for a clean run.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code when one or more files failed but the run completed.
pub const EXIT_ERRORS: i32 = 1;
/// Exit code when the tape device never became accessible.
pub const EXIT_DEVICE_INACCESSIBLE: i32 = 2;

pub struct ExtractArgs {
    pub dir_out: PathBuf,
    pub device: Option<String>,
    pub blocksize: Option<u32>,
    pub max_blocksize: Option<u32>,
    pub files: Option<String>,
    pub prefix: Option<String>,
    pub extension: Option<String>,
    pub fill: bool,
    pub yes: bool,
    pub verbose: bool,
}

pub async fn execute(args: ExtractArgs) -> Result<i32> {
    let defaults = Defaults::load()?;

    let raw = RawParams {
        output_dir: args.dir_out,
        device: args.device.unwrap_or(defaults.device),
        initial_block_size: args.blocksize.unwrap_or(defaults.block_size),
        max_block_size: args.max_blocksize.unwrap_or(defaults.max_block_size),
        files: args.files.unwrap_or(defaults.files),
        prefix: args.prefix.unwrap_or(defaults.prefix),
        extension: args.extension.unwrap_or(defaults.extension),
        fill_blocks: args.fill || defaults.fill_blocks,
        log_file_name: defaults.log_file_name,
        checksum_file_name: defaults.checksum_file_name,
    };

    let runner = SystemCommandRunner;
    let (report, params) = validate::validate(&raw, &runner);

    let Some(params) = params else {
        for problem in report.problems(&raw) {
            eprintln!("ERROR: {}", problem);
        }
        return Ok(if report.device_accessible {
            EXIT_ERRORS
        } else {
            EXIT_DEVICE_INACCESSIBLE
        });
    };

    if report.output_exists && !args.yes && !confirm_overwrite(&raw.output_dir)? {
        eprintln!("Operation cancelled");
        return Ok(EXIT_ERRORS);
    }

    let log_path = params.output_dir.join(&params.log_file_name);
    logger::init(args.verbose, Some(&log_path))?;
    debug!("tapedump starting extraction");

    let extractor = TapeExtractor::new(params, runner);
    let outcome = tokio::task::spawn_blocking(move || extractor.run())
        .await
        .map_err(|e| anyhow::anyhow!("extraction worker failed: {}", e))?;

    if outcome.device_inaccessible {
        eprintln!(
            "ERROR: cannot access tape device {}. Check that the device exists and that \
             the current user has permission to use it",
            raw.device
        );
        return Ok(EXIT_DEVICE_INACCESSIBLE);
    }

    if !outcome.overall_success {
        eprintln!(
            "ERROR: one or more errors occurred while processing the tape, check {} for details",
            log_path.display()
        );
        return Ok(EXIT_ERRORS);
    }

    println!(
        "Tape processed successfully without errors ({} of {} files extracted)",
        outcome.files_extracted, outcome.files_processed
    );
    Ok(EXIT_SUCCESS)
}

/// Ask before clobbering a previous run's output. Anything but an
/// explicit yes cancels.
fn confirm_overwrite(dir: &Path) -> Result<bool> {
    eprint!(
        "WARNING: writing to {} will overwrite existing files. Proceed? (y/N): ",
        dir.display()
    );
    io::stderr().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes" | "YES"))
}
