//! Tape Extraction Engine
//!
//! State machine that pulls successive files off a tape into separate
//! output files, driving the external `mt` and `dd` tools. The tape is an
//! exclusively-owned, strictly sequential resource, so the engine runs on
//! a single thread and issues exactly one child process at a time.
//!
//! Block sizes on tape are a physical property of how each file was
//! written and cannot be queried, only discovered: the engine probes with
//! throwaway one-block reads, growing the size in 512-byte steps until a
//! read succeeds. End of tape is detected by a failed `fsr 1` positioning
//! probe rather than byte counting.

use crate::checksum;
use crate::error::{Result, TapeDumpError};
use crate::exec::{CommandOutput, CommandRunner};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{error, info};

/// Validated, immutable parameters for one tape-reading session. Built by
/// the validator, consumed by the engine; nothing mutates these after the
/// run starts.
#[derive(Debug, Clone)]
pub struct ExtractionParams {
    pub output_dir: PathBuf,
    /// Non-rewinding tape device node.
    pub device: String,
    /// Starting guess for block-size discovery, positive multiple of 512.
    pub initial_block_size: u32,
    /// Discovery gives up once the trial size would exceed this.
    pub max_block_size: u32,
    /// 1-based tape file numbers to extract; empty selects every file.
    pub selected_files: BTreeSet<u32>,
    pub prefix: String,
    pub extension: String,
    /// Pad unreadable blocks with null bytes instead of failing the copy.
    pub fill_blocks: bool,
    pub log_file_name: String,
    pub checksum_file_name: String,
}

/// Read-only progress flags, safe to poll from another thread while the
/// engine runs on its worker.
#[derive(Debug)]
pub struct JobStatus {
    current_file: AtomicU32,
    end_of_tape: AtomicBool,
    overall_success: AtomicBool,
    device_inaccessible: AtomicBool,
    finished: AtomicBool,
}

impl JobStatus {
    fn new() -> Self {
        Self {
            current_file: AtomicU32::new(0),
            end_of_tape: AtomicBool::new(false),
            overall_success: AtomicBool::new(true),
            device_inaccessible: AtomicBool::new(false),
            finished: AtomicBool::new(false),
        }
    }

    /// File number currently being processed; 0 before the first file.
    pub fn current_file(&self) -> u32 {
        self.current_file.load(Ordering::Acquire)
    }

    pub fn end_of_tape(&self) -> bool {
        self.end_of_tape.load(Ordering::Acquire)
    }

    pub fn overall_success(&self) -> bool {
        self.overall_success.load(Ordering::Acquire)
    }

    pub fn device_inaccessible(&self) -> bool {
        self.device_inaccessible.load(Ordering::Acquire)
    }

    /// True once the engine has published its terminal state.
    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }
}

/// Aggregate result reported when the engine finishes.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub overall_success: bool,
    pub device_inaccessible: bool,
    /// Tape files encountered, extracted or skipped.
    pub files_processed: u32,
    /// Files copied to disk without error.
    pub files_extracted: u32,
    /// File numbers whose copy or block-size discovery failed.
    pub failed_files: Vec<u32>,
}

/// The extraction state machine. One instance per tape-reading session;
/// never reused across tapes.
pub struct TapeExtractor<R: CommandRunner> {
    params: ExtractionParams,
    runner: R,
    status: Arc<JobStatus>,
    /// Effective starting guess; forced to 512 in fill mode.
    initial_block_size: u32,
    current_file: u32,
    end_of_tape: bool,
    overall_success: bool,
    device_inaccessible: bool,
    files_extracted: u32,
    failed_files: Vec<u32>,
}

impl<R: CommandRunner> TapeExtractor<R> {
    pub fn new(params: ExtractionParams, runner: R) -> Self {
        let initial_block_size = params.initial_block_size;
        Self {
            params,
            runner,
            status: Arc::new(JobStatus::new()),
            initial_block_size,
            current_file: 1,
            end_of_tape: false,
            overall_success: true,
            device_inaccessible: false,
            files_extracted: 0,
            failed_files: Vec::new(),
        }
    }

    /// Handle for polling progress from another thread.
    pub fn status(&self) -> Arc<JobStatus> {
        Arc::clone(&self.status)
    }

    /// Run the whole extraction session to completion.
    ///
    /// Every failure mode is folded into the returned outcome and the log
    /// stream. A per-file copy error never stops the iteration; only an
    /// inaccessible device at the initial probe aborts the run, before any
    /// file I/O and without touching the tape further.
    pub fn run(mut self) -> JobOutcome {
        self.log_parameters();

        if self.params.fill_blocks {
            // dd's conv=sync pads short reads up to the block size, so an
            // oversized starting guess would bake padding into the output.
            self.initial_block_size = 512;
            info!("Fill mode: initial block size reset to 512");
        }

        info!("Getting tape status");
        let status = self.mt(&["status"]);
        if !status.success() {
            self.device_inaccessible = true;
            self.overall_success = false;
            self.status
                .device_inaccessible
                .store(true, Ordering::Release);
            self.status.overall_success.store(false, Ordering::Release);
            error!(
                "Tape device {} is not accessible, aborting before any file is read",
                self.params.device
            );
            return self.finish();
        }

        while !self.end_of_tape {
            self.status
                .current_file
                .store(self.current_file, Ordering::Release);

            let selected = self.params.selected_files.is_empty()
                || self.params.selected_files.contains(&self.current_file);
            self.process_file(selected);

            self.current_file += 1;
        }

        self.finalize();
        self.finish()
    }

    /// Handle one tape file: copy it (or skip it), then probe whether
    /// another file follows.
    fn process_file(&mut self, selected: bool) {
        if selected {
            self.extract_current_file();
        } else {
            info!(
                "Skipping file #{}, fast-forward to next file",
                self.current_file
            );
            self.mt(&["fsf", "1"]);
        }

        // One record forward tells us whether another file follows; the
        // matching bsr puts the head back on the file boundary.
        let probe = self.mt(&["fsr", "1"]);
        if probe.success() {
            self.mt(&["bsr", "1"]);
        } else {
            info!("Reached end of tape");
            self.end_of_tape = true;
            self.status.end_of_tape.store(true, Ordering::Release);
        }
    }

    fn extract_current_file(&mut self) {
        let block_size = match self.find_block_size() {
            Ok(size) => size,
            Err(e) => {
                error!("File #{}: {}", self.current_file, e);
                self.record_failure();
                // Skip past the unreadable file; the run continues with
                // the next one.
                self.mt(&["fsf", "1"]);
                return;
            }
        };
        info!("Block size: {}", block_size);

        let out_path = self.output_path();
        info!(
            "Extracting file #{} to {}",
            self.current_file,
            out_path.display()
        );

        let mut args = vec![
            format!("if={}", self.params.device),
            format!("of={}", out_path.display()),
            format!("bs={}", block_size),
        ];
        if self.params.fill_blocks {
            args.push("conv=noerror,sync".to_string());
        }
        let copy = self.runner.execute("dd", &args);

        if copy.success() {
            self.files_extracted += 1;
        } else {
            // Partial output stays on disk.
            error!("dd encountered an error while reading the tape");
            self.record_failure();
        }
    }

    /// Discover the block size of the current file by trial reads.
    ///
    /// Each probe is a throwaway one-block `dd` into /dev/null, always
    /// followed by `bsr 1` so the head lands back on the start of the
    /// file, probe outcome notwithstanding. Sizes grow in 512-byte steps
    /// from the initial guess up to the configured ceiling.
    fn find_block_size(&mut self) -> Result<u32> {
        let mut block_size = self.initial_block_size;

        loop {
            info!(
                "Guessing block size for file #{}, trial value {}",
                self.current_file, block_size
            );

            let probe = self.runner.execute(
                "dd",
                &[
                    format!("if={}", self.params.device),
                    "of=/dev/null".to_string(),
                    format!("bs={}", block_size),
                    "count=1".to_string(),
                ],
            );
            self.mt(&["bsr", "1"]);

            if probe.success() {
                return Ok(block_size);
            }

            block_size += 512;
            if block_size > self.params.max_block_size {
                return Err(TapeDumpError::BlockSizeNotFound {
                    file: self.current_file,
                    ceiling: self.params.max_block_size,
                });
            }
        }
    }

    /// Write the checksum manifest, then rewind and eject. Rewind and
    /// eject are best effort: their exit codes end up in the log but do
    /// not change the outcome.
    fn finalize(&mut self) {
        info!("Creating checksum file");
        let manifest = self
            .params
            .output_dir
            .join(&self.params.checksum_file_name);
        if let Err(e) =
            checksum::write_manifest(&self.params.output_dir, &self.params.extension, &manifest)
        {
            error!("Failed to write checksum manifest: {}", e);
            self.overall_success = false;
            self.status.overall_success.store(false, Ordering::Release);
        }

        info!("Rewinding tape");
        self.mt(&["rewind"]);
        info!("Ejecting tape");
        self.mt(&["eject"]);

        if self.overall_success {
            info!("Tape processed successfully without errors");
        } else {
            error!("One or more errors occurred while processing the tape, check the log file for details");
        }
    }

    fn finish(self) -> JobOutcome {
        info!("Success: {}", self.overall_success);
        self.status.finished.store(true, Ordering::Release);
        JobOutcome {
            overall_success: self.overall_success,
            device_inaccessible: self.device_inaccessible,
            files_processed: self.current_file - 1,
            files_extracted: self.files_extracted,
            failed_files: self.failed_files,
        }
    }

    fn record_failure(&mut self) {
        self.overall_success = false;
        self.status.overall_success.store(false, Ordering::Release);
        self.failed_files.push(self.current_file);
    }

    /// Output file name: prefix plus the file number zero-padded so that
    /// prefix and digits together fill at least ten characters.
    fn output_path(&self) -> PathBuf {
        let padding = 10usize.saturating_sub(self.params.prefix.len());
        let name = format!(
            "{}{:0width$}.{}",
            self.params.prefix,
            self.current_file,
            self.params.extension,
            width = padding
        );
        self.params.output_dir.join(name)
    }

    fn mt(&self, operation: &[&str]) -> CommandOutput {
        let mut args = vec!["-f".to_string(), self.params.device.clone()];
        args.extend(operation.iter().map(|s| s.to_string()));
        self.runner.execute("mt", &args)
    }

    fn log_parameters(&self) {
        info!("Tape extraction session starting");
        info!("Output directory: {}", self.params.output_dir.display());
        info!("Tape device: {}", self.params.device);
        info!("Initial block size: {}", self.params.initial_block_size);
        info!("Block size ceiling: {}", self.params.max_block_size);
        if self.params.selected_files.is_empty() {
            info!("Files: all");
        } else {
            let list: Vec<String> = self
                .params
                .selected_files
                .iter()
                .map(|n| n.to_string())
                .collect();
            info!("Files: {}", list.join(","));
        }
        info!("Prefix: {}", self.params.prefix);
        info!("Extension: {}", self.params.extension);
        info!("Fill failed blocks: {}", self.params.fill_blocks);
    }
}
