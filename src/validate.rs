//! Input Validation
//!
//! Gates the extraction engine from ever running with unsafe parameters.
//! Every check is recorded as its own flag so the front end can print one
//! message per failed check instead of a single opaque failure.

use crate::engine::ExtractionParams;
use crate::exec::CommandRunner;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Parameters as collected from the defaults file and the command line,
/// not yet validated.
#[derive(Debug, Clone)]
pub struct RawParams {
    pub output_dir: PathBuf,
    pub device: String,
    pub initial_block_size: u32,
    pub max_block_size: u32,
    pub files: String,
    pub prefix: String,
    pub extension: String,
    pub fill_blocks: bool,
    pub log_file_name: String,
    pub checksum_file_name: String,
}

/// One flag per check. `output_exists` is a warning that prompts an
/// overwrite confirmation, not a failure.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub output_dir_is_directory: bool,
    pub output_dir_is_writable: bool,
    pub output_exists: bool,
    pub device_accessible: bool,
    pub block_size_is_valid: bool,
    pub files_is_valid: bool,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.output_dir_is_directory
            && self.output_dir_is_writable
            && self.device_accessible
            && self.block_size_is_valid
            && self.files_is_valid
    }

    /// Human-readable message per failed check, in check order.
    pub fn problems(&self, raw: &RawParams) -> Vec<String> {
        let mut problems = Vec::new();

        if !self.output_dir_is_directory {
            problems.push(format!(
                "output directory '{}' does not exist",
                raw.output_dir.display()
            ));
        } else if !self.output_dir_is_writable {
            problems.push(format!(
                "cannot write to directory '{}'",
                raw.output_dir.display()
            ));
        }
        if !self.device_accessible {
            problems.push(format!("tape device '{}' is not accessible", raw.device));
        }
        if !self.block_size_is_valid {
            problems.push(format!(
                "block size {} (ceiling {}) is not valid: both must be positive multiples \
                 of 512 and the ceiling must be at least the initial size",
                raw.initial_block_size, raw.max_block_size
            ));
        }
        if !self.files_is_valid {
            problems.push(format!(
                "files value '{}' is not valid: must be a comma-separated list of file \
                 numbers, or empty",
                raw.files
            ));
        }

        problems
    }
}

/// Run every check and, when all gates pass, hand back the immutable
/// parameter set the engine runs with.
pub fn validate(
    raw: &RawParams,
    runner: &impl CommandRunner,
) -> (ValidationReport, Option<ExtractionParams>) {
    let mut report = ValidationReport::default();

    report.output_dir_is_directory = raw.output_dir.is_dir();
    report.output_dir_is_writable =
        report.output_dir_is_directory && dir_is_writable(&raw.output_dir);
    report.output_exists = report.output_dir_is_directory
        && output_files_exist(&raw.output_dir, &raw.prefix, &raw.extension);

    let status = runner.execute(
        "mt",
        &[
            "-f".to_string(),
            raw.device.clone(),
            "status".to_string(),
        ],
    );
    report.device_accessible = status.success();

    report.block_size_is_valid = is_valid_block_size(raw.initial_block_size)
        && is_valid_block_size(raw.max_block_size)
        && raw.max_block_size >= raw.initial_block_size;

    let selected = parse_files_list(&raw.files);
    report.files_is_valid = selected.is_some();

    if !report.is_valid() {
        return (report, None);
    }

    let params = ExtractionParams {
        output_dir: raw.output_dir.clone(),
        device: raw.device.clone(),
        initial_block_size: raw.initial_block_size,
        max_block_size: raw.max_block_size,
        selected_files: selected.unwrap_or_default(),
        prefix: raw.prefix.clone(),
        extension: raw.extension.clone(),
        fill_blocks: raw.fill_blocks,
        log_file_name: raw.log_file_name.clone(),
        checksum_file_name: raw.checksum_file_name.clone(),
    };

    (report, Some(params))
}

fn is_valid_block_size(size: u32) -> bool {
    size > 0 && size % 512 == 0
}

/// Permission bits lie on network mounts and ACL setups, so probe by
/// actually creating a file.
fn dir_is_writable(dir: &Path) -> bool {
    let probe = dir.join(".tapedump-write-probe");
    match std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&probe)
    {
        Ok(_) => {
            let _ = std::fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}

fn output_files_exist(dir: &Path, prefix: &str, extension: &str) -> bool {
    let suffix = format!(".{}", extension);
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return false,
    };

    entries.flatten().any(|entry| {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        name.starts_with(prefix) && name.ends_with(&suffix)
    })
}

/// Parse the comma-separated selection into a set of 1-based file
/// numbers. Empty input selects every file on the tape.
fn parse_files_list(files: &str) -> Option<BTreeSet<u32>> {
    let trimmed = files.trim();
    if trimmed.is_empty() {
        return Some(BTreeSet::new());
    }

    let mut selected = BTreeSet::new();
    for part in trimmed.split(',') {
        match part.trim().parse::<u32>() {
            Ok(n) if n > 0 => {
                selected.insert(n);
            }
            _ => return None,
        }
    }
    Some(selected)
}
