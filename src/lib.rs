//! tapedump Library
//!
//! Automated extraction of the contents of magnetic tapes, driving the
//! external `mt` and `dd` tools through a narrow subprocess seam. Each
//! file on the tape becomes a separate output file, followed by a SHA-512
//! checksum manifest over the results.

pub mod checksum;
pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod exec;
pub mod logger;
pub mod validate;

#[cfg(test)]
mod tests;

// Re-export key types for easier use
pub use engine::{ExtractionParams, JobOutcome, JobStatus, TapeExtractor};
pub use error::{Result, TapeDumpError};
pub use exec::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use validate::{RawParams, ValidationReport};
