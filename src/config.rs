//! Defaults File
//!
//! Built-in defaults can be overridden per user through
//! `~/.config/tapedump/config.json`; command-line flags override both.

use crate::error::{Result, TapeDumpError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DEVICE: &str = "/dev/nst0";
pub const DEFAULT_BLOCK_SIZE: u32 = 512;
pub const DEFAULT_MAX_BLOCK_SIZE: u32 = 1024 * 1024;
pub const DEFAULT_PREFIX: &str = "session";
pub const DEFAULT_EXTENSION: &str = "dd";
pub const DEFAULT_LOG_FILE_NAME: &str = "tapedump.log";
pub const DEFAULT_CHECKSUM_FILE_NAME: &str = "checksums.sha512";

/// User-configurable defaults. Loaded once before a run and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Non-rewinding tape device node.
    pub device: String,
    /// Starting guess for block-size discovery, multiple of 512.
    pub block_size: u32,
    /// Upper bound for block-size discovery, multiple of 512.
    pub max_block_size: u32,
    /// Comma-separated list of file numbers to extract; empty means all.
    pub files: String,
    pub prefix: String,
    pub extension: String,
    pub fill_blocks: bool,
    pub log_file_name: String,
    pub checksum_file_name: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            block_size: DEFAULT_BLOCK_SIZE,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            files: String::new(),
            prefix: DEFAULT_PREFIX.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            fill_blocks: false,
            log_file_name: DEFAULT_LOG_FILE_NAME.to_string(),
            checksum_file_name: DEFAULT_CHECKSUM_FILE_NAME.to_string(),
        }
    }
}

impl Defaults {
    /// Location of the per-user defaults file, if the platform has a
    /// config directory.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tapedump").join("config.json"))
    }

    /// Read the defaults file when present; built-in defaults otherwise.
    /// A file that exists but does not parse is an error rather than a
    /// silent fallback.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.is_file() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            TapeDumpError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            TapeDumpError::config(format!("cannot parse {}: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TapeDumpError;
    use std::io::Write;

    #[test]
    fn built_in_defaults() {
        let defaults = Defaults::default();
        assert_eq!(defaults.device, "/dev/nst0");
        assert_eq!(defaults.block_size, 512);
        assert_eq!(defaults.max_block_size, 1024 * 1024);
        assert_eq!(defaults.prefix, "session");
        assert_eq!(defaults.extension, "dd");
        assert!(!defaults.fill_blocks);
        assert!(defaults.files.is_empty());
    }

    #[test]
    fn full_file_overrides_everything() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "device": "/dev/nst1",
                "block_size": 1024,
                "max_block_size": 65536,
                "files": "1,2",
                "prefix": "tape",
                "extension": "img",
                "fill_blocks": true,
                "log_file_name": "run.log",
                "checksum_file_name": "run.sha512"
            }}"#
        )
        .unwrap();

        let defaults = Defaults::load_from(file.path()).unwrap();
        assert_eq!(defaults.device, "/dev/nst1");
        assert_eq!(defaults.block_size, 1024);
        assert_eq!(defaults.max_block_size, 65536);
        assert_eq!(defaults.files, "1,2");
        assert_eq!(defaults.prefix, "tape");
        assert_eq!(defaults.extension, "img");
        assert!(defaults.fill_blocks);
        assert_eq!(defaults.log_file_name, "run.log");
        assert_eq!(defaults.checksum_file_name, "run.sha512");
    }

    #[test]
    fn partial_file_keeps_built_ins_for_missing_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "device": "/dev/nst2" }}"#).unwrap();

        let defaults = Defaults::load_from(file.path()).unwrap();
        assert_eq!(defaults.device, "/dev/nst2");
        assert_eq!(defaults.block_size, DEFAULT_BLOCK_SIZE);
        assert_eq!(defaults.prefix, DEFAULT_PREFIX);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = Defaults::load_from(file.path()).unwrap_err();
        assert!(matches!(err, TapeDumpError::Config(_)));
    }
}
