//! CLI-level parse tests.

use crate::cli::{Cli, Commands};
use clap::Parser;
use std::path::PathBuf;

#[test]
fn parses_minimal_extract_invocation() {
    let cli = Cli::try_parse_from(["tapedump", "extract", "/data/out"]).unwrap();

    match cli.command {
        Commands::Extract {
            dir_out,
            device,
            blocksize,
            fill,
            yes,
            ..
        } => {
            assert_eq!(dir_out, PathBuf::from("/data/out"));
            assert!(device.is_none());
            assert!(blocksize.is_none());
            assert!(!fill);
            assert!(!yes);
        }
        _ => panic!("expected extract command"),
    }
}

#[test]
fn parses_extract_with_every_flag() {
    let cli = Cli::try_parse_from([
        "tapedump",
        "extract",
        "/data/out",
        "--device",
        "/dev/nst1",
        "--blocksize",
        "1024",
        "--max-blocksize",
        "65536",
        "--files",
        "2,4",
        "--prefix",
        "tape",
        "--extension",
        "img",
        "--fill",
        "--yes",
        "--verbose",
    ])
    .unwrap();

    assert!(cli.verbose);
    match cli.command {
        Commands::Extract {
            device,
            blocksize,
            max_blocksize,
            files,
            prefix,
            extension,
            fill,
            yes,
            ..
        } => {
            assert_eq!(device.as_deref(), Some("/dev/nst1"));
            assert_eq!(blocksize, Some(1024));
            assert_eq!(max_blocksize, Some(65536));
            assert_eq!(files.as_deref(), Some("2,4"));
            assert_eq!(prefix.as_deref(), Some("tape"));
            assert_eq!(extension.as_deref(), Some("img"));
            assert!(fill);
            assert!(yes);
        }
        _ => panic!("expected extract command"),
    }
}

#[test]
fn parses_status_command() {
    let cli = Cli::try_parse_from(["tapedump", "status", "--device", "/dev/nst0"]).unwrap();

    match cli.command {
        Commands::Status { device } => assert_eq!(device.as_deref(), Some("/dev/nst0")),
        _ => panic!("expected status command"),
    }
}

#[test]
fn rejects_non_numeric_blocksize() {
    let result = Cli::try_parse_from(["tapedump", "extract", "/data/out", "-b", "lots"]);
    assert!(result.is_err());
}

#[test]
fn requires_a_subcommand() {
    assert!(Cli::try_parse_from(["tapedump"]).is_err());
}
