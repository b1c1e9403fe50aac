use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tapedump")]
#[command(about = "Read the contents of a tape; each file on the tape becomes a separate file on disk")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract every file on the tape (or a selection) into a directory
    Extract {
        /// Output directory
        #[arg(value_name = "DIR_OUT")]
        dir_out: PathBuf,

        /// Non-rewinding tape device
        #[arg(short, long, value_name = "DEVICE")]
        device: Option<String>,

        /// Initial block size in bytes (must be a multiple of 512)
        #[arg(short, long, value_name = "BYTES")]
        blocksize: Option<u32>,

        /// Upper bound for block-size discovery (multiple of 512)
        #[arg(long, value_name = "BYTES")]
        max_blocksize: Option<u32>,

        /// Comma-separated list of file numbers to extract (default: all)
        #[arg(short = 's', long, value_name = "LIST")]
        files: Option<String>,

        /// Output file name prefix
        #[arg(short, long, value_name = "PREFIX")]
        prefix: Option<String>,

        /// Output file name extension
        #[arg(short, long, value_name = "EXT")]
        extension: Option<String>,

        /// Fill blocks that give read errors with null bytes
        #[arg(short, long)]
        fill: bool,

        /// Overwrite existing output files without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Probe the tape device and print its status
    Status {
        /// Tape device
        #[arg(short, long, value_name = "DEVICE")]
        device: Option<String>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
