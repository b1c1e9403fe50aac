use thiserror::Error;

pub type Result<T> = std::result::Result<T, TapeDumpError>;

#[derive(Error, Debug)]
pub enum TapeDumpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("no readable block size for file {file}: gave up at {ceiling} bytes")]
    BlockSizeNotFound { file: u32, ceiling: u32 },

    #[error("checksum manifest error: {0}")]
    Checksum(String),

    #[error("generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl TapeDumpError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    pub fn checksum<T: Into<String>>(msg: T) -> Self {
        Self::Checksum(msg.into())
    }
}
