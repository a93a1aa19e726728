use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Access to process denied: {0}")]
    AccessDenied(String),

    #[error("Failed to open process: {0}")]
    ProcessOpenFailed(String),

    #[error("Failed to read process memory at address {address:#x}: {message}")]
    MemoryReadFailed { address: u64, message: String },

    #[error("Null pointer at chain step {step} (offset {offset:#x})")]
    NullPointer { step: usize, offset: u64 },

    #[error("Chain read failed at step {step} (offset {offset:#x}): {message}")]
    ChainReadFailed {
        step: usize,
        offset: u64,
        message: String,
    },

    #[error("Invalid offset: {0}")]
    InvalidOffset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
