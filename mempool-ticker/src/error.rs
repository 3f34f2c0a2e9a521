use thiserror::Error;

/// Main error type for the mempool-ticker library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TickerError {
    /// The explorer returned no projected mempool blocks.
    #[error("No projected mempool blocks available")]
    EmptyProjectedBlocks,

    /// The projected difficulty epoch has zero or negative length.
    #[error("Degenerate difficulty epoch duration: {0} seconds")]
    DegenerateEpochDuration(f64),

    /// Not enough blocks to derive a statistic.
    #[error("Insufficient blocks: {0}")]
    InsufficientBlocks(String),

    /// A projected block failed validation.
    #[error("Invalid projected block: {0}")]
    InvalidProjectedBlock(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Type alias for Results in this library.
pub type Result<T> = std::result::Result<T, TickerError>;

impl TickerError {
    /// Creates an InsufficientBlocks error.
    pub fn insufficient_blocks(msg: impl Into<String>) -> Self {
        Self::InsufficientBlocks(msg.into())
    }

    /// Creates an InvalidProjectedBlock error.
    pub fn invalid_block(msg: impl Into<String>) -> Self {
        Self::InvalidProjectedBlock(msg.into())
    }

    /// Creates an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
