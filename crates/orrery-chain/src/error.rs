//! Error types at the chain boundary

use thiserror::Error;

/// Failures the remote state client can surface
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// Network/RPC failure reaching the chain or indexer
    #[error("transport failure: {0}")]
    Transport(String),

    /// The contract refused the transaction
    #[error("transaction rejected: {0}")]
    Rejected(String),
}

/// Result type for chain operations
pub type ChainResult<T> = Result<T, ChainError>;
