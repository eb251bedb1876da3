use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Machine-readable category of a [`ChainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidBlock,
    InvalidHash,
    /// Signature checks; append never requires them yet.
    InvalidSignature,
    BlockNotFound,
    ChainCorrupted,
    InvalidTransaction,
    BlockTooLarge,
    MiningExhausted,
    MiningCancelled,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidBlock => "INVALID_BLOCK",
            ErrorKind::InvalidHash => "INVALID_HASH",
            ErrorKind::InvalidSignature => "INVALID_SIGNATURE",
            ErrorKind::BlockNotFound => "BLOCK_NOT_FOUND",
            ErrorKind::ChainCorrupted => "CHAIN_CORRUPTED",
            ErrorKind::InvalidTransaction => "INVALID_TRANSACTION",
            ErrorKind::BlockTooLarge => "BLOCK_TOO_LARGE",
            ErrorKind::MiningExhausted => "MINING_EXHAUSTED",
            ErrorKind::MiningCancelled => "MINING_CANCELLED",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

type Cause = Box<dyn StdError + Send + Sync + 'static>;

/// Error returned by every fallible ledger operation.
///
/// Carries a [`ErrorKind`] code, a human message, the index of the offending
/// block when one is known, and an optional wrapped cause.
#[derive(Debug, Error)]
#[error("[{code}] {message}{cause}", code = .kind.code(), cause = render_cause(.source))]
pub struct ChainError {
    kind: ErrorKind,
    message: String,
    index: Option<u64>,
    #[source]
    source: Option<Cause>,
}

fn render_cause(source: &Option<Cause>) -> String {
    match source {
        Some(cause) => format!(": {}", cause),
        None => String::new(),
    }
}

impl ChainError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ChainError {
            kind,
            message: message.into(),
            index: None,
            source: None,
        }
    }

    /// Wrap `cause` under a new kind and message.
    pub fn wrap<E>(kind: ErrorKind, message: impl Into<String>, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        ChainError {
            source: Some(Box::new(cause)),
            ..ChainError::new(kind, message)
        }
    }

    /// Attach the index of the block the error refers to.
    pub fn at(mut self, index: u64) -> Self {
        self.index = Some(index);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn index(&self) -> Option<u64> {
        self.index
    }

    pub fn invalid_block(message: impl Into<String>) -> Self {
        ChainError::new(ErrorKind::InvalidBlock, message)
    }

    pub fn invalid_hash(message: impl Into<String>) -> Self {
        ChainError::new(ErrorKind::InvalidHash, message)
    }

    pub fn chain_corrupted(message: impl Into<String>) -> Self {
        ChainError::new(ErrorKind::ChainCorrupted, message)
    }

    pub fn invalid_transaction(message: impl Into<String>) -> Self {
        ChainError::new(ErrorKind::InvalidTransaction, message)
    }

    pub fn invalid_signature(message: impl Into<String>) -> Self {
        ChainError::new(ErrorKind::InvalidSignature, message)
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
