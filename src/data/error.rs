use std::time::Duration;

use alloy::primitives::B256;
use alloy::transports::{RpcError, TransportErrorKind};
use thiserror::Error;

/// A user-supplied value that failed local validation. Never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct InputError {
    pub field: &'static str,
    pub reason: String,
}

impl InputError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error(transparent)]
    InvalidInput(#[from] InputError),

    #[error("no wallet signer is configured")]
    NoSigner,

    #[error("signer declined: {0}")]
    UserRejected(String),

    /// Network or node failure; may succeed if tried again later.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// Deterministic rejection by the contract.
    #[error("execution reverted: {0}")]
    Revert(String),

    #[error("transaction {hash} not confirmed within {}s", waited.as_secs())]
    Timeout { hash: B256, waited: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NoSigner,
    UserRejected,
    Rpc,
    Revert,
    Timeout,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidInput => write!(f, "Invalid input"),
            ErrorKind::NoSigner => write!(f, "No signer"),
            ErrorKind::UserRejected => write!(f, "Rejected"),
            ErrorKind::Rpc => write!(f, "RPC error"),
            ErrorKind::Revert => write!(f, "Reverted"),
            ErrorKind::Timeout => write!(f, "Timed out"),
        }
    }
}

impl ChainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChainError::InvalidInput(_) => ErrorKind::InvalidInput,
            ChainError::NoSigner => ErrorKind::NoSigner,
            ChainError::UserRejected(_) => ErrorKind::UserRejected,
            ChainError::Rpc(_) => ErrorKind::Rpc,
            ChainError::Revert(_) => ErrorKind::Revert,
            ChainError::Timeout { .. } => ErrorKind::Timeout,
        }
    }

    pub fn is_revert(&self) -> bool {
        matches!(self, ChainError::Revert(_))
    }
}

impl From<RpcError<TransportErrorKind>> for ChainError {
    fn from(err: RpcError<TransportErrorKind>) -> Self {
        match &err {
            RpcError::ErrorResp(payload) => classify_payload(payload.code, &payload.message),
            // The wallet filler reports signing failures as local usage errors.
            RpcError::LocalUsageError(inner) => ChainError::UserRejected(inner.to_string()),
            _ => ChainError::Rpc(err.to_string()),
        }
    }
}

/// Map a JSON-RPC error payload onto the error taxonomy.
///
/// EIP-1193 uses code 4001 for a user rejection; geth-style nodes report
/// reverts as code 3 with the revert data attached.
pub fn classify_payload(code: i64, message: &str) -> ChainError {
    let lower = message.to_lowercase();
    if code == 4001 || lower.contains("user rejected") || lower.contains("user denied") {
        ChainError::UserRejected(message.to_string())
    } else if code == 3 || lower.contains("revert") {
        ChainError::Revert(message.to_string())
    } else {
        ChainError::Rpc(format!("{message} (code {code})"))
    }
}
