use alloy::primitives::{Address, B256, U256};
use serde::Serialize;

/// A transaction accepted into the pending pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxHandle {
    pub hash: B256,
    pub submitted_at: u64,
}

/// The parts of a successful receipt shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptSummary {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// A receipt as observed by a single lookup, before success is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptStatus {
    pub summary: ReceiptSummary,
    pub success: bool,
}

/// Decoded result of a contract read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadValue {
    Uint(U256),
    Text(String),
    Bool(bool),
}

impl ReadValue {
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            ReadValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ReadValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Named slot in a read snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReadKey {
    TokenName,
    TokenSymbol,
    Balance,
    Allowance,
    PoolNativeBalance,
    PoolTokenBalance,
    Rate,
}

impl std::fmt::Display for ReadKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadKey::TokenName => write!(f, "name"),
            ReadKey::TokenSymbol => write!(f, "symbol"),
            ReadKey::Balance => write!(f, "balance"),
            ReadKey::Allowance => write!(f, "allowance"),
            ReadKey::PoolNativeBalance => write!(f, "pool native balance"),
            ReadKey::PoolTokenBalance => write!(f, "pool token balance"),
            ReadKey::Rate => write!(f, "rate"),
        }
    }
}

/// A set of reads refreshed together, and the unit of invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadGroup {
    Token,
    Allowance,
    Pool,
    History,
}

impl std::fmt::Display for ReadGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadGroup::Token => write!(f, "token"),
            ReadGroup::Allowance => write!(f, "allowance"),
            ReadGroup::Pool => write!(f, "pool"),
            ReadGroup::History => write!(f, "history"),
        }
    }
}

/// Direction of a transfer relative to the tracked account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    Sent,
    Received,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Sent => write!(f, "Sent"),
            Direction::Received => write!(f, "Received"),
        }
    }
}

/// A `Transfer` log as returned by the node, before merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransfer {
    pub tx_hash: B256,
    pub log_index: u64,
    pub block_number: u64,
    pub from: Address,
    pub to: Address,
    pub value: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pub tx_hash: B256,
    pub log_index: u64,
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub block_number: u64,
    pub direction: Direction,
    pub timestamp: Option<u64>,
}

impl TransferEvent {
    pub fn from_raw(raw: RawTransfer, direction: Direction) -> Self {
        Self {
            tx_hash: raw.tx_hash,
            log_index: raw.log_index,
            from: raw.from,
            to: raw.to,
            value: raw.value,
            block_number: raw.block_number,
            direction,
            timestamp: None,
        }
    }

    /// The other side of the transfer.
    pub fn counterparty(&self) -> Address {
        match self.direction {
            Direction::Sent => self.to,
            Direction::Received => self.from,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub name: String,
    pub chain_id: u64,
    pub rpc_url: String,
    pub symbol: String,
    pub explorer_url: Option<String>,
}
