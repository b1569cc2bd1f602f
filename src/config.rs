use std::path::PathBuf;
use std::time::Duration;

use alloy::primitives::Address;
use clap::Parser;
use clap::builder::RangedU64ValueParser;

use crate::data::chains::DEFAULT_CHAIN;
use crate::data::history::DEFAULT_WINDOW;

#[derive(Parser, Debug)]
#[command(
    name = "token-desk",
    about = "Terminal dashboard for a mintable ERC-20 token and its swap pool"
)]
pub struct Config {
    /// Chain preset (polygon-amoy, sepolia, ethereum, polygon, base, anvil)
    #[arg(long, default_value = DEFAULT_CHAIN)]
    pub chain: String,

    /// RPC endpoint URL, overrides the chain preset
    #[arg(short, long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Token contract address
    #[arg(short, long, env = "TOKEN_ADDRESS")]
    pub token: Address,

    /// Swap contract address (enables the Swap page)
    #[arg(short, long, env = "TOKEN_SWAP_ADDRESS")]
    pub swap: Option<Address>,

    /// Hex private key used to sign writes
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Account to watch when no private key is given
    #[arg(short, long, env = "ACCOUNT")]
    pub account: Option<Address>,

    /// Seconds to wait for a transaction receipt
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(u64).range(1..))]
    pub confirm_timeout_secs: u64,

    /// Interval between receipt lookups in milliseconds
    #[arg(long, default_value = "2000", value_parser = clap::value_parser!(u64).range(1..))]
    pub receipt_poll_ms: u64,

    /// Number of most recent transfers shown in the history
    #[arg(
        long,
        default_value_t = DEFAULT_WINDOW,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub history_window: usize,

    /// Tick rate in milliseconds for UI refresh
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_rate_ms: u64,

    /// Log file path (defaults to the platform data directory)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }

    pub fn receipt_poll(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_ms)
    }
}
