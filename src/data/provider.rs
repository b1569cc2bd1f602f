use std::time::Duration;

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, B256, Bytes, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{BlockNumberOrTag, Filter, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolEvent;
use async_trait::async_trait;
use color_eyre::eyre::{Result, WrapErr};
use tracing::{debug, info, warn};

use crate::data::calls::{CallDescriptor, IMintableToken};
use crate::data::error::ChainError;
use crate::data::types::{RawTransfer, ReadValue, ReceiptStatus, ReceiptSummary, TxHandle};

pub const DEFAULT_RECEIPT_POLL: Duration = Duration::from_secs(2);

/// Which side of a `Transfer` event to match on the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferFilter {
    From(Address),
    To(Address),
}

/// Everything the dashboard needs from a node and wallet.
///
/// `EthProvider` talks to a real JSON-RPC endpoint; tests substitute an
/// in-memory chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// The connected account, if any.
    fn account(&self) -> Option<Address>;

    /// Whether writes can be signed.
    fn can_sign(&self) -> bool;

    async fn read(&self, call: &CallDescriptor) -> Result<ReadValue, ChainError>;

    async fn native_balance(&self, address: Address) -> Result<U256, ChainError>;

    /// Sign and broadcast a write. Returns once the node has accepted the transaction.
    async fn submit(&self, call: &CallDescriptor) -> Result<TxHandle, ChainError>;

    /// Single receipt lookup. `None` while the transaction is pending.
    async fn receipt(&self, hash: B256) -> Result<Option<ReceiptStatus>, ChainError>;

    async fn transfer_logs(
        &self,
        token: Address,
        filter: TransferFilter,
    ) -> Result<Vec<RawTransfer>, ChainError>;

    async fn block_timestamp(&self, number: u64) -> Result<u64, ChainError>;

    async fn latest_block(&self) -> Result<u64, ChainError>;

    fn receipt_poll_interval(&self) -> Duration {
        DEFAULT_RECEIPT_POLL
    }

    /// Poll for the receipt until it lands or `timeout` elapses.
    ///
    /// Transient RPC failures while polling are logged and retried on the next tick.
    async fn wait_for_confirmation(
        &self,
        handle: &TxHandle,
        timeout: Duration,
    ) -> Result<ReceiptSummary, ChainError> {
        let hash = handle.hash;
        let poll = async {
            loop {
                match self.receipt(hash).await {
                    Ok(Some(status)) if status.success => return Ok(status.summary),
                    Ok(Some(_)) => {
                        return Err(ChainError::Revert(format!(
                            "transaction {hash} reverted on-chain"
                        )));
                    }
                    Ok(None) => {}
                    Err(ChainError::Rpc(e)) => {
                        warn!(%hash, error = %e, "receipt lookup failed, retrying");
                    }
                    Err(e) => return Err(e),
                }
                tokio::time::sleep(self.receipt_poll_interval()).await;
            }
        };

        match tokio::time::timeout(timeout, poll).await {
            Ok(result) => result,
            Err(_) => Err(ChainError::Timeout {
                hash,
                waited: timeout,
            }),
        }
    }
}

/// HTTP JSON-RPC backed client. Reads go through a plain provider; writes
/// through a wallet-filled one when a private key was supplied.
pub struct EthProvider {
    reader: Box<dyn Provider + Send + Sync>,
    signer: Option<Box<dyn Provider + Send + Sync>>,
    account: Option<Address>,
    chain_id: u64,
    receipt_poll: Duration,
}

impl EthProvider {
    /// Connect to a node via HTTP RPC.
    ///
    /// With a private key the signer's address becomes the account; otherwise
    /// `account` (if any) is tracked read-only.
    pub async fn connect(
        rpc_url: &str,
        private_key: Option<&str>,
        account: Option<Address>,
        receipt_poll: Duration,
    ) -> Result<Self> {
        let reader = ProviderBuilder::new().on_http(rpc_url.parse().wrap_err("invalid RPC URL")?);
        let chain_id = reader.get_chain_id().await?;

        let (signer, account) = match private_key {
            Some(key) => {
                let key: PrivateKeySigner = key
                    .trim()
                    .parse()
                    .wrap_err("private key is not a valid secp256k1 key")?;
                let address = key.address();
                if let Some(requested) = account.filter(|a| *a != address) {
                    warn!(%requested, signer = %address, "account differs from signer, using signer");
                }
                let wallet = EthereumWallet::from(key);
                let provider = ProviderBuilder::new()
                    .wallet(wallet)
                    .on_http(rpc_url.parse().wrap_err("invalid RPC URL")?);
                let boxed: Box<dyn Provider + Send + Sync> = Box::new(provider);
                (Some(boxed), Some(address))
            }
            None => (None, account),
        };

        info!(chain_id, signer = signer.is_some(), "connected to rpc");
        Ok(Self {
            reader: Box::new(reader),
            signer,
            account,
            chain_id,
            receipt_poll,
        })
    }

    /// Return the chain ID obtained at connection time.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn request(&self, call: &CallDescriptor) -> TransactionRequest {
        let mut tx = TransactionRequest::default()
            .to(call.contract)
            .input(call.calldata.clone().into());
        if let Some(value) = call.value {
            tx = tx.value(value);
        }
        if let Some(account) = self.account {
            tx = tx.from(account);
        }
        tx
    }
}

#[async_trait]
impl ChainClient for EthProvider {
    fn account(&self) -> Option<Address> {
        self.account
    }

    fn can_sign(&self) -> bool {
        self.signer.is_some()
    }

    async fn read(&self, call: &CallDescriptor) -> Result<ReadValue, ChainError> {
        let output: Bytes = self.reader.call(self.request(call)).await?;
        call.decode_output(&output).map_err(|e| {
            ChainError::Rpc(format!("cannot decode {} result: {e}", call.function_name()))
        })
    }

    async fn native_balance(&self, address: Address) -> Result<U256, ChainError> {
        Ok(self.reader.get_balance(address).await?)
    }

    async fn submit(&self, call: &CallDescriptor) -> Result<TxHandle, ChainError> {
        let signer = self.signer.as_ref().ok_or(ChainError::NoSigner)?;
        let tx = self.request(call);

        if call.preflight {
            debug!(function = call.function_name(), "simulating before broadcast");
            self.reader.call(tx.clone()).await?;
        }

        let pending = signer.send_transaction(tx).await?;
        let hash = *pending.tx_hash();
        info!(
            function = call.function_name(),
            contract = %call.contract,
            %hash,
            "transaction submitted"
        );
        Ok(TxHandle {
            hash,
            submitted_at: chrono::Utc::now().timestamp() as u64,
        })
    }

    async fn receipt(&self, hash: B256) -> Result<Option<ReceiptStatus>, ChainError> {
        let receipt = self.reader.get_transaction_receipt(hash).await?;
        Ok(receipt.map(|r| ReceiptStatus {
            success: r.status(),
            summary: ReceiptSummary {
                tx_hash: r.transaction_hash,
                block_number: r.block_number,
                gas_used: r.gas_used,
            },
        }))
    }

    async fn transfer_logs(
        &self,
        token: Address,
        filter: TransferFilter,
    ) -> Result<Vec<RawTransfer>, ChainError> {
        let base = Filter::new()
            .address(token)
            .event_signature(IMintableToken::Transfer::SIGNATURE_HASH)
            .from_block(BlockNumberOrTag::Earliest)
            .to_block(BlockNumberOrTag::Latest);
        let query = match filter {
            TransferFilter::From(addr) => base.topic1(addr.into_word()),
            TransferFilter::To(addr) => base.topic2(addr.into_word()),
        };

        let logs = self.reader.get_logs(&query).await?;
        let transfers: Vec<RawTransfer> = logs
            .iter()
            .filter_map(|log| {
                parse_transfer_log(
                    log.inner.data.topics(),
                    &log.inner.data.data,
                    log.transaction_hash?,
                    log.block_number?,
                    log.log_index?,
                )
            })
            .collect();
        debug!(?filter, fetched = logs.len(), decoded = transfers.len(), "transfer logs");
        Ok(transfers)
    }

    async fn block_timestamp(&self, number: u64) -> Result<u64, ChainError> {
        let block = self
            .reader
            .get_block_by_number(BlockNumberOrTag::Number(number))
            .await?;
        block
            .map(|b| b.header.timestamp)
            .ok_or_else(|| ChainError::Rpc(format!("block {number} not found")))
    }

    async fn latest_block(&self) -> Result<u64, ChainError> {
        Ok(self.reader.get_block_number().await?)
    }

    fn receipt_poll_interval(&self) -> Duration {
        self.receipt_poll
    }
}

/// Decode a `Transfer(address indexed, address indexed, uint256)` log.
/// Returns `None` for logs that do not have that shape.
pub fn parse_transfer_log(
    topics: &[B256],
    data: &[u8],
    tx_hash: B256,
    block_number: u64,
    log_index: u64,
) -> Option<RawTransfer> {
    if topics.len() != 3 || topics[0] != IMintableToken::Transfer::SIGNATURE_HASH {
        return None;
    }
    if data.len() < 32 {
        return None;
    }
    Some(RawTransfer {
        tx_hash,
        log_index,
        block_number,
        from: Address::from_word(topics[1]),
        to: Address::from_word(topics[2]),
        value: U256::from_be_slice(&data[..32]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::mock::{MockChain, ReceiptBehavior};

    fn transfer_topics(from: Address, to: Address) -> Vec<B256> {
        vec![
            IMintableToken::Transfer::SIGNATURE_HASH,
            from.into_word(),
            to.into_word(),
        ]
    }

    #[test]
    fn test_parse_transfer_log() {
        let from = Address::repeat_byte(0xaa);
        let to = Address::repeat_byte(0xbb);
        let data = U256::from(1234u64).to_be_bytes::<32>();
        let hash = B256::repeat_byte(0x01);

        let parsed = parse_transfer_log(&transfer_topics(from, to), &data, hash, 7, 2).unwrap();
        assert_eq!(parsed.from, from);
        assert_eq!(parsed.to, to);
        assert_eq!(parsed.value, U256::from(1234u64));
        assert_eq!(parsed.block_number, 7);
        assert_eq!(parsed.log_index, 2);
        assert_eq!(parsed.tx_hash, hash);
    }

    #[test]
    fn test_parse_transfer_log_rejects_other_shapes() {
        let from = Address::repeat_byte(0xaa);
        let to = Address::repeat_byte(0xbb);
        let data = U256::from(1u64).to_be_bytes::<32>();

        // Wrong signature
        let mut topics = transfer_topics(from, to);
        topics[0] = B256::repeat_byte(0x11);
        assert!(parse_transfer_log(&topics, &data, B256::ZERO, 1, 0).is_none());

        // ERC-721 style: value indexed, no data
        let mut topics = transfer_topics(from, to);
        topics.push(B256::ZERO);
        assert!(parse_transfer_log(&topics, &[], B256::ZERO, 1, 0).is_none());

        // Truncated data
        assert!(parse_transfer_log(&transfer_topics(from, to), &data[..8], B256::ZERO, 1, 0).is_none());
    }

    #[tokio::test]
    async fn test_wait_for_confirmation_success() {
        let chain = MockChain::new();
        chain.set_receipt_behavior(ReceiptBehavior::AfterPolls { polls: 2, success: true });
        let handle = TxHandle {
            hash: B256::repeat_byte(0x42),
            submitted_at: 0,
        };

        let summary = chain
            .wait_for_confirmation(&handle, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(summary.tx_hash, handle.hash);
        assert_eq!(chain.receipt_calls(), 3);
    }

    #[tokio::test]
    async fn test_wait_for_confirmation_failed_status() {
        let chain = MockChain::new();
        chain.set_receipt_behavior(ReceiptBehavior::AfterPolls { polls: 0, success: false });
        let handle = TxHandle {
            hash: B256::repeat_byte(0x42),
            submitted_at: 0,
        };

        let err = chain
            .wait_for_confirmation(&handle, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(err.is_revert());
    }

    #[tokio::test]
    async fn test_wait_for_confirmation_timeout() {
        let chain = MockChain::new();
        chain.set_receipt_behavior(ReceiptBehavior::Never);
        let handle = TxHandle {
            hash: B256::repeat_byte(0x42),
            submitted_at: 0,
        };

        let err = chain
            .wait_for_confirmation(&handle, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ChainError::Timeout {
                hash: handle.hash,
                waited: Duration::from_millis(50),
            }
        );
    }
}
