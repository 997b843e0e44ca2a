//! Chain access for the scanner and the reclaim engine.
//!
//! The core never talks to an RPC endpoint directly; it goes through the
//! [`ChainReader`] capability so every detection and reclaim path can be
//! exercised against an in-memory implementation. [`RpcChainReader`] is the
//! production implementation over the nonblocking Solana RPC client.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_client::rpc_config::{RpcSendTransactionConfig, RpcTransactionConfig};
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;
use solana_transaction_status::option_serializer::OptionSerializer;
use solana_transaction_status::{EncodedTransaction, UiMessage, UiTransactionEncoding};
use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::Retry;
use tracing::{debug, warn};

use crate::types::RpcTarget;

/// Per-request RPC timeout.
const RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// How many signatures the dual-network presence probe lists per cluster.
const PROBE_SIGNATURE_LIMIT: usize = 5;

/// Decoded balance effects of one transaction: the participant addresses in
/// account-key order with their pre/post lamport balances at the same
/// indices. Loaded v0 lookup-table addresses are appended after the static
/// keys so the indices line up with the balance arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub signature: String,
    pub account_keys: Vec<String>,
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
}

/// Capability the core needs from the chain.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// List up to `limit` recent transaction signatures involving `address`.
    async fn signatures_for_address(&self, address: &str, limit: usize) -> Result<Vec<String>>;

    /// Fetch one transaction's decoded balance effects. `Ok(None)` means the
    /// transaction exists but lacks usable keys or balance metadata.
    async fn transaction_record(&self, signature: &str) -> Result<Option<TransactionRecord>>;

    /// Fetch an account's current state; `Ok(None)` when the account does
    /// not exist (never created, or already closed).
    async fn account_state(&self, address: &Pubkey) -> Result<Option<Account>>;

    /// Fetch a recent blockhash to anchor a transaction lifetime.
    async fn latest_blockhash(&self) -> Result<Hash>;

    /// Submit a signed transaction and return its signature.
    async fn submit_transaction(&self, transaction: &VersionedTransaction) -> Result<Signature>;
}

/// Production chain reader over the nonblocking Solana RPC client.
pub struct RpcChainReader {
    rpc: Arc<RpcClient>,
    endpoint: String,
    retry_attempts: usize,
}

impl RpcChainReader {
    /// Connect to the endpoint resolved for `target`.
    pub fn connect(target: &RpcTarget, helius_api_key: Option<&str>) -> Self {
        let endpoint = target.url(helius_api_key);
        debug!(endpoint = %endpoint, "using RPC endpoint");
        let rpc = Arc::new(RpcClient::new_with_timeout(endpoint.clone(), RPC_TIMEOUT));
        Self {
            rpc,
            endpoint,
            retry_attempts: 3,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn retry_strategy(&self) -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(200)
            .max_delay(Duration::from_secs(5))
            .take(self.retry_attempts)
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn signatures_for_address(&self, address: &str, limit: usize) -> Result<Vec<String>> {
        let pubkey = Pubkey::from_str(address)
            .with_context(|| format!("invalid address: {address}"))?;

        // The listing is the one call a scan cannot proceed without, so it
        // gets the retry treatment; individual transaction fetches do not.
        let signatures = Retry::spawn(self.retry_strategy(), || async {
            self.rpc
                .get_signatures_for_address_with_config(
                    &pubkey,
                    GetConfirmedSignaturesForAddress2Config {
                        limit: Some(limit),
                        commitment: Some(CommitmentConfig::confirmed()),
                        ..Default::default()
                    },
                )
                .await
        })
        .await
        .context("failed to list signatures")?;

        Ok(signatures.into_iter().map(|s| s.signature).collect())
    }

    async fn transaction_record(&self, signature: &str) -> Result<Option<TransactionRecord>> {
        let parsed = Signature::from_str(signature)
            .with_context(|| format!("invalid signature: {signature}"))?;

        let response = self
            .rpc
            .get_transaction_with_config(
                &parsed,
                RpcTransactionConfig {
                    encoding: Some(UiTransactionEncoding::Json),
                    commitment: Some(CommitmentConfig::confirmed()),
                    max_supported_transaction_version: Some(0),
                },
            )
            .await
            .context("failed to fetch transaction")?;

        let tx_with_meta = response.transaction;
        let meta = match tx_with_meta.meta {
            Some(meta) => meta,
            None => return Ok(None),
        };

        let mut account_keys: Vec<String> = match tx_with_meta.transaction {
            EncodedTransaction::Json(ui) => match ui.message {
                UiMessage::Raw(raw) => raw.account_keys,
                UiMessage::Parsed(parsed) => {
                    parsed.account_keys.into_iter().map(|k| k.pubkey).collect()
                }
            },
            other => {
                warn!(signature = %signature, "unexpected transaction encoding: {other:?}");
                return Ok(None);
            }
        };

        if let OptionSerializer::Some(loaded) = meta.loaded_addresses {
            account_keys.extend(loaded.writable);
            account_keys.extend(loaded.readonly);
        }

        if account_keys.is_empty() {
            return Ok(None);
        }

        Ok(Some(TransactionRecord {
            signature: signature.to_string(),
            account_keys,
            pre_balances: meta.pre_balances,
            post_balances: meta.post_balances,
        }))
    }

    async fn account_state(&self, address: &Pubkey) -> Result<Option<Account>> {
        let response = self
            .rpc
            .get_account_with_commitment(address, CommitmentConfig::confirmed())
            .await
            .context("failed to fetch account")?;
        Ok(response.value)
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        self.rpc
            .get_latest_blockhash()
            .await
            .context("failed to fetch latest blockhash")
    }

    async fn submit_transaction(&self, transaction: &VersionedTransaction) -> Result<Signature> {
        // Preflight simulation is disabled on purpose: a simulated rejection
        // against a stale state would block reclaims that land fine.
        self.rpc
            .send_transaction_with_config(
                transaction,
                RpcSendTransactionConfig {
                    skip_preflight: true,
                    ..Default::default()
                },
            )
            .await
            .context("failed to submit transaction")
    }
}

/// Per-cluster result of a presence probe.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPresence {
    pub count: usize,
    pub signatures: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Presence of a node's history on devnet and mainnet.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkProbe {
    pub devnet: NetworkPresence,
    pub mainnet: NetworkPresence,
}

/// Check on which cluster a node actually has history. Each cluster is
/// probed independently and reports its own error string; the probe itself
/// never fails as a whole.
pub async fn probe_networks(node_address: &str, helius_api_key: Option<&str>) -> NetworkProbe {
    let mut probe = NetworkProbe::default();
    for (target, slot) in [
        (RpcTarget::Devnet, &mut probe.devnet),
        (RpcTarget::Mainnet, &mut probe.mainnet),
    ] {
        let reader = RpcChainReader::connect(&target, helius_api_key);
        match reader
            .signatures_for_address(node_address, PROBE_SIGNATURE_LIMIT)
            .await
        {
            Ok(signatures) => {
                slot.count = signatures.len();
                slot.signatures = signatures;
            }
            Err(e) => slot.error = Some(e.to_string()),
        }
    }
    probe
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_resolves_endpoint() {
        let reader = RpcChainReader::connect(&RpcTarget::Devnet, None);
        assert_eq!(reader.endpoint(), "https://api.devnet.solana.com");

        let reader = RpcChainReader::connect(&RpcTarget::Mainnet, Some("key"));
        assert_eq!(
            reader.endpoint(),
            "https://mainnet.helius-rpc.com/?api-key=key"
        );
    }
}
