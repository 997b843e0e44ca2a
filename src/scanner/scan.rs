//! The rent scanner: reconstructs sponsored account creations from a node's
//! recent transaction history.
//!
//! The only on-chain signal that an account was freshly created and funded
//! (rather than topped up) is a zero-to-positive balance transition inside a
//! single transaction. Whether the node paid for that rent is inferred from
//! the node's own balance delta exceeding fee-sized noise; the event log
//! carries the raw delta so the inference can be audited downstream.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use solana_sdk::native_token::lamports_to_sol;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info, warn};

use crate::chain::{ChainReader, TransactionRecord};
use crate::scanner::types::{
    DetectionEvent, DetectionReason, EventKind, EventReason, ScanError, ScanResult, ScannerConfig,
};
use crate::stats::StatsAggregator;
use crate::types::{format_sol_delta, now_millis, RpcTarget};

/// Scans a fee-payer node's history for rent it sponsored.
///
/// The whitelist is loaded once at construction and read-only afterwards;
/// transactions are processed serially to respect upstream rate limits and
/// keep the log order deterministic.
pub struct Scanner<R> {
    reader: R,
    whitelist: HashSet<String>,
    stats: Arc<StatsAggregator>,
    config: ScannerConfig,
    network: RpcTarget,
}

impl<R: ChainReader> Scanner<R> {
    pub fn new(
        reader: R,
        whitelist: HashSet<String>,
        stats: Arc<StatsAggregator>,
        config: ScannerConfig,
        network: RpcTarget,
    ) -> Self {
        Self {
            reader,
            whitelist,
            stats,
            config,
            network,
        }
    }

    /// Scan the node's recent history and classify every qualifying balance
    /// transition. One unreadable transaction is skipped, never fatal; only
    /// an unreachable upstream fails the scan.
    pub async fn scan_for_node(&self, node_address: &str) -> Result<ScanResult, ScanError> {
        Pubkey::from_str(node_address)
            .map_err(|_| ScanError::InvalidAddress(node_address.to_string()))?;

        info!(
            node = %node_address,
            network = self.network.label(),
            "starting rent scan"
        );

        let signatures = self
            .reader
            .signatures_for_address(node_address, self.config.signature_limit)
            .await
            .map_err(|e| ScanError::UpstreamUnavailable(format!("{e:#}")))?;

        info!(total = signatures.len(), "fetched signatures");

        let mut result = ScanResult::default();

        if signatures.is_empty() {
            warn!(node = %node_address, "no transactions found");
            result.found_logs.push(self.system_event(
                node_address,
                format!(
                    "No transactions found on {}. Verify address and network selection.",
                    self.network.label()
                ),
            ));
            return Ok(result);
        }

        let mut analyzed = 0usize;

        for signature in &signatures {
            let record = match self.reader.transaction_record(signature).await {
                Ok(Some(record)) => record,
                Ok(None) => continue,
                Err(e) => {
                    warn!(signature = %signature, "skipping transaction: {e:#}");
                    continue;
                }
            };
            analyzed += 1;
            self.classify_record(node_address, &record, &mut result).await;
        }

        info!(
            total = signatures.len(),
            analyzed,
            found = result.found_count,
            "scan complete"
        );

        if result.found_count == 0 {
            result.found_logs.push(self.system_event(
                node_address,
                format!(
                    "Analyzed {analyzed} transactions on {}. No new account creations detected.",
                    self.network.label()
                ),
            ));
        }

        Ok(result)
    }

    /// Apply the creation heuristic to one transaction's balance effects.
    async fn classify_record(
        &self,
        node_address: &str,
        record: &TransactionRecord,
        result: &mut ScanResult,
    ) {
        // Did the node itself lose more than fee-sized noise here? The flag
        // is scoped to this transaction only.
        let node_spend = record
            .account_keys
            .iter()
            .position(|key| key == node_address)
            .map(|i| {
                let pre = record.pre_balances.get(i).copied().unwrap_or(0);
                let post = record.post_balances.get(i).copied().unwrap_or(0);
                pre.saturating_sub(post)
            })
            .unwrap_or(0);
        let node_paid_for_rent = node_spend > self.config.dust_threshold_lamports;

        for i in 0..record.post_balances.len() {
            let pre = record.pre_balances.get(i).copied().unwrap_or(0);
            let post = record.post_balances[i];
            let account = record
                .account_keys
                .get(i)
                .map(String::as_str)
                .unwrap_or("");

            if account.is_empty() || account == node_address {
                continue;
            }

            if self.whitelist.contains(account) {
                debug!(account, "skipping whitelisted account");
                result.found_logs.push(DetectionEvent {
                    id: format!("{}_{}_whitelist", record.signature, i),
                    kind: EventKind::Skip,
                    account: account.to_string(),
                    reason: EventReason::Classified(DetectionReason::WhitelistedProtected),
                    amount: format_sol_delta(post),
                    delta_lamports: post,
                    node_spend_lamports: node_spend,
                    tx: record.signature.clone(),
                    timestamp: now_millis(),
                    node: node_address.to_string(),
                });
                continue;
            }

            // The creation heuristic: funded from zero within this transaction.
            if pre == 0 && post > 0 {
                let reason = if node_paid_for_rent {
                    DetectionReason::NodeSponsoredCreation
                } else {
                    DetectionReason::ThirdPartyCreation
                };
                info!(
                    account,
                    amount = %format_sol_delta(post),
                    ?reason,
                    "detected new account funding"
                );
                result.found_logs.push(DetectionEvent {
                    id: format!("{}_{}", record.signature, i),
                    kind: EventKind::Detected,
                    account: account.to_string(),
                    reason: EventReason::Classified(reason),
                    amount: format_sol_delta(post),
                    delta_lamports: post,
                    node_spend_lamports: node_spend,
                    tx: record.signature.clone(),
                    timestamp: now_millis(),
                    node: node_address.to_string(),
                });
                result.found_count += 1;
                self.stats.record_detection(lamports_to_sol(post)).await;
            }
        }
    }

    fn system_event(&self, node_address: &str, message: String) -> DetectionEvent {
        DetectionEvent {
            id: format!("summary_{}_{}", node_address, now_millis()),
            kind: EventKind::System,
            account: "SCAN_COMPLETE".to_string(),
            reason: EventReason::Note(message),
            amount: "0.000000".to_string(),
            delta_lamports: 0,
            node_spend_lamports: 0,
            tx: "-".to_string(),
            timestamp: now_millis(),
            node: node_address.to_string(),
        }
    }
}
