//! Types produced and consumed by the rent scanner.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tuning knobs for the scan heuristic. The defaults mirror long-standing
/// operational values; neither is a protocol constant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Most-recent signatures fetched per scan.
    pub signature_limit: usize,
    /// Node balance drop (lamports) above which the node is considered to
    /// have paid for rent in a transaction. Set above fee-sized noise.
    pub dust_threshold_lamports: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            signature_limit: 100,
            dust_threshold_lamports: 10_000,
        }
    }
}

/// Why an account showed up in the scan log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionReason {
    /// The account was funded from zero in a transaction where the node's
    /// own balance dropped by more than the dust threshold. Inferred from
    /// balance deltas, not ledger-proven.
    #[serde(rename = "Node_Sponsored_Creation")]
    NodeSponsoredCreation,
    /// The account was funded from zero but the node's balance barely moved,
    /// so someone else covered the rent.
    #[serde(rename = "Third_Party_Creation")]
    ThirdPartyCreation,
    /// The account matched the whitelist and is exempt from reclaim.
    #[serde(rename = "Whitelisted_Protected")]
    WhitelistedProtected,
}

/// Reason field of an event: one of the enumerated classifications, or the
/// free-text note carried by synthetic system events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventReason {
    Classified(DetectionReason),
    Note(String),
}

/// Category of a scan log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A qualifying creation, counted toward the result.
    Detected,
    /// A whitelisted account that would otherwise have qualified.
    Skip,
    /// Synthetic informational entry (empty history, terminal summary).
    System,
}

/// One entry of the scan log. Never mutated after emission; lives only for
/// the scan that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub account: String,
    pub reason: EventReason,
    /// Fixed six-decimal SOL delta, e.g. `+2.000000`.
    pub amount: String,
    /// Lamports the account gained in the source transaction.
    pub delta_lamports: u64,
    /// Lamports the node itself spent in the source transaction — the raw
    /// signal behind the sponsored/third-party classification, exposed so
    /// consumers can re-derive or dispute it.
    pub node_spend_lamports: u64,
    pub tx: String,
    /// Milliseconds since the UTC epoch.
    pub timestamp: u64,
    pub node: String,
}

/// Result of one scan invocation, owned by its caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub found_count: usize,
    /// Insertion order is processing order; never resorted.
    pub found_logs: Vec<DetectionEvent>,
}

/// Scan failure. Per-transaction problems never surface here; they are
/// skipped so one bad transaction cannot kill the batch.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid node address: {0}")]
    InvalidAddress(String),
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}
