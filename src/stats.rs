//! Process-wide reclaim telemetry.
//!
//! The aggregator is an owned, injectable object with a single construction
//! point per process; both the scanner and the reclaim engine hold an `Arc`
//! to it. Values are best-effort in-memory telemetry, not a ledger of
//! record: they reset to zero on restart and carry no durability contract.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

/// Snapshot of the global counters. SOL-denominated fields are display
/// units, not lamports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    /// SOL detected as locked in sponsored accounts.
    pub total_locked: f64,
    /// SOL recovered by successful reclaims.
    pub total_reclaimed: f64,
    /// Sponsored accounts believed to still be open.
    pub active_accounts: u64,
    /// SOL sitting idle as rent deposits.
    pub idle_rent: f64,
}

/// Shared counters mutated by every successful detection and reclaim.
///
/// All updates happen inside a single write-lock critical section per call,
/// so concurrent scans and reclaims never lose updates to stale reads.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    inner: RwLock<GlobalStats>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one detected sponsored-account creation holding `sol`.
    pub async fn record_detection(&self, sol: f64) {
        let mut stats = self.inner.write().await;
        stats.total_locked += sol;
        stats.idle_rent += sol;
        stats.active_accounts += 1;
        debug!(
            total_locked = stats.total_locked,
            active_accounts = stats.active_accounts,
            "recorded detection"
        );
    }

    /// Record one successful reclaim of `sol`. Locked/idle/active figures
    /// are decremented with a floor of zero; a reclaim of an account the
    /// scanner never saw must not drive the counters negative.
    pub async fn record_reclaim(&self, sol: f64) {
        let mut stats = self.inner.write().await;
        stats.total_reclaimed += sol;
        stats.total_locked = (stats.total_locked - sol).max(0.0);
        stats.idle_rent = (stats.idle_rent - sol).max(0.0);
        stats.active_accounts = stats.active_accounts.saturating_sub(1);
        debug!(
            total_reclaimed = stats.total_reclaimed,
            active_accounts = stats.active_accounts,
            "recorded reclaim"
        );
    }

    /// Read a consistent copy of the current counters.
    pub async fn snapshot(&self) -> GlobalStats {
        self.inner.read().await.clone()
    }
}
