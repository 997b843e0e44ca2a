//! Main entry point: run one rent scan for the configured fee-payer node.
//!
//! Configuration comes from the environment, matching the scheduled-scan
//! deployment: `RENTOPS_NODE_ADDRESS` (required), `RENTOPS_NETWORK`
//! (devnet|mainnet|custom, default devnet), `RENTOPS_CUSTOM_RPC` (with
//! network=custom), `RENTOPS_WHITELIST_PATH` (default `whitelist.json`),
//! `HELIUS_RPC_API_KEY` (optional).

use std::sync::Arc;

use anyhow::Result;
use rentops::scanner::{EventKind, EventReason, Scanner, ScannerConfig};
use rentops::stats::StatsAggregator;
use rentops::types::RpcTarget;
use rentops::whitelist::WhitelistStore;
use rentops::RpcChainReader;
use tracing::{info, warn, Level};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let node = match std::env::var("RENTOPS_NODE_ADDRESS") {
        Ok(node) if !node.is_empty() => node,
        _ => {
            warn!("no RENTOPS_NODE_ADDRESS configured, skipping scan");
            return Ok(());
        }
    };

    let network = std::env::var("RENTOPS_NETWORK").unwrap_or_default();
    let custom_rpc = std::env::var("RENTOPS_CUSTOM_RPC").ok();
    let target = RpcTarget::from_parts(&network, custom_rpc.as_deref());
    let helius_key = std::env::var("HELIUS_RPC_API_KEY").ok();

    let whitelist_path =
        std::env::var("RENTOPS_WHITELIST_PATH").unwrap_or_else(|_| "whitelist.json".to_string());
    let whitelist = WhitelistStore::new(whitelist_path).load_accounts();
    info!(protected = whitelist.len(), "loaded whitelist");

    let stats = Arc::new(StatsAggregator::new());
    let reader = RpcChainReader::connect(&target, helius_key.as_deref());
    let scanner = Scanner::new(
        reader,
        whitelist,
        stats.clone(),
        ScannerConfig::default(),
        target,
    );

    let result = scanner.scan_for_node(&node).await?;

    for event in &result.found_logs {
        match event.kind {
            EventKind::Detected => info!(
                account = %event.account,
                amount = %event.amount,
                tx = %event.tx,
                "detected"
            ),
            EventKind::Skip => info!(account = %event.account, "whitelisted"),
            EventKind::System => {
                if let EventReason::Note(note) = &event.reason {
                    info!("{note}");
                }
            }
        }
    }

    let snapshot = stats.snapshot().await;
    info!(
        found = result.found_count,
        total_locked = snapshot.total_locked,
        idle_rent = snapshot.idle_rent,
        active_accounts = snapshot.active_accounts,
        "scan finished"
    );

    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
