//! RentOps - rent detection and reclamation for Solana fee-payer nodes.
//!
//! The scanner reconstructs sponsored account creations from a node's
//! transaction history using balance-delta heuristics; the reclaim engine
//! validates ownership and closes or drains those accounts, returning the
//! rent deposit to a destination of the caller's choice.

pub mod chain;
pub mod reclaim;
pub mod scanner;
pub mod stats;
pub mod types;
pub mod whitelist;

// Re-export the main entry points for convenience
pub use chain::{ChainReader, RpcChainReader, TransactionRecord};
pub use reclaim::{ReclaimEngine, ReclaimError, ReclaimReceipt, ReclaimResponse};
pub use scanner::{ScanError, ScanResult, Scanner, ScannerConfig};
pub use stats::{GlobalStats, StatsAggregator};
pub use types::RpcTarget;
pub use whitelist::{WhitelistFile, WhitelistStore};
