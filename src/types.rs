//! Shared types for the RentOps core: RPC target selection, centralized
//! program identifiers, and lamport display helpers.

use serde::{Deserialize, Serialize};
use solana_sdk::native_token::lamports_to_sol;
use solana_sdk::pubkey::Pubkey;

/// SPL Token program, owner of closable token accounts.
pub const TOKEN_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// Which cluster a scan or reclaim talks to.
///
/// URL resolution prefers a Helius endpoint when an API key is supplied and
/// falls back to the public cluster endpoints otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "network", content = "customRpc")]
pub enum RpcTarget {
    Devnet,
    Mainnet,
    Custom(String),
}

impl RpcTarget {
    /// Build a target from a request-style network name plus optional custom
    /// endpoint. Unknown names fall back to devnet, matching the scanner's
    /// default network.
    pub fn from_parts(network: &str, custom_rpc: Option<&str>) -> Self {
        match network {
            "mainnet" => RpcTarget::Mainnet,
            "custom" => match custom_rpc {
                Some(url) if !url.is_empty() => RpcTarget::Custom(url.to_string()),
                _ => RpcTarget::Devnet,
            },
            _ => RpcTarget::Devnet,
        }
    }

    /// Resolve the RPC endpoint URL for this target.
    pub fn url(&self, helius_api_key: Option<&str>) -> String {
        match self {
            RpcTarget::Devnet => match helius_api_key {
                Some(key) => format!("https://devnet.helius-rpc.com/?api-key={key}"),
                None => "https://api.devnet.solana.com".to_string(),
            },
            RpcTarget::Mainnet => match helius_api_key {
                Some(key) => format!("https://mainnet.helius-rpc.com/?api-key={key}"),
                None => "https://api.mainnet-beta.solana.com".to_string(),
            },
            RpcTarget::Custom(url) => url.clone(),
        }
    }

    /// Upper-case label used in user-facing scan summaries.
    pub fn label(&self) -> &str {
        match self {
            RpcTarget::Devnet => "DEVNET",
            RpcTarget::Mainnet => "MAINNET",
            RpcTarget::Custom(_) => "CUSTOM",
        }
    }
}

impl Default for RpcTarget {
    fn default() -> Self {
        RpcTarget::Devnet
    }
}

/// Render a lamport delta as the fixed six-decimal SOL string used in
/// detection events, e.g. `+2.000000`.
pub fn format_sol_delta(lamports: u64) -> String {
    format!("+{:.6}", lamports_to_sol(lamports))
}

/// Current UTC time in milliseconds, the timestamp unit for all events.
pub fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_target_urls() {
        assert_eq!(RpcTarget::Devnet.url(None), "https://api.devnet.solana.com");
        assert_eq!(
            RpcTarget::Mainnet.url(None),
            "https://api.mainnet-beta.solana.com"
        );
        assert_eq!(
            RpcTarget::Devnet.url(Some("abc")),
            "https://devnet.helius-rpc.com/?api-key=abc"
        );
        assert_eq!(
            RpcTarget::Custom("http://localhost:8899".into()).url(Some("abc")),
            "http://localhost:8899"
        );
    }

    #[test]
    fn test_from_parts_falls_back_to_devnet() {
        assert_eq!(RpcTarget::from_parts("mainnet", None), RpcTarget::Mainnet);
        assert_eq!(RpcTarget::from_parts("custom", None), RpcTarget::Devnet);
        assert_eq!(RpcTarget::from_parts("custom", Some("")), RpcTarget::Devnet);
        assert_eq!(
            RpcTarget::from_parts("custom", Some("http://x")),
            RpcTarget::Custom("http://x".into())
        );
        assert_eq!(RpcTarget::from_parts("unknown", None), RpcTarget::Devnet);
    }

    #[test]
    fn test_format_sol_delta() {
        assert_eq!(format_sol_delta(2_000_000_000), "+2.000000");
        assert_eq!(format_sol_delta(0), "+0.000000");
        assert_eq!(format_sol_delta(1_234_567), "+0.001235");
    }
}
