//! The reclaim engine: validates ownership, builds the kind-appropriate
//! close/drain instruction, signs, submits, and updates the shared stats.
//!
//! Every failure path is a typed [`ReclaimError`]; refusals (wrong
//! authority, residual token balance, missing account) are expected
//! user-input outcomes, not faults, and never reach the chain. A call moves
//! through parsing, validating, building, signing and submitting; there are
//! no automatic retries.

use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use solana_sdk::message::{v0, VersionedMessage};
use solana_sdk::native_token::lamports_to_sol;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::VersionedTransaction;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::chain::ChainReader;
use crate::reclaim::account_kind::{classify_account, AccountKind, ClassifyError};
use crate::reclaim::credential::{
    authority_address, decode_credential, signing_keypair, CredentialError,
};
use crate::reclaim::instructions::{close_token_account, drain_system_account};
use crate::stats::StatsAggregator;

/// Why a reclaim did not happen. Display messages are user-facing and name
/// the offending party or blocking quantity.
#[derive(Debug, Error)]
pub enum ReclaimError {
    #[error(transparent)]
    InvalidCredential(#[from] CredentialError),
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("account not found or already closed")]
    AccountNotFound,
    #[error("authority {provided} does not control {account}; its authority is {required}")]
    NotAuthorized {
        account: String,
        required: String,
        provided: String,
    },
    #[error("token account still holds {amount} token base units - transfer them out before closing")]
    NonZeroBalance { amount: u64 },
    #[error("account owned by program {0} - cannot auto-reclaim")]
    UnsupportedOwner(Pubkey),
    #[error("upstream unavailable: {0}")]
    Upstream(String),
    #[error("reclaim failed: {0}")]
    Failed(String),
}

/// Successful reclaim: what was recovered and the submitted signature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReclaimReceipt {
    pub reclaimed_lamports: u64,
    pub reclaimed_sol: f64,
    pub signature: String,
}

/// Wire shape of a reclaim outcome. Callers branch on `success`, never on
/// transport status - refusals are payloads, not errors.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReclaimResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx: Option<String>,
}

/// Builds, signs and submits reclaim transactions over a [`ChainReader`].
pub struct ReclaimEngine<R> {
    reader: R,
    stats: Arc<StatsAggregator>,
}

impl<R: ChainReader> ReclaimEngine<R> {
    pub fn new(reader: R, stats: Arc<StatsAggregator>) -> Self {
        Self { reader, stats }
    }

    /// Reclaim the rent held by `target_account`, sending it to
    /// `destination`. The credential must be the authority entitled to close
    /// the account; every guard below refuses before anything is signed.
    pub async fn reclaim(
        &self,
        target_account: &str,
        destination: &str,
        credential: &str,
    ) -> Result<ReclaimReceipt, ReclaimError> {
        debug!(phase = "parsing", account = %target_account);
        let target = Pubkey::from_str(target_account)
            .map_err(|_| ReclaimError::InvalidAddress(target_account.to_string()))?;
        let destination = Pubkey::from_str(destination)
            .map_err(|_| ReclaimError::InvalidAddress(destination.to_string()))?;
        let credential_bytes = decode_credential(credential)?;
        let authority = authority_address(&credential_bytes);

        info!(account = %target, authority = %authority, "attempting reclaim");

        debug!(phase = "validating");
        let account = self
            .reader
            .account_state(&target)
            .await
            .map_err(|e| ReclaimError::Upstream(format!("{e:#}")))?
            .ok_or(ReclaimError::AccountNotFound)?;
        let lamports = account.lamports;

        let kind = classify_account(&account).map_err(|e| match e {
            ClassifyError::UnsupportedOwner(program) => ReclaimError::UnsupportedOwner(program),
            ClassifyError::MalformedTokenAccount { len } => {
                ReclaimError::Failed(format!("unexpected token account layout ({len} bytes)"))
            }
        })?;

        debug!(phase = "building", ?kind, lamports);
        let instruction = match kind {
            AccountKind::TokenOwned { owner, amount } => {
                if owner != authority {
                    return Err(ReclaimError::NotAuthorized {
                        account: target.to_string(),
                        required: owner.to_string(),
                        provided: authority.to_string(),
                    });
                }
                // Refuse rather than destroy or silently sweep value:
                // moving a residual token balance needs the destination's
                // associated token account, which this engine does not
                // derive or create.
                if amount > 0 {
                    return Err(ReclaimError::NonZeroBalance { amount });
                }
                close_token_account(&target, &destination, &authority)
            }
            AccountKind::SystemOwned => {
                // A system account is its own authority.
                if target != authority {
                    return Err(ReclaimError::NotAuthorized {
                        account: target.to_string(),
                        required: target.to_string(),
                        provided: authority.to_string(),
                    });
                }
                drain_system_account(&target, &destination, lamports)
            }
        };

        let blockhash = self
            .reader
            .latest_blockhash()
            .await
            .map_err(|e| ReclaimError::Upstream(format!("{e:#}")))?;
        let message = v0::Message::try_compile(&authority, &[instruction], &[], blockhash)
            .map_err(|e| ReclaimError::Failed(format!("could not compile message: {e}")))?;

        debug!(phase = "signing");
        let keypair = signing_keypair(&credential_bytes)?;
        let transaction = VersionedTransaction::try_new(VersionedMessage::V0(message), &[&keypair])
            .map_err(|e| ReclaimError::Failed(format!("could not sign transaction: {e}")))?;

        debug!(phase = "submitting");
        let signature = self
            .reader
            .submit_transaction(&transaction)
            .await
            .map_err(|e| ReclaimError::Upstream(format!("{e:#}")))?;

        let sol = lamports_to_sol(lamports);
        self.stats.record_reclaim(sol).await;
        info!(signature = %signature, sol, "reclaim submitted");

        Ok(ReclaimReceipt {
            reclaimed_lamports: lamports,
            reclaimed_sol: sol,
            signature: signature.to_string(),
        })
    }

    /// Boundary wrapper producing the wire shape; never fails outward.
    pub async fn reclaim_response(
        &self,
        target_account: &str,
        destination: &str,
        credential: &str,
    ) -> ReclaimResponse {
        match self.reclaim(target_account, destination, credential).await {
            Ok(receipt) => ReclaimResponse {
                success: true,
                message: format!("Reclaimed {:.6} SOL", receipt.reclaimed_sol),
                amount: Some(receipt.reclaimed_sol),
                tx: Some(receipt.signature),
            },
            Err(e) => {
                warn!(account = %target_account, "reclaim refused: {e}");
                ReclaimResponse {
                    success: false,
                    message: e.to_string(),
                    amount: None,
                    tx: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_authorized_names_both_parties() {
        let required = Pubkey::new_unique();
        let provided = Pubkey::new_unique();
        let err = ReclaimError::NotAuthorized {
            account: Pubkey::new_unique().to_string(),
            required: required.to_string(),
            provided: provided.to_string(),
        };
        let message = err.to_string();
        assert!(message.contains(&required.to_string()));
        assert!(message.contains(&provided.to_string()));
    }

    #[test]
    fn test_non_zero_balance_names_blocking_amount() {
        let message = ReclaimError::NonZeroBalance { amount: 1234 }.to_string();
        assert!(message.contains("1234"));
    }

    #[test]
    fn test_response_wire_shape() {
        let success = ReclaimResponse {
            success: true,
            message: "Reclaimed 0.002000 SOL".into(),
            amount: Some(0.002),
            tx: Some("sig".into()),
        };
        let json = serde_json::to_value(&success).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["amount"], 0.002);
        assert_eq!(json["tx"], "sig");

        let refusal = ReclaimResponse {
            success: false,
            message: "account not found or already closed".into(),
            amount: None,
            tx: None,
        };
        let json = serde_json::to_value(&refusal).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("amount").is_none());
        assert!(json.get("tx").is_none());
    }
}
