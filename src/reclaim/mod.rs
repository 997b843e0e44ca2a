//! Reclaim component: authority validation, protocol-correct instruction
//! construction, signing and submission.

pub mod account_kind;
pub mod credential;
pub mod engine;
pub mod instructions;

pub use account_kind::{classify_account, AccountKind, ClassifyError};
pub use credential::{authority_address, decode_credential, signing_keypair, CredentialError};
pub use engine::{ReclaimEngine, ReclaimError, ReclaimReceipt, ReclaimResponse};
pub use instructions::{close_token_account, drain_system_account};
