//! Byte-exact close/drain instruction construction.
//!
//! Both encodings are protocol-fixed and must match the on-chain program
//! ABIs bit for bit: the token program's `CloseAccount` is a single opcode
//! byte with no payload; the system program's `Transfer` is a little-endian
//! u32 opcode followed by a little-endian u64 lamport amount.

use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;

use crate::types::TOKEN_PROGRAM_ID;

/// SPL token program `CloseAccount` opcode.
const TOKEN_CLOSE_ACCOUNT: u8 = 9;

/// System program `Transfer` opcode.
const SYSTEM_TRANSFER: u32 = 2;

/// Close a token account, sending its rent lamports to `destination`.
/// The authority signs; the account being closed does not.
pub fn close_token_account(
    account: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
) -> Instruction {
    Instruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*account, false),
            AccountMeta::new(*destination, false),
            AccountMeta::new_readonly(*authority, true),
        ],
        data: vec![TOKEN_CLOSE_ACCOUNT],
    }
}

/// Drain a system account by transferring its full balance to
/// `destination`. The source account signs for itself.
pub fn drain_system_account(
    source: &Pubkey,
    destination: &Pubkey,
    lamports: u64,
) -> Instruction {
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());
    Instruction {
        program_id: system_program::id(),
        accounts: vec![
            AccountMeta::new(*source, true),
            AccountMeta::new(*destination, false),
        ],
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::system_instruction;

    #[test]
    fn test_close_token_account_layout() {
        let account = Pubkey::new_unique();
        let destination = Pubkey::new_unique();
        let authority = Pubkey::new_unique();

        let ix = close_token_account(&account, &destination, &authority);

        assert_eq!(ix.program_id, TOKEN_PROGRAM_ID);
        assert_eq!(ix.data, vec![9]);
        assert_eq!(ix.accounts.len(), 3);

        assert_eq!(ix.accounts[0].pubkey, account);
        assert!(ix.accounts[0].is_writable);
        assert!(!ix.accounts[0].is_signer);

        assert_eq!(ix.accounts[1].pubkey, destination);
        assert!(ix.accounts[1].is_writable);
        assert!(!ix.accounts[1].is_signer);

        assert_eq!(ix.accounts[2].pubkey, authority);
        assert!(!ix.accounts[2].is_writable);
        assert!(ix.accounts[2].is_signer);
    }

    #[test]
    fn test_drain_encodes_transfer_bytes() {
        let source = Pubkey::new_unique();
        let destination = Pubkey::new_unique();
        let lamports = 0x0102_0304_0506_0708u64;

        let ix = drain_system_account(&source, &destination, lamports);

        let mut expected = vec![2, 0, 0, 0];
        expected.extend_from_slice(&lamports.to_le_bytes());
        assert_eq!(ix.data, expected);
        assert_eq!(ix.program_id, system_program::id());

        assert_eq!(ix.accounts[0].pubkey, source);
        assert!(ix.accounts[0].is_signer);
        assert!(ix.accounts[0].is_writable);
        assert_eq!(ix.accounts[1].pubkey, destination);
        assert!(!ix.accounts[1].is_signer);
        assert!(ix.accounts[1].is_writable);
    }

    #[test]
    fn test_drain_matches_sdk_transfer() {
        let source = Pubkey::new_unique();
        let destination = Pubkey::new_unique();

        let ours = drain_system_account(&source, &destination, 987_654_321);
        let sdk = system_instruction::transfer(&source, &destination, 987_654_321);

        assert_eq!(ours.program_id, sdk.program_id);
        assert_eq!(ours.data, sdk.data);
        assert_eq!(ours.accounts, sdk.accounts);
    }
}
