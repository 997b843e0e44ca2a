//! Classification of a reclaim target by its owning program.

use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;

use crate::types::TOKEN_PROGRAM_ID;

/// SPL token account layout offsets: mint [0..32), owner [32..64),
/// amount u64-LE [64..72).
const TOKEN_OWNER_OFFSET: usize = 32;
const TOKEN_AMOUNT_OFFSET: usize = 64;
const TOKEN_AMOUNT_END: usize = TOKEN_AMOUNT_OFFSET + 8;

/// The two account shapes the reclaim engine knows how to close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountKind {
    /// Plain system account; drained by transferring its full balance,
    /// which on Solana is behaviorally equivalent to closing it.
    SystemOwned,
    /// SPL token account; closed via the token program, provided its token
    /// balance is zero.
    TokenOwned {
        /// The wallet entitled to move funds and close the account.
        owner: Pubkey,
        /// Token balance in base units.
        amount: u64,
    },
}

/// What kept an account from being classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    /// Owned by a program the engine does not handle.
    UnsupportedOwner(Pubkey),
    /// Token-program account whose data does not follow the expected layout.
    MalformedTokenAccount { len: usize },
}

/// Derive the account kind from the owning program and raw data layout.
pub fn classify_account(account: &Account) -> Result<AccountKind, ClassifyError> {
    if account.owner == system_program::id() {
        return Ok(AccountKind::SystemOwned);
    }

    if account.owner == TOKEN_PROGRAM_ID {
        if account.data.len() < TOKEN_AMOUNT_END {
            return Err(ClassifyError::MalformedTokenAccount {
                len: account.data.len(),
            });
        }
        let mut owner = [0u8; 32];
        owner.copy_from_slice(&account.data[TOKEN_OWNER_OFFSET..TOKEN_AMOUNT_OFFSET]);
        let mut amount = [0u8; 8];
        amount.copy_from_slice(&account.data[TOKEN_AMOUNT_OFFSET..TOKEN_AMOUNT_END]);
        return Ok(AccountKind::TokenOwned {
            owner: Pubkey::new_from_array(owner),
            amount: u64::from_le_bytes(amount),
        });
    }

    Err(ClassifyError::UnsupportedOwner(account.owner))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 165-byte token account with the given owner and amount.
    fn token_account_data(owner: &Pubkey, amount: u64) -> Vec<u8> {
        let mut data = vec![0u8; 165];
        data[TOKEN_OWNER_OFFSET..TOKEN_AMOUNT_OFFSET].copy_from_slice(owner.as_ref());
        data[TOKEN_AMOUNT_OFFSET..TOKEN_AMOUNT_END].copy_from_slice(&amount.to_le_bytes());
        data
    }

    #[test]
    fn test_system_owned() {
        let account = Account {
            lamports: 1_000_000,
            data: vec![],
            owner: system_program::id(),
            executable: false,
            rent_epoch: 0,
        };
        assert_eq!(classify_account(&account), Ok(AccountKind::SystemOwned));
    }

    #[test]
    fn test_token_owned_parses_owner_and_amount() {
        let wallet = Pubkey::new_unique();
        let account = Account {
            lamports: 2_039_280,
            data: token_account_data(&wallet, 42),
            owner: TOKEN_PROGRAM_ID,
            executable: false,
            rent_epoch: 0,
        };
        assert_eq!(
            classify_account(&account),
            Ok(AccountKind::TokenOwned {
                owner: wallet,
                amount: 42
            })
        );
    }

    #[test]
    fn test_short_token_data_is_malformed() {
        let account = Account {
            lamports: 1,
            data: vec![0u8; 40],
            owner: TOKEN_PROGRAM_ID,
            executable: false,
            rent_epoch: 0,
        };
        assert_eq!(
            classify_account(&account),
            Err(ClassifyError::MalformedTokenAccount { len: 40 })
        );
    }

    #[test]
    fn test_foreign_program_unsupported() {
        let program = Pubkey::new_unique();
        let account = Account {
            lamports: 1,
            data: vec![],
            owner: program,
            executable: false,
            rent_epoch: 0,
        };
        assert_eq!(
            classify_account(&account),
            Err(ClassifyError::UnsupportedOwner(program))
        );
    }
}
