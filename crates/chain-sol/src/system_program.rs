//! System Program instructions: account creation and native transfers.

use crate::transaction::{SolAccountMeta, SolInstruction};

/// The System Program public key: 32 zero bytes.
/// Base58: `11111111111111111111111111111111`
pub const SYSTEM_PROGRAM_ID: [u8; 32] = [0u8; 32];

/// Lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

// System instructions are bincode-encoded enums: a u32 LE variant index
// followed by the variant's fields.
const CREATE_ACCOUNT_IX_INDEX: u32 = 0;
const TRANSFER_IX_INDEX: u32 = 2;

/// Build a `CreateAccount` instruction.
///
/// Funds `new_account` with `lamports`, allocates `space` bytes and assigns it
/// to `owner`. Both `payer` and `new_account` must sign.
pub fn create_account(
    payer: &[u8; 32],
    new_account: &[u8; 32],
    lamports: u64,
    space: u64,
    owner: &[u8; 32],
) -> SolInstruction {
    // u32 index + u64 lamports + u64 space + 32-byte owner = 52 bytes.
    let mut data = Vec::with_capacity(52);
    data.extend_from_slice(&CREATE_ACCOUNT_IX_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());
    data.extend_from_slice(&space.to_le_bytes());
    data.extend_from_slice(owner);

    SolInstruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*payer, true),
            SolAccountMeta::writable(*new_account, true),
        ],
        data,
    }
}

/// Build a `Transfer` instruction moving `lamports` from `from` to `to`.
pub fn transfer(from: &[u8; 32], to: &[u8; 32], lamports: u64) -> SolInstruction {
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&TRANSFER_IX_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    SolInstruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*from, true),
            SolAccountMeta::writable(*to, false),
        ],
        data,
    }
}
