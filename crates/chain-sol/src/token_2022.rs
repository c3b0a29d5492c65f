//! Token-2022 operations: mint sizing, mint initialization with a metadata
//! pointer, associated token accounts and minting.
//!
//! Implemented without the `spl-token-2022` or `solana-sdk` crates; the
//! instruction layouts mirror the on-chain program's unpacking code.

use sha2::{Digest, Sha256};

use crate::error::SolError;
use crate::system_program::SYSTEM_PROGRAM_ID;
use crate::transaction::{SolAccountMeta, SolInstruction};

// ---------------------------------------------------------------------------
// Well-known program IDs
// ---------------------------------------------------------------------------

/// Token-2022 Program ID: `TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb`
pub const TOKEN_2022_PROGRAM_ID: [u8; 32] = [
    0x06, 0xdd, 0xf6, 0xe1, 0xee, 0x75, 0x8f, 0xde, 0x18, 0x42, 0x5d, 0xbc, 0xe4, 0x6c, 0xcd,
    0xda, 0xb6, 0x1a, 0xfc, 0x4d, 0x83, 0xb9, 0x0d, 0x27, 0xfe, 0xbd, 0xf9, 0x28, 0xd8, 0xa1,
    0x8b, 0xfc,
];

/// Associated Token Account Program ID: `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_TOKEN_PROGRAM_ID: [u8; 32] = [
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e, 0x0d,
    0x83, 0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8, 0xdb, 0xe9,
    0xf8, 0x59,
];

/// The string appended to PDA derivation: "ProgramDerivedAddress".
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

// ---------------------------------------------------------------------------
// Account sizing
// ---------------------------------------------------------------------------

/// Size of a mint with no extensions.
pub const MINT_SIZE: usize = 82;
/// Extensions are laid out after padding the mint up to a token account's size.
const BASE_ACCOUNT_LENGTH: usize = 165;
const ACCOUNT_TYPE_SIZE: usize = 1;
const TLV_HEADER_SIZE: usize = 4;

/// Mint extensions this crate knows how to size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionType {
    MetadataPointer,
}

impl ExtensionType {
    fn data_len(self) -> usize {
        match self {
            // authority + metadata address
            ExtensionType::MetadataPointer => 64,
        }
    }
}

/// Account size for a mint carrying `extensions`.
pub fn mint_len(extensions: &[ExtensionType]) -> usize {
    if extensions.is_empty() {
        return MINT_SIZE;
    }
    let tlv: usize = extensions
        .iter()
        .map(|e| TLV_HEADER_SIZE + e.data_len())
        .sum();
    BASE_ACCOUNT_LENGTH + ACCOUNT_TYPE_SIZE + tlv
}

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

const MINT_TO_IX: u8 = 7;
const INITIALIZE_MINT2_IX: u8 = 20;
const METADATA_POINTER_EXTENSION_IX: u8 = 39;
const METADATA_POINTER_INITIALIZE_IX: u8 = 0;

/// Build `MetadataPointerExtension::Initialize`.
///
/// Must run before `InitializeMint2` on the same account. Absent values are
/// encoded as the zero key.
pub fn initialize_metadata_pointer(
    mint: &[u8; 32],
    authority: Option<&[u8; 32]>,
    metadata_address: Option<&[u8; 32]>,
) -> SolInstruction {
    let mut data = Vec::with_capacity(66);
    data.push(METADATA_POINTER_EXTENSION_IX);
    data.push(METADATA_POINTER_INITIALIZE_IX);
    data.extend_from_slice(authority.unwrap_or(&[0u8; 32]));
    data.extend_from_slice(metadata_address.unwrap_or(&[0u8; 32]));

    SolInstruction {
        program_id: TOKEN_2022_PROGRAM_ID,
        accounts: vec![SolAccountMeta::writable(*mint, false)],
        data,
    }
}

/// Build `InitializeMint2` (no rent sysvar account needed).
pub fn initialize_mint2(
    mint: &[u8; 32],
    decimals: u8,
    mint_authority: &[u8; 32],
    freeze_authority: Option<&[u8; 32]>,
) -> SolInstruction {
    let mut data = Vec::with_capacity(67);
    data.push(INITIALIZE_MINT2_IX);
    data.push(decimals);
    data.extend_from_slice(mint_authority);
    match freeze_authority {
        Some(key) => {
            data.push(1);
            data.extend_from_slice(key);
        }
        None => {
            data.push(0);
            data.extend_from_slice(&[0u8; 32]);
        }
    }

    SolInstruction {
        program_id: TOKEN_2022_PROGRAM_ID,
        accounts: vec![SolAccountMeta::writable(*mint, false)],
        data,
    }
}

/// Build `MintTo`, minting `amount` base units into `destination`.
pub fn mint_to(
    mint: &[u8; 32],
    destination: &[u8; 32],
    authority: &[u8; 32],
    amount: u64,
) -> Result<SolInstruction, SolError> {
    if amount == 0 {
        return Err(SolError::InstructionBuildError(
            "mint amount must be > 0".into(),
        ));
    }

    let mut data = Vec::with_capacity(9);
    data.push(MINT_TO_IX);
    data.extend_from_slice(&amount.to_le_bytes());

    Ok(SolInstruction {
        program_id: TOKEN_2022_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*mint, false),
            SolAccountMeta::writable(*destination, false),
            SolAccountMeta::readonly(*authority, true),
        ],
        data,
    })
}

/// Build the Associated Token Account program's `Create` instruction.
///
/// `associated_account` must be the address returned by
/// [`derive_associated_token_address`] for `owner` and `mint`.
pub fn create_associated_token_account(
    payer: &[u8; 32],
    associated_account: &[u8; 32],
    owner: &[u8; 32],
    mint: &[u8; 32],
) -> SolInstruction {
    SolInstruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*payer, true),
            SolAccountMeta::writable(*associated_account, false),
            SolAccountMeta::readonly(*owner, false),
            SolAccountMeta::readonly(*mint, false),
            SolAccountMeta::readonly(SYSTEM_PROGRAM_ID, false),
            SolAccountMeta::readonly(TOKEN_2022_PROGRAM_ID, false),
        ],
        // Empty data selects the legacy `Create` variant.
        data: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Associated Token Account (PDA) derivation
// ---------------------------------------------------------------------------

/// Derive the Token-2022 associated token account for a wallet + mint pair.
///
/// Seeds: `[wallet, token_2022_program_id, mint]` under the Associated Token
/// Account program.
pub fn derive_associated_token_address(
    wallet: &[u8; 32],
    mint: &[u8; 32],
) -> Result<[u8; 32], SolError> {
    find_program_address(
        &[wallet.as_ref(), &TOKEN_2022_PROGRAM_ID, mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .map(|(address, _bump)| address)
}

/// Find a valid Program Derived Address for the given seeds and program.
///
/// Bump seeds are tried from 255 down to 0; the first hash that is NOT a
/// valid Ed25519 point wins.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &[u8; 32],
) -> Result<([u8; 32], u8), SolError> {
    for bump in (0u8..=255).rev() {
        if let Some(address) = try_create_program_address(seeds, &[bump], program_id) {
            return Ok((address, bump));
        }
    }

    Err(SolError::InvalidAddress(
        "could not find valid PDA bump seed".into(),
    ))
}

fn try_create_program_address(
    seeds: &[&[u8]],
    bump_seed: &[u8],
    program_id: &[u8; 32],
) -> Option<[u8; 32]> {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(bump_seed);
    hasher.update(program_id);
    hasher.update(PDA_MARKER);

    let hash: [u8; 32] = hasher.finalize().into();
    if is_on_curve(&hash) {
        return None;
    }
    Some(hash)
}

fn is_on_curve(bytes: &[u8; 32]) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
        .decompress()
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address;

    // -- Constants -----------------------------------------------------------

    #[test]
    fn token_2022_program_id_roundtrip() {
        assert_eq!(
            address::bytes_to_address(&TOKEN_2022_PROGRAM_ID),
            "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb"
        );
    }

    #[test]
    fn associated_token_program_id_roundtrip() {
        assert_eq!(
            address::bytes_to_address(&ASSOCIATED_TOKEN_PROGRAM_ID),
            "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL"
        );
    }

    // -- Sizing --------------------------------------------------------------

    #[test]
    fn plain_mint_len() {
        assert_eq!(mint_len(&[]), 82);
    }

    #[test]
    fn metadata_pointer_mint_len() {
        assert_eq!(mint_len(&[ExtensionType::MetadataPointer]), 234);
    }

    // -- Instruction encodings ---------------------------------------------

    #[test]
    fn metadata_pointer_encoding() {
        let mint = [1u8; 32];
        let authority = [2u8; 32];
        let ix = initialize_metadata_pointer(&mint, Some(&authority), Some(&mint));

        assert_eq!(ix.program_id, TOKEN_2022_PROGRAM_ID);
        assert_eq!(ix.data.len(), 66);
        assert_eq!(&ix.data[..2], &[39, 0]);
        assert_eq!(&ix.data[2..34], &authority);
        assert_eq!(&ix.data[34..], &mint);
        assert_eq!(ix.accounts, vec![SolAccountMeta::writable(mint, false)]);
    }

    #[test]
    fn metadata_pointer_without_authority_is_zeroed() {
        let ix = initialize_metadata_pointer(&[1u8; 32], None, None);
        assert!(ix.data[2..].iter().all(|b| *b == 0));
    }

    #[test]
    fn initialize_mint2_without_freeze_authority() {
        let mint = [1u8; 32];
        let authority = [2u8; 32];
        let ix = initialize_mint2(&mint, 9, &authority, None);

        assert_eq!(ix.data.len(), 67);
        assert_eq!(ix.data[0], 20);
        assert_eq!(ix.data[1], 9);
        assert_eq!(&ix.data[2..34], &authority);
        assert_eq!(ix.data[34], 0);
    }

    #[test]
    fn initialize_mint2_with_freeze_authority() {
        let freeze = [3u8; 32];
        let ix = initialize_mint2(&[1u8; 32], 6, &[2u8; 32], Some(&freeze));
        assert_eq!(ix.data[34], 1);
        assert_eq!(&ix.data[35..], &freeze);
    }

    #[test]
    fn mint_to_encoding_and_roles() {
        let ix = mint_to(&[1u8; 32], &[2u8; 32], &[3u8; 32], 100_000_000_000).unwrap();

        assert_eq!(ix.data[0], 7);
        assert_eq!(
            u64::from_le_bytes(ix.data[1..9].try_into().unwrap()),
            100_000_000_000
        );
        assert!(ix.accounts[0].is_writable && !ix.accounts[0].is_signer);
        assert!(ix.accounts[1].is_writable && !ix.accounts[1].is_signer);
        assert!(ix.accounts[2].is_signer && !ix.accounts[2].is_writable);
    }

    #[test]
    fn mint_to_zero_amount_fails() {
        assert!(mint_to(&[1u8; 32], &[2u8; 32], &[3u8; 32], 0).is_err());
    }

    #[test]
    fn create_ata_account_list() {
        let payer = [1u8; 32];
        let ata = [2u8; 32];
        let mint = [4u8; 32];
        let ix = create_associated_token_account(&payer, &ata, &payer, &mint);

        assert_eq!(ix.program_id, ASSOCIATED_TOKEN_PROGRAM_ID);
        assert!(ix.data.is_empty());
        assert_eq!(ix.accounts.len(), 6);
        assert!(ix.accounts[0].is_signer);
        assert_eq!(ix.accounts[1], SolAccountMeta::writable(ata, false));
        assert_eq!(ix.accounts[5].pubkey, TOKEN_2022_PROGRAM_ID);
    }

    // -- PDA derivation ------------------------------------------------------

    #[test]
    fn ata_is_off_curve_and_deterministic() {
        let wallet = [0xAAu8; 32];
        let mint = [0xBBu8; 32];

        let a = derive_associated_token_address(&wallet, &mint).unwrap();
        let b = derive_associated_token_address(&wallet, &mint).unwrap();
        assert_eq!(a, b);
        assert!(!is_on_curve(&a));
    }

    #[test]
    fn ata_depends_on_wallet_and_mint() {
        let mint = [0xFFu8; 32];
        let a = derive_associated_token_address(&[1u8; 32], &mint).unwrap();
        let b = derive_associated_token_address(&[2u8; 32], &mint).unwrap();
        let c = derive_associated_token_address(&[1u8; 32], &[0xEEu8; 32]).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn is_on_curve_accepts_basepoint() {
        let basepoint: [u8; 32] = [
            0x58, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
            0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
            0x66, 0x66, 0x66, 0x66,
        ];
        assert!(is_on_curve(&basepoint));
    }
}
