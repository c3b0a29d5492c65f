//! Token metadata interface: the name/symbol/URI record that Token-2022
//! stores inside the mint account itself.
//!
//! Records are Borsh-encoded. Strings are a u32 LE byte length followed by
//! UTF-8 bytes; an absent update authority is written as 32 zero bytes.

use crate::error::SolError;
use crate::transaction::{SolAccountMeta, SolInstruction};

/// `sha256("spl_token_metadata_interface:initialize_account")[..8]`
pub const INITIALIZE_DISCRIMINATOR: [u8; 8] = [210, 225, 30, 162, 88, 184, 77, 141];

/// Size of the TLV type tag preceding an extension in account data.
pub const TLV_TYPE_SIZE: usize = 2;
/// Size of the TLV length field preceding an extension in account data.
pub const TLV_LENGTH_SIZE: usize = 2;

/// On-chain metadata for a fungible token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub update_authority: Option<[u8; 32]>,
    pub mint: [u8; 32],
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub additional_metadata: Vec<(String, String)>,
}

impl TokenMetadata {
    pub fn new(mint: [u8; 32], name: &str, symbol: &str, uri: &str) -> Self {
        Self {
            update_authority: None,
            mint,
            name: name.to_string(),
            symbol: symbol.to_string(),
            uri: uri.to_string(),
            additional_metadata: Vec::new(),
        }
    }

    /// Borsh-encode the record as it is laid out on chain.
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.packed_len());
        buf.extend_from_slice(&self.update_authority.unwrap_or([0u8; 32]));
        buf.extend_from_slice(&self.mint);
        put_str(&mut buf, &self.name);
        put_str(&mut buf, &self.symbol);
        put_str(&mut buf, &self.uri);
        buf.extend_from_slice(&(self.additional_metadata.len() as u32).to_le_bytes());
        for (key, value) in &self.additional_metadata {
            put_str(&mut buf, key);
            put_str(&mut buf, value);
        }
        buf
    }

    pub fn packed_len(&self) -> usize {
        let strings: usize = [&self.name, &self.symbol, &self.uri]
            .iter()
            .map(|s| 4 + s.len())
            .sum();
        let extra: usize = self
            .additional_metadata
            .iter()
            .map(|(k, v)| 8 + k.len() + v.len())
            .sum();
        32 + 32 + strings + 4 + extra
    }

    /// Bytes the record occupies in the mint account, TLV header included.
    pub fn tlv_len(&self) -> usize {
        TLV_TYPE_SIZE + TLV_LENGTH_SIZE + self.packed_len()
    }
}

fn put_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
}

/// Build the metadata-interface `Initialize` instruction.
///
/// `metadata` is the account that will hold the record; for Token-2022 with a
/// self-referencing metadata pointer it is the mint itself.
#[allow(clippy::too_many_arguments)]
pub fn initialize(
    program_id: &[u8; 32],
    metadata: &[u8; 32],
    update_authority: &[u8; 32],
    mint: &[u8; 32],
    mint_authority: &[u8; 32],
    name: &str,
    symbol: &str,
    uri: &str,
) -> Result<SolInstruction, SolError> {
    if name.trim().is_empty() {
        return Err(SolError::InstructionBuildError("token name is empty".into()));
    }
    if symbol.trim().is_empty() {
        return Err(SolError::InstructionBuildError("token symbol is empty".into()));
    }

    let mut data = Vec::with_capacity(8 + 12 + name.len() + symbol.len() + uri.len());
    data.extend_from_slice(&INITIALIZE_DISCRIMINATOR);
    put_str(&mut data, name);
    put_str(&mut data, symbol);
    put_str(&mut data, uri);

    Ok(SolInstruction {
        program_id: *program_id,
        accounts: vec![
            SolAccountMeta::writable(*metadata, false),
            SolAccountMeta::readonly(*update_authority, false),
            SolAccountMeta::readonly(*mint, false),
            SolAccountMeta::readonly(*mint_authority, true),
        ],
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::{Digest, Sha256};

    #[test]
    fn discriminator_matches_interface_hash() {
        let hash = Sha256::digest(b"spl_token_metadata_interface:initialize_account");
        assert_eq!(&hash[..8], &INITIALIZE_DISCRIMINATOR);
    }

    #[test]
    fn pack_layout_for_simple_token() {
        let md = TokenMetadata::new([9u8; 32], "Foo", "FOO", "https://x.io/a.png");
        let packed = md.pack();

        assert_eq!(&packed[..32], &[0u8; 32]);
        assert_eq!(&packed[32..64], &[9u8; 32]);
        assert_eq!(&packed[64..68], &3u32.to_le_bytes());
        assert_eq!(&packed[68..71], b"Foo");
        assert_eq!(packed.len(), md.packed_len());
        assert_eq!(&packed[packed.len() - 4..], &[0, 0, 0, 0]);
    }

    #[test]
    fn packed_len_counts_additional_metadata() {
        let mut md = TokenMetadata::new([1u8; 32], "A", "B", "");
        let base = md.packed_len();
        md.additional_metadata.push(("k".into(), "vv".into()));
        assert_eq!(md.packed_len(), base + 4 + 1 + 4 + 2);
        assert_eq!(md.pack().len(), md.packed_len());
    }

    #[test]
    fn tlv_len_adds_header() {
        let md = TokenMetadata::new([1u8; 32], "Foo", "FOO", "");
        // 64 keys + (4+3) + (4+3) + (4+0) + 4 additional = 86, plus 4 TLV bytes.
        assert_eq!(md.packed_len(), 86);
        assert_eq!(md.tlv_len(), 90);
    }

    #[test]
    fn initialize_instruction_encoding() {
        let program = [6u8; 32];
        let mint = [2u8; 32];
        let authority = [3u8; 32];
        let ix = initialize(&program, &mint, &authority, &mint, &authority, "Foo", "FOO", "u")
            .unwrap();

        assert_eq!(ix.program_id, program);
        assert_eq!(&ix.data[..8], &INITIALIZE_DISCRIMINATOR);
        assert_eq!(ix.data.len(), 8 + 7 + 7 + 5);
        assert_eq!(ix.accounts.len(), 4);
        assert!(ix.accounts[0].is_writable);
        assert!(ix.accounts[3].is_signer);
        assert!(!ix.accounts[1].is_signer);
    }

    #[test]
    fn initialize_rejects_blank_name() {
        let err = initialize(&[6u8; 32], &[2u8; 32], &[3u8; 32], &[2u8; 32], &[3u8; 32], " ", "S", "")
            .unwrap_err();
        assert!(err.to_string().contains("name is empty"));
    }
}
