//! Solana legacy transaction wire format and multi-signer signing.
//!
//! Transactions are built by hand, without `solana-sdk`:
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message:
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16
//!     instructions[]        (see below)
//!
//! Instruction:
//!   program_id_index        u8
//!   num_accounts            compact-u16
//!   account_indices         u8 * num_accounts
//!   data_len                compact-u16
//!   data                    u8 * data_len
//! ```
//!
//! A transaction may need several signers (the token launch batches a fresh
//! mint keypair with the wallet). Each signer fills its own slot through
//! [`SolTransaction::partial_sign`]; unsigned slots stay zeroed until then.

use ed25519_dalek::{Signature, VerifyingKey};

use crate::address::signature_to_string;
use crate::error::SolError;
use crate::keypair::SolKeypair;

/// Upper bound for a serialized transaction accepted by the cluster.
pub const PACKET_DATA_SIZE: usize = 1232;

// ---------------------------------------------------------------------------
// Compact-u16 encoding
// ---------------------------------------------------------------------------

/// Encode a `u16` value in Solana's compact-u16 format.
///
/// - Values 0..0x7f       -> 1 byte
/// - Values 0x80..0x3fff  -> 2 bytes
/// - Values 0x4000..      -> 3 bytes
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut val = value as u32;
    let mut out = Vec::with_capacity(3);

    loop {
        let mut byte = (val & 0x7f) as u8;
        val >>= 7;
        if val > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            break;
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

/// A single account reference in a Solana instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolAccountMeta {
    pub pubkey: [u8; 32],
    pub is_signer: bool,
    pub is_writable: bool,
}

impl SolAccountMeta {
    /// A writable account reference.
    pub fn writable(pubkey: [u8; 32], is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    /// A read-only account reference.
    pub fn readonly(pubkey: [u8; 32], is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// A Solana instruction (before it is compiled into a message).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolInstruction {
    pub program_id: [u8; 32],
    pub accounts: Vec<SolAccountMeta>,
    pub data: Vec<u8>,
}

/// A compiled instruction where account references are replaced by u8 indices
/// into the message's `account_keys` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A compiled legacy message: the bytes every signer signs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolMessage {
    /// All account keys referenced by the message, in canonical order:
    ///   1. writable signers (fee payer first)
    ///   2. read-only signers
    ///   3. writable non-signers
    ///   4. read-only non-signers
    pub account_keys: Vec<[u8; 32]>,
    pub num_required_signatures: u8,
    pub num_readonly_signed: u8,
    pub num_readonly_unsigned: u8,
    pub recent_blockhash: [u8; 32],
    pub compiled_instructions: Vec<CompiledInstruction>,
}

impl SolMessage {
    /// Public keys that must sign, in signature-slot order.
    pub fn signer_keys(&self) -> &[[u8; 32]] {
        &self.account_keys[..self.num_required_signatures as usize]
    }

    /// The fee payer, always the first account key.
    pub fn fee_payer(&self) -> [u8; 32] {
        self.account_keys[0]
    }
}

/// Compile instructions into a message paid for by `fee_payer`.
pub fn compile_message(
    instructions: &[SolInstruction],
    fee_payer: &[u8; 32],
    recent_blockhash: &[u8; 32],
) -> Result<SolMessage, SolError> {
    if instructions.is_empty() {
        return Err(SolError::TransactionBuildError(
            "transaction has no instructions".into(),
        ));
    }

    struct AccountEntry {
        pubkey: [u8; 32],
        is_signer: bool,
        is_writable: bool,
    }

    // Instruction account lists are tiny, a linear scan beats a map here.
    let mut entries: Vec<AccountEntry> = Vec::new();
    let mut upsert = |pubkey: [u8; 32], signer: bool, writable: bool| {
        if let Some(entry) = entries.iter_mut().find(|e| e.pubkey == pubkey) {
            entry.is_signer |= signer;
            entry.is_writable |= writable;
        } else {
            entries.push(AccountEntry {
                pubkey,
                is_signer: signer,
                is_writable: writable,
            });
        }
    };

    upsert(*fee_payer, true, true);
    for ix in instructions {
        for meta in &ix.accounts {
            upsert(meta.pubkey, meta.is_signer, meta.is_writable);
        }
        upsert(ix.program_id, false, false);
    }

    fn rank(e: &AccountEntry) -> u8 {
        match (e.is_signer, e.is_writable) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        }
    }
    // Stable sort: insertion order is kept within a category, so the fee
    // payer stays at index 0.
    entries.sort_by_key(rank);

    if entries.len() > u8::MAX as usize {
        return Err(SolError::TransactionBuildError(format!(
            "too many accounts: {}",
            entries.len()
        )));
    }

    let num_required_signatures = entries.iter().filter(|e| e.is_signer).count() as u8;
    let num_readonly_signed = entries
        .iter()
        .filter(|e| e.is_signer && !e.is_writable)
        .count() as u8;
    let num_readonly_unsigned = entries
        .iter()
        .filter(|e| !e.is_signer && !e.is_writable)
        .count() as u8;

    let account_keys: Vec<[u8; 32]> = entries.iter().map(|e| e.pubkey).collect();
    let index_of = |key: &[u8; 32]| -> Result<u8, SolError> {
        account_keys
            .iter()
            .position(|k| k == key)
            .map(|i| i as u8)
            .ok_or_else(|| SolError::TransactionBuildError("account not in account keys".into()))
    };

    let mut compiled = Vec::with_capacity(instructions.len());
    for ix in instructions {
        let account_indices = ix
            .accounts
            .iter()
            .map(|meta| index_of(&meta.pubkey))
            .collect::<Result<Vec<u8>, SolError>>()?;

        compiled.push(CompiledInstruction {
            program_id_index: index_of(&ix.program_id)?,
            account_indices,
            data: ix.data.clone(),
        });
    }

    Ok(SolMessage {
        account_keys,
        num_required_signatures,
        num_readonly_signed,
        num_readonly_unsigned,
        recent_blockhash: *recent_blockhash,
        compiled_instructions: compiled,
    })
}

/// Serialize a message (the bytes that get signed).
pub fn serialize_message(message: &SolMessage) -> Result<Vec<u8>, SolError> {
    let mut buf = Vec::with_capacity(256);

    buf.push(message.num_required_signatures);
    buf.push(message.num_readonly_signed);
    buf.push(message.num_readonly_unsigned);

    buf.extend_from_slice(&encode_compact_u16(compact_len(message.account_keys.len())?));
    for key in &message.account_keys {
        buf.extend_from_slice(key);
    }

    buf.extend_from_slice(&message.recent_blockhash);

    buf.extend_from_slice(&encode_compact_u16(compact_len(
        message.compiled_instructions.len(),
    )?));
    for ix in &message.compiled_instructions {
        buf.push(ix.program_id_index);

        buf.extend_from_slice(&encode_compact_u16(compact_len(ix.account_indices.len())?));
        buf.extend_from_slice(&ix.account_indices);

        buf.extend_from_slice(&encode_compact_u16(compact_len(ix.data.len())?));
        buf.extend_from_slice(&ix.data);
    }

    Ok(buf)
}

fn compact_len(len: usize) -> Result<u16, SolError> {
    u16::try_from(len)
        .map_err(|_| SolError::SerializationError(format!("length {len} exceeds compact-u16")))
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A message plus one signature slot per required signer.
#[derive(Debug, Clone)]
pub struct SolTransaction {
    pub message: SolMessage,
    pub signatures: Vec<[u8; 64]>,
}

impl SolTransaction {
    /// Wrap a compiled message with zeroed signature slots.
    pub fn new_unsigned(message: SolMessage) -> Self {
        let slots = message.num_required_signatures as usize;
        Self {
            message,
            signatures: vec![[0u8; 64]; slots],
        }
    }

    /// Compile `instructions` and wrap them as an unsigned transaction.
    pub fn new_with_payer(
        instructions: &[SolInstruction],
        fee_payer: &[u8; 32],
        recent_blockhash: &[u8; 32],
    ) -> Result<Self, SolError> {
        compile_message(instructions, fee_payer, recent_blockhash).map(Self::new_unsigned)
    }

    /// Sign with `keypair`, filling the slot that belongs to its public key.
    ///
    /// Other slots are left untouched, so co-signers may sign in any order.
    pub fn partial_sign(&mut self, keypair: &SolKeypair) -> Result<(), SolError> {
        let pubkey = keypair.pubkey();
        let slot = self
            .message
            .signer_keys()
            .iter()
            .position(|k| *k == pubkey)
            .ok_or_else(|| {
                SolError::SigningError(format!(
                    "{} is not a required signer of this transaction",
                    keypair.address()
                ))
            })?;

        let message_bytes = serialize_message(&self.message)?;
        self.signatures[slot] = keypair.sign(&message_bytes);
        Ok(())
    }

    /// Public keys whose slot is still empty.
    pub fn missing_signers(&self) -> Vec<[u8; 32]> {
        self.message
            .signer_keys()
            .iter()
            .zip(&self.signatures)
            .filter(|(_, sig)| sig.iter().all(|b| *b == 0))
            .map(|(key, _)| *key)
            .collect()
    }

    pub fn is_fully_signed(&self) -> bool {
        self.missing_signers().is_empty()
    }

    /// Check every signature slot against its signer.
    pub fn verify_signatures(&self) -> Result<(), SolError> {
        let message_bytes = serialize_message(&self.message)?;
        for (key, sig) in self.message.signer_keys().iter().zip(&self.signatures) {
            let vk = VerifyingKey::from_bytes(key)
                .map_err(|e| SolError::InvalidSignature(e.to_string()))?;
            vk.verify_strict(&message_bytes, &Signature::from_bytes(sig))
                .map_err(|e| SolError::InvalidSignature(e.to_string()))?;
        }
        Ok(())
    }

    /// The transaction id: the fee payer's signature in Base58.
    pub fn id(&self) -> Option<String> {
        self.signatures.first().map(signature_to_string)
    }

    /// Serialize into the wire format expected by `sendTransaction`.
    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        let message_bytes = serialize_message(&self.message)?;

        let mut wire = Vec::with_capacity(3 + 64 * self.signatures.len() + message_bytes.len());
        wire.extend_from_slice(&encode_compact_u16(compact_len(self.signatures.len())?));
        for sig in &self.signatures {
            wire.extend_from_slice(sig);
        }
        wire.extend_from_slice(&message_bytes);

        if wire.len() > PACKET_DATA_SIZE {
            return Err(SolError::SerializationError(format!(
                "transaction is {} bytes, limit is {PACKET_DATA_SIZE}",
                wire.len()
            )));
        }

        Ok(wire)
    }
}
