//! # Core Chain Entities
//!
//! Blocks, transactions and outpoints in the UTXO model. Entities are
//! value types with stable hashes; the attached metadata cells carry the
//! mutable validation state and never participate in hashing, equality or
//! serialization.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::metadata::{BlockMetadata, PrevoutMetadata, TransactionMetadata};
use crate::work::work_from_bits;
use primitive_types::U256;

/// A 32-byte hash (SHA-256).
pub type Hash = [u8; 32];

/// The all-zero hash, used as the parent of genesis and the coinbase
/// outpoint sentinel.
pub const NULL_HASH: Hash = [0u8; 32];

/// The header of a block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockHeader {
    /// Protocol version for this block.
    pub version: u32,
    /// Hash of the parent block (creates the chain linkage).
    pub previous_block_hash: Hash,
    /// Merkle root of all transactions in the block.
    pub merkle_root: Hash,
    /// Unix timestamp when the block was produced.
    pub timestamp: u32,
    /// Compact encoding of the difficulty target.
    pub bits: u32,
    /// Proof-of-work nonce.
    pub nonce: u32,
}

impl BlockHeader {
    /// SHA-256 over the fixed-width field encoding.
    pub fn hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.version.to_le_bytes());
        hasher.update(self.previous_block_hash);
        hasher.update(self.merkle_root);
        hasher.update(self.timestamp.to_le_bytes());
        hasher.update(self.bits.to_le_bytes());
        hasher.update(self.nonce.to_le_bytes());
        let result = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        hash
    }

    /// The per-block work scalar claimed by this header's difficulty target.
    pub fn work(&self) -> U256 {
        work_from_bits(self.bits)
    }
}

/// A full block: header plus ordered transactions.
///
/// Shared immutably between components as `Arc<Block>`; only the metadata
/// cell is written after construction, by whichever pipeline stage currently
/// owns the block.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
    /// Validation state, owned by the stage advancing this block.
    #[serde(skip)]
    pub metadata: BlockMetadata,
}

impl Block {
    pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        Self {
            header,
            transactions,
            metadata: BlockMetadata::default(),
        }
    }

    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// The per-block work scalar.
    pub fn work(&self) -> U256 {
        self.header.work()
    }

    /// The coinbase transaction, if the block has one.
    pub fn coinbase(&self) -> Option<&Transaction> {
        self.transactions.first().filter(|tx| tx.is_coinbase())
    }
}

impl Clone for Block {
    fn clone(&self) -> Self {
        Self {
            header: self.header.clone(),
            transactions: self.transactions.clone(),
            metadata: self.metadata.snapshot_clone(),
        }
    }
}

/// A transaction: ordered inputs spending prior outputs, ordered new outputs.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    pub lock_time: u32,
    /// Validation state populated while the transaction moves through the
    /// pipeline.
    #[serde(skip)]
    pub metadata: TransactionMetadata,
}

impl Transaction {
    pub fn new(version: u32, inputs: Vec<Input>, outputs: Vec<Output>) -> Self {
        Self {
            version,
            inputs,
            outputs,
            lock_time: 0,
            metadata: TransactionMetadata::default(),
        }
    }

    /// SHA-256 over the fixed encoding of all value fields.
    pub fn hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.version.to_le_bytes());
        hasher.update((self.inputs.len() as u32).to_le_bytes());
        for input in &self.inputs {
            hasher.update(input.previous_output.tx_hash);
            hasher.update(input.previous_output.index.to_le_bytes());
            hasher.update((input.script.len() as u32).to_le_bytes());
            hasher.update(&input.script);
            hasher.update(input.sequence.to_le_bytes());
        }
        hasher.update((self.outputs.len() as u32).to_le_bytes());
        for output in &self.outputs {
            hasher.update(output.value.to_le_bytes());
            hasher.update((output.script.len() as u32).to_le_bytes());
            hasher.update(&output.script);
        }
        hasher.update(self.lock_time.to_le_bytes());
        let result = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        hash
    }

    /// A coinbase has exactly one input and that input's outpoint is null.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].previous_output.is_null()
    }
}

impl Clone for Transaction {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            lock_time: self.lock_time,
            metadata: self.metadata.snapshot_clone(),
        }
    }
}

/// A transaction input referencing a previous output.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Input {
    pub previous_output: OutPoint,
    pub script: Vec<u8>,
    pub sequence: u32,
}

impl Input {
    pub fn spending(previous_output: OutPoint) -> Self {
        Self {
            previous_output,
            script: Vec::new(),
            sequence: u32::MAX,
        }
    }

    /// The canonical coinbase input.
    pub fn coinbase() -> Self {
        Self::spending(OutPoint::null())
    }
}

/// A transaction output: a value locked by a script.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub value: u64,
    pub script: Vec<u8>,
}

impl Output {
    pub fn new(value: u64, script: Vec<u8>) -> Self {
        Self { value, script }
    }

    /// Sentinel marking an unpopulated prevout cache.
    pub fn not_found() -> Self {
        Self {
            value: u64::MAX,
            script: Vec::new(),
        }
    }

    /// A populated output; false only for the not-found sentinel.
    pub fn is_valid(&self) -> bool {
        self.value != u64::MAX
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::not_found()
    }
}

/// A reference to a transaction output: `(tx_hash, output_index)`.
///
/// Equality and hashing cover the reference only; the metadata cell carries
/// the prevout validation state the fork and validator populate.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OutPoint {
    pub tx_hash: Hash,
    pub index: u32,
    #[serde(skip)]
    pub metadata: PrevoutMetadata,
}

impl OutPoint {
    pub fn new(tx_hash: Hash, index: u32) -> Self {
        Self {
            tx_hash,
            index,
            metadata: PrevoutMetadata::default(),
        }
    }

    /// The coinbase sentinel outpoint.
    pub fn null() -> Self {
        Self::new(NULL_HASH, u32::MAX)
    }

    pub fn is_null(&self) -> bool {
        self.tx_hash == NULL_HASH && self.index == u32::MAX
    }
}

impl Clone for OutPoint {
    fn clone(&self) -> Self {
        Self {
            tx_hash: self.tx_hash,
            index: self.index,
            metadata: self.metadata.snapshot_clone(),
        }
    }
}

impl PartialEq for OutPoint {
    fn eq(&self, other: &Self) -> bool {
        self.tx_hash == other.tx_hash && self.index == other.index
    }
}

impl Eq for OutPoint {}

impl std::hash::Hash for OutPoint {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.tx_hash.hash(state);
        self.index.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> BlockHeader {
        BlockHeader {
            version: 1,
            previous_block_hash: [0xAB; 32],
            merkle_root: [0xCD; 32],
            timestamp: 1_700_000_000,
            bits: 0x1d00ffff,
            nonce: 42,
        }
    }

    #[test]
    fn test_header_hash_is_stable() {
        let header = sample_header();
        assert_eq!(header.hash(), header.hash());
    }

    #[test]
    fn test_header_hash_covers_every_field() {
        let base = sample_header();
        let mut variant = base.clone();
        variant.nonce += 1;
        assert_ne!(base.hash(), variant.hash());

        let mut variant = base.clone();
        variant.previous_block_hash = [0xEF; 32];
        assert_ne!(base.hash(), variant.hash());
    }

    #[test]
    fn test_coinbase_detection() {
        let coinbase = Transaction::new(1, vec![Input::coinbase()], vec![Output::new(50, vec![])]);
        assert!(coinbase.is_coinbase());

        let spend = Transaction::new(
            1,
            vec![Input::spending(OutPoint::new([1; 32], 0))],
            vec![Output::new(10, vec![])],
        );
        assert!(!spend.is_coinbase());

        // Two inputs disqualify even if the first is null.
        let hybrid = Transaction::new(
            1,
            vec![Input::coinbase(), Input::spending(OutPoint::new([1; 32], 0))],
            vec![],
        );
        assert!(!hybrid.is_coinbase());
    }

    #[test]
    fn test_outpoint_equality_ignores_metadata() {
        let a = OutPoint::new([7; 32], 3);
        let b = OutPoint::new([7; 32], 3);
        b.metadata.set_spent(true);
        assert_eq!(a, b);
    }

    #[test]
    fn test_block_coinbase_accessor() {
        let coinbase = Transaction::new(1, vec![Input::coinbase()], vec![Output::new(50, vec![])]);
        let block = Block::new(sample_header(), vec![coinbase]);
        assert!(block.coinbase().is_some());

        let empty = Block::new(sample_header(), vec![]);
        assert!(empty.coinbase().is_none());
    }

    #[test]
    fn test_not_found_output_is_invalid() {
        assert!(!Output::not_found().is_valid());
        assert!(Output::new(0, vec![]).is_valid());
    }
}
