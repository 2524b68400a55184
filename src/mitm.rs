//! Meet-in-the-middle search over the unknown key suffixes.
//!
//! Phase one encrypts the known plaintext block under every layer-1 suffix
//! and indexes the results. Phase two decrypts the known ciphertext block
//! under every layer-2 suffix and joins against the index. The index is
//! fully populated before any probing starts; there is no feedback between
//! the phases.

use hashbrown::hash_map::Entry as MapEntry;
use hashbrown::HashMap;
use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::cipher::BlockCipher;
use crate::error::Error;

pub const PREFIX_LEN: usize = 13;
pub const SUFFIX_LEN: usize = 3;
pub const BLOCK_LEN: usize = 16;

/// Number of candidate suffixes per key layer: 2^24.
pub const SUFFIX_SPACE: u32 = 1 << (8 * SUFFIX_LEN as u32);

// The suffix domain is split into fixed shards; each rayon worker owns a
// shard end to end, so the only cross-thread traffic is the final merge.
const SHARD_BITS: u32 = 16;
const SHARDS: u32 = SUFFIX_SPACE >> SHARD_BITS;

pub type Block = [u8; BLOCK_LEN];
pub type KeyPrefix = [u8; PREFIX_LEN];

/// A layer-1/layer-2 suffix pair that meets on a common intermediate block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub k1_suffix: u32,
    pub k2_suffix: u32,
}

impl Candidate {
    /// Expands the pair back into the full 16-byte keys of both layers.
    pub fn full_keys(&self, prefix1: &KeyPrefix, prefix2: &KeyPrefix) -> ([u8; 16], [u8; 16]) {
        (
            derive_key(prefix1, self.k1_suffix),
            derive_key(prefix2, self.k2_suffix),
        )
    }
}

/// What the index does when two layer-1 suffixes encrypt the plaintext block
/// to the same intermediate value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexMode {
    /// Keep every colliding suffix, so no candidate pair is ever dropped.
    #[default]
    Exhaustive,
    /// Keep only the most recently inserted suffix. Cheaper, but a collision
    /// silently discards the earlier candidate.
    LastWriteWins,
}

// Collisions against a 128-bit value space are rare, so the single-suffix
// case stays inline and only actual collisions allocate.
#[derive(Debug)]
enum Suffixes {
    One(u32),
    Many(Vec<u32>),
}

/// Maps each intermediate block value to the layer-1 suffix(es) producing it.
/// Built once by [`build_index`], read-only afterwards.
#[derive(Debug)]
pub struct IntermediateIndex {
    map: HashMap<Block, Suffixes>,
    mode: IndexMode,
}

impl IntermediateIndex {
    fn with_capacity(mode: IndexMode, capacity: usize) -> Self {
        IntermediateIndex {
            map: HashMap::with_capacity(capacity),
            mode,
        }
    }

    fn insert(&mut self, block: Block, suffix: u32) {
        match self.map.entry(block) {
            MapEntry::Vacant(slot) => {
                slot.insert(Suffixes::One(suffix));
            }
            MapEntry::Occupied(mut slot) => {
                let entry = slot.get_mut();
                match self.mode {
                    IndexMode::LastWriteWins => *entry = Suffixes::One(suffix),
                    IndexMode::Exhaustive => match entry {
                        Suffixes::Many(all) => all.push(suffix),
                        Suffixes::One(first) => {
                            let first = *first;
                            *entry = Suffixes::Many(vec![first, suffix]);
                        }
                    },
                }
            }
        }
    }

    // Folds a shard-local index into this one. Shards are absorbed in
    // ascending shard order, which keeps every suffix list ascending.
    fn absorb(&mut self, shard: IntermediateIndex) {
        for (block, entry) in shard.map {
            match entry {
                Suffixes::One(s) => self.insert(block, s),
                Suffixes::Many(all) => {
                    for s in all {
                        self.insert(block, s);
                    }
                }
            }
        }
    }

    /// All layer-1 suffixes recorded for `block`, in ascending order.
    /// Empty slice if the block was never produced in phase one.
    pub fn suffixes(&self, block: &Block) -> &[u32] {
        match self.map.get(block) {
            None => &[],
            Some(Suffixes::One(s)) => std::slice::from_ref(s),
            Some(Suffixes::Many(all)) => all,
        }
    }

    /// Number of distinct intermediate block values recorded.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn mode(&self) -> IndexMode {
        self.mode
    }
}

/// Full 16-byte key for one layer: known prefix ++ big-endian 3-byte suffix.
pub fn derive_key(prefix: &KeyPrefix, suffix: u32) -> [u8; 16] {
    debug_assert!(suffix < SUFFIX_SPACE);
    let mut key = [0u8; 16];
    key[..PREFIX_LEN].copy_from_slice(prefix);
    key[PREFIX_LEN..].copy_from_slice(&suffix.to_be_bytes()[1..]);
    key
}

/// Decodes a 13-byte key prefix supplied as hex text.
pub fn prefix_from_hex(text: &str) -> Result<KeyPrefix, Error> {
    let raw = hex::decode(text)?;
    check_prefix(&raw)
}

/// Decodes a 16-byte block supplied as hex text.
pub fn block_from_hex(text: &str) -> Result<Block, Error> {
    let raw = hex::decode(text)?;
    check_block(&raw)
}

fn check_prefix(prefix: &[u8]) -> Result<KeyPrefix, Error> {
    KeyPrefix::try_from(prefix).map_err(|_| Error::InvalidKeyLength {
        expected: PREFIX_LEN,
        got: prefix.len(),
    })
}

fn check_block(block: &[u8]) -> Result<Block, Error> {
    Block::try_from(block).map_err(|_| Error::InvalidBlockLength {
        expected: BLOCK_LEN,
        got: block.len(),
    })
}

/// Phase one: encrypts `plaintext` under every layer-1 suffix of `prefix`
/// and indexes each intermediate block.
///
/// Inputs are validated before any iteration begins. Workers fill
/// shard-local maps that are merged afterwards, so the result is identical
/// to a sequential ascending-suffix loop. `progress` advances once per
/// completed shard; pass `ProgressBar::hidden()` to run silently.
pub fn build_index<C: BlockCipher>(
    cipher: &C,
    prefix: &[u8],
    plaintext: &[u8],
    mode: IndexMode,
    progress: &ProgressBar,
) -> Result<IntermediateIndex, Error> {
    let prefix = check_prefix(prefix)?;
    let block = check_block(plaintext)?;

    let shards: Vec<IntermediateIndex> = (0..SHARDS)
        .into_par_iter()
        .map(|shard| {
            let lo = shard << SHARD_BITS;
            let mut local = IntermediateIndex::with_capacity(mode, 1 << SHARD_BITS);
            for s in lo..lo + (1 << SHARD_BITS) {
                let key = derive_key(&prefix, s);
                local.insert(cipher.encrypt_block(&key, &block), s);
            }
            progress.inc(1 << SHARD_BITS);
            local
        })
        .collect();

    let mut index = IntermediateIndex::with_capacity(mode, SUFFIX_SPACE as usize);
    for shard in shards {
        index.absorb(shard);
    }
    Ok(index)
}

/// Phase two: decrypts `ciphertext` under every layer-2 suffix of `prefix`
/// and joins each result against `index`.
///
/// Every suffix stored at a hit is emitted, not just one. Candidates come
/// back ordered by ascending layer-2 suffix (then ascending layer-1 suffix
/// within one hit), identically across runs. An empty vector means the full
/// domain was searched and nothing matched.
pub fn probe_index<C: BlockCipher>(
    cipher: &C,
    prefix: &[u8],
    ciphertext: &[u8],
    index: &IntermediateIndex,
    progress: &ProgressBar,
) -> Result<Vec<Candidate>, Error> {
    let prefix = check_prefix(prefix)?;
    let block = check_block(ciphertext)?;

    let shard_hits: Vec<Vec<Candidate>> = (0..SHARDS)
        .into_par_iter()
        .map(|shard| {
            let lo = shard << SHARD_BITS;
            let mut hits = Vec::new();
            for s in lo..lo + (1 << SHARD_BITS) {
                let key = derive_key(&prefix, s);
                let middle = cipher.decrypt_block(&key, &block);
                for &k1 in index.suffixes(&middle) {
                    hits.push(Candidate {
                        k1_suffix: k1,
                        k2_suffix: s,
                    });
                }
            }
            progress.inc(1 << SHARD_BITS);
            hits
        })
        .collect();

    Ok(shard_hits.into_iter().flatten().collect())
}

/// Early-terminating probe for callers that only need existence: returns the
/// candidate with the lowest layer-2 suffix, or `None` after exhausting the
/// domain. Unlike [`probe_index`] this stops as soon as the answer is known.
pub fn probe_any<C: BlockCipher>(
    cipher: &C,
    prefix: &[u8],
    ciphertext: &[u8],
    index: &IntermediateIndex,
) -> Result<Option<Candidate>, Error> {
    let prefix = check_prefix(prefix)?;
    let block = check_block(ciphertext)?;

    Ok((0..SHARDS).into_par_iter().find_map_first(|shard| {
        let lo = shard << SHARD_BITS;
        for s in lo..lo + (1 << SHARD_BITS) {
            let key = derive_key(&prefix, s);
            let middle = cipher.decrypt_block(&key, &block);
            if let Some(&k1) = index.suffixes(&middle).first() {
                return Some(Candidate {
                    k1_suffix: k1,
                    k2_suffix: s,
                });
            }
        }
        None
    }))
}
