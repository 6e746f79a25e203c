//! Transposition table for caching search results.
//!
//! Uses Zobrist hashes to store and retrieve position evaluations,
//! enabling significant search tree pruning.
//!
//! Entries are stored as atomic u64 pairs using XOR verification, so the table is `Sync`
//! and can be shared between engines behind an `Arc` without ever handing out a torn
//! entry. Each index holds a single slot; a probe only trusts a slot whose stored key
//! matches the probe key.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::board::Move;

/// How the stored evaluation relates to the true score of the position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeType {
    Exact,      // Score is the exact value
    LowerBound, // Score is at least this value (failed high - score >= beta)
    UpperBound, // Score is at most this value (failed low - score <= alpha)
}

impl NodeType {
    fn to_bits(self) -> u64 {
        match self {
            NodeType::Exact => 0,
            NodeType::LowerBound => 1,
            NodeType::UpperBound => 2,
        }
    }

    fn from_bits(v: u64) -> Self {
        match v & 0x3 {
            0 => NodeType::Exact,
            1 => NodeType::LowerBound,
            _ => NodeType::UpperBound,
        }
    }
}

/// A cached search result for one position
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TTEntry {
    /// Full Zobrist key of the position
    pub key: u64,
    /// Remaining depth the evaluation was searched to
    pub depth: u8,
    /// Score from the side to move's perspective
    pub evaluation: f32,
    pub best_move: Option<Move>,
    pub node_type: NodeType,
}

/// Packed entry format (fits in 64 bits):
/// - bits 0-17:  move (0 = no move)
/// - bits 18-19: node type
/// - bits 20-27: depth
/// - bit  28:    occupied flag, so an all-zero word always means an empty slot
/// - bits 32-63: evaluation (`f32` bits)
const MOVE_MASK: u64 = (1 << 18) - 1;
const OCCUPIED: u64 = 1 << 28;

fn pack_entry(entry: &TTEntry) -> u64 {
    let mv = entry.best_move.map_or(0, |m| u64::from(m.as_u32())) & MOVE_MASK;
    mv | (entry.node_type.to_bits() << 18)
        | (u64::from(entry.depth) << 20)
        | OCCUPIED
        | (u64::from(entry.evaluation.to_bits()) << 32)
}

fn unpack_entry(key: u64, data: u64) -> TTEntry {
    let mv_bits = (data & MOVE_MASK) as u32;
    TTEntry {
        key,
        depth: ((data >> 20) & 0xFF) as u8,
        evaluation: f32::from_bits((data >> 32) as u32),
        best_move: (mv_bits != 0).then(|| Move::from_u32_unchecked(mv_bits)),
        node_type: NodeType::from_bits(data >> 18),
    }
}

/// A single TT slot using lockless hashing.
///
/// Uses the XOR technique: stores (key ^ data) and data separately.
/// On read, we verify by checking if (stored_key ^ data) equals the probe key.
/// This detects torn reads from concurrent writes.
#[repr(C)]
struct TTSlot {
    /// Stores: hash_key ^ packed_data
    key_xor: AtomicU64,
    /// Stores: packed_data
    data: AtomicU64,
}

impl TTSlot {
    fn new() -> Self {
        TTSlot {
            key_xor: AtomicU64::new(0),
            data: AtomicU64::new(0),
        }
    }

    fn store(&self, hash: u64, packed: u64) {
        // Data first, then key_xor: a matching key_xor implies the data is in place
        self.data.store(packed, Ordering::Relaxed);
        self.key_xor.store(hash ^ packed, Ordering::Relaxed);
    }

    fn probe(&self, hash: u64) -> Option<TTEntry> {
        let key_xor = self.key_xor.load(Ordering::Relaxed);
        let data = self.data.load(Ordering::Relaxed);

        if data != 0 && key_xor ^ data == hash {
            Some(unpack_entry(hash, data))
        } else {
            None
        }
    }

    fn is_empty(&self) -> bool {
        self.data.load(Ordering::Relaxed) == 0
    }

    fn depth(&self) -> u8 {
        ((self.data.load(Ordering::Relaxed) >> 20) & 0xFF) as u8
    }

    fn reset(&self) {
        self.key_xor.store(0, Ordering::Relaxed);
        self.data.store(0, Ordering::Relaxed);
    }
}

/// Fixed-capacity, thread-safe transposition table.
///
/// Capacity is a power of two; the slot for a key is `key & (capacity - 1)`.
///
/// Replacement is depth-preferred: a store overwrites the slot when it is empty,
/// already holds the same key, or holds an entry searched no deeper than the new
/// one. Otherwise the deeper entry is kept.
pub struct TranspositionTable {
    slots: Vec<TTSlot>,
    mask: usize,
}

impl TranspositionTable {
    /// Create a table with room for `entries` slots, rounded down to a power of two.
    #[must_use]
    pub fn new(entries: usize) -> Self {
        let capacity = match entries {
            0 | 1 => 1,
            n if n.is_power_of_two() => n,
            n => n.next_power_of_two() / 2,
        };

        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, TTSlot::new);

        TranspositionTable {
            slots,
            mask: capacity - 1,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    /// Probe the table for an entry matching the given hash.
    /// Returns None if the slot is empty or holds a different key.
    #[must_use]
    pub fn probe(&self, hash: u64) -> Option<TTEntry> {
        self.slots[self.index(hash)].probe(hash)
    }

    /// Store an entry, subject to the depth-preferred replacement policy.
    ///
    /// Returns whether the entry was written.
    pub fn store(&self, entry: TTEntry) -> bool {
        let slot = &self.slots[self.index(entry.key)];
        let replace =
            slot.is_empty() || slot.probe(entry.key).is_some() || slot.depth() <= entry.depth;
        if replace {
            slot.store(entry.key, pack_entry(&entry));
        }
        replace
    }

    /// Returns hash table fullness in per mille (0-1000).
    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        // Sample the first 1000 slots
        let sample_size = self.slots.len().min(1000);
        let occupied = self
            .slots
            .iter()
            .take(sample_size)
            .filter(|slot| !slot.is_empty())
            .count();
        ((occupied as u64 * 1000) / sample_size as u64) as u32
    }

    /// Clear all entries from the table.
    pub fn clear(&self) {
        for slot in &self.slots {
            slot.reset();
        }
    }
}
