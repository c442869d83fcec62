//! One generation of the open-addressing hash index.
//!
//! A generation is a fixed-capacity, power-of-two array of `(hash, sequence)`
//! entries probed linearly. It stores no string data: equality on a hash hit
//! is delegated to the caller, which resolves the candidate sequence through
//! the sequence bank and string bank. During a resize two generations exist
//! and entries are copied over in fixed batches by [`migrate_batch`].

use crate::{
    arena::{Block, Pod},
    Result, Sequence,
};

/// Smallest capacity a generation is ever allocated with.
pub(crate) const MIN_CAPACITY: usize = 16;

/// Entries copied from the previous generation per insert attempt. Capacities
/// are powers of two ≥ 16, so batches never straddle the end of a generation.
pub(crate) const MIGRATION_BATCH: usize = 16;

/// A single index entry. `sequence == 0` marks a vacant slot.
///
/// The hash is kept alongside the sequence so that resizing and stepping over
/// colliding slots do not have to resolve the stored string.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(C)]
pub(crate) struct Entry {
    pub(crate) hash: u32,
    pub(crate) sequence: u32,
}

// SAFETY: two `u32` fields without padding; the all-zero pattern is the
//         vacant entry.
unsafe impl Pod for Entry {
    const ZERO: Self = Self {
        hash: 0,
        sequence: 0,
    };
}

/// The outcome of probing a generation for a hash.
pub(crate) enum Slot {
    /// The string is present under this sequence number.
    Occupied(Sequence),
    /// The string is absent; the slot index is the correct insertion point
    /// for this hash in this generation.
    Vacant(usize),
}

pub(crate) struct Generation {
    entries: Block<Entry>,
}

impl Generation {
    /// A generation with capacity zero, for the cheap empty table state.
    pub(crate) fn empty() -> Self {
        Self {
            entries: Block::empty(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Result<Self> {
        debug_assert!(capacity.is_power_of_two() && capacity >= MIN_CAPACITY);
        Ok(Self {
            entries: Block::zeroed(capacity)?,
        })
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub(crate) fn is_allocated(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Scans for `hash` starting at its home slot, wrapping at capacity.
    ///
    /// `eq` is consulted on every entry whose stored hash matches, to decide
    /// true string equality for the candidate sequence.
    ///
    /// # Panics
    ///
    /// Panics if the scan cycles through a full generation. The growth policy
    /// keeps occupancy at or below 50%, so a full cycle means that policy was
    /// violated.
    pub(crate) fn probe(&self, hash: u32, eq: &mut impl FnMut(Sequence) -> bool) -> Slot {
        if !self.is_allocated() {
            return Slot::Vacant(0);
        }
        let mask = self.capacity() - 1;
        let home = hash as usize & mask;
        let mut slot = home;
        loop {
            let entry = self.entries[slot];
            let Some(sequence) = Sequence::from_u32(entry.sequence) else {
                return Slot::Vacant(slot);
            };
            if entry.hash == hash && eq(sequence) {
                return Slot::Occupied(sequence);
            }
            slot = (slot + 1) & mask;
            if slot == home {
                panic!("hash index is full: growth policy violated");
            }
        }
    }

    /// Writes an entry into a slot previously reported vacant by [`probe`].
    ///
    /// [`probe`]: Generation::probe
    #[inline]
    pub(crate) fn set(&mut self, slot: usize, hash: u32, sequence: Sequence) {
        debug_assert_eq!(self.entries[slot].sequence, 0);
        self.entries[slot] = Entry {
            hash,
            sequence: sequence.to_u32(),
        };
    }

    /// Writes an entry known to be absent from this generation into the first
    /// vacant slot for its hash. No equality checks: the migration source is
    /// already deduplicated.
    fn insert_unique(&mut self, entry: Entry) {
        let mask = self.capacity() - 1;
        let home = entry.hash as usize & mask;
        let mut slot = home;
        while self.entries[slot].sequence != 0 {
            slot = (slot + 1) & mask;
            if slot == home {
                panic!("hash index is full during migration: growth policy violated");
            }
        }
        self.entries[slot] = entry;
    }
}

/// Copies one batch of occupied entries from `previous[cursor..cursor + 16]`
/// into `current`. Entries are left in place in `previous`: deleting them
/// would break forward scans over colliding slots, and a duplicate resolves
/// identically from either generation.
pub(crate) fn migrate_batch(previous: &Generation, current: &mut Generation, cursor: usize) {
    for &entry in &previous.entries[cursor..cursor + MIGRATION_BATCH] {
        if entry.sequence != 0 {
            current.insert_unique(entry);
        }
    }
}
