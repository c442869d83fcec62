//! The sequence bank: maps sequence numbers to string-bank offsets.

use crate::{arena::Block, Result, Sequence};
use crate::compat::Vec;

/// Entries per slab. Bigger slabs amortize growth against more up-front
/// memory; sequences are dense, so little of a slab is ever wasted.
const SLAB_SIZE: usize = 1 << 12;

/// Growable storage of one string-bank offset per assigned sequence number.
///
/// Backed by fixed-size slabs that are appended on demand and never move, so
/// a `lookup` is two indexing operations. Sequence numbers are 1-based and
/// assigned densely by the symbol table, which keeps at most one slab
/// partially filled.
pub(crate) struct IntBank {
    slabs: Vec<Block<usize>>,
}

impl IntBank {
    pub(crate) fn new() -> Self {
        Self { slabs: Vec::new() }
    }

    /// Records the offset for a sequence number, growing the slab array to
    /// cover it if necessary.
    pub(crate) fn save(&mut self, sequence: Sequence, offset: usize) -> Result<()> {
        let index = sequence.to_usize() - 1;
        let slab = index / SLAB_SIZE;
        while self.slabs.len() <= slab {
            self.slabs.push(Block::zeroed(SLAB_SIZE)?);
        }
        self.slabs[slab][index % SLAB_SIZE] = offset;
        Ok(())
    }

    /// Returns the offset recorded for a sequence number.
    ///
    /// # Panics
    ///
    /// Panics if the sequence was never saved into a covered slab. Reading a
    /// covered but never-saved slot yields a stale zero offset instead; only
    /// call this with sequences returned by a prior successful insert.
    pub(crate) fn lookup(&self, sequence: Sequence) -> usize {
        let index = sequence.to_usize() - 1;
        self.slabs[index / SLAB_SIZE][index % SLAB_SIZE]
    }
}
