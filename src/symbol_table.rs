use crate::{
    bank::{BufferBank, StringBank},
    compat::DefaultHashBuilder,
    intbank::IntBank,
    table::{self, Generation, Slot, MIGRATION_BATCH, MIN_CAPACITY},
    Error, Result, Sequence,
};
use core::{
    fmt,
    fmt::{Debug, Formatter},
    hash::{BuildHasher, Hash, Hasher},
    iter::FusedIterator,
    mem,
};

/// Occupancy denominator: a generation is doubled once `count` reaches
/// `capacity / LOAD_FACTOR`, i.e. at 50% load.
const LOAD_FACTOR: usize = 2;

/// A generation never grows beyond the 32-bit sequence/address space.
const MAX_TABLE_SLOTS: u64 = 1 << 32;

/// Ceiling on assigned sequences once the table can no longer double. Probe
/// chains degrade past ~75% occupancy of the final generation and unique
/// assignment can no longer be guaranteed.
const MAX_SEQUENCES: u64 = (u32::MAX as u64) * 3 / 4;

/// Creates the `u32` hash value for the given string using the given hash builder.
fn make_hash(builder: &impl BuildHasher, string: &str) -> u32 {
    let state = &mut builder.build_hasher();
    string.hash(state);
    state.finish() as u32
}

/// Data structure to intern strings as dense sequence numbers and resolve
/// them back.
///
/// Each distinct string is assigned the next free 1-based [`Sequence`] in
/// first-insertion order, so the sequences of `n` interned strings are exactly
/// `1..=n`. Workloads that intern many millions of strings (graph algorithms,
/// log indexing) then store and compare only the integers.
///
/// The following API covers the main functionality:
///
/// - [`SymbolTable::get_or_intern`]: To intern a new string.
///     - This maps from `string` type to `sequence` type.
/// - [`SymbolTable::resolve`]: To resolve your already interned strings.
///     - This maps from `sequence` type to `string` type.
///
/// Internally a string is stored once in the string bank `B` and indexed by an
/// open-addressing table over its hash. The table is resized incrementally: a
/// doubling allocates a fresh generation and each subsequent insert attempt
/// copies a small batch of entries over, so no single insert pays for the
/// whole rehash. With the `off-heap` feature (default) the index generations
/// and the sequence bank live in anonymous memory maps rather than the global
/// allocator.
///
/// # Note
///
/// There is exactly one logical mutator: mutating operations take `&mut self`,
/// so the borrow checker enforces the single-writer contract at compile time.
/// Interned strings are never dropped or reassigned for the table's lifetime.
/// All owned storage, including the memory-mapped blocks and a superseded
/// generation mid-migration, is released when the table is dropped; leaking
/// it requires [`mem::forget`] or equivalent.
pub struct SymbolTable<B = BufferBank, H = DefaultHashBuilder>
where
    B: StringBank,
    H: BuildHasher,
{
    bank: B,
    intbank: IntBank,
    current: Generation,
    previous: Option<Generation>,
    /// Migration progress into `previous`, in entries. Zero when stable.
    cursor: usize,
    count: u32,
    hasher: H,
}

impl<B, H> Debug for SymbolTable<B, H>
where
    B: StringBank,
    H: BuildHasher,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolTable")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("migrating", &self.previous.is_some())
            .finish()
    }
}

impl<B, H> Default for SymbolTable<B, H>
where
    B: StringBank,
    H: BuildHasher + Default,
{
    #[cfg_attr(feature = "inline-more", inline)]
    fn default() -> Self {
        Self::new()
    }
}

impl<B, H> PartialEq for SymbolTable<B, H>
where
    B: StringBank,
    H: BuildHasher,
{
    fn eq(&self, rhs: &Self) -> bool {
        self.len() == rhs.len() && self.iter().zip(rhs).all(|((_, lhs), (_, rhs))| lhs == rhs)
    }
}

impl<B, H> Eq for SymbolTable<B, H>
where
    B: StringBank,
    H: BuildHasher,
{
}

impl<B, H> SymbolTable<B, H>
where
    B: StringBank,
    H: BuildHasher + Default,
{
    /// Creates a new empty `SymbolTable`.
    ///
    /// Nothing is allocated until the first insertion.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn new() -> Self {
        Self::with_hasher(H::default())
    }

    /// Creates a new `SymbolTable` sized to hold `capacity` strings without
    /// resizing.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_capacity_and_hasher(capacity, H::default())
    }
}

impl<B, H> SymbolTable<B, H>
where
    B: StringBank,
    H: BuildHasher,
{
    /// Creates a new empty `SymbolTable` with the given hasher.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn with_hasher(hasher: H) -> Self {
        Self {
            bank: B::default(),
            intbank: IntBank::new(),
            current: Generation::empty(),
            previous: None,
            cursor: 0,
            count: 0,
            hasher,
        }
    }

    /// Creates a new `SymbolTable` with the given initial capacity and the given hasher.
    ///
    /// The index is allocated at `capacity * 2` slots rounded up to a power of
    /// two (at least 16), so `capacity` insertions stay below the 50% load
    /// threshold.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: H) -> Result<Self> {
        let slots = capacity
            .checked_mul(LOAD_FACTOR)
            .and_then(usize::checked_next_power_of_two)
            .ok_or(Error::OutOfMemory)?
            .max(MIN_CAPACITY);
        Ok(Self {
            bank: B::with_capacity(capacity),
            intbank: IntBank::new(),
            current: Generation::with_capacity(slots)?,
            previous: None,
            cursor: 0,
            count: 0,
            hasher,
        })
    }

    /// Returns the number of distinct strings interned by the table.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn len(&self) -> usize {
        self.count as usize
    }

    /// Returns `true` if the symbol table has no interned strings.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the slot capacity of the current index generation.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn capacity(&self) -> usize {
        self.current.capacity()
    }

    /// Returns the approximate byte footprint of the stored strings.
    ///
    /// An over-estimate that includes yet unused space and never shrinks.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn symbol_bytes(&self) -> usize {
        self.bank.size()
    }

    /// Returns the sequence number for the given string if any.
    ///
    /// Can be used to query if a string has already been interned without
    /// interning. This is a pure read: it never allocates, grows the index or
    /// performs migration work.
    #[inline]
    pub fn get(&self, string: &str) -> Option<Sequence> {
        let hash = make_hash(&self.hasher, string);
        let Self {
            bank,
            intbank,
            current,
            previous,
            ..
        } = self;
        let mut eq = |sequence: Sequence| bank.get(intbank.lookup(sequence)) == string;
        // While a resize is in flight an entry may exist only in the previous
        // generation, so both have to be consulted, previous first.
        if let Some(previous) = previous {
            if let Slot::Occupied(sequence) = previous.probe(hash, &mut eq) {
                return Some(sequence);
            }
        }
        match current.probe(hash, &mut eq) {
            Slot::Occupied(sequence) => Some(sequence),
            Slot::Vacant(_) => None,
        }
    }

    /// Interns the given string, unless it is already interned.
    ///
    /// Returns the string's sequence number and whether it was already
    /// present: `(seq, true)` for a string interned earlier, `(seq, false)`
    /// for a first insertion.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfSequences`] if the table reached the ceiling of the
    ///   32-bit sequence space.
    /// - [`Error::OutOfMemory`] if growing the index or the sequence bank
    ///   failed to allocate.
    pub fn try_get_or_intern(&mut self, string: &str) -> Result<(Sequence, bool)> {
        let hash = make_hash(&self.hasher, string);
        // We are going to add to the table, so make sure it is big enough and
        // pay this insert's share of any resize in flight. Pure reads skip
        // both (see `get`).
        self.grow_if_needed()?;
        if self.previous.is_some() {
            self.migrate_step();
        }

        let Self {
            bank,
            intbank,
            current,
            previous,
            ..
        } = &mut *self;
        let mut eq = |sequence: Sequence| bank.get(intbank.lookup(sequence)) == string;
        if let Some(previous) = previous {
            if let Slot::Occupied(sequence) = previous.probe(hash, &mut eq) {
                return Ok((sequence, true));
            }
        }
        let slot = match current.probe(hash, &mut eq) {
            Slot::Occupied(sequence) => return Ok((sequence, true)),
            Slot::Vacant(slot) => slot,
        };

        // `grow_if_needed` bounds `count` well below `u32::MAX`.
        let sequence =
            Sequence::from_u32(self.count + 1).expect("encountered invalid sequence");
        let offset = self.bank.save(string);
        self.intbank.save(sequence, offset)?;
        // Commit the index entry and the count last, so a failed slab
        // allocation leaves the table observably unchanged.
        self.current.set(slot, hash, sequence);
        self.count = sequence.to_u32();
        Ok((sequence, false))
    }

    /// Interns the given string, unless it is already interned.
    ///
    /// Returns a sequence number for resolution into the original string.
    ///
    /// # Panics
    ///
    /// If the table ran out of sequence numbers or memory. Use
    /// [`SymbolTable::try_get_or_intern`] to handle these as errors.
    #[inline]
    pub fn get_or_intern(&mut self, string: &str) -> Sequence {
        match self.try_get_or_intern(string) {
            Ok((sequence, _)) => sequence,
            Err(error) => panic!("failed to intern string: {error}"),
        }
    }

    /// Returns the string for the given sequence number.
    ///
    /// # Panics
    ///
    /// May panic, or return an unrelated string, if `sequence` was not
    /// returned by a successful insert on this table instance.
    #[inline]
    pub fn resolve(&self, sequence: Sequence) -> &str {
        self.bank.get(self.intbank.lookup(sequence))
    }

    /// Returns an iterator over the interned strings in sequence order.
    #[cfg_attr(feature = "inline-more", inline)]
    pub fn iter(&self) -> Iter<'_, B, H> {
        Iter {
            table: self,
            next: 1,
        }
    }

    /// Ensures the next insertion finds a vacant slot, doubling the current
    /// generation into a fresh one when the 50% load threshold is hit.
    fn grow_if_needed(&mut self) -> Result<()> {
        if !self.current.is_allocated() {
            self.current = Generation::with_capacity(MIN_CAPACITY)?;
        }
        let capacity = self.current.capacity();
        if (self.count as usize) < capacity / LOAD_FACTOR {
            return Ok(());
        }

        if capacity as u64 >= MAX_TABLE_SLOTS {
            // No bits left to grow the table; let it fill further instead,
            // up to the point where unique assignment is at risk.
            if self.count as u64 >= MAX_SEQUENCES {
                return Err(Error::OutOfSequences);
            }
            return Ok(());
        }

        if self.previous.is_none() {
            let doubled = capacity.checked_mul(2).ok_or(Error::OutOfMemory)?;
            let next = Generation::with_capacity(doubled)?;
            self.previous = Some(mem::replace(&mut self.current, next));
            debug_assert_eq!(self.cursor, 0);
        }
        Ok(())
    }

    /// Copies one batch of entries from the previous generation and releases
    /// it once the cursor has walked its whole capacity.
    ///
    /// One batch per insert attempt outpaces the insertions filling the new
    /// generation, so migration always completes before the next doubling.
    fn migrate_step(&mut self) {
        let cursor = self.cursor;
        let done = {
            let Self {
                current, previous, ..
            } = self;
            let Some(previous) = previous else { return };
            table::migrate_batch(previous, current, cursor);
            cursor + MIGRATION_BATCH >= previous.capacity()
        };
        if done {
            self.previous = None;
            self.cursor = 0;
        } else {
            self.cursor = cursor + MIGRATION_BATCH;
        }
    }
}

impl<B, H, T> FromIterator<T> for SymbolTable<B, H>
where
    B: StringBank,
    H: BuildHasher + Default,
    T: AsRef<str>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<B, H, T> Extend<T> for SymbolTable<B, H>
where
    B: StringBank,
    H: BuildHasher,
    T: AsRef<str>,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        for string in iter {
            self.get_or_intern(string.as_ref());
        }
    }
}

impl<'a, B, H> IntoIterator for &'a SymbolTable<B, H>
where
    B: StringBank,
    H: BuildHasher,
{
    type Item = (Sequence, &'a str);
    type IntoIter = Iter<'a, B, H>;

    #[cfg_attr(feature = "inline-more", inline)]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`SymbolTable`]'s interned strings in sequence order.
pub struct Iter<'a, B, H>
where
    B: StringBank,
    H: BuildHasher,
{
    table: &'a SymbolTable<B, H>,
    next: u32,
}

impl<'a, B, H> Iterator for Iter<'a, B, H>
where
    B: StringBank,
    H: BuildHasher,
{
    type Item = (Sequence, &'a str);

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len();
        (remaining, Some(remaining))
    }

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.table.count {
            return None;
        }
        let sequence = Sequence::from_u32(self.next).expect("encountered invalid sequence");
        self.next += 1;
        Some((sequence, self.table.resolve(sequence)))
    }
}

impl<'a, B, H> ExactSizeIterator for Iter<'a, B, H>
where
    B: StringBank,
    H: BuildHasher,
{
    fn len(&self) -> usize {
        (self.table.count - (self.next - 1)) as usize
    }
}

impl<'a, B, H> FusedIterator for Iter<'a, B, H>
where
    B: StringBank,
    H: BuildHasher,
{
}
