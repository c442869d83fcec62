#![cfg_attr(not(feature = "std"), no_std)]
#![warn(unsafe_op_in_unsafe_fn)]

//! Interns strings as dense, 1-based sequence numbers, and resolves them back.
//!
//! [`SymbolTable`] is built for workloads that intern millions to billions of
//! strings and afterwards store and compare only the integers, graph
//! algorithms being the motivating case. Distinct strings receive the
//! sequence numbers `1, 2, 3, …` in first-insertion order, with no gaps and
//! no reuse. Look-ups in both directions are constant time: string to
//! sequence through an open-addressing index over string hashes, sequence to
//! string through a slab-backed offset bank plus the string bank holding the
//! bytes.
//!
//! The index is resized incrementally. A doubling allocates a fresh
//! generation and each following insert attempt migrates a small batch of
//! entries, so there is no stop-the-world rehash of a billion-entry table.
//! With the `off-heap` feature (enabled by default) the index generations and
//! the offset slabs live in anonymous memory maps instead of the global
//! allocator, which keeps huge primitive arrays out of the allocator's
//! bookkeeping; everything is released when the table is dropped.
//!
//! ### Example: Interning & Sequences
//!
//! ```
//! use sequence_interner::DefaultSymbolTable;
//!
//! let mut table = DefaultSymbolTable::new();
//! let (elephant, found) = table.try_get_or_intern("Elephant").unwrap();
//! assert!(!found);
//! assert_eq!(elephant.to_u32(), 1);
//!
//! let (tiger, found) = table.try_get_or_intern("Tiger").unwrap();
//! assert!(!found);
//! assert_eq!(tiger.to_u32(), 2);
//!
//! // Interning the same string again yields the same sequence.
//! let (again, found) = table.try_get_or_intern("Tiger").unwrap();
//! assert!(found);
//! assert_eq!(again, tiger);
//! ```
//!
//! ### Example: Look-up without interning
//!
//! ```
//! # use sequence_interner::DefaultSymbolTable;
//! let mut table = DefaultSymbolTable::new();
//! assert_eq!(table.get("hat"), None);
//! let hat = table.get_or_intern("hat");
//! assert_eq!(table.get("hat"), Some(hat));
//! ```
//!
//! ### Example: Resolve
//!
//! ```
//! # use sequence_interner::DefaultSymbolTable;
//! let mut table = DefaultSymbolTable::new();
//! let banana = table.get_or_intern("Banana");
//! assert_eq!(table.resolve(banana), "Banana");
//! ```
//!
//! ### Example: Creation by `FromIterator` and iteration
//!
//! ```
//! # use sequence_interner::DefaultSymbolTable;
//! let table = ["Earth", "Water", "Fire", "Air", "Water"]
//!     .into_iter()
//!     .collect::<DefaultSymbolTable>();
//! assert_eq!(table.len(), 4);
//! for (sequence, string) in &table {
//!     println!("{} = {}", sequence.to_u32(), string);
//! }
//! ```
//!
//! ### Example: Use a different hasher
//!
//! ```
//! use sequence_interner::{BufferBank, SymbolTable};
//! use fxhash::FxBuildHasher;
//!
//! let mut table = SymbolTable::<BufferBank, FxBuildHasher>::new();
//! let fox = table.get_or_intern("Fire Fox");
//! assert_eq!(table.resolve(fox), "Fire Fox");
//! ```

extern crate alloc;

mod arena;
pub mod bank;
mod compat;
mod error;
mod intbank;
mod sequence;
#[cfg(feature = "serde-1")]
mod serde_impl;
mod symbol_table;
mod table;

#[doc(inline)]
pub use self::{
    bank::{BufferBank, StringBank},
    compat::DefaultHashBuilder,
    error::{Error, Result},
    sequence::Sequence,
    symbol_table::{Iter, SymbolTable},
};

/// The symbol table type that is used by default.
pub type DefaultSymbolTable = SymbolTable<BufferBank, DefaultHashBuilder>;
