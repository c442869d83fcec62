//! Owned, typed, zero-initialized memory blocks.
//!
//! The hash-index generations and the sequence-bank slabs can grow to
//! billions of entries. Backing them with anonymous memory maps keeps those
//! allocations out of the global allocator and hands the zeroing to the
//! kernel's demand paging. With the `off-heap` feature disabled the same
//! [`Block`] API is served by ordinary boxed slices, which is equally correct
//! and only matters for huge tables.

use crate::Result;
use cfg_if::cfg_if;
use core::ops::{Deref, DerefMut};

/// Element types that may be stored in a [`Block`].
///
/// # Safety
///
/// Implementors must be plain old data: every bit pattern, in particular the
/// all-zero pattern, must be a valid value, and dropping must be a no-op.
pub(crate) unsafe trait Pod: Copy + 'static {
    /// The all-zero value a fresh block is filled with.
    const ZERO: Self;
}

// SAFETY: every bit pattern is a valid `usize`.
unsafe impl Pod for usize {
    const ZERO: Self = 0;
}

cfg_if! {
    if #[cfg(feature = "off-heap")] {
        use crate::Error;
        use core::marker::PhantomData;

        /// A fixed-size array of `T` in an anonymous memory map.
        ///
        /// The mapping is created zero-filled and released on drop. Zero-length
        /// blocks do not map anything.
        pub(crate) struct Block<T: Pod> {
            map: Option<memmap2::MmapMut>,
            len: usize,
            marker: PhantomData<T>,
        }

        impl<T: Pod> Block<T> {
            /// Creates a block without any backing storage.
            pub(crate) fn empty() -> Self {
                Self {
                    map: None,
                    len: 0,
                    marker: PhantomData,
                }
            }

            /// Allocates a zero-filled block of `len` elements.
            pub(crate) fn zeroed(len: usize) -> Result<Self> {
                if len == 0 {
                    return Ok(Self::empty());
                }
                let bytes = len
                    .checked_mul(core::mem::size_of::<T>())
                    .ok_or(Error::OutOfMemory)?;
                let map = memmap2::MmapMut::map_anon(bytes).map_err(|_| Error::OutOfMemory)?;
                Ok(Self {
                    map: Some(map),
                    len,
                    marker: PhantomData,
                })
            }
        }

        impl<T: Pod> Deref for Block<T> {
            type Target = [T];

            #[inline]
            fn deref(&self) -> &[T] {
                match &self.map {
                    // SAFETY: the mapping spans at least `len * size_of::<T>()`
                    //         bytes, is page aligned (which satisfies any `T`
                    //         alignment used here), and `T: Pod` makes every
                    //         bit pattern valid.
                    Some(map) => unsafe {
                        core::slice::from_raw_parts(map.as_ptr().cast::<T>(), self.len)
                    },
                    None => &[],
                }
            }
        }

        impl<T: Pod> DerefMut for Block<T> {
            #[inline]
            fn deref_mut(&mut self) -> &mut [T] {
                match &mut self.map {
                    // SAFETY: same as `deref`, and the mapping is private to
                    //         this block so the exclusive borrow is unique.
                    Some(map) => unsafe {
                        core::slice::from_raw_parts_mut(map.as_mut_ptr().cast::<T>(), self.len)
                    },
                    None => &mut [],
                }
            }
        }
    } else {
        use crate::compat::{Box, Vec};

        /// A fixed-size array of `T` on the heap.
        pub(crate) struct Block<T: Pod> {
            data: Box<[T]>,
        }

        impl<T: Pod> Block<T> {
            /// Creates a block without any backing storage.
            pub(crate) fn empty() -> Self {
                Self {
                    data: Vec::new().into_boxed_slice(),
                }
            }

            /// Allocates a zero-filled block of `len` elements.
            pub(crate) fn zeroed(len: usize) -> Result<Self> {
                let mut data = Vec::new();
                data.try_reserve_exact(len)?;
                data.resize(len, T::ZERO);
                Ok(Self {
                    data: data.into_boxed_slice(),
                })
            }
        }

        impl<T: Pod> Deref for Block<T> {
            type Target = [T];

            #[inline]
            fn deref(&self) -> &[T] {
                &self.data
            }
        }

        impl<T: Pod> DerefMut for Block<T> {
            #[inline]
            fn deref_mut(&mut self) -> &mut [T] {
                &mut self.data
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Block;

    #[test]
    fn zeroed_block_is_zero_filled() {
        let block = Block::<usize>::zeroed(1024).unwrap();
        assert_eq!(block.len(), 1024);
        assert!(block.iter().all(|&value| value == 0));
    }

    #[test]
    fn writes_stick() {
        let mut block = Block::<usize>::zeroed(16).unwrap();
        block[3] = 37;
        block[15] = 43;
        assert_eq!(block[3], 37);
        assert_eq!(block[15], 43);
        assert_eq!(block[0], 0);
    }

    #[test]
    fn empty_block_allocates_nothing() {
        let block = Block::<usize>::empty();
        assert!(block.is_empty());
        let zeroed = Block::<usize>::zeroed(0).unwrap();
        assert!(zeroed.is_empty());
    }
}
