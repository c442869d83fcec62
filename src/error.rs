use alloc::collections;
use core::fmt;

/// An error object returned from fallible methods of the symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The table already assigned the maximum number of sequence numbers that
    /// still guarantees unique assignment within the 32-bit sequence space.
    OutOfSequences,
    /// An operation could not be completed, because it failed to allocate enough memory.
    OutOfMemory,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Error::OutOfSequences => "no more sequence numbers available",
            Error::OutOfMemory => "out of memory",
        })
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl From<collections::TryReserveError> for Error {
    fn from(_: collections::TryReserveError) -> Self {
        Error::OutOfMemory
    }
}

/// The type returned by fallible methods of the symbol table.
pub type Result<T> = core::result::Result<T, Error>;
