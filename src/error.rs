use std::io;

use thiserror::Error;

pub type HeapResult<T> = Result<T, HeapError>;

/// Everything that can go wrong inside an arena.
///
/// None of these escape [`crate::Heap::allocate`] or [`crate::Heap::release`]:
/// the first turns them into a null pointer, the second into a no-op.
#[derive(Error, Debug)]
pub enum HeapError {
  #[error("out of memory: requested {requested} bytes with {heap_len} bytes in use (ceiling {ceiling})")]
  OutOfMemory {
    requested: usize,
    heap_len: usize,
    ceiling: usize,
  },

  #[error("program break extension of {increment} bytes denied: {source}")]
  BreakDenied {
    increment: usize,
    #[source]
    source: io::Error,
  },

  #[error("invalid pointer: {address:#x} is not owned by this arena")]
  InvalidPointer { address: usize },

  #[error("double release of block at {address:#x}")]
  DoubleRelease { address: usize },
}

impl HeapError {
  /// True for the failures `allocate` reports as a null pointer.
  pub fn is_out_of_memory(&self) -> bool {
    matches!(self, Self::OutOfMemory { .. } | Self::BreakDenied { .. })
  }
}
