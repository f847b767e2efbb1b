use std::mem;

use crate::config::ALIGNMENT;

/// Calculates the machine word alignment for the given size.
///
/// # Examples
///
/// ```rust
/// use std::mem;
/// use brkalloc::align;
///
/// match mem::size_of::<usize>() {
///     8 => assert_eq!(align!(13), 16), // 64 bit machine.
///     4 => assert_eq!(align!(11), 12), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + mem::size_of::<usize>() - 1) & !(mem::size_of::<usize>() - 1)
  };
}

/// Rounds a requested byte count up to the allocator's granularity.
///
/// Sizes that are already a multiple of [`ALIGNMENT`] come back unchanged.
/// Wraps for `requested` within `ALIGNMENT - 1` of `usize::MAX`; the heap
/// goes through [`checked_align_size`].
pub const fn align_size(requested: usize) -> usize {
  const _: () = assert!(ALIGNMENT == mem::size_of::<usize>());
  align!(requested)
}

/// Like [`align_size`], but `None` when rounding up would overflow.
pub const fn checked_align_size(requested: usize) -> Option<usize> {
  match requested.checked_add(ALIGNMENT - 1) {
    Some(padded) => Some(padded & !(ALIGNMENT - 1)),
    None => None,
  }
}
