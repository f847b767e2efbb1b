use std::{mem, ptr};

use crate::config::ALIGNMENT;

/// Ownership marker written into every header this allocator creates.
pub const TAG: u32 = 0x5EA1_B10C;

/// Bytes occupied by a header in front of each data region.
pub const HEADER_SIZE: usize = mem::size_of::<Header>();

/// `next` value of the last block in the chain.
pub const NIL: usize = usize::MAX;

const _: () = assert!(HEADER_SIZE % ALIGNMENT == 0);

/// Metadata in front of every block's usable region.
///
/// `next` is an offset from the arena start rather than an address, and
/// `available` is a raw byte: the validator reads headers back from memory
/// it has not yet proven to be a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct Header {
  pub size: usize,
  pub next: usize,
  pub tag: u32,
  available: u8,
}

impl Header {
  pub fn new(
    size: usize,
    available: bool,
    next: usize,
  ) -> Self {
    Self {
      size,
      next,
      tag: TAG,
      available: available as u8,
    }
  }

  pub fn is_available(&self) -> bool {
    self.available != 0
  }

  pub fn set_available(
    &mut self,
    available: bool,
  ) {
    self.available = available as u8;
  }

  pub fn next(&self) -> Option<usize> {
    (self.next != NIL).then_some(self.next)
  }

  /// Reads the header stored at `at`.
  ///
  /// # Safety
  ///
  /// `at..at + HEADER_SIZE` must be readable. No alignment is required.
  pub unsafe fn load(at: *const u8) -> Self {
    unsafe { ptr::read_unaligned(at.cast::<Header>()) }
  }

  /// Writes `self` at `at`.
  ///
  /// # Safety
  ///
  /// `at..at + HEADER_SIZE` must be writable and not aliased by a live
  /// reference. No alignment is required.
  pub unsafe fn store(
    self,
    at: *mut u8,
  ) {
    unsafe { ptr::write_unaligned(at.cast::<Header>(), self) }
  }

  /// Reads only the tag of a candidate header at `at`.
  ///
  /// # Safety
  ///
  /// Same as [`Header::load`].
  pub unsafe fn load_tag(at: *const u8) -> u32 {
    unsafe {
      let header = at.cast::<Header>();
      ptr::read_unaligned(&raw const (*header).tag)
    }
  }
}

/// A snapshot of one block, as seen while walking the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
  /// Offset of the header from the arena start.
  pub offset: usize,
  /// Address of the header itself.
  pub header: usize,
  pub size: usize,
  pub available: bool,
}

impl BlockInfo {
  pub(crate) fn new(
    start: usize,
    offset: usize,
    header: &Header,
  ) -> Self {
    Self {
      offset,
      header: start + offset,
      size: header.size,
      available: header.is_available(),
    }
  }

  /// Address handed to the caller for this block.
  pub fn data(&self) -> usize {
    self.header + HEADER_SIZE
  }

  /// One past the last usable byte.
  pub fn end(&self) -> usize {
    self.data() + self.size
  }
}
