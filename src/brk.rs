//! The operating-system side of the arena: something with a frontier
//! ("break") that can be queried and pushed forward.

use std::{io, ptr};

use libc::{c_void, intptr_t, sbrk};

/// Query and extend a program-break style frontier.
pub trait BreakSource {
  /// Current frontier; the first byte not yet handed out.
  fn current_break(&self) -> *mut u8;

  /// Moves the frontier forward by `increment` bytes and returns its
  /// previous value. Either the whole increment is granted or nothing is.
  fn extend_break(
    &mut self,
    increment: usize,
  ) -> io::Result<*mut u8>;
}

/// The process program break, moved with `sbrk(2)`.
///
/// Only one arena should sit on top of it. Anything else in the process that
/// moves the break (the platform `malloc` included) interleaves its memory
/// with the arena's blocks; the chain stays consistent but the arena length
/// counts those bytes against its ceiling.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sbrk;

impl BreakSource for Sbrk {
  fn current_break(&self) -> *mut u8 {
    unsafe { sbrk(0) as *mut u8 }
  }

  fn extend_break(
    &mut self,
    increment: usize,
  ) -> io::Result<*mut u8> {
    let increment = intptr_t::try_from(increment)
      .map_err(|_| io::Error::from_raw_os_error(libc::ENOMEM))?;

    let address = unsafe { sbrk(increment) };

    if address == usize::MAX as *mut c_void {
      return Err(io::Error::last_os_error());
    }

    Ok(address as *mut u8)
  }
}

/// A private, fixed-capacity stand-in for the program break.
///
/// The whole capacity is reserved up front with an anonymous mapping; the
/// simulated break only moves inside it and refuses to pass its end with
/// `ENOMEM`, the way `sbrk` does when the kernel says no.
#[derive(Debug)]
pub struct Region {
  base: *mut u8,
  len: usize,
  capacity: usize,
}

impl Region {
  pub fn reserve(capacity: usize) -> io::Result<Self> {
    if capacity == 0 {
      return Err(io::Error::from(io::ErrorKind::InvalidInput));
    }

    let base = unsafe {
      libc::mmap(
        ptr::null_mut(),
        capacity,
        libc::PROT_READ | libc::PROT_WRITE,
        libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
        -1,
        0,
      )
    };

    if base == libc::MAP_FAILED {
      return Err(io::Error::last_os_error());
    }

    Ok(Self {
      base: base as *mut u8,
      len: 0,
      capacity,
    })
  }

  pub fn base(&self) -> *mut u8 {
    self.base
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Bytes between the base and the simulated break.
  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }
}

impl BreakSource for Region {
  fn current_break(&self) -> *mut u8 {
    self.base.wrapping_add(self.len)
  }

  fn extend_break(
    &mut self,
    increment: usize,
  ) -> io::Result<*mut u8> {
    if increment > self.capacity - self.len {
      return Err(io::Error::from_raw_os_error(libc::ENOMEM));
    }

    let previous = self.current_break();
    self.len += increment;

    Ok(previous)
  }
}

impl Drop for Region {
  fn drop(&mut self) {
    unsafe {
      libc::munmap(self.base as *mut c_void, self.capacity);
    }
  }
}

// SAFETY: the mapping is owned exclusively by the `Region` and is only
// reached through `&mut self` or through the arena that owns the `Region`.
unsafe impl Send for Region {}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn region_extends_until_capacity() {
    let mut region = Region::reserve(4096).unwrap();
    let base = region.base();

    assert!(region.is_empty());
    assert_eq!(region.current_break(), base);

    let first = region.extend_break(1000).unwrap();
    assert_eq!(first, base);
    assert_eq!(region.current_break(), base.wrapping_add(1000));

    let second = region.extend_break(3096).unwrap();
    assert_eq!(second, base.wrapping_add(1000));
    assert_eq!(region.len(), 4096);

    let denied = region.extend_break(1).unwrap_err();
    assert_eq!(denied.raw_os_error(), Some(libc::ENOMEM));
    assert_eq!(region.len(), 4096);
  }

  #[test]
  fn region_memory_is_writable() {
    let mut region = Region::reserve(64).unwrap();
    let at = region.extend_break(64).unwrap();

    unsafe {
      ptr::write_bytes(at, 0xAB, 64);
      assert_eq!(*at.add(63), 0xAB);
    }
  }

  #[test]
  fn zero_capacity_is_rejected() {
    assert!(Region::reserve(0).is_err());
  }

  #[test]
  fn sbrk_reports_a_break() {
    assert!(!Sbrk.current_break().is_null());
  }
}
