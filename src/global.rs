//! The process-wide arena on top of the real program break.
//!
//! The arena is created on the first [`allocate`] call with
//! [`HeapConfig::from_env`] and lives for the rest of the process. The lock
//! only serialises callers; the allocator itself is still the single-arena,
//! never-shrinking design of [`Heap`].

use parking_lot::{Mutex, const_mutex};

use crate::{brk::Sbrk, config::HeapConfig, heap::Heap};

static HEAP: Mutex<Option<Heap<Sbrk>>> = const_mutex(None);

/// Allocates `size` bytes from the process arena. Null means out of memory.
pub fn allocate(size: usize) -> *mut u8 {
  let mut heap = HEAP.lock();

  heap
    .get_or_insert_with(|| Heap::with_config(Sbrk, HeapConfig::from_env()))
    .allocate(size)
}

/// Returns a block obtained from [`allocate`]. Anything else is ignored.
pub fn release(ptr: *mut u8) {
  if let Some(heap) = HEAP.lock().as_mut() {
    heap.release(ptr);
  }
}

/// Length of the process arena, 0 before the first allocation.
pub fn heap_len() -> usize {
  HEAP.lock().as_ref().map_or(0, |heap| heap.heap_len())
}
