//! Arenas on the real program break. The break is shared by the whole
//! process, so these run one at a time.

use brkalloc::{BreakSource, HEADER_SIZE, Heap, NoopObserver, Sbrk, global};
use serial_test::serial;

#[test]
#[serial]
fn sbrk_arena_grows_the_program_break() {
  let mut heap = Heap::new(Sbrk).with_observer(NoopObserver);

  let before = Sbrk.current_break();
  let data = heap.allocate(64);
  assert!(!data.is_null());

  let start = heap.start().unwrap().as_ptr();
  assert!(start >= before);
  assert!(data.addr() >= start.addr() + HEADER_SIZE);
  assert!(data.addr() + 64 <= Sbrk.current_break().addr());

  unsafe {
    data.write_bytes(0x5A, 64);
    assert_eq!(*data.add(63), 0x5A);
  }

  heap.release(data);
  assert!(heap.blocks().any(|block| block.data() == data.addr() && block.available));

  assert_eq!(heap.allocate(32), data);
}

#[test]
#[serial]
fn global_api_round_trip() {
  let a = global::allocate(24);
  let b = global::allocate(24);
  assert!(!a.is_null() && !b.is_null());
  assert_ne!(a, b);
  assert!(global::heap_len() > 0);

  global::release(b);
  assert_eq!(global::allocate(16), b);

  global::release(std::ptr::null_mut());
  global::release(a);
  global::release(a);
}
