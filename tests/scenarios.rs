//! The scripted allocate/release sequences the allocator was first exercised
//! with, each on a fresh arena.

use brkalloc::{HEADER_SIZE, Heap, HeapConfig, MAX_HEAP_BYTES, NoopObserver, Region, align::align_size};
use pretty_assertions::assert_eq;

fn fresh_heap() -> Heap<Region, NoopObserver> {
  let region = Region::reserve(2 * MAX_HEAP_BYTES).unwrap();
  Heap::new(region).with_observer(NoopObserver)
}

#[test]
fn two_ints_allocated_then_released() {
  let mut heap = fresh_heap();

  let x = heap.allocate(size_of::<i32>()) as *mut i32;
  let y = heap.allocate(size_of::<i32>()) as *mut i32;
  assert!(!x.is_null() && !y.is_null());
  assert_ne!(x, y);

  unsafe {
    x.write(-1);
    y.write(7);
    assert_eq!(x.read(), -1);
  }

  heap.release(x as *mut u8);
  heap.release(y as *mut u8);

  let availability: Vec<bool> = heap.blocks().map(|block| block.available).collect();
  assert_eq!(availability, vec![true, true]);
}

#[test]
fn allocate_release_allocate_reuses_the_block() {
  let mut heap = fresh_heap();

  let x = heap.allocate(size_of::<i32>());
  heap.release(x);
  let y = heap.allocate(size_of::<i32>());
  heap.release(y);

  assert_eq!(x, y);
  assert_eq!(heap.blocks().count(), 1);
}

#[test]
fn chars_fill_a_released_long() {
  let mut heap = fresh_heap();

  let long = heap.allocate(size_of::<i64>());
  heap.release(long);
  let heap_len = heap.heap_len();

  let chars: Vec<*mut u8> = (0..5).map(|_| heap.allocate(1)).collect();
  assert_eq!(chars[0], long);
  assert!(chars.iter().all(|c| !c.is_null()));

  // Too small to split: only the first char lands in the long's block.
  assert_eq!(heap.heap_len(), heap_len + 4 * (align_size(1) + HEADER_SIZE));

  for c in chars {
    heap.release(c);
  }
  assert!(heap.blocks().all(|block| block.available));
}

#[test]
fn one_block_released_three_times() {
  let mut heap = fresh_heap();

  let long = heap.allocate(size_of::<i64>());
  heap.release(long);
  let once: Vec<_> = heap.blocks().collect();

  heap.release(long);
  heap.release(long);

  assert_eq!(heap.blocks().collect::<Vec<_>>(), once);
  assert_eq!(heap.allocate(size_of::<i64>()), long);
}

#[test]
fn char_reuses_the_released_middle_long() {
  let mut heap = fresh_heap();

  let first = heap.allocate(size_of::<i64>());
  let middle = heap.allocate(size_of::<i64>());
  let last = heap.allocate(size_of::<i64>());
  assert!(first < middle && middle < last);

  heap.release(middle);
  let heap_len = heap.heap_len();

  let c = heap.allocate(1);
  assert_eq!(c, middle);
  assert_eq!(heap.heap_len(), heap_len);
  heap.release(c);
}

#[test]
fn allocating_longs_until_memory_runs_out() {
  let mut heap = fresh_heap();
  let unit = align_size(size_of::<i64>()) + HEADER_SIZE;

  let mut served = 0;
  while !heap.allocate(size_of::<i64>()).is_null() {
    served += 1;
  }

  assert_eq!(served, MAX_HEAP_BYTES / unit);
  assert!(heap.heap_len() <= MAX_HEAP_BYTES);
  assert!(heap.heap_len() + unit > MAX_HEAP_BYTES);
}

#[test]
fn smaller_ceiling_from_config() {
  let region = Region::reserve(64 * 1024).unwrap();
  let mut heap = Heap::with_config(region, HeapConfig::with_max_heap_bytes(1024)).with_observer(NoopObserver);

  assert!(!heap.allocate(512).is_null());
  assert!(heap.allocate(1024).is_null());
  assert!(!heap.allocate(256).is_null());
  assert!(heap.heap_len() <= 1024);
}
