//! Runs the scripted allocation scenarios with trace output.
//!
//! ```text
//! RUST_LOG=brkalloc=trace cargo run --example scenarios            # private region
//! RUST_LOG=brkalloc=trace cargo run --example scenarios -- --sbrk  # real program break
//! ```

use std::io;

use brkalloc::{BreakSource, Heap, MAX_HEAP_BYTES, Region, Sbrk};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Two ints allocated, then both released.
fn two_ints<B: BreakSource>(heap: &mut Heap<B>) {
  let x = heap.allocate(size_of::<i32>());
  let y = heap.allocate(size_of::<i32>());
  heap.release(x);
  heap.release(y);
}

/// Allocate, release, allocate again, release.
fn alloc_free_alloc<B: BreakSource>(heap: &mut Heap<B>) {
  let x = heap.allocate(size_of::<i32>());
  heap.release(x);
  let y = heap.allocate(size_of::<i32>());
  heap.release(y);
}

/// A long is released and five chars try to reuse its space.
fn long_then_chars<B: BreakSource>(heap: &mut Heap<B>) {
  let x = heap.allocate(size_of::<i64>());
  heap.release(x);

  let chars: Vec<*mut u8> = (0..5).map(|_| heap.allocate(1)).collect();
  for c in chars {
    heap.release(c);
  }
}

/// One allocation released three times.
fn release_thrice<B: BreakSource>(heap: &mut Heap<B>) {
  let x = heap.allocate(size_of::<i64>());
  heap.release(x);
  heap.release(x);
  heap.release(x);
}

/// Three longs, the middle one released and reused by a char.
fn reuse_middle<B: BreakSource>(heap: &mut Heap<B>) {
  let _first = heap.allocate(size_of::<i64>());
  let middle = heap.allocate(size_of::<i64>());
  let _last = heap.allocate(size_of::<i64>());
  heap.release(middle);

  let c = heap.allocate(1);
  info!(reused = c == middle, "char placed");
  heap.release(c);
}

/// Longs until the arena refuses.
fn exhaust<B: BreakSource>(heap: &mut Heap<B>) {
  for served in 0..MAX_HEAP_BYTES {
    if heap.allocate(size_of::<i64>()).is_null() {
      info!(served, "ran out of memory");
      break;
    }
  }
}

fn run<B: BreakSource>(mut source: impl FnMut() -> io::Result<B>) -> io::Result<()> {
  let scenarios: [(&str, fn(&mut Heap<B>)); 6] = [
    ("two ints", two_ints),
    ("alloc, free, alloc", alloc_free_alloc),
    ("long then chars", long_then_chars),
    ("release thrice", release_thrice),
    ("reuse middle", reuse_middle),
    ("exhaust", exhaust),
  ];

  for (name, scenario) in scenarios {
    let _span = tracing::info_span!("scenario", name).entered();
    let mut heap = Heap::new(source()?);
    scenario(&mut heap);
    info!(heap_len = heap.heap_len(), blocks = heap.blocks().count(), "done");
  }

  Ok(())
}

fn main() -> io::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("brkalloc=debug,scenarios=info")))
    .init();

  if std::env::args().any(|arg| arg == "--sbrk") {
    run(|| Ok(Sbrk))
  } else {
    run(|| Region::reserve(2 * MAX_HEAP_BYTES))
  }
}
