//! # brkalloc - A First-Fit Free-List Allocator
//!
//! This crate provides a small **free-list allocator** that manages one
//! contiguous range of memory grown with the `sbrk` system call, without
//! going through the platform `malloc`.
//!
//! ## Overview
//!
//! Every block carries a header and the headers form a chain in address
//! order. Allocation walks the chain for the first free block that is big
//! enough, splitting it when the leftover can hold another block, and only
//! grows the heap when nothing fits:
//!
//! ```text
//!   Free-List Allocator Concept:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                         HEAP MEMORY                                  │
//!   │                                                                      │
//!   │   ┌─────┬─────┬─────┬─────┬─────┐                                    │
//!   │   │ A1  │free │ A3  │free │ A5  │                                    │
//!   │   └─────┴─────┴─────┴─────┴─────┘                                    │
//!   │   ▲        ▲                    ▲                                    │
//!   │   │        │                    │                                    │
//!   │ start   first fit           Program                                  │
//!   │         (reused)             Break                                   │
//!   │                                                                      │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   Freed blocks stay in the chain and are handed out again.
//!   Growth happens only when no free block fits.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   brkalloc
//!   ├── align      - Alignment macro and size rounding
//!   ├── block      - Block header layout and snapshots
//!   ├── brk        - Program break sources (sbrk, reserved region)
//!   ├── config     - Build-time constants and per-arena settings
//!   ├── error      - HeapError
//!   ├── global     - Process-wide allocate/release
//!   ├── heap       - Heap: growth, first fit, splitting, validation
//!   └── observer   - Diagnostics hooks (tracing)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use brkalloc::{Heap, Region};
//!
//! let region = Region::reserve(1 << 20).unwrap();
//! let mut heap = Heap::new(region);
//!
//! let data = heap.allocate(8) as *mut u64;
//! assert!(!data.is_null());
//!
//! unsafe { data.write(42) };
//! heap.release(data as *mut u8);
//! ```
//!
//! ## How It Works
//!
//! Each block is a header followed by its data:
//!
//! ```text
//!   Single Allocation:
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    Block Header       │         User Data              │
//!   │  ┌─────────────────┐  │                                │
//!   │  │ size: N         │  │  ┌──────────────────────────┐  │
//!   │  │ next: offset    │  │  │                          │  │
//!   │  │ tag: TAG        │  │  │     N bytes usable       │  │
//!   │  │ available       │  │  │                          │  │
//!   │  └─────────────────┘  │  └──────────────────────────┘  │
//!   │      24 bytes         │                                │
//!   └───────────────────────┴────────────────────────────────┘
//!                           ▲
//!                           └── Pointer returned to user
//! ```
//!
//! A free block larger than the request plus one header is split:
//!
//! ```text
//!   Before:  ┌──────┬──────────────────────────────────────┐
//!            │ hdr  │            free (256)                │
//!            └──────┴──────────────────────────────────────┘
//!   After:   ┌──────┬──────┬──────┬────────────────────────┐
//!            │ hdr  │ 16   │ hdr  │      free (216)        │
//!            └──────┴──────┴──────┴────────────────────────┘
//! ```
//!
//! Releasing checks that the pointer lies inside `[start, break)` and that
//! the header in front of it carries [`TAG`]; anything else is ignored.
//!
//! ## Limitations
//!
//! - **Single-threaded arenas**: a `Heap` takes `&mut self`; the [`global`]
//!   instance is behind a lock
//! - **No coalescing**: neighbouring free blocks are never merged
//! - **Never shrinks**: memory is not returned to the OS
//! - **Heuristic validation**: a double release is detected, a forged tag is not
//! - **Unix-only**: requires `libc` (`sbrk`, `mmap`)

pub mod align;
pub mod block;
pub mod brk;
pub mod config;
pub mod error;
pub mod global;
mod heap;
pub mod observer;

pub use block::{BlockInfo, HEADER_SIZE, TAG};
pub use brk::{BreakSource, Region, Sbrk};
pub use config::{ALIGNMENT, HeapConfig, MAX_HEAP_BYTES};
pub use error::{HeapError, HeapResult};
pub use heap::{Blocks, Heap};
pub use observer::{HeapObserver, NoopObserver, TracingObserver};
