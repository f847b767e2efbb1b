//! Diagnostics hooks. The heap reports what it did; it never asks an
//! observer anything back.

use std::fmt;

use tracing::{debug, trace, warn};

use crate::{block::BlockInfo, error::HeapError};

/// Extension points invoked by [`crate::Heap`]. Every hook defaults to a no-op.
pub trait HeapObserver {
  fn on_init(
    &mut self,
    _start: usize,
  ) {
  }

  /// A block was appended at the old frontier.
  fn on_grow(
    &mut self,
    _block: BlockInfo,
    _heap_len: usize,
  ) {
  }

  /// `block` was truncated and `remainder` carved from its tail.
  fn on_split(
    &mut self,
    _block: BlockInfo,
    _remainder: BlockInfo,
  ) {
  }

  /// `block` was handed to a caller.
  fn on_assign(
    &mut self,
    _block: BlockInfo,
    _heap_end: usize,
    _heap_len: usize,
  ) {
  }

  fn on_alloc_failure(
    &mut self,
    _requested: usize,
    _error: &HeapError,
  ) {
  }

  fn on_release(
    &mut self,
    _block: BlockInfo,
  ) {
  }

  /// A release request was ignored.
  fn on_reject(
    &mut self,
    _address: usize,
    _error: &HeapError,
  ) {
  }
}

/// Formats an address as `0x…` in event fields.
struct Hex(usize);

impl fmt::Display for Hex {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "{:#x}", self.0)
  }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl HeapObserver for NoopObserver {}

/// Emits one `tracing` event per hook.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl HeapObserver for TracingObserver {
  fn on_init(
    &mut self,
    start: usize,
  ) {
    debug!(start = %Hex(start), "heap starts");
  }

  fn on_grow(
    &mut self,
    block: BlockInfo,
    heap_len: usize,
  ) {
    trace!(
      header = %Hex(block.header),
      size = block.size,
      heap_len,
      "heap grown"
    );
  }

  fn on_split(
    &mut self,
    block: BlockInfo,
    remainder: BlockInfo,
  ) {
    trace!(
      header = %Hex(block.header),
      size = block.size,
      remainder = %Hex(remainder.header),
      remainder_size = remainder.size,
      "block split"
    );
  }

  fn on_assign(
    &mut self,
    block: BlockInfo,
    heap_end: usize,
    heap_len: usize,
  ) {
    debug!(
      from = %Hex(block.header),
      to = %Hex(block.end()),
      heap_end = %Hex(heap_end),
      heap_len,
      "memory assigned"
    );
  }

  fn on_alloc_failure(
    &mut self,
    requested: usize,
    error: &HeapError,
  ) {
    warn!(requested, %error, "allocation failed");
  }

  fn on_release(
    &mut self,
    block: BlockInfo,
  ) {
    debug!(header = %Hex(block.header), "memory freed");
  }

  fn on_reject(
    &mut self,
    address: usize,
    error: &HeapError,
  ) {
    warn!(address = %Hex(address), %error, "release ignored");
  }
}
