use std::{
  io,
  ptr::{self, NonNull},
};

use crate::{
  align::{align_size, checked_align_size},
  block::{BlockInfo, HEADER_SIZE, Header, NIL, TAG},
  brk::{BreakSource, Sbrk},
  config::{ALIGNMENT, HeapConfig},
  error::{HeapError, HeapResult},
  observer::{HeapObserver, TracingObserver},
};

/// A first-fit free-list allocator over memory taken from a [`BreakSource`].
///
/// Blocks are laid out back to back from `start`, each one a [`Header`]
/// followed by its data. Headers are only ever added, never removed:
/// releasing a block flips its availability and nothing else.
pub struct Heap<B: BreakSource = Sbrk, O: HeapObserver = TracingObserver> {
  source: B,
  observer: O,
  config: HeapConfig,
  start: Option<NonNull<u8>>,
  /// Offset of the first header in the chain.
  head: Option<usize>,
  /// Offset of the last header in the chain.
  frontier: Option<usize>,
}

impl<B: BreakSource> Heap<B, TracingObserver> {
  pub fn new(source: B) -> Self {
    Self::with_config(source, HeapConfig::default())
  }

  pub fn with_config(
    source: B,
    config: HeapConfig,
  ) -> Self {
    Self {
      source,
      observer: TracingObserver,
      config,
      start: None,
      head: None,
      frontier: None,
    }
  }
}

impl<B: BreakSource, O: HeapObserver> Heap<B, O> {
  /// Replaces the diagnostics sink.
  pub fn with_observer<P: HeapObserver>(
    self,
    observer: P,
  ) -> Heap<B, P> {
    Heap {
      source: self.source,
      observer,
      config: self.config,
      start: self.start,
      head: self.head,
      frontier: self.frontier,
    }
  }

  /// First byte of the arena, once the first allocation has claimed it.
  pub fn start(&self) -> Option<NonNull<u8>> {
    self.start
  }

  pub fn is_initialized(&self) -> bool {
    self.start.is_some()
  }

  /// Bytes between the arena start and the current break.
  pub fn heap_len(&self) -> usize {
    match self.start {
      Some(start) => self
        .source
        .current_break()
        .addr()
        .saturating_sub(start.as_ptr().addr()),
      None => 0,
    }
  }

  /// Walks the chain in address order.
  pub fn blocks(&self) -> Blocks<'_, B, O> {
    Blocks {
      heap: self,
      cursor: self.head,
    }
  }

  /// Allocates at least `requested` bytes, or returns null when the arena
  /// is out of memory.
  pub fn allocate(
    &mut self,
    requested: usize,
  ) -> *mut u8 {
    match self.try_allocate(requested) {
      Ok(data) => data.as_ptr(),
      Err(error) => {
        self.observer.on_alloc_failure(requested, &error);
        ptr::null_mut()
      }
    }
  }

  pub fn try_allocate(
    &mut self,
    requested: usize,
  ) -> HeapResult<NonNull<u8>> {
    let ceiling = self.config.max_heap_bytes;
    let out_of_memory = || HeapError::OutOfMemory {
      requested,
      heap_len: self.heap_len(),
      ceiling,
    };

    if requested > ceiling {
      return Err(out_of_memory());
    }

    let size = checked_align_size(requested)
      .ok_or_else(out_of_memory)?
      .max(ALIGNMENT);

    let fit = match self.start {
      Some(_) => self.find_fit(size),
      None => {
        let start = self.initialize()?;
        self.observer.on_init(start.as_ptr().addr());
        None
      }
    };

    let offset = match fit {
      Some(offset) => {
        self.maybe_split(offset, size);
        offset
      }
      None => self.grow(size)?,
    };

    let block = self.block_info(offset, &self.header(offset));
    let heap_end = self.source.current_break().addr();
    let heap_len = self.heap_len();
    self.observer.on_assign(block, heap_end, heap_len);

    Ok(self.at(offset + HEADER_SIZE))
  }

  /// Marks the block behind `data` available again. Pointers this arena
  /// does not recognise are ignored.
  pub fn release(
    &mut self,
    data: *mut u8,
  ) {
    if let Err(error) = self.try_release(data) {
      self.observer.on_reject(data.addr(), &error);
    }
  }

  pub fn try_release(
    &mut self,
    data: *mut u8,
  ) -> HeapResult<()> {
    let address = data.addr();
    let invalid = || HeapError::InvalidPointer { address };

    let start = self.start.ok_or_else(invalid)?.as_ptr().addr();
    let end = self.source.current_break().addr();
    if address < start || address >= end {
      return Err(invalid());
    }

    let offset = self.resolve_header(address - start).ok_or_else(invalid)?;
    if !self.is_owned(offset) {
      return Err(invalid());
    }

    let mut header = self.header(offset);
    if header.is_available() {
      return Err(HeapError::DoubleRelease { address });
    }

    header.set_available(true);
    self.write_header(offset, header);

    let block = self.block_info(offset, &header);
    self.observer.on_release(block);

    Ok(())
  }

  /// Claims the current break as the arena start, padding it up to
  /// [`ALIGNMENT`] first if needed.
  fn initialize(&mut self) -> HeapResult<NonNull<u8>> {
    let brk = self.source.current_break();
    let padding = align_size(brk.addr()) - brk.addr();

    if padding > 0 {
      self
        .source
        .extend_break(padding)
        .map_err(|source| HeapError::BreakDenied {
          increment: padding,
          source,
        })?;
    }

    let start = NonNull::new(brk.wrapping_add(padding)).ok_or_else(|| {
      HeapError::BreakDenied {
        increment: padding,
        source: io::Error::from(io::ErrorKind::AddrNotAvailable),
      }
    })?;

    self.start = Some(start);

    Ok(start)
  }

  /// Appends a block of `size` usable bytes at the current break.
  fn grow(
    &mut self,
    size: usize,
  ) -> HeapResult<usize> {
    let heap_len = self.heap_len();
    let ceiling = self.config.max_heap_bytes;
    let out_of_memory = HeapError::OutOfMemory {
      requested: size,
      heap_len,
      ceiling,
    };

    let increment = match size.checked_add(HEADER_SIZE) {
      Some(increment) if heap_len <= ceiling && increment <= ceiling - heap_len => increment,
      _ => return Err(out_of_memory),
    };

    // A break below the start cannot host a block; refuse before moving it.
    let start = self.start_addr();
    if self.source.current_break().addr() < start {
      return Err(out_of_memory);
    }

    let previous = self
      .source
      .extend_break(increment)
      .map_err(|source| HeapError::BreakDenied { increment, source })?;

    let offset = previous.addr() - start;

    let header = Header::new(size, false, NIL);
    self.write_header(offset, header);

    match self.frontier {
      Some(last) => {
        let mut last_header = self.header(last);
        last_header.next = offset;
        self.write_header(last, last_header);
      }
      None => self.head = Some(offset),
    }
    self.frontier = Some(offset);

    let block = self.block_info(offset, &header);
    let heap_len = self.heap_len();
    self.observer.on_grow(block, heap_len);

    Ok(offset)
  }

  /// First available block of at least `size` bytes. The block is claimed
  /// before it is returned.
  fn find_fit(
    &mut self,
    size: usize,
  ) -> Option<usize> {
    let mut cursor = self.head;

    while let Some(offset) = cursor {
      let mut header = self.header(offset);

      if header.is_available() && header.size >= size {
        header.set_available(false);
        self.write_header(offset, header);
        return Some(offset);
      }

      cursor = header.next();
    }

    None
  }

  /// Carves the tail of the block at `offset` into a new free block when
  /// there is room for a header and at least one alignment unit beyond
  /// `size`.
  fn maybe_split(
    &mut self,
    offset: usize,
    size: usize,
  ) {
    let mut header = self.header(offset);
    if header.size - size <= HEADER_SIZE {
      return;
    }

    let tail_offset = offset + HEADER_SIZE + size;
    let tail = Header::new(header.size - size - HEADER_SIZE, true, header.next);
    self.write_header(tail_offset, tail);

    header.size = size;
    header.next = tail_offset;
    self.write_header(offset, header);

    if self.frontier == Some(offset) {
      self.frontier = Some(tail_offset);
    }

    let block = self.block_info(offset, &header);
    let remainder = self.block_info(tail_offset, &tail);
    self.observer.on_split(block, remainder);
  }

  /// Header offset for a data pointer at `data_offset` from the start.
  /// The caller has already checked the pointer lies inside the arena.
  fn resolve_header(
    &self,
    data_offset: usize,
  ) -> Option<usize> {
    data_offset.checked_sub(HEADER_SIZE)
  }

  fn is_owned(
    &self,
    offset: usize,
  ) -> bool {
    unsafe { Header::load_tag(self.at(offset).as_ptr()) == TAG }
  }

  fn start_addr(&self) -> usize {
    self.start.map_or(0, |start| start.as_ptr().addr())
  }

  fn at(
    &self,
    offset: usize,
  ) -> NonNull<u8> {
    let start = self.start.unwrap_or(NonNull::dangling());
    unsafe { start.add(offset) }
  }

  fn header(
    &self,
    offset: usize,
  ) -> Header {
    unsafe { Header::load(self.at(offset).as_ptr()) }
  }

  fn write_header(
    &mut self,
    offset: usize,
    header: Header,
  ) {
    unsafe { header.store(self.at(offset).as_ptr()) }
  }

  fn block_info(
    &self,
    offset: usize,
    header: &Header,
  ) -> BlockInfo {
    BlockInfo::new(self.start_addr(), offset, header)
  }
}

// SAFETY: the arena's pointers refer only to memory claimed through its own
// `BreakSource`, which it owns; moving the heap moves that ownership along.
unsafe impl<B: BreakSource + Send, O: HeapObserver + Send> Send for Heap<B, O> {}

/// Iterator over the chain returned by [`Heap::blocks`].
pub struct Blocks<'a, B: BreakSource, O: HeapObserver> {
  heap: &'a Heap<B, O>,
  cursor: Option<usize>,
}

impl<B: BreakSource, O: HeapObserver> Iterator for Blocks<'_, B, O> {
  type Item = BlockInfo;

  fn next(&mut self) -> Option<BlockInfo> {
    let offset = self.cursor?;
    let header = self.heap.header(offset);
    self.cursor = header.next();

    Some(self.heap.block_info(offset, &header))
  }
}
