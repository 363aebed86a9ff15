use std::ptr::NonNull;

use crate::{
  align::checked_round_up,
  block::Block,
  chunk::{Chunk, ChunkHandle, ChunkTable},
  error::{ArenaError, ProviderError},
  provider::MemoryProvider,
};

/// One allocation request, already routed to a size class.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BumpRequest {
  pub exponent: u32,
  pub class_size: usize,
  pub align: usize,
  pub chunk_bytes: usize,
}

impl BumpRequest {
  #[inline]
  fn chunk_capacity(&self) -> usize {
    self.chunk_bytes.max(self.class_size)
  }
}

/// The chunk chain of one size class.
///
/// `chain` keeps the newest chunk last; only that chunk is ever bumped.
/// Older chunks stay in the chain untouched until the allocator is released.
#[derive(Debug, Default)]
pub(crate) struct Bucket {
  chain: Vec<ChunkHandle>,
  cursor: usize,
}

/// Returns `(offset, end)` of a `size`-byte slot at `cursor` aligned to `align`.
#[inline(always)]
fn fit(
  block: &Block,
  cursor: usize,
  size: usize,
  align: usize,
) -> Option<(usize, usize)> {
  let base = block.addr();
  let offset = checked_round_up(base.checked_add(cursor)?, align)? - base;
  let end = offset.checked_add(size)?;

  (end <= block.size()).then_some((offset, end))
}

impl Bucket {
  pub(crate) const fn new() -> Self {
    Self {
      chain: Vec::new(),
      cursor: 0,
    }
  }

  #[inline]
  pub(crate) fn chunk_count(&self) -> usize {
    self.chain.len()
  }

  #[inline]
  pub(crate) fn head(&self) -> Option<ChunkHandle> {
    self.chain.last().copied()
  }

  #[cfg(test)]
  pub(crate) fn cursor(&self) -> usize {
    self.cursor
  }

  pub(crate) fn reset(&mut self) {
    self.chain.clear();
    self.cursor = 0;
  }

  #[inline]
  fn try_bump(
    &mut self,
    chunk: &Chunk,
    request: &BumpRequest,
  ) -> Option<NonNull<u8>> {
    let (offset, end) = fit(chunk.block(), self.cursor, request.class_size, request.align)?;
    self.cursor = end;

    // SAFETY: `fit` guarantees `offset + class_size <= capacity`.
    Some(unsafe { chunk.block().base().add(offset) })
  }

  /// Bumps within the head chunk, growing the chain when it is exhausted.
  ///
  /// On error the bucket and the chunk table are left as they were.
  pub(crate) fn allocate_from<P: MemoryProvider>(
    &mut self,
    chunks: &mut ChunkTable,
    provider: &mut P,
    request: BumpRequest,
  ) -> Result<NonNull<u8>, ArenaError> {
    if let Some(head) = self.head() {
      if let Some(ptr) = self.try_bump(chunks.get(head), &request) {
        log::trace!(
          "bump: class {} -> {:?}, cursor = {}",
          request.class_size,
          ptr,
          self.cursor
        );
        return Ok(ptr);
      }
    }

    let capacity = request.chunk_capacity();
    let out_of_memory = |source| ArenaError::OutOfMemory {
      size: capacity,
      align: request.align,
      source,
    };

    let block = provider.acquire(capacity, request.align).map_err(out_of_memory)?;

    let Some((offset, end)) = fit(&block, 0, request.class_size, request.align) else {
      let source = ProviderError::Misaligned {
        addr: block.addr(),
        align: request.align,
      };
      // SAFETY: the block came from this provider a moment ago and was never handed out.
      if let Err(err) = unsafe { provider.release_block(block) } {
        log::warn!("could not return rejected chunk: {}", err);
      }
      return Err(out_of_memory(source));
    };

    log::debug!(
      "bucket {}: new chunk of {} bytes at {:#x} (chain length {})",
      request.class_size,
      capacity,
      block.addr(),
      self.chain.len() + 1
    );

    // SAFETY: `fit` checked the slot lies inside the block.
    let ptr = unsafe { block.base().add(offset) };
    let handle = chunks.insert(Chunk::new(block, request.exponent));
    self.chain.push(handle);
    self.cursor = end;

    Ok(ptr)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::provider::testing::CountingProvider;

  fn request(
    class_size: usize,
    chunk_bytes: usize,
  ) -> BumpRequest {
    BumpRequest {
      exponent: class_size.trailing_zeros(),
      class_size,
      align: 8,
      chunk_bytes,
    }
  }

  fn release_all(
    chunks: &mut ChunkTable,
    provider: &mut CountingProvider,
  ) {
    for chunk in chunks.drain() {
      unsafe { provider.release_block(chunk.into_block()).unwrap() };
    }
  }

  #[test]
  fn test_first_allocation_creates_chunk() {
    let mut chunks = ChunkTable::new();
    let mut provider = CountingProvider::default();
    let mut bucket = Bucket::new();

    assert_eq!(bucket.head(), None);

    let ptr = bucket.allocate_from(&mut chunks, &mut provider, request(16, 4096)).unwrap();

    let head = bucket.head().unwrap();
    assert_eq!(bucket.chunk_count(), 1);
    assert_eq!(bucket.cursor(), 16);
    assert_eq!(chunks.get(head).block().base(), ptr);
    assert_eq!(chunks.get(head).capacity(), 4096);
    assert_eq!(chunks.get(head).owner(), 4);

    release_all(&mut chunks, &mut provider);
    assert_eq!(provider.live(), 0);
  }

  #[test]
  fn test_bumps_are_contiguous_until_rollover() {
    let mut chunks = ChunkTable::new();
    let mut provider = CountingProvider::default();
    let mut bucket = Bucket::new();
    let req = request(64, 256);

    let ptrs: Vec<usize> = (0..4)
      .map(|_| bucket.allocate_from(&mut chunks, &mut provider, req).unwrap().as_ptr() as usize)
      .collect();

    for pair in ptrs.windows(2) {
      assert_eq!(pair[1] - pair[0], 64);
    }
    assert_eq!(bucket.chunk_count(), 1);
    assert_eq!(bucket.cursor(), 256);

    let fifth = bucket.allocate_from(&mut chunks, &mut provider, req).unwrap();

    assert_eq!(bucket.chunk_count(), 2);
    assert_eq!(bucket.cursor(), 64);
    assert_eq!(chunks.get(bucket.head().unwrap()).block().base(), fifth);

    release_all(&mut chunks, &mut provider);
  }

  #[test]
  fn test_class_larger_than_default_chunk() {
    let mut chunks = ChunkTable::new();
    let mut provider = CountingProvider::default();
    let mut bucket = Bucket::new();

    bucket.allocate_from(&mut chunks, &mut provider, request(8192, 4096)).unwrap();
    bucket.allocate_from(&mut chunks, &mut provider, request(8192, 4096)).unwrap();

    assert_eq!(bucket.chunk_count(), 2);
    assert_eq!(chunks.reserved_bytes(), 2 * 8192);

    release_all(&mut chunks, &mut provider);
  }

  #[test]
  fn test_failed_growth_leaves_bucket_untouched() {
    let mut chunks = ChunkTable::new();
    let mut provider = CountingProvider {
      fail_acquire_after: Some(1),
      ..CountingProvider::default()
    };
    let mut bucket = Bucket::new();
    let req = request(128, 128);

    bucket.allocate_from(&mut chunks, &mut provider, req).unwrap();
    let head = bucket.head();

    let err = bucket.allocate_from(&mut chunks, &mut provider, req).unwrap_err();

    assert!(matches!(err, ArenaError::OutOfMemory { size: 128, align: 8, .. }));
    assert_eq!(bucket.head(), head);
    assert_eq!(bucket.chunk_count(), 1);
    assert_eq!(bucket.cursor(), 128);
    assert_eq!(chunks.len(), 1);

    release_all(&mut chunks, &mut provider);
    assert_eq!(provider.live(), 0);
  }

  #[test]
  fn test_misaligned_chunk_is_returned() {
    let mut chunks = ChunkTable::new();
    let mut provider = CountingProvider {
      skew: 1,
      ..CountingProvider::default()
    };
    let mut bucket = Bucket::new();

    // Exactly one class worth of capacity: a skewed base cannot fit the slot.
    let err = bucket.allocate_from(&mut chunks, &mut provider, request(64, 64)).unwrap_err();

    assert!(matches!(
      err,
      ArenaError::OutOfMemory {
        source: ProviderError::Misaligned { align: 8, .. },
        ..
      }
    ));
    assert_eq!(bucket.chunk_count(), 0);
    assert_eq!(chunks.len(), 0);
    assert_eq!(provider.live(), 0);
  }
}
