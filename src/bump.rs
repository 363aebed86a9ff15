use std::{alloc::Layout, ptr, ptr::NonNull};

use crate::{
  block::Block,
  bucket::{Bucket, BumpRequest},
  chunk::ChunkTable,
  class::SizeClasses,
  config::{ArenaConfig, OversizePolicy},
  error::{ArenaError, ConfigError, ProviderError},
  provider::{MemoryProvider, SystemProvider},
};

/// Snapshot of what an allocator currently holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
  /// Chunks across every bucket.
  pub chunks: usize,
  /// One-off blocks for requests above the largest class.
  pub oversize_blocks: usize,
  /// Bytes held from the provider, chunks and oversize blocks together.
  pub reserved_bytes: usize,
  /// Successful allocations since construction or the last release.
  pub allocations: usize,
}

/// A bump allocator with one chunk chain per power-of-two size class.
///
/// Pointers stay valid until [`release`](Self::release) or drop, whichever
/// comes first. [`free`](Self::free) never reclaims anything.
pub struct BumpAllocator<P: MemoryProvider = SystemProvider> {
  config: ArenaConfig,
  classes: SizeClasses,
  buckets: Box<[Bucket]>,
  chunks: ChunkTable,
  oversize: Vec<Block>,
  allocations: usize,
  provider: P,
}

impl BumpAllocator<SystemProvider> {
  pub fn new(config: ArenaConfig) -> Result<Self, ConfigError> {
    Self::with_provider(config, SystemProvider)
  }
}

impl<P: MemoryProvider> BumpAllocator<P> {
  pub fn with_provider(
    config: ArenaConfig,
    provider: P,
  ) -> Result<Self, ConfigError> {
    config.validate()?;

    let classes = SizeClasses::new(config.min_class_bytes, config.max_class_bytes)?;
    let buckets = (0..classes.len()).map(|_| Bucket::new()).collect();

    log::debug!(
      "bump allocator: classes {}..={} bytes, chunks of {} bytes, align {}",
      config.min_class_bytes,
      config.max_class_bytes,
      config.default_chunk_bytes,
      config.alignment
    );

    Ok(Self {
      config,
      classes,
      buckets,
      chunks: ChunkTable::new(),
      oversize: Vec::new(),
      allocations: 0,
      provider,
    })
  }

  pub fn config(&self) -> &ArenaConfig {
    &self.config
  }

  pub fn classes(&self) -> &SizeClasses {
    &self.classes
  }

  pub fn provider(&self) -> &P {
    &self.provider
  }

  /// Allocates `size` bytes aligned to the configured alignment.
  ///
  /// The returned memory is uninitialized and usable up to the full class
  /// size. Zero-byte requests fail with [`ArenaError::InvalidSize`].
  pub fn alloc(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>, ArenaError> {
    self.alloc_aligned(size, self.config.alignment)
  }

  /// Like [`alloc`](Self::alloc), honouring `layout.align()` when it is
  /// stricter than the configured alignment.
  pub fn alloc_layout(
    &mut self,
    layout: Layout,
  ) -> Result<NonNull<u8>, ArenaError> {
    self.alloc_aligned(layout.size(), layout.align().max(self.config.alignment))
  }

  /// Like [`alloc`](Self::alloc), with the first `size` bytes zeroed.
  pub fn alloc_zeroed(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>, ArenaError> {
    let ptr = self.alloc(size)?;

    // SAFETY: the slot is at least `size` bytes long.
    unsafe { ptr::write_bytes(ptr.as_ptr(), 0, size) };

    Ok(ptr)
  }

  fn alloc_aligned(
    &mut self,
    size: usize,
    align: usize,
  ) -> Result<NonNull<u8>, ArenaError> {
    let ptr = match self.classes.class_of(size) {
      Ok(exponent) => {
        let request = BumpRequest {
          exponent,
          class_size: SizeClasses::class_bytes(exponent),
          align,
          chunk_bytes: self.config.default_chunk_bytes,
        };
        let bucket = &mut self.buckets[self.classes.index_of(exponent)];

        bucket.allocate_from(&mut self.chunks, &mut self.provider, request)?
      }
      Err(ArenaError::SizeTooLarge { .. }) if self.config.oversize == OversizePolicy::Direct => {
        self.alloc_oversize(size, align)?
      }
      Err(err) => return Err(err),
    };

    self.allocations += 1;

    Ok(ptr)
  }

  fn alloc_oversize(
    &mut self,
    size: usize,
    align: usize,
  ) -> Result<NonNull<u8>, ArenaError> {
    let block = self
      .provider
      .acquire(size, align)
      .map_err(|source| ArenaError::OutOfMemory { size, align, source })?;

    if !block.is_aligned_to(align) {
      let source = ProviderError::Misaligned {
        addr: block.addr(),
        align,
      };
      // SAFETY: fresh from this provider, never handed out.
      if let Err(err) = unsafe { self.provider.release_block(block) } {
        log::warn!("could not return rejected oversize block: {}", err);
      }
      return Err(ArenaError::OutOfMemory { size, align, source });
    }

    log::debug!("oversize block: {} bytes at {:#x}", size, block.addr());

    let ptr = block.base();
    self.oversize.push(block);

    Ok(ptr)
  }

  /// Does nothing. Memory is only reclaimed by [`release`](Self::release).
  #[inline]
  pub fn free(
    &mut self,
    ptr: NonNull<u8>,
  ) {
    log::trace!("free: {:?} ignored", ptr);
  }

  /// Returns every chunk and oversize block to the provider and empties
  /// every bucket. Every pointer handed out so far becomes dangling.
  ///
  /// A block the provider refuses is logged and counted, and the remaining
  /// blocks are still released. The allocator is reset either way.
  pub fn release(&mut self) -> Result<(), ArenaError> {
    let total = self.chunks.len() + self.oversize.len();
    let mut failed = 0;

    for chunk in self.chunks.drain() {
      let class_size = SizeClasses::class_bytes(chunk.owner());
      // SAFETY: every chunk came from this provider and is released once.
      if let Err(err) = unsafe { self.provider.release_block(chunk.into_block()) } {
        log::warn!("release: chunk of class {} not returned: {}", class_size, err);
        failed += 1;
      }
    }

    for block in self.oversize.drain(..) {
      // SAFETY: as above.
      if let Err(err) = unsafe { self.provider.release_block(block) } {
        log::warn!("release: oversize block not returned: {}", err);
        failed += 1;
      }
    }

    for bucket in self.buckets.iter_mut() {
      bucket.reset();
    }
    self.allocations = 0;

    log::debug!("release: returned {} of {} blocks", total - failed, total);

    match failed {
      0 => Ok(()),
      failed => Err(ArenaError::ReleaseFailed { failed, total }),
    }
  }

  pub fn stats(&self) -> ArenaStats {
    ArenaStats {
      chunks: self.chunks.len(),
      oversize_blocks: self.oversize.len(),
      reserved_bytes: self.chunks.reserved_bytes() + self.oversize.iter().map(Block::size).sum::<usize>(),
      allocations: self.allocations,
    }
  }

  /// Number of chunks in the bucket that serves `size`, or `None` when
  /// `size` belongs to no class.
  pub fn chunk_count(
    &self,
    size: usize,
  ) -> Option<usize> {
    let exponent = self.classes.class_of(size).ok()?;
    Some(self.buckets[self.classes.index_of(exponent)].chunk_count())
  }
}

impl<P: MemoryProvider> Drop for BumpAllocator<P> {
  fn drop(&mut self) {
    if let Err(err) = self.release() {
      log::warn!("bump allocator dropped: {}", err);
    }
  }
}
