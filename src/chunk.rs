use std::vec;

use crate::block::Block;

/// Index of a chunk in a [`ChunkTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct ChunkHandle(usize);

/// A block owned by the bucket of size class `2^owner`.
#[derive(Debug)]
pub(crate) struct Chunk {
  block: Block,
  owner: u32,
}

impl Chunk {
  pub(crate) fn new(
    block: Block,
    owner: u32,
  ) -> Self {
    Self { block, owner }
  }

  #[inline]
  pub(crate) fn block(&self) -> &Block {
    &self.block
  }

  #[inline]
  pub(crate) fn capacity(&self) -> usize {
    self.block.size()
  }

  #[inline]
  pub(crate) fn owner(&self) -> u32 {
    self.owner
  }

  pub(crate) fn into_block(self) -> Block {
    self.block
  }
}

/// Every chunk acquired by one allocator, across all buckets.
///
/// Buckets refer to chunks by handle; all blocks are only ever given back
/// together through [`ChunkTable::drain`].
#[derive(Debug, Default)]
pub(crate) struct ChunkTable {
  chunks: Vec<Chunk>,
}

impl ChunkTable {
  pub(crate) const fn new() -> Self {
    Self { chunks: Vec::new() }
  }

  pub(crate) fn insert(
    &mut self,
    chunk: Chunk,
  ) -> ChunkHandle {
    let handle = ChunkHandle(self.chunks.len());
    self.chunks.push(chunk);
    handle
  }

  #[inline]
  pub(crate) fn get(
    &self,
    handle: ChunkHandle,
  ) -> &Chunk {
    &self.chunks[handle.0]
  }

  #[inline]
  pub(crate) fn len(&self) -> usize {
    self.chunks.len()
  }

  pub(crate) fn reserved_bytes(&self) -> usize {
    self.chunks.iter().map(Chunk::capacity).sum()
  }

  /// Empties the table. Every handle handed out so far becomes dangling.
  pub(crate) fn drain(&mut self) -> vec::Drain<'_, Chunk> {
    self.chunks.drain(..)
  }
}
