use std::ptr::NonNull;

/// A raw memory block handed out by a [`MemoryProvider`](crate::MemoryProvider).
///
/// The block does not free itself; it has to be given back through
/// [`MemoryProvider::release_block`](crate::MemoryProvider::release_block).
#[derive(Debug, PartialEq, Eq)]
pub struct Block {
  ptr: NonNull<u8>,
  size: usize,
  align: usize,
}

impl Block {
  pub fn new(
    ptr: NonNull<u8>,
    size: usize,
    align: usize,
  ) -> Self {
    Self { ptr, size, align }
  }

  #[inline]
  pub fn base(&self) -> NonNull<u8> {
    self.ptr
  }

  #[inline]
  pub fn as_ptr(&self) -> *mut u8 {
    self.ptr.as_ptr()
  }

  #[inline]
  pub fn addr(&self) -> usize {
    self.ptr.as_ptr() as usize
  }

  #[inline]
  pub fn size(&self) -> usize {
    self.size
  }

  #[inline]
  pub fn align(&self) -> usize {
    self.align
  }

  /// Whether the base address honours `align`.
  #[inline]
  pub fn is_aligned_to(
    &self,
    align: usize,
  ) -> bool {
    self.addr() & (align - 1) == 0
  }
}
