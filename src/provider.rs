use std::{mem, ptr, ptr::NonNull};

use libc::c_void;

use crate::{block::Block, error::ProviderError};

/// Source of the raw chunks an allocator carves up.
///
/// The allocator never touches any other memory primitive: every chunk and
/// every oversize block goes through `acquire`, and comes back through
/// `release_block`.
pub trait MemoryProvider {
  /// Returns a block of at least `size` bytes whose base is aligned to `align`.
  fn acquire(
    &mut self,
    size: usize,
    align: usize,
  ) -> Result<Block, ProviderError>;

  /// Takes back a block.
  ///
  /// # Safety
  ///
  /// `block` must have been returned by `acquire` on this provider and not
  /// released since. Nothing may point into it afterwards.
  unsafe fn release_block(
    &mut self,
    block: Block,
  ) -> Result<(), ProviderError>;
}

impl<P: MemoryProvider + ?Sized> MemoryProvider for &mut P {
  fn acquire(
    &mut self,
    size: usize,
    align: usize,
  ) -> Result<Block, ProviderError> {
    (**self).acquire(size, align)
  }

  unsafe fn release_block(
    &mut self,
    block: Block,
  ) -> Result<(), ProviderError> {
    unsafe { (**self).release_block(block) }
  }
}

/// Provider backed by the C heap (`posix_memalign(3)` / `free(3)`).
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemProvider;

impl MemoryProvider for SystemProvider {
  fn acquire(
    &mut self,
    size: usize,
    align: usize,
  ) -> Result<Block, ProviderError> {
    if size == 0 || !align.is_power_of_two() {
      return Err(ProviderError::InvalidRequest { size, align });
    }

    // posix_memalign wants a multiple of sizeof(void *).
    let align = align.max(mem::size_of::<*mut c_void>());
    let mut address: *mut c_void = ptr::null_mut();

    let status = unsafe { libc::posix_memalign(&mut address, align, size) };

    if status != 0 {
      return Err(ProviderError::Exhausted { size, align });
    }

    let base = NonNull::new(address.cast::<u8>()).ok_or(ProviderError::Exhausted { size, align })?;

    log::trace!("posix_memalign: {} bytes at {:?}, align = {}", size, base, align);

    Ok(Block::new(base, size, align))
  }

  unsafe fn release_block(
    &mut self,
    block: Block,
  ) -> Result<(), ProviderError> {
    log::trace!("free: {} bytes at {:?}", block.size(), block.base());

    unsafe { libc::free(block.as_ptr().cast::<c_void>()) };

    Ok(())
  }
}
