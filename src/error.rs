//! Error types for the allocator, its configuration and memory providers.

use thiserror::Error;

/// Errors reported by [`BumpAllocator`](crate::BumpAllocator).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
  /// A zero-byte allocation was requested.
  #[error("allocation size must be at least one byte")]
  InvalidSize,

  /// The request exceeds the largest size class and oversize fallback is disabled.
  #[error("requested {size} bytes, largest size class is {max} bytes")]
  SizeTooLarge {
    /// Requested size in bytes.
    size: usize,
    /// Byte size of the largest configured class.
    max: usize,
  },

  /// The memory provider could not supply a block.
  #[error("out of memory: could not acquire {size} bytes aligned to {align}")]
  OutOfMemory {
    /// Size of the block that was asked for.
    size: usize,
    /// Alignment of the block that was asked for.
    align: usize,
    /// What the provider reported.
    #[source]
    source: ProviderError,
  },

  /// Some blocks could not be handed back during release.
  #[error("{failed} of {total} blocks could not be returned to the provider")]
  ReleaseFailed {
    /// Number of blocks the provider refused.
    failed: usize,
    /// Number of blocks release attempted.
    total: usize,
  },
}

/// Errors reported by a [`MemoryProvider`](crate::MemoryProvider).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderError {
  #[error("no memory left for {size} bytes aligned to {align}")]
  Exhausted { size: usize, align: usize },

  #[error("cannot serve {size} bytes aligned to {align}")]
  InvalidRequest { size: usize, align: usize },

  #[error("block at {addr:#x} is not aligned to {align}")]
  Misaligned { addr: usize, align: usize },

  #[error("block at {addr:#x} was not accepted back")]
  Rejected { addr: usize },
}

/// Errors reported by [`ArenaConfig::validate`](crate::ArenaConfig::validate).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
  #[error("{field} must be a power of two, got {value}")]
  NotPowerOfTwo { field: &'static str, value: usize },

  #[error("min class ({min} bytes) is larger than max class ({max} bytes)")]
  InvertedClassRange { min: usize, max: usize },

  #[error("default chunk size must be non-zero")]
  ZeroChunkBytes,
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::error::Error as _;

  #[test]
  fn test_out_of_memory_exposes_provider_source() {
    let err = ArenaError::OutOfMemory {
      size: 4096,
      align: 8,
      source: ProviderError::Exhausted { size: 4096, align: 8 },
    };

    assert_eq!(
      err.to_string(),
      "out of memory: could not acquire 4096 bytes aligned to 8"
    );
    let source = err.source().map(|s| s.to_string());
    assert_eq!(source.as_deref(), Some("no memory left for 4096 bytes aligned to 8"));
  }

  #[test]
  fn test_messages() {
    assert_eq!(
      ArenaError::SizeTooLarge { size: 70000, max: 65536 }.to_string(),
      "requested 70000 bytes, largest size class is 65536 bytes"
    );
    assert_eq!(
      ConfigError::NotPowerOfTwo { field: "alignment", value: 12 }.to_string(),
      "alignment must be a power of two, got 12"
    );
    assert_eq!(
      ProviderError::Rejected { addr: 0x1000 }.to_string(),
      "block at 0x1000 was not accepted back"
    );
  }
}
