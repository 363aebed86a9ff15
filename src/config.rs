use std::mem;

use crate::error::ConfigError;

pub const DEFAULT_MAX_CLASS_BYTES: usize = 1 << 20;
pub const DEFAULT_CHUNK_BYTES: usize = 4096;

/// What to do with a request larger than the biggest size class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
  feature = "serde",
  derive(serde::Serialize, serde::Deserialize),
  serde(rename_all = "snake_case")
)]
pub enum OversizePolicy {
  /// Acquire a dedicated block sized to the request. It is still reclaimed by `release()`.
  #[default]
  Direct,
  /// Fail with [`ArenaError::SizeTooLarge`](crate::ArenaError::SizeTooLarge).
  Reject,
}

/// Construction-time settings of a [`BumpAllocator`](crate::BumpAllocator).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
  feature = "serde",
  derive(serde::Serialize, serde::Deserialize),
  serde(default)
)]
pub struct ArenaConfig {
  /// Smallest size class in bytes. Power of two.
  pub min_class_bytes: usize,
  /// Largest size class in bytes. Power of two.
  pub max_class_bytes: usize,
  /// Lower bound for the capacity of every chunk.
  pub default_chunk_bytes: usize,
  /// Alignment of every returned pointer. Power of two.
  pub alignment: usize,
  pub oversize: OversizePolicy,
}

impl Default for ArenaConfig {
  fn default() -> Self {
    Self {
      min_class_bytes: mem::size_of::<usize>(),
      max_class_bytes: DEFAULT_MAX_CLASS_BYTES,
      default_chunk_bytes: DEFAULT_CHUNK_BYTES,
      alignment: crate::align!(1),
      oversize: OversizePolicy::Direct,
    }
  }
}

impl ArenaConfig {
  pub fn with_class_range(
    mut self,
    min_class_bytes: usize,
    max_class_bytes: usize,
  ) -> Self {
    self.min_class_bytes = min_class_bytes;
    self.max_class_bytes = max_class_bytes;
    self
  }

  pub fn with_chunk_bytes(
    mut self,
    default_chunk_bytes: usize,
  ) -> Self {
    self.default_chunk_bytes = default_chunk_bytes;
    self
  }

  pub fn with_alignment(
    mut self,
    alignment: usize,
  ) -> Self {
    self.alignment = alignment;
    self
  }

  pub fn with_oversize(
    mut self,
    oversize: OversizePolicy,
  ) -> Self {
    self.oversize = oversize;
    self
  }

  /// Checks the invariants the allocator relies on.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let powers = [
      ("min_class_bytes", self.min_class_bytes),
      ("max_class_bytes", self.max_class_bytes),
      ("alignment", self.alignment),
    ];

    for (field, value) in powers {
      if !value.is_power_of_two() {
        return Err(ConfigError::NotPowerOfTwo { field, value });
      }
    }

    if self.min_class_bytes > self.max_class_bytes {
      return Err(ConfigError::InvertedClassRange {
        min: self.min_class_bytes,
        max: self.max_class_bytes,
      });
    }

    if self.default_chunk_bytes == 0 {
      return Err(ConfigError::ZeroChunkBytes);
    }

    Ok(())
  }
}
