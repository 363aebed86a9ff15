//! Power-of-two size classes.
//!
//! ```text
//!   request:   1..=8   9..=16   17..=32  ...  (max/2+1)..=max   > max
//!   class:     2^3     2^4      2^5      ...  2^max_exp         oversize
//! ```

use crate::error::{ArenaError, ConfigError};

/// Maps request sizes onto the exponents `min_exponent..=max_exponent`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeClasses {
  min_exponent: u32,
  max_exponent: u32,
}

impl SizeClasses {
  /// Both bounds must be powers of two with `min_class_bytes <= max_class_bytes`.
  pub fn new(
    min_class_bytes: usize,
    max_class_bytes: usize,
  ) -> Result<Self, ConfigError> {
    let bounds = [
      ("min_class_bytes", min_class_bytes),
      ("max_class_bytes", max_class_bytes),
    ];

    for (field, value) in bounds {
      if !value.is_power_of_two() {
        return Err(ConfigError::NotPowerOfTwo { field, value });
      }
    }

    if min_class_bytes > max_class_bytes {
      return Err(ConfigError::InvertedClassRange {
        min: min_class_bytes,
        max: max_class_bytes,
      });
    }

    Ok(Self {
      min_exponent: min_class_bytes.trailing_zeros(),
      max_exponent: max_class_bytes.trailing_zeros(),
    })
  }

  #[inline]
  pub fn min_exponent(&self) -> u32 {
    self.min_exponent
  }

  #[inline]
  pub fn max_exponent(&self) -> u32 {
    self.max_exponent
  }

  /// Number of classes, and so of buckets.
  #[inline]
  pub fn len(&self) -> usize {
    (self.max_exponent - self.min_exponent + 1) as usize
  }

  #[inline]
  pub fn max_bytes(&self) -> usize {
    Self::class_bytes(self.max_exponent)
  }

  #[inline]
  pub const fn class_bytes(exponent: u32) -> usize {
    1 << exponent
  }

  /// Returns the exponent of the smallest class that holds `size` bytes.
  pub fn class_of(
    &self,
    size: usize,
  ) -> Result<u32, ArenaError> {
    if size == 0 {
      return Err(ArenaError::InvalidSize);
    }

    let too_large = ArenaError::SizeTooLarge {
      size,
      max: self.max_bytes(),
    };

    let exponent = match size.checked_next_power_of_two() {
      Some(power) => power.trailing_zeros(),
      None => return Err(too_large),
    };

    if exponent > self.max_exponent {
      return Err(too_large);
    }

    Ok(exponent.max(self.min_exponent))
  }

  #[inline]
  pub(crate) fn index_of(
    &self,
    exponent: u32,
  ) -> usize {
    debug_assert!((self.min_exponent..=self.max_exponent).contains(&exponent));
    (exponent - self.min_exponent) as usize
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn classes() -> SizeClasses {
    SizeClasses::new(8, 65536).unwrap()
  }

  #[test]
  fn test_table_size() {
    assert_eq!(classes().len(), 14);
    assert_eq!(SizeClasses::new(16, 16).unwrap().len(), 1);
    assert_eq!(classes().index_of(3), 0);
    assert_eq!(classes().index_of(16), 13);
  }

  #[test]
  fn test_invalid_bounds_are_rejected() {
    assert_eq!(
      SizeClasses::new(8, 4),
      Err(ConfigError::InvertedClassRange { min: 8, max: 4 })
    );
    assert_eq!(
      SizeClasses::new(0, 64),
      Err(ConfigError::NotPowerOfTwo { field: "min_class_bytes", value: 0 })
    );
    assert_eq!(
      SizeClasses::new(8, 96),
      Err(ConfigError::NotPowerOfTwo { field: "max_class_bytes", value: 96 })
    );
  }

  #[test]
  fn test_exact_powers_are_not_rounded() {
    let classes = classes();

    for k in 3..=16 {
      assert_eq!(classes.class_of(1 << k), Ok(k));
    }
  }

  #[test]
  fn test_rounds_up_and_clamps() {
    let classes = classes();

    assert_eq!(classes.class_of(1), Ok(3));
    assert_eq!(classes.class_of(7), Ok(3));
    assert_eq!(classes.class_of(9), Ok(4));
    assert_eq!(classes.class_of(10), Ok(4));
    assert_eq!(classes.class_of(65535), Ok(16));
  }

  #[test]
  fn test_size_bounds() {
    let classes = classes();

    assert_eq!(classes.class_of(0), Err(ArenaError::InvalidSize));
    assert_eq!(
      classes.class_of(65537),
      Err(ArenaError::SizeTooLarge { size: 65537, max: 65536 })
    );
    assert_eq!(
      classes.class_of(usize::MAX),
      Err(ArenaError::SizeTooLarge { size: usize::MAX, max: 65536 })
    );
  }

  mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
      #[test]
      fn class_is_smallest_sufficient_power(size in 1_usize..=65536) {
        let classes = classes();
        let exponent = classes.class_of(size).unwrap();
        let bytes = SizeClasses::class_bytes(exponent);

        prop_assert!(bytes >= size);
        if exponent > classes.min_exponent() {
          prop_assert!(SizeClasses::class_bytes(exponent - 1) < size);
        }
      }

      #[test]
      fn oversize_is_always_rejected(size in 65537_usize..) {
        let is_too_large = matches!(
          classes().class_of(size),
          Err(ArenaError::SizeTooLarge { .. })
        );
        prop_assert!(is_too_large);
      }
    }
  }
}
