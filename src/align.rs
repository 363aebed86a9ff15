/// Calculates the machine word alignment for the given size.
///
/// # Examples
///
/// ```rust
/// use std::mem;
/// use classbump::align;
///
/// match mem::size_of::<usize>() {
///     8 => assert_eq!(align!(13), 16), // 64 bit machine.
///     4 => assert_eq!(align!(11), 12), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    $crate::align::round_up($value, ::core::mem::size_of::<usize>())
  };
}

/// Rounds `value` up to the next multiple of `align`, which must be a power of two.
#[inline(always)]
pub const fn round_up(
  value: usize,
  align: usize,
) -> usize {
  (value + align - 1) & !(align - 1)
}

/// Like [`round_up`], but returns `None` instead of wrapping past `usize::MAX`.
#[inline(always)]
pub const fn checked_round_up(
  value: usize,
  align: usize,
) -> Option<usize> {
  match value.checked_add(align - 1) {
    Some(bumped) => Some(bumped & !(align - 1)),
    None => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::mem;

  #[test]
  fn test_align() {
    let ptr_size = mem::size_of::<usize>();

    let mut alignments = Vec::new();

    for i in 0..10 {
      let sizes = (ptr_size * i + 1)..=(ptr_size * (i + 1));

      let expected_alignment = ptr_size * (i + 1);

      alignments.push((sizes, expected_alignment));
    }

    for (sizes, expected) in alignments {
      for size in sizes {
        assert_eq!(expected, align!(size));
      }
    }
  }

  #[test]
  fn test_round_up() {
    assert_eq!(round_up(0, 8), 0);
    assert_eq!(round_up(1, 8), 8);
    assert_eq!(round_up(8, 8), 8);
    assert_eq!(round_up(9, 8), 16);
    assert_eq!(round_up(4095, 4096), 4096);
    assert_eq!(round_up(10, 1), 10);
  }

  #[test]
  fn test_checked_round_up_overflow() {
    assert_eq!(checked_round_up(usize::MAX, 8), None);
    assert_eq!(checked_round_up(usize::MAX - 7, 8), Some(usize::MAX - 7));
    assert_eq!(checked_round_up(13, 4), Some(16));
  }
}
