//! Utility functions and helpers
//!
//! Common utilities used throughout the codebase.

/// Name sanitization
pub mod naming;

/// Round `size` up to the next multiple of `alignment`.
///
/// An `alignment` of zero leaves `size` unchanged.
#[inline]
pub const fn align(size: usize, alignment: usize) -> usize {
    if alignment == 0 {
        return size;
    }

    let remainder = size % alignment;
    if remainder == 0 {
        size
    } else {
        size + (alignment - remainder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align() {
        assert_eq!(align(0, 8), 0);
        assert_eq!(align(1, 8), 8);
        assert_eq!(align(8, 8), 8);
        assert_eq!(align(0x11, 4), 0x14);
        assert_eq!(align(5, 0), 5);
    }
}
