// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{Error, Status};
use core::mem;

/// Convert from a `u32` to a `usize`. Panic if the input does not fit,
/// which cannot happen on any target firmware runs on.
///
/// Usable in `const` contexts, unlike `usize::try_from(val).unwrap()`.
pub const fn usize_from_u32(val: u32) -> usize {
    if mem::size_of::<usize>() < mem::size_of::<u32>() && val > (usize::MAX as u32) {
        panic!("value does not fit in a usize");
    } else {
        val as usize
    }
}

/// Length of a buffer as the `u32` a protocol function expects.
///
/// Fails with [`Status::BAD_BUFFER_SIZE`] if the length does not fit.
pub fn u32_len(buf: &[u8]) -> Result<u32, Error> {
    u32::try_from(buf.len()).map_err(|_| Error::from(Status::BAD_BUFFER_SIZE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usize_from_u32() {
        assert_eq!(usize_from_u32(0), 0usize);
        assert_eq!(usize_from_u32(u32::MAX), 4294967295usize);
    }

    #[test]
    fn test_u32_len() {
        assert_eq!(u32_len(&[0; 3]), Ok(3));
        assert_eq!(u32_len(&[]), Ok(0));
    }
}
