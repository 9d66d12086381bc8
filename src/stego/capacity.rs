//! Carrier capacity math
//!
//! One LSB per channel, three channels per pixel. The check runs before any
//! pixel is mutated so embedding is all-or-nothing.

use crate::bits::CHANNELS_PER_PIXEL;
use crate::{VaultError, VaultResult};

/// Maximum number of whole bytes a carrier with `pixel_count` pixels can hold.
pub fn max_payload_bytes(pixel_count: usize) -> usize {
    pixel_count * CHANNELS_PER_PIXEL / 8
}

/// Verify an encoded frame of `frame_bytes` fits into `pixel_count` pixels.
pub fn ensure_fits(frame_bytes: usize, pixel_count: usize) -> VaultResult<()> {
    let needed_bits = frame_bytes * 8;
    let capacity_bits = pixel_count * CHANNELS_PER_PIXEL;
    if needed_bits > capacity_bits {
        return Err(VaultError::InsufficientCapacity {
            needed_bits,
            capacity_bits,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_capacity() {
        // 100x100 RGB: 10,000 pixels -> 30,000 bits -> 3,750 bytes
        assert_eq!(max_payload_bytes(10_000), 3_750);
        assert_eq!(max_payload_bytes(0), 0);
        assert_eq!(max_payload_bytes(2), 0); // 6 bits, no whole byte
        assert_eq!(max_payload_bytes(3), 1);
    }

    #[test]
    fn exact_boundary() {
        assert!(ensure_fits(3_750, 10_000).is_ok());
        let err = ensure_fits(3_751, 10_000).unwrap_err();
        assert!(matches!(err, VaultError::InsufficientCapacity { .. }));
    }

    #[test]
    fn zero_frame_always_fits() {
        assert!(ensure_fits(0, 0).is_ok());
    }

    proptest! {
        #[test]
        fn capacity_monotonic(a in 0usize..1_000_000, b in 0usize..1_000_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(max_payload_bytes(lo) <= max_payload_bytes(hi));
        }

        #[test]
        fn fits_iff_within_capacity(frame in 0usize..100_000, pixels in 0usize..300_000) {
            let fits = ensure_fits(frame, pixels).is_ok();
            prop_assert_eq!(fits, frame * 8 <= pixels * 3);
        }
    }
}
