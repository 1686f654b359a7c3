//! Start-byte stuffing.
//!
//! A simplified consistent-overhead stuffing scheme that removes the
//! [`START_BYTE`] value from a payload. Every occurrence is replaced by the
//! forward distance to the next occurrence; the last one stores `0`. The
//! index of the first occurrence travels separately in the frame's overhead
//! byte, so the receiver can walk the chain and restore the original bytes.

use crate::codec::{MAX_PAYLOAD, NO_SENTINEL, START_BYTE};

/// Overhead byte for the first `len` bytes of `payload`.
///
/// Returns the index of the first [`START_BYTE`], or [`NO_SENTINEL`] if
/// there is none or `len` exceeds [`MAX_PAYLOAD`].
pub fn compute_overhead(payload: &[u8], len: usize) -> u8 {
    if len > MAX_PAYLOAD {
        return NO_SENTINEL;
    }
    payload[..len.min(payload.len())]
        .iter()
        .position(|&b| b == START_BYTE)
        .map_or(NO_SENTINEL, |idx| idx as u8)
}

/// Index of the last [`START_BYTE`] within the first `len` bytes of `payload`.
///
/// Returns `None` if there is none or `len` exceeds [`MAX_PAYLOAD`].
pub fn find_last_sentinel(payload: &[u8], len: usize) -> Option<usize> {
    if len > MAX_PAYLOAD {
        return None;
    }
    payload[..len.min(payload.len())]
        .iter()
        .rposition(|&b| b == START_BYTE)
}

/// Stuff the first `len` bytes of `payload` in place.
///
/// Compute the overhead byte with [`compute_overhead`] *before* stuffing;
/// afterwards each former [`START_BYTE`] holds the distance to the next one.
pub fn stuff(payload: &mut [u8], len: usize) {
    let Some(mut next) = find_last_sentinel(payload, len) else {
        return;
    };

    for i in (0..=next).rev() {
        if payload[i] == START_BYTE {
            payload[i] = (next - i) as u8;
            next = i;
        }
    }
}

/// Reverse [`stuff`] in place, starting from the received overhead byte.
///
/// An overhead beyond [`MAX_PAYLOAD`] (including [`NO_SENTINEL`]) leaves the
/// payload untouched, as does a chain that runs off the end of `payload`.
pub fn destuff(payload: &mut [u8], overhead: u8) {
    let mut idx = usize::from(overhead);
    if idx > MAX_PAYLOAD {
        return;
    }

    while let Some(&delta) = payload.get(idx) {
        payload[idx] = START_BYTE;
        if delta == 0 {
            break;
        }
        idx += usize::from(delta);
    }
}
