//! Table-driven 8-bit checksum.
//!
//! The table holds, for every accumulator value, the result of running the
//! polynomial division step eight times. Folding a byte slice is then one
//! lookup per byte: `acc = table[acc ^ byte]`.

use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};

use crate::error::{FrameError, Result};

/// Default checksum polynomial.
pub const DEFAULT_POLYNOMIAL: u8 = 0x9B;

/// Default table width in bits (256 entries).
pub const DEFAULT_TABLE_WIDTH: u32 = 8;

/// Widest table accepted. Wider tables only waste memory: lookups are indexed
/// by a byte.
pub const MAX_TABLE_WIDTH: u32 = 16;

/// Precomputed checksum lookup table.
///
/// Immutable once built and safe to share between links; see
/// [`ChecksumTable::shared`] for the process-wide default instance.
#[derive(Clone, PartialEq, Eq)]
pub struct ChecksumTable {
    polynomial: u8,
    width_bits: u32,
    entries: Vec<u8>,
}

impl ChecksumTable {
    /// Build a table for `polynomial` with `2^width_bits` entries.
    pub fn new(polynomial: u8, width_bits: u32) -> Result<Self> {
        if !(DEFAULT_TABLE_WIDTH..=MAX_TABLE_WIDTH).contains(&width_bits) {
            return Err(FrameError::InvalidTableWidth { bits: width_bits });
        }

        let entries = (0..1u32 << width_bits)
            .map(|seed| division_step(seed, polynomial))
            .collect();

        Ok(Self {
            polynomial,
            width_bits,
            entries,
        })
    }

    /// The process-wide table for the default parameters, built on first use.
    pub fn shared() -> Arc<Self> {
        static DEFAULT: OnceLock<Arc<ChecksumTable>> = OnceLock::new();
        Arc::clone(DEFAULT.get_or_init(|| {
            let entries = (0..1u32 << DEFAULT_TABLE_WIDTH)
                .map(|seed| division_step(seed, DEFAULT_POLYNOMIAL))
                .collect();
            Arc::new(Self {
                polynomial: DEFAULT_POLYNOMIAL,
                width_bits: DEFAULT_TABLE_WIDTH,
                entries,
            })
        }))
    }

    /// Polynomial the table was built for.
    pub fn polynomial(&self) -> u8 {
        self.polynomial
    }

    /// Table width in bits.
    pub fn width_bits(&self) -> u32 {
        self.width_bits
    }

    /// All table entries, indexed by seed.
    pub fn entries(&self) -> &[u8] {
        &self.entries
    }

    /// Advance the accumulator by one input byte.
    #[inline]
    pub fn evaluate(&self, accumulator: u8, byte: u8) -> u8 {
        self.entries[usize::from(accumulator ^ byte)]
    }

    /// Checksum of a byte slice, starting from an accumulator of zero.
    ///
    /// An empty slice yields `0`.
    pub fn checksum(&self, bytes: &[u8]) -> u8 {
        bytes.iter().fold(0, |acc, &byte| self.evaluate(acc, byte))
    }

    /// Checksum of the first `len` bytes of `bytes` (clamped to the slice).
    pub fn checksum_prefix(&self, bytes: &[u8], len: usize) -> u8 {
        self.checksum(&bytes[..len.min(bytes.len())])
    }

    /// Checksum of elements that coerce to bytes, such as characters or
    /// integers read from a text source.
    ///
    /// Fails on the first element that is not representable as one byte.
    pub fn checksum_items<T: ChecksumByte>(&self, items: &[T]) -> Result<u8> {
        items.iter().try_fold(0, |acc, item| {
            Ok(self.evaluate(acc, item.checksum_byte()?))
        })
    }

    /// Render the table as rows of 16 upper-case hex entries.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.entries.len() * 5);
        for (i, entry) in self.entries.iter().enumerate() {
            let _ = write!(out, "0x{entry:X}");
            out.push(if (i + 1) % 16 == 0 { '\n' } else { ' ' });
        }
        out
    }
}

impl Default for ChecksumTable {
    fn default() -> Self {
        Self::shared().as_ref().clone()
    }
}

impl std::fmt::Debug for ChecksumTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChecksumTable")
            .field("polynomial", &format_args!("{:#04x}", self.polynomial))
            .field("width_bits", &self.width_bits)
            .finish_non_exhaustive()
    }
}

/// Eight rounds of shift-and-xor starting from `seed`, truncated to a byte.
fn division_step(seed: u32, polynomial: u8) -> u8 {
    let poly = u32::from(polynomial);
    let mut curr = seed;
    for _ in 0..8 {
        curr = if curr & 0x80 != 0 {
            ((curr << 1) & 0xFF) ^ poly
        } else {
            curr << 1
        };
    }
    (curr & 0xFF) as u8
}

/// Conversion of a checksum input element to the byte it stands for.
pub trait ChecksumByte {
    /// The byte value, or [`FrameError::NotAByte`] if there is none.
    fn checksum_byte(&self) -> Result<u8>;
}

impl ChecksumByte for u8 {
    fn checksum_byte(&self) -> Result<u8> {
        Ok(*self)
    }
}

impl ChecksumByte for char {
    fn checksum_byte(&self) -> Result<u8> {
        u8::try_from(u32::from(*self))
            .map_err(|_| FrameError::NotAByte(format!("{self:?} (U+{:04X})", u32::from(*self))))
    }
}

macro_rules! checksum_byte_int {
    ($($ty:ty),*) => {
        $(
            impl ChecksumByte for $ty {
                fn checksum_byte(&self) -> Result<u8> {
                    u8::try_from(*self).map_err(|_| FrameError::NotAByte(self.to_string()))
                }
            }
        )*
    };
}

checksum_byte_int!(i8, i16, u16, i32, u32, i64, u64, usize);

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn default_table_shape() {
        let table = ChecksumTable::new(DEFAULT_POLYNOMIAL, DEFAULT_TABLE_WIDTH).unwrap();
        assert_eq!(table.polynomial(), 0x9B);
        assert_eq!(table.width_bits(), 8);
        assert_eq!(table.entries().len(), 256);
    }

    #[test]
    fn known_entries() {
        let table = ChecksumTable::shared();
        assert_eq!(table.entries()[0x00], 0x00);
        assert_eq!(table.entries()[0x01], 0x9B);
        assert_eq!(table.entries()[0x02], 0xAD);
        assert_eq!(table.entries()[0x31], 0xCD);
        assert_eq!(table.entries()[0xFF], 0x7B);
    }

    #[test]
    fn custom_polynomial() {
        let table = ChecksumTable::new(0x8C, 8).unwrap();
        assert_eq!(table.polynomial(), 0x8C);
        assert_eq!(table.entries()[1], 0x8C);
        assert_ne!(table.entries(), ChecksumTable::shared().entries());
    }

    #[test]
    fn wider_table() {
        let table = ChecksumTable::new(DEFAULT_POLYNOMIAL, 16).unwrap();
        assert_eq!(table.entries().len(), 1 << 16);
        assert_eq!(&table.entries()[..256], ChecksumTable::shared().entries());
    }

    #[test]
    fn rejects_unusable_widths() {
        assert!(matches!(
            ChecksumTable::new(DEFAULT_POLYNOMIAL, 4),
            Err(FrameError::InvalidTableWidth { bits: 4 })
        ));
        assert!(matches!(
            ChecksumTable::new(DEFAULT_POLYNOMIAL, 33),
            Err(FrameError::InvalidTableWidth { bits: 33 })
        ));
    }

    #[test]
    fn known_checksums() {
        let table = ChecksumTable::shared();
        assert_eq!(table.checksum(&[1, 2, 3, 4, 5]), 0x80);
        assert_eq!(table.checksum(&[1, 2, 3, 4]), 0xC8);
        assert_eq!(table.checksum(&[0x31, 0x32, 0x33, 0x34, 0x35]), 218);
        assert_eq!(table.checksum_prefix(&[0x31, 0x32, 0x33, 0x34, 0x35], 3), 209);
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(ChecksumTable::shared().checksum(&[]), 0);
    }

    #[test]
    fn checksum_is_deterministic() {
        let table = ChecksumTable::shared();
        let data = b"deterministic payload";
        assert_eq!(table.checksum(data), table.checksum(data));
    }

    #[test]
    fn prefix_longer_than_input_is_clamped() {
        let table = ChecksumTable::shared();
        let data = [0x31, 0x32, 0x33, 0x34, 0x35];
        assert_eq!(table.checksum_prefix(&data, 10), table.checksum(&data));
    }

    #[test]
    fn characters_coerce_to_their_ordinal() {
        let table = ChecksumTable::shared();
        let chars: Vec<char> = "12345".chars().collect();
        assert_eq!(table.checksum_items(&chars).unwrap(), 218);
    }

    #[test]
    fn integers_coerce_when_in_range() {
        let table = ChecksumTable::shared();
        assert_eq!(table.checksum_items(&[1u32, 2, 3, 4, 5]).unwrap(), 0x80);
        assert_eq!(table.checksum_items(&[0x31i32]).unwrap(), 0xCD);
    }

    #[test]
    fn non_byte_items_are_rejected() {
        let table = ChecksumTable::shared();
        assert!(matches!(
            table.checksum_items(&['a', 'é', '€']),
            Err(FrameError::NotAByte(_))
        ));
        assert!(matches!(
            table.checksum_items(&[256u16]),
            Err(FrameError::NotAByte(_))
        ));
        assert!(matches!(
            table.checksum_items(&[-1i32]),
            Err(FrameError::NotAByte(_))
        ));
    }

    #[test]
    fn render_layout() {
        let rendered = ChecksumTable::shared().render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 16);
        assert!(lines[0].starts_with("0x0 0x9B 0xAD"));
        assert_eq!(lines[0].split(' ').count(), 16);
        assert!(rendered.ends_with("0x7B\n"));
    }

    #[test]
    fn default_matches_shared() {
        assert_eq!(ChecksumTable::default(), *ChecksumTable::shared());
    }

    #[test]
    fn default_table_is_crc8_lte() {
        assert_eq!(ChecksumTable::shared().checksum(b"123456789"), 0xEA);
    }

    proptest! {
        #[test]
        fn default_table_matches_reference_crc(
            bytes in prop::collection::vec(any::<u8>(), 0..=512),
        ) {
            let reference = crc::Crc::<u8>::new(&crc::CRC_8_LTE);
            prop_assert_eq!(ChecksumTable::shared().checksum(&bytes), reference.checksum(&bytes));
        }
    }
}
