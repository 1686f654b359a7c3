use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MarshalError;

/// Byte order used for multi-byte scalars.
///
/// Sizes are always the standard ones (`i` is 4 bytes, `q` is 8); the
/// native orders only pick the host's endianness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ByteOrder {
    /// Host endianness.
    #[serde(rename = "native", alias = "@")]
    Native,
    /// Host endianness, standard sizes.
    #[serde(rename = "native_standard", alias = "=")]
    NativeStandard,
    /// Least significant byte first.
    #[default]
    #[serde(rename = "little-endian", alias = "<")]
    LittleEndian,
    /// Most significant byte first.
    #[serde(rename = "big-endian", alias = ">")]
    BigEndian,
    /// Same as big-endian.
    #[serde(rename = "network", alias = "!")]
    Network,
}

impl ByteOrder {
    /// All byte orders, in declaration order.
    pub const ALL: [ByteOrder; 5] = [
        ByteOrder::Native,
        ByteOrder::NativeStandard,
        ByteOrder::LittleEndian,
        ByteOrder::BigEndian,
        ByteOrder::Network,
    ];

    /// Long name, e.g. `little-endian`.
    pub fn name(self) -> &'static str {
        match self {
            ByteOrder::Native => "native",
            ByteOrder::NativeStandard => "native_standard",
            ByteOrder::LittleEndian => "little-endian",
            ByteOrder::BigEndian => "big-endian",
            ByteOrder::Network => "network",
        }
    }

    /// One-character symbol, e.g. `<`.
    pub fn symbol(self) -> char {
        match self {
            ByteOrder::Native => '@',
            ByteOrder::NativeStandard => '=',
            ByteOrder::LittleEndian => '<',
            ByteOrder::BigEndian => '>',
            ByteOrder::Network => '!',
        }
    }

    /// Whether scalars are stored most significant byte first.
    pub fn is_big_endian(self) -> bool {
        match self {
            ByteOrder::Native | ByteOrder::NativeStandard => cfg!(target_endian = "big"),
            ByteOrder::LittleEndian => false,
            ByteOrder::BigEndian | ByteOrder::Network => true,
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ByteOrder {
    type Err = MarshalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ByteOrder::ALL
            .into_iter()
            .find(|order| {
                s == order.name() || s.chars().eq(std::iter::once(order.symbol()))
            })
            .ok_or_else(|| MarshalError::UnknownByteOrder(s.to_string()))
    }
}
