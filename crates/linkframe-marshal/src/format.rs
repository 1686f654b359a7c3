use std::fmt;

use crate::error::{MarshalError, Result};

/// Fixed-width scalar encodings, named by their single-character codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarFormat {
    /// `c`: one byte holding a character.
    Char,
    /// `b`
    I8,
    /// `B`
    U8,
    /// `?`: one byte, 0 or 1.
    Bool,
    /// `h`
    I16,
    /// `H`
    U16,
    /// `i` (also `l`)
    I32,
    /// `I` (also `L`)
    U32,
    /// `q`
    I64,
    /// `Q`
    U64,
    /// `f`: IEEE-754 single precision.
    F32,
    /// `d`: IEEE-754 double precision.
    F64,
}

impl ScalarFormat {
    /// Parse a format code.
    ///
    /// `l`/`L` are accepted as the 4-byte integers they denote in standard
    /// sizing. Half-precision `e` is recognised but has no encoding.
    pub fn from_code(code: char) -> Result<Self> {
        Ok(match code {
            'c' => ScalarFormat::Char,
            'b' => ScalarFormat::I8,
            'B' => ScalarFormat::U8,
            '?' => ScalarFormat::Bool,
            'h' => ScalarFormat::I16,
            'H' => ScalarFormat::U16,
            'i' | 'l' => ScalarFormat::I32,
            'I' | 'L' => ScalarFormat::U32,
            'q' => ScalarFormat::I64,
            'Q' => ScalarFormat::U64,
            'f' => ScalarFormat::F32,
            'd' => ScalarFormat::F64,
            'e' => {
                return Err(MarshalError::UnsupportedType(
                    "half-precision float 'e'".to_string(),
                ))
            }
            other => return Err(MarshalError::UnknownFormatCode(other)),
        })
    }

    /// Canonical format code.
    pub fn code(self) -> char {
        match self {
            ScalarFormat::Char => 'c',
            ScalarFormat::I8 => 'b',
            ScalarFormat::U8 => 'B',
            ScalarFormat::Bool => '?',
            ScalarFormat::I16 => 'h',
            ScalarFormat::U16 => 'H',
            ScalarFormat::I32 => 'i',
            ScalarFormat::U32 => 'I',
            ScalarFormat::I64 => 'q',
            ScalarFormat::U64 => 'Q',
            ScalarFormat::F32 => 'f',
            ScalarFormat::F64 => 'd',
        }
    }

    /// Encoded size in bytes.
    pub fn size(self) -> usize {
        match self {
            ScalarFormat::Char | ScalarFormat::I8 | ScalarFormat::U8 | ScalarFormat::Bool => 1,
            ScalarFormat::I16 | ScalarFormat::U16 => 2,
            ScalarFormat::I32 | ScalarFormat::U32 | ScalarFormat::F32 => 4,
            ScalarFormat::I64 | ScalarFormat::U64 | ScalarFormat::F64 => 8,
        }
    }
}

impl fmt::Display for ScalarFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl TryFrom<char> for ScalarFormat {
    type Error = MarshalError;

    fn try_from(code: char) -> Result<Self> {
        Self::from_code(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_sizes() {
        let expected = [
            ('c', 1),
            ('b', 1),
            ('B', 1),
            ('?', 1),
            ('h', 2),
            ('H', 2),
            ('i', 4),
            ('I', 4),
            ('l', 4),
            ('L', 4),
            ('q', 8),
            ('Q', 8),
            ('f', 4),
            ('d', 8),
        ];
        for (code, size) in expected {
            assert_eq!(ScalarFormat::from_code(code).unwrap().size(), size, "{code}");
        }
    }

    #[test]
    fn canonical_codes_roundtrip() {
        for code in "cbB?hHiIqQfd".chars() {
            assert_eq!(ScalarFormat::from_code(code).unwrap().code(), code);
        }
        assert_eq!(ScalarFormat::from_code('l').unwrap().code(), 'i');
    }

    #[test]
    fn half_float_is_unsupported() {
        assert!(matches!(
            ScalarFormat::from_code('e'),
            Err(MarshalError::UnsupportedType(_))
        ));
    }

    #[test]
    fn unknown_code() {
        assert!(matches!(
            ScalarFormat::try_from('z'),
            Err(MarshalError::UnknownFormatCode('z'))
        ));
    }
}
