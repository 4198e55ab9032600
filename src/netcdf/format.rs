//! netCDF classic format constants and primitive types.
//!
//! All multi-byte values are big-endian. Names and attribute payloads are
//! zero-padded to a 4-byte boundary.

use std::fmt;

use crate::util::{Error, Result};

/// Magic bytes at the start of every classic file, followed by a version byte.
pub const NC_MAGIC: &[u8; 3] = b"CDF";

/// Version byte for the classic format (32-bit offsets).
pub const VERSION_CLASSIC: u8 = 1;

/// Version byte for the 64-bit offset format.
pub const VERSION_OFFSET64: u8 = 2;

/// Offset of the record count in the header.
pub const NUMRECS_OFFSET: u64 = 4;

/// Record count value meaning "still being streamed".
pub const STREAMING: u32 = 0xFFFF_FFFF;

/// Tag introducing a dimension list.
pub const NC_DIMENSION: u32 = 0x0A;

/// Tag introducing a variable list.
pub const NC_VARIABLE: u32 = 0x0B;

/// Tag introducing an attribute list.
pub const NC_ATTRIBUTE: u32 = 0x0C;

/// Largest record count a classic file can hold.
pub const MAX_NUMRECS: usize = i32::MAX as usize;

/// Largest `vsize` representable in a header.
pub const MAX_VSIZE: u64 = u32::MAX as u64 - 3;

/// Fill bytes for never-written cells, big-endian.
pub const FILL_BYTE: [u8; 1] = (-127i8).to_be_bytes();
pub const FILL_CHAR: [u8; 1] = [0];
pub const FILL_SHORT: [u8; 2] = (-32767i16).to_be_bytes();
pub const FILL_INT: [u8; 4] = (-2147483647i32).to_be_bytes();
pub const FILL_FLOAT: [u8; 4] = [0x7C, 0xF0, 0x00, 0x00];
pub const FILL_DOUBLE: [u8; 8] = [0x47, 0x9E, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];

/// Flavor of classic file to write.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NcFormat {
    /// CDF-1: variable offsets limited to 2 GiB.
    #[default]
    Classic,
    /// CDF-2: 64-bit variable offsets.
    Offset64,
}

impl NcFormat {
    /// Version byte following the magic.
    pub const fn version_byte(self) -> u8 {
        match self {
            Self::Classic => VERSION_CLASSIC,
            Self::Offset64 => VERSION_OFFSET64,
        }
    }

    pub const fn from_version_byte(v: u8) -> Option<Self> {
        match v {
            VERSION_CLASSIC => Some(Self::Classic),
            VERSION_OFFSET64 => Some(Self::Offset64),
            _ => None,
        }
    }

    /// Width of a variable's `begin` field.
    pub const fn offset_size(self) -> usize {
        match self {
            Self::Classic => 4,
            Self::Offset64 => 8,
        }
    }

    /// Largest `begin` value this flavor can encode.
    pub const fn max_offset(self) -> u64 {
        match self {
            Self::Classic => i32::MAX as u64,
            Self::Offset64 => i64::MAX as u64,
        }
    }
}

impl fmt::Display for NcFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classic => f.write_str("classic"),
            Self::Offset64 => f.write_str("64-bit offset"),
        }
    }
}

/// External storage type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum NcType {
    Byte = 1,
    Char = 2,
    Short = 3,
    Int = 4,
    Float = 5,
    Double = 6,
}

impl NcType {
    /// Size of one element in bytes.
    #[inline]
    pub const fn size(self) -> usize {
        match self {
            Self::Byte | Self::Char => 1,
            Self::Short => 2,
            Self::Int | Self::Float => 4,
            Self::Double => 8,
        }
    }

    #[inline]
    pub const fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            1 => Ok(Self::Byte),
            2 => Ok(Self::Char),
            3 => Ok(Self::Short),
            4 => Ok(Self::Int),
            5 => Ok(Self::Float),
            6 => Ok(Self::Double),
            _ => Err(Error::invalid(format!("unknown nc_type {}", code))),
        }
    }

    /// Default fill value for one element, big-endian.
    pub const fn fill_bytes(self) -> &'static [u8] {
        match self {
            Self::Byte => &FILL_BYTE,
            Self::Char => &FILL_CHAR,
            Self::Short => &FILL_SHORT,
            Self::Int => &FILL_INT,
            Self::Float => &FILL_FLOAT,
            Self::Double => &FILL_DOUBLE,
        }
    }

    /// CDL keyword.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Float => "float",
            Self::Double => "double",
        }
    }
}

impl fmt::Display for NcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Round `n` up to the next multiple of 4.
#[inline]
pub const fn pad4(n: usize) -> usize {
    (n + 3) & !3
}

/// Longest name the classic format accepts, in bytes.
pub const NC_MAX_NAME: usize = 256;

/// Check that a dimension, variable or attribute name can be stored.
///
/// Names are 1 to [`NC_MAX_NAME`] bytes of UTF-8. The first character is a
/// letter, digit, `_` or any non-ASCII character. Later characters exclude `/`
/// and control characters, and a name must not end in whitespace.
pub fn validate_name(name: &str) -> Result<()> {
    let first_ok = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii());
    let bad = !first_ok
        || name.len() > NC_MAX_NAME
        || name.contains('/')
        || name.chars().any(char::is_control)
        || name.ends_with(char::is_whitespace);
    if bad {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}
