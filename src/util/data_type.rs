//! Element and attribute type codes.
//!
//! The numeric codes are part of the file contract: they are stored verbatim in
//! the `dataType` and `<name>_DataType` global attributes so readers can recover
//! signedness, which the classic container does not record.

use bytemuck::Pod;
use std::fmt;

/// Element type of an array frame's sample data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum DataType {
    /// Signed 8-bit integer
    Int8 = 0,
    /// Unsigned 8-bit integer
    UInt8 = 1,
    /// Signed 16-bit integer
    Int16 = 2,
    /// Unsigned 16-bit integer
    UInt16 = 3,
    /// Signed 32-bit integer
    Int32 = 4,
    /// Unsigned 32-bit integer
    UInt32 = 5,
    /// 32-bit floating point
    Float32 = 6,
    /// 64-bit floating point
    Float64 = 7,
}

impl DataType {
    /// All element types in code order.
    pub const ALL: [DataType; 8] = [
        Self::Int8,
        Self::UInt8,
        Self::Int16,
        Self::UInt16,
        Self::Int32,
        Self::UInt32,
        Self::Float32,
        Self::Float64,
    ];

    /// Size of one element in bytes.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }

    /// Code written to the `dataType` global attribute.
    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Convert from a stored code.
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Int8),
            1 => Some(Self::UInt8),
            2 => Some(Self::Int16),
            3 => Some(Self::UInt16),
            4 => Some(Self::Int32),
            5 => Some(Self::UInt32),
            6 => Some(Self::Float32),
            7 => Some(Self::Float64),
            _ => None,
        }
    }

    /// Short lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Parse from the short name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type of an attribute value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AttrDataType {
    Int8 = 0,
    UInt8 = 1,
    Int16 = 2,
    UInt16 = 3,
    Int32 = 4,
    UInt32 = 5,
    Float32 = 6,
    Float64 = 7,
    String = 8,
    /// Value was never set
    Undefined = 9,
}

impl AttrDataType {
    /// Code written to the `<name>_DataType` global attribute.
    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Int8),
            1 => Some(Self::UInt8),
            2 => Some(Self::Int16),
            3 => Some(Self::UInt16),
            4 => Some(Self::Int32),
            5 => Some(Self::UInt32),
            6 => Some(Self::Float32),
            7 => Some(Self::Float64),
            8 => Some(Self::String),
            9 => Some(Self::Undefined),
            _ => None,
        }
    }

    /// Returns true for the string type.
    #[inline]
    pub const fn is_string(self) -> bool {
        matches!(self, Self::String)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::String => "string",
            Self::Undefined => "undefined",
        }
    }
}

impl fmt::Display for AttrDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<DataType> for AttrDataType {
    fn from(t: DataType) -> Self {
        match t {
            DataType::Int8 => Self::Int8,
            DataType::UInt8 => Self::UInt8,
            DataType::Int16 => Self::Int16,
            DataType::UInt16 => Self::UInt16,
            DataType::Int32 => Self::Int32,
            DataType::UInt32 => Self::UInt32,
            DataType::Float32 => Self::Float32,
            DataType::Float64 => Self::Float64,
        }
    }
}

// === Element trait for typed frame construction ===

/// Rust primitive that can back an array frame's sample buffer.
pub trait Element: Pod + Copy + Default {
    /// The corresponding element type.
    const DATA_TYPE: DataType;
}

impl Element for i8 {
    const DATA_TYPE: DataType = DataType::Int8;
}

impl Element for u8 {
    const DATA_TYPE: DataType = DataType::UInt8;
}

impl Element for i16 {
    const DATA_TYPE: DataType = DataType::Int16;
}

impl Element for u16 {
    const DATA_TYPE: DataType = DataType::UInt16;
}

impl Element for i32 {
    const DATA_TYPE: DataType = DataType::Int32;
}

impl Element for u32 {
    const DATA_TYPE: DataType = DataType::UInt32;
}

impl Element for f32 {
    const DATA_TYPE: DataType = DataType::Float32;
}

impl Element for f64 {
    const DATA_TYPE: DataType = DataType::Float64;
}
