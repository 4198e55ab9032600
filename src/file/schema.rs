//! File schema derived from the first frame of a session.
//!
//! The schema fixes the element type, the frame shape and the ordered list of
//! attribute slots. Every later frame is checked against it before any bytes
//! are written.

use smallvec::SmallVec;

use crate::ndarray::ArrayFrame;
use crate::netcdf::format::validate_name;
use crate::netcdf::NcType;
use crate::util::{AttrDataType, DataType, Dimensions, Error, Result};

/// Value of the `NDNetCDFFileVersion` global attribute.
pub const FILE_VERSION: f64 = 3.0;

pub const DIM_NUM_ARRAYS: &str = "numArrays";
pub const DIM_STRING_SIZE: &str = "attrStringSize";
pub const VAR_UNIQUE_ID: &str = "uniqueId";
pub const VAR_TIME_STAMP: &str = "timeStamp";
pub const VAR_ARRAY_DATA: &str = "array_data";

/// Name of the `i`th data dimension (`dim0` varies slowest).
pub fn data_dim_name(i: usize) -> String {
    format!("dim{}", i)
}

/// Container storage type for a frame element type.
///
/// Signed and unsigned integers of the same width share a storage type; the
/// `dataType` global attribute keeps the distinction.
pub const fn storage_type(t: DataType) -> NcType {
    match t {
        DataType::Int8 | DataType::UInt8 => NcType::Byte,
        DataType::Int16 | DataType::UInt16 => NcType::Short,
        DataType::Int32 | DataType::UInt32 => NcType::Int,
        DataType::Float32 => NcType::Float,
        DataType::Float64 => NcType::Double,
    }
}

/// Container storage type for an attribute type. `Undefined` has none.
pub const fn attr_storage_type(t: AttrDataType) -> Option<NcType> {
    match t {
        AttrDataType::Int8 | AttrDataType::UInt8 => Some(NcType::Byte),
        AttrDataType::Int16 | AttrDataType::UInt16 => Some(NcType::Short),
        AttrDataType::Int32 | AttrDataType::UInt32 => Some(NcType::Int),
        AttrDataType::Float32 => Some(NcType::Float),
        AttrDataType::Float64 => Some(NcType::Double),
        AttrDataType::String => Some(NcType::Char),
        AttrDataType::Undefined => None,
    }
}

/// Storage variable of one frame attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeSlot {
    pub name: String,
    pub data_type: AttrDataType,
    pub storage: NcType,
    /// Container variable id, assigned when the file is defined.
    pub varid: usize,
}

impl AttributeSlot {
    #[inline]
    pub fn is_string(&self) -> bool {
        self.data_type.is_string()
    }
}

/// Structural schema of one open file.
#[derive(Clone, Debug, PartialEq)]
pub struct FileSchema {
    data_type: DataType,
    dims: Dimensions,
    multiple: bool,
    string_size: usize,
    slots: Vec<AttributeSlot>,
}

impl FileSchema {
    /// Derive the schema from the first frame.
    ///
    /// Rejects zero-length dimensions, attributes of undefined type, names the
    /// container cannot store and string values longer than `string_size - 1`.
    pub fn from_frame(frame: &ArrayFrame, multiple: bool, string_size: usize) -> Result<Self> {
        let dims = frame.dims().clone();
        if let Some(axis) = dims.iter().position(|d| d.size == 0) {
            return Err(Error::InvalidFrame(format!("dimension {} has size 0", axis)));
        }

        let max_len = string_size.saturating_sub(1);
        let mut slots = Vec::with_capacity(frame.attributes().len());
        for attr in frame.attributes() {
            validate_name(attr.name())?;
            validate_name(&format!("{}_Description", attr.name()))?;
            let data_type = attr.data_type();
            let storage = attr_storage_type(data_type)
                .ok_or_else(|| Error::UndefinedAttributeType(attr.name().to_string()))?;
            if let Some(s) = attr.value().as_str() {
                if s.len() > max_len {
                    return Err(Error::AttributeTooLong {
                        name: attr.name().to_string(),
                        len: s.len(),
                        max: max_len,
                    });
                }
            }
            slots.push(AttributeSlot {
                name: attr.name().to_string(),
                data_type,
                storage,
                varid: 0,
            });
        }

        Ok(Self {
            data_type: frame.data_type(),
            dims,
            multiple,
            string_size,
            slots,
        })
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Storage type of `array_data`.
    #[inline]
    pub fn storage(&self) -> NcType {
        storage_type(self.data_type)
    }

    /// Frame dimensions as seen at open time.
    #[inline]
    pub fn dims(&self) -> &Dimensions {
        &self.dims
    }

    #[inline]
    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Maximum number of records, `None` when unbounded.
    pub fn capacity(&self) -> Option<usize> {
        (!self.multiple).then_some(1)
    }

    #[inline]
    pub fn string_size(&self) -> usize {
        self.string_size
    }

    /// Attribute slots in frame attribute order.
    #[inline]
    pub fn slots(&self) -> &[AttributeSlot] {
        &self.slots
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [AttributeSlot] {
        &mut self.slots
    }

    /// Check that a frame has the structure fixed at open time.
    pub fn validate(&self, frame: &ArrayFrame) -> Result<()> {
        if frame.data_type() != self.data_type {
            return Err(Error::mismatch(
                format!("element type {}", self.data_type),
                format!("element type {}", frame.data_type()),
            ));
        }
        if frame.dims().sizes() != self.dims.sizes() {
            return Err(Error::mismatch(
                format!("dimensions {}", self.dims),
                format!("dimensions {}", frame.dims()),
            ));
        }

        let attrs = frame.attributes();
        if attrs.len() != self.slots.len() {
            return Err(Error::mismatch(
                format!("{} attributes", self.slots.len()),
                format!("{} attributes", attrs.len()),
            ));
        }
        for (slot, attr) in self.slots.iter().zip(attrs) {
            if attr.name() != slot.name {
                return Err(Error::mismatch(
                    format!("attribute {:?}", slot.name),
                    format!("attribute {:?}", attr.name()),
                ));
            }
            match attr.data_type() {
                AttrDataType::Undefined => {
                    return Err(Error::UndefinedAttributeType(attr.name().to_string()));
                }
                t if t != slot.data_type => {
                    return Err(Error::mismatch(
                        format!("{} as {}", slot.name, slot.data_type),
                        format!("{} as {}", attr.name(), t),
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Hyperslab of `array_data` for one record.
    ///
    /// `start = {record, 0, ...}`, `count = {1, size[N-1], ..., size[0]}`.
    pub fn slab(&self, record: usize) -> (SmallVec<[usize; 8]>, SmallVec<[usize; 8]>) {
        let mut start = SmallVec::with_capacity(self.dims.rank() + 1);
        let mut count = SmallVec::with_capacity(self.dims.rank() + 1);
        start.push(record);
        count.push(1);
        for size in self.dims.reversed_sizes() {
            start.push(0);
            count.push(size);
        }
        (start, count)
    }
}
