//! Array frame: one capture with its metadata.

use super::{Attribute, AttributeList};
use crate::util::{DataType, Dimensions, Element, Error, Result, MAX_DIMS};

/// One captured array plus its metadata.
///
/// The data buffer is contiguous, native-endian, and laid out with dimension 0
/// varying fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayFrame {
    data_type: DataType,
    dims: Dimensions,
    unique_id: i32,
    time_stamp: f64,
    data: Vec<u8>,
    attributes: AttributeList,
}

impl ArrayFrame {
    /// Create a frame from a raw byte buffer.
    ///
    /// Fails if the dimension count is outside `1..=MAX_DIMS` or the buffer
    /// length does not equal the element count times the element size.
    pub fn new(data_type: DataType, dims: impl Into<Dimensions>, data: Vec<u8>) -> Result<Self> {
        let dims = dims.into();
        let expected = Self::byte_len(data_type, &dims)?;
        if data.len() != expected {
            return Err(Error::DataSizeMismatch { expected, actual: data.len() });
        }
        Ok(Self {
            data_type,
            dims,
            unique_id: 0,
            time_stamp: 0.0,
            data,
            attributes: AttributeList::new(),
        })
    }

    /// Create a frame by copying typed elements.
    pub fn from_elements<T: Element>(dims: impl Into<Dimensions>, elements: &[T]) -> Result<Self> {
        let bytes: &[u8] = bytemuck::cast_slice(elements);
        Self::new(T::DATA_TYPE, dims, bytes.to_vec())
    }

    /// Create a zero-filled frame.
    pub fn zeroed(data_type: DataType, dims: impl Into<Dimensions>) -> Result<Self> {
        let dims = dims.into();
        let len = Self::byte_len(data_type, &dims)?;
        Self::new(data_type, dims, vec![0u8; len])
    }

    fn byte_len(data_type: DataType, dims: &Dimensions) -> Result<usize> {
        if dims.is_empty() || dims.rank() > MAX_DIMS {
            return Err(Error::InvalidFrame(format!(
                "dimension count {} outside 1..={}",
                dims.rank(),
                MAX_DIMS
            )));
        }
        dims.num_elements()
            .and_then(|n| n.checked_mul(data_type.num_bytes()))
            .ok_or_else(|| Error::InvalidFrame(format!("array size overflows: {}", dims)))
    }

    pub fn with_unique_id(mut self, id: i32) -> Self {
        self.unique_id = id;
        self
    }

    pub fn with_time_stamp(mut self, ts: f64) -> Self {
        self.time_stamp = ts;
        self
    }

    pub fn with_attribute(mut self, attr: Attribute) -> Self {
        self.attributes.add(attr);
        self
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    #[inline]
    pub fn dims(&self) -> &Dimensions {
        &self.dims
    }

    #[inline]
    pub fn unique_id(&self) -> i32 {
        self.unique_id
    }

    pub fn set_unique_id(&mut self, id: i32) {
        self.unique_id = id;
    }

    #[inline]
    pub fn time_stamp(&self) -> f64 {
        self.time_stamp
    }

    pub fn set_time_stamp(&mut self, ts: f64) {
        self.time_stamp = ts;
    }

    /// Raw native-endian sample bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the sample bytes. The length is fixed.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    pub fn attributes(&self) -> &AttributeList {
        &self.attributes
    }

    #[inline]
    pub fn attributes_mut(&mut self) -> &mut AttributeList {
        &mut self.attributes
    }

    /// Number of elements in the data buffer.
    pub fn num_elements(&self) -> usize {
        self.data.len() / self.data_type.num_bytes()
    }
}
