//! Utility types shared by the frame model and the container writer.
//!
//! - [`DataType`] / [`AttrDataType`] - Element and attribute type codes
//! - [`Dimension`] / [`Dimensions`] - Frame axis descriptors
//! - [`Error`] / [`Result`] - Error handling

mod data_type;
mod dimensions;
mod error;

pub use data_type::*;
pub use dimensions::*;
pub use error::*;
