//! # ndnetcdf
//!
//! Writes streams of multi-dimensional detector frames, with their per-frame
//! attributes, to self-describing netCDF classic files.
//!
//! The first frame of a file fixes its structure: element type, shape and the
//! ordered attribute set. Each later frame becomes one record along the
//! `numArrays` axis.
//!
//! ## Modules
//!
//! - [`util`] - Element types, dimensions, errors
//! - [`ndarray`] - In-memory frame and attribute model
//! - [`netcdf`] - Native classic container writer and reader
//! - [`file`] - Frame file writer (open / write / close)
//!
//! ## Example
//!
//! ```no_run
//! use ndnetcdf::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> ndnetcdf::Result<()> {
//! let frame = ArrayFrame::from_elements([640usize, 480], &vec![0u16; 640 * 480])?
//!     .with_unique_id(1)
//!     .with_attribute(Attribute::new("Gain", "detector gain", 2.0f32));
//!
//! let mut writer = NetCdfFileWriter::new();
//! writer.open(Path::new("scan.nc"), FileOpenMode::WRITE | FileOpenMode::MULTIPLE, &frame)?;
//! writer.write(&frame)?;
//! writer.close()?;
//! # Ok(())
//! # }
//! ```

pub mod file;
pub mod ndarray;
pub mod netcdf;
pub mod util;

// Re-export commonly used types
pub use util::{DataType, Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::file::{FileOpenMode, FrameFileWriter, NetCdfFileWriter, WriterConfig};
    pub use crate::ndarray::{ArrayFrame, AttrValue, Attribute, AttributeList};
    pub use crate::netcdf::{NcFormat, NcReader};
    pub use crate::util::{AttrDataType, DataType, Dimension, Dimensions, Error, Result};
}
