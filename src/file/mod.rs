//! Frame file writing.
//!
//! - [`FrameFileWriter`] - open/write/close interface for frame file formats
//! - [`NetCdfFileWriter`] - netCDF implementation
//! - [`FileSchema`] - structure fixed by the first frame of a file
//! - [`FileOpenMode`] / [`WriterConfig`] - open flags and writer settings

mod config;
mod encode;
mod mode;
pub mod schema;
mod traits;
mod writer;

pub use config::{WriterConfig, DEFAULT_STRING_SIZE};
pub use mode::FileOpenMode;
pub use schema::{AttributeSlot, FileSchema, FILE_VERSION};
pub use traits::FrameFileWriter;
pub use writer::NetCdfFileWriter;
