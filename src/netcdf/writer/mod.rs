//! netCDF classic writer.
//!
//! - [`NcFile`] - define-mode declarations, `enddef`, hyperslab writes, close
//! - `stream` - positioned big-endian output

mod dataset;
mod stream;

pub use dataset::{NcFile, UNLIMITED};
