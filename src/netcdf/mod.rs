//! Native netCDF classic (CDF-1 / CDF-2) container.
//!
//! - [`format`] - Magic, tags, external types and fill values
//! - [`header`] - Header model with encode/decode
//! - [`writer`] - Define-mode dataset writer with hyperslab output
//! - [`reader`] - Memory-mapped reader for inspection and verification

pub mod format;
pub mod header;
pub mod reader;
pub mod writer;

pub use format::{NcFormat, NcType};
pub use header::{Header, NcAttr, NcDim, NcValues, NcVar};
pub use reader::NcReader;
pub use writer::{NcFile, UNLIMITED};
