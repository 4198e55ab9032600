//! Writer configuration.

use crate::netcdf::NcFormat;
use crate::util::{Error, Result};

/// Default capacity of the per-record string axis.
pub const DEFAULT_STRING_SIZE: usize = 256;

/// Settings fixed for the lifetime of a [`NetCdfFileWriter`](super::NetCdfFileWriter).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriterConfig {
    /// Length of the `attrStringSize` dimension. Stored strings hold at most
    /// `string_size - 1` bytes.
    pub string_size: usize,
    /// Classic or 64-bit offset container.
    pub format: NcFormat,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            string_size: DEFAULT_STRING_SIZE,
            format: NcFormat::Classic,
        }
    }
}

impl WriterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_string_size(mut self, size: usize) -> Self {
        self.string_size = size;
        self
    }

    pub fn with_format(mut self, format: NcFormat) -> Self {
        self.format = format;
        self
    }

    /// Longest string value that fits a string slot.
    #[inline]
    pub fn max_string_len(&self) -> usize {
        self.string_size.saturating_sub(1)
    }

    pub fn validate(&self) -> Result<()> {
        if self.string_size == 0 || self.string_size > u32::MAX as usize {
            return Err(Error::FormatLimit(format!(
                "string size {} outside 1..={}",
                self.string_size,
                u32::MAX
            )));
        }
        Ok(())
    }
}
