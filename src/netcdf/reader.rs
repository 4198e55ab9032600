//! netCDF classic reader.
//!
//! Parses the header and exposes raw variable data. Used to inspect and verify
//! files produced by the writer.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use memmap2::Mmap;

use super::format::{NcFormat, NcType};
use super::header::{Header, NcDim, NcValues, NcVar};
use crate::util::{Error, Result};

enum Source {
    /// Memory-mapped file (preferred for large files)
    Mmap(Mmap),
    /// Whole file read into memory (fallback)
    Bytes(Vec<u8>),
}

impl Source {
    fn bytes(&self) -> &[u8] {
        match self {
            Self::Mmap(m) => m,
            Self::Bytes(b) => b,
        }
    }
}

/// Read-only view of a classic file.
pub struct NcReader {
    source: Source,
    header: Header,
    format: NcFormat,
    recsize: u64,
}

impl NcReader {
    /// Open a file for reading with memory mapping.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_opts(path, true)
    }

    /// Open a file with optional memory mapping.
    pub fn open_opts(path: impl AsRef<Path>, use_mmap: bool) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;

        let size = file.metadata()?.len();
        let source = if use_mmap && size > 0 {
            // Safety: the mapping is read-only; the writer for this path must be closed.
            let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::Mmap(e.to_string()))?;
            Source::Mmap(mmap)
        } else {
            let mut buf = Vec::with_capacity(size as usize);
            file.read_to_end(&mut buf)?;
            Source::Bytes(buf)
        };

        let (header, format) = Header::decode(source.bytes())?;
        let recsize = header.recsize();
        Ok(Self { source, header, format, recsize })
    }

    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    #[inline]
    pub fn format(&self) -> NcFormat {
        self.format
    }

    /// Number of records along the unlimited dimension.
    #[inline]
    pub fn record_count(&self) -> usize {
        self.header.numrecs
    }

    pub fn dims(&self) -> &[NcDim] {
        &self.header.dims
    }

    pub fn vars(&self) -> &[NcVar] {
        &self.header.vars
    }

    pub fn dim(&self, name: &str) -> Option<&NcDim> {
        self.header.find_dim(name).map(|id| &self.header.dims[id])
    }

    /// Length of a dimension; the record dimension reports the record count.
    pub fn dim_len(&self, name: &str) -> Option<usize> {
        let dim = &self.header.dims[self.header.find_dim(name)?];
        Some(if dim.is_unlimited() { self.header.numrecs } else { dim.len })
    }

    pub fn global_attr(&self, name: &str) -> Option<&NcValues> {
        self.header.global_attr(name)
    }

    /// Look up a variable by name.
    pub fn var(&self, name: &str) -> Result<&NcVar> {
        self.header
            .find_var(name)
            .map(|id| &self.header.vars[id])
            .ok_or_else(|| Error::VariableNotFound(name.to_string()))
    }

    /// Current shape of a variable.
    pub fn var_shape(&self, name: &str) -> Result<Vec<usize>> {
        Ok(self.header.var_shape(self.var(name)?))
    }

    /// Dimension names of a variable, slowest-varying first.
    pub fn var_dim_names(&self, name: &str) -> Result<Vec<&str>> {
        let var = self.var(name)?;
        Ok(var.dimids.iter().map(|&id| self.header.dims[id].name.as_str()).collect())
    }

    fn slice(&self, pos: u64, len: u64) -> Result<&[u8]> {
        let data = self.source.bytes();
        let end = pos.checked_add(len).filter(|&e| e <= data.len() as u64);
        match end {
            Some(end) => Ok(&data[pos as usize..end as usize]),
            None => Err(Error::UnexpectedEof(pos.saturating_add(len))),
        }
    }

    /// Big-endian bytes of the sub-array at `index` along the first axis.
    ///
    /// For record variables this is one record.
    pub fn read_slab_bytes(&self, name: &str, index: usize) -> Result<&[u8]> {
        let var = self.var(name)?;
        let shape = self.header.var_shape(var);
        let Some(&outer) = shape.first() else {
            return Err(Error::InvalidDimension(format!("{} is a scalar", name)));
        };
        if index >= outer {
            return Err(Error::IndexOutOfBounds { axis: 0, start: index, len: outer });
        }
        let elsize = var.nc_type.size() as u64;
        let inner: u64 = shape[1..].iter().map(|&n| n as u64).product();
        let len = inner * elsize;
        let pos = if self.header.is_record_var(var) {
            var.begin + index as u64 * self.recsize
        } else {
            var.begin + index as u64 * len
        };
        self.slice(pos, len)
    }

    /// Big-endian bytes of an entire variable, records concatenated.
    pub fn read_var_bytes(&self, name: &str) -> Result<Vec<u8>> {
        let var = self.var(name)?;
        if self.header.is_record_var(var) {
            let mut out = Vec::new();
            for rec in 0..self.header.numrecs {
                out.extend_from_slice(self.read_slab_bytes(name, rec)?);
            }
            Ok(out)
        } else {
            let elems = self.header.var_slab_elements(var);
            Ok(self.slice(var.begin, elems * var.nc_type.size() as u64)?.to_vec())
        }
    }

    /// Decoded values of an entire variable.
    pub fn read_values(&self, name: &str) -> Result<NcValues> {
        let var = self.var(name)?;
        Ok(NcValues::decode(var.nc_type, &self.read_var_bytes(name)?))
    }

    pub fn read_i8(&self, name: &str) -> Result<Vec<i8>> {
        match self.read_values(name)? {
            NcValues::Byte(v) => Ok(v),
            other => Err(type_error(name, NcType::Byte, &other)),
        }
    }

    pub fn read_i16(&self, name: &str) -> Result<Vec<i16>> {
        match self.read_values(name)? {
            NcValues::Short(v) => Ok(v),
            other => Err(type_error(name, NcType::Short, &other)),
        }
    }

    pub fn read_i32(&self, name: &str) -> Result<Vec<i32>> {
        match self.read_values(name)? {
            NcValues::Int(v) => Ok(v),
            other => Err(type_error(name, NcType::Int, &other)),
        }
    }

    pub fn read_f32(&self, name: &str) -> Result<Vec<f32>> {
        match self.read_values(name)? {
            NcValues::Float(v) => Ok(v),
            other => Err(type_error(name, NcType::Float, &other)),
        }
    }

    pub fn read_f64(&self, name: &str) -> Result<Vec<f64>> {
        match self.read_values(name)? {
            NcValues::Double(v) => Ok(v),
            other => Err(type_error(name, NcType::Double, &other)),
        }
    }

    /// Decoded values of one slab along the first axis.
    pub fn read_slab_values(&self, name: &str, index: usize) -> Result<NcValues> {
        let var = self.var(name)?;
        Ok(NcValues::decode(var.nc_type, self.read_slab_bytes(name, index)?))
    }

    /// Text of one slab of a char variable, with trailing NULs removed.
    pub fn read_text(&self, name: &str, index: usize) -> Result<String> {
        let bytes = self.read_slab_bytes(name, index)?;
        let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
        Ok(String::from_utf8(bytes[..end].to_vec())?)
    }
}

fn type_error(name: &str, wanted: NcType, found: &NcValues) -> Error {
    Error::mismatch(format!("{} as {}", name, wanted), found.nc_type())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file() {
        let err = NcReader::open("/nonexistent/file.nc").err();
        assert!(matches!(err, Some(Error::NotFound(_))));
    }

    #[test]
    fn test_rejects_garbage() -> Result<()> {
        let mut temp = NamedTempFile::new()?;
        temp.write_all(b"HDF\x01\0\0\0\0")?;
        temp.flush()?;
        assert!(matches!(NcReader::open(temp.path()), Err(Error::InvalidFormat(_))));
        Ok(())
    }

    #[test]
    fn test_corrupt_list_count() -> Result<()> {
        let mut temp = NamedTempFile::new()?;
        temp.write_all(b"CDF\x01")?;
        temp.write_all(&[0; 12])?;
        temp.write_all(&[0, 0, 0, 0x0C, 0xFF, 0xFF, 0xFF, 0xFF])?;
        temp.write_all(&[0; 4])?;
        temp.flush()?;
        assert!(matches!(NcReader::open(temp.path()), Err(Error::UnexpectedEof(_))));
        Ok(())
    }

    #[test]
    fn test_empty_file_is_truncated() -> Result<()> {
        let temp = NamedTempFile::new()?;
        assert!(matches!(NcReader::open(temp.path()), Err(Error::UnexpectedEof(_))));
        Ok(())
    }
}
