//! netCDF frame file writer.
//!
//! `open` defines the whole file from the first frame:
//!
//! ```text
//! global attributes  dataType NDNetCDFFileVersion numArrayDims
//!                    dimSize dimOffset dimBinning dimReverse
//!                    <attr>_DataType <attr>_Description ...
//! dimensions         numArrays (1 or unlimited) dim0..dimN-1 attrStringSize
//! variables          uniqueId[numArrays] timeStamp[numArrays]
//!                    array_data[numArrays, dim0..dimN-1]
//!                    <attr>[numArrays] or <attr>[numArrays, attrStringSize] ...
//! ```
//!
//! `dim{i}` has the size of frame dimension `N-1-i`, so the slowest-varying
//! container axis matches the slowest-varying frame axis and frame buffers
//! are written without reordering.

use std::path::Path;

use tracing::{debug, trace};

use super::config::WriterConfig;
use super::encode::{encode_attribute, native_to_big_endian, EncodedAttr};
use super::schema::*;
use super::{FileOpenMode, FrameFileWriter};
use crate::ndarray::ArrayFrame;
use crate::netcdf::{NcFile, NcType, NcValues, UNLIMITED};
use crate::util::{Error, Result};

/// State of one open file.
struct Session {
    nc: NcFile,
    schema: FileSchema,
    unique_id: usize,
    time_stamp: usize,
    array_data: usize,
    next_record: usize,
}

/// Writes array frames to netCDF classic files.
pub struct NetCdfFileWriter {
    config: WriterConfig,
    session: Option<Session>,
}

impl Default for NetCdfFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl NetCdfFileWriter {
    /// Create a writer with the default configuration.
    pub fn new() -> Self {
        Self {
            config: WriterConfig::default(),
            session: None,
        }
    }

    /// Create a writer with a validated configuration.
    pub fn with_config(config: WriterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, session: None })
    }

    #[inline]
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Schema of the open file.
    pub fn schema(&self) -> Option<&FileSchema> {
        self.session.as_ref().map(|s| &s.schema)
    }

    /// Path of the open file.
    pub fn path(&self) -> Option<&Path> {
        self.session.as_ref().map(|s| s.nc.path())
    }

    /// Index the next written frame will occupy.
    pub fn next_record(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.next_record)
    }

    /// Commit the record count and flush without closing.
    pub fn sync(&mut self) -> Result<()> {
        self.session.as_mut().ok_or(Error::NotOpen)?.nc.sync()
    }
}

impl FrameFileWriter for NetCdfFileWriter {
    fn open(&mut self, path: &Path, mode: FileOpenMode, frame: &ArrayFrame) -> Result<()> {
        if mode.intersects(FileOpenMode::READ | FileOpenMode::APPEND) {
            return Err(Error::unsupported(format!("open mode {}", mode)));
        }
        if self.session.is_some() {
            debug!("closing previous file before open");
            self.close()?;
        }

        let mut schema = FileSchema::from_frame(frame, mode.contains(FileOpenMode::MULTIPLE), self.config.string_size)?;
        let mut nc = NcFile::create(path, self.config.format)?;
        let (unique_id, time_stamp, array_data) = define(&mut nc, &mut schema, frame)?;
        nc.enddef()?;

        debug!(
            path = %path.display(),
            %mode,
            data_type = %schema.data_type(),
            dims = %schema.dims(),
            attributes = schema.slots().len(),
            "opened netCDF file"
        );

        self.session = Some(Session {
            nc,
            schema,
            unique_id,
            time_stamp,
            array_data,
            next_record: 0,
        });
        Ok(())
    }

    fn write(&mut self, frame: &ArrayFrame) -> Result<()> {
        let max_len = self.config.max_string_len();
        let session = self.session.as_mut().ok_or(Error::NotOpen)?;
        session.write(frame, max_len)
    }

    fn read(&mut self) -> Result<ArrayFrame> {
        Err(Error::unsupported("reading netCDF frame files"))
    }

    fn close(&mut self) -> Result<()> {
        let session = self.session.take().ok_or(Error::NotOpen)?;
        let records = session.next_record;
        let path = session.nc.path().to_path_buf();
        session.nc.close()?;
        debug!(path = %path.display(), records, "closed netCDF file");
        Ok(())
    }

    fn supports_multiple_arrays(&self) -> bool {
        true
    }

    fn is_open(&self) -> bool {
        self.session.is_some()
    }
}

/// Declare attributes, dimensions and variables for `frame`.
///
/// Returns the ids of `uniqueId`, `timeStamp` and `array_data` and assigns
/// each attribute slot its variable id.
fn define(nc: &mut NcFile, schema: &mut FileSchema, frame: &ArrayFrame) -> Result<(usize, usize, usize)> {
    let dims = frame.dims();
    let rank = dims.rank();

    nc.put_global_att("dataType", NcValues::Int(vec![frame.data_type().code()]))?;
    nc.put_global_att("NDNetCDFFileVersion", NcValues::Double(vec![FILE_VERSION]))?;
    nc.put_global_att("numArrayDims", NcValues::Int(vec![rank as i32]))?;

    let record_len = if schema.is_multiple() { UNLIMITED } else { 1 };
    let mut dimids = Vec::with_capacity(rank + 1);
    dimids.push(nc.def_dim(DIM_NUM_ARRAYS, record_len)?);
    for (i, size) in dims.reversed_sizes().into_iter().enumerate() {
        dimids.push(nc.def_dim(&data_dim_name(i), size)?);
    }
    let string_dim = nc.def_dim(DIM_STRING_SIZE, schema.string_size())?;

    let sizes = dims
        .iter()
        .map(|d| i32::try_from(d.size).map_err(|_| Error::FormatLimit(format!("dimension size {}", d.size))))
        .collect::<Result<Vec<i32>>>()?;
    nc.put_global_att("dimSize", NcValues::Int(sizes))?;
    nc.put_global_att("dimOffset", NcValues::Int(dims.iter().map(|d| d.offset).collect()))?;
    nc.put_global_att("dimBinning", NcValues::Int(dims.iter().map(|d| d.binning).collect()))?;
    nc.put_global_att("dimReverse", NcValues::Int(dims.iter().map(|d| d.reverse).collect()))?;

    let rec = dimids[0];
    let unique_id = nc.def_var(VAR_UNIQUE_ID, NcType::Int, &[rec])?;
    let time_stamp = nc.def_var(VAR_TIME_STAMP, NcType::Double, &[rec])?;
    let array_data = nc.def_var(VAR_ARRAY_DATA, schema.storage(), &dimids)?;

    for (slot, attr) in schema.slots_mut().iter_mut().zip(frame.attributes()) {
        nc.put_global_att(&format!("{}_DataType", slot.name), NcValues::Int(vec![slot.data_type.code()]))?;
        nc.put_global_att(&format!("{}_Description", slot.name), NcValues::text(attr.description()))?;
        slot.varid = if slot.is_string() {
            nc.def_var(&slot.name, slot.storage, &[rec, string_dim])?
        } else {
            nc.def_var(&slot.name, slot.storage, &[rec])?
        };
    }

    Ok((unique_id, time_stamp, array_data))
}

impl Session {
    fn write(&mut self, frame: &ArrayFrame, max_len: usize) -> Result<()> {
        self.schema.validate(frame)?;

        // Encode everything up front so a bad value never leaves a partial record.
        let attrs = self
            .schema
            .slots()
            .iter()
            .zip(frame.attributes())
            .map(|(slot, attr)| encode_attribute(slot, attr, max_len))
            .collect::<Result<Vec<EncodedAttr>>>()?;
        let data = native_to_big_endian(frame.data(), self.schema.storage().size());

        let rec = self.next_record;
        let (start, count) = self.schema.slab(rec);

        self.nc.put_vara(self.unique_id, &[rec], &[1], &frame.unique_id().to_be_bytes())?;
        self.nc.put_vara(self.time_stamp, &[rec], &[1], &frame.time_stamp().to_be_bytes())?;
        self.nc.put_vara(self.array_data, &start, &count, &data)?;
        for attr in &attrs {
            match attr.text_len {
                Some(len) => self.nc.put_vara(attr.varid, &[rec, 0], &[1, len], &attr.bytes)?,
                None => self.nc.put_vara(attr.varid, &[rec], &[1], &attr.bytes)?,
            }
        }

        self.next_record += 1;
        trace!(record = rec, unique_id = frame.unique_id(), "wrote frame");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ndarray::Attribute;
    use crate::netcdf::NcReader;
    use crate::util::DataType;
    use tempfile::NamedTempFile;

    fn frame(id: i32) -> ArrayFrame {
        ArrayFrame::from_elements([2usize, 2], &[1i32, 2, 3, 4])
            .unwrap()
            .with_unique_id(id)
            .with_time_stamp(id as f64 * 0.5)
            .with_attribute(Attribute::new("Exposure", "exposure time", 0.25f64))
    }

    #[test]
    fn test_write_requires_open() {
        let mut writer = NetCdfFileWriter::new();
        assert!(!writer.is_open());
        assert!(matches!(writer.write(&frame(1)), Err(Error::NotOpen)));
        assert!(matches!(writer.close(), Err(Error::NotOpen)));
        assert!(matches!(writer.sync(), Err(Error::NotOpen)));
    }

    #[test]
    fn test_read_unsupported() {
        let mut writer = NetCdfFileWriter::new();
        assert!(matches!(writer.read(), Err(Error::Unsupported(_))));
        assert!(writer.supports_multiple_arrays());
    }

    #[test]
    fn test_invalid_config() {
        let cfg = WriterConfig::new().with_string_size(0);
        assert!(NetCdfFileWriter::with_config(cfg).is_err());
    }

    #[test]
    fn test_cursor_advances() -> Result<()> {
        let temp = NamedTempFile::new()?;
        let mut writer = NetCdfFileWriter::new();
        writer.open(temp.path(), FileOpenMode::WRITE | FileOpenMode::MULTIPLE, &frame(0))?;
        assert_eq!(writer.next_record(), Some(0));
        assert_eq!(writer.path(), Some(temp.path()));

        for id in 1..=3 {
            writer.write(&frame(id))?;
        }
        assert_eq!(writer.next_record(), Some(3));
        writer.sync()?;

        let reader = NcReader::open(temp.path())?;
        assert_eq!(reader.record_count(), 3);
        drop(reader);

        writer.close()?;
        assert_eq!(writer.next_record(), None);
        Ok(())
    }

    #[test]
    fn test_reopen_closes_previous() -> Result<()> {
        let first = NamedTempFile::new()?;
        let second = NamedTempFile::new()?;
        let mut writer = NetCdfFileWriter::new();

        writer.open(first.path(), FileOpenMode::WRITE | FileOpenMode::MULTIPLE, &frame(0))?;
        writer.write(&frame(1))?;
        let other = ArrayFrame::zeroed(DataType::UInt8, [4usize])?;
        writer.open(second.path(), FileOpenMode::WRITE, &other)?;
        assert_eq!(writer.schema().map(|s| s.data_type()), Some(DataType::UInt8));
        writer.close()?;

        assert_eq!(NcReader::open(first.path())?.record_count(), 1);
        Ok(())
    }
}
