//! Classic dataset writer.
//!
//! A dataset starts in define mode, where dimensions, variables and
//! attributes are declared. [`NcFile::enddef`] lays out the variables, writes
//! the header and pre-fills fixed-size variables. After that only data writes
//! are allowed.

use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use super::stream::OStream;
use crate::netcdf::format::*;
use crate::netcdf::header::{Header, NcAttr, NcDim, NcValues, NcVar};
use crate::util::{Error, Result};

/// Length passed to [`NcFile::def_dim`] to declare the record dimension.
pub const UNLIMITED: usize = 0;

/// Writer for one classic netCDF file.
pub struct NcFile {
    path: PathBuf,
    stream: OStream,
    format: NcFormat,
    header: Header,
    define_mode: bool,
    /// Offset of record 0 of the first record variable.
    begin_rec: u64,
    recsize: u64,
    /// One record's worth of fill values for all record variables.
    record_fill: Vec<u8>,
    numrecs_dirty: bool,
    closed: bool,
}

impl NcFile {
    /// Create a new file, replacing any existing file at `path`.
    pub fn create(path: impl AsRef<Path>, format: NcFormat) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let stream = OStream::create(&path)?;
        debug!(path = %path.display(), %format, "created netCDF file");

        Ok(Self {
            path,
            stream,
            format,
            header: Header::default(),
            define_mode: true,
            begin_rec: 0,
            recsize: 0,
            record_fill: Vec::new(),
            numrecs_dirty: false,
            closed: false,
        })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn format(&self) -> NcFormat {
        self.format
    }

    #[inline]
    pub fn is_define_mode(&self) -> bool {
        self.define_mode
    }

    /// Current header model, including computed layout after `enddef`.
    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Number of records written so far.
    #[inline]
    pub fn numrecs(&self) -> usize {
        self.header.numrecs
    }

    fn check_define(&self) -> Result<()> {
        if self.define_mode {
            Ok(())
        } else {
            Err(Error::NotInDefineMode)
        }
    }

    // === Define mode ===

    /// Declare a dimension and return its id. `UNLIMITED` declares the record dimension.
    pub fn def_dim(&mut self, name: &str, len: usize) -> Result<usize> {
        self.check_define()?;
        validate_name(name)?;
        if self.header.find_dim(name).is_some() {
            return Err(Error::NameInUse(name.to_string()));
        }
        if len == UNLIMITED && self.header.record_dim().is_some() {
            return Err(Error::UnlimitedInUse);
        }
        if len > u32::MAX as usize {
            return Err(Error::FormatLimit(format!("dimension {} length {}", name, len)));
        }
        self.header.dims.push(NcDim { name: name.to_string(), len });
        Ok(self.header.dims.len() - 1)
    }

    /// Declare a variable over the given dimensions and return its id.
    ///
    /// The record dimension may only appear first.
    pub fn def_var(&mut self, name: &str, nc_type: NcType, dimids: &[usize]) -> Result<usize> {
        self.check_define()?;
        validate_name(name)?;
        if self.header.find_var(name).is_some() {
            return Err(Error::NameInUse(name.to_string()));
        }
        for (axis, &id) in dimids.iter().enumerate() {
            let dim = self
                .header
                .dims
                .get(id)
                .ok_or_else(|| Error::InvalidDimension(format!("unknown dimension id {}", id)))?;
            if axis > 0 && dim.is_unlimited() {
                return Err(Error::InvalidDimension(format!(
                    "record dimension {} must be the first dimension of {}",
                    dim.name, name
                )));
            }
        }
        self.header.vars.push(NcVar {
            name: name.to_string(),
            dimids: dimids.to_vec(),
            attrs: Vec::new(),
            nc_type,
            vsize: 0,
            begin: 0,
        });
        Ok(self.header.vars.len() - 1)
    }

    /// Set a global attribute, replacing an existing one of the same name.
    pub fn put_global_att(&mut self, name: &str, values: NcValues) -> Result<()> {
        self.check_define()?;
        set_attr(&mut self.header.attrs, name, values)
    }

    /// Set a variable attribute, replacing an existing one of the same name.
    pub fn put_var_att(&mut self, varid: usize, name: &str, values: NcValues) -> Result<()> {
        self.check_define()?;
        let var = self.header.vars.get_mut(varid).ok_or(Error::InvalidVariable(varid))?;
        set_attr(&mut var.attrs, name, values)
    }

    /// Leave define mode: compute the layout, write the header and fill fixed variables.
    pub fn enddef(&mut self) -> Result<()> {
        self.check_define()?;

        let mut slab_elems = Vec::with_capacity(self.header.vars.len());
        for var in &self.header.vars {
            let elems = self.header.var_slab_elements(var);
            let len = elems
                .checked_mul(var.nc_type.size() as u64)
                .filter(|&len| len <= MAX_VSIZE)
                .ok_or_else(|| Error::FormatLimit(format!("variable {} is too large", var.name)))?;
            slab_elems.push((elems, (len + 3) & !3));
        }
        for (var, &(_, vsize)) in self.header.vars.iter_mut().zip(&slab_elems) {
            var.vsize = vsize;
        }

        // begin fields have a fixed width, so a zeroed encoding gives the final size
        let header_len = self.header.encode(self.format)?.len() as u64;

        let record: Vec<bool> = self.header.vars.iter().map(|v| self.header.is_record_var(v)).collect();
        let mut offset = header_len;
        for (var, _) in self.header.vars.iter_mut().zip(&record).filter(|(_, r)| !**r) {
            var.begin = offset;
            offset += var.vsize;
        }
        self.begin_rec = offset;
        for (var, _) in self.header.vars.iter_mut().zip(&record).filter(|(_, r)| **r) {
            var.begin = offset;
            offset += var.vsize;
        }
        self.recsize = self.header.recsize();

        let bytes = self.header.encode(self.format)?;
        self.stream.write_at(0, &bytes)?;

        let mut record_fill = vec![0u8; self.recsize as usize];
        for ((var, &is_rec), &(elems, _)) in self.header.vars.iter().zip(&record).zip(&slab_elems) {
            let fill = var.nc_type.fill_bytes();
            if is_rec {
                let at = (var.begin - self.begin_rec) as usize;
                let len = elems as usize * fill.len();
                record_fill[at..at + len].copy_from_slice(&fill.repeat(elems as usize));
            } else {
                self.stream.fill_at(var.begin, fill, elems)?;
            }
        }
        self.record_fill = record_fill;
        self.define_mode = false;

        debug!(
            path = %self.path.display(),
            header_len,
            recsize = self.recsize,
            vars = self.header.vars.len(),
            "netCDF define mode ended"
        );
        Ok(())
    }

    // === Data mode ===

    /// Write a hyperslab of big-endian element bytes.
    ///
    /// `start` and `count` have one entry per variable dimension. Writing past
    /// the current record count grows the file, filling skipped records.
    pub fn put_vara(&mut self, varid: usize, start: &[usize], count: &[usize], data: &[u8]) -> Result<()> {
        if self.define_mode {
            return Err(Error::InDefineMode);
        }
        let var = self.header.vars.get(varid).ok_or(Error::InvalidVariable(varid))?;
        let rank = var.dimids.len();
        if start.len() != rank || count.len() != rank {
            return Err(Error::InvalidDimension(format!(
                "variable {} has {} dimensions, slab has {}/{}",
                var.name,
                rank,
                start.len(),
                count.len()
            )));
        }

        let is_rec = self.header.is_record_var(var);
        let elsize = var.nc_type.size();
        let begin = var.begin;
        let shape: Vec<usize> = var.dimids.iter().map(|&id| self.header.dims[id].len).collect();
        let first = usize::from(is_rec);

        if is_rec && start[0].saturating_add(count[0]) > MAX_NUMRECS {
            return Err(Error::FormatLimit(format!("record index {}", start[0])));
        }
        for axis in first..rank {
            let len = shape[axis];
            if start[axis] > len || (start[axis] == len && count[axis] > 0) {
                return Err(Error::IndexOutOfBounds { axis, start: start[axis], len });
            }
            if start[axis].saturating_add(count[axis]) > len {
                return Err(Error::EdgeExceeds { axis, start: start[axis], count: count[axis], len });
            }
        }

        let nelems: usize = count.iter().product();
        let expected = nelems * elsize;
        if data.len() != expected {
            return Err(Error::DataSizeMismatch { expected, actual: data.len() });
        }
        if nelems == 0 {
            return Ok(());
        }

        if is_rec {
            let needed = start[0] + count[0];
            if needed > self.header.numrecs {
                self.fill_records(self.header.numrecs, needed)?;
                self.header.numrecs = needed;
                self.numrecs_dirty = true;
            }
        }

        trace!(varid, ?start, ?count, "put_vara");

        // Element strides within one record (record vars) or the whole variable.
        let mut strides = vec![0u64; rank];
        let mut acc = 1u64;
        for axis in (first..rank).rev() {
            strides[axis] = acc;
            acc *= shape[axis] as u64;
        }

        // Axes [run_axis..rank) form one contiguous run in the file.
        let mut run_axis = rank;
        let mut run_elems = 1usize;
        for axis in (first..rank).rev() {
            run_axis = axis;
            run_elems *= count[axis];
            if !(start[axis] == 0 && count[axis] == shape[axis]) {
                break;
            }
        }
        let run_bytes = run_elems * elsize;

        let mut idx = vec![0usize; run_axis];
        let mut data_pos = 0usize;
        loop {
            let mut elem = 0u64;
            for axis in first..rank {
                let i = start[axis] + if axis < run_axis { idx[axis] } else { 0 };
                elem += i as u64 * strides[axis];
            }
            let mut offset = begin + elem * elsize as u64;
            if is_rec {
                offset += (start[0] + idx[0]) as u64 * self.recsize;
            }
            self.stream.write_at(offset, &data[data_pos..data_pos + run_bytes])?;
            data_pos += run_bytes;

            // Advance the odometer over the outer axes.
            let mut axis = run_axis;
            loop {
                if axis == 0 {
                    return Ok(());
                }
                axis -= 1;
                idx[axis] += 1;
                if idx[axis] < count[axis] {
                    break;
                }
                idx[axis] = 0;
            }
        }
    }

    fn fill_records(&mut self, from: usize, to: usize) -> Result<()> {
        for rec in from..to {
            let at = self.begin_rec + rec as u64 * self.recsize;
            self.stream.write_at(at, &self.record_fill)?;
        }
        Ok(())
    }

    /// Persist the record count and flush buffered data.
    pub fn sync(&mut self) -> Result<()> {
        if self.define_mode {
            return Err(Error::InDefineMode);
        }
        self.write_numrecs()?;
        self.stream.sync()
    }

    fn write_numrecs(&mut self) -> Result<()> {
        if self.numrecs_dirty {
            self.stream.seek(NUMRECS_OFFSET)?;
            self.stream.write_u32(self.header.numrecs as u32)?;
            self.numrecs_dirty = false;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.closed = true;
        if self.define_mode {
            self.enddef()?;
        }
        self.write_numrecs()?;
        self.stream.flush()?;
        debug!(path = %self.path.display(), numrecs = self.header.numrecs, "closed netCDF file");
        Ok(())
    }

    /// Finalize and close the file.
    pub fn close(mut self) -> Result<()> {
        self.finish()
    }
}

impl Drop for NcFile {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.finish() {
                warn!(path = %self.path.display(), error = %e, "failed to finalize netCDF file on drop");
            }
        }
    }
}

fn set_attr(attrs: &mut Vec<NcAttr>, name: &str, values: NcValues) -> Result<()> {
    validate_name(name)?;
    match attrs.iter_mut().find(|a| a.name == name) {
        Some(existing) => existing.values = values,
        None => attrs.push(NcAttr { name: name.to_string(), values }),
    }
    Ok(())
}
