//! Classic header model, shared by the writer and the reader.
//!
//! ```text
//! header    := magic numrecs dim_list gatt_list var_list
//! dim_list  := ABSENT | NC_DIMENSION nelems [name dim_length ...]
//! att_list  := ABSENT | NC_ATTRIBUTE nelems [name nc_type nelems values ...]
//! var_list  := ABSENT | NC_VARIABLE nelems [name nelems [dimid ...] vatt_list nc_type vsize begin ...]
//! ```

use byteorder::{BigEndian, ByteOrder};

use super::format::*;
use crate::util::{Error, Result};

/// Typed attribute payload.
#[derive(Clone, Debug, PartialEq)]
pub enum NcValues {
    Byte(Vec<i8>),
    Char(Vec<u8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl NcValues {
    /// Text payload from a string.
    pub fn text(s: &str) -> Self {
        Self::Char(s.as_bytes().to_vec())
    }

    pub fn nc_type(&self) -> NcType {
        match self {
            Self::Byte(_) => NcType::Byte,
            Self::Char(_) => NcType::Char,
            Self::Short(_) => NcType::Short,
            Self::Int(_) => NcType::Int,
            Self::Float(_) => NcType::Float,
            Self::Double(_) => NcType::Double,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Byte(v) => v.len(),
            Self::Char(v) => v.len(),
            Self::Short(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Double(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text content, if this is a char payload.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Char(v) => Some(String::from_utf8_lossy(v).into_owned()),
            _ => None,
        }
    }

    pub fn as_ints(&self) -> Option<&[i32]> {
        match self {
            Self::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_doubles(&self) -> Option<&[f64]> {
        match self {
            Self::Double(v) => Some(v),
            _ => None,
        }
    }

    /// Append big-endian values plus zero padding.
    fn encode(&self, buf: &mut Vec<u8>) {
        let start = buf.len();
        match self {
            Self::Byte(v) => buf.extend(v.iter().map(|x| *x as u8)),
            Self::Char(v) => buf.extend_from_slice(v),
            Self::Short(v) => v.iter().for_each(|x| buf.extend_from_slice(&x.to_be_bytes())),
            Self::Int(v) => v.iter().for_each(|x| buf.extend_from_slice(&x.to_be_bytes())),
            Self::Float(v) => v.iter().for_each(|x| buf.extend_from_slice(&x.to_be_bytes())),
            Self::Double(v) => v.iter().for_each(|x| buf.extend_from_slice(&x.to_be_bytes())),
        }
        let written = buf.len() - start;
        buf.resize(start + pad4(written), 0);
    }

    /// Decode `n` big-endian values of type `t`.
    pub fn decode(t: NcType, data: &[u8]) -> Self {
        match t {
            NcType::Byte => Self::Byte(data.iter().map(|b| *b as i8).collect()),
            NcType::Char => Self::Char(data.to_vec()),
            NcType::Short => Self::Short(data.chunks_exact(2).map(BigEndian::read_i16).collect()),
            NcType::Int => Self::Int(data.chunks_exact(4).map(BigEndian::read_i32).collect()),
            NcType::Float => Self::Float(data.chunks_exact(4).map(BigEndian::read_f32).collect()),
            NcType::Double => Self::Double(data.chunks_exact(8).map(BigEndian::read_f64).collect()),
        }
    }
}

/// Dimension definition. Length 0 marks the record (unlimited) dimension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NcDim {
    pub name: String,
    pub len: usize,
}

impl NcDim {
    #[inline]
    pub fn is_unlimited(&self) -> bool {
        self.len == 0
    }
}

/// Named attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct NcAttr {
    pub name: String,
    pub values: NcValues,
}

/// Variable definition with its computed layout.
#[derive(Clone, Debug, PartialEq)]
pub struct NcVar {
    pub name: String,
    pub dimids: Vec<usize>,
    pub attrs: Vec<NcAttr>,
    pub nc_type: NcType,
    /// Bytes per record (record variables) or in total (fixed), padded to 4.
    pub vsize: u64,
    /// File offset of the first byte.
    pub begin: u64,
}

/// Complete header contents.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Header {
    pub numrecs: usize,
    pub dims: Vec<NcDim>,
    pub attrs: Vec<NcAttr>,
    pub vars: Vec<NcVar>,
}

impl Header {
    /// Id of the record dimension, if any.
    pub fn record_dim(&self) -> Option<usize> {
        self.dims.iter().position(NcDim::is_unlimited)
    }

    pub fn is_record_var(&self, var: &NcVar) -> bool {
        match (var.dimids.first(), self.record_dim()) {
            (Some(first), Some(rec)) => *first == rec,
            _ => false,
        }
    }

    /// Dimension lengths of a variable; the record axis reports `numrecs`.
    pub fn var_shape(&self, var: &NcVar) -> Vec<usize> {
        var.dimids
            .iter()
            .map(|&id| match &self.dims[id] {
                d if d.is_unlimited() => self.numrecs,
                d => d.len,
            })
            .collect()
    }

    /// Elements in one record of a record variable, or in all of a fixed one.
    pub fn var_slab_elements(&self, var: &NcVar) -> u64 {
        let skip = usize::from(self.is_record_var(var));
        var.dimids[skip.min(var.dimids.len())..]
            .iter()
            .map(|&id| self.dims[id].len as u64)
            .product()
    }

    /// Stride between consecutive records.
    ///
    /// With exactly one record variable the records are packed without padding.
    pub fn recsize(&self) -> u64 {
        let rec_vars: Vec<&NcVar> = self.vars.iter().filter(|v| self.is_record_var(v)).collect();
        match rec_vars.as_slice() {
            [] => 0,
            [only] => self.var_slab_elements(only) * only.nc_type.size() as u64,
            many => many.iter().map(|v| v.vsize).sum(),
        }
    }

    pub fn find_dim(&self, name: &str) -> Option<usize> {
        self.dims.iter().position(|d| d.name == name)
    }

    pub fn find_var(&self, name: &str) -> Option<usize> {
        self.vars.iter().position(|v| v.name == name)
    }

    pub fn global_attr(&self, name: &str) -> Option<&NcValues> {
        self.attrs.iter().find(|a| a.name == name).map(|a| &a.values)
    }

    // === Encoding ===

    /// Serialize the header.
    pub fn encode(&self, format: NcFormat) -> Result<Vec<u8>> {
        let numrecs = u32::try_from(self.numrecs)
            .map_err(|_| Error::FormatLimit(format!("record count {}", self.numrecs)))?;

        let mut buf = Vec::with_capacity(1024);
        buf.extend_from_slice(NC_MAGIC);
        buf.push(format.version_byte());
        push_u32(&mut buf, numrecs);

        if self.dims.is_empty() {
            push_absent(&mut buf);
        } else {
            push_u32(&mut buf, NC_DIMENSION);
            push_count(&mut buf, self.dims.len())?;
            for dim in &self.dims {
                push_name(&mut buf, &dim.name)?;
                push_count(&mut buf, dim.len)?;
            }
        }

        encode_attrs(&mut buf, &self.attrs)?;

        if self.vars.is_empty() {
            push_absent(&mut buf);
        } else {
            push_u32(&mut buf, NC_VARIABLE);
            push_count(&mut buf, self.vars.len())?;
            for var in &self.vars {
                push_name(&mut buf, &var.name)?;
                push_count(&mut buf, var.dimids.len())?;
                for &id in &var.dimids {
                    push_count(&mut buf, id)?;
                }
                encode_attrs(&mut buf, &var.attrs)?;
                push_u32(&mut buf, var.nc_type.code());
                let vsize = u32::try_from(var.vsize)
                    .map_err(|_| Error::FormatLimit(format!("variable {} size {}", var.name, var.vsize)))?;
                push_u32(&mut buf, vsize);
                if var.begin > format.max_offset() {
                    return Err(Error::FormatLimit(format!(
                        "variable {} offset {} exceeds {} format",
                        var.name, var.begin, format
                    )));
                }
                match format {
                    NcFormat::Classic => push_u32(&mut buf, var.begin as u32),
                    NcFormat::Offset64 => buf.extend_from_slice(&var.begin.to_be_bytes()),
                }
            }
        }

        Ok(buf)
    }

    // === Decoding ===

    /// Parse a header from the start of a file.
    pub fn decode(data: &[u8]) -> Result<(Self, NcFormat)> {
        let mut cur = HeaderCursor { data, pos: 0 };

        if cur.bytes(3)? != NC_MAGIC {
            return Err(Error::invalid("missing CDF magic"));
        }
        let version = cur.bytes(1)?[0];
        let format = NcFormat::from_version_byte(version)
            .ok_or_else(|| Error::invalid(format!("unsupported version byte {}", version)))?;

        let numrecs = match cur.u32()? {
            STREAMING => return Err(Error::invalid("streaming record count is not supported")),
            n => n as usize,
        };

        let mut header = Header { numrecs, ..Default::default() };

        let n = cur.list_len(NC_DIMENSION)?;
        for _ in 0..n {
            let name = cur.name()?;
            let len = cur.u32()? as usize;
            header.dims.push(NcDim { name, len });
        }

        header.attrs = cur.attrs()?;

        let n = cur.list_len(NC_VARIABLE)?;
        for _ in 0..n {
            let name = cur.name()?;
            let rank = cur.count(4)?;
            let mut dimids = Vec::with_capacity(rank);
            for _ in 0..rank {
                let id = cur.u32()? as usize;
                if id >= header.dims.len() {
                    return Err(Error::invalid(format!("variable {} references dimension {}", name, id)));
                }
                dimids.push(id);
            }
            let attrs = cur.attrs()?;
            let nc_type = NcType::from_code(cur.u32()?)?;
            let vsize = cur.u32()? as u64;
            let begin = match format {
                NcFormat::Classic => cur.u32()? as u64,
                NcFormat::Offset64 => cur.u64()?,
            };
            header.vars.push(NcVar { name, dimids, attrs, nc_type, vsize, begin });
        }

        Ok((header, format))
    }
}

fn push_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

fn push_absent(buf: &mut Vec<u8>) {
    push_u32(buf, 0);
    push_u32(buf, 0);
}

fn push_count(buf: &mut Vec<u8>, n: usize) -> Result<()> {
    let n = u32::try_from(n).map_err(|_| Error::FormatLimit(format!("count {}", n)))?;
    push_u32(buf, n);
    Ok(())
}

fn push_name(buf: &mut Vec<u8>, name: &str) -> Result<()> {
    push_count(buf, name.len())?;
    buf.extend_from_slice(name.as_bytes());
    buf.resize(buf.len() + pad4(name.len()) - name.len(), 0);
    Ok(())
}

fn encode_attrs(buf: &mut Vec<u8>, attrs: &[NcAttr]) -> Result<()> {
    if attrs.is_empty() {
        push_absent(buf);
        return Ok(());
    }
    push_u32(buf, NC_ATTRIBUTE);
    push_count(buf, attrs.len())?;
    for attr in attrs {
        push_name(buf, &attr.name)?;
        push_u32(buf, attr.values.nc_type().code());
        push_count(buf, attr.values.len())?;
        attr.values.encode(buf);
    }
    Ok(())
}

const MIN_LIST_ENTRY: usize = 8;

/// Bounds-checked big-endian cursor over header bytes.
struct HeaderCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> HeaderCursor<'a> {
    fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).filter(|&e| e <= self.data.len());
        match end {
            Some(end) => {
                let out = &self.data[self.pos..end];
                self.pos = end;
                Ok(out)
            }
            None => Err(Error::UnexpectedEof(self.data.len() as u64)),
        }
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.bytes(4)?))
    }

    fn u64(&mut self) -> Result<u64> {
        Ok(BigEndian::read_u64(self.bytes(8)?))
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Read an element count, rejecting counts the remaining bytes cannot hold.
    fn count(&mut self, min_entry: usize) -> Result<usize> {
        let n = self.u32()? as usize;
        if n > self.remaining() / min_entry {
            return Err(Error::UnexpectedEof(self.data.len() as u64));
        }
        Ok(n)
    }

    fn name(&mut self) -> Result<String> {
        let len = self.u32()? as usize;
        let raw = self.bytes(pad4(len))?;
        Ok(String::from_utf8(raw[..len].to_vec())?)
    }

    /// Read a list tag and element count; ABSENT yields 0.
    ///
    /// Every list entry is at least a name length and one more word.
    fn list_len(&mut self, tag: u32) -> Result<usize> {
        let found = self.u32()?;
        let n = self.count(MIN_LIST_ENTRY)?;
        match found {
            0 if n == 0 => Ok(0),
            t if t == tag => Ok(n),
            t => Err(Error::invalid(format!("expected list tag {:#x}, found {:#x}", tag, t))),
        }
    }

    fn attrs(&mut self) -> Result<Vec<NcAttr>> {
        let n = self.list_len(NC_ATTRIBUTE)?;
        let mut attrs = Vec::with_capacity(n);
        for _ in 0..n {
            let name = self.name()?;
            let nc_type = NcType::from_code(self.u32()?)?;
            let count = self.u32()? as usize;
            let len = count
                .checked_mul(nc_type.size())
                .ok_or_else(|| Error::invalid(format!("attribute {} too large", name)))?;
            let raw = self.bytes(pad4(len))?;
            attrs.push(NcAttr { name, values: NcValues::decode(nc_type, &raw[..len]) });
        }
        Ok(attrs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> Header {
        Header {
            numrecs: 3,
            dims: vec![
                NcDim { name: "numArrays".into(), len: 0 },
                NcDim { name: "dim0".into(), len: 5 },
            ],
            attrs: vec![
                NcAttr { name: "dataType".into(), values: NcValues::Int(vec![1]) },
                NcAttr { name: "note".into(), values: NcValues::text("hello") },
            ],
            vars: vec![
                NcVar {
                    name: "uniqueId".into(),
                    dimids: vec![0],
                    attrs: vec![],
                    nc_type: NcType::Int,
                    vsize: 4,
                    begin: 200,
                },
                NcVar {
                    name: "array_data".into(),
                    dimids: vec![0, 1],
                    attrs: vec![NcAttr { name: "units".into(), values: NcValues::text("counts") }],
                    nc_type: NcType::Byte,
                    vsize: 8,
                    begin: 204,
                },
            ],
        }
    }

    #[test]
    fn test_encode_starts_with_magic() -> Result<()> {
        let bytes = sample_header().encode(NcFormat::Classic)?;
        assert_eq!(&bytes[0..4], b"CDF\x01");
        assert_eq!(&bytes[4..8], &[0, 0, 0, 3]);
        assert_eq!(&bytes[8..12], &NC_DIMENSION.to_be_bytes());
        assert_eq!(bytes.len() % 4, 0);
        Ok(())
    }

    #[test]
    fn test_decode_inverts_encode() -> Result<()> {
        for format in [NcFormat::Classic, NcFormat::Offset64] {
            let header = sample_header();
            let bytes = header.encode(format)?;
            let (decoded, found) = Header::decode(&bytes)?;
            assert_eq!(found, format);
            assert_eq!(decoded, header);
        }
        Ok(())
    }

    #[test]
    fn test_absent_lists() -> Result<()> {
        let bytes = Header::default().encode(NcFormat::Classic)?;
        // magic + numrecs + 3 x ABSENT
        assert_eq!(bytes.len(), 8 + 3 * 8);
        let (decoded, _) = Header::decode(&bytes)?;
        assert!(decoded.dims.is_empty() && decoded.vars.is_empty());
        Ok(())
    }

    #[test]
    fn test_recsize_rules() {
        let mut header = sample_header();
        assert_eq!(header.recsize(), 12);
        // A lone byte record variable is packed without padding.
        header.vars.remove(0);
        assert_eq!(header.recsize(), 5);
    }

    #[test]
    fn test_truncated_header() {
        let bytes = sample_header().encode(NcFormat::Classic).unwrap();
        let err = Header::decode(&bytes[..bytes.len() - 2]).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof(_)));
    }

    fn header_prefix() -> Vec<u8> {
        let mut buf = b"CDF\x01".to_vec();
        push_u32(&mut buf, 0);
        buf
    }

    #[test]
    fn test_oversized_counts_are_rejected() {
        // Attribute list claiming u32::MAX entries.
        let mut bytes = header_prefix();
        push_absent(&mut bytes);
        push_u32(&mut bytes, NC_ATTRIBUTE);
        push_u32(&mut bytes, u32::MAX);
        assert!(matches!(Header::decode(&bytes), Err(Error::UnexpectedEof(_))));

        // Dimension list larger than the remaining bytes.
        let mut bytes = header_prefix();
        push_u32(&mut bytes, NC_DIMENSION);
        push_u32(&mut bytes, 1000);
        bytes.extend_from_slice(&[0; 64]);
        assert!(matches!(Header::decode(&bytes), Err(Error::UnexpectedEof(_))));

        // Variable with an impossible rank.
        let mut bytes = header_prefix();
        push_absent(&mut bytes);
        push_absent(&mut bytes);
        push_u32(&mut bytes, NC_VARIABLE);
        push_u32(&mut bytes, 1);
        push_name(&mut bytes, "x").unwrap();
        push_u32(&mut bytes, u32::MAX);
        assert!(matches!(Header::decode(&bytes), Err(Error::UnexpectedEof(_))));
    }

    #[test]
    fn test_offset_limit() {
        let mut header = sample_header();
        header.vars[1].begin = u32::MAX as u64;
        assert!(matches!(header.encode(NcFormat::Classic), Err(Error::FormatLimit(_))));
        assert!(header.encode(NcFormat::Offset64).is_ok());
    }
}
