//! Record encoding helpers.

use tracing::warn;

use super::schema::AttributeSlot;
use crate::ndarray::{AttrValue, Attribute};
use crate::util::{Error, Result};

/// Copy native-endian elements of `width` bytes into big-endian order.
///
/// Values are not converted; only byte order changes.
pub(crate) fn native_to_big_endian(data: &[u8], width: usize) -> Vec<u8> {
    let mut out = data.to_vec();
    if cfg!(target_endian = "little") && width > 1 {
        for elem in out.chunks_exact_mut(width) {
            elem.reverse();
        }
    }
    out
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a character.
pub(crate) fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// One attribute value ready for its slot.
#[derive(Debug, PartialEq)]
pub(crate) struct EncodedAttr {
    pub varid: usize,
    /// Elements along the slot's inner axis (string length), or `None` for numerics.
    pub text_len: Option<usize>,
    pub bytes: Vec<u8>,
}

/// Encode an attribute value as big-endian bytes of its storage type.
///
/// Strings longer than `max_len` bytes are truncated with a warning.
pub(crate) fn encode_attribute(slot: &AttributeSlot, attr: &Attribute, max_len: usize) -> Result<EncodedAttr> {
    let (text_len, bytes) = match attr.value() {
        AttrValue::Int8(v) => (None, v.to_be_bytes().to_vec()),
        AttrValue::UInt8(v) => (None, v.to_be_bytes().to_vec()),
        AttrValue::Int16(v) => (None, v.to_be_bytes().to_vec()),
        AttrValue::UInt16(v) => (None, v.to_be_bytes().to_vec()),
        AttrValue::Int32(v) => (None, v.to_be_bytes().to_vec()),
        AttrValue::UInt32(v) => (None, v.to_be_bytes().to_vec()),
        AttrValue::Float32(v) => (None, v.to_be_bytes().to_vec()),
        AttrValue::Float64(v) => (None, v.to_be_bytes().to_vec()),
        AttrValue::String(s) => {
            let kept = truncate_utf8(s, max_len);
            if kept.len() < s.len() {
                warn!(attribute = attr.name(), len = s.len(), max = max_len, "string attribute truncated");
            }
            (Some(kept.len()), kept.as_bytes().to_vec())
        }
        AttrValue::Undefined => return Err(Error::UndefinedAttributeType(attr.name().to_string())),
    };
    Ok(EncodedAttr { varid: slot.varid, text_len, bytes })
}
