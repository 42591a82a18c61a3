//! # DER-Style Tag-Length-Value Core
//!
//! The generic TLV element used throughout the seal wire formats: one
//! tag byte, a DER length field, and the value bytes.
//!
//! ## DER Length Rules
//!
//! - Values up to 127 bytes use the short form: one byte holding the
//!   length itself.
//! - Longer values use the long form: a leading byte `0x80 | n` followed
//!   by `n` big-endian length bytes, with `n` minimal. Decoding accepts
//!   one to four extension bytes.

use crate::error::CodecError;

/// Maximum number of long-form length extension bytes accepted.
const MAX_LENGTH_BYTES: usize = 4;

/// A DER-style TLV element with a single-byte tag.
///
/// Ephemeral: constructed while encoding or decoding a seal, never
/// persisted. Owns its value bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerTlv {
    /// The tag byte.
    pub tag: u8,
    /// The value bytes.
    pub value: Vec<u8>,
}

impl DerTlv {
    /// Create an element from a tag and owned value bytes.
    pub fn new(tag: u8, value: Vec<u8>) -> Self {
        Self { tag, value }
    }

    /// Encode as `tag | length | value`.
    pub fn encode(&self) -> Vec<u8> {
        let length = encode_length(self.value.len());
        let mut out = Vec::with_capacity(1 + length.len() + self.value.len());
        out.push(self.tag);
        out.extend_from_slice(&length);
        out.extend_from_slice(&self.value);
        out
    }

    /// Total encoded size in bytes.
    pub fn encoded_len(&self) -> usize {
        1 + encode_length(self.value.len()).len() + self.value.len()
    }

    /// Decode one element from the start of `bytes`.
    ///
    /// Returns the element and the number of bytes consumed, so callers
    /// can walk a buffer of consecutive elements.
    ///
    /// # Errors
    ///
    /// [`CodecError::Truncated`] if the buffer ends before the declared
    /// value length; [`CodecError::MalformedTlv`] on a bad length field.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize), CodecError> {
        let tag = *bytes.first().ok_or(CodecError::Truncated {
            needed: 1,
            available: 0,
        })?;
        let (value_len, length_field_size) = decode_length(&bytes[1..])?;
        let header = 1 + length_field_size;
        if bytes.len() < header + value_len {
            return Err(CodecError::Truncated {
                needed: header + value_len,
                available: bytes.len(),
            });
        }
        let value = bytes[header..header + value_len].to_vec();
        Ok((Self { tag, value }, header + value_len))
    }

    /// Decode a buffer of consecutive elements, consuming it exactly.
    pub fn decode_all(bytes: &[u8]) -> Result<Vec<Self>, CodecError> {
        let mut out = Vec::new();
        let mut offset = 0;
        while offset < bytes.len() {
            let (tlv, consumed) = Self::decode(&bytes[offset..])?;
            out.push(tlv);
            offset += consumed;
        }
        Ok(out)
    }
}

/// Encode a value length as a DER length field.
///
/// # Panics
///
/// Debug-asserts that `len` fits the four-byte long form; larger
/// values cannot occur in any seal.
pub fn encode_length(len: usize) -> Vec<u8> {
    if len <= 0x7F {
        return vec![len as u8];
    }
    debug_assert!(
        u32::try_from(len).is_ok(),
        "length {len} exceeds the {MAX_LENGTH_BYTES}-byte DER form"
    );
    let bytes = (len as u32).to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    let mut out = vec![0x80 | (4 - skip) as u8];
    out.extend_from_slice(&bytes[skip..]);
    out
}

/// Decode a DER length field.
///
/// Returns `(value_length, length_field_size)`.
pub fn decode_length(bytes: &[u8]) -> Result<(usize, usize), CodecError> {
    let first = *bytes.first().ok_or(CodecError::Truncated {
        needed: 1,
        available: 0,
    })?;
    if first & 0x80 == 0 {
        return Ok((first as usize, 1));
    }
    let ext = (first & 0x7F) as usize;
    if ext == 0 || ext > MAX_LENGTH_BYTES {
        return Err(CodecError::MalformedTlv(format!(
            "length-of-length {ext} outside 1..={MAX_LENGTH_BYTES}"
        )));
    }
    if bytes.len() < 1 + ext {
        return Err(CodecError::Truncated {
            needed: 1 + ext,
            available: bytes.len(),
        });
    }
    let mut len = 0usize;
    for &b in &bytes[1..1 + ext] {
        len = len << 8 | b as usize;
    }
    Ok((len, 1 + ext))
}

/// Normalize a big-endian magnitude into DER INTEGER content bytes.
///
/// Strips leading zero bytes, then re-inserts exactly one `0x00` when
/// the high bit of the first remaining byte would otherwise flip the
/// sign. An all-zero input yields `[0x00]`.
pub fn unsigned_int_bytes(magnitude: &[u8]) -> Vec<u8> {
    let stripped: &[u8] = {
        let skip = magnitude.iter().take_while(|&&b| b == 0).count();
        &magnitude[skip..]
    };
    match stripped.first() {
        None => vec![0x00],
        Some(&b) if b & 0x80 != 0 => {
            let mut out = Vec::with_capacity(stripped.len() + 1);
            out.push(0x00);
            out.extend_from_slice(stripped);
            out
        }
        _ => stripped.to_vec(),
    }
}
