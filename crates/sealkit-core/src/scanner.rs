//! # TLV Span Scanner
//!
//! Scans a byte buffer into a flat sequence of TLV spans — tag, length
//! field, and value byte ranges — without interpreting any contents.
//!
//! The scanner feeds both normal parsing and byte-range annotation, so
//! it has no error recovery: a malformed length or truncated value is a
//! hard failure. It is deliberately non-recursive; callers that want to
//! descend into a constructed value re-invoke [`scan`] on the inner
//! slice with an adjusted base offset.

use crate::error::CodecError;
use crate::tlv;

/// A half-open byte range into a specific buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteSpan {
    /// Offset of the first byte.
    pub offset: usize,
    /// Number of bytes covered.
    pub length: usize,
}

impl ByteSpan {
    /// Create a span from an offset and length.
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// One past the last byte covered.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Whether `other` lies entirely within this span.
    pub fn contains(&self, other: &ByteSpan) -> bool {
        other.offset >= self.offset && other.end() <= self.end()
    }
}

/// One scanned TLV: byte positions of its tag, length field, and value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvSpan {
    /// The tag byte.
    pub tag: u8,
    /// Offset of the tag byte (relative to the scan's base offset).
    pub tag_offset: usize,
    /// Size of the DER length field in bytes.
    pub length_field_size: usize,
    /// Declared length of the value.
    pub value_length: usize,
}

impl TlvSpan {
    /// Offset of the first value byte.
    pub fn value_offset(&self) -> usize {
        self.tag_offset + 1 + self.length_field_size
    }

    /// Total encoded size: tag + length field + value.
    pub fn total_length(&self) -> usize {
        1 + self.length_field_size + self.value_length
    }

    /// Span of the whole element.
    pub fn span(&self) -> ByteSpan {
        ByteSpan::new(self.tag_offset, self.total_length())
    }

    /// Span of the length field alone.
    pub fn length_span(&self) -> ByteSpan {
        ByteSpan::new(self.tag_offset + 1, self.length_field_size)
    }

    /// Span of the value bytes alone.
    pub fn value_span(&self) -> ByteSpan {
        ByteSpan::new(self.value_offset(), self.value_length)
    }
}

/// Scan `buf` into consecutive TLV spans, offset by `base`.
///
/// Order-preserving and exhaustive: the returned spans tile `buf` from
/// start to end.
///
/// # Errors
///
/// Propagates [`CodecError::Truncated`] and [`CodecError::MalformedTlv`]
/// from the length decoder; no partial results are returned.
pub fn scan(buf: &[u8], base: usize) -> Result<Vec<TlvSpan>, CodecError> {
    let mut spans = Vec::new();
    let mut offset = 0;
    while offset < buf.len() {
        let tag = buf[offset];
        let (value_length, length_field_size) = tlv::decode_length(&buf[offset + 1..])?;
        let total = 1 + length_field_size + value_length;
        if offset + total > buf.len() {
            return Err(CodecError::Truncated {
                needed: offset + total,
                available: buf.len(),
            });
        }
        spans.push(TlvSpan {
            tag,
            tag_offset: base + offset,
            length_field_size,
            value_length,
        });
        offset += total;
    }
    Ok(spans)
}
