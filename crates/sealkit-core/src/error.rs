//! # Error Types — Codec Failures
//!
//! Defines the error type shared by all primitive codecs and the TLV
//! layer. All errors use `thiserror` for derive-based `Display` and
//! `Error` implementations.
//!
//! ## Design
//!
//! - Structural damage (truncation, bad length-of-length) fails loudly
//!   with the byte counts involved.
//! - Alphabet and format violations name the offending character or
//!   input so barcode-scan diagnostics stay actionable.

use thiserror::Error;

/// Errors raised by the primitive codecs and the TLV core.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Fewer bytes were available than the structure declared.
    #[error("truncated input: needed {needed} bytes, got {available}")]
    Truncated {
        /// Number of bytes the structure declared.
        needed: usize,
        /// Number of bytes actually available.
        available: usize,
    },

    /// A TLV length field could not be decoded.
    #[error("malformed TLV: {0}")]
    MalformedTlv(String),

    /// A character outside the C40 document alphabet (digits, `A`-`Z`,
    /// space, `<`) was passed to the C40 encoder.
    #[error("character {0:?} is not in the C40 document alphabet")]
    InvalidC40Char(char),

    /// A packed C40 code point outside the document alphabet was found
    /// while decoding.
    #[error("C40 code point {0} is not in the document alphabet")]
    InvalidC40Value(u16),

    /// A date string or packed date value did not denote a calendar date.
    #[error("invalid date: {0}")]
    InvalidDateFormat(String),

    /// A text transport (Base32, Base256, DEFLATE) rejected its input.
    #[error("transport error: {0}")]
    Transport(String),
}
