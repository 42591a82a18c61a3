//! # Error Types — Seal Format Failures
//!
//! Structural errors are fatal: a bad magic byte, an unsupported
//! version, an unknown top-level tag, or a malformed TLV means the
//! input is not an instance of the format at all. Per-field coding
//! failures never surface here — they degrade inside the schema layer.

use thiserror::Error;

/// Errors raised while parsing or building a seal.
#[derive(Error, Debug)]
pub enum SealError {
    /// The first VDS byte was not the `0xDC` magic.
    #[error("bad magic byte {0:#04x}, expected 0xdc")]
    BadMagicByte(u8),

    /// The VDS raw version byte was neither `0x02` nor `0x03`.
    #[error("unsupported seal version {0:#04x}")]
    UnsupportedVersion(u8),

    /// A barcode payload carried a top-level tag outside the format.
    #[error("unknown top-level tag {0:#04x}")]
    UnknownTag(u8),

    /// A fixed header field could not be encoded or decoded.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// A field the format or schema requires is absent.
    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    /// The barcode text envelope is not well-formed.
    #[error("invalid barcode envelope: {0}")]
    InvalidBarcodeEnvelope(String),

    /// A primitive codec failure.
    #[error(transparent)]
    Codec(#[from] sealkit_core::CodecError),

    /// A schema lookup failure (encode-side).
    #[error(transparent)]
    Schema(#[from] sealkit_schema::SchemaError),

    /// A delegated crypto failure.
    #[error(transparent)]
    Crypto(#[from] sealkit_crypto::CryptoError),
}
