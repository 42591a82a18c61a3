//! # sealkit-seal — Seal Wire Formats
//!
//! The two machine-verifiable seal formats, over the primitives of
//! `sealkit-core` and the field registry of `sealkit-schema`:
//!
//! - [`VdsSeal`]: the TR-03137 / ICAO visible digital seal, a `0xDC`
//!   binary structure carried through a Latin-1 raw string;
//! - [`IdbSeal`]: the ICAO digital barcode, a `NDB1` text envelope
//!   around a Base32 (optionally deflated) payload.
//!
//! [`Seal`] unifies them behind one parse entry point that sniffs the
//! format from the input, for callers handing over scanner output
//! without knowing which barcode they scanned.
//!
//! ## Design
//!
//! Parsing is tolerant where the data is field-level (one undecodable
//! field degrades to raw bytes) and strict where it is structural (bad
//! magic, unknown version, stray top-level tag). Parsed seals
//! re-encode byte-identically: the original message TLVs are kept
//! verbatim, so signatures verify against exactly the bytes that were
//! signed. Builders are the opposite: developer-facing and fail-fast.
//!
//! ## Security Invariant
//!
//! This crate never touches key material. Signing and verification go
//! through the `sealkit-crypto` provider traits; the seal types only
//! define which bytes are covered by the signature.

pub mod error;
pub mod idb;
pub mod message;
pub mod vds;

pub use error::SealError;
pub use idb::{
    IdbFlags, IdbHeader, IdbSeal, IdbSealBuilder, IdbSignatureAlgorithm, SignedHeaderFields,
};
pub use message::{DecodedFeature, SignatureInfo};
pub use vds::{VdsHeader, VdsSeal, VdsSealBuilder, VdsVersion};

use sealkit_schema::SchemaRegistry;

/// Either seal format, parsed from scanner output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seal {
    /// A visible digital seal.
    Vds(VdsSeal),
    /// An ICAO digital barcode.
    Idb(IdbSeal),
}

impl Seal {
    /// Parse scanner output, sniffing the format: an `NDB1`/`RDB1`
    /// prefix selects the barcode envelope, anything else is treated
    /// as a VDS raw string.
    pub fn parse_raw_string(text: &str, registry: &SchemaRegistry) -> Result<Self, SealError> {
        if text.starts_with(idb::IDB_PREFIX) || text.starts_with(idb::IDB_LEGACY_PREFIX) {
            Ok(Seal::Idb(IdbSeal::parse_barcode(text, registry)?))
        } else {
            Ok(Seal::Vds(VdsSeal::parse_raw_string(text, registry)?))
        }
    }

    /// The typed message fields, whichever format carries them.
    pub fn message_list(&self) -> &[DecodedFeature] {
        match self {
            Seal::Vds(seal) => &seal.message,
            Seal::Idb(seal) => &seal.message,
        }
    }

    /// The issuing country from the fixed header.
    pub fn issuing_country(&self) -> &str {
        match self {
            Seal::Vds(seal) => &seal.header.issuing_country,
            Seal::Idb(seal) => &seal.header.issuing_country,
        }
    }

    /// The attached signature, if any.
    pub fn signature_info(&self) -> Option<&SignatureInfo> {
        match self {
            Seal::Vds(seal) => seal.signature.as_ref(),
            Seal::Idb(seal) => seal.signature.as_ref(),
        }
    }

    /// The exact bytes covered by the signature.
    pub fn signed_bytes(&self) -> Result<Vec<u8>, SealError> {
        match self {
            Seal::Vds(seal) => seal.signed_bytes(),
            Seal::Idb(seal) => seal.signed_bytes(),
        }
    }

    /// The binary encoding: the full VDS structure, or the decoded IDB
    /// payload (the barcode's byte-level content before Base32).
    pub fn encoded(&self) -> Result<Vec<u8>, SealError> {
        match self {
            Seal::Vds(seal) => seal.encode(),
            Seal::Idb(seal) => seal.encode_payload(),
        }
    }

    /// Re-encode to the scanner text form, byte-identical to the input
    /// this seal was parsed from.
    pub fn raw_string(&self) -> Result<String, SealError> {
        match self {
            Seal::Vds(seal) => seal.raw_string(),
            Seal::Idb(seal) => seal.encode_barcode(),
        }
    }
}
