//! # sealkit-core — Codec Primitives for Digital Seals
//!
//! This crate is the bedrock of the sealkit workspace. It holds the
//! stateless codec primitives shared by every seal format: C40 text
//! packing, packed calendar dates, masked dates, the Base32 and Base256
//! text transports, DEFLATE payload wrapping, the DER-style TLV core,
//! and the flat TLV span scanner used for byte-range annotation.
//!
//! ## Key Design Principles
//!
//! 1. **Pure functions over byte buffers.** Nothing in this crate performs
//!    I/O, blocks, or holds state. Every operation is bounded by input
//!    size and safe to run concurrently.
//!
//! 2. **Lossless by construction.** Every decoder has an encoder that
//!    reproduces the input byte-for-byte. Where a decoded form alone is
//!    not invertible (C40 filler, masked-date patterns), the types carry
//!    enough information to reconstruct the wire bytes exactly.
//!
//! 3. **Hard failure on structural damage.** A truncated TLV or malformed
//!    length field is never skipped or repaired — the same scanner feeds
//!    both parsing and annotation, and silent recovery would let the two
//!    disagree about byte ranges.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sealkit-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod c40;
pub mod dates;
pub mod error;
pub mod scanner;
pub mod tlv;
pub mod transport;

// Re-export primary types for ergonomic imports.
pub use dates::MaskedDate;
pub use error::CodecError;
pub use scanner::{ByteSpan, TlvSpan};
pub use tlv::DerTlv;
