//! # sealkit-schema — Schema-Driven Field Registry
//!
//! Seal message fields are late-bound: a field's meaning comes from an
//! external, versionable schema document rather than a fixed type. This
//! crate loads those documents and exposes the lookups every seal format
//! needs:
//!
//! - resolve a document type from its 16-bit wire discriminator (and back);
//! - look a field up by tag or by name;
//! - encode a typed value into a TLV per the field's declared coding;
//! - decode a TLV into a typed [`FeatureValue`] and a field name;
//! - the two-stage extended lookup of TR-03171: a base profile selected
//!   by the wire discriminator, specialized by a UUID carried in message
//!   field tag 0.
//!
//! ## Decode Never Aborts
//!
//! Decoding dispatches on the coding kind and is total over the coding
//! enum. A field whose bytes do not fit its declared coding degrades to
//! [`FeatureValue::RawBytes`] — one bad field must never abort parsing
//! of an otherwise well-formed seal. Encoding is developer-controlled
//! and fails fast on unknown document types or feature names.
//!
//! ## Crate Policy
//!
//! - Registries are immutable after construction and safe to share
//!   across threads.
//! - Schema documents are plain serde models; file loading is the
//!   host's job. [`SchemaRegistry::builtin()`] embeds the shipped
//!   profile set for zero-configuration use.

pub mod coding;
pub mod error;
pub mod feature;
pub mod model;
pub mod registry;

pub use coding::Coding;
pub use error::SchemaError;
pub use feature::{DecodedFeature, FeatureInput, FeatureValue};
pub use model::{DocumentSchema, ExtendedSchema, FieldDefinition, ProfileId};
pub use registry::{ResolvedSchema, SchemaRegistry, IDB_DOCUMENT_TYPE};

/// Message-zone tag reserved for the extended-profile UUID.
pub const PROFILE_UUID_TAG: u8 = 0x00;
