//! # Error Types — Schema Lookup and Document Failures
//!
//! Encode-side lookups fail fast: building a seal is developer-driven,
//! and a typo in a document type or feature name should surface
//! immediately. Decode-side coding mismatches are not errors at all —
//! they degrade to raw bytes in [`crate::FeatureValue`].

use thiserror::Error;

/// Errors raised by schema loading and encode-side lookups.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// No schema is registered under this document type name.
    #[error("unknown document type {0:?}")]
    UnknownDocumentType(String),

    /// The document type exists but declares no such feature.
    #[error("document type {document_type:?} has no feature {feature:?}")]
    UnknownFeature {
        /// The document type that was consulted.
        document_type: String,
        /// The feature name that failed to resolve.
        feature: String,
    },

    /// An extended schema names a base document type that does not exist.
    #[error("extended schema {extended:?} requires missing base document type {base:?}")]
    MissingBaseSchema {
        /// Name of the extended schema.
        extended: String,
        /// The base document type it declared.
        base: String,
    },

    /// A schema document could not be deserialized or is inconsistent.
    #[error("invalid schema document: {0}")]
    InvalidSchemaDocument(String),

    /// The supplied value variant does not match the field's coding.
    #[error("feature {feature:?} expects a {expected} value")]
    ValueMismatch {
        /// The feature being encoded.
        feature: String,
        /// Human name of the expected input variant.
        expected: &'static str,
    },

    /// The encoded value violates the field's declared length bounds.
    #[error("feature {feature:?} encoded to {len} bytes, outside {min}..={max}")]
    LengthOutOfRange {
        /// The feature being encoded.
        feature: String,
        /// Actual encoded length.
        len: usize,
        /// Declared minimum.
        min: usize,
        /// Declared maximum.
        max: usize,
    },

    /// A primitive codec rejected the value during encode.
    #[error(transparent)]
    Codec(#[from] sealkit_core::CodecError),
}
