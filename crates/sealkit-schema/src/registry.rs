//! # Schema Registry
//!
//! Loads the document-type schema set plus the extended-profile set and
//! answers every lookup the seal formats need. Registries are built
//! once, validated eagerly, and immutable afterwards — safe to share
//! across any number of concurrent readers.
//!
//! ## Two-Stage Extended Lookup
//!
//! The header's 16-bit discriminator selects a *base* schema. If the
//! message zone carries a profile UUID in field tag 0, the UUID selects
//! an [`ExtendedSchema`] layered over that base: extension fields
//! shadow base fields by tag, inherited base fields remain available.
//! [`SchemaRegistry::resolve`] produces the layered view.

use std::collections::HashMap;

use sealkit_core::DerTlv;
use tracing::debug;

use crate::error::SchemaError;
use crate::feature::{self, DecodedFeature, FeatureInput, FeatureValue};
use crate::model::{DocumentSchema, ExtendedSchema, FieldDefinition, ProfileId};

/// The built-in document schema set (TR-03137 profiles + the ICAO
/// barcode message group), embedded so the crate works with no files.
const BUILTIN_PROFILES: &str = include_str!("../schemas/seal_profiles.json");
/// The built-in extended-profile set.
const BUILTIN_EXTENDED: &str = include_str!("../schemas/extended_profiles.json");

/// Document type under which the ICAO barcode message-group field list
/// is registered. The barcode payload carries no discriminator, so the
/// type is fixed by convention.
pub const IDB_DOCUMENT_TYPE: &str = "IDB";

/// The immutable schema registry.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    by_type: HashMap<String, DocumentSchema>,
    by_ref: HashMap<u16, String>,
    extended: HashMap<ProfileId, ExtendedSchema>,
}

/// The layered view produced by the two-stage lookup: a base schema
/// plus an optional extension whose fields shadow the base by tag.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedSchema<'a> {
    /// The base document schema.
    pub base: &'a DocumentSchema,
    /// The extension, when a profile UUID selected one.
    pub extension: Option<&'a ExtendedSchema>,
}

impl<'a> ResolvedSchema<'a> {
    /// Field lookup by tag, extension first.
    pub fn field_by_tag(&self, tag: u8) -> Option<&'a FieldDefinition> {
        self.extension
            .and_then(|e| e.field_by_tag(tag))
            .or_else(|| self.base.field_by_tag(tag))
    }

    /// Field lookup by name, extension first.
    pub fn field_by_name(&self, name: &str) -> Option<&'a FieldDefinition> {
        self.extension
            .and_then(|e| e.field_by_name(name))
            .or_else(|| self.base.field_by_name(name))
    }

    /// Encode a typed value for the named feature.
    ///
    /// # Errors
    ///
    /// [`SchemaError::UnknownFeature`] if neither the extension nor the
    /// base declares the name; value and length errors from the coding
    /// dispatch.
    pub fn encode_feature(
        &self,
        name: &str,
        input: &FeatureInput,
    ) -> Result<DerTlv, SchemaError> {
        let field = self
            .field_by_name(name)
            .ok_or_else(|| SchemaError::UnknownFeature {
                document_type: self.base.document_type.clone(),
                feature: name.to_string(),
            })?;
        feature::encode_value(field, input)
    }

    /// Decode a message TLV into a named, typed feature.
    ///
    /// Infallible: an unrecognized tag or a coding mismatch yields
    /// [`FeatureValue::RawBytes`] under the `Unknown (0xNN)` label.
    pub fn decode_feature(&self, tlv: &DerTlv) -> DecodedFeature {
        match self.field_by_tag(tlv.tag) {
            Some(field) => DecodedFeature {
                tag: tlv.tag,
                name: field.name.clone(),
                value: feature::decode_value(field, &tlv.value),
            },
            None => {
                debug!(tag = tlv.tag, "no field definition for tag, keeping raw");
                DecodedFeature {
                    tag: tlv.tag,
                    name: feature::unknown_label(tlv.tag),
                    value: FeatureValue::RawBytes(tlv.value.clone()),
                }
            }
        }
    }
}

impl SchemaRegistry {
    /// Build a registry from already-deserialized schema documents.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidSchemaDocument`] on duplicate document
    /// types or discriminators; [`SchemaError::MissingBaseSchema`] when
    /// an extended schema names an unregistered base.
    pub fn from_documents(
        schemas: Vec<DocumentSchema>,
        extended: Vec<ExtendedSchema>,
    ) -> Result<Self, SchemaError> {
        let mut by_type = HashMap::new();
        let mut by_ref = HashMap::new();
        for schema in schemas {
            if by_ref.contains_key(&schema.document_ref) {
                return Err(SchemaError::InvalidSchemaDocument(format!(
                    "duplicate document reference {:#06x}",
                    schema.document_ref
                )));
            }
            by_ref.insert(schema.document_ref, schema.document_type.clone());
            if by_type
                .insert(schema.document_type.clone(), schema)
                .is_some()
            {
                return Err(SchemaError::InvalidSchemaDocument(
                    "duplicate document type".to_string(),
                ));
            }
        }
        let mut ext_map = HashMap::new();
        for ext in extended {
            if !by_type.contains_key(&ext.base_document_type) {
                return Err(SchemaError::MissingBaseSchema {
                    extended: ext.definition_name.clone(),
                    base: ext.base_document_type.clone(),
                });
            }
            ext_map.insert(ext.definition_id, ext);
        }
        Ok(Self {
            by_type,
            by_ref,
            extended: ext_map,
        })
    }

    /// Build a registry from the JSON document forms.
    ///
    /// `schemas_json` is an array of document schemas; `extended_json`
    /// an optional array of extended profiles.
    pub fn from_json_str(
        schemas_json: &str,
        extended_json: Option<&str>,
    ) -> Result<Self, SchemaError> {
        let schemas: Vec<DocumentSchema> = serde_json::from_str(schemas_json)
            .map_err(|e| SchemaError::InvalidSchemaDocument(e.to_string()))?;
        let extended: Vec<ExtendedSchema> = match extended_json {
            Some(json) => serde_json::from_str(json)
                .map_err(|e| SchemaError::InvalidSchemaDocument(e.to_string()))?,
            None => Vec::new(),
        };
        Self::from_documents(schemas, extended)
    }

    /// The registry over the built-in schema set shipped with the crate.
    ///
    /// The embedded documents are validated by tests, so this cannot
    /// fail at runtime.
    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_PROFILES, Some(BUILTIN_EXTENDED))
            .expect("built-in schema documents are valid")
    }

    /// Resolve a document type name from its wire discriminator.
    pub fn document_type_for_ref(&self, document_ref: u16) -> Option<&str> {
        self.by_ref.get(&document_ref).map(String::as_str)
    }

    /// The wire discriminator of a document type.
    pub fn ref_for_document_type(&self, document_type: &str) -> Option<u16> {
        self.by_type
            .get(document_type)
            .map(|schema| schema.document_ref)
    }

    /// The schema registered under a document type name.
    pub fn schema(&self, document_type: &str) -> Option<&DocumentSchema> {
        self.by_type.get(document_type)
    }

    /// The extended profile registered under a UUID.
    pub fn extended_schema(&self, profile: &ProfileId) -> Option<&ExtendedSchema> {
        self.extended.get(profile)
    }

    /// Two-stage lookup: base schema by document type, optionally
    /// specialized by a profile UUID.
    ///
    /// An unknown profile UUID is not an error — the seal still decodes
    /// against the base schema, the same degradation rule as unknown
    /// tags. Only an unknown *document type* fails, since that lookup
    /// is encode-side.
    pub fn resolve(
        &self,
        document_type: &str,
        profile: Option<&ProfileId>,
    ) -> Result<ResolvedSchema<'_>, SchemaError> {
        let base = self
            .schema(document_type)
            .ok_or_else(|| SchemaError::UnknownDocumentType(document_type.to_string()))?;
        let extension = profile.and_then(|id| {
            let ext = self.extended.get(id);
            if ext.is_none() {
                debug!(profile = %id, "no extended schema for profile, using base only");
            }
            ext
        });
        Ok(ResolvedSchema { base, extension })
    }

    /// Field lookup by tag on the base schema of a document type.
    pub fn field_by_tag(&self, document_type: &str, tag: u8) -> Option<&FieldDefinition> {
        self.by_type.get(document_type)?.field_by_tag(tag)
    }

    /// Field lookup by name on the base schema of a document type.
    pub fn field_by_name(&self, document_type: &str, name: &str) -> Option<&FieldDefinition> {
        self.by_type.get(document_type)?.field_by_name(name)
    }

    /// Encode a typed value for a feature of a document type.
    ///
    /// Fails fast on unknown document types or feature names — building
    /// a seal is developer-controlled.
    pub fn encode_feature(
        &self,
        document_type: &str,
        name: &str,
        input: &FeatureInput,
    ) -> Result<DerTlv, SchemaError> {
        self.resolve(document_type, None)?.encode_feature(name, input)
    }

    /// Decode a message TLV against the base schema of a document type.
    ///
    /// Never fails; see [`ResolvedSchema::decode_feature`]. An unknown
    /// document type also degrades to raw bytes, because this path is
    /// hit while parsing untrusted barcode input.
    pub fn decode_feature(&self, document_type: &str, tlv: &DerTlv) -> DecodedFeature {
        match self.resolve(document_type, None) {
            Ok(resolved) => resolved.decode_feature(tlv),
            Err(_) => DecodedFeature {
                tag: tlv.tag,
                name: feature::unknown_label(tlv.tag),
                value: FeatureValue::RawBytes(tlv.value.clone()),
            },
        }
    }
}
