//! # Schema Document Models
//!
//! Serde models for the two external schema documents: the per-document
//! field lists keyed by wire discriminator, and the extended-profile
//! specializations keyed by UUID. The host loads the JSON from wherever
//! it keeps it; this crate only deserializes and validates.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::coding::Coding;
use crate::error::SchemaError;

/// Identifier of an extended profile: a UUID written as 32 hex
/// characters in schema documents and carried as 16 raw bytes in
/// message field tag 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProfileId(pub Uuid);

impl ProfileId {
    /// Parse from the 32-hex-character schema document form.
    pub fn parse(s: &str) -> Result<Self, SchemaError> {
        if s.len() != 32 {
            return Err(SchemaError::InvalidSchemaDocument(format!(
                "profile id must be 32 hex chars, got {}",
                s.len()
            )));
        }
        Uuid::try_parse(s)
            .map(Self)
            .map_err(|e| SchemaError::InvalidSchemaDocument(format!("profile id {s:?}: {e}")))
    }

    /// Parse from the 16-byte wire form found in message field tag 0.
    pub fn from_wire(bytes: &[u8]) -> Option<Self> {
        Uuid::from_slice(bytes).ok().map(Self)
    }

    /// The 16-byte wire form.
    pub fn to_wire(&self) -> [u8; 16] {
        *self.0.as_bytes()
    }
}

impl std::fmt::Display for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl Serialize for ProfileId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.simple().to_string())
    }
}

impl<'de> Deserialize<'de> for ProfileId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// One field of a document schema.
///
/// Immutable, owned by the registry, shared read-only across all
/// encode/decode calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// TLV tag of the field inside the message zone.
    pub tag: u8,
    /// Feature name, e.g. `MRZ` or `PASSPORT_NUMBER`.
    pub name: String,
    /// Wire coding of the value.
    pub coding: Coding,
    /// Whether a well-formed document must carry the field.
    #[serde(default)]
    pub required: bool,
    /// Minimum encoded length in bytes, if constrained.
    #[serde(default, rename = "minBytes", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum encoded length in bytes, if constrained.
    #[serde(default, rename = "maxBytes", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

/// A document type's schema: its wire discriminator and field list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSchema {
    /// Document type name, e.g. `RESIDENCE_PERMIT`.
    pub document_type: String,
    /// Wire discriminator: `(doc_feature_ref << 8) | doc_type_cat`,
    /// written as a 4-hex-digit string in schema documents.
    #[serde(
        rename = "documentRef",
        serialize_with = "ser_hex_u16",
        deserialize_with = "de_hex_u16"
    )]
    pub document_ref: u16,
    /// Schema document version.
    pub version: u32,
    /// The declared fields.
    #[serde(rename = "features")]
    pub fields: Vec<FieldDefinition>,
}

impl DocumentSchema {
    /// The high discriminator byte (document feature reference).
    pub fn doc_feature_ref(&self) -> u8 {
        (self.document_ref >> 8) as u8
    }

    /// The low discriminator byte (document type category).
    pub fn doc_type_cat(&self) -> u8 {
        (self.document_ref & 0xFF) as u8
    }

    /// Field lookup by message-zone tag.
    pub fn field_by_tag(&self, tag: u8) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.tag == tag)
    }

    /// Field lookup by feature name.
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A UUID-keyed specialization layered over a base document schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedSchema {
    /// The profile UUID carried in message field tag 0.
    pub definition_id: ProfileId,
    /// Human-readable profile name.
    pub definition_name: String,
    /// Name of the base schema this profile specializes. Must resolve
    /// to a registered [`DocumentSchema`].
    pub base_document_type: String,
    /// Schema document version.
    pub version: u32,
    /// Fields added or shadowed by this profile.
    #[serde(rename = "features")]
    pub fields: Vec<FieldDefinition>,
}

impl ExtendedSchema {
    /// Field lookup by message-zone tag within the specialization only.
    pub fn field_by_tag(&self, tag: u8) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.tag == tag)
    }

    /// Field lookup by feature name within the specialization only.
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }
}

fn ser_hex_u16<S: Serializer>(value: &u16, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{value:04x}"))
}

fn de_hex_u16<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    let s = String::deserialize(deserializer)?;
    u16::from_str_radix(&s, 16).map_err(|e| {
        serde::de::Error::custom(format!("documentRef {s:?} is not 4 hex digits: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_schema_from_json() {
        let json = r#"{
            "documentType": "RESIDENCE_PERMIT",
            "documentRef": "fb06",
            "version": 1,
            "features": [
                {"tag": 2, "name": "MRZ", "coding": "MRZ", "required": true, "minBytes": 60, "maxBytes": 60},
                {"tag": 3, "name": "PASSPORT_NUMBER", "coding": "C40", "required": true, "minBytes": 6, "maxBytes": 6}
            ]
        }"#;
        let schema: DocumentSchema = serde_json::from_str(json).unwrap();
        assert_eq!(schema.document_ref, 0xFB06);
        assert_eq!(schema.doc_feature_ref(), 0xFB);
        assert_eq!(schema.doc_type_cat(), 0x06);
        assert_eq!(schema.field_by_tag(3).unwrap().name, "PASSPORT_NUMBER");
        assert_eq!(schema.field_by_name("MRZ").unwrap().coding, Coding::Mrz);
        assert!(schema.field_by_tag(9).is_none());
    }

    #[test]
    fn test_document_ref_rejects_non_hex() {
        let json = r#"{
            "documentType": "X", "documentRef": "zz06", "version": 1, "features": []
        }"#;
        assert!(serde_json::from_str::<DocumentSchema>(json).is_err());
    }

    #[test]
    fn test_profile_id_wire_roundtrip() {
        let id = ProfileId::parse("c9aa9bd67e8a4c0e8a2fbf52a4f6d75e").unwrap();
        let wire = id.to_wire();
        assert_eq!(ProfileId::from_wire(&wire), Some(id));
        assert_eq!(id.to_string(), "c9aa9bd67e8a4c0e8a2fbf52a4f6d75e");
    }

    #[test]
    fn test_profile_id_rejects_wrong_length() {
        assert!(ProfileId::parse("abcd").is_err());
        assert!(ProfileId::from_wire(&[0u8; 15]).is_none());
    }

    #[test]
    fn test_extended_schema_from_json() {
        let json = r#"{
            "definitionId": "c9aa9bd67e8a4c0e8a2fbf52a4f6d75e",
            "definitionName": "RESIDENCE_PERMIT_EMPLOYMENT",
            "baseDocumentType": "RESIDENCE_PERMIT",
            "version": 1,
            "features": [
                {"tag": 6, "name": "EMPLOYER", "coding": "UTF8_STRING"}
            ]
        }"#;
        let ext: ExtendedSchema = serde_json::from_str(json).unwrap();
        assert_eq!(ext.base_document_type, "RESIDENCE_PERMIT");
        assert!(!ext.fields[0].required);
    }
}
