//! # Typed Feature Values
//!
//! [`FeatureValue`] is the tagged union a decoded message field lands
//! in. Every variant carries the original raw bytes alongside its
//! decoded form: decode is not always losslessly invertible from the
//! decoded form alone (C40 filler, masked-date digit patterns), and a
//! re-encode must reproduce the wire bytes exactly.
//!
//! [`FeatureInput`] is the narrow value representation accepted when
//! building a seal. Encoding dispatches on the field's declared coding
//! with an exhaustive match — adding a coding kind without a handler is
//! a compile error.

use chrono::NaiveDate;
use sealkit_core::{c40, dates, DerTlv, MaskedDate};
use tracing::debug;

use crate::coding::Coding;
use crate::error::SchemaError;
use crate::model::FieldDefinition;

/// A decoded message field value, carrying its original wire bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureValue {
    /// A single byte.
    Byte {
        /// Decoded value.
        value: u8,
        /// Original wire bytes.
        raw: Vec<u8>,
    },
    /// C40 or UTF-8 text.
    Text {
        /// Decoded value.
        value: String,
        /// Original wire bytes.
        raw: Vec<u8>,
    },
    /// A packed calendar date.
    Date {
        /// Decoded value.
        value: NaiveDate,
        /// Original wire bytes.
        raw: Vec<u8>,
    },
    /// A masked date.
    MaskedDate {
        /// Decoded value.
        value: MaskedDate,
        /// Original wire bytes.
        raw: Vec<u8>,
    },
    /// A machine-readable zone, filler preserved.
    Mrz {
        /// Decoded value.
        value: String,
        /// Original wire bytes.
        raw: Vec<u8>,
    },
    /// A validity date range.
    ValidityRange {
        /// First day of validity.
        valid_from: NaiveDate,
        /// Last day of validity.
        valid_until: NaiveDate,
        /// Original wire bytes.
        raw: Vec<u8>,
    },
    /// Bytes left uninterpreted: BYTES/UNKNOWN codings, unrecognized
    /// tags, and the fallback for any failed decode.
    RawBytes(Vec<u8>),
}

impl FeatureValue {
    /// The original wire bytes of this value.
    pub fn raw(&self) -> &[u8] {
        match self {
            FeatureValue::Byte { raw, .. }
            | FeatureValue::Text { raw, .. }
            | FeatureValue::Date { raw, .. }
            | FeatureValue::MaskedDate { raw, .. }
            | FeatureValue::Mrz { raw, .. }
            | FeatureValue::ValidityRange { raw, .. } => raw,
            FeatureValue::RawBytes(raw) => raw,
        }
    }

    /// Human-readable rendering of the decoded form.
    pub fn display_value(&self) -> String {
        match self {
            FeatureValue::Byte { value, .. } => value.to_string(),
            FeatureValue::Text { value, .. } | FeatureValue::Mrz { value, .. } => value.clone(),
            FeatureValue::Date { value, .. } => value.format("%Y-%m-%d").to_string(),
            FeatureValue::MaskedDate { value, .. } => value.to_string(),
            FeatureValue::ValidityRange {
                valid_from,
                valid_until,
                ..
            } => format!(
                "{} - {}",
                valid_from.format("%Y-%m-%d"),
                valid_until.format("%Y-%m-%d")
            ),
            FeatureValue::RawBytes(raw) => raw.iter().map(|b| format!("{b:02X}")).collect(),
        }
    }
}

/// The narrow typed input accepted when encoding a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureInput {
    /// For `BYTE` fields.
    Byte(u8),
    /// For `C40`, `UTF8_STRING`, and `MRZ` fields.
    Text(String),
    /// For `DATE` fields.
    Date(NaiveDate),
    /// For `MASKED_DATE` fields.
    MaskedDate(MaskedDate),
    /// For `BYTES` and `UNKNOWN` fields.
    Bytes(Vec<u8>),
    /// For `VALIDITY_DATES` fields: valid-from, valid-until.
    ValidityRange(NaiveDate, NaiveDate),
}

impl FeatureInput {
    /// Convenience constructor for text fields.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

/// A message field decoded through a schema: resolved name + typed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFeature {
    /// The field's TLV tag.
    pub tag: u8,
    /// Resolved feature name, or `Unknown (0xNN)` for unrecognized tags.
    pub name: String,
    /// The typed value.
    pub value: FeatureValue,
}

/// The fallback label for a tag no schema recognizes.
pub fn unknown_label(tag: u8) -> String {
    format!("Unknown (0x{tag:02X})")
}

/// Encode a typed input per a field definition, producing the field's TLV.
///
/// # Errors
///
/// [`SchemaError::ValueMismatch`] when the input variant does not fit
/// the declared coding, [`SchemaError::LengthOutOfRange`] when the
/// encoded bytes violate the declared bounds, and codec errors for
/// alphabet violations.
pub fn encode_value(field: &FieldDefinition, input: &FeatureInput) -> Result<DerTlv, SchemaError> {
    let mismatch = |expected: &'static str| SchemaError::ValueMismatch {
        feature: field.name.clone(),
        expected,
    };
    let bytes = match field.coding {
        Coding::C40 | Coding::Mrz => match input {
            FeatureInput::Text(s) => c40::encode(s)?,
            _ => return Err(mismatch("text")),
        },
        Coding::Utf8String => match input {
            FeatureInput::Text(s) => s.clone().into_bytes(),
            _ => return Err(mismatch("text")),
        },
        Coding::Byte => match input {
            FeatureInput::Byte(b) => vec![*b],
            _ => return Err(mismatch("byte")),
        },
        Coding::Date => match input {
            FeatureInput::Date(d) => dates::encode_date(*d).to_vec(),
            _ => return Err(mismatch("date")),
        },
        Coding::MaskedDate => match input {
            FeatureInput::MaskedDate(md) => md.encode().to_vec(),
            _ => return Err(mismatch("masked date")),
        },
        Coding::ValidityDates => match input {
            FeatureInput::ValidityRange(from, until) => {
                let mut out = dates::encode_date(*from).to_vec();
                out.extend_from_slice(&dates::encode_date(*until));
                out
            }
            _ => return Err(mismatch("validity range")),
        },
        Coding::Bytes | Coding::Unknown => match input {
            FeatureInput::Bytes(b) => b.clone(),
            _ => return Err(mismatch("bytes")),
        },
    };
    let (min, max) = (
        field.min_length.unwrap_or(0),
        field.max_length.unwrap_or(usize::MAX),
    );
    if bytes.len() < min || bytes.len() > max {
        return Err(SchemaError::LengthOutOfRange {
            feature: field.name.clone(),
            len: bytes.len(),
            min,
            max,
        });
    }
    Ok(DerTlv::new(field.tag, bytes))
}

/// Decode a field's value bytes per its declared coding.
///
/// Total over the coding enum and infallible: bytes that do not fit the
/// coding degrade to [`FeatureValue::RawBytes`].
pub fn decode_value(field: &FieldDefinition, raw: &[u8]) -> FeatureValue {
    let decoded = match field.coding {
        Coding::C40 => c40::decode(raw).ok().map(|value| FeatureValue::Text {
            value,
            raw: raw.to_vec(),
        }),
        Coding::Utf8String => String::from_utf8(raw.to_vec())
            .ok()
            .map(|value| FeatureValue::Text {
                value,
                raw: raw.to_vec(),
            }),
        Coding::Mrz => c40::decode_raw(raw).ok().map(|value| FeatureValue::Mrz {
            value,
            raw: raw.to_vec(),
        }),
        Coding::Byte => match raw {
            [value] => Some(FeatureValue::Byte {
                value: *value,
                raw: raw.to_vec(),
            }),
            _ => None,
        },
        Coding::Date => <[u8; 3]>::try_from(raw)
            .ok()
            .and_then(|b| dates::decode_date(b).ok())
            .map(|value| FeatureValue::Date {
                value,
                raw: raw.to_vec(),
            }),
        Coding::MaskedDate => <[u8; 4]>::try_from(raw)
            .ok()
            .and_then(|b| MaskedDate::decode(b).ok())
            .map(|value| FeatureValue::MaskedDate {
                value,
                raw: raw.to_vec(),
            }),
        Coding::ValidityDates => {
            if raw.len() == 6 {
                let from = <[u8; 3]>::try_from(&raw[..3])
                    .ok()
                    .and_then(|b| dates::decode_date(b).ok());
                let until = <[u8; 3]>::try_from(&raw[3..])
                    .ok()
                    .and_then(|b| dates::decode_date(b).ok());
                match (from, until) {
                    (Some(valid_from), Some(valid_until)) => Some(FeatureValue::ValidityRange {
                        valid_from,
                        valid_until,
                        raw: raw.to_vec(),
                    }),
                    _ => None,
                }
            } else {
                None
            }
        }
        Coding::Bytes | Coding::Unknown => Some(FeatureValue::RawBytes(raw.to_vec())),
    };
    decoded.unwrap_or_else(|| {
        debug!(
            feature = %field.name,
            coding = %field.coding,
            len = raw.len(),
            "field bytes do not fit declared coding, keeping raw"
        );
        FeatureValue::RawBytes(raw.to_vec())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(coding: Coding) -> FieldDefinition {
        FieldDefinition {
            tag: 0x02,
            name: "TEST".to_string(),
            coding,
            required: false,
            min_length: None,
            max_length: None,
        }
    }

    #[test]
    fn test_encode_decode_c40_text() {
        let f = field(Coding::C40);
        let tlv = encode_value(&f, &FeatureInput::text("DETS32")).unwrap();
        assert_eq!(tlv.value, vec![0x6D, 0x32, 0xC9, 0x1F]);
        assert_eq!(
            decode_value(&f, &tlv.value),
            FeatureValue::Text {
                value: "DETS32".to_string(),
                raw: tlv.value.clone()
            }
        );
    }

    #[test]
    fn test_encode_decode_every_coding() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let later = NaiveDate::from_ymd_opt(2028, 8, 29).unwrap();
        let md = MaskedDate::parse("19xx-xx-01").unwrap();
        let cases: Vec<(Coding, FeatureInput)> = vec![
            (Coding::C40, FeatureInput::text("ABC123")),
            (Coding::Utf8String, FeatureInput::text("Müller")),
            (Coding::Bytes, FeatureInput::Bytes(vec![1, 2, 3])),
            (Coding::Byte, FeatureInput::Byte(0x2A)),
            (Coding::Date, FeatureInput::Date(date)),
            (Coding::MaskedDate, FeatureInput::MaskedDate(md)),
            (Coding::Mrz, FeatureInput::text("ID<<123<<<")),
            (
                Coding::ValidityDates,
                FeatureInput::ValidityRange(date, later),
            ),
            (Coding::Unknown, FeatureInput::Bytes(vec![0xFF])),
        ];
        for (coding, input) in cases {
            let f = field(coding);
            let tlv = encode_value(&f, &input).unwrap();
            let value = decode_value(&f, &tlv.value);
            assert_eq!(value.raw(), &tlv.value[..], "coding {coding}");
        }
    }

    #[test]
    fn test_mrz_keeps_filler() {
        let f = field(Coding::Mrz);
        let tlv = encode_value(&f, &FeatureInput::text("AB<<<<")).unwrap();
        match decode_value(&f, &tlv.value) {
            FeatureValue::Mrz { value, .. } => assert_eq!(value, "AB<<<<"),
            other => panic!("expected Mrz, got {other:?}"),
        }
    }

    #[test]
    fn test_value_mismatch_fails_fast() {
        let f = field(Coding::Date);
        assert!(matches!(
            encode_value(&f, &FeatureInput::text("2026-08-30")),
            Err(SchemaError::ValueMismatch { .. })
        ));
    }

    #[test]
    fn test_length_bounds_enforced() {
        let f = FieldDefinition {
            max_length: Some(2),
            ..field(Coding::Bytes)
        };
        assert!(matches!(
            encode_value(&f, &FeatureInput::Bytes(vec![0; 3])),
            Err(SchemaError::LengthOutOfRange { len: 3, .. })
        ));
    }

    #[test]
    fn test_bad_coding_degrades_to_raw() {
        // A 2-byte value cannot be a packed date.
        let f = field(Coding::Date);
        assert_eq!(
            decode_value(&f, &[0xAB, 0xCD]),
            FeatureValue::RawBytes(vec![0xAB, 0xCD])
        );
        // Invalid UTF-8 degrades as well.
        let f = field(Coding::Utf8String);
        assert_eq!(
            decode_value(&f, &[0xFF, 0xFE]),
            FeatureValue::RawBytes(vec![0xFF, 0xFE])
        );
    }
}
