//! # Coding Kinds
//!
//! The closed set of wire codings a schema document may declare for a
//! field. Every encode/decode site matches exhaustively on this enum so
//! the compiler catches a coding kind added without a handler.

use serde::{Deserialize, Serialize};

/// Wire coding of a message field, as named in schema documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Coding {
    /// Packed C40 text, filler-trimmed on decode.
    C40,
    /// UTF-8 text.
    Utf8String,
    /// Opaque bytes.
    Bytes,
    /// A single byte.
    Byte,
    /// 3-byte packed calendar date.
    Date,
    /// 4-byte masked date.
    MaskedDate,
    /// Machine-readable zone: packed C40 with filler preserved.
    Mrz,
    /// Two packed dates: valid-from and valid-until.
    ValidityDates,
    /// Declared by the schema as uninterpreted.
    Unknown,
}

impl Coding {
    /// The schema-document spelling of this coding.
    pub fn as_str(&self) -> &'static str {
        match self {
            Coding::C40 => "C40",
            Coding::Utf8String => "UTF8_STRING",
            Coding::Bytes => "BYTES",
            Coding::Byte => "BYTE",
            Coding::Date => "DATE",
            Coding::MaskedDate => "MASKED_DATE",
            Coding::Mrz => "MRZ",
            Coding::ValidityDates => "VALIDITY_DATES",
            Coding::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Coding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names_match_schema_spelling() {
        for coding in [
            Coding::C40,
            Coding::Utf8String,
            Coding::Bytes,
            Coding::Byte,
            Coding::Date,
            Coding::MaskedDate,
            Coding::Mrz,
            Coding::ValidityDates,
            Coding::Unknown,
        ] {
            let json = serde_json::to_string(&coding).unwrap();
            assert_eq!(json, format!("\"{}\"", coding.as_str()));
            let back: Coding = serde_json::from_str(&json).unwrap();
            assert_eq!(back, coding);
        }
    }
}
