//! # ICAO Digital Barcode (IDB)
//!
//! A text envelope around a binary payload:
//!
//! ```text
//! "NDB1" | flag char | Base32(payload)
//! ```
//!
//! The flag char is `'A'` plus two bits: bit 0 set means the payload is
//! signed, bit 1 set means it is zlib-deflated before Base32. The
//! legacy `"RDB1"` prefix is accepted on parse and preserved for
//! byte-identical re-encoding.
//!
//! The payload is a short header (two bytes unsigned, twelve signed)
//! followed by top-level TLVs: the message group (`0x61`), an optional
//! certificate (`0x7E`) and an optional signature (`0x7F`). Any other
//! top-level tag is a structural error. Message fields live inside the
//! group and are decoded against the fixed `IDB` document schema.

use tracing::debug;

use sealkit_core::{c40, transport, DerTlv, MaskedDate};
use sealkit_crypto::{SigningProvider, VerifyingProvider};
use sealkit_schema::{DecodedFeature, FeatureInput, FeatureValue, SchemaRegistry, IDB_DOCUMENT_TYPE};

use crate::error::SealError;
use crate::message::SignatureInfo;

/// Current envelope prefix.
pub const IDB_PREFIX: &str = "NDB1";

/// Legacy envelope prefix, accepted on parse.
pub const IDB_LEGACY_PREFIX: &str = "RDB1";

/// Top-level tag of the message group TLV.
pub const IDB_MESSAGE_GROUP_TAG: u8 = 0x61;

/// Top-level tag of the certificate TLV.
pub const IDB_CERTIFICATE_TAG: u8 = 0x7E;

/// Top-level tag of the signature TLV.
pub const IDB_SIGNATURE_TAG: u8 = 0x7F;

/// Envelope flags carried in the character after the prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdbFlags {
    /// The payload carries the signed header and a signature TLV.
    pub signed: bool,
    /// The payload is zlib-deflated before Base32.
    pub zipped: bool,
}

impl IdbFlags {
    /// The envelope character: `'A'` plus the flag bits.
    pub fn to_char(self) -> char {
        let bits = self.signed as u8 | (self.zipped as u8) << 1;
        (b'A' + bits) as char
    }

    /// Parse an envelope character (`'A'` through `'D'`).
    pub fn from_char(c: char) -> Result<Self, SealError> {
        match c {
            'A'..='D' => {
                let bits = c as u8 - b'A';
                Ok(Self {
                    signed: bits & 1 != 0,
                    zipped: bits & 2 != 0,
                })
            }
            other => Err(SealError::InvalidBarcodeEnvelope(format!(
                "flag character {other:?} outside 'A'..='D'"
            ))),
        }
    }
}

/// Signature algorithm byte of the signed IDB header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdbSignatureAlgorithm {
    /// `0x01`
    EcdsaSha256,
    /// `0x02`
    EcdsaSha384,
    /// `0x03`
    EcdsaSha512,
    /// Any other byte, preserved for re-encoding.
    Other(u8),
}

impl IdbSignatureAlgorithm {
    /// The wire byte.
    pub fn raw(self) -> u8 {
        match self {
            Self::EcdsaSha256 => 0x01,
            Self::EcdsaSha384 => 0x02,
            Self::EcdsaSha512 => 0x03,
            Self::Other(raw) => raw,
        }
    }

    /// Parse the wire byte. Total: unassigned bytes map to
    /// [`Other`](Self::Other) rather than failing.
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0x01 => Self::EcdsaSha256,
            0x02 => Self::EcdsaSha384,
            0x03 => Self::EcdsaSha512,
            other => Self::Other(other),
        }
    }
}

/// The header fields present only in signed barcodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaderFields {
    /// Signature algorithm byte.
    pub algorithm: IdbSignatureAlgorithm,
    /// Five-byte certificate reference.
    pub certificate_reference: [u8; 5],
    /// Signature creation date, possibly partially masked.
    pub signature_creation_date: MaskedDate,
}

/// The fixed IDB payload header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdbHeader {
    /// Three-letter issuing country (C40, filler-trimmed).
    pub issuing_country: String,
    /// Present exactly when the signed flag is set.
    pub signed_fields: Option<SignedHeaderFields>,
}

impl IdbHeader {
    /// Encode the header: two bytes unsigned, twelve signed.
    pub fn encode(&self) -> Result<Vec<u8>, SealError> {
        if self.issuing_country.chars().count() > 3 {
            return Err(SealError::MalformedHeader(format!(
                "issuing country {:?} longer than 3 characters",
                self.issuing_country
            )));
        }
        let mut out = c40::encode(&self.issuing_country)?;
        if let Some(signed) = &self.signed_fields {
            out.push(signed.algorithm.raw());
            out.extend(signed.certificate_reference);
            out.extend(signed.signature_creation_date.encode());
        }
        Ok(out)
    }

    /// Decode a header from the start of `bytes`, returning it and the
    /// number of bytes consumed. `signed` comes from the envelope flag.
    pub fn decode(bytes: &[u8], signed: bool) -> Result<(Self, usize), SealError> {
        let needed = if signed { 12 } else { 2 };
        if bytes.len() < needed {
            return Err(SealError::Codec(sealkit_core::CodecError::Truncated {
                needed,
                available: bytes.len(),
            }));
        }
        let issuing_country = c40::decode(&bytes[0..2])?;
        let signed_fields = if signed {
            let mut reference = [0u8; 5];
            reference.copy_from_slice(&bytes[3..8]);
            Some(SignedHeaderFields {
                algorithm: IdbSignatureAlgorithm::from_raw(bytes[2]),
                certificate_reference: reference,
                signature_creation_date: MaskedDate::decode([
                    bytes[8], bytes[9], bytes[10], bytes[11],
                ])?,
            })
        } else {
            None
        };
        Ok((
            Self {
                issuing_country,
                signed_fields,
            },
            needed,
        ))
    }
}

/// A parsed or built ICAO digital barcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdbSeal {
    /// The fixed payload header.
    pub header: IdbHeader,
    /// Whether the barcode used the legacy `RDB1` prefix.
    pub legacy_prefix: bool,
    /// Whether the payload is deflated inside the envelope.
    pub zipped: bool,
    /// The typed view of the message group.
    pub message: Vec<DecodedFeature>,
    /// The wire TLVs inside the message group, kept for byte-identical
    /// re-encoding.
    message_tlvs: Vec<DerTlv>,
    /// Raw certificate bytes from the `0x7E` TLV, when present.
    pub certificate: Option<Vec<u8>>,
    /// The signature from the `0x7F` TLV, when present.
    pub signature: Option<SignatureInfo>,
}

impl IdbSeal {
    /// Parse a barcode from its full text form, envelope included.
    pub fn parse_barcode(text: &str, registry: &SchemaRegistry) -> Result<Self, SealError> {
        let legacy_prefix = if text.starts_with(IDB_PREFIX) {
            false
        } else if text.starts_with(IDB_LEGACY_PREFIX) {
            debug!("legacy RDB1 barcode prefix");
            true
        } else {
            return Err(SealError::InvalidBarcodeEnvelope(format!(
                "missing {IDB_PREFIX} prefix"
            )));
        };
        let rest = &text[IDB_PREFIX.len()..];
        let mut chars = rest.chars();
        let flag_char = chars.next().ok_or_else(|| {
            SealError::InvalidBarcodeEnvelope("missing flag character".to_string())
        })?;
        let flags = IdbFlags::from_char(flag_char)?;

        let mut payload = transport::base32_decode(chars.as_str())?;
        if flags.zipped {
            payload = transport::deflate_unwrap(&payload)?;
        }
        let mut seal = Self::parse_payload(&payload, flags.signed, registry)?;
        seal.legacy_prefix = legacy_prefix;
        seal.zipped = flags.zipped;
        Ok(seal)
    }

    /// Parse a decoded (and, if applicable, inflated) payload.
    pub fn parse_payload(
        bytes: &[u8],
        signed: bool,
        registry: &SchemaRegistry,
    ) -> Result<Self, SealError> {
        let (header, header_len) = IdbHeader::decode(bytes, signed)?;

        let mut message_tlvs = Vec::new();
        let mut certificate = None;
        let mut signature = None;
        for tlv in DerTlv::decode_all(&bytes[header_len..])? {
            match tlv.tag {
                IDB_MESSAGE_GROUP_TAG => message_tlvs = DerTlv::decode_all(&tlv.value)?,
                IDB_CERTIFICATE_TAG => certificate = Some(tlv.value),
                IDB_SIGNATURE_TAG => signature = Some(SignatureInfo::new(tlv.value)),
                other => return Err(SealError::UnknownTag(other)),
            }
        }
        if signed && signature.is_none() {
            return Err(SealError::MissingRequiredField("signature".to_string()));
        }

        let message = match registry.resolve(IDB_DOCUMENT_TYPE, None) {
            Ok(resolved) => message_tlvs
                .iter()
                .map(|t| resolved.decode_feature(t))
                .collect(),
            Err(_) => message_tlvs
                .iter()
                .map(|t| DecodedFeature {
                    tag: t.tag,
                    name: sealkit_schema::feature::unknown_label(t.tag),
                    value: FeatureValue::RawBytes(t.value.clone()),
                })
                .collect(),
        };

        Ok(Self {
            header,
            legacy_prefix: false,
            zipped: false,
            message,
            message_tlvs,
            certificate,
            signature,
        })
    }

    /// The envelope flags of this seal.
    pub fn flags(&self) -> IdbFlags {
        IdbFlags {
            signed: self.header.signed_fields.is_some(),
            zipped: self.zipped,
        }
    }

    /// The wire TLVs inside the message group.
    pub fn message_tlvs(&self) -> &[DerTlv] {
        &self.message_tlvs
    }

    /// The message group TLV as encoded on the wire.
    fn message_group(&self) -> DerTlv {
        let mut value = Vec::new();
        for tlv in &self.message_tlvs {
            value.extend(tlv.encode());
        }
        DerTlv::new(IDB_MESSAGE_GROUP_TAG, value)
    }

    /// The exact byte range covered by the signature: header plus
    /// message group TLV.
    pub fn signed_bytes(&self) -> Result<Vec<u8>, SealError> {
        let mut out = self.header.encode()?;
        out.extend(self.message_group().encode());
        Ok(out)
    }

    /// Encode the payload, before any deflate or Base32.
    pub fn encode_payload(&self) -> Result<Vec<u8>, SealError> {
        let mut out = self.signed_bytes()?;
        if let Some(certificate) = &self.certificate {
            out.extend(DerTlv::new(IDB_CERTIFICATE_TAG, certificate.clone()).encode());
        }
        if let Some(signature) = &self.signature {
            out.extend(DerTlv::new(IDB_SIGNATURE_TAG, signature.plain.clone()).encode());
        }
        Ok(out)
    }

    /// Encode the full barcode text, byte-identical to what was parsed.
    ///
    /// # Errors
    ///
    /// [`SealError::MissingRequiredField`] when the signed header is
    /// present without a signature, which the flag char would misstate.
    pub fn encode_barcode(&self) -> Result<String, SealError> {
        let flags = self.flags();
        if flags.signed && self.signature.is_none() {
            return Err(SealError::MissingRequiredField("signature".to_string()));
        }
        let mut payload = self.encode_payload()?;
        if self.zipped {
            payload = transport::deflate_wrap(&payload)?;
        }
        let prefix = if self.legacy_prefix {
            IDB_LEGACY_PREFIX
        } else {
            IDB_PREFIX
        };
        Ok(format!(
            "{prefix}{}{}",
            flags.to_char(),
            transport::base32_encode_no_pad(&payload)
        ))
    }

    /// Sign the seal with an external provider, attaching the result.
    ///
    /// # Errors
    ///
    /// [`SealError::MissingRequiredField`] unless the signed header
    /// fields were set first — they are part of the signed bytes.
    pub fn sign_with(
        &mut self,
        provider: &dyn SigningProvider,
        private_key: &[u8],
        curve_name: &str,
    ) -> Result<(), SealError> {
        if self.header.signed_fields.is_none() {
            return Err(SealError::MissingRequiredField(
                "signed header fields".to_string(),
            ));
        }
        let message = self.signed_bytes()?;
        let plain = provider.sign(&message, private_key, curve_name)?;
        self.signature = Some(SignatureInfo::new(plain));
        Ok(())
    }

    /// Attach precomputed plain `r‖s` signature bytes, for callers that
    /// sign out of process. The signed header fields must still be set
    /// for the flag char to be honest.
    pub fn attach_signature(&mut self, plain: Vec<u8>) {
        self.signature = Some(SignatureInfo::new(plain));
    }

    /// Verify the attached signature with an external provider.
    pub fn verify_with(
        &self,
        provider: &dyn VerifyingProvider,
        public_key: &[u8],
        curve_name: &str,
    ) -> Result<bool, SealError> {
        let signature = self
            .signature
            .as_ref()
            .ok_or_else(|| SealError::MissingRequiredField("signature".to_string()))?;
        let message = self.signed_bytes()?;
        Ok(provider.verify(&message, &signature.plain, public_key, curve_name)?)
    }
}

/// Accumulates header fields and typed features, producing an unsigned
/// [`IdbSeal`] on [`build()`](IdbSealBuilder::build).
#[derive(Debug)]
pub struct IdbSealBuilder<'a> {
    registry: &'a SchemaRegistry,
    issuing_country: Option<String>,
    signed_fields: Option<SignedHeaderFields>,
    zipped: bool,
    certificate: Option<Vec<u8>>,
    features: Vec<(String, FeatureInput)>,
}

impl<'a> IdbSealBuilder<'a> {
    /// Start a builder over `registry` (which must carry the `IDB`
    /// document schema — the built-in registry does).
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self {
            registry,
            issuing_country: None,
            signed_fields: None,
            zipped: false,
            certificate: None,
            features: Vec::new(),
        }
    }

    /// Set the issuing country (up to three C40 characters).
    pub fn issuing_country(mut self, country: impl Into<String>) -> Self {
        self.issuing_country = Some(country.into());
        self
    }

    /// Switch to the signed header layout.
    pub fn signer(
        mut self,
        algorithm: IdbSignatureAlgorithm,
        certificate_reference: [u8; 5],
        signature_creation_date: MaskedDate,
    ) -> Self {
        self.signed_fields = Some(SignedHeaderFields {
            algorithm,
            certificate_reference,
            signature_creation_date,
        });
        self
    }

    /// Deflate the payload inside the envelope.
    pub fn zipped(mut self, zipped: bool) -> Self {
        self.zipped = zipped;
        self
    }

    /// Embed certificate bytes in the `0x7E` TLV.
    pub fn certificate(mut self, bytes: Vec<u8>) -> Self {
        self.certificate = Some(bytes);
        self
    }

    /// Add a typed feature by `IDB` schema name.
    pub fn feature(mut self, name: impl Into<String>, input: FeatureInput) -> Self {
        self.features.push((name.into(), input));
        self
    }

    /// Build the unsigned seal.
    pub fn build(self) -> Result<IdbSeal, SealError> {
        let resolved = self.registry.resolve(IDB_DOCUMENT_TYPE, None)?;
        let mut message_tlvs = Vec::new();
        for (name, input) in &self.features {
            message_tlvs.push(resolved.encode_feature(name, input)?);
        }
        message_tlvs.sort_by_key(|t| t.tag);

        let header = IdbHeader {
            issuing_country: self.issuing_country.ok_or_else(|| {
                SealError::MissingRequiredField("issuing country".to_string())
            })?,
            signed_fields: self.signed_fields,
        };
        header.encode()?;

        let message = message_tlvs
            .iter()
            .map(|t| resolved.decode_feature(t))
            .collect();
        Ok(IdbSeal {
            header,
            legacy_prefix: false,
            zipped: self.zipped,
            message,
            message_tlvs,
            certificate: self.certificate,
            signature: None,
        })
    }
}
