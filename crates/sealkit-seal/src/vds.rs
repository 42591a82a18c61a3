//! # Visible Digital Seal (VDS) Wire Format
//!
//! The BSI TR-03137 / ICAO binary seal:
//!
//! ```text
//! 0xDC | version | country(2, C40) | signer+cert ref(variable)
//!      | issuing date(3) | signature date(3)
//!      | doc feature ref(1) | doc type cat(1)
//!      | message TLVs ... | signature TLV(0xFF)
//! ```
//!
//! Two historically incompatible header generations exist. Version
//! `0x02` packs signer identifier and certificate reference into a
//! fixed six bytes. Version `0x03` is self-describing: the C40 text is
//! `signer(4) + hex length(2) + cert ref(length)`, and the byte count
//! follows from the character count. They share no structural code
//! beyond the outer fields, so each gets its own branch on
//! [`VdsVersion`].

use chrono::NaiveDate;
use tracing::debug;

use sealkit_core::{c40, dates, transport, DerTlv};
use sealkit_crypto::{SigningProvider, VerifyingProvider};
use sealkit_schema::{
    DecodedFeature, FeatureInput, FeatureValue, ProfileId, SchemaError, SchemaRegistry,
    PROFILE_UUID_TAG,
};

use crate::error::SealError;
use crate::message::SignatureInfo;

/// First byte of every VDS.
pub const VDS_MAGIC: u8 = 0xDC;

/// Tag of the trailing signature TLV.
pub const VDS_SIGNATURE_TAG: u8 = 0xFF;

/// Document type reported when the wire discriminator resolves to no
/// registered schema. Parsing still succeeds.
pub const UNKNOWN_DOCUMENT_TYPE: &str = "UNKNOWN";

/// Signer identifiers whose v3 seals carry a wrong self-describing
/// length field. For these issuers the certificate reference is always
/// three characters, whatever the length field says. A preserved
/// real-world quirk, not a general rule.
const CERT_REF_QUIRKS: &[(&str, usize)] = &[("DEME", 3), ("DES1", 3)];

fn quirk_cert_ref_len(signer: &str) -> Option<usize> {
    CERT_REF_QUIRKS
        .iter()
        .find(|(id, _)| *id == signer)
        .map(|(_, len)| *len)
}

/// The two wire generations of the VDS header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VdsVersion {
    /// Raw version `0x02`: fixed six-byte signer + certificate reference.
    V2,
    /// Raw version `0x03`: self-describing signer + certificate reference.
    V3,
}

impl VdsVersion {
    /// The wire byte of this version.
    pub fn raw(&self) -> u8 {
        match self {
            VdsVersion::V2 => 0x02,
            VdsVersion::V3 => 0x03,
        }
    }

    /// Parse the wire byte.
    ///
    /// # Errors
    ///
    /// [`SealError::UnsupportedVersion`] for anything else.
    pub fn from_raw(raw: u8) -> Result<Self, SealError> {
        match raw {
            0x02 => Ok(VdsVersion::V2),
            0x03 => Ok(VdsVersion::V3),
            other => Err(SealError::UnsupportedVersion(other)),
        }
    }
}

/// The fixed VDS header preceding the message zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VdsHeader {
    /// Wire generation.
    pub version: VdsVersion,
    /// Three-letter issuing country (C40, filler-trimmed).
    pub issuing_country: String,
    /// Four-character signer identifier.
    pub signer_identifier: String,
    /// Certificate reference text. In v2 this is the five-character
    /// zero-padded form as decoded from the wire.
    pub certificate_reference: String,
    /// The v3 length field as declared on the wire, kept only when it
    /// disagrees with the actual reference length (quirk issuers).
    /// Written back verbatim on encode so those seals stay
    /// byte-identical. `None` everywhere else, including v2.
    pub declared_cert_ref_len: Option<u8>,
    /// Date the document was issued.
    pub issuing_date: NaiveDate,
    /// Date the seal was signed.
    pub signature_date: NaiveDate,
    /// High byte of the document discriminator.
    pub doc_feature_ref: u8,
    /// Low byte of the document discriminator.
    pub doc_type_cat: u8,
}

impl VdsHeader {
    /// The 16-bit schema discriminator.
    pub fn document_ref(&self) -> u16 {
        (self.doc_feature_ref as u16) << 8 | self.doc_type_cat as u16
    }

    /// The display/lookup form of signer + certificate reference:
    /// uppercased, leading zeros trimmed, an all-zero reference
    /// collapsing to `"0"`.
    pub fn signer_cert_ref(&self) -> String {
        let trimmed = self.certificate_reference.trim_start_matches('0');
        let reference = if trimmed.is_empty() { "0" } else { trimmed };
        format!("{}{}", self.signer_identifier, reference).to_uppercase()
    }

    /// Encode the header bytes.
    pub fn encode(&self) -> Result<Vec<u8>, SealError> {
        if self.issuing_country.chars().count() > 3 {
            return Err(SealError::MalformedHeader(format!(
                "issuing country {:?} longer than 3 characters",
                self.issuing_country
            )));
        }
        if self.signer_identifier.chars().count() != 4 {
            return Err(SealError::MalformedHeader(format!(
                "signer identifier {:?} must be 4 characters",
                self.signer_identifier
            )));
        }
        let mut out = vec![VDS_MAGIC, self.version.raw()];
        out.extend(c40::encode(&self.issuing_country)?);
        let scr_text = match self.version {
            VdsVersion::V2 => {
                if self.certificate_reference.chars().count() > 5 {
                    return Err(SealError::MalformedHeader(format!(
                        "v2 certificate reference {:?} longer than 5 characters",
                        self.certificate_reference
                    )));
                }
                format!(
                    "{}{:0>5}",
                    self.signer_identifier, self.certificate_reference
                )
            }
            VdsVersion::V3 => {
                let len = self.certificate_reference.chars().count();
                if len > 0xFF {
                    return Err(SealError::MalformedHeader(format!(
                        "certificate reference of {len} characters does not fit the length field"
                    )));
                }
                // Quirk seals carry a length field that disagrees with
                // the reference; write the wire's declared value back.
                let declared = self.declared_cert_ref_len.map(usize::from).unwrap_or(len);
                format!(
                    "{}{declared:02X}{}",
                    self.signer_identifier, self.certificate_reference
                )
            }
        };
        out.extend(c40::encode(&scr_text)?);
        out.extend(dates::encode_date(self.issuing_date));
        out.extend(dates::encode_date(self.signature_date));
        out.push(self.doc_feature_ref);
        out.push(self.doc_type_cat);
        Ok(out)
    }

    /// Decode a header from the start of `bytes`, returning it and the
    /// number of bytes consumed.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize), SealError> {
        let need = |n: usize| {
            if bytes.len() < n {
                Err(SealError::Codec(sealkit_core::CodecError::Truncated {
                    needed: n,
                    available: bytes.len(),
                }))
            } else {
                Ok(())
            }
        };
        need(4)?;
        if bytes[0] != VDS_MAGIC {
            return Err(SealError::BadMagicByte(bytes[0]));
        }
        let version = VdsVersion::from_raw(bytes[1])?;
        let issuing_country = c40::decode(&bytes[2..4])?;

        let (signer_identifier, certificate_reference, declared_cert_ref_len, scr_size) =
            match version {
                VdsVersion::V2 => {
                    need(10)?;
                    let text = c40::decode_raw(&bytes[4..10])?;
                    (text[..4].to_string(), text[4..].to_string(), None, 6)
                }
                VdsVersion::V3 => {
                    need(8)?;
                    let head = c40::decode_raw(&bytes[4..8])?;
                    let signer = head[..4].to_string();
                    let declared =
                        usize::from_str_radix(&head[4..6], 16).map_err(|_| {
                            SealError::MalformedHeader(format!(
                                "certificate reference length field {:?} is not hex",
                                &head[4..6]
                            ))
                        })?;
                    let (len, kept_declared) = match quirk_cert_ref_len(&signer) {
                        Some(forced) => {
                            debug!(signer = %signer, declared, forced, "issuer quirk overrides certificate reference length");
                            (forced, (declared != forced).then_some(declared as u8))
                        }
                        None => (declared, None),
                    };
                    let total_chars = 6 + len;
                    let total_bytes = (total_chars - 1) / 3 * 2 + 2;
                    need(4 + total_bytes)?;
                    let text = c40::decode_raw(&bytes[4..4 + total_bytes])?;
                    (signer, text[6..6 + len].to_string(), kept_declared, total_bytes)
                }
            };

        let offset = 4 + scr_size;
        need(offset + 8)?;
        let issuing_date =
            dates::decode_date([bytes[offset], bytes[offset + 1], bytes[offset + 2]])?;
        let signature_date =
            dates::decode_date([bytes[offset + 3], bytes[offset + 4], bytes[offset + 5]])?;
        Ok((
            Self {
                version,
                issuing_country,
                signer_identifier,
                certificate_reference,
                declared_cert_ref_len,
                issuing_date,
                signature_date,
                doc_feature_ref: bytes[offset + 6],
                doc_type_cat: bytes[offset + 7],
            },
            offset + 8,
        ))
    }
}

/// A parsed or built VDS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VdsSeal {
    /// The fixed header.
    pub header: VdsHeader,
    /// Resolved document type, or [`UNKNOWN_DOCUMENT_TYPE`].
    pub document_type: String,
    /// Extended-profile UUID from message field tag 0, when present.
    pub profile: Option<ProfileId>,
    /// The typed view of the message zone.
    pub message: Vec<DecodedFeature>,
    /// The wire TLVs of the message zone, kept for byte-identical
    /// re-encoding.
    message_tlvs: Vec<DerTlv>,
    /// The trailing signature, once present.
    pub signature: Option<SignatureInfo>,
}

impl VdsSeal {
    /// Parse a seal from its binary form.
    ///
    /// A discriminator with no registered schema degrades to
    /// [`UNKNOWN_DOCUMENT_TYPE`] with raw-bytes fields — structural
    /// parsing does not depend on having a schema.
    pub fn parse(bytes: &[u8], registry: &SchemaRegistry) -> Result<Self, SealError> {
        let (header, header_len) = VdsHeader::decode(bytes)?;
        let document_type = match registry.document_type_for_ref(header.document_ref()) {
            Some(name) => name.to_string(),
            None => {
                debug!(
                    document_ref = format_args!("{:#06x}", header.document_ref()),
                    "no schema for document reference, seal type unknown"
                );
                UNKNOWN_DOCUMENT_TYPE.to_string()
            }
        };

        let mut tlvs = DerTlv::decode_all(&bytes[header_len..])?;
        // The last TLV tagged 0xFF is the signature; everything else,
        // in order, is the message zone.
        let signature = tlvs
            .iter()
            .rposition(|t| t.tag == VDS_SIGNATURE_TAG)
            .map(|idx| SignatureInfo::new(tlvs.remove(idx).value));
        let message_tlvs = tlvs;

        let profile = message_tlvs
            .iter()
            .find(|t| t.tag == PROFILE_UUID_TAG)
            .and_then(|t| ProfileId::from_wire(&t.value));

        let message = decode_message(registry, &document_type, profile.as_ref(), &message_tlvs);

        Ok(Self {
            header,
            document_type,
            profile,
            message,
            message_tlvs,
            signature,
        })
    }

    /// Parse a seal from its printable raw-string form.
    pub fn parse_raw_string(text: &str, registry: &SchemaRegistry) -> Result<Self, SealError> {
        Self::parse(&transport::base256_decode(text)?, registry)
    }

    /// The exact byte range covered by the signature: header plus
    /// message zone.
    pub fn signed_bytes(&self) -> Result<Vec<u8>, SealError> {
        let mut out = self.header.encode()?;
        for tlv in &self.message_tlvs {
            out.extend(tlv.encode());
        }
        Ok(out)
    }

    /// Encode the full seal, byte-identical to what was parsed.
    pub fn encode(&self) -> Result<Vec<u8>, SealError> {
        let mut out = self.signed_bytes()?;
        if let Some(signature) = &self.signature {
            out.extend(DerTlv::new(VDS_SIGNATURE_TAG, signature.plain.clone()).encode());
        }
        Ok(out)
    }

    /// The printable raw-string form.
    pub fn raw_string(&self) -> Result<String, SealError> {
        Ok(transport::base256_encode(&self.encode()?))
    }

    /// The wire TLVs of the message zone.
    pub fn message_tlvs(&self) -> &[DerTlv] {
        &self.message_tlvs
    }

    /// Sign the seal with an external provider, attaching the result.
    pub fn sign_with(
        &mut self,
        provider: &dyn SigningProvider,
        private_key: &[u8],
        curve_name: &str,
    ) -> Result<(), SealError> {
        let message = self.signed_bytes()?;
        let plain = provider.sign(&message, private_key, curve_name)?;
        self.signature = Some(SignatureInfo::new(plain));
        Ok(())
    }

    /// Attach precomputed plain `r‖s` signature bytes, for callers that
    /// sign out of process (HSM, card reader).
    pub fn attach_signature(&mut self, plain: Vec<u8>) {
        self.signature = Some(SignatureInfo::new(plain));
    }

    /// Verify the attached signature with an external provider.
    ///
    /// # Errors
    ///
    /// [`SealError::MissingRequiredField`] when the seal carries no
    /// signature.
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

/// Decode message TLVs through the two-stage schema lookup, degrading
/// to raw bytes when no schema applies.
fn decode_message(
    registry: &SchemaRegistry,
    document_type: &str,
    profile: Option<&ProfileId>,
    tlvs: &[DerTlv],
) -> Vec<DecodedFeature> {
    match registry.resolve(document_type, profile) {
        Ok(resolved) => tlvs.iter().map(|t| resolved.decode_feature(t)).collect(),
        Err(_) => tlvs
            .iter()
            .map(|t| DecodedFeature {
                tag: t.tag,
                name: sealkit_schema::feature::unknown_label(t.tag),
                value: FeatureValue::RawBytes(t.value.clone()),
            })
            .collect(),
    }
}

/// Accumulates header fields and typed features, producing an unsigned
/// [`VdsSeal`] on [`build()`](VdsSealBuilder::build).
///
/// Building is developer-controlled and fails fast: unknown document
/// types or feature names, coding mismatches, and missing required
/// fields are all surfaced, unlike the tolerant parse path.
#[derive(Debug)]
pub struct VdsSealBuilder<'a> {
    registry: &'a SchemaRegistry,
    document_type: String,
    version: VdsVersion,
    issuing_country: Option<String>,
    signer_identifier: Option<String>,
    certificate_reference: Option<String>,
    issuing_date: Option<NaiveDate>,
    signature_date: Option<NaiveDate>,
    profile: Option<ProfileId>,
    features: Vec<(String, FeatureInput)>,
}

impl<'a> VdsSealBuilder<'a> {
    /// Start a builder for a document type registered in `registry`.
    pub fn new(registry: &'a SchemaRegistry, document_type: impl Into<String>) -> Self {
        Self {
            registry,
            document_type: document_type.into(),
            version: VdsVersion::V3,
            issuing_country: None,
            signer_identifier: None,
            certificate_reference: None,
            issuing_date: None,
            signature_date: None,
            profile: None,
            features: Vec::new(),
        }
    }

    /// Select the wire generation (default v3).
    pub fn version(mut self, version: VdsVersion) -> Self {
        self.version = version;
        self
    }

    /// Set the issuing country (up to three C40 characters).
    pub fn issuing_country(mut self, country: impl Into<String>) -> Self {
        self.issuing_country = Some(country.into());
        self
    }

    /// Set signer identifier (four characters) and certificate reference.
    pub fn signer(
        mut self,
        identifier: impl Into<String>,
        certificate_reference: impl Into<String>,
    ) -> Self {
        self.signer_identifier = Some(identifier.into());
        self.certificate_reference = Some(certificate_reference.into());
        self
    }

    /// Set the document issuing date.
    pub fn issuing_date(mut self, date: NaiveDate) -> Self {
        self.issuing_date = Some(date);
        self
    }

    /// Set the signature date.
    pub fn signature_date(mut self, date: NaiveDate) -> Self {
        self.signature_date = Some(date);
        self
    }

    /// Select an extended profile; its UUID is written as message field
    /// tag 0 and its fields become encodable.
    pub fn profile(mut self, profile: ProfileId) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Add a typed feature by schema name.
    pub fn feature(mut self, name: impl Into<String>, input: FeatureInput) -> Self {
        self.features.push((name.into(), input));
        self
    }

    /// Build the unsigned seal.
    pub fn build(self) -> Result<VdsSeal, SealError> {
        let document_ref = self
            .registry
            .ref_for_document_type(&self.document_type)
            .ok_or_else(|| SchemaError::UnknownDocumentType(self.document_type.clone()))?;
        let resolved = self
            .registry
            .resolve(&self.document_type, self.profile.as_ref())?;

        let mut message_tlvs = Vec::new();
        if let Some(profile) = &self.profile {
            message_tlvs.push(DerTlv::new(PROFILE_UUID_TAG, profile.to_wire().to_vec()));
        }
        for (name, input) in &self.features {
            message_tlvs.push(resolved.encode_feature(name, input)?);
        }
        message_tlvs.sort_by_key(|t| t.tag);

        let present: Vec<u8> = message_tlvs.iter().map(|t| t.tag).collect();
        let mut required: Vec<&sealkit_schema::FieldDefinition> =
            resolved.base.fields.iter().filter(|f| f.required).collect();
        if let Some(ext) = resolved.extension {
            required.extend(ext.fields.iter().filter(|f| f.required));
        }
        for field in required {
            if !present.contains(&field.tag) {
                return Err(SealError::MissingRequiredField(field.name.clone()));
            }
        }

        let missing = |what: &str| SealError::MissingRequiredField(what.to_string());
        let header = VdsHeader {
            version: self.version,
            issuing_country: self.issuing_country.ok_or_else(|| missing("issuing country"))?,
            signer_identifier: self
                .signer_identifier
                .ok_or_else(|| missing("signer identifier"))?,
            certificate_reference: self
                .certificate_reference
                .ok_or_else(|| missing("certificate reference"))?,
            declared_cert_ref_len: None,
            issuing_date: self.issuing_date.ok_or_else(|| missing("issuing date"))?,
            signature_date: self.signature_date.ok_or_else(|| missing("signature date"))?,
            doc_feature_ref: (document_ref >> 8) as u8,
            doc_type_cat: (document_ref & 0xFF) as u8,
        };
        // Reject header field values the wire cannot carry before the
        // seal leaves the builder.
        header.encode()?;

        let message = decode_message(
            self.registry,
            &self.document_type,
            self.profile.as_ref(),
            &message_tlvs,
        );
        Ok(VdsSeal {
            header,
            document_type: self.document_type,
            profile: self.profile,
            message,
            message_tlvs,
            signature: None,
        })
    }
}
