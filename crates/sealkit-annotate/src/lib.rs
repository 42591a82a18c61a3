//! # sealkit-annotate — Byte-Range Annotation
//!
//! Turns a seal binary into a tree of labelled byte spans, for hex-dump
//! viewers and debugging tools that want to show which bytes mean what.
//!
//! The annotation is exhaustive and non-overlapping at every level: a
//! node's children tile a subset of its range in order, and sibling
//! ranges never intersect. Message fields get `Tag` / `Length` /
//! `Value` children so a viewer can highlight the DER structure itself.
//!
//! Annotation re-walks the same structure the parsers walk, over the
//! same scanner, so it fails on exactly the inputs parsing fails on —
//! there is no "best effort" annotation of a structurally broken seal.

use sealkit_core::{scanner, ByteSpan};
use sealkit_schema::SchemaRegistry;
use sealkit_seal::{idb, vds, IdbSeal, Seal, SealError, VdsHeader, VdsSeal, VdsVersion};

/// A labelled byte range with nested sub-ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAnnotation {
    /// Human-readable label for this range.
    pub label: String,
    /// The byte range covered, relative to the annotated buffer.
    pub range: ByteSpan,
    /// Sub-ranges, in buffer order, each contained in `range`.
    pub children: Vec<FieldAnnotation>,
}

impl FieldAnnotation {
    /// A leaf annotation.
    pub fn leaf(label: impl Into<String>, range: ByteSpan) -> Self {
        Self {
            label: label.into(),
            range,
            children: Vec::new(),
        }
    }

    /// A branch annotation with children.
    pub fn branch(label: impl Into<String>, range: ByteSpan, children: Vec<Self>) -> Self {
        Self {
            label: label.into(),
            range,
            children,
        }
    }
}

/// Annotate a seal of either format over its canonical encoding.
///
/// For a VDS this covers the full binary; for an IDB it covers the
/// decoded payload (after Base32 and inflate), since the envelope text
/// has no byte structure worth annotating.
pub fn annotate(seal: &Seal, registry: &SchemaRegistry) -> Result<FieldAnnotation, SealError> {
    match seal {
        Seal::Vds(vds) => annotate_vds(&vds.encode()?, registry),
        Seal::Idb(idb) => {
            let signed = idb.header.signed_fields.is_some();
            annotate_idb_payload(&idb.encode_payload()?, signed, registry)
        }
    }
}

/// Annotate a binary VDS.
pub fn annotate_vds(bytes: &[u8], registry: &SchemaRegistry) -> Result<FieldAnnotation, SealError> {
    let seal = VdsSeal::parse(bytes, registry)?;
    let (_, header_len) = VdsHeader::decode(bytes)?;
    let scr_size = header_len - 4 - 8;

    let header = FieldAnnotation::branch(
        "Header",
        ByteSpan::new(0, header_len),
        vec![
            FieldAnnotation::leaf("Magic", ByteSpan::new(0, 1)),
            FieldAnnotation::leaf(
                match seal.header.version {
                    VdsVersion::V2 => "Version (v2)",
                    VdsVersion::V3 => "Version (v3)",
                },
                ByteSpan::new(1, 1),
            ),
            FieldAnnotation::leaf("Issuing Country", ByteSpan::new(2, 2)),
            FieldAnnotation::leaf(
                "Signer & Certificate Reference",
                ByteSpan::new(4, scr_size),
            ),
            FieldAnnotation::leaf("Issuing Date", ByteSpan::new(4 + scr_size, 3)),
            FieldAnnotation::leaf("Signature Date", ByteSpan::new(7 + scr_size, 3)),
            FieldAnnotation::leaf("Document Feature Ref", ByteSpan::new(10 + scr_size, 1)),
            FieldAnnotation::leaf("Document Type Category", ByteSpan::new(11 + scr_size, 1)),
        ],
    );

    let spans = scanner::scan(&bytes[header_len..], header_len)?;
    // The parser takes the last 0xFF element as the signature; every
    // other element maps, in order, to a decoded message entry.
    let signature_idx = spans
        .iter()
        .rposition(|s| s.tag == vds::VDS_SIGNATURE_TAG)
        .filter(|_| seal.signature.is_some());

    let mut children = vec![header];
    let mut names = seal.message.iter().map(|f| f.name.clone());
    for (idx, span) in spans.iter().enumerate() {
        let label = if Some(idx) == signature_idx {
            "Signature".to_string()
        } else {
            names.next().unwrap_or_else(|| format!("Field (0x{:02X})", span.tag))
        };
        children.push(annotate_tlv(label, span));
    }

    Ok(FieldAnnotation::branch(
        format!("Visible Digital Seal ({})", seal.document_type),
        ByteSpan::new(0, bytes.len()),
        children,
    ))
}

/// Annotate a decoded IDB payload. `signed` selects the twelve-byte
/// header layout, exactly as the envelope flag does for parsing.
pub fn annotate_idb_payload(
    bytes: &[u8],
    signed: bool,
    registry: &SchemaRegistry,
) -> Result<FieldAnnotation, SealError> {
    let seal = IdbSeal::parse_payload(bytes, signed, registry)?;

    let mut header_children = vec![FieldAnnotation::leaf("Issuing Country", ByteSpan::new(0, 2))];
    let header_len = if signed {
        header_children.push(FieldAnnotation::leaf(
            "Signature Algorithm",
            ByteSpan::new(2, 1),
        ));
        header_children.push(FieldAnnotation::leaf(
            "Certificate Reference",
            ByteSpan::new(3, 5),
        ));
        header_children.push(FieldAnnotation::leaf(
            "Signature Creation Date",
            ByteSpan::new(8, 4),
        ));
        12
    } else {
        2
    };
    let header =
        FieldAnnotation::branch("Header", ByteSpan::new(0, header_len), header_children);

    let mut children = vec![header];
    for span in scanner::scan(&bytes[header_len..], header_len)? {
        match span.tag {
            idb::IDB_MESSAGE_GROUP_TAG => {
                let mut group_children = vec![
                    FieldAnnotation::leaf("Tag", ByteSpan::new(span.tag_offset, 1)),
                    FieldAnnotation::leaf("Length", span.length_span()),
                ];
                let inner = scanner::scan(
                    &bytes[span.value_offset()..span.value_offset() + span.value_length],
                    span.value_offset(),
                )?;
                let mut names = seal.message.iter().map(|f| f.name.clone());
                for field in &inner {
                    let label = names
                        .next()
                        .unwrap_or_else(|| format!("Field (0x{:02X})", field.tag));
                    group_children.push(annotate_tlv(label, field));
                }
                children.push(FieldAnnotation::branch(
                    "Message Group",
                    span.span(),
                    group_children,
                ));
            }
            idb::IDB_CERTIFICATE_TAG => {
                children.push(annotate_tlv("Certificate".to_string(), &span));
            }
            idb::IDB_SIGNATURE_TAG => {
                children.push(annotate_tlv("Signature".to_string(), &span));
            }
            other => return Err(SealError::UnknownTag(other)),
        }
    }

    Ok(FieldAnnotation::branch(
        "ICAO Digital Barcode",
        ByteSpan::new(0, bytes.len()),
        children,
    ))
}

fn annotate_tlv(label: String, span: &scanner::TlvSpan) -> FieldAnnotation {
    FieldAnnotation::branch(
        label,
        span.span(),
        vec![
            FieldAnnotation::leaf("Tag", ByteSpan::new(span.tag_offset, 1)),
            FieldAnnotation::leaf("Length", span.length_span()),
            FieldAnnotation::leaf("Value", span.value_span()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sealkit_core::MaskedDate;
    use sealkit_crypto::MockSigner;
    use sealkit_schema::FeatureInput;
    use sealkit_seal::{IdbSealBuilder, IdbSignatureAlgorithm, VdsSealBuilder};

    /// Children must sit inside their parent, in order, without overlap.
    fn assert_well_nested(node: &FieldAnnotation) {
        let mut cursor = node.range.offset;
        for child in &node.children {
            assert!(
                node.range.contains(&child.range),
                "{} escapes {}..{}",
                child.label,
                node.range.offset,
                node.range.end()
            );
            assert!(
                child.range.offset >= cursor,
                "{} overlaps its predecessor",
                child.label
            );
            cursor = child.range.end();
            assert_well_nested(child);
        }
    }

    /// Top-level children must tile the root exactly.
    fn assert_full_coverage(root: &FieldAnnotation) {
        let mut cursor = root.range.offset;
        for child in &root.children {
            assert_eq!(child.range.offset, cursor, "gap before {}", child.label);
            cursor = child.range.end();
        }
        assert_eq!(cursor, root.range.end(), "trailing gap");
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_vds_annotation_covers_everything() {
        let registry = SchemaRegistry::builtin();
        let mrz = format!("{:<<72}", "V<D<<MUSTERMANN<<ERIKA<");
        let mut seal = VdsSealBuilder::new(&registry, "ICAO_VISA")
            .issuing_country("D")
            .signer("DETS", "32")
            .issuing_date(date(2024, 1, 15))
            .signature_date(date(2024, 1, 17))
            .feature("MRZ_MRVB", FeatureInput::text(mrz))
            .feature("NUMBER_OF_ENTRIES", FeatureInput::Byte(1))
            .build()
            .unwrap();
        seal.sign_with(&MockSigner, b"key", "brainpoolP256r1").unwrap();
        let bytes = seal.encode().unwrap();

        let root = annotate_vds(&bytes, &registry).unwrap();
        assert_eq!(root.range, ByteSpan::new(0, bytes.len()));
        assert_well_nested(&root);
        assert_full_coverage(&root);

        let labels: Vec<&str> = root.children.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            labels,
            ["Header", "MRZ_MRVB", "NUMBER_OF_ENTRIES", "Signature"]
        );
        // Field nodes expose the DER structure.
        let mrz_node = &root.children[1];
        assert_eq!(mrz_node.children[0].label, "Tag");
        assert_eq!(mrz_node.children[1].label, "Length");
        assert_eq!(mrz_node.children[2].label, "Value");
        assert_eq!(mrz_node.children[2].range.length, 48);
    }

    #[test]
    fn test_vds_unknown_field_label() {
        let registry = SchemaRegistry::builtin();
        let mrz = format!("{:<<72}", "V<D<<MUSTERMANN<<ERIKA<");
        let seal = VdsSealBuilder::new(&registry, "ICAO_VISA")
            .issuing_country("D")
            .signer("DETS", "32")
            .issuing_date(date(2024, 1, 15))
            .signature_date(date(2024, 1, 17))
            .feature("MRZ_MRVB", FeatureInput::text(mrz))
            .build()
            .unwrap();
        let mut bytes = seal.encode().unwrap();
        bytes.extend(sealkit_core::DerTlv::new(0x6E, vec![1, 2, 3]).encode());
        let root = annotate_vds(&bytes, &registry).unwrap();
        assert!(root
            .children
            .iter()
            .any(|c| c.label == "Unknown (0x6E)"));
        assert_full_coverage(&root);
    }

    #[test]
    fn test_idb_annotation_signed() {
        let registry = SchemaRegistry::builtin();
        let mut seal = IdbSealBuilder::new(&registry)
            .issuing_country("UTO")
            .signer(
                IdbSignatureAlgorithm::EcdsaSha256,
                [1, 2, 3, 4, 5],
                MaskedDate::from_date(date(2025, 3, 14)),
            )
            .feature("DOCUMENT_NUMBER", FeatureInput::text("D23145890"))
            .feature("CAN", FeatureInput::text("123456"))
            .build()
            .unwrap();
        seal.sign_with(&MockSigner, b"key", "prime256v1").unwrap();
        let payload = seal.encode_payload().unwrap();

        let root = annotate_idb_payload(&payload, true, &registry).unwrap();
        assert_well_nested(&root);
        assert_full_coverage(&root);
        let labels: Vec<&str> = root.children.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["Header", "Message Group", "Signature"]);

        let group = &root.children[1];
        let group_labels: Vec<&str> = group.children.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            group_labels,
            ["Tag", "Length", "DOCUMENT_NUMBER", "CAN"]
        );
    }

    #[test]
    fn test_idb_annotation_unsigned_header_is_two_bytes() {
        let registry = SchemaRegistry::builtin();
        let seal = IdbSealBuilder::new(&registry)
            .issuing_country("D")
            .feature("CAN", FeatureInput::text("654321"))
            .build()
            .unwrap();
        let payload = seal.encode_payload().unwrap();
        let root = annotate_idb_payload(&payload, false, &registry).unwrap();
        assert_eq!(root.children[0].range, ByteSpan::new(0, 2));
        assert_full_coverage(&root);
    }

    #[test]
    fn test_annotate_dispatches_on_seal() {
        let registry = SchemaRegistry::builtin();
        let seal = IdbSealBuilder::new(&registry)
            .issuing_country("D")
            .feature("CAN", FeatureInput::text("000000"))
            .build()
            .unwrap();
        let payload = seal.encode_payload().unwrap();
        let root = annotate(&Seal::Idb(seal), &registry).unwrap();
        assert_eq!(root.range.length, payload.len());
        assert_eq!(root.label, "ICAO Digital Barcode");
    }
}
