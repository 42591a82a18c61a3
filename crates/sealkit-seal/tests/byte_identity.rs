//! Parse/encode byte identity across both formats and all envelope
//! variants: whatever a scanner hands over must re-encode to the exact
//! same text after a parse, signed or not, deflated or not.

use chrono::NaiveDate;
use sealkit_core::MaskedDate;
use sealkit_crypto::MockSigner;
use sealkit_schema::{FeatureInput, SchemaRegistry};
use sealkit_seal::{
    IdbSealBuilder, IdbSignatureAlgorithm, Seal, VdsSealBuilder, VdsVersion,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn vds_text(registry: &SchemaRegistry, version: VdsVersion, signed: bool) -> String {
    let mrz = format!("{:<<72}", "V<D<<MUSTERMANN<<ERIKA<");
    let mut seal = VdsSealBuilder::new(registry, "ICAO_VISA")
        .version(version)
        .issuing_country("D")
        .signer("DETS", "32")
        .issuing_date(date(2024, 1, 15))
        .signature_date(date(2024, 1, 17))
        .feature("MRZ_MRVB", FeatureInput::text(mrz))
        .feature("DURATION_OF_STAY", FeatureInput::Bytes(vec![0x5A, 0x00, 0x00]))
        .build()
        .unwrap();
    if signed {
        seal.sign_with(&MockSigner, b"vds-key", "brainpoolP256r1")
            .unwrap();
    }
    seal.raw_string().unwrap()
}

fn idb_text(registry: &SchemaRegistry, signed: bool, zipped: bool) -> String {
    let mut builder = IdbSealBuilder::new(registry)
        .issuing_country("UTO")
        .zipped(zipped)
        .feature("DOCUMENT_NUMBER", FeatureInput::text("D23145890"))
        .feature("EXPIRY_DATE", FeatureInput::Date(date(2029, 1, 31)));
    if signed {
        builder = builder.signer(
            IdbSignatureAlgorithm::EcdsaSha256,
            [0x01, 0x02, 0x03, 0x04, 0x05],
            MaskedDate::from_date(date(2025, 3, 14)),
        );
    }
    let mut seal = builder.build().unwrap();
    if signed {
        seal.sign_with(&MockSigner, b"idb-key", "prime256v1").unwrap();
    }
    seal.encode_barcode().unwrap()
}

#[test]
fn test_vds_matrix_byte_identity() {
    let registry = SchemaRegistry::builtin();
    for version in [VdsVersion::V2, VdsVersion::V3] {
        for signed in [false, true] {
            let text = vds_text(&registry, version, signed);
            let seal = Seal::parse_raw_string(&text, &registry).unwrap();
            assert!(matches!(seal, Seal::Vds(_)), "{version:?} signed={signed}");
            assert_eq!(
                seal.raw_string().unwrap(),
                text,
                "{version:?} signed={signed}"
            );
            assert_eq!(seal.signature_info().is_some(), signed);
        }
    }
}

#[test]
fn test_idb_matrix_byte_identity() {
    let registry = SchemaRegistry::builtin();
    for signed in [false, true] {
        for zipped in [false, true] {
            let text = idb_text(&registry, signed, zipped);
            let seal = Seal::parse_raw_string(&text, &registry).unwrap();
            assert!(matches!(seal, Seal::Idb(_)), "signed={signed} zipped={zipped}");
            assert_eq!(
                seal.raw_string().unwrap(),
                text,
                "signed={signed} zipped={zipped}"
            );
            assert_eq!(seal.signature_info().is_some(), signed);
        }
    }
}

#[test]
fn test_signature_verifies_after_transport() {
    let registry = SchemaRegistry::builtin();
    let text = vds_text(&registry, VdsVersion::V3, true);
    match Seal::parse_raw_string(&text, &registry).unwrap() {
        Seal::Vds(seal) => assert!(seal
            .verify_with(&MockSigner, b"vds-key", "brainpoolP256r1")
            .unwrap()),
        Seal::Idb(_) => panic!("expected a VDS"),
    }

    let text = idb_text(&registry, true, true);
    match Seal::parse_raw_string(&text, &registry).unwrap() {
        Seal::Idb(seal) => assert!(seal
            .verify_with(&MockSigner, b"idb-key", "prime256v1")
            .unwrap()),
        Seal::Vds(_) => panic!("expected an IDB"),
    }
}
