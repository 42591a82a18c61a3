//! # Plain ↔ DER Signature Conversion
//!
//! Seals carry ECDSA signatures in the plain form: `r` and `s` as two
//! equal-width big-endian halves. Most crypto backends speak ASN.1 DER
//! (`SEQUENCE { INTEGER r, INTEGER s }`). These helpers convert both
//! ways without touching the values.

use sealkit_core::tlv::{self, DerTlv};

use crate::provider::CryptoError;

const TAG_SEQUENCE: u8 = 0x30;
const TAG_INTEGER: u8 = 0x02;

/// Convert a plain `r‖s` signature to an ASN.1 DER SEQUENCE.
///
/// # Errors
///
/// [`CryptoError::MalformedSignature`] on odd-length input.
pub fn plain_to_der(plain: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if plain.is_empty() || plain.len() % 2 != 0 {
        return Err(CryptoError::MalformedSignature(format!(
            "plain signature length {} is not an even split of r and s",
            plain.len()
        )));
    }
    let (r, s) = plain.split_at(plain.len() / 2);
    let mut body = DerTlv::new(TAG_INTEGER, tlv::unsigned_int_bytes(r)).encode();
    body.extend(DerTlv::new(TAG_INTEGER, tlv::unsigned_int_bytes(s)).encode());
    Ok(DerTlv::new(TAG_SEQUENCE, body).encode())
}

/// Convert an ASN.1 DER signature to the plain `r‖s` form.
///
/// `field_bytes` is the curve's field size in bytes; both halves are
/// left-padded with zeros to that width.
pub fn der_to_plain(der: &[u8], field_bytes: usize) -> Result<Vec<u8>, CryptoError> {
    let malformed = |what: &str| CryptoError::MalformedSignature(what.to_string());
    let (seq, consumed) =
        DerTlv::decode(der).map_err(|e| CryptoError::MalformedSignature(e.to_string()))?;
    if seq.tag != TAG_SEQUENCE || consumed != der.len() {
        return Err(malformed("expected a single DER SEQUENCE"));
    }
    let ints =
        DerTlv::decode_all(&seq.value).map_err(|e| CryptoError::MalformedSignature(e.to_string()))?;
    let [r, s] = ints.as_slice() else {
        return Err(malformed("expected exactly two INTEGERs"));
    };
    if r.tag != TAG_INTEGER || s.tag != TAG_INTEGER {
        return Err(malformed("expected INTEGER elements"));
    }
    let mut out = vec![0u8; field_bytes * 2];
    for (half, slot) in [(r, 0), (s, field_bytes)] {
        let magnitude: &[u8] = {
            let skip = half.value.iter().take_while(|&&b| b == 0).count();
            &half.value[skip..]
        };
        if magnitude.len() > field_bytes {
            return Err(malformed("integer wider than the curve field"));
        }
        let start = slot + field_bytes - magnitude.len();
        out[start..slot + field_bytes].copy_from_slice(magnitude);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_to_der_known_shape() {
        // r has the high bit set and gains a leading zero in DER.
        let plain = [vec![0x80; 4], vec![0x00, 0x00, 0x01, 0x02]].concat();
        let der = plain_to_der(&plain).unwrap();
        assert_eq!(der[0], TAG_SEQUENCE);
        assert_eq!(
            der,
            vec![0x30, 0x0B, 0x02, 0x05, 0x00, 0x80, 0x80, 0x80, 0x80, 0x02, 0x02, 0x01, 0x02]
        );
    }

    #[test]
    fn test_roundtrip_restores_width() {
        let plain = [vec![0x00, 0x00, 0xFF, 0x01], vec![0x7F, 0x00, 0x00, 0x02]].concat();
        let der = plain_to_der(&plain).unwrap();
        assert_eq!(der_to_plain(&der, 4).unwrap(), plain);
    }

    #[test]
    fn test_rejects_odd_plain() {
        assert!(plain_to_der(&[1, 2, 3]).is_err());
        assert!(plain_to_der(&[]).is_err());
    }

    #[test]
    fn test_rejects_trailing_garbage() {
        let mut der = plain_to_der(&[1, 2, 3, 4]).unwrap();
        der.push(0x00);
        assert!(der_to_plain(&der, 2).is_err());
    }

    #[test]
    fn test_rejects_wide_integer() {
        let der = plain_to_der(&[0xAB; 64]).unwrap();
        assert!(der_to_plain(&der, 4).is_err());
    }
}
