//! # Shared Message Types
//!
//! Types common to both wire formats: the decoded message list entry
//! (re-exported from the schema layer) and the signature record.

use sealkit_crypto::{plain_to_der, CryptoError};

pub use sealkit_schema::DecodedFeature;

/// A seal signature as carried on the wire.
///
/// Seals store the plain `r‖s` form; [`SignatureInfo::der`] converts
/// for backends that expect ASN.1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInfo {
    /// The plain `r‖s` signature bytes.
    pub plain: Vec<u8>,
}

impl SignatureInfo {
    /// Wrap plain `r‖s` signature bytes.
    pub fn new(plain: Vec<u8>) -> Self {
        Self { plain }
    }

    /// The signature as an ASN.1 DER `SEQUENCE { INTEGER r, INTEGER s }`.
    pub fn der(&self) -> Result<Vec<u8>, CryptoError> {
        plain_to_der(&self.plain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_der_conversion() {
        let info = SignatureInfo::new(vec![0x01, 0x02, 0x03, 0x04]);
        let der = info.der().unwrap();
        assert_eq!(der[0], 0x30);
    }
}
