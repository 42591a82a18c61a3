//! # Mock Provider
//!
//! A deterministic, transparent stand-in for a real ECDSA backend,
//! mirroring the shape real providers must satisfy. Signatures are
//! SHA-256 keyed digests of the inputs — no cryptographic security,
//! but stable across runs, so builder and round-trip tests can assert
//! exact bytes.
//!
//! ## Security Notice
//!
//! This provider performs NO public-key cryptography. Verification
//! only succeeds when the verifying key bytes equal the signing key
//! bytes. Never wire it into anything that leaves a test.

use sha2::{Digest, Sha256};

use crate::provider::{CryptoError, SigningProvider, VerifyingProvider};

/// Deterministic mock signer/verifier for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockSigner;

impl MockSigner {
    fn digest(message: &[u8], key: &[u8], curve_name: &str) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(curve_name.as_bytes());
        hasher.update([0u8]);
        hasher.update(key);
        hasher.update([0u8]);
        hasher.update(message);
        let r = hasher.finalize();
        let s = Sha256::digest(r);
        let mut out = r.to_vec();
        out.extend_from_slice(&s);
        out
    }
}

impl SigningProvider for MockSigner {
    fn sign(
        &self,
        message: &[u8],
        private_key: &[u8],
        curve_name: &str,
    ) -> Result<Vec<u8>, CryptoError> {
        Ok(Self::digest(message, private_key, curve_name))
    }
}

impl VerifyingProvider for MockSigner {
    fn verify(
        &self,
        message: &[u8],
        signature: &[u8],
        public_key: &[u8],
        curve_name: &str,
    ) -> Result<bool, CryptoError> {
        Ok(signature == Self::digest(message, public_key, curve_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_is_deterministic() {
        let signer = MockSigner;
        let a = signer.sign(b"msg", b"key", "brainpoolP256r1").unwrap();
        let b = signer.sign(b"msg", b"key", "brainpoolP256r1").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_verify_roundtrip() {
        let signer = MockSigner;
        let sig = signer.sign(b"payload", b"key", "prime256v1").unwrap();
        assert!(signer.verify(b"payload", &sig, b"key", "prime256v1").unwrap());
        assert!(!signer.verify(b"tampered", &sig, b"key", "prime256v1").unwrap());
        assert!(!signer.verify(b"payload", &sig, b"other", "prime256v1").unwrap());
    }
}
