//! # Provider Traits and Algorithm Selection
//!
//! Abstract interfaces for the externally supplied EC-DSA backends.
//! Platform integrations (JCA, OpenSSL, ring, smartcards) implement
//! these; the codec never links a crypto backend itself.
//!
//! ## Algorithm Selection
//!
//! The digest is chosen by the *caller* from the EC field bit length of
//! the signing key's curve, never by the provider: ≤224 → SHA-224,
//! ≤256 → SHA-256, ≤384 → SHA-384, ≤512 → SHA-512, each with plain
//! (non-DER) ECDSA output.

use thiserror::Error;

/// Error in delegated cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// No digest is defined for this EC field size.
    #[error("unsupported curve: {0}")]
    UnsupportedCurve(String),

    /// A signature blob had the wrong shape.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// The provider failed to produce a signature.
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// The provider failed while verifying.
    #[error("verification failed: {0}")]
    VerificationFailed(String),
}

/// A signature algorithm selected from the EC field bit length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    /// SHA-224 with plain ECDSA.
    Sha224PlainEcdsa,
    /// SHA-256 with plain ECDSA.
    Sha256PlainEcdsa,
    /// SHA-384 with plain ECDSA.
    Sha384PlainEcdsa,
    /// SHA-512 with plain ECDSA.
    Sha512PlainEcdsa,
}

impl SignatureAlgorithm {
    /// Select the algorithm for a curve's field bit length.
    ///
    /// # Errors
    ///
    /// [`CryptoError::UnsupportedCurve`] above 512 bits.
    pub fn for_field_bits(bits: u32) -> Result<Self, CryptoError> {
        match bits {
            0..=224 => Ok(Self::Sha224PlainEcdsa),
            225..=256 => Ok(Self::Sha256PlainEcdsa),
            257..=384 => Ok(Self::Sha384PlainEcdsa),
            385..=512 => Ok(Self::Sha512PlainEcdsa),
            _ => Err(CryptoError::UnsupportedCurve(format!(
                "no digest defined for {bits}-bit fields"
            ))),
        }
    }

    /// The JCA-style algorithm name providers conventionally accept.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha224PlainEcdsa => "SHA224withPLAIN-ECDSA",
            Self::Sha256PlainEcdsa => "SHA256withPLAIN-ECDSA",
            Self::Sha384PlainEcdsa => "SHA384withPLAIN-ECDSA",
            Self::Sha512PlainEcdsa => "SHA512withPLAIN-ECDSA",
        }
    }
}

impl std::fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Capability to sign seal bytes with an externally held private key.
///
/// `Send + Sync` so a single provider can serve concurrent seal builds.
pub trait SigningProvider: Send + Sync {
    /// Sign `message`, returning the plain `r‖s` signature bytes.
    ///
    /// `curve_name` names the EC curve of `private_key` (e.g.
    /// `brainpoolP256r1`); the provider derives the digest via
    /// [`SignatureAlgorithm::for_field_bits`] on its known curves.
    fn sign(
        &self,
        message: &[u8],
        private_key: &[u8],
        curve_name: &str,
    ) -> Result<Vec<u8>, CryptoError>;
}

/// Capability to verify a plain `r‖s` signature over seal bytes.
pub trait VerifyingProvider: Send + Sync {
    /// Verify `signature` over `message` with `public_key`.
    ///
    /// Returns `Ok(false)` for a well-formed but wrong signature;
    /// `Err` only for malformed inputs or backend failures.
    fn verify(
        &self,
        message: &[u8],
        signature: &[u8],
        public_key: &[u8],
        curve_name: &str,
    ) -> Result<bool, CryptoError>;
}
