//! # sealkit-crypto — Signing Seams
//!
//! Seal signing and verification are delegated to the hosting
//! application: the codec exposes the exact signed byte ranges, and a
//! provider supplied at construction does the EC-DSA work with whatever
//! backend the platform offers. This crate defines those seams:
//!
//! - [`SigningProvider`] / [`VerifyingProvider`] capability traits,
//!   consuming raw message bytes, key material, and a named curve;
//! - [`SignatureAlgorithm`] selection from the EC field bit length
//!   (the caller picks the digest, not the provider);
//! - plain `r‖s` ↔ ASN.1 DER signature conversion;
//! - a deterministic [`MockSigner`] for tests and transparent builds.
//!
//! No key management, certificate parsing, or trust validation lives
//! here — providers receive bytes and return bytes.

pub mod mock;
pub mod provider;
pub mod sig;

pub use mock::MockSigner;
pub use provider::{CryptoError, SignatureAlgorithm, SigningProvider, VerifyingProvider};
pub use sig::{der_to_plain, plain_to_der};
