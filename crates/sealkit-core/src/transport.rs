//! # Text and Payload Transports
//!
//! The three transports that move seal payloads through printable
//! channels:
//!
//! - **Base32** (RFC 4648) for the ICAO barcode envelope. The wire form
//!   carries no `=` padding; the decoder tolerates partial or missing
//!   padding by stripping and re-deriving it.
//! - **Base256** for the VDS raw string: a 1:1 byte ↔ Latin-1 character
//!   mapping with no expansion.
//! - **DEFLATE** (zlib-wrapped, best compression) for optionally
//!   compressed barcode payloads. Matches the stream format emitted by
//!   `java.util.zip.Deflater` defaults so payloads from existing
//!   issuers stay decodable.

use std::io::{Read, Write};

use data_encoding::{BASE32, BASE32_NOPAD};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::CodecError;

/// Encode bytes as padded RFC 4648 Base32.
pub fn base32_encode(data: &[u8]) -> String {
    BASE32.encode(data)
}

/// Decode RFC 4648 Base32, accepting absent or partial `=` padding.
pub fn base32_decode(text: &str) -> Result<Vec<u8>, CodecError> {
    let stripped = text.trim_end_matches('=');
    BASE32_NOPAD
        .decode(stripped.as_bytes())
        .map_err(|e| CodecError::Transport(format!("base32: {e}")))
}

/// Encode bytes as padded Base32 with the padding stripped, the form
/// used inside barcode envelopes.
pub fn base32_encode_no_pad(data: &[u8]) -> String {
    BASE32_NOPAD.encode(data)
}

/// Map bytes 1:1 onto a printable string (Latin-1 code points).
pub fn base256_encode(data: &[u8]) -> String {
    data.iter().map(|&b| b as char).collect()
}

/// Invert [`base256_encode`].
///
/// # Errors
///
/// Returns [`CodecError::Transport`] on any character above U+00FF,
/// which cannot have come from the encoder.
pub fn base256_decode(text: &str) -> Result<Vec<u8>, CodecError> {
    text.chars()
        .map(|c| {
            u8::try_from(c as u32).map_err(|_| {
                CodecError::Transport(format!("base256: character {c:?} above U+00FF"))
            })
        })
        .collect()
}

/// Compress a payload with zlib-wrapped DEFLATE at best compression.
pub fn deflate_wrap(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .map_err(|e| CodecError::Transport(format!("deflate: {e}")))
}

/// Decompress a zlib-wrapped DEFLATE payload.
pub fn deflate_unwrap(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| CodecError::Transport(format!("inflate: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base32_reference_vectors() {
        assert_eq!(base32_encode(b"foobar"), "MZXW6YTBOI======");
        assert_eq!(base32_decode("MZXW6===").unwrap(), b"foo");
        assert_eq!(base32_decode("MZXW6").unwrap(), b"foo");
        assert_eq!(base32_decode("").unwrap(), b"");
    }

    #[test]
    fn test_base32_no_pad_matches_stripped() {
        let data = b"\xDC\x03\x6D\x32";
        assert_eq!(
            base32_encode_no_pad(data),
            base32_encode(data).trim_end_matches('=')
        );
    }

    #[test]
    fn test_base32_rejects_garbage() {
        assert!(base32_decode("not base32!").is_err());
    }

    #[test]
    fn test_base256_roundtrip_all_bytes() {
        let data: Vec<u8> = (0..=255).collect();
        let text = base256_encode(&data);
        // 1:1 — no expansion in character count.
        assert_eq!(text.chars().count(), data.len());
        assert_eq!(base256_decode(&text).unwrap(), data);
    }

    #[test]
    fn test_base256_rejects_wide_char() {
        assert!(matches!(
            base256_decode("ok\u{0100}"),
            Err(CodecError::Transport(_))
        ));
    }

    #[test]
    fn test_deflate_transparent_roundtrip() {
        let data = b"a repetitive payload payload payload payload".repeat(8);
        let wrapped = deflate_wrap(&data).unwrap();
        assert!(wrapped.len() < data.len());
        assert_eq!(deflate_unwrap(&wrapped).unwrap(), data);
    }

    #[test]
    fn test_deflate_empty_roundtrip() {
        let wrapped = deflate_wrap(b"").unwrap();
        assert_eq!(deflate_unwrap(&wrapped).unwrap(), b"");
    }

    #[test]
    fn test_inflate_rejects_garbage() {
        assert!(deflate_unwrap(&[0x00, 0x01, 0x02]).is_err());
    }
}
