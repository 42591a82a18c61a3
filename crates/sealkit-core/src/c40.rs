//! # C40 Text Packing
//!
//! Packs three printable characters into two bytes using the ISO/IEC
//! 16022 C40 basic set, restricted to the document alphabet: digits,
//! uppercase letters, space, and the `<` filler.
//!
//! Three characters with values `c1`, `c2`, `c3` pack as the 16-bit
//! big-endian value `c1 * 1600 + c2 * 40 + c3 + 1`. Input shorter than a
//! multiple of three is padded with trailing `<` before packing; the
//! trimming decoder strips that filler again.
//!
//! `<` and space share the C40 value 3 — the document alphabet renders
//! it as `<` on decode, so a space encoded here comes back as `<`.

use crate::error::CodecError;

/// C40 value of the space/filler character.
const FILL: u16 = 3;

/// Map one document-alphabet character to its C40 value.
fn char_value(c: char) -> Result<u16, CodecError> {
    match c {
        ' ' | '<' => Ok(FILL),
        '0'..='9' => Ok(c as u16 - '0' as u16 + 4),
        'A'..='Z' => Ok(c as u16 - 'A' as u16 + 14),
        other => Err(CodecError::InvalidC40Char(other)),
    }
}

/// Map one C40 value back to its document-alphabet character.
fn value_char(v: u16) -> Result<char, CodecError> {
    match v {
        3 => Ok('<'),
        4..=13 => Ok((b'0' + (v - 4) as u8) as char),
        14..=39 => Ok((b'A' + (v - 14) as u8) as char),
        other => Err(CodecError::InvalidC40Value(other)),
    }
}

/// Encode a document-alphabet string as packed C40 bytes.
///
/// The input is padded to a multiple of three characters with trailing
/// `<` before packing, so the output length is always even.
///
/// # Errors
///
/// Returns [`CodecError::InvalidC40Char`] if any character is outside
/// the document alphabet.
pub fn encode(text: &str) -> Result<Vec<u8>, CodecError> {
    let mut values: Vec<u16> = text.chars().map(char_value).collect::<Result<_, _>>()?;
    while values.len() % 3 != 0 {
        values.push(FILL);
    }
    let mut out = Vec::with_capacity(values.len() / 3 * 2);
    for triple in values.chunks_exact(3) {
        let packed = triple[0] * 1600 + triple[1] * 40 + triple[2] + 1;
        out.extend_from_slice(&packed.to_be_bytes());
    }
    Ok(out)
}

/// Decode packed C40 bytes, keeping any trailing `<` filler.
///
/// MRZ fields need the filler preserved; use [`decode`] for plain text
/// fields where the filler was only encoder padding.
pub fn decode_raw(bytes: &[u8]) -> Result<String, CodecError> {
    if bytes.len() % 2 != 0 {
        return Err(CodecError::Truncated {
            needed: bytes.len() + 1,
            available: bytes.len(),
        });
    }
    let mut out = String::with_capacity(bytes.len() / 2 * 3);
    for pair in bytes.chunks_exact(2) {
        let packed = u16::from_be_bytes([pair[0], pair[1]]);
        if packed == 0 {
            return Err(CodecError::InvalidC40Value(0));
        }
        let v = packed - 1;
        out.push(value_char(v / 1600)?);
        out.push(value_char(v % 1600 / 40)?);
        out.push(value_char(v % 40)?);
    }
    Ok(out)
}

/// Decode packed C40 bytes and trim the trailing `<` filler.
pub fn decode(bytes: &[u8]) -> Result<String, CodecError> {
    let raw = decode_raw(bytes)?;
    Ok(raw.trim_end_matches('<').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_reference_vector() {
        assert_eq!(encode("DETS32").unwrap(), vec![0x6D, 0x32, 0xC9, 0x1F]);
    }

    #[test]
    fn test_decode_reference_vector() {
        assert_eq!(decode(&[0x6D, 0x32, 0xC9, 0x1F]).unwrap(), "DETS32");
    }

    #[test]
    fn test_encode_pads_with_filler() {
        // "AB" pads to "AB<" before packing.
        assert_eq!(encode("AB").unwrap(), encode("AB<").unwrap());
    }

    #[test]
    fn test_decode_trims_filler() {
        let bytes = encode("AB").unwrap();
        assert_eq!(decode(&bytes).unwrap(), "AB");
        assert_eq!(decode_raw(&bytes).unwrap(), "AB<");
    }

    #[test]
    fn test_space_decodes_as_chevron() {
        let bytes = encode("A B").unwrap();
        assert_eq!(decode(&bytes).unwrap(), "A<B");
    }

    #[test]
    fn test_rejects_lowercase() {
        assert!(matches!(
            encode("abc"),
            Err(CodecError::InvalidC40Char('a'))
        ));
    }

    #[test]
    fn test_rejects_odd_byte_count() {
        assert!(matches!(
            decode(&[0x6D, 0x32, 0xC9]),
            Err(CodecError::Truncated { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_pair() {
        assert!(decode(&[0x00, 0x00]).is_err());
    }

    #[test]
    fn test_roundtrip_mrz_fragment() {
        let mrz = "ATD<<RESIDORCE<<ROLAND<<<<<<<<<<<<<<";
        let bytes = encode(mrz).unwrap();
        assert_eq!(decode_raw(&bytes).unwrap(), mrz);
    }
}
