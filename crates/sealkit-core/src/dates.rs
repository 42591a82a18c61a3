//! # Packed and Masked Calendar Dates
//!
//! Seal headers carry dates in a dense decimal packing: the digits of
//! `MMDDYYYY` are read as one decimal number and stored big-endian in
//! three bytes (`MMDDYYYYHHMMSS` in six bytes for date-times).
//!
//! [`MaskedDate`] extends the three-byte form with a leading mask byte
//! carrying one bit per `MMDDYYYY` digit (MSB first, 1 = masked). Masked
//! digits are zero in the packed value and render as `x` in the string
//! form, e.g. `19xx-xx-01`. An all-masked date encodes as `FF000000`.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::error::CodecError;

/// Pack a calendar date into the 3-byte decimal `MMDDYYYY` form.
pub fn encode_date(date: NaiveDate) -> [u8; 3] {
    let packed =
        date.month() * 1_000_000 + date.day() * 10_000 + date.year() as u32;
    let b = packed.to_be_bytes();
    [b[1], b[2], b[3]]
}

/// Unpack a 3-byte decimal `MMDDYYYY` date.
///
/// # Errors
///
/// Returns [`CodecError::InvalidDateFormat`] if the digits do not form a
/// valid calendar date.
pub fn decode_date(bytes: [u8; 3]) -> Result<NaiveDate, CodecError> {
    let packed = u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]);
    let month = packed / 1_000_000;
    let day = packed / 10_000 % 100;
    let year = packed % 10_000;
    NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(|| {
        CodecError::InvalidDateFormat(format!(
            "packed value {packed:08} is not a calendar date"
        ))
    })
}

/// Pack a date-time into the 6-byte decimal `MMDDYYYYHHMMSS` form.
pub fn encode_datetime(dt: NaiveDateTime) -> [u8; 6] {
    let packed = dt.month() as u64 * 1_000_000_000_000
        + dt.day() as u64 * 10_000_000_000
        + dt.year() as u64 * 1_000_000
        + dt.hour() as u64 * 10_000
        + dt.minute() as u64 * 100
        + dt.second() as u64;
    let b = packed.to_be_bytes();
    [b[2], b[3], b[4], b[5], b[6], b[7]]
}

/// Unpack a 6-byte decimal `MMDDYYYYHHMMSS` date-time.
pub fn decode_datetime(bytes: [u8; 6]) -> Result<NaiveDateTime, CodecError> {
    let packed = u64::from_be_bytes([
        0, 0, bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5],
    ]);
    let month = (packed / 1_000_000_000_000) as u32;
    let day = (packed / 10_000_000_000 % 100) as u32;
    let year = (packed / 1_000_000 % 10_000) as i32;
    let hour = (packed / 10_000 % 100) as u32;
    let minute = (packed / 100 % 100) as u32;
    let second = (packed % 100) as u32;
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or_else(|| {
            CodecError::InvalidDateFormat(format!(
                "packed value {packed:014} is not a calendar date-time"
            ))
        })
}

/// A calendar date where individual digits may be unknown.
///
/// Issuing authorities redact unknown date components per digit: `19xx`
/// is a valid masked year. The type stores the packed `MMDDYYYY` value
/// (masked digits as zero) together with the per-digit mask byte, so the
/// wire form reproduces the exact masking pattern.
///
/// # Construction
///
/// - [`MaskedDate::parse()`] — from a `YYYY-MM-DD` string with `x` digits.
/// - [`MaskedDate::from_date()`] — fully known, no masking.
/// - [`MaskedDate::decode()`] — from the 4-byte wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaskedDate {
    /// One bit per `MMDDYYYY` digit, MSB first; 1 = masked.
    mask: u8,
    /// Packed decimal `MMDDYYYY` with masked digits as zero.
    value: u32,
}

impl MaskedDate {
    /// Digit positions of `MMDDYYYY` as offsets into a `YYYY-MM-DD` string.
    const DIGIT_POSITIONS: [usize; 8] = [5, 6, 8, 9, 0, 1, 2, 3];

    /// Parse a `YYYY-MM-DD` string where any digit may be `x`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidDateFormat`] unless the input is
    /// exactly ten characters with `-` separators and only digits or
    /// `x` in the digit positions.
    pub fn parse(s: &str) -> Result<Self, CodecError> {
        let bytes = s.as_bytes();
        let malformed =
            || CodecError::InvalidDateFormat(format!("expected YYYY-MM-DD with x digits, got {s:?}"));
        if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
            return Err(malformed());
        }
        let mut mask = 0u8;
        let mut value = 0u32;
        for (bit, &pos) in Self::DIGIT_POSITIONS.iter().enumerate() {
            value *= 10;
            match bytes[pos] {
                b'0'..=b'9' => value += (bytes[pos] - b'0') as u32,
                b'x' => mask |= 0x80 >> bit,
                _ => return Err(malformed()),
            }
        }
        Ok(Self { mask, value })
    }

    /// A fully known date with no masking.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            mask: 0,
            value: date.month() * 1_000_000 + date.day() * 10_000 + date.year() as u32,
        }
    }

    /// Encode to the 4-byte wire form: mask byte + 24-bit packed value.
    pub fn encode(&self) -> [u8; 4] {
        let b = self.value.to_be_bytes();
        [self.mask, b[1], b[2], b[3]]
    }

    /// Decode the 4-byte wire form.
    pub fn decode(bytes: [u8; 4]) -> Result<Self, CodecError> {
        let value = u32::from_be_bytes([0, bytes[1], bytes[2], bytes[3]]);
        if value > 12_319_999 {
            return Err(CodecError::InvalidDateFormat(format!(
                "packed masked-date value {value} out of range"
            )));
        }
        Ok(Self {
            mask: bytes[0],
            value,
        })
    }

    /// The `MMDDYYYY` digits, masked positions as `None`.
    fn digits(&self) -> [Option<u8>; 8] {
        let mut out = [None; 8];
        for (bit, slot) in out.iter_mut().enumerate() {
            if self.mask & (0x80 >> bit) == 0 {
                *slot = Some((self.value / 10u32.pow(7 - bit as u32) % 10) as u8);
            }
        }
        out
    }

    /// The year, if none of its digits are masked.
    pub fn year(&self) -> Option<u16> {
        if self.mask & 0x0F != 0 {
            return None;
        }
        Some((self.value % 10_000) as u16)
    }

    /// The month, if none of its digits are masked.
    pub fn month(&self) -> Option<u8> {
        if self.mask & 0xC0 != 0 {
            return None;
        }
        Some((self.value / 1_000_000) as u8)
    }

    /// The day, if none of its digits are masked.
    pub fn day(&self) -> Option<u8> {
        if self.mask & 0x30 != 0 {
            return None;
        }
        Some((self.value / 10_000 % 100) as u8)
    }

    /// The fully known date, if nothing is masked.
    pub fn to_date(&self) -> Option<NaiveDate> {
        if self.mask != 0 {
            return None;
        }
        NaiveDate::from_ymd_opt(
            self.year()? as i32,
            self.month()? as u32,
            self.day()? as u32,
        )
    }
}

impl std::fmt::Display for MaskedDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let d = self.digits();
        let ch = |i: usize| d[i].map(|v| (b'0' + v) as char).unwrap_or('x');
        write!(
            f,
            "{}{}{}{}-{}{}-{}{}",
            ch(4),
            ch(5),
            ch(6),
            ch(7),
            ch(0),
            ch(1),
            ch(2),
            ch(3)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert_eq!(decode_date(encode_date(date)).unwrap(), date);
    }

    #[test]
    fn test_date_year_extremes_roundtrip() {
        for date in [
            NaiveDate::from_ymd_opt(1, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(9999, 12, 31).unwrap(),
            // Leap day in a century leap year.
            NaiveDate::from_ymd_opt(2000, 2, 29).unwrap(),
        ] {
            assert_eq!(decode_date(encode_date(date)).unwrap(), date);
        }
    }

    #[test]
    fn test_date_rejects_impossible_day() {
        // MMDDYYYY digits of 02/30/2020 — February has no day 30.
        let packed: u32 = 2_302_020;
        let b = packed.to_be_bytes();
        assert!(decode_date([b[1], b[2], b[3]]).is_err());
    }

    #[test]
    fn test_datetime_roundtrip() {
        let dt = NaiveDate::from_ymd_opt(2030, 12, 1)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(decode_datetime(encode_datetime(dt)).unwrap(), dt);
    }

    #[test]
    fn test_masked_date_reference_vector() {
        let md = MaskedDate::parse("19xx-xx-01").unwrap();
        assert_eq!(md.encode(), [0xC3, 0x00, 0x2E, 0x7C]);
    }

    #[test]
    fn test_masked_date_all_masked() {
        let md = MaskedDate::parse("xxxx-xx-xx").unwrap();
        assert_eq!(md.encode(), [0xFF, 0x00, 0x00, 0x00]);
        assert_eq!(md.to_string(), "xxxx-xx-xx");
    }

    #[test]
    fn test_masked_date_display_reproduces_pattern() {
        for s in ["19xx-xx-01", "2026-x1-3x", "0001-01-01"] {
            assert_eq!(MaskedDate::parse(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_masked_date_wire_roundtrip() {
        let md = MaskedDate::parse("2x26-08-x0").unwrap();
        assert_eq!(MaskedDate::decode(md.encode()).unwrap(), md);
    }

    #[test]
    fn test_masked_date_rejects_wrong_layout() {
        for bad in ["19-03-2010", "2026/08/30", "2026-8-30", "2026-08-3a"] {
            assert!(matches!(
                MaskedDate::parse(bad),
                Err(CodecError::InvalidDateFormat(_))
            ));
        }
    }

    #[test]
    fn test_masked_date_component_access() {
        let md = MaskedDate::parse("19xx-xx-01").unwrap();
        assert_eq!(md.year(), None);
        assert_eq!(md.month(), None);
        assert_eq!(md.day(), Some(1));
        assert_eq!(md.to_date(), None);

        let known = MaskedDate::parse("2026-08-30").unwrap();
        assert_eq!(
            known.to_date(),
            NaiveDate::from_ymd_opt(2026, 8, 30)
        );
    }

    #[test]
    fn test_masked_date_from_date_matches_parse() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert_eq!(
            MaskedDate::from_date(date),
            MaskedDate::parse("2026-08-30").unwrap()
        );
    }
}
