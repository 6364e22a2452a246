//! UTF-8 helpers for composed text.
//!
//! Input methods hand back composed text as UTF-8 bytes. Each scalar in that
//! buffer becomes one [`KeyCharEvent`](super::KeyCharEvent); a zero code point
//! means "nothing composed" and is never dispatched.

/// Decodes the first scalar value in `bytes`.
///
/// Returns the code point and the number of bytes it occupied. Empty input
/// yields `(0, 0)`; a malformed, truncated or overlong sequence yields
/// `(0, 1)` so the caller can skip past the offending byte.
pub fn decode_code_point(bytes: &[u8]) -> (u32, usize) {
    let Some(&lead) = bytes.first() else {
        return (0, 0);
    };

    let (len, initial, min) = match lead {
        0x00..=0x7F => (1, u32::from(lead), 0),
        0xC2..=0xDF => (2, u32::from(lead & 0x1F), 0x80),
        0xE0..=0xEF => (3, u32::from(lead & 0x0F), 0x800),
        0xF0..=0xF4 => (4, u32::from(lead & 0x07), 0x1_0000),
        // Continuation bytes, overlong leads (C0, C1) and leads past U+10FFFF
        _ => return (0, 1),
    };

    if bytes.len() < len {
        return (0, 1);
    }

    let mut code_point = initial;
    for &byte in &bytes[1..len] {
        if byte & 0xC0 != 0x80 {
            return (0, 1);
        }
        code_point = (code_point << 6) | u32::from(byte & 0x3F);
    }

    if code_point < min {
        return (0, 1);
    }

    if char::from_u32(code_point).is_none() {
        return (0, len);
    }

    (code_point, len)
}

/// Iterates over every non-zero scalar value in a UTF-8 buffer.
pub fn decode_code_points(bytes: &[u8]) -> CodePoints<'_> {
    CodePoints { bytes }
}

/// Iterator returned by [`decode_code_points`].
#[derive(Debug, Clone)]
pub struct CodePoints<'a> {
    bytes: &'a [u8],
}

impl Iterator for CodePoints<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        while !self.bytes.is_empty() {
            let (code_point, used) = decode_code_point(self.bytes);
            self.bytes = &self.bytes[used.max(1)..];
            if code_point != 0 {
                return Some(code_point);
            }
        }
        None
    }
}

/// Encodes a scalar value as UTF-8 into `buf`, returning the written bytes.
///
/// Surrogates and values above `0x10FFFF` produce an empty slice.
pub fn code_point_to_utf8(code_point: u32, buf: &mut [u8; 4]) -> &[u8] {
    let len = match code_point {
        0x0000..=0x007F => {
            buf[0] = code_point as u8;
            1
        }
        0x0080..=0x07FF => {
            buf[0] = 0xC0 | (code_point >> 6) as u8;
            buf[1] = 0x80 | (code_point & 0x3F) as u8;
            2
        }
        0xD800..=0xDFFF => 0,
        0x0800..=0xFFFF => {
            buf[0] = 0xE0 | (code_point >> 12) as u8;
            buf[1] = 0x80 | ((code_point >> 6) & 0x3F) as u8;
            buf[2] = 0x80 | (code_point & 0x3F) as u8;
            3
        }
        0x1_0000..=0x10_FFFF => {
            buf[0] = 0xF0 | (code_point >> 18) as u8;
            buf[1] = 0x80 | ((code_point >> 12) & 0x3F) as u8;
            buf[2] = 0x80 | ((code_point >> 6) & 0x3F) as u8;
            buf[3] = 0x80 | (code_point & 0x3F) as u8;
            4
        }
        _ => 0,
    };
    &buf[..len]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_each_sequence_length() {
        assert_eq!(decode_code_point(b"a"), (0x61, 1));
        assert_eq!(decode_code_point("é".as_bytes()), (0xE9, 2));
        assert_eq!(decode_code_point("€".as_bytes()), (0x20AC, 3));
        assert_eq!(decode_code_point("😀".as_bytes()), (0x1F600, 4));
    }

    #[test]
    fn round_trips_every_scalar_value() {
        let mut buf = [0u8; 4];
        for code_point in (0..=0x10FFFFu32).filter(|cp| !(0xD800..=0xDFFF).contains(cp)) {
            let encoded = code_point_to_utf8(code_point, &mut buf);
            assert_eq!(
                decode_code_point(encoded),
                (code_point, encoded.len()),
                "U+{code_point:04X}"
            );
        }
    }

    #[test]
    fn encoding_matches_std() {
        let mut buf = [0u8; 4];
        for c in ['A', 'ß', 'ツ', '🦀'] {
            let mut expected = [0u8; 4];
            assert_eq!(
                code_point_to_utf8(c as u32, &mut buf),
                c.encode_utf8(&mut expected).as_bytes()
            );
        }
    }

    #[test]
    fn rejects_surrogates_and_out_of_range() {
        let mut buf = [0u8; 4];
        assert!(code_point_to_utf8(0xD800, &mut buf).is_empty());
        assert!(code_point_to_utf8(0x11_0000, &mut buf).is_empty());
    }

    #[test]
    fn empty_and_malformed_input_decode_to_zero() {
        assert_eq!(decode_code_point(&[]), (0, 0));
        assert_eq!(decode_code_point(&[0xFF]), (0, 1));
        // Truncated three-byte sequence
        assert_eq!(decode_code_point(&[0xE2, 0x82]), (0, 1));
        // Bad continuation byte
        assert_eq!(decode_code_point(&[0xC3, 0x41]), (0, 1));
    }

    #[test]
    fn overlong_and_out_of_range_sequences_decode_to_zero() {
        // 'A' and NUL in two bytes
        assert_eq!(decode_code_point(&[0xC1, 0x81]), (0, 1));
        assert_eq!(decode_code_point(&[0xC0, 0x80]), (0, 1));
        // U+07FF in three bytes
        assert_eq!(decode_code_point(&[0xE0, 0x9F, 0xBF]), (0, 1));
        // U+FFFF in four bytes
        assert_eq!(decode_code_point(&[0xF0, 0x8F, 0xBF, 0xBF]), (0, 1));
        // Above U+10FFFF
        assert_eq!(decode_code_point(&[0xF4, 0x90, 0x80, 0x80]).0, 0);
        assert_eq!(decode_code_point(&[0xF5, 0x80, 0x80, 0x80]), (0, 1));
        // Shortest forms at each boundary still decode
        assert_eq!(decode_code_point(&[0xC2, 0x80]), (0x80, 2));
        assert_eq!(decode_code_point(&[0xE0, 0xA0, 0x80]), (0x800, 3));
        assert_eq!(decode_code_point(&[0xF0, 0x90, 0x80, 0x80]), (0x1_0000, 4));
    }

    #[test]
    fn iterator_skips_overlong_sequences() {
        let decoded: Vec<u32> = decode_code_points(&[0xC1, 0x81, b'x']).collect();
        assert_eq!(decoded, vec![u32::from(b'x')]);
    }

    #[test]
    fn iterates_over_composed_strings() {
        let decoded: Vec<u32> = decode_code_points("añ€".as_bytes()).collect();
        assert_eq!(decoded, vec![0x61, 0xF1, 0x20AC]);
    }

    #[test]
    fn iterator_skips_nul_and_garbage() {
        let decoded: Vec<u32> = decode_code_points(&[0x00, 0xFF, b'x']).collect();
        assert_eq!(decoded, vec![u32::from(b'x')]);
    }
}
