//! MessagePack tag byte constants.

// Nil
pub const NIL: u8 = 0xC0;

// Reserved, never emitted
pub const NEVER_USED: u8 = 0xC1;

// Boolean
pub const FALSE: u8 = 0xC2;
pub const TRUE: u8 = 0xC3;

// Binary
pub const BIN_8: u8 = 0xC4;
pub const BIN_16: u8 = 0xC5;
pub const BIN_32: u8 = 0xC6;

// Extension (not supported, rejected on read)
pub const EXT_8: u8 = 0xC7;
pub const EXT_16: u8 = 0xC8;
pub const EXT_32: u8 = 0xC9;
pub const FIXEXT_1: u8 = 0xD4;
pub const FIXEXT_16: u8 = 0xD8;

// Float (IEEE 754)
pub const FLOAT_32: u8 = 0xCA;
pub const FLOAT_64: u8 = 0xCB;

// Unsigned integer
pub const UINT_8: u8 = 0xCC;
pub const UINT_16: u8 = 0xCD;
pub const UINT_32: u8 = 0xCE;
pub const UINT_64: u8 = 0xCF;

// Signed integer
pub const INT_8: u8 = 0xD0;
pub const INT_16: u8 = 0xD1;
pub const INT_32: u8 = 0xD2;
pub const INT_64: u8 = 0xD3;

// String
// FIXSTR: 0xA0..=0xBF (prefix 0b101, low 5 bits = byte length 0..31)
pub const STR_8: u8 = 0xD9;
pub const STR_16: u8 = 0xDA;
pub const STR_32: u8 = 0xDB;

// Array
// FIXARRAY: 0x90..=0x9F (high nibble 0x9, low = element count 0..15)
pub const ARRAY_16: u8 = 0xDC;
pub const ARRAY_32: u8 = 0xDD;

// Map
// FIXMAP: 0x80..=0x8F (high nibble 0x8, low = entry count 0..15)
pub const MAP_16: u8 = 0xDE;
pub const MAP_32: u8 = 0xDF;

// FIXINT positive: 0x00..=0x7F (0..127)
// FIXINT negative: 0xE0..=0xFF (-32..-1)
pub const POSITIVE_FIXINT_MAX: u8 = 0x7F;
pub const NEGATIVE_FIXINT_PREFIX: u8 = 0xE0;

// Prefixes for the embedded-length short forms.
pub const FIXMAP_PREFIX: u8 = 0x80;
pub const FIXARRAY_PREFIX: u8 = 0x90;
pub const FIXSTR_PREFIX: u8 = 0xA0;

/// Returns `true` for the positive fixint range.
pub fn is_positive_fixint(m: u8) -> bool {
    m <= POSITIVE_FIXINT_MAX
}

/// Returns `true` for the negative fixint range.
pub fn is_negative_fixint(m: u8) -> bool {
    m >= NEGATIVE_FIXINT_PREFIX
}

pub fn is_fixmap(m: u8) -> bool {
    m & 0xF0 == FIXMAP_PREFIX
}

pub fn is_fixarray(m: u8) -> bool {
    m & 0xF0 == FIXARRAY_PREFIX
}

pub fn is_fixstr(m: u8) -> bool {
    m & 0xE0 == FIXSTR_PREFIX
}

/// Returns `true` for any of the extension tags.
pub fn is_ext(m: u8) -> bool {
    matches!(m, EXT_8 | EXT_16 | EXT_32) || (FIXEXT_1..=FIXEXT_16).contains(&m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_form_ranges() {
        assert!(is_fixmap(0x80) && is_fixmap(0x8F));
        assert!(is_fixarray(0x90) && is_fixarray(0x9F));
        assert!(is_fixstr(0xA0) && is_fixstr(0xBF));
        assert!(!is_fixstr(NIL));
        assert!(is_positive_fixint(0x7F) && !is_positive_fixint(0x80));
        assert!(is_negative_fixint(0xE0) && !is_negative_fixint(MAP_32));
    }

    #[test]
    fn extension_tags() {
        for m in [EXT_8, EXT_16, EXT_32, 0xD4, 0xD5, 0xD6, 0xD7, 0xD8] {
            assert!(is_ext(m), "0x{m:02X}");
        }
        assert!(!is_ext(STR_8));
        assert!(!is_ext(INT_64));
    }
}
