//! Standard Message Format (tagged values)
//!
//! Layout satu value:
//! ┌──────────┬──────────────────────────────────────────┐
//! │ tag (u8) │ body (tergantung tag, little-endian)     │
//! └──────────┴──────────────────────────────────────────┘
//!
//! Size prefix untuk string/list/map:
//! - `< 254`      → 1 byte
//! - `<= 0xFFFF`  → byte 254 + u16
//! - lainnya      → byte 255 + u32
//!
//! Tag `>= 128` dicadangkan untuk custom type (lihat `shortcut.rs`).

/// Tipe value dalam standard format
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Null = 0,
    True = 1,
    False = 2,
    Int32 = 3,
    Int64 = 4,
    /// Legacy big integer (hex string). Tidak didukung saat decode.
    LargeInt = 5,
    Float64 = 6,
    String = 7,
    Uint8List = 8,
    Int32List = 9,
    Int64List = 10,
    Float64List = 11,
    List = 12,
    Map = 13,
    Float32List = 14,
}

impl ValueType {
    #[inline(always)]
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Null),
            1 => Some(Self::True),
            2 => Some(Self::False),
            3 => Some(Self::Int32),
            4 => Some(Self::Int64),
            5 => Some(Self::LargeInt),
            6 => Some(Self::Float64),
            7 => Some(Self::String),
            8 => Some(Self::Uint8List),
            9 => Some(Self::Int32List),
            10 => Some(Self::Int64List),
            11 => Some(Self::Float64List),
            12 => Some(Self::List),
            13 => Some(Self::Map),
            14 => Some(Self::Float32List),
            _ => None,
        }
    }
}

/// Tag pertama yang boleh dipakai custom type
pub const FIRST_CUSTOM_TAG: u8 = 128;

/// Marker size 2-byte (u16 menyusul)
pub const SIZE_U16_MARKER: u8 = 254;
/// Marker size 4-byte (u32 menyusul)
pub const SIZE_U32_MARKER: u8 = 255;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_from_u8() {
        for tag in 0u8..=14 {
            let ty = ValueType::from_u8(tag).unwrap();
            assert_eq!(ty as u8, tag);
        }
        assert_eq!(ValueType::from_u8(15), None);
        assert_eq!(ValueType::from_u8(FIRST_CUSTOM_TAG), None);
    }
}
