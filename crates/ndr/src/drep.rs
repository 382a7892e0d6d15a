//! Data Representation Format Label
//!
//! The four-byte label carried in every DCE RPC header (and in type
//! serialization headers) that tells the receiver how integers, characters
//! and floating point values are laid out in the stub data.
//!
//! ```text
//! +--------+--------+--------+--------+
//! |int|char| float  |reserved|reserved|
//! +--------+--------+--------+--------+
//! ```
//!
//! For little-endian ASCII IEEE the label is `[0x10, 0x00, 0x00, 0x00]`.

use crate::float::FloatFormat;
use bytes::{Buf, BufMut};
use tracing::warn;

/// Integer byte order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ByteOrder {
    BigEndian = 0,
    #[default]
    LittleEndian = 1,
}

/// Character representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CharSet {
    #[default]
    Ascii = 0,
    Ebcdic = 1,
}

/// Data representation negotiated for one stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DataRepresentation {
    pub byte_order: ByteOrder,
    pub char_set: CharSet,
    pub float_format: FloatFormat,
}

impl DataRepresentation {
    /// Wire size of the label
    pub const SIZE: usize = 4;

    /// NDR default: little-endian, ASCII, IEEE
    pub fn ndr() -> Self {
        Self::default()
    }

    /// Big-endian, ASCII, IEEE
    pub fn big_endian() -> Self {
        Self {
            byte_order: ByteOrder::BigEndian,
            ..Self::default()
        }
    }

    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn with_char_set(mut self, char_set: CharSet) -> Self {
        self.char_set = char_set;
        self
    }

    pub fn with_float_format(mut self, float_format: FloatFormat) -> Self {
        self.float_format = float_format;
        self
    }

    /// Encode to the 4-byte label
    pub fn to_wire(&self) -> [u8; 4] {
        let float = match self.float_format {
            FloatFormat::Ieee => 0,
            FloatFormat::Vax => 1,
            FloatFormat::Cray => 2,
            FloatFormat::Ibm => 3,
        };
        [((self.byte_order as u8) << 4) | self.char_set as u8, float, 0, 0]
    }

    /// Decode from the 4-byte label
    ///
    /// Unrecognized values fall back to the NDR defaults field by field
    /// (little-endian, ASCII, IEEE) instead of failing.
    pub fn from_wire(data: [u8; 4]) -> Self {
        let byte_order = match data[0] >> 4 {
            0 => ByteOrder::BigEndian,
            1 => ByteOrder::LittleEndian,
            other => {
                warn!(value = other, "unknown integer representation, assuming little-endian");
                ByteOrder::LittleEndian
            }
        };
        let char_set = match data[0] & 0x0f {
            0 => CharSet::Ascii,
            1 => CharSet::Ebcdic,
            other => {
                warn!(value = other, "unknown character representation, assuming ASCII");
                CharSet::Ascii
            }
        };
        let float_format = match data[1] {
            0 => FloatFormat::Ieee,
            1 => FloatFormat::Vax,
            2 => FloatFormat::Cray,
            3 => FloatFormat::Ibm,
            other => {
                warn!(value = other, "unknown floating point representation, assuming IEEE");
                FloatFormat::Ieee
            }
        };
        Self {
            byte_order,
            char_set,
            float_format,
        }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn float_format(&self) -> FloatFormat {
        self.float_format
    }

    pub fn char_set(&self) -> CharSet {
        self.char_set
    }

    /// Returns true if using little-endian byte order
    pub fn is_little_endian(&self) -> bool {
        self.byte_order == ByteOrder::LittleEndian
    }
}

impl From<[u8; 4]> for DataRepresentation {
    fn from(data: [u8; 4]) -> Self {
        Self::from_wire(data)
    }
}

impl From<DataRepresentation> for [u8; 4] {
    fn from(drep: DataRepresentation) -> Self {
        drep.to_wire()
    }
}

impl ByteOrder {
    #[inline]
    pub fn put_u16<B: BufMut>(self, buf: &mut B, value: u16) {
        match self {
            ByteOrder::LittleEndian => buf.put_u16_le(value),
            ByteOrder::BigEndian => buf.put_u16(value),
        }
    }

    #[inline]
    pub fn put_u32<B: BufMut>(self, buf: &mut B, value: u32) {
        match self {
            ByteOrder::LittleEndian => buf.put_u32_le(value),
            ByteOrder::BigEndian => buf.put_u32(value),
        }
    }

    #[inline]
    pub fn put_u64<B: BufMut>(self, buf: &mut B, value: u64) {
        match self {
            ByteOrder::LittleEndian => buf.put_u64_le(value),
            ByteOrder::BigEndian => buf.put_u64(value),
        }
    }

    #[inline]
    pub fn get_u16<B: Buf>(self, buf: &mut B) -> u16 {
        match self {
            ByteOrder::LittleEndian => buf.get_u16_le(),
            ByteOrder::BigEndian => buf.get_u16(),
        }
    }

    #[inline]
    pub fn get_u32<B: Buf>(self, buf: &mut B) -> u32 {
        match self {
            ByteOrder::LittleEndian => buf.get_u32_le(),
            ByteOrder::BigEndian => buf.get_u32(),
        }
    }

    #[inline]
    pub fn get_u64<B: Buf>(self, buf: &mut B) -> u64 {
        match self {
            ByteOrder::LittleEndian => buf.get_u64_le(),
            ByteOrder::BigEndian => buf.get_u64(),
        }
    }
}
