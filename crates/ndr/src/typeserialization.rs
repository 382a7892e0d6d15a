//! Type serialization version 1
//!
//! Standalone encoding of a single top-level type (`[encode, decode]`
//! attributes, pickling). The payload is framed by two 8-byte headers:
//!
//! ```text
//! common header:   version=1 | endianness | header_length=8 (u16 LE) | filler 0xcccccccc
//! private header:  object_buffer_length (u32) | filler 0 (u32)
//! payload:         NDR stream padded to a multiple of 8
//! ```
//!
//! Endianness is 0x10 for little-endian and 0x00 for big-endian; the
//! private header and the payload use that byte order.

use crate::align::align_up;
use crate::config::NdrConfig;
use crate::decode::decode_into;
use crate::drep::ByteOrder;
use crate::encode::encode;
use crate::error::{NdrError, Result};
use crate::marshal::{Marshal, Unmarshal};
use crate::syntax::TransferSyntax;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::debug;

pub const TYPE_SERIALIZATION_VERSION: u8 = 1;
pub const COMMON_HEADER_LENGTH: usize = 8;
pub const PRIVATE_HEADER_LENGTH: usize = 8;
pub const HEADER_FILLER: u32 = 0xcccc_cccc;

const LITTLE_ENDIAN: u8 = 0x10;
const BIG_ENDIAN: u8 = 0x00;

/// The headers preceding a serialized type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeHeader {
    pub byte_order: ByteOrder,
    /// Payload length including its padding
    pub object_buffer_length: u32,
}

impl TypeHeader {
    pub const SIZE: usize = COMMON_HEADER_LENGTH + PRIVATE_HEADER_LENGTH;

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(TYPE_SERIALIZATION_VERSION);
        buf.put_u8(match self.byte_order {
            ByteOrder::LittleEndian => LITTLE_ENDIAN,
            ByteOrder::BigEndian => BIG_ENDIAN,
        });
        buf.put_u16_le(COMMON_HEADER_LENGTH as u16);
        buf.put_u32_le(HEADER_FILLER);
        self.byte_order.put_u32(buf, self.object_buffer_length);
        buf.put_u32(0);
    }

    pub fn decode(buf: &mut impl Buf) -> Result<Self> {
        if buf.remaining() < Self::SIZE {
            return Err(NdrError::UnexpectedEof {
                needed: Self::SIZE,
                have: buf.remaining(),
            });
        }
        let version = buf.get_u8();
        if version != TYPE_SERIALIZATION_VERSION {
            return Err(NdrError::InvalidHeader(format!("unsupported version {version}")));
        }
        let byte_order = match buf.get_u8() {
            LITTLE_ENDIAN => ByteOrder::LittleEndian,
            BIG_ENDIAN => ByteOrder::BigEndian,
            other => return Err(NdrError::InvalidHeader(format!("invalid endianness {other:#04x}"))),
        };
        let header_length = buf.get_u16_le();
        if usize::from(header_length) != COMMON_HEADER_LENGTH {
            return Err(NdrError::InvalidHeader(format!("invalid header length {header_length}")));
        }
        buf.advance(4);
        let object_buffer_length = byte_order.get_u32(buf);
        buf.advance(4);
        Ok(Self {
            byte_order,
            object_buffer_length,
        })
    }
}

/// Serialize `value` with both headers; byte order comes from `config.drep`.
pub fn encode_type<S, T>(value: &T, config: &NdrConfig) -> Result<Bytes>
where
    S: TransferSyntax,
    T: Marshal + ?Sized,
{
    let payload = encode::<S, T>(value, config)?;
    let padded = align_up(payload.len(), 8)?;
    let header = TypeHeader {
        byte_order: config.drep.byte_order(),
        object_buffer_length: u32::try_from(padded).map_err(|_| NdrError::IntegerOverflow)?,
    };

    let mut buf = BytesMut::with_capacity(TypeHeader::SIZE + padded);
    header.encode(&mut buf);
    buf.put_slice(&payload);
    buf.put_bytes(0, padded - payload.len());
    debug!(syntax = S::NAME, len = buf.len(), "serialized type");
    Ok(buf.freeze())
}

/// Deserialize into an existing target.
///
/// The payload is decoded in the byte order the header names; everything
/// else about the data representation comes from `config.drep`.
pub fn decode_type_into<S, T>(data: impl Into<Bytes>, target: &mut T, config: &NdrConfig) -> Result<()>
where
    S: TransferSyntax,
    T: Unmarshal + ?Sized,
{
    let mut data: Bytes = data.into();
    let header = TypeHeader::decode(&mut data)?;
    let length = header.object_buffer_length as usize;
    if length > data.len() {
        return Err(NdrError::UnexpectedEof {
            needed: length,
            have: data.len(),
        });
    }
    debug!(syntax = S::NAME, len = length, byte_order = ?header.byte_order, "deserializing type");
    let config = config.clone().with_drep(config.drep.with_byte_order(header.byte_order));
    decode_into::<S, T>(data.split_to(length), target, &config)
}

/// Deserialize into a new value
pub fn decode_type<S, T>(data: impl Into<Bytes>, config: &NdrConfig) -> Result<T>
where
    S: TransferSyntax,
    T: Unmarshal + Default,
{
    let mut value = T::default();
    decode_type_into::<S, T>(data, &mut value, config)?;
    Ok(value)
}
