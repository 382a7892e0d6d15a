//! GUID / UUID
//!
//! On the wire a GUID is the structure `{ u32 Data1; u16 Data2; u16 Data3;
//! u8 Data4[8]; }`, aligned to 4, with the integer fields in the stream's
//! byte order.

use crate::align::Align;
use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::error::{NdrError, Result};
use crate::marshal::{Marshal, Unmarshal};
use crate::syntax::TransferSyntax;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, PartialOrd, Ord)]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl Guid {
    /// Nil GUID (all zeros)
    pub const NIL: Self = Self::from_fields(0, 0, 0, [0; 8]);

    pub const fn from_fields(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self {
            data1,
            data2,
            data3,
            data4,
        }
    }

    pub fn is_nil(&self) -> bool {
        *self == Self::NIL
    }

    /// Parse "xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx", optionally in braces
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_prefix('{').and_then(|s| s.strip_suffix('}')).unwrap_or(s);
        if s.len() != 36 || !s.is_ascii() {
            return None;
        }
        let parts: Vec<&str> = s.split('-').collect();
        let [p1, p2, p3, p4, p5] = parts.as_slice() else {
            return None;
        };
        if p1.len() != 8 || p2.len() != 4 || p3.len() != 4 || p4.len() != 4 || p5.len() != 12 {
            return None;
        }

        let mut data4 = [0u8; 8];
        let tail = format!("{p4}{p5}");
        for (i, byte) in data4.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&tail[i * 2..i * 2 + 2], 16).ok()?;
        }

        Some(Self {
            data1: u32::from_str_radix(p1, 16).ok()?,
            data2: u16::from_str_radix(p2, 16).ok()?,
            data3: u16::from_str_radix(p3, 16).ok()?,
            data4,
        })
    }

    /// The 16 bytes in little-endian field order
    pub fn to_bytes_le(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[0..4].copy_from_slice(&self.data1.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.data2.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.data3.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.data4);
        bytes
    }

    pub fn from_bytes_le(bytes: [u8; 16]) -> Self {
        let mut data4 = [0u8; 8];
        data4.copy_from_slice(&bytes[8..16]);
        Self {
            data1: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            data2: u16::from_le_bytes([bytes[4], bytes[5]]),
            data3: u16::from_le_bytes([bytes[6], bytes[7]]),
            data4,
        }
    }
}

impl FromStr for Guid {
    type Err = NdrError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| NdrError::InvalidString(format!("malformed GUID: {s}")))
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.data4;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.data1, self.data2, self.data3, d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]
        )
    }
}

impl Marshal for Guid {
    fn marshal<'a, B: WriteBuffer, S: TransferSyntax>(&'a self, w: &mut Encoder<'a, B, S>) -> Result<()> {
        w.write_align(Align::fixed(4))?;
        w.write_data(self.data1)?;
        w.write_data(self.data2)?;
        w.write_data(self.data3)?;
        w.write_bytes(&self.data4)
    }
}

impl Unmarshal for Guid {
    fn unmarshal<'a, B: ReadBuffer, S: TransferSyntax>(&'a mut self, r: &mut Decoder<'a, B, S>) -> Result<()> {
        r.read_align(Align::fixed(4))?;
        self.data1 = r.read_data()?;
        self.data2 = r.read_data()?;
        self.data3 = r.read_data()?;
        self.data4.copy_from_slice(&r.read_bytes(8)?);
        Ok(())
    }
}
