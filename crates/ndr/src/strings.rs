//! NDR string helpers
//!
//! Strings are conformant varying arrays of 8-bit or 16-bit code units.
//!
//! Wire format:
//! ```text
//! max_count    # size field, code units including any terminator
//! offset       # size field, always 0
//! actual_count # size field, code units transmitted
//! units[actual_count]
//! ```
//!
//! The `_n_` variants are `[string]` data: a zero code unit is appended on
//! encode, counted in both counts, and stripped on decode. The plain
//! variants transmit exactly the given units.

use crate::align::Align;
use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::error::Result;
use crate::marshal::{Marshal, Unmarshal};
use crate::syntax::TransferSyntax;
use bytes::{BufMut, BytesMut};

/// Padding character generated code trims from fixed-size string buffers
pub const ZERO_STRING: &str = "\0";

/// Code units of an 8-bit `[string]`, terminator included
pub fn char_n_len(s: &str) -> usize {
    s.len() + 1
}

/// UTF-16 code units of `s`; supplementary-plane characters count twice
pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// UTF-16 code units of a `[string]`, terminator included
pub fn utf16_n_len(s: &str) -> usize {
    utf16_len(s) + 1
}

/// UTF-16 code units of a `REG_MULTI_SZ` block: every string terminated,
/// plus the final empty string.
pub fn multi_sz_len<S: AsRef<str>>(strings: &[S]) -> usize {
    strings.iter().map(|s| utf16_n_len(s.as_ref())).sum::<usize>() + 1
}

fn strip_terminator<T: Copy + Default + PartialEq>(units: &mut Vec<T>) {
    if units.last() == Some(&T::default()) {
        units.pop();
    }
}

impl<'a, B: WriteBuffer, S: TransferSyntax> Encoder<'a, B, S> {
    fn write_units8(&mut self, units: &[u8], terminated: bool) -> Result<()> {
        let count = units.len() + usize::from(terminated);
        self.write_conformant_varying(count, count)?;
        self.write_bytes(units)?;
        if terminated {
            self.write_data(0u8)?;
        }
        Ok(())
    }

    fn write_units16(&mut self, s: &str, terminated: bool) -> Result<()> {
        let count = utf16_len(s) + usize::from(terminated);
        self.write_conformant_varying(count, count)?;
        let order = self.data_representation().byte_order();
        let mut data = BytesMut::with_capacity(count * 2);
        for unit in s.encode_utf16() {
            order.put_u16(&mut data, unit);
        }
        if terminated {
            data.put_u16(0);
        }
        self.write_align(Align::fixed(2))?;
        self.write_bytes(&data)
    }

    /// Write a null-terminated 8-bit string
    pub fn write_char_n_string(&mut self, s: &str) -> Result<()> {
        self.write_units8(s.as_bytes(), true)
    }

    /// Write an 8-bit string without terminator
    pub fn write_char_string(&mut self, s: &str) -> Result<()> {
        self.write_units8(s.as_bytes(), false)
    }

    /// Write a null-terminated UTF-16 string
    pub fn write_utf16_n_string(&mut self, s: &str) -> Result<()> {
        self.write_units16(s, true)
    }

    /// Write a UTF-16 string without terminator
    pub fn write_utf16_string(&mut self, s: &str) -> Result<()> {
        self.write_units16(s, false)
    }
}

impl<'a, B: ReadBuffer, S: TransferSyntax> Decoder<'a, B, S> {
    fn read_units8(&mut self, terminated: bool) -> Result<String> {
        let (_, actual_count) = self.read_conformant_varying()?;
        self.check_allocation::<u8>(actual_count, 1)?;
        let mut units = self.read_bytes(actual_count)?.to_vec();
        if terminated {
            strip_terminator(&mut units);
        }
        Ok(String::from_utf8(units)?)
    }

    fn read_units16(&mut self, terminated: bool) -> Result<String> {
        let (_, actual_count) = self.read_conformant_varying()?;
        self.check_allocation::<u16>(actual_count, 2)?;
        self.read_align(Align::fixed(2))?;
        let order = self.data_representation().byte_order();
        let mut data = self.read_bytes(actual_count * 2)?;
        let mut units: Vec<u16> = (0..actual_count).map(|_| order.get_u16(&mut data)).collect();
        if terminated {
            strip_terminator(&mut units);
        }
        Ok(char::decode_utf16(units).collect::<std::result::Result<String, _>>()?)
    }

    /// Read a null-terminated 8-bit string
    pub fn read_char_n_string(&mut self) -> Result<String> {
        self.read_units8(true)
    }

    /// Read an 8-bit string without terminator
    pub fn read_char_string(&mut self) -> Result<String> {
        self.read_units8(false)
    }

    /// Read a null-terminated UTF-16 string
    pub fn read_utf16_n_string(&mut self) -> Result<String> {
        self.read_units16(true)
    }

    /// Read a UTF-16 string without terminator
    pub fn read_utf16_string(&mut self) -> Result<String> {
        self.read_units16(false)
    }
}

/// 8-bit `[string] char*`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NdrString(pub String);

impl NdrString {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for NdrString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NdrString {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for NdrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Marshal for NdrString {
    fn marshal<'a, B: WriteBuffer, S: TransferSyntax>(&'a self, w: &mut Encoder<'a, B, S>) -> Result<()> {
        w.write_char_n_string(&self.0)
    }
}

impl Unmarshal for NdrString {
    fn unmarshal<'a, B: ReadBuffer, S: TransferSyntax>(&'a mut self, r: &mut Decoder<'a, B, S>) -> Result<()> {
        self.0 = r.read_char_n_string()?;
        Ok(())
    }
}

/// UTF-16 `[string] wchar_t*`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NdrWString(pub String);

impl NdrWString {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for NdrWString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NdrWString {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for NdrWString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Marshal for NdrWString {
    fn marshal<'a, B: WriteBuffer, S: TransferSyntax>(&'a self, w: &mut Encoder<'a, B, S>) -> Result<()> {
        w.write_utf16_n_string(&self.0)
    }
}

impl Unmarshal for NdrWString {
    fn unmarshal<'a, B: ReadBuffer, S: TransferSyntax>(&'a mut self, r: &mut Decoder<'a, B, S>) -> Result<()> {
        self.0 = r.read_utf16_n_string()?;
        Ok(())
    }
}
