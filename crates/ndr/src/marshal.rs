//! Marshaling traits implemented by generated and hand-written types
//!
//! A type writes its immediate part through the [`Encoder`] and hands its
//! pointers to the encoder's pointer operations, which place the referents
//! in the deferred region. Decoding mirrors this in place: the target is
//! borrowed for as long as the decoder may still fill deferred referents
//! into it.

use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::error::Result;
use crate::primitives::{Int3264, Uint3264};
use crate::syntax::TransferSyntax;

/// Trait for types that can be encoded to NDR format
pub trait Marshal {
    fn marshal<'a, B: WriteBuffer, S: TransferSyntax>(&'a self, w: &mut Encoder<'a, B, S>) -> Result<()>;
}

/// Trait for types that can be decoded from NDR format
pub trait Unmarshal {
    fn unmarshal<'a, B: ReadBuffer, S: TransferSyntax>(&'a mut self, r: &mut Decoder<'a, B, S>) -> Result<()>;
}

macro_rules! primitive_marshal {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Marshal for $ty {
                fn marshal<'a, B: WriteBuffer, S: TransferSyntax>(&'a self, w: &mut Encoder<'a, B, S>) -> Result<()> {
                    w.write_data(*self)
                }
            }

            impl Unmarshal for $ty {
                fn unmarshal<'a, B: ReadBuffer, S: TransferSyntax>(&'a mut self, r: &mut Decoder<'a, B, S>) -> Result<()> {
                    *self = r.read_data()?;
                    Ok(())
                }
            }
        )*
    };
}

primitive_marshal!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64, bool, Uint3264, Int3264);

impl<T: Marshal + ?Sized> Marshal for Box<T> {
    fn marshal<'a, B: WriteBuffer, S: TransferSyntax>(&'a self, w: &mut Encoder<'a, B, S>) -> Result<()> {
        (**self).marshal(w)
    }
}

impl<T: Unmarshal + ?Sized> Unmarshal for Box<T> {
    fn unmarshal<'a, B: ReadBuffer, S: TransferSyntax>(&'a mut self, r: &mut Decoder<'a, B, S>) -> Result<()> {
        (**self).unmarshal(r)
    }
}

impl<T: Marshal + ?Sized> Marshal for &T {
    fn marshal<'a, B: WriteBuffer, S: TransferSyntax>(&'a self, w: &mut Encoder<'a, B, S>) -> Result<()> {
        (**self).marshal(w)
    }
}

/// Fixed arrays: elements back to back, aligned as the element
impl<T: Marshal, const N: usize> Marshal for [T; N] {
    fn marshal<'a, B: WriteBuffer, S: TransferSyntax>(&'a self, w: &mut Encoder<'a, B, S>) -> Result<()> {
        for item in self.iter() {
            item.marshal(w)?;
        }
        Ok(())
    }
}

impl<T: Unmarshal, const N: usize> Unmarshal for [T; N] {
    fn unmarshal<'a, B: ReadBuffer, S: TransferSyntax>(&'a mut self, r: &mut Decoder<'a, B, S>) -> Result<()> {
        for item in self.iter_mut() {
            item.unmarshal(r)?;
        }
        Ok(())
    }
}

