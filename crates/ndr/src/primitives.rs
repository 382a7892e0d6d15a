//! NDR primitive types
//!
//! Every primitive aligns to its own wire size. Integers follow the byte
//! order of the stream and floating point values additionally go through
//! the stream's float format.
//!
//! | MIDL Type       | Rust Type  | NDR | NDR64 |
//! |-----------------|------------|-----|-------|
//! | byte/char/small | u8 / i8    | 1   | 1     |
//! | short/wchar_t   | i16 / u16  | 2   | 2     |
//! | long            | i32 / u32  | 4   | 4     |
//! | hyper           | i64 / u64  | 8   | 8     |
//! | float           | f32        | 4   | 4     |
//! | double          | f64        | 8   | 8     |
//! | boolean (BOOL)  | bool       | 4   | 4     |
//! | __int3264       | Int3264    | 4   | 8     |
//! | __uint3264      | Uint3264   | 4   | 8     |

use crate::drep::DataRepresentation;
use crate::error::{NdrError, Result};
use crate::syntax::TransferSyntax;
use bytes::{Buf, BufMut};
use std::fmt::Debug;

/// A value with a fixed wire size that the engine reads and writes directly
///
/// The set is closed: anything else is a constructed type built from these.
pub trait Primitive: Copy + Default + Debug {
    /// Wire size, which is also the alignment
    fn wire_size<S: TransferSyntax>() -> usize;

    fn put<S: TransferSyntax, B: BufMut>(self, drep: DataRepresentation, buf: &mut B) -> Result<()>;

    fn get<S: TransferSyntax, B: Buf>(drep: DataRepresentation, buf: &mut B) -> Result<Self>;
}

impl Primitive for u8 {
    fn wire_size<S: TransferSyntax>() -> usize {
        1
    }

    fn put<S: TransferSyntax, B: BufMut>(self, _drep: DataRepresentation, buf: &mut B) -> Result<()> {
        buf.put_u8(self);
        Ok(())
    }

    fn get<S: TransferSyntax, B: Buf>(_drep: DataRepresentation, buf: &mut B) -> Result<Self> {
        Ok(buf.get_u8())
    }
}

impl Primitive for i8 {
    fn wire_size<S: TransferSyntax>() -> usize {
        1
    }

    fn put<S: TransferSyntax, B: BufMut>(self, _drep: DataRepresentation, buf: &mut B) -> Result<()> {
        buf.put_i8(self);
        Ok(())
    }

    fn get<S: TransferSyntax, B: Buf>(_drep: DataRepresentation, buf: &mut B) -> Result<Self> {
        Ok(buf.get_i8())
    }
}

macro_rules! integer_primitive {
    ($ty:ty, $unsigned:ty, $size:expr, $put:ident, $get:ident) => {
        impl Primitive for $ty {
            #[inline]
            fn wire_size<S: TransferSyntax>() -> usize {
                $size
            }

            #[inline]
            fn put<S: TransferSyntax, B: BufMut>(self, drep: DataRepresentation, buf: &mut B) -> Result<()> {
                drep.byte_order().$put(buf, self as $unsigned);
                Ok(())
            }

            #[inline]
            fn get<S: TransferSyntax, B: Buf>(drep: DataRepresentation, buf: &mut B) -> Result<Self> {
                Ok(drep.byte_order().$get(buf) as $ty)
            }
        }
    };
}

integer_primitive!(u16, u16, 2, put_u16, get_u16);
integer_primitive!(i16, u16, 2, put_u16, get_u16);
integer_primitive!(u32, u32, 4, put_u32, get_u32);
integer_primitive!(i32, u32, 4, put_u32, get_u32);
integer_primitive!(u64, u64, 8, put_u64, get_u64);
integer_primitive!(i64, u64, 8, put_u64, get_u64);

impl Primitive for f32 {
    fn wire_size<S: TransferSyntax>() -> usize {
        4
    }

    fn put<S: TransferSyntax, B: BufMut>(self, drep: DataRepresentation, buf: &mut B) -> Result<()> {
        let bits = drep.float_format().f32_bits(self);
        drep.byte_order().put_u32(buf, bits);
        Ok(())
    }

    fn get<S: TransferSyntax, B: Buf>(drep: DataRepresentation, buf: &mut B) -> Result<Self> {
        let bits = drep.byte_order().get_u32(buf);
        Ok(drep.float_format().f32_from_bits(bits))
    }
}

impl Primitive for f64 {
    fn wire_size<S: TransferSyntax>() -> usize {
        8
    }

    fn put<S: TransferSyntax, B: BufMut>(self, drep: DataRepresentation, buf: &mut B) -> Result<()> {
        let bits = drep.float_format().f64_bits(self);
        drep.byte_order().put_u64(buf, bits);
        Ok(())
    }

    fn get<S: TransferSyntax, B: Buf>(drep: DataRepresentation, buf: &mut B) -> Result<Self> {
        let bits = drep.byte_order().get_u64(buf);
        Ok(drep.float_format().f64_from_bits(bits))
    }
}

/// Booleans travel as a 32-bit 0/1; any non-zero value reads as true.
impl Primitive for bool {
    fn wire_size<S: TransferSyntax>() -> usize {
        4
    }

    fn put<S: TransferSyntax, B: BufMut>(self, drep: DataRepresentation, buf: &mut B) -> Result<()> {
        drep.byte_order().put_u32(buf, u32::from(self));
        Ok(())
    }

    fn get<S: TransferSyntax, B: Buf>(drep: DataRepresentation, buf: &mut B) -> Result<Self> {
        Ok(drep.byte_order().get_u32(buf) != 0)
    }
}

/// `__uint3264`: 32 bits in NDR, 64 bits in NDR64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Uint3264(pub u64);

/// `__int3264`: 32 bits in NDR, 64 bits in NDR64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Int3264(pub i64);

impl Primitive for Uint3264 {
    fn wire_size<S: TransferSyntax>() -> usize {
        S::SIZE_WIDTH
    }

    fn put<S: TransferSyntax, B: BufMut>(self, drep: DataRepresentation, buf: &mut B) -> Result<()> {
        if S::SIZE_WIDTH == 8 {
            drep.byte_order().put_u64(buf, self.0);
        } else {
            let narrow = u32::try_from(self.0).map_err(|_| NdrError::IntegerOverflow)?;
            drep.byte_order().put_u32(buf, narrow);
        }
        Ok(())
    }

    fn get<S: TransferSyntax, B: Buf>(drep: DataRepresentation, buf: &mut B) -> Result<Self> {
        if S::SIZE_WIDTH == 8 {
            Ok(Self(drep.byte_order().get_u64(buf)))
        } else {
            Ok(Self(u64::from(drep.byte_order().get_u32(buf))))
        }
    }
}

impl Primitive for Int3264 {
    fn wire_size<S: TransferSyntax>() -> usize {
        S::SIZE_WIDTH
    }

    fn put<S: TransferSyntax, B: BufMut>(self, drep: DataRepresentation, buf: &mut B) -> Result<()> {
        if S::SIZE_WIDTH == 8 {
            drep.byte_order().put_u64(buf, self.0 as u64);
        } else {
            let narrow = i32::try_from(self.0).map_err(|_| NdrError::IntegerOverflow)?;
            drep.byte_order().put_u32(buf, narrow as u32);
        }
        Ok(())
    }

    fn get<S: TransferSyntax, B: Buf>(drep: DataRepresentation, buf: &mut B) -> Result<Self> {
        if S::SIZE_WIDTH == 8 {
            Ok(Self(drep.byte_order().get_u64(buf) as i64))
        } else {
            Ok(Self(i64::from(drep.byte_order().get_u32(buf) as i32)))
        }
    }
}

/// `handle_t` as transmitted: a 32-bit context id
pub type HandleT = u32;

/// `error_status_t`
pub type ErrorStatusT = u32;
