//! Transfer syntaxes
//!
//! NDR 2.0 and NDR64 share the encoding rules for primitives, pointer
//! deferral and error handling. They differ in a handful of widths and in
//! whether full pointers are deduplicated; those differences are the
//! associated constants below, and the codec engine is generic over them.

use crate::align::Align;
use crate::uuid::Guid;
use std::fmt::Debug;

/// Transfer syntax identifier as negotiated in a bind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyntaxId {
    pub uuid: Guid,
    pub version: u32,
}

pub trait TransferSyntax: Debug + Default + Copy + 'static {
    const NAME: &'static str;

    const ID: SyntaxId;

    /// Width of conformance, variance and `__int3264` fields
    const SIZE_WIDTH: usize;

    /// Width of a referent identifier
    const POINTER_WIDTH: usize;

    /// Width of an enumeration value
    const ENUM_WIDTH: usize;

    /// Whether full pointers to the same referent share one identifier
    const ALIASES_FULL_POINTERS: bool;

    /// Whether unions align to their largest arm and structures pad to
    /// their alignment at the end
    const PADS_CONSTRUCTED: bool;

    /// Resolve a per-syntax alignment request
    fn align(alignment: Align) -> usize;
}

/// Classic NDR (transfer syntax 8a885d04-1ceb-11c9-9fe8-08002b104860 v2)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Ndr20;

impl TransferSyntax for Ndr20 {
    const NAME: &'static str = "NDR";

    const ID: SyntaxId = SyntaxId {
        uuid: Guid::from_fields(
            0x8a885d04,
            0x1ceb,
            0x11c9,
            [0x9f, 0xe8, 0x08, 0x00, 0x2b, 0x10, 0x48, 0x60],
        ),
        version: 2,
    };

    const SIZE_WIDTH: usize = 4;
    const POINTER_WIDTH: usize = 4;
    const ENUM_WIDTH: usize = 2;
    const ALIASES_FULL_POINTERS: bool = true;
    const PADS_CONSTRUCTED: bool = false;

    #[inline]
    fn align(alignment: Align) -> usize {
        alignment.ndr
    }
}

/// NDR64 (transfer syntax 71710533-beba-4937-8319-b5dbef9ccc36 v1)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Ndr64;

impl TransferSyntax for Ndr64 {
    const NAME: &'static str = "NDR64";

    const ID: SyntaxId = SyntaxId {
        uuid: Guid::from_fields(
            0x71710533,
            0xbeba,
            0x4937,
            [0x83, 0x19, 0xb5, 0xdb, 0xef, 0x9c, 0xcc, 0x36],
        ),
        version: 1,
    };

    const SIZE_WIDTH: usize = 8;
    const POINTER_WIDTH: usize = 8;
    const ENUM_WIDTH: usize = 4;
    const ALIASES_FULL_POINTERS: bool = false;
    const PADS_CONSTRUCTED: bool = true;

    #[inline]
    fn align(alignment: Align) -> usize {
        alignment.ndr64
    }
}
