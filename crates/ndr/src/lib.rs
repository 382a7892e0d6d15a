//! NDR (Network Data Representation) runtime library
//!
//! Runtime support for generated DCE/RPC and DCOM stubs: the classic NDR
//! transfer syntax and NDR64, selected at compile time through
//! [`TransferSyntax`].
//!
//! # NDR Wire Format
//!
//! - Primitives align to their natural size (1, 2, 4, or 8 bytes) relative
//!   to the start of the stub data
//! - Structures align to their largest member
//! - Size fields, pointer identifiers and `__int3264` are 4 bytes in NDR and
//!   8 bytes in NDR64
//! - Pointer referents are deferred until the immediate part of the
//!   enclosing construct is written
//! - Strings are conformant varying arrays with a null terminator
//!
//! # Example
//!
//! ```
//! use ndr::{decode, encode, Ndr20, NdrConfig, NdrWString};
//!
//! let config = NdrConfig::default();
//! let bytes = encode::<Ndr20, _>(&NdrWString::new("hello"), &config).unwrap();
//! let value: NdrWString = decode::<Ndr20, _>(bytes, &config).unwrap();
//! assert_eq!(value.as_str(), "hello");
//! ```

mod align;
mod arrays;
pub mod buffer;
mod config;
mod decode;
mod drep;
mod encode;
mod error;
pub mod float;
mod marshal;
mod pointers;
mod primitives;
mod strings;
mod syntax;
mod typeserialization;
mod uuid;

pub use align::{align_padding, align_up, Align};
pub use arrays::{ConformantArray, ConformantVaryingArray};
pub use buffer::{ReadBuffer, ReadChunk, WriteBuffer, WriteChunk};
pub use config::{Direction, Hooks, NdrConfig, PayloadEvent, PayloadHook};
pub use decode::{decode, decode_from, decode_into, Decoder};
pub use drep::{ByteOrder, CharSet, DataRepresentation};
pub use encode::{encode, encode_into, Encoder};
pub use error::{NdrError, Result, MAX_NDR_ALLOCATION_SIZE};
pub use float::FloatFormat;
pub use marshal::{Marshal, Unmarshal};
pub use pointers::{FullPtr, NdrPtr, RefPtr, UniquePtr};
pub use primitives::{ErrorStatusT, HandleT, Int3264, Primitive, Uint3264};
pub use strings::{char_n_len, multi_sz_len, utf16_len, utf16_n_len, NdrString, NdrWString, ZERO_STRING};
pub use syntax::{Ndr20, Ndr64, SyntaxId, TransferSyntax};
pub use typeserialization::{decode_type, decode_type_into, encode_type, TypeHeader};
pub use uuid::Guid;

/// Re-export bytes for convenience
pub use bytes::{Buf, BufMut, Bytes, BytesMut};
