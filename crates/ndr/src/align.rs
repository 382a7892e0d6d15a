//! Alignment arithmetic
//!
//! Every NDR primitive aligns to its own size relative to the start of the
//! stub data. Constructed types align to their largest member, which can
//! differ between the two transfer syntaxes (a structure holding a pointer
//! aligns to 4 in NDR and to 8 in NDR64), so a requested alignment is a pair.

use crate::error::{NdrError, Result};

/// Next position at or after `position` that is a multiple of `alignment`.
///
/// `alignment` must be a power of two; zero and one leave the position as is.
#[inline]
pub fn align_up(position: usize, alignment: usize) -> Result<usize> {
    if alignment <= 1 {
        return Ok(position);
    }
    if !alignment.is_power_of_two() {
        return Err(NdrError::InvalidAlignment(alignment));
    }
    position
        .checked_add(alignment - 1)
        .map(|end| end & !(alignment - 1))
        .ok_or(NdrError::IntegerOverflow)
}

/// Number of padding bytes between `position` and the next multiple of `alignment`.
#[inline]
pub fn align_padding(position: usize, alignment: usize) -> Result<usize> {
    Ok(align_up(position, alignment)? - position)
}

/// Alignment requested by a constructed type, per transfer syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Align {
    pub ndr: usize,
    pub ndr64: usize,
}

impl Align {
    /// Alignment of structures carrying pointers, sizes or `__int3264` values.
    pub const POINTER: Align = Align::new(4, 8);

    pub const fn new(ndr: usize, ndr64: usize) -> Self {
        Self { ndr, ndr64 }
    }

    /// Same alignment in both syntaxes
    pub const fn fixed(alignment: usize) -> Self {
        Self::new(alignment, alignment)
    }
}

impl From<usize> for Align {
    fn from(alignment: usize) -> Self {
        Align::fixed(alignment)
    }
}
