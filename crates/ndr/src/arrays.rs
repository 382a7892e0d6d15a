//! NDR array types
//!
//! Fixed arrays (`[T; N]`) carry no header and are handled in
//! [`crate::marshal`]. The types here carry their sizes on the wire:
//!
//! - Conformant arrays: `max_count` size field, then the elements
//! - Conformant varying arrays: `max_count`, `offset` and `actual_count`,
//!   then `actual_count` elements
//!
//! Size fields are 32 bits in NDR and 64 bits in NDR64. Element referents
//! are deferred like any other pointer and follow the whole array.

use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::error::Result;
use crate::marshal::{Marshal, Unmarshal};
use crate::syntax::TransferSyntax;

/// Conformant array - size determined at runtime
///
/// Wire format:
/// ```text
/// max_count           # size field
/// elements[max_count]
/// ```
///
/// A structure ending in a conformant array carries `max_count` at its
/// start; such structures write the size themselves and use
/// [`ConformantArray::marshal_elements`] / [`ConformantArray::unmarshal_elements`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConformantArray<T> {
    pub elements: Vec<T>,
}

impl<T> ConformantArray<T> {
    pub fn new(elements: Vec<T>) -> Self {
        Self { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn into_inner(self) -> Vec<T> {
        self.elements
    }
}

impl<T> From<Vec<T>> for ConformantArray<T> {
    fn from(elements: Vec<T>) -> Self {
        Self { elements }
    }
}

impl<T: Marshal> ConformantArray<T> {
    /// Write the elements only; the size was written by the enclosing structure
    pub fn marshal_elements<'a, B: WriteBuffer, S: TransferSyntax>(&'a self, w: &mut Encoder<'a, B, S>) -> Result<()> {
        for elem in &self.elements {
            elem.marshal(w)?;
        }
        Ok(())
    }
}

impl<T: Unmarshal + Default> ConformantArray<T> {
    /// Read `max_count` elements whose size was read by the enclosing structure
    pub fn unmarshal_elements<'a, B: ReadBuffer, S: TransferSyntax>(
        &'a mut self,
        r: &mut Decoder<'a, B, S>,
        max_count: usize,
    ) -> Result<()> {
        r.check_allocation::<T>(max_count, 1)?;
        self.elements.clear();
        self.elements.resize_with(max_count, T::default);
        for elem in &mut self.elements {
            elem.unmarshal(r)?;
        }
        Ok(())
    }
}

impl<T: Marshal> Marshal for ConformantArray<T> {
    fn marshal<'a, B: WriteBuffer, S: TransferSyntax>(&'a self, w: &mut Encoder<'a, B, S>) -> Result<()> {
        w.write_size(self.elements.len())?;
        self.marshal_elements(w)
    }
}

impl<T: Unmarshal + Default> Unmarshal for ConformantArray<T> {
    fn unmarshal<'a, B: ReadBuffer, S: TransferSyntax>(&'a mut self, r: &mut Decoder<'a, B, S>) -> Result<()> {
        let max_count = r.read_size()?;
        self.unmarshal_elements(r, max_count)
    }
}

/// Conformant varying array - size and subset determined at runtime
///
/// Wire format:
/// ```text
/// max_count              # size field
/// offset                 # size field, always 0
/// actual_count           # size field
/// elements[actual_count]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConformantVaryingArray<T> {
    pub max_count: usize,
    pub elements: Vec<T>,
}

impl<T> ConformantVaryingArray<T> {
    pub fn new(elements: Vec<T>) -> Self {
        Self {
            max_count: elements.len(),
            elements,
        }
    }

    /// Transmit `elements` out of a buffer of `max_count` elements
    pub fn with_max(max_count: usize, elements: Vec<T>) -> Self {
        Self { max_count, elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl<T: Marshal> Marshal for ConformantVaryingArray<T> {
    fn marshal<'a, B: WriteBuffer, S: TransferSyntax>(&'a self, w: &mut Encoder<'a, B, S>) -> Result<()> {
        w.write_conformant_varying(self.max_count, self.elements.len())?;
        for elem in &self.elements {
            elem.marshal(w)?;
        }
        Ok(())
    }
}

impl<T: Unmarshal + Default> Unmarshal for ConformantVaryingArray<T> {
    fn unmarshal<'a, B: ReadBuffer, S: TransferSyntax>(&'a mut self, r: &mut Decoder<'a, B, S>) -> Result<()> {
        let (max_count, actual_count) = r.read_conformant_varying()?;
        r.check_allocation::<T>(actual_count, 1)?;
        self.max_count = max_count;
        self.elements.clear();
        self.elements.resize_with(actual_count, T::default);
        for elem in &mut self.elements {
            elem.unmarshal(r)?;
        }
        Ok(())
    }
}
