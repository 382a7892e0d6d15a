//! NDR pointer types
//!
//! NDR supports three pointer semantics:
//!
//! - Reference (`[ref]`): never null. Embedded in a construct it is still
//!   carried as a non-zero referent id with the referent deferred.
//! - Unique (`[unique]`): nullable, referent id, no aliasing
//! - Full (`[ptr]`): nullable, referent id, aliasing allowed. Pointers to
//!   the same referent share one id and one copy of the referent, so the
//!   Rust side holds the referent in an [`Rc`].

use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::error::Result;
use crate::marshal::{Marshal, Unmarshal};
use crate::syntax::TransferSyntax;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

/// Trait for NDR pointer types
pub trait NdrPtr {
    type Target;

    /// Check if the pointer is null
    fn is_null(&self) -> bool;

    /// Get the inner value, if any
    fn get(&self) -> Option<&Self::Target>;
}

/// Reference pointer - non-null
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RefPtr<T>(pub T);

impl<T> RefPtr<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for RefPtr<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for RefPtr<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> NdrPtr for RefPtr<T> {
    type Target = T;

    fn is_null(&self) -> bool {
        false
    }

    fn get(&self) -> Option<&T> {
        Some(&self.0)
    }
}

impl<T: Marshal> Marshal for RefPtr<T> {
    fn marshal<'a, B: WriteBuffer, S: TransferSyntax>(&'a self, w: &mut Encoder<'a, B, S>) -> Result<()> {
        w.write_ref_pointer(&self.0)
    }
}

impl<T: Unmarshal> Unmarshal for RefPtr<T> {
    fn unmarshal<'a, B: ReadBuffer, S: TransferSyntax>(&'a mut self, r: &mut Decoder<'a, B, S>) -> Result<()> {
        r.read_ref_pointer(&mut self.0)
    }
}

/// Unique pointer - nullable, no aliasing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniquePtr<T>(pub Option<Box<T>>);

impl<T> UniquePtr<T> {
    pub fn new(value: T) -> Self {
        Self(Some(Box::new(value)))
    }

    pub fn null() -> Self {
        Self(None)
    }

    pub fn from_option(opt: Option<T>) -> Self {
        Self(opt.map(Box::new))
    }

    pub fn into_option(self) -> Option<T> {
        self.0.map(|b| *b)
    }

    pub fn as_mut(&mut self) -> Option<&mut T> {
        self.0.as_deref_mut()
    }
}

impl<T> Default for UniquePtr<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> From<Option<T>> for UniquePtr<T> {
    fn from(opt: Option<T>) -> Self {
        Self::from_option(opt)
    }
}

impl<T> NdrPtr for UniquePtr<T> {
    type Target = T;

    fn is_null(&self) -> bool {
        self.0.is_none()
    }

    fn get(&self) -> Option<&T> {
        self.0.as_deref()
    }
}

impl<T: Marshal> Marshal for UniquePtr<T> {
    fn marshal<'a, B: WriteBuffer, S: TransferSyntax>(&'a self, w: &mut Encoder<'a, B, S>) -> Result<()> {
        w.write_pointer(self.get())
    }
}

impl<T: Unmarshal + Default> Unmarshal for UniquePtr<T> {
    fn unmarshal<'a, B: ReadBuffer, S: TransferSyntax>(&'a mut self, r: &mut Decoder<'a, B, S>) -> Result<()> {
        r.read_pointer(&mut self.0)
    }
}

/// Full pointer - nullable, aliasing allowed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullPtr<T>(pub Option<Rc<T>>);

impl<T> FullPtr<T> {
    pub fn new(value: T) -> Self {
        Self(Some(Rc::new(value)))
    }

    pub fn null() -> Self {
        Self(None)
    }

    /// Another pointer to the same referent
    pub fn alias(&self) -> Self {
        Self(self.0.clone())
    }

    /// Whether both pointers refer to the same referent
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T> Default for FullPtr<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> From<Rc<T>> for FullPtr<T> {
    fn from(value: Rc<T>) -> Self {
        Self(Some(value))
    }
}

impl<T> NdrPtr for FullPtr<T> {
    type Target = T;

    fn is_null(&self) -> bool {
        self.0.is_none()
    }

    fn get(&self) -> Option<&T> {
        self.0.as_deref()
    }
}

impl<T: Marshal> Marshal for FullPtr<T> {
    fn marshal<'a, B: WriteBuffer, S: TransferSyntax>(&'a self, w: &mut Encoder<'a, B, S>) -> Result<()> {
        w.write_full_pointer(self.get())
    }
}

impl<T: Unmarshal + Default + 'static> Unmarshal for FullPtr<T> {
    fn unmarshal<'a, B: ReadBuffer, S: TransferSyntax>(&'a mut self, r: &mut Decoder<'a, B, S>) -> Result<()> {
        r.read_full_pointer(&mut self.0)
    }
}
