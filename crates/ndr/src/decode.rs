//! NDR decoder
//!
//! Decoding fills targets in place. Pointer targets stay borrowed by the
//! [`Decoder`] until the deferred referents are read, which happens when
//! [`Decoder::drain_deferred_reads`] runs after the immediate part of the
//! enclosing construct.
//!
//! Full pointers in NDR are resolved through a map from referent identifier
//! to the decoded value, shared by nested referents at every depth. The
//! occurrence whose deferred read runs first decodes the referent; every
//! other occurrence shares it, whether it was queued before or after.
//! A referent that reaches itself while it is still being decoded is
//! rejected.

use crate::align::Align;
use crate::buffer::{ReadBuffer, ReadChunk};
use crate::config::{Direction, NdrConfig, PayloadEvent, PayloadHook};
use crate::drep::DataRepresentation;
use crate::error::{NdrError, Result};
use crate::marshal::Unmarshal;
use crate::primitives::{Primitive, Uint3264};
use crate::syntax::TransferSyntax;
use bytes::Bytes;
use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::marker::PhantomData;
use std::mem;
use std::rc::Rc;
use tracing::{debug, trace, warn};

type DeferredRead<'a, B, S> = Box<dyn FnOnce(&mut Decoder<'a, B, S>) -> Result<()> + 'a>;

enum Referent {
    /// Content is being read by an enclosing deferred read
    Decoding,
    Resolved(Rc<dyn Any>),
}

pub struct Decoder<'a, B, S> {
    buf: B,
    config: NdrConfig,
    error: Option<NdrError>,
    deferred: Vec<DeferredRead<'a, B, S>>,
    referents: HashMap<u64, Referent>,
    _syntax: PhantomData<S>,
}

impl<'a, B: ReadBuffer, S: TransferSyntax> Decoder<'a, B, S> {
    pub fn new(buf: B) -> Self {
        Self::with_config(buf, NdrConfig::default())
    }

    pub fn with_config(buf: B, config: NdrConfig) -> Self {
        Self {
            buf,
            config,
            error: None,
            deferred: Vec::new(),
            referents: HashMap::new(),
            _syntax: PhantomData,
        }
    }

    pub fn config(&self) -> &NdrConfig {
        &self.config
    }

    pub fn position(&self) -> usize {
        self.buf.position()
    }

    pub fn remaining_len(&self) -> usize {
        self.buf.remaining_len()
    }

    pub fn data_representation(&self) -> DataRepresentation {
        self.buf.data_representation()
    }

    pub fn is_opaque(&self) -> bool {
        self.config.opaque
    }

    /// The sticky error, if an operation has failed
    pub fn error(&self) -> Option<&NdrError> {
        self.error.as_ref()
    }

    pub fn get_ref(&self) -> &B {
        &self.buf
    }

    fn guard<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        op(self).map_err(|err| self.latch(err))
    }

    fn latch(&mut self, err: NdrError) -> NdrError {
        match &self.error {
            Some(first) => first.clone(),
            None => {
                warn!(syntax = S::NAME, position = self.buf.position(), error = %err, "NDR decode failed");
                self.error = Some(err.clone());
                err
            }
        }
    }

    fn get<T: Primitive>(&mut self) -> Result<T> {
        let size = T::wire_size::<S>();
        self.buf.skip_to_alignment(size)?;
        let mut scratch = [0u8; 8];
        self.buf.read_exact(&mut scratch[..size])?;
        let mut src = &scratch[..size];
        T::get::<S, _>(self.buf.data_representation(), &mut src)
    }

    fn get_size(&mut self) -> Result<usize> {
        let Uint3264(count) = self.get()?;
        usize::try_from(count).map_err(|_| NdrError::IntegerOverflow)
    }

    fn get_pointer_id(&mut self) -> Result<u64> {
        if S::POINTER_WIDTH == 8 {
            self.get::<u64>()
        } else {
            self.get::<u32>().map(u64::from)
        }
    }

    /// Read a primitive at its natural alignment
    pub fn read_data<T: Primitive>(&mut self) -> Result<T> {
        self.guard(|r| r.get())
    }

    /// Read exactly `n` raw bytes with no alignment
    pub fn read_bytes(&mut self, n: usize) -> Result<Bytes> {
        self.guard(|r| r.buf.read(n))
    }

    /// Read a conformance or variance field
    pub fn read_size(&mut self) -> Result<usize> {
        self.guard(|r| r.get_size())
    }

    /// Read the three-field header of a conformant varying array.
    ///
    /// Returns `(max_count, actual_count)`. A non-zero offset or an actual
    /// count above the maximum is a `ConformanceMismatch`.
    pub fn read_conformant_varying(&mut self) -> Result<(usize, usize)> {
        self.guard(|r| {
            let max_count = r.get_size()?;
            let offset = r.get_size()?;
            let actual_count = r.get_size()?;
            if offset != 0 || actual_count > max_count {
                return Err(NdrError::ConformanceMismatch {
                    max_count: max_count as u64,
                    offset: offset as u64,
                    actual_count: actual_count as u64,
                });
            }
            Ok((max_count, actual_count))
        })
    }

    /// Read the discriminant of a non-encapsulated union
    pub fn read_switch<T: Primitive>(&mut self) -> Result<T> {
        self.read_data()
    }

    /// Read an enumeration: 16 bits in NDR, 32 bits in NDR64
    pub fn read_enum(&mut self) -> Result<i32> {
        self.guard(|r| {
            if S::ENUM_WIDTH == 2 {
                r.get::<i16>().map(i32::from)
            } else {
                r.get::<i32>()
            }
        })
    }

    /// Skip the padding before a constructed type
    pub fn read_align(&mut self, alignment: impl Into<Align>) -> Result<()> {
        let alignment = S::align(alignment.into());
        self.guard(|r| r.buf.skip_to_alignment(alignment).map(drop))
    }

    /// Align a union body; only NDR64 aligns unions to their largest arm.
    pub fn read_union_align(&mut self, alignment: impl Into<Align>) -> Result<()> {
        if S::PADS_CONSTRUCTED {
            self.read_align(alignment)
        } else {
            self.guard(|_| Ok(()))
        }
    }

    /// Skip the padding at the end of a structure; NDR64 only.
    pub fn read_trailing_gap(&mut self, alignment: impl Into<Align>) -> Result<()> {
        self.read_union_align(alignment)
    }

    /// Check a decoded element count before allocating for it.
    ///
    /// `wire_size` is the smallest encoding of one element; the memory cost
    /// is counted as `size_of::<T>()` per element.
    pub fn check_allocation<T>(&mut self, count: usize, wire_size: usize) -> Result<()> {
        self.guard(|r| {
            let memory = count
                .checked_mul(mem::size_of::<T>().max(1))
                .ok_or(NdrError::IntegerOverflow)?;
            if memory > r.config.max_allocation {
                return Err(NdrError::AllocationLimitExceeded {
                    requested: memory,
                    limit: r.config.max_allocation,
                });
            }
            let needed = count.checked_mul(wire_size).ok_or(NdrError::IntegerOverflow)?;
            match r.buf.known_remaining() {
                Some(have) if needed > have => Err(NdrError::UnexpectedEof { needed, have }),
                _ => Ok(()),
            }
        })
    }

    /// Read a pointer whose referent is consumed by `referent`.
    ///
    /// Returns whether the pointer was non-null. A non-null referent is
    /// queued until [`Decoder::drain_deferred_reads`]; in opaque mode there
    /// is no identifier and `referent` runs immediately.
    pub fn read_pointer_with<F>(&mut self, referent: F) -> Result<bool>
    where
        F: FnOnce(&mut Self) -> Result<()> + 'a,
    {
        self.guard(|r| {
            if r.config.opaque {
                referent(r)?;
                return Ok(true);
            }
            let id = r.get_pointer_id()?;
            if id == 0 {
                return Ok(false);
            }
            trace!(id, "referent deferred");
            r.deferred.push(Box::new(referent));
            Ok(true)
        })
    }

    /// Read a `[unique]` pointer into `target`
    pub fn read_pointer<T>(&mut self, target: &'a mut Option<T>) -> Result<()>
    where
        T: Unmarshal + Default + 'a,
    {
        self.guard(|r| {
            if r.config.opaque {
                return target.insert(T::default()).unmarshal(r);
            }
            let id = r.get_pointer_id()?;
            if id == 0 {
                *target = None;
                return Ok(());
            }
            trace!(id, "referent deferred");
            r.deferred.push(Box::new(move |r| target.insert(T::default()).unmarshal(r)));
            Ok(())
        })
    }

    /// Read an embedded `[ref]` pointer; a null identifier is an error.
    pub fn read_ref_pointer<T>(&mut self, target: &'a mut T) -> Result<()>
    where
        T: Unmarshal + ?Sized + 'a,
    {
        self.guard(|r| {
            if r.config.opaque {
                return target.unmarshal(r);
            }
            let id = r.get_pointer_id()?;
            if id == 0 {
                return Err(NdrError::NullReference);
            }
            trace!(id, "referent deferred");
            r.deferred.push(Box::new(move |r| target.unmarshal(r)));
            Ok(())
        })
    }

    /// Read a `[ptr]` (full) pointer into `target`
    ///
    /// In NDR, every occurrence of an identifier yields the same shared
    /// value. NDR64 decodes each occurrence separately.
    pub fn read_full_pointer<T>(&mut self, target: &'a mut Option<Rc<T>>) -> Result<()>
    where
        T: Unmarshal + Default + 'static,
    {
        self.guard(|r| {
            if r.config.opaque {
                *target = Some(Rc::new(r.decode_referent::<T>()?));
                return Ok(());
            }
            let id = r.get_pointer_id()?;
            if id == 0 {
                *target = None;
                return Ok(());
            }
            if !S::ALIASES_FULL_POINTERS {
                r.deferred.push(Box::new(move |r| {
                    *target = Some(Rc::new(r.decode_referent::<T>()?));
                    Ok(())
                }));
                return Ok(());
            }
            if let Some(Referent::Resolved(value)) = r.referents.get(&id) {
                trace!(id, "full pointer resolved from map");
                *target = Some(downcast(value.clone(), id)?);
                return Ok(());
            }
            trace!(id, "referent deferred");
            r.deferred.push(Box::new(move |r| {
                *target = Some(r.resolve_full_referent::<T>(id)?);
                Ok(())
            }));
            Ok(())
        })
    }

    /// Decode a referent together with its own referents into a new value.
    fn decode_referent<T: Unmarshal + Default>(&mut self) -> Result<T> {
        let mut value = T::default();
        let buf: &mut dyn ReadBuffer = &mut self.buf;
        let mut nested = Decoder::<&mut dyn ReadBuffer, S> {
            buf,
            config: self.config.clone(),
            error: None,
            deferred: Vec::new(),
            referents: mem::take(&mut self.referents),
            _syntax: PhantomData,
        };
        let result = value
            .unmarshal(&mut nested)
            .and_then(|()| nested.drain_deferred_reads());
        self.referents = mem::take(&mut nested.referents);
        drop(nested);
        result.map(|()| value)
    }

    /// Share the referent behind `id`, decoding it here if no other
    /// occurrence has.
    fn resolve_full_referent<T: Unmarshal + Default + 'static>(&mut self, id: u64) -> Result<Rc<T>> {
        match self.referents.get(&id) {
            Some(Referent::Resolved(value)) => return downcast(value.clone(), id),
            Some(Referent::Decoding) => return Err(NdrError::UnalignedReference(id)),
            None => {}
        }
        self.referents.insert(id, Referent::Decoding);
        let value = Rc::new(self.decode_referent::<T>()?);
        let shared: Rc<dyn Any> = value.clone();
        self.referents.insert(id, Referent::Resolved(shared));
        Ok(value)
    }

    /// Read every queued referent.
    ///
    /// Referents queued while reading a referent are read right after it,
    /// before its next sibling.
    pub fn drain_deferred_reads(&mut self) -> Result<()> {
        self.guard(|r| {
            let mut levels: Vec<VecDeque<DeferredRead<'a, B, S>>> = vec![mem::take(&mut r.deferred).into()];
            while let Some(level) = levels.last_mut() {
                let Some(job) = level.pop_front() else {
                    levels.pop();
                    continue;
                };
                job(r)?;
                if !r.deferred.is_empty() {
                    levels.push(mem::take(&mut r.deferred).into());
                }
            }
            Ok(())
        })
    }

    /// Run `payload` between the configured prepare-payload hooks
    pub fn prepare_payload<F>(&mut self, payload: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.guard(|r| {
            let hooks = r.config.hooks.clone();
            r.run_hook(hooks.before_prepare_payload.as_ref())?;
            payload(r)?;
            r.run_hook(hooks.after_prepare_payload.as_ref())
        })
    }

    fn run_hook(&self, hook: Option<&PayloadHook>) -> Result<()> {
        match hook {
            Some(hook) => hook(&PayloadEvent {
                direction: Direction::Decode,
                syntax: S::NAME,
                position: self.buf.position(),
                drep: self.buf.data_representation(),
            }),
            None => Ok(()),
        }
    }

    /// Read all queued referents and hand back the buffer
    pub fn finish(mut self) -> Result<B> {
        self.drain_deferred_reads()?;
        Ok(self.buf)
    }
}

fn downcast<T: 'static>(value: Rc<dyn Any>, id: u64) -> Result<Rc<T>> {
    value.downcast::<T>().map_err(|_| NdrError::UnalignedReference(id))
}

/// Decode into `target` from `buf`, including deferred referents; returns
/// the buffer positioned after the payload.
pub fn decode_from<S, T, B>(buf: B, target: &mut T, config: &NdrConfig) -> Result<B>
where
    S: TransferSyntax,
    T: Unmarshal + ?Sized,
    B: ReadBuffer,
{
    let start = buf.position();
    let mut r = Decoder::<B, S>::with_config(buf, config.clone());
    r.prepare_payload(move |r| {
        target.unmarshal(r)?;
        r.drain_deferred_reads()
    })?;
    let buf = r.finish()?;
    debug!(syntax = S::NAME, len = buf.position() - start, "decoded NDR payload");
    Ok(buf)
}

/// Decode `data` into an existing target
pub fn decode_into<S, T>(data: impl Into<Bytes>, target: &mut T, config: &NdrConfig) -> Result<()>
where
    S: TransferSyntax,
    T: Unmarshal + ?Sized,
{
    decode_from::<S, T, _>(ReadChunk::new(data, config.drep), target, config).map(drop)
}

/// Decode `data` into a new value
pub fn decode<S, T>(data: impl Into<Bytes>, config: &NdrConfig) -> Result<T>
where
    S: TransferSyntax,
    T: Unmarshal + Default,
{
    let mut value = T::default();
    decode_into::<S, T>(data, &mut value, config)?;
    Ok(value)
}
