//! NDR encoder
//!
//! The [`Encoder`] writes primitives, size headers, switches and referent
//! identifiers in place and queues pointer referents until the immediate
//! part of the enclosing construct is complete. Every operation checks the
//! sticky error first: once an operation fails, the same error comes back
//! from every later call and nothing more is written.

use crate::align::Align;
use crate::buffer::{WriteBuffer, WriteChunk};
use crate::config::{Direction, NdrConfig, PayloadEvent, PayloadHook};
use crate::drep::DataRepresentation;
use crate::error::{NdrError, Result};
use crate::marshal::Marshal;
use crate::primitives::{Primitive, Uint3264};
use crate::syntax::TransferSyntax;
use bytes::Bytes;
use std::collections::{HashMap, HashSet, VecDeque};
use std::marker::PhantomData;
use std::mem;
use tracing::{debug, trace, warn};

type DeferredWrite<'a, B, S> = Box<dyn FnOnce(&mut Encoder<'a, B, S>) -> Result<()> + 'a>;

/// Referent identity for full pointers: address plus type, since a
/// structure and its first member share an address.
type ReferentKey = (usize, &'static str);

pub struct Encoder<'a, B, S> {
    buf: B,
    config: NdrConfig,
    error: Option<NdrError>,
    deferred: Vec<DeferredWrite<'a, B, S>>,
    referents: HashMap<ReferentKey, u64>,
    /// Full pointer identifiers whose referent has been written
    written: HashSet<u64>,
    _syntax: PhantomData<S>,
}

impl<'a, B: WriteBuffer, S: TransferSyntax> Encoder<'a, B, S> {
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
            written: HashSet::new(),
            _syntax: PhantomData,
        }
    }

    pub fn config(&self) -> &NdrConfig {
        &self.config
    }

    pub fn position(&self) -> usize {
        self.buf.position()
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
                warn!(syntax = S::NAME, position = self.buf.position(), error = %err, "NDR encode failed");
                self.error = Some(err.clone());
                err
            }
        }
    }

    fn put<T: Primitive>(&mut self, value: T) -> Result<()> {
        let size = T::wire_size::<S>();
        self.buf.fill_to_alignment(size)?;
        let mut scratch = [0u8; 8];
        let mut dst = &mut scratch[..size];
        value.put::<S, _>(self.buf.data_representation(), &mut dst)?;
        self.buf.write(&scratch[..size])
    }

    fn put_pointer_id(&mut self, id: u64) -> Result<()> {
        if S::POINTER_WIDTH == 8 {
            self.put(id)
        } else {
            let id = u32::try_from(id).map_err(|_| NdrError::IntegerOverflow)?;
            self.put(id)
        }
    }

    /// Align for an identifier and write a fresh one: position plus one.
    fn put_referent_id(&mut self) -> Result<u64> {
        self.buf.fill_to_alignment(S::POINTER_WIDTH)?;
        let id = self.buf.position() as u64 + 1;
        self.put_pointer_id(id)?;
        Ok(id)
    }

    /// Write a primitive at its natural alignment
    pub fn write_data<T: Primitive>(&mut self, value: T) -> Result<()> {
        self.guard(|w| w.put(value))
    }

    /// Write raw bytes with no alignment
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.guard(|w| w.buf.write(data))
    }

    /// Write a conformance or variance field: 32 bits in NDR, 64 in NDR64
    pub fn write_size(&mut self, count: usize) -> Result<()> {
        self.guard(|w| w.put(Uint3264(count as u64)))
    }

    /// Write the three-field header of a conformant varying array
    pub fn write_conformant_varying(&mut self, max_count: usize, actual_count: usize) -> Result<()> {
        self.guard(|w| {
            if actual_count > max_count {
                return Err(NdrError::ConformanceMismatch {
                    max_count: max_count as u64,
                    offset: 0,
                    actual_count: actual_count as u64,
                });
            }
            w.put(Uint3264(max_count as u64))?;
            w.put(Uint3264(0))?;
            w.put(Uint3264(actual_count as u64))
        })
    }

    /// Write the discriminant of a non-encapsulated union
    ///
    /// The tag is written as the primitive the union's switch type names;
    /// enum-typed switches go through [`Encoder::write_enum`].
    pub fn write_switch<T: Primitive>(&mut self, tag: T) -> Result<()> {
        self.write_data(tag)
    }

    /// Write an enumeration: 16 bits in NDR, 32 bits in NDR64
    pub fn write_enum(&mut self, value: i32) -> Result<()> {
        self.guard(|w| {
            if S::ENUM_WIDTH == 2 {
                let narrow = i16::try_from(value).map_err(|_| NdrError::InvalidEnum(i64::from(value)))?;
                w.put(narrow)
            } else {
                w.put(value)
            }
        })
    }

    /// Pad to the alignment of a constructed type
    pub fn write_align(&mut self, alignment: impl Into<Align>) -> Result<()> {
        let alignment = S::align(alignment.into());
        self.guard(|w| w.buf.fill_to_alignment(alignment).map(drop))
    }

    /// Align a union body; only NDR64 aligns unions to their largest arm.
    pub fn write_union_align(&mut self, alignment: impl Into<Align>) -> Result<()> {
        if S::PADS_CONSTRUCTED {
            self.write_align(alignment)
        } else {
            self.guard(|_| Ok(()))
        }
    }

    /// Pad a structure out to its alignment; NDR64 only.
    pub fn write_trailing_gap(&mut self, alignment: impl Into<Align>) -> Result<()> {
        self.write_union_align(alignment)
    }

    /// Write a pointer whose referent is produced by `referent`.
    ///
    /// A present pointer is written as a fresh non-zero identifier and
    /// `referent` is queued until [`Encoder::flush_deferred_writes`]; an
    /// absent one is written as zero. In opaque mode nothing is written for
    /// the pointer and a present referent is written immediately.
    pub fn write_pointer_with<F>(&mut self, present: bool, referent: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()> + 'a,
    {
        self.guard(|w| {
            if w.config.opaque {
                return if present { referent(w) } else { Ok(()) };
            }
            if !present {
                return w.put_pointer_id(0);
            }
            let id = w.put_referent_id()?;
            trace!(id, "referent deferred");
            w.deferred.push(Box::new(referent));
            Ok(())
        })
    }

    /// Write a `[unique]` pointer
    pub fn write_pointer<T: Marshal + ?Sized>(&mut self, value: Option<&'a T>) -> Result<()> {
        match value {
            Some(value) => self.write_pointer_with(true, move |w| value.marshal(w)),
            None => self.write_pointer_with(false, |_| Ok(())),
        }
    }

    /// Write an embedded `[ref]` pointer: always a non-zero identifier
    pub fn write_ref_pointer<T: Marshal + ?Sized>(&mut self, value: &'a T) -> Result<()> {
        self.write_pointer_with(true, move |w| value.marshal(w))
    }

    /// Write a `[ptr]` (full) pointer
    ///
    /// In NDR, pointers to the same referent share its identifier and the
    /// referent is written once, by whichever occurrence is flushed first.
    /// NDR64 treats every occurrence separately.
    pub fn write_full_pointer<T: Marshal + ?Sized>(&mut self, value: Option<&'a T>) -> Result<()> {
        let Some(value) = value else {
            return self.write_pointer_with(false, |_| Ok(()));
        };
        if !S::ALIASES_FULL_POINTERS || self.config.opaque {
            return self.write_pointer_with(true, move |w| value.marshal(w));
        }
        let key = ((value as *const T).cast::<()>() as usize, std::any::type_name::<T>());
        self.guard(|w| {
            let id = match w.referents.get(&key) {
                Some(&id) => {
                    trace!(id, "full pointer aliased");
                    w.put_pointer_id(id)?;
                    id
                }
                None => {
                    let id = w.put_referent_id()?;
                    w.referents.insert(key, id);
                    trace!(id, "referent deferred");
                    id
                }
            };
            w.deferred.push(Box::new(move |w| {
                if !w.written.insert(id) {
                    return Ok(());
                }
                value.marshal(w)
            }));
            Ok(())
        })
    }

    /// Write every queued referent.
    ///
    /// Referents queued while writing a referent are written right after it,
    /// before its next sibling.
    pub fn flush_deferred_writes(&mut self) -> Result<()> {
        self.guard(|w| {
            let mut levels: Vec<VecDeque<DeferredWrite<'a, B, S>>> = vec![mem::take(&mut w.deferred).into()];
            while let Some(level) = levels.last_mut() {
                let Some(job) = level.pop_front() else {
                    levels.pop();
                    continue;
                };
                job(w)?;
                if !w.deferred.is_empty() {
                    levels.push(mem::take(&mut w.deferred).into());
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
        self.guard(|w| {
            let hooks = w.config.hooks.clone();
            w.run_hook(hooks.before_prepare_payload.as_ref())?;
            payload(w)?;
            w.run_hook(hooks.after_prepare_payload.as_ref())
        })
    }

    fn run_hook(&self, hook: Option<&PayloadHook>) -> Result<()> {
        match hook {
            Some(hook) => hook(&PayloadEvent {
                direction: Direction::Encode,
                syntax: S::NAME,
                position: self.buf.position(),
                drep: self.buf.data_representation(),
            }),
            None => Ok(()),
        }
    }

    /// Write all queued referents and hand back the buffer
    pub fn finish(mut self) -> Result<B> {
        self.flush_deferred_writes()?;
        Ok(self.buf)
    }
}

/// Encode `value` into `buf`, including its deferred referents
pub fn encode_into<S, T, B>(value: &T, buf: B, config: &NdrConfig) -> Result<B>
where
    S: TransferSyntax,
    T: Marshal + ?Sized,
    B: WriteBuffer,
{
    let start = buf.position();
    let mut w = Encoder::<B, S>::with_config(buf, config.clone());
    w.prepare_payload(move |w| {
        value.marshal(w)?;
        w.flush_deferred_writes()
    })?;
    let buf = w.finish()?;
    debug!(syntax = S::NAME, len = buf.position() - start, "encoded NDR payload");
    Ok(buf)
}

/// Encode `value` into a fresh buffer
pub fn encode<S, T>(value: &T, config: &NdrConfig) -> Result<Bytes>
where
    S: TransferSyntax,
    T: Marshal + ?Sized,
{
    let chunk = encode_into::<S, T, _>(value, WriteChunk::new(config.drep), config)?;
    Ok(chunk.into_bytes())
}
