//! Wire Tests - byte-exact classic NDR fixtures
//!
//! These tests pin the classic NDR encoding of stub-shaped types:
//! - Conformance hoisted ahead of a structure
//! - Enum discriminated unions
//! - Deferred unique and full pointer referents
//! - Big-endian and VAX data representations

mod common;

use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::*;
use ndr::{
    decode, decode_into, encode, Align, ByteOrder, DataRepresentation, Decoder, Direction, Encoder, FloatFormat, Hooks,
    FullPtr, Marshal, Ndr20, NdrConfig, NdrError, NdrPtr, NdrWString, ReadBuffer, TransferSyntax, Unmarshal, WriteBuffer,
};

/// `struct { float single; double double; }`
#[derive(Debug, Default, PartialEq)]
struct Reading {
    single: f32,
    double: f64,
}

impl Marshal for Reading {
    fn marshal<'a, B: WriteBuffer, S: TransferSyntax>(&'a self, w: &mut Encoder<'a, B, S>) -> ndr::Result<()> {
        w.write_align(Align::fixed(8))?;
        w.write_data(self.single)?;
        w.write_data(self.double)
    }
}

impl Unmarshal for Reading {
    fn unmarshal<'a, B: ReadBuffer, S: TransferSyntax>(&'a mut self, r: &mut Decoder<'a, B, S>) -> ndr::Result<()> {
        r.read_align(Align::fixed(8))?;
        self.single = r.read_data()?;
        self.double = r.read_data()?;
        Ok(())
    }
}

fn vax() -> NdrConfig {
    NdrConfig::default().with_drep(DataRepresentation::ndr().with_float_format(FloatFormat::Vax))
}

#[test]
fn test_drawing_fixture() {
    init_tracing();
    let drawing = Drawing::sample();
    let bytes = encode::<Ndr20, _>(&drawing, &NdrConfig::default()).unwrap();
    assert_eq!(&bytes[..], &DRAWING_NDR[..]);

    let decoded: Drawing = decode::<Ndr20, _>(bytes, &NdrConfig::default()).unwrap();
    assert_eq!(decoded, drawing);
}

#[test]
fn test_rect_arm_and_null_label() {
    init_tracing();
    let drawing = Drawing {
        shape: Shape::Rect {
            width: 3,
            height: -4,
            area: 1 << 40,
        },
        label: None,
        points: Default::default(),
    };
    let bytes = encode::<Ndr20, _>(&drawing, &NdrConfig::default()).unwrap();
    // size, pad, count, kind, pad to the rect's hyper alignment
    assert_eq!(&bytes[12..16], &[2, 0, 0, 0]);
    assert_eq!(&bytes[16..20], &[3, 0, 0xfc, 0xff]);
    assert_eq!(&bytes[24..32], &(1i64 << 40).to_le_bytes());
    assert_eq!(&bytes[32..36], &[0, 0, 0, 0]);
    assert_eq!(bytes.len(), 36);

    let decoded: Drawing = decode::<Ndr20, _>(bytes, &NdrConfig::default()).unwrap();
    assert_eq!(decoded, drawing);
}

#[test]
fn test_unknown_discriminant() {
    init_tracing();
    let mut bytes = DRAWING_NDR.to_vec();
    bytes[12] = 7;
    let result: ndr::Result<Drawing> = decode::<Ndr20, _>(bytes, &NdrConfig::default());
    assert!(matches!(result, Err(NdrError::InvalidEnum(7))));
}

#[test]
fn test_count_must_match_conformance() {
    init_tracing();
    let mut bytes = DRAWING_NDR.to_vec();
    bytes[8] = 3;
    let result: ndr::Result<Drawing> = decode::<Ndr20, _>(bytes, &NdrConfig::default());
    assert!(matches!(result, Err(NdrError::ConformanceMismatch { .. })));
}

#[test]
fn test_truncated_fixture() {
    init_tracing();
    for cut in [3, 19, 27, 45, 49] {
        let result: ndr::Result<Drawing> = decode::<Ndr20, _>(DRAWING_NDR[..cut].to_vec(), &NdrConfig::default());
        assert!(
            matches!(result, Err(NdrError::UnexpectedEof { .. })),
            "cut at {cut}: {result:?}"
        );
    }
}

#[test]
fn test_aliased_full_pointers() {
    init_tracing();
    let pair = Pair::aliased(42);
    let bytes = encode::<Ndr20, _>(&pair, &NdrConfig::default()).unwrap();
    assert_eq!(&bytes[..], &PAIR_NDR[..]);

    let decoded: Pair = decode::<Ndr20, _>(bytes, &NdrConfig::default()).unwrap();
    let (left, right) = (decoded.left.0.unwrap(), decoded.right.0.unwrap());
    assert_eq!(*left, 42);
    assert!(Rc::ptr_eq(&left, &right));
}

#[test]
fn test_distinct_full_pointers_get_distinct_ids() {
    init_tracing();
    let pair = Pair {
        left: ndr::FullPtr::new(42),
        right: ndr::FullPtr::new(42),
    };
    let bytes = encode::<Ndr20, _>(&pair, &NdrConfig::default()).unwrap();
    assert_eq!(&bytes[..], &[1, 0, 0, 0, 5, 0, 0, 0, 42, 0, 0, 0, 42, 0, 0, 0]);

    let decoded: Pair = decode::<Ndr20, _>(bytes, &NdrConfig::default()).unwrap();
    assert!(!decoded.left.ptr_eq(&decoded.right));
}

/// `struct { [ptr] long* value; }`
#[derive(Debug, Default)]
struct Inner {
    value: FullPtr<i32>,
}

impl Marshal for Inner {
    fn marshal<'a, B: WriteBuffer, S: TransferSyntax>(&'a self, w: &mut Encoder<'a, B, S>) -> ndr::Result<()> {
        w.write_align(Align::POINTER)?;
        self.value.marshal(w)
    }
}

impl Unmarshal for Inner {
    fn unmarshal<'a, B: ReadBuffer, S: TransferSyntax>(&'a mut self, r: &mut Decoder<'a, B, S>) -> ndr::Result<()> {
        r.read_align(Align::POINTER)?;
        self.value.unmarshal(r)
    }
}

/// `struct { [ptr] INNER* inner; [ptr] long* value; }`, fields in
/// declaration order unless `value_first`
#[derive(Debug, Default)]
struct Outer {
    inner: FullPtr<Inner>,
    value: FullPtr<i32>,
    value_first: bool,
}

impl Outer {
    fn sharing(value: i32, value_first: bool) -> Self {
        let value = FullPtr::new(value);
        Self {
            inner: FullPtr::new(Inner { value: value.alias() }),
            value,
            value_first,
        }
    }
}

impl Marshal for Outer {
    fn marshal<'a, B: WriteBuffer, S: TransferSyntax>(&'a self, w: &mut Encoder<'a, B, S>) -> ndr::Result<()> {
        w.write_align(Align::POINTER)?;
        if self.value_first {
            self.value.marshal(w)?;
            self.inner.marshal(w)
        } else {
            self.inner.marshal(w)?;
            self.value.marshal(w)
        }
    }
}

impl Unmarshal for Outer {
    fn unmarshal<'a, B: ReadBuffer, S: TransferSyntax>(&'a mut self, r: &mut Decoder<'a, B, S>) -> ndr::Result<()> {
        r.read_align(Align::POINTER)?;
        if self.value_first {
            self.value.unmarshal(r)?;
            self.inner.unmarshal(r)
        } else {
            self.inner.unmarshal(r)?;
            self.value.unmarshal(r)
        }
    }
}

fn referent<P: NdrPtr>(ptr: &P) -> &P::Target {
    assert!(!ptr.is_null());
    ptr.get().unwrap()
}

#[test]
fn test_full_pointer_aliased_from_a_nested_referent() {
    init_tracing();
    // the nested alias is flushed first, so it carries the referent
    let outer = Outer::sharing(42, false);
    let bytes = encode::<Ndr20, _>(&outer, &NdrConfig::default()).unwrap();
    assert_eq!(&bytes[..], &[1, 0, 0, 0, 5, 0, 0, 0, 5, 0, 0, 0, 42, 0, 0, 0]);

    let decoded: Outer = decode::<Ndr20, _>(bytes, &NdrConfig::default()).unwrap();
    assert_eq!(*referent(&decoded.value), 42);
    assert!(decoded.value.ptr_eq(&referent(&decoded.inner).value));
}

#[test]
fn test_nested_full_pointer_aliases_a_decoded_referent() {
    init_tracing();
    let outer = Outer::sharing(42, true);
    let bytes = encode::<Ndr20, _>(&outer, &NdrConfig::default()).unwrap();
    assert_eq!(&bytes[..], &[1, 0, 0, 0, 5, 0, 0, 0, 42, 0, 0, 0, 1, 0, 0, 0]);

    let mut decoded = Outer {
        value_first: true,
        ..Default::default()
    };
    decode_into::<Ndr20, _>(bytes, &mut decoded, &NdrConfig::default()).unwrap();
    assert_eq!(*referent(&decoded.value), 42);
    assert!(decoded.value.ptr_eq(&referent(&decoded.inner).value));
}

#[test]
fn test_big_endian_drawing() {
    init_tracing();
    let config = NdrConfig::default().with_drep(DataRepresentation::big_endian());
    let drawing = Drawing::sample();
    let bytes = encode::<Ndr20, _>(&drawing, &config).unwrap();
    assert_eq!(&bytes[..4], &[0, 0, 0, 2]);
    assert_eq!(&bytes[12..14], &[0, 1]);
    assert_eq!(&bytes[44..], &[0, b'a', 0, b'b', 0, 0]);
    assert_eq!(config.drep.byte_order(), ByteOrder::BigEndian);

    let decoded: Drawing = decode::<Ndr20, _>(bytes, &config).unwrap();
    assert_eq!(decoded, drawing);
}

#[test]
fn test_vax_floats() {
    init_tracing();
    let reading = Reading {
        single: 1.0,
        double: 1.0,
    };
    let bytes = encode::<Ndr20, _>(&reading, &vax()).unwrap();
    assert_eq!(&bytes[..4], &[0x80, 0x40, 0, 0]);
    assert_eq!(&bytes[8..], &[0x10, 0x40, 0, 0, 0, 0, 0, 0]);

    let decoded: Reading = decode::<Ndr20, _>(bytes, &vax()).unwrap();
    assert_eq!(decoded, reading);

    let ieee = encode::<Ndr20, _>(&reading, &NdrConfig::default()).unwrap();
    assert_eq!(&ieee[..4], &1.0f32.to_le_bytes());
}

#[test]
fn test_hooks_see_both_directions() {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));
    let decodes = Arc::new(AtomicUsize::new(0));
    let (seen, seen_decodes) = (calls.clone(), decodes.clone());
    let hooks = Hooks::default().after(move |event| {
        seen.fetch_add(1, Ordering::SeqCst);
        if event.direction == Direction::Decode {
            seen_decodes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    });
    let config = NdrConfig::default().with_hooks(hooks);

    let bytes = encode::<Ndr20, _>(&NdrWString::new("hooked"), &config).unwrap();
    let mut value = NdrWString::default();
    decode_into::<Ndr20, _>(bytes, &mut value, &config).unwrap();
    assert_eq!(value.as_str(), "hooked");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(decodes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failing_hook_fails_the_call() {
    init_tracing();
    let hooks = Hooks::default().before(|_| Err(NdrError::InvalidString("rejected by hook".into())));
    let config = NdrConfig::default().with_hooks(hooks);
    assert!(matches!(
        encode::<Ndr20, _>(&1u32, &config),
        Err(NdrError::InvalidString(_))
    ));
}
