//! Syntax Tests - classic NDR against NDR64
//!
//! The same values encoded under both transfer syntaxes:
//! - Size fields and pointer ids widen to 64 bits
//! - Enums widen to 32 bits
//! - Unions and structures pick up NDR64 alignment and trailing gaps
//! - Full pointers alias only in classic NDR

mod common;

use common::*;
use ndr::{
    decode, encode, Int3264, Ndr20, Ndr64, NdrConfig, NdrError, TransferSyntax, Uint3264,
};

const DRAWING_NDR64: [u8; 70] = [
    2, 0, 0, 0, 0, 0, 0, 0, // conformance of points
    2, 0, 0, 0, // count
    1, 0, 0, 0, // kind
    5, 0, 0, 0, // radius
    0, 0, 0, 0, // align 8
    25, 0, 0, 0, 0, 0, 0, 0, // label referent id
    1, 0, 0, 0, 2, 0, 0, 0, // points
    3, 0, 0, 0, 0, 0, 0, 0, // label max_count
    0, 0, 0, 0, 0, 0, 0, 0, // label offset
    3, 0, 0, 0, 0, 0, 0, 0, // label actual_count
    b'a', 0, b'b', 0, 0, 0,
];

#[test]
fn test_drawing_ndr64_fixture() {
    init_tracing();
    let drawing = Drawing::sample();
    let bytes = encode::<Ndr64, _>(&drawing, &NdrConfig::default()).unwrap();
    assert_eq!(&bytes[..], &DRAWING_NDR64[..]);
    assert_eq!(DRAWING_NDR.len(), 50);

    let decoded: Drawing = decode::<Ndr64, _>(bytes, &NdrConfig::default()).unwrap();
    assert_eq!(decoded, drawing);
}

#[test]
fn test_rect_arm_gets_trailing_gap() {
    init_tracing();
    let drawing = Drawing {
        shape: Shape::Rect {
            width: 1,
            height: 2,
            area: 2,
        },
        label: None,
        points: Default::default(),
    };
    let classic = encode::<Ndr20, _>(&drawing, &NdrConfig::default()).unwrap();
    let wide = encode::<Ndr64, _>(&drawing, &NdrConfig::default()).unwrap();
    assert_eq!(classic.len(), 36);
    assert_eq!(wide.len(), 40);
    assert_eq!(&wide[32..40], &[0; 8]);

    assert_eq!(decode::<Ndr64, Drawing>(wide, &NdrConfig::default()).unwrap(), drawing);
    assert_eq!(decode::<Ndr20, Drawing>(classic, &NdrConfig::default()).unwrap(), drawing);
}

#[test]
fn test_full_pointers_copy_in_ndr64() {
    init_tracing();
    let pair = Pair::aliased(42);
    let bytes = encode::<Ndr64, _>(&pair, &NdrConfig::default()).unwrap();
    assert_eq!(
        &bytes[..],
        &[1, 0, 0, 0, 0, 0, 0, 0, 9, 0, 0, 0, 0, 0, 0, 0, 42, 0, 0, 0, 42, 0, 0, 0]
    );

    let decoded: Pair = decode::<Ndr64, _>(bytes, &NdrConfig::default()).unwrap();
    assert_eq!(decoded.left.0.as_deref(), Some(&42));
    assert_eq!(decoded.right.0.as_deref(), Some(&42));
    assert!(!decoded.left.ptr_eq(&decoded.right));
}

#[test]
fn test_int3264_width() {
    init_tracing();
    let classic = encode::<Ndr20, _>(&Uint3264(7), &NdrConfig::default()).unwrap();
    let wide = encode::<Ndr64, _>(&Uint3264(7), &NdrConfig::default()).unwrap();
    assert_eq!(classic.len(), 4);
    assert_eq!(wide.len(), 8);

    assert!(matches!(
        encode::<Ndr20, _>(&Int3264(1 << 40), &NdrConfig::default()),
        Err(NdrError::IntegerOverflow)
    ));
    let wide = encode::<Ndr64, _>(&Int3264(-(1 << 40)), &NdrConfig::default()).unwrap();
    assert_eq!(decode::<Ndr64, Int3264>(wide, &NdrConfig::default()).unwrap(), Int3264(-(1 << 40)));
}

#[test]
fn test_syntax_identifiers() {
    assert_eq!(Ndr20::NAME, "NDR");
    assert_eq!(Ndr64::NAME, "NDR64");
    assert_eq!(Ndr20::ID.version, 2);
    assert_eq!(Ndr64::ID.version, 1);
    assert_eq!(Ndr64::ID.uuid.to_string(), "71710533-beba-4937-8319-b5dbef9ccc36");
}
