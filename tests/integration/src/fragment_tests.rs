//! Fragment Tests - one stub data stream over several fragments
//!
//! Alignment and referent ids are relative to the start of the stub data,
//! so a stream cut into fragments must encode and decode exactly like the
//! same stream in one piece.

mod common;

use bytes::Bytes;
use common::*;
use ndr::buffer::{ChunkedReader, ChunkedWriter};
use ndr::{decode_from, encode, encode_into, DataRepresentation, Ndr20, Ndr64, NdrConfig, NdrError, ReadBuffer};

#[test]
fn test_fragments_concatenate_to_the_contiguous_stream() {
    init_tracing();
    let config = NdrConfig::default();
    for max_fragment in [1, 5, 7, 16, 4096] {
        let writer = ChunkedWriter::new(config.drep, max_fragment);
        let writer = encode_into::<Ndr64, _, _>(&Drawing::sample(), writer, &config).unwrap();
        let fragments = writer.into_fragments();
        assert!(fragments.iter().all(|f| f.len() <= max_fragment));

        let joined: Vec<u8> = fragments.iter().flat_map(|f| f.iter().copied()).collect();
        let direct = encode::<Ndr64, _>(&Drawing::sample(), &config).unwrap();
        assert_eq!(joined, direct.to_vec(), "max_fragment {max_fragment}");
    }
}

#[test]
fn test_decode_across_fragment_boundaries() {
    init_tracing();
    // cut through the size field, the pointer id and the string units
    let cuts = [0, 2, 11, 22, 37, 45, DRAWING_NDR.len()];
    let fragments: Vec<Bytes> = cuts
        .windows(2)
        .map(|w| Bytes::copy_from_slice(&DRAWING_NDR[w[0]..w[1]]))
        .collect();
    let reader = ChunkedReader::new(fragments, DataRepresentation::ndr());
    assert_eq!(reader.fragment_count(), 6);

    let mut decoded = Drawing::default();
    let reader = decode_from::<Ndr20, _, _>(reader, &mut decoded, &NdrConfig::default()).unwrap();
    assert_eq!(decoded, Drawing::sample());
    assert!(reader.at_end());
    assert_eq!(reader.fragment_count(), 0);
}

#[test]
fn test_late_fragment() {
    init_tracing();
    let mut reader = ChunkedReader::new([Bytes::copy_from_slice(&DRAWING_NDR[..24])], DataRepresentation::ndr());
    let mut decoded = Drawing::default();
    let result = decode_from::<Ndr20, _, _>(reader.clone(), &mut decoded, &NdrConfig::default());
    assert!(matches!(result, Err(NdrError::UnexpectedEof { .. })));

    reader.push_fragment(Bytes::copy_from_slice(&DRAWING_NDR[24..]));
    let mut decoded = Drawing::default();
    decode_from::<Ndr20, _, _>(reader, &mut decoded, &NdrConfig::default()).unwrap();
    assert_eq!(decoded, Drawing::sample());
}
