//! Hand-off Tests - encoder and decoder on two threads
//!
//! These tests run a producer thread encoding straight into a hand-off
//! buffer while the consumer decodes from it:
//! - Small slices forcing primitives to straddle slice boundaries
//! - Deferred referents crossing threads
//! - Early close on either side

mod common;

use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use common::*;
use ndr::buffer::handoff;
use ndr::{
    decode_from, encode, encode_into, DataRepresentation, Ndr20, Ndr64, NdrConfig, NdrError, ReadBuffer,
    TransferSyntax, WriteBuffer,
};

fn exchange<S: TransferSyntax>(capacity: usize) -> Drawing {
    let config = NdrConfig::default();
    let (writer, reader) = handoff::channel(config.drep, capacity);
    let producer_config = config.clone();
    let producer = thread::spawn(move || {
        let writer = encode_into::<S, _, _>(&Drawing::sample(), writer, &producer_config).unwrap();
        writer.position()
    });

    let mut decoded = Drawing::default();
    let reader = decode_from::<S, _, _>(reader, &mut decoded, &config).unwrap();
    let written = producer.join().unwrap();
    assert_eq!(reader.position(), written);
    assert!(reader.at_end());
    decoded
}

#[test]
fn test_drawing_across_threads() {
    init_tracing();
    for capacity in [1, 3, 8, 4096] {
        assert_eq!(exchange::<Ndr20>(capacity), Drawing::sample(), "capacity {capacity}");
        assert_eq!(exchange::<Ndr64>(capacity), Drawing::sample(), "capacity {capacity}");
    }
}

#[test]
fn test_parallel_exchanges_are_independent() {
    init_tracing();
    let results = Arc::new(Mutex::new(Vec::new()));
    let workers: Vec<_> = (1..=4)
        .map(|capacity| {
            let results = results.clone();
            thread::spawn(move || {
                let decoded = exchange::<Ndr20>(capacity * 2);
                results.lock().push((capacity, decoded));
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let results = results.lock();
    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|(_, decoded)| *decoded == Drawing::sample()));
}

#[test]
fn test_stream_matches_single_chunk_encoding() {
    init_tracing();
    let (mut writer, mut reader) = handoff::channel(DataRepresentation::ndr(), 5);
    let producer = thread::spawn(move || {
        writer.write(&DRAWING_NDR).unwrap();
    });
    let received = reader.read(DRAWING_NDR.len()).unwrap();
    producer.join().unwrap();

    let direct = encode::<Ndr20, _>(&Drawing::sample(), &NdrConfig::default()).unwrap();
    assert_eq!(received, direct);
}

#[test]
fn test_writer_closing_early_fails_the_decode() {
    init_tracing();
    let (mut writer, reader) = handoff::channel(DataRepresentation::ndr(), 4);
    let producer = thread::spawn(move || {
        writer.write(&DRAWING_NDR[..30]).unwrap();
        writer.close();
    });

    let mut decoded = Drawing::default();
    let result = decode_from::<Ndr20, _, _>(reader, &mut decoded, &NdrConfig::default());
    producer.join().unwrap();
    assert!(matches!(result, Err(NdrError::UnexpectedEof { .. })));
}

#[test]
fn test_reader_closing_early_fails_the_encode() {
    init_tracing();
    let (writer, mut reader) = handoff::channel(DataRepresentation::ndr(), 4);
    let producer = thread::spawn(move || encode_into::<Ndr20, _, _>(&Drawing::sample(), writer, &NdrConfig::default()));

    let mut head = [0u8; 8];
    reader.read_exact(&mut head).unwrap();
    assert_eq!(head, DRAWING_NDR[..8]);
    reader.close();

    let result = producer.join().unwrap();
    assert!(matches!(result, Err(NdrError::ShortWrite { .. })));
}
