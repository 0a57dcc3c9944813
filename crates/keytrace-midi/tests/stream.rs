//! Stream-level decoder behaviour: chunking, corruption and recovery.

use keytrace_midi::{DecodedPair, Diagnostic, StreamDecoder, Target};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

fn note_on_stream(pairs: &[(u8, u8)]) -> Vec<u8> {
    pairs.iter().flat_map(|&(k, v)| [0x90, k, v]).collect()
}

fn expected(pairs: &[(u8, u8)]) -> Vec<DecodedPair> {
    pairs.iter().map(|&(k, v)| DecodedPair::key(k, v)).collect()
}

fn decode_in_chunks(bytes: &[u8], cuts: &[usize]) -> Vec<DecodedPair> {
    let mut decoder = StreamDecoder::new();
    let mut out = Vec::new();
    let mut start = 0;
    for &cut in cuts {
        let cut = cut.clamp(start, bytes.len());
        decoder.decode_into(&bytes[start..cut], &mut out);
        start = cut;
    }
    decoder.decode_into(&bytes[start..], &mut out);
    out
}

proptest! {
    #[test]
    fn test_one_pair_per_note_on_triple(pairs in prop::collection::vec((0u8..128, 0u8..128), 0..64)) {
        let mut decoder = StreamDecoder::new();
        prop_assert_eq!(decoder.decode(&note_on_stream(&pairs)), expected(&pairs));
    }

    #[test]
    fn test_chunking_does_not_change_output(
        pairs in prop::collection::vec((0u8..128, 0u8..128), 1..32),
        mut cuts in prop::collection::vec(0usize..96, 0..8),
    ) {
        let bytes = note_on_stream(&pairs);
        cuts.sort_unstable();
        prop_assert_eq!(decode_in_chunks(&bytes, &cuts), expected(&pairs));
    }

    #[test]
    fn test_arbitrary_bytes_never_pair_unrecognized_data(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut decoder = StreamDecoder::new();
        for pair in decoder.decode(&bytes) {
            prop_assert!(pair.value < 0x80);
            if let Target::Key(key) = pair.target {
                prop_assert!(key < 0x80);
            }
        }
    }
}

#[test]
fn test_split_triple_at_every_boundary() {
    let bytes = [0x90, 0x3C, 0x64];
    for cut in 0..=bytes.len() {
        assert_eq!(
            decode_in_chunks(&bytes, &[cut]),
            vec![DecodedPair::key(60, 100)],
            "cut at {cut}"
        );
    }
}

#[test]
fn test_byte_at_a_time_matches_whole() {
    let bytes = [
        0x90, 0x3C, 0x64, 0xB0, 0x40, 0x7F, 0x90, 0x3C, 0x00, 0xB0, 0x40, 0x00,
    ];
    let whole = StreamDecoder::new().decode(&bytes);

    let mut decoder = StreamDecoder::new();
    let piecewise: Vec<_> = bytes.iter().flat_map(|b| decoder.decode(&[*b])).collect();

    assert_eq!(whole, piecewise);
    assert_eq!(
        whole,
        vec![
            DecodedPair::key(60, 100),
            DecodedPair::pedal(127),
            DecodedPair::key(60, 0),
            DecodedPair::pedal(0),
        ]
    );
}

#[test]
fn test_corrupted_stream_recovers_on_next_command() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut decoder = StreamDecoder::new().with_diagnostics(move |d| sink.lock().unwrap().push(d));

    // Pitch bend and program change are outside the recognized set
    let pairs = decoder.decode(&[
        0x90, 0x30, 0x40, // ok
        0xE0, 0x00, 0x40, // dropped
        0xC0, 0x05, // dropped
        0x90, 0x31, // interrupted below
        0xB0, 0x40, 0x7F, // ok
    ]);

    assert_eq!(pairs, vec![DecodedPair::key(0x30, 0x40), DecodedPair::pedal(127)]);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            Diagnostic::UnrecognizedCommand(0xE0),
            Diagnostic::UnrecognizedCommand(0xC0),
        ]
    );
}

#[test]
fn test_pedal_and_keys_interleave_with_running_status() {
    let mut decoder = StreamDecoder::new();
    let pairs = decoder.decode(&[0x90, 60, 100, 64, 100, 0xB0, 0x40, 0x7F, 0x40, 0x00, 0x90, 60, 0]);
    assert_eq!(
        pairs,
        vec![
            DecodedPair::key(60, 100),
            DecodedPair::key(64, 100),
            DecodedPair::pedal(127),
            DecodedPair::pedal(0),
            DecodedPair::key(60, 0),
        ]
    );
}
