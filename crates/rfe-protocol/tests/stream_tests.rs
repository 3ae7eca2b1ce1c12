//! Stream-level codec tests
//!
//! The serial line delivers bytes in arbitrary chunks, so the codec
//! must produce identical message sequences no matter where the reads
//! split the stream, and must survive garbage between frames.

use proptest::prelude::*;
use rfe_protocol::spectrum::{Message, SpectrumCodec};
use rfe_protocol::ProtocolCodec;

const CONFIG_LINE: &[u8] =
    b"#C2-F:0096000,0090072,-010,-120,0112,0,000,0000050,0960000,0959950,00110,0000,000\r\n";
const SETUP_LINE: &[u8] = b"#C2-M:003,255,01.12B26\r\n";

fn sweep_frame(points: u8) -> Vec<u8> {
    let mut frame = vec![b'$', b'S', points];
    frame.extend((0..points).map(|i| i.wrapping_add(100)));
    frame.extend(b"\r\n");
    frame
}

fn decode_all(codec: &mut SpectrumCodec) -> Vec<Message> {
    std::iter::from_fn(|| codec.next_message()).collect()
}

#[test]
fn byte_at_a_time_matches_single_push() {
    let mut stream = Vec::new();
    stream.extend_from_slice(SETUP_LINE);
    stream.extend_from_slice(CONFIG_LINE);
    stream.extend_from_slice(&sweep_frame(112));

    let mut whole = SpectrumCodec::new();
    whole.push_bytes(&stream);
    let expected = decode_all(&mut whole);

    let mut trickled = SpectrumCodec::new();
    let mut got = Vec::new();
    for &byte in &stream {
        trickled.push_bytes(&[byte]);
        got.extend(decode_all(&mut trickled));
    }

    assert_eq!(got.len(), 3);
    assert_eq!(got, expected);
}

#[test]
fn garbage_between_frames_does_not_drop_messages() {
    let mut codec = SpectrumCodec::new();
    codec.push_bytes(b"\xff\xfenoise\r\n");
    codec.push_bytes(CONFIG_LINE);
    codec.push_bytes(b"more noise\r\n");
    codec.push_bytes(&sweep_frame(4));

    let messages = decode_all(&mut codec);
    assert!(messages
        .iter()
        .any(|m| matches!(m, Message::Config(c) if c.sweep_points == 112)));
    assert!(messages
        .iter()
        .any(|m| matches!(m, Message::Sweep(s) if s.len() == 4)));
}

proptest! {
    // Any partition of the stream into chunks yields the same messages
    #[test]
    fn split_points_never_change_decoded_messages(
        splits in prop::collection::vec(0usize..200, 0..8),
        points in 1u8..64,
    ) {
        let mut stream = Vec::new();
        stream.extend_from_slice(SETUP_LINE);
        stream.extend_from_slice(&sweep_frame(points));
        stream.extend_from_slice(CONFIG_LINE);

        let mut whole = SpectrumCodec::new();
        whole.push_bytes(&stream);
        let expected = decode_all(&mut whole);
        prop_assert_eq!(expected.len(), 3);

        let mut cuts: Vec<usize> = splits.iter().map(|&s| s % stream.len()).collect();
        cuts.sort_unstable();
        cuts.dedup();

        let mut chunked = SpectrumCodec::new();
        let mut got = Vec::new();
        let mut last = 0;
        for cut in cuts {
            chunked.push_bytes(&stream[last..cut]);
            got.extend(decode_all(&mut chunked));
            last = cut;
        }
        chunked.push_bytes(&stream[last..]);
        got.extend(decode_all(&mut chunked));

        prop_assert_eq!(got, expected);
    }

    // Sweeps of every size decode with one amplitude per point
    #[test]
    fn sweep_point_count_is_preserved(points in 1u8..=255) {
        let mut codec = SpectrumCodec::new();
        codec.push_bytes(&sweep_frame(points));

        match codec.next_message() {
            Some(Message::Sweep(sweep)) => {
                prop_assert_eq!(sweep.len(), usize::from(points));
            }
            other => prop_assert!(false, "expected sweep, got {:?}", other),
        }
    }
}
