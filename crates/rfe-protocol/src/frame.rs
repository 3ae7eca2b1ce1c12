//! Streaming frame extraction
//!
//! RF Explorer devices interleave two kinds of frames on the wire:
//! ASCII lines terminated by `\r\n` (configuration, setup, status) and
//! binary frames whose payload length is encoded in the header (sweep
//! data `$S`/`$s`/`$z`, screen data `$D`). A binary payload may contain
//! `\r` or `\n` bytes, so the splitter must go by declared length there
//! and by line endings everywhere else.
//!
//! `FrameBuffer` accumulates raw bytes and yields complete frames in
//! arrival order, leaving any incomplete tail buffered for the next
//! feed. Malformed input is skipped by resynchronizing on the next
//! frame boundary; it never aborts the stream.

use std::str::FromStr;

use crate::error::ParseError;
use crate::frequency::Frequency;

/// Largest frame we ever expect: a `$z` sweep can carry 65,535 points.
/// Anything beyond this cap is discarded as garbage.
const MAX_FRAME_LEN: usize = 128 * 1024;

/// Screen data is a fixed 8-row by 128-column page-organized bitmap.
pub(crate) const SCREEN_PAYLOAD_LEN: usize = 8 * 128;

/// One raw frame split out of the byte stream, not yet parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawFrame {
    /// A complete ASCII line with the line ending stripped
    Line(Vec<u8>),
    /// Amplitude payload bytes from a `$S`/`$s`/`$z` sweep frame
    Sweep(Vec<u8>),
    /// Bitmap payload bytes from a `$D` screen frame
    Screen(Vec<u8>),
}

/// Accumulator that splits the raw byte stream into frames
#[derive(Debug, Default)]
pub(crate) struct FrameBuffer {
    buf: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(512),
        }
    }

    pub fn push_bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);

        // A stuck stream with no frame boundary must not grow forever
        if self.buf.len() > MAX_FRAME_LEN {
            tracing::warn!(
                "frame buffer exceeded {} bytes without a boundary, dropping oldest data",
                MAX_FRAME_LEN
            );
            let start = self.buf.len() - MAX_FRAME_LEN / 2;
            self.buf.drain(..start);
        }
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Extracts the next complete frame, or `None` if the buffer holds
    /// only an incomplete tail.
    pub fn next_frame(&mut self) -> Option<RawFrame> {
        loop {
            if self.buf.is_empty() {
                return None;
            }

            if self.buf[0] == b'$' {
                match self.next_binary_frame() {
                    BinaryStep::Frame(frame) => return Some(frame),
                    BinaryStep::NeedMore => return None,
                    // Unknown '$' type: drop the marker and rescan
                    BinaryStep::Resync => {
                        tracing::warn!("unrecognized binary frame marker, resynchronizing");
                        self.buf.drain(..1);
                        continue;
                    }
                }
            }

            let Some(newline) = self.buf.iter().position(|&b| b == b'\n') else {
                // No line ending in sight. If a binary frame marker
                // follows unterminated garbage, resynchronize on it
                // rather than waiting for a newline that never comes.
                if let Some(marker) = self.buf.iter().position(|&b| b == b'$').filter(|&p| p > 0)
                {
                    tracing::warn!("discarding {marker} unterminated bytes before binary frame");
                    self.buf.drain(..marker);
                    continue;
                }
                return None;
            };
            let mut line: Vec<u8> = self.buf.drain(..=newline).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if line.is_empty() {
                continue;
            }
            return Some(RawFrame::Line(line));
        }
    }

    fn next_binary_frame(&mut self) -> BinaryStep {
        if self.buf.len() < 2 {
            return BinaryStep::NeedMore;
        }

        let (header_len, payload_len) = match self.buf[1] {
            // `$S<n>`: n amplitude bytes
            b'S' => match self.buf.get(2) {
                Some(&n) => (3, usize::from(n)),
                None => return BinaryStep::NeedMore,
            },
            // `$s<n>`: (n + 1) * 16 amplitude bytes
            b's' => match self.buf.get(2) {
                Some(&n) => (3, (usize::from(n) + 1) * 16),
                None => return BinaryStep::NeedMore,
            },
            // `$z<hi><lo>`: big-endian point count
            b'z' => match (self.buf.get(2), self.buf.get(3)) {
                (Some(&hi), Some(&lo)) => (4, usize::from(u16::from_be_bytes([hi, lo]))),
                _ => return BinaryStep::NeedMore,
            },
            b'D' => (2, SCREEN_PAYLOAD_LEN),
            _ => return BinaryStep::Resync,
        };

        if self.buf.len() < header_len + payload_len {
            return BinaryStep::NeedMore;
        }

        let kind = self.buf[1];
        let payload: Vec<u8> = self
            .buf
            .drain(..header_len + payload_len)
            .skip(header_len)
            .collect();
        self.strip_line_ending();

        match kind {
            b'D' => BinaryStep::Frame(RawFrame::Screen(payload)),
            _ => BinaryStep::Frame(RawFrame::Sweep(payload)),
        }
    }

    /// Binary frames are followed by `\r\n` on the wire
    fn strip_line_ending(&mut self) {
        if self.buf.first() == Some(&b'\r') {
            self.buf.drain(..1);
        }
        if self.buf.first() == Some(&b'\n') {
            self.buf.drain(..1);
        }
    }
}

enum BinaryStep {
    Frame(RawFrame),
    NeedMore,
    Resync,
}

/// Comma-separated field reader for ASCII message bodies
pub(crate) struct Fields<'a> {
    rest: Option<&'a str>,
}

impl<'a> Fields<'a> {
    pub fn new(body: &'a str) -> Self {
        Self { rest: Some(body) }
    }

    /// Next comma-separated field, or an error if the body is exhausted
    pub fn next(&mut self) -> Result<&'a str, ParseError> {
        self.next_opt()
            .ok_or_else(|| ParseError::InvalidFrame("too few fields".into()))
    }

    /// Next comma-separated field, or `None` once the body is exhausted.
    /// Used for the optional tail fields older firmware omits.
    pub fn next_opt(&mut self) -> Option<&'a str> {
        let rest = self.rest?;
        match rest.find(',') {
            Some(idx) => {
                self.rest = Some(&rest[idx + 1..]);
                Some(&rest[..idx])
            }
            None => {
                self.rest = None;
                Some(rest)
            }
        }
    }

    pub fn num<T: FromStr>(&mut self) -> Result<T, ParseError> {
        let field = self.next()?;
        field
            .trim()
            .parse::<T>()
            .map_err(|_| ParseError::InvalidNumber(field.into()))
    }

    pub fn num_opt<T: FromStr>(&mut self) -> Option<T> {
        self.next_opt()?.trim().parse::<T>().ok()
    }

    /// Parses a 7-digit kHz frequency field
    pub fn khz(&mut self) -> Result<Frequency, ParseError> {
        let field = self.next()?;
        let khz = field
            .trim()
            .parse::<u64>()
            .map_err(|_| ParseError::InvalidFrequency(field.into()))?;
        Ok(Frequency::from_khz(khz))
    }

    pub fn khz_opt(&mut self) -> Option<Frequency> {
        self.num_opt::<u64>().map(Frequency::from_khz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_lines_on_crlf() {
        let mut buf = FrameBuffer::new();
        buf.push_bytes(b"#C2-M:005,255,01.12B26\r\n#Sn12345\r\n");

        assert_eq!(
            buf.next_frame(),
            Some(RawFrame::Line(b"#C2-M:005,255,01.12B26".to_vec()))
        );
        assert_eq!(buf.next_frame(), Some(RawFrame::Line(b"#Sn12345".to_vec())));
        assert_eq!(buf.next_frame(), None);
    }

    #[test]
    fn test_partial_line_stays_buffered() {
        let mut buf = FrameBuffer::new();
        buf.push_bytes(b"#C2-M:005,");
        assert_eq!(buf.next_frame(), None);

        buf.push_bytes(b"255,01.12B26\r\n");
        assert_eq!(
            buf.next_frame(),
            Some(RawFrame::Line(b"#C2-M:005,255,01.12B26".to_vec()))
        );
    }

    #[test]
    fn test_sweep_frame_with_embedded_newline() {
        // Amplitude bytes 0x0D 0x0A must not terminate the frame early
        let mut buf = FrameBuffer::new();
        buf.push_bytes(&[b'$', b'S', 4, 0x0D, 0x0A, 0x80, 0x90, b'\r', b'\n']);

        assert_eq!(
            buf.next_frame(),
            Some(RawFrame::Sweep(vec![0x0D, 0x0A, 0x80, 0x90]))
        );
        assert_eq!(buf.next_frame(), None);
    }

    #[test]
    fn test_ext_sweep_frame_length() {
        // $s with n = 0 carries (0 + 1) * 16 = 16 points
        let mut frame = vec![b'$', b's', 0];
        frame.extend(std::iter::repeat(0x70).take(16));
        let mut buf = FrameBuffer::new();
        buf.push_bytes(&frame);

        match buf.next_frame() {
            Some(RawFrame::Sweep(payload)) => assert_eq!(payload.len(), 16),
            other => panic!("expected sweep frame, got {other:?}"),
        }
    }

    #[test]
    fn test_large_sweep_frame_length() {
        let mut frame = vec![b'$', b'z', 0x01, 0x00];
        frame.extend(std::iter::repeat(0x70).take(256));
        let mut buf = FrameBuffer::new();
        buf.push_bytes(&frame);

        match buf.next_frame() {
            Some(RawFrame::Sweep(payload)) => assert_eq!(payload.len(), 256),
            other => panic!("expected sweep frame, got {other:?}"),
        }
    }

    #[test]
    fn test_screen_frame() {
        let mut frame = vec![b'$', b'D'];
        frame.extend(std::iter::repeat(0xAA).take(SCREEN_PAYLOAD_LEN));
        frame.extend(b"\r\n");
        frame.extend(b"#K0\r\n");
        let mut buf = FrameBuffer::new();
        buf.push_bytes(&frame);

        match buf.next_frame() {
            Some(RawFrame::Screen(payload)) => assert_eq!(payload.len(), SCREEN_PAYLOAD_LEN),
            other => panic!("expected screen frame, got {other:?}"),
        }
        assert_eq!(buf.next_frame(), Some(RawFrame::Line(b"#K0".to_vec())));
    }

    #[test]
    fn test_incomplete_binary_frame_stays_buffered() {
        let mut buf = FrameBuffer::new();
        buf.push_bytes(&[b'$', b'S', 10, 0x50, 0x51]);
        assert_eq!(buf.next_frame(), None);

        buf.push_bytes(&[0x52; 8]);
        match buf.next_frame() {
            Some(RawFrame::Sweep(payload)) => assert_eq!(payload.len(), 10),
            other => panic!("expected sweep frame, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_binary_marker_resyncs() {
        let mut buf = FrameBuffer::new();
        buf.push_bytes(b"$Q");
        buf.push_bytes(b"garbage\r\n#K1\r\n");

        // The bogus '$Q' run becomes an unparseable line, the frame
        // after it survives
        assert!(matches!(buf.next_frame(), Some(RawFrame::Line(_))));
        assert_eq!(buf.next_frame(), Some(RawFrame::Line(b"#K1".to_vec())));
    }

    #[test]
    fn test_unterminated_garbage_before_binary_frame() {
        let mut buf = FrameBuffer::new();
        buf.push_bytes(b"junk");
        assert_eq!(buf.next_frame(), None);

        buf.push_bytes(&[b'$', b'S', 2, 10, 20, b'\r', b'\n']);
        assert_eq!(buf.next_frame(), Some(RawFrame::Sweep(vec![10, 20])));
    }

    #[test]
    fn test_fields_reader() {
        let mut fields = Fields::new("5249000,0196428,-030,-118");
        assert_eq!(fields.khz().unwrap(), Frequency::from_khz(5_249_000));
        assert_eq!(fields.num::<u64>().unwrap(), 196_428);
        assert_eq!(fields.num::<i16>().unwrap(), -30);
        assert_eq!(fields.num::<i16>().unwrap(), -118);
        assert!(fields.next_opt().is_none());
    }

    #[test]
    fn test_fields_too_few() {
        let mut fields = Fields::new("100");
        let _ = fields.next().unwrap();
        assert!(fields.next().is_err());
    }
}
