//! Frame codec for the stream front end
//!
//! Frames arrive MLLP-style: an optional block-start byte (0x0B), payload
//! bytes, the end-of-message marker (0x1C) and an optional trailing
//! carriage return. The decoder reassembles partial arrivals until the
//! marker shows up; payload interpretation (UTF-8, NUL trimming, JSON) is
//! the connection handler's job. Outbound progress lines use the same
//! framing.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::domain::errors::StreamError;

/// Optional block-start byte preceding a frame
pub const BLOCK_START: u8 = 0x0B;

/// End-of-message marker terminating a frame
pub const END_OF_MESSAGE: u8 = 0x1C;

/// Optional trailer following the end-of-message marker
pub const FRAME_TRAILER: u8 = 0x0D;

/// MLLP-style frame codec
///
/// Decodes to raw payload bytes; encodes text lines back to the client.
#[derive(Debug, Default)]
pub struct FrameCodec;

impl Decoder for FrameCodec {
    type Item = Bytes;
    type Error = StreamError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // Framing bytes before the payload carry no content: the block
        // start, and any trailer left over from the previous frame.
        while let Some(&byte) = src.first() {
            if byte == BLOCK_START || byte == FRAME_TRAILER || byte == b'\n' {
                src.advance(1);
            } else {
                break;
            }
        }

        match src.iter().position(|&b| b == END_OF_MESSAGE) {
            Some(end) => {
                let frame = src.split_to(end).freeze();
                src.advance(1);
                Ok(Some(frame))
            }
            // Partial arrival; wait for the marker
            None => Ok(None),
        }
    }
}

impl Encoder<String> for FrameCodec {
    type Error = StreamError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(line.len() + 3);
        dst.put_u8(BLOCK_START);
        dst.put_slice(line.as_bytes());
        dst.put_u8(END_OF_MESSAGE);
        dst.put_u8(FRAME_TRAILER);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut FrameCodec, buf: &mut BytesMut) -> Vec<Bytes> {
        let mut frames = Vec::new();
        while let Some(frame) = codec.decode(buf).unwrap() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn test_decode_wrapped_frame() {
        let mut codec = FrameCodec;
        let mut buf = BytesMut::from(&b"\x0b[{}]\x1c\x0d"[..]);

        let frames = decode_all(&mut codec, &mut buf);
        assert_eq!(frames, vec![Bytes::from_static(b"[{}]")]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_bare_frame() {
        let mut codec = FrameCodec;
        let mut buf = BytesMut::from(&b"[{}]\x1c"[..]);

        let frames = decode_all(&mut codec, &mut buf);
        assert_eq!(frames, vec![Bytes::from_static(b"[{}]")]);
    }

    #[test]
    fn test_decode_waits_for_end_marker() {
        let mut codec = FrameCodec;
        let mut buf = BytesMut::new();

        buf.extend_from_slice(b"\x0b[{\"patient\":");
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"{\"id\":\"8173\"}}");
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"]\x1c\x0d");
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&frame[..], b"[{\"patient\":{\"id\":\"8173\"}}]");
    }

    #[test]
    fn test_decode_two_frames_in_one_buffer() {
        let mut codec = FrameCodec;
        let mut buf = BytesMut::from(&b"\x0bfirst\x1c\x0d\x0bsecond\x1c\x0d"[..]);

        let frames = decode_all(&mut codec, &mut buf);
        assert_eq!(
            frames,
            vec![Bytes::from_static(b"first"), Bytes::from_static(b"second")]
        );
    }

    #[test]
    fn test_decode_keeps_interior_nul_padding() {
        let mut codec = FrameCodec;
        let mut buf = BytesMut::from(&b"[{}]\x00\x00\x1c"[..]);

        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&frame[..], b"[{}]\x00\x00");
    }

    #[test]
    fn test_decode_empty_frame() {
        let mut codec = FrameCodec;
        let mut buf = BytesMut::from(&b"\x1c"[..]);

        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn test_encode_wraps_line() {
        let mut codec = FrameCodec;
        let mut buf = BytesMut::new();

        codec
            .encode("written=4 silent=0 failed=1".to_string(), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"\x0bwritten=4 silent=0 failed=1\x1c\x0d");
    }

    #[test]
    fn test_encoded_reply_decodes_back() {
        let mut codec = FrameCodec;
        let mut buf = BytesMut::new();
        codec.encode("error: bad payload".to_string(), &mut buf).unwrap();

        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&frame[..], b"error: bad payload");
    }
}
