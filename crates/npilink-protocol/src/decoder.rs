//! Inbound frame reassembly.
//!
//! Bytes come off the serial port in arbitrary chunks: a read may contain a
//! partial frame, several frames, or line noise between frames. The decoder
//! reassembles frames one byte at a time so callers never have to reason
//! about read boundaries.

use crate::constants::*;
use crate::frame::{xor_checksum, ControlReply, RadioFrame};

/// A frame parsed off the inbound byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// An over-the-air frame received by the radio.
    Radio(RadioFrame),
    /// A control reply from the device.
    Ctrl(ControlReply),
}

/// Incremental decoder for the inbound byte stream.
///
/// While idle, the decoder scans for an OTA (`0xAE`) or control-reply
/// (`0xBA`) start byte and discards everything else, `0xBD` included. Once a
/// start byte is captured it accumulates into a fixed assembly buffer; the
/// expected total is known as soon as the length byte arrives (offset 8 for
/// OTA frames, offset 3 for control replies). A completed frame is emitted
/// only if its trailing checksum matches; otherwise it is dropped and the
/// scan resumes. A length byte that implies a frame larger than the assembly
/// buffer aborts the assembly.
///
/// Emitted payloads are freshly allocated, so they stay valid while the
/// decoder keeps running.
#[derive(Debug)]
pub struct FrameDecoder {
    buf: [u8; ASSEMBLY_BUF_SIZE],
    pos: usize,
    expected: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    /// Create an idle decoder.
    pub fn new() -> Self {
        FrameDecoder {
            buf: [0; ASSEMBLY_BUF_SIZE],
            pos: 0,
            expected: 0,
        }
    }

    /// Consume one byte; returns a frame when `byte` completes one.
    pub fn feed(&mut self, byte: u8) -> Option<InboundFrame> {
        if self.pos == 0 {
            if byte == OTA_START || byte == CTRL_REPLY_START {
                self.buf[0] = byte;
                self.pos = 1;
            }
            return None;
        }

        if self.expected == 0 {
            if self.buf[0] == OTA_START && self.pos == 8 {
                self.expected = OTA_OVERHEAD + byte as usize;
            } else if self.buf[0] == CTRL_REPLY_START && self.pos == 3 {
                self.expected = CTRL_REPLY_OVERHEAD + byte as usize;
            }
            if self.expected > ASSEMBLY_BUF_SIZE {
                // The length byte promises more than the assembly buffer
                // holds; drop the frame and go back to scanning.
                self.reset();
                return None;
            }
        }

        self.buf[self.pos] = byte;
        self.pos += 1;

        if self.expected != 0 && self.pos == self.expected {
            let frame = self.finish();
            self.reset();
            return frame;
        }
        None
    }

    fn reset(&mut self) {
        self.pos = 0;
        self.expected = 0;
    }

    /// Verify and decode the completed frame in the assembly buffer.
    fn finish(&self) -> Option<InboundFrame> {
        let frame = &self.buf[..self.pos];
        let checksum = xor_checksum(&frame[1..frame.len() - 1]);
        if frame[frame.len() - 1] != checksum {
            return None;
        }

        match frame[0] {
            OTA_START => {
                let len = frame[8] as usize;
                Some(InboundFrame::Radio(RadioFrame {
                    address: u32::from_le_bytes([frame[1], frame[2], frame[3], frame[4]]),
                    program: u16::from_le_bytes([frame[5], frame[6]]),
                    rssi: frame[7] as i8,
                    payload: frame[9..9 + len].to_vec(),
                }))
            }
            CTRL_REPLY_START => {
                let len = frame[3] as usize;
                Some(InboundFrame::Ctrl(ControlReply {
                    command: frame[1],
                    status: frame[2],
                    reply: frame[4..4 + len].to_vec(),
                }))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a received OTA frame with a live RSSI byte.
    fn encode_ota_rx(address: u32, program: u16, rssi: i8, payload: &[u8]) -> Vec<u8> {
        let mut buf = vec![OTA_START];
        buf.extend_from_slice(&address.to_le_bytes());
        buf.extend_from_slice(&program.to_le_bytes());
        buf.push(rssi as u8);
        buf.push(payload.len() as u8);
        buf.extend_from_slice(payload);
        buf.push(xor_checksum(&buf[1..]));
        buf
    }

    /// Build a device → host control reply.
    fn encode_ctrl_reply(command: u8, status: u8, reply: &[u8]) -> Vec<u8> {
        let mut buf = vec![CTRL_REPLY_START, command, status, reply.len() as u8];
        buf.extend_from_slice(reply);
        buf.push(xor_checksum(&buf[1..]));
        buf
    }

    fn feed_all(decoder: &mut FrameDecoder, bytes: &[u8]) -> Vec<InboundFrame> {
        bytes.iter().filter_map(|&b| decoder.feed(b)).collect()
    }

    #[test]
    fn parses_ota_frame_amid_garbage() {
        let mut stream = b"COALCARS".to_vec();
        stream.extend_from_slice(&encode_ota_rx(0xDEADBEEF, 0x6933, 0x0A, b"SIXTY NINE"));
        stream.extend_from_slice(b"DERAILED");

        let mut decoder = FrameDecoder::new();
        let frames = feed_all(&mut decoder, &stream);

        assert_eq!(
            frames,
            vec![InboundFrame::Radio(RadioFrame {
                address: 0xDEADBEEF,
                program: 0x6933,
                rssi: 0x0A,
                payload: b"SIXTY NINE".to_vec(),
            })]
        );
    }

    #[test]
    fn parses_frame_split_across_reads() {
        let wire = encode_ota_rx(0x01020304, 0xBEEF, -42, b"chunky");

        // Every split point must reassemble to the same frame.
        for split in 1..wire.len() {
            let mut decoder = FrameDecoder::new();
            let mut frames = feed_all(&mut decoder, &wire[..split]);
            frames.extend(feed_all(&mut decoder, &wire[split..]));

            assert_eq!(frames.len(), 1, "split at {split}");
            let InboundFrame::Radio(frame) = &frames[0] else {
                panic!("expected OTA frame at split {split}");
            };
            assert_eq!(frame.address, 0x01020304);
            assert_eq!(frame.rssi, -42);
            assert_eq!(frame.payload, b"chunky");
        }
    }

    #[test]
    fn start_byte_as_final_byte_of_read() {
        let wire = encode_ota_rx(7, 8, 0, b"x");
        let mut decoder = FrameDecoder::new();

        let mut frames = feed_all(&mut decoder, &[0x00, 0x01, wire[0]]);
        frames.extend(feed_all(&mut decoder, &wire[1..]));
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn parses_control_reply() {
        let wire = encode_ctrl_reply(0xDE, STATUS_OK, &[0x01, 0x02]);
        let mut decoder = FrameDecoder::new();
        let frames = feed_all(&mut decoder, &wire);

        assert_eq!(
            frames,
            vec![InboundFrame::Ctrl(ControlReply {
                command: 0xDE,
                status: STATUS_OK,
                reply: vec![0x01, 0x02],
            })]
        );
    }

    #[test]
    fn parses_back_to_back_frames() {
        let mut stream = encode_ota_rx(1, 2, 3, b"one");
        stream.extend_from_slice(&encode_ctrl_reply(0x02, STATUS_OK, &[0xFF]));
        stream.extend_from_slice(&encode_ota_rx(4, 5, 6, b""));

        let mut decoder = FrameDecoder::new();
        let frames = feed_all(&mut decoder, &stream);
        assert_eq!(frames.len(), 3);
        assert!(matches!(&frames[0], InboundFrame::Radio(f) if f.payload == b"one"));
        assert!(matches!(&frames[1], InboundFrame::Ctrl(r) if r.command == 0x02));
        assert!(matches!(&frames[2], InboundFrame::Radio(f) if f.payload.is_empty()));
    }

    #[test]
    fn zero_length_payload_is_valid() {
        let wire = encode_ota_rx(0xAABBCCDD, 0x0102, 5, b"");
        assert_eq!(wire.len(), OTA_OVERHEAD);

        let mut decoder = FrameDecoder::new();
        let frames = feed_all(&mut decoder, &wire);
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn checksum_failure_drops_frame_and_resumes() {
        let mut bad = encode_ota_rx(1, 2, 3, b"corrupt me");
        let last = bad.len() - 1;
        bad[last] ^= 0xFF;
        let good = encode_ctrl_reply(0x07, STATUS_OK, &[0x01]);

        let mut decoder = FrameDecoder::new();
        let mut frames = feed_all(&mut decoder, &bad);
        frames.extend(feed_all(&mut decoder, &good));

        assert_eq!(
            frames,
            vec![InboundFrame::Ctrl(ControlReply {
                command: 0x07,
                status: STATUS_OK,
                reply: vec![0x01],
            })]
        );
    }

    #[test]
    fn request_start_byte_is_not_a_frame_start() {
        // 0xBD only ever travels host → device; on the inbound stream it is
        // garbage and must not open an assembly.
        let mut stream = vec![CTRL_REQUEST_START, 0x02, 0x00, 0x02];
        stream.extend_from_slice(&encode_ota_rx(9, 9, 9, b"after"));

        let mut decoder = FrameDecoder::new();
        let frames = feed_all(&mut decoder, &stream);
        assert_eq!(frames.len(), 1);
        assert!(matches!(&frames[0], InboundFrame::Radio(f) if f.payload == b"after"));
    }

    #[test]
    fn oversized_length_aborts_assembly() {
        // Length byte 0xF7 implies a 257-byte OTA frame, one past the
        // assembly buffer.
        let mut stream = vec![OTA_START, 0, 0, 0, 0, 0, 0, 0, 0xF7];
        stream.extend_from_slice(&vec![0u8; 64]);
        stream.extend_from_slice(&encode_ctrl_reply(0x03, STATUS_OK, &[]));

        let mut decoder = FrameDecoder::new();
        let frames = feed_all(&mut decoder, &stream);
        assert_eq!(frames.len(), 1);
        assert!(matches!(&frames[0], InboundFrame::Ctrl(r) if r.command == 0x03));
    }

    #[test]
    fn largest_ota_frame_fills_assembly_buffer() {
        // Length 0xF6 gives a 256-byte frame, exactly the buffer size.
        let payload = vec![0x5A; 246];
        let wire = encode_ota_rx(0xFEEDF00D, 0xCAFE, 0, &payload);
        assert_eq!(wire.len(), ASSEMBLY_BUF_SIZE);

        let mut decoder = FrameDecoder::new();
        let frames = feed_all(&mut decoder, &wire);
        assert_eq!(frames.len(), 1);
        assert!(matches!(&frames[0], InboundFrame::Radio(f) if f.payload == payload));
    }

    #[test]
    fn serialized_tx_frame_parses_back() {
        let frame = RadioFrame::new(0x00C0FFEE, 0x1234, b"roundtrip".to_vec());
        let wire = frame.serialize().unwrap();

        let mut decoder = FrameDecoder::new();
        let frames = feed_all(&mut decoder, &wire);
        assert_eq!(frames, vec![InboundFrame::Radio(frame)]);
    }

    #[test]
    fn rssi_is_sign_extended() {
        let wire = encode_ota_rx(1, 1, -100, b"weak");
        let mut decoder = FrameDecoder::new();
        let frames = feed_all(&mut decoder, &wire);
        assert!(matches!(&frames[0], InboundFrame::Radio(f) if f.rssi == -100));
    }
}
