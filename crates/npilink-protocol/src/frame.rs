//! Frame types and serialization.
//!
//! Wire layouts (all integers little-endian):
//!
//! ```text
//! OTA frame:        0xAE  addr[4]  program[2]  rssi  len  payload[len]  cksum
//! Control request:  0xBD  command  len  data[len]  cksum
//! Control reply:    0xBA  command  status  len  reply[len]  cksum
//! ```
//!
//! The checksum is the XOR of every byte after the start byte, up to but not
//! including the checksum byte itself.

use bytes::BufMut;

use crate::constants::*;
use crate::error::ProtocolError;

/// XOR checksum over a byte span.
pub fn xor_checksum(buf: &[u8]) -> u8 {
    buf.iter().fold(0u8, |acc, b| acc ^ b)
}

/// An over-the-air radio frame.
///
/// `address` is the source address of a received frame and the destination
/// address of a frame to be transmitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioFrame {
    /// Source (RX) or destination (TX) address.
    pub address: u32,
    /// 16-bit application selector.
    pub program: u16,
    /// Signal strength of a received frame. Always 0 on transmit frames.
    pub rssi: i8,
    /// Application payload, at most [`MAX_PAYLOAD`] bytes.
    pub payload: Vec<u8>,
}

impl RadioFrame {
    /// Create a frame to be transmitted. The RSSI field is zero.
    pub fn new(address: u32, program: u16, payload: impl Into<Vec<u8>>) -> Self {
        RadioFrame {
            address,
            program,
            rssi: 0,
            payload: payload.into(),
        }
    }

    /// Serialize for transmission. The RSSI byte is written as zero
    /// regardless of the field's value.
    pub fn serialize(&self) -> Result<Vec<u8>, ProtocolError> {
        if self.payload.len() > MAX_PAYLOAD {
            return Err(ProtocolError::PayloadTooLong {
                max: MAX_PAYLOAD,
                actual: self.payload.len(),
            });
        }
        let mut buf = Vec::with_capacity(OTA_OVERHEAD + self.payload.len());
        buf.put_u8(OTA_START);
        buf.put_u32_le(self.address);
        buf.put_u16_le(self.program);
        buf.put_u8(0); // RSSI carries no meaning on transmit
        buf.put_u8(self.payload.len() as u8);
        buf.put_slice(&self.payload);
        buf.put_u8(xor_checksum(&buf[1..]));
        Ok(buf)
    }
}

/// A host → device control request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRequest {
    /// Command code.
    pub command: u8,
    /// Command data, at most [`MAX_PAYLOAD`] bytes.
    pub data: Vec<u8>,
}

impl ControlRequest {
    /// Create a request.
    pub fn new(command: u8, data: impl Into<Vec<u8>>) -> Self {
        ControlRequest {
            command,
            data: data.into(),
        }
    }

    /// Serialize to the 0xBD wire form.
    pub fn serialize(&self) -> Result<Vec<u8>, ProtocolError> {
        if self.data.len() > MAX_PAYLOAD {
            return Err(ProtocolError::PayloadTooLong {
                max: MAX_PAYLOAD,
                actual: self.data.len(),
            });
        }
        let mut buf = Vec::with_capacity(CTRL_REQUEST_OVERHEAD + self.data.len());
        buf.put_u8(CTRL_REQUEST_START);
        buf.put_u8(self.command);
        buf.put_u8(self.data.len() as u8);
        buf.put_slice(&self.data);
        buf.put_u8(xor_checksum(&buf[1..]));
        Ok(buf)
    }
}

/// A device → host control reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlReply {
    /// Command code this reply answers.
    pub command: u8,
    /// Status byte, [`STATUS_OK`] on success.
    pub status: u8,
    /// Reply data.
    pub reply: Vec<u8>,
}
