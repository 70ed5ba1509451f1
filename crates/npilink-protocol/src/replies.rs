//! Typed views over control reply payloads.
//!
//! Commands that return structured data get a parse helper here so callers
//! never pick apart raw reply bytes.

use crate::error::ProtocolError;

/// Radio parameters returned by `CTRL_GET_RF`.
///
/// Reply layout: rx_on(1) + center_freq(4) + tx_power(1) + tx_tick(2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioParams {
    /// Whether the receiver is on.
    pub rx_on: bool,
    /// RF center frequency.
    pub center_freq: u32,
    /// TX power in dBm.
    pub tx_power_dbm: i8,
    /// Automatic TX tick interval in milliseconds, 0 if disabled.
    pub tx_tick_ms: u16,
}

impl RadioParams {
    /// Parse the 8-byte `GET_RF` reply payload.
    pub fn parse(reply: &[u8]) -> Result<Self, ProtocolError> {
        if reply.len() != 8 {
            return Err(ProtocolError::ReplyLength {
                expected: 8,
                actual: reply.len(),
            });
        }
        Ok(RadioParams {
            rx_on: reply[0] != 0,
            center_freq: u32::from_le_bytes([reply[1], reply[2], reply[3], reply[4]]),
            tx_power_dbm: reply[5] as i8,
            tx_tick_ms: u16::from_le_bytes([reply[6], reply[7]]),
        })
    }
}

/// Address pair returned by `CTRL_GET_ADDRESSES`.
///
/// Reply layout: ieee(4) + alternate(4), alternate 0 when not set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressPair {
    /// The device's fixed IEEE address.
    pub ieee: u32,
    /// The configured alternate listen address, 0 when not set.
    pub alternate: u32,
}

impl AddressPair {
    /// Parse the 8-byte `GET_ADDRESSES` reply payload.
    pub fn parse(reply: &[u8]) -> Result<Self, ProtocolError> {
        if reply.len() != 8 {
            return Err(ProtocolError::ReplyLength {
                expected: 8,
                actual: reply.len(),
            });
        }
        Ok(AddressPair {
            ieee: u32::from_le_bytes([reply[0], reply[1], reply[2], reply[3]]),
            alternate: u32::from_le_bytes([reply[4], reply[5], reply[6], reply[7]]),
        })
    }
}
