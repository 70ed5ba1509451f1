//! Protocol constants
//!
//! Start bytes, control command codes, status codes, and frame sizing used
//! by the NPI serial protocol.

// ============================================================================
// Start bytes
// ============================================================================

/// Start byte of an OTA radio frame (either direction).
pub const OTA_START: u8 = 0xAE;
/// Start byte of a host → device control request.
pub const CTRL_REQUEST_START: u8 = 0xBD;
/// Start byte of a device → host control reply.
pub const CTRL_REPLY_START: u8 = 0xBA;

// ============================================================================
// Control command codes (host → device unless noted)
// ============================================================================

/// Device → host flow control: resume host transmission. Intercepted by the
/// PHY layer, never delivered to clients.
pub const CTRL_UNSQUELCH_HOST: u8 = 0x00;
/// Device → host flow control: pause host transmission. Intercepted by the
/// PHY layer, never delivered to clients.
pub const CTRL_SQUELCH_HOST: u8 = 0x01;
/// Read current radio parameters (RX state, frequency, TX power, TX tick).
pub const CTRL_GET_RF: u8 = 0x02;
/// Set the RF center frequency.
pub const CTRL_SET_CENTERFREQ: u8 = 0x03;
/// Set the TX power in dBm.
pub const CTRL_SET_TXPOWER: u8 = 0x04;
/// Switch the receiver on or off.
pub const CTRL_SET_RF_ON: u8 = 0x05;
/// Set (or clear with 0) the secondary listen address.
pub const CTRL_SET_ALTERNATE_ADDR: u8 = 0x06;
/// Read the IEEE address and the alternate address.
pub const CTRL_GET_ADDRESSES: u8 = 0x07;
/// Trigger transmission of any frames queued on the device.
pub const CTRL_RUN_TX: u8 = 0x08;
/// Set the automatic TX tick interval in milliseconds (0 disables).
pub const CTRL_SET_TX_TICK: u8 = 0x09;
/// Read the firmware's compiled-in identifier string.
pub const CTRL_GET_IDENTIFIER: u8 = 0x10;
/// Switch the device LEDs on or off.
pub const CTRL_SET_LEDS: u8 = 0x11;

// ============================================================================
// Status codes (control replies)
// ============================================================================

/// Command completed successfully.
pub const STATUS_OK: u8 = 0x00;
/// The device did not recognize the command code.
pub const STATUS_UNKNOWN_COMMAND: u8 = 0x01;
/// The control frame was malformed.
pub const STATUS_MALFORMED_CTRL: u8 = 0x02;
/// A command parameter was out of bounds.
pub const STATUS_PARAMETER_OUT_OF_BOUNDS: u8 = 0x03;
/// The firmware was built without this feature.
pub const STATUS_FEATURE_NOT_IMPLEMENTED: u8 = 0x04;
/// The command failed.
pub const STATUS_ERROR: u8 = 0x05;

// ============================================================================
// Frame sizing
// ============================================================================

/// Bytes of an OTA frame that are not payload:
/// start + address(4) + program(2) + rssi + length + checksum.
pub const OTA_OVERHEAD: usize = 10;
/// Bytes of a control request that are not data:
/// start + command + length + checksum.
pub const CTRL_REQUEST_OVERHEAD: usize = 4;
/// Bytes of a control reply that are not reply data:
/// start + command + status + length + checksum.
pub const CTRL_REPLY_OVERHEAD: usize = 5;

/// Size of the inbound frame-assembly buffer. A length byte that implies a
/// total frame larger than this aborts the assembly.
pub const ASSEMBLY_BUF_SIZE: usize = 256;
/// Largest payload or data field a single frame can carry.
pub const MAX_PAYLOAD: usize = 255;
