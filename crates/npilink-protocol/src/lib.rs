//! Sub-GHz NPI wire protocol
//!
//! This crate defines the framed byte protocol spoken between a host and a
//! sub-GHz RF microcontroller over a UART. Three frame forms share an 8-bit
//! XOR checksum computed over every byte after the start byte, up to but not
//! including the checksum byte:
//!
//! - **OTA frames** (start byte `0xAE`, both directions): a radio packet that
//!   was received over the air or is queued for transmission.
//! - **Control requests** (start byte `0xBD`, host → device): a command code
//!   with optional configuration data.
//! - **Control replies** (start byte `0xBA`, device → host): a command code,
//!   a status byte, and optional reply data.
//!
//! All multi-byte integers on the wire are little-endian.
//!
//! The crate is I/O-free: [`FrameDecoder`] consumes bytes one at a time and
//! emits parsed frames, and the frame types serialize themselves to byte
//! vectors. Driving a serial port with these pieces is the host crate's job.

mod constants;
mod decoder;
mod error;
mod frame;
mod replies;

pub use constants::*;
pub use decoder::*;
pub use error::*;
pub use frame::*;
pub use replies::*;
