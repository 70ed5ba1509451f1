//! Host-side driver for the sub-GHz NPI serial link
//!
//! This crate turns an opaque byte channel — normally a serial port to the
//! RF microcontroller — into a live radio link. Four tasks cooperate over
//! channels:
//!
//! - a **reader** that reassembles inbound bytes into OTA frames and
//!   control replies;
//! - a **writer** that serializes outbound frames, pausing whenever the
//!   device squelches the host;
//! - a **coordinator** that intercepts the device's flow-control replies
//!   and pairs the rest with pending control requests;
//! - a **dispatcher** that routes received OTA frames to handlers
//!   registered by program id, by source address, or universally.
//!
//! The client surface is [`Link`]: OTA transmit with [`Link::send`],
//! synchronous control commands with [`Link::ctrl`] (or the typed wrappers
//! like [`Link::get_radio`]), handler registration, and [`Link::close`].
//!
//! # Example
//!
//! ```rust,ignore
//! let port = open_serial_port("/dev/ttyACM0", 115_200)?;
//! let link = Link::attach(port);
//!
//! let id = link.get_identifier().await?;
//! link.set_rx_on(true).await?;
//! link.send(0xDEAD0001, 0xFFFF, b"hello over the air")?;
//! ```

mod ctrl;
mod dispatch;
mod error;
mod link;
mod phy;

pub use dispatch::FrameHandler;
pub use error::LinkError;
pub use link::{Link, LinkConfig};
