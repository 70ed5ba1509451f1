//! Link error types.

use npilink_protocol::{ControlStatus, ProtocolError};
use thiserror::Error;

/// Errors surfaced by the link layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The PHY read or write path failed, or the link was closed.
    #[error("NPI link faulted")]
    LinkFaulted,

    /// No reply to a control request arrived within the deadline.
    #[error("control request timed out")]
    CtrlTimeout,

    /// The device answered a control request with a non-OK status.
    #[error("device returned status: {0}")]
    CtrlStatus(ControlStatus),

    /// The link was already down when `close` was called.
    #[error("link already down")]
    DoubleClose,

    /// A frame could not be encoded or a reply payload was malformed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
