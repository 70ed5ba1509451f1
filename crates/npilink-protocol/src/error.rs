//! Protocol error types.

use thiserror::Error;

use crate::constants::*;

/// Errors from encoding frames or interpreting reply payloads.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The payload or data field does not fit in a single frame.
    #[error("payload too long: maximum {max} bytes, got {actual}")]
    PayloadTooLong {
        /// Largest length a frame can carry.
        max: usize,
        /// Length that was offered.
        actual: usize,
    },

    /// A control reply payload had the wrong length for its command.
    #[error("unexpected reply length: expected {expected} bytes, got {actual}")]
    ReplyLength {
        /// Length the command's reply is defined to have.
        expected: usize,
        /// Length that arrived.
        actual: usize,
    },

    /// A reply field that must be a string was not valid UTF-8.
    #[error("invalid UTF-8 in reply string")]
    InvalidUtf8,
}

/// Status byte of a control reply, decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlStatus {
    /// Command completed successfully.
    Ok,
    /// The device did not recognize the command code.
    UnknownCommand,
    /// The control frame was malformed.
    MalformedCtrl,
    /// A command parameter was out of bounds.
    ParameterOutOfBounds,
    /// The firmware was built without this feature.
    FeatureNotImplemented,
    /// The command failed.
    Error,
    /// A status byte outside the defined set.
    Unknown(u8),
}

impl std::fmt::Display for ControlStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlStatus::Ok => write!(f, "OK"),
            ControlStatus::UnknownCommand => write!(f, "unknown command"),
            ControlStatus::MalformedCtrl => write!(f, "malformed control frame"),
            ControlStatus::ParameterOutOfBounds => write!(f, "parameter out of bounds"),
            ControlStatus::FeatureNotImplemented => write!(f, "feature not implemented"),
            ControlStatus::Error => write!(f, "error"),
            ControlStatus::Unknown(code) => write!(f, "unknown status (0x{:02X})", code),
        }
    }
}

impl From<u8> for ControlStatus {
    fn from(code: u8) -> Self {
        match code {
            STATUS_OK => ControlStatus::Ok,
            STATUS_UNKNOWN_COMMAND => ControlStatus::UnknownCommand,
            STATUS_MALFORMED_CTRL => ControlStatus::MalformedCtrl,
            STATUS_PARAMETER_OUT_OF_BOUNDS => ControlStatus::ParameterOutOfBounds,
            STATUS_FEATURE_NOT_IMPLEMENTED => ControlStatus::FeatureNotImplemented,
            STATUS_ERROR => ControlStatus::Error,
            _ => ControlStatus::Unknown(code),
        }
    }
}

impl From<ControlStatus> for u8 {
    fn from(status: ControlStatus) -> Self {
        match status {
            ControlStatus::Ok => STATUS_OK,
            ControlStatus::UnknownCommand => STATUS_UNKNOWN_COMMAND,
            ControlStatus::MalformedCtrl => STATUS_MALFORMED_CTRL,
            ControlStatus::ParameterOutOfBounds => STATUS_PARAMETER_OUT_OF_BOUNDS,
            ControlStatus::FeatureNotImplemented => STATUS_FEATURE_NOT_IMPLEMENTED,
            ControlStatus::Error => STATUS_ERROR,
            ControlStatus::Unknown(code) => code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrip() {
        for code in 0u8..=0x06 {
            let status = ControlStatus::from(code);
            assert_eq!(u8::from(status), code);
        }
        assert_eq!(ControlStatus::from(0x7F), ControlStatus::Unknown(0x7F));
        assert_eq!(u8::from(ControlStatus::Unknown(0x7F)), 0x7F);
    }

    #[test]
    fn status_display() {
        assert_eq!(ControlStatus::Ok.to_string(), "OK");
        assert_eq!(
            ControlStatus::ParameterOutOfBounds.to_string(),
            "parameter out of bounds"
        );
        assert_eq!(ControlStatus::Unknown(0xAB).to_string(), "unknown status (0xAB)");
    }
}
