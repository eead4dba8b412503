//! Error types for the Meridim link.
//!
//! Transport faults (wrong-length datagrams, checksum failures, socket
//! errors) are recoverable by construction: the receive loop drops the
//! offending datagram and waits for the peer's next scheduled transmission.
//! Contract errors (an out-of-range motion-table index, starting a second
//! receive loop) indicate a programming mistake and surface to the caller.
//!
//! ```rust
//! use meridim::MeridimError;
//!
//! let err = MeridimError::length_mismatch(179);
//! assert!(err.is_transport_fault());
//!
//! let err = MeridimError::motion_index(30);
//! assert!(!err.is_transport_fault());
//! ```

use thiserror::Error;

use crate::frame::FRAME_BYTES;

/// Result type alias for Meridim link operations.
pub type Result<T, E = MeridimError> = std::result::Result<T, E>;

/// Main error type for frame codec and transport operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MeridimError {
    #[error("datagram length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("checksum validation failed: word sum {sum:#06x}, expected 0")]
    Checksum { sum: u16 },

    #[error("motion table index {index} out of range (valid: 0..{limit})")]
    MotionIndex { index: usize, limit: usize },

    #[error("socket error during {operation}")]
    Socket {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("receive loop is already running on this transport")]
    ReceiverRunning,
}

impl MeridimError {
    /// Returns whether this error is a transport fault that the link
    /// recovers from by dropping the datagram and carrying on.
    ///
    /// Contract errors (`MotionIndex`, `ReceiverRunning`) return false:
    /// they indicate caller bugs, not an unreliable medium.
    pub fn is_transport_fault(&self) -> bool {
        match self {
            MeridimError::LengthMismatch { .. } => true,
            MeridimError::Checksum { .. } => true,
            MeridimError::Socket { .. } => true,
            MeridimError::MotionIndex { .. } => false,
            MeridimError::ReceiverRunning => false,
        }
    }

    /// Helper constructor for wrong-length datagrams.
    pub fn length_mismatch(actual: usize) -> Self {
        MeridimError::LengthMismatch { expected: FRAME_BYTES, actual }
    }

    /// Helper constructor for checksum failures, carrying the offending sum.
    pub fn checksum(sum: u16) -> Self {
        MeridimError::Checksum { sum }
    }

    /// Helper constructor for out-of-range motion-table indices.
    pub fn motion_index(index: usize) -> Self {
        MeridimError::MotionIndex { index, limit: crate::frame::MOTION_ENTRIES }
    }

    /// Helper constructor for socket errors with operation context.
    pub fn socket(operation: &'static str, source: std::io::Error) -> Self {
        MeridimError::Socket { operation, source }
    }
}

impl From<std::io::Error> for MeridimError {
    fn from(err: std::io::Error) -> Self {
        MeridimError::Socket { operation: "socket I/O", source: err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_classification() {
        assert!(MeridimError::length_mismatch(90).is_transport_fault());
        assert!(MeridimError::checksum(0x1234).is_transport_fault());
        assert!(
            MeridimError::socket(
                "recv_from",
                std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"),
            )
            .is_transport_fault()
        );
        assert!(!MeridimError::motion_index(30).is_transport_fault());
        assert!(!MeridimError::ReceiverRunning.is_transport_fault());
    }

    #[test]
    fn messages_carry_context() {
        let msg = MeridimError::length_mismatch(179).to_string();
        assert!(msg.contains("180"));
        assert!(msg.contains("179"));

        let msg = MeridimError::motion_index(31).to_string();
        assert!(msg.contains("31"));
        assert!(msg.contains("30"));
    }

    #[test]
    fn error_traits() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<MeridimError>();

        let err = MeridimError::length_mismatch(0);
        let _: &dyn std::error::Error = &err;
    }

    #[test]
    fn io_error_converts_with_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::WouldBlock, "busy");
        let err: MeridimError = io_err.into();
        match err {
            MeridimError::Socket { source, .. } => {
                assert_eq!(source.to_string(), "busy");
            }
            other => panic!("expected Socket variant, got {other:?}"),
        }
    }
}
