use thiserror::Error;
use std::io;

/// Error type for RTP session operations
#[derive(Debug, Error, Clone)]
pub enum Error {
    /// Payload type outside the 7-bit range allowed by RFC 3550
    #[error("payload type must be in range [0;127], got {0}")]
    InvalidPayloadType(u8),

    /// Failed to bind a session endpoint
    #[error("failed to bind endpoint: {0}")]
    BindFailure(String),

    /// Configuration change attempted on a running session
    #[error("cannot modify configuration after the session has been initialized")]
    ConfigurationImmutable,

    /// Transport-level send failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Malformed RTP packet
    #[error("invalid RTP packet: {0}")]
    InvalidPacket(String),

    /// Malformed or unsupported RTCP content
    #[error("RTCP error: {0}")]
    Rtcp(String),

    /// Buffer too small to hold the packet being read or written
    #[error("buffer too small: need {required} but have {available}")]
    BufferTooSmall {
        required: usize,
        available: usize,
    },

    /// IO error when sending or receiving datagrams
    #[error("IO error: {0}")]
    Io(String),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
