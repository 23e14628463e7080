//! RTP session core
//!
//! This crate provides the session engine for multiplexing real-time media
//! streams over UDP per RFC 3550: a per-session participant table keyed by
//! SSRC, automated RTCP membership handling (join, periodic description,
//! BYE on leave), SSRC collision detection and resolution, and observer
//! fanout for data, control and lifecycle events.
//!
//! The library is organized into several modules:
//!
//! - `packet`: RTP and RTCP packet definitions and codecs
//! - `participant`: participant identity, per-SSRC state and the registry
//! - `session`: the session engine and its listener interfaces
//! - `transport`: UDP endpoints for the data and control channels

mod error;

// Main modules
pub mod packet;
pub mod participant;
pub mod session;
pub mod transport;

// Re-export core types
pub use error::Error;

// Re-export common types from the packet module
pub use packet::DataPacket;
pub use packet::control::{
    AppDataPacket, ByePacket, CompoundControlPacket, ControlPacket,
    ControlPacketType, NtpTimestamp, ReceiverReportPacket, ReceptionReport,
    SdesChunk, SdesItem, SdesItemType, SenderReportPacket,
    SourceDescriptionPacket,
};

// Re-export participant types
pub use participant::{
    AdmissionPolicy, AdmitAll, ParticipantContext, ParticipantDecision,
    ParticipantRegistry, RtpParticipant,
};

// Re-export session types
pub use session::{
    RtpSession, RtpSessionConfig, RtpSessionControlListener,
    RtpSessionDataListener, RtpSessionEventListener, TerminationCause,
};

/// Typedef for RTP timestamp values
pub type RtpTimestamp = u32;

/// Typedef for RTP sequence numbers
pub type RtpSequenceNumber = u16;

/// Typedef for RTP synchronization source identifier
pub type RtpSsrc = u32;

/// Typedef for RTP contributing source identifier
pub type RtpCsrc = u32;

/// Result type for RTP session operations
pub type Result<T> = std::result::Result<T, Error>;
