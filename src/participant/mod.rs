//! Participant identity and per-session state
//!
//! A participant is a source in the session, local or remote, identified
//! by its SSRC. Remote participants are discovered through inbound RTP
//! data or SDES chunks, or added explicitly by the application.

mod context;
mod registry;

pub use context::ParticipantContext;
pub use registry::ParticipantRegistry;

use rand::Rng;
use std::net::SocketAddr;

use crate::packet::DataPacket;
use crate::packet::control::{SdesChunk, SdesItemType};
use crate::RtpSsrc;

/// Stable identity of a local or remote RTP source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpParticipant {
    /// Synchronization source identifier
    pub ssrc: RtpSsrc,

    /// UDP endpoint for RTP data
    pub data_address: SocketAddr,

    /// UDP endpoint for RTCP control traffic
    pub control_address: SocketAddr,

    /// Canonical name (CNAME)
    pub cname: Option<String>,

    /// User name
    pub name: Option<String>,

    /// E-mail address
    pub email: Option<String>,

    /// Phone number
    pub phone: Option<String>,

    /// Geographic location
    pub location: Option<String>,

    /// Application or tool name
    pub tool: Option<String>,

    /// Notice/status
    pub note: Option<String>,

    /// SSRCs this participant has collided with; never reused
    conflicts: Vec<RtpSsrc>,
}

impl RtpParticipant {
    /// Create a participant with the given identity and endpoints
    pub fn new(ssrc: RtpSsrc, data_address: SocketAddr, control_address: SocketAddr) -> Self {
        Self {
            ssrc,
            data_address,
            control_address,
            cname: None,
            name: None,
            email: None,
            phone: None,
            location: None,
            tool: None,
            note: None,
            conflicts: Vec::new(),
        }
    }

    /// Create a participant with a randomly generated SSRC
    pub fn with_random_ssrc(data_address: SocketAddr, control_address: SocketAddr) -> Self {
        Self::new(rand::thread_rng().gen(), data_address, control_address)
    }

    /// Build a participant for a source first seen through an RTP data
    /// packet
    ///
    /// The control endpoint is assumed at the conventional data port + 1
    /// until an SDES arrives and repairs it.
    pub fn from_data_packet(origin: SocketAddr, packet: &DataPacket) -> Self {
        let mut control_address = origin;
        control_address.set_port(origin.port().saturating_add(1));
        Self::new(packet.ssrc, origin, control_address)
    }

    /// Build a participant for a source first seen through an SDES chunk
    ///
    /// The data endpoint is assumed at the conventional control port − 1
    /// until an RTP packet arrives and repairs it.
    pub fn from_sdes_chunk(origin: SocketAddr, chunk: &SdesChunk) -> Self {
        let mut data_address = origin;
        data_address.set_port(origin.port().saturating_sub(1));
        let mut participant = Self::new(chunk.ssrc, data_address, origin);
        participant.update_from_sdes_chunk(chunk);
        participant
    }

    /// Merge descriptive fields from an SDES chunk
    ///
    /// Returns whether anything changed.
    pub fn update_from_sdes_chunk(&mut self, chunk: &SdesChunk) -> bool {
        let mut changed = false;
        changed |= update_field(&mut self.cname, chunk.value_of(SdesItemType::Cname));
        changed |= update_field(&mut self.name, chunk.value_of(SdesItemType::Name));
        changed |= update_field(&mut self.email, chunk.value_of(SdesItemType::Email));
        changed |= update_field(&mut self.phone, chunk.value_of(SdesItemType::Phone));
        changed |= update_field(&mut self.location, chunk.value_of(SdesItemType::Location));
        changed |= update_field(&mut self.tool, chunk.value_of(SdesItemType::Tool));
        changed |= update_field(&mut self.note, chunk.value_of(SdesItemType::Note));
        changed
    }

    /// Pick a fresh SSRC after a collision with `observed`
    ///
    /// The observed value joins the conflict list; the replacement is drawn
    /// at random until it matches neither the list nor the current SSRC.
    /// The participant's SSRC is updated and the new value returned.
    pub fn resolve_ssrc_conflict(&mut self, observed: RtpSsrc) -> RtpSsrc {
        if !self.conflicts.contains(&observed) {
            self.conflicts.push(observed);
        }

        let mut rng = rand::thread_rng();
        loop {
            let candidate: RtpSsrc = rng.gen();
            if candidate != self.ssrc && !self.conflicts.contains(&candidate) {
                self.ssrc = candidate;
                return candidate;
            }
        }
    }
}

fn update_field(field: &mut Option<String>, value: Option<&str>) -> bool {
    match value {
        Some(value) if field.as_deref() != Some(value) => {
            *field = Some(value.to_string());
            true
        }
        _ => false,
    }
}

/// Outcome of an admission decision for an unknown source
pub enum ParticipantDecision {
    /// Admit the source with the given participant record
    Create(RtpParticipant),

    /// Drop the packet and do not create a participant
    Reject,
}

/// Policy consulted when RTP data arrives from an SSRC the session has
/// never seen
pub trait AdmissionPolicy: Send + Sync {
    /// Decide whether the source behind `origin` joins the session
    fn admit_unknown(&self, origin: SocketAddr, first_packet: &DataPacket) -> ParticipantDecision;
}

/// Default policy: every unknown source is admitted
pub struct AdmitAll;

impl AdmissionPolicy for AdmitAll {
    fn admit_unknown(&self, origin: SocketAddr, first_packet: &DataPacket) -> ParticipantDecision {
        ParticipantDecision::Create(RtpParticipant::from_data_packet(origin, first_packet))
    }
}
