use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::packet::control::SdesChunk;
use crate::participant::RtpParticipant;
use crate::{RtpSequenceNumber, RtpSsrc};

/// Sentinel for "no packet seen yet"; above any representable sequence
/// number so the first inbound packet is always accepted.
const NO_SEQUENCE: u32 = u32::MAX;

/// Per-session state attached to one remote participant
///
/// Contexts are shared between the registry, in-flight dispatches and the
/// application, so all mutable state is atomic or behind the participant
/// lock. Counters are monotonic between resets; the BYE and SDES flags are
/// latched and never cleared.
#[derive(Debug)]
pub struct ParticipantContext {
    participant: RwLock<RtpParticipant>,
    last_sequence_number: AtomicU32,
    sent_packets: AtomicU64,
    sent_bytes: AtomicU64,
    received_packets: AtomicU64,
    received_bytes: AtomicU64,
    bye_received: AtomicBool,
    sdes_received: AtomicBool,
}

impl ParticipantContext {
    /// Wrap a participant in a fresh context
    pub fn new(participant: RtpParticipant) -> Self {
        Self {
            participant: RwLock::new(participant),
            last_sequence_number: AtomicU32::new(NO_SEQUENCE),
            sent_packets: AtomicU64::new(0),
            sent_bytes: AtomicU64::new(0),
            received_packets: AtomicU64::new(0),
            received_bytes: AtomicU64::new(0),
            bye_received: AtomicBool::new(false),
            sdes_received: AtomicBool::new(false),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RtpParticipant> {
        self.participant.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RtpParticipant> {
        self.participant.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the participant record
    pub fn participant(&self) -> RtpParticipant {
        self.read().clone()
    }

    /// SSRC of the participant
    pub fn ssrc(&self) -> RtpSsrc {
        self.read().ssrc
    }

    /// Current RTP data endpoint
    pub fn data_address(&self) -> SocketAddr {
        self.read().data_address
    }

    /// Current RTCP control endpoint
    pub fn control_address(&self) -> SocketAddr {
        self.read().control_address
    }

    /// Rebind the data endpoint (NAT repair)
    pub fn update_data_address(&self, address: SocketAddr) {
        self.write().data_address = address;
    }

    /// Rebind the control endpoint (NAT repair)
    pub fn update_control_address(&self, address: SocketAddr) {
        self.write().control_address = address;
    }

    /// Merge descriptive fields from an SDES chunk; whether anything
    /// changed
    pub fn merge_sdes_chunk(&self, chunk: &SdesChunk) -> bool {
        self.write().update_from_sdes_chunk(chunk)
    }

    /// Highest sequence number seen, or `None` before the first packet
    pub fn last_sequence_number(&self) -> Option<RtpSequenceNumber> {
        match self.last_sequence_number.load(Ordering::Acquire) {
            NO_SEQUENCE => None,
            value => Some(value as RtpSequenceNumber),
        }
    }

    /// Record the sequence number of an accepted packet
    pub fn set_last_sequence_number(&self, sequence_number: RtpSequenceNumber) {
        self.last_sequence_number.store(sequence_number as u32, Ordering::Release);
    }

    /// Count an outbound packet addressed to this participant
    pub fn record_sent(&self, bytes: usize) {
        self.sent_packets.fetch_add(1, Ordering::Relaxed);
        self.sent_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Count an inbound packet from this participant
    pub fn record_received(&self, bytes: usize) {
        self.received_packets.fetch_add(1, Ordering::Relaxed);
        self.received_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Packets sent to this participant since the last report
    pub fn sent_packets(&self) -> u64 {
        self.sent_packets.load(Ordering::Relaxed)
    }

    /// Payload octets sent to this participant since the last report
    pub fn sent_bytes(&self) -> u64 {
        self.sent_bytes.load(Ordering::Relaxed)
    }

    /// Packets received from this participant
    pub fn received_packets(&self) -> u64 {
        self.received_packets.load(Ordering::Relaxed)
    }

    /// Payload octets received from this participant
    pub fn received_bytes(&self) -> u64 {
        self.received_bytes.load(Ordering::Relaxed)
    }

    /// Take the send counters for a sender report, resetting them
    pub fn capture_and_reset_send_stats(&self) -> (u64, u64) {
        let packets = self.sent_packets.swap(0, Ordering::Relaxed);
        let bytes = self.sent_bytes.swap(0, Ordering::Relaxed);
        (packets, bytes)
    }

    /// Latch the BYE flag; the context stays registered but is excluded
    /// from outbound fanout
    pub fn mark_bye_received(&self) {
        self.bye_received.store(true, Ordering::Release);
    }

    /// Whether a BYE has been received from this participant
    pub fn bye_received(&self) -> bool {
        self.bye_received.load(Ordering::Acquire)
    }

    /// Latch the SDES flag; set only for participants created from an
    /// SDES chunk, whose description is considered authoritative
    pub fn mark_sdes_received(&self) {
        self.sdes_received.store(true, Ordering::Release);
    }

    /// Whether this context was created from an SDES chunk
    pub fn sdes_received(&self) -> bool {
        self.sdes_received.load(Ordering::Acquire)
    }
}
