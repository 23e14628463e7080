use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::packet::control::{AppDataPacket, CompoundControlPacket, SdesChunk};
use crate::packet::DataPacket;
use crate::participant::RtpParticipant;
use crate::session::RtpSession;
use crate::RtpSsrc;

/// Why a session terminated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationCause {
    /// `terminate` was invoked by the application
    Requested,

    /// The session received its own packets back on the data endpoint
    LoopDetected,

    /// Foreign SSRC collisions exceeded the configured limit
    CollisionLimitExceeded(u32),
}

impl fmt::Display for TerminationCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationCause::Requested => write!(f, "Session terminated"),
            TerminationCause::LoopDetected => {
                write!(f, "Loop detected: session is directly receiving its own packets")
            }
            TerminationCause::CollisionLimitExceeded(collisions) => {
                write!(f, "Loop detected after {} SSRC collisions", collisions)
            }
        }
    }
}

/// Observer of inbound RTP data
pub trait RtpSessionDataListener: Send + Sync {
    /// An RTP packet was accepted and attributed to a participant
    fn data_packet_received(
        &self,
        session: &RtpSession,
        participant: &RtpParticipant,
        packet: &DataPacket,
    );
}

/// Observer of inbound RTCP traffic
pub trait RtpSessionControlListener: Send + Sync {
    /// A raw compound arrived; only called when automated RTCP handling
    /// is off
    fn control_packet_received(&self, session: &RtpSession, compound: &CompoundControlPacket) {
        let _ = (session, compound);
    }

    /// An application-defined packet arrived; called regardless of the
    /// automation setting
    fn app_data_received(&self, session: &RtpSession, packet: &AppDataPacket) {
        let _ = (session, packet);
    }
}

/// Observer of session membership and lifecycle events
pub trait RtpSessionEventListener: Send + Sync {
    /// The local SSRC was rotated after a collision
    fn resolved_ssrc_conflict(&self, session: &RtpSession, old_ssrc: RtpSsrc, new_ssrc: RtpSsrc) {
        let _ = (session, old_ssrc, new_ssrc);
    }

    /// A previously unknown source was admitted from an RTP data packet
    fn participant_joined_from_data(
        &self,
        session: &RtpSession,
        participant: &RtpParticipant,
        packet: &DataPacket,
    ) {
        let _ = (session, participant, packet);
    }

    /// A previously unknown source was admitted from an SDES chunk
    fn participant_joined_from_control(
        &self,
        session: &RtpSession,
        participant: &RtpParticipant,
        chunk: &SdesChunk,
    ) {
        let _ = (session, participant, chunk);
    }

    /// An SDES chunk updated a known participant's description
    fn participant_data_updated(&self, session: &RtpSession, participant: &RtpParticipant) {
        let _ = (session, participant);
    }

    /// A participant announced departure with a BYE
    fn participant_left(&self, session: &RtpSession, participant: &RtpParticipant) {
        let _ = (session, participant);
    }

    /// The session terminated
    fn session_terminated(&self, session: &RtpSession, cause: &TerminationCause) {
        let _ = (session, cause);
    }
}

/// Append-only observer list with copy-on-write snapshots
///
/// Registration concurrent with a dispatch never corrupts the iteration:
/// the dispatch walks the snapshot it took, and later dispatches see the
/// updated list.
pub(crate) struct ListenerList<L: ?Sized> {
    entries: RwLock<Arc<Vec<Arc<L>>>>,
}

impl<L: ?Sized> ListenerList<L> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Arc::new(Vec::new())),
        }
    }

    pub fn add(&self, listener: Arc<L>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = Vec::with_capacity(entries.len() + 1);
        next.extend(entries.iter().cloned());
        next.push(listener);
        *entries = Arc::new(next);
    }

    /// Remove by pointer identity; whether an entry was removed
    pub fn remove(&self, listener: &Arc<L>) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        let next: Vec<Arc<L>> = entries
            .iter()
            .filter(|entry| !Arc::ptr_eq(entry, listener))
            .cloned()
            .collect();
        let removed = next.len() != before;
        *entries = Arc::new(next);
        removed
    }

    pub fn snapshot(&self) -> Arc<Vec<Arc<L>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        *entries = Arc::new(Vec::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_termination_cause_display() {
        assert_eq!(TerminationCause::Requested.to_string(), "Session terminated");
        assert!(TerminationCause::LoopDetected.to_string().starts_with("Loop detected"));
        assert_eq!(
            TerminationCause::CollisionLimitExceeded(4).to_string(),
            "Loop detected after 4 SSRC collisions"
        );
    }

    #[test]
    fn test_listener_list_snapshot_isolation() {
        let list: ListenerList<String> = ListenerList::new();
        list.add(Arc::new("a".to_string()));

        let snapshot = list.snapshot();
        list.add(Arc::new("b".to_string()));

        // The earlier snapshot is untouched by the registration.
        assert_eq!(snapshot.len(), 1);
        assert_eq!(list.snapshot().len(), 2);
    }

    #[test]
    fn test_listener_list_removes_by_identity() {
        let list: ListenerList<String> = ListenerList::new();
        let first = Arc::new("x".to_string());
        let second = Arc::new("x".to_string());
        list.add(first.clone());
        list.add(second.clone());

        // Equal contents, distinct identity: only `first` goes.
        assert!(list.remove(&first));
        let snapshot = list.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert!(Arc::ptr_eq(&snapshot[0], &second));

        assert!(!list.remove(&first));
    }

    #[test]
    fn test_listener_list_clear() {
        let list: ListenerList<String> = ListenerList::new();
        list.add(Arc::new("a".to_string()));
        list.clear();
        assert!(list.snapshot().is_empty());
    }
}
