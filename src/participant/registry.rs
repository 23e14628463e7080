use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::participant::{ParticipantContext, RtpParticipant};
use crate::RtpSsrc;

/// Concurrent SSRC-to-context map
///
/// A single reader/writer lock guards the table. Lookups and outbound
/// fanout iteration run under the read lock; insert, remove and
/// get-or-create take the write lock. Transport writes are issued while
/// the read lock is held so recipient addresses remain valid for the
/// whole iteration; the lock is never acquired recursively.
#[derive(Debug, Default)]
pub struct ParticipantRegistry {
    table: RwLock<HashMap<RtpSsrc, Arc<ParticipantContext>>>,
}

impl ParticipantRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<RtpSsrc, Arc<ParticipantContext>>> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<RtpSsrc, Arc<ParticipantContext>>> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a participant; false when the SSRC is already registered
    pub fn insert(&self, participant: RtpParticipant) -> bool {
        let ssrc = participant.ssrc;
        let mut table = self.write();
        if table.contains_key(&ssrc) {
            return false;
        }
        table.insert(ssrc, Arc::new(ParticipantContext::new(participant)));
        true
    }

    /// Remove and return the context for an SSRC
    pub fn remove(&self, ssrc: RtpSsrc) -> Option<Arc<ParticipantContext>> {
        self.write().remove(&ssrc)
    }

    /// Look up the context for an SSRC
    pub fn get(&self, ssrc: RtpSsrc) -> Option<Arc<ParticipantContext>> {
        self.read().get(&ssrc).cloned()
    }

    /// Fetch the context for an SSRC, creating it from `create` when
    /// absent
    ///
    /// Returns the context and whether it was created by this call, or
    /// `None` when `create` declines (the packet that triggered the
    /// lookup must then be dropped).
    pub fn get_or_insert_with(
        &self,
        ssrc: RtpSsrc,
        create: impl FnOnce() -> Option<RtpParticipant>,
    ) -> Option<(Arc<ParticipantContext>, bool)> {
        let mut table = self.write();
        if let Some(context) = table.get(&ssrc) {
            return Some((context.clone(), false));
        }

        let participant = create()?;
        let context = Arc::new(ParticipantContext::new(participant));
        table.insert(ssrc, context.clone());
        Some((context, true))
    }

    /// Run `f` for every context that has not sent a BYE, under the read
    /// lock
    pub fn for_each_active(&self, mut f: impl FnMut(&Arc<ParticipantContext>)) {
        let table = self.read();
        for context in table.values() {
            if context.bye_received() {
                continue;
            }
            f(context);
        }
    }

    /// Snapshot of every registered context, BYE'd ones included
    pub fn snapshot(&self) -> Vec<Arc<ParticipantContext>> {
        self.read().values().cloned().collect()
    }

    /// Number of registered participants
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the registry holds no participants
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    fn participant(ssrc: RtpSsrc) -> RtpParticipant {
        let data: SocketAddr = "10.0.0.2:5000".parse().unwrap();
        let control: SocketAddr = "10.0.0.2:5001".parse().unwrap();
        RtpParticipant::new(ssrc, data, control)
    }

    #[test]
    fn test_insert_rejects_duplicate_ssrc() {
        let registry = ParticipantRegistry::new();
        assert!(registry.insert(participant(1)));
        assert!(!registry.insert(participant(1)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_or_insert_with_creates_once() {
        let registry = ParticipantRegistry::new();

        let (_, created) = registry.get_or_insert_with(7, || Some(participant(7))).unwrap();
        assert!(created);

        let (context, created) = registry.get_or_insert_with(7, || panic!("must not be called")).unwrap();
        assert!(!created);
        assert_eq!(context.ssrc(), 7);
    }

    #[test]
    fn test_get_or_insert_with_honors_rejection() {
        let registry = ParticipantRegistry::new();
        assert!(registry.get_or_insert_with(7, || None).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_for_each_active_skips_bye() {
        let registry = ParticipantRegistry::new();
        registry.insert(participant(1));
        registry.insert(participant(2));
        registry.get(1).unwrap().mark_bye_received();

        let mut seen = Vec::new();
        registry.for_each_active(|context| seen.push(context.ssrc()));
        assert_eq!(seen, vec![2]);
    }

    #[test]
    fn test_remove_returns_context() {
        let registry = ParticipantRegistry::new();
        registry.insert(participant(1));

        let removed = registry.remove(1).unwrap();
        assert_eq!(removed.ssrc(), 1);
        assert!(registry.remove(1).is_none());
    }
}
