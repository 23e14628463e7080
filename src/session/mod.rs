//! RTP session engine
//!
//! The session is a long-lived value with a strict lifecycle
//! `created → initialized → running → terminated`. It coordinates two UDP
//! endpoints (data and control), a participant registry keyed by SSRC, an
//! atomic sequence counter for outgoing data, and three observer channels
//! (data, control, lifecycle events). RTCP membership bookkeeping (joining
//! with an empty receiver report, describing the local source, leaving with
//! BYE compounds) is automated unless explicitly disabled.

mod config;
mod events;
mod handlers;
mod rtcp;

pub use config::RtpSessionConfig;
pub use events::{
    RtpSessionControlListener, RtpSessionDataListener, RtpSessionEventListener,
    TerminationCause,
};

use std::net::SocketAddr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;
use tracing::{debug, info_span, trace, warn, Span};

use crate::packet::control::{CompoundControlPacket, ControlPacket, ReceptionReport};
use crate::packet::control::{ByePacket, SourceDescriptionPacket};
use crate::packet::DataPacket;
use crate::participant::{
    AdmissionPolicy, AdmitAll, ParticipantContext, ParticipantDecision, ParticipantRegistry,
    RtpParticipant,
};
use crate::transport::{TransportConfig, UdpTransport};
use crate::{Error, Result, RtpSsrc, RtpTimestamp};
use events::ListenerList;
use handlers::{ControlHandler, DataHandler};

/// Tool string advertised in SDES when the local participant sets none
pub(crate) const VERSION: &str = concat!("efflux/", env!("CARGO_PKG_VERSION"));

/// An RTP session: one local source, a table of remote participants, and
/// the data and control channels binding them together
pub struct RtpSession {
    id: String,
    payload_type: u8,
    span: Span,

    config: RwLock<RtpSessionConfig>,
    local_participant: RwLock<RtpParticipant>,
    registry: ParticipantRegistry,
    admission: RwLock<Arc<dyn AdmissionPolicy>>,

    data_listeners: ListenerList<dyn RtpSessionDataListener>,
    control_listeners: ListenerList<dyn RtpSessionControlListener>,
    event_listeners: ListenerList<dyn RtpSessionEventListener>,

    sequence: AtomicU16,
    sent_or_received_packets: AtomicBool,
    collisions: AtomicU32,

    running: AtomicBool,
    terminated: AtomicBool,
    lifecycle: tokio::sync::Mutex<()>,

    data_transport: RwLock<Option<Arc<UdpTransport>>>,
    control_transport: RwLock<Option<Arc<UdpTransport>>>,
}

impl RtpSession {
    /// Create a session for the given local participant
    ///
    /// Fails when the payload type is outside the 7-bit range RFC 3550
    /// allows.
    pub fn new(
        id: impl Into<String>,
        payload_type: u8,
        local_participant: RtpParticipant,
    ) -> Result<Arc<Self>> {
        if payload_type > 127 {
            return Err(Error::InvalidPayloadType(payload_type));
        }

        let id = id.into();
        let span = info_span!("rtp_session", session_id = %id);

        Ok(Arc::new(Self {
            id,
            payload_type,
            span,
            config: RwLock::new(RtpSessionConfig::default()),
            local_participant: RwLock::new(local_participant),
            registry: ParticipantRegistry::new(),
            admission: RwLock::new(Arc::new(AdmitAll)),
            data_listeners: ListenerList::new(),
            control_listeners: ListenerList::new(),
            event_listeners: ListenerList::new(),
            sequence: AtomicU16::new(0),
            sent_or_received_packets: AtomicBool::new(false),
            collisions: AtomicU32::new(0),
            running: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
            lifecycle: tokio::sync::Mutex::new(()),
            data_transport: RwLock::new(None),
            control_transport: RwLock::new(None),
        }))
    }

    // accessors ----------------------------------------------------------

    /// Session identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Payload type this session accepts and emits
    pub fn payload_type(&self) -> u8 {
        self.payload_type
    }

    /// Whether the session is between `init` and `terminate`
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Snapshot of the local participant
    pub fn local_participant(&self) -> RtpParticipant {
        self.local().clone()
    }

    /// Foreign-origin SSRC collisions observed so far
    pub fn collisions(&self) -> u32 {
        self.collisions.load(Ordering::Acquire)
    }

    /// Snapshot of the session configuration
    pub fn config(&self) -> RtpSessionConfig {
        self.read_config().clone()
    }

    fn read_config(&self) -> RwLockReadGuard<'_, RtpSessionConfig> {
        self.config.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn local(&self) -> RwLockReadGuard<'_, RtpParticipant> {
        self.local_participant.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn local_mut(&self) -> RwLockWriteGuard<'_, RtpParticipant> {
        self.local_participant.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn local_ssrc(&self) -> RtpSsrc {
        self.local().ssrc
    }

    // configuration ------------------------------------------------------

    fn ensure_not_running(&self) -> Result<()> {
        if self.is_running() {
            return Err(Error::ConfigurationImmutable);
        }
        Ok(())
    }

    fn update_config(&self, f: impl FnOnce(&mut RtpSessionConfig)) -> Result<()> {
        self.ensure_not_running()?;
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut config);
        Ok(())
    }

    /// Drop inbound RTP whose sequence number is not above the last seen
    pub fn set_discard_out_of_order(&self, value: bool) -> Result<()> {
        self.update_config(|config| config.discard_out_of_order = value)
    }

    /// Largest datagram either endpoint will emit
    pub fn set_send_buffer_size(&self, value: usize) -> Result<()> {
        self.update_config(|config| config.send_buffer_size = value)
    }

    /// Fixed receive buffer size for both endpoints
    pub fn set_receive_buffer_size(&self, value: usize) -> Result<()> {
        self.update_config(|config| config.receive_buffer_size = value)
    }

    /// Foreign SSRC collisions tolerated before declaring a loop
    pub fn set_max_collisions_before_considering_loop(&self, value: u32) -> Result<()> {
        self.update_config(|config| config.max_collisions_before_considering_loop = value)
    }

    /// Whether the engine performs RTCP bookkeeping on its own
    pub fn set_automated_rtcp_handling(&self, value: bool) -> Result<()> {
        self.update_config(|config| config.automated_rtcp_handling = value)
    }

    /// Informational host name
    pub fn set_host(&self, value: impl Into<String>) -> Result<()> {
        self.update_config(|config| config.host = Some(value.into()))
    }

    /// Policy consulted when data arrives from an unknown SSRC
    pub fn set_admission_policy(&self, policy: Arc<dyn AdmissionPolicy>) -> Result<()> {
        self.ensure_not_running()?;
        *self.admission.write().unwrap_or_else(PoisonError::into_inner) = policy;
        Ok(())
    }

    // lifecycle ----------------------------------------------------------

    /// Bind both endpoints and start the session
    ///
    /// Idempotent while running: a second call returns true without
    /// rebinding. Returns false when either bind fails (releasing
    /// whatever was bound) or when the session has already terminated.
    /// Serialized against concurrent `init` and `terminate`.
    pub async fn init(self: &Arc<Self>) -> bool {
        let _lifecycle = self.lifecycle.lock().await;
        if self.is_running() {
            return true;
        }
        if self.terminated.load(Ordering::Acquire) {
            return false;
        }

        let (data_addr, control_addr) = {
            let local = self.local();
            (local.data_address, local.control_address)
        };
        let transport_config = {
            let config = self.read_config();
            TransportConfig {
                send_buffer_size: config.send_buffer_size,
                receive_buffer_size: config.receive_buffer_size,
            }
        };

        let data = match UdpTransport::bind(data_addr, &transport_config).await {
            Ok(transport) => Arc::new(transport),
            Err(e) => {
                warn!(parent: &self.span, "failed to bind data endpoint: {}", e);
                return false;
            }
        };
        let control = match UdpTransport::bind(control_addr, &transport_config).await {
            Ok(transport) => Arc::new(transport),
            Err(e) => {
                warn!(parent: &self.span, "failed to bind control endpoint: {}", e);
                data.close();
                return false;
            }
        };

        // Rebind the local endpoints to what the sockets resolved to, so
        // port-zero binds advertise and compare against real addresses.
        {
            let mut local = self.local_mut();
            local.data_address = data.local_addr();
            local.control_address = control.local_addr();
        }

        data.start(Arc::new(DataHandler::new(Arc::downgrade(self))), self.span.clone());
        control.start(Arc::new(ControlHandler::new(Arc::downgrade(self))), self.span.clone());
        *self.data_transport.write().unwrap_or_else(PoisonError::into_inner) = Some(data);
        *self.control_transport.write().unwrap_or_else(PoisonError::into_inner) = Some(control);

        self.running.store(true, Ordering::Release);
        debug!(parent: &self.span, "data and control endpoints bound");

        let current_ssrc = self.local_ssrc();
        self.join_session(current_ssrc);
        true
    }

    /// Terminate the session normally
    pub async fn terminate(&self) {
        self.terminate_with(TerminationCause::Requested).await;
    }

    /// Terminate the session with an explicit cause
    ///
    /// Idempotent; serialized against `init` and concurrent terminations.
    /// Leave compounds are flushed on a best-effort basis before the
    /// control endpoint closes.
    pub async fn terminate_with(&self, cause: TerminationCause) {
        let _lifecycle = self.lifecycle.lock().await;
        if !self.is_running() {
            return;
        }

        self.data_listeners.clear();
        self.control_listeners.clear();

        // Close the data channel, flush the BYE compounds, then close the
        // control channel.
        if let Some(data) = self.data_transport.write().unwrap_or_else(PoisonError::into_inner).take() {
            data.close();
        }
        let current_ssrc = self.local_ssrc();
        self.leave_session(current_ssrc, "Session terminated.");
        if let Some(control) = self.control_transport.write().unwrap_or_else(PoisonError::into_inner).take() {
            control.close();
        }

        debug!(parent: &self.span, "session terminated: {}", cause);
        self.notify_event(|listener| listener.session_terminated(self, &cause));
        self.event_listeners.clear();

        self.terminated.store(true, Ordering::Release);
        self.running.store(false, Ordering::Release);
    }

    // participants -------------------------------------------------------

    /// Register a remote participant; false when its SSRC is the local
    /// one or already registered
    pub fn add_participant(&self, remote: RtpParticipant) -> bool {
        if remote.ssrc == self.local_ssrc() {
            return false;
        }
        self.registry.insert(remote)
    }

    /// Remove and return a participant's context
    pub fn remove_participant(&self, ssrc: RtpSsrc) -> Option<Arc<ParticipantContext>> {
        self.registry.remove(ssrc)
    }

    /// Look up a participant's context
    pub fn get_remote_participant(&self, ssrc: RtpSsrc) -> Option<Arc<ParticipantContext>> {
        self.registry.get(ssrc)
    }

    /// Snapshot of every known remote participant context
    pub fn remote_participants(&self) -> Vec<Arc<ParticipantContext>> {
        self.registry.snapshot()
    }

    // listeners ----------------------------------------------------------

    /// Register a data observer
    pub fn add_data_listener(&self, listener: Arc<dyn RtpSessionDataListener>) {
        self.data_listeners.add(listener);
    }

    /// Unregister a data observer (by identity)
    pub fn remove_data_listener(&self, listener: &Arc<dyn RtpSessionDataListener>) {
        self.data_listeners.remove(listener);
    }

    /// Register a control observer
    pub fn add_control_listener(&self, listener: Arc<dyn RtpSessionControlListener>) {
        self.control_listeners.add(listener);
    }

    /// Unregister a control observer (by identity)
    pub fn remove_control_listener(&self, listener: &Arc<dyn RtpSessionControlListener>) {
        self.control_listeners.remove(listener);
    }

    /// Register an event observer
    pub fn add_event_listener(&self, listener: Arc<dyn RtpSessionEventListener>) {
        self.event_listeners.add(listener);
    }

    /// Unregister an event observer (by identity)
    pub fn remove_event_listener(&self, listener: &Arc<dyn RtpSessionEventListener>) {
        self.event_listeners.remove(listener);
    }

    // outbound -----------------------------------------------------------

    /// Send a payload to every active participant
    ///
    /// Payload type, SSRC and sequence number are stamped by the session.
    pub fn send_data(&self, payload: Bytes, timestamp: RtpTimestamp, marker: bool) -> bool {
        if !self.is_running() {
            return false;
        }
        self.send_data_packet(DataPacket::new(payload, timestamp, marker))
    }

    /// Send a caller-built data packet to every active participant
    ///
    /// Payload type, SSRC and sequence number are overwritten; the
    /// sequence counter is strictly monotonic in call order.
    pub fn send_data_packet(&self, mut packet: DataPacket) -> bool {
        if !self.is_running() {
            return false;
        }

        packet.payload_type = self.payload_type;
        packet.ssrc = self.local_ssrc();
        packet.sequence_number = self.sequence.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        self.sent_or_received_packets.store(true, Ordering::Release);

        self.send_data_to_all(&packet)
    }

    /// Send a single control packet to every active participant
    ///
    /// APP packets are always permitted while the session runs; any other
    /// type requires automated RTCP handling to be off.
    pub fn send_control_packet(&self, packet: ControlPacket) -> bool {
        if !self.is_running() {
            return false;
        }
        if matches!(packet, ControlPacket::AppData(_)) {
            return self.send_control_to_all(&packet);
        }
        !self.read_config().automated_rtcp_handling && self.send_control_to_all(&packet)
    }

    /// Send a compound control packet to every active participant
    ///
    /// Only permitted when automated RTCP handling is off.
    pub fn send_control_compound(&self, compound: CompoundControlPacket) -> bool {
        self.is_running()
            && !self.read_config().automated_rtcp_handling
            && self.send_compound_to_all(&compound)
    }

    fn data_transport(&self) -> Option<Arc<UdpTransport>> {
        self.data_transport.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn control_transport(&self) -> Option<Arc<UdpTransport>> {
        self.control_transport.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn send_data_to_all(&self, packet: &DataPacket) -> bool {
        let Some(transport) = self.data_transport() else {
            return false;
        };
        let data = match packet.serialize() {
            Ok(data) => data,
            Err(e) => {
                warn!(parent: &self.span, "failed to encode outgoing data packet: {}", e);
                return false;
            }
        };

        let mut all_sent = true;
        self.registry.for_each_active(|context| {
            let dest = context.data_address();
            match transport.send_to(&data, dest) {
                Ok(()) => context.record_sent(packet.payload.len()),
                Err(e) => {
                    warn!(parent: &self.span, "failed to write data packet to {}: {}", dest, e);
                    all_sent = false;
                }
            }
        });
        all_sent
    }

    fn send_control_to_all(&self, packet: &ControlPacket) -> bool {
        let Some(transport) = self.control_transport() else {
            return false;
        };
        let data = match packet.serialize() {
            Ok(data) => data,
            Err(e) => {
                warn!(parent: &self.span, "failed to encode outgoing control packet: {}", e);
                return false;
            }
        };
        self.write_control_to_all(&transport, &data)
    }

    pub(crate) fn send_compound_to_all(&self, compound: &CompoundControlPacket) -> bool {
        let Some(transport) = self.control_transport() else {
            return false;
        };
        let data = match compound.serialize() {
            Ok(data) => data,
            Err(e) => {
                warn!(parent: &self.span, "failed to encode outgoing control compound: {}", e);
                return false;
            }
        };
        self.write_control_to_all(&transport, &data)
    }

    fn write_control_to_all(&self, transport: &UdpTransport, data: &[u8]) -> bool {
        let mut all_sent = true;
        self.registry.for_each_active(|context| {
            let dest = context.control_address();
            if let Err(e) = transport.send_to(data, dest) {
                warn!(parent: &self.span, "failed to write control packet to {}: {}", dest, e);
                all_sent = false;
            }
        });
        all_sent
    }

    // inbound: data ------------------------------------------------------

    /// Entry point for decoded RTP packets delivered by the data endpoint
    pub async fn data_packet_received(&self, origin: SocketAddr, packet: DataPacket) {
        if !self.is_running() {
            return;
        }
        if packet.payload_type != self.payload_type {
            // Silently discard packets of the wrong payload type.
            return;
        }

        if packet.ssrc == self.local_ssrc() && !self.handle_local_ssrc_conflict(origin, &packet).await {
            return;
        }

        // Associate the packet with a participant, or admit a new one.
        let admission = self.admission.read().unwrap_or_else(PoisonError::into_inner).clone();
        let Some((context, created)) = self.registry.get_or_insert_with(packet.ssrc, || {
            match admission.admit_unknown(origin, &packet) {
                ParticipantDecision::Create(participant) => Some(participant),
                ParticipantDecision::Reject => None,
            }
        }) else {
            trace!(parent: &self.span, "admission policy rejected unknown ssrc {:08x}", packet.ssrc);
            return;
        };

        if created {
            debug!(parent: &self.span, "new participant joined from data packet: ssrc {:08x}", packet.ssrc);
            let participant = context.participant();
            self.notify_event(|listener| {
                listener.participant_joined_from_data(self, &participant, &packet)
            });
        }

        // Raw integer compare: wrap-around at 65535 is knowingly ignored.
        if self.read_config().discard_out_of_order {
            if let Some(last) = context.last_sequence_number() {
                if last >= packet.sequence_number {
                    trace!(
                        parent: &self.span,
                        "discarded out of order packet (last SN {}, packet SN {})",
                        last,
                        packet.sequence_number
                    );
                    return;
                }
            }
        }

        context.set_last_sequence_number(packet.sequence_number);
        context.record_received(packet.payload.len());
        self.sent_or_received_packets.store(true, Ordering::Release);

        // We trust the SSRC rather than the address to identify the
        // participant, and follow the source through NAT rebinds.
        if origin != context.data_address() {
            context.update_data_address(origin);
            debug!(parent: &self.span, "updated data address for ssrc {:08x} to {}", packet.ssrc, origin);
        }

        let participant = context.participant();
        let snapshot = self.data_listeners.snapshot();
        for listener in snapshot.iter() {
            let dispatch = catch_unwind(AssertUnwindSafe(|| {
                listener.data_packet_received(self, &participant, &packet)
            }));
            if dispatch.is_err() {
                warn!(parent: &self.span, "data listener panicked; continuing with remaining listeners");
            }
        }
    }

    /// Handle an inbound packet claiming the local SSRC
    ///
    /// Returns whether processing of the packet should continue.
    async fn handle_local_ssrc_conflict(&self, origin: SocketAddr, packet: &DataPacket) -> bool {
        let local_data_address = { self.local().data_address };
        if origin == local_data_address {
            // Receiving our own packets directly: a loop, bail out.
            self.terminate_with(TerminationCause::LoopDetected).await;
            return false;
        }

        let collisions = self.collisions.fetch_add(1, Ordering::AcqRel) + 1;
        if collisions > self.read_config().max_collisions_before_considering_loop {
            self.terminate_with(TerminationCause::CollisionLimitExceeded(collisions)).await;
            return false;
        }

        let (old_ssrc, new_ssrc) = {
            let mut local = self.local_mut();
            let old = local.ssrc;
            (old, local.resolve_ssrc_conflict(packet.ssrc))
        };

        // After traffic has flowed under the old SSRC the rotation must be
        // announced: BYE the old identity and rejoin under the new one
        // (RFC 3550 §8.2). Before any traffic, rotating silently is enough
        // (§8.1, last paragraph).
        if self.sent_or_received_packets.swap(true, Ordering::AcqRel) {
            self.leave_session(old_ssrc, "SSRC collision detected; rejoining with new SSRC.");
            self.join_session(new_ssrc);
        }

        warn!(
            parent: &self.span,
            "SSRC collision with remote end detected; updating SSRC from {:08x} to {:08x}",
            old_ssrc,
            new_ssrc
        );
        self.notify_event(|listener| listener.resolved_ssrc_conflict(self, old_ssrc, new_ssrc));
        true
    }

    // inbound: control ---------------------------------------------------

    /// Entry point for decoded compounds delivered by the control endpoint
    pub fn control_packet_received(&self, origin: SocketAddr, compound: CompoundControlPacket) {
        if !self.is_running() {
            return;
        }

        if !self.read_config().automated_rtcp_handling {
            self.notify_control(|listener| listener.control_packet_received(self, &compound));
            return;
        }

        for packet in &compound.packets {
            match packet {
                ControlPacket::SenderReport(report) => {
                    self.handle_report(report.sender_ssrc, &report.reports);
                }
                ControlPacket::ReceiverReport(report) => {
                    self.handle_report(report.sender_ssrc, &report.reports);
                }
                ControlPacket::SourceDescription(sdes) => self.handle_sdes(origin, sdes),
                ControlPacket::Bye(bye) => self.handle_bye(bye),
                ControlPacket::AppData(app) => {
                    self.notify_control(|listener| listener.app_data_received(self, app));
                }
                ControlPacket::Unknown { packet_type, .. } => {
                    trace!(parent: &self.span, "ignoring control packet of unknown type {}", packet_type);
                }
            }
        }
    }

    fn handle_report(&self, sender_ssrc: RtpSsrc, reports: &[ReceptionReport]) {
        if reports.is_empty() {
            return;
        }
        if self.registry.get(sender_ssrc).is_none() {
            // An RTP packet or SDES chunk must introduce the sender first.
            return;
        }

        let local_ssrc = self.local_ssrc();
        for report in reports {
            // Only the block about ourselves describes this link.
            if report.ssrc == local_ssrc {
                // TODO: feed the block into reception statistics once a
                // metrics component tracks them.
                trace!(
                    parent: &self.span,
                    "reception report from {:08x}: fraction lost {}",
                    sender_ssrc,
                    report.fraction_lost
                );
            }
        }
    }

    fn handle_sdes(&self, origin: SocketAddr, sdes: &SourceDescriptionPacket) {
        for chunk in &sdes.chunks {
            let Some((context, created)) = self.registry.get_or_insert_with(chunk.ssrc, || {
                Some(RtpParticipant::from_sdes_chunk(origin, chunk))
            }) else {
                continue;
            };

            if created {
                // Description arrived with the participant; never let a
                // later chunk overwrite it.
                context.mark_sdes_received();
                debug!(parent: &self.span, "new participant joined from SDES chunk: ssrc {:08x}", chunk.ssrc);
                let participant = context.participant();
                self.notify_event(|listener| {
                    listener.participant_joined_from_control(self, &participant, chunk)
                });
            } else if !context.sdes_received() && context.merge_sdes_chunk(chunk) {
                let participant = context.participant();
                self.notify_event(|listener| listener.participant_data_updated(self, &participant));
            }

            if origin != context.control_address() {
                context.update_control_address(origin);
                debug!(parent: &self.span, "updated control address for ssrc {:08x} to {}", chunk.ssrc, origin);
            }
        }
    }

    fn handle_bye(&self, bye: &ByePacket) {
        for &ssrc in &bye.ssrc_list {
            if let Some(context) = self.registry.get(ssrc) {
                context.mark_bye_received();
                let participant = context.participant();
                self.notify_event(|listener| listener.participant_left(self, &participant));
            }
        }
        trace!(
            parent: &self.span,
            "BYE received for {:?} with reason {:?}",
            bye.ssrc_list,
            bye.reason
        );
    }

    // observer dispatch --------------------------------------------------

    fn notify_event(&self, f: impl Fn(&dyn RtpSessionEventListener)) {
        let snapshot = self.event_listeners.snapshot();
        for listener in snapshot.iter() {
            if catch_unwind(AssertUnwindSafe(|| f(listener.as_ref()))).is_err() {
                warn!(parent: &self.span, "event listener panicked; continuing with remaining listeners");
            }
        }
    }

    fn notify_control(&self, f: impl Fn(&dyn RtpSessionControlListener)) {
        let snapshot = self.control_listeners.snapshot();
        for listener in snapshot.iter() {
            if catch_unwind(AssertUnwindSafe(|| f(listener.as_ref()))).is_err() {
                warn!(parent: &self.span, "control listener panicked; continuing with remaining listeners");
            }
        }
    }

    pub(crate) fn span(&self) -> &Span {
        &self.span
    }

    pub(crate) fn bound_data_address(&self) -> Option<SocketAddr> {
        self.data_transport().map(|transport| transport.local_addr())
    }
}

impl std::fmt::Debug for RtpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RtpSession")
            .field("id", &self.id)
            .field("payload_type", &self.payload_type)
            .field("running", &self.is_running())
            .field("participants", &self.registry.len())
            .finish()
    }
}
