use std::net::SocketAddr;
use std::sync::Weak;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::packet::control::CompoundControlPacket;
use crate::packet::DataPacket;
use crate::session::RtpSession;
use crate::transport::DatagramSink;

/// Decodes datagrams from the data endpoint and feeds the session
///
/// Holds a weak reference so a transport task never keeps a dropped
/// session alive. Undecodable datagrams are dropped per packet; the
/// session survives poisoned input.
pub(crate) struct DataHandler {
    session: Weak<RtpSession>,
}

impl DataHandler {
    pub fn new(session: Weak<RtpSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl DatagramSink for DataHandler {
    async fn datagram_received(&self, origin: SocketAddr, data: Bytes) {
        let Some(session) = self.session.upgrade() else {
            return;
        };
        match DataPacket::parse(&data) {
            Ok(packet) => session.data_packet_received(origin, packet).await,
            Err(e) => debug!("discarding undecodable RTP datagram from {}: {}", origin, e),
        }
    }
}

/// Decodes compound control datagrams and feeds the session
pub(crate) struct ControlHandler {
    session: Weak<RtpSession>,
}

impl ControlHandler {
    pub fn new(session: Weak<RtpSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl DatagramSink for ControlHandler {
    async fn datagram_received(&self, origin: SocketAddr, data: Bytes) {
        let Some(session) = self.session.upgrade() else {
            return;
        };
        match CompoundControlPacket::parse(&data) {
            Ok(compound) => session.control_packet_received(origin, compound),
            Err(e) => debug!("discarding undecodable RTCP datagram from {}: {}", origin, e),
        }
    }
}
