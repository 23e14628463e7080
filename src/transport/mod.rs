//! UDP endpoints for the data and control channels
//!
//! The session engine consumes a connectionless contract: bind, a
//! non-blocking send, close, and a delivery callback fed by a receiver
//! task. Sends are deliberately non-blocking so the engine can issue them
//! while iterating recipients under the registry read lock.

use std::net::SocketAddr;

use async_trait::async_trait;
use bytes::Bytes;

mod udp;

pub use udp::UdpTransport;

/// Per-endpoint transport configuration
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Largest datagram the endpoint will emit
    pub send_buffer_size: usize,

    /// Fixed size of the receive buffer, and thus of the largest
    /// acceptable inbound datagram
    pub receive_buffer_size: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        // 1500 matches a typical MTU on both sides.
        Self {
            send_buffer_size: 1500,
            receive_buffer_size: 1500,
        }
    }
}

/// Receiver of raw datagrams delivered by a transport
#[async_trait]
pub trait DatagramSink: Send + Sync {
    /// Called once per received datagram
    async fn datagram_received(&self, origin: SocketAddr, data: Bytes);
}
