use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tracing::{warn, Instrument, Span};

use crate::{Error, Result};
use super::{DatagramSink, TransportConfig};

/// A bound UDP endpoint
///
/// Receiving happens on a dedicated task started by [`UdpTransport::start`];
/// sends go through the non-blocking [`UdpTransport::send_to`] and never
/// park the calling thread on socket readiness.
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
    local_addr: SocketAddr,
    send_limit: usize,
    receive_buffer_size: usize,
    receiver: Mutex<Option<JoinHandle<()>>>,
}

impl UdpTransport {
    /// Bind a UDP endpoint at the given address
    pub async fn bind(addr: SocketAddr, config: &TransportConfig) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| Error::BindFailure(format!("{}: {}", addr, e)))?;
        let local_addr = socket
            .local_addr()
            .map_err(|e| Error::BindFailure(e.to_string()))?;

        Ok(Self {
            socket: Arc::new(socket),
            local_addr,
            send_limit: config.send_buffer_size,
            receive_buffer_size: config.receive_buffer_size,
            receiver: Mutex::new(None),
        })
    }

    /// The address the endpoint is actually bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Send a datagram without blocking
    pub fn send_to(&self, data: &[u8], dest: SocketAddr) -> Result<()> {
        if data.len() > self.send_limit {
            return Err(Error::Transport(format!(
                "datagram of {} bytes exceeds the {} byte send limit",
                data.len(),
                self.send_limit
            )));
        }

        match self.socket.try_send_to(data, dest) {
            Ok(sent) if sent == data.len() => Ok(()),
            Ok(sent) => Err(Error::Transport(format!(
                "short write to {}: {} of {} bytes",
                dest,
                sent,
                data.len()
            ))),
            Err(e) => Err(Error::Transport(format!("failed to send to {}: {}", dest, e))),
        }
    }

    /// Start the receiver task, delivering every datagram to `sink`
    ///
    /// Datagrams larger than the receive buffer are truncated by the
    /// socket; the sink's decoder will reject them.
    pub fn start(&self, sink: Arc<dyn DatagramSink>, span: Span) {
        let socket = self.socket.clone();
        let buffer_size = self.receive_buffer_size;

        let task = tokio::spawn(
            async move {
                let mut buffer = vec![0u8; buffer_size];
                loop {
                    match socket.recv_from(&mut buffer).await {
                        Ok((len, origin)) => {
                            let data = Bytes::copy_from_slice(&buffer[..len]);
                            sink.datagram_received(origin, data).await;
                        }
                        Err(e) => {
                            // Transient receive errors (e.g. ICMP-induced)
                            // must not kill the channel.
                            warn!("datagram receive failed: {}", e);
                        }
                    }
                }
            }
            .instrument(span),
        );

        let mut receiver = self.receiver.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = receiver.replace(task) {
            previous.abort();
        }
    }

    /// Stop the receiver task; the socket closes when the transport drops
    pub fn close(&self) {
        let mut receiver = self.receiver.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = receiver.take() {
            task.abort();
        }
    }
}

impl Drop for UdpTransport {
    fn drop(&mut self) {
        self.close();
    }
}
