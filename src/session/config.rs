/// Session configuration
///
/// Values may be changed freely between construction and `init`; once the
/// session is running every setter on the session fails with
/// [`Error::ConfigurationImmutable`](crate::Error::ConfigurationImmutable).
#[derive(Debug, Clone)]
pub struct RtpSessionConfig {
    /// Drop inbound RTP whose sequence number is not above the last seen
    pub discard_out_of_order: bool,

    /// Largest datagram either endpoint will emit
    pub send_buffer_size: usize,

    /// Fixed receive buffer size for both endpoints
    pub receive_buffer_size: usize,

    /// Foreign SSRC collisions tolerated before declaring a loop
    pub max_collisions_before_considering_loop: u32,

    /// Whether the engine performs RTCP bookkeeping on its own
    ///
    /// When set, explicit control sends are rejected (APP packets
    /// excepted) and inbound compounds are interpreted instead of being
    /// forwarded raw to control listeners.
    pub automated_rtcp_handling: bool,

    /// Informational host name; never interpreted
    pub host: Option<String>,
}

impl Default for RtpSessionConfig {
    fn default() -> Self {
        Self {
            discard_out_of_order: true,
            send_buffer_size: 1500,
            receive_buffer_size: 1500,
            max_collisions_before_considering_loop: 3,
            automated_rtcp_handling: true,
            host: None,
        }
    }
}
