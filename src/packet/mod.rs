//! RTP and RTCP packet definitions
//!
//! Wire formats follow RFC 3550. Data packets carry media; control packets
//! travel in compound datagrams on the companion RTCP channel.

mod data;
pub mod control;

pub use data::{DataPacket, DATA_HEADER_SIZE};

/// Protocol version for both RTP and RTCP, always 2
pub const RTP_VERSION: u8 = 2;
