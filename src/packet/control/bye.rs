use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{Error, Result, RtpSsrc};

/// RTCP Goodbye (BYE) packet, RFC 3550 §6.6
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByePacket {
    /// Sources leaving the session
    pub ssrc_list: Vec<RtpSsrc>,

    /// Optional reason for leaving
    pub reason: Option<String>,
}

impl ByePacket {
    /// BYE for a single source with a reason
    pub fn new(ssrc: RtpSsrc, reason: impl Into<String>) -> Self {
        Self {
            ssrc_list: vec![ssrc],
            reason: Some(reason.into()),
        }
    }

    pub(crate) fn serialize_body(&self) -> Result<BytesMut> {
        let mut buf = BytesMut::with_capacity(self.ssrc_list.len() * 4);
        for ssrc in &self.ssrc_list {
            buf.put_u32(*ssrc);
        }
        if let Some(reason) = &self.reason {
            if reason.len() > 255 {
                return Err(Error::Rtcp(format!("BYE reason too long: {} bytes", reason.len())));
            }
            buf.put_u8(reason.len() as u8);
            buf.put_slice(reason.as_bytes());
        }
        Ok(buf)
    }
}

pub(crate) fn parse_bye(body: &[u8], source_count: u8) -> Result<ByePacket> {
    let mut buf = Bytes::copy_from_slice(body);
    if buf.remaining() < source_count as usize * 4 {
        return Err(Error::BufferTooSmall {
            required: source_count as usize * 4,
            available: buf.remaining(),
        });
    }

    let ssrc_list = (0..source_count).map(|_| buf.get_u32()).collect();

    let reason = if buf.has_remaining() {
        let len = buf.get_u8() as usize;
        if buf.remaining() < len {
            return Err(Error::BufferTooSmall { required: len, available: buf.remaining() });
        }
        Some(String::from_utf8_lossy(&buf[..len]).into_owned())
    } else {
        None
    };

    Ok(ByePacket { ssrc_list, reason })
}
