use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{Error, Result, RtpSsrc};

/// RTCP Application-Defined (APP) packet, RFC 3550 §6.7
///
/// APP packets are opaque to the session engine and are handed to control
/// listeners even when automated RTCP handling is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDataPacket {
    /// Application-defined subtype (5 bits)
    pub subtype: u8,

    /// SSRC of the packet originator
    pub ssrc: RtpSsrc,

    /// Four-ASCII-character packet name
    pub name: String,

    /// Application-dependent data
    pub data: Bytes,
}

impl AppDataPacket {
    /// Create a new APP packet
    pub fn new(subtype: u8, ssrc: RtpSsrc, name: impl Into<String>, data: Bytes) -> Self {
        Self { subtype, ssrc, name: name.into(), data }
    }

    pub(crate) fn serialize_body(&self) -> Result<BytesMut> {
        if self.subtype > 31 {
            return Err(Error::Rtcp(format!("APP subtype exceeds 5 bits: {}", self.subtype)));
        }
        if self.name.len() != 4 || !self.name.is_ascii() {
            return Err(Error::Rtcp(format!("APP name must be 4 ASCII characters: {:?}", self.name)));
        }

        let mut buf = BytesMut::with_capacity(8 + self.data.len());
        buf.put_u32(self.ssrc);
        buf.put_slice(self.name.as_bytes());
        buf.extend_from_slice(&self.data);
        Ok(buf)
    }
}

pub(crate) fn parse_app_data(body: &[u8], subtype: u8) -> Result<AppDataPacket> {
    let mut buf = Bytes::copy_from_slice(body);
    if buf.remaining() < 8 {
        return Err(Error::BufferTooSmall { required: 8, available: buf.remaining() });
    }

    let ssrc = buf.get_u32();
    let name = String::from_utf8_lossy(&buf[..4]).into_owned();
    buf.advance(4);

    Ok(AppDataPacket { subtype, ssrc, name, data: buf })
}
