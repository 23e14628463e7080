use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;

use crate::{Error, Result, RtpCsrc, RtpSequenceNumber, RtpSsrc, RtpTimestamp};
use super::RTP_VERSION;

/// Size of the fixed RTP header in bytes
pub const DATA_HEADER_SIZE: usize = 12;

/// An RTP data packet
///
/// Header fields are flattened into the struct since the session engine
/// addresses them directly when stamping outgoing packets and filtering
/// incoming ones. Header extensions are skipped on parse and never emitted.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DataPacket {
    /// Marker bit
    pub marker: bool,

    /// Payload type (7 bits)
    pub payload_type: u8,

    /// Sequence number
    pub sequence_number: RtpSequenceNumber,

    /// Media timestamp
    pub timestamp: RtpTimestamp,

    /// Synchronization source of the sender
    pub ssrc: RtpSsrc,

    /// Contributing sources (at most 15)
    pub contributing_sources: Vec<RtpCsrc>,

    /// Payload data
    pub payload: Bytes,
}

impl DataPacket {
    /// Create a packet carrying the given payload
    ///
    /// Payload type, SSRC and sequence number are stamped by the session
    /// when the packet is sent.
    pub fn new(payload: Bytes, timestamp: RtpTimestamp, marker: bool) -> Self {
        Self {
            marker,
            timestamp,
            payload,
            ..Self::default()
        }
    }

    /// Get the total size of the serialized packet in bytes
    pub fn size(&self) -> usize {
        DATA_HEADER_SIZE + self.contributing_sources.len() * 4 + self.payload.len()
    }

    /// Parse an RTP packet from bytes
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < DATA_HEADER_SIZE {
            return Err(Error::BufferTooSmall {
                required: DATA_HEADER_SIZE,
                available: data.len(),
            });
        }

        let mut buf = Bytes::copy_from_slice(data);

        let first_byte = buf.get_u8();
        let version = first_byte >> 6;
        if version != RTP_VERSION {
            return Err(Error::InvalidPacket(format!("unsupported RTP version: {}", version)));
        }
        let padding = ((first_byte >> 5) & 0x01) != 0;
        let extension = ((first_byte >> 4) & 0x01) != 0;
        let csrc_count = (first_byte & 0x0f) as usize;

        let second_byte = buf.get_u8();
        let marker = (second_byte & 0x80) != 0;
        let payload_type = second_byte & 0x7f;

        let sequence_number = buf.get_u16();
        let timestamp = buf.get_u32();
        let ssrc = buf.get_u32();

        if buf.remaining() < csrc_count * 4 {
            return Err(Error::BufferTooSmall {
                required: csrc_count * 4,
                available: buf.remaining(),
            });
        }
        let contributing_sources = (0..csrc_count).map(|_| buf.get_u32()).collect();

        if extension {
            // Header extensions are not interpreted; skip the block.
            if buf.remaining() < 4 {
                return Err(Error::BufferTooSmall {
                    required: 4,
                    available: buf.remaining(),
                });
            }
            let _profile = buf.get_u16();
            let words = buf.get_u16() as usize;
            if buf.remaining() < words * 4 {
                return Err(Error::BufferTooSmall {
                    required: words * 4,
                    available: buf.remaining(),
                });
            }
            buf.advance(words * 4);
        }

        let mut payload = buf;
        if padding {
            if payload.is_empty() {
                return Err(Error::InvalidPacket("padding flag set on empty payload".to_string()));
            }
            let pad = payload[payload.len() - 1] as usize;
            if pad == 0 || pad > payload.len() {
                return Err(Error::InvalidPacket(format!("invalid padding length: {}", pad)));
            }
            payload.truncate(payload.len() - pad);
        }

        Ok(Self {
            marker,
            payload_type,
            sequence_number,
            timestamp,
            ssrc,
            contributing_sources,
            payload,
        })
    }

    /// Serialize the packet to bytes
    pub fn serialize(&self) -> Result<Bytes> {
        if self.payload_type > 127 {
            return Err(Error::InvalidPacket(format!("payload type out of range: {}", self.payload_type)));
        }
        if self.contributing_sources.len() > 15 {
            return Err(Error::InvalidPacket(format!(
                "too many contributing sources: {}",
                self.contributing_sources.len()
            )));
        }

        let mut buf = BytesMut::with_capacity(self.size());

        buf.put_u8((RTP_VERSION << 6) | (self.contributing_sources.len() as u8));
        buf.put_u8(((self.marker as u8) << 7) | self.payload_type);
        buf.put_u16(self.sequence_number);
        buf.put_u32(self.timestamp);
        buf.put_u32(self.ssrc);
        for csrc in &self.contributing_sources {
            buf.put_u32(*csrc);
        }
        buf.extend_from_slice(&self.payload);

        Ok(buf.freeze())
    }
}

impl fmt::Debug for DataPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DataPacket {{ pt: {}, seq: {}, ts: {}, ssrc: {:08x}, marker: {}, payload_len: {} }}",
            self.payload_type, self.sequence_number, self.timestamp,
            self.ssrc, self.marker, self.payload.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_parse_roundtrip() {
        let original = DataPacket {
            marker: true,
            payload_type: 96,
            sequence_number: 1000,
            timestamp: 0x12345678,
            ssrc: 0xabcdef01,
            contributing_sources: vec![0x11111111, 0x22222222],
            payload: Bytes::from_static(b"test payload"),
        };

        let serialized = original.serialize().unwrap();
        assert_eq!(serialized.len(), original.size());

        let parsed = DataPacket::parse(&serialized).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_parse_strips_padding() {
        let packet = DataPacket {
            payload_type: 0,
            sequence_number: 7,
            payload: Bytes::from_static(b"abcd"),
            ..DataPacket::default()
        };
        let mut raw = packet.serialize().unwrap().to_vec();

        // Append three padding octets and flip the padding bit.
        raw.extend_from_slice(&[0, 0, 3]);
        raw[0] |= 0x20;

        let parsed = DataPacket::parse(&raw).unwrap();
        assert_eq!(parsed.payload.as_ref(), b"abcd");
    }

    #[test]
    fn test_parse_skips_header_extension() {
        let packet = DataPacket {
            payload_type: 8,
            sequence_number: 42,
            payload: Bytes::from_static(b"media"),
            ..DataPacket::default()
        };
        let raw = packet.serialize().unwrap();

        // Splice a one-word extension block between header and payload.
        let mut extended = Vec::with_capacity(raw.len() + 8);
        extended.extend_from_slice(&raw[..DATA_HEADER_SIZE]);
        extended.extend_from_slice(&[0xbe, 0xde, 0x00, 0x01, 0xde, 0xad, 0xbe, 0xef]);
        extended.extend_from_slice(&raw[DATA_HEADER_SIZE..]);
        extended[0] |= 0x10;

        let parsed = DataPacket::parse(&extended).unwrap();
        assert_eq!(parsed.payload.as_ref(), b"media");
        assert_eq!(parsed.sequence_number, 42);
    }

    #[test]
    fn test_parse_rejects_short_buffer() {
        let result = DataPacket::parse(&[0x80, 0x00, 0x00]);
        assert!(matches!(result, Err(Error::BufferTooSmall { .. })));
    }

    #[test]
    fn test_parse_rejects_wrong_version() {
        let mut raw = DataPacket::default().serialize().unwrap().to_vec();
        raw[0] = 0x40; // version 1
        assert!(matches!(DataPacket::parse(&raw), Err(Error::InvalidPacket(_))));
    }
}
