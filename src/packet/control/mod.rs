//! RTCP control packet definitions
//!
//! Control packets are modeled as a tagged variant discriminated on the
//! RFC 3550 packet type field; dispatch in the session engine is a plain
//! `match` on the tag. Packets the engine does not understand are kept as
//! opaque `Unknown` values so a compound carrying them still parses.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{Error, Result};
use super::RTP_VERSION;

mod app;
mod bye;
mod compound;
mod reports;
mod sdes;

pub use app::AppDataPacket;
pub use bye::ByePacket;
pub use compound::CompoundControlPacket;
pub use reports::{NtpTimestamp, ReceiverReportPacket, ReceptionReport, SenderReportPacket};
pub use sdes::{SdesChunk, SdesItem, SdesItemType, SourceDescriptionPacket};

/// Size of the common RTCP packet header in bytes
pub const CONTROL_HEADER_SIZE: usize = 4;

/// RTCP packet types as defined in RFC 3550
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ControlPacketType {
    /// Sender Report (SR)
    SenderReport = 200,

    /// Receiver Report (RR)
    ReceiverReport = 201,

    /// Source Description (SDES)
    SourceDescription = 202,

    /// Goodbye (BYE)
    Bye = 203,

    /// Application-Defined (APP)
    AppData = 204,
}

impl TryFrom<u8> for ControlPacketType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            200 => Ok(ControlPacketType::SenderReport),
            201 => Ok(ControlPacketType::ReceiverReport),
            202 => Ok(ControlPacketType::SourceDescription),
            203 => Ok(ControlPacketType::Bye),
            204 => Ok(ControlPacketType::AppData),
            _ => Err(Error::Rtcp(format!("unknown control packet type: {}", value))),
        }
    }
}

/// RTCP control packet variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlPacket {
    /// Sender Report (SR)
    SenderReport(SenderReportPacket),

    /// Receiver Report (RR)
    ReceiverReport(ReceiverReportPacket),

    /// Source Description (SDES)
    SourceDescription(SourceDescriptionPacket),

    /// Goodbye (BYE)
    Bye(ByePacket),

    /// Application-Defined (APP)
    AppData(AppDataPacket),

    /// Packet of a type this engine does not interpret, kept verbatim
    Unknown {
        /// Raw packet type from the header
        packet_type: u8,
        /// Raw count/subtype bits from the header
        count: u8,
        /// Packet body after the common header
        body: Bytes,
    },
}

impl ControlPacket {
    /// Parse a single RTCP packet from a slice holding exactly one packet
    /// (common header included)
    pub fn parse(data: &[u8]) -> Result<Self> {
        let (packet, _) = Self::parse_prefix(data)?;
        Ok(packet)
    }

    /// Parse the RTCP packet at the head of `data`, returning it together
    /// with its total size on the wire
    pub(crate) fn parse_prefix(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < CONTROL_HEADER_SIZE {
            return Err(Error::BufferTooSmall {
                required: CONTROL_HEADER_SIZE,
                available: data.len(),
            });
        }

        let mut buf = Bytes::copy_from_slice(data);
        let first_byte = buf.get_u8();
        let version = first_byte >> 6;
        if version != RTP_VERSION {
            return Err(Error::Rtcp(format!("invalid RTCP version: {}", version)));
        }
        let _padding = ((first_byte >> 5) & 0x01) != 0;
        let count = first_byte & 0x1f;

        let packet_type = buf.get_u8();

        // Length is in 32-bit words, not counting the header word.
        let body_len = buf.get_u16() as usize * 4;
        if buf.remaining() < body_len {
            return Err(Error::BufferTooSmall {
                required: body_len,
                available: buf.remaining(),
            });
        }
        let body = &data[CONTROL_HEADER_SIZE..CONTROL_HEADER_SIZE + body_len];

        let packet = match ControlPacketType::try_from(packet_type) {
            Ok(ControlPacketType::SenderReport) => {
                ControlPacket::SenderReport(reports::parse_sender_report(body, count)?)
            }
            Ok(ControlPacketType::ReceiverReport) => {
                ControlPacket::ReceiverReport(reports::parse_receiver_report(body, count)?)
            }
            Ok(ControlPacketType::SourceDescription) => {
                ControlPacket::SourceDescription(sdes::parse_source_description(body, count)?)
            }
            Ok(ControlPacketType::Bye) => ControlPacket::Bye(bye::parse_bye(body, count)?),
            Ok(ControlPacketType::AppData) => {
                ControlPacket::AppData(app::parse_app_data(body, count)?)
            }
            Err(_) => ControlPacket::Unknown {
                packet_type,
                count,
                body: Bytes::copy_from_slice(body),
            },
        };

        Ok((packet, CONTROL_HEADER_SIZE + body_len))
    }

    /// Serialize the packet, common header included
    pub fn serialize(&self) -> Result<Bytes> {
        let (count, packet_type, body) = match self {
            ControlPacket::SenderReport(sr) => {
                (sr.reports.len(), ControlPacketType::SenderReport as u8, sr.serialize_body()?)
            }
            ControlPacket::ReceiverReport(rr) => {
                (rr.reports.len(), ControlPacketType::ReceiverReport as u8, rr.serialize_body()?)
            }
            ControlPacket::SourceDescription(sdes) => {
                (sdes.chunks.len(), ControlPacketType::SourceDescription as u8, sdes.serialize_body()?)
            }
            ControlPacket::Bye(bye) => {
                (bye.ssrc_list.len(), ControlPacketType::Bye as u8, bye.serialize_body()?)
            }
            ControlPacket::AppData(app) => {
                (app.subtype as usize, ControlPacketType::AppData as u8, app.serialize_body()?)
            }
            ControlPacket::Unknown { packet_type, count, body } => {
                let mut buf = BytesMut::with_capacity(body.len());
                buf.extend_from_slice(body);
                (*count as usize, *packet_type, buf)
            }
        };

        if count > 31 {
            return Err(Error::Rtcp(format!("count field exceeds 5 bits: {}", count)));
        }

        let mut buf = BytesMut::with_capacity(CONTROL_HEADER_SIZE + body.len() + 3);
        buf.put_u8((RTP_VERSION << 6) | (count as u8));
        buf.put_u8(packet_type);

        // Pad the body to a 32-bit boundary before computing the length.
        let padded_len = (body.len() + 3) / 4 * 4;
        buf.put_u16((padded_len / 4) as u16);
        buf.extend_from_slice(&body);
        for _ in body.len()..padded_len {
            buf.put_u8(0);
        }

        Ok(buf.freeze())
    }

    /// Raw RFC 3550 packet type of this variant
    pub fn raw_packet_type(&self) -> u8 {
        match self {
            ControlPacket::SenderReport(_) => ControlPacketType::SenderReport as u8,
            ControlPacket::ReceiverReport(_) => ControlPacketType::ReceiverReport as u8,
            ControlPacket::SourceDescription(_) => ControlPacketType::SourceDescription as u8,
            ControlPacket::Bye(_) => ControlPacketType::Bye as u8,
            ControlPacket::AppData(_) => ControlPacketType::AppData as u8,
            ControlPacket::Unknown { packet_type, .. } => *packet_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_type_conversion() {
        assert_eq!(ControlPacketType::try_from(200).unwrap(), ControlPacketType::SenderReport);
        assert_eq!(ControlPacketType::try_from(201).unwrap(), ControlPacketType::ReceiverReport);
        assert_eq!(ControlPacketType::try_from(202).unwrap(), ControlPacketType::SourceDescription);
        assert_eq!(ControlPacketType::try_from(203).unwrap(), ControlPacketType::Bye);
        assert_eq!(ControlPacketType::try_from(204).unwrap(), ControlPacketType::AppData);
        assert!(ControlPacketType::try_from(100).is_err());
    }

    #[test]
    fn test_unknown_packet_roundtrip() {
        // Extended Report (207) is not interpreted but must survive a
        // parse/serialize cycle untouched.
        let original = ControlPacket::Unknown {
            packet_type: 207,
            count: 0,
            body: Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]),
        };
        let raw = original.serialize().unwrap();
        let parsed = ControlPacket::parse(&raw).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_parse_rejects_truncated_body() {
        let rr = ControlPacket::ReceiverReport(ReceiverReportPacket::new(0x1234));
        let raw = rr.serialize().unwrap();
        let result = ControlPacket::parse(&raw[..raw.len() - 2]);
        assert!(matches!(result, Err(Error::BufferTooSmall { .. })));
    }
}
