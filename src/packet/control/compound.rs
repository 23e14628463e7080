//! RTCP compound packet handling
//!
//! Control packets share a UDP datagram as a compound: the first packet
//! must be a sender or receiver report, and an SDES usually follows
//! (RFC 3550 §6.1).

use bytes::BytesMut;

use crate::{Error, Result};
use super::{ControlPacket, CONTROL_HEADER_SIZE};

/// A compound RTCP packet: one datagram, several control packets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundControlPacket {
    /// Packets in datagram order
    pub packets: Vec<ControlPacket>,
}

impl CompoundControlPacket {
    /// Create a compound from the given packets
    pub fn new(packets: Vec<ControlPacket>) -> Self {
        Self { packets }
    }

    /// Compound holding a single control packet
    pub fn of(packet: ControlPacket) -> Self {
        Self { packets: vec![packet] }
    }

    /// Check the RFC requirements: non-empty, leading SR or RR
    pub fn validate(&self) -> Result<()> {
        match self.packets.first() {
            None => Err(Error::Rtcp("compound packet must contain at least one packet".to_string())),
            Some(ControlPacket::SenderReport(_)) | Some(ControlPacket::ReceiverReport(_)) => Ok(()),
            Some(_) => Err(Error::Rtcp("compound packet must start with SR or RR".to_string())),
        }
    }

    /// Serialize all packets into a single buffer
    pub fn serialize(&self) -> Result<bytes::Bytes> {
        self.validate()?;

        let mut buf = BytesMut::new();
        for packet in &self.packets {
            let raw = packet.serialize()?;
            buf.extend_from_slice(&raw);
        }
        Ok(buf.freeze())
    }

    /// Parse a compound from a full datagram
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut packets = Vec::new();
        let mut offset = 0;

        while data.len() - offset >= CONTROL_HEADER_SIZE {
            let (packet, consumed) = ControlPacket::parse_prefix(&data[offset..])?;
            packets.push(packet);
            offset += consumed;
        }

        let compound = Self { packets };
        compound.validate()?;
        Ok(compound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::control::{ByePacket, ReceiverReportPacket, SdesChunk, SdesItem, SourceDescriptionPacket};

    #[test]
    fn test_compound_validation() {
        let rr = ReceiverReportPacket::new(0x12345678);
        let compound = CompoundControlPacket::of(ControlPacket::ReceiverReport(rr));
        assert!(compound.validate().is_ok());

        let empty = CompoundControlPacket::new(Vec::new());
        assert!(empty.validate().is_err());

        let bye_first = CompoundControlPacket::of(ControlPacket::Bye(ByePacket::new(1, "x")));
        assert!(bye_first.validate().is_err());
    }

    #[test]
    fn test_compound_roundtrip() {
        let rr = ReceiverReportPacket::new(0x12345678);
        let mut chunk = SdesChunk::new(0x12345678);
        chunk.items.push(SdesItem::cname("alice@host"));
        let bye = ByePacket::new(0x12345678, "done");

        let original = CompoundControlPacket::new(vec![
            ControlPacket::ReceiverReport(rr),
            ControlPacket::SourceDescription(SourceDescriptionPacket::with_chunk(chunk)),
            ControlPacket::Bye(bye),
        ]);

        let raw = original.serialize().unwrap();
        let parsed = CompoundControlPacket::parse(&raw).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_parse_rejects_leading_sdes() {
        let sdes = SourceDescriptionPacket::with_chunk(SdesChunk::new(7));
        let raw = ControlPacket::SourceDescription(sdes).serialize().unwrap();
        assert!(CompoundControlPacket::parse(&raw).is_err());
    }
}
