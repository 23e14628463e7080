use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{Error, Result, RtpSsrc, RtpTimestamp};

/// 64-bit NTP timestamp, split into seconds and fraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NtpTimestamp {
    /// Seconds since January 1st 1900
    pub seconds: u32,

    /// Fractional part of a second
    pub fraction: u32,
}

/// Reception report block embedded in sender and receiver reports
///
/// 24 bytes on the wire. The session engine currently fills the metric
/// slots with zeros; only the target SSRC is meaningful.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceptionReport {
    /// SSRC the report pertains to
    pub ssrc: RtpSsrc,

    /// Fraction of packets lost since the last report
    pub fraction_lost: u8,

    /// Cumulative number of packets lost (24 bits)
    pub cumulative_lost: u32,

    /// Extended highest sequence number received
    pub extended_highest_sequence: u32,

    /// Interarrival jitter estimate
    pub interarrival_jitter: u32,

    /// Middle 32 bits of the NTP timestamp of the last sender report
    pub last_sender_report: u32,

    /// Delay since the last sender report, in 1/65536 seconds
    pub delay_since_last_sender_report: u32,
}

impl ReceptionReport {
    /// Size of a reception report block in bytes
    pub const SIZE: usize = 24;

    /// Create a zero-filled report block for the given source
    pub fn new(ssrc: RtpSsrc) -> Self {
        Self { ssrc, ..Self::default() }
    }

    /// Parse a reception report block
    pub fn parse(buf: &mut Bytes) -> Result<Self> {
        if buf.remaining() < Self::SIZE {
            return Err(Error::BufferTooSmall {
                required: Self::SIZE,
                available: buf.remaining(),
            });
        }

        let ssrc = buf.get_u32();
        let fraction_lost = buf.get_u8();
        let cumulative_lost =
            ((buf.get_u8() as u32) << 16) | ((buf.get_u8() as u32) << 8) | (buf.get_u8() as u32);
        let extended_highest_sequence = buf.get_u32();
        let interarrival_jitter = buf.get_u32();
        let last_sender_report = buf.get_u32();
        let delay_since_last_sender_report = buf.get_u32();

        Ok(Self {
            ssrc,
            fraction_lost,
            cumulative_lost,
            extended_highest_sequence,
            interarrival_jitter,
            last_sender_report,
            delay_since_last_sender_report,
        })
    }

    /// Serialize the report block
    pub fn serialize(&self, buf: &mut BytesMut) -> Result<()> {
        if self.cumulative_lost > 0x00ff_ffff {
            return Err(Error::Rtcp(format!(
                "cumulative lost exceeds 24 bits: {}",
                self.cumulative_lost
            )));
        }

        buf.put_u32(self.ssrc);
        buf.put_u8(self.fraction_lost);
        buf.put_u8((self.cumulative_lost >> 16) as u8);
        buf.put_u8((self.cumulative_lost >> 8) as u8);
        buf.put_u8(self.cumulative_lost as u8);
        buf.put_u32(self.extended_highest_sequence);
        buf.put_u32(self.interarrival_jitter);
        buf.put_u32(self.last_sender_report);
        buf.put_u32(self.delay_since_last_sender_report);
        Ok(())
    }
}

/// RTCP Sender Report (SR) packet, RFC 3550 §6.4.1
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderReportPacket {
    /// SSRC of the sender issuing the report
    pub sender_ssrc: RtpSsrc,

    /// NTP timestamp at report generation
    pub ntp_timestamp: NtpTimestamp,

    /// RTP timestamp corresponding to the NTP timestamp
    pub rtp_timestamp: RtpTimestamp,

    /// Total packets sent since the start of transmission
    pub sender_packet_count: u32,

    /// Total payload octets sent since the start of transmission
    pub sender_octet_count: u32,

    /// Reception report blocks
    pub reports: Vec<ReceptionReport>,
}

impl SenderReportPacket {
    /// Create an empty sender report for the given sender
    pub fn new(sender_ssrc: RtpSsrc) -> Self {
        Self { sender_ssrc, ..Self::default() }
    }

    pub(crate) fn serialize_body(&self) -> Result<BytesMut> {
        let mut buf = BytesMut::with_capacity(24 + self.reports.len() * ReceptionReport::SIZE);
        buf.put_u32(self.sender_ssrc);
        buf.put_u32(self.ntp_timestamp.seconds);
        buf.put_u32(self.ntp_timestamp.fraction);
        buf.put_u32(self.rtp_timestamp);
        buf.put_u32(self.sender_packet_count);
        buf.put_u32(self.sender_octet_count);
        for report in &self.reports {
            report.serialize(&mut buf)?;
        }
        Ok(buf)
    }
}

/// RTCP Receiver Report (RR) packet, RFC 3550 §6.4.2
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiverReportPacket {
    /// SSRC of the receiver issuing the report
    pub sender_ssrc: RtpSsrc,

    /// Reception report blocks
    pub reports: Vec<ReceptionReport>,
}

impl ReceiverReportPacket {
    /// Create an empty receiver report for the given sender
    ///
    /// An RR with no report blocks is what a session emits when joining:
    /// it announces presence without claiming any reception history.
    pub fn new(sender_ssrc: RtpSsrc) -> Self {
        Self { sender_ssrc, reports: Vec::new() }
    }

    pub(crate) fn serialize_body(&self) -> Result<BytesMut> {
        let mut buf = BytesMut::with_capacity(4 + self.reports.len() * ReceptionReport::SIZE);
        buf.put_u32(self.sender_ssrc);
        for report in &self.reports {
            report.serialize(&mut buf)?;
        }
        Ok(buf)
    }
}

pub(crate) fn parse_sender_report(body: &[u8], report_count: u8) -> Result<SenderReportPacket> {
    let mut buf = Bytes::copy_from_slice(body);
    if buf.remaining() < 24 {
        return Err(Error::BufferTooSmall { required: 24, available: buf.remaining() });
    }

    let sender_ssrc = buf.get_u32();
    let ntp_timestamp = NtpTimestamp { seconds: buf.get_u32(), fraction: buf.get_u32() };
    let rtp_timestamp = buf.get_u32();
    let sender_packet_count = buf.get_u32();
    let sender_octet_count = buf.get_u32();

    let mut reports = Vec::with_capacity(report_count as usize);
    for _ in 0..report_count {
        reports.push(ReceptionReport::parse(&mut buf)?);
    }

    Ok(SenderReportPacket {
        sender_ssrc,
        ntp_timestamp,
        rtp_timestamp,
        sender_packet_count,
        sender_octet_count,
        reports,
    })
}

pub(crate) fn parse_receiver_report(body: &[u8], report_count: u8) -> Result<ReceiverReportPacket> {
    let mut buf = Bytes::copy_from_slice(body);
    if buf.remaining() < 4 {
        return Err(Error::BufferTooSmall { required: 4, available: buf.remaining() });
    }

    let sender_ssrc = buf.get_u32();
    let mut reports = Vec::with_capacity(report_count as usize);
    for _ in 0..report_count {
        reports.push(ReceptionReport::parse(&mut buf)?);
    }

    Ok(ReceiverReportPacket { sender_ssrc, reports })
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::ControlPacket;

    #[test]
    fn test_sender_report_roundtrip() {
        let mut sr = SenderReportPacket::new(0x12345678);
        sr.ntp_timestamp = NtpTimestamp { seconds: 1234, fraction: 5678 };
        sr.rtp_timestamp = 0x87654321;
        sr.sender_packet_count = 100;
        sr.sender_octet_count = 12345;
        sr.reports.push(ReceptionReport {
            ssrc: 0xabcdef01,
            fraction_lost: 42,
            cumulative_lost: 1000,
            extended_highest_sequence: 5000,
            interarrival_jitter: 100,
            last_sender_report: 0x55667788,
            delay_since_last_sender_report: 1500,
        });

        let raw = ControlPacket::SenderReport(sr.clone()).serialize().unwrap();
        match ControlPacket::parse(&raw).unwrap() {
            ControlPacket::SenderReport(parsed) => assert_eq!(parsed, sr),
            other => panic!("expected SR, got {:?}", other),
        }
    }

    #[test]
    fn test_receiver_report_roundtrip() {
        let mut rr = ReceiverReportPacket::new(0x12345678);
        rr.reports.push(ReceptionReport::new(0xabcdef01));
        rr.reports.push(ReceptionReport::new(0x11223344));

        let raw = ControlPacket::ReceiverReport(rr.clone()).serialize().unwrap();
        match ControlPacket::parse(&raw).unwrap() {
            ControlPacket::ReceiverReport(parsed) => assert_eq!(parsed, rr),
            other => panic!("expected RR, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_receiver_report_is_one_word_body() {
        let rr = ReceiverReportPacket::new(0xcafebabe);
        let raw = ControlPacket::ReceiverReport(rr).serialize().unwrap();
        assert_eq!(raw.len(), 8);
        assert_eq!(raw[3], 1); // length field: one 32-bit word past the header
    }

    #[test]
    fn test_cumulative_lost_range_check() {
        let report = ReceptionReport {
            cumulative_lost: 0x0100_0000,
            ..ReceptionReport::default()
        };
        let mut buf = BytesMut::new();
        assert!(report.serialize(&mut buf).is_err());
    }
}
