//! Automated RTCP bookkeeping
//!
//! Joining announces presence with an empty receiver report plus an SDES
//! describing the local source; leaving sends one compound per known
//! participant carrying a report, the SDES and a BYE (RFC 3550 §6.1, §6.6).
//! All of it is gated on `automated_rtcp_handling`.

use tracing::debug;

use crate::packet::control::{
    ByePacket, CompoundControlPacket, ControlPacket, ReceiverReportPacket, ReceptionReport,
    SdesChunk, SdesItem, SenderReportPacket, SourceDescriptionPacket,
};
use crate::participant::ParticipantContext;
use crate::session::{RtpSession, VERSION};
use crate::RtpSsrc;

impl RtpSession {
    /// Announce the given SSRC to the session
    ///
    /// Emitted at `init` and after an announced SSRC rotation.
    pub(crate) fn join_session(&self, current_ssrc: RtpSsrc) {
        if !self.config().automated_rtcp_handling {
            return;
        }

        // Joining carries an empty receiver report: presence, no history.
        let receiver_report = ReceiverReportPacket::new(current_ssrc);
        let sdes = self.build_sdes_packet(current_ssrc);
        let compound = CompoundControlPacket::new(vec![
            ControlPacket::ReceiverReport(receiver_report),
            ControlPacket::SourceDescription(sdes),
        ]);
        self.send_compound_to_all(&compound);
        debug!(parent: self.span(), "announced ssrc {:08x} to the session", current_ssrc);
    }

    /// Say goodbye under the given SSRC
    ///
    /// Emitted at termination and when a collision forces an announced
    /// rotation away from an SSRC that has already carried traffic.
    pub(crate) fn leave_session(&self, current_ssrc: RtpSsrc, motive: &str) {
        if !self.config().automated_rtcp_handling {
            return;
        }

        for compound in self.build_leave_compounds(current_ssrc, motive) {
            self.send_compound_to_all(&compound);
        }
    }

    fn build_leave_compounds(&self, current_ssrc: RtpSsrc, motive: &str) -> Vec<CompoundControlPacket> {
        let sdes = self.build_sdes_packet(current_ssrc);
        let bye = ByePacket::new(current_ssrc, motive);

        self.remote_participants()
            .iter()
            .map(|context| {
                CompoundControlPacket::new(vec![
                    self.build_report_packet(current_ssrc, context),
                    ControlPacket::SourceDescription(sdes.clone()),
                    ControlPacket::Bye(bye.clone()),
                ])
            })
            .collect()
    }

    /// Build the per-recipient report for a leave compound
    ///
    /// A sender report when packets went out to this participant (its send
    /// stats are captured and reset), a receiver report otherwise. One
    /// reception report block is attached when the participant has sent us
    /// data; its metric slots stay zero until a metrics component fills
    /// them.
    fn build_report_packet(&self, current_ssrc: RtpSsrc, context: &ParticipantContext) -> ControlPacket {
        let mut reports = Vec::new();
        if context.received_packets() > 0 {
            reports.push(ReceptionReport::new(context.ssrc()));
        }

        if context.sent_packets() > 0 {
            let (sent_packets, sent_bytes) = context.capture_and_reset_send_stats();
            ControlPacket::SenderReport(SenderReportPacket {
                sender_ssrc: current_ssrc,
                sender_packet_count: sent_packets as u32,
                sender_octet_count: sent_bytes as u32,
                reports,
                ..SenderReportPacket::default()
            })
        } else {
            ControlPacket::ReceiverReport(ReceiverReportPacket { sender_ssrc: current_ssrc, reports })
        }
    }

    /// Assemble the SDES describing the local participant
    ///
    /// CNAME and TOOL are always present: missing values are synthesized
    /// and persisted onto the local participant so every future packet
    /// advertises the same identity.
    pub(crate) fn build_sdes_packet(&self, current_ssrc: RtpSsrc) -> SourceDescriptionPacket {
        let bound_data_address = self.bound_data_address();
        let mut local = self.local_mut();

        if local.cname.is_none() {
            let address = bound_data_address.unwrap_or(local.data_address);
            local.cname = Some(format!("efflux/{}@{}", self.id(), address));
        }
        if local.tool.is_none() {
            local.tool = Some(VERSION.to_string());
        }

        let mut chunk = SdesChunk::new(current_ssrc);
        if let Some(cname) = &local.cname {
            chunk.items.push(SdesItem::cname(cname.clone()));
        }
        if let Some(name) = &local.name {
            chunk.items.push(SdesItem::name(name.clone()));
        }
        if let Some(email) = &local.email {
            chunk.items.push(SdesItem::email(email.clone()));
        }
        if let Some(phone) = &local.phone {
            chunk.items.push(SdesItem::phone(phone.clone()));
        }
        if let Some(location) = &local.location {
            chunk.items.push(SdesItem::location(location.clone()));
        }
        if let Some(tool) = &local.tool {
            chunk.items.push(SdesItem::tool(tool.clone()));
        }
        if let Some(note) = &local.note {
            chunk.items.push(SdesItem::note(note.clone()));
        }

        SourceDescriptionPacket::with_chunk(chunk)
    }
}
