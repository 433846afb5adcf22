use std::path::Path;

use anyhow::Result;
use indicatif::MultiProgress;
use log::Level;
use serde::Serialize;

use super::command::{Cli, DecodeArgs, OutputFormat};
use super::progress::{create_progress_bar, print_with};
use crate::input::for_each_datagram;
use st2110::process::parse::{AncRtpPacket, Parser};
use st2110::structs::anc::{
    AncPacket, FieldKind, LINE_ANY_VANC, LINE_UNSPECIFIED, OFFSET_ANY_HANC, OFFSET_UNSPECIFIED,
};

pub fn cmd_decode(args: &DecodeArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    log::info!("Decoding {} datagram(s)", args.inputs.len());

    let mut parser = Parser::default();

    // Configure fail level based on strict mode
    let fail_level = if cli.strict { Level::Warn } else { Level::Error };
    parser.set_fail_level(fail_level);

    let pb = multi
        .map(|multi| create_progress_bar(multi, args.inputs.len()))
        .transpose()?;

    let mut dropped = 0usize;

    for_each_datagram(&args.inputs, |source, datagram| {
        match datagram.and_then(|datagram| parser.parse(datagram)) {
            Ok(packet) => {
                let report = DatagramReport::new(source, &packet);
                let text = match args.format {
                    OutputFormat::Text => report.to_text(),
                    OutputFormat::Yaml => format!("---\n{}", serde_yaml_ng::to_string(&report)?),
                };
                print_with(pb.as_ref(), &text);
            }
            Err(e) => {
                if cli.strict {
                    return Err(e.context(format!("Failed to decode {}", source.display())));
                }
                log::warn!("Dropping {}: {e}", source.display());
                dropped += 1;
            }
        }

        if let Some(pb) = &pb {
            pb.inc(1);
        }

        Ok(())
    })?;

    if let Some(pb) = &pb {
        pb.finish_and_clear();
    }

    log::info!(
        "Decoded {} datagram(s), {dropped} dropped, {} sequence discontinuities",
        parser.packets_parsed(),
        parser.sequence_gaps()
    );

    Ok(())
}

#[derive(Debug, Serialize)]
pub struct DatagramReport {
    pub source: String,
    pub sequence: u32,
    pub timestamp: u32,
    pub ssrc: String,
    pub payload_type: u8,
    pub marker: bool,
    pub field: String,
    pub packets: Vec<PacketReport>,
}

#[derive(Debug, Serialize)]
pub struct PacketReport {
    pub line: String,
    pub horizontal_offset: String,
    pub channel: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<u8>,
    pub did: String,
    pub sdid: String,
    pub kind: String,
    pub parity_ok: bool,
    pub checksum_ok: bool,
    pub user_data: String,
}

impl DatagramReport {
    pub fn new(source: &Path, packet: &AncRtpPacket) -> Self {
        Self {
            source: source.display().to_string(),
            sequence: packet.sequence(),
            timestamp: packet.rtp.timestamp,
            ssrc: format!("{:#010X}", packet.rtp.ssrc),
            payload_type: packet.rtp.payload_type,
            marker: packet.rtp.marker,
            field: field_str(packet.payload.header.field).to_string(),
            packets: packet.payload.packets.iter().map(PacketReport::new).collect(),
        }
    }

    pub fn to_text(&self) -> String {
        let mut lines = vec![format!(
            "{}: seq {}, ts {}, ssrc {}, pt {}{}, {}, {} ANC packet(s)",
            self.source,
            self.sequence,
            self.timestamp,
            self.ssrc,
            self.payload_type,
            if self.marker { ", marker" } else { "" },
            self.field,
            self.packets.len()
        )];

        for (index, packet) in self.packets.iter().enumerate() {
            lines.push(format!(
                "  [{index}] line {}, offset {}, {}{}, DID {} SDID {}: {}",
                packet.line,
                packet.horizontal_offset,
                packet.channel,
                packet
                    .stream
                    .map(|s| format!(" stream {s}"))
                    .unwrap_or_default(),
                packet.did,
                packet.sdid,
                packet.kind
            ));
            lines.push(format!(
                "      {} words: {} (parity {}, checksum {})",
                packet.user_data.split_whitespace().count(),
                packet.user_data,
                if packet.parity_ok { "ok" } else { "BAD" },
                if packet.checksum_ok { "ok" } else { "BAD" }
            ));
        }

        lines.push(String::new());
        lines.join("\n")
    }
}

impl PacketReport {
    fn new(packet: &AncPacket) -> Self {
        let line = match packet.line_number {
            LINE_UNSPECIFIED => "unspecified".to_string(),
            LINE_ANY_VANC => "any VANC".to_string(),
            line => line.to_string(),
        };
        let horizontal_offset = match packet.horizontal_offset {
            OFFSET_UNSPECIFIED => "unspecified".to_string(),
            OFFSET_ANY_HANC => "any HANC".to_string(),
            offset => offset.to_string(),
        };

        Self {
            line,
            horizontal_offset,
            channel: if packet.c_not_y { "C" } else { "Y" },
            stream: packet.stream_flag.then_some(packet.stream_num),
            did: format!("{:#04X}", packet.did_value()),
            sdid: format!("{:#04X}", packet.sdid_value()),
            kind: packet.kind().to_string(),
            parity_ok: packet.parity_ok(),
            checksum_ok: packet.checksum_ok(),
            user_data: packet
                .user_data_bytes()
                .iter()
                .map(|b| format!("{b:02X}"))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

pub fn field_str(field: FieldKind) -> &'static str {
    match field {
        FieldKind::Progressive => "progressive",
        FieldKind::Field1 => "field 1",
        FieldKind::Field2 => "field 2",
        FieldKind::Invalid => "invalid field",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use st2110::structs::anc::AncPayload;

    fn decoded() -> Result<AncRtpPacket> {
        let mut datagram = vec![
            0x80, 0xE4, 0x00, 0x2A, 0x00, 0x01, 0x5F, 0x90, 0x00, 0x00, 0x00, 0x07,
        ];
        let mut cdp = AncPacket::new(9, OFFSET_UNSPECIFIED, 0x61, 0x01, &[0x96, 0x69])?;
        cdp.c_not_y = true;
        cdp.stream_flag = true;
        cdp.stream_num = 2;
        let timecode = AncPacket::new(LINE_UNSPECIFIED, 0, 0x60, 0x60, &[0; 16])?;

        datagram.extend(AncPayload::new(0, FieldKind::Field1, vec![cdp, timecode])?.to_bytes()?);

        Parser::default().parse(&datagram)
    }

    #[test]
    fn text_report() -> Result<()> {
        let report = DatagramReport::new(Path::new("cc.rtp"), &decoded()?);
        let text = report.to_text();

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("cc.rtp: seq 42, ts 90000, ssrc 0x00000007, pt 100, marker, field 1, 2 ANC packet(s)")
        );
        assert_eq!(
            lines.next(),
            Some(
                "  [0] line 9, offset unspecified, C stream 2, DID 0x61 SDID 0x01: CEA-708 caption distribution packet (ST 334-1)"
            )
        );
        assert_eq!(
            lines.next(),
            Some("      2 words: 96 69 (parity ok, checksum ok)")
        );
        assert!(
            lines
                .next()
                .is_some_and(|line| line.contains("line unspecified, offset 0, Y, DID 0x60 SDID 0x60"))
        );
        assert_eq!(text.lines().count(), 5);
        assert!(text.ends_with("(parity ok, checksum ok)\n"));

        Ok(())
    }

    #[test]
    fn yaml_report() -> Result<()> {
        let report = DatagramReport::new(Path::new("cc.rtp"), &decoded()?);
        let yaml = serde_yaml_ng::to_string(&report)?;

        assert!(yaml.contains("sequence: 42"));
        assert!(yaml.contains("ssrc: '0x00000007'") || yaml.contains("ssrc: \"0x00000007\""));
        assert!(yaml.contains("stream: 2"));
        assert_eq!(yaml.matches("checksum_ok: true").count(), 2);

        Ok(())
    }
}
