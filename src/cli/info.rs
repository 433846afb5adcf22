use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::Level;

use super::command::{Cli, InfoArgs};
use super::decode::field_str;
use crate::input::for_each_datagram;
use st2110::process::parse::{AncRtpPacket, Parser};

pub fn cmd_info(args: &InfoArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    log::info!("Analyzing {} datagram(s)", args.inputs.len());

    let mut parser = Parser::default();

    // Configure fail level based on strict mode
    let fail_level = if cli.strict { Level::Warn } else { Level::Error };
    parser.set_fail_level(fail_level);

    let mut context = AnalysisContext::default();

    if let Some(multi) = multi {
        let pb = multi.add(ProgressBar::new_spinner());
        pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb.set_message("Analyzing datagrams...");
        context.pb = Some(pb);
    }

    for_each_datagram(&args.inputs, |source, datagram| {
        let parsed = datagram.and_then(|datagram| {
            context.total_bytes += datagram.len();
            parser.parse(datagram)
        });

        match parsed {
            Ok(packet) => context.record(source, &packet),
            Err(e) => {
                if cli.strict {
                    return Err(e.context(format!("Failed to analyze {}", source.display())));
                }
                log::warn!("Parse error in {}: {e}", source.display());
                context.dropped += 1;
            }
        }

        Ok(())
    })?;

    if let Some(pb) = &context.pb {
        pb.finish_and_clear();
    }

    println!("{}", context.summary(&parser));

    Ok(())
}

#[derive(Default)]
struct AnalysisContext {
    pb: Option<ProgressBar>,
    total_bytes: usize,
    dropped: usize,
    anc_packets: usize,
    bad_checksums: usize,
    kinds: BTreeMap<String, usize>,
}

impl AnalysisContext {
    fn record(&mut self, source: &Path, packet: &AncRtpPacket) {
        let text = datagram_info(source, packet);
        match &self.pb {
            Some(pb) => pb.suspend(|| println!("{text}")),
            None => println!("{text}"),
        }

        for anc in &packet.payload.packets {
            self.anc_packets += 1;
            if !anc.checksum_ok() {
                self.bad_checksums += 1;
            }
            *self.kinds.entry(anc.kind().to_string()).or_default() += 1;
        }
    }

    fn summary(&self, parser: &Parser) -> String {
        let mut lines = vec![
            "Analysis Summary".to_string(),
            format!("  Datagrams decoded         {}", parser.packets_parsed()),
            format!("  Datagrams dropped         {}", self.dropped),
            format!("  Size                      {} bytes", self.total_bytes),
            format!("  Sequence discontinuities  {}", parser.sequence_gaps()),
            format!("  ANC packets               {}", self.anc_packets),
            format!("  Checksum mismatches       {}", self.bad_checksums),
        ];

        if !self.kinds.is_empty() {
            lines.push("  Packet types".to_string());
            for (kind, count) in &self.kinds {
                lines.push(format!("    {count:>6}  {kind}"));
            }
        }

        lines.join("\n")
    }
}

fn datagram_info(source: &Path, packet: &AncRtpPacket) -> String {
    let rtp = &packet.rtp;
    let header = &packet.payload.header;

    let mut lines = vec![
        format!("{}", source.display()),
        "RTP Header".to_string(),
        format!("  Version                   {}", rtp.version),
        format!("  Payload type              {}", rtp.payload_type),
        format!("  Marker                    {}", rtp.marker),
        format!("  Sequence number           {}", rtp.sequence_number),
        format!("  Timestamp                 {}", rtp.timestamp),
        format!("  SSRC                      {:#010X}", rtp.ssrc),
    ];

    if !rtp.csrcs.is_empty() {
        let csrcs = rtp
            .csrcs
            .iter()
            .map(|c| format!("{c:#010X}"))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("  CSRC list                 {csrcs}"));
    }
    if let Some(extension) = &rtp.extension {
        lines.push(format!(
            "  Header extension          profile {:#06X}, {} words",
            extension.profile, extension.length
        ));
    }

    lines.extend([
        "Payload Header".to_string(),
        format!("  Extended sequence number  {}", header.extended_sequence_number),
        format!("  Full sequence number      {}", packet.sequence()),
        format!("  Length                    {} bytes", header.length),
        format!("  ANC count                 {}", header.anc_count),
        format!("  Field                     {}", field_str(header.field)),
        String::new(),
    ]);

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use st2110::structs::anc::{AncPacket, AncPayload, FieldKind};

    fn datagram(sequence: u16, did: u8, sdid: u8) -> Vec<u8> {
        let mut bytes = vec![0x81, 0x64];
        bytes.extend_from_slice(&sequence.to_be_bytes());
        bytes.extend_from_slice(&3003u32.to_be_bytes());
        bytes.extend_from_slice(&0x1234_5678u32.to_be_bytes());
        bytes.extend_from_slice(&0x0000_00AAu32.to_be_bytes());

        let packet = AncPacket::new(10, 0, did, sdid, &[1, 2, 3]).unwrap();
        let payload = AncPayload::new(1, FieldKind::Progressive, vec![packet]).unwrap();
        bytes.extend(payload.to_bytes().unwrap());
        bytes
    }

    #[test]
    fn header_listing() {
        let packet = Parser::default().parse(&datagram(7, 0x41, 0x05)).unwrap();
        let text = datagram_info(Path::new("a.rtp"), &packet);

        assert!(text.starts_with("a.rtp\nRTP Header\n"));
        assert!(text.contains("  CSRC list                 0x000000AA"));
        assert!(text.contains("  Full sequence number      65543"));
        assert!(text.contains("  Field                     progressive"));
        assert!(!text.contains("Header extension"));
    }

    #[test]
    fn summary_counts_kinds() {
        let mut parser = Parser::default();
        let mut context = AnalysisContext::default();

        for (sequence, did, sdid) in [(1, 0x41, 0x05), (2, 0x61, 0x01), (4, 0x41, 0x05)] {
            let packet = parser.parse(&datagram(sequence, did, sdid)).unwrap();
            context.record(Path::new("x"), &packet);
        }

        let summary = context.summary(&parser);
        assert!(summary.contains("  Datagrams decoded         3"));
        assert!(summary.contains("  Sequence discontinuities  1"));
        assert!(summary.contains("  ANC packets               3"));
        assert!(summary.contains("       2  AFD and bar data (ST 2016-3)"));
        assert!(summary.contains("       1  CEA-708 caption distribution packet (ST 334-1)"));
    }
}
