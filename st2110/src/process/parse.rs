use anyhow::Result;
use log::{debug, warn};

use crate::structs::anc::AncPayload;
use crate::structs::rtp::{RtpHeader, RtpPacket};
use crate::utils::bit_cursor::BitReader;
use crate::utils::buffer_view::BufferView;

/// Parses RTP datagrams carrying ST 2110-40 ancillary data.
///
/// Each call decodes one datagram with its own cursor; the parser only
/// carries validation settings and sequence bookkeeping between calls.
#[derive(Debug, Default)]
pub struct Parser {
    state: ParserState,
}

impl Parser {
    /// Decodes the RTP header and the ancillary payload of `datagram`.
    ///
    /// Any failure means the datagram should be dropped as a whole; nothing
    /// partially decoded is returned.
    pub fn parse(&mut self, datagram: &[u8]) -> Result<AncRtpPacket> {
        let rtp = RtpPacket::parse(BufferView::new(datagram))?;

        let reader = &mut BitReader::new(rtp.payload);
        let payload = AncPayload::read(&mut self.state, reader)?;

        let sequence = extended_sequence(&rtp.header, &payload);
        self.state.track_sequence(sequence);
        self.state.packets_parsed += 1;

        debug!(
            "Datagram {}: seq {sequence}, ts {}, {} ANC packets{}",
            self.state.packets_parsed,
            rtp.header.timestamp,
            payload.packets.len(),
            if rtp.header.marker { ", marker" } else { "" }
        );

        Ok(AncRtpPacket {
            rtp: rtp.header,
            payload,
        })
    }

    /// Sets the failure level for validation errors.
    ///
    /// - `log::Level::Error`: Only fail on Error level messages (default)
    /// - `log::Level::Warn`: Fail on Warning level and above (strict mode)
    pub fn set_fail_level(&mut self, level: log::Level) {
        self.state.fail_level = level;
    }

    pub fn packets_parsed(&self) -> usize {
        self.state.packets_parsed
    }

    pub fn sequence_gaps(&self) -> usize {
        self.state.sequence_gaps
    }

    pub fn last_sequence(&self) -> Option<u32> {
        self.state.last_sequence
    }
}

#[derive(Debug, Clone)]
pub struct ParserState {
    pub fail_level: log::Level,
    pub last_sequence: Option<u32>,
    pub packets_parsed: usize,
    pub sequence_gaps: usize,
}

impl Default for ParserState {
    fn default() -> Self {
        Self {
            fail_level: log::Level::Error,
            last_sequence: None,
            packets_parsed: 0,
            sequence_gaps: 0,
        }
    }
}

impl ParserState {
    fn track_sequence(&mut self, sequence: u32) {
        if let Some(last) = self.last_sequence {
            let expected = last.wrapping_add(1);
            if sequence != expected {
                self.sequence_gaps += 1;
                warn!("Sequence discontinuity: expected {expected}, got {sequence}");
            }
        }

        self.last_sequence = Some(sequence);
    }
}

/// A fully decoded ancillary data datagram.
#[derive(Debug, Clone)]
pub struct AncRtpPacket {
    pub rtp: RtpHeader,
    pub payload: AncPayload,
}

impl AncRtpPacket {
    /// 32-bit sequence number: Extended Sequence Number above the RTP one.
    pub fn sequence(&self) -> u32 {
        extended_sequence(&self.rtp, &self.payload)
    }
}

fn extended_sequence(rtp: &RtpHeader, payload: &AncPayload) -> u32 {
    ((payload.header.extended_sequence_number as u32) << 16) | rtp.sequence_number as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::anc::{AncPacket, FieldKind, OFFSET_UNSPECIFIED};
    use crate::utils::errors::{AncError, BitError};

    fn datagram(sequence: u32, payload: &AncPayload) -> Vec<u8> {
        let mut bytes = vec![0x80, 0x64];
        bytes.extend_from_slice(&(sequence as u16).to_be_bytes());
        bytes.extend_from_slice(&90_000u32.to_be_bytes());
        bytes.extend_from_slice(&0xCAFE_F00Du32.to_be_bytes());

        let mut payload = payload.clone();
        payload.header.extended_sequence_number = (sequence >> 16) as u16;
        bytes.extend(payload.to_bytes().unwrap());

        bytes
    }

    fn captions() -> AncPayload {
        AncPayload::new(
            0,
            FieldKind::Progressive,
            vec![AncPacket::new(9, OFFSET_UNSPECIFIED, 0x61, 0x01, &[0x96, 0x69, 0x10]).unwrap()],
        )
        .unwrap()
    }

    #[test]
    fn parses_datagram() -> Result<()> {
        let mut parser = Parser::default();
        let packet = parser.parse(&datagram(0x0003_FFFF, &captions()))?;

        assert_eq!(packet.rtp.payload_type, 100);
        assert_eq!(packet.rtp.timestamp, 90_000);
        assert_eq!(packet.rtp.ssrc, 0xCAFE_F00D);
        assert_eq!(packet.sequence(), 0x0003_FFFF);
        assert_eq!(packet.payload.packets.len(), 1);
        assert_eq!(packet.payload.packets[0].user_data_bytes(), [0x96, 0x69, 0x10]);
        assert_eq!(parser.packets_parsed(), 1);

        Ok(())
    }

    #[test]
    fn tracks_extended_sequence() -> Result<()> {
        let mut parser = Parser::default();
        let payload = captions();

        // crosses the 16-bit RTP sequence boundary
        for sequence in [0x0000_FFFE, 0x0000_FFFF, 0x0001_0000] {
            parser.parse(&datagram(sequence, &payload))?;
        }
        assert_eq!(parser.sequence_gaps(), 0);

        parser.parse(&datagram(0x0001_0005, &payload))?;
        assert_eq!(parser.sequence_gaps(), 1);
        assert_eq!(parser.last_sequence(), Some(0x0001_0005));

        parser.parse(&datagram(0x0001_0006, &payload))?;
        assert_eq!(parser.sequence_gaps(), 1);
        assert_eq!(parser.packets_parsed(), 5);

        Ok(())
    }

    #[test]
    fn strict_mode_rejects_warnings() -> Result<()> {
        let mut payload = captions();
        payload.packets[0].checksum ^= 1;
        let bytes = datagram(1, &payload);

        let mut parser = Parser::default();
        assert!(parser.parse(&bytes).is_ok());

        parser.set_fail_level(log::Level::Warn);
        let err = parser.parse(&bytes).unwrap_err();
        assert!(err.downcast_ref::<AncError>().is_some());

        Ok(())
    }

    #[test]
    fn truncated_datagram_is_dropped() {
        let bytes = datagram(1, &captions());
        let mut parser = Parser::default();

        let err = parser.parse(&bytes[..bytes.len() - 6]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BitError>(),
            Some(BitError::BufferUnderrun { .. })
        ));
        assert_eq!(parser.packets_parsed(), 0);
        assert_eq!(parser.last_sequence(), None);
    }
}
