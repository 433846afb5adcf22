//! RTP fixed header (RFC 3550).
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! |V=2|P|X|  CC   |M|     PT      |       sequence number         |
//! |                           timestamp                           |
//! |           synchronization source (SSRC) identifier            |
//! |            contributing source (CSRC) identifiers             |
//! ```

use anyhow::{Result, bail};
use log::trace;

use crate::utils::bit_cursor::BitReader;
use crate::utils::buffer_view::BufferView;
use crate::utils::errors::RtpError;

pub const RTP_VERSION: u8 = 2;

/// Size of the header without CSRCs or extension.
pub const RTP_FIXED_HEADER_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpExtension {
    pub profile: u16,
    /// Extension length in 32-bit words, excluding the 4-byte extension header.
    pub length: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpHeader {
    pub version: u8,
    pub padding: bool,
    pub extension: Option<RtpExtension>,
    pub marker: bool,
    pub payload_type: u8,
    pub sequence_number: u16,
    pub timestamp: u32,
    pub ssrc: u32,
    pub csrcs: Vec<u32>,
}

impl RtpHeader {
    pub fn read(reader: &mut BitReader) -> Result<Self> {
        let version = reader.get_n(2)?;
        if version != RTP_VERSION {
            bail!(RtpError::UnsupportedVersion(version));
        }

        let padding = reader.get()?;
        let has_extension = reader.get()?;
        let csrc_count: usize = reader.get_n(4)?;
        let marker = reader.get()?;
        let payload_type = reader.get_n(7)?;
        let sequence_number = reader.get_n(16)?;
        let timestamp = reader.get_n(32)?;
        let ssrc = reader.get_n(32)?;

        let csrcs = (0..csrc_count)
            .map(|_| reader.get_n::<u32>(32))
            .collect::<Result<Vec<_>, _>>()?;

        let extension = if has_extension {
            let profile = reader.get_n(16)?;
            let length: u16 = reader.get_n(16)?;
            reader.skip_n(length as u64 * 32)?;

            Some(RtpExtension { profile, length })
        } else {
            None
        };

        trace!(
            "RTP header: pt = {payload_type}, seq = {sequence_number}, ts = {timestamp}, ssrc = {ssrc:#010X}, csrcs = {csrc_count}, marker = {marker}"
        );

        Ok(Self {
            version,
            padding,
            extension,
            marker,
            payload_type,
            sequence_number,
            timestamp,
            ssrc,
            csrcs,
        })
    }

    /// Header length in bytes, CSRCs and extension included.
    pub fn byte_len(&self) -> usize {
        RTP_FIXED_HEADER_LEN
            + 4 * self.csrcs.len()
            + self
                .extension
                .as_ref()
                .map_or(0, |ext| 4 + 4 * ext.length as usize)
    }
}

/// An RTP datagram split into its header and payload.
#[derive(Debug, Clone)]
pub struct RtpPacket<'a> {
    pub header: RtpHeader,
    pub payload: BufferView<'a>,
}

impl<'a> RtpPacket<'a> {
    /// Splits a datagram, stripping any RTP padding from the payload.
    pub fn parse(datagram: BufferView<'a>) -> Result<Self> {
        let mut reader = BitReader::new(datagram);
        let header = RtpHeader::read(&mut reader)?;

        let mut payload = datagram.slice(header.byte_len()..)?;

        if header.padding && !payload.is_empty() {
            let padding = payload.byte_at(payload.len() - 1)? as usize;
            if padding == 0 || padding > payload.len() {
                bail!(RtpError::InvalidPadding {
                    padding,
                    payload: payload.len(),
                });
            }

            payload = payload.slice(..payload.len() - padding)?;
        }

        Ok(Self { header, payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::BitError;

    const HEADER: [u8; 12] = [
        0x80, 0xE4, 0x12, 0x34, 0xDE, 0xAD, 0xBE, 0xEF, 0x01, 0x02, 0x03, 0x04,
    ];

    #[test]
    fn fixed_header() -> Result<()> {
        let mut datagram = HEADER.to_vec();
        datagram.extend_from_slice(&[0xAA, 0xBB]);

        let packet = RtpPacket::parse(BufferView::from(datagram.as_slice()))?;
        let header = &packet.header;

        assert_eq!(header.version, 2);
        assert!(!header.padding);
        assert!(header.extension.is_none());
        assert!(header.marker);
        assert_eq!(header.payload_type, 100);
        assert_eq!(header.sequence_number, 0x1234);
        assert_eq!(header.timestamp, 0xDEAD_BEEF);
        assert_eq!(header.ssrc, 0x0102_0304);
        assert!(header.csrcs.is_empty());
        assert_eq!(header.byte_len(), 12);
        assert_eq!(packet.payload.as_bytes(), &[0xAA, 0xBB]);

        Ok(())
    }

    #[test]
    fn csrcs_extension_and_padding() -> Result<()> {
        let mut datagram = HEADER.to_vec();
        // P, X and CC = 1
        datagram[0] = 0x80 | 0x20 | 0x10 | 0x01;
        datagram.extend_from_slice(&[0x11, 0x22, 0x33, 0x44]);
        datagram.extend_from_slice(&[0xBE, 0xDE, 0x00, 0x01, 0x10, 0x20, 0x30, 0x40]);
        datagram.extend_from_slice(&[0x55, 0x66]);
        datagram.extend_from_slice(&[0x00, 0x00, 0x03]);

        let packet = RtpPacket::parse(BufferView::from(datagram.as_slice()))?;
        let header = &packet.header;

        assert!(header.padding);
        assert_eq!(header.csrcs, [0x1122_3344]);
        assert_eq!(
            header.extension,
            Some(RtpExtension {
                profile: 0xBEDE,
                length: 1
            })
        );
        assert_eq!(header.byte_len(), 24);
        assert_eq!(packet.payload.as_bytes(), &[0x55, 0x66]);

        Ok(())
    }

    #[test]
    fn rejects_bad_version_and_padding() {
        let mut datagram = HEADER.to_vec();
        datagram[0] = 0x40;
        let err = RtpPacket::parse(BufferView::from(datagram.as_slice())).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RtpError>(),
            Some(&RtpError::UnsupportedVersion(1))
        );

        let mut datagram = HEADER.to_vec();
        datagram[0] |= 0x20;
        datagram.extend_from_slice(&[0x00, 0x09]);
        let err = RtpPacket::parse(BufferView::from(datagram.as_slice())).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RtpError>(),
            Some(&RtpError::InvalidPadding {
                padding: 9,
                payload: 2
            })
        );
    }

    #[test]
    fn truncated_header_underruns() {
        let err = RtpPacket::parse(BufferView::from(&HEADER[..10])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BitError>(),
            Some(BitError::BufferUnderrun { requested: 32, .. })
        ));
    }
}
