//! ST 2110-40 ancillary data payload (RFC 8331).
//!
//! ## Payload header
//!
//! ```text
//! | Extended Sequence Number (16) | Length (16)                   |
//! | ANC_Count (8) | F (2) | reserved (22)                         |
//! ```
//!
//! ## ANC packet
//!
//! ```text
//! | C | Line_Number (11) | Horizontal_Offset (12) | S | StreamNum (7) |
//! | DID (10) | SDID (10) | Data_Count (10) | UDW ... | Checksum (10) |
//! | word_align to the next 32-bit boundary                         |
//! ```
//!
//! Every word after StreamNum is a 10-bit ST 291 word, packed back to back
//! with no byte padding, so almost every field in a packet starts mid-byte.

use std::io;

use anyhow::{Result, ensure};
use log::Level::Warn;
use log::{debug, trace};

use crate::log_or_err;
use crate::process::parse::ParserState;
use crate::structs::kind::AncKind;
use crate::utils::bit_cursor::BitReader;
use crate::utils::bit_writer::BitPacker;
use crate::utils::errors::AncError;
use crate::utils::parity::{checksum_word, parity_ok, with_parity};

/// Bytes occupied by the payload header.
pub const PAYLOAD_HEADER_LEN: usize = 8;

/// ST 291 word width.
pub const WORD_BITS: u32 = 10;

/// Line_Number: packet not tied to a specific line.
pub const LINE_UNSPECIFIED: u16 = 0x7FF;
/// Line_Number: any line in the vertical ancillary space.
pub const LINE_ANY_VANC: u16 = 0x7FE;
/// Horizontal_Offset: packet not tied to a specific location.
pub const OFFSET_UNSPECIFIED: u16 = 0xFFF;
/// Horizontal_Offset: anywhere in the horizontal ancillary space.
pub const OFFSET_ANY_HANC: u16 = 0xFFE;

/// Field identification (F) of the payload header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Progressive scan, or field not specified.
    Progressive,
    Field1,
    Field2,
    /// 0b01, not a valid value.
    Invalid,
}

impl From<u8> for FieldKind {
    fn from(value: u8) -> Self {
        match value & 0b11 {
            0b00 => Self::Progressive,
            0b10 => Self::Field1,
            0b11 => Self::Field2,
            _ => Self::Invalid,
        }
    }
}

impl From<FieldKind> for u8 {
    fn from(value: FieldKind) -> Self {
        match value {
            FieldKind::Progressive => 0b00,
            FieldKind::Invalid => 0b01,
            FieldKind::Field1 => 0b10,
            FieldKind::Field2 => 0b11,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncPayloadHeader {
    pub extended_sequence_number: u16,
    /// Octets of ANC data following this header.
    pub length: u16,
    pub anc_count: u8,
    pub field: FieldKind,
}

impl AncPayloadHeader {
    fn read(state: &mut ParserState, reader: &mut BitReader) -> Result<Self> {
        let header = Self {
            extended_sequence_number: reader.get_n(16)?,
            length: reader.get_n(16)?,
            anc_count: reader.get_n(8)?,
            field: reader.get_n::<u8>(2)?.into(),
        };

        reader.skip_n(22)?;

        if header.field == FieldKind::Invalid {
            log_or_err!(state, Warn, AncError::InvalidFieldKind);
        }

        let actual = (reader.available() >> 3) as usize;
        if header.length as usize != actual {
            log_or_err!(
                state,
                Warn,
                AncError::LengthMismatch {
                    declared: header.length as usize,
                    actual,
                }
            );
        }

        trace!(
            "ANC payload header: esn = {}, length = {}, anc_count = {}, field = {:?}",
            header.extended_sequence_number, header.length, header.anc_count, header.field
        );

        Ok(header)
    }

    fn write(&self, packer: &mut BitPacker) -> io::Result<()> {
        packer.put_n(16, self.extended_sequence_number as u32)?;
        packer.put_n(16, self.length as u32)?;
        packer.put_n(8, self.anc_count as u32)?;
        packer.put_n(2, u8::from(self.field) as u32)?;
        packer.put_n(22, 0)
    }
}

/// One ancillary data packet with its 10-bit words kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncPacket {
    /// Carried in the color-difference (C) channel rather than luma (Y).
    pub c_not_y: bool,
    pub line_number: u16,
    pub horizontal_offset: u16,
    /// StreamNum is meaningful only when this flag is set.
    pub stream_flag: bool,
    pub stream_num: u8,
    pub did: u16,
    pub sdid: u16,
    pub data_count: u16,
    pub user_data: Vec<u16>,
    pub checksum: u16,
}

impl AncPacket {
    /// Builds a well-formed packet from 8-bit identifiers and user data.
    ///
    /// Parity bits and the checksum word are computed here. Fails with
    /// [`AncError::TooMuchUserData`] when `data` is longer than 255 bytes.
    pub fn new(
        line_number: u16,
        horizontal_offset: u16,
        did: u8,
        sdid: u8,
        data: &[u8],
    ) -> Result<Self> {
        ensure!(data.len() <= 255, AncError::TooMuchUserData(data.len()));

        let mut packet = Self {
            c_not_y: false,
            line_number: line_number & 0x7FF,
            horizontal_offset: horizontal_offset & 0xFFF,
            stream_flag: false,
            stream_num: 0,
            did: with_parity(did),
            sdid: with_parity(sdid),
            data_count: with_parity(data.len() as u8),
            user_data: data.iter().map(|&b| with_parity(b)).collect(),
            checksum: 0,
        };
        packet.checksum = packet.expected_checksum();

        Ok(packet)
    }

    fn read(state: &mut ParserState, reader: &mut BitReader, index: usize) -> Result<Self> {
        let c_not_y = reader.get()?;
        let line_number = reader.get_n(11)?;
        let horizontal_offset = reader.get_n(12)?;
        let stream_flag = reader.get()?;
        let stream_num = reader.get_n(7)?;

        let did = reader.get_n(WORD_BITS)?;
        let sdid = reader.get_n(WORD_BITS)?;
        let data_count = reader.get_n(WORD_BITS)?;

        for (word, value) in [("DID", did), ("SDID", sdid), ("Data_Count", data_count)] {
            if !parity_ok(value) {
                log_or_err!(state, Warn, AncError::ParityMismatch { word, value });
            }
        }

        let count = (data_count & 0xFF) as usize;
        let user_data = (0..count)
            .map(|_| reader.get_n::<u16>(WORD_BITS))
            .collect::<Result<Vec<_>, _>>()?;

        let checksum = reader.get_n(WORD_BITS)?;

        let packet = Self {
            c_not_y,
            line_number,
            horizontal_offset,
            stream_flag,
            stream_num,
            did,
            sdid,
            data_count,
            user_data,
            checksum,
        };

        let calculated = packet.expected_checksum();
        if calculated != checksum {
            log_or_err!(
                state,
                Warn,
                AncError::ChecksumMismatch {
                    index,
                    calculated,
                    read: checksum,
                }
            );
        }

        let start = reader.position();
        let padding = reader.cursor().align_to(32).position_in_bits() - start;
        if padding > 0 && reader.get_n::<u32>(padding as u32)? != 0 {
            log_or_err!(state, Warn, AncError::AlignmentNotZero(index));
        }

        debug!(
            "ANC packet {index}: line {}, offset {}, DID {:#04X}, SDID {:#04X}, {} words, {}",
            packet.line_number,
            packet.horizontal_offset,
            packet.did & 0xFF,
            packet.sdid & 0xFF,
            count,
            packet.kind()
        );

        Ok(packet)
    }

    pub fn write(&self, packer: &mut BitPacker) -> io::Result<()> {
        packer.put(self.c_not_y)?;
        packer.put_n(11, self.line_number as u32)?;
        packer.put_n(12, self.horizontal_offset as u32)?;
        packer.put(self.stream_flag)?;
        packer.put_n(7, self.stream_num as u32)?;

        for word in [self.did, self.sdid, self.data_count]
            .iter()
            .chain(&self.user_data)
            .chain([&self.checksum])
        {
            packer.put_n(WORD_BITS, *word as u32)?;
        }

        packer.align(32)?;

        Ok(())
    }

    /// Checksum word computed over DID, SDID, Data_Count and user data.
    pub fn expected_checksum(&self) -> u16 {
        let mut words = Vec::with_capacity(3 + self.user_data.len());
        words.extend([self.did, self.sdid, self.data_count]);
        words.extend(&self.user_data);

        checksum_word(&words)
    }

    #[inline(always)]
    pub fn did_value(&self) -> u8 {
        self.did as u8
    }

    #[inline(always)]
    pub fn sdid_value(&self) -> u8 {
        self.sdid as u8
    }

    pub fn kind(&self) -> AncKind {
        AncKind::from_ids(self.did_value(), self.sdid_value())
    }

    pub fn parity_ok(&self) -> bool {
        parity_ok(self.did) && parity_ok(self.sdid) && parity_ok(self.data_count)
    }

    pub fn checksum_ok(&self) -> bool {
        self.expected_checksum() == self.checksum
    }

    /// User data words with b8/b9 stripped.
    pub fn user_data_bytes(&self) -> Vec<u8> {
        self.user_data.iter().map(|&word| word as u8).collect()
    }

    /// Size of the packet on the wire, word alignment included.
    pub fn wire_bits(&self) -> u64 {
        let bits = 32 + (4 + self.user_data.len() as u64) * WORD_BITS as u64;
        bits.div_ceil(32) * 32
    }
}

/// A decoded RFC 8331 payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncPayload {
    pub header: AncPayloadHeader,
    pub packets: Vec<AncPacket>,
}

impl AncPayload {
    /// Payload with `length` and `anc_count` derived from `packets`.
    ///
    /// Fails when the packets do not fit the 8-bit count or the 16-bit length.
    pub fn new(
        extended_sequence_number: u16,
        field: FieldKind,
        packets: Vec<AncPacket>,
    ) -> Result<Self> {
        let anc_count = u8::try_from(packets.len())
            .map_err(|_| AncError::TooManyPackets(packets.len()))?;

        let length = packets.iter().map(AncPacket::wire_bits).sum::<u64>() / 8;
        let length = u16::try_from(length).map_err(|_| AncError::PayloadTooLong(length))?;

        Ok(Self {
            header: AncPayloadHeader {
                extended_sequence_number,
                length,
                anc_count,
                field,
            },
            packets,
        })
    }

    pub fn read(state: &mut ParserState, reader: &mut BitReader) -> Result<Self> {
        let header = AncPayloadHeader::read(state, reader)?;

        let packets = (0..header.anc_count as usize)
            .map(|index| AncPacket::read(state, reader, index))
            .collect::<Result<Vec<_>>>()?;

        if reader.available() >= 32 {
            trace!(
                "{} trailing bits after {} ANC packets",
                reader.available(),
                header.anc_count
            );
        }

        Ok(Self { header, packets })
    }

    /// Packs the payload into wire format, header fields written as stored.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut packer = BitPacker::default();

        self.header.write(&mut packer)?;
        for packet in &self.packets {
            packet.write(&mut packer)?;
        }

        packer.into_bytes()
    }
}
