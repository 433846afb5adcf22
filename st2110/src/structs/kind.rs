//! Registered ancillary packet kinds.
//!
//! Labels a packet by its DID/SDID pair (8-bit values, parity stripped) using
//! a subset of the SMPTE ST 291 registry. User data words are not
//! interpreted.

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AncKind {
    PayloadIdentification,
    AfdBarData,
    PanScan,
    Scte104,
    VbiDvbScte,
    InterStationControl,
    Op47SubtitlingDistribution,
    Op47Multipacket,
    AudioMetadata(u8),
    FilmCodes,
    AncillaryTimeCode,
    Cea708,
    Cea608,
    ProgramDescription,
    DataBroadcast,
    VbiData,
    /// DID 0x80-0xFF packets carry a data block number in place of an SDID.
    Type1(u8),
    Unknown { did: u8, sdid: u8 },
}

impl AncKind {
    pub fn from_ids(did: u8, sdid: u8) -> Self {
        match (did, sdid) {
            (0x41, 0x01) => Self::PayloadIdentification,
            (0x41, 0x05) => Self::AfdBarData,
            (0x41, 0x06) => Self::PanScan,
            (0x41, 0x07) => Self::Scte104,
            (0x41, 0x08) => Self::VbiDvbScte,
            (0x43, 0x01) => Self::InterStationControl,
            (0x43, 0x02) => Self::Op47SubtitlingDistribution,
            (0x43, 0x03) => Self::Op47Multipacket,
            (0x45, 0x01..=0x09) => Self::AudioMetadata(sdid),
            (0x51, 0x01) => Self::FilmCodes,
            (0x60, 0x60) => Self::AncillaryTimeCode,
            (0x61, 0x01) => Self::Cea708,
            (0x61, 0x02) => Self::Cea608,
            (0x62, 0x01) => Self::ProgramDescription,
            (0x62, 0x02) => Self::DataBroadcast,
            (0x62, 0x03) => Self::VbiData,
            (0x80..=0xFF, _) => Self::Type1(did),
            _ => Self::Unknown { did, sdid },
        }
    }
}

impl Display for AncKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PayloadIdentification => write!(f, "Payload identification (ST 352)"),
            Self::AfdBarData => write!(f, "AFD and bar data (ST 2016-3)"),
            Self::PanScan => write!(f, "Pan-scan data (ST 2016-4)"),
            Self::Scte104 => write!(f, "SCTE 104 messages"),
            Self::VbiDvbScte => write!(f, "DVB/SCTE VBI data (ST 2031)"),
            Self::InterStationControl => write!(f, "Inter-station control data (BT.1685)"),
            Self::Op47SubtitlingDistribution => write!(f, "OP-47 subtitling distribution packet"),
            Self::Op47Multipacket => write!(f, "OP-47 multipacket"),
            Self::AudioMetadata(channel) => write!(f, "Audio metadata, channel pair {channel} (ST 2020)"),
            Self::FilmCodes => write!(f, "Film codes (RP 215)"),
            Self::AncillaryTimeCode => write!(f, "Ancillary time code (ST 12-2)"),
            Self::Cea708 => write!(f, "CEA-708 caption distribution packet (ST 334-1)"),
            Self::Cea608 => write!(f, "CEA-608 captions (ST 334-1)"),
            Self::ProgramDescription => write!(f, "Program description (RP 207)"),
            Self::DataBroadcast => write!(f, "Data broadcast (ST 334-1)"),
            Self::VbiData => write!(f, "VBI data (RP 208)"),
            Self::Type1(did) => write!(f, "Type 1 packet, DID {did:#04X}"),
            Self::Unknown { did, sdid } => write!(f, "Unknown (DID {did:#04X}, SDID {sdid:#04X})"),
        }
    }
}

#[test]
fn kind_labels() {
    assert_eq!(AncKind::from_ids(0x61, 0x01), AncKind::Cea708);
    assert_eq!(AncKind::from_ids(0x45, 0x03), AncKind::AudioMetadata(3));
    assert_eq!(AncKind::from_ids(0x45, 0x0A), AncKind::Unknown { did: 0x45, sdid: 0x0A });
    assert_eq!(AncKind::from_ids(0x84, 0x12), AncKind::Type1(0x84));

    assert_eq!(
        format!("{}", AncKind::from_ids(0x41, 0x05)),
        "AFD and bar data (ST 2016-3)"
    );
    assert_eq!(
        format!("{}", AncKind::from_ids(0x50, 0x02)),
        "Unknown (DID 0x50, SDID 0x02)"
    );
}
