//! Session description (SDP) output for decoded streams.
//!
//! The writer follows a fixed template: session lines once, then an
//! `m=`/`c=` pair and two clock lines for every media stream, in the order
//! they were added. Clock parameters are not known from the capture and are
//! written with placeholder values.

use std::fmt::{Display, Formatter};
use std::io;
use std::net::SocketAddrV4;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::utils::errors::SdpError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
    Ancillary,
    Unknown(String),
}

impl FromStr for MediaKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "video" => Self::Video,
            "audio" => Self::Audio,
            "ancillary" | "anc" => Self::Ancillary,
            _ => Self::Unknown(s.to_string()),
        })
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Video => f.write_str("video"),
            Self::Audio => f.write_str("audio"),
            Self::Ancillary => f.write_str("ancillary"),
            Self::Unknown(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDescriptor {
    pub kind: MediaKind,
    pub destination: SocketAddrV4,
    pub payload_type: u8,
}

#[derive(Debug, Clone, Default)]
pub struct SdpSettings {
    pub session_name: String,
    pub session_info: String,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SdpWriter {
    path: PathBuf,
    lines: Vec<String>,
}

impl SdpWriter {
    pub fn new(settings: &SdpSettings) -> Self {
        let lines = vec![
            "v=0".to_string(),
            "o=- 1 1 IN IP4 0.0.0.0".to_string(),
            format!("s={}", settings.session_name),
            format!(
                "i={}, generated by {} (some params like media clock are hardcoded).",
                settings.session_info,
                env!("CARGO_PKG_NAME")
            ),
            "t=0 0".to_string(),
            "a=recvonly".to_string(),
        ];

        Self {
            path: settings.output_path.clone(),
            lines,
        }
    }

    /// Appends the media, connection and clock lines for one stream.
    pub fn add_media(&mut self, media: &MediaDescriptor) -> Result<&mut Self, SdpError> {
        if let MediaKind::Unknown(name) = &media.kind {
            return Err(SdpError::UnsupportedMediaKind(name.clone()));
        }

        // m=<media> <port> RTP/AVP <payload type>
        self.lines.push(format!(
            "m={} {} RTP/AVP {}",
            media.kind,
            media.destination.port(),
            media.payload_type
        ));
        // c=IN IP4 <address>/<ttl>
        self.lines
            .push(format!("c=IN IP4 {}/32", media.destination.ip()));

        self.lines.push("a=mediaclk:direct=0".to_string());
        self.lines
            .push("a=ts-refclk:ptp=IEEE1588-2008:00-00-00-00-00-00-00-00:00".to_string());

        Ok(self)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn output_path(&self) -> &Path {
        &self.path
    }

    pub fn write_to<W: io::Write>(&self, mut out: W) -> io::Result<()> {
        for line in &self.lines {
            writeln!(out, "{line}")?;
        }

        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn settings() -> SdpSettings {
        SdpSettings {
            session_name: "Studio A".to_string(),
            session_info: "Captions".to_string(),
            output_path: PathBuf::from("out/studio_a.sdp"),
        }
    }

    fn media(kind: &str, port: u16, payload_type: u8) -> MediaDescriptor {
        MediaDescriptor {
            kind: kind.parse().unwrap(),
            destination: SocketAddrV4::new(Ipv4Addr::new(239, 10, 0, 1), port),
            payload_type,
        }
    }

    #[test]
    fn header_only() {
        let writer = SdpWriter::new(&settings());

        assert_eq!(
            writer.lines(),
            [
                "v=0",
                "o=- 1 1 IN IP4 0.0.0.0",
                "s=Studio A",
                "i=Captions, generated by st2110 (some params like media clock are hardcoded).",
                "t=0 0",
                "a=recvonly",
            ]
        );
        assert_eq!(writer.output_path(), Path::new("out/studio_a.sdp"));
    }

    #[test]
    fn media_in_insertion_order() -> Result<(), SdpError> {
        let mut writer = SdpWriter::new(&settings());
        writer
            .add_media(&media("ancillary", 50020, 100))?
            .add_media(&media("Video", 50000, 96))?;

        assert_eq!(writer.lines().len(), 6 + 2 * 4);
        assert_eq!(
            &writer.lines()[6..],
            [
                "m=ancillary 50020 RTP/AVP 100",
                "c=IN IP4 239.10.0.1/32",
                "a=mediaclk:direct=0",
                "a=ts-refclk:ptp=IEEE1588-2008:00-00-00-00-00-00-00-00:00",
                "m=video 50000 RTP/AVP 96",
                "c=IN IP4 239.10.0.1/32",
                "a=mediaclk:direct=0",
                "a=ts-refclk:ptp=IEEE1588-2008:00-00-00-00-00-00-00-00:00",
            ]
        );

        Ok(())
    }

    #[test]
    fn rejects_unsupported_kind() {
        let mut writer = SdpWriter::new(&settings());

        let err = writer.add_media(&media("ttml", 50040, 98)).unwrap_err();
        assert_eq!(err, SdpError::UnsupportedMediaKind("ttml".to_string()));
        assert_eq!(writer.lines().len(), 6);
    }

    #[test]
    fn writes_one_line_each() -> Result<(), Box<dyn std::error::Error>> {
        let mut writer = SdpWriter::new(&settings());
        writer.add_media(&media("audio", 50010, 97))?;

        let mut out = Vec::new();
        writer.write_to(&mut out)?;

        let text = String::from_utf8(out)?;
        assert_eq!(text.lines().count(), 10);
        assert!(text.ends_with("00-00-00-00-00-00-00-00:00\n"));
        assert!(text.contains("\nm=audio 50010 RTP/AVP 97\n"));

        Ok(())
    }
}
