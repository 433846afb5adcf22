use std::net::SocketAddrV4;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};
use st2110::sdp::{MediaDescriptor, MediaKind};

static LONG_VERSION: LazyLock<String> = LazyLock::new(|| {
    format!(
        "{} ({}, built {}, st2110 {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("VERGEN_GIT_DESCRIBE").unwrap_or("unknown revision"),
        option_env!("BUILD_TIMESTAMP").unwrap_or("unknown date"),
        option_env!("ST2110_VERSION").unwrap_or("unknown"),
    )
});

#[derive(Debug, ClapParser)]
#[command(
    name         = env!("CARGO_PKG_NAME"),
    version      = env!("CARGO_PKG_VERSION"),
    long_version = LONG_VERSION.as_str(),
    author       = env!("CARGO_PKG_AUTHORS"),
    about        = "Tools for inspecting and decoding SMPTE ST 2110-40 ancillary data streams",
    long_about   = None,
)]
pub struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Treat warnings as fatal errors (fail on first warning).
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Show progress bars during operations.
    #[arg(long, global = true)]
    pub progress: bool,

    /// Choose an operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decode RTP datagrams into ancillary packets and words.
    Decode(DecodeArgs),

    /// Print RTP and payload header information
    Info(InfoArgs),

    /// Write an SDP file advertising the given streams.
    Sdp(SdpArgs),
}

#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// Files holding one raw RTP datagram each (use "-" for stdin).
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output format for decoded packets.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Files holding one raw RTP datagram each (use "-" for stdin).
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SdpArgs {
    /// Output path of the SDP file.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Session name (s= line).
    #[arg(long, default_value = "ST 2110-40 session")]
    pub session_name: String,

    /// Session information (i= line).
    #[arg(long, default_value = "Ancillary data")]
    pub session_info: String,

    /// Media stream as KIND:ADDRESS:PORT:PAYLOAD_TYPE, e.g. ancillary:239.0.0.1:50020:100.
    #[arg(long = "media", value_name = "MEDIA", required = true)]
    pub media: Vec<MediaArg>,
}

#[derive(Debug, Clone)]
pub struct MediaArg(pub MediaDescriptor);

impl FromStr for MediaArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(2, ':');
        let kind = parts.next().unwrap_or_default();
        let rest = parts
            .next()
            .ok_or_else(|| format!("expected KIND:ADDRESS:PORT:PAYLOAD_TYPE, got {s:?}"))?;

        let (address, payload_type) = rest
            .rsplit_once(':')
            .ok_or_else(|| format!("missing payload type in {s:?}"))?;

        let destination = address
            .parse::<SocketAddrV4>()
            .map_err(|e| format!("invalid destination {address:?}: {e}"))?;
        let payload_type = payload_type
            .parse::<u8>()
            .ok()
            .filter(|pt| *pt < 128)
            .ok_or_else(|| format!("payload type must be 0-127, got {payload_type:?}"))?;

        let kind = match kind.parse::<MediaKind>() {
            Ok(kind) => kind,
            Err(never) => match never {},
        };

        Ok(Self(MediaDescriptor {
            kind,
            destination,
            payload_type,
        }))
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Disable logging output.
    Off,
    /// No output except errors.
    Error,
    /// Show warnings and errors.
    Warn,
    /// Show info, warnings and errors (default).
    Info,
    /// Show debug, info, warnings and errors.
    Debug,
    /// Show all log messages including trace.
    Trace,
}

impl LogLevel {
    /// Convert LogLevel to log::LevelFilter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Colorized human-readable text.
    Plain,
    /// Structured JSON per log record.
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum OutputFormat {
    /// Human-readable listing.
    Text,
    /// YAML document per datagram.
    Yaml,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn media_argument() {
        let MediaArg(media) = "ancillary:239.1.2.3:50020:100".parse().unwrap();

        assert_eq!(media.kind, MediaKind::Ancillary);
        assert_eq!(
            media.destination,
            SocketAddrV4::new(Ipv4Addr::new(239, 1, 2, 3), 50020)
        );
        assert_eq!(media.payload_type, 100);

        let MediaArg(media) = "ttml:10.0.0.1:5000:98".parse().unwrap();
        assert_eq!(media.kind, MediaKind::Unknown("ttml".to_string()));

        assert!("video:239.1.2.3:50000".parse::<MediaArg>().is_err());
        assert!("video:239.1.2.3:50000:200".parse::<MediaArg>().is_err());
        assert!("video".parse::<MediaArg>().is_err());
    }

    #[test]
    fn cli_parses() {
        let cli = Cli::try_parse_from([
            "st2110d",
            "--strict",
            "sdp",
            "out.sdp",
            "--media",
            "video:239.0.0.1:50000:96",
            "--media",
            "ancillary:239.0.0.2:50020:100",
        ])
        .unwrap();

        assert!(cli.strict);
        let Commands::Sdp(args) = cli.command else {
            panic!("expected sdp command");
        };
        assert_eq!(args.media.len(), 2);
        assert_eq!(args.output, PathBuf::from("out.sdp"));
    }
}
