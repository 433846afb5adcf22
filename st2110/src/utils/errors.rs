#[macro_export]
macro_rules! log_or_err {
    ($state:expr, $level:expr, $err:expr $(,)?) => {{
        if $level <= $state.fail_level {
            return Err($err.into());
        } else {
            match $level {
                ::log::Level::Error => ::log::error!("{}", $err),
                ::log::Level::Warn => ::log::warn!("{}", $err),
                ::log::Level::Info => ::log::info!("{}", $err),
                ::log::Level::Debug => ::log::debug!("{}", $err),
                ::log::Level::Trace => ::log::trace!("{}", $err),
            }
        }
    }};
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("Byte index {index} out of range for view of {len} bytes")]
    OutOfRange { index: usize, len: usize },

    #[error("Invalid slice range {start}..{end} for view of {len} bytes")]
    InvalidRange { start: usize, end: usize, len: usize },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BitError {
    #[error("Buffer underrun: requested {requested} bits at bit {position}, only {available} remain")]
    BufferUnderrun {
        requested: u64,
        available: u64,
        position: u64,
    },

    #[error("Field width must be between 1 and 32. Got {0}")]
    InvalidWidth(u32),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RtpError {
    #[error("Unsupported RTP version {0}, expected 2")]
    UnsupportedVersion(u8),

    #[error("RTP padding length {padding} exceeds payload length {payload}")]
    InvalidPadding { padding: usize, payload: usize },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AncError {
    #[error("Field identification value 0b01 is not allowed")]
    InvalidFieldKind,

    #[error("Payload length field is {declared} octets, but {actual} octets of ANC data follow")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("Parity bits of {word} are invalid. Read {value:#05X}")]
    ParityMismatch { word: &'static str, value: u16 },

    #[error("Checksum mismatch in ANC packet {index}. Calculated {calculated:#05X}, Read {read:#05X}")]
    ChecksumMismatch {
        index: usize,
        calculated: u16,
        read: u16,
    },

    #[error("word_align bits should be all zeros in ANC packet {0}")]
    AlignmentNotZero(usize),

    #[error("An ANC packet carries at most 255 user data words. Got {0}")]
    TooMuchUserData(usize),

    #[error("A payload carries at most 255 ANC packets. Got {0}")]
    TooManyPackets(usize),

    #[error("ANC data of {0} octets does not fit the 16-bit Length field")]
    PayloadTooLong(u64),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SdpError {
    #[error("Only ancillary, audio and video are supported in SDP serialization. Got {0:?}")]
    UnsupportedMediaKind(String),
}
