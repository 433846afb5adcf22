//! Wire structures of ST 2110-40 streams.
//!
//! - [`rtp`]: RTP fixed header
//! - [`anc`]: RFC 8331 payload header and ANC packets
//! - [`kind`]: registered DID/SDID labels

pub mod anc;
pub mod kind;
pub mod rtp;
