#![doc = include_str!("../README.md")]
//!
//! ## Technical Overview
//!
//! Decoder for SMPTE ST 2110-40 ancillary data carried over RTP, using the
//! RFC 8331 payload format.
//!
//! ### Payload Organization
//!
//! **Payload header**: Extended sequence number, length, packet count and
//! field identification.
//! **ANC packets**: Location fields followed by 10-bit ST 291 words (DID,
//! SDID, Data_Count, user data, checksum), each packet padded to 32 bits.
//!
//! ### Bit Extraction
//!
//! Words are packed back to back, most significant bit first. Every field is
//! read through [`utils::bit_cursor::extract_bits`], which checks bounds on
//! each read and returns the advanced cursor instead of mutating shared
//! state.
//!
//! ## Quick Start
//!
//! ```rust
//! use st2110::process::parse::Parser;
//! use st2110::structs::anc::{AncPacket, AncPayload, FieldKind, OFFSET_UNSPECIFIED};
//!
//! // Build a datagram: RTP header followed by one CEA-608 packet
//! let mut datagram = vec![0x80, 0x64, 0x00, 0x01, 0, 0, 0, 0, 0, 0, 0, 1];
//! let packet = AncPacket::new(21, OFFSET_UNSPECIFIED, 0x61, 0x02, &[0x94, 0x2C, 0x80])?;
//! datagram.extend(AncPayload::new(0, FieldKind::Field1, vec![packet])?.to_bytes()?);
//!
//! let mut parser = Parser::default();
//! let decoded = parser.parse(&datagram)?;
//!
//! for packet in &decoded.payload.packets {
//!     println!("line {}: {} ({} words)", packet.line_number, packet.kind(), packet.user_data.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Datagram parsing.
///
/// 1. **RTP** ([`structs::rtp`]): Fixed header, CSRCs, extension and padding.
/// 2. **Payload** ([`structs::anc`]): Payload header and ANC packets.
pub mod process;

/// Data structures representing ST 2110-40 wire components.
pub mod structs;

/// Session description output.
pub mod sdp;

/// Utility functions and supporting infrastructure.
///
/// - **Buffer view** ([`utils::buffer_view`]): Bounds-checked byte access
/// - **Bit cursor** ([`utils::bit_cursor`]): Bit-level field extraction
/// - **Bit packer** ([`utils::bit_writer`]): Inverse of the extractor
/// - **Parity** ([`utils::parity`]): ST 291 parity and checksum
/// - **Error Handling** ([`utils::errors`]): Error types
pub mod utils;
