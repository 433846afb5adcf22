//! Utility functions and supporting infrastructure.
//!
//! Provides the buffer view, the bit cursor and extractor, the matching bit
//! packer, ST 291 parity/checksum helpers and error types.

pub mod bit_cursor;
pub mod bit_writer;
pub mod buffer_view;
pub mod errors;
pub mod parity;
