/// Datagram parsing into decoded ancillary data.
///
/// Provides the [`Parser`](parse::Parser) for turning raw RTP datagrams into
/// [`AncRtpPacket`](parse::AncRtpPacket) objects.
pub mod parse;
