use std::io::Read;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::errors::{CaptureError, CaptureResult};
use crate::packet::Packet;
use crate::source::{read_exact_or, read_or_eof};
use crate::Endianness;

use super::{PcapHeader, MAXIMUM_SNAPLEN};

/// Size of a classic per-record header.
const RECORD_HEADER_LEN: usize = 16;

/// The modified variant appends ifindex (u32), protocol (u16), pkt_type (u8)
/// and one pad byte to the classic record header. Field widths are fixed to
/// the behavior observed in captures in the wild, the variant was never
/// formally documented.
const MODIFIED_RECORD_HEADER_LEN: usize = 24;

/// Parses the records of a classic or modified pcap stream.
///
/// Construction consumes the global header; each [`PcapParser::next_packet`]
/// call consumes exactly one record. End of input at a record boundary is
/// normal termination and yields `None`; a record cut short mid-header or
/// mid-payload is reported as [`CaptureError::TruncatedRecord`].
#[derive(Debug)]
pub struct PcapParser {
    header: PcapHeader,
}

impl PcapParser {
    /// Creates a new `PcapParser`, reading the global header fields that
    /// follow the already-sniffed magic number.
    pub fn new<R: Read>(magic_number: u32, reader: &mut R) -> CaptureResult<PcapParser> {
        let header = PcapHeader::from_reader(magic_number, reader)?;
        Ok(PcapParser { header })
    }

    /// Returns the global header of the pcap.
    pub fn header(&self) -> &PcapHeader {
        &self.header
    }

    /// Returns the next packet, or `None` once the stream is exhausted.
    pub fn next_packet<R: Read>(&self, reader: &mut R) -> CaptureResult<Option<Packet>> {
        let header_len = if self.header.modified { MODIFIED_RECORD_HEADER_LEN } else { RECORD_HEADER_LEN };

        let mut buf = [0_u8; MODIFIED_RECORD_HEADER_LEN];
        let filled = read_or_eof(reader, &mut buf[..header_len])?;
        if filled == 0 {
            return Ok(None);
        }
        if filled < header_len {
            return Err(CaptureError::TruncatedRecord("record header cut short"));
        }

        let (ts_sec, ts_frac, incl_len, orig_len) = match self.header.endianness {
            Endianness::Big => parse_record_header::<BigEndian>(&buf[..header_len]),
            Endianness::Little => parse_record_header::<LittleEndian>(&buf[..header_len]),
        };

        if incl_len > MAXIMUM_SNAPLEN {
            return Err(CaptureError::InvalidField("PacketRecord: incl_len > MAXIMUM_SNAPLEN"));
        }
        if incl_len > orig_len {
            return Err(CaptureError::InvalidField("PacketRecord: incl_len > orig_len"));
        }

        let mut data = vec![0_u8; incl_len as usize];
        read_exact_or(reader, &mut data, CaptureError::TruncatedRecord("record payload cut short"))?;

        Ok(Some(Packet {
            timestamp_seconds: ts_sec,
            timestamp_fraction: ts_frac,
            capture_length: incl_len,
            original_length: orig_len,
            data_link_type: self.header.datalink,
            // No interface table exists in this format
            interface_index: -1,
            data,
        }))
    }
}

fn parse_record_header<B: ByteOrder>(buf: &[u8]) -> (u32, u32, u32, u32) {
    // The modified variant's extra fields (ifindex, protocol, pkt_type) trail
    // the classic four and are not surfaced in the packet model.
    let ts_sec = B::read_u32(&buf[0..4]);
    let ts_frac = B::read_u32(&buf[4..8]);
    let incl_len = B::read_u32(&buf[8..12]);
    let orig_len = B::read_u32(&buf[12..16]);

    (ts_sec, ts_frac, incl_len, orig_len)
}
