use std::io::Write;

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};

use crate::errors::{CaptureError, CaptureResult};
use crate::packet::Packet;
use crate::Endianness;

use super::PcapHeader;

/// Wraps a writer and uses it to emit a classic pcap stream.
///
/// The global header is written at construction; each
/// [`PcapWriter::write_packet`] call appends one record in call order.
#[derive(Debug)]
pub struct PcapWriter<W: Write> {
    header: PcapHeader,
    writer: W,
}

impl<W: Write> PcapWriter<W> {
    /// Creates a new `PcapWriter` with a default global header in the native
    /// endianness.
    pub fn new(writer: W) -> CaptureResult<PcapWriter<W>> {
        let header = PcapHeader { endianness: Endianness::native(), ..Default::default() };

        PcapWriter::with_header(writer, header)
    }

    /// Creates a new `PcapWriter` with the given global header, and writes the
    /// header to the output.
    pub fn with_header(mut writer: W, header: PcapHeader) -> CaptureResult<PcapWriter<W>> {
        if header.modified {
            // The modified variant is read-only, nothing emits it anymore
            return Err(CaptureError::UnsupportedWrite("modified pcap is not a supported output format"));
        }

        header.write_to(&mut writer)?;

        Ok(PcapWriter { header, writer })
    }

    /// Returns the global header written at construction.
    pub fn header(&self) -> &PcapHeader {
        &self.header
    }

    /// Writes one packet record.
    pub fn write_packet(&mut self, packet: &Packet) -> CaptureResult<()> {
        if packet.data.len() != packet.capture_length as usize {
            return Err(CaptureError::InvalidField("Packet: data length != capture_length"));
        }
        if packet.capture_length > packet.original_length {
            return Err(CaptureError::InvalidField("Packet: capture_length > original_length"));
        }
        if packet.capture_length > self.header.snaplen {
            return Err(CaptureError::InvalidField("Packet: capture_length > snaplen"));
        }
        if packet.data_link_type != self.header.datalink {
            return Err(CaptureError::UnsupportedWrite("a pcap stream holds a single data link type"));
        }

        return match self.header.endianness {
            Endianness::Big => write_record::<BigEndian, _>(&mut self.writer, packet),
            Endianness::Little => write_record::<LittleEndian, _>(&mut self.writer, packet),
        };

        fn write_record<B: ByteOrder, W: Write>(writer: &mut W, packet: &Packet) -> CaptureResult<()> {
            writer.write_u32::<B>(packet.timestamp_seconds)?;
            writer.write_u32::<B>(packet.timestamp_fraction)?;
            writer.write_u32::<B>(packet.capture_length)?;
            writer.write_u32::<B>(packet.original_length)?;
            writer.write_all(&packet.data)?;
            Ok(())
        }
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> CaptureResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Consumes the `PcapWriter`, returning the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
