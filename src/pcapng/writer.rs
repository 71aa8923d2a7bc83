use std::io::Write;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::errors::{CaptureError, CaptureResult};
use crate::packet::{Packet, TraceInterface};
use crate::Endianness;

use super::blocks::block_common::write_block;
use super::blocks::{InterfaceDescriptionBlock, SectionHeaderBlock, ENHANCED_PACKET_BLOCK};

/// Wraps a writer and uses it to emit a PcapNg stream.
///
/// The section header is written at construction. Interfaces can be declared
/// up front with [`PcapNgWriter::write_interface`]; a packet whose interface
/// index equals the number of declared interfaces declares the next one
/// implicitly, carrying the packet's own link type and an unlimited snaplen.
#[derive(Debug)]
pub struct PcapNgWriter<W: Write> {
    section: SectionHeaderBlock,
    interfaces: Vec<TraceInterface>,
    writer: W,
}

impl<W: Write> PcapNgWriter<W> {
    /// Creates a new `PcapNgWriter` with a default section header in the
    /// native endianness.
    pub fn new(writer: W) -> CaptureResult<PcapNgWriter<W>> {
        let section = SectionHeaderBlock { endianness: Endianness::native(), ..Default::default() };

        PcapNgWriter::with_section_header(writer, section)
    }

    /// Creates a new `PcapNgWriter` with a default section header in the given
    /// endianness.
    pub fn with_endianness(writer: W, endianness: Endianness) -> CaptureResult<PcapNgWriter<W>> {
        let section = SectionHeaderBlock { endianness, ..Default::default() };

        PcapNgWriter::with_section_header(writer, section)
    }

    /// Creates a new `PcapNgWriter` with the given section header, and writes
    /// it to the output.
    pub fn with_section_header(mut writer: W, section: SectionHeaderBlock) -> CaptureResult<PcapNgWriter<W>> {
        section.write_to(&mut writer)?;

        Ok(PcapNgWriter { section, interfaces: Vec::new(), writer })
    }

    /// Returns the section header written at construction.
    pub fn section(&self) -> &SectionHeaderBlock {
        &self.section
    }

    /// Returns the interfaces declared so far.
    pub fn interfaces(&self) -> &[TraceInterface] {
        &self.interfaces
    }

    /// Declares one interface, writing its description block, and returns its
    /// index.
    pub fn write_interface(&mut self, interface: &TraceInterface) -> CaptureResult<usize> {
        let block = InterfaceDescriptionBlock::from(interface);
        block.write_to(self.section.endianness, &mut self.writer)?;

        self.interfaces.push(interface.clone());
        Ok(self.interfaces.len() - 1)
    }

    /// Writes one packet as an enhanced packet block.
    ///
    /// A negative interface index maps to interface 0. An index equal to the
    /// number of declared interfaces declares a new one from the packet; a
    /// larger index is rejected so interface numbering stays gapless.
    pub fn write_packet(&mut self, packet: &Packet) -> CaptureResult<()> {
        if packet.data.len() != packet.capture_length as usize {
            return Err(CaptureError::InvalidField("Packet: data length != capture_length"));
        }
        if packet.capture_length > packet.original_length {
            return Err(CaptureError::InvalidField("Packet: capture_length > original_length"));
        }

        let index = packet.interface_index.max(0) as usize;
        if index > self.interfaces.len() {
            return Err(CaptureError::UnsupportedWrite("packet references an undeclared interface"));
        }
        if index == self.interfaces.len() {
            let interface = TraceInterface { link_type: packet.data_link_type, ..Default::default() };
            self.write_interface(&interface)?;
        }

        let interface = &self.interfaces[index];
        if interface.snaplen != 0 && packet.capture_length > interface.snaplen {
            return Err(CaptureError::InvalidField("Packet: capture_length > interface snaplen"));
        }

        let timestamp = packet.timestamp_seconds as u64 * interface.timestamp_resolution
            + packet.timestamp_fraction as u64;

        return match self.section.endianness {
            Endianness::Big => write_epb::<BigEndian, _>(&mut self.writer, index as u32, timestamp, packet),
            Endianness::Little => write_epb::<LittleEndian, _>(&mut self.writer, index as u32, timestamp, packet),
        };

        fn write_epb<B: ByteOrder, W: Write>(
            writer: &mut W,
            interface_id: u32,
            timestamp: u64,
            packet: &Packet,
        ) -> CaptureResult<()> {
            let mut body = Vec::with_capacity(20 + packet.data.len());
            let mut buf = [0_u8; 4];

            B::write_u32(&mut buf, interface_id);
            body.extend_from_slice(&buf);
            B::write_u32(&mut buf, (timestamp >> 32) as u32);
            body.extend_from_slice(&buf);
            B::write_u32(&mut buf, timestamp as u32);
            body.extend_from_slice(&buf);
            B::write_u32(&mut buf, packet.capture_length);
            body.extend_from_slice(&buf);
            B::write_u32(&mut buf, packet.original_length);
            body.extend_from_slice(&buf);
            body.extend_from_slice(&packet.data);

            write_block::<B, _>(writer, ENHANCED_PACKET_BLOCK, &body)?;
            Ok(())
        }
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> CaptureResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Consumes the `PcapNgWriter`, returning the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
