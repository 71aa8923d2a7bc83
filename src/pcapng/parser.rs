use std::io::Read;

use tracing::{debug, trace};

use crate::errors::{CaptureError, CaptureResult};
use crate::packet::{Packet, TraceInterface};
use crate::source::read_or_eof;
use crate::magic;

use super::blocks::block_common::RawBlock;
use super::blocks::{
    EnhancedPacketBlock, InterfaceDescriptionBlock, SectionHeaderBlock, SimplePacketBlock,
    ENHANCED_PACKET_BLOCK, INTERFACE_DESCRIPTION_BLOCK, INTERFACE_STATISTICS_BLOCK,
    NAME_RESOLUTION_BLOCK, PACKET_BLOCK, SIMPLE_PACKET_BLOCK,
};

/// Parses the blocks of a PcapNg stream into packets and interfaces.
///
/// Construction consumes the first section header; each
/// [`PcapNgParser::next_packet`] call consumes blocks until a packet block
/// turns up or the stream ends. Interface description blocks are accumulated
/// as they are crossed, and a new section header resets the interface table.
#[derive(Debug)]
pub struct PcapNgParser {
    section: SectionHeaderBlock,
    interfaces: Vec<TraceInterface>,
}

impl PcapNgParser {
    /// Creates a new `PcapNgParser`, reading the first section header whose
    /// type code has already been sniffed off the stream.
    pub fn new<R: Read>(reader: &mut R) -> CaptureResult<PcapNgParser> {
        let raw = RawBlock::from_reader_after_type(magic::PCAPNG, crate::Endianness::Big, reader)?;
        let section = SectionHeaderBlock::from_body(&raw.body)?;

        debug!(
            endianness = ?section.endianness,
            version = format_args!("{}.{}", section.major_version, section.minor_version),
            "opened pcapng section"
        );

        Ok(PcapNgParser { section, interfaces: Vec::new() })
    }

    /// Returns the current section header.
    pub fn section(&self) -> &SectionHeaderBlock {
        &self.section
    }

    /// Returns the interfaces declared so far in the current section.
    pub fn interfaces(&self) -> &[TraceInterface] {
        &self.interfaces
    }

    /// Returns the next packet, or `None` once the stream is exhausted.
    ///
    /// Non-packet blocks (name resolution, statistics, unknown types) are
    /// skipped transparently.
    pub fn next_packet<R: Read>(&mut self, reader: &mut R) -> CaptureResult<Option<Packet>> {
        loop {
            let mut type_buf = [0_u8; 4];
            let filled = read_or_eof(reader, &mut type_buf)?;
            if filled == 0 {
                return Ok(None);
            }
            if filled < 4 {
                return Err(CaptureError::CorruptBlock("block type cut short"));
            }

            // The type field of a section header is palindromic, for any other
            // block it is read in the current section's endianness.
            let raw_type = u32::from_be_bytes(type_buf);
            let type_ = if raw_type == magic::PCAPNG || self.section.endianness.is_big() {
                raw_type
            }
            else {
                raw_type.swap_bytes()
            };

            let raw = RawBlock::from_reader_after_type(type_, self.section.endianness, reader)?;

            match type_ {
                magic::PCAPNG => {
                    self.section = SectionHeaderBlock::from_body(&raw.body)?;
                    self.interfaces.clear();
                    debug!(endianness = ?self.section.endianness, "new pcapng section, interface table reset");
                },
                INTERFACE_DESCRIPTION_BLOCK => {
                    let idb = InterfaceDescriptionBlock::from_body(raw.endianness, &raw.body)?;
                    trace!(index = self.interfaces.len(), linktype = ?idb.linktype, "interface declared");
                    self.interfaces.push(idb.into());
                },
                ENHANCED_PACKET_BLOCK => {
                    let epb = EnhancedPacketBlock::from_body(raw.endianness, &raw.body)?;
                    return Ok(Some(self.assemble_enhanced(epb)?));
                },
                SIMPLE_PACKET_BLOCK => {
                    let interface = self
                        .interfaces
                        .first()
                        .ok_or(CaptureError::CorruptBlock("simple packet without a declared interface"))?;
                    let spb = SimplePacketBlock::from_body(raw.endianness, &raw.body, interface.snaplen)?;

                    return Ok(Some(Packet {
                        timestamp_seconds: 0,
                        timestamp_fraction: 0,
                        capture_length: spb.data.len() as u32,
                        original_length: spb.original_len,
                        data_link_type: interface.link_type,
                        interface_index: 0,
                        data: spb.data,
                    }));
                },
                PACKET_BLOCK | NAME_RESOLUTION_BLOCK | INTERFACE_STATISTICS_BLOCK => {
                    trace!(type_ = format_args!("{type_:#010x}"), "skipping block");
                },
                _ => {
                    trace!(type_ = format_args!("{type_:#010x}"), "skipping unknown block");
                },
            }
        }
    }

    /// Resolves an enhanced packet block against the interface table and
    /// splits its timestamp into seconds and a sub-second fraction.
    fn assemble_enhanced(&self, epb: EnhancedPacketBlock) -> CaptureResult<Packet> {
        let interface = self
            .interfaces
            .get(epb.interface_id as usize)
            .ok_or(CaptureError::CorruptBlock("packet references an undeclared interface"))?;

        let ticks = interface.timestamp_resolution.max(1);
        let seconds = epb.timestamp / ticks;
        let fraction = epb.timestamp % ticks;
        if seconds > u32::MAX as u64 || fraction > u32::MAX as u64 {
            return Err(CaptureError::CorruptBlock("timestamp out of representable range"));
        }

        Ok(Packet {
            timestamp_seconds: seconds as u32,
            timestamp_fraction: fraction as u32,
            capture_length: epb.data.len() as u32,
            original_length: epb.original_len,
            data_link_type: interface.link_type,
            interface_index: epb.interface_id as i32,
            data: epb.data,
        })
    }
}
