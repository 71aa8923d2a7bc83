//! Global header of a classic or modified pcap stream.

use std::io::{Read, Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::errors::{CaptureError, CaptureResult};
use crate::{magic, DataLink, Endianness, TsResolution};

use super::MAXIMUM_SNAPLEN;

/// Pcap global header.
///
/// The on-disk magic number is split into its three orthogonal pieces:
/// endianness, timestamp resolution and classic/modified variant.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PcapHeader {
    /// Major version number, currently 2.
    pub version_major: u16,

    /// Minor version number, currently 4.
    pub version_minor: u16,

    /// GMT to local timezone correction, should always be 0.
    pub ts_correction: i32,

    /// Timestamp accuracy, should always be 0.
    pub ts_accuracy: u32,

    /// Max length of captured packet.
    pub snaplen: u32,

    /// DataLink type (first layer in the packet).
    pub datalink: DataLink,

    /// Timestamp resolution of the stream.
    pub ts_resolution: TsResolution,

    /// Endianness of the stream.
    pub endianness: Endianness,

    /// True for the modified (Kuznetsov) variant with its 24-byte record header.
    pub modified: bool,
}

impl PcapHeader {
    /// Splits a pcap magic number into endianness, resolution and variant.
    ///
    /// Returns `None` for magic numbers that don't belong to any pcap variant.
    pub fn dissect_magic(magic_number: u32) -> Option<(Endianness, TsResolution, bool)> {
        match magic_number {
            magic::PCAP_MICROSECONDS => Some((Endianness::Big, TsResolution::MicroSecond, false)),
            magic::PCAP_NANOSECONDS => Some((Endianness::Big, TsResolution::NanoSecond, false)),
            magic::MODIFIED_PCAP => Some((Endianness::Big, TsResolution::MicroSecond, true)),
            m if m == magic::PCAP_MICROSECONDS.swap_bytes() => {
                Some((Endianness::Little, TsResolution::MicroSecond, false))
            },
            m if m == magic::PCAP_NANOSECONDS.swap_bytes() => {
                Some((Endianness::Little, TsResolution::NanoSecond, false))
            },
            m if m == magic::MODIFIED_PCAP.swap_bytes() => {
                Some((Endianness::Little, TsResolution::MicroSecond, true))
            },
            _ => None,
        }
    }

    /// Reads the 20 header bytes that follow the already-sniffed magic number.
    ///
    /// Returns an error if the magic number doesn't belong to a pcap variant
    /// or if the header is cut short.
    pub fn from_reader<R: Read>(magic_number: u32, reader: &mut R) -> CaptureResult<PcapHeader> {
        let (endianness, ts_resolution, modified) = PcapHeader::dissect_magic(magic_number)
            .ok_or(CaptureError::UnsupportedFormat(magic_number))?;

        let mut buf = [0_u8; 20];
        crate::source::read_exact_or(
            reader,
            &mut buf,
            CaptureError::TruncatedRecord("pcap global header cut short"),
        )?;

        return match endianness {
            Endianness::Big => init_pcap_header::<BigEndian>(&buf, endianness, ts_resolution, modified),
            Endianness::Little => init_pcap_header::<LittleEndian>(&buf, endianness, ts_resolution, modified),
        };

        fn init_pcap_header<B: ByteOrder>(
            mut buf: &[u8],
            endianness: Endianness,
            ts_resolution: TsResolution,
            modified: bool,
        ) -> CaptureResult<PcapHeader> {
            Ok(PcapHeader {
                version_major: buf.read_u16::<B>()?,
                version_minor: buf.read_u16::<B>()?,
                ts_correction: buf.read_i32::<B>()?,
                ts_accuracy: buf.read_u32::<B>()?,
                snaplen: buf.read_u32::<B>()?,
                datalink: DataLink::from(buf.read_u32::<B>()?),
                ts_resolution,
                endianness,
                modified,
            })
        }
    }

    /// Reassembles the magic number from the endianness, resolution and variant.
    pub fn magic_number(&self) -> u32 {
        let magic_number = if self.modified {
            magic::MODIFIED_PCAP
        }
        else {
            match self.ts_resolution {
                TsResolution::MicroSecond => magic::PCAP_MICROSECONDS,
                TsResolution::NanoSecond => magic::PCAP_NANOSECONDS,
            }
        };

        match self.endianness {
            Endianness::Big => magic_number,
            Endianness::Little => magic_number.swap_bytes(),
        }
    }

    /// Writes the 24-byte global header.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> CaptureResult<()> {
        // The magic number carries the endianness itself
        writer.write_u32::<BigEndian>(self.magic_number())?;

        return match self.endianness {
            Endianness::Big => write_fields::<BigEndian, _>(self, writer),
            Endianness::Little => write_fields::<LittleEndian, _>(self, writer),
        };

        fn write_fields<B: ByteOrder, W: Write>(header: &PcapHeader, writer: &mut W) -> CaptureResult<()> {
            writer.write_u16::<B>(header.version_major)?;
            writer.write_u16::<B>(header.version_minor)?;
            writer.write_i32::<B>(header.ts_correction)?;
            writer.write_u32::<B>(header.ts_accuracy)?;
            writer.write_u32::<B>(header.snaplen)?;
            writer.write_u32::<B>(header.datalink.into())?;
            Ok(())
        }
    }
}

impl Default for PcapHeader {
    fn default() -> Self {
        PcapHeader {
            version_major: 2,
            version_minor: 4,
            ts_correction: 0,
            ts_accuracy: 0,
            snaplen: MAXIMUM_SNAPLEN,
            datalink: DataLink::ETHERNET,
            ts_resolution: TsResolution::MicroSecond,
            endianness: Endianness::Big,
            modified: false,
        }
    }
}
