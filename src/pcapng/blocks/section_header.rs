//! Section Header Block (SHB).

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::errors::{CaptureError, CaptureResult};
use crate::{magic, Endianness};

use super::block_common::{
    for_each_option, option_str, push_end_of_options, push_str_option, write_block,
};

const OPT_COMMENT: u16 = 1;
const OPT_SHB_HARDWARE: u16 = 2;
const OPT_SHB_OS: u16 = 3;
const OPT_SHB_USERAPPL: u16 = 4;

/// Section Header Block.
///
/// Opens a section and fixes the endianness of every block until the next
/// section header. The descriptive options are exposed as owned strings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SectionHeaderBlock {
    /// Endianness of the section, read from the byte-order magic.
    pub endianness: Endianness,

    /// Major version of this section, currently 1.
    pub major_version: u16,

    /// Minor version of this section, currently 0.
    pub minor_version: u16,

    /// Length of the section in bytes, -1 when not specified.
    pub section_length: i64,

    /// Free-form comment.
    pub comment: Option<String>,

    /// Description of the capturing hardware.
    pub hardware: Option<String>,

    /// Name of the capturing operating system.
    pub os: Option<String>,

    /// Name of the capturing application.
    pub user_application: Option<String>,
}

impl SectionHeaderBlock {
    /// Parses a section header body, byte-order magic included.
    pub(crate) fn from_body(body: &[u8]) -> CaptureResult<SectionHeaderBlock> {
        if body.len() < 16 {
            return Err(CaptureError::CorruptBlock("section header body too short"));
        }

        let byte_order_magic = BigEndian::read_u32(&body[0..4]);
        let endianness = if byte_order_magic == magic::PCAPNG_BYTE_ORDER {
            Endianness::Big
        }
        else if byte_order_magic == magic::PCAPNG_BYTE_ORDER.swap_bytes() {
            Endianness::Little
        }
        else {
            return Err(CaptureError::CorruptBlock("invalid byte-order magic"));
        };

        return match endianness {
            Endianness::Big => parse::<BigEndian>(body, endianness),
            Endianness::Little => parse::<LittleEndian>(body, endianness),
        };

        fn parse<B: ByteOrder>(body: &[u8], endianness: Endianness) -> CaptureResult<SectionHeaderBlock> {
            let mut block = SectionHeaderBlock {
                endianness,
                major_version: B::read_u16(&body[4..6]),
                minor_version: B::read_u16(&body[6..8]),
                section_length: B::read_i64(&body[8..16]),
                comment: None,
                hardware: None,
                os: None,
                user_application: None,
            };

            for_each_option::<B, _>(&body[16..], |code, value| {
                match code {
                    OPT_COMMENT => block.comment = Some(option_str(value)?),
                    OPT_SHB_HARDWARE => block.hardware = Some(option_str(value)?),
                    OPT_SHB_OS => block.os = Some(option_str(value)?),
                    OPT_SHB_USERAPPL => block.user_application = Some(option_str(value)?),
                    _ => {},
                }
                Ok(())
            })?;

            Ok(block)
        }
    }

    /// Writes the block with full framing in the section's own endianness.
    pub(crate) fn write_to<W: std::io::Write>(&self, writer: &mut W) -> CaptureResult<usize> {
        return match self.endianness {
            Endianness::Big => inner::<BigEndian, _>(self, writer),
            Endianness::Little => inner::<LittleEndian, _>(self, writer),
        };

        fn inner<B: ByteOrder, W: std::io::Write>(
            block: &SectionHeaderBlock,
            writer: &mut W,
        ) -> CaptureResult<usize> {
            let mut body = Vec::with_capacity(64);
            let mut buf = [0_u8; 8];

            B::write_u32(&mut buf[0..4], magic::PCAPNG_BYTE_ORDER);
            body.extend_from_slice(&buf[0..4]);
            B::write_u16(&mut buf[0..2], block.major_version);
            B::write_u16(&mut buf[2..4], block.minor_version);
            body.extend_from_slice(&buf[0..4]);
            B::write_i64(&mut buf, block.section_length);
            body.extend_from_slice(&buf);

            let has_options = block.comment.is_some()
                || block.hardware.is_some()
                || block.os.is_some()
                || block.user_application.is_some();
            if has_options {
                if let Some(comment) = &block.comment {
                    push_str_option::<B>(&mut body, OPT_COMMENT, comment);
                }
                if let Some(hardware) = &block.hardware {
                    push_str_option::<B>(&mut body, OPT_SHB_HARDWARE, hardware);
                }
                if let Some(os) = &block.os {
                    push_str_option::<B>(&mut body, OPT_SHB_OS, os);
                }
                if let Some(user_application) = &block.user_application {
                    push_str_option::<B>(&mut body, OPT_SHB_USERAPPL, user_application);
                }
                push_end_of_options(&mut body);
            }

            write_block::<B, _>(writer, magic::PCAPNG, &body)
        }
    }
}

impl Default for SectionHeaderBlock {
    fn default() -> Self {
        SectionHeaderBlock {
            endianness: Endianness::Big,
            major_version: 1,
            minor_version: 0,
            section_length: -1,
            comment: None,
            hardware: None,
            os: None,
            user_application: None,
        }
    }
}
