//! Interface Description Block (IDB).

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::errors::{CaptureError, CaptureResult};
use crate::packet::TraceInterface;
use crate::{DataLink, Endianness};

use super::block_common::{
    for_each_option, option_str, push_end_of_options, push_raw_option, push_str_option, write_block,
};
use super::INTERFACE_DESCRIPTION_BLOCK;

const OPT_IF_NAME: u16 = 2;
const OPT_IF_DESCRIPTION: u16 = 3;
const OPT_IF_TSRESOL: u16 = 9;
const OPT_IF_FILTER: u16 = 11;
const OPT_IF_OS: u16 = 12;

/// Interface Description Block.
///
/// Declares one capture interface of the current section. Interfaces are
/// numbered by order of appearance, starting at 0 and resetting on each new
/// section header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InterfaceDescriptionBlock {
    /// Link-layer framing of the packets captured on this interface.
    pub linktype: DataLink,

    /// Maximum number of bytes captured per packet, 0 for no limit.
    pub snaplen: u32,

    /// Device name, e.g. "eth0".
    pub name: Option<String>,

    /// Free-form device description.
    pub description: Option<String>,

    /// Capture filter, with the leading filter-kind byte stripped.
    pub filter: Option<String>,

    /// Operating system the interface belongs to.
    pub os: Option<String>,

    /// Timestamp ticks per second, decoded from the if_tsresol option.
    /// Defaults to microseconds when the option is absent.
    pub ts_resolution: u64,
}

impl InterfaceDescriptionBlock {
    pub(crate) fn from_body(endianness: Endianness, body: &[u8]) -> CaptureResult<InterfaceDescriptionBlock> {
        return match endianness {
            Endianness::Big => parse::<BigEndian>(body),
            Endianness::Little => parse::<LittleEndian>(body),
        };

        fn parse<B: ByteOrder>(body: &[u8]) -> CaptureResult<InterfaceDescriptionBlock> {
            if body.len() < 8 {
                return Err(CaptureError::CorruptBlock("interface description body too short"));
            }

            let mut block = InterfaceDescriptionBlock {
                linktype: DataLink::from(B::read_u16(&body[0..2]) as u32),
                snaplen: B::read_u32(&body[4..8]),
                name: None,
                description: None,
                filter: None,
                os: None,
                ts_resolution: 1_000_000,
            };

            for_each_option::<B, _>(&body[8..], |code, value| {
                match code {
                    OPT_IF_NAME => block.name = Some(option_str(value)?),
                    OPT_IF_DESCRIPTION => block.description = Some(option_str(value)?),
                    OPT_IF_TSRESOL => {
                        let raw = *value
                            .first()
                            .ok_or(CaptureError::CorruptBlock("empty if_tsresol option"))?;
                        block.ts_resolution = decode_ts_resolution(raw)?;
                    },
                    OPT_IF_FILTER => {
                        // First byte encodes the filter kind, the string follows
                        block.filter = Some(option_str(value.get(1..).unwrap_or(&[]))?);
                    },
                    OPT_IF_OS => block.os = Some(option_str(value)?),
                    _ => {},
                }
                Ok(())
            })?;

            Ok(block)
        }
    }

    pub(crate) fn write_to<W: std::io::Write>(&self, endianness: Endianness, writer: &mut W) -> CaptureResult<usize> {
        return match endianness {
            Endianness::Big => inner::<BigEndian, _>(self, writer),
            Endianness::Little => inner::<LittleEndian, _>(self, writer),
        };

        fn inner<B: ByteOrder, W: std::io::Write>(
            block: &InterfaceDescriptionBlock,
            writer: &mut W,
        ) -> CaptureResult<usize> {
            let mut body = Vec::with_capacity(32);
            let mut buf = [0_u8; 4];

            B::write_u16(&mut buf[0..2], u32::from(block.linktype) as u16);
            B::write_u16(&mut buf[2..4], 0);
            body.extend_from_slice(&buf);
            B::write_u32(&mut buf, block.snaplen);
            body.extend_from_slice(&buf);

            let tsresol = encode_ts_resolution(block.ts_resolution);
            let has_options = block.name.is_some()
                || block.description.is_some()
                || block.filter.is_some()
                || block.os.is_some()
                || tsresol.is_some();
            if has_options {
                if let Some(name) = &block.name {
                    push_str_option::<B>(&mut body, OPT_IF_NAME, name);
                }
                if let Some(description) = &block.description {
                    push_str_option::<B>(&mut body, OPT_IF_DESCRIPTION, description);
                }
                if let Some(raw) = tsresol {
                    push_raw_option::<B>(&mut body, OPT_IF_TSRESOL, &[raw]);
                }
                if let Some(filter) = &block.filter {
                    let mut value = Vec::with_capacity(filter.len() + 1);
                    value.push(0);
                    value.extend_from_slice(filter.as_bytes());
                    push_raw_option::<B>(&mut body, OPT_IF_FILTER, &value);
                }
                if let Some(os) = &block.os {
                    push_str_option::<B>(&mut body, OPT_IF_OS, os);
                }
                push_end_of_options(&mut body);
            }

            write_block::<B, _>(writer, INTERFACE_DESCRIPTION_BLOCK, &body)
        }
    }
}

impl Default for InterfaceDescriptionBlock {
    fn default() -> Self {
        InterfaceDescriptionBlock {
            linktype: DataLink::ETHERNET,
            snaplen: 0,
            name: None,
            description: None,
            filter: None,
            os: None,
            ts_resolution: 1_000_000,
        }
    }
}

impl From<InterfaceDescriptionBlock> for TraceInterface {
    fn from(block: InterfaceDescriptionBlock) -> Self {
        TraceInterface {
            name: block.name,
            description: block.description,
            filter: block.filter,
            os: block.os,
            timestamp_resolution: block.ts_resolution,
            link_type: block.linktype,
            snaplen: block.snaplen,
        }
    }
}

impl From<&TraceInterface> for InterfaceDescriptionBlock {
    fn from(interface: &TraceInterface) -> Self {
        InterfaceDescriptionBlock {
            linktype: interface.link_type,
            snaplen: interface.snaplen,
            name: interface.name.clone(),
            description: interface.description.clone(),
            filter: interface.filter.clone(),
            os: interface.os.clone(),
            ts_resolution: interface.timestamp_resolution,
        }
    }
}

/// Decodes an if_tsresol byte. MSB clear means a power of 10, MSB set a power
/// of 2.
fn decode_ts_resolution(raw: u8) -> CaptureResult<u64> {
    let resolution = if raw & 0x80 == 0 {
        10_u64.checked_pow(raw as u32)
    }
    else {
        2_u64.checked_pow((raw & 0x7F) as u32)
    };

    resolution.ok_or(CaptureError::CorruptBlock("if_tsresol overflows 64 bits"))
}

/// Re-encodes a tick rate into an if_tsresol byte when it is an exact power
/// of 10 or 2. The microsecond default is left implicit.
fn encode_ts_resolution(ts_resolution: u64) -> Option<u8> {
    if ts_resolution == 1_000_000 {
        return None;
    }
    if ts_resolution.is_power_of_two() {
        return Some(0x80 | ts_resolution.trailing_zeros() as u8);
    }

    let mut value = ts_resolution;
    let mut exponent = 0_u8;
    while value % 10 == 0 {
        value /= 10;
        exponent += 1;
    }
    (value == 1).then_some(exponent)
}
