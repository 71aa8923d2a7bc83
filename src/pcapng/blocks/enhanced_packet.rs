//! Enhanced Packet Block (EPB).

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::errors::{CaptureError, CaptureResult};
use crate::Endianness;

/// Enhanced Packet Block.
///
/// The 64-bit timestamp is kept in interface ticks; splitting it into seconds
/// and a fraction needs the interface's tick rate and happens at the parser
/// level.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnhancedPacketBlock {
    /// Index of the interface the packet was captured on, scoped to the
    /// current section.
    pub interface_id: u32,

    /// Timestamp in units of the interface's resolution.
    pub timestamp: u64,

    /// Actual length of the packet when captured, before truncation.
    pub original_len: u32,

    /// Captured packet bytes.
    pub data: Vec<u8>,
}

impl EnhancedPacketBlock {
    pub(crate) fn from_body(endianness: Endianness, body: &[u8]) -> CaptureResult<EnhancedPacketBlock> {
        return match endianness {
            Endianness::Big => parse::<BigEndian>(body),
            Endianness::Little => parse::<LittleEndian>(body),
        };

        fn parse<B: ByteOrder>(body: &[u8]) -> CaptureResult<EnhancedPacketBlock> {
            if body.len() < 20 {
                return Err(CaptureError::CorruptBlock("enhanced packet body too short"));
            }

            let interface_id = B::read_u32(&body[0..4]);
            let timestamp_high = B::read_u32(&body[4..8]);
            let timestamp_low = B::read_u32(&body[8..12]);
            let captured_len = B::read_u32(&body[12..16]);
            let original_len = B::read_u32(&body[16..20]);

            if captured_len > original_len {
                return Err(CaptureError::CorruptBlock("captured length exceeds original length"));
            }
            let data_end = 20_usize
                .checked_add(captured_len as usize)
                .ok_or(CaptureError::CorruptBlock("captured length overflows"))?;
            if data_end > body.len() {
                return Err(CaptureError::CorruptBlock("packet data cut short"));
            }

            // Everything past the padded data is options, none of which feed
            // the packet model.
            Ok(EnhancedPacketBlock {
                interface_id,
                timestamp: (timestamp_high as u64) << 32 | timestamp_low as u64,
                original_len,
                data: body[20..data_end].to_vec(),
            })
        }
    }
}
