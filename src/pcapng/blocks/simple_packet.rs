//! Simple Packet Block (SPB).

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::errors::{CaptureError, CaptureResult};
use crate::Endianness;

/// Simple Packet Block.
///
/// Carries only the original length and the packet bytes. It implicitly
/// belongs to interface 0 and has no timestamp. The captured length is not
/// stored, it is derived from the original length, the body size and the
/// interface snaplen.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SimplePacketBlock {
    /// Actual length of the packet when captured, before truncation.
    pub original_len: u32,

    /// Captured packet bytes.
    pub data: Vec<u8>,
}

impl SimplePacketBlock {
    /// Parses a simple packet body. `snaplen` is interface 0's snapshot
    /// length, 0 meaning unlimited.
    pub(crate) fn from_body(endianness: Endianness, body: &[u8], snaplen: u32) -> CaptureResult<SimplePacketBlock> {
        if body.len() < 4 {
            return Err(CaptureError::CorruptBlock("simple packet body too short"));
        }

        let original_len = match endianness {
            Endianness::Big => BigEndian::read_u32(&body[0..4]),
            Endianness::Little => LittleEndian::read_u32(&body[0..4]),
        };

        let mut captured_len = (original_len as usize).min(body.len() - 4);
        if snaplen != 0 {
            captured_len = captured_len.min(snaplen as usize);
        }

        Ok(SimplePacketBlock { original_len, data: body[4..4 + captured_len].to_vec() })
    }
}
