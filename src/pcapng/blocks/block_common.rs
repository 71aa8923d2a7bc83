//! Block framing shared by every PcapNg block kind.

use std::io::{Read, Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::errors::{CaptureError, CaptureResult};
use crate::source::read_exact_or;
use crate::{magic, Endianness};

/// Sanity cap on a single block's declared length.
///
/// Well over any plausible packet block (the payload of an enhanced packet
/// block is itself bounded by the interface snaplen), small enough that a
/// corrupt length field fails fast instead of triggering a giant allocation.
pub(crate) const MAXIMUM_BLOCK_LEN: u32 = 1 << 28;

/// Framing of a block whose body has not been interpreted yet.
///
/// `body` holds everything between the two total-length fields. For a section
/// header block that includes the 4-byte byte-order magic, so the body parsers
/// see exactly the on-disk layout after the type and length.
#[derive(Clone, Debug)]
pub(crate) struct RawBlock {
    pub(crate) type_: u32,
    pub(crate) body: Vec<u8>,
    pub(crate) endianness: Endianness,
}

impl RawBlock {
    /// Reads the remainder of a block whose type field has already been
    /// consumed.
    ///
    /// `current` is the endianness of the enclosing section; a section header
    /// block ignores it and discovers its own endianness from the byte-order
    /// magic, which is why the discovered endianness is returned alongside the
    /// block.
    pub(crate) fn from_reader_after_type<R: Read>(
        type_: u32,
        current: Endianness,
        reader: &mut R,
    ) -> CaptureResult<RawBlock> {
        if type_ == magic::PCAPNG {
            return read_section_header_block(reader);
        }

        let raw_len = reader.read_u32::<BigEndian>().map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                CaptureError::CorruptBlock("block length cut short")
            }
            else {
                e.into()
            }
        })?;
        let total_len = match current {
            Endianness::Big => raw_len,
            Endianness::Little => raw_len.swap_bytes(),
        };

        let body = read_body_and_trailer(reader, total_len, current)?;

        Ok(RawBlock { type_, body, endianness: current })
    }
}

/// Section header blocks carry their own endianness in the byte-order magic,
/// so the length field that precedes the magic has to be fixed up once the
/// magic is known.
fn read_section_header_block<R: Read>(reader: &mut R) -> CaptureResult<RawBlock> {
    let mut head = [0_u8; 8];
    read_exact_or(reader, &mut head, CaptureError::CorruptBlock("section header cut short"))?;

    let byte_order_magic = BigEndian::read_u32(&head[4..8]);
    let endianness = if byte_order_magic == magic::PCAPNG_BYTE_ORDER {
        Endianness::Big
    }
    else if byte_order_magic == magic::PCAPNG_BYTE_ORDER.swap_bytes() {
        Endianness::Little
    }
    else {
        return Err(CaptureError::CorruptBlock("invalid byte-order magic"));
    };

    let total_len = match endianness {
        Endianness::Big => BigEndian::read_u32(&head[0..4]),
        Endianness::Little => LittleEndian::read_u32(&head[0..4]),
    };

    validate_block_len(total_len)?;
    if total_len < 28 {
        // 12 framing bytes + the 16 mandatory body bytes
        return Err(CaptureError::CorruptBlock("section header body too short"));
    }

    // The byte-order magic belongs to the body, it was pulled off the stream
    // while discovering the endianness. 12 framing bytes, 4 of them already in
    // `head`.
    let rest_len = total_len as usize - 12 - 4;
    let mut body = vec![0_u8; 4 + rest_len];
    body[..4].copy_from_slice(&head[4..8]);
    read_exact_or(reader, &mut body[4..], CaptureError::CorruptBlock("block body cut short"))?;

    check_trailer(reader, total_len, endianness)?;

    Ok(RawBlock { type_: magic::PCAPNG, body, endianness })
}

fn read_body_and_trailer<R: Read>(
    reader: &mut R,
    total_len: u32,
    endianness: Endianness,
) -> CaptureResult<Vec<u8>> {
    validate_block_len(total_len)?;

    let mut body = vec![0_u8; total_len as usize - 12];
    read_exact_or(reader, &mut body, CaptureError::CorruptBlock("block body cut short"))?;

    check_trailer(reader, total_len, endianness)?;

    Ok(body)
}

fn validate_block_len(total_len: u32) -> CaptureResult<()> {
    if total_len < 12 || total_len % 4 != 0 {
        return Err(CaptureError::CorruptBlock("invalid block length"));
    }
    if total_len > MAXIMUM_BLOCK_LEN {
        return Err(CaptureError::CorruptBlock("block length exceeds sanity cap"));
    }
    Ok(())
}

fn check_trailer<R: Read>(reader: &mut R, total_len: u32, endianness: Endianness) -> CaptureResult<()> {
    let trailer = match endianness {
        Endianness::Big => reader.read_u32::<BigEndian>(),
        Endianness::Little => reader.read_u32::<LittleEndian>(),
    }
    .map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            CaptureError::CorruptBlock("block trailer cut short")
        }
        else {
            CaptureError::from(e)
        }
    })?;

    if trailer != total_len {
        return Err(CaptureError::CorruptBlock("trailing block length mismatch"));
    }

    Ok(())
}

/// Walks the option list that trails a block body, calling `f` with each
/// option's code and value. Stops at the end-of-options marker or at the end
/// of the slice.
pub(crate) fn for_each_option<B: ByteOrder, F>(mut slice: &[u8], mut f: F) -> CaptureResult<()>
where
    F: FnMut(u16, &[u8]) -> CaptureResult<()>,
{
    while slice.len() >= 4 {
        let code = B::read_u16(&slice[0..2]);
        let len = B::read_u16(&slice[2..4]) as usize;

        if code == 0 {
            return Ok(());
        }

        let padded = len + (4 - len % 4) % 4;
        if slice.len() < 4 + len {
            return Err(CaptureError::CorruptBlock("option value cut short"));
        }

        f(code, &slice[4..4 + len])?;

        if slice.len() < 4 + padded {
            return Ok(());
        }
        slice = &slice[4 + padded..];
    }

    Ok(())
}

/// Decodes an option value as UTF-8, trimming any trailing NUL bytes some
/// writers pad with.
pub(crate) fn option_str(value: &[u8]) -> CaptureResult<String> {
    let trimmed = match value.iter().rposition(|&b| b != 0) {
        Some(last) => &value[..=last],
        None => &[],
    };

    std::str::from_utf8(trimmed)
        .map(str::to_owned)
        .map_err(|_| CaptureError::CorruptBlock("option value is not valid UTF-8"))
}

/// Writes one block with its full framing: type, total length, body padded to
/// 32 bits, total length again.
pub(crate) fn write_block<B: ByteOrder, W: Write>(writer: &mut W, type_: u32, body: &[u8]) -> CaptureResult<usize> {
    let pad = (4 - body.len() % 4) % 4;
    let total_len = (12 + body.len() + pad) as u32;

    writer.write_u32::<B>(type_)?;
    writer.write_u32::<B>(total_len)?;
    writer.write_all(body)?;
    writer.write_all(&[0_u8; 3][..pad])?;
    writer.write_u32::<B>(total_len)?;

    Ok(total_len as usize)
}

/// Appends one string option to an in-memory body buffer.
pub(crate) fn push_str_option<B: ByteOrder>(body: &mut Vec<u8>, code: u16, value: &str) {
    push_raw_option::<B>(body, code, value.as_bytes());
}

/// Appends one raw option to an in-memory body buffer.
pub(crate) fn push_raw_option<B: ByteOrder>(body: &mut Vec<u8>, code: u16, value: &[u8]) {
    let mut buf = [0_u8; 4];
    B::write_u16(&mut buf[0..2], code);
    B::write_u16(&mut buf[2..4], value.len() as u16);
    body.extend_from_slice(&buf);
    body.extend_from_slice(value);
    body.extend_from_slice(&[0_u8; 3][..(4 - value.len() % 4) % 4]);
}

/// Appends the end-of-options marker.
pub(crate) fn push_end_of_options(body: &mut Vec<u8>) {
    body.extend_from_slice(&[0_u8; 4]);
}
