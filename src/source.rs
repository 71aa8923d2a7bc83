//! Byte source layering.
//!
//! [`CompressedSource`] wraps any [`Read`] and transparently decodes a
//! streaming Zstandard frame when the stream starts with the zstd frame
//! magic, so the parsers never know whether their input was compressed.
//! Uses enum dispatch rather than trait objects.

use std::io::{self, BufReader, Chain, Cursor, Read};

use tracing::debug;

use crate::errors::{CaptureError, CaptureResult};

/// Zstandard frame magic as it appears on disk.
const ZSTD_FRAME_BYTES: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// The sniffed head bytes chained back in front of the rest of the stream.
type Rewound<R> = Chain<Cursor<Vec<u8>>, R>;

/// A sequential byte source with transparent Zstandard decompression.
pub enum CompressedSource<R: Read> {
    /// Pass-through, no compression detected.
    Plain(Rewound<R>),
    /// Streaming Zstandard decoder, pulling compressed input in bounded chunks.
    Zstd(zstd::Decoder<'static, BufReader<Rewound<R>>>),
}

impl<R: Read> std::fmt::Debug for CompressedSource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompressedSource::Plain(_) => f.debug_tuple("Plain").finish(),
            CompressedSource::Zstd(_) => f.debug_tuple("Zstd").finish(),
        }
    }
}

impl<R: Read> CompressedSource<R> {
    /// Inspects the first bytes of `reader` and layers a zstd decoder if they
    /// match the Zstandard frame magic.
    ///
    /// The inspected bytes are not consumed from the caller's perspective:
    /// they are replayed in front of the remaining stream.
    pub fn new(mut reader: R) -> CaptureResult<Self> {
        let mut head = [0_u8; 4];
        let filled = read_or_eof(&mut reader, &mut head)?;

        let rewound = Cursor::new(head[..filled].to_vec()).chain(reader);

        if filled == 4 && head == ZSTD_FRAME_BYTES {
            debug!("zstd frame magic detected, layering streaming decoder");
            let decoder = zstd::Decoder::new(rewound).map_err(CaptureError::Decompression)?;
            Ok(CompressedSource::Zstd(decoder))
        }
        else {
            Ok(CompressedSource::Plain(rewound))
        }
    }

    /// Returns true if the source is being decompressed.
    pub fn is_compressed(&self) -> bool {
        matches!(self, CompressedSource::Zstd(_))
    }
}

impl<R: Read> Read for CompressedSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            CompressedSource::Plain(r) => r.read(buf),
            CompressedSource::Zstd(r) => r.read(buf),
        }
    }
}

/// Reads exactly `buf.len()` bytes or up to end of input, whichever comes
/// first, and returns the number of bytes read.
///
/// A return value of 0 distinguishes a clean end of stream from a partial
/// read, which the parsers treat as truncation.
pub(crate) fn read_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Reads exactly `buf.len()` bytes, mapping a short read to `on_truncation`.
pub(crate) fn read_exact_or(
    reader: &mut impl Read,
    buf: &mut [u8],
    on_truncation: CaptureError,
) -> CaptureResult<()> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(on_truncation),
        Err(e) => Err(CaptureError::Io(e)),
    }
}
