//! Format-sniffing capture reader.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{CaptureError, CaptureResult};
use crate::packet::{Packet, TraceInterface};
use crate::pcap::{PcapHeader, PcapParser};
use crate::pcapng::PcapNgParser;
use crate::source::{read_or_eof, CompressedSource};
use crate::{magic, FileFormat};

#[derive(Debug)]
enum FormatParser {
    Pcap(PcapParser),
    PcapNg(PcapNgParser),
}

/// Reads packets from any supported capture format.
///
/// The format is sniffed from the first four bytes, after transparent
/// Zstandard decompression when the input is compressed. Packets are pulled
/// one at a time with [`CaptureReader::next_packet`] or through the
/// [`Iterator`] impl.
///
/// ```no_run
/// use capfile::CaptureReader;
///
/// # fn main() -> Result<(), capfile::CaptureError> {
/// let mut reader = CaptureReader::open("capture.pcapng.zst")?;
/// while let Some(packet) = reader.next_packet() {
///     let packet = packet?;
///     println!("{} bytes on interface {}", packet.capture_length, packet.interface_index);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CaptureReader<R: Read> {
    source: CompressedSource<R>,
    parser: FormatParser,
    path: Option<PathBuf>,
    pending: Option<Packet>,
    exhausted: bool,
}

impl CaptureReader<File> {
    /// Opens a capture file by path.
    pub fn open<P: AsRef<Path>>(path: P) -> CaptureResult<CaptureReader<File>> {
        let file = File::open(path.as_ref())?;

        let mut reader = CaptureReader::new(file)?;
        reader.path = Some(path.as_ref().to_owned());
        Ok(reader)
    }
}

impl<R: Read> CaptureReader<R> {
    /// Creates a new `CaptureReader`, sniffing compression and format off the
    /// front of the stream.
    pub fn new(reader: R) -> CaptureResult<CaptureReader<R>> {
        let mut source = CompressedSource::new(reader)?;
        let compressed = source.is_compressed();

        let mut sniff = [0_u8; 4];
        let filled = read_or_eof(&mut source, &mut sniff).map_err(|e| remap_io(compressed, e.into()))?;
        // A short stream still reports the bytes it had, zero padded
        let magic_number = u32::from_be_bytes({
            let mut padded = [0_u8; 4];
            padded[..filled].copy_from_slice(&sniff[..filled]);
            padded
        });

        let parser = if magic_number == magic::PCAPNG {
            let parser = PcapNgParser::new(&mut source).map_err(|e| remap_io(compressed, e))?;
            FormatParser::PcapNg(parser)
        }
        else if PcapHeader::dissect_magic(magic_number).is_some() {
            let parser = PcapParser::new(magic_number, &mut source).map_err(|e| remap_io(compressed, e))?;
            FormatParser::Pcap(parser)
        }
        else {
            return Err(CaptureError::UnsupportedFormat(magic_number));
        };

        debug!(format = ?format_of(&parser), compressed, "capture stream opened");

        let mut reader = CaptureReader { source, parser, path: None, pending: None, exhausted: false };

        // Pull the first packet eagerly for pcapng so the interface table is
        // populated right after open.
        if let FormatParser::PcapNg(_) = reader.parser {
            match reader.pull() {
                Ok(packet) => reader.pending = packet,
                Err(e) => return Err(e),
            }
        }

        Ok(reader)
    }

    /// Returns the next packet, or `None` once the stream is exhausted.
    ///
    /// Exhaustion latches. After `None`, or after any error, every further
    /// call returns `None`.
    #[allow(clippy::should_implement_trait)]
    pub fn next_packet(&mut self) -> Option<CaptureResult<Packet>> {
        if let Some(packet) = self.pending.take() {
            return Some(Ok(packet));
        }
        if self.exhausted {
            return None;
        }

        match self.pull() {
            Ok(Some(packet)) => Some(Ok(packet)),
            Ok(None) => {
                self.exhausted = true;
                None
            },
            Err(e) => {
                self.exhausted = true;
                Some(Err(e))
            },
        }
    }

    fn pull(&mut self) -> CaptureResult<Option<Packet>> {
        let compressed = self.source.is_compressed();
        let result = match &mut self.parser {
            FormatParser::Pcap(parser) => parser.next_packet(&mut self.source),
            FormatParser::PcapNg(parser) => parser.next_packet(&mut self.source),
        };

        result.map_err(|e| remap_io(compressed, e))
    }

    /// True once the stream has reported its end or an error.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted && self.pending.is_none()
    }

    /// Returns the capture format sniffed at construction.
    pub fn format(&self) -> FileFormat {
        format_of(&self.parser)
    }

    /// True when the input stream was Zstandard compressed.
    pub fn is_compressed(&self) -> bool {
        self.source.is_compressed()
    }

    /// Returns the path the reader was opened from, if any.
    pub fn source_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the interfaces known so far.
    ///
    /// Classic and modified pcap have no interface table, so this is empty for
    /// them. For pcapng the table grows as interface description blocks are
    /// crossed, and resets on a new section.
    pub fn interfaces(&self) -> &[TraceInterface] {
        match &self.parser {
            FormatParser::Pcap(_) => &[],
            FormatParser::PcapNg(parser) => parser.interfaces(),
        }
    }

    /// Returns one interface by index.
    pub fn interface(&self, index: usize) -> CaptureResult<&TraceInterface> {
        self.interfaces().get(index).ok_or(CaptureError::InterfaceIndexOutOfRange(index))
    }

    /// Free-form comment of the current pcapng section.
    pub fn section_comment(&self) -> Option<&str> {
        self.section_option(|s| &s.comment)
    }

    /// Capturing hardware of the current pcapng section.
    pub fn section_hardware(&self) -> Option<&str> {
        self.section_option(|s| &s.hardware)
    }

    /// Capturing operating system of the current pcapng section.
    pub fn section_os(&self) -> Option<&str> {
        self.section_option(|s| &s.os)
    }

    /// Capturing application of the current pcapng section.
    pub fn section_application(&self) -> Option<&str> {
        self.section_option(|s| &s.user_application)
    }

    fn section_option<F>(&self, f: F) -> Option<&str>
    where
        F: Fn(&crate::pcapng::SectionHeaderBlock) -> &Option<String>,
    {
        match &self.parser {
            FormatParser::Pcap(_) => None,
            FormatParser::PcapNg(parser) => f(parser.section()).as_deref(),
        }
    }

    /// Returns the pcap global header, for the pcap formats.
    pub fn pcap_header(&self) -> Option<&PcapHeader> {
        match &self.parser {
            FormatParser::Pcap(parser) => Some(parser.header()),
            FormatParser::PcapNg(_) => None,
        }
    }
}

impl<R: Read> Iterator for CaptureReader<R> {
    type Item = CaptureResult<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_packet()
    }
}

fn format_of(parser: &FormatParser) -> FileFormat {
    match parser {
        FormatParser::Pcap(p) if p.header().modified => FileFormat::ModifiedPcap,
        FormatParser::Pcap(_) => FileFormat::Pcap,
        FormatParser::PcapNg(_) => FileFormat::PcapNg,
    }
}

/// A decoding failure inside the decompressor surfaces as a plain I/O error;
/// telling it apart from a real read error matters to callers.
fn remap_io(compressed: bool, error: CaptureError) -> CaptureError {
    match error {
        CaptureError::Io(e) if compressed && e.kind() != std::io::ErrorKind::UnexpectedEof => {
            CaptureError::Decompression(e)
        },
        other => other,
    }
}
