//! Format-selecting capture writer.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::errors::{CaptureError, CaptureResult};
use crate::packet::{Packet, TraceInterface};
use crate::pcap::{PcapHeader, PcapWriter};
use crate::pcapng::PcapNgWriter;
use crate::Endianness;

/// Output format of a [`CaptureWriter`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum WriterFormat {
    /// Pick the format automatically.
    ///
    /// When writing to a path, a `.pcapng` extension selects PcapNg and
    /// anything else classic pcap. When writing to a plain sink the choice is
    /// made at the first packet: a non-negative interface index selects
    /// PcapNg, `-1` selects classic pcap.
    #[default]
    Auto,
    /// Classic pcap.
    Pcap,
    /// PcapNg.
    PcapNg,
}

enum Backend<W: Write> {
    /// Nothing emitted yet. Headers are written once the first packet (or an
    /// explicit interface declaration) fixes the format, so a classic pcap
    /// header can carry the first packet's link type.
    Pending(W, WriterFormat),
    Pcap(PcapWriter<W>),
    PcapNg(PcapNgWriter<W>),
}

/// Writes packets to either capture format behind one interface.
///
/// ```no_run
/// use capfile::{CaptureWriter, Packet, WriterFormat};
///
/// # fn main() -> Result<(), capfile::CaptureError> {
/// let mut writer = CaptureWriter::create("out.pcapng", WriterFormat::Auto)?;
/// writer.write(&Packet::default())?;
/// writer.finalize()?;
/// # Ok(())
/// # }
/// ```
pub struct CaptureWriter<W: Write> {
    backend: Option<Backend<W>>,
}

impl CaptureWriter<File> {
    /// Creates (and truncates) a capture file at `path`.
    ///
    /// With [`WriterFormat::Auto`] the format is inferred from the extension.
    pub fn create<P: AsRef<Path>>(path: P, format: WriterFormat) -> CaptureResult<CaptureWriter<File>> {
        let path = path.as_ref();
        let format = match format {
            WriterFormat::Auto => {
                let by_extension = if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("pcapng")) {
                    WriterFormat::PcapNg
                }
                else {
                    WriterFormat::Pcap
                };
                debug!(path = %path.display(), format = ?by_extension, "format inferred from extension");
                by_extension
            },
            explicit => explicit,
        };

        let file = File::create(path)?;
        CaptureWriter::new(file, format)
    }
}

impl<W: Write> CaptureWriter<W> {
    /// Creates a new `CaptureWriter` over an arbitrary sink.
    ///
    /// Nothing is written until the first packet or interface declaration.
    pub fn new(writer: W, format: WriterFormat) -> CaptureResult<CaptureWriter<W>> {
        Ok(CaptureWriter { backend: Some(Backend::Pending(writer, format)) })
    }

    /// Returns the output format, `None` while an `Auto` choice is still
    /// pending.
    pub fn format(&self) -> Option<WriterFormat> {
        match self.backend.as_ref() {
            Some(Backend::Pending(_, WriterFormat::Auto)) => None,
            Some(Backend::Pending(_, format)) => Some(*format),
            Some(Backend::Pcap(_)) => Some(WriterFormat::Pcap),
            Some(Backend::PcapNg(_)) => Some(WriterFormat::PcapNg),
            None => None,
        }
    }

    /// Declares one PcapNg interface up front and returns its index.
    ///
    /// Forces the PcapNg format; declaring an interface on a classic pcap
    /// writer is an error.
    pub fn write_interface(&mut self, interface: &TraceInterface) -> CaptureResult<usize> {
        self.materialize(WriterFormat::PcapNg, None)?;

        match self.backend.as_mut() {
            Some(Backend::PcapNg(writer)) => writer.write_interface(interface),
            _ => Err(CaptureError::UnsupportedWrite("classic pcap has no interface table")),
        }
    }

    /// Writes one packet, fixing the format first if it is still pending.
    pub fn write(&mut self, packet: &Packet) -> CaptureResult<()> {
        self.materialize(WriterFormat::Auto, Some(packet))?;

        match self.backend.as_mut() {
            Some(Backend::Pcap(writer)) => writer.write_packet(packet),
            Some(Backend::PcapNg(writer)) => writer.write_packet(packet),
            _ => Err(CaptureError::UnsupportedWrite("writer already finalized")),
        }
    }

    /// Flushes the underlying sink.
    pub fn flush(&mut self) -> CaptureResult<()> {
        match self.backend.as_mut() {
            Some(Backend::Pending(writer, _)) => writer.flush().map_err(CaptureError::from),
            Some(Backend::Pcap(writer)) => writer.flush(),
            Some(Backend::PcapNg(writer)) => writer.flush(),
            None => Ok(()),
        }
    }

    /// Finishes the capture, flushing and returning the sink.
    ///
    /// A writer that never saw a packet still emits valid headers, defaulting
    /// a pending `Auto` choice to classic pcap.
    pub fn finalize(mut self) -> CaptureResult<W> {
        self.materialize(WriterFormat::Pcap, None)?;

        let mut sink = match self.backend.take() {
            Some(Backend::Pcap(writer)) => writer.into_inner(),
            Some(Backend::PcapNg(writer)) => writer.into_inner(),
            _ => return Err(CaptureError::UnsupportedWrite("writer already finalized")),
        };
        sink.flush()?;
        Ok(sink)
    }

    /// Replaces a pending backend with a concrete one. `fallback` decides a
    /// still-`Auto` format when no packet is available to decide it.
    fn materialize(&mut self, fallback: WriterFormat, packet: Option<&Packet>) -> CaptureResult<()> {
        let format = match self.backend.as_ref() {
            Some(Backend::Pending(_, WriterFormat::Auto)) => match packet {
                Some(p) if p.interface_index >= 0 => WriterFormat::PcapNg,
                Some(_) => WriterFormat::Pcap,
                None => fallback,
            },
            Some(Backend::Pending(_, format)) => *format,
            _ => return Ok(()),
        };
        if format == WriterFormat::Auto {
            return Ok(());
        }

        let Some(Backend::Pending(writer, _)) = self.backend.take() else { unreachable!() };

        debug!(format = ?format, "emitting capture headers");
        let backend = match format {
            WriterFormat::Pcap => {
                let header = PcapHeader {
                    endianness: Endianness::native(),
                    datalink: packet.map(|p| p.data_link_type).unwrap_or_default(),
                    ..Default::default()
                };
                Backend::Pcap(PcapWriter::with_header(writer, header)?)
            },
            WriterFormat::PcapNg => Backend::PcapNg(PcapNgWriter::new(writer)?),
            WriterFormat::Auto => unreachable!(),
        };
        self.backend = Some(backend);

        Ok(())
    }
}

impl<W: Write> Drop for CaptureWriter<W> {
    fn drop(&mut self) {
        // finalize() is the checked path, this only keeps buffered bytes from
        // silently vanishing
        let _ = self.flush();
    }
}
