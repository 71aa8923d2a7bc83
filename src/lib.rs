//! This crate reads and writes packet capture files in the classic pcap, the
//! modified (Kuznetsov) pcap and the PcapNg formats, with transparent
//! streaming Zstandard decompression of any of them.
//!
//! Packets from every format surface as the same [`Packet`] type, with pcapng
//! interface metadata exposed through [`TraceInterface`]. For full control
//! over one specific container use the [`pcap`] and [`pcapng`] modules
//! directly.
//!
//! # Example
//!
//! ```no_run
//! use capfile::{CaptureReader, CaptureWriter, WriterFormat};
//!
//! # fn main() -> Result<(), capfile::CaptureError> {
//! let mut reader = CaptureReader::open("in.pcap.zst")?;
//! let mut writer = CaptureWriter::create("out.pcapng", WriterFormat::Auto)?;
//!
//! while let Some(packet) = reader.next_packet() {
//!     writer.write(&packet?)?;
//! }
//! writer.finalize()?;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod pcap;
pub mod pcapng;

mod common;
mod packet;
mod reader;
mod source;
mod writer;

pub use common::{magic, DataLink, Endianness, FileFormat, TsResolution};
pub use errors::{CaptureError, CaptureResult};
pub use packet::{Packet, TraceInterface};
pub use reader::CaptureReader;
pub use source::CompressedSource;
pub use writer::{CaptureWriter, WriterFormat};
