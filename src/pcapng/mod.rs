//! Contains the PcapNg parser, writer and block types.

pub mod blocks;
mod parser;
mod writer;

pub use blocks::{EnhancedPacketBlock, InterfaceDescriptionBlock, SectionHeaderBlock, SimplePacketBlock};
pub use parser::*;
pub use writer::*;
