//! PcapNg block decoding.
//!
//! Only the blocks that feed the packet/interface model are parsed into
//! structs. Every other block kind, known or not, is recognized structurally
//! through its type and length fields and skipped.

pub(crate) mod block_common;
pub mod enhanced_packet;
pub mod interface_description;
pub mod section_header;
pub mod simple_packet;

pub use enhanced_packet::EnhancedPacketBlock;
pub use interface_description::InterfaceDescriptionBlock;
pub use section_header::SectionHeaderBlock;
pub use simple_packet::SimplePacketBlock;

pub(crate) const INTERFACE_DESCRIPTION_BLOCK: u32 = 0x0000_0001;
pub(crate) const PACKET_BLOCK: u32 = 0x0000_0002;
pub(crate) const SIMPLE_PACKET_BLOCK: u32 = 0x0000_0003;
pub(crate) const NAME_RESOLUTION_BLOCK: u32 = 0x0000_0004;
pub(crate) const INTERFACE_STATISTICS_BLOCK: u32 = 0x0000_0005;
pub(crate) const ENHANCED_PACKET_BLOCK: u32 = 0x0000_0006;
