//! The data model produced by both parsers: [`Packet`] and [`TraceInterface`].

use crate::DataLink;

/// One captured frame, independent of the container format it was read from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Packet {
    /// Capture time, seconds since the Unix epoch.
    pub timestamp_seconds: u32,

    /// Sub-second part of the capture time, in microseconds or nanoseconds
    /// depending on the source format's declared resolution.
    pub timestamp_fraction: u32,

    /// Number of payload bytes actually stored in the file.
    ///
    /// Always equal to `data.len()`.
    pub capture_length: u32,

    /// Length of the frame on the wire, before any truncation by the snap length.
    pub original_length: u32,

    /// Link-layer framing of `data`.
    pub data_link_type: DataLink,

    /// Index into the capture's interface table, or `-1` when the source
    /// format has no interface concept (classic and modified pcap).
    pub interface_index: i32,

    /// Payload, exactly `capture_length` bytes.
    pub data: Vec<u8>,
}

impl Default for Packet {
    fn default() -> Self {
        Packet {
            timestamp_seconds: 0,
            timestamp_fraction: 0,
            capture_length: 0,
            original_length: 0,
            data_link_type: DataLink::default(),
            interface_index: -1,
            data: Vec::new(),
        }
    }
}

/// Metadata of one capture interface, built from a pcapng
/// Interface Description Block.
///
/// Interfaces are indexed 0..N-1 in block-appearance order within their
/// section and are immutable once parsed. Classic and modified pcap have no
/// interface table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TraceInterface {
    /// Name of the capture device (`if_name`).
    pub name: Option<String>,

    /// Description of the capture device (`if_description`).
    pub description: Option<String>,

    /// Capture filter expression recorded for this interface (`if_filter`).
    pub filter: Option<String>,

    /// Operating system of the capturing machine (`if_os`).
    pub os: Option<String>,

    /// Timestamp ticks per second for packets of this interface.
    pub timestamp_resolution: u64,

    /// Link-layer type of packets captured on this interface.
    pub link_type: DataLink,

    /// Maximum number of octets captured from each packet, 0 for no limit.
    pub snaplen: u32,
}

impl Default for TraceInterface {
    fn default() -> Self {
        TraceInterface {
            name: None,
            description: None,
            filter: None,
            os: None,
            timestamp_resolution: 1_000_000,
            link_type: DataLink::default(),
            snaplen: 0,
        }
    }
}
