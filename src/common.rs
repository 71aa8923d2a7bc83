//! Types shared by the pcap and pcapng modules.

/// Magic numbers recognized by the format sniffer, in their big-endian reading.
pub mod magic {
    /// Classic pcap, microsecond timestamp resolution.
    pub const PCAP_MICROSECONDS: u32 = 0xA1B2_C3D4;
    /// Classic pcap, nanosecond timestamp resolution.
    pub const PCAP_NANOSECONDS: u32 = 0xA1B2_3C4D;
    /// Modified (Kuznetsov) pcap with an extended per-record header.
    pub const MODIFIED_PCAP: u32 = 0xA1B2_CD34;
    /// PcapNg Section Header Block type code.
    pub const PCAPNG: u32 = 0x0A0D_0D0A;
    /// PcapNg byte-order magic, first body field of a Section Header Block.
    pub const PCAPNG_BYTE_ORDER: u32 = 0x1A2B_3C4D;
    /// Zstandard frame magic, little-endian on disk (`28 B5 2F FD`).
    pub const ZSTD_FRAME: u32 = 0xFD2F_B528;
}

/// Capture file format selected once by the sniffer at reader construction.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FileFormat {
    /// Classic libpcap, global header plus sequential 16-byte record headers.
    Pcap,
    /// Vendor pcap variant with a 24-byte per-record header.
    ModifiedPcap,
    /// Block-structured pcapng container.
    PcapNg,
}

/// Endianness of a capture stream.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Endianness {
    Big,
    Little,
}

impl Endianness {
    /// Returns the endianness of the current processor.
    pub fn native() -> Self {
        #[cfg(target_endian = "big")]
        return Endianness::Big;

        #[cfg(target_endian = "little")]
        return Endianness::Little;
    }

    pub fn is_big(self) -> bool {
        self == Endianness::Big
    }

    pub fn is_little(self) -> bool {
        self == Endianness::Little
    }
}

/// Timestamp resolution of a classic pcap stream, encoded in its magic number.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TsResolution {
    MicroSecond,
    NanoSecond,
}

impl TsResolution {
    /// Number of timestamp ticks per second.
    pub fn ticks_per_second(self) -> u32 {
        match self {
            TsResolution::MicroSecond => 1_000_000,
            TsResolution::NanoSecond => 1_000_000_000,
        }
    }
}

/// Link-layer framing of the captured packets.
///
/// See the [tcpdump.org link-layer header types registry](https://www.tcpdump.org/linktypes.html).
/// Codes without a named variant are preserved verbatim in `Unknown`.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DataLink {
    /// BSD loopback encapsulation
    NULL,
    /// IEEE 802.3 Ethernet
    ETHERNET,
    /// IEEE 802.5 Token Ring
    IEEE802_5,
    /// PPP, as per RFC 1661 and RFC 1662
    PPP,
    /// FDDI, as per ANSI X3.239
    FDDI,
    /// Raw IP, starting with an IPv4 or IPv6 header
    RAW,
    /// IEEE 802.11 wireless LAN
    IEEE802_11,
    /// Linux "cooked" capture encapsulation
    LINUX_SLL,
    /// Linux "cooked" capture encapsulation v2
    LINUX_SLL2,
    /// Unknown link type, code preserved verbatim
    Unknown(u32),
}

impl From<u32> for DataLink {
    fn from(code: u32) -> Self {
        match code {
            0 => DataLink::NULL,
            1 => DataLink::ETHERNET,
            6 => DataLink::IEEE802_5,
            9 => DataLink::PPP,
            10 => DataLink::FDDI,
            101 => DataLink::RAW,
            105 => DataLink::IEEE802_11,
            113 => DataLink::LINUX_SLL,
            276 => DataLink::LINUX_SLL2,
            code => DataLink::Unknown(code),
        }
    }
}

impl From<DataLink> for u32 {
    fn from(link: DataLink) -> Self {
        match link {
            DataLink::NULL => 0,
            DataLink::ETHERNET => 1,
            DataLink::IEEE802_5 => 6,
            DataLink::PPP => 9,
            DataLink::FDDI => 10,
            DataLink::RAW => 101,
            DataLink::IEEE802_11 => 105,
            DataLink::LINUX_SLL => 113,
            DataLink::LINUX_SLL2 => 276,
            DataLink::Unknown(code) => code,
        }
    }
}

impl Default for DataLink {
    fn default() -> Self {
        DataLink::NULL
    }
}
