use byteorder::{BigEndian, ByteOrder, LittleEndian};

use capfile::{CaptureError, CaptureReader, DataLink, FileFormat, TsResolution};

/// Builds a classic or modified pcap global header.
pub fn global_header(magic: u32, big_endian: bool, snaplen: u32, linktype: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(24);
    let mut buf = [0_u8; 4];

    // The magic is stored in the file's own endianness
    BigEndian::write_u32(&mut buf, if big_endian { magic } else { magic.swap_bytes() });
    out.extend_from_slice(&buf);

    for field in [2 << 16 | 4, 0, 0, snaplen, linktype] {
        if big_endian {
            BigEndian::write_u32(&mut buf, field);
        }
        else {
            LittleEndian::write_u32(&mut buf, field);
        }
        out.extend_from_slice(&buf);
    }

    // version_major/minor are u16 fields, rewrite them properly
    if big_endian {
        BigEndian::write_u16(&mut out[4..6], 2);
        BigEndian::write_u16(&mut out[6..8], 4);
    }
    else {
        LittleEndian::write_u16(&mut out[4..6], 2);
        LittleEndian::write_u16(&mut out[6..8], 4);
    }

    out
}

/// Appends one classic record.
pub fn push_record(out: &mut Vec<u8>, big_endian: bool, ts: (u32, u32), orig_len: u32, data: &[u8]) {
    let mut buf = [0_u8; 4];
    for field in [ts.0, ts.1, data.len() as u32, orig_len] {
        if big_endian {
            BigEndian::write_u32(&mut buf, field);
        }
        else {
            LittleEndian::write_u32(&mut buf, field);
        }
        out.extend_from_slice(&buf);
    }
    out.extend_from_slice(data);
}

/// Appends one modified-variant record with its trailing ifindex, protocol,
/// pkt_type and pad fields.
pub fn push_modified_record(out: &mut Vec<u8>, big_endian: bool, ts: (u32, u32), orig_len: u32, data: &[u8]) {
    let header_start = out.len();
    push_record(out, big_endian, ts, orig_len, data);

    let mut extra = [0_u8; 8];
    if big_endian {
        BigEndian::write_u32(&mut extra[0..4], 2);
        BigEndian::write_u16(&mut extra[4..6], 0x0800);
    }
    else {
        LittleEndian::write_u32(&mut extra[0..4], 2);
        LittleEndian::write_u16(&mut extra[4..6], 0x0800);
    }
    out.splice(header_start + 16..header_start + 16, extra);
}

#[test]
fn reads_little_endian_micro() {
    let mut data = global_header(capfile::magic::PCAP_MICROSECONDS, false, 65535, 1);
    push_record(&mut data, false, (1_700_000_000, 123_456), 96, &[0xAA; 64]);
    push_record(&mut data, false, (1_700_000_001, 999_999), 32, &[0xBB; 32]);

    let mut reader = CaptureReader::new(&data[..]).unwrap();
    assert_eq!(reader.format(), FileFormat::Pcap);
    assert!(!reader.is_compressed());
    assert!(reader.interfaces().is_empty());

    let first = reader.next_packet().unwrap().unwrap();
    assert_eq!(first.timestamp_seconds, 1_700_000_000);
    assert_eq!(first.timestamp_fraction, 123_456);
    assert_eq!(first.capture_length, 64);
    assert_eq!(first.original_length, 96);
    assert_eq!(first.data_link_type, DataLink::ETHERNET);
    assert_eq!(first.interface_index, -1);
    assert_eq!(first.data, vec![0xAA; 64]);

    let second = reader.next_packet().unwrap().unwrap();
    assert_eq!(second.capture_length, 32);

    assert!(reader.next_packet().is_none());
    // Exhaustion latches
    assert!(reader.next_packet().is_none());
    assert!(reader.is_exhausted());
}

#[test]
fn reads_big_endian_nano() {
    let mut data = global_header(capfile::magic::PCAP_NANOSECONDS, true, 262144, 101);
    push_record(&mut data, true, (10, 999_999_999), 8, &[1, 2, 3, 4, 5, 6, 7, 8]);

    let mut reader = CaptureReader::new(&data[..]).unwrap();
    let header = reader.pcap_header().unwrap();
    assert_eq!(header.ts_resolution, TsResolution::NanoSecond);
    assert_eq!(header.datalink, DataLink::RAW);
    assert!(header.endianness.is_big());

    let packet = reader.next_packet().unwrap().unwrap();
    assert_eq!(packet.timestamp_fraction, 999_999_999);
    assert_eq!(packet.data_link_type, DataLink::RAW);
}

#[test]
fn reads_modified_pcap() {
    let mut data = global_header(capfile::magic::MODIFIED_PCAP, false, 65535, 113);
    push_modified_record(&mut data, false, (42, 7), 60, &[0xCC; 60]);
    push_modified_record(&mut data, false, (43, 8), 60, &[0xDD; 60]);

    let mut reader = CaptureReader::new(&data[..]).unwrap();
    assert_eq!(reader.format(), FileFormat::ModifiedPcap);

    let first = reader.next_packet().unwrap().unwrap();
    assert_eq!(first.timestamp_seconds, 42);
    assert_eq!(first.data_link_type, DataLink::LINUX_SLL);
    // The extended header's interface index is not part of the packet model
    assert_eq!(first.interface_index, -1);
    assert_eq!(first.data, vec![0xCC; 60]);

    assert_eq!(reader.next_packet().unwrap().unwrap().timestamp_seconds, 43);
    assert!(reader.next_packet().is_none());
}

#[test]
fn empty_capture_yields_no_packets() {
    let data = global_header(capfile::magic::PCAP_MICROSECONDS, true, 65535, 1);

    let mut reader = CaptureReader::new(&data[..]).unwrap();
    assert!(reader.next_packet().is_none());
    assert!(reader.is_exhausted());
}

#[test]
fn truncated_global_header_is_rejected() {
    let data = global_header(capfile::magic::PCAP_MICROSECONDS, true, 65535, 1);

    let err = CaptureReader::new(&data[..10]).unwrap_err();
    assert!(matches!(err, CaptureError::TruncatedRecord(_)));
}

#[test]
fn truncated_record_header_is_an_error() {
    let mut data = global_header(capfile::magic::PCAP_MICROSECONDS, true, 65535, 1);
    data.extend_from_slice(&[0_u8; 7]);

    let mut reader = CaptureReader::new(&data[..]).unwrap();
    let err = reader.next_packet().unwrap().unwrap_err();
    assert!(matches!(err, CaptureError::TruncatedRecord(_)));

    // Errors latch exhaustion
    assert!(reader.next_packet().is_none());
    assert!(reader.is_exhausted());
}

#[test]
fn truncated_payload_is_an_error() {
    let mut data = global_header(capfile::magic::PCAP_MICROSECONDS, true, 65535, 1);
    push_record(&mut data, true, (0, 0), 64, &[0xEE; 64]);
    data.truncate(data.len() - 10);

    let mut reader = CaptureReader::new(&data[..]).unwrap();
    let err = reader.next_packet().unwrap().unwrap_err();
    assert!(matches!(err, CaptureError::TruncatedRecord("record payload cut short")));
}

#[test]
fn oversized_lengths_are_rejected() {
    // incl_len > orig_len
    let mut data = global_header(capfile::magic::PCAP_MICROSECONDS, true, 65535, 1);
    push_record(&mut data, true, (0, 0), 4, &[0_u8; 8]);

    let mut reader = CaptureReader::new(&data[..]).unwrap();
    assert!(matches!(reader.next_packet().unwrap().unwrap_err(), CaptureError::InvalidField(_)));

    // incl_len beyond any plausible snapshot length
    let mut data = global_header(capfile::magic::PCAP_MICROSECONDS, true, 65535, 1);
    let mut buf = [0_u8; 4];
    for field in [0_u32, 0, 1 << 20, 1 << 20] {
        BigEndian::write_u32(&mut buf, field);
        data.extend_from_slice(&buf);
    }

    let mut reader = CaptureReader::new(&data[..]).unwrap();
    assert!(matches!(reader.next_packet().unwrap().unwrap_err(), CaptureError::InvalidField(_)));
}
