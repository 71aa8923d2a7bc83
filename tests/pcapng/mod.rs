use byteorder::{BigEndian, ByteOrder, LittleEndian};

use capfile::{CaptureError, CaptureReader, DataLink, FileFormat};

fn write_u16(out: &mut Vec<u8>, big_endian: bool, value: u16) {
    let mut buf = [0_u8; 2];
    if big_endian {
        BigEndian::write_u16(&mut buf, value);
    }
    else {
        LittleEndian::write_u16(&mut buf, value);
    }
    out.extend_from_slice(&buf);
}

fn write_u32(out: &mut Vec<u8>, big_endian: bool, value: u32) {
    let mut buf = [0_u8; 4];
    if big_endian {
        BigEndian::write_u32(&mut buf, value);
    }
    else {
        LittleEndian::write_u32(&mut buf, value);
    }
    out.extend_from_slice(&buf);
}

/// Frames one block: type, total length, padded body, total length.
pub fn push_block(out: &mut Vec<u8>, big_endian: bool, type_: u32, body: &[u8]) {
    let pad = (4 - body.len() % 4) % 4;
    let total_len = (12 + body.len() + pad) as u32;

    write_u32(out, big_endian, type_);
    write_u32(out, big_endian, total_len);
    out.extend_from_slice(body);
    out.extend_from_slice(&[0_u8; 3][..pad]);
    write_u32(out, big_endian, total_len);
}

pub fn push_option(body: &mut Vec<u8>, big_endian: bool, code: u16, value: &[u8]) {
    write_u16(body, big_endian, code);
    write_u16(body, big_endian, value.len() as u16);
    body.extend_from_slice(value);
    body.extend_from_slice(&[0_u8; 3][..(4 - value.len() % 4) % 4]);
}

pub fn push_shb(out: &mut Vec<u8>, big_endian: bool, options: &[(u16, &[u8])]) {
    let mut body = Vec::new();
    write_u32(&mut body, big_endian, 0x1A2B_3C4D);
    write_u16(&mut body, big_endian, 1);
    write_u16(&mut body, big_endian, 0);
    body.extend_from_slice(&(-1_i64).to_be_bytes());
    if big_endian {
        body[8..16].copy_from_slice(&(-1_i64).to_be_bytes());
    }
    else {
        body[8..16].copy_from_slice(&(-1_i64).to_le_bytes());
    }
    for (code, value) in options {
        push_option(&mut body, big_endian, *code, value);
    }
    if !options.is_empty() {
        body.extend_from_slice(&[0_u8; 4]);
    }
    push_block(out, big_endian, 0x0A0D_0D0A, &body);
}

pub fn push_idb(out: &mut Vec<u8>, big_endian: bool, linktype: u16, snaplen: u32, options: &[(u16, &[u8])]) {
    let mut body = Vec::new();
    write_u16(&mut body, big_endian, linktype);
    write_u16(&mut body, big_endian, 0);
    write_u32(&mut body, big_endian, snaplen);
    for (code, value) in options {
        push_option(&mut body, big_endian, *code, value);
    }
    if !options.is_empty() {
        body.extend_from_slice(&[0_u8; 4]);
    }
    push_block(out, big_endian, 1, &body);
}

pub fn push_epb(out: &mut Vec<u8>, big_endian: bool, ifid: u32, timestamp: u64, orig_len: u32, data: &[u8]) {
    let mut body = Vec::new();
    write_u32(&mut body, big_endian, ifid);
    write_u32(&mut body, big_endian, (timestamp >> 32) as u32);
    write_u32(&mut body, big_endian, timestamp as u32);
    write_u32(&mut body, big_endian, data.len() as u32);
    write_u32(&mut body, big_endian, orig_len);
    body.extend_from_slice(data);
    push_block(out, big_endian, 6, &body);
}

pub fn push_spb(out: &mut Vec<u8>, big_endian: bool, orig_len: u32, data: &[u8]) {
    let mut body = Vec::new();
    write_u32(&mut body, big_endian, orig_len);
    body.extend_from_slice(data);
    push_block(out, big_endian, 3, &body);
}

#[test]
fn reads_little_endian_section() {
    let mut data = Vec::new();
    push_shb(&mut data, false, &[]);
    push_idb(&mut data, false, 1, 65535, &[(2, b"eth0")]);
    push_epb(&mut data, false, 0, 5 * 1_000_000 + 42, 64, &[0x11; 64]);
    push_epb(&mut data, false, 0, 6 * 1_000_000, 32, &[0x22; 32]);

    let mut reader = CaptureReader::new(&data[..]).unwrap();
    assert_eq!(reader.format(), FileFormat::PcapNg);

    // The interface table is populated right after open
    assert_eq!(reader.interfaces().len(), 1);
    let interface = reader.interface(0).unwrap();
    assert_eq!(interface.name.as_deref(), Some("eth0"));
    assert_eq!(interface.link_type, DataLink::ETHERNET);
    assert_eq!(interface.snaplen, 65535);
    assert_eq!(interface.timestamp_resolution, 1_000_000);

    let first = reader.next_packet().unwrap().unwrap();
    assert_eq!(first.timestamp_seconds, 5);
    assert_eq!(first.timestamp_fraction, 42);
    assert_eq!(first.capture_length, 64);
    assert_eq!(first.original_length, 64);
    assert_eq!(first.interface_index, 0);
    assert_eq!(first.data_link_type, DataLink::ETHERNET);

    let second = reader.next_packet().unwrap().unwrap();
    assert_eq!(second.timestamp_seconds, 6);
    assert_eq!(second.timestamp_fraction, 0);

    assert!(reader.next_packet().is_none());
    assert!(reader.next_packet().is_none());
}

#[test]
fn reads_big_endian_section() {
    let mut data = Vec::new();
    push_shb(&mut data, true, &[]);
    push_idb(&mut data, true, 101, 0, &[]);
    push_epb(&mut data, true, 0, 1_000_000, 4, &[1, 2, 3, 4]);

    let mut reader = CaptureReader::new(&data[..]).unwrap();
    let packet = reader.next_packet().unwrap().unwrap();
    assert_eq!(packet.timestamp_seconds, 1);
    assert_eq!(packet.data_link_type, DataLink::RAW);
}

#[test]
fn interface_options_are_decoded() {
    let mut data = Vec::new();
    push_shb(&mut data, false, &[]);
    // if_filter carries a leading kind byte that must be stripped
    let mut filter = vec![0_u8];
    filter.extend_from_slice(b"tcp port 443");
    push_idb(
        &mut data,
        false,
        1,
        262144,
        &[
            (2, b"wlan0"),
            (3, b"office access point"),
            (9, &[9]),
            (11, &filter),
            (12, b"Linux 6.8"),
        ],
    );
    push_epb(&mut data, false, 0, 3 * 1_000_000_000 + 7, 4, &[9, 9, 9, 9]);

    let mut reader = CaptureReader::new(&data[..]).unwrap();
    let interface = reader.interface(0).unwrap();
    assert_eq!(interface.name.as_deref(), Some("wlan0"));
    assert_eq!(interface.description.as_deref(), Some("office access point"));
    assert_eq!(interface.filter.as_deref(), Some("tcp port 443"));
    assert_eq!(interface.os.as_deref(), Some("Linux 6.8"));
    assert_eq!(interface.timestamp_resolution, 1_000_000_000);

    // The nanosecond resolution drives the timestamp split
    let packet = reader.next_packet().unwrap().unwrap();
    assert_eq!(packet.timestamp_seconds, 3);
    assert_eq!(packet.timestamp_fraction, 7);
}

#[test]
fn section_metadata_is_exposed() {
    let mut data = Vec::new();
    push_shb(
        &mut data,
        false,
        &[(1, b"first capture"), (2, b"x86_64"), (3, b"Linux"), (4, b"capfile-tests")],
    );
    push_idb(&mut data, false, 1, 0, &[]);
    push_epb(&mut data, false, 0, 0, 1, &[0]);

    let reader = CaptureReader::new(&data[..]).unwrap();
    assert_eq!(reader.section_comment(), Some("first capture"));
    assert_eq!(reader.section_hardware(), Some("x86_64"));
    assert_eq!(reader.section_os(), Some("Linux"));
    assert_eq!(reader.section_application(), Some("capfile-tests"));
}

#[test]
fn simple_packet_lengths_are_derived() {
    let mut data = Vec::new();
    push_shb(&mut data, false, &[]);
    push_idb(&mut data, false, 1, 6, &[]);

    // Capture truncated by the interface snaplen
    push_spb(&mut data, false, 100, &[0x33; 8]);
    // Original length shorter than the padded body
    push_spb(&mut data, false, 3, &[0x44; 4]);

    let mut reader = CaptureReader::new(&data[..]).unwrap();

    let first = reader.next_packet().unwrap().unwrap();
    assert_eq!(first.capture_length, 6);
    assert_eq!(first.original_length, 100);
    assert_eq!(first.timestamp_seconds, 0);
    assert_eq!(first.interface_index, 0);

    let second = reader.next_packet().unwrap().unwrap();
    assert_eq!(second.capture_length, 3);
    assert_eq!(second.data, vec![0x44; 3]);
}

#[test]
fn simple_packet_requires_an_interface() {
    let mut data = Vec::new();
    push_shb(&mut data, false, &[]);
    push_spb(&mut data, false, 4, &[0_u8; 4]);

    let err = CaptureReader::new(&data[..]).unwrap_err();
    assert!(matches!(err, CaptureError::CorruptBlock("simple packet without a declared interface")));
}

#[test]
fn new_section_resets_interfaces() {
    let mut data = Vec::new();
    push_shb(&mut data, false, &[]);
    push_idb(&mut data, false, 1, 0, &[(2, b"eth0")]);
    push_epb(&mut data, false, 0, 0, 2, &[1, 2]);

    // Second section in the opposite endianness
    push_shb(&mut data, true, &[(3, b"OpenBSD")]);
    push_idb(&mut data, true, 113, 0, &[(2, b"pflog0")]);
    push_epb(&mut data, true, 0, 0, 2, &[3, 4]);

    let mut reader = CaptureReader::new(&data[..]).unwrap();

    let first = reader.next_packet().unwrap().unwrap();
    assert_eq!(first.data_link_type, DataLink::ETHERNET);
    assert_eq!(reader.interface(0).unwrap().name.as_deref(), Some("eth0"));

    let second = reader.next_packet().unwrap().unwrap();
    assert_eq!(second.data_link_type, DataLink::LINUX_SLL);
    assert_eq!(reader.interfaces().len(), 1);
    assert_eq!(reader.interface(0).unwrap().name.as_deref(), Some("pflog0"));
    assert_eq!(reader.section_os(), Some("OpenBSD"));

    assert!(reader.next_packet().is_none());
}

#[test]
fn non_packet_blocks_are_skipped() {
    let mut data = Vec::new();
    push_shb(&mut data, false, &[]);
    push_idb(&mut data, false, 1, 0, &[]);
    // Name resolution block, then a custom block type
    push_block(&mut data, false, 4, &[0_u8; 8]);
    push_block(&mut data, false, 0x0BAD_0BAD, &[0_u8; 12]);
    push_epb(&mut data, false, 0, 0, 2, &[7, 8]);

    let mut reader = CaptureReader::new(&data[..]).unwrap();
    let packet = reader.next_packet().unwrap().unwrap();
    assert_eq!(packet.data, vec![7, 8]);
}

#[test]
fn undeclared_interface_is_an_error() {
    let mut data = Vec::new();
    push_shb(&mut data, false, &[]);
    push_idb(&mut data, false, 1, 0, &[]);
    push_epb(&mut data, false, 3, 0, 2, &[1, 2]);

    let err = CaptureReader::new(&data[..]).unwrap_err();
    assert!(matches!(err, CaptureError::CorruptBlock("packet references an undeclared interface")));
}

#[test]
fn trailer_mismatch_is_corrupt() {
    let mut data = Vec::new();
    push_shb(&mut data, false, &[]);
    push_idb(&mut data, false, 1, 0, &[]);

    let start = data.len();
    push_epb(&mut data, false, 0, 0, 2, &[1, 2]);
    // Corrupt the trailing total length of the packet block
    let end = data.len();
    data[end - 4..].copy_from_slice(&999_u32.to_le_bytes());
    assert!(end > start);

    let err = CaptureReader::new(&data[..]).unwrap_err();
    assert!(matches!(err, CaptureError::CorruptBlock("trailing block length mismatch")));
}

#[test]
fn truncated_block_is_corrupt() {
    let mut data = Vec::new();
    push_shb(&mut data, false, &[]);
    push_idb(&mut data, false, 1, 0, &[]);
    push_epb(&mut data, false, 0, 0, 40, &[0x55; 40]);
    data.truncate(data.len() - 15);

    let err = CaptureReader::new(&data[..]).unwrap_err();
    assert!(matches!(err, CaptureError::CorruptBlock(_)));
}
