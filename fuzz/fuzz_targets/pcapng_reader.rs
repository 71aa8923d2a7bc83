#![no_main]
use capfile::pcapng::PcapNgParser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The parser expects the section header type to have been sniffed already
    if data.len() < 4 || data[..4] != [0x0A, 0x0D, 0x0D, 0x0A] {
        return;
    }

    let mut src = &data[4..];
    if let Ok(mut parser) = PcapNgParser::new(&mut src) {
        while let Ok(Some(_)) = parser.next_packet(&mut src) {}
    }
});
